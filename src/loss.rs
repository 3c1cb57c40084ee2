//! Cross-entropy loss, one-hot encoding and accuracy.

use crate::{Error, Result};
use ndarray::{Array1, Array2};

/// Lower bound applied to a probability before taking its logarithm.
///
/// Only the reported loss is affected: the output gradient `P - Y` uses the raw
/// probabilities, so clamping here does not change training.
pub const PROB_FLOOR: f64 = 1e-12;

/// Encodes `labels` as rows with a single 1.0 at the label index.
///
/// # Panics
///
/// Panics if a label is not below `classes`; public entry points validate labels first.
pub fn one_hot(labels: &Array1<usize>, classes: usize) -> Array2<f64> {
    let mut encoded = Array2::zeros((labels.len(), classes));
    for (i, &label) in labels.iter().enumerate() {
        assert!(
            label < classes,
            "label {} out of range for {} classes",
            label,
            classes
        );
        encoded[[i, label]] = 1.0;
    }
    encoded
}

/// Mean cross-entropy between one-hot targets and predicted probabilities:
/// `-(1/N) Σ_rows Σ_classes y · ln(p)`.
///
/// Probabilities are floored at [`PROB_FLOOR`] so an underflowed softmax entry yields a
/// large finite loss instead of infinity.
pub fn cross_entropy(probs: &Array2<f64>, targets: &Array2<f64>) -> f64 {
    assert_eq!(
        probs.dim(),
        targets.dim(),
        "probs shape {:?} does not match targets shape {:?}",
        probs.dim(),
        targets.dim()
    );
    let rows = probs.nrows();
    assert!(rows > 0, "cross_entropy needs at least one row");

    let log_likelihood: f64 = probs
        .iter()
        .zip(targets.iter())
        .map(|(&p, &y)| y * p.max(PROB_FLOOR).ln())
        .sum();
    -log_likelihood / rows as f64
}

/// Fraction of positions where `predicted` equals `truth`, in `[0, 1]`.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use rust_batchnorm_mlp::loss::accuracy;
///
/// let acc = accuracy(&array![0, 1, 1, 0], &array![0, 1, 0, 0]).unwrap();
/// assert_eq!(acc, 0.75);
/// ```
pub fn accuracy(predicted: &Array1<usize>, truth: &Array1<usize>) -> Result<f64> {
    if predicted.len() != truth.len() {
        return Err(Error::InvalidShape(format!(
            "{} predictions for {} labels",
            predicted.len(),
            truth.len()
        )));
    }
    if truth.is_empty() {
        return Err(Error::EmptyBatch);
    }
    let correct = predicted
        .iter()
        .zip(truth.iter())
        .filter(|(p, t)| p == t)
        .count();
    Ok(correct as f64 / truth.len() as f64)
}
