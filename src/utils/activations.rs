//! Activation functions for the network
//!
//! This module provides the functions the two-layer classifier is built from:
//! - ReLU (and its derivative mask) for the hidden layer
//! - Softmax for the output layer
//! - Row-wise argmax for turning probabilities into class predictions

use ndarray::{Array1, Array2};

/// ReLU activation: `max(x, 0)` elementwise.
pub fn relu(data: &Array2<f64>) -> Array2<f64> {
    data.mapv(|v| v.max(0.0))
}

/// Derivative mask of ReLU evaluated at `pre_activation`.
///
/// 1.0 where the value fed to the ReLU was strictly positive, 0.0 elsewhere (including
/// exactly zero).
pub fn relu_mask(pre_activation: &Array2<f64>) -> Array2<f64> {
    pre_activation.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 })
}

/// Softmax applied row-wise.
///
/// Converts logits to probabilities for each row. Subtracts the row maximum before
/// exponentiating so large logits cannot overflow, which also makes the result invariant
/// to adding a constant to every entry of a row.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use rust_batchnorm_mlp::utils::softmax_rows;
///
/// let probs = softmax_rows(&array![[1000.0, 1001.0, 1002.0]]);
/// assert!((probs.sum() - 1.0).abs() < 1e-12);
/// ```
pub fn softmax_rows(logits: &Array2<f64>) -> Array2<f64> {
    let mut outputs = logits.clone();
    for mut row in outputs.rows_mut() {
        let max_value = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max_value).exp());
        let sum = row.sum();
        row /= sum;
    }
    outputs
}

/// Index of the largest entry in each row; ties go to the lowest index.
pub fn argmax_rows(values: &Array2<f64>) -> Array1<usize> {
    values
        .rows()
        .into_iter()
        .map(|row| {
            let mut best = 0;
            for (j, &v) in row.iter().enumerate().skip(1) {
                if v > row[best] {
                    best = j;
                }
            }
            best
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_relu_mixed() {
        let data = array![[-2.0, -1.0, 0.0, 1.0, 2.0]];
        assert_eq!(relu(&data), array![[0.0, 0.0, 0.0, 1.0, 2.0]]);
    }

    #[test]
    fn test_relu_mask_excludes_zero() {
        let data = array![[-0.5, 0.0, 1e-9, 3.0]];
        assert_eq!(relu_mask(&data), array![[0.0, 0.0, 1.0, 1.0]]);
    }

    #[test]
    fn test_softmax_uniform_input() {
        let probs = softmax_rows(&array![[1.0, 1.0, 1.0]]);
        for &val in probs.iter() {
            assert!((val - 1.0 / 3.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_softmax_numerical_stability() {
        let probs = softmax_rows(&array![[1000.0, 1001.0, 1002.0], [-1e4, 0.0, 1e4]]);
        assert!(probs.iter().all(|p| p.is_finite()));
        for row in probs.rows() {
            assert!((row.sum() - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_argmax_ties_pick_lowest_index() {
        let values = array![[0.2, 0.4, 0.4], [0.5, 0.5, 0.0], [0.1, 0.2, 0.7]];
        assert_eq!(argmax_rows(&values), array![1, 0, 2]);
    }
}
