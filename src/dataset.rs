//! Labeled feature matrices and the collaborators that supply them.
//!
//! Reading and decoding real datasets (image archives, CSV dumps, ...) lives outside this
//! crate. Callers hand over already decoded matrices through [`DatasetProvider`].

use crate::utils::rng::RandomSource;
use crate::{Error, Result};
use ndarray::{s, Array1, Array2, Axis};
use std::ops::Range;

/// Feature matrix (n_samples × input_dim) paired row-for-row with class labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    samples: Array2<f64>,
    labels: Array1<usize>,
}

impl Dataset {
    /// Pairs `samples` with `labels`; fails if their row counts differ.
    pub fn new(samples: Array2<f64>, labels: Array1<usize>) -> Result<Self> {
        if samples.nrows() != labels.len() {
            return Err(Error::InvalidShape(format!(
                "{} samples but {} labels",
                samples.nrows(),
                labels.len()
            )));
        }
        Ok(Self { samples, labels })
    }

    pub fn samples(&self) -> &Array2<f64> {
        &self.samples
    }

    pub fn labels(&self) -> &Array1<usize> {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn input_dim(&self) -> usize {
        self.samples.ncols()
    }

    /// Checks every label lies in `[0, classes)`.
    pub fn validate_labels(&self, classes: usize) -> Result<()> {
        check_labels(&self.labels, classes)
    }

    /// Returns a copy with rows reordered by one random permutation, applied identically to
    /// samples and labels so every sample keeps its label.
    pub fn shuffled(&self, rng: &mut dyn RandomSource) -> Dataset {
        let order = rng.permutation(self.len());
        Dataset {
            samples: self.samples.select(Axis(0), &order),
            labels: self.labels.select(Axis(0), &order),
        }
    }

    /// Copies out the rows in `range` as a mini-batch.
    pub fn batch(&self, range: Range<usize>) -> (Array2<f64>, Array1<usize>) {
        (
            self.samples.slice(s![range.clone(), ..]).to_owned(),
            self.labels.slice(s![range]).to_owned(),
        )
    }
}

pub(crate) fn check_labels(labels: &Array1<usize>, classes: usize) -> Result<()> {
    match labels.iter().find(|&&label| label >= classes) {
        Some(&label) => Err(Error::InvalidLabel { label, classes }),
        None => Ok(()),
    }
}

/// Maps raw intensities in `[0, max_value]` onto `[0.01, 1.0]`.
///
/// Keeping inputs strictly positive stops zero-valued pixels from zeroing the matching
/// weight gradients early in training.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use rust_batchnorm_mlp::dataset::scale_pixels;
///
/// let scaled = scale_pixels(&array![[0.0, 255.0]], 255.0);
/// assert!((scaled[[0, 0]] - 0.01).abs() < 1e-12);
/// assert!((scaled[[0, 1]] - 1.0).abs() < 1e-12);
/// ```
pub fn scale_pixels(raw: &Array2<f64>, max_value: f64) -> Array2<f64> {
    raw.mapv(|v| v / max_value * 0.99 + 0.01)
}

/// Source of the training and evaluation partitions.
pub trait DatasetProvider {
    fn train_set(&self) -> Result<Dataset>;

    fn test_set(&self) -> Result<Dataset>;
}

/// [`DatasetProvider`] over partitions already held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryProvider {
    train: Dataset,
    test: Dataset,
}

impl InMemoryProvider {
    pub fn new(train: Dataset, test: Dataset) -> Self {
        Self { train, test }
    }
}

impl DatasetProvider for InMemoryProvider {
    fn train_set(&self) -> Result<Dataset> {
        Ok(self.train.clone())
    }

    fn test_set(&self) -> Result<Dataset> {
        Ok(self.test.clone())
    }
}
