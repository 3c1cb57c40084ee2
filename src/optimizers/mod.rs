//! Optimizer abstractions for parameter updates
//!
//! Optimizers define how gradients are turned into parameter changes. The network only
//! ever uses plain gradient descent, `weight = weight - learning_rate * gradient`, applied
//! to all six learnable tensors once per mini-batch.

pub mod sgd;

pub use sgd::SGD;

use ndarray::{ArrayViewD, ArrayViewMutD};

/// Core trait for parameter optimizers.
///
/// Parameters and gradients are passed as dynamic-dimensional views so one object can
/// update both weight matrices and bias / batch-norm row vectors.
pub trait Optimizer {
    /// Update `parameters` in place from `gradients` of the same shape.
    ///
    /// # Panics
    ///
    /// Implementations panic if the two shapes differ.
    fn update(&mut self, parameters: ArrayViewMutD<'_, f64>, gradients: ArrayViewD<'_, f64>);

    /// Get the learning rate for this optimizer.
    fn learning_rate(&self) -> f64;

    /// Set the learning rate for this optimizer.
    fn set_learning_rate(&mut self, lr: f64);
}
