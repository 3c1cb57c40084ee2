//! Stochastic Gradient Descent (SGD) optimizer implementation
//!
//! This module provides a vanilla SGD optimizer that performs the basic
//! gradient descent update: `parameter = parameter - learning_rate * gradient`

use crate::optimizers::Optimizer;
use ndarray::{ArrayViewD, ArrayViewMutD, Zip};

/// Stochastic Gradient Descent optimizer.
///
/// Implements the basic gradient descent update rule without momentum, weight decay or
/// adaptive learning rates:
///
/// `w = w - η * ∇L/∂w`
///
/// where w is the parameter, η (eta) is the learning rate, and ∇L/∂w is the gradient.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use rust_batchnorm_mlp::optimizers::{Optimizer, SGD};
///
/// let mut optimizer = SGD::new(0.1);
/// let mut weights = array![1.0, 2.0, 3.0];
/// let gradients = array![0.1, 0.2, 0.3];
///
/// optimizer.update(weights.view_mut().into_dyn(), gradients.view().into_dyn());
/// assert!((weights[0] - 0.99).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct SGD {
    learning_rate: f64,
}

impl SGD {
    /// Creates a new SGD optimizer with the specified learning rate.
    ///
    /// # Typical Values
    ///
    /// The Fashion-MNIST setup trains with 0.005 and batches of 256; tiny synthetic problems
    /// with a single full batch tolerate 0.1.
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for SGD {
    /// Applies `parameter[i] -= learning_rate * gradient[i]` elementwise.
    ///
    /// # Panics
    ///
    /// Panics if `parameters` and `gradients` have different shapes.
    fn update(&mut self, mut parameters: ArrayViewMutD<'_, f64>, gradients: ArrayViewD<'_, f64>) {
        assert_eq!(
            parameters.shape(),
            gradients.shape(),
            "Parameters and gradients must have the same shape"
        );

        let lr = self.learning_rate;
        Zip::from(&mut parameters)
            .and(&gradients)
            .for_each(|param, &grad| *param -= lr * grad);
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.learning_rate = lr;
    }
}
