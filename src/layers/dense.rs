//! Dense (fully connected) affine map
//!
//! Performs the transformation `output = input × weights + biases` on a whole batch and the
//! matching parameter gradients for the backward pass.

use ndarray::{Array1, Array2, Axis};

/// Gradients of an affine map's parameters.
#[derive(Debug, Clone)]
pub struct AffineGrads {
    /// `inputᵀ · dout` (input_size × output_size), summed over the batch
    pub dw: Array2<f64>,
    /// Mean of `dout` over the batch rows (output_size)
    pub db: Array1<f64>,
}

/// Forward affine map: `y = xW + b`.
///
/// # Arguments
///
/// * `input` - Batch (batch_size × input_size)
/// * `weights` - Weight matrix (input_size × output_size)
/// * `biases` - Bias row vector (output_size), broadcast over the batch
///
/// # Panics
///
/// Panics if the inner dimensions or the bias length do not match.
pub fn affine(input: &Array2<f64>, weights: &Array2<f64>, biases: &Array1<f64>) -> Array2<f64> {
    assert_eq!(
        input.ncols(),
        weights.nrows(),
        "input cols mismatch: expected {}, got {}",
        weights.nrows(),
        input.ncols()
    );
    assert_eq!(
        biases.len(),
        weights.ncols(),
        "bias len mismatch: expected {}, got {}",
        weights.ncols(),
        biases.len()
    );
    input.dot(weights) + biases
}

/// Parameter gradients of [`affine`] given the upstream gradient `dout`.
///
/// The weight gradient is summed over the batch while the bias gradient is averaged.
pub fn affine_param_grads(input: &Array2<f64>, dout: &Array2<f64>) -> AffineGrads {
    assert_eq!(input.nrows(), dout.nrows(), "batch size mismatch");
    let rows = dout.nrows() as f64;
    AffineGrads {
        dw: input.t().dot(dout),
        db: dout.sum_axis(Axis(0)) / rows,
    }
}

/// Gradient flowing back into the input of [`affine`]: `dout · Wᵀ`.
pub fn affine_input_grad(dout: &Array2<f64>, weights: &Array2<f64>) -> Array2<f64> {
    dout.dot(&weights.t())
}
