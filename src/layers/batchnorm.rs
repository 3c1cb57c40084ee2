//! Batch normalization forward and backward passes
//!
//! Batch normalization normalizes each feature to zero mean and unit variance within a
//! mini-batch, then applies a learnable scale (gamma) and shift (beta):
//!
//! 1. Compute batch statistics: mean μ and variance σ² across the batch
//! 2. Normalize: x_norm = (x - μ) / sqrt(σ² + ε)
//! 3. Scale and shift: y = γ * x_norm + β
//!
//! During training the batch statistics are used and handed back to the caller so it can
//! fold them into the running averages. During inference the running averages replace the
//! batch statistics, so a single sample can be normalized on its own.
//!
//! The functions here are pure: parameters come in as arguments and everything the
//! backward pass needs travels in an explicit [`BatchNormCache`].
//!
//! # References
//!
//! Ioffe, S., & Szegedy, C. (2015). Batch Normalization: Accelerating Deep Network Training
//! by Reducing Internal Covariate Shift. ICML.

use ndarray::{Array1, Array2, Axis};

/// Added to the variance under the square root so degenerate batches never divide by zero.
pub const BN_EPSILON: f64 = 1e-8;

/// Everything one training-mode forward call produced that its paired backward call needs.
///
/// # Fields
///
/// * `x` - Pre-normalization input (N × D)
/// * `x_norm` - Normalized input before scale/shift (N × D)
/// * `mu` - Per-feature batch mean (D)
/// * `var` - Per-feature population variance of the batch (D), always ≥ 0
/// * `gamma`, `beta` - The scale and shift the forward pass used (D)
/// * `n`, `d` - Batch size and feature count
#[derive(Debug, Clone)]
pub struct BatchNormCache {
    pub x: Array2<f64>,
    pub x_norm: Array2<f64>,
    pub mu: Array1<f64>,
    pub var: Array1<f64>,
    pub gamma: Array1<f64>,
    pub beta: Array1<f64>,
    pub n: usize,
    pub d: usize,
}

/// Gradients produced by [`batchnorm_backward`].
#[derive(Debug, Clone)]
pub struct BatchNormGrads {
    /// Gradient w.r.t. the pre-normalization input (N × D)
    pub dx: Array2<f64>,
    /// Gradient w.r.t. gamma (D)
    pub dgamma: Array1<f64>,
    /// Gradient w.r.t. beta (D)
    pub dbeta: Array1<f64>,
}

fn check_params(d: usize, gamma: &Array1<f64>, beta: &Array1<f64>) {
    assert_eq!(
        gamma.len(),
        d,
        "gamma len mismatch: expected {}, got {}",
        d,
        gamma.len()
    );
    assert_eq!(
        beta.len(),
        d,
        "beta len mismatch: expected {}, got {}",
        d,
        beta.len()
    );
}

/// Training-mode batch normalization.
///
/// Normalizes `x` with its own per-feature mean and variance and applies `gamma`/`beta`.
///
/// # Arguments
///
/// * `x` - Batch of activations (N × D), N ≥ 1
/// * `gamma` - Scale per feature (D)
/// * `beta` - Shift per feature (D)
///
/// # Returns
///
/// The scaled and shifted output together with the cache for [`batchnorm_backward`].
/// The batch mean and variance are available as `cache.mu` / `cache.var`.
///
/// # Panics
///
/// Panics on an empty batch or if `gamma`/`beta` do not have D entries.
pub fn batchnorm_forward(
    x: &Array2<f64>,
    gamma: &Array1<f64>,
    beta: &Array1<f64>,
) -> (Array2<f64>, BatchNormCache) {
    let (n, d) = x.dim();
    assert!(n > 0, "batchnorm_forward needs at least one row");
    check_params(d, gamma, beta);

    let mu = x.sum_axis(Axis(0)) / n as f64;
    let x_mu = x - &mu;
    let var = (&x_mu * &x_mu).sum_axis(Axis(0)) / n as f64;

    let std = var.mapv(|v| (v + BN_EPSILON).sqrt());
    let x_norm = &x_mu / &std;
    let out = &x_norm * gamma + beta;

    let cache = BatchNormCache {
        x: x.clone(),
        x_norm,
        mu,
        var,
        gamma: gamma.clone(),
        beta: beta.clone(),
        n,
        d,
    };
    (out, cache)
}

/// Inference-mode batch normalization using stored statistics instead of batch statistics.
///
/// Works for any number of rows, including one.
pub fn batchnorm_inference(
    x: &Array2<f64>,
    running_mean: &Array1<f64>,
    running_var: &Array1<f64>,
    gamma: &Array1<f64>,
    beta: &Array1<f64>,
) -> Array2<f64> {
    let d = x.ncols();
    check_params(d, gamma, beta);
    assert_eq!(running_mean.len(), d, "running_mean len mismatch");
    assert_eq!(running_var.len(), d, "running_var len mismatch");

    let std = running_var.mapv(|v| (v + BN_EPSILON).sqrt());
    let x_norm = (x - running_mean) / &std;
    &x_norm * gamma + beta
}

/// Backward pass of batch normalization.
///
/// Differentiates through the batch mean and variance as functions of every row of the
/// input, so `dx` is the exact gradient rather than the one obtained by treating μ and σ²
/// as constants.
///
/// # Arguments
///
/// * `dout` - Gradient of the loss w.r.t. the batch norm output (N × D)
/// * `cache` - Cache from the [`batchnorm_forward`] call that produced that output
pub fn batchnorm_backward(dout: &Array2<f64>, cache: &BatchNormCache) -> BatchNormGrads {
    assert_eq!(
        dout.dim(),
        (cache.n, cache.d),
        "dout shape mismatch: expected {:?}, got {:?}",
        (cache.n, cache.d),
        dout.dim()
    );
    let n = cache.n as f64;

    let x_mu = &cache.x - &cache.mu;
    let std_inv = cache.var.mapv(|v| 1.0 / (v + BN_EPSILON).sqrt());

    let dx_norm = dout * &cache.gamma;
    let dvar = (&dx_norm * &x_mu).sum_axis(Axis(0)) * -0.5 * &std_inv.mapv(|s| s.powi(3));
    let dmu = (&dx_norm * &(-&std_inv)).sum_axis(Axis(0))
        + &dvar * &(x_mu.mapv(|v| -2.0 * v).sum_axis(Axis(0)) / n);

    let dx = &dx_norm * &std_inv + (&x_mu * &dvar) * 2.0 / n + &(&dmu / n);
    let dgamma = (dout * &cache.x_norm).sum_axis(Axis(0));
    let dbeta = dout.sum_axis(Axis(0));

    BatchNormGrads { dx, dgamma, dbeta }
}
