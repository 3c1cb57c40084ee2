// Integration tests for batch normalization.
// Tests forward statistics, inference mode and degenerate batches.

use approx::assert_abs_diff_eq;
use ndarray::{array, Array1, Array2, Axis};
use rust_batchnorm_mlp::layers::{batchnorm_forward, batchnorm_inference, BN_EPSILON};
use rust_batchnorm_mlp::utils::{RandomSource, SeededRng};

fn random_batch(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = SeededRng::new(seed);
    rng.normal_matrix(rows, cols) * 3.0 + 5.0
}

// ============================================================================
// Forward Statistics Tests
// ============================================================================

#[test]
fn test_normalized_columns_have_zero_mean_unit_variance() {
    let x = random_batch(16, 5, 7);
    let (_, cache) = batchnorm_forward(&x, &Array1::ones(5), &Array1::zeros(5));

    let mean = cache.x_norm.mean_axis(Axis(0)).unwrap();
    let var = cache.x_norm.var_axis(Axis(0), 0.0);
    for j in 0..5 {
        assert_abs_diff_eq!(mean[j], 0.0, epsilon = 1e-10);
        // epsilon in the denominator pulls the variance just below one
        assert_abs_diff_eq!(var[j], 1.0, epsilon = 1e-6);
    }
}

#[test]
fn test_output_statistics_follow_gamma_and_beta() {
    let x = random_batch(32, 3, 8);
    let gamma = array![2.0, 0.5, 3.0];
    let beta = array![1.0, -1.0, 0.25];
    let (out, _) = batchnorm_forward(&x, &gamma, &beta);

    let mean = out.mean_axis(Axis(0)).unwrap();
    let std = out.std_axis(Axis(0), 0.0);
    for j in 0..3 {
        assert_abs_diff_eq!(mean[j], beta[j], epsilon = 1e-10);
        assert_abs_diff_eq!(std[j], gamma[j], epsilon = 1e-6);
    }
}

#[test]
fn test_variance_is_population_variance() {
    let x = array![[1.0], [2.0], [3.0], [6.0]];
    let (_, cache) = batchnorm_forward(&x, &array![1.0], &array![0.0]);

    assert_eq!(cache.mu, array![3.0]);
    // ((-2)^2 + (-1)^2 + 0 + 3^2) / 4
    assert_eq!(cache.var, array![3.5]);
}

// ============================================================================
// Degenerate Batch Tests
// ============================================================================

#[test]
fn test_constant_column_stays_finite() {
    let x = array![[4.0, 1.0], [4.0, 2.0], [4.0, 3.0]];
    let (out, cache) = batchnorm_forward(&x, &array![1.0, 1.0], &array![0.5, 0.0]);

    assert_eq!(cache.var[0], 0.0);
    assert!(out.iter().all(|v| v.is_finite()));
    for i in 0..3 {
        assert_eq!(out[[i, 0]], 0.5);
    }
}

#[test]
fn test_single_row_batch() {
    let x = array![[3.0, -2.0]];
    let (out, cache) = batchnorm_forward(&x, &array![1.0, 1.0], &array![0.1, 0.2]);

    assert_eq!(cache.var, array![0.0, 0.0]);
    assert_eq!(out, array![[0.1, 0.2]]);
}

// ============================================================================
// Inference Mode Tests
// ============================================================================

#[test]
fn test_inference_uses_running_statistics() {
    let x = array![[3.0, 0.0], [5.0, 4.0]];
    let running_mean = array![1.0, 2.0];
    let running_var = array![4.0, 1.0];
    let out = batchnorm_inference(
        &x,
        &running_mean,
        &running_var,
        &array![1.0, 2.0],
        &array![0.0, 1.0],
    );

    let expected = array![
        [2.0 / (4.0 + BN_EPSILON).sqrt(), 2.0 * -2.0 / (1.0 + BN_EPSILON).sqrt() + 1.0],
        [4.0 / (4.0 + BN_EPSILON).sqrt(), 2.0 * 2.0 / (1.0 + BN_EPSILON).sqrt() + 1.0]
    ];
    assert_abs_diff_eq!(out, expected, epsilon = 1e-12);
}

#[test]
fn test_inference_rows_are_independent() {
    let x = random_batch(6, 4, 9);
    let running_mean = Array1::from_elem(4, 5.0);
    let running_var = Array1::from_elem(4, 9.0);
    let gamma = Array1::ones(4);
    let beta = Array1::zeros(4);

    let full = batchnorm_inference(&x, &running_mean, &running_var, &gamma, &beta);
    for i in 0..6 {
        let row = x.slice(ndarray::s![i..i + 1, ..]).to_owned();
        let single = batchnorm_inference(&row, &running_mean, &running_var, &gamma, &beta);
        assert_abs_diff_eq!(single.row(0), full.row(i), epsilon = 1e-15);
    }
}

#[test]
fn test_inference_matches_training_with_batch_statistics() {
    let x = random_batch(10, 3, 10);
    let gamma = array![1.5, 0.5, 1.0];
    let beta = array![0.0, 0.3, -0.3];
    let (train_out, cache) = batchnorm_forward(&x, &gamma, &beta);
    let infer_out = batchnorm_inference(&x, &cache.mu, &cache.var, &gamma, &beta);

    assert_abs_diff_eq!(train_out, infer_out, epsilon = 1e-12);
}
