//! Learnable and statistical state of the network.

use crate::optimizers::Optimizer;
use crate::utils::rng::RandomSource;
use crate::{Error, Result};
use ndarray::{Array1, Array2, Dimension};

/// Weight kept from the previous running average on each update.
pub const RUNNING_RETAIN: f64 = 0.9;
/// Weight given to the current batch statistic on each update.
pub const RUNNING_UPDATE: f64 = 0.1;

/// All parameters of the input -> hidden (batch norm, ReLU) -> output network.
///
/// # Fields
///
/// * `w_ih` - Input-to-hidden weights (input_dim × hidden_dim)
/// * `b_ih` - Hidden bias (hidden_dim)
/// * `w_ho` - Hidden-to-output weights (hidden_dim × output_dim)
/// * `b_ho` - Output bias (output_dim)
/// * `gamma`, `beta` - Batch-norm scale and shift (hidden_dim)
/// * `running_mean`, `running_var` - Exponential moving averages of the hidden batch
///   statistics, written during training and read during inference (hidden_dim)
///
/// Fields are only readable from outside the crate. They change through
/// [`ParameterStore::apply`] and [`ParameterStore::update_running_stats`], both driven by
/// the trainer.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    w_ih: Array2<f64>,
    b_ih: Array1<f64>,
    w_ho: Array2<f64>,
    b_ho: Array1<f64>,
    gamma: Array1<f64>,
    beta: Array1<f64>,
    running_mean: Array1<f64>,
    running_var: Array1<f64>,
}

/// Gradients for every learnable tensor of a [`ParameterStore`].
#[derive(Debug, Clone)]
pub struct Gradients {
    pub w_ih: Array2<f64>,
    pub b_ih: Array1<f64>,
    pub w_ho: Array2<f64>,
    pub b_ho: Array1<f64>,
    pub gamma: Array1<f64>,
    pub beta: Array1<f64>,
}

impl ParameterStore {
    /// Creates freshly initialized parameters.
    ///
    /// Weights are independent standard normal draws (input-to-hidden first, then
    /// hidden-to-output, each filled row-major). Biases, beta and both running statistics
    /// start at zero; gamma starts at one.
    pub fn new(
        input_dim: usize,
        hidden_dim: usize,
        output_dim: usize,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let w_ih = rng.normal_matrix(input_dim, hidden_dim);
        let w_ho = rng.normal_matrix(hidden_dim, output_dim);
        Self::from_weights_unchecked(w_ih, w_ho)
    }

    /// Creates parameters around explicit weight matrices, with the same bias, gamma/beta
    /// and running-statistics initialization as [`ParameterStore::new`].
    ///
    /// Fails if the hidden dimensions of the two matrices disagree or any dimension is zero.
    pub fn with_weights(w_ih: Array2<f64>, w_ho: Array2<f64>) -> Result<Self> {
        if w_ih.ncols() != w_ho.nrows() {
            return Err(Error::InvalidShape(format!(
                "hidden dim mismatch: w_ih has {} cols, w_ho has {} rows",
                w_ih.ncols(),
                w_ho.nrows()
            )));
        }
        if w_ih.is_empty() || w_ho.is_empty() {
            return Err(Error::InvalidShape(
                "weight matrices must be non-empty".to_string(),
            ));
        }
        Ok(Self::from_weights_unchecked(w_ih, w_ho))
    }

    fn from_weights_unchecked(w_ih: Array2<f64>, w_ho: Array2<f64>) -> Self {
        let hidden_dim = w_ih.ncols();
        let output_dim = w_ho.ncols();
        Self {
            w_ih,
            b_ih: Array1::zeros(hidden_dim),
            w_ho,
            b_ho: Array1::zeros(output_dim),
            gamma: Array1::ones(hidden_dim),
            beta: Array1::zeros(hidden_dim),
            running_mean: Array1::zeros(hidden_dim),
            running_var: Array1::zeros(hidden_dim),
        }
    }

    pub fn input_dim(&self) -> usize {
        self.w_ih.nrows()
    }

    pub fn hidden_dim(&self) -> usize {
        self.w_ih.ncols()
    }

    pub fn output_dim(&self) -> usize {
        self.w_ho.ncols()
    }

    /// Number of learnable scalars: both weight matrices, both biases, gamma and beta.
    /// Running statistics are not counted.
    pub fn parameter_count(&self) -> usize {
        self.w_ih.len()
            + self.b_ih.len()
            + self.w_ho.len()
            + self.b_ho.len()
            + self.gamma.len()
            + self.beta.len()
    }

    pub fn w_ih(&self) -> &Array2<f64> {
        &self.w_ih
    }

    pub fn b_ih(&self) -> &Array1<f64> {
        &self.b_ih
    }

    pub fn w_ho(&self) -> &Array2<f64> {
        &self.w_ho
    }

    pub fn b_ho(&self) -> &Array1<f64> {
        &self.b_ho
    }

    pub fn gamma(&self) -> &Array1<f64> {
        &self.gamma
    }

    pub fn beta(&self) -> &Array1<f64> {
        &self.beta
    }

    pub fn running_mean(&self) -> &Array1<f64> {
        &self.running_mean
    }

    pub fn running_var(&self) -> &Array1<f64> {
        &self.running_var
    }

    /// Folds one batch's hidden statistics into the running averages:
    /// `running = 0.9 * running + 0.1 * batch`.
    pub(crate) fn update_running_stats(&mut self, mu: &Array1<f64>, var: &Array1<f64>) {
        assert_eq!(mu.len(), self.hidden_dim(), "batch mean len mismatch");
        assert_eq!(var.len(), self.hidden_dim(), "batch variance len mismatch");
        self.running_mean = &self.running_mean * RUNNING_RETAIN + &(mu * RUNNING_UPDATE);
        self.running_var = &self.running_var * RUNNING_RETAIN + &(var * RUNNING_UPDATE);
    }

    /// Applies one optimizer step to all six learnable tensors.
    pub(crate) fn apply(&mut self, grads: &Gradients, optimizer: &mut dyn Optimizer) {
        step(optimizer, &mut self.w_ih, &grads.w_ih);
        step(optimizer, &mut self.b_ih, &grads.b_ih);
        step(optimizer, &mut self.w_ho, &grads.w_ho);
        step(optimizer, &mut self.b_ho, &grads.b_ho);
        step(optimizer, &mut self.gamma, &grads.gamma);
        step(optimizer, &mut self.beta, &grads.beta);
    }

    #[cfg(test)]
    pub(crate) fn w_ih_mut(&mut self) -> &mut Array2<f64> {
        &mut self.w_ih
    }

    #[cfg(test)]
    pub(crate) fn gamma_mut(&mut self) -> &mut Array1<f64> {
        &mut self.gamma
    }
}

fn step<D: Dimension>(
    optimizer: &mut dyn Optimizer,
    param: &mut ndarray::Array<f64, D>,
    grad: &ndarray::Array<f64, D>,
) {
    optimizer.update(param.view_mut().into_dyn(), grad.view().into_dyn());
}
