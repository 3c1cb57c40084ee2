//! The two-layer batch-normalized classifier.
//!
//! Forward graph: `X -> affine(W_ih, b_ih) -> batch norm -> ReLU -> affine(W_ho, b_ho) -> softmax`.
//!
//! Training-mode forward passes normalize with the statistics of the batch itself and keep
//! every intermediate needed by [`Network::gradients`]. Inference-mode passes normalize with
//! the running statistics instead and keep nothing.

use crate::config::TrainingConfig;
use crate::dataset::{check_labels, Dataset};
use crate::layers::{
    affine, affine_input_grad, affine_param_grads, batchnorm_backward, batchnorm_forward,
    batchnorm_inference, BatchNormCache,
};
use crate::loss::accuracy;
use crate::params::{Gradients, ParameterStore};
use crate::trainer::{Trainer, TrainingReport};
use crate::utils::activations::{argmax_rows, relu, relu_mask, softmax_rows};
use crate::utils::rng::RandomSource;
use crate::{Error, Result};
use ndarray::{Array1, Array2};

/// Intermediates of one training-mode forward pass.
#[derive(Debug, Clone)]
pub struct ForwardPass {
    /// The batch that was fed in (N × input_dim)
    pub input: Array2<f64>,
    /// Batch-normalized hidden activation before the ReLU (N × hidden_dim)
    pub hidden_bn: Array2<f64>,
    /// Hidden activation after the ReLU (N × hidden_dim)
    pub hidden: Array2<f64>,
    /// Cache for the batch-norm backward pass
    pub bn_cache: BatchNormCache,
    /// Per-feature mean of the pre-normalization hidden activation
    pub mu: Array1<f64>,
    /// Per-feature variance of the pre-normalization hidden activation
    pub var: Array1<f64>,
    /// Softmax output (N × output_dim)
    pub probs: Array2<f64>,
}

/// A classifier that owns its parameters.
#[derive(Debug, Clone)]
pub struct Network {
    params: ParameterStore,
}

impl Network {
    /// Builds a network with freshly initialized parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_batchnorm_mlp::network::Network;
    /// use rust_batchnorm_mlp::utils::SeededRng;
    ///
    /// let net = Network::new(784, 200, 10, &mut SeededRng::new(0));
    /// assert_eq!(net.params().hidden_dim(), 200);
    /// ```
    pub fn new(
        input_dim: usize,
        hidden_dim: usize,
        output_dim: usize,
        rng: &mut dyn RandomSource,
    ) -> Self {
        Self {
            params: ParameterStore::new(input_dim, hidden_dim, output_dim, rng),
        }
    }

    pub fn from_params(params: ParameterStore) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut ParameterStore {
        &mut self.params
    }

    /// Training-mode forward pass over a batch of at least one row.
    pub fn forward_train(&self, input: &Array2<f64>) -> ForwardPass {
        let p = &self.params;
        let pre_bn = affine(input, p.w_ih(), p.b_ih());
        let (hidden_bn, bn_cache) = batchnorm_forward(&pre_bn, p.gamma(), p.beta());
        let hidden = relu(&hidden_bn);
        let logits = affine(&hidden, p.w_ho(), p.b_ho());
        let probs = softmax_rows(&logits);

        ForwardPass {
            input: input.clone(),
            mu: bn_cache.mu.clone(),
            var: bn_cache.var.clone(),
            hidden_bn,
            hidden,
            bn_cache,
            probs,
        }
    }

    /// Inference-mode forward pass; returns class probabilities (N × output_dim).
    pub fn forward_inference(&self, input: &Array2<f64>) -> Array2<f64> {
        let p = &self.params;
        let pre_bn = affine(input, p.w_ih(), p.b_ih());
        let hidden_bn = batchnorm_inference(
            &pre_bn,
            p.running_mean(),
            p.running_var(),
            p.gamma(),
            p.beta(),
        );
        let hidden = relu(&hidden_bn);
        softmax_rows(&affine(&hidden, p.w_ho(), p.b_ho()))
    }

    /// Gradients of the mean cross-entropy for the batch in `pass` against one-hot `targets`.
    ///
    /// 1. Output error `dO = P - Y`
    /// 2. `dW_ho = H_outᵀ · dO`, `db_ho = mean(dO)`
    /// 3. `dH = (dO · W_hoᵀ) ⊙ [H_bn > 0]`
    /// 4. Batch-norm backward on `dH` gives `dX_bn`, `dgamma`, `dbeta`
    /// 5. `dW_ih = Xᵀ · dX_bn`, `db_ih = mean(dX_bn)`
    pub fn gradients(&self, pass: &ForwardPass, targets: &Array2<f64>) -> Gradients {
        assert_eq!(
            pass.probs.dim(),
            targets.dim(),
            "targets shape mismatch: expected {:?}, got {:?}",
            pass.probs.dim(),
            targets.dim()
        );

        let d_out = &pass.probs - targets;
        let output_grads = affine_param_grads(&pass.hidden, &d_out);

        let d_hidden = affine_input_grad(&d_out, self.params.w_ho()) * relu_mask(&pass.hidden_bn);
        let bn_grads = batchnorm_backward(&d_hidden, &pass.bn_cache);
        let input_grads = affine_param_grads(&pass.input, &bn_grads.dx);

        Gradients {
            w_ih: input_grads.dw,
            b_ih: input_grads.db,
            w_ho: output_grads.dw,
            b_ho: output_grads.db,
            gamma: bn_grads.dgamma,
            beta: bn_grads.dbeta,
        }
    }

    pub(crate) fn check_input(&self, samples: &Array2<f64>) -> Result<()> {
        if samples.ncols() != self.params.input_dim() {
            return Err(Error::InvalidShape(format!(
                "expected {} features per sample, got {}",
                self.params.input_dim(),
                samples.ncols()
            )));
        }
        Ok(())
    }

    /// Most probable class of every row, using the running statistics.
    pub fn predict(&self, samples: &Array2<f64>) -> Result<Array1<usize>> {
        self.check_input(samples)?;
        Ok(argmax_rows(&self.forward_inference(samples)))
    }

    /// Fraction of rows whose predicted class equals the label.
    pub fn score(&self, samples: &Array2<f64>, labels: &Array1<usize>) -> Result<f64> {
        check_labels(labels, self.params.output_dim())?;
        let predicted = self.predict(samples)?;
        accuracy(&predicted, labels)
    }

    /// Trains in place with mini-batch gradient descent.
    ///
    /// Convenience wrapper around [`Trainer::fit`]; progress records are collected in the
    /// returned report and emitted through the `log` facade.
    pub fn train(
        &mut self,
        samples: &Array2<f64>,
        labels: &Array1<usize>,
        learning_rate: f64,
        epochs: usize,
        batch_size: usize,
        rng: &mut dyn RandomSource,
    ) -> Result<TrainingReport> {
        let data = Dataset::new(samples.clone(), labels.clone())?;
        let config = TrainingConfig {
            learning_rate,
            epochs,
            batch_size,
            seed: None,
        };
        let mut trainer = Trainer::new(&config)?;
        trainer.fit(self, &data, rng, |_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loss::{cross_entropy, one_hot};
    use crate::utils::rng::SeededRng;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn small_batch() -> (Array2<f64>, Array1<usize>) {
        (
            array![
                [0.9, 0.1, 0.4],
                [0.2, 0.8, 0.5],
                [0.6, 0.3, 0.9],
                [0.1, 0.7, 0.2],
                [0.5, 0.5, 0.6]
            ],
            array![0, 1, 2, 1, 0],
        )
    }

    fn batch_loss(net: &Network, x: &Array2<f64>, targets: &Array2<f64>) -> f64 {
        cross_entropy(&net.forward_train(x).probs, targets)
    }

    #[test]
    fn test_forward_train_shapes() {
        let net = Network::new(3, 4, 3, &mut SeededRng::new(1));
        let (x, _) = small_batch();
        let pass = net.forward_train(&x);

        assert_eq!(pass.hidden.dim(), (5, 4));
        assert_eq!(pass.hidden_bn.dim(), (5, 4));
        assert_eq!(pass.probs.dim(), (5, 3));
        assert_eq!(pass.mu.len(), 4);
        assert_eq!(pass.var.len(), 4);
        assert!(pass.hidden.iter().all(|&h| h >= 0.0));
        for row in pass.probs.rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_inference_matches_training_when_running_stats_equal_batch_stats() {
        let mut net = Network::new(3, 4, 3, &mut SeededRng::new(2));
        let (x, _) = small_batch();
        let pass = net.forward_train(&x);

        // Enough moving-average steps that the running statistics equal the batch ones.
        let params = net.params_mut();
        for _ in 0..400 {
            params.update_running_stats(&pass.mu, &pass.var);
        }
        let probs = net.forward_inference(&x);
        assert_abs_diff_eq!(probs, pass.probs, epsilon = 1e-9);
    }

    #[test]
    fn test_gradients_match_finite_differences() {
        let mut net = Network::new(3, 4, 3, &mut SeededRng::new(5));
        let (x, y) = small_batch();
        let targets = one_hot(&y, 3);
        let grads = net.gradients(&net.forward_train(&x), &targets);

        // dW_ih is the sum over the batch of per-sample contributions while the loss is the
        // batch mean, so the analytic value is N times the numerical derivative of the mean.
        let n = x.nrows() as f64;
        let h = 1e-6;
        for i in 0..3 {
            for j in 0..4 {
                let original = net.params().w_ih()[[i, j]];
                net.params_mut().w_ih_mut()[[i, j]] = original + h;
                let plus = batch_loss(&net, &x, &targets);
                net.params_mut().w_ih_mut()[[i, j]] = original - h;
                let minus = batch_loss(&net, &x, &targets);
                net.params_mut().w_ih_mut()[[i, j]] = original;

                let numerical = n * (plus - minus) / (2.0 * h);
                assert_abs_diff_eq!(grads.w_ih[[i, j]], numerical, epsilon = 1e-5);
            }
        }

        for j in 0..4 {
            let original = net.params().gamma()[j];
            net.params_mut().gamma_mut()[j] = original + h;
            let plus = batch_loss(&net, &x, &targets);
            net.params_mut().gamma_mut()[j] = original - h;
            let minus = batch_loss(&net, &x, &targets);
            net.params_mut().gamma_mut()[j] = original;

            let numerical = n * (plus - minus) / (2.0 * h);
            assert_abs_diff_eq!(grads.gamma[j], numerical, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_relu_blocks_gradient_for_inactive_units() {
        // W_ih maps every sample to the same value in column 1, so after normalization that
        // hidden unit is exactly zero and must receive no gradient through the ReLU.
        let w_ih = array![[1.0, 0.0], [-1.0, 0.0]];
        let w_ho = array![[1.0, -1.0], [2.0, 0.5]];
        let net = Network::from_params(ParameterStore::with_weights(w_ih, w_ho).unwrap());
        let x = array![[0.9, 0.1], [0.2, 0.8], [0.6, 0.3]];
        let pass = net.forward_train(&x);
        let grads = net.gradients(&pass, &one_hot(&array![0, 1, 0], 2));

        assert!(pass.hidden_bn.column(1).iter().all(|&v| v == 0.0));
        assert_eq!(grads.gamma[1], 0.0);
        assert_eq!(grads.beta[1], 0.0);
        assert!(grads.w_ih.column(1).iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_predict_validates_width() {
        let net = Network::new(3, 2, 2, &mut SeededRng::new(3));
        let err = net.predict(&Array2::zeros((2, 4)));
        assert!(matches!(err, Err(Error::InvalidShape(_))));
    }

    #[test]
    fn test_score_rejects_out_of_range_labels() {
        let net = Network::new(3, 2, 2, &mut SeededRng::new(3));
        let err = net.score(&Array2::zeros((1, 3)), &array![5]);
        assert!(matches!(
            err,
            Err(Error::InvalidLabel {
                label: 5,
                classes: 2
            })
        ));
    }
}
