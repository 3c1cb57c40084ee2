//! Mini-batch gradient descent over a [`Dataset`].
//!
//! Every epoch reshuffles the full training set and walks it in contiguous batches. For
//! each batch the trainer runs a training-mode forward pass, folds the batch statistics
//! into the running averages, records loss and accuracy, then applies one SGD step.

use crate::config::TrainingConfig;
use crate::dataset::{check_labels, Dataset};
use crate::loss::{cross_entropy, one_hot};
use crate::network::Network;
use crate::optimizers::{Optimizer, SGD};
use crate::utils::rng::RandomSource;
use crate::{Error, Result};
use log::{debug, info, warn};
use ndarray::{Array1, Array2};
use std::ops::Range;

/// Observation emitted after every processed batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressRecord {
    /// Global batch counter, starting at 0 and increasing by one per batch
    pub step: usize,
    /// Zero-based epoch the batch belongs to
    pub epoch: usize,
    /// Inference-mode accuracy on the batch, measured after its running-statistics update
    pub batch_accuracy: f64,
    /// Mean cross-entropy of the training-mode forward pass on the batch
    pub batch_loss: f64,
}

/// Everything observed during one [`Trainer::fit`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub records: Vec<ProgressRecord>,
    /// Mean batch loss of each epoch, in epoch order
    pub epoch_losses: Vec<f64>,
}

impl TrainingReport {
    pub fn final_loss(&self) -> Option<f64> {
        self.epoch_losses.last().copied()
    }
}

/// Result of a single [`Trainer::train_batch`] step.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub loss: f64,
    pub accuracy: f64,
    /// Batch mean of the pre-normalization hidden activation
    pub mu: Array1<f64>,
    /// Batch variance of the pre-normalization hidden activation
    pub var: Array1<f64>,
}

/// Drives training of a [`Network`] with plain SGD.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
    optimizer: SGD,
}

impl Trainer {
    /// Creates a trainer after validating `config`.
    pub fn new(config: &TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            optimizer: SGD::new(config.learning_rate),
        })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate()
    }

    /// Trains `network` in place for the configured number of epochs.
    ///
    /// `on_progress` sees every [`ProgressRecord`] as soon as its batch is done; the same
    /// records are also collected in the returned report.
    ///
    /// # Errors
    ///
    /// Fails before touching the network if `data` is empty, its width differs from the
    /// network input, or a label is not a valid class.
    pub fn fit<F>(
        &mut self,
        network: &mut Network,
        data: &Dataset,
        rng: &mut dyn RandomSource,
        mut on_progress: F,
    ) -> Result<TrainingReport>
    where
        F: FnMut(&ProgressRecord),
    {
        if data.is_empty() {
            return Err(Error::EmptyBatch);
        }
        network.check_input(data.samples())?;
        data.validate_labels(network.params().output_dim())?;

        let batches = batch_ranges(data.len(), self.config.batch_size);
        info!(
            "training on {} samples: {} epochs, {} batches/epoch, learning rate {}",
            data.len(),
            self.config.epochs,
            batches.len(),
            self.optimizer.learning_rate()
        );

        let mut report = TrainingReport::default();
        let mut step = 0;
        for epoch in 0..self.config.epochs {
            let shuffled = data.shuffled(rng);
            let mut loss_sum = 0.0;

            for range in &batches {
                let (x, y) = shuffled.batch(range.clone());
                let outcome = self.run_batch(network, &x, &y)?;

                let record = ProgressRecord {
                    step,
                    epoch,
                    batch_accuracy: outcome.accuracy,
                    batch_loss: outcome.loss,
                };
                debug!(
                    "step {} epoch {}: loss {:.6} accuracy {:.4}",
                    record.step, record.epoch, record.batch_loss, record.batch_accuracy
                );
                on_progress(&record);
                report.records.push(record);

                loss_sum += outcome.loss;
                step += 1;
            }

            let epoch_loss = loss_sum / batches.len() as f64;
            info!("epoch {}/{}: mean loss {:.6}", epoch + 1, self.config.epochs, epoch_loss);
            report.epoch_losses.push(epoch_loss);
        }

        Ok(report)
    }

    /// Runs one forward / statistics / backward / update cycle on a single batch.
    pub fn train_batch(
        &mut self,
        network: &mut Network,
        x: &Array2<f64>,
        y: &Array1<usize>,
    ) -> Result<BatchOutcome> {
        if y.is_empty() {
            return Err(Error::EmptyBatch);
        }
        if x.nrows() != y.len() {
            return Err(Error::InvalidShape(format!(
                "{} samples but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        network.check_input(x)?;
        check_labels(y, network.params().output_dim())?;
        self.run_batch(network, x, y)
    }

    fn run_batch(
        &mut self,
        network: &mut Network,
        x: &Array2<f64>,
        y: &Array1<usize>,
    ) -> Result<BatchOutcome> {
        let pass = network.forward_train(x);
        network
            .params_mut()
            .update_running_stats(&pass.mu, &pass.var);

        let targets = one_hot(y, network.params().output_dim());
        let loss = cross_entropy(&pass.probs, &targets);
        if !loss.is_finite() {
            warn!("non-finite batch loss {}", loss);
        }
        let accuracy = network.score(x, y)?;

        let grads = network.gradients(&pass, &targets);
        network.params_mut().apply(&grads, &mut self.optimizer);

        Ok(BatchOutcome {
            loss,
            accuracy,
            mu: pass.mu,
            var: pass.var,
        })
    }
}

/// Splits `0..len` into consecutive ranges of `batch_size` rows.
///
/// The last range holds the remainder and is shorter when `len` is not a multiple of
/// `batch_size`. No range is ever empty.
pub fn batch_ranges(len: usize, batch_size: usize) -> Vec<Range<usize>> {
    assert!(batch_size > 0, "batch_size must be positive");
    (0..len)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(len))
        .collect()
}
