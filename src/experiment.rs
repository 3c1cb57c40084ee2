//! Explicit entry point: build, train and evaluate a network from a configuration.

use crate::config::ExperimentConfig;
use crate::dataset::DatasetProvider;
use crate::network::Network;
use crate::trainer::{Trainer, TrainingReport};
use crate::utils::rng::{RandomSource, SeededRng};
use crate::{Error, Result};
use log::info;

/// Trained network together with what was measured while producing it.
#[derive(Debug, Clone)]
pub struct ExperimentReport {
    pub network: Network,
    pub training: TrainingReport,
    /// Inference-mode accuracy on the full training set after the last epoch
    pub train_accuracy: f64,
    /// Inference-mode accuracy on the held-out set
    pub test_accuracy: f64,
}

/// Runs one experiment with every collaborator passed in explicitly.
///
/// The network is initialized from `rng`, trained on `provider.train_set()` with the
/// same `rng` driving the per-epoch shuffles, then scored on both partitions.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a partition cannot be produced, or a
/// partition does not fit the configured layer widths.
pub fn run_experiment(
    config: &ExperimentConfig,
    provider: &dyn DatasetProvider,
    rng: &mut dyn RandomSource,
) -> Result<ExperimentReport> {
    config.validate()?;
    let train = provider.train_set()?;
    let test = provider.test_set()?;
    if test.is_empty() {
        return Err(Error::EmptyBatch);
    }

    let net_cfg = &config.network;
    let mut network = Network::new(net_cfg.input_dim, net_cfg.hidden_dim, net_cfg.output_dim, rng);
    info!(
        "network {} -> {} -> {} ({} parameters)",
        net_cfg.input_dim,
        net_cfg.hidden_dim,
        net_cfg.output_dim,
        network.params().parameter_count()
    );

    let mut trainer = Trainer::new(&config.training)?;
    let training = trainer.fit(&mut network, &train, rng, |_| {})?;

    let train_accuracy = network.score(train.samples(), train.labels())?;
    let test_accuracy = network.score(test.samples(), test.labels())?;
    info!(
        "train accuracy {:.4}, test accuracy {:.4}",
        train_accuracy, test_accuracy
    );

    Ok(ExperimentReport {
        network,
        training,
        train_accuracy,
        test_accuracy,
    })
}

/// [`run_experiment`] with a [`SeededRng`] built from `config.training.seed`, or from
/// entropy when no seed is configured.
pub fn run_seeded_experiment(
    config: &ExperimentConfig,
    provider: &dyn DatasetProvider,
) -> Result<ExperimentReport> {
    let mut rng = match config.training.seed {
        Some(seed) => SeededRng::new(seed),
        None => SeededRng::from_entropy(),
    };
    run_experiment(config, provider, &mut rng)
}
