//! Configuration structures for network construction and training
//!
//! This module provides configuration structures for describing the network shape and
//! the mini-batch training schedule. Configurations are read from JSON files so that
//! experiments can be varied without code changes.

use crate::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Layer widths of the two-layer network.
///
/// Missing fields fall back to the Fashion-MNIST layout (784 -> 200 -> 10).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Number of features per input sample
    pub input_dim: usize,

    /// Width of the batch-normalized hidden layer
    pub hidden_dim: usize,

    /// Number of output classes
    pub output_dim: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            input_dim: 784,
            hidden_dim: 200,
            output_dim: 10,
        }
    }
}

impl NetworkConfig {
    /// Checks that every layer has at least one unit.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("input_dim", self.input_dim),
            ("hidden_dim", self.hidden_dim),
            ("output_dim", self.output_dim),
        ] {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }
}

/// Mini-batch gradient descent schedule.
///
/// # Example
///
/// ```json
/// {
///   "learning_rate": 0.005,
///   "epochs": 8,
///   "batch_size": 256,
///   "seed": 42
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Step size of the gradient descent update
    pub learning_rate: f64,

    /// Number of full passes over the shuffled training set
    pub epochs: usize,

    /// Nominal number of rows per mini-batch (the last batch of an epoch may be shorter)
    pub batch_size: usize,

    /// Seed for weight initialization and shuffling; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.005,
            epochs: 8,
            batch_size: 256,
            seed: None,
        }
    }
}

impl TrainingConfig {
    /// Checks the schedule is runnable: positive finite learning rate, at least one epoch,
    /// non-empty batches.
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be positive".to_string()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be positive".to_string()));
        }
        Ok(())
    }
}

/// Complete description of one train-and-evaluate run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub network: NetworkConfig,
    pub training: TrainingConfig,
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<()> {
        self.network.validate()?;
        self.training.validate()
    }
}

/// Loads an experiment configuration from a JSON file.
///
/// Reads the file at `path`, deserializes it into an [`ExperimentConfig`] and validates it.
///
/// # Returns
///
/// `Ok(ExperimentConfig)` on success, or an error if the file cannot be read, the JSON is
/// invalid, or a value is out of range.
///
/// # Examples
///
/// ```no_run
/// use rust_batchnorm_mlp::config::load_config;
///
/// let cfg = load_config("config/fashion_mnist.json").unwrap();
/// assert_eq!(cfg.network.input_dim, 784);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ExperimentConfig> {
    let contents = fs::read_to_string(path)?;
    let config: ExperimentConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
