//! Rust Batch-Normalized MLP Library
//!
//! A two-layer feed-forward classifier with batch normalization on the hidden layer,
//! trained by mini-batch gradient descent on manually derived gradients.
//!
//! # Modules
//!
//! - `layers`: Batch normalization and affine (dense) building blocks
//! - `network`: Training/inference forward passes, gradients, prediction and scoring
//! - `params`: Parameter store and running statistics
//! - `trainer`: Mini-batch training loop and progress records
//! - `loss`: Cross-entropy, one-hot encoding and accuracy
//! - `optimizers`: Optimizer trait and SGD
//! - `dataset`: Labeled datasets, input scaling and dataset providers
//! - `experiment`: Configuration-driven train-and-evaluate entry point
//! - `utils`: Shared utilities (random source, activation functions)
//! - `config`: JSON configuration structures
//! - `error`: Crate error type

pub mod config;
pub mod dataset;
pub mod error;
pub mod experiment;
pub mod layers;
pub mod loss;
pub mod network;
pub mod optimizers;
pub mod params;
pub mod trainer;
pub mod utils;

pub use error::{Error, Result};
pub use experiment::{run_experiment, run_seeded_experiment, ExperimentReport};
pub use network::{ForwardPass, Network};
pub use params::{Gradients, ParameterStore};
pub use trainer::{ProgressRecord, Trainer, TrainingReport};
