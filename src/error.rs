//! Error types shared across the crate.
//!
//! Shape mismatches deep inside the numeric hot path are programming errors and panic.
//! Everything that crosses the public boundary (datasets, labels, configuration files)
//! is validated up front and reported through [`Error`].

use thiserror::Error;

/// Errors reported by the public training, inference and configuration APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value is out of range or inconsistent.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Matrix or vector dimensions do not line up.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// A label lies outside `[0, classes)`.
    #[error("label {label} out of range for {classes} classes")]
    InvalidLabel { label: usize, classes: usize },

    /// An operation that averages over rows received zero rows.
    #[error("empty batch")]
    EmptyBatch,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
