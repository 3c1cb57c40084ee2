//! Shared utilities for the network
//!
//! This module provides the seedable random source and the elementwise / row-wise
//! activation helpers used by the forward and backward passes.

pub mod activations;
pub mod rng;

pub use activations::{argmax_rows, relu, relu_mask, softmax_rows};
pub use rng::{RandomSource, SeededRng};
