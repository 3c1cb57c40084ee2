//! Seedable randomness for weight initialization and shuffling.
//!
//! The network never reaches for a global RNG. Everything random flows through the
//! [`RandomSource`] trait so tests and experiments can pin a seed and replay a run exactly.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Supplier of normal samples and index permutations.
pub trait RandomSource {
    /// One draw from the standard normal distribution N(0, 1).
    fn standard_normal(&mut self) -> f64;

    /// A uniformly random permutation of `0..n`.
    fn permutation(&mut self, n: usize) -> Vec<usize>;

    /// A `rows × cols` matrix of independent standard normal draws, filled row-major.
    fn normal_matrix(&mut self, rows: usize, cols: usize) -> Array2<f64> {
        Array2::from_shape_simple_fn((rows, cols), || self.standard_normal())
    }
}

/// [`RandomSource`] backed by `rand`'s `StdRng`.
///
/// # Example
///
/// ```
/// use rust_batchnorm_mlp::utils::rng::{RandomSource, SeededRng};
///
/// let mut a = SeededRng::new(7);
/// let mut b = SeededRng::new(7);
/// assert_eq!(a.permutation(10), b.permutation(10));
/// ```
#[derive(Debug, Clone)]
pub struct SeededRng {
    rng: StdRng,
}

impl SeededRng {
    /// Create a reproducible RNG from an explicit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create an RNG seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRng {
    fn standard_normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    fn permutation(&mut self, n: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut self.rng);
        indices
    }
}
