//! Random sources and growth burst sizing

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::io::configuration::{BURST_BIAS_THRESHOLD, MAX_BURST};

/// Source of uniform samples driving every stochastic growth decision
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`
    fn next_unit(&mut self) -> f64;

    /// Bernoulli trial succeeding with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }
}

/// Reproducible random source seeded from a `u64`
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Create a source from a fixed seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Per-axis growth bias derived from the viewport aspect ratio
///
/// The longer axis gets the ratio, the shorter axis stays at 1. Degenerate
/// viewports produce no bias.
pub fn aspect_biases(width: usize, height: usize) -> (f64, f64) {
    if width == 0 || height == 0 {
        return (1.0, 1.0);
    }
    let ratio = width as f64 / height as f64;
    (ratio.max(1.0), ratio.recip().max(1.0))
}

/// Number of cells a successful growth step adds along an axis with `bias`
///
/// Unbiased axes always grow by one. Past [`BURST_BIAS_THRESHOLD`] a second
/// cell becomes likely in proportion to the excess bias, and a third cell only
/// once a second one was granted.
pub fn burst_size<R: RandomSource + ?Sized>(bias: f64, rng: &mut R) -> usize {
    if bias <= BURST_BIAS_THRESHOLD {
        return 1;
    }
    let mut burst = 1;
    if rng.next_unit() < (bias - 1.0) * 0.8 {
        burst = 2;
        if rng.next_unit() < (bias - 2.0) * 0.5 {
            burst = 3;
        }
    }
    burst.min(MAX_BURST)
}
