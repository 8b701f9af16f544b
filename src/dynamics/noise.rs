//! Injectable Gaussian noise source.

use rand::prelude::*;
use rand_distr::StandardNormal;

/// Zero-mean Gaussian noise generator.
///
/// Seeded once at construction and then advanced by every draw. Two sources
/// built from the same seed produce identical sequences.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    /// `None` for a silent source
    rng: Option<StdRng>,
}

impl NoiseSource {
    /// Create a reproducible source from a seed
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }

    /// Create a source seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: Some(StdRng::from_entropy()),
        }
    }

    /// Create a source that always returns zero.
    ///
    /// Every stochastic term vanishes, leaving only the deterministic
    /// mechanics.
    pub fn silent() -> Self {
        Self { rng: None }
    }

    /// Build from an optional seed, falling back to entropy
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }

    /// Whether this source produces any noise at all
    pub fn is_silent(&self) -> bool {
        self.rng.is_none()
    }

    /// Draw a sample from N(0, stddev²).
    ///
    /// A non-positive or non-finite standard deviation yields exactly zero
    /// without advancing the generator.
    pub fn gaussian(&mut self, stddev: f64) -> f64 {
        if !stddev.is_finite() || stddev <= 0.0 {
            return 0.0;
        }
        match self.rng.as_mut() {
            Some(rng) => {
                let z: f64 = rng.sample(StandardNormal);
                z * stddev
            }
            None => 0.0,
        }
    }
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}
