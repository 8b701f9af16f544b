//! Mean-reversion primitive and closed-form relaxation helpers.
//!
//! The mean-reversion step is
//!
//! ```text
//! value += min(θ·dt, 1)·(baseline − value) + N(0, σ·dt)
//! value  = clamp(value, lo, hi)
//! ```
//!
//! Saturating the pull factor at 1 means a single large step lands on the
//! baseline instead of overshooting it; the clamp keeps the noise term from
//! ever leaving the physiological range.

use super::NoiseSource;

/// Parameters of a mean-reverting random walk with hard bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanReversion {
    /// Reversion rate θ (1/s); larger snaps back faster
    pub theta_per_sec: f64,
    /// Noise standard deviation per second of elapsed time
    pub noise_stddev: f64,
    /// Lower clamp bound
    pub min: f64,
    /// Upper clamp bound
    pub max: f64,
}

impl MeanReversion {
    /// Create a new mean-reversion rule
    pub const fn new(theta_per_sec: f64, noise_stddev: f64, min: f64, max: f64) -> Self {
        Self {
            theta_per_sec,
            noise_stddev,
            min,
            max,
        }
    }

    /// Pure random walk (no pull toward a baseline) within bounds
    pub const fn random_walk(noise_stddev: f64, min: f64, max: f64) -> Self {
        Self::new(0.0, noise_stddev, min, max)
    }

    /// Advance `value` by one step of `dt_sec` toward `baseline`
    pub fn step(&self, value: f64, baseline: f64, dt_sec: f64, noise: &mut NoiseSource) -> f64 {
        let dt = dt_sec.max(0.0);
        let pull = (self.theta_per_sec * dt).min(1.0);
        let next = value + pull * (baseline - value) + noise.gaussian(self.noise_stddev * dt);
        self.clamp(next)
    }

    /// Clamp a value into this rule's bounds
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Whether a value lies inside the bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Exact exponential approach of `value` toward `target`.
///
/// Solves dv/dt = −rate·(v − target) over `dt_sec`, so the result always
/// lies between `value` and `target` regardless of step size.
#[inline]
pub fn relax_exponential(value: f64, target: f64, rate_per_sec: f64, dt_sec: f64) -> f64 {
    let decay = (-rate_per_sec.max(0.0) * dt_sec.max(0.0)).exp();
    target + (value - target) * decay
}

/// Unnormalized Gaussian bump exp(−½((x − μ)/σ)²)
#[inline]
pub fn gaussian_bump(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma;
    (-0.5 * z * z).exp()
}
