//! Stochastic and deterministic update rules shared by the organ models.
//!
//! Most vitals in the simulator have no explicit mechanistic driver. They are
//! advanced with a mean-reverting random walk (an Ornstein-Uhlenbeck style
//! step) that pulls the value back toward a baseline while adding Gaussian
//! noise, then clamps it into a physiological range.
//!
//! Filtration and regulation processes that remove a fixed fraction per
//! second use exact exponential relaxation so that arbitrarily large
//! timesteps cannot overshoot their target.
//!
//! The random source is explicit: a [`NoiseSource`] is owned by the patient
//! and threaded through each organ update, so a seeded run is reproducible
//! as long as the organ update order is preserved.

pub mod integrator;
pub mod noise;

pub use integrator::{gaussian_bump, relax_exponential, MeanReversion};
pub use noise::NoiseSource;
