//! Common types and traits for stochastic value sources.

use rand::{Rng, rngs::StdRng};

/// A stochastic source sampled once per tick.
///
/// Load, generation, suspendable-load fraction and grid base price are all
/// driven by a `RandomModel`. The owner calls [`advance`](Self::advance) at
/// the start of every tick; [`current_value`](Self::current_value) then stays
/// fixed until the next advance, so every decision taken during a tick sees
/// the same value.
pub trait RandomModel {
    /// Samples the value for `tick`.
    fn advance(&mut self, tick: u64);

    /// Value sampled by the last [`advance`](Self::advance) (0 before the first).
    fn current_value(&self) -> f64;

    /// Noise-free mean of the model over one period.
    fn mean_seed_value(&self) -> f64;

    /// Monetary cost per unit of value, used for generation cost accounting.
    fn cost_factor(&self) -> f64;

    /// Returns a human-readable type name for the model.
    fn model_type(&self) -> &'static str;
}

/// Utility function to generate Gaussian noise using Box-Muller transform.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
///
/// # Returns
///
/// Random value from a Gaussian distribution with mean 0 and specified standard deviation
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Half-sine daylight shape in `[0, 1]` for phase `t` of a `period`-tick day.
///
/// Zero outside `[sunrise_idx, sunset_idx)`, peaking midway between them.
pub fn daylight_frac(t: u64, period: usize, sunrise_idx: usize, sunset_idx: usize) -> f64 {
    let phase = (t % period as u64) as usize;
    if phase < sunrise_idx || phase >= sunset_idx {
        return 0.0;
    }
    let span = (sunset_idx - sunrise_idx) as f64;
    let x = (phase - sunrise_idx) as f64 + 0.5;
    (std::f64::consts::PI * x / span).sin().max(0.0)
}

/// Position of `t` within a `period`-tick cycle as a fraction in `[0, 1)`.
pub fn cycle_position(t: u64, period: usize) -> f64 {
    (t % period as u64) as f64 / period as f64
}
