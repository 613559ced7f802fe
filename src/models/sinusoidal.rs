use rand::{SeedableRng, rngs::StdRng};

use super::types::{RandomModel, cycle_position, gaussian_noise};

/// A periodic model with a sinusoidal daily shape plus Gaussian noise.
///
/// `SinusoidalModel` creates a demand (or price) pattern with configurable
/// baseline, amplitude, phase and random noise to simulate typical daily
/// household consumption.
///
/// # Examples
///
/// ```
/// use microgrid_sim::models::{RandomModel, SinusoidalModel};
///
/// let mut load = SinusoidalModel::new(
///     1.0,  // base - average value
///     0.5,  // amplitude - daily variation
///     0.0,  // phase_rad - no phase shift
///     0.0,  // noise_std - deterministic
///     24,   // period - hourly resolution
///     0.0,  // cost_factor
///     42,   // seed
/// );
///
/// load.advance(6);
/// assert!((load.current_value() - 1.5).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct SinusoidalModel {
    /// Baseline value.
    pub base: f64,

    /// Amplitude of the sinusoidal variation.
    pub amplitude: f64,

    /// Phase offset of the sinusoidal pattern in radians.
    pub phase_rad: f64,

    /// Standard deviation of the Gaussian noise.
    pub noise_std: f64,

    period: usize,
    cost_factor: f64,
    current: f64,
    rng: StdRng,
}

impl SinusoidalModel {
    /// Creates a new sinusoidal model with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `base` - The baseline value
    /// * `amplitude` - The amplitude of the sinusoidal variation
    /// * `phase_rad` - The phase offset in radians
    /// * `noise_std` - The standard deviation of Gaussian noise
    /// * `period` - Number of ticks in one cycle
    /// * `cost_factor` - Cost per unit of value
    /// * `seed` - Random seed for reproducible noise generation
    pub fn new(
        base: f64,
        amplitude: f64,
        phase_rad: f64,
        noise_std: f64,
        period: usize,
        cost_factor: f64,
        seed: u64,
    ) -> Self {
        Self {
            base,
            amplitude,
            phase_rad,
            noise_std: noise_std.max(0.0),
            period: period.max(1),
            cost_factor,
            current: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn shape(&self, tick: u64) -> f64 {
        let angle = 2.0 * std::f64::consts::PI * cycle_position(tick, self.period) + self.phase_rad;
        self.base + self.amplitude * angle.sin()
    }
}

impl RandomModel for SinusoidalModel {
    /// The value is guaranteed to be non-negative.
    fn advance(&mut self, tick: u64) {
        let noise = gaussian_noise(&mut self.rng, self.noise_std);
        self.current = (self.shape(tick) + noise).max(0.0);
    }

    fn current_value(&self) -> f64 {
        self.current
    }

    fn mean_seed_value(&self) -> f64 {
        let sum: f64 = (0..self.period as u64).map(|t| self.shape(t).max(0.0)).sum();
        sum / self.period as f64
    }

    fn cost_factor(&self) -> f64 {
        self.cost_factor
    }

    fn model_type(&self) -> &'static str {
        "Sinusoidal"
    }
}
