//! Solar generation model with optional temporally correlated cloud cover.

use rand::{SeedableRng, rngs::StdRng};

use super::types::{RandomModel, daylight_frac, gaussian_noise};

/// Minimum cloud multiplier (heavy overcast).
const MULTIPLIER_MIN: f64 = 0.2;
/// Maximum cloud multiplier (enhanced irradiance from cloud edges).
const MULTIPLIER_MAX: f64 = 1.2;

/// Solar generator producing a half-sine profile between sunrise and sunset.
///
/// Output is `peak * daylight_frac(t) * m(t)`. With `cloud_alpha == 0` the
/// multiplier is drawn independently every tick as `1 + noise`. With
/// `cloud_alpha > 0` it follows an AR(1) process that reverts towards 1:
/// ```text
/// m(t) = alpha * m(t-1) + (1 - alpha) * (1 + epsilon(t))
/// ```
/// clamped to \[0.2, 1.2\], which models cloud fronts lasting several ticks.
///
/// Generation is reported as a **positive** value.
#[derive(Debug, Clone)]
pub struct SolarModel {
    /// Maximum output under ideal conditions.
    pub peak: f64,

    /// Phase index when sunrise occurs (inclusive).
    pub sunrise_idx: usize,

    /// Phase index when sunset occurs (exclusive).
    pub sunset_idx: usize,

    /// Standard deviation of the per-tick noise.
    pub noise_std: f64,

    /// AR(1) correlation coefficient (0.0 = uncorrelated).
    pub cloud_alpha: f64,

    period: usize,
    cost_factor: f64,
    multiplier: f64,
    current: f64,
    rng: StdRng,
}

impl SolarModel {
    /// Creates a new solar model.
    ///
    /// # Arguments
    ///
    /// * `peak` - Maximum output under ideal conditions
    /// * `sunrise_idx` - Phase index when sunrise occurs (inclusive)
    /// * `sunset_idx` - Phase index when sunset occurs (exclusive)
    /// * `noise_std` - Standard deviation of the multiplier noise
    /// * `cloud_alpha` - AR(1) correlation coefficient, clamped to \[0, 1\]
    /// * `period` - Number of ticks in one day
    /// * `cost_factor` - Cost per unit generated
    /// * `seed` - Random seed for reproducible noise generation
    ///
    /// # Panics
    ///
    /// Panics if `sunrise_idx >= sunset_idx` or `sunset_idx > period`.
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        peak: f64,
        sunrise_idx: usize,
        sunset_idx: usize,
        noise_std: f64,
        cloud_alpha: f64,
        period: usize,
        cost_factor: f64,
        seed: u64,
    ) -> Self {
        assert!(
            sunrise_idx < sunset_idx && sunset_idx <= period,
            "sunrise_idx must be < sunset_idx and sunset_idx must be <= period"
        );
        Self {
            peak: peak.max(0.0),
            sunrise_idx,
            sunset_idx,
            noise_std: noise_std.max(0.0),
            cloud_alpha: cloud_alpha.clamp(0.0, 1.0),
            period,
            cost_factor,
            multiplier: 1.0,
            current: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Advances the cloud multiplier by one tick and returns the new value.
    fn advance_multiplier(&mut self) -> f64 {
        let epsilon = gaussian_noise(&mut self.rng, self.noise_std);
        self.multiplier = if self.cloud_alpha > 0.0 {
            let next = self.cloud_alpha * self.multiplier + (1.0 - self.cloud_alpha) * (1.0 + epsilon);
            next.clamp(MULTIPLIER_MIN, MULTIPLIER_MAX)
        } else {
            (1.0 + epsilon).max(0.0)
        };
        self.multiplier
    }
}

impl RandomModel for SolarModel {
    /// The multiplier evolves every tick regardless of daylight, keeping the
    /// cloud process continuous across nights.
    fn advance(&mut self, tick: u64) {
        let m = self.advance_multiplier();
        let frac = daylight_frac(tick, self.period, self.sunrise_idx, self.sunset_idx);
        self.current = (self.peak * frac * m).max(0.0);
    }

    fn current_value(&self) -> f64 {
        self.current
    }

    fn mean_seed_value(&self) -> f64 {
        let sum: f64 = (0..self.period as u64)
            .map(|t| daylight_frac(t, self.period, self.sunrise_idx, self.sunset_idx))
            .sum();
        self.peak * sum / self.period as f64
    }

    fn cost_factor(&self) -> f64 {
        self.cost_factor
    }

    fn model_type(&self) -> &'static str {
        if self.cloud_alpha > 0.0 {
            "SolarAr1"
        } else {
            "Solar"
        }
    }
}
