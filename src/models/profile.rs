use rand::{SeedableRng, rngs::StdRng};

use super::types::{RandomModel, gaussian_noise};

/// A value source that always reports the same number.
#[derive(Debug, Clone, Copy)]
pub struct ConstantModel {
    pub value: f64,
    cost_factor: f64,
}

impl ConstantModel {
    pub fn new(value: f64, cost_factor: f64) -> Self {
        Self { value, cost_factor }
    }
}

impl RandomModel for ConstantModel {
    fn advance(&mut self, _tick: u64) {}

    fn current_value(&self) -> f64 {
        self.value
    }

    fn mean_seed_value(&self) -> f64 {
        self.value
    }

    fn cost_factor(&self) -> f64 {
        self.cost_factor
    }

    fn model_type(&self) -> &'static str {
        "Constant"
    }
}

/// Per-phase seed values perturbed by multiplicative Gaussian noise.
///
/// The seed for tick `t` is `values[t % values.len()]`; the sampled value is
/// `seed * (1 + noise)`, clamped at zero. Typical use is an hourly household
/// load curve or a tariff table measured elsewhere.
#[derive(Debug, Clone)]
pub struct ProfileModel {
    values: Vec<f64>,
    /// Standard deviation of the relative noise.
    pub noise_std: f64,
    cost_factor: f64,
    current: f64,
    rng: StdRng,
}

impl ProfileModel {
    /// Creates a profile model.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn new(values: Vec<f64>, noise_std: f64, cost_factor: f64, seed: u64) -> Self {
        assert!(!values.is_empty(), "profile must contain at least one value");
        Self {
            values,
            noise_std: noise_std.max(0.0),
            cost_factor,
            current: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed value for `tick` before noise.
    pub fn seed_value(&self, tick: u64) -> f64 {
        self.values[(tick % self.values.len() as u64) as usize]
    }
}

impl RandomModel for ProfileModel {
    fn advance(&mut self, tick: u64) {
        let noise = gaussian_noise(&mut self.rng, self.noise_std);
        self.current = (self.seed_value(tick) * (1.0 + noise)).max(0.0);
    }

    fn current_value(&self) -> f64 {
        self.current
    }

    fn mean_seed_value(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    fn cost_factor(&self) -> f64 {
        self.cost_factor
    }

    fn model_type(&self) -> &'static str {
        "Profile"
    }
}
