//! Serializable model descriptions and the dispatching [`Model`] enum.

use serde::Deserialize;

use super::profile::{ConstantModel, ProfileModel};
use super::sinusoidal::SinusoidalModel;
use super::solar::SolarModel;
use super::types::RandomModel;

/// Scenario-file description of a [`Model`], tagged by `kind`.
///
/// ```toml
/// [grid.price_model]
/// kind = "sinusoidal"
/// base = 0.12
/// amplitude = 0.04
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Constant {
        value: f64,
        #[serde(default)]
        cost_factor: f64,
    },
    Sinusoidal {
        base: f64,
        #[serde(default)]
        amplitude: f64,
        #[serde(default)]
        phase_rad: f64,
        #[serde(default)]
        noise_std: f64,
        #[serde(default)]
        cost_factor: f64,
    },
    Solar {
        peak: f64,
        sunrise_idx: usize,
        sunset_idx: usize,
        #[serde(default)]
        noise_std: f64,
        #[serde(default)]
        cloud_alpha: f64,
        #[serde(default)]
        cost_factor: f64,
    },
    Profile {
        values: Vec<f64>,
        #[serde(default)]
        noise_std: f64,
        #[serde(default)]
        cost_factor: f64,
    },
}

impl ModelSpec {
    /// Shorthand for a noise-free constant model.
    pub fn constant(value: f64) -> Self {
        ModelSpec::Constant {
            value,
            cost_factor: 0.0,
        }
    }

    /// Returns a description of why this spec cannot be built for `period`,
    /// or `None` when it is valid.
    pub fn problem(&self, period: usize) -> Option<String> {
        match self {
            ModelSpec::Solar {
                sunrise_idx,
                sunset_idx,
                ..
            } => {
                if sunrise_idx >= sunset_idx {
                    Some("sunrise_idx must be < sunset_idx".into())
                } else if *sunset_idx > period {
                    Some(format!("sunset_idx must be <= period ({period})"))
                } else {
                    None
                }
            }
            ModelSpec::Profile { values, .. } if values.is_empty() => {
                Some("profile values must not be empty".into())
            }
            _ => None,
        }
    }
}

/// A concrete random model chosen at setup.
#[derive(Debug, Clone)]
pub enum Model {
    Constant(ConstantModel),
    Sinusoidal(SinusoidalModel),
    Solar(SolarModel),
    Profile(ProfileModel),
}

impl Model {
    /// Builds a model from its description.
    ///
    /// # Panics
    ///
    /// Panics if the description is invalid for `period`; run
    /// [`ModelSpec::problem`] (or config validation) first.
    pub fn from_spec(spec: &ModelSpec, period: usize, seed: u64) -> Self {
        match spec {
            ModelSpec::Constant { value, cost_factor } => {
                Model::Constant(ConstantModel::new(*value, *cost_factor))
            }
            ModelSpec::Sinusoidal {
                base,
                amplitude,
                phase_rad,
                noise_std,
                cost_factor,
            } => Model::Sinusoidal(SinusoidalModel::new(
                *base,
                *amplitude,
                *phase_rad,
                *noise_std,
                period,
                *cost_factor,
                seed,
            )),
            ModelSpec::Solar {
                peak,
                sunrise_idx,
                sunset_idx,
                noise_std,
                cloud_alpha,
                cost_factor,
            } => Model::Solar(SolarModel::new(
                *peak,
                *sunrise_idx,
                *sunset_idx,
                *noise_std,
                *cloud_alpha,
                period,
                *cost_factor,
                seed,
            )),
            ModelSpec::Profile {
                values,
                noise_std,
                cost_factor,
            } => Model::Profile(ProfileModel::new(
                values.clone(),
                *noise_std,
                *cost_factor,
                seed,
            )),
        }
    }

    fn inner(&self) -> &dyn RandomModel {
        match self {
            Model::Constant(m) => m,
            Model::Sinusoidal(m) => m,
            Model::Solar(m) => m,
            Model::Profile(m) => m,
        }
    }
}

impl RandomModel for Model {
    fn advance(&mut self, tick: u64) {
        match self {
            Model::Constant(m) => m.advance(tick),
            Model::Sinusoidal(m) => m.advance(tick),
            Model::Solar(m) => m.advance(tick),
            Model::Profile(m) => m.advance(tick),
        }
    }

    fn current_value(&self) -> f64 {
        self.inner().current_value()
    }

    fn mean_seed_value(&self) -> f64 {
        self.inner().mean_seed_value()
    }

    fn cost_factor(&self) -> f64 {
        self.inner().cost_factor()
    }

    fn model_type(&self) -> &'static str {
        self.inner().model_type()
    }
}
