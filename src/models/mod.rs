//! Stochastic value sources driving load, generation and prices.

/// Constant and per-phase profile models.
pub mod profile;
/// Blackout radius distributions.
pub mod distribution;
/// Grid and agent reliability.
pub mod reliability;
/// Sinusoidal daily-cycle model.
pub mod sinusoidal;
/// Solar generation with optional AR(1) cloud cover.
pub mod solar;
pub mod spec;
pub mod types;

// Re-export the main types for convenience
pub use distribution::RadiusDistribution;
pub use profile::{ConstantModel, ProfileModel};
pub use reliability::{Reliability, ReliabilitySpec};
pub use sinusoidal::SinusoidalModel;
pub use solar::SolarModel;
pub use spec::{Model, ModelSpec};
pub use types::RandomModel;
