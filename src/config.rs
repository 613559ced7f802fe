//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::models::{ModelSpec, RadiusDistribution, ReliabilitySpec};
use crate::sim::context::Policy;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run timing and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Behavior switches.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Grid pricing and reliability.
    #[serde(default)]
    pub grid: GridConfig,
    /// Neighborhood topology.
    #[serde(default)]
    pub network: NetworkConfig,
    /// Agent populations, generated in order.
    #[serde(default = "default_agent_groups")]
    pub agent_groups: Vec<AgentGroupConfig>,
}

fn default_agent_groups() -> Vec<AgentGroupConfig> {
    vec![AgentGroupConfig::default()]
}

/// Run timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Ticks per cycle (must be > 0).
    pub period: usize,
    /// Samples kept by every history window (must be >= period).
    pub window_size: usize,
    /// Master random seed.
    pub seed: u64,
    /// Number of ticks to simulate.
    pub ticks: u64,
    /// Maximum power the grid buys back per tick.
    pub hourly_grid_buy_back: f64,
    /// Weight of history when smoothing neighbor trust (0.0 to 1.0).
    pub trust_smoothing: f64,
    /// Weight of history when smoothing the grid load factor (0.0 to 1.0).
    pub load_factor_smoothing: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            period: 24,
            window_size: 168,
            seed: 42,
            ticks: 168,
            hourly_grid_buy_back: 50.0,
            trust_smoothing: 0.5,
            load_factor_smoothing: 0.9,
        }
    }
}

/// Behavior switches; see [`Policy`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    pub can_trade: bool,
    pub can_suspend_load: bool,
    pub force_dumping: bool,
    pub pause_on_blackout: bool,
    pub order_neighbors: bool,
    pub be_generation_scrooge: bool,
    pub simulate_reliability: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let p = Policy::default();
        Self {
            can_trade: p.can_trade,
            can_suspend_load: p.can_suspend_load,
            force_dumping: p.force_dumping,
            pause_on_blackout: p.pause_on_blackout,
            order_neighbors: p.order_neighbors,
            be_generation_scrooge: p.be_generation_scrooge,
            simulate_reliability: p.simulate_reliability,
        }
    }
}

impl From<&PolicyConfig> for Policy {
    fn from(c: &PolicyConfig) -> Self {
        Self {
            can_trade: c.can_trade,
            can_suspend_load: c.can_suspend_load,
            force_dumping: c.force_dumping,
            pause_on_blackout: c.pause_on_blackout,
            order_neighbors: c.order_neighbors,
            be_generation_scrooge: c.be_generation_scrooge,
            simulate_reliability: c.simulate_reliability,
        }
    }
}

/// Grid pricing and reliability.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Source of the base price per unit of power.
    pub price_model: ModelSpec,
    /// Relative spread between base, buying and selling price (0.0 to 1.0).
    pub spread: f64,
    /// Blackout radius in network hops.
    pub blackout_radius: RadiusDistribution,
    /// Grid failure and recovery rates.
    pub reliability: ReliabilitySpec,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            price_model: ModelSpec::Sinusoidal {
                base: 0.12,
                amplitude: 0.04,
                phase_rad: 1.2,
                noise_std: 0.02,
                cost_factor: 0.0,
            },
            spread: 0.1,
            blackout_radius: RadiusDistribution::default(),
            reliability: ReliabilitySpec::default(),
        }
    }
}

/// Neighborhood topology, tagged by `topology`.
///
/// ```toml
/// [network]
/// topology = "random"
/// min_degree = 2
/// max_degree = 4
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "topology", rename_all = "snake_case")]
pub enum NetworkConfig {
    /// Every agent linked to `ring_k` neighbors on each side.
    Ring {
        #[serde(default = "default_ring_k")]
        ring_k: usize,
    },
    /// Seeded random graph; every agent gets at least `min_degree` links
    /// where possible and never more than `max_degree`.
    Random {
        #[serde(default = "default_min_degree")]
        min_degree: usize,
        #[serde(default = "default_max_degree")]
        max_degree: usize,
    },
    /// Explicit undirected edges between agent ids.
    Edges {
        #[serde(default)]
        edges: Vec<[usize; 2]>,
    },
}

fn default_ring_k() -> usize {
    1
}

fn default_min_degree() -> usize {
    2
}

fn default_max_degree() -> usize {
    4
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig::Ring {
            ring_k: default_ring_k(),
        }
    }
}

impl NetworkConfig {
    /// Topology name as written in scenario files.
    pub fn name(&self) -> &'static str {
        match self {
            NetworkConfig::Ring { .. } => "ring",
            NetworkConfig::Random { .. } => "random",
            NetworkConfig::Edges { .. } => "edges",
        }
    }
}

/// One group of identically parameterized agents.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentGroupConfig {
    /// Group name, used in reports.
    pub name: String,
    /// Number of agents in the group.
    pub count: usize,
    /// Load model.
    pub load: ModelSpec,
    /// Generation model.
    pub generation: ModelSpec,
    /// Fraction of load that may be suspended (clamped to [0, 1]).
    pub suspendable_fraction: ModelSpec,
    /// Storage capacity.
    pub storage_capacity: f64,
    /// Initial stored power as a fraction of capacity (0.0 to 1.0).
    pub initial_storage: f64,
    /// Storage cost per unit of capacity per tick.
    pub storage_cost_factor: f64,
    /// Optional per-tick charge/discharge limit.
    pub storage_max_rate: Option<f64>,
    /// Forecast horizon in ticks; defaults to the period.
    pub foresight: Option<usize>,
    /// Agent failure and recovery rates.
    pub reliability: ReliabilitySpec,
    /// Marks the group's agents as smart.
    pub smart: bool,
}

impl Default for AgentGroupConfig {
    fn default() -> Self {
        Self {
            name: "homes".to_string(),
            count: 10,
            load: ModelSpec::Sinusoidal {
                base: 1.0,
                amplitude: 0.5,
                phase_rad: 1.2,
                noise_std: 0.05,
                cost_factor: 0.0,
            },
            generation: ModelSpec::Solar {
                peak: 2.0,
                sunrise_idx: 6,
                sunset_idx: 18,
                noise_std: 0.05,
                cloud_alpha: 0.0,
                cost_factor: 0.01,
            },
            suspendable_fraction: ModelSpec::constant(0.2),
            storage_capacity: 5.0,
            initial_storage: 0.5,
            storage_cost_factor: 0.001,
            storage_max_rate: None,
            foresight: None,
            reliability: ReliabilitySpec::default(),
            smart: false,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.period"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: ten solar homes on a ring.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            policy: PolicyConfig::default(),
            grid: GridConfig::default(),
            network: NetworkConfig::default(),
            agent_groups: default_agent_groups(),
        }
    }

    /// Returns the islanded preset: an unreliable grid with spreading
    /// blackouts and well-stocked homes.
    pub fn islanded() -> Self {
        Self {
            policy: PolicyConfig {
                simulate_reliability: true,
                ..PolicyConfig::default()
            },
            grid: GridConfig {
                blackout_radius: RadiusDistribution::Uniform { min: 1, max: 3 },
                reliability: ReliabilitySpec {
                    failure_probability: 0.03,
                    recovery_probability: 0.25,
                },
                ..GridConfig::default()
            },
            network: NetworkConfig::Random {
                min_degree: 2,
                max_degree: 4,
            },
            agent_groups: vec![AgentGroupConfig {
                count: 16,
                generation: ModelSpec::Solar {
                    peak: 3.0,
                    sunrise_idx: 6,
                    sunset_idx: 18,
                    noise_std: 0.05,
                    cloud_alpha: 0.8,
                    cost_factor: 0.01,
                },
                storage_capacity: 10.0,
                ..AgentGroupConfig::default()
            }],
            ..Self::baseline()
        }
    }

    /// Returns the trading-street preset: producers and consumers
    /// alternating along a street, trading through neighbors.
    pub fn trading_street() -> Self {
        Self {
            policy: PolicyConfig {
                be_generation_scrooge: true,
                ..PolicyConfig::default()
            },
            network: NetworkConfig::Ring { ring_k: 2 },
            agent_groups: vec![
                AgentGroupConfig {
                    name: "producers".to_string(),
                    count: 6,
                    generation: ModelSpec::Solar {
                        peak: 5.0,
                        sunrise_idx: 6,
                        sunset_idx: 18,
                        noise_std: 0.05,
                        cloud_alpha: 0.5,
                        cost_factor: 0.01,
                    },
                    storage_capacity: 15.0,
                    ..AgentGroupConfig::default()
                },
                AgentGroupConfig {
                    name: "consumers".to_string(),
                    count: 6,
                    generation: ModelSpec::constant(0.0),
                    storage_capacity: 0.0,
                    initial_storage: 0.0,
                    ..AgentGroupConfig::default()
                },
            ],
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "islanded", "trading_street"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "islanded" => Ok(Self::islanded()),
            "trading_street" => Ok(Self::trading_street()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Total number of agents over all groups.
    pub fn population(&self) -> usize {
        self.agent_groups.iter().map(|g| g.count).sum()
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.period == 0 {
            errors.push(ConfigError::new("simulation.period", "must be > 0"));
        }
        if s.window_size < s.period.max(1) {
            errors.push(ConfigError::new(
                "simulation.window_size",
                "must be >= simulation.period",
            ));
        }
        if s.hourly_grid_buy_back < 0.0 {
            errors.push(ConfigError::new(
                "simulation.hourly_grid_buy_back",
                "must be >= 0",
            ));
        }
        for (field, value) in [
            ("simulation.trust_smoothing", s.trust_smoothing),
            ("simulation.load_factor_smoothing", s.load_factor_smoothing),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(ConfigError::new(field, "must be in [0.0, 1.0]"));
            }
        }

        let g = &self.grid;
        check_model(&mut errors, "grid.price_model", &g.price_model, s.period);
        if !(0.0..1.0).contains(&g.spread) {
            errors.push(ConfigError::new("grid.spread", "must be in [0.0, 1.0)"));
        }
        if let RadiusDistribution::Uniform { min, max } = g.blackout_radius {
            if min > max {
                errors.push(ConfigError::new(
                    "grid.blackout_radius",
                    "min must be <= max",
                ));
            }
        }
        check_reliability(&mut errors, "grid.reliability", &g.reliability);

        match &self.network {
            NetworkConfig::Ring { .. } => {}
            NetworkConfig::Random {
                min_degree,
                max_degree,
            } => {
                if min_degree > max_degree {
                    errors.push(ConfigError::new(
                        "network.min_degree",
                        "must be <= network.max_degree",
                    ));
                }
            }
            NetworkConfig::Edges { edges } => {
                let population = self.population();
                if edges.iter().flatten().any(|&id| id >= population) {
                    errors.push(ConfigError::new(
                        "network.edges",
                        format!("agent ids must be < population ({population})"),
                    ));
                }
            }
        }

        if self.population() == 0 {
            errors.push(ConfigError::new(
                "agent_groups",
                "at least one agent is required",
            ));
        }
        for (i, group) in self.agent_groups.iter().enumerate() {
            let prefix = format!("agent_groups[{i}]");
            check_model(&mut errors, &format!("{prefix}.load"), &group.load, s.period);
            check_model(
                &mut errors,
                &format!("{prefix}.generation"),
                &group.generation,
                s.period,
            );
            check_model(
                &mut errors,
                &format!("{prefix}.suspendable_fraction"),
                &group.suspendable_fraction,
                s.period,
            );
            if group.storage_capacity < 0.0 {
                errors.push(ConfigError::new(
                    format!("{prefix}.storage_capacity"),
                    "must be >= 0",
                ));
            }
            if !(0.0..=1.0).contains(&group.initial_storage) {
                errors.push(ConfigError::new(
                    format!("{prefix}.initial_storage"),
                    "must be in [0.0, 1.0]",
                ));
            }
            if group.storage_max_rate.is_some_and(|r| r < 0.0) {
                errors.push(ConfigError::new(
                    format!("{prefix}.storage_max_rate"),
                    "must be >= 0",
                ));
            }
            check_reliability(&mut errors, &format!("{prefix}.reliability"), &group.reliability);
        }

        errors
    }
}

fn check_model(errors: &mut Vec<ConfigError>, field: &str, spec: &ModelSpec, period: usize) {
    if period == 0 {
        return;
    }
    if let Some(problem) = spec.problem(period) {
        errors.push(ConfigError::new(field, problem));
    }
}

fn check_reliability(errors: &mut Vec<ConfigError>, field: &str, spec: &ReliabilitySpec) {
    for (name, p) in [
        ("failure_probability", spec.failure_probability),
        ("recovery_probability", spec.recovery_probability),
    ] {
        if !(0.0..=1.0).contains(&p) {
            errors.push(ConfigError::new(
                format!("{field}.{name}"),
                "must be in [0.0, 1.0]",
            ));
        }
    }
}
