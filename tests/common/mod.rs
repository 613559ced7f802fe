//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use microgrid_sim::config::{AgentGroupConfig, NetworkConfig, ScenarioConfig};
use microgrid_sim::models::ModelSpec;
use microgrid_sim::scenario::build_engine;
use microgrid_sim::sim::engine::Engine;

/// Tolerance for power comparisons.
pub const EPS: f64 = 1e-9;

/// Baseline preset shortened to `ticks`.
pub fn baseline(ticks: u64) -> ScenarioConfig {
    let mut cfg = ScenarioConfig::baseline();
    cfg.simulation.ticks = ticks;
    cfg
}

/// Group of `count` agents with constant load and generation, no storage and
/// no suspendable load.
pub fn flat_group(name: &str, count: usize, load: f64, generation: f64) -> AgentGroupConfig {
    AgentGroupConfig {
        name: name.to_string(),
        count,
        load: ModelSpec::constant(load),
        generation: ModelSpec::constant(generation),
        suspendable_fraction: ModelSpec::constant(0.0),
        storage_capacity: 0.0,
        initial_storage: 0.0,
        storage_cost_factor: 0.0,
        ..AgentGroupConfig::default()
    }
}

/// Deterministic scenario priced at a constant 0.1 with no spread and no
/// neighbor links.
pub fn flat_scenario(period: usize, ticks: u64, groups: Vec<AgentGroupConfig>) -> ScenarioConfig {
    let mut cfg = ScenarioConfig::baseline();
    cfg.simulation.period = period;
    cfg.simulation.window_size = period * 4;
    cfg.simulation.ticks = ticks;
    cfg.simulation.hourly_grid_buy_back = f64::INFINITY;
    cfg.grid.price_model = ModelSpec::constant(0.1);
    cfg.grid.spread = 0.0;
    cfg.network = NetworkConfig::Edges { edges: Vec::new() };
    cfg.agent_groups = groups;
    cfg
}

/// Builds the engine or fails the test with the validation errors.
pub fn engine(cfg: &ScenarioConfig) -> Engine {
    match build_engine(cfg) {
        Ok(engine) => engine,
        Err(e) => panic!("scenario should build: {e}"),
    }
}

/// Asserts every agent disposed exactly the power it acquired this tick.
pub fn assert_balanced(engine: &Engine) {
    for agent in engine.agents() {
        let acquired = agent.power_acquired();
        let disposed = agent.power_disposed();
        assert!(
            (acquired - disposed).abs() <= EPS * acquired.abs().max(1.0),
            "agent {} unbalanced at tick {}: acquired {acquired}, disposed {disposed}",
            agent.id(),
            engine.current_tick()
        );
    }
}
