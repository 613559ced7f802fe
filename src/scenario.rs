//! Builds a ready-to-run [`Engine`] from a [`ScenarioConfig`].

use rand::{SeedableRng, rngs::StdRng};
use tracing::info;

use crate::components::{Agent, AgentParams, Grid, Network, Storage};
use crate::config::{AgentGroupConfig, NetworkConfig, ScenarioConfig};
use crate::error::SimError;
use crate::models::{Model, Reliability, ReliabilitySpec};
use crate::sim::context::{Policy, SimulationContext};
use crate::sim::engine::Engine;

/// Seed offset for the grid's blackout draws.
const GRID_SEED_OFFSET: u64 = 7;
/// Seed offset for the grid's reliability chain.
const GRID_RELIABILITY_SEED_OFFSET: u64 = 13;
/// Seed offset for random network construction.
const NETWORK_SEED_OFFSET: u64 = 29;
/// Distance between the seed blocks of consecutive agents.
const AGENT_SEED_STRIDE: u64 = 1_009;

/// Builds the run context from the `[simulation]` and `[policy]` sections.
pub fn build_context(cfg: &ScenarioConfig) -> SimulationContext {
    let s = &cfg.simulation;
    let mut ctx = SimulationContext::new(s.period, s.window_size, s.seed, s.ticks);
    ctx.hourly_grid_buy_back = s.hourly_grid_buy_back;
    ctx.trust_smoothing = s.trust_smoothing;
    ctx.load_factor_smoothing = s.load_factor_smoothing;
    ctx.policy = Policy::from(&cfg.policy);
    ctx
}

/// Validates `cfg` and builds the engine it describes.
///
/// Agents are numbered in group order. Every random stream is derived from
/// the master seed so identical configurations produce identical runs.
///
/// # Errors
///
/// Returns [`SimError::Invalid`] with every validation problem found.
pub fn build_engine(cfg: &ScenarioConfig) -> Result<Engine, SimError> {
    let errors = cfg.validate();
    if !errors.is_empty() {
        return Err(SimError::Invalid(errors));
    }

    let ctx = build_context(cfg);
    let seed = ctx.seed;

    let grid = Grid::new(
        Model::from_spec(&cfg.grid.price_model, ctx.period, seed),
        cfg.grid.spread,
        cfg.grid.blackout_radius.clone(),
        reliability(
            &ctx,
            &cfg.grid.reliability,
            seed.wrapping_add(GRID_RELIABILITY_SEED_OFFSET),
        ),
        &ctx,
        seed.wrapping_add(GRID_SEED_OFFSET),
    );

    let mut agents = Vec::with_capacity(cfg.population());
    for group in &cfg.agent_groups {
        for _ in 0..group.count {
            let id = agents.len();
            agents.push(build_agent(id, group, &ctx));
        }
    }

    let network = build_network(&cfg.network, agents.len(), seed);
    info!(
        agents = agents.len(),
        groups = cfg.agent_groups.len(),
        topology = cfg.network.name(),
        seed,
        "scenario built"
    );
    Ok(Engine::new(ctx, grid, agents, network))
}

fn build_agent(id: usize, group: &AgentGroupConfig, ctx: &SimulationContext) -> Agent {
    let base = ctx
        .seed
        .wrapping_add(AGENT_SEED_STRIDE.wrapping_mul(id as u64 + 1));
    let params = AgentParams {
        group: group.name.clone(),
        load: Model::from_spec(&group.load, ctx.period, base),
        generation: Model::from_spec(&group.generation, ctx.period, base.wrapping_add(1)),
        suspendable: Model::from_spec(
            &group.suspendable_fraction,
            ctx.period,
            base.wrapping_add(2),
        ),
        storage: Storage::new(
            group.storage_capacity,
            group.storage_capacity * group.initial_storage,
            group.storage_cost_factor,
            group.storage_max_rate,
        ),
        reliability: reliability(ctx, &group.reliability, base.wrapping_add(3)),
        foresight: group.foresight.unwrap_or(ctx.period),
        smart: group.smart,
    };
    Agent::new(id, params, ctx, base.wrapping_add(4))
}

fn reliability(ctx: &SimulationContext, spec: &ReliabilitySpec, seed: u64) -> Reliability {
    if ctx.policy.simulate_reliability {
        Reliability::new(spec, seed)
    } else {
        Reliability::always_operational()
    }
}

fn build_network(cfg: &NetworkConfig, size: usize, seed: u64) -> Network {
    match cfg {
        NetworkConfig::Ring { ring_k } => Network::ring(size, *ring_k),
        NetworkConfig::Random {
            min_degree,
            max_degree,
        } => {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(NETWORK_SEED_OFFSET));
            Network::random(size, *min_degree, *max_degree, &mut rng)
        }
        NetworkConfig::Edges { edges } => {
            let edges: Vec<(usize, usize)> = edges.iter().map(|&[a, b]| (a, b)).collect();
            Network::from_edges(size, &edges)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelSpec;

    #[test]
    fn context_mirrors_config() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.trust_smoothing = 0.25;
        cfg.policy.force_dumping = true;
        let ctx = build_context(&cfg);
        assert_eq!(ctx.period, 24);
        assert_eq!(ctx.end_tick, cfg.simulation.ticks);
        assert_eq!(ctx.trust_smoothing, 0.25);
        assert!(ctx.policy.force_dumping);
    }

    #[test]
    fn agents_follow_group_order() {
        let cfg = ScenarioConfig::trading_street();
        let engine = build_engine(&cfg);
        assert!(engine.is_ok());
        let Ok(engine) = engine else { return };
        assert_eq!(engine.agents().len(), 12);
        assert_eq!(engine.agents()[0].group(), "producers");
        assert_eq!(engine.agents()[11].group(), "consumers");
        assert!(engine.agents().iter().enumerate().all(|(i, a)| a.id() == i));
    }

    #[test]
    fn smart_flag_follows_group() {
        let mut cfg = ScenarioConfig::trading_street();
        cfg.agent_groups[1].smart = true;
        let Ok(engine) = build_engine(&cfg) else {
            panic!("trading street should build");
        };
        assert!(!engine.agents()[0].is_smart());
        assert!(engine.agents()[6].is_smart());
        assert_eq!(engine.agents().iter().filter(|a| a.is_smart()).count(), 6);
    }

    #[test]
    fn ring_neighbors_are_wired() {
        let cfg = ScenarioConfig::baseline();
        let engine = build_engine(&cfg);
        let Ok(engine) = engine else {
            panic!("baseline should build");
        };
        assert_eq!(engine.network().neighbors(0), &[1, 9]);
        assert_eq!(engine.agents()[0].neighbors().len(), 2);
    }

    #[test]
    fn explicit_edges_are_used() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.agent_groups[0].count = 3;
        cfg.network = NetworkConfig::Edges {
            edges: vec![[0, 2]],
        };
        let Ok(engine) = build_engine(&cfg) else {
            panic!("edge scenario should build");
        };
        assert!(engine.network().are_adjacent(0, 2));
        assert!(engine.network().neighbors(1).is_empty());
    }

    #[test]
    fn invalid_config_reports_all_errors() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.grid.spread = 2.0;
        cfg.agent_groups[0].load = ModelSpec::Profile {
            values: Vec::new(),
            noise_std: 0.0,
            cost_factor: 0.0,
        };
        match build_engine(&cfg) {
            Err(SimError::Invalid(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn random_topology_is_seeded() {
        let mut cfg = ScenarioConfig::islanded();
        cfg.simulation.seed = 5;
        let a = build_engine(&cfg).map(|e| e.network().clone());
        let b = build_engine(&cfg).map(|e| e.network().clone());
        let (Ok(a), Ok(b)) = (a, b) else {
            panic!("islanded should build");
        };
        for id in 0..a.size() {
            assert_eq!(a.neighbors(id), b.neighbors(id));
        }
    }
}
