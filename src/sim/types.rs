//! Read-only per-tick records produced by the engine.

use std::fmt;

use crate::components::{Agent, AgentId, Grid};

/// Snapshot of one agent at the end of a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentTickRecord {
    /// Tick index.
    pub tick: u64,
    /// Agent index in population order.
    pub agent: AgentId,
    /// Group the agent was generated from.
    pub group: String,
    /// Whether the agent was connected to the grid.
    pub connected: bool,
    /// Sampled load.
    pub load: f64,
    /// Sampled generation.
    pub generation: f64,
    /// Load served, including suspended load.
    pub satisfied_load: f64,
    /// Generation used, sold, stored or dumped.
    pub spent_generation: f64,
    /// Stored power after the tick.
    pub stored_power: f64,
    pub bought_from_grid: f64,
    pub sold_to_grid: f64,
    pub bought_from_neighbors: f64,
    pub sold_to_neighbors: f64,
    /// Power neighbors asked this agent for.
    pub neighborhood_request: f64,
    pub added_suspension: f64,
    pub removed_suspension: f64,
    /// Load suspended because nothing could serve it.
    pub forced_suspension: f64,
    /// Suspended load carried into the next tick.
    pub suspended_load: f64,
    pub dumped_power: f64,
    /// Money earned minus money spent, including generation and storage cost.
    pub profit: f64,
}

impl AgentTickRecord {
    /// Captures the current per-tick state of `agent`.
    pub fn from_agent(tick: u64, agent: &Agent) -> Self {
        Self {
            tick,
            agent: agent.id(),
            group: agent.group().to_string(),
            connected: agent.is_connected_to_grid(),
            load: agent.load(),
            generation: agent.generation(),
            satisfied_load: agent.satisfied_load(),
            spent_generation: agent.spent_generation(),
            stored_power: agent.stored_power(),
            bought_from_grid: agent.bought_from_grid(),
            sold_to_grid: agent.sold_to_grid(),
            bought_from_neighbors: agent.bought_from_neighbors(),
            sold_to_neighbors: agent.sold_to_neighbors(),
            neighborhood_request: agent.neighborhood_request(),
            added_suspension: agent.added_suspension(),
            removed_suspension: agent.removed_suspension(),
            forced_suspension: agent.forced_suspension(),
            suspended_load: agent.suspended_load(),
            dumped_power: agent.dumped_power(),
            profit: agent.profit(),
        }
    }
}

/// Complete record of one simulation tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Tick index.
    pub tick: u64,
    /// Grid base price.
    pub base_price: f64,
    /// Power the grid delivered to agents.
    pub grid_sold: f64,
    /// Power the grid bought back from agents.
    pub grid_bought: f64,
    /// `grid_sold - grid_bought`.
    pub grid_demand: f64,
    pub load_factor: f64,
    /// Whether the grid was operational.
    pub grid_operational: bool,
    /// Number of agents inside the blackout area.
    pub blackout_size: usize,
    /// Whether a blackout began during this tick.
    pub blackout_started: bool,
    /// One record per agent, in population order.
    pub agents: Vec<AgentTickRecord>,
}

impl TickReport {
    /// Captures grid and agent state at the end of `tick`.
    pub fn capture(tick: u64, grid: &Grid, agents: &[Agent], blackout_started: bool) -> Self {
        Self {
            tick,
            base_price: grid.base_price(),
            grid_sold: grid.sold_power(),
            grid_bought: grid.bought_power(),
            grid_demand: grid.current_demand(),
            load_factor: grid.load_factor(),
            grid_operational: grid.is_operational(),
            blackout_size: grid.blackout_area().len(),
            blackout_started,
            agents: agents
                .iter()
                .map(|a| AgentTickRecord::from_agent(tick, a))
                .collect(),
        }
    }

    /// Sum of a per-agent quantity over the population.
    pub fn total(&self, f: impl Fn(&AgentTickRecord) -> f64) -> f64 {
        self.agents.iter().map(f).sum()
    }
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>4} | price={:.3}  sold={:>8.2}  bought={:>8.2}  demand={:>8.2} \
             lf={:.3} | blackout={} | forced={:.2}  traded={:.2}",
            self.tick,
            self.base_price,
            self.grid_sold,
            self.grid_bought,
            self.grid_demand,
            self.load_factor,
            self.blackout_size,
            self.total(|a| a.forced_suspension),
            self.total(|a| a.bought_from_neighbors),
        )
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The run reached the configured end tick.
    EndTick,
    /// A blackout began and the policy asks to pause.
    BlackoutPause,
}

/// Result of [`Engine::run`](super::engine::Engine::run).
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub reports: Vec<TickReport>,
    pub stop_reason: StopReason,
}
