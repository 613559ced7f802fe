//! Phased scheduler driving the grid and every agent through each tick.

use tracing::{debug, info};

use super::context::SimulationContext;
use super::types::{RunOutcome, StopReason, TickReport};
use crate::components::{Agent, AgentId, BlackoutEvent, Grid, Network, Peers};

/// Tolerance of the per-agent power balance check.
pub const CONSERVATION_TOLERANCE: f64 = 1e-9;

/// Simulation engine owning the grid, the agent population and the network.
///
/// Every tick runs in a fixed order:
/// grid initialize, agents initialize, agents execute (population order),
/// agents finalize, grid finalize.
#[derive(Debug)]
pub struct Engine {
    ctx: SimulationContext,
    /// Next tick to simulate.
    next_tick: u64,
    grid: Grid,
    agents: Vec<Agent>,
    network: Network,
}

impl Engine {
    /// Creates a new simulation engine and wires each agent to its
    /// neighbors.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Run parameters
    /// * `grid` - The grid
    /// * `agents` - Population; agent `i` must have id `i`
    /// * `network` - Topology over the same population
    ///
    /// # Panics
    ///
    /// Panics if agent ids do not match their positions or the network size
    /// differs from the population size.
    pub fn new(ctx: SimulationContext, grid: Grid, mut agents: Vec<Agent>, network: Network) -> Self {
        assert_eq!(
            network.size(),
            agents.len(),
            "network size must equal population size"
        );
        for (index, agent) in agents.iter_mut().enumerate() {
            assert_eq!(agent.id(), index, "agent ids must follow population order");
            agent.set_neighbors(network.neighbors(index));
        }
        info!(
            agents = agents.len(),
            edges = network.edge_count(),
            end_tick = ctx.end_tick,
            "engine constructed"
        );
        Self {
            next_tick: 0,
            ctx,
            grid,
            agents,
            network,
        }
    }

    /// Executes the next tick.
    ///
    /// # Returns
    ///
    /// The tick's report, or `None` once the end tick has been reached.
    pub fn step(&mut self) -> Option<TickReport> {
        if self.next_tick >= self.ctx.end_tick {
            return None;
        }
        let tick = self.next_tick;
        self.next_tick += 1;
        Some(self.step_tick(tick))
    }

    fn step_tick(&mut self, tick: u64) -> TickReport {
        let event = self.grid.initialize(tick, &mut self.agents, &self.network);

        for agent in &mut self.agents {
            agent.initialize(tick, &self.ctx);
        }
        for index in 0..self.agents.len() {
            let (agent, mut peers) = Peers::split(&mut self.agents, index);
            agent.execute(&self.ctx, &mut self.grid, &mut self.network, &mut peers);
        }
        for agent in &mut self.agents {
            agent.finalize();
        }
        self.grid.finalize();

        if cfg!(debug_assertions) {
            self.check_conservation(tick);
        }

        let started = matches!(event, Some(BlackoutEvent::Started { .. }));
        let report = TickReport::capture(tick, &self.grid, &self.agents, started);
        debug!(%report, "tick complete");
        report
    }

    fn check_conservation(&self, tick: u64) {
        for agent in &self.agents {
            let acquired = agent.power_acquired();
            let disposed = agent.power_disposed();
            assert!(
                (acquired - disposed).abs() <= CONSERVATION_TOLERANCE * acquired.abs().max(1.0),
                "agent {} power unbalanced at tick {tick}: acquired {acquired}, disposed {disposed}",
                agent.id()
            );
        }
    }

    /// Steps until the end tick, or until a blackout begins when the policy
    /// asks to pause on blackouts.
    pub fn run(&mut self) -> RunOutcome {
        let mut reports = Vec::new();
        while let Some(report) = self.step() {
            let pause = report.blackout_started && self.ctx.policy.pause_on_blackout;
            let tick = report.tick;
            reports.push(report);
            if pause {
                info!(tick, "run paused on blackout");
                return RunOutcome {
                    reports,
                    stop_reason: StopReason::BlackoutPause,
                };
            }
        }
        RunOutcome {
            reports,
            stop_reason: StopReason::EndTick,
        }
    }

    /// Next tick to be simulated.
    pub fn current_tick(&self) -> u64 {
        self.next_tick
    }

    pub fn context(&self) -> &SimulationContext {
        &self.ctx
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Mutable access to an agent between ticks.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }
}
