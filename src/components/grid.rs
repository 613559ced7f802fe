//! The utility grid: price setting, power exchange and blackouts.

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use super::agent::Agent;
use super::network::{AgentId, Network};
use crate::models::{Model, RadiusDistribution, RandomModel, Reliability};
use crate::sim::context::SimulationContext;
use crate::stats::{RunningMax, WindowedAggregator, exponential_average};

/// Change in blackout state detected at the start of a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum BlackoutEvent {
    /// A blackout began; `affected` lists the disconnected agents in
    /// breadth-first order from `epicenter`.
    Started {
        epicenter: AgentId,
        radius: usize,
        affected: Vec<AgentId>,
    },
    /// The grid recovered and `restored` agents were reconnected.
    Ended { restored: usize },
}

/// Single clearinghouse every connected agent trades with.
///
/// Prices come from a random model: the grid buys at
/// `base * (1 - spread)` and sells at `base * (1 + spread)`. Selling to
/// agents is unlimited; buying back is capped per tick by the configured
/// hourly buy-back and by the predicted outflow for the current phase.
///
/// Naming follows the grid's point of view: `sold` is power delivered to
/// agents, `bought` is power taken from them.
#[derive(Debug, Clone)]
pub struct Grid {
    price_model: Model,
    spread: f64,
    buy_back_cap: f64,
    load_factor_smoothing: f64,

    reliability: Reliability,
    radius: RadiusDistribution,
    blackout_area: Vec<AgentId>,
    rng: StdRng,

    demand_window: RunningMax,
    outflow_window: WindowedAggregator,
    price_window: WindowedAggregator,

    tick: u64,
    bought: f64,
    sold: f64,
    debit: f64,
    credit: f64,
    load_factor: f64,
    load_factor_history: Option<f64>,
}

impl Grid {
    /// Creates a grid.
    ///
    /// # Arguments
    ///
    /// * `price_model` - Source of the base price
    /// * `spread` - Relative price adjustment around the base price
    /// * `radius` - Distribution of blackout radii in network hops
    /// * `reliability` - Operational model; a failure starts a blackout
    /// * `ctx` - Run parameters (window sizes, buy-back cap, smoothing)
    /// * `seed` - Seed for epicenter and radius draws
    pub fn new(
        price_model: Model,
        spread: f64,
        radius: RadiusDistribution,
        reliability: Reliability,
        ctx: &SimulationContext,
        seed: u64,
    ) -> Self {
        Self {
            price_model,
            spread,
            buy_back_cap: ctx.hourly_grid_buy_back,
            load_factor_smoothing: ctx.load_factor_smoothing,
            reliability,
            radius,
            blackout_area: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            demand_window: RunningMax::adjusted(ctx.window_size, ctx.period, f64::abs),
            outflow_window: WindowedAggregator::new(ctx.window_size, ctx.period),
            price_window: WindowedAggregator::new(ctx.window_size, ctx.period),
            tick: 0,
            bought: 0.0,
            sold: 0.0,
            debit: 0.0,
            credit: 0.0,
            load_factor: 1.0,
            load_factor_history: None,
        }
    }

    /// Starts a tick: advances price and reliability, starts or ends a
    /// blackout and clears the per-tick accounts.
    ///
    /// # Returns
    ///
    /// The blackout transition that happened, if any.
    pub fn initialize(
        &mut self,
        tick: u64,
        agents: &mut [Agent],
        network: &Network,
    ) -> Option<BlackoutEvent> {
        self.tick = tick;
        self.price_model.advance(tick);
        self.reliability.advance();

        let event = if !self.blackout_area.is_empty() && self.reliability.is_operational() {
            for &id in &self.blackout_area {
                agents[id].reconnect_to_grid();
            }
            let restored = self.blackout_area.len();
            self.blackout_area.clear();
            info!(tick, restored, "grid restored");
            Some(BlackoutEvent::Ended { restored })
        } else if self.blackout_area.is_empty()
            && !self.reliability.is_operational()
            && !agents.is_empty()
        {
            Some(self.start_blackout(tick, agents, network))
        } else {
            None
        };

        self.debit = 0.0;
        self.credit = 0.0;
        self.bought = 0.0;
        self.sold = 0.0;
        event
    }

    fn start_blackout(&mut self, tick: u64, agents: &mut [Agent], network: &Network) -> BlackoutEvent {
        let epicenter = self.rng.random_range(0..agents.len());
        let radius = self.radius.sample(&mut self.rng);
        let affected: Vec<AgentId> = network
            .ball(epicenter, radius)
            .into_iter()
            .filter(|&id| agents[id].is_connected_to_grid())
            .collect();
        for &id in &affected {
            agents[id].disconnect_from_grid();
        }
        self.blackout_area.clone_from(&affected);
        info!(tick, epicenter, radius, affected = affected.len(), "blackout started");
        BlackoutEvent::Started {
            epicenter,
            radius,
            affected,
        }
    }

    /// Ends a tick: records demand, outflow and price, then updates the load
    /// factor.
    pub fn finalize(&mut self) {
        let tick = self.tick;
        self.demand_window.add(tick, self.current_demand());
        self.outflow_window.add(tick, self.sold);
        self.price_window.add(tick, self.base_price());

        let max = self.demand_window.recent_max();
        let mean = self.demand_window.recent_mean();
        self.load_factor = if max == 0.0 { 1.0 } else { (mean / max).abs() };
        self.load_factor_history = Some(exponential_average(
            self.load_factor_history,
            self.load_factor,
            self.load_factor_smoothing,
        ));
        debug!(
            tick,
            demand = self.current_demand(),
            load_factor = self.load_factor,
            "grid finalized"
        );
    }

    /// Delivers `power` to an agent. Never limited.
    pub fn buy_from_grid(&mut self, power: f64) -> f64 {
        let power = power.max(0.0);
        self.sold += power;
        self.credit += self.selling_value(power);
        power
    }

    /// How much of `power` the grid would buy back right now.
    pub fn sell_to_grid_availability(&self, power: f64) -> f64 {
        let predicted = self.predicted_outflow();
        if power <= 0.0 || self.bought >= self.buy_back_cap || self.bought >= predicted {
            return 0.0;
        }
        power
            .min(self.buy_back_cap - self.bought)
            .min(predicted - self.bought)
    }

    /// Takes up to `power` from an agent and returns the accepted amount.
    pub fn sell_to_grid(&mut self, power: f64) -> f64 {
        let accepted = self.sell_to_grid_availability(power);
        self.bought += accepted;
        self.debit += self.buying_value(accepted);
        accepted
    }

    pub fn is_operational(&self) -> bool {
        self.reliability.is_operational()
    }

    pub fn blackout_area(&self) -> &[AgentId] {
        &self.blackout_area
    }

    pub fn base_price(&self) -> f64 {
        self.price_model.current_value()
    }

    /// Price at which the grid buys from agents.
    pub fn buying_price(&self) -> f64 {
        self.base_price() * (1.0 - self.spread)
    }

    /// Price at which the grid sells to agents.
    pub fn selling_price(&self) -> f64 {
        self.base_price() * (1.0 + self.spread)
    }

    pub fn base_value(&self, power: f64) -> f64 {
        power * self.base_price()
    }

    pub fn buying_value(&self, power: f64) -> f64 {
        power * self.buying_price()
    }

    pub fn selling_value(&self, power: f64) -> f64 {
        power * self.selling_price()
    }

    pub fn mean_base_price(&self) -> f64 {
        self.price_window.window_mean()
    }

    pub fn predicted_base_price(&self, offset: usize) -> f64 {
        self.price_window.period_mean(self.tick, offset)
    }

    /// Mean power delivered to agents at the current phase of past cycles.
    pub fn predicted_outflow(&self) -> f64 {
        self.outflow_window.period_mean(self.tick, 0)
    }

    pub fn predicted_demand(&self, offset: usize) -> f64 {
        self.demand_window.period_mean(self.tick, offset)
    }

    /// Power delivered minus power bought back during this tick.
    pub fn current_demand(&self) -> f64 {
        self.sold - self.bought
    }

    pub fn sold_power(&self) -> f64 {
        self.sold
    }

    pub fn bought_power(&self) -> f64 {
        self.bought
    }

    /// Money owed to agents for power bought back this tick.
    pub fn debit(&self) -> f64 {
        self.debit
    }

    /// Money received from agents for power delivered this tick.
    pub fn credit(&self) -> f64 {
        self.credit
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Exponentially smoothed load factor, `None` before the first tick ends.
    pub fn mean_load_factor(&self) -> Option<f64> {
        self.load_factor_history
    }

    /// Standard deviation of demand over the last period.
    pub fn demand_std_dev(&self) -> f64 {
        self.demand_window.std_dev_of_last(self.demand_window.period())
    }

    /// Sum of squared demand deviations over the last period.
    pub fn demand_variance(&self) -> f64 {
        self.demand_window.variance_of_last(self.demand_window.period())
    }

    /// Coefficient of variation of demand over the last period, 0 when the
    /// recent mean is 0.
    pub fn demand_cv(&self) -> f64 {
        let mean = self.demand_window.recent_mean().abs();
        if mean == 0.0 {
            return 0.0;
        }
        self.demand_std_dev() / mean
    }

    /// Demand standard deviation per agent over the last period.
    pub fn normalized_demand_std_dev(&self, population: usize) -> f64 {
        if population == 0 {
            return 0.0;
        }
        let scale = 1.0 / population as f64;
        self.demand_window
            .adjusted_std_dev_of_last(self.demand_window.period(), |v| v * scale)
    }

    /// Maximum absolute demand over the last period.
    pub fn peak_demand(&self) -> f64 {
        self.demand_window.recent_max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModelSpec, ReliabilitySpec};

    fn ctx() -> SimulationContext {
        let mut ctx = SimulationContext::new(2, 8, 0, 10);
        ctx.hourly_grid_buy_back = 5.0;
        ctx
    }

    fn grid(ctx: &SimulationContext) -> Grid {
        let price = Model::from_spec(&ModelSpec::constant(0.2), ctx.period, 0);
        Grid::new(
            price,
            0.1,
            RadiusDistribution::default(),
            Reliability::always_operational(),
            ctx,
            1,
        )
    }

    fn run_tick(grid: &mut Grid, tick: u64, sold: f64) {
        grid.initialize(tick, &mut [], &Network::new(0));
        grid.buy_from_grid(sold);
        grid.finalize();
    }

    #[test]
    fn prices_apply_spread() {
        let ctx = ctx();
        let mut grid = grid(&ctx);
        grid.initialize(0, &mut [], &Network::new(0));
        assert!((grid.buying_price() - 0.18).abs() < 1e-12);
        assert!((grid.selling_price() - 0.22).abs() < 1e-12);
    }

    #[test]
    fn buy_from_grid_is_unlimited_and_credited() {
        let ctx = ctx();
        let mut grid = grid(&ctx);
        grid.initialize(0, &mut [], &Network::new(0));
        assert_eq!(grid.buy_from_grid(100.0), 100.0);
        assert!((grid.credit() - 22.0).abs() < 1e-9);
    }

    #[test]
    fn buy_back_needs_outflow_history() {
        let ctx = ctx();
        let mut grid = grid(&ctx);
        grid.initialize(0, &mut [], &Network::new(0));
        assert_eq!(grid.sell_to_grid(3.0), 0.0);
    }

    #[test]
    fn buy_back_clamped_by_both_caps() {
        let ctx = ctx();
        let mut grid = grid(&ctx);
        // Phase 0 outflow history: 4, phase 1: 10.
        run_tick(&mut grid, 0, 4.0);
        run_tick(&mut grid, 1, 10.0);

        grid.initialize(2, &mut [], &Network::new(0));
        assert_eq!(grid.predicted_outflow(), 4.0);
        assert_eq!(grid.sell_to_grid(3.0), 3.0);
        assert_eq!(grid.sell_to_grid(3.0), 1.0);
        assert_eq!(grid.sell_to_grid(3.0), 0.0);
        assert!((grid.debit() - 4.0 * 0.18).abs() < 1e-12);

        grid.finalize();
        grid.initialize(3, &mut [], &Network::new(0));
        assert_eq!(grid.sell_to_grid(8.0), 5.0);
        assert_eq!(grid.sell_to_grid(1.0), 0.0);
    }

    #[test]
    fn load_factor_is_one_without_demand() {
        let ctx = ctx();
        let mut grid = grid(&ctx);
        run_tick(&mut grid, 0, 0.0);
        assert_eq!(grid.load_factor(), 1.0);
        assert_eq!(grid.mean_load_factor(), Some(1.0));
    }

    #[test]
    fn load_factor_tracks_recent_demand() {
        let ctx = ctx();
        let mut grid = grid(&ctx);
        run_tick(&mut grid, 0, 2.0);
        run_tick(&mut grid, 1, 4.0);
        // recent mean 3, recent max 4
        assert!((grid.load_factor() - 0.75).abs() < 1e-12);
        assert!((grid.mean_load_factor().unwrap_or_default() - 0.875).abs() < 1e-12);
        assert_eq!(grid.peak_demand(), 4.0);
    }

    #[test]
    fn failing_grid_without_agents_does_not_panic() {
        let ctx = ctx();
        let price = Model::from_spec(&ModelSpec::constant(0.2), ctx.period, 0);
        let spec = ReliabilitySpec {
            failure_probability: 1.0,
            recovery_probability: 0.0,
        };
        let mut grid = Grid::new(
            price,
            0.0,
            RadiusDistribution::default(),
            Reliability::new(&spec, 0),
            &ctx,
            0,
        );
        assert_eq!(grid.initialize(0, &mut [], &Network::new(0)), None);
        assert!(!grid.is_operational());
    }
}
