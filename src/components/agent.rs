//! Household agent: per-tick energy balancing and peer trading.
//!
//! Each tick an agent runs three phases. [`Agent::initialize`] samples its
//! models and rebuilds its [`DecisionCache`]; [`Agent::execute`] allocates
//! the tick's deficit or surplus across generation, storage, the grid and its
//! neighbors; [`Agent::finalize`] commits suspended load and records history.

use std::cmp::Ordering;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::trace;

use super::grid::Grid;
use super::network::{AgentId, Network};
use super::storage::Storage;
use crate::models::{Model, RandomModel, Reliability};
use crate::sim::context::SimulationContext;
use crate::stats::{
    Orientation, PeriodicMinMax, RunningMax, WindowedAggregator, dynamic_area,
    exponential_average, global_area, local_area, unit_ratio,
};

/// Scheduler phase an agent last entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Exec,
    Fin,
}

/// Neighbor entry with the trust this agent places in it.
///
/// Trust is the smoothed ratio of power received to power requested. It only
/// decides the order in which neighbors are asked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: AgentId,
    pub trust: f64,
}

/// Construction parameters for an [`Agent`].
#[derive(Debug, Clone)]
pub struct AgentParams {
    /// Name of the group the agent was generated from.
    pub group: String,
    pub load: Model,
    pub generation: Model,
    /// Fraction of the load that may be postponed, clamped to `[0, 1]`.
    pub suspendable: Model,
    pub storage: Storage,
    pub reliability: Reliability,
    /// Number of ticks ahead considered by the area forecasts.
    pub foresight: usize,
    pub smart: bool,
}

/// Forecast-derived quantities computed once per tick at initialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionCache {
    /// Mean deficit over the history window.
    pub mean_deficit: f64,
    pub local_under_deficit: f64,
    pub local_over_deficit: f64,
    pub global_under_deficit: f64,
    pub global_over_deficit: f64,
    pub dynamic_under_deficit: f64,
    pub dynamic_over_deficit: f64,
    pub local_under_request: f64,
    pub local_over_request: f64,
    /// Neighborhood request expected at the current phase.
    pub predicted_request: f64,
    /// Mean neighborhood request over the history window.
    pub mean_request: f64,
    /// Maximum power to sell to neighbors this tick.
    pub sale_ration: f64,
    /// Indices into the neighbor list; visited from the back.
    pub order: Vec<usize>,
}

/// Per-tick counters, all zero at the start of a tick.
#[derive(Debug, Clone, Copy, Default)]
struct TickState {
    satisfied_load: f64,
    spent_generation: f64,
    added_suspension: f64,
    removed_suspension: f64,
    forced_suspension: f64,
    bought_from_grid: f64,
    bought_from_neighbors: f64,
    sold_to_grid: f64,
    sold_to_neighbors: f64,
    neighborhood_request: f64,
    dumped: f64,
    debit_to_grid: f64,
    debit_to_neighbors: f64,
    credit_from_grid: f64,
    credit_from_neighbors: f64,
    storage_cost: f64,
    generation_cost: f64,
}

/// The ten deficit regimes, named by where the current deficit lies
/// relative to zero and to the mean deficit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regime {
    /// `0 < mean == deficit`
    DeficitAtMean,
    /// `0 < mean < deficit`
    DeficitAboveMean,
    /// `0 < deficit < mean`
    DeficitBelowMean,
    /// `deficit == 0 < mean`
    BalancedBelowMean,
    /// `deficit < 0 < mean`
    SurplusBelowPositiveMean,
    /// `deficit == mean <= 0`
    SurplusAtMean,
    /// `deficit < mean <= 0`
    SurplusBeyondMean,
    /// `mean < deficit < 0`
    SurplusWithinMean,
    /// `mean < deficit == 0`
    BalancedAboveMean,
    /// `mean <= 0 < deficit`
    DeficitAboveNegativeMean,
}

impl Regime {
    fn classify(mean: f64, deficit: f64) -> Self {
        if mean > 0.0 {
            if deficit == mean {
                Regime::DeficitAtMean
            } else if deficit > mean {
                Regime::DeficitAboveMean
            } else if deficit > 0.0 {
                Regime::DeficitBelowMean
            } else if deficit == 0.0 {
                Regime::BalancedBelowMean
            } else {
                Regime::SurplusBelowPositiveMean
            }
        } else if deficit == mean {
            Regime::SurplusAtMean
        } else if deficit < mean {
            Regime::SurplusBeyondMean
        } else if deficit < 0.0 {
            Regime::SurplusWithinMean
        } else if deficit == 0.0 {
            Regime::BalancedAboveMean
        } else {
            Regime::DeficitAboveNegativeMean
        }
    }
}

/// Mutable view of every agent except the one currently executing.
pub struct Peers<'a> {
    before: &'a mut [Agent],
    after: &'a mut [Agent],
}

impl<'a> Peers<'a> {
    /// Splits `agents` into the agent at `index` and a view of the rest.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn split(agents: &'a mut [Agent], index: usize) -> (&'a mut Agent, Peers<'a>) {
        let len = agents.len();
        let (before, rest) = agents.split_at_mut(index);
        match rest.split_first_mut() {
            Some((agent, after)) => (agent, Peers { before, after }),
            None => panic!("agent index {index} out of range for population of {len}"),
        }
    }

    /// The agent with `id`, or `None` for the executing agent itself.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        let split = self.before.len();
        match id.cmp(&split) {
            Ordering::Less => self.before.get_mut(id),
            Ordering::Equal => None,
            Ordering::Greater => self.after.get_mut(id - split - 1),
        }
    }
}

/// An autonomous household balancing load against generation, storage, the
/// grid and its neighbors.
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    group: String,
    smart: bool,
    phase: Option<Phase>,
    tick: u64,

    load_model: Model,
    generation_model: Model,
    suspendable_model: Model,
    reliability: Reliability,
    storage: Storage,
    foresight: usize,
    rng: StdRng,

    demand_window: RunningMax,
    deficit_window: WindowedAggregator,
    request_window: PeriodicMinMax,

    neighbors: Vec<Neighbor>,
    connected: bool,
    suspended_load: f64,
    state: TickState,
    cache: DecisionCache,
}

impl Agent {
    /// Creates an agent connected to the grid with no neighbors.
    ///
    /// `seed` drives the agent's own neighbor shuffling.
    pub fn new(id: AgentId, params: AgentParams, ctx: &SimulationContext, seed: u64) -> Self {
        Self {
            id,
            group: params.group,
            smart: params.smart,
            phase: None,
            tick: 0,
            load_model: params.load,
            generation_model: params.generation,
            suspendable_model: params.suspendable,
            reliability: params.reliability,
            storage: params.storage,
            foresight: params.foresight,
            rng: StdRng::seed_from_u64(seed),
            demand_window: RunningMax::adjusted(ctx.window_size, ctx.period, f64::abs),
            deficit_window: WindowedAggregator::new(ctx.window_size, ctx.period),
            request_window: PeriodicMinMax::new(ctx.window_size, ctx.period),
            neighbors: Vec::new(),
            connected: true,
            suspended_load: 0.0,
            state: TickState::default(),
            cache: DecisionCache::default(),
        }
    }

    /// Replaces the neighbor list with `ids`, each starting at zero trust.
    pub fn set_neighbors(&mut self, ids: &[AgentId]) {
        self.neighbors = ids.iter().map(|&id| Neighbor { id, trust: 0.0 }).collect();
        self.cache.order = (0..self.neighbors.len()).collect();
    }

    /// Starts a tick.
    pub fn initialize(&mut self, tick: u64, ctx: &SimulationContext) {
        debug_assert!(
            matches!(self.phase, None | Some(Phase::Fin)),
            "agent {} initialized out of order",
            self.id
        );
        self.phase = Some(Phase::Init);
        self.tick = tick;

        self.load_model.advance(tick);
        self.generation_model.advance(tick);
        self.suspendable_model.advance(tick);
        self.reliability.advance();
        self.storage.begin_tick();

        self.state = TickState {
            storage_cost: self.storage.cost(),
            generation_cost: self.generation_model.cost_factor()
                * self.generation_model.current_value(),
            ..TickState::default()
        };

        self.deficit_window.add(tick, self.deficit());
        self.cache = self.build_cache(ctx);
    }

    fn build_cache(&mut self, ctx: &SimulationContext) -> DecisionCache {
        let tick = self.tick;
        let foresight = self.foresight;
        let deficit = self.deficit();
        let deficits = &self.deficit_window;
        let requests = &self.request_window;

        let mean_deficit = deficits.window_mean();
        let predict_deficit = |k: usize| {
            if k == 0 {
                deficit
            } else {
                deficits.period_mean(tick, k)
            }
        };
        let predict_request = |k: usize| requests.period_mean(tick, k);

        let mean_request = requests.window_mean();
        let predicted_request = requests.period_mean(tick, 0);

        let local_over_deficit =
            local_area(foresight, Orientation::Over, mean_deficit, predict_deficit);
        let local_over_request =
            local_area(foresight, Orientation::Over, mean_request, predict_request);
        let sale_ration = unit_ratio(
            self.storage.current_power() - local_over_deficit,
            local_over_request,
        ) * (predicted_request - requests.period_min()).max(0.0);

        let mut order = std::mem::take(&mut self.cache.order);
        if order.len() != self.neighbors.len() {
            order = (0..self.neighbors.len()).collect();
        }
        if ctx.policy.order_neighbors {
            let neighbors = &self.neighbors;
            order.sort_by(|&a, &b| neighbors[a].trust.total_cmp(&neighbors[b].trust));
        } else {
            order.shuffle(&mut self.rng);
        }

        DecisionCache {
            mean_deficit,
            local_under_deficit: local_area(
                foresight,
                Orientation::Under,
                mean_deficit,
                predict_deficit,
            ),
            local_over_deficit,
            global_under_deficit: global_area(
                foresight,
                Orientation::Under,
                mean_deficit,
                predict_deficit,
            ),
            global_over_deficit: global_area(
                foresight,
                Orientation::Over,
                mean_deficit,
                predict_deficit,
            ),
            dynamic_under_deficit: dynamic_area(
                foresight,
                Orientation::Under,
                mean_deficit,
                predict_deficit,
            ),
            dynamic_over_deficit: dynamic_area(
                foresight,
                Orientation::Over,
                mean_deficit,
                predict_deficit,
            ),
            local_under_request: local_area(
                foresight,
                Orientation::Under,
                mean_request,
                predict_request,
            ),
            local_over_request,
            predicted_request,
            mean_request,
            sale_ration,
            order,
        }
    }

    /// Balances this tick's load and generation.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Run parameters and policy switches
    /// * `grid` - The grid to buy from and sell to
    /// * `network` - Topology; trade edges are updated on neighbor sales
    /// * `peers` - Every other agent, for neighbor trading
    pub fn execute(
        &mut self,
        ctx: &SimulationContext,
        grid: &mut Grid,
        network: &mut Network,
        peers: &mut Peers<'_>,
    ) {
        debug_assert_eq!(
            self.phase,
            Some(Phase::Init),
            "agent {} executed out of order",
            self.id
        );
        self.phase = Some(Phase::Exec);

        let r = self.remaining_generation();
        let used = self.satisfy_load(r);
        self.spend_generation(used);

        let deficit = self.deficit();
        let mean = self.cache.mean_deficit;
        let power = mean - deficit;
        let regime = Regime::classify(mean, deficit);

        match regime {
            Regime::DeficitAtMean | Regime::DeficitAboveMean => {
                let p = self.satisfy_load(self.grid_availability(mean));
                self.buy_from_grid(grid, p);
                if regime == Regime::DeficitAboveMean {
                    let ration = unit_ratio(self.storage.current_power(), self.cache.local_over_deficit)
                        * self.unsatisfied_load();
                    let p = self.satisfy_load(self.storage_availability(ration));
                    self.storage.draw(p);
                }
            }
            Regime::DeficitBelowMean => {
                let p = self.buy_from_grid(grid, self.unsatisfied_load());
                self.satisfy_load(p);
                self.recover_and_charge_from_grid(grid, power);
            }
            Regime::BalancedBelowMean | Regime::SurplusBelowPositiveMean => {
                let p = self.satisfy_suspended_load(self.remaining_generation());
                self.spend_generation(p);
                self.recover_and_charge_from_grid(grid, power);
                if ctx.policy.force_dumping {
                    self.dump_remaining_generation();
                }
            }
            Regime::SurplusAtMean | Regime::SurplusBeyondMean => {
                let p = self.sell_to_grid(grid, self.generation_availability(-mean));
                self.spend_generation(p);
                if regime == Regime::SurplusBeyondMean {
                    self.recover_and_charge_from_generation(power);
                    if ctx.policy.force_dumping {
                        self.dump_remaining_generation();
                    }
                }
            }
            Regime::SurplusWithinMean => {
                let p = self.sell_to_grid(grid, self.remaining_generation());
                self.spend_generation(p);
                let ration = -unit_ratio(self.storage.current_power(), self.cache.local_over_deficit)
                    * power;
                let p = self.sell_to_grid(grid, self.storage_availability(ration));
                self.storage.draw(p);
            }
            Regime::BalancedAboveMean | Regime::DeficitAboveNegativeMean => {
                let mut ration =
                    -unit_ratio(self.storage.current_power(), self.cache.local_over_deficit) * power;
                let p = self.satisfy_load(self.storage_availability(ration));
                ration -= self.storage.draw(p);
                let p = self.sell_to_grid(grid, self.storage_availability(ration));
                self.storage.draw(p);
            }
        }

        self.stock_up_for_neighbors(ctx, grid);

        // Residual load.
        let p = self.buy_from_neighbors(self.unsatisfied_load(), ctx, grid, network, peers);
        self.satisfy_load(p);
        self.suspend_load(self.unsatisfied_load(), ctx);
        let p = self.buy_from_grid(grid, self.unsatisfied_load());
        self.satisfy_load(p);
        let p = self.storage.draw(self.unsatisfied_load());
        self.satisfy_load(p);

        // Residual generation.
        let p = self.satisfy_suspended_load(self.remaining_generation());
        self.spend_generation(p);
        if ctx.policy.be_generation_scrooge {
            let p = self.storage.energize(self.remaining_generation());
            self.spend_generation(p);
        }
        let p = self.sell_to_grid(grid, self.remaining_generation());
        self.spend_generation(p);
        self.dump_remaining_generation();

        self.forcefully_suspend_load(self.unsatisfied_load());
    }

    /// Ends a tick: commits the suspended load and records demand and
    /// neighborhood request history.
    pub fn finalize(&mut self) {
        debug_assert_eq!(
            self.phase,
            Some(Phase::Exec),
            "agent {} finalized out of order",
            self.id
        );
        self.phase = Some(Phase::Fin);

        self.suspended_load = self.current_suspended_load();
        self.demand_window.add(self.tick, self.current_demand());
        self.request_window
            .add(self.tick, self.state.neighborhood_request);
    }

    // Regime building blocks

    fn recover_and_charge_from_grid(&mut self, grid: &mut Grid, power: f64) {
        let (recovery_ration, storage_share) = self.recovery_shares(power);
        let p = self.satisfy_suspended_load(self.grid_availability(recovery_ration));
        let recovered = self.buy_from_grid(grid, p);
        let ration = self.charge_ration(storage_share, power - recovered);
        let p = self.storage.energize(self.grid_availability(ration));
        self.buy_from_grid(grid, p);
    }

    fn recover_and_charge_from_generation(&mut self, power: f64) {
        let (recovery_ration, storage_share) = self.recovery_shares(power);
        let p = self.satisfy_suspended_load(self.generation_availability(recovery_ration));
        let recovered = self.spend_generation(p);
        let ration = self.charge_ration(storage_share, power - recovered);
        let p = self.storage.energize(self.generation_availability(ration));
        self.spend_generation(p);
    }

    /// Share of `power` spent recovering suspended load, and the part of the
    /// under-mean deficit area left for storage.
    fn recovery_shares(&self, power: f64) -> (f64, f64) {
        let area = self.cache.local_under_deficit;
        let suspended = self.current_suspended_load();
        (
            unit_ratio(suspended, area) * power,
            (area - suspended).max(0.0),
        )
    }

    fn charge_ration(&self, storage_share: f64, power: f64) -> f64 {
        if storage_share > 0.0 {
            unit_ratio(self.storage.available_capacity(), storage_share) * power
        } else {
            0.0
        }
    }

    /// Charges storage ahead of expected neighbor requests when the
    /// neighborhood currently asks for less than usual.
    fn stock_up_for_neighbors(&mut self, ctx: &SimulationContext, grid: &mut Grid) {
        let free = self.storage.available_capacity();
        let cache = &self.cache;
        if !ctx.policy.can_trade
            || free <= cache.local_under_deficit
            || cache.mean_request <= cache.predicted_request
        {
            return;
        }
        let request = cache.mean_request - cache.predicted_request;
        let mut ration =
            unit_ratio(free - cache.local_under_deficit, cache.local_under_request) * request;

        let p = self.storage.energize(self.generation_availability(ration));
        ration -= self.spend_generation(p);
        let p = self.storage.energize(self.grid_availability(ration));
        self.buy_from_grid(grid, p);
    }

    fn dump_remaining_generation(&mut self) {
        let p = self.remaining_generation().max(0.0);
        self.state.dumped += p;
        self.spend_generation(p);
    }

    // Load bookkeeping

    fn satisfy_load(&mut self, power: f64) -> f64 {
        let used = power.max(0.0).min(self.unsatisfied_load());
        self.state.satisfied_load += used;
        used
    }

    fn satisfy_suspended_load(&mut self, power: f64) -> f64 {
        let used = power.max(0.0).min(self.current_suspended_load());
        self.state.removed_suspension += used;
        used
    }

    fn suspend_load(&mut self, power: f64, ctx: &SimulationContext) -> f64 {
        if !ctx.policy.can_suspend_load {
            return 0.0;
        }
        let power = power.min(self.remaining_suspendable_load(ctx));
        let load = self.satisfy_load(power);
        self.state.added_suspension += load;
        load
    }

    fn forcefully_suspend_load(&mut self, power: f64) -> f64 {
        let load = self.satisfy_load(power);
        self.state.added_suspension += load;
        self.state.forced_suspension += load;
        load
    }

    fn generation_availability(&self, power: f64) -> f64 {
        power.min(self.remaining_generation())
    }

    fn spend_generation(&mut self, power: f64) -> f64 {
        let used = power.max(0.0).min(self.remaining_generation());
        self.state.spent_generation += used;
        used
    }

    fn storage_availability(&self, power: f64) -> f64 {
        power.min(self.storage.deliverable())
    }

    // Grid exchange

    fn grid_availability(&self, power: f64) -> f64 {
        if self.connected { power } else { 0.0 }
    }

    fn buy_from_grid(&mut self, grid: &mut Grid, power: f64) -> f64 {
        if !self.connected || power <= 0.0 {
            return 0.0;
        }
        let bought = grid.buy_from_grid(power);
        self.state.bought_from_grid += bought;
        self.state.debit_to_grid += grid.selling_value(bought);
        bought
    }

    fn sell_to_grid(&mut self, grid: &mut Grid, power: f64) -> f64 {
        if !self.connected {
            return 0.0;
        }
        let sold = grid.sell_to_grid(power);
        self.state.sold_to_grid += sold;
        self.state.credit_from_grid += grid.buying_value(sold);
        sold
    }

    // Neighbor trading

    fn buy_from_neighbors(
        &mut self,
        request: f64,
        ctx: &SimulationContext,
        grid: &Grid,
        network: &mut Network,
        peers: &mut Peers<'_>,
    ) -> f64 {
        if !ctx.policy.can_trade || request <= 0.0 {
            return 0.0;
        }
        let mut remaining = request;
        let mut received = 0.0;
        for k in (0..self.cache.order.len()).rev() {
            if remaining <= 0.0 {
                break;
            }
            let index = self.cache.order[k];
            let neighbor = &mut self.neighbors[index];
            let Some(seller) = peers.get_mut(neighbor.id) else {
                continue;
            };
            let power = seller.request_to_buy(self.id, remaining, ctx, grid, network);
            neighbor.trust = exponential_average(
                Some(neighbor.trust),
                power / remaining,
                ctx.trust_smoothing,
            );
            remaining -= power;
            received += power;
        }

        self.state.bought_from_neighbors += received;
        self.state.debit_to_neighbors = grid.base_value(self.state.bought_from_neighbors);
        received
    }

    /// Power this agent would sell to a neighbor right now.
    fn selling_availability(&self, ctx: &SimulationContext) -> f64 {
        let cache = &self.cache;
        if !self.reliability.is_operational()
            || !ctx.policy.can_trade
            || self.storage.current_power() <= cache.local_over_deficit
            || cache.mean_request >= cache.predicted_request
            || self.state.sold_to_neighbors >= cache.sale_ration
        {
            return 0.0;
        }
        self.storage_availability(cache.sale_ration - self.state.sold_to_neighbors)
    }

    /// Handles a neighbor's request and returns the power delivered.
    fn request_to_buy(
        &mut self,
        buyer: AgentId,
        request: f64,
        ctx: &SimulationContext,
        grid: &Grid,
        network: &mut Network,
    ) -> f64 {
        let offer = self.selling_availability(ctx).min(request);
        let power = self.storage.draw(offer);

        self.state.neighborhood_request += request;
        self.state.sold_to_neighbors += power;
        self.state.credit_from_neighbors = grid.base_value(self.state.sold_to_neighbors);
        if power > 0.0 {
            network.record_trade(self.id, buyer, power);
            trace!(seller = self.id, buyer, power, "neighbor trade");
        }
        power
    }

    // Grid connectivity

    pub fn reconnect_to_grid(&mut self) {
        self.connected = true;
    }

    pub fn disconnect_from_grid(&mut self) {
        self.connected = false;
    }

    pub fn is_connected_to_grid(&self) -> bool {
        self.connected
    }

    // Identity and structure

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn is_smart(&self) -> bool {
        self.smart
    }

    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn neighbors(&self) -> &[Neighbor] {
        &self.neighbors
    }

    /// Trust placed in neighbor `id`, if it is a neighbor.
    pub fn trust_in(&self, id: AgentId) -> Option<f64> {
        self.neighbors.iter().find(|n| n.id == id).map(|n| n.trust)
    }

    pub fn decision_cache(&self) -> &DecisionCache {
        &self.cache
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn is_operational(&self) -> bool {
        self.reliability.is_operational()
    }

    // Load and generation

    pub fn load(&self) -> f64 {
        self.load_model.current_value()
    }

    pub fn generation(&self) -> f64 {
        self.generation_model.current_value()
    }

    /// Load minus generation as sampled for this tick.
    pub fn deficit(&self) -> f64 {
        self.load() - self.generation()
    }

    pub fn mean_load_seed(&self) -> f64 {
        self.load_model.mean_seed_value()
    }

    /// Deficit expected `offset` ticks ahead; offset 0 is the current deficit.
    pub fn predicted_deficit(&self, offset: usize) -> f64 {
        if offset == 0 {
            self.deficit()
        } else {
            self.deficit_window.period_mean(self.tick, offset)
        }
    }

    pub fn satisfied_load(&self) -> f64 {
        self.state.satisfied_load
    }

    pub fn unsatisfied_load(&self) -> f64 {
        self.load() - self.state.satisfied_load
    }

    pub fn spent_generation(&self) -> f64 {
        self.state.spent_generation
    }

    pub fn remaining_generation(&self) -> f64 {
        self.generation() - self.state.spent_generation
    }

    // Suspension

    pub fn suspendable_load(&self, ctx: &SimulationContext) -> f64 {
        if ctx.policy.can_suspend_load {
            self.suspendable_model.current_value().clamp(0.0, 1.0) * self.load()
        } else {
            0.0
        }
    }

    pub fn remaining_suspendable_load(&self, ctx: &SimulationContext) -> f64 {
        self.suspendable_load(ctx) - self.change_in_suspension()
    }

    /// Suspended load committed at the end of the previous tick.
    pub fn suspended_load(&self) -> f64 {
        self.suspended_load
    }

    pub fn current_suspended_load(&self) -> f64 {
        self.suspended_load + self.change_in_suspension()
    }

    pub fn change_in_suspension(&self) -> f64 {
        self.state.added_suspension - self.state.removed_suspension
    }

    pub fn added_suspension(&self) -> f64 {
        self.state.added_suspension
    }

    pub fn removed_suspension(&self) -> f64 {
        self.state.removed_suspension
    }

    pub fn forced_suspension(&self) -> f64 {
        self.state.forced_suspension
    }

    pub fn dumped_power(&self) -> f64 {
        self.state.dumped
    }

    // Power accounts

    pub fn bought_from_grid(&self) -> f64 {
        self.state.bought_from_grid
    }

    pub fn sold_to_grid(&self) -> f64 {
        self.state.sold_to_grid
    }

    pub fn bought_from_neighbors(&self) -> f64 {
        self.state.bought_from_neighbors
    }

    pub fn sold_to_neighbors(&self) -> f64 {
        self.state.sold_to_neighbors
    }

    /// Total power neighbors asked this agent for during the tick.
    pub fn neighborhood_request(&self) -> f64 {
        self.state.neighborhood_request
    }

    pub fn predicted_neighborhood_request(&self) -> f64 {
        self.cache.predicted_request
    }

    pub fn mean_neighborhood_request(&self) -> f64 {
        self.cache.mean_request
    }

    pub fn stored_power(&self) -> f64 {
        self.storage.current_power()
    }

    /// Grid purchases minus grid sales.
    pub fn current_demand(&self) -> f64 {
        self.state.bought_from_grid - self.state.sold_to_grid
    }

    /// Largest absolute demand over the last period.
    pub fn max_demand_of_period(&self) -> f64 {
        self.demand_window.recent_max()
    }

    /// Every unit of power that entered the agent's balance this tick.
    pub fn power_acquired(&self) -> f64 {
        self.state.spent_generation
            + self.storage.removed()
            + self.state.bought_from_grid
            + self.state.bought_from_neighbors
    }

    /// Every unit of power that left the agent's balance this tick.
    ///
    /// Suspended load is marked satisfied without consuming power, so it is
    /// subtracted; recovering suspended load does consume power.
    pub fn power_disposed(&self) -> f64 {
        (self.state.satisfied_load - self.state.added_suspension)
            + self.state.removed_suspension
            + self.storage.added()
            + self.state.sold_to_grid
            + self.state.sold_to_neighbors
            + self.state.dumped
    }

    // Monetary accounts

    pub fn debit_to_grid(&self) -> f64 {
        self.state.debit_to_grid
    }

    pub fn credit_from_grid(&self) -> f64 {
        self.state.credit_from_grid
    }

    pub fn debit_to_neighbors(&self) -> f64 {
        self.state.debit_to_neighbors
    }

    pub fn credit_from_neighbors(&self) -> f64 {
        self.state.credit_from_neighbors
    }

    pub fn storage_cost(&self) -> f64 {
        self.state.storage_cost
    }

    pub fn generation_cost(&self) -> f64 {
        self.state.generation_cost
    }

    pub fn profit_from_grid(&self) -> f64 {
        self.state.credit_from_grid - self.state.debit_to_grid
    }

    pub fn profit_from_neighbors(&self) -> f64 {
        self.state.credit_from_neighbors - self.state.debit_to_neighbors
    }

    pub fn profit(&self) -> f64 {
        self.profit_from_grid() + self.profit_from_neighbors()
            - self.state.generation_cost
            - self.state.storage_cost
    }

    /// Cost per unit of load served this tick, `None` when no load was served.
    pub fn home_electricity_rate(&self) -> Option<f64> {
        let served = self.change_in_suspension() - self.load();
        if served.abs() < 1e-9 {
            None
        } else {
            Some(self.profit() / served)
        }
    }
}
