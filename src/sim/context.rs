//! Read-only run parameters shared by every simulation entity.

/// Behavior switches applied to every agent and to the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Agents may buy from and sell to their neighbors.
    pub can_trade: bool,
    /// Agents may postpone part of their load.
    pub can_suspend_load: bool,
    /// Surplus generation is dumped in the regimes that allow it.
    pub force_dumping: bool,
    /// The run loop stops after the tick in which a blackout begins.
    pub pause_on_blackout: bool,
    /// Neighbors are visited by trust; otherwise in a shuffled order.
    pub order_neighbors: bool,
    /// Leftover generation charges storage before being sold.
    pub be_generation_scrooge: bool,
    /// Grid and agents may fail according to their reliability models.
    pub simulate_reliability: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            can_trade: true,
            can_suspend_load: true,
            force_dumping: false,
            pause_on_blackout: false,
            order_neighbors: true,
            be_generation_scrooge: false,
            simulate_reliability: false,
        }
    }
}

/// Immutable parameters of one simulation run.
///
/// Built once from the scenario configuration and passed by reference to the
/// grid and agents at every phase.
///
/// # Examples
///
/// ```
/// use microgrid_sim::sim::context::SimulationContext;
///
/// let ctx = SimulationContext::new(24, 168, 42, 48);
/// assert_eq!(ctx.phase_of(25), 1);
/// assert!(ctx.policy.can_trade);
/// ```
#[derive(Debug, Clone)]
pub struct SimulationContext {
    /// Number of ticks in one cycle (e.g. a day).
    pub period: usize,
    /// Number of samples retained by every history window.
    pub window_size: usize,
    /// Master random seed.
    pub seed: u64,
    /// The run stops before this tick.
    pub end_tick: u64,
    /// Maximum power the grid buys back from agents per tick.
    pub hourly_grid_buy_back: f64,
    /// Weight of the previous value when smoothing neighbor trust.
    pub trust_smoothing: f64,
    /// Weight of the previous value when smoothing the grid load factor.
    pub load_factor_smoothing: f64,
    pub policy: Policy,
}

impl SimulationContext {
    /// Creates a context with default policy and smoothing.
    ///
    /// # Panics
    ///
    /// Panics if `period` or `window_size` is zero.
    pub fn new(period: usize, window_size: usize, seed: u64, end_tick: u64) -> Self {
        assert!(period > 0, "period must be > 0");
        assert!(window_size > 0, "window_size must be > 0");
        Self {
            period,
            window_size,
            seed,
            end_tick,
            hourly_grid_buy_back: f64::INFINITY,
            trust_smoothing: 0.5,
            load_factor_smoothing: 0.5,
            policy: Policy::default(),
        }
    }

    /// Position of `tick` within its cycle.
    pub fn phase_of(&self, tick: u64) -> usize {
        (tick % self.period as u64) as usize
    }
}
