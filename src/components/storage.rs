/// A lossless energy store owned by a single agent.
///
/// `Storage` tracks the power it holds plus how much was added and removed
/// during the current tick. Requests never fail: [`energize`](Self::energize)
/// and [`draw`](Self::draw) accept as much as capacity, stored power and the
/// optional per-tick rate limit allow, and return the accepted amount.
#[derive(Debug, Clone)]
pub struct Storage {
    /// Maximum power the store can hold.
    pub capacity: f64,

    /// Cost per unit of capacity, charged every tick.
    pub cost_factor: f64,

    /// Maximum power moved in either direction during one tick.
    pub max_rate: Option<f64>,

    current: f64,
    added: f64,
    removed: f64,
}

impl Storage {
    /// Creates a new store.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum stored power (must be >= 0)
    /// * `initial` - Stored power at tick 0, within `[0, capacity]`
    /// * `cost_factor` - Cost per unit of capacity per tick
    /// * `max_rate` - Optional per-tick limit on charging and on discharging
    ///
    /// # Panics
    ///
    /// Panics if capacity is negative, `initial` is outside `[0, capacity]`
    /// or `max_rate` is negative.
    pub fn new(capacity: f64, initial: f64, cost_factor: f64, max_rate: Option<f64>) -> Self {
        assert!(capacity >= 0.0, "storage capacity must be >= 0");
        assert!(
            (0.0..=capacity).contains(&initial),
            "initial charge must be within [0, capacity]"
        );
        assert!(max_rate.is_none_or(|r| r >= 0.0), "max_rate must be >= 0");

        Self {
            capacity,
            cost_factor,
            max_rate,
            current: initial,
            added: 0.0,
            removed: 0.0,
        }
    }

    /// A store that can hold nothing.
    pub fn empty() -> Self {
        Self::new(0.0, 0.0, 0.0, None)
    }

    /// Clears the per-tick counters.
    pub fn begin_tick(&mut self) {
        self.added = 0.0;
        self.removed = 0.0;
    }

    /// Stores up to `power` and returns how much was accepted.
    pub fn energize(&mut self, power: f64) -> f64 {
        if power <= 0.0 {
            return 0.0;
        }
        let headroom = self.max_rate.map_or(f64::INFINITY, |r| (r - self.added).max(0.0));
        let accepted = power.min(self.available_capacity()).min(headroom);
        self.current += accepted;
        self.added += accepted;
        accepted
    }

    /// Removes up to `power` and returns how much was delivered.
    pub fn draw(&mut self, power: f64) -> f64 {
        if power <= 0.0 {
            return 0.0;
        }
        let delivered = power.min(self.deliverable());
        self.current -= delivered;
        self.removed += delivered;
        delivered
    }

    /// Power that could still be delivered this tick.
    pub fn deliverable(&self) -> f64 {
        let headroom = self.max_rate.map_or(f64::INFINITY, |r| (r - self.removed).max(0.0));
        self.current.min(headroom)
    }

    /// Free capacity.
    pub fn available_capacity(&self) -> f64 {
        (self.capacity - self.current).max(0.0)
    }

    /// Power currently held.
    pub fn current_power(&self) -> f64 {
        self.current
    }

    /// Power added during the current tick.
    pub fn added(&self) -> f64 {
        self.added
    }

    /// Power removed during the current tick.
    pub fn removed(&self) -> f64 {
        self.removed
    }

    /// Holding cost for one tick.
    pub fn cost(&self) -> f64 {
        self.cost_factor * self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_storage() {
        let storage = Storage::new(10.0, 4.0, 0.1, None);
        assert_eq!(storage.capacity, 10.0);
        assert_eq!(storage.current_power(), 4.0);
        assert_eq!(storage.available_capacity(), 6.0);
        assert!((storage.cost() - 1.0).abs() < 1e-12);
    }

    #[test]
    #[should_panic]
    fn test_initial_above_capacity_panics() {
        Storage::new(5.0, 6.0, 0.0, None);
    }

    #[test]
    fn test_energize_clamps_to_capacity() {
        let mut storage = Storage::new(10.0, 8.0, 0.0, None);
        assert_eq!(storage.energize(5.0), 2.0);
        assert_eq!(storage.current_power(), 10.0);
        assert_eq!(storage.energize(1.0), 0.0);
        assert_eq!(storage.added(), 2.0);
    }

    #[test]
    fn test_draw_clamps_to_stored() {
        let mut storage = Storage::new(10.0, 3.0, 0.0, None);
        assert_eq!(storage.draw(5.0), 3.0);
        assert_eq!(storage.current_power(), 0.0);
        assert_eq!(storage.draw(1.0), 0.0);
        assert_eq!(storage.removed(), 3.0);
    }

    #[test]
    fn test_negative_requests_are_ignored() {
        let mut storage = Storage::new(10.0, 5.0, 0.0, None);
        assert_eq!(storage.energize(-1.0), 0.0);
        assert_eq!(storage.draw(-1.0), 0.0);
        assert_eq!(storage.current_power(), 5.0);
    }

    #[test]
    fn test_rate_limit_per_tick() {
        let mut storage = Storage::new(10.0, 5.0, 0.0, Some(2.0));
        assert_eq!(storage.draw(1.5), 1.5);
        assert_eq!(storage.draw(1.5), 0.5);
        assert_eq!(storage.deliverable(), 0.0);
        assert_eq!(storage.energize(3.0), 2.0);

        storage.begin_tick();
        assert_eq!(storage.added(), 0.0);
        assert_eq!(storage.removed(), 0.0);
        assert_eq!(storage.draw(3.0), 2.0);
    }

    #[test]
    fn test_empty_storage() {
        let mut storage = Storage::empty();
        assert_eq!(storage.energize(1.0), 0.0);
        assert_eq!(storage.draw(1.0), 0.0);
    }
}
