//! Bounded-memory rolling statistics aligned to a repeating period.

use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};
use std::ops::Deref;

/// One retained observation together with the phase it was recorded at.
#[derive(Debug, Clone, Copy)]
struct Sample {
    phase: usize,
    value: f64,
}

/// Circular window of past values with incrementally maintained aggregates.
///
/// Three sums are kept in lock-step with the buffer:
/// - `window_sum`: every retained sample,
/// - `recent_sum`: the most recent `period` samples,
/// - `periodic_sum[i]`: retained samples recorded at a tick `t` with
///   `t % period == i`.
///
/// The tick is passed explicitly to [`add`](Self::add) and
/// [`period_mean`](Self::period_mean) so that forecasts made during a tick can
/// look at same-phase history from previous cycles.
///
/// # Examples
///
/// ```
/// use microgrid_sim::stats::WindowedAggregator;
///
/// let mut window = WindowedAggregator::new(4, 2);
/// for (tick, value) in [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().enumerate() {
///     window.add(tick as u64, value);
/// }
/// // Capacity 4: the first sample has been evicted.
/// assert_eq!(window.window_mean(), 3.5);
/// // Most recent period (2 samples): 4.0 and 5.0.
/// assert_eq!(window.recent_mean(), 4.5);
/// // Tick 4 is phase 0; retained phase-0 samples are 3.0 and 5.0.
/// assert_eq!(window.period_mean(4, 0), 4.0);
/// ```
#[derive(Debug, Clone)]
pub struct WindowedAggregator {
    capacity: usize,
    period: usize,
    buffer: VecDeque<Sample>,
    window_sum: f64,
    recent_sum: f64,
    periodic_sum: Vec<f64>,
    periodic_count: Vec<usize>,
}

impl WindowedAggregator {
    /// Creates an empty aggregator.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of retained samples (must be > 0)
    /// * `period` - Cycle length used for phase alignment (must be > 0)
    ///
    /// # Panics
    ///
    /// Panics if `capacity` or `period` is zero.
    pub fn new(capacity: usize, period: usize) -> Self {
        assert!(capacity > 0, "window capacity must be > 0");
        assert!(period > 0, "period must be > 0");
        Self {
            capacity,
            period,
            buffer: VecDeque::with_capacity(capacity + 1),
            window_sum: 0.0,
            recent_sum: 0.0,
            periodic_sum: vec![0.0; period],
            periodic_count: vec![0; period],
        }
    }

    /// Appends the sample recorded at `tick`.
    pub fn add(&mut self, tick: u64, value: f64) {
        self.add_tracked(tick, value, |_| {});
    }

    /// Appends a sample and reports every value that leaves the recent window.
    ///
    /// `on_leave` is called once for the value pushed out of the most recent
    /// `period` samples by the new arrival, and once for each evicted sample
    /// that was still inside the recent window (only possible when
    /// `capacity < period`).
    fn add_tracked(&mut self, tick: u64, value: f64, mut on_leave: impl FnMut(f64)) {
        let phase = self.phase_of(tick);
        self.buffer.push_back(Sample { phase, value });
        self.periodic_sum[phase] += value;
        self.periodic_count[phase] += 1;

        let len = self.buffer.len();
        if len > self.period {
            let leaving = self.buffer[len - self.period - 1].value;
            self.recent_sum += value - leaving;
            on_leave(leaving);
        } else {
            self.recent_sum += value;
        }
        self.window_sum += value;

        while self.buffer.len() > self.capacity {
            let Some(evicted) = self.buffer.pop_front() else {
                break;
            };
            if self.buffer.len() < self.period {
                self.recent_sum -= evicted.value;
                on_leave(evicted.value);
            }
            self.periodic_sum[evicted.phase] -= evicted.value;
            self.periodic_count[evicted.phase] -= 1;
            self.window_sum -= evicted.value;
        }
    }

    fn phase_of(&self, tick: u64) -> usize {
        (tick % self.period as u64) as usize
    }

    /// Mean of every retained sample, or 0 when empty.
    pub fn window_mean(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.window_sum / self.buffer.len() as f64
        }
    }

    /// Mean of the most recent `min(period, len)` samples, or 0 when empty.
    pub fn recent_mean(&self) -> f64 {
        match self.recent_len() {
            0 => 0.0,
            n => self.recent_sum / n as f64,
        }
    }

    /// Mean of retained samples sharing the phase of `tick + offset`.
    ///
    /// Returns 0 when no sample has been observed at that phase yet.
    pub fn period_mean(&self, tick: u64, offset: usize) -> f64 {
        let index = (self.phase_of(tick) + offset % self.period) % self.period;
        match self.periodic_count[index] {
            0 => 0.0,
            n => self.periodic_sum[index] / n as f64,
        }
    }

    /// Mean of each phase that has at least one observation.
    pub(crate) fn phase_means(&self) -> impl Iterator<Item = f64> + '_ {
        self.periodic_sum
            .iter()
            .zip(&self.periodic_count)
            .filter(|(_, count)| **count > 0)
            .map(|(sum, count)| sum / *count as f64)
    }

    /// Mean of the last `size` samples, recomputed from the buffer.
    pub fn mean_of_last(&self, size: usize) -> f64 {
        let n = size.min(self.buffer.len());
        if n == 0 {
            return 0.0;
        }
        self.last(n).sum::<f64>() / n as f64
    }

    /// Sum of squared deviations from the mean over the last `size` samples.
    pub fn variance_of_last(&self, size: usize) -> f64 {
        if self.buffer.is_empty() || size == 0 {
            return 0.0;
        }
        let mean = self.mean_of_last(size);
        self.last(size).map(|v| (v - mean).powi(2)).sum()
    }

    /// Sample standard deviation of the last `size` samples.
    ///
    /// Returns 0 when fewer than two samples are available.
    pub fn std_dev_of_last(&self, size: usize) -> f64 {
        self.adjusted_std_dev_of_last(size, |v| v)
    }

    /// Sample standard deviation of `adjust(v)` over the last `size` samples,
    /// measured around `adjust(mean)`.
    pub fn adjusted_std_dev_of_last(&self, size: usize, adjust: impl Fn(f64) -> f64) -> f64 {
        let n = size.min(self.buffer.len());
        if n < 2 {
            return 0.0;
        }
        let mean = adjust(self.mean_of_last(size));
        let squares: f64 = self.last(n).map(|v| (adjust(v) - mean).powi(2)).sum();
        (squares / (n - 1) as f64).sqrt()
    }

    fn last(&self, size: usize) -> impl Iterator<Item = f64> + '_ {
        let skip = self.buffer.len().saturating_sub(size);
        self.buffer.iter().skip(skip).map(|s| s.value)
    }

    /// Sum of every retained sample.
    pub fn window_sum(&self) -> f64 {
        self.window_sum
    }

    /// Sum of the most recent `min(period, len)` samples.
    pub fn recent_sum(&self) -> f64 {
        self.recent_sum
    }

    /// Sum of retained samples at phase `index`.
    pub fn period_sum(&self, index: usize) -> f64 {
        self.periodic_sum[index % self.period]
    }

    /// Retained sample at position `index` (0 is the oldest).
    pub fn value(&self, index: usize) -> Option<f64> {
        self.buffer.get(index).map(|s| s.value)
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if nothing has been retained yet.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of samples inside the recent window.
    pub fn recent_len(&self) -> usize {
        self.buffer.len().min(self.period)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// `f64` with a total order so it can key a `BTreeMap`.
#[derive(Debug, Clone, Copy)]
struct OrderedValue(f64);

impl PartialEq for OrderedValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderedValue {}

impl PartialOrd for OrderedValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Max-ordered multiset with logarithmic insert and remove.
#[derive(Debug, Clone, Default)]
struct MaxHeap {
    counts: BTreeMap<OrderedValue, usize>,
}

impl MaxHeap {
    fn insert(&mut self, value: f64) {
        *self.counts.entry(OrderedValue(value)).or_insert(0) += 1;
    }

    fn remove(&mut self, value: f64) {
        let key = OrderedValue(value);
        if let Some(count) = self.counts.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&key);
            }
        }
    }

    fn peek(&self) -> Option<f64> {
        self.counts.last_key_value().map(|(k, _)| k.0)
    }
}

/// Transform applied to values before they enter the recent-max heap.
pub type Adjuster = fn(f64) -> f64;

fn identity(value: f64) -> f64 {
    value
}

/// [`WindowedAggregator`] that also tracks the maximum of the recent window.
///
/// The maximum is taken over `adjust(v)` for the last `min(period, len)`
/// samples. [`RunningMax::new`] uses the identity transform;
/// [`RunningMax::adjusted`] takes any transform, e.g. `f64::abs` to track
/// peak magnitude of a signed demand signal.
#[derive(Debug, Clone)]
pub struct RunningMax {
    window: WindowedAggregator,
    heap: MaxHeap,
    adjust: Adjuster,
}

impl RunningMax {
    pub fn new(capacity: usize, period: usize) -> Self {
        Self::adjusted(capacity, period, identity)
    }

    /// Creates a running max over `adjust(v)`.
    pub fn adjusted(capacity: usize, period: usize, adjust: Adjuster) -> Self {
        Self {
            window: WindowedAggregator::new(capacity, period),
            heap: MaxHeap::default(),
            adjust,
        }
    }

    /// Appends the sample recorded at `tick`.
    pub fn add(&mut self, tick: u64, value: f64) {
        let adjust = self.adjust;
        let heap = &mut self.heap;
        heap.insert(adjust(value));
        self.window
            .add_tracked(tick, value, |leaving| heap.remove(adjust(leaving)));
    }

    /// Maximum adjusted value in the recent window, or 0 when empty.
    pub fn recent_max(&self) -> f64 {
        self.heap.peek().unwrap_or(0.0)
    }

    /// Standard deviation of adjusted values over the last `size` samples.
    pub fn adjusted_std_dev(&self, size: usize) -> f64 {
        self.window.adjusted_std_dev_of_last(size, self.adjust)
    }
}

impl Deref for RunningMax {
    type Target = WindowedAggregator;

    fn deref(&self) -> &Self::Target {
        &self.window
    }
}

/// [`WindowedAggregator`] that can report the lowest and highest phase mean.
///
/// Used for neighborhood request history, where the quietest phase of the
/// cycle serves as the floor for how much can be offered to neighbors.
#[derive(Debug, Clone)]
pub struct PeriodicMinMax {
    window: WindowedAggregator,
}

impl PeriodicMinMax {
    pub fn new(capacity: usize, period: usize) -> Self {
        Self {
            window: WindowedAggregator::new(capacity, period),
        }
    }

    pub fn add(&mut self, tick: u64, value: f64) {
        self.window.add(tick, value);
    }

    /// Lowest phase mean over the cycle, or 0 when empty.
    pub fn period_min(&self) -> f64 {
        self.window.phase_means().reduce(f64::min).unwrap_or(0.0)
    }

    /// Highest phase mean over the cycle, or 0 when empty.
    pub fn period_max(&self) -> f64 {
        self.window.phase_means().reduce(f64::max).unwrap_or(0.0)
    }
}

impl Deref for PeriodicMinMax {
    type Target = WindowedAggregator;

    fn deref(&self) -> &Self::Target {
        &self.window
    }
}
