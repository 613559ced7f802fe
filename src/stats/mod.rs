//! Rolling statistics used for forecasting and rationing.

/// Area-from-baseline reductions.
pub mod area;
pub mod window;

pub use area::{Orientation, dynamic_area, global_area, local_area, unit_ratio};
pub use window::{Adjuster, PeriodicMinMax, RunningMax, WindowedAggregator};

/// Exponentially smoothed update of `previous` towards `value`.
///
/// `weight` is the share kept from history (0 = replace, 1 = never move).
/// Without history the new value is taken as is.
///
/// # Examples
///
/// ```
/// use microgrid_sim::stats::exponential_average;
///
/// assert_eq!(exponential_average(None, 4.0, 0.75), 4.0);
/// assert_eq!(exponential_average(Some(0.0), 4.0, 0.75), 1.0);
/// ```
pub fn exponential_average(previous: Option<f64>, value: f64, weight: f64) -> f64 {
    match previous {
        Some(previous) => weight * previous + (1.0 - weight) * value,
        None => value,
    }
}
