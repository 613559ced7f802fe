//! Area-from-baseline reductions over a short forecast horizon.
//!
//! Each reduction walks `foresight` forecast steps and accumulates the gap
//! between a baseline and the predicted value at every step. The gap is
//! measured one-sidedly by an [`Orientation`]: `Under` counts how far the
//! forecast falls below the baseline, `Over` how far it rises above it.

/// Which side of the baseline contributes to the area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// `max(0, baseline - predicted)`
    Under,
    /// `max(0, predicted - baseline)`
    Over,
}

impl Orientation {
    /// Per-step contribution of `predicted` against `baseline`.
    pub fn term(self, baseline: f64, predicted: f64) -> f64 {
        let gap = match self {
            Orientation::Under => baseline - predicted,
            Orientation::Over => predicted - baseline,
        };
        gap.max(0.0)
    }
}

/// Sum of every per-step term over the horizon.
///
/// # Arguments
///
/// * `foresight` - Number of forecast steps to inspect
/// * `orientation` - Side of the baseline that counts
/// * `baseline` - Reference level
/// * `predict` - Forecast for step `k` (0 is the current tick)
pub fn global_area(
    foresight: usize,
    orientation: Orientation,
    baseline: f64,
    predict: impl Fn(usize) -> f64,
) -> f64 {
    (0..foresight)
        .map(|k| orientation.term(baseline, predict(k)))
        .sum()
}

/// Sum of the leading run of positive terms.
///
/// Stops at the first step whose term is not positive, so a deficit that
/// reverses and later returns is not counted twice.
pub fn local_area(
    foresight: usize,
    orientation: Orientation,
    baseline: f64,
    predict: impl Fn(usize) -> f64,
) -> f64 {
    (0..foresight)
        .map(|k| orientation.term(baseline, predict(k)))
        .take_while(|term| *term > 0.0)
        .sum()
}

/// Highest running partial sum reached over the horizon.
///
/// Equals the global area while every term is non-negative.
pub fn dynamic_area(
    foresight: usize,
    orientation: Orientation,
    baseline: f64,
    predict: impl Fn(usize) -> f64,
) -> f64 {
    let mut sum = 0.0;
    let mut max = 0.0_f64;
    for k in 0..foresight {
        sum += orientation.term(baseline, predict(k));
        max = max.max(sum);
    }
    max
}

/// `numerator / denominator` clamped to `[0, 1]`.
///
/// A non-positive denominator means there is nothing to ration against: the
/// ratio saturates to 1 for a positive numerator and 0 otherwise.
pub fn unit_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        if numerator > 0.0 { 1.0 } else { 0.0 }
    } else {
        (numerator / denominator).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forecast(values: &[f64]) -> impl Fn(usize) -> f64 + '_ {
        move |k| values[k]
    }

    #[test]
    fn terms_are_one_sided() {
        assert_eq!(Orientation::Under.term(5.0, 3.0), 2.0);
        assert_eq!(Orientation::Under.term(5.0, 7.0), 0.0);
        assert_eq!(Orientation::Over.term(5.0, 7.0), 2.0);
        assert_eq!(Orientation::Over.term(5.0, 3.0), 0.0);
    }

    #[test]
    fn local_area_stops_at_first_non_positive_term() {
        let values = [1.0, 2.0, 6.0, 0.0, 1.0];
        // Under baseline 5: terms 4, 3, 0, 5, 4
        assert_eq!(global_area(5, Orientation::Under, 5.0, forecast(&values)), 16.0);
        assert_eq!(local_area(5, Orientation::Under, 5.0, forecast(&values)), 7.0);
    }

    #[test]
    fn local_area_is_bounded_by_global_area() {
        let values: Vec<f64> = (0..48).map(|i| ((i * 37) % 11) as f64 - 4.0).collect();
        for baseline in [-3.0, 0.0, 1.5, 4.0] {
            for orientation in [Orientation::Under, Orientation::Over] {
                for foresight in [0, 1, 5, 24, 48] {
                    let local = local_area(foresight, orientation, baseline, forecast(&values));
                    let global = global_area(foresight, orientation, baseline, forecast(&values));
                    assert!(local <= global + 1e-12);

                    let truncated: f64 = values[..foresight]
                        .iter()
                        .map(|v| orientation.term(baseline, *v))
                        .take_while(|t| *t > 0.0)
                        .sum();
                    assert!((local - truncated).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn local_area_of_immediate_reversal_is_zero() {
        let values = [9.0, 1.0, 1.0];
        assert_eq!(local_area(3, Orientation::Under, 5.0, forecast(&values)), 0.0);
    }

    #[test]
    fn dynamic_area_reports_peak_partial_sum() {
        let values = [3.0, 4.0, 5.0];
        assert_eq!(dynamic_area(3, Orientation::Over, 2.0, forecast(&values)), 6.0);
        assert_eq!(dynamic_area(0, Orientation::Over, 2.0, forecast(&values)), 0.0);
    }

    #[test]
    fn unit_ratio_guards_zero_denominator() {
        assert_eq!(unit_ratio(3.0, 0.0), 1.0);
        assert_eq!(unit_ratio(0.0, 0.0), 0.0);
        assert_eq!(unit_ratio(-1.0, 0.0), 0.0);
        assert_eq!(unit_ratio(1.0, 4.0), 0.25);
        assert_eq!(unit_ratio(8.0, 4.0), 1.0);
        assert_eq!(unit_ratio(-8.0, 4.0), 0.0);
    }
}
