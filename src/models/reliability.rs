//! Operational-state models for the grid and for agents.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Deserialize;

/// Failure and recovery rates of a two-state reliability model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReliabilitySpec {
    /// Probability of failing during a tick while operational.
    pub failure_probability: f64,
    /// Probability of recovering during a tick while failed.
    pub recovery_probability: f64,
}

impl Default for ReliabilitySpec {
    fn default() -> Self {
        Self {
            failure_probability: 0.0,
            recovery_probability: 1.0,
        }
    }
}

/// Two-state Markov reliability indicator.
///
/// Advanced once per tick by its owner. A reliability built with
/// [`Reliability::always_operational`] never fails, which is what every
/// entity gets when reliability simulation is disabled.
#[derive(Debug, Clone)]
pub struct Reliability {
    failure_probability: f64,
    recovery_probability: f64,
    operational: bool,
    rng: Option<StdRng>,
}

impl Reliability {
    pub fn always_operational() -> Self {
        Self {
            failure_probability: 0.0,
            recovery_probability: 1.0,
            operational: true,
            rng: None,
        }
    }

    /// Creates a reliability model that starts operational.
    pub fn new(spec: &ReliabilitySpec, seed: u64) -> Self {
        Self {
            failure_probability: spec.failure_probability.clamp(0.0, 1.0),
            recovery_probability: spec.recovery_probability.clamp(0.0, 1.0),
            operational: true,
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }

    /// Moves to the state for the next tick.
    pub fn advance(&mut self) {
        let Some(rng) = self.rng.as_mut() else {
            return;
        };
        self.operational = if self.operational {
            !rng.random_bool(self.failure_probability)
        } else {
            rng.random_bool(self.recovery_probability)
        };
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_reliability_never_fails() {
        let mut r = Reliability::always_operational();
        for _ in 0..100 {
            r.advance();
            assert!(r.is_operational());
        }
    }

    #[test]
    fn certain_failure_and_recovery_alternate() {
        let spec = ReliabilitySpec {
            failure_probability: 1.0,
            recovery_probability: 1.0,
        };
        let mut r = Reliability::new(&spec, 3);
        assert!(r.is_operational());
        r.advance();
        assert!(!r.is_operational());
        r.advance();
        assert!(r.is_operational());
    }

    #[test]
    fn no_recovery_stays_down() {
        let spec = ReliabilitySpec {
            failure_probability: 1.0,
            recovery_probability: 0.0,
        };
        let mut r = Reliability::new(&spec, 3);
        for _ in 0..10 {
            r.advance();
            assert!(!r.is_operational());
        }
    }
}
