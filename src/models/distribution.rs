use rand::{Rng, rngs::StdRng};
use serde::Deserialize;

/// Distribution of blackout radii, in network hops.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RadiusDistribution {
    /// Always the same radius.
    Constant { value: usize },
    /// Uniform over `[min, max]` inclusive.
    Uniform { min: usize, max: usize },
}

impl Default for RadiusDistribution {
    fn default() -> Self {
        RadiusDistribution::Constant { value: 1 }
    }
}

impl RadiusDistribution {
    /// Draws one radius.
    pub fn sample(&self, rng: &mut StdRng) -> usize {
        match *self {
            RadiusDistribution::Constant { value } => value,
            RadiusDistribution::Uniform { min, max } if min >= max => min,
            RadiusDistribution::Uniform { min, max } => rng.random_range(min..=max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn constant_radius() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(RadiusDistribution::Constant { value: 3 }.sample(&mut rng), 3);
    }

    #[test]
    fn uniform_radius_within_bounds() {
        let mut rng = StdRng::seed_from_u64(0);
        let dist = RadiusDistribution::Uniform { min: 1, max: 4 };
        for _ in 0..200 {
            let r = dist.sample(&mut rng);
            assert!((1..=4).contains(&r));
        }
    }

    #[test]
    fn degenerate_uniform_returns_min() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(RadiusDistribution::Uniform { min: 2, max: 2 }.sample(&mut rng), 2);
    }
}
