//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;

/// Failure while loading a scenario, running it or exporting its results.
#[derive(Debug, Error)]
pub enum SimError {
    /// A scenario could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A loaded scenario failed validation.
    #[error("invalid scenario ({} problems): {}", .0.len(), join(.0))]
    Invalid(Vec<ConfigError>),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_lists_every_problem() {
        let err = SimError::Invalid(vec![
            ConfigError {
                field: "simulation.period".into(),
                message: "must be > 0".into(),
            },
            ConfigError {
                field: "grid.spread".into(),
                message: "must be in [0.0, 1.0)".into(),
            },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("invalid scenario (2 problems)"));
        assert!(text.contains("simulation.period"));
        assert!(text.contains("grid.spread"));
    }

    #[test]
    fn config_error_is_transparent() {
        let err = SimError::from(ConfigError {
            field: "preset".into(),
            message: "unknown preset".into(),
        });
        assert_eq!(err.to_string(), "config error: preset: unknown preset");
    }
}
