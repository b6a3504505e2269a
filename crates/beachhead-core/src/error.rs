//! Error types for loading match configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating a [`MatchConfig`](crate::config::MatchConfig).
///
/// Runtime misuse (bad indices, exhausted quotas, repeated notifications) is
/// never an error; only configuration can fail.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config text is not valid JSON for a match config.
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    /// No waves are configured.
    #[error("config must define at least one wave")]
    NoWaves,

    /// Enemies have nowhere to go.
    #[error("config must define at least one navigation destination")]
    NoDestinations,

    /// Nothing to defend.
    #[error("config must define at least one tower")]
    NoTowers,

    /// Spawn cadence is negative or not finite.
    #[error("invalid spawn cadence: {0}")]
    InvalidCadence(f64),

    /// A wave has no countdown duration.
    #[error("wave {index} has no configured duration")]
    MissingDuration { index: usize },

    /// A wave duration is non-positive or not finite.
    #[error("invalid duration for wave {index}: {secs}")]
    InvalidDuration { index: usize, secs: f64 },

    /// A quota row does not list one limit per obstacle template.
    #[error("quota row for wave {wave_number} has {found} limits, expected {expected}")]
    QuotaArity {
        wave_number: u32,
        found: usize,
        expected: usize,
    },

    /// A template or tower has non-positive health.
    #[error("{what} must have positive health, got {health}")]
    InvalidHealth { what: String, health: f32 },
}
