//! Errors surfaced by the host application.

use thiserror::Error;

use beachhead_core::error::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to spawn game loop thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("unknown scenario '{0}' (expected beach_assault or drill)")]
    UnknownScenario(String),

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}
