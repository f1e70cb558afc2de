//! Error types for game setup and task supervision.
//!
//! Claim outcomes are not errors: a rejected claim is a normal
//! [`Verdict`](crate::game::Verdict).

use crate::game::PlayerId;
use thiserror::Error;

/// Invalid game configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A field holds an unusable value
    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// A configuration document could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised while building or running a game
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No player with this id exists
    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// An actor task panicked or was aborted
    #[error("Task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Result type for game operations
pub type Result<T> = std::result::Result<T, GameError>;
