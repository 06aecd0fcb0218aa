//! Error types for the matchmaking engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application. "No match yet" and wait estimates are regular
//! return values and never show up here.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific matchmaking scenarios
#[derive(Debug, thiserror::Error)]
pub enum MatchmakingError {
    #[error("Player with username '{username}' already exists")]
    DuplicateUsername { username: String },

    #[error("Unknown game mode: {mode}")]
    UnknownGameMode { mode: String },

    #[error("Match already resolved: {match_id}")]
    AlreadyResolved { match_id: String },

    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("Player {player_id} did not take part in match {match_id}")]
    NotAParticipant { player_id: String, match_id: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal engine error: {message}")]
    InternalError { message: String },
}

impl MatchmakingError {
    /// Lock poisoning is the only way the engine's internal state can fail
    pub(crate) fn lock_poisoned(what: &str) -> Self {
        MatchmakingError::InternalError {
            message: format!("Failed to acquire {} lock", what),
        }
    }
}
