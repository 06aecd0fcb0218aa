//! Common types used throughout the matchmaking engine

use crate::error::MatchmakingError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = Uuid;

/// Unique identifier for matches
pub type MatchId = Uuid;

/// Game mode a player queues for
///
/// Each mode owns exactly one waiting pool and one pairing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameMode {
    Casual,
    Ranked,
    QuickPlay,
}

impl GameMode {
    /// Every mode, in pool order
    pub const ALL: [GameMode; 3] = [GameMode::Casual, GameMode::Ranked, GameMode::QuickPlay];

    /// Fixed slot of this mode's pool
    pub fn index(self) -> usize {
        match self {
            GameMode::Casual => 0,
            GameMode::Ranked => 1,
            GameMode::QuickPlay => 2,
        }
    }

    /// Label used for metrics and logs
    pub fn as_label(self) -> &'static str {
        match self {
            GameMode::Casual => "casual",
            GameMode::Ranked => "ranked",
            GameMode::QuickPlay => "quickplay",
        }
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameMode::Casual => write!(f, "Casual"),
            GameMode::Ranked => write!(f, "Ranked"),
            GameMode::QuickPlay => write!(f, "QuickPlay"),
        }
    }
}

impl FromStr for GameMode {
    type Err = MatchmakingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "casual" => Ok(GameMode::Casual),
            "ranked" => Ok(GameMode::Ranked),
            "quickplay" | "quick-play" | "quick_play" => Ok(GameMode::QuickPlay),
            _ => Err(MatchmakingError::UnknownGameMode {
                mode: s.to_string(),
            }),
        }
    }
}

/// Pool membership of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueueState {
    NotQueued,
    Queued {
        mode: GameMode,
        joined_at: DateTime<Utc>,
    },
}

impl QueueState {
    pub fn is_queued(&self) -> bool {
        matches!(self, QueueState::Queued { .. })
    }

    /// Mode the player is waiting in, if any
    pub fn mode(&self) -> Option<GameMode> {
        match self {
            QueueState::Queued { mode, .. } => Some(*mode),
            QueueState::NotQueued => None,
        }
    }
}

impl Default for QueueState {
    fn default() -> Self {
        QueueState::NotQueued
    }
}

/// Coarse wait estimate for a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitEstimate {
    NoWait,
    ShortWait,
    LongWait,
}

impl std::fmt::Display for WaitEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitEstimate::NoWait => write!(f, "No wait"),
            WaitEstimate::ShortWait => write!(f, "Short wait"),
            WaitEstimate::LongWait => write!(f, "Long wait"),
        }
    }
}
