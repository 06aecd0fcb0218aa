//! Aggregate statistics derived from the pools and the ledger

use crate::types::{GameMode, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current size of every pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSizes {
    pub casual: usize,
    pub ranked: usize,
    pub quick_play: usize,
}

impl PoolSizes {
    /// Build from counts indexed by `GameMode::index`
    pub fn from_counts(counts: [usize; 3]) -> Self {
        Self {
            casual: counts[GameMode::Casual.index()],
            ranked: counts[GameMode::Ranked.index()],
            quick_play: counts[GameMode::QuickPlay.index()],
        }
    }

    pub fn get(&self, mode: GameMode) -> usize {
        match mode {
            GameMode::Casual => self.casual,
            GameMode::Ranked => self.ranked,
            GameMode::QuickPlay => self.quick_play,
        }
    }

    pub fn total(&self) -> usize {
        self.casual + self.ranked + self.quick_play
    }
}

/// Ledger figures read under a single lock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_matches: u64,
    pub average_skill_difference: f64,
    /// Matches counted towards the "recent" window
    pub recent_matches: usize,
}

/// Read-only snapshot of the whole engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    pub total_players: usize,
    pub total_matches: u64,
    pub pool_sizes: PoolSizes,
    pub average_skill_difference: f64,
    pub recent_matches: usize,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: i64,
}

/// Win/loss record of one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub matches_played: u64,
    pub wins: u64,
    pub losses: u64,
}

impl PlayerRecord {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            matches_played: 0,
            wins: 0,
            losses: 0,
        }
    }

    /// Fraction of matches won, 0 when none were played
    pub fn win_rate(&self) -> f64 {
        if self.matches_played == 0 {
            return 0.0;
        }
        self.wins as f64 / self.matches_played as f64
    }
}
