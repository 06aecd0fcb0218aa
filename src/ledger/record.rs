//! Match records
//!
//! A match is fixed at pairing time. The only later change is the outcome,
//! which can be set exactly once.

use crate::error::{MatchmakingError, Result};
use crate::player::Player;
use crate::queue::QueueEntry;
use crate::types::{GameMode, MatchId, PlayerId};
use crate::utils::{current_timestamp, generate_match_id, skill_difference};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One side of a match, as the player looked when paired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchParticipant {
    pub id: PlayerId,
    pub username: String,
    pub skill_rating: i32,
}

impl From<&Player> for MatchParticipant {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id(),
            username: player.username().to_string(),
            skill_rating: player.skill_rating(),
        }
    }
}

/// Uses the rating captured in the entry rather than the live one
impl From<&QueueEntry> for MatchParticipant {
    fn from(entry: &QueueEntry) -> Self {
        Self {
            id: entry.player_id(),
            username: entry.player.username().to_string(),
            skill_rating: entry.skill_rating(),
        }
    }
}

/// A pairing of two distinct players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    id: MatchId,
    player1: MatchParticipant,
    player2: MatchParticipant,
    mode: GameMode,
    created_at: DateTime<Utc>,
    skill_difference: u32,
    winner: Option<PlayerId>,
    loser: Option<PlayerId>,
}

impl Match {
    /// Create a pending match between two players
    pub(crate) fn new(
        mode: GameMode,
        player1: impl Into<MatchParticipant>,
        player2: impl Into<MatchParticipant>,
    ) -> Self {
        let player1 = player1.into();
        let player2 = player2.into();
        let skill_difference = skill_difference(player1.skill_rating, player2.skill_rating);

        Self {
            id: generate_match_id(),
            player1,
            player2,
            mode,
            created_at: current_timestamp(),
            skill_difference,
            winner: None,
            loser: None,
        }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn player1(&self) -> &MatchParticipant {
        &self.player1
    }

    pub fn player2(&self) -> &MatchParticipant {
        &self.player2
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn skill_difference(&self) -> u32 {
        self.skill_difference
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn loser(&self) -> Option<PlayerId> {
        self.loser
    }

    pub fn is_resolved(&self) -> bool {
        self.winner.is_some()
    }

    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.player1.id == player_id || self.player2.id == player_id
    }

    pub fn participant(&self, player_id: PlayerId) -> Option<&MatchParticipant> {
        [&self.player1, &self.player2]
            .into_iter()
            .find(|p| p.id == player_id)
    }

    /// The other side of the match from `player_id`'s point of view
    pub fn opponent_of(&self, player_id: PlayerId) -> Option<&MatchParticipant> {
        if self.player1.id == player_id {
            Some(&self.player2)
        } else if self.player2.id == player_id {
            Some(&self.player1)
        } else {
            None
        }
    }

    /// Whether `player_id` won, once the match is resolved
    pub fn won_by(&self, player_id: PlayerId) -> Option<bool> {
        if !self.involves(player_id) {
            return None;
        }
        self.winner.map(|winner| winner == player_id)
    }

    /// Set winner and loser. Allowed exactly once.
    pub(crate) fn resolve(&mut self, winner: PlayerId) -> Result<()> {
        if self.is_resolved() {
            return Err(MatchmakingError::AlreadyResolved {
                match_id: self.id.to_string(),
            }
            .into());
        }

        let loser = self
            .opponent_of(winner)
            .map(|opponent| opponent.id)
            .ok_or_else(|| MatchmakingError::NotAParticipant {
                player_id: winner.to_string(),
                match_id: self.id.to_string(),
            })?;

        self.winner = Some(winner);
        self.loser = Some(loser);
        Ok(())
    }
}
