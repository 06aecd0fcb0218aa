//! Player records shared between the registry, the pools and the engine
//!
//! A `Player` is created once by the registry and lives for the lifetime of
//! the engine. Identity fields are immutable; the skill rating can be changed
//! from outside the engine and the queue state is driven by the pools.

use crate::types::{GameMode, PlayerId, QueueState};
use crate::utils::{current_timestamp, generate_player_id};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared handle to a registered player
pub type PlayerHandle = Arc<Player>;

/// A registered player
#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    username: String,
    preferred_mode: GameMode,
    created_at: DateTime<Utc>,
    skill_rating: AtomicI32,
    queue_state: Mutex<QueueState>,
}

/// Point-in-time copy of a player, suitable for display and serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub username: String,
    pub skill_rating: i32,
    pub preferred_mode: GameMode,
    pub queue_state: QueueState,
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub(crate) fn new(username: impl Into<String>, skill_rating: i32, preferred_mode: GameMode) -> Self {
        Self {
            id: generate_player_id(),
            username: username.into(),
            preferred_mode,
            created_at: current_timestamp(),
            skill_rating: AtomicI32::new(skill_rating),
            queue_state: Mutex::new(QueueState::NotQueued),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Advisory default mode, never enforced by the engine
    pub fn preferred_mode(&self) -> GameMode {
        self.preferred_mode
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn skill_rating(&self) -> i32 {
        self.skill_rating.load(Ordering::Acquire)
    }

    /// Update the skill rating. The engine never calls this itself.
    pub fn set_skill_rating(&self, rating: i32) {
        self.skill_rating.store(rating, Ordering::Release);
    }

    pub fn queue_state(&self) -> QueueState {
        *self.state_guard()
    }

    pub fn is_queued(&self) -> bool {
        self.queue_state().is_queued()
    }

    /// How long the player has been waiting, if queued
    pub fn time_in_queue(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self.queue_state() {
            QueueState::Queued { joined_at, .. } => Some(now - joined_at),
            QueueState::NotQueued => None,
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            username: self.username.clone(),
            skill_rating: self.skill_rating(),
            preferred_mode: self.preferred_mode,
            queue_state: self.queue_state(),
            created_at: self.created_at,
        }
    }

    pub(crate) fn join_queue(&self, mode: GameMode, joined_at: DateTime<Utc>) {
        *self.state_guard() = QueueState::Queued { mode, joined_at };
    }

    pub(crate) fn leave_queue(&self) {
        *self.state_guard() = QueueState::NotQueued;
    }

    // QueueState is Copy, so a poisoned guard still holds a whole value
    fn state_guard(&self) -> MutexGuard<'_, QueueState> {
        self.queue_state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Player {}
