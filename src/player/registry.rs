//! Player registry
//!
//! Owns the canonical set of players and enforces case-insensitive username
//! uniqueness for the lifetime of the registry.

use crate::error::{MatchmakingError, Result};
use crate::player::profile::{Player, PlayerHandle};
use crate::types::{GameMode, PlayerId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct RegistryInner {
    /// Players in insertion order
    players: Vec<PlayerHandle>,
    /// Lowercased username -> position in `players`
    by_username: HashMap<String, usize>,
    by_id: HashMap<PlayerId, usize>,
}

/// In-memory player registry
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    inner: RwLock<RegistryInner>,
}

fn username_key(username: &str) -> String {
    username.to_lowercase()
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a new player
    ///
    /// Fails with `DuplicateUsername` when a player with the same username
    /// (ignoring case) already exists. Ratings and modes are not validated.
    pub fn create_player(
        &self,
        username: &str,
        skill_rating: i32,
        preferred_mode: GameMode,
    ) -> Result<PlayerHandle> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| MatchmakingError::lock_poisoned("registry"))?;

        let key = username_key(username);
        if inner.by_username.contains_key(&key) {
            debug!("Rejected duplicate username '{}'", username);
            return Err(MatchmakingError::DuplicateUsername {
                username: username.to_string(),
            }
            .into());
        }

        let player = Arc::new(Player::new(username, skill_rating, preferred_mode));
        let position = inner.players.len();
        inner.players.push(player.clone());
        inner.by_username.insert(key, position);
        inner.by_id.insert(player.id(), position);

        info!(
            "Registered player '{}' ({}) - skill: {}, preferred mode: {}",
            player.username(),
            player.id(),
            skill_rating,
            preferred_mode
        );

        Ok(player)
    }

    /// Snapshot of every player, in insertion order
    pub fn list_players(&self) -> Result<Vec<PlayerHandle>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| MatchmakingError::lock_poisoned("registry"))?;

        Ok(inner.players.clone())
    }

    /// Case-insensitive lookup by username
    pub fn find_by_username(&self, username: &str) -> Result<Option<PlayerHandle>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| MatchmakingError::lock_poisoned("registry"))?;

        Ok(inner
            .by_username
            .get(&username_key(username))
            .map(|&position| inner.players[position].clone()))
    }

    pub fn get(&self, player_id: &PlayerId) -> Result<Option<PlayerHandle>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| MatchmakingError::lock_poisoned("registry"))?;

        Ok(inner
            .by_id
            .get(player_id)
            .map(|&position| inner.players[position].clone()))
    }

    pub fn player_count(&self) -> Result<usize> {
        let inner = self
            .inner
            .read()
            .map_err(|_| MatchmakingError::lock_poisoned("registry"))?;

        Ok(inner.players.len())
    }
}
