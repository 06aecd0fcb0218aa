//! Mode-specific FIFO waiting pools
//!
//! All three pools live behind a single lock. `remove_everywhere` touches
//! every pool and pairing must scan and remove as one step, so a global lock
//! keeps a player from being handed out twice.

use crate::error::{MatchmakingError, Result};
use crate::player::PlayerHandle;
use crate::types::{GameMode, PlayerId};
use crate::utils::current_timestamp;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// A queued player together with the moment they joined
///
/// The rating is captured from the player when the entry is created and
/// refreshed at the start of every scan under the pool lock. Policies and
/// the match built from their choice both read this captured value, so a
/// concurrent rating change cannot slip in between them.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub player: PlayerHandle,
    pub joined_at: DateTime<Utc>,
    skill_rating: i32,
}

impl QueueEntry {
    pub fn new(player: PlayerHandle, joined_at: DateTime<Utc>) -> Self {
        let skill_rating = player.skill_rating();
        Self {
            player,
            joined_at,
            skill_rating,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player.id()
    }

    /// Rating as of the most recent scan
    pub fn skill_rating(&self) -> i32 {
        self.skill_rating
    }

    fn refresh(&mut self) {
        self.skill_rating = self.player.skill_rating();
    }
}

type Pools = [VecDeque<QueueEntry>; 3];

/// Two entries taken out of a pool in one critical section
#[derive(Debug, Clone)]
pub struct TakenPair {
    pub first: QueueEntry,
    pub second: QueueEntry,
    /// Sizes of all pools right after the removal, indexed by `GameMode::index`
    pub pool_sizes: [usize; 3],
}

/// The three waiting pools, indexed by `GameMode::index`
#[derive(Debug, Default)]
pub struct QueuePool {
    pools: Mutex<Pools>,
}

/// Drop a player from every pool, keeping the order of everybody else
fn remove_from_all(pools: &mut Pools, player_id: PlayerId) -> Option<GameMode> {
    let mut removed_from = None;

    for mode in GameMode::ALL {
        let pool = &mut pools[mode.index()];
        let before = pool.len();
        pool.retain(|entry| entry.player_id() != player_id);
        if pool.len() != before {
            removed_from.get_or_insert(mode);
        }
    }

    removed_from
}

/// Capture every entry's current rating and hand out the pool front to back
fn scan_view(pool: &mut VecDeque<QueueEntry>) -> &[QueueEntry] {
    pool.iter_mut().for_each(QueueEntry::refresh);
    pool.make_contiguous()
}

impl QueuePool {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Pools>> {
        self.pools
            .lock()
            .map_err(|_| MatchmakingError::lock_poisoned("queue pool").into())
    }

    /// Append a player to the tail of a mode's pool
    ///
    /// Returns the pool's size right after the append. Precondition: the
    /// player is not queued anywhere. The pool does not re-validate this; a
    /// violation is logged and the entry is still added.
    pub fn enqueue(&self, mode: GameMode, player: &PlayerHandle) -> Result<usize> {
        let mut pools = self.lock()?;

        if let Some(current) = player.queue_state().mode() {
            warn!(
                "Player '{}' enqueued into {} while already queued in {}",
                player.username(),
                mode,
                current
            );
        }

        let joined_at = current_timestamp();
        let pool = &mut pools[mode.index()];
        pool.push_back(QueueEntry::new(player.clone(), joined_at));
        player.join_queue(mode, joined_at);

        debug!(
            "Player '{}' joined {} pool at position {}",
            player.username(),
            mode,
            pool.len()
        );

        Ok(pool.len())
    }

    /// Remove a player from whichever pool holds them
    ///
    /// Returns the mode they were removed from with that pool's remaining
    /// size, or `None` (a no-op) when the player was not queued.
    pub fn remove_everywhere(&self, player: &PlayerHandle) -> Result<Option<(GameMode, usize)>> {
        let mut pools = self.lock()?;

        let Some(mode) = remove_from_all(&mut pools, player.id()) else {
            return Ok(None);
        };
        player.leave_queue();

        Ok(Some((mode, pools[mode.index()].len())))
    }

    /// Players waiting in a mode, front to back
    pub fn snapshot(&self, mode: GameMode) -> Result<Vec<PlayerHandle>> {
        let pools = self.lock()?;
        Ok(pools[mode.index()]
            .iter()
            .map(|entry| entry.player.clone())
            .collect())
    }

    /// Entries waiting in a mode, front to back
    pub fn entries(&self, mode: GameMode) -> Result<Vec<QueueEntry>> {
        let pools = self.lock()?;
        Ok(pools[mode.index()].iter().cloned().collect())
    }

    pub fn count(&self, mode: GameMode) -> Result<usize> {
        let pools = self.lock()?;
        Ok(pools[mode.index()].len())
    }

    /// Sizes of all pools taken under one lock, indexed by `GameMode::index`
    pub fn counts(&self) -> Result<[usize; 3]> {
        let pools = self.lock()?;
        Ok([pools[0].len(), pools[1].len(), pools[2].len()])
    }

    /// Run a read-only computation over a mode's pool
    pub fn inspect<T>(&self, mode: GameMode, f: impl FnOnce(&[QueueEntry]) -> T) -> Result<T> {
        let mut pools = self.lock()?;
        Ok(f(scan_view(&mut pools[mode.index()])))
    }

    /// Select and remove a pair from a mode's pool as one atomic step
    ///
    /// `select` sees the pool front to back and returns the positions
    /// `(i, j)` with `i < j` of the pair to take, or `None` to leave the pool
    /// untouched. Both chosen players are then removed from every pool and
    /// their queue state is reset. The returned entries carry the ratings
    /// `select` saw.
    ///
    /// Selecting two entries of the same player (a double enqueue) is an
    /// `InternalError` and leaves the pool untouched.
    pub fn take_pair(
        &self,
        mode: GameMode,
        select: impl FnOnce(&[QueueEntry]) -> Option<(usize, usize)>,
    ) -> Result<Option<TakenPair>> {
        let mut pools = self.lock()?;

        let Some((i, j)) = select(scan_view(&mut pools[mode.index()])) else {
            return Ok(None);
        };

        let pool = &pools[mode.index()];
        if i >= j || j >= pool.len() {
            return Err(MatchmakingError::InternalError {
                message: format!(
                    "Invalid pair selection ({}, {}) for {} pool of size {}",
                    i,
                    j,
                    mode,
                    pool.len()
                ),
            }
            .into());
        }

        let first = pool[i].clone();
        let second = pool[j].clone();
        if first.player_id() == second.player_id() {
            warn!(
                "Refusing to pair player '{}' with themselves in {} pool",
                first.player.username(),
                mode
            );
            return Err(MatchmakingError::InternalError {
                message: format!(
                    "Player {} is queued twice in the {} pool",
                    first.player_id(),
                    mode
                ),
            }
            .into());
        }

        remove_from_all(&mut pools, first.player_id());
        remove_from_all(&mut pools, second.player_id());
        first.player.leave_queue();
        second.player.leave_queue();

        Ok(Some(TakenPair {
            first,
            second,
            pool_sizes: [pools[0].len(), pools[1].len(), pools[2].len()],
        }))
    }
}
