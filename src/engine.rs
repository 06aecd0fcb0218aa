//! Matchmaking engine
//!
//! `MatchmakingEngine` is the explicit service object that owns the player
//! registry, the three waiting pools, the pairing policies and the match
//! ledger. Build one per service instance and share it by reference or
//! `Arc`. It contains no timers; callers decide when to attempt matches.

use crate::config::{AppConfig, LedgerSettings, MatchingConfig};
use crate::error::{MatchmakingError, Result};
use crate::ledger::{EngineStats, Match, MatchLedger, PlayerRecord, PoolSizes};
use crate::matchmaking::{MatchMaker, PairingPolicy};
use crate::metrics::MetricsCollector;
use crate::outcome::OutcomeSimulator;
use crate::player::{PlayerHandle, PlayerRegistry, PlayerSnapshot};
use crate::queue::QueuePool;
use crate::types::{GameMode, PlayerId, WaitEstimate};
use crate::utils::current_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A waiting player as shown in a queue listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedPlayer {
    /// 1-based position, front of the pool first
    pub position: usize,
    pub player: PlayerSnapshot,
    pub joined_at: DateTime<Utc>,
    pub waited_seconds: i64,
}

/// Everything known about one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player: PlayerSnapshot,
    /// Estimate for the pool the player is waiting in, if queued
    pub wait_estimate: Option<WaitEstimate>,
    pub record: PlayerRecord,
    pub recent_matches: Vec<Match>,
}

/// The matchmaking engine
pub struct MatchmakingEngine {
    ledger_settings: LedgerSettings,
    registry: PlayerRegistry,
    pools: QueuePool,
    matcher: MatchMaker,
    ledger: MatchLedger,
    /// Metrics collector for recording engine activity
    metrics_collector: Arc<MetricsCollector>,
    started_at: DateTime<Utc>,
}

impl MatchmakingEngine {
    /// Create an engine with its own metrics collector
    pub fn new(matching: &MatchingConfig, ledger_settings: LedgerSettings) -> Result<Self> {
        let metrics_collector = Arc::new(MetricsCollector::new()?);
        Ok(Self::with_metrics(matching, ledger_settings, metrics_collector))
    }

    /// Create an engine that records into an existing metrics collector
    pub fn with_metrics(
        matching: &MatchingConfig,
        ledger_settings: LedgerSettings,
        metrics_collector: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            ledger_settings,
            registry: PlayerRegistry::new(),
            pools: QueuePool::new(),
            matcher: MatchMaker::new(matching),
            ledger: MatchLedger::new(),
            metrics_collector,
            started_at: current_timestamp(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.matching, config.ledger.clone())
    }

    /// Replace the pairing policy of one mode
    pub fn with_policy(mut self, policy: Arc<dyn PairingPolicy>) -> Self {
        info!("Installing custom pairing policy for {}", policy.mode());
        self.matcher = self.matcher.with_policy(policy);
        self
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics_collector.clone()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    // Players

    /// Register a new player; usernames are unique ignoring case
    pub fn create_player(
        &self,
        username: &str,
        skill_rating: i32,
        preferred_mode: GameMode,
    ) -> Result<PlayerHandle> {
        let player = self
            .registry
            .create_player(username, skill_rating, preferred_mode)?;
        self.metrics_collector.record_player_created();
        Ok(player)
    }

    /// All players in creation order
    pub fn list_players(&self) -> Result<Vec<PlayerHandle>> {
        self.registry.list_players()
    }

    /// Case-insensitive username lookup
    pub fn find_player(&self, username: &str) -> Result<Option<PlayerHandle>> {
        self.registry.find_by_username(username)
    }

    pub fn get_player(&self, player_id: PlayerId) -> Result<PlayerHandle> {
        self.registry.get(&player_id)?.ok_or_else(|| {
            MatchmakingError::PlayerNotFound {
                player_id: player_id.to_string(),
            }
            .into()
        })
    }

    /// Change a player's rating from outside the matching flow
    ///
    /// Takes effect for later pairing scans; matches already created keep
    /// the rating they were formed with.
    pub fn set_skill_rating(&self, player: &PlayerHandle, rating: i32) {
        let previous = player.skill_rating();
        player.set_skill_rating(rating);
        info!(
            "Updated skill rating - player: '{}', {} -> {}",
            player.username(),
            previous,
            rating
        );
    }

    // Pools

    /// Put a player at the back of a mode's pool
    ///
    /// The caller must not enqueue a player that is already waiting.
    pub fn enqueue(&self, mode: GameMode, player: &PlayerHandle) -> Result<()> {
        let pool_size = self.pools.enqueue(mode, player)?;
        self.metrics_collector.record_enqueue(mode, pool_size);

        info!(
            "Queued player '{}' (skill {}) for {} - pool size: {}",
            player.username(),
            player.skill_rating(),
            mode,
            pool_size
        );
        Ok(())
    }

    /// Take a player out of whichever pool holds them; a no-op when idle
    pub fn remove_everywhere(&self, player: &PlayerHandle) -> Result<Option<GameMode>> {
        match self.pools.remove_everywhere(player)? {
            Some((mode, pool_size)) => {
                self.metrics_collector.record_removal(mode, pool_size);
                info!(
                    "Removed player '{}' from {} pool - pool size: {}",
                    player.username(),
                    mode,
                    pool_size
                );
                Ok(Some(mode))
            }
            None => {
                debug!("Player '{}' was not queued", player.username());
                Ok(None)
            }
        }
    }

    /// Players waiting in a mode, front to back
    pub fn snapshot(&self, mode: GameMode) -> Result<Vec<PlayerHandle>> {
        self.pools.snapshot(mode)
    }

    pub fn count(&self, mode: GameMode) -> Result<usize> {
        self.pools.count(mode)
    }

    /// Positions, join times and waits for everyone in a mode's pool
    pub fn queue_status(&self, mode: GameMode) -> Result<Vec<QueuedPlayer>> {
        let now = current_timestamp();
        let entries = self.pools.entries(mode)?;

        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| QueuedPlayer {
                position: index + 1,
                player: entry.player.snapshot(),
                joined_at: entry.joined_at,
                waited_seconds: (now - entry.joined_at).num_seconds(),
            })
            .collect())
    }

    // Matching

    /// Attempt to pair two players of a mode
    ///
    /// Returns `Ok(None)` when the pool has fewer than two players or the
    /// mode's policy finds no acceptable pair.
    pub fn try_create_match(&self, mode: GameMode) -> Result<Option<Match>> {
        let timer = self.metrics_collector.start_timer();
        let outcome = self.matcher.try_create_match(&self.pools, mode)?;
        let now = current_timestamp();

        let paired = outcome.as_ref().map(|outcome| {
            let waits = [&outcome.first, &outcome.second]
                .map(|entry| (now - entry.joined_at).to_std().unwrap_or_default());
            (outcome.pending.skill_difference(), waits)
        });
        self.metrics_collector
            .record_match_attempt(mode, paired, timer.stop());

        if let Some(outcome) = &outcome {
            for mode in GameMode::ALL {
                self.metrics_collector
                    .set_pool_size(mode, outcome.pool_sizes[mode.index()]);
            }
        }

        Ok(outcome.map(|outcome| outcome.pending))
    }

    /// Coarse wait estimate for a mode
    pub fn estimate_wait(&self, mode: GameMode) -> Result<WaitEstimate> {
        self.matcher.estimate_wait(&self.pools, mode)
    }

    // Outcomes and history

    /// Resolve a match with an externally decided winner and append it to
    /// the ledger
    pub fn record_match(&self, pending: Match, winner: PlayerId) -> Result<Match> {
        let mode = pending.mode();
        let recorded = self.ledger.record(pending, winner)?;
        self.metrics_collector.record_match_recorded(mode);
        Ok(recorded)
    }

    /// Ask the simulator for a winner, exactly once, then record the match
    pub fn resolve_match(
        &self,
        pending: Match,
        simulator: &dyn OutcomeSimulator,
    ) -> Result<Match> {
        let winner = simulator.decide_winner(&pending)?;
        if !pending.involves(winner) {
            warn!(
                "Simulator picked {} who is not part of match {}",
                winner,
                pending.id()
            );
        }
        self.record_match(pending, winner)
    }

    /// Most recent matches involving a player, newest first
    pub fn recent_matches_for(&self, player_id: PlayerId, limit: usize) -> Result<Vec<Match>> {
        self.ledger.recent_matches_for(player_id, limit)
    }

    /// Mean skill difference over all recorded matches, 0 when none
    pub fn average_skill_difference(&self) -> Result<f64> {
        self.ledger.average_skill_difference()
    }

    /// Every recorded match, oldest first
    pub fn match_history(&self) -> Result<Vec<Match>> {
        self.ledger.history()
    }

    pub fn player_record(&self, player_id: PlayerId) -> Result<PlayerRecord> {
        self.ledger.player_record(player_id)
    }

    pub fn player_summary(&self, player: &PlayerHandle) -> Result<PlayerSummary> {
        let snapshot = player.snapshot();
        let wait_estimate = match snapshot.queue_state.mode() {
            Some(mode) => Some(self.estimate_wait(mode)?),
            None => None,
        };

        Ok(PlayerSummary {
            player: snapshot,
            wait_estimate,
            record: self.ledger.player_record(player.id())?,
            recent_matches: self
                .ledger
                .recent_matches_for(player.id(), self.ledger_settings.recent_history_limit)?,
        })
    }

    /// Read-only aggregate of players, pools and ledger
    pub fn stats(&self) -> Result<EngineStats> {
        let total_players = self.registry.player_count()?;
        let pool_sizes = PoolSizes::from_counts(self.pools.counts()?);
        let summary = self.ledger.summary(self.ledger_settings.stats_recent_window)?;
        let uptime_seconds = (current_timestamp() - self.started_at).num_seconds();
        self.metrics_collector.update_uptime(uptime_seconds);

        Ok(EngineStats {
            total_players,
            total_matches: summary.total_matches,
            pool_sizes,
            average_skill_difference: summary.average_skill_difference,
            recent_matches: summary.recent_matches,
            started_at: self.started_at,
            uptime_seconds,
        })
    }
}
