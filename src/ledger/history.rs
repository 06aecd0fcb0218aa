//! Append-only match history
//!
//! Appends and aggregate reads share one lock so an aggregate never sees a
//! half-recorded match.

use crate::error::{MatchmakingError, Result};
use crate::ledger::record::Match;
use crate::ledger::stats::{LedgerSummary, PlayerRecord};
use crate::types::{MatchId, PlayerId};
use std::collections::HashSet;
use std::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Default)]
struct LedgerInner {
    /// Resolved matches, oldest first
    matches: Vec<Match>,
    recorded_ids: HashSet<MatchId>,
    total_matches: u64,
    skill_difference_sum: u64,
}

impl LedgerInner {
    fn average_skill_difference(&self) -> f64 {
        if self.matches.is_empty() {
            return 0.0;
        }
        self.skill_difference_sum as f64 / self.matches.len() as f64
    }
}

/// In-memory match ledger
#[derive(Debug, Default)]
pub struct MatchLedger {
    inner: RwLock<LedgerInner>,
}

impl MatchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a match with an externally decided winner and append it
    ///
    /// Fails with `AlreadyResolved` when the match already carries an outcome
    /// or was recorded before, and with `NotAParticipant` when `winner` did
    /// not play in it.
    pub fn record(&self, mut pending: Match, winner: PlayerId) -> Result<Match> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| MatchmakingError::lock_poisoned("ledger"))?;

        if inner.recorded_ids.contains(&pending.id()) {
            warn!("Match {} was already recorded, ignoring duplicate", pending.id());
            return Err(MatchmakingError::AlreadyResolved {
                match_id: pending.id().to_string(),
            }
            .into());
        }

        pending.resolve(winner)?;

        inner.recorded_ids.insert(pending.id());
        inner.total_matches += 1;
        inner.skill_difference_sum += u64::from(pending.skill_difference());
        inner.matches.push(pending.clone());

        info!(
            "Recorded {} match {} - winner: '{}', skill difference: {}, total matches: {}",
            pending.mode(),
            pending.id(),
            pending
                .participant(winner)
                .map(|p| p.username.as_str())
                .unwrap_or_default(),
            pending.skill_difference(),
            inner.total_matches
        );

        Ok(pending)
    }

    /// Up to `limit` most recent matches involving a player, newest first
    pub fn recent_matches_for(&self, player_id: PlayerId, limit: usize) -> Result<Vec<Match>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| MatchmakingError::lock_poisoned("ledger"))?;

        // Walk newest-appended first so equal timestamps keep append order
        let mut involved: Vec<Match> = inner
            .matches
            .iter()
            .rev()
            .filter(|m| m.involves(player_id))
            .cloned()
            .collect();
        involved.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        involved.truncate(limit);

        Ok(involved)
    }

    /// Mean skill difference over every recorded match, 0 when empty
    pub fn average_skill_difference(&self) -> Result<f64> {
        let inner = self
            .inner
            .read()
            .map_err(|_| MatchmakingError::lock_poisoned("ledger"))?;

        Ok(inner.average_skill_difference())
    }

    pub fn total_matches(&self) -> Result<u64> {
        let inner = self
            .inner
            .read()
            .map_err(|_| MatchmakingError::lock_poisoned("ledger"))?;

        Ok(inner.total_matches)
    }

    /// Every recorded match, oldest first
    pub fn history(&self) -> Result<Vec<Match>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| MatchmakingError::lock_poisoned("ledger"))?;

        Ok(inner.matches.clone())
    }

    /// Wins and losses of a player across the ledger
    pub fn player_record(&self, player_id: PlayerId) -> Result<PlayerRecord> {
        let inner = self
            .inner
            .read()
            .map_err(|_| MatchmakingError::lock_poisoned("ledger"))?;

        let mut record = PlayerRecord::new(player_id);
        for won in inner.matches.iter().filter_map(|m| m.won_by(player_id)) {
            record.matches_played += 1;
            if won {
                record.wins += 1;
            } else {
                record.losses += 1;
            }
        }

        Ok(record)
    }

    /// Aggregate figures taken together
    pub fn summary(&self, recent_window: usize) -> Result<LedgerSummary> {
        let inner = self
            .inner
            .read()
            .map_err(|_| MatchmakingError::lock_poisoned("ledger"))?;

        Ok(LedgerSummary {
            total_matches: inner.total_matches,
            average_skill_difference: inner.average_skill_difference(),
            recent_matches: inner.matches.len().min(recent_window),
        })
    }
}
