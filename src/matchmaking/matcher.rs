//! Match creation over the shared pools
//!
//! `MatchMaker` holds one pairing policy per mode plus the wait estimator,
//! and turns a policy's choice into a pending `Match`.

use crate::config::MatchingConfig;
use crate::error::Result;
use crate::ledger::Match;
use crate::matchmaking::policy::{policy_for, PairingPolicy};
use crate::matchmaking::wait_estimate::{estimator_for, WaitEstimator};
use crate::queue::{QueueEntry, QueuePool, TakenPair};
use crate::types::{GameMode, WaitEstimate};
use std::sync::Arc;
use tracing::{debug, info};

/// A match that was just formed, plus how long each side had waited
#[derive(Debug, Clone)]
pub struct PairingOutcome {
    pub pending: Match,
    pub first: QueueEntry,
    pub second: QueueEntry,
    /// Pool sizes observed when the pair was removed
    pub pool_sizes: [usize; 3],
}

/// Pairs players out of the pools according to each mode's policy
#[derive(Clone)]
pub struct MatchMaker {
    /// Indexed by `GameMode::index`
    policies: [Arc<dyn PairingPolicy>; 3],
    estimator: Arc<dyn WaitEstimator>,
}

impl MatchMaker {
    pub fn new(config: &MatchingConfig) -> Self {
        Self {
            policies: GameMode::ALL.map(|mode| policy_for(mode, config)),
            estimator: estimator_for(config.wait_estimator),
        }
    }

    /// Replace the policy serving `policy.mode()`
    pub fn with_policy(mut self, policy: Arc<dyn PairingPolicy>) -> Self {
        let index = policy.mode().index();
        self.policies[index] = policy;
        self
    }

    /// Replace the wait estimator
    pub fn with_estimator(mut self, estimator: Arc<dyn WaitEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn policy(&self, mode: GameMode) -> &dyn PairingPolicy {
        self.policies[mode.index()].as_ref()
    }

    /// Try to pair two players from a mode's pool
    ///
    /// "No match yet" is `Ok(None)`. On success both players are gone from
    /// every pool and no longer queued.
    pub fn try_create_match(&self, pools: &QueuePool, mode: GameMode) -> Result<Option<PairingOutcome>> {
        let policy = self.policy(mode);

        let Some(TakenPair {
            first,
            second,
            pool_sizes,
        }) = pools.take_pair(mode, |pool| policy.select_pair(pool))?
        else {
            debug!("No match available in {} pool", mode);
            return Ok(None);
        };

        // Built from the ratings the policy saw, not the live ones
        let pending = Match::new(mode, &first, &second);

        info!(
            "Created {} match {} - '{}' ({}) vs '{}' ({}), skill difference: {}",
            mode,
            pending.id(),
            pending.player1().username,
            pending.player1().skill_rating,
            pending.player2().username,
            pending.player2().skill_rating,
            pending.skill_difference()
        );

        Ok(Some(PairingOutcome {
            pending,
            first,
            second,
            pool_sizes,
        }))
    }

    /// Coarse wait estimate for a mode's pool
    pub fn estimate_wait(&self, pools: &QueuePool, mode: GameMode) -> Result<WaitEstimate> {
        let policy = self.policy(mode);
        pools.inspect(mode, |pool| self.estimator.estimate(policy, pool))
    }
}
