//! Outcome resolution for pending matches
//!
//! The engine does not decide who wins. Callers supply an `OutcomeSimulator`
//! that is consulted exactly once per match; its answer is fed into the
//! ledger.

use crate::error::{MatchmakingError, Result};
use crate::ledger::Match;
use crate::types::PlayerId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use tracing::debug;

/// Capability that decides the winner of a pending match
#[cfg_attr(test, mockall::automock)]
pub trait OutcomeSimulator: Send + Sync {
    /// Return the id of the winning participant
    fn decide_winner(&self, pending: &Match) -> Result<PlayerId>;
}

/// Picks a winner at random, weighted by skill rating
///
/// Player 1 wins with probability `s1 / (s1 + s2)`; ratings below 1 count
/// as 1.
#[derive(Debug)]
pub struct SkillWeightedSimulator {
    rng: Mutex<StdRng>,
}

impl SkillWeightedSimulator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic simulator for reproducible sessions
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Probability that player 1 wins
    pub fn player1_win_probability(pending: &Match) -> f64 {
        let weight1 = f64::from(pending.player1().skill_rating.max(1));
        let weight2 = f64::from(pending.player2().skill_rating.max(1));
        weight1 / (weight1 + weight2)
    }
}

impl Default for SkillWeightedSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeSimulator for SkillWeightedSimulator {
    fn decide_winner(&self, pending: &Match) -> Result<PlayerId> {
        let probability = Self::player1_win_probability(pending);
        let player1_wins = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| MatchmakingError::lock_poisoned("simulator rng"))?;
            rng.gen_bool(probability)
        };

        let winner = if player1_wins {
            pending.player1()
        } else {
            pending.player2()
        };

        debug!(
            "Simulated match {} - P(player1)={:.3}, winner: '{}'",
            pending.id(),
            probability,
            winner.username
        );

        Ok(winner.id)
    }
}
