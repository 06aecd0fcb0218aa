//! Pairing policies for each game mode
//!
//! A policy looks at a pool front to back and names the pair of positions
//! that should form a match, or nothing when the pool should keep waiting.
//! Policies never mutate the pool; removal is done by the pool itself.

use crate::config::MatchingConfig;
use crate::queue::QueueEntry;
use crate::types::GameMode;
use crate::utils::within_skill_window;
use std::sync::Arc;

/// Trait for mode-specific pairing algorithms
pub trait PairingPolicy: Send + Sync {
    /// Mode this policy serves
    fn mode(&self) -> GameMode;

    /// Pick the positions `(i, j)`, `i < j`, of the next pair to match
    fn select_pair(&self, pool: &[QueueEntry]) -> Option<(usize, usize)>;
}

/// Lexicographically first `(i, j)` with `i < j` whose ratings fall inside
/// the skill window
pub fn first_pair_within_window(ratings: &[i32], window: u32) -> Option<(usize, usize)> {
    for (i, &a) in ratings.iter().enumerate() {
        for (offset, &b) in ratings[i + 1..].iter().enumerate() {
            if within_skill_window(a, b, window) {
                return Some((i, i + 1 + offset));
            }
        }
    }
    None
}

// Entries carry the ratings captured when the scan began
fn ratings_of(pool: &[QueueEntry]) -> Vec<i32> {
    pool.iter().map(QueueEntry::skill_rating).collect()
}

/// Pure FIFO: the two earliest-joined players, regardless of skill
#[derive(Debug, Clone, Default)]
pub struct CasualPolicy;

impl PairingPolicy for CasualPolicy {
    fn mode(&self) -> GameMode {
        GameMode::Casual
    }

    fn select_pair(&self, pool: &[QueueEntry]) -> Option<(usize, usize)> {
        if pool.len() < 2 {
            return None;
        }
        Some((0, 1))
    }
}

/// First skill-compatible pair in queue order; outliers keep waiting
#[derive(Debug, Clone)]
pub struct RankedPolicy {
    skill_window: u32,
}

impl RankedPolicy {
    pub fn new(skill_window: u32) -> Self {
        Self { skill_window }
    }
}

impl PairingPolicy for RankedPolicy {
    fn mode(&self) -> GameMode {
        GameMode::Ranked
    }

    fn select_pair(&self, pool: &[QueueEntry]) -> Option<(usize, usize)> {
        if pool.len() < 2 {
            return None;
        }
        first_pair_within_window(&ratings_of(pool), self.skill_window)
    }
}

/// Skill matching while the pool is small, front-most pair once it is large
///
/// With the default thresholds a pool of exactly 4 matches nobody: it is too
/// large for the skill branch and not larger than the fast-match threshold.
#[derive(Debug, Clone)]
pub struct QuickPlayPolicy {
    skill_window: u32,
    skill_pool_max: usize,
    fast_pool_threshold: usize,
}

impl QuickPlayPolicy {
    pub fn new(skill_window: u32, skill_pool_max: usize, fast_pool_threshold: usize) -> Self {
        Self {
            skill_window,
            skill_pool_max,
            fast_pool_threshold,
        }
    }
}

impl PairingPolicy for QuickPlayPolicy {
    fn mode(&self) -> GameMode {
        GameMode::QuickPlay
    }

    fn select_pair(&self, pool: &[QueueEntry]) -> Option<(usize, usize)> {
        let size = pool.len();
        if size < 2 {
            None
        } else if size <= self.skill_pool_max {
            first_pair_within_window(&ratings_of(pool), self.skill_window)
        } else if size > self.fast_pool_threshold {
            Some((0, 1))
        } else {
            None
        }
    }
}

/// Build the policy configured for a mode
pub fn policy_for(mode: GameMode, config: &MatchingConfig) -> Arc<dyn PairingPolicy> {
    match mode {
        GameMode::Casual => Arc::new(CasualPolicy),
        GameMode::Ranked => Arc::new(RankedPolicy::new(config.skill_window)),
        GameMode::QuickPlay => Arc::new(QuickPlayPolicy::new(
            config.skill_window,
            config.quick_play_skill_pool_max,
            config.quick_play_fast_pool_threshold,
        )),
    }
}
