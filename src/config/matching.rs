//! Matching configuration

use crate::error::{MatchmakingError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How wait estimates are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaitEstimatorKind {
    /// Three-level estimate from pool size alone
    PoolSize,
    /// Pool size plus a check for a compatible pair in skill-window modes
    SkillAware,
}

impl FromStr for WaitEstimatorKind {
    type Err = MatchmakingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pool-size" | "pool_size" => Ok(WaitEstimatorKind::PoolSize),
            "skill-aware" | "skill_aware" => Ok(WaitEstimatorKind::SkillAware),
            other => Err(MatchmakingError::ConfigurationError {
                message: format!("Unknown wait estimator: {}", other),
            }),
        }
    }
}

/// Configuration for pairing behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Maximum skill difference allowed by Ranked and skill-based QuickPlay
    pub skill_window: u32,
    /// Largest QuickPlay pool that still pairs by skill
    pub quick_play_skill_pool_max: usize,
    /// QuickPlay pools strictly larger than this pair the two front-most players
    pub quick_play_fast_pool_threshold: usize,
    /// Wait estimate flavour
    pub wait_estimator: WaitEstimatorKind,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            skill_window: 2,
            quick_play_skill_pool_max: 3,
            quick_play_fast_pool_threshold: 4,
            wait_estimator: WaitEstimatorKind::PoolSize,
        }
    }
}

impl MatchingConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.quick_play_skill_pool_max < 2 {
            return Err(MatchmakingError::ConfigurationError {
                message: "quick_play_skill_pool_max must be at least 2".to_string(),
            }
            .into());
        }

        if self.quick_play_fast_pool_threshold < self.quick_play_skill_pool_max {
            return Err(MatchmakingError::ConfigurationError {
                message: "quick_play_fast_pool_threshold must not be below quick_play_skill_pool_max"
                    .to_string(),
            }
            .into());
        }

        Ok(())
    }
}
