//! Main application configuration
//!
//! This module defines the primary configuration structures for the duel-queue
//! engine and session runner, including environment variable and file loading
//! and validation.

use crate::config::matching::MatchingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub matching: MatchingConfig,
    pub ledger: LedgerSettings,
    pub session: SessionSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Match history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Number of recent matches shown in a player summary
    pub recent_history_limit: usize,
    /// Window used for the "recent matches" figure in engine stats
    pub stats_recent_window: usize,
}

/// Settings for the caller-driven session loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Delay between matching rounds in milliseconds
    pub tick_interval_ms: u64,
    /// Number of matching rounds before the session ends
    pub max_ticks: u32,
    /// Players generated for the session
    pub roster_size: usize,
    /// Upper bound for generated skill ratings
    pub max_skill_rating: i32,
    /// Seed for the outcome simulator, random when unset
    pub simulator_seed: Option<u64>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "duel-queue".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            recent_history_limit: 3,
            stats_recent_window: 5,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 250,
            max_ticks: 20,
            roster_size: 12,
            max_skill_rating: 10,
            simulator_seed: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Matching settings
        if let Ok(window) = env::var("SKILL_WINDOW") {
            self.matching.skill_window = window
                .parse()
                .map_err(|_| anyhow!("Invalid SKILL_WINDOW value: {}", window))?;
        }
        if let Ok(max) = env::var("QUICK_PLAY_SKILL_POOL_MAX") {
            self.matching.quick_play_skill_pool_max = max
                .parse()
                .map_err(|_| anyhow!("Invalid QUICK_PLAY_SKILL_POOL_MAX value: {}", max))?;
        }
        if let Ok(threshold) = env::var("QUICK_PLAY_FAST_POOL_THRESHOLD") {
            self.matching.quick_play_fast_pool_threshold = threshold.parse().map_err(|_| {
                anyhow!("Invalid QUICK_PLAY_FAST_POOL_THRESHOLD value: {}", threshold)
            })?;
        }
        if let Ok(estimator) = env::var("WAIT_ESTIMATOR") {
            self.matching.wait_estimator = estimator.parse()?;
        }

        // Ledger settings
        if let Ok(limit) = env::var("RECENT_HISTORY_LIMIT") {
            self.ledger.recent_history_limit = limit
                .parse()
                .map_err(|_| anyhow!("Invalid RECENT_HISTORY_LIMIT value: {}", limit))?;
        }
        if let Ok(window) = env::var("STATS_RECENT_WINDOW") {
            self.ledger.stats_recent_window = window
                .parse()
                .map_err(|_| anyhow!("Invalid STATS_RECENT_WINDOW value: {}", window))?;
        }

        // Session settings
        if let Ok(interval) = env::var("TICK_INTERVAL_MS") {
            self.session.tick_interval_ms = interval
                .parse()
                .map_err(|_| anyhow!("Invalid TICK_INTERVAL_MS value: {}", interval))?;
        }
        if let Ok(ticks) = env::var("MAX_TICKS") {
            self.session.max_ticks = ticks
                .parse()
                .map_err(|_| anyhow!("Invalid MAX_TICKS value: {}", ticks))?;
        }
        if let Ok(size) = env::var("ROSTER_SIZE") {
            self.session.roster_size = size
                .parse()
                .map_err(|_| anyhow!("Invalid ROSTER_SIZE value: {}", size))?;
        }
        if let Ok(max_skill) = env::var("MAX_SKILL_RATING") {
            self.session.max_skill_rating = max_skill
                .parse()
                .map_err(|_| anyhow!("Invalid MAX_SKILL_RATING value: {}", max_skill))?;
        }
        if let Ok(seed) = env::var("SIMULATOR_SEED") {
            self.session.simulator_seed = Some(
                seed.parse()
                    .map_err(|_| anyhow!("Invalid SIMULATOR_SEED value: {}", seed))?,
            );
        }

        Ok(())
    }

    /// Get the session tick interval as Duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.session.tick_interval_ms)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.matching.validate()?;

    // Validate ledger settings
    if config.ledger.recent_history_limit == 0 {
        return Err(anyhow!("Recent history limit must be greater than 0"));
    }
    if config.ledger.stats_recent_window == 0 {
        return Err(anyhow!("Stats recent window must be greater than 0"));
    }

    // Validate session settings
    if config.session.tick_interval_ms == 0 {
        return Err(anyhow!("Tick interval must be greater than 0"));
    }
    if config.session.max_skill_rating < 1 {
        return Err(anyhow!("Max skill rating must be at least 1"));
    }

    Ok(())
}
