//! Application state and the caller-driven session loop
//!
//! The engine has no timers of its own. `AppState` owns one engine plus an
//! outcome simulator and drives matching rounds on a tokio interval until
//! the configured number of ticks has run or shutdown is requested.

use crate::config::AppConfig;
use crate::engine::MatchmakingEngine;
use crate::error::Result;
use crate::ledger::{EngineStats, Match};
use crate::outcome::{OutcomeSimulator, SkillWeightedSimulator};
use crate::player::PlayerHandle;
use crate::types::GameMode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },
}

/// Final figures of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub ticks: u32,
    pub matches_recorded: usize,
    pub interrupted: bool,
    pub stats: EngineStats,
}

/// Engine, simulator and configuration of one running session
pub struct AppState {
    config: AppConfig,
    engine: Arc<MatchmakingEngine>,
    simulator: Arc<dyn OutcomeSimulator>,
}

impl AppState {
    /// Build the engine and a skill-weighted simulator from configuration
    pub fn new(config: AppConfig) -> std::result::Result<Self, ServiceError> {
        let simulator: Arc<dyn OutcomeSimulator> = match config.session.simulator_seed {
            Some(seed) => Arc::new(SkillWeightedSimulator::seeded(seed)),
            None => Arc::new(SkillWeightedSimulator::new()),
        };
        Self::with_simulator(config, simulator)
    }

    /// Build the engine with a caller-supplied simulator
    pub fn with_simulator(
        config: AppConfig,
        simulator: Arc<dyn OutcomeSimulator>,
    ) -> std::result::Result<Self, ServiceError> {
        crate::config::validate_config(&config).map_err(|e| ServiceError::Configuration {
            message: e.to_string(),
        })?;

        let engine = MatchmakingEngine::from_config(&config).map_err(|e| {
            ServiceError::Initialization {
                message: format!("Failed to create matchmaking engine: {}", e),
            }
        })?;

        info!(
            "Initialized '{}' - skill window: {}, wait estimator: {:?}",
            config.service.name, config.matching.skill_window, config.matching.wait_estimator
        );

        Ok(Self {
            config,
            engine: Arc::new(engine),
            simulator,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn engine(&self) -> Arc<MatchmakingEngine> {
        self.engine.clone()
    }

    /// Create `roster_size` players with random skills and preferred modes
    /// and queue each in its preferred mode
    pub fn seed_roster(&self) -> Result<Vec<PlayerHandle>> {
        let session = &self.config.session;
        let mut rng = match session.simulator_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };

        let mut roster = Vec::with_capacity(session.roster_size);
        for n in 1..=session.roster_size {
            let skill = rng.gen_range(1..=session.max_skill_rating);
            let mode = GameMode::ALL[rng.gen_range(0..GameMode::ALL.len())];

            let player = self
                .engine
                .create_player(&format!("player-{:02}", n), skill, mode)?;
            self.engine.enqueue(mode, &player)?;
            roster.push(player);
        }

        info!("Seeded roster of {} players", roster.len());
        Ok(roster)
    }

    /// One matching round: attempt a match in every mode, resolve and record
    /// each one, then send both players back to their preferred pool
    pub fn run_round(&self) -> Result<Vec<Match>> {
        let mut recorded = Vec::new();

        for mode in GameMode::ALL {
            let Some(pending) = self.engine.try_create_match(mode)? else {
                debug!(
                    "No {} match this round - estimate: {}",
                    mode,
                    self.engine.estimate_wait(mode)?
                );
                continue;
            };

            let resolved = self.engine.resolve_match(pending, self.simulator.as_ref())?;
            for participant in [resolved.player1(), resolved.player2()] {
                let player = self.engine.get_player(participant.id)?;
                self.engine.enqueue(player.preferred_mode(), &player)?;
            }
            recorded.push(resolved);
        }

        Ok(recorded)
    }

    /// Run matching rounds on the configured interval
    ///
    /// Ends after `max_ticks` rounds or as soon as `shutdown` completes,
    /// whichever comes first.
    pub async fn run_session<F>(&self, shutdown: F) -> Result<SessionReport>
    where
        F: Future<Output = ()>,
    {
        let session = &self.config.session;
        let mut ticker = interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            "Starting session - {} rounds every {}ms",
            session.max_ticks, session.tick_interval_ms
        );

        let mut ticks = 0;
        let mut matches_recorded = 0;
        let mut interrupted = false;

        while ticks < session.max_ticks {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested after {} rounds", ticks);
                    interrupted = true;
                    break;
                }
                _ = ticker.tick() => {
                    ticks += 1;
                    match self.run_round() {
                        Ok(matches) => {
                            matches_recorded += matches.len();
                            debug!("Round {} recorded {} matches", ticks, matches.len());
                        }
                        Err(e) => {
                            error!("Round {} failed: {}", ticks, e);
                            return Err(e);
                        }
                    }
                }
            }
        }

        let stats = self.engine.stats()?;
        info!(
            "Session finished - rounds: {}, matches: {}, average skill difference: {:.2}",
            ticks, matches_recorded, stats.average_skill_difference
        );

        Ok(SessionReport {
            ticks,
            matches_recorded,
            interrupted,
            stats,
        })
    }
}
