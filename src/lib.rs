//! Duel Queue - matchmaking engine for mode-based 1v1 queueing
//!
//! This crate pairs waiting players into two-player matches. Each game mode
//! has its own FIFO pool and pairing policy: Casual is first come first
//! served, Ranked pairs inside a skill window, and QuickPlay switches from
//! skill matching to fast matching as its pool grows. Resolved matches are
//! kept in an append-only ledger that backs history and statistics.

pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod matchmaking;
pub mod metrics;
pub mod outcome;
pub mod player;
pub mod queue;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{MatchmakingError, Result};
pub use types::*;

// Re-export key components
pub use engine::{MatchmakingEngine, PlayerSummary, QueuedPlayer};
pub use ledger::{EngineStats, Match, MatchParticipant, PlayerRecord};
pub use outcome::{OutcomeSimulator, SkillWeightedSimulator};
pub use player::{Player, PlayerHandle};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
