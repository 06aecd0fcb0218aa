//! Match records and the append-only ledger
//!
//! This module owns resolved matches and everything derived from them:
//! history, per-player records and aggregate statistics.

pub mod history;
pub mod record;
pub mod stats;

// Re-export commonly used types
pub use history::MatchLedger;
pub use record::{Match, MatchParticipant};
pub use stats::{EngineStats, LedgerSummary, PlayerRecord, PoolSizes};
