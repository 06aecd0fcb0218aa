//! Configuration management for the duel-queue engine
//!
//! This module handles all configuration loading from environment variables
//! and TOML files, validation, and default values.

pub mod app;
pub mod matching;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, LedgerSettings, ServiceSettings, SessionSettings};
pub use matching::{MatchingConfig, WaitEstimatorKind};
