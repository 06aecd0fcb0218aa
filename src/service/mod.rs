//! Service layer for the duel-queue session runner
//!
//! This module contains the application state and the session loop that
//! drives the engine on a schedule.

pub mod app;

pub use app::{AppState, ServiceError, SessionReport};
