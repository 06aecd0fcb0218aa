//! Utility functions for the matchmaking engine

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique player ID
pub fn generate_player_id() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new unique match ID
pub fn generate_match_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Calculate the absolute difference between two skill ratings
pub fn skill_difference(rating1: i32, rating2: i32) -> u32 {
    rating1.abs_diff(rating2)
}

/// Check if two skill ratings fall inside the given window (inclusive)
pub fn within_skill_window(rating1: i32, rating2: i32, window: u32) -> bool {
    skill_difference(rating1, rating2) <= window
}
