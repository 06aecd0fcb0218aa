//! Waiting pools, one FIFO sequence per game mode

pub mod pool;

pub use pool::{QueueEntry, QueuePool, TakenPair};
