//! Metrics for the matchmaking engine

pub mod collector;

pub use collector::{
    MatchMetrics, MetricsCollector, MetricsTimer, PerformanceMetrics, PlayerMetrics, QueueMetrics,
};
