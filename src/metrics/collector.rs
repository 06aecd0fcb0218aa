//! Metrics collection using Prometheus
//!
//! Every metric lives on the collector's own registry so several engines
//! (and tests) can run side by side without clashing.

use crate::types::GameMode;
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the matchmaking engine
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Player-related metrics
    player_metrics: PlayerMetrics,

    /// Pool-related metrics
    queue_metrics: QueueMetrics,

    /// Match-related metrics
    match_metrics: MatchMetrics,

    /// Performance metrics
    performance_metrics: PerformanceMetrics,
}

/// Player-related metrics
#[derive(Clone)]
pub struct PlayerMetrics {
    /// Total players registered
    pub players_created_total: IntCounter,

    /// Total players put into a pool
    pub players_queued_total: IntCounterVec,

    /// Total players removed from a pool without being matched
    pub players_removed_total: IntCounterVec,
}

/// Pool-related metrics
#[derive(Clone)]
pub struct QueueMetrics {
    /// Players currently waiting per mode
    pub pool_size: IntGaugeVec,

    /// Time a player spent queued before being paired
    pub queue_wait_seconds: HistogramVec,
}

/// Match-related metrics
#[derive(Clone)]
pub struct MatchMetrics {
    /// Match attempts by result (`matched` / `no_match`)
    pub match_attempts_total: IntCounterVec,

    /// Matches resolved and appended to the ledger
    pub matches_recorded_total: IntCounterVec,

    /// Skill difference of created matches
    pub skill_difference: HistogramVec,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Time spent inside a match attempt
    pub match_attempt_duration: Histogram,

    /// Engine uptime in seconds
    pub uptime_seconds: IntGauge,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let player_metrics = PlayerMetrics::new(&registry)?;
        let queue_metrics = QueueMetrics::new(&registry)?;
        let match_metrics = MatchMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            player_metrics,
            queue_metrics,
            match_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn player(&self) -> &PlayerMetrics {
        &self.player_metrics
    }

    pub fn queue(&self) -> &QueueMetrics {
        &self.queue_metrics
    }

    pub fn matches(&self) -> &MatchMetrics {
        &self.match_metrics
    }

    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    pub fn record_player_created(&self) {
        self.player_metrics.players_created_total.inc();
    }

    /// Record a player joining a pool
    pub fn record_enqueue(&self, mode: GameMode, pool_size: usize) {
        self.player_metrics
            .players_queued_total
            .with_label_values(&[mode.as_label()])
            .inc();
        self.set_pool_size(mode, pool_size);
    }

    /// Record a player leaving a pool without a match
    pub fn record_removal(&self, mode: GameMode, pool_size: usize) {
        self.player_metrics
            .players_removed_total
            .with_label_values(&[mode.as_label()])
            .inc();
        self.set_pool_size(mode, pool_size);
    }

    pub fn set_pool_size(&self, mode: GameMode, pool_size: usize) {
        self.queue_metrics
            .pool_size
            .with_label_values(&[mode.as_label()])
            .set(pool_size as i64);
    }

    /// Record the result of a match attempt
    ///
    /// `paired` carries the skill difference and both queue waits when a
    /// match was formed.
    pub fn record_match_attempt(
        &self,
        mode: GameMode,
        paired: Option<(u32, [Duration; 2])>,
        duration: Duration,
    ) {
        let label = mode.as_label();
        let result = if paired.is_some() { "matched" } else { "no_match" };

        self.match_metrics
            .match_attempts_total
            .with_label_values(&[label, result])
            .inc();

        if let Some((skill_difference, waits)) = paired {
            self.match_metrics
                .skill_difference
                .with_label_values(&[label])
                .observe(f64::from(skill_difference));

            for wait in waits {
                self.queue_metrics
                    .queue_wait_seconds
                    .with_label_values(&[label])
                    .observe(wait.as_secs_f64());
            }
        }

        self.performance_metrics
            .match_attempt_duration
            .observe(duration.as_secs_f64());
    }

    pub fn record_match_recorded(&self, mode: GameMode) {
        self.match_metrics
            .matches_recorded_total
            .with_label_values(&[mode.as_label()])
            .inc();
    }

    pub fn update_uptime(&self, uptime_seconds: i64) {
        self.performance_metrics.uptime_seconds.set(uptime_seconds);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl PlayerMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let players_created_total = IntCounter::new(
            "duel_queue_players_created_total",
            "Total players registered",
        )?;
        registry.register(Box::new(players_created_total.clone()))?;

        let players_queued_total = IntCounterVec::new(
            Opts::new("duel_queue_players_queued_total", "Total players queued"),
            &["mode"],
        )?;
        registry.register(Box::new(players_queued_total.clone()))?;

        let players_removed_total = IntCounterVec::new(
            Opts::new(
                "duel_queue_players_removed_total",
                "Total players removed from a pool without a match",
            ),
            &["mode"],
        )?;
        registry.register(Box::new(players_removed_total.clone()))?;

        Ok(Self {
            players_created_total,
            players_queued_total,
            players_removed_total,
        })
    }
}

impl QueueMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let pool_size = IntGaugeVec::new(
            Opts::new("duel_queue_pool_size", "Players currently waiting"),
            &["mode"],
        )?;
        registry.register(Box::new(pool_size.clone()))?;

        let queue_wait_seconds = HistogramVec::new(
            HistogramOpts::new(
                "duel_queue_queue_wait_seconds",
                "Time spent queued before being paired",
            )
            .buckets(vec![0.01, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 300.0]),
            &["mode"],
        )?;
        registry.register(Box::new(queue_wait_seconds.clone()))?;

        Ok(Self {
            pool_size,
            queue_wait_seconds,
        })
    }
}

impl MatchMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let match_attempts_total = IntCounterVec::new(
            Opts::new("duel_queue_match_attempts_total", "Total match attempts"),
            &["mode", "result"],
        )?;
        registry.register(Box::new(match_attempts_total.clone()))?;

        let matches_recorded_total = IntCounterVec::new(
            Opts::new(
                "duel_queue_matches_recorded_total",
                "Total matches resolved and recorded",
            ),
            &["mode"],
        )?;
        registry.register(Box::new(matches_recorded_total.clone()))?;

        let skill_difference = HistogramVec::new(
            HistogramOpts::new(
                "duel_queue_skill_difference",
                "Skill difference of created matches",
            )
            .buckets(vec![0.0, 1.0, 2.0, 3.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
            &["mode"],
        )?;
        registry.register(Box::new(skill_difference.clone()))?;

        Ok(Self {
            match_attempts_total,
            matches_recorded_total,
            skill_difference,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let match_attempt_duration = Histogram::with_opts(
            HistogramOpts::new(
                "duel_queue_match_attempt_duration_seconds",
                "Match attempt processing time",
            )
            .buckets(vec![0.00001, 0.0001, 0.001, 0.005, 0.01, 0.05, 0.1]),
        )?;
        registry.register(Box::new(match_attempt_duration.clone()))?;

        let uptime_seconds =
            IntGauge::new("duel_queue_uptime_seconds", "Engine uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            match_attempt_duration,
            uptime_seconds,
        })
    }
}
