//! Main entry point for the duel-queue session runner
//!
//! Builds a matchmaking engine from configuration, seeds a roster of players
//! and drives matching rounds until the session ends or Ctrl+C is pressed.

use anyhow::Result;
use clap::Parser;
use duel_queue::config::{validate_config, AppConfig};
use duel_queue::service::{AppState, SessionReport};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};

/// Duel Queue - mode-based 1v1 matchmaking session runner
#[derive(Parser)]
#[command(
    name = "duel-queue",
    version,
    about = "Run a simulated matchmaking session over Casual, Ranked and QuickPlay pools",
    long_about = "Duel Queue pairs waiting players into two-player matches. Casual pairs the \
                 earliest arrivals, Ranked pairs inside a skill window, and QuickPlay trades \
                 skill for speed once its pool grows. This binary seeds a roster, runs matching \
                 rounds on a fixed interval and reports the final statistics."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without running a session")]
    dry_run: bool,

    /// Roster size override
    #[arg(long, value_name = "COUNT", help = "Number of players to generate")]
    players: Option<usize>,

    /// Round count override
    #[arg(long, value_name = "COUNT", help = "Number of matching rounds to run")]
    ticks: Option<u32>,

    /// Round interval override
    #[arg(long, value_name = "MS", help = "Delay between matching rounds in milliseconds")]
    tick_ms: Option<u64>,

    /// Simulator seed override
    #[arg(long, value_name = "SEED", help = "Seed for roster generation and match outcomes")]
    seed: Option<u64>,

    /// Print the final report as JSON
    #[arg(long, help = "Print the session report as JSON on stdout")]
    json: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with session information
fn display_startup_banner(config: &AppConfig) {
    info!("Duel Queue v{}", duel_queue::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Skill window: {}", config.matching.skill_window);
    info!(
        "   QuickPlay: skill pairing up to {} players, fast pairing above {}",
        config.matching.quick_play_skill_pool_max, config.matching.quick_play_fast_pool_threshold
    );
    info!(
        "   Session: {} players, {} rounds every {}ms",
        config.session.roster_size, config.session.max_ticks, config.session.tick_interval_ms
    );
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(players) = args.players {
        config.session.roster_size = players;
    }

    if let Some(ticks) = args.ticks {
        config.session.max_ticks = ticks;
    }

    if let Some(tick_ms) = args.tick_ms {
        config.session.tick_interval_ms = tick_ms;
    }

    if let Some(seed) = args.seed {
        config.session.simulator_seed = Some(seed);
    }

    validate_config(&config)?;
    Ok(config)
}

fn print_report(report: &SessionReport, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let stats = &report.stats;
    info!("Rounds run: {}", report.ticks);
    info!("Total players: {}", stats.total_players);
    info!("Total matches: {}", stats.total_matches);
    info!(
        "Waiting - Casual: {}, Ranked: {}, QuickPlay: {}",
        stats.pool_sizes.casual, stats.pool_sizes.ranked, stats.pool_sizes.quick_play
    );
    info!(
        "Average skill difference: {:.2}",
        stats.average_skill_difference
    );
    info!("Recent matches: {}", stats.recent_matches);
    info!("Uptime: {}s", stats.uptime_seconds);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without running a session");
        return Ok(());
    }

    display_startup_banner(&config);

    let app_state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    app_state.seed_roster()?;
    info!("Press Ctrl+C to stop the session early...");

    let report = app_state.run_session(wait_for_shutdown_signal()).await?;
    print_report(&report, args.json)?;

    info!("Duel Queue session stopped");
    Ok(())
}
