//! Puzzlebot entry point: starts the daily scheduler and runs forever.

use clap::Parser;
use puzzlebot::channels::{self, DispatchValidationSeverity};
use puzzlebot::puzzle;
use puzzlebot::scheduler::{Clock, SystemClock};
use puzzlebot::{BotConfig, PuzzleJob, Scheduler};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Sends a chess puzzle to a messaging recipient on a daily schedule.
#[derive(Parser)]
#[command(name = "puzzlebot", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, env = "PUZZLEBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Run one puzzle cycle immediately before entering the schedule.
    #[arg(long)]
    run_now: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("puzzlebot=info,reqwest=warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BotConfig::from_file(path)?,
        None => BotConfig::load_or_default(&BotConfig::default_config_path())?,
    };
    config.validate()?;

    for issue in channels::validate_config(&config.dispatch) {
        match issue.severity {
            DispatchValidationSeverity::Warning => warn!("{}: {}", issue.id, issue.summary),
            DispatchValidationSeverity::Error => error!("{}: {}", issue.id, issue.summary),
        }
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ledger = puzzle::ledger_for(&config);
    let dispatcher = channels::build_dispatcher(&config.dispatch);
    match dispatcher.health_check().await {
        Ok(true) => info!("{} dispatcher ready", dispatcher.id()),
        Ok(false) => warn!("{} dispatcher failed its health check", dispatcher.id()),
        Err(e) => warn!("{} health check error: {e:#}", dispatcher.id()),
    }
    let job = Arc::new(PuzzleJob::from_config(
        &config,
        ledger,
        dispatcher,
        clock.clone(),
    ));

    if cli.run_now {
        job.run_once().await;
    }

    let mut scheduler = Scheduler::new(job, clock)
        .with_poll_interval(Duration::from_secs(config.schedule.poll_interval_secs));
    for at in config.schedule.daily_times()? {
        scheduler.every_day_at(at);
    }

    println!("Chess Bot Scheduler Started");
    println!("Scheduled times:");
    for next in scheduler.next_runs() {
        println!("- {}", next.format("%H:%M"));
    }

    tokio::select! {
        () = scheduler.run() => {}
        result = tokio::signal::ctrl_c() => {
            if result.is_ok() {
                info!("received Ctrl+C, shutting down");
            }
        }
    }

    Ok(())
}
