//! Stopwatch - record event timestamps from the terminal
//!
//! CLI entry point: reads ticks from stdin, writes status to stderr and the
//! CSV report to stdout or a file.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use stopwatch::cli::Cli;
use stopwatch::config::Config;
use stopwatch::{LineSource, Termination, report, run_session, spawn_signal_listener};

fn parse_level(level: Option<&str>) -> tracing::Level {
    match level.map(|s| s.to_uppercase()).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") | None => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", other);
            tracing::Level::WARN
        }
    }
}

/// Logs never go to stdout, which may be carrying the report
fn setup_logging(level: Option<&str>, log_file: Option<&Path>) -> Result<()> {
    let level = parse_level(level);
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    match log_file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).context("Failed to create log directory")?;
            }
            let file = fs::File::create(path).context("Failed to create log file")?;
            tracing_subscriber::fmt()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(io::stderr)
                .with_env_filter(filter)
                .init();
        }
    }

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let settings = loaded.config.resolve(&cli);

    setup_logging(settings.log_level.as_deref(), settings.log_file.as_deref()).context("Failed to setup logging")?;
    for skipped in &loaded.skipped {
        warn!("Failed to load config from {}: {:#}", skipped.path.display(), skipped.error);
    }
    match &loaded.path {
        Some(path) => debug!("Loaded config from: {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }
    info!(destination = %settings.destination, "stopwatch starting");

    let termination = Termination::new();
    let signals = spawn_signal_listener(termination.clone()).context("Failed to install signal handlers")?;

    let log = run_session(LineSource::stdin(), termination.clone(), io::stderr()).await;

    // The listener exits on its own once the session has terminated
    let _ = signals.await;
    debug!(reason = ?termination.reason(), "main: session ended");

    report::emit(&log, &settings.comment, &settings.destination).context("problem writing CSV")?;

    Ok(())
}
