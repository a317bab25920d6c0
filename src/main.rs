//! tablesync binary entrypoint kept minimal. The engine lives in the library.

use std::process::ExitCode;
use std::sync::OnceLock;
use std::{fmt, time::SystemTime};

use clap::Parser;

use tablesync::args::{Args, determine_log_level};
use tablesync::config::{load_settings, load_settings_from, logs_dir};
use tablesync::scenario::{load_scenario, render_report, run_scenario};

struct TablesyncTimer;

impl tracing_subscriber::fmt::time::FormatTime for TablesyncTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let now: chrono::DateTime<chrono::Local> = SystemTime::now().into();
        w.write_str(&now.format("%Y-%m-%d-T %H:%M:%S%.3f").to_string())
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// What: Initialize tracing, writing to `<config>/logs/tablesync.log`.
///
/// Details:
/// - `RUST_LOG` wins over `level`.
/// - Falls back to stderr when the log file cannot be opened.
fn init_logging(level: &str) {
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level))
    };
    let mut log_path = logs_dir();
    log_path.push("tablesync.log");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(TablesyncTimer)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_timer(TablesyncTimer)
                .init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let settings = args
        .settings
        .as_deref()
        .map_or_else(load_settings, load_settings_from);
    init_logging(&determine_log_level(&args, &settings.log_level));
    tracing::info!(scenario = %args.scenario.display(), "tablesync starting");

    let scenario = match load_scenario(&args.scenario) {
        Ok(scenario) => scenario,
        Err(err) => {
            tracing::error!(error = %err, "cannot load scenario");
            eprintln!("tablesync: {err}");
            return ExitCode::FAILURE;
        }
    };
    let report = match run_scenario(&scenario, &settings).await {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(error = %err, "scenario failed");
            eprintln!("tablesync: {err}");
            return ExitCode::FAILURE;
        }
    };
    match render_report(&report, args.compact) {
        Ok(json) => {
            println!("{json}");
            tracing::info!("tablesync exited");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "cannot encode report");
            eprintln!("tablesync: {err}");
            ExitCode::FAILURE
        }
    }
}
