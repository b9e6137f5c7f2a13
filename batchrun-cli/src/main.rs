//! Batchrun CLI
//!
//! Launches batch jobs through the job API, waits for them to finish, and
//! optionally triggers the downstream warehouse transform.
//!
//! Architecture:
//! - Configuration: flags and environment variables resolved into `Settings`
//! - Services: launching, repository lookup and status probing
//! - Scheduler: the polling state machine
//! - Commands: run modes and the end-of-run summary

mod commands;
mod config;
mod error;
mod executor;
mod scheduler;
mod service;
#[cfg(test)]
mod testing;
mod transform;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{Mode, handle_run};
use crate::config::{DEFAULT_APPLICATION_NAME, Environment, Settings};
use crate::scheduler::poller::{DEFAULT_MAX_PROBES, DEFAULT_PROBE_INTERVAL};
use crate::transform::DEFAULT_PROCEDURE;

const DEFAULT_LOG_FILTER: &str = "batchrun=info,batchrun_cli=info,batchrun_client=info";

#[derive(Parser)]
#[command(name = "batchrun")]
#[command(about = "Launch batch jobs and wait for them to complete", long_about = None)]
struct Cli {
    /// What to run
    #[arg(long, value_enum, env = "BATCHRUN_MODE")]
    mode: Mode,

    /// Job name, or repository name in repository modes
    #[arg(long)]
    name: String,

    /// Target environment
    #[arg(long, value_enum, env = "BATCHRUN_ENV")]
    env: Environment,

    /// Probe cycles before giving up on pending jobs
    #[arg(long, default_value_t = DEFAULT_MAX_PROBES)]
    max_probes: u32,

    /// Seconds between probe cycles
    #[arg(long, default_value_t = DEFAULT_PROBE_INTERVAL.as_secs())]
    probe_interval: u64,

    /// API client id
    #[arg(long, env = "BATCHRUN_CLIENT_ID", default_value = "")]
    client_id: String,

    /// API client secret
    #[arg(long, env = "BATCHRUN_CLIENT_SECRET", default_value = "", hide_env_values = true)]
    client_secret: String,

    /// Application name reported to the API
    #[arg(long, env = "BATCHRUN_APPLICATION_NAME", default_value = DEFAULT_APPLICATION_NAME)]
    application_name: String,

    /// Override the environment's API base URL
    #[arg(long, env = "BATCHRUN_BASE_URL")]
    base_url: Option<String>,

    /// Stored procedure called by the downstream transform
    #[arg(long, default_value = DEFAULT_PROCEDURE)]
    procedure: String,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn settings(&self) -> Settings {
        let defaults = Settings::for_environment(self.env);
        Settings {
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            application_name: self.application_name.clone(),
            max_probes: self.max_probes,
            probe_interval: Duration::from_secs(self.probe_interval),
            procedure: self.procedure.clone(),
            ..defaults
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_file.as_deref())?;
    info!("Logging system initialized");

    let result = run(&cli).await;
    if let Err(e) = &result {
        error!("{:#}", e);
    }

    info!("Logging system ended");
    result
}

async fn run(cli: &Cli) -> Result<()> {
    let settings = cli.settings();
    settings.validate(cli.mode).context("Invalid settings")?;

    info!(
        base_url = %settings.base_url,
        mode = ?cli.mode,
        "Environment is {}",
        settings.environment
    );

    handle_run(cli.mode, &cli.name, &settings).await
}

/// Installs the console layer and, when asked, a plain-text file layer
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    Ok(())
}

/// Open the log file for appending, creating it when missing
///
/// Earlier runs are kept; the file is never rotated.
fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_log_file_appends_across_runs() {
        let path = std::env::temp_dir().join(format!("batchrun-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);

        writeln!(open_log_file(&path).unwrap(), "first run").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second run").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first run\nsecond run\n");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_log_file_in_missing_directory() {
        let path = std::env::temp_dir()
            .join("batchrun-missing-dir")
            .join("nested")
            .join("run.log");
        let err = open_log_file(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to open log file"));
    }
}
