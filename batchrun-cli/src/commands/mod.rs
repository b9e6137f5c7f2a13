//! Commands module
//!
//! Defines the run modes and drives a run: launch and wait, then optionally
//! hand over to the downstream transform.

mod summary;

use anyhow::{Context, Result};
use batchrun_client::ApiClient;
use clap::ValueEnum;
use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::executor::JobExecutor;
use crate::scheduler::CompletedBatch;
use crate::transform::{DownstreamTransform, LogStatementSink, ProcedureTransform};

/// What a run does
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Launch one job and wait for it
    Job,
    /// Launch every job of a repository and wait for them
    Repository,
    /// Only run the downstream transform
    Transform,
    /// `job`, then the transform
    #[value(alias = "fulljob")]
    FullJob,
    /// `repository`, then the transform
    #[value(alias = "fullrepository")]
    FullRepository,
}

impl Mode {
    pub fn launches_job(self) -> bool {
        matches!(self, Self::Job | Self::FullJob)
    }

    pub fn launches_repository(self) -> bool {
        matches!(self, Self::Repository | Self::FullRepository)
    }

    /// Whether the run talks to the job API at all
    pub fn uses_api(self) -> bool {
        self.launches_job() || self.launches_repository()
    }

    pub fn runs_transform(self) -> bool {
        matches!(self, Self::Transform | Self::FullJob | Self::FullRepository)
    }

    /// Job name the transform is keyed by
    ///
    /// Repository runs cover many jobs, so the transform gets an empty name.
    pub fn transform_key(self, name: &str) -> &str {
        if self.launches_repository() { "" } else { name }
    }
}

/// What a finished run did
#[derive(Debug, Default)]
pub struct RunReport {
    pub batch: Option<CompletedBatch>,
    pub transformed: bool,
}

/// Handle a run against the configured job API
///
/// # Arguments
/// * `mode` - What to run
/// * `name` - Job name, or repository name in repository modes
/// * `settings` - Validated settings
pub async fn handle_run(mode: Mode, name: &str, settings: &Settings) -> Result<()> {
    let client = ApiClient::new(settings.base_url.clone(), settings.identity());
    let executor = JobExecutor::new(Arc::new(client), settings.poller_config());
    let transform = ProcedureTransform::new(settings.procedure.clone(), LogStatementSink);

    let report = execute(mode, name, &executor, &transform).await?;
    summary::print_run_report(mode, name, &report);

    Ok(())
}

/// Run `mode` with the given executor and transform
pub async fn execute(
    mode: Mode,
    name: &str,
    executor: &JobExecutor,
    transform: &dyn DownstreamTransform,
) -> Result<RunReport> {
    if name.trim().is_empty() {
        anyhow::bail!("Name must be provided");
    }

    let mut report = RunReport::default();

    if mode.launches_job() {
        let batch = executor
            .run_job(name)
            .await
            .with_context(|| format!("Job {} did not complete properly", name))?;
        report.batch = Some(batch);
    } else if mode.launches_repository() {
        let batch = executor
            .run_repository(name)
            .await
            .with_context(|| format!("Jobs of repository {} did not complete properly", name))?;
        report.batch = Some(batch);
    }

    if mode.runs_transform() {
        let key = mode.transform_key(name);
        info!(job_name = key, "Starting downstream transform");
        transform
            .invoke(key)
            .await
            .context("Downstream transform failed")?;
        report.transformed = true;
    }

    Ok(report)
}
