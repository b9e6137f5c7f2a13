//! Job executor
//!
//! Wires the launcher, resolver and poller into the two runs the CLI offers:
//! one named job, or every job of a repository. Errors are returned as values;
//! the entry point logs them.

use batchrun_client::Transport;
use batchrun_core::domain::job::JobDescriptor;
use std::sync::Arc;
use tracing::info;

use crate::error::ExecutorError;
use crate::scheduler::{CompletedBatch, CompletionPoller, PollerConfig};
use crate::service::{JobLauncher, RepositoryResolver, StatusProber};

/// Launches jobs and waits for them to complete
pub struct JobExecutor {
    launcher: JobLauncher,
    resolver: RepositoryResolver,
    poller: CompletionPoller,
}

impl JobExecutor {
    /// Creates an executor whose components share one transport
    pub fn new(transport: Arc<dyn Transport>, config: PollerConfig) -> Self {
        Self {
            launcher: JobLauncher::new(Arc::clone(&transport)),
            resolver: RepositoryResolver::new(Arc::clone(&transport)),
            poller: CompletionPoller::new(StatusProber::new(transport), config),
        }
    }

    /// Launch one job by name and wait for it
    pub async fn run_job(&self, job_name: &str) -> Result<CompletedBatch, ExecutorError> {
        let jobs = self.launcher.launch_single(job_name).await?;

        self.await_completion(jobs).await
    }

    /// Launch every job of a repository and wait for all of them
    pub async fn run_repository(
        &self,
        repository_name: &str,
    ) -> Result<CompletedBatch, ExecutorError> {
        let repository_id = self.resolver.resolve(repository_name).await?;
        let jobs = self.launcher.launch_bulk(&repository_id).await?;

        self.await_completion(jobs).await
    }

    async fn await_completion(
        &self,
        jobs: Vec<JobDescriptor>,
    ) -> Result<CompletedBatch, ExecutorError> {
        let outcome = self.poller.poll(jobs).await;

        info!(
            success = outcome.is_success(),
            cycles = outcome.cycles(),
            completed = outcome.completed().len(),
            "Polling session finished"
        );

        outcome.into_result()
    }
}
