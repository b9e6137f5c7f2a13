//! Completion poller
//!
//! One polling session owns the set of incomplete jobs. Each cycle probes
//! every pending job in turn, drops the ones that completed, and either
//! finishes, gives up, or sleeps before the next cycle. A single job with an
//! unrecognized status aborts the whole session.

use batchrun_core::domain::job::{JobDescriptor, JobStatus, StatusReport};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::ExecutorError;
use crate::service::StatusProber;

/// Default number of probe cycles before a session times out
pub const DEFAULT_MAX_PROBES: u32 = 360;

/// Default pause between probe cycles
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(5);

/// Polling budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Number of probe cycles after which pending jobs count as timed out
    pub max_probes: u32,
    /// Sleep between two probe cycles
    pub probe_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_probes: DEFAULT_MAX_PROBES,
            probe_interval: DEFAULT_PROBE_INTERVAL,
        }
    }
}

/// How a polling session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Every job completed
    Succeeded {
        cycles: u32,
        completed: Vec<JobDescriptor>,
    },
    /// The cycle budget ran out with jobs still pending
    TimedOut {
        cycles: u32,
        completed: Vec<JobDescriptor>,
        pending: Vec<JobDescriptor>,
    },
    /// A job reported a status outside its lifecycle
    Aborted {
        cycles: u32,
        completed: Vec<JobDescriptor>,
        job_name: String,
        status: String,
    },
}

impl PollOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Number of probe cycles the session ran
    pub fn cycles(&self) -> u32 {
        match self {
            Self::Succeeded { cycles, .. }
            | Self::TimedOut { cycles, .. }
            | Self::Aborted { cycles, .. } => *cycles,
        }
    }

    /// Jobs that completed before the session ended
    pub fn completed(&self) -> &[JobDescriptor] {
        match self {
            Self::Succeeded { completed, .. }
            | Self::TimedOut { completed, .. }
            | Self::Aborted { completed, .. } => completed,
        }
    }

    /// Collapse into success or the matching executor error
    pub fn into_result(self) -> Result<CompletedBatch, ExecutorError> {
        match self {
            Self::Succeeded { cycles, completed } => Ok(CompletedBatch {
                cycles,
                jobs: completed,
            }),
            Self::TimedOut {
                cycles, pending, ..
            } => Err(ExecutorError::Timeout {
                cycles,
                pending: pending.len(),
            }),
            Self::Aborted {
                job_name, status, ..
            } => Err(ExecutorError::Anomaly { job_name, status }),
        }
    }
}

/// A batch whose jobs all completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedBatch {
    pub cycles: u32,
    pub jobs: Vec<JobDescriptor>,
}

/// Per-job verdict for one probe
enum JobState {
    Pending,
    Completed,
    Failed { job_name: String, status: String },
}

/// Polls launched jobs until they all complete
pub struct CompletionPoller {
    prober: StatusProber,
    config: PollerConfig,
}

impl CompletionPoller {
    pub fn new(prober: StatusProber, config: PollerConfig) -> Self {
        Self { prober, config }
    }

    /// Run one polling session over `jobs`
    ///
    /// Probes run sequentially within a cycle, and the session only sleeps
    /// once every pending job has been probed.
    pub async fn poll(&self, jobs: Vec<JobDescriptor>) -> PollOutcome {
        let mut incomplete = jobs;
        let mut completed = Vec::with_capacity(incomplete.len());
        let mut cycles = 0;

        info!(
            jobs = incomplete.len(),
            max_probes = self.config.max_probes,
            probe_interval = ?self.config.probe_interval,
            "Polling for job completion"
        );

        while !incomplete.is_empty() {
            cycles += 1;
            debug!(cycle = cycles, pending = incomplete.len(), "Starting probe cycle");

            let mut still_pending = Vec::with_capacity(incomplete.len());
            for job in incomplete {
                let report = self.prober.probe(job.run_id, &job.batch_job_id).await;

                match assess(&job, report, Utc::now()) {
                    JobState::Pending => still_pending.push(job),
                    JobState::Completed => completed.push(job),
                    JobState::Failed { job_name, status } => {
                        return PollOutcome::Aborted {
                            cycles,
                            completed,
                            job_name,
                            status,
                        };
                    }
                }
            }
            incomplete = still_pending;

            if incomplete.is_empty() {
                break;
            }

            if cycles >= self.config.max_probes {
                error!(
                    cycles,
                    pending = incomplete.len(),
                    "Max probe limit reached. Exiting due to timeout"
                );
                return PollOutcome::TimedOut {
                    cycles,
                    completed,
                    pending: incomplete,
                };
            }

            tokio::time::sleep(self.config.probe_interval).await;
        }

        info!(cycles, jobs = completed.len(), "All jobs completed");

        PollOutcome::Succeeded { cycles, completed }
    }
}

/// Judge one probe result and log what it says about the job
///
/// A missing start time counts as `now`, and a missing status as `started`.
fn assess(job: &JobDescriptor, report: StatusReport, now: DateTime<Utc>) -> JobState {
    let job_name = report.job_name.as_deref().unwrap_or(&job.job_name);
    let start_time = report.start_time.unwrap_or(now);

    match report.status.unwrap_or(JobStatus::Started) {
        JobStatus::Started | JobStatus::Submitted => {
            info!(
                run_id = job.run_id,
                batch_job_id = %job.batch_job_id,
                "Job {} is running (elapsed time: {} seconds)",
                job_name,
                elapsed_seconds(report.start_time, now)
            );
            JobState::Pending
        }
        JobStatus::Completed => {
            let completed_time = report.completed_time.unwrap_or(now);
            info!(
                run_id = job.run_id,
                batch_job_id = %job.batch_job_id,
                "Job {} completed in {} seconds",
                job_name,
                seconds_between(start_time, completed_time)
            );
            JobState::Completed
        }
        JobStatus::Unrecognized(status) => {
            error!(
                run_id = job.run_id,
                batch_job_id = %job.batch_job_id,
                "Job {} encountered an unexpected status: {}",
                job_name,
                status
            );
            JobState::Failed {
                job_name: job_name.to_string(),
                status,
            }
        }
    }
}

/// Seconds a running job has been going; an unknown start means it just began
fn elapsed_seconds(start_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    seconds_between(start_time.unwrap_or(now), now)
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    to.signed_duration_since(from).num_seconds()
}
