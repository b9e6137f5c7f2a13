//! Job launcher
//!
//! Starts a single job by name, or every job of a repository at once, and
//! normalizes the launch response into trackable descriptors.

use batchrun_client::{ClientError, Transport};
use batchrun_core::domain::job::JobDescriptor;
use batchrun_core::dto::job::LaunchedJob;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::error::ExecutorError;

/// Launches jobs through the job launcher endpoints
pub struct JobLauncher {
    transport: Arc<dyn Transport>,
}

impl JobLauncher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Launch a single job by name
    ///
    /// # Returns
    /// A list holding exactly one descriptor, named after `job_name`
    ///
    /// # Errors
    /// - `Transport` if the launch produced no response body
    /// - `Protocol` if `data.batch_job` or `data.runid` is missing
    pub async fn launch_single(&self, job_name: &str) -> Result<Vec<JobDescriptor>, ExecutorError> {
        info!(job_name, "Sending request for job to be launched");

        let path = format!("job/joblauncher/{}", urlencoding::encode(job_name));
        let response = self.transport.post(&path, &[]).await?;
        let launched: LaunchedJob = serde_json::from_value(launch_payload(response)?)
            .map_err(|e| {
                ExecutorError::protocol(format!(
                    "Required keys (data.batch_job, data.runid) not found in launch response: {}",
                    e
                ))
            })?;

        let job = launched.into_descriptor(Some(job_name));
        info!(
            job_name,
            run_id = job.run_id,
            batch_job_id = %job.batch_job_id,
            "Job was launched successfully"
        );

        Ok(vec![job])
    }

    /// Launch every job of a repository
    ///
    /// # Errors
    /// - `Transport` if the launch produced no response body
    /// - `Protocol` if `data` is missing or is not a list of launched jobs
    pub async fn launch_bulk(&self, repository_id: &str) -> Result<Vec<JobDescriptor>, ExecutorError> {
        info!(repository_id, "Sending request to launch all jobs for repository");

        let path = format!(
            "job/joblauncher/bulk?repository_id={}",
            urlencoding::encode(repository_id)
        );
        let response = self.transport.post(&path, &[]).await?;
        let launched: Vec<LaunchedJob> = serde_json::from_value(launch_payload(response)?)
            .map_err(|e| {
                ExecutorError::protocol(format!(
                    "Expected a list of launched jobs under data: {}",
                    e
                ))
            })?;

        let jobs: Vec<JobDescriptor> = launched
            .into_iter()
            .map(|job| job.into_descriptor(None))
            .collect();
        info!(repository_id, count = jobs.len(), "Bulk jobs launched successfully");

        Ok(jobs)
    }
}

/// Extract `data` from a launch response
///
/// Blank bodies are already rejected by the transport, except a bare `null`.
fn launch_payload(response: Value) -> Result<Value, ExecutorError> {
    match response {
        Value::Null => Err(ExecutorError::Transport(ClientError::EmptyResponse)),
        Value::Object(mut body) => body
            .remove("data")
            .filter(|data| !data.is_null())
            .ok_or_else(|| ExecutorError::protocol("Required key (data) not found in launch response")),
        _ => Err(ExecutorError::protocol("Launch response is not a JSON object")),
    }
}
