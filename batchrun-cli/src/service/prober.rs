//! Status prober
//!
//! Queries the status of one job. Failures here are transient by contract:
//! anything that goes wrong is logged and reported as "no status yet", and
//! only the poller decides when waiting has gone on too long.

use batchrun_client::{ClientError, Transport};
use batchrun_core::domain::job::StatusReport;
use batchrun_core::domain::time::TimestampError;
use batchrun_core::dto::job::{JobStatusData, StatusQuery};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

const STATUS_PATH: &str = "job/jobstatus";

#[derive(Debug, Error)]
enum ProbeError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("invalid status payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

/// Issues status queries for launched jobs
pub struct StatusProber {
    transport: Arc<dyn Transport>,
}

impl StatusProber {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Query the status of one job
    ///
    /// Never fails: a missing payload, a transport error or an undecodable
    /// payload all yield [`StatusReport::no_status`].
    pub async fn probe(&self, run_id: i64, batch_job_id: &str) -> StatusReport {
        match self.fetch(run_id, batch_job_id).await {
            Ok(Some(report)) => report,
            Ok(None) => {
                info!(run_id, batch_job_id, "Received no status from the server");
                StatusReport::no_status()
            }
            Err(e) => {
                warn!(run_id, batch_job_id, error = %e, "Status probe failed");
                StatusReport::no_status()
            }
        }
    }

    async fn fetch(&self, run_id: i64, batch_job_id: &str) -> Result<Option<StatusReport>, ProbeError> {
        let query = StatusQuery::for_job(run_id, batch_job_id);
        let response = self.transport.post(STATUS_PATH, &query.to_form()).await?;

        let data = match response {
            Value::Object(mut body) => body.remove("data"),
            _ => None,
        };
        let Some(data) = data.filter(|data| !data.is_null()) else {
            return Ok(None);
        };

        let data: JobStatusData = serde_json::from_value(data)?;
        Ok(Some(StatusReport::try_from(data)?))
    }
}
