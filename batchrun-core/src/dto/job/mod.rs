//! Job launcher and job status DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::{JobDescriptor, JobStatus, StatusReport, UNKNOWN_JOB_NAME};
use crate::domain::time::{TimestampError, parse_server_time};

/// One launched job as returned under `data` by the launcher endpoints
///
/// The single-job endpoint returns one object, the bulk endpoint a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchedJob {
    #[serde(deserialize_with = "super::string_or_number")]
    pub batch_job: String,
    #[serde(deserialize_with = "super::integer_or_string")]
    pub runid: i64,
    #[serde(default)]
    pub job_name: Option<String>,
}

impl LaunchedJob {
    /// Convert into a trackable descriptor
    ///
    /// `requested_name` wins over whatever name the server echoed back.
    pub fn into_descriptor(self, requested_name: Option<&str>) -> JobDescriptor {
        let job_name = requested_name
            .map(str::to_string)
            .or(self.job_name)
            .unwrap_or_else(|| UNKNOWN_JOB_NAME.to_string());

        JobDescriptor {
            run_id: self.runid,
            batch_job_id: self.batch_job,
            job_name,
        }
    }
}

/// Form body of a status query
#[derive(Debug, Clone, Serialize)]
pub struct StatusQuery {
    pub batch_job_id: String,
    pub runid: i64,
}

impl StatusQuery {
    pub fn for_job(run_id: i64, batch_job_id: &str) -> Self {
        Self {
            batch_job_id: batch_job_id.to_string(),
            runid: run_id,
        }
    }

    /// Key/value pairs in the order the API documents them
    pub fn to_form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("batch_job_id", self.batch_job_id.clone()),
            ("runid", self.runid.to_string()),
        ]
    }
}

/// Status payload found under `data` of a status response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStatusData {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub job_name: Option<String>,
    #[serde(default)]
    pub actual_start_time: Option<String>,
    #[serde(default)]
    pub completed_time: Option<String>,
}

impl TryFrom<JobStatusData> for StatusReport {
    type Error = TimestampError;

    fn try_from(data: JobStatusData) -> Result<Self, Self::Error> {
        Ok(Self {
            status: data.status.as_deref().and_then(JobStatus::from_wire),
            start_time: parse_server_time(data.actual_start_time.as_deref())?,
            completed_time: parse_server_time(data.completed_time.as_deref())?,
            job_name: data.job_name,
        })
    }
}
