//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name reported for jobs whose launch or status payload carries no name
pub const UNKNOWN_JOB_NAME: &str = "Unknown Job";

/// A launched job that can be tracked until it reaches a terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub run_id: i64,
    pub batch_job_id: String,
    pub job_name: String,
}

/// Lifecycle status reported by the job API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Started,
    Submitted,
    Completed,
    /// Any value outside the known lifecycle; fatal to a polling session
    Unrecognized(String),
}

impl JobStatus {
    /// Decode a server status string
    ///
    /// Returns `None` for an empty string, which the server uses when a job
    /// has not been picked up yet. Matching is exact and case-sensitive.
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "" => None,
            "started" => Some(Self::Started),
            "submitted" => Some(Self::Submitted),
            "completed" => Some(Self::Completed),
            other => Some(Self::Unrecognized(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Started => "started",
            Self::Submitted => "submitted",
            Self::Completed => "completed",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded answer to a single status query
///
/// The all-`None` value means the server had nothing to report yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub status: Option<JobStatus>,
    pub job_name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub completed_time: Option<DateTime<Utc>>,
}

impl StatusReport {
    /// The "no status yet" report
    pub fn no_status() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire_known_statuses() {
        assert_eq!(JobStatus::from_wire("started"), Some(JobStatus::Started));
        assert_eq!(JobStatus::from_wire("submitted"), Some(JobStatus::Submitted));
        assert_eq!(JobStatus::from_wire("completed"), Some(JobStatus::Completed));
    }

    #[test]
    fn test_from_wire_empty_is_absent() {
        assert_eq!(JobStatus::from_wire(""), None);
    }

    #[test]
    fn test_from_wire_is_case_sensitive() {
        assert_eq!(
            JobStatus::from_wire("Completed"),
            Some(JobStatus::Unrecognized("Completed".to_string()))
        );
    }

    #[test]
    fn test_display_keeps_raw_value() {
        let status = JobStatus::Unrecognized("unknown_status".to_string());
        assert_eq!(status.to_string(), "unknown_status");
        assert_eq!(JobStatus::Submitted.to_string(), "submitted");
    }

    #[test]
    fn test_no_status_report() {
        let report = StatusReport::no_status();
        assert_eq!(report, StatusReport::default());
        assert!(report.status.is_none());
        assert!(report.start_time.is_none());
    }
}
