//! Executor error types

use batchrun_client::ClientError;
use thiserror::Error;

/// Why a launch-and-wait run failed
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// No usable response reached us
    #[error("transport error: {0}")]
    Transport(#[source] ClientError),

    /// The API answered, but not with what the call requires
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The probe budget ran out with jobs still pending
    #[error("max probe limit reached after {cycles} probe cycle(s), {pending} job(s) still pending")]
    Timeout { cycles: u32, pending: usize },

    /// A job reported a status outside its known lifecycle
    #[error("job {job_name} encountered an unexpected status: {status}")]
    Anomaly { job_name: String, status: String },
}

impl ExecutorError {
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

impl From<ClientError> for ExecutorError {
    fn from(err: ClientError) -> Self {
        if err.is_transport() {
            Self::Transport(err)
        } else {
            Self::Protocol(err.to_string())
        }
    }
}
