//! Error types for the Batchrun client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Batchrun client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The server answered with no body, or a JSON `null`
    #[error("Expected response from the job API is missing or empty")]
    EmptyResponse,

    /// The body could not be decoded as JSON
    #[error("Malformed response body: {0}")]
    Malformed(String),

    /// API reported a failure through its `status_code`/`msg` envelope
    #[error("API error (status {status_code}): {message}")]
    ApiError {
        /// Status code reported by the API
        status_code: i64,
        /// Error message from the API
        message: String,
    },

    /// The body is JSON but not shaped like any known response
    #[error("Unexpected response format: {0}")]
    UnexpectedFormat(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status_code: i64, message: impl Into<String>) -> Self {
        Self::ApiError {
            status_code,
            message: message.into(),
        }
    }

    /// Whether the failure happened before a usable body was received
    ///
    /// Everything else means the server answered but the answer broke the
    /// response contract.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed(_) | Self::EmptyResponse | Self::Malformed(_)
        )
    }
}
