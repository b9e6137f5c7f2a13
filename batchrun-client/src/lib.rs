//! Batchrun HTTP Client
//!
//! A thin client for the job API: it injects the caller's identity headers
//! into every request and enforces the API's response envelope before any
//! payload reaches the caller.
//!
//! # Example
//!
//! ```no_run
//! use batchrun_client::{ApiClient, Identity, Transport};
//!
//! # async fn example() -> batchrun_client::Result<()> {
//! let identity = Identity::new("my-client", "s3cret", "ClientApp");
//! let client = ApiClient::new("http://localhost:8000/apiv2/", identity);
//!
//! let lookup = client.get("catalog/repository/sales").await?;
//! println!("repository id: {}", lookup["repository_id"]);
//! # Ok(())
//! # }
//! ```

pub mod error;
mod transport;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use transport::Transport;

use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Status code the API puts in its envelope on success
const API_SUCCESS: i64 = 200;

/// Credentials sent as headers with every request
#[derive(Clone)]
pub struct Identity {
    pub client_id: String,
    pub client_secret: String,
    pub application_name: String,
}

impl Identity {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        application_name: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            application_name: application_name.into(),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("application_name", &self.application_name)
            .finish()
    }
}

/// HTTP client for the job API
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL of the API (e.g., "https://clientapi.com/apiv2")
    base_url: String,
    /// Headers injected into every request
    identity: Identity,
    /// HTTP client instance
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API; a trailing slash is ignored
    /// * `identity` - Credentials sent with every request
    pub fn new(base_url: impl Into<String>, identity: Identity) -> Self {
        Self::with_client(base_url, identity, Client::new())
    }

    /// Create a new API client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, identity: Identity, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            identity,
            client,
        }
    }

    /// Resolve a request path against the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request with identity headers and check the response
    async fn send(&self, method: Method, path: &str, form: &[(&str, String)]) -> Result<Value> {
        let url = self.url(path);
        debug!(%method, %url, "Sending request");

        let mut request = self
            .client
            .request(method, &url)
            .header("client_id", &self.identity.client_id)
            .header("client_secret", &self.identity.client_secret)
            .header("application_name", &self.identity.application_name);

        if !form.is_empty() {
            request = request.form(form);
        }

        let response = request.send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Read the body, decode it and check the API envelope
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;

        check_envelope(decode_body(status, &body)?)
    }
}

/// Decode a raw response body as JSON
///
/// An undecodable body from a failed HTTP exchange is reported as an API
/// error carrying the HTTP status, since the envelope never arrived.
fn decode_body(status: StatusCode, body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        if status.is_success() {
            return Err(ClientError::EmptyResponse);
        }
        return Err(ClientError::api_error(
            i64::from(status.as_u16()),
            status.canonical_reason().unwrap_or("Unknown error"),
        ));
    }

    serde_json::from_str(body).map_err(|e| {
        if status.is_success() {
            ClientError::Malformed(format!("Failed to parse JSON response: {}", e))
        } else {
            ClientError::api_error(i64::from(status.as_u16()), body.trim())
        }
    })
}

/// Enforce the API's response envelope
///
/// Job endpoints answer `{"status_code": 200, "data": ...}` on success and
/// `{"status_code": <code>, "msg": ...}` on failure. Catalog lookups answer
/// with a bare `{"repository_id": ...}`.
fn check_envelope(payload: Value) -> Result<Value> {
    if is_blank(&payload) {
        return Err(ClientError::EmptyResponse);
    }

    let object = match &payload {
        Value::Object(object) => object,
        other => {
            return Err(ClientError::UnexpectedFormat(format!(
                "expected a JSON object, found {}",
                json_kind(other)
            )));
        }
    };

    match object.get("status_code") {
        Some(code) => {
            let code = code
                .as_i64()
                .or_else(|| code.as_str().and_then(|s| s.trim().parse().ok()))
                .ok_or_else(|| {
                    ClientError::UnexpectedFormat(format!("non-integer status_code {}", code))
                })?;

            if code != API_SUCCESS {
                let message = match object.get("msg") {
                    Some(Value::String(msg)) => msg.clone(),
                    Some(Value::Null) | None => "no message".to_string(),
                    Some(other) => other.to_string(),
                };
                return Err(ClientError::api_error(code, message));
            }
        }
        None if object.contains_key("repository_id") => {}
        None => {
            return Err(ClientError::UnexpectedFormat(
                "response has neither status_code nor repository_id".to_string(),
            ));
        }
    }

    Ok(payload)
}

/// `null`, `{}`, `[]` and whitespace-only strings carry no response at all
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(object) => object.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
