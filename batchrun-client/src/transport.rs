//! Transport seam
//!
//! Job launching, status probing and catalog lookups only need "send this
//! request, give me the checked JSON body". Keeping that behind a trait lets
//! the executor run against an in-memory transport in tests.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::ApiClient;
use crate::error::Result;

/// Sends requests to the job API and returns envelope-checked JSON bodies
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request for `path`, relative to the base URL
    async fn get(&self, path: &str) -> Result<Value>;

    /// Issue a POST request for `path`
    ///
    /// `form` is sent URL-encoded; an empty slice sends no body.
    async fn post(&self, path: &str, form: &[(&str, String)]) -> Result<Value>;
}

#[async_trait]
impl Transport for ApiClient {
    async fn get(&self, path: &str) -> Result<Value> {
        self.send(Method::GET, path, &[]).await
    }

    async fn post(&self, path: &str, form: &[(&str, String)]) -> Result<Value> {
        self.send(Method::POST, path, form).await
    }
}
