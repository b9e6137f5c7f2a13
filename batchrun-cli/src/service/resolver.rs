//! Repository resolver

use batchrun_client::Transport;
use batchrun_core::dto::catalog::RepositoryLookup;
use std::sync::Arc;
use tracing::info;

use crate::error::ExecutorError;

/// Maps repository names to the identifiers the bulk launcher expects
pub struct RepositoryResolver {
    transport: Arc<dyn Transport>,
}

impl RepositoryResolver {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Look up the identifier of a repository by name
    ///
    /// Every call hits the catalog; nothing is cached.
    pub async fn resolve(&self, repository_name: &str) -> Result<String, ExecutorError> {
        info!(repository_name, "Sending request to get repository id");

        let path = format!("catalog/repository/{}", urlencoding::encode(repository_name));
        let response = self.transport.get(&path).await?;
        let lookup: RepositoryLookup = serde_json::from_value(response).map_err(|e| {
            ExecutorError::protocol(format!(
                "Required key (repository_id) not found in response: {}",
                e
            ))
        })?;

        info!(
            repository_name,
            repository_id = %lookup.repository_id,
            "Resolved repository"
        );

        Ok(lookup.repository_id)
    }
}
