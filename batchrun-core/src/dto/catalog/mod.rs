//! Catalog DTOs

use serde::{Deserialize, Serialize};

/// Answer to a repository lookup by name
///
/// Unlike the job endpoints, the identifier sits at the top level of the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryLookup {
    #[serde(deserialize_with = "super::string_or_number")]
    pub repository_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_repository_lookup_numeric_id() {
        let lookup: RepositoryLookup =
            serde_json::from_value(json!({ "repository_id": 1234 })).unwrap();
        assert_eq!(lookup.repository_id, "1234");
    }

    #[test]
    fn test_repository_lookup_missing_id() {
        let result = serde_json::from_value::<RepositoryLookup>(json!({ "status_code": 200 }));
        assert!(result.is_err());
    }
}
