//! Server timestamp parsing
//!
//! The job API reports times like `Fri, 29 Dec 2023 18:47:16 GMT`.

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

/// Exact format of timestamps in status payloads
pub const SERVER_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// A timestamp string that does not match [`SERVER_TIME_FORMAT`]
#[derive(Debug, Error)]
#[error("invalid server timestamp '{raw}': {source}")]
pub struct TimestampError {
    pub raw: String,
    #[source]
    pub source: chrono::ParseError,
}

/// Parse an optional server timestamp
///
/// An absent value is not an error and yields `Ok(None)`.
pub fn parse_server_time(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, TimestampError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    NaiveDateTime::parse_from_str(raw, SERVER_TIME_FORMAT)
        .map(|naive| Some(naive.and_utc()))
        .map_err(|source| TimestampError {
            raw: raw.to_string(),
            source,
        })
}
