//! Data Transfer Objects for the job API
//!
//! These mirror the JSON payloads nested under `data` (or at the top level,
//! for catalog lookups). Identifier fields are decoded leniently because the
//! API is not consistent about sending them as numbers or strings.

pub mod catalog;
pub mod job;

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Accept a JSON string or number and keep it as a string
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}

/// Accept a JSON integer or a string holding one
pub(crate) fn integer_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| de::Error::custom(format!("expected an integer, found {}", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("expected an integer, found '{}'", s))),
        other => Err(de::Error::custom(format!(
            "expected an integer, found {}",
            other
        ))),
    }
}
