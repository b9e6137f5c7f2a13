//! Core domain types
//!
//! These types describe batch jobs as the rest of the system sees them,
//! independent of how the job API happens to encode them on the wire.

pub mod job;
pub mod time;
