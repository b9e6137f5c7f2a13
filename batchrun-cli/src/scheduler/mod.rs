//! Scheduler layer
//!
//! Drives launched jobs to a terminal state by probing them in lockstep
//! cycles until they all complete, one fails, or the probe budget runs out.

pub mod poller;

pub use poller::{CompletedBatch, CompletionPoller, PollerConfig};
