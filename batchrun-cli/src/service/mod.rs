//! Service layer
//!
//! Services turn job API calls into domain values. They hold a shared
//! [`Transport`](batchrun_client::Transport) and contain no polling logic.

mod launcher;
mod prober;
mod resolver;

pub use launcher::JobLauncher;
pub use prober::StatusProber;
pub use resolver::RepositoryResolver;
