//! Shared plumbing for the portal crates: logging setup, startup directory
//! checks, response types and Prometheus metrics.

pub mod types;
pub mod utils;
pub mod env;
pub mod metrics;
