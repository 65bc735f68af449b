//! Data models for regions, samples and configuration

pub mod config;
pub mod endpoint;

// Re-export main model types
pub use config::Config;
pub use endpoint::{duration_to_ms, mean_duration, Endpoint, EndpointSet, UNREACHABLE};
