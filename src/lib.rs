//! awsping
//!
//! Measures network latency to every AWS region over raw TCP connects or
//! HTTP(S) requests, running several concurrent rounds and ranking the
//! regions by mean latency.

pub mod catalog;
pub mod cli;
pub mod client;
pub mod config;
pub mod dns;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod target;

// Re-export commonly used types
pub use catalog::CatalogClient;
pub use client::{NetworkProber, Prober};
pub use error::{AppError, Result};
pub use executor::{LatencyEngine, RunSummary};
pub use models::{Config, Endpoint, EndpointSet, UNREACHABLE};
pub use output::{OutputCoordinator, OutputFormatter, OutputFormatterFactory, OutputLevel};
pub use target::{ProbeMode, ProbeTarget};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// User agent sent with catalog downloads and HTTP probes
pub const USER_AGENT: &str = concat!(
    "awsping/",
    env!("CARGO_PKG_VERSION"),
    " (+",
    env!("CARGO_PKG_REPOSITORY"),
    ")"
);

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_REPEATS: u32 = 1;
    pub const DEFAULT_SERVICE: &str = "dynamodb";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_CATALOG_URL: &str = crate::catalog::DEFAULT_CATALOG_URL;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    pub const MAX_REPEATS: u32 = 100;
    pub const MAX_TIMEOUT_SECS: u64 = 300;
}
