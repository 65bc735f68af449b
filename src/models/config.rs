//! Configuration data model and validation

use crate::{
    error::{AppError, Result},
    output::OutputLevel,
    target::ProbeMode,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of probing rounds
    #[serde(default = "default_repeats")]
    pub repeats: u32,

    /// Service whose regional endpoint is probed (dynamodb, ec2, ...)
    #[serde(default = "default_service")]
    pub service: String,

    /// Probe over plain HTTP
    #[serde(default)]
    pub use_http: bool,

    /// Probe over HTTPS
    #[serde(default)]
    pub use_https: bool,

    /// Output verbosity: -1 lists regions only, 0..=2 show latency tables
    #[serde(default)]
    pub verbose: i32,

    /// Per-probe timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// Where the `code -> name` region catalog is downloaded from
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repeats: default_repeats(),
            service: default_service(),
            use_http: false,
            use_https: false,
            verbose: 0,
            timeout_seconds: default_timeout_secs(),
            catalog_url: default_catalog_url(),
            enable_color: default_enable_color(),
            debug: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Probe mode selected by the HTTP/HTTPS flags
    pub fn probe_mode(&self) -> ProbeMode {
        ProbeMode::select(self.use_http, self.use_https)
    }

    pub fn output_level(&self) -> Result<OutputLevel> {
        OutputLevel::from_verbosity(self.verbose)
    }

    /// Only print the catalog, skip probing
    pub fn list_only(&self) -> bool {
        self.verbose == OutputLevel::RegionsOnly.verbosity()
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.repeats == 0 {
            return Err(AppError::config("Repeats must be greater than 0"));
        }

        if self.repeats > crate::defaults::MAX_REPEATS {
            return Err(AppError::config(format!(
                "Repeats cannot exceed {}",
                crate::defaults::MAX_REPEATS
            )));
        }

        if self.service.is_empty() {
            return Err(AppError::config("Service name cannot be empty"));
        }

        // The service becomes the first label of the probed hostname
        if !self
            .service
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(AppError::config(format!(
                "Invalid service name '{}': only letters, digits and '-' are allowed",
                self.service
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > crate::defaults::MAX_TIMEOUT_SECS {
            return Err(AppError::config(format!(
                "Timeout cannot exceed {} seconds",
                crate::defaults::MAX_TIMEOUT_SECS
            )));
        }

        self.output_level()?;

        match url::Url::parse(&self.catalog_url) {
            Ok(parsed) => {
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(AppError::config(format!(
                        "Catalog URL must use http or https: {}",
                        self.catalog_url
                    )));
                }
            }
            Err(e) => {
                return Err(AppError::config(format!(
                    "Invalid catalog URL '{}': {}",
                    self.catalog_url, e
                )));
            }
        }

        Ok(())
    }

    /// Merge `AWSPING_*` environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(repeats) = std::env::var("AWSPING_REPEATS") {
            self.repeats = repeats
                .trim()
                .parse()
                .map_err(|e| AppError::config(format!("Invalid AWSPING_REPEATS value '{}': {}", repeats, e)))?;
        }

        if let Ok(service) = std::env::var("AWSPING_SERVICE") {
            self.service = service.trim().to_string();
        }

        if let Ok(timeout) = std::env::var("AWSPING_TIMEOUT") {
            self.timeout_seconds = timeout
                .trim()
                .parse()
                .map_err(|e| AppError::config(format!("Invalid AWSPING_TIMEOUT value '{}': {}", timeout, e)))?;
        }

        if let Ok(catalog_url) = std::env::var("AWSPING_CATALOG_URL") {
            self.catalog_url = catalog_url.trim().to_string();
        }

        if let Ok(enable_color) = std::env::var("AWSPING_ENABLE_COLOR") {
            self.enable_color = enable_color
                .trim()
                .parse()
                .map_err(|e| AppError::config(format!("Invalid AWSPING_ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_repeats() -> u32 {
    crate::defaults::DEFAULT_REPEATS
}

fn default_service() -> String {
    crate::defaults::DEFAULT_SERVICE.to_string()
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_catalog_url() -> String {
    crate::defaults::DEFAULT_CATALOG_URL.to_string()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
