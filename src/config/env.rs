//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variables read by `Config::merge_from_env`
pub const SUPPORTED_ENV_VARS: &[(&str, &str, &str)] = &[
    ("AWSPING_REPEATS", "Number of probing rounds (1-100)", "3"),
    ("AWSPING_SERVICE", "Service whose regional endpoint is probed", "ec2"),
    ("AWSPING_TIMEOUT", "Per-probe timeout in seconds (1-300)", "5"),
    ("AWSPING_CATALOG_URL", "URL of the region code -> name JSON map", "https://example.com/regions.json"),
    ("AWSPING_ENABLE_COLOR", "Enable colored output", "true"),
];

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env from the current directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load an env file. Variables already present in the process
    /// environment are not overwritten.
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Validate one variable's value before it is merged
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "AWSPING_REPEATS" => {
                let repeats: u32 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid AWSPING_REPEATS value '{}': {}", value, e)))?;
                if repeats == 0 || repeats > crate::defaults::MAX_REPEATS {
                    return Err(AppError::config(format!(
                        "AWSPING_REPEATS must be between 1 and {}, got: {}",
                        crate::defaults::MAX_REPEATS, repeats
                    )));
                }
            }
            "AWSPING_SERVICE" => {
                if value.is_empty() {
                    return Err(AppError::config("AWSPING_SERVICE cannot be empty"));
                }
            }
            "AWSPING_TIMEOUT" => {
                let timeout: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid AWSPING_TIMEOUT value '{}': {}", value, e)))?;
                if timeout == 0 || timeout > crate::defaults::MAX_TIMEOUT_SECS {
                    return Err(AppError::config(format!(
                        "AWSPING_TIMEOUT must be between 1 and {}, got: {}",
                        crate::defaults::MAX_TIMEOUT_SECS, timeout
                    )));
                }
            }
            "AWSPING_CATALOG_URL" => {
                url::Url::parse(value)
                    .map_err(|e| AppError::config(format!("Invalid AWSPING_CATALOG_URL '{}': {}", value, e)))?;
            }
            "AWSPING_ENABLE_COLOR" => {
                value.parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid AWSPING_ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Collect warnings for currently set variables that would not validate
    pub fn validate_current_env() -> Vec<String> {
        SUPPORTED_ENV_VARS
            .iter()
            .filter_map(|(var, _, _)| {
                let value = std::env::var(var).ok()?;
                Self::validate_env_var(var, value.trim())
                    .err()
                    .map(|e| format!("Warning: {}", e))
            })
            .collect()
    }

    /// Environment variable section shown at the end of `--help`
    pub fn display_env_help() -> String {
        let mut help = String::from("Supported Environment Variables:\n\n");

        for (var, description, example) in SUPPORTED_ENV_VARS {
            help.push_str(&format!("  {:<22} {}\n", var, description));
            help.push_str(&format!("  {:<22} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }
}
