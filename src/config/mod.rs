//! Configuration management module

pub mod parser;
pub mod env;

pub use parser::{ConfigParser, load_config, display_config_summary};
pub use env::EnvManager;

pub use crate::models::Config;

/// Serializes tests that touch process environment variables
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
