//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::{AppError, Result},
    models::Config,
};

/// Combines defaults, the .env file, `AWSPING_*` variables and CLI
/// arguments, in increasing order of precedence
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        self.cli.validate().map_err(AppError::config)?;

        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(repeats) = self.cli.repeats {
            config.repeats = repeats;
        }

        if let Some(ref service) = self.cli.service {
            config.service = service.clone();
        }

        if let Some(timeout) = self.cli.timeout {
            config.timeout_seconds = timeout;
        }

        if let Some(ref catalog_url) = self.cli.catalog_url {
            config.catalog_url = catalog_url.clone();
        }

        if let Some(enable_color) = self.cli.color_override() {
            config.enable_color = enable_color;
        } else if config.enable_color {
            config.enable_color = self.cli.use_colors();
        }

        // CLI-only settings
        config.use_http = self.cli.http;
        config.use_https = self.cli.https;
        config.verbose = self.cli.verbosity();
        config.debug = self.cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Repeats: {}", config.repeats));
    summary.push(format!("Service: {}", config.service));
    summary.push(format!("Probe Mode: {}", config.probe_mode()));
    summary.push(format!("Verbosity: {}", config.verbose));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!("Catalog URL: {}", config.catalog_url));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
