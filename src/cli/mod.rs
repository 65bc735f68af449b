//! Command-line interface

use clap::Parser;

/// Measure latency to every AWS region and list them fastest first
#[derive(Parser, Debug, Clone)]
#[command(name = "awsping")]
#[command(
    version = concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("AWSPING_GIT_COMMIT"),
        ", built ",
        env!("AWSPING_BUILD_TIME"),
        ")"
    ),
    about,
    long_about = None,
    after_long_help = crate::config::EnvManager::display_env_help()
)]
pub struct Cli {
    /// Number of probing rounds
    #[arg(short, long, value_parser = parse_repeats)]
    pub repeats: Option<u32>,

    /// Probe with HTTP GET requests (takes precedence over --https)
    #[arg(long)]
    pub http: bool,

    /// Probe with HTTPS GET requests
    #[arg(long)]
    pub https: bool,

    /// Service whose regional endpoint is probed
    #[arg(short, long)]
    pub service: Option<String>,

    /// Output detail: 0 = name and latency, 1 = indexed table, 2 = every round
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(i32).range(0..=2))]
    pub verbose: i32,

    /// Only list region codes and names, without measuring
    #[arg(short, long)]
    pub list_only: bool,

    /// Per-probe timeout in seconds
    #[arg(short, long, value_parser = parse_timeout)]
    pub timeout: Option<u64>,

    /// URL of the region code -> name JSON catalog
    #[arg(long)]
    pub catalog_url: Option<String>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.list_only && self.verbose != 0 {
            return Err("--list-only cannot be combined with --verbose".to_string());
        }

        Ok(())
    }

    /// Verbosity passed to the configuration; list-only maps to -1
    pub fn verbosity(&self) -> i32 {
        if self.list_only {
            crate::output::OutputLevel::RegionsOnly.verbosity()
        } else {
            self.verbose
        }
    }

    /// Explicit color preference, if any
    pub fn color_override(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            None
        }
    }

    /// Check if colors should be enabled when nothing else decided
    pub fn use_colors(&self) -> bool {
        self.color_override().unwrap_or_else(supports_color)
    }
}

fn parse_repeats(s: &str) -> Result<u32, String> {
    s.parse::<u32>()
        .map_err(|_| format!("Invalid repeat count: {}", s))
        .and_then(|repeats| {
            if repeats == 0 {
                Err("Repeats must be greater than 0".to_string())
            } else if repeats > crate::defaults::MAX_REPEATS {
                Err(format!("Repeats cannot exceed {}", crate::defaults::MAX_REPEATS))
            } else {
                Ok(repeats)
            }
        })
}

/// Parse duration from seconds string
fn parse_timeout(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > crate::defaults::MAX_TIMEOUT_SECS {
                Err(format!("Duration cannot exceed {} seconds", crate::defaults::MAX_TIMEOUT_SECS))
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["awsping"]);
        assert_eq!(cli.repeats, None);
        assert_eq!(cli.service, None);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.http);
        assert!(!cli.https);
        assert!(!cli.list_only);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from([
            "awsping",
            "--repeats", "5",
            "--http",
            "--https",
            "--service", "ec2",
            "--verbose", "2",
            "--timeout", "3",
            "--catalog-url", "http://127.0.0.1/regions.json",
            "--no-color",
            "--debug",
        ]);

        assert_eq!(cli.repeats, Some(5));
        assert!(cli.http);
        assert!(cli.https);
        assert_eq!(cli.service.as_deref(), Some("ec2"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.timeout, Some(3));
        assert_eq!(cli.catalog_url.as_deref(), Some("http://127.0.0.1/regions.json"));
        assert_eq!(cli.color_override(), Some(false));
        assert!(cli.debug);
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from(["awsping", "-r", "3", "-s", "s3", "-v", "1", "-t", "7"]);
        assert_eq!(cli.repeats, Some(3));
        assert_eq!(cli.service.as_deref(), Some("s3"));
        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.timeout, Some(7));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Cli::try_parse_from(["awsping", "--repeats", "0"]).is_err());
        assert!(Cli::try_parse_from(["awsping", "--repeats", "101"]).is_err());
        assert!(Cli::try_parse_from(["awsping", "--verbose", "3"]).is_err());
        assert!(Cli::try_parse_from(["awsping", "--verbose", "-1"]).is_err());
        assert!(Cli::try_parse_from(["awsping", "--timeout", "0"]).is_err());
        assert!(Cli::try_parse_from(["awsping", "--timeout", "+5"]).is_err());
        assert!(Cli::try_parse_from(["awsping", "--timeout", "301"]).is_err());
    }

    #[test]
    fn test_conflicting_flags() {
        let cli = Cli::parse_from(["awsping", "--color", "--no-color"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["awsping", "--list-only", "--verbose", "2"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_list_only_verbosity() {
        let cli = Cli::parse_from(["awsping", "--list-only"]);
        assert_eq!(cli.verbosity(), -1);

        let cli = Cli::parse_from(["awsping", "-v", "2"]);
        assert_eq!(cli.verbosity(), 2);
    }

    #[test]
    fn test_color_flags() {
        assert_eq!(Cli::parse_from(["awsping", "--color"]).color_override(), Some(true));
        assert!(Cli::parse_from(["awsping", "--color"]).use_colors());
        assert_eq!(Cli::parse_from(["awsping"]).color_override(), None);
    }
}
