//! Error handling for awsping

use thiserror::Error;

/// Error types for catalog loading, configuration and probing
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid run parameters (zero rounds, empty endpoint set, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Endpoint hostname could not be resolved to an IPv4 address
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// TCP connection could not be established
    #[error("Connection error: {0}")]
    Connection(String),

    /// HTTP request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Probe exceeded its time budget
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Endpoint catalog could not be retrieved
    #[error("Catalog fetch error: {0}")]
    CatalogFetch(String),

    /// Endpoint catalog was retrieved but is not usable
    #[error("Catalog decode error: {0}")]
    CatalogDecode(String),

    /// I/O errors (terminal output, .env files)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (URLs, numbers, ...)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn resolution<S: Into<String>>(message: S) -> Self {
        Self::Resolution(message.into())
    }

    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection(message.into())
    }

    pub fn request<S: Into<String>>(message: S) -> Self {
        Self::Request(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn catalog_fetch<S: Into<String>>(message: S) -> Self {
        Self::CatalogFetch(message.into())
    }

    pub fn catalog_decode<S: Into<String>>(message: S) -> Self {
        Self::CatalogDecode(message.into())
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Resolution(_) => "DNS",
            Self::Connection(_) => "CONNECT",
            Self::Request(_) => "HTTP",
            Self::Timeout(_) => "TIMEOUT",
            Self::CatalogFetch(_) | Self::CatalogDecode(_) => "CATALOG",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Probe failures are contained in a single round and become an
    /// unreachable sample; everything else aborts the run.
    pub fn is_probe_failure(&self) -> bool {
        matches!(
            self,
            Self::Resolution(_) | Self::Connection(_) | Self::Request(_) | Self::Timeout(_)
        )
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file, AWSPING_* variables or command line arguments.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Use at least one repeat and make sure the region catalog is not empty.", msg)
            }
            Self::Resolution(msg) => {
                format!("Name resolution failed: {}\n\nSuggestion: Check that the service is offered in this region.", msg)
            }
            Self::Connection(msg) => {
                format!("Connection failed: {}\n\nSuggestion: Check your internet connection and firewall settings.", msg)
            }
            Self::Request(msg) => {
                format!("HTTP request failed: {}\n\nSuggestion: Try the default TCP mode or a different --service.", msg)
            }
            Self::Timeout(msg) => {
                format!("Probe timed out: {}\n\nSuggestion: Increase the timeout value using --timeout.", msg)
            }
            Self::CatalogFetch(msg) => {
                format!("Could not download the region list: {}\n\nSuggestion: Check your internet connection or point --catalog-url at a reachable copy.", msg)
            }
            Self::CatalogDecode(msg) => {
                format!("Region list is not usable: {}\n\nSuggestion: The catalog must be a JSON object mapping region codes to names.", msg)
            }
            Self::Io(msg) => {
                format!("I/O operation failed: {}\n\nSuggestion: Check that stdout is writable and file permissions are correct.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse data: {}\n\nSuggestion: Check the format of your input values.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::Resolution(_) | Self::Connection(_) | Self::Request(_) => 2,
            Self::Timeout(_) => 3,
            Self::CatalogFetch(_) | Self::CatalogDecode(_) => 4,
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Resolution(_) | Self::Connection(_) | Self::Request(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::CatalogFetch(_) | Self::CatalogDecode(_) => {
                    format!("[{}] {}", category.magenta().bold(), message.magenta())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::catalog_decode(format!("JSON decode error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else if error.is_connect() {
            Self::connection(error.to_string())
        } else {
            Self::request(error.to_string())
        }
    }
}

impl From<trust_dns_resolver::error::ResolveError> for AppError {
    fn from(error: trust_dns_resolver::error::ResolveError) -> Self {
        Self::resolution(error.to_string())
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error reporter for user-facing error output at the CLI boundary
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Reporter following the resolved color and debug settings
    pub fn from_config(config: &crate::models::Config) -> Self {
        Self::new(config.enable_color, config.debug)
    }

    /// Render an error the way `report_error` prints it
    pub fn format_error(&self, error: &AppError) -> String {
        let mut output = error.format_for_console(self.use_color);
        if self.verbose {
            output.push_str("\n\n");
            output.push_str(&error.user_friendly_message());
        }
        output
    }

    /// Report an error to the user on stderr
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.format_error(error));
    }
}
