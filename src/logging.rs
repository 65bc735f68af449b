//! Structured logging for awsping
//!
//! Entries carry a level, the emitting component, an optional correlation id
//! and arbitrary JSON fields. They render either as one human-readable line
//! or as a JSON object (`--debug`).
//!
//! All output goes to stderr so that result tables on stdout stay
//! machine-readable.

use crate::error::{AppError, Result};
use crate::models::{duration_to_ms, Config, UNREACHABLE};
use crate::target::ProbeMode;
use chrono::{DateTime, Utc};
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::White,
            LogLevel::Debug => Color::Cyan,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Component that emitted the entry
    pub logger: String,
    pub correlation_id: Option<String>,
    /// Ordered so that identical entries render identically
    pub fields: BTreeMap<String, serde_json::Value>,
    pub location: Option<LogLocation>,
}

/// Source location of a macro-emitted entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// One human-readable line per entry
    Console,
    /// One JSON object per entry
    Json,
}

#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
    correlation_id: Option<String>,
}

/// Leveled logger writing to stderr
pub struct Logger {
    name: String,
    min_level: LogLevel,
    format: LogFormat,
    use_color: bool,
    include_location: bool,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Logger whose verbosity follows the configuration: `--debug` logs
    /// everything down to Debug as JSON with source locations, `-v 2` logs
    /// Info, anything else only warnings and errors.
    pub fn with_config(name: &str, config: &Config) -> Self {
        let min_level = if config.debug {
            LogLevel::Debug
        } else if config.verbose >= 2 {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            name: name.to_string(),
            min_level,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            use_color: config.enable_color,
            include_location: config.debug,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub async fn set_session_id(&self, session_id: String) {
        self.context.write().await.session_id = Some(session_id);
    }

    /// Open a correlated operation. Entries logged until the matching
    /// `end_operation` carry the returned id.
    pub async fn start_operation(&self, operation: &str) -> String {
        let correlation_id = Uuid::new_v4().to_string();
        self.context.write().await.correlation_id = Some(correlation_id.clone());

        self.debug(&format!("{} started", operation))
            .field("operation", operation)
            .log()
            .await;

        correlation_id
    }

    pub async fn end_operation(&self, correlation_id: &str, operation: &str, success: bool) {
        self.debug(&format!("{} finished", operation))
            .field("operation", operation)
            .field("success", success)
            .log()
            .await;

        let mut context = self.context.write().await;
        if context.correlation_id.as_deref() == Some(correlation_id) {
            context.correlation_id = None;
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message)
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        {
            let context = self.context.read().await;
            if let Some(session_id) = &context.session_id {
                entry
                    .fields
                    .insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
            }
            if entry.correlation_id.is_none() {
                entry.correlation_id = context.correlation_id.clone();
            }
        }

        let _ = writeln!(io::stderr().lock(), "{}", self.render(&entry));
    }

    /// Render an entry in the configured format
    pub fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.render_line(entry),
            LogFormat::Json => serde_json::to_string(entry)
                .unwrap_or_else(|e| format!("{{\"message\":{:?},\"render_error\":{:?}}}", entry.message, e.to_string())),
        }
    }

    fn render_line(&self, entry: &LogEntry) -> String {
        let level = format!("{:>5}", entry.level.as_str());
        let level = if self.use_color {
            level.color(entry.level.color()).to_string()
        } else {
            level
        };

        let mut line = format!(
            "{} {} [{}] {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            level,
            entry.logger,
            entry.message
        );

        if let Some(id) = &entry.correlation_id {
            line.push_str(&format!(" [{}]", id.chars().take(8).collect::<String>()));
        }
        if !entry.fields.is_empty() {
            let fields: Vec<String> = entry.fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            line.push_str(&format!(" {{{}}}", fields.join(", ")));
        }
        if let (true, Some(location)) = (self.include_location, &entry.location) {
            line.push_str(&format!(" @ {}:{}", location.file, location.line));
        }

        line
    }
}

/// Entry under construction; nothing is written until `log`
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: &str) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message: message.to_string(),
                logger: logger.name.clone(),
                correlation_id: None,
                fields: BTreeMap::new(),
                location: None,
            },
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), value);
        }
        self
    }

    pub fn location(mut self, file: &str, line: u32) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
        });
        self
    }

    /// Attach a latency sample. Unreachable samples are flagged rather than
    /// written as milliseconds.
    pub fn latency(self, sample: Duration) -> Self {
        if sample == UNREACHABLE {
            self.field("unreachable", true)
        } else {
            self.field("latency_ms", duration_to_ms(sample))
        }
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("probe_failure", error.is_probe_failure())
            .field("error", error.to_string())
    }

    pub fn entry(&self) -> &LogEntry {
        &self.entry
    }

    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Logger for the probe and round events of a measurement run
pub struct ProbeLogger {
    logger: Logger,
}

impl ProbeLogger {
    pub fn new(config: &Config) -> Self {
        Self::from_logger(Logger::with_config("PROBE", config))
    }

    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Successful probes are traced; failures are logged at debug level
    /// with the error category attached
    pub async fn log_probe(&self, endpoint_code: &str, mode: ProbeMode, round: u32, outcome: &Result<Duration>) {
        let builder = match outcome {
            Ok(sample) => self
                .logger
                .trace(&format!("round {}: {} {} answered", round, mode, endpoint_code))
                .latency(*sample),
            Err(error) => self
                .logger
                .debug(&format!("round {}: {} {} failed", round, mode, endpoint_code))
                .error_info(error),
        };

        builder
            .field("endpoint", endpoint_code)
            .field("mode", mode)
            .field("round", round)
            .log()
            .await;
    }

    /// A round where every probe failed is a warning; anything else is debug
    pub async fn log_round(&self, round: u32, rounds: u32, probes: usize, failures: usize, elapsed: Duration) {
        let level = if probes > 0 && failures == probes {
            LogLevel::Warn
        } else {
            LogLevel::Debug
        };

        self.logger
            .log(level, &format!("round {}/{} done, {} of {} probes failed", round, rounds, failures, probes))
            .field("round", round)
            .field("failures", failures)
            .field("elapsed_ms", duration_to_ms(elapsed))
            .log()
            .await;
    }

    pub async fn log_unreachable(&self, endpoint_code: &str, rounds: u32) {
        self.logger
            .warn(&format!("{} did not answer in any of {} round(s)", endpoint_code, rounds))
            .field("endpoint", endpoint_code)
            .log()
            .await;
    }
}

/// Hands out loggers that share one session id
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name, &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_probe_logger(&self) -> ProbeLogger {
        ProbeLogger::from_logger(self.create_logger("PROBE").await)
    }
}

/// Log at debug level with the caller's source location
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!())
            .log()
            .await
    };
}

/// Log at info level with the caller's source location
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!())
            .log()
            .await
    };
}
