//! Colored formatter implementation with terminal color support
//!
//! Latency cells are tinted by performance band, unreachable endpoints are
//! highlighted in red.

use super::formatter::{
    fmt_error, render_indexed, render_latency, render_rounds, render_summary, CellStyle,
    OutputFormatter,
};
use crate::{
    error::Result,
    executor::RunSummary,
    models::{duration_to_ms, Endpoint, EndpointSet, UNREACHABLE},
};
use colored::*;
use std::fmt::Write as _;
use std::time::Duration;

/// Performance level classification for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLevel {
    Excellent,  // < 50ms
    Good,       // 50-100ms
    Fair,       // 100-300ms
    Poor,       // 300-1000ms
    VeryPoor,   // >= 1000ms
    Unreachable,
}

impl PerformanceLevel {
    /// Determine performance level from response time in milliseconds
    pub fn from_response_time(time_ms: f64) -> Self {
        if time_ms < 50.0 {
            Self::Excellent
        } else if time_ms < 100.0 {
            Self::Good
        } else if time_ms < 300.0 {
            Self::Fair
        } else if time_ms < 1000.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn from_sample(sample: Duration) -> Self {
        if sample == UNREACHABLE {
            Self::Unreachable
        } else {
            Self::from_response_time(duration_to_ms(sample))
        }
    }

    /// Get color for this performance level
    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor | Self::Unreachable => Color::Red,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
            Self::Unreachable => "Unreachable",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub code: Color,
    pub muted: Color,
    pub warning: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            code: Color::Cyan,
            muted: Color::BrightBlack,
            warning: Color::Yellow,
        }
    }
}

/// Colored formatter implementation
#[derive(Debug, Clone, Default)]
pub struct ColoredFormatter {
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(color_scheme: ColorScheme) -> Self {
        Self { color_scheme }
    }
}

impl CellStyle for ColoredFormatter {
    fn heading(&self, cell: String) -> String {
        cell.color(self.color_scheme.header).bold().to_string()
    }

    fn sample(&self, cell: String, sample: Duration) -> String {
        cell.color(PerformanceLevel::from_sample(sample).color()).to_string()
    }

    fn average(&self, cell: String, endpoint: &Endpoint) -> String {
        let level = endpoint
            .reachable_mean()
            .map(PerformanceLevel::from_sample)
            .unwrap_or(PerformanceLevel::Unreachable);

        let colored = cell.color(level.color());
        if level == PerformanceLevel::Unreachable {
            colored.bold().to_string()
        } else if endpoint.failed_rounds() > 0 {
            colored.underline().to_string()
        } else {
            colored.to_string()
        }
    }

    fn muted(&self, cell: String) -> String {
        cell.color(self.color_scheme.muted).to_string()
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_regions(&self, set: &EndpointSet) -> Result<String> {
        let mut output = String::new();
        for endpoint in set {
            let code = format!("{:<15}", endpoint.code()).color(self.color_scheme.code);
            writeln!(output, "{} {}", code, endpoint.name()).map_err(fmt_error)?;
        }
        Ok(output)
    }

    fn format_latency(&self, set: &EndpointSet) -> Result<String> {
        render_latency(set, self)
    }

    fn format_indexed(&self, set: &EndpointSet) -> Result<String> {
        render_indexed(set, self)
    }

    fn format_rounds(&self, set: &EndpointSet, rounds: u32) -> Result<String> {
        render_rounds(set, rounds, self)
    }

    fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        let line = render_summary(summary);
        if summary.failures > 0 {
            Ok(line.color(self.color_scheme.warning).to_string())
        } else {
            Ok(line.color(self.color_scheme.muted).to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_performance_levels() {
        assert_eq!(PerformanceLevel::from_response_time(10.0), PerformanceLevel::Excellent);
        assert_eq!(PerformanceLevel::from_response_time(50.0), PerformanceLevel::Good);
        assert_eq!(PerformanceLevel::from_response_time(150.0), PerformanceLevel::Fair);
        assert_eq!(PerformanceLevel::from_response_time(500.0), PerformanceLevel::Poor);
        assert_eq!(PerformanceLevel::from_response_time(1500.0), PerformanceLevel::VeryPoor);
        assert_eq!(PerformanceLevel::from_sample(UNREACHABLE), PerformanceLevel::Unreachable);
        assert_eq!(PerformanceLevel::from_sample(ms(75)), PerformanceLevel::Good);
    }

    #[test]
    fn test_level_colors() {
        assert_eq!(PerformanceLevel::Excellent.color(), Color::Green);
        assert_eq!(PerformanceLevel::Unreachable.color(), Color::Red);
        assert_eq!(PerformanceLevel::Unreachable.description(), "Unreachable");
    }

    #[test]
    fn test_colored_tables_keep_content() {
        let set = EndpointSet::new(vec![
            Endpoint::with_samples("eu-west-1", "Ireland", vec![ms(20)]),
            Endpoint::with_samples("cn-north-1", "Beijing", vec![UNREACHABLE]),
        ])
        .unwrap();
        let formatter = ColoredFormatter::new();

        let output = formatter.format_indexed(&set).unwrap();
        assert!(output.contains("Region"));
        assert!(output.contains("20.00 ms"));
        assert!(output.contains("unreachable"));

        let output = formatter.format_regions(&set).unwrap();
        assert!(output.contains("cn-north-1"));
        assert!(output.contains("Beijing"));
    }
}
