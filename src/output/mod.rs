//! Output formatting and display system
//!
//! Renders a measured endpoint set as one of four layouts, with or without
//! terminal colors.

mod colored;
mod formatter;

pub use colored::{ColorScheme, ColoredFormatter, PerformanceLevel};
pub use formatter::{format_average, format_sample, OutputFormatter, PlainFormatter, UNREACHABLE_TEXT};

use crate::{
    error::{AppError, Result},
    executor::RunSummary,
    models::{Config, EndpointSet},
};
use serde::{Deserialize, Serialize};

/// Amount of detail in the result output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputLevel {
    /// Region codes and names, nothing is measured
    RegionsOnly,
    /// Name and mean latency
    Latency,
    /// Indexed table with code, name and mean latency
    Indexed,
    /// Indexed table with every round and the average
    PerRound,
}

impl OutputLevel {
    pub fn from_verbosity(verbosity: i32) -> Result<Self> {
        match verbosity {
            -1 => Ok(Self::RegionsOnly),
            0 => Ok(Self::Latency),
            1 => Ok(Self::Indexed),
            2 => Ok(Self::PerRound),
            other => Err(AppError::config(format!(
                "Invalid verbosity level {}: expected -1, 0, 1 or 2",
                other
            ))),
        }
    }

    pub fn verbosity(&self) -> i32 {
        match self {
            Self::RegionsOnly => -1,
            Self::Latency => 0,
            Self::Indexed => 1,
            Self::PerRound => 2,
        }
    }
}

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool) -> Box<dyn OutputFormatter> {
        if enable_color {
            Box::new(ColoredFormatter::new())
        } else {
            Box::new(PlainFormatter::new())
        }
    }
}

/// Main output coordinator that handles all result display
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
    level: OutputLevel,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn OutputFormatter>, level: OutputLevel) -> Self {
        Self { formatter, level }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            OutputFormatterFactory::create_formatter(config.enable_color),
            config.output_level()?,
        ))
    }

    pub fn level(&self) -> OutputLevel {
        self.level
    }

    /// Render a measured set; the per-round layout is followed by a run
    /// summary line
    pub fn display_results(&self, set: &EndpointSet, summary: &RunSummary) -> Result<String> {
        let mut output = self.formatter.format(set, self.level, summary.rounds)?;
        if self.level == OutputLevel::PerRound {
            output.push('\n');
            output.push_str(&self.formatter.format_summary(summary)?);
            output.push('\n');
        }
        Ok(output)
    }

    /// Render the catalog without measurements
    pub fn display_regions(&self, set: &EndpointSet) -> Result<String> {
        self.formatter.format_regions(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Endpoint;
    use crate::target::ProbeMode;
    use std::time::Duration;

    fn summary(rounds: u32) -> RunSummary {
        RunSummary {
            mode: ProbeMode::Tcp,
            rounds,
            endpoints: 1,
            probes: rounds as usize,
            failures: 0,
            unreachable_endpoints: 0,
            elapsed: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_output_level_round_trip() {
        for verbosity in -1..=2 {
            assert_eq!(OutputLevel::from_verbosity(verbosity).unwrap().verbosity(), verbosity);
        }
        assert!(OutputLevel::from_verbosity(3).is_err());
        assert!(OutputLevel::from_verbosity(-2).is_err());
    }

    #[test]
    fn test_coordinator_from_config() {
        let config = Config {
            verbose: 1,
            enable_color: false,
            ..Config::default()
        };
        let coordinator = OutputCoordinator::from_config(&config).unwrap();
        assert_eq!(coordinator.level(), OutputLevel::Indexed);

        let invalid = Config {
            verbose: 5,
            ..Config::default()
        };
        assert!(OutputCoordinator::from_config(&invalid).is_err());
    }

    #[test]
    fn test_summary_only_at_per_round_level() {
        let set = EndpointSet::new(vec![Endpoint::with_samples("a", "A", vec![Duration::from_millis(3)])]).unwrap();

        let plain = OutputCoordinator::new(Box::new(PlainFormatter::new()), OutputLevel::Latency);
        assert!(!plain.display_results(&set, &summary(1)).unwrap().contains("probes failed"));

        let detailed = OutputCoordinator::new(Box::new(PlainFormatter::new()), OutputLevel::PerRound);
        let output = detailed.display_results(&set, &summary(1)).unwrap();
        assert!(output.contains("Try #1"));
        assert!(output.contains("0 of 1 probes failed"));
    }

    #[test]
    fn test_display_regions() {
        let set = EndpointSet::new(vec![Endpoint::new("us-east-1", "N. Virginia")]).unwrap();
        let coordinator = OutputCoordinator::new(OutputFormatterFactory::create_formatter(false), OutputLevel::RegionsOnly);
        assert_eq!(coordinator.display_regions(&set).unwrap(), "us-east-1       N. Virginia\n");
    }
}
