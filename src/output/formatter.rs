//! Core formatting traits and the plain text formatter
//!
//! All layouts pad cells before any styling is applied, so colored and
//! plain output line up the same way.

use crate::{
    error::{AppError, Result},
    executor::RunSummary,
    models::{duration_to_ms, Endpoint, EndpointSet, UNREACHABLE},
};
use std::fmt::Write as _;
use std::time::Duration;

use super::OutputLevel;

/// Text shown instead of a latency when a probe failed
pub const UNREACHABLE_TEXT: &str = "unreachable";

/// Renders measured endpoint sets
pub trait OutputFormatter {
    /// Region codes and names only
    fn format_regions(&self, set: &EndpointSet) -> Result<String>;

    /// Name and mean latency per endpoint
    fn format_latency(&self, set: &EndpointSet) -> Result<String>;

    /// Indexed table with code, name and mean latency
    fn format_indexed(&self, set: &EndpointSet) -> Result<String>;

    /// Indexed table with one column per round plus the average
    fn format_rounds(&self, set: &EndpointSet, rounds: u32) -> Result<String>;

    /// One-line description of a finished run
    fn format_summary(&self, summary: &RunSummary) -> Result<String>;

    /// Render `set` in the layout selected by `level`
    fn format(&self, set: &EndpointSet, level: OutputLevel, rounds: u32) -> Result<String> {
        match level {
            OutputLevel::RegionsOnly => self.format_regions(set),
            OutputLevel::Latency => self.format_latency(set),
            OutputLevel::Indexed => self.format_indexed(set),
            OutputLevel::PerRound => self.format_rounds(set, rounds),
        }
    }
}

/// A single latency sample as shown in tables
pub fn format_sample(sample: Duration) -> String {
    if sample == UNREACHABLE {
        UNREACHABLE_TEXT.to_string()
    } else {
        format!("{:.2} ms", duration_to_ms(sample))
    }
}

/// Average latency of an endpoint as shown in tables.
///
/// Only successful rounds are averaged; lost rounds are counted instead.
pub fn format_average(endpoint: &Endpoint) -> String {
    match endpoint.reachable_mean() {
        None => UNREACHABLE_TEXT.to_string(),
        Some(mean) => match endpoint.failed_rounds() {
            0 => format_sample(mean),
            lost => format!("{} ({} lost)", format_sample(mean), lost),
        },
    }
}

/// Styling applied to already padded cells
pub(super) trait CellStyle {
    fn heading(&self, cell: String) -> String;

    fn sample(&self, cell: String, sample: Duration) -> String;

    fn average(&self, cell: String, endpoint: &Endpoint) -> String;

    fn muted(&self, cell: String) -> String;
}

pub(super) fn fmt_error(e: std::fmt::Error) -> AppError {
    AppError::internal(format!("Failed to format output: {}", e))
}

pub(super) fn render_regions(set: &EndpointSet) -> Result<String> {
    let mut output = String::new();
    for endpoint in set {
        writeln!(output, "{:<15} {}", endpoint.code(), endpoint.name()).map_err(fmt_error)?;
    }
    Ok(output)
}

pub(super) fn render_latency<S: CellStyle>(set: &EndpointSet, style: &S) -> Result<String> {
    let mut output = String::new();
    for endpoint in set {
        let latency = style.average(format!("{:>20}", format_average(endpoint)), endpoint);
        writeln!(output, "{:<25} {}", endpoint.name(), latency).map_err(fmt_error)?;
    }
    Ok(output)
}

pub(super) fn render_indexed<S: CellStyle>(set: &EndpointSet, style: &S) -> Result<String> {
    let mut output = String::new();
    let header = format!("{:>5} {:<15} {:<30} {:>20}", "", "Code", "Region", "Latency");
    writeln!(output, "{}", style.heading(header)).map_err(fmt_error)?;

    for (index, endpoint) in set.iter().enumerate() {
        let latency = style.average(format!("{:>20}", format_average(endpoint)), endpoint);
        writeln!(
            output,
            "{} {:<15} {:<30} {}",
            style.muted(format!("{:>5}", index)),
            endpoint.code(),
            endpoint.name(),
            latency
        )
        .map_err(fmt_error)?;
    }
    Ok(output)
}

pub(super) fn render_rounds<S: CellStyle>(set: &EndpointSet, rounds: u32, style: &S) -> Result<String> {
    let mut output = String::new();

    let mut header = format!("{:>5} {:<15} {:<25}", "", "Code", "Region");
    for round in 1..=rounds {
        write!(header, " {:>15}", format!("Try #{}", round)).map_err(fmt_error)?;
    }
    write!(header, " {:>15}", "Avg Latency").map_err(fmt_error)?;
    writeln!(output, "{}", style.heading(header)).map_err(fmt_error)?;

    for (index, endpoint) in set.iter().enumerate() {
        write!(
            output,
            "{} {:<15} {:<25}",
            style.muted(format!("{:>5}", index)),
            endpoint.code(),
            endpoint.name()
        )
        .map_err(fmt_error)?;

        for round in 0..rounds as usize {
            let cell = match endpoint.samples().get(round) {
                Some(sample) => style.sample(format!("{:>15}", format_sample(*sample)), *sample),
                None => style.muted(format!("{:>15}", "-")),
            };
            write!(output, " {}", cell).map_err(fmt_error)?;
        }

        let average = style.average(format!("{:>15}", format_average(endpoint)), endpoint);
        writeln!(output, " {}", average).map_err(fmt_error)?;
    }
    Ok(output)
}

pub(super) fn render_summary(summary: &RunSummary) -> String {
    format!(
        "{} endpoints, {} round(s) over {}: {} of {} probes failed, took {:.2}s",
        summary.endpoints,
        summary.rounds,
        summary.mode,
        summary.failures,
        summary.probes,
        summary.elapsed.as_secs_f64()
    )
}

struct Unstyled;

impl CellStyle for Unstyled {
    fn heading(&self, cell: String) -> String {
        cell
    }

    fn sample(&self, cell: String, _sample: Duration) -> String {
        cell
    }

    fn average(&self, cell: String, _endpoint: &Endpoint) -> String {
        cell
    }

    fn muted(&self, cell: String) -> String {
        cell
    }
}

/// Plain text formatter for pipes, logs and scripts
#[derive(Debug, Default, Clone)]
pub struct PlainFormatter;

impl PlainFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_regions(&self, set: &EndpointSet) -> Result<String> {
        render_regions(set)
    }

    fn format_latency(&self, set: &EndpointSet) -> Result<String> {
        render_latency(set, &Unstyled)
    }

    fn format_indexed(&self, set: &EndpointSet) -> Result<String> {
        render_indexed(set, &Unstyled)
    }

    fn format_rounds(&self, set: &EndpointSet, rounds: u32) -> Result<String> {
        render_rounds(set, rounds, &Unstyled)
    }

    fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        Ok(render_summary(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::ProbeMode;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn measured() -> EndpointSet {
        EndpointSet::new(vec![
            Endpoint::with_samples("eu-west-1", "Ireland", vec![ms(20), ms(30)]),
            Endpoint::with_samples("us-east-1", "N. Virginia", vec![UNREACHABLE, ms(90)]),
            Endpoint::with_samples("cn-north-1", "Beijing", vec![UNREACHABLE, UNREACHABLE]),
        ])
        .unwrap()
    }

    #[test]
    fn test_format_sample() {
        assert_eq!(format_sample(Duration::from_micros(12_345)), "12.35 ms");
        assert_eq!(format_sample(UNREACHABLE), "unreachable");
    }

    #[test]
    fn test_format_average() {
        let set = measured();
        assert_eq!(format_average(set.get("eu-west-1").unwrap()), "25.00 ms");
        assert_eq!(format_average(set.get("us-east-1").unwrap()), "90.00 ms (1 lost)");
        assert_eq!(format_average(set.get("cn-north-1").unwrap()), "unreachable");
        assert_eq!(format_average(&Endpoint::new("a", "A")), "unreachable");
    }

    #[test]
    fn test_regions_layout() {
        let output = PlainFormatter::new().format_regions(&measured()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "eu-west-1       Ireland");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_latency_layout() {
        let output = PlainFormatter::new().format_latency(&measured()).unwrap();
        let first = output.lines().next().unwrap();
        assert_eq!(first, format!("{:<25} {:>20}", "Ireland", "25.00 ms"));
    }

    #[test]
    fn test_indexed_layout() {
        let output = PlainFormatter::new().format_indexed(&measured()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], format!("{:>5} {:<15} {:<30} {:>20}", "", "Code", "Region", "Latency"));
        assert_eq!(lines[1], format!("{:>5} {:<15} {:<30} {:>20}", 0, "eu-west-1", "Ireland", "25.00 ms"));
        assert!(lines[3].trim_end().ends_with("unreachable"));
    }

    #[test]
    fn test_rounds_layout() {
        let output = PlainFormatter::new().format_rounds(&measured(), 2).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].contains("Try #1"));
        assert!(lines[0].contains("Try #2"));
        assert!(lines[0].ends_with("Avg Latency"));
        assert_eq!(
            lines[2],
            format!(
                "{:>5} {:<15} {:<25} {:>15} {:>15} {:>15}",
                1, "us-east-1", "N. Virginia", "unreachable", "90.00 ms", "90.00 ms (1 lost)"
            )
        );
    }

    #[test]
    fn test_missing_rounds_render_as_dash() {
        let set = EndpointSet::new(vec![Endpoint::with_samples("a", "A", vec![ms(1)])]).unwrap();
        let output = PlainFormatter::new().format_rounds(&set, 2).unwrap();
        assert!(output.lines().nth(1).unwrap().contains(&format!("{:>15}", "-")));
    }

    #[test]
    fn test_format_dispatches_on_level() {
        let formatter = PlainFormatter::new();
        let set = measured();
        assert_eq!(
            formatter.format(&set, OutputLevel::RegionsOnly, 2).unwrap(),
            formatter.format_regions(&set).unwrap()
        );
        assert_eq!(
            formatter.format(&set, OutputLevel::PerRound, 2).unwrap(),
            formatter.format_rounds(&set, 2).unwrap()
        );
    }

    #[test]
    fn test_summary_line() {
        let summary = RunSummary {
            mode: ProbeMode::Https,
            rounds: 3,
            endpoints: 2,
            probes: 6,
            failures: 1,
            unreachable_endpoints: 0,
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(
            PlainFormatter::new().format_summary(&summary).unwrap(),
            "2 endpoints, 3 round(s) over https: 1 of 6 probes failed, took 1.50s"
        );
    }
}
