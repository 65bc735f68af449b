//! Endpoints and their round-by-round latency samples

use crate::{
    error::{AppError, Result},
    target::{ProbeMode, ProbeTarget, TokenSource},
};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Sample recorded for a probe that failed or timed out.
///
/// Sorts after every real measurement.
pub const UNREACHABLE: Duration = Duration::MAX;

/// Convert a duration to fractional milliseconds
pub fn duration_to_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Arithmetic mean of `samples`, or `None` when there are none.
///
/// Summed in u128 nanoseconds so that `UNREACHABLE` samples take part in the
/// mean without overflowing.
pub fn mean_duration<'a, I>(samples: I) -> Option<Duration>
where
    I: IntoIterator<Item = &'a Duration>,
{
    let (sum, count) = samples
        .into_iter()
        .fold((0u128, 0u128), |(sum, count), sample| (sum + sample.as_nanos(), count + 1));

    if count == 0 {
        return None;
    }

    let mean = sum / count;
    // mean <= max(sample) <= Duration::MAX, so the seconds fit in a u64
    Some(Duration::new(
        (mean / 1_000_000_000) as u64,
        (mean % 1_000_000_000) as u32,
    ))
}

/// A named region being measured
#[derive(Debug, Clone)]
pub struct Endpoint {
    code: String,
    name: String,
    mode: ProbeMode,
    target: Option<ProbeTarget>,
    /// Rounds of the configured run; no more samples are accepted
    rounds: usize,
    samples: Vec<Duration>,
}

impl Endpoint {
    pub fn new<C: Into<String>, N: Into<String>>(code: C, name: N) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            mode: ProbeMode::default(),
            target: None,
            rounds: 0,
            samples: Vec::new(),
        }
    }

    /// Endpoint with pre-recorded samples, for replaying or ranking
    /// measurements taken elsewhere
    pub fn with_samples<C, N>(code: C, name: N, samples: Vec<Duration>) -> Self
    where
        C: Into<String>,
        N: Into<String>,
    {
        Self {
            rounds: samples.len(),
            samples,
            ..Self::new(code, name)
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> ProbeMode {
        self.mode
    }

    /// Target built by the last `configure` call
    pub fn target(&self) -> Option<&ProbeTarget> {
        self.target.as_ref()
    }

    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    /// Prepare for a measurement run: set the mode, build a fresh target
    /// and drop samples from any earlier run
    pub fn configure(&mut self, mode: ProbeMode, service: &str, rounds: usize, tokens: &dyn TokenSource) {
        self.mode = mode;
        self.target = Some(ProbeTarget::new(mode, self.code.as_str(), service, tokens));
        self.rounds = rounds;
        self.samples = Vec::with_capacity(rounds);
    }

    /// Rounds the endpoint was configured for
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Append the sample of the current round. Refused once every
    /// configured round has a sample.
    pub(crate) fn record_sample(&mut self, sample: Duration) -> Result<()> {
        if self.samples.len() >= self.rounds {
            return Err(AppError::internal(format!(
                "endpoint {} already has {} of {} samples",
                self.code,
                self.samples.len(),
                self.rounds
            )));
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Mean over all samples, unreachable ones included.
    ///
    /// An endpoint without samples counts as unreachable.
    pub fn mean_latency(&self) -> Duration {
        mean_duration(&self.samples).unwrap_or(UNREACHABLE)
    }

    /// Mean over the samples of successful probes only
    pub fn reachable_mean(&self) -> Option<Duration> {
        mean_duration(self.samples.iter().filter(|s| **s != UNREACHABLE))
    }

    /// Number of rounds whose probe failed
    pub fn failed_rounds(&self) -> usize {
        self.samples.iter().filter(|s| **s == UNREACHABLE).count()
    }

    /// True when no probe has succeeded
    pub fn is_unreachable(&self) -> bool {
        self.reachable_mean().is_none()
    }
}

/// Ordered collection of endpoints, unique by code
#[derive(Debug, Clone, Default)]
pub struct EndpointSet {
    endpoints: Vec<Endpoint>,
}

impl EndpointSet {
    /// Build a set, keeping the given order. Duplicate codes are rejected.
    pub fn new(endpoints: Vec<Endpoint>) -> Result<Self> {
        let mut seen = HashSet::new();
        for endpoint in &endpoints {
            if !seen.insert(endpoint.code()) {
                return Err(AppError::validation(format!(
                    "duplicate endpoint code '{}'",
                    endpoint.code()
                )));
            }
        }
        Ok(Self { endpoints })
    }

    /// Build a set from a `code -> name` catalog, ordered by code
    pub fn from_catalog(catalog: HashMap<String, String>) -> Self {
        let mut endpoints: Vec<Endpoint> = catalog
            .into_iter()
            .map(|(code, name)| Endpoint::new(code, name))
            .collect();
        endpoints.sort_by(|a, b| a.code.cmp(&b.code));
        Self { endpoints }
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Endpoint> {
        self.endpoints.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Endpoint> {
        self.endpoints.iter_mut()
    }

    pub fn get(&self, code: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.code == code)
    }

    pub fn codes(&self) -> Vec<&str> {
        self.endpoints.iter().map(|e| e.code.as_str()).collect()
    }

    /// Stable sort by ascending mean latency; endpoints with equal means
    /// keep their current relative order
    pub fn sort_by_latency(&mut self) {
        self.endpoints.sort_by_key(Endpoint::mean_latency);
    }
}

impl<'a> IntoIterator for &'a EndpointSet {
    type Item = &'a Endpoint;
    type IntoIter = std::slice::Iter<'a, Endpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.endpoints.iter()
    }
}
