//! Latency measurement engine
//!
//! A run moves through `Idle -> Configuring -> Round(1..=R) -> Sorted`:
//! every endpoint gets a fresh probe target, then each round spawns one
//! worker task per endpoint and joins all of them before the next round
//! starts. Finally the set is stable-sorted by mean latency.

use crate::{
    client::Prober,
    error::{AppError, Result},
    logging::{Logger, ProbeLogger},
    models::{Config, EndpointSet, UNREACHABLE},
    target::{ProbeMode, RandomTokenSource, TokenSource},
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::task::JoinHandle;

/// Phase of a measurement run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Idle,
    Configuring,
    Round(u32),
    Sorted,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Idle => f.write_str("idle"),
            EngineState::Configuring => f.write_str("configuring"),
            EngineState::Round(round) => write!(f, "round {}", round),
            EngineState::Sorted => f.write_str("sorted"),
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub mode: ProbeMode,
    pub rounds: u32,
    pub endpoints: usize,
    /// Probes issued, always `rounds * endpoints`
    pub probes: usize,
    /// Probes that recorded an unreachable sample
    pub failures: usize,
    /// Endpoints without a single successful probe
    pub unreachable_endpoints: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Percentage of successful probes
    pub fn success_rate(&self) -> f64 {
        if self.probes == 0 {
            return 0.0;
        }
        (self.probes - self.failures) as f64 / self.probes as f64 * 100.0
    }
}

/// Runs measurement rounds over an endpoint set
pub struct LatencyEngine<P: Prober + 'static> {
    prober: Arc<P>,
    tokens: Arc<dyn TokenSource>,
    logger: ProbeLogger,
}

impl<P: Prober + 'static> LatencyEngine<P> {
    pub fn new(prober: P) -> Self {
        Self {
            prober: Arc::new(prober),
            tokens: Arc::new(RandomTokenSource::default()),
            logger: ProbeLogger::from_logger(Logger::with_config("PROBE", &Config::default())),
        }
    }

    /// Replace the source of cache-busting tokens
    pub fn with_tokens(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_logger(mut self, logger: ProbeLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    /// Measure every endpoint of `set` over `rounds` rounds and sort the set
    /// fastest first.
    ///
    /// The probe mode is HTTP if `use_http` is set, else HTTPS if
    /// `use_https` is set, else TCP. Individual probe failures never fail the
    /// run; they are recorded as unreachable samples.
    pub async fn calc_latency(
        &self,
        set: &mut EndpointSet,
        rounds: u32,
        use_http: bool,
        use_https: bool,
        service: &str,
    ) -> Result<RunSummary> {
        if rounds == 0 {
            return Err(AppError::validation("Number of rounds must be greater than 0"));
        }
        if set.is_empty() {
            return Err(AppError::validation("No endpoints to measure"));
        }
        if service.is_empty() {
            return Err(AppError::validation("Service name cannot be empty"));
        }

        let mode = ProbeMode::select(use_http, use_https);
        let started = Instant::now();
        let operation = self.logger.logger().start_operation("calc_latency").await;

        self.transition(EngineState::Configuring).await;
        self.configure(set, mode, service, rounds);

        let mut failures = 0;
        for round in 1..=rounds {
            self.transition(EngineState::Round(round)).await;
            let round_started = Instant::now();
            let round_failures = self.run_round(set, round).await;
            self.logger
                .log_round(round, rounds, set.len(), round_failures, round_started.elapsed())
                .await;
            failures += round_failures;
        }

        set.sort_by_latency();
        self.transition(EngineState::Sorted).await;

        let mut unreachable_endpoints = 0;
        for endpoint in set.iter().filter(|e| e.is_unreachable()) {
            self.logger.log_unreachable(endpoint.code(), rounds).await;
            unreachable_endpoints += 1;
        }

        let summary = RunSummary {
            mode,
            rounds,
            endpoints: set.len(),
            probes: set.len() * rounds as usize,
            failures,
            unreachable_endpoints,
            elapsed: started.elapsed(),
        };

        self.logger
            .logger()
            .info(&format!(
                "Measured {} endpoints over {} round(s) in {:.2}s",
                summary.endpoints,
                summary.rounds,
                summary.elapsed.as_secs_f64()
            ))
            .field("mode", mode)
            .field("failures", summary.failures)
            .field("success_rate", summary.success_rate())
            .log()
            .await;
        self.logger.logger().end_operation(&operation, "calc_latency", true).await;
        self.transition(EngineState::Idle).await;

        Ok(summary)
    }

    /// Same as [`calc_latency`](Self::calc_latency), with every parameter
    /// taken from the configuration
    pub async fn measure(&self, set: &mut EndpointSet, config: &Config) -> Result<RunSummary> {
        self.calc_latency(set, config.repeats, config.use_http, config.use_https, &config.service)
            .await
    }

    /// Give every endpoint a fresh target for `mode` and clear old samples
    pub fn configure(&self, set: &mut EndpointSet, mode: ProbeMode, service: &str, rounds: u32) {
        for endpoint in set.iter_mut() {
            endpoint.configure(mode, service, rounds as usize, self.tokens.as_ref());
        }
    }

    /// Probe every endpoint once, each on its own worker task, and return
    /// the number of failed probes. Returns only after every worker has
    /// finished.
    pub(crate) async fn run_round(&self, set: &mut EndpointSet, round: u32) -> usize {
        let workers: Vec<JoinHandle<Result<Duration>>> = set
            .iter()
            .map(|endpoint| {
                let prober = Arc::clone(&self.prober);
                let target = endpoint.target().cloned();
                let code = endpoint.code().to_string();
                tokio::spawn(async move {
                    match target {
                        Some(target) => prober.probe(&target).await,
                        None => Err(AppError::internal(format!("endpoint {} was not configured", code))),
                    }
                })
            })
            .collect();

        let outcomes = join_all(workers).await;

        let mut failures = 0;
        for (endpoint, joined) in set.iter_mut().zip(outcomes) {
            let outcome = joined.unwrap_or_else(|e| {
                Err(AppError::internal(format!("probe worker for {} failed: {}", endpoint.code(), e)))
            });
            self.logger
                .log_probe(endpoint.code(), endpoint.mode(), round, &outcome)
                .await;

            if outcome.is_err() {
                failures += 1;
            }
            if let Err(e) = endpoint.record_sample(outcome.unwrap_or(UNREACHABLE)) {
                self.logger.logger().warn(&e.to_string()).field("round", round).log().await;
            }
        }

        failures
    }

    async fn transition(&self, state: EngineState) {
        self.logger
            .logger()
            .trace(&format!("Engine state: {}", state))
            .field("state", state)
            .log()
            .await;
    }
}
