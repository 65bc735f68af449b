//! Network probes and their timing measurements

use crate::{
    dns::AddressResolver,
    error::{AppError, Result},
    target::{Dial, ProbeTarget},
};
use async_trait::async_trait;
use reqwest::{redirect, Client};
use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{net::TcpStream, time::timeout};

/// Measures the latency of one probe against a target.
///
/// Returns the measured duration, or an error when the endpoint could not be
/// resolved, connected to or did not answer in time. Callers turn errors into
/// unreachable samples.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: &ProbeTarget) -> Result<Duration>;
}

/// Prober that talks to the real network
pub struct NetworkProber {
    client: Client,
    resolver: Arc<dyn AddressResolver>,
    timeout: Duration,
}

impl NetworkProber {
    /// Create a prober whose probes are each bounded by `timeout`
    pub fn new(resolver: Arc<dyn AddressResolver>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(crate::USER_AGENT)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            resolver,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Time a TCP handshake with `address`. The connection is closed again
    /// right away.
    pub async fn connect_latency(&self, address: SocketAddr) -> Result<Duration> {
        let start = Instant::now();
        let stream = TcpStream::connect(address)
            .await
            .map_err(|e| AppError::connection(format!("{}: {}", address, e)))?;
        let elapsed = start.elapsed();
        drop(stream);

        Ok(elapsed)
    }

    /// Time a GET request until the response headers arrive.
    ///
    /// Any HTTP status counts as an answer; the body is never read.
    pub async fn request_latency(&self, url: &str) -> Result<Duration> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let elapsed = start.elapsed();
        drop(response);

        Ok(elapsed)
    }

    async fn measure(&self, target: &ProbeTarget) -> Result<Duration> {
        match target.dial() {
            Dial::Connect { .. } => {
                // Resolution is not part of the measured latency
                let address = target.resolve_address(self.resolver.as_ref()).await?;
                self.connect_latency(address).await
            }
            Dial::Request { url } => self.request_latency(&url).await,
        }
    }
}

#[async_trait]
impl Prober for NetworkProber {
    async fn probe(&self, target: &ProbeTarget) -> Result<Duration> {
        timeout(self.timeout, self.measure(target))
            .await
            .map_err(|_| {
                AppError::timeout(format!(
                    "{} probe of {} exceeded {}s",
                    target.mode(),
                    target.hostname(),
                    self.timeout.as_secs_f64()
                ))
            })?
    }
}
