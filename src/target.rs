//! Probe targets: turning a region code into something dialable
//!
//! Every region is addressed through the same naming scheme,
//! `<service>.<code>.<suffix>`. TCP probes resolve that hostname and connect
//! to port 443; HTTP/HTTPS probes request `/ping` on it with a random
//! cache-busting query parameter.

use crate::{
    dns::AddressResolver,
    error::{AppError, Result},
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    net::{IpAddr, SocketAddr},
    sync::atomic::{AtomicU64, Ordering},
};

/// Suffix for regions in the standard partition
pub const STANDARD_SUFFIX: &str = "amazonaws.com";

/// Suffix for regions in the China partition
pub const RESTRICTED_SUFFIX: &str = "amazonaws.com.cn";

/// Region code prefix marking the China partition
pub const RESTRICTED_PREFIX: &str = "cn";

/// Port dialed by TCP probes
pub const PROBE_PORT: u16 = 443;

/// Default length of cache-busting tokens
pub const DEFAULT_TOKEN_LENGTH: usize = 13;

const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// How an endpoint is probed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProbeMode {
    /// Raw TCP connect to port 443
    #[default]
    Tcp,
    /// Plain HTTP GET
    Http,
    /// HTTP GET over TLS
    Https,
}

impl ProbeMode {
    /// Pick the probe mode from the two CLI flags.
    ///
    /// `use_http` wins over `use_https`; with neither set the mode is TCP.
    pub fn select(use_http: bool, use_https: bool) -> Self {
        if use_http {
            Self::Http
        } else if use_https {
            Self::Https
        } else {
            Self::Tcp
        }
    }

    pub fn uses_tls(&self) -> bool {
        matches!(self, Self::Https)
    }

    /// URL scheme used when building request URLs
    pub fn scheme(&self) -> &'static str {
        if self.uses_tls() {
            "https"
        } else {
            "http"
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for ProbeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a region code to the domain suffix of its partition
pub fn domain_suffix(code: &str) -> &'static str {
    if code.starts_with(RESTRICTED_PREFIX) {
        RESTRICTED_SUFFIX
    } else {
        STANDARD_SUFFIX
    }
}

/// Source of cache-busting tokens
pub trait TokenSource: Send + Sync {
    fn next_token(&self) -> String;
}

/// Random ASCII-letter tokens
#[derive(Debug, Clone)]
pub struct RandomTokenSource {
    length: usize,
}

impl RandomTokenSource {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomTokenSource {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_LENGTH)
    }
}

impl TokenSource for RandomTokenSource {
    fn next_token(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
            .collect()
    }
}

/// Deterministic `<prefix><n>` tokens, counting up from zero
#[derive(Debug)]
pub struct SequentialTokenSource {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialTokenSource {
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl TokenSource for SequentialTokenSource {
    fn next_token(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}

/// What a probe has to dial
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dial {
    /// Resolve `host` and open a TCP connection to `port`
    Connect { host: String, port: u16 },
    /// Issue a GET request to `url`
    Request { url: String },
}

/// Addressing information for one endpoint under one probe mode.
///
/// Immutable once built; changing the mode or service means building a new
/// target, which also draws a fresh cache-busting token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    mode: ProbeMode,
    endpoint_code: String,
    service: String,
    cache_buster: String,
}

impl ProbeTarget {
    pub fn new<C, S>(mode: ProbeMode, endpoint_code: C, service: S, tokens: &dyn TokenSource) -> Self
    where
        C: Into<String>,
        S: Into<String>,
    {
        Self {
            mode,
            endpoint_code: endpoint_code.into(),
            service: service.into(),
            cache_buster: tokens.next_token(),
        }
    }

    pub fn mode(&self) -> ProbeMode {
        self.mode
    }

    pub fn endpoint_code(&self) -> &str {
        &self.endpoint_code
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn cache_buster(&self) -> &str {
        &self.cache_buster
    }

    /// `<service>.<code>.<suffix>`
    pub fn hostname(&self) -> String {
        format!(
            "{}.{}.{}",
            self.service,
            self.endpoint_code,
            domain_suffix(&self.endpoint_code)
        )
    }

    /// Request URL for HTTP/HTTPS probes
    pub fn url(&self) -> String {
        format!(
            "{}://{}/ping?x={}",
            self.mode.scheme(),
            self.hostname(),
            self.cache_buster
        )
    }

    pub fn dial(&self) -> Dial {
        match self.mode {
            ProbeMode::Tcp => Dial::Connect {
                host: self.hostname(),
                port: PROBE_PORT,
            },
            ProbeMode::Http | ProbeMode::Https => Dial::Request { url: self.url() },
        }
    }

    /// Resolve the hostname to the first IPv4 socket address on port 443
    pub async fn resolve_address(&self, resolver: &dyn AddressResolver) -> Result<SocketAddr> {
        let host = self.hostname();
        let addresses = resolver.lookup_ipv4(&host).await?;

        addresses
            .first()
            .map(|ip| SocketAddr::new(IpAddr::V4(*ip), PROBE_PORT))
            .ok_or_else(|| AppError::resolution(format!("no IPv4 address found for {}", host)))
    }
}
