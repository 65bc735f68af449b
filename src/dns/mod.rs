//! Name resolution for TCP probes

use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};
use trust_dns_resolver::{system_conf, TokioAsyncResolver};

/// Resolves hostnames to IPv4 addresses
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Look up the IPv4 addresses of `host`, in the order the resolver
    /// returned them. An empty list means the name exists without A records.
    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>>;
}

/// Resolver backed by the operating system's DNS configuration
#[derive(Clone)]
pub struct SystemResolver {
    resolver: TokioAsyncResolver,
}

impl SystemResolver {
    /// Create a resolver from the system configuration (`/etc/resolv.conf`
    /// on Unix, the registry on Windows)
    pub fn new() -> Result<Self> {
        let (config, opts) = system_conf::read_system_conf()
            .map_err(|e| AppError::resolution(format!("Failed to read system DNS config: {}", e)))?;

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        })
    }
}

#[async_trait]
impl AddressResolver for SystemResolver {
    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>> {
        let response = self
            .resolver
            .lookup_ip(host)
            .await
            .map_err(|e| AppError::resolution(format!("DNS lookup failed for {}: {}", host, e)))?;

        Ok(ipv4_only(response.iter()))
    }
}

/// Keep only IPv4 addresses, preserving order
pub fn ipv4_only<I>(addresses: I) -> Vec<Ipv4Addr>
where
    I: IntoIterator<Item = IpAddr>,
{
    addresses
        .into_iter()
        .filter_map(|ip| match ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .collect()
}
