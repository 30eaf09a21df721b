//! Remote-desktop reachability probe.
//!
//! A bounded TCP connect to the RDP port. When the port answers, a
//! best-effort reverse lookup names the host; lookup failures are ignored.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use tokio::net::TcpStream;

use netscout_core::types::RdpInfo;

use crate::Probe;

pub const RDP_PORT: u16 = 3389;

pub struct RdpProbe {
    port: u16,
    timeout: Duration,
    resolver: Option<TokioAsyncResolver>,
}

impl RdpProbe {
    /// Build a probe that resolves names with the system resolver configuration.
    pub fn new(timeout: Duration) -> Self {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "System resolver config unavailable, using defaults");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });

        Self {
            port: RDP_PORT,
            timeout,
            resolver: Some(resolver),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Skip the reverse lookup on reachable hosts.
    pub fn without_reverse_dns(mut self) -> Self {
        self.resolver = None;
        self
    }

    async fn reverse_lookup(&self, ip: Ipv4Addr) -> Option<String> {
        let resolver = self.resolver.as_ref()?;
        let lookup = tokio::time::timeout(self.timeout, resolver.reverse_lookup(IpAddr::V4(ip)))
            .await
            .ok()?
            .ok()?;

        let name = lookup.iter().next()?.to_string();
        let name = name.trim_end_matches('.');
        (!name.is_empty() && name != ip.to_string()).then(|| name.to_string())
    }
}

#[async_trait]
impl Probe for RdpProbe {
    type Output = RdpInfo;

    fn name(&self) -> &'static str {
        "rdp"
    }

    fn deadline(&self) -> Duration {
        // connect + reverse lookup
        self.timeout * 2
    }

    async fn probe(&self, ip: Ipv4Addr) -> RdpInfo {
        let addr = SocketAddr::from((ip, self.port));

        match tokio::time::timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => {
                let mut info = RdpInfo::reachable(self.port);
                info.hostname = self.reverse_lookup(ip).await;
                tracing::debug!(ip = %ip, hostname = ?info.hostname, "RDP port accessible");
                info
            }
            Ok(Err(e)) => RdpInfo::unreachable(self.port, format!("RDP port not accessible: {e}")),
            Err(_) => RdpInfo::unreachable(
                self.port,
                format!(
                    "RDP port not accessible: connect timed out after {}ms",
                    self.timeout.as_millis()
                ),
            ),
        }
    }

    fn failure(&self, error: String) -> RdpInfo {
        RdpInfo::unreachable(self.port, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listening_port_is_accessible() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = RdpProbe::new(Duration::from_millis(500))
            .with_port(port)
            .without_reverse_dns();
        let info = probe.probe(Ipv4Addr::LOCALHOST).await;

        assert!(info.accessible);
        assert_eq!(info.port, port);
        assert!(info.error.is_none());
        assert!(info.hostname.is_none());
    }

    #[tokio::test]
    async fn closed_port_is_reported_with_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let probe = RdpProbe::new(Duration::from_millis(500))
            .with_port(port)
            .without_reverse_dns();
        let info = probe.probe(Ipv4Addr::LOCALHOST).await;

        assert!(!info.accessible);
        assert!(info.error.unwrap().starts_with("RDP port not accessible"));
    }

    #[test]
    fn failure_marks_port_inaccessible() {
        let probe = RdpProbe {
            port: RDP_PORT,
            timeout: Duration::from_secs(3),
            resolver: None,
        };
        let info = probe.failure("rdp probe timed out".to_string());
        assert!(!info.accessible);
        assert_eq!(info.port, 3389);
        assert_eq!(probe.deadline(), Duration::from_secs(6));
    }
}
