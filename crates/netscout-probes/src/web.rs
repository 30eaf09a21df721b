//! Web service probe.
//!
//! Checks HTTP/HTTPS reachability with HEAD requests and, when either
//! answers, looks for exposed sensitive paths, measures latency, and on
//! HTTPS inspects the certificate and the standard security headers.
//!
//! Certificate validation is switched off for the clients owned by this
//! probe only. Nothing else in netscout shares them.

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use native_tls::TlsConnector;
use reqwest::header::{HeaderMap, CACHE_CONTROL, CONTENT_ENCODING, SERVER};
use reqwest::redirect::Policy;
use x509_parser::prelude::*;

use netscout_core::types::{
    CertificateInfo, EndpointStatus, PathFinding, WebInfo, WebPerformance, WebSecurity,
};

use crate::error::{ProbeError, Result};
use crate::Probe;

pub const HTTP_PORT: u16 = 80;
pub const HTTPS_PORT: u16 = 443;

/// Paths that should not be reachable on a hardened server.
pub const SENSITIVE_PATHS: [&str; 8] = [
    "/admin",
    "/login",
    "/phpmyadmin",
    "/wp-admin",
    "/config",
    "/backup",
    "/.env",
    "/.git",
];

pub const SECURITY_HEADERS: [&str; 4] = [
    "X-Frame-Options",
    "X-XSS-Protection",
    "X-Content-Type-Options",
    "Strict-Transport-Security",
];

const USER_AGENT: &str = concat!("netscout/", env!("CARGO_PKG_VERSION"));

/// Classify a sensitive path by its status code. 404 is never a finding.
pub fn classify_status(status: u16) -> Option<PathFinding> {
    match status {
        404 => None,
        401 | 403 => Some(PathFinding::AuthenticationRequired { status }),
        _ => Some(PathFinding::Accessible { status }),
    }
}

pub struct WebProbe {
    client: reqwest::Client,
    timeout: Duration,
    http_port: u16,
    https_port: u16,
}

impl WebProbe {
    /// `timeout` bounds each individual request.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(true)
            .redirect(Policy::none())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            timeout,
            http_port: HTTP_PORT,
            https_port: HTTPS_PORT,
        })
    }

    pub fn with_ports(mut self, http_port: u16, https_port: u16) -> Self {
        self.http_port = http_port;
        self.https_port = https_port;
        self
    }

    async fn check_endpoint(&self, url: &str) -> EndpointStatus {
        match self.client.head(url).send().await {
            Ok(resp) => EndpointStatus {
                enabled: true,
                status: Some(resp.status().as_u16()),
                server: header_value(resp.headers(), SERVER.as_str()),
                error: None,
            },
            Err(e) => EndpointStatus {
                enabled: false,
                status: None,
                server: None,
                error: Some(e.to_string()),
            },
        }
    }

    async fn scan_sensitive_paths(&self, base: &str) -> BTreeMap<String, PathFinding> {
        let mut findings = BTreeMap::new();

        for path in SENSITIVE_PATHS {
            let finding = match self.client.head(format!("{base}{path}")).send().await {
                Ok(resp) => classify_status(resp.status().as_u16()),
                Err(e) => Some(PathFinding::Error {
                    message: e.to_string(),
                }),
            };
            if let Some(finding) = finding {
                findings.insert(path.to_string(), finding);
            }
        }

        findings
    }

    async fn measure_performance(&self, base: &str) -> WebPerformance {
        let start = Instant::now();
        match self.client.get(base).send().await {
            Ok(resp) => WebPerformance {
                response_time_ms: Some(start.elapsed().as_millis() as u64),
                uses_caching: Some(resp.headers().contains_key(CACHE_CONTROL)),
                uses_compression: Some(resp.headers().contains_key(CONTENT_ENCODING)),
                ..Default::default()
            },
            Err(e) => WebPerformance {
                error: Some(format!("Could not measure response time: {e}")),
                ..Default::default()
            },
        }
    }

    async fn inspect_https(&self, ip: Ipv4Addr, security: &mut WebSecurity) {
        let base = format!("https://{ip}:{}", self.https_port);
        match self.client.get(&base).send().await {
            Ok(resp) => {
                security.security_headers = SECURITY_HEADERS
                    .iter()
                    .map(|name| (name.to_string(), resp.headers().contains_key(*name)))
                    .collect();
            }
            Err(e) => {
                security
                    .extra
                    .insert("headers_error".to_string(), e.to_string());
            }
        }

        let addr = SocketAddr::from((ip, self.https_port));
        let timeout = self.timeout;
        let fetched = tokio::task::spawn_blocking(move || fetch_certificate(addr, timeout))
            .await
            .map_err(ProbeError::from)
            .and_then(|r| r);

        match fetched {
            Ok(Some(cert)) => security.certificate = Some(cert),
            Ok(None) => security.tls_error = Some("Server presented no certificate".to_string()),
            Err(e) => security.tls_error = Some(e.to_string()),
        }
    }
}

#[async_trait]
impl Probe for WebProbe {
    type Output = WebInfo;

    fn name(&self) -> &'static str {
        "web"
    }

    fn deadline(&self) -> Duration {
        // two reachability checks, every sensitive path, latency, headers, certificate
        self.timeout * (SENSITIVE_PATHS.len() as u32 + 5)
    }

    async fn probe(&self, ip: Ipv4Addr) -> WebInfo {
        let http_base = format!("http://{ip}:{}", self.http_port);
        let https_base = format!("https://{ip}:{}", self.https_port);

        let mut info = WebInfo::default();
        let http = self.check_endpoint(&http_base).await;
        let https = self.check_endpoint(&https_base).await;

        let base = if http.enabled {
            Some(http_base)
        } else if https.enabled {
            Some(https_base)
        } else {
            None
        };
        let https_enabled = https.enabled;
        info.security.http = Some(http);
        info.security.https = Some(https);

        let Some(base) = base else {
            tracing::debug!(ip = %ip, "No web service reachable");
            return info;
        };

        info.vulnerabilities = self.scan_sensitive_paths(&base).await;
        info.performance = self.measure_performance(&base).await;
        if https_enabled {
            self.inspect_https(ip, &mut info.security).await;
        }

        tracing::debug!(
            ip = %ip,
            findings = info.vulnerabilities.len(),
            response_time_ms = ?info.performance.response_time_ms,
            "Web probe complete"
        );
        info
    }

    fn failure(&self, error: String) -> WebInfo {
        WebInfo::failed(error)
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn fetch_certificate(addr: SocketAddr, timeout: Duration) -> Result<Option<CertificateInfo>> {
    let connector = TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
        .map_err(|e| ProbeError::Tls(e.to_string()))?;

    let stream = TcpStream::connect_timeout(&addr, timeout)
        .map_err(|source| ProbeError::Connect { addr, source })?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;

    let tls = connector
        .connect(&addr.ip().to_string(), stream)
        .map_err(|e| ProbeError::Tls(e.to_string()))?;

    let Some(cert) = tls
        .peer_certificate()
        .map_err(|e| ProbeError::Tls(e.to_string()))?
    else {
        return Ok(None);
    };

    let der = cert.to_der().map_err(|e| ProbeError::Tls(e.to_string()))?;
    parse_certificate(&der).map(Some)
}

/// Extract subject, issuer, and validity window from a DER certificate.
pub fn parse_certificate(der: &[u8]) -> Result<CertificateInfo> {
    let (_, x509) =
        parse_x509_certificate(der).map_err(|e| ProbeError::Certificate(e.to_string()))?;
    let validity = x509.validity();

    Ok(CertificateInfo {
        subject: x509.subject().to_string(),
        issuer: x509.issuer().to_string(),
        not_before: utc_from_timestamp(validity.not_before.timestamp())?,
        not_after: utc_from_timestamp(validity.not_after.timestamp())?,
    })
}

fn utc_from_timestamp(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| ProbeError::Certificate(format!("validity date {secs} is out of range")))
}
