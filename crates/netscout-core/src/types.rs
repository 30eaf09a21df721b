//! Core domain types for the netscout pipeline.
//!
//! Discovery output (`DiscoveredHost`) and probe output (`SshInfo`, `RdpInfo`,
//! `SnmpInfo`, `WebInfo`) are merged into one canonical `Device` per address.
//! Every probe record has typed fields for the values netscout knows about and
//! an `extra` map for anything vendor-specific.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Description recorded for an open port the engine could not identify.
pub const UNKNOWN_SERVICE: &str = "Unknown service";

// ── Target ────────────────────────────────────────────────────────

/// Something handed to the discovery engine: a CIDR network or a bare host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Network(Ipv4Net),
    Host(String),
}

impl FromStr for Target {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = |reason: &str| CoreError::InvalidTarget {
            target: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("target is empty"));
        }

        if let Some((addr, prefix)) = raw.split_once('/') {
            let addr: Ipv4Addr = addr
                .parse()
                .map_err(|_| invalid("network address is not an IPv4 address"))?;
            let prefix: u8 = prefix
                .parse()
                .map_err(|_| invalid("prefix length is not a number"))?;
            if !(1..=32).contains(&prefix) {
                return Err(invalid("prefix length must be between 1 and 32"));
            }
            let net = Ipv4Net::new(addr, prefix).map_err(|e| invalid(&e.to_string()))?;
            return Ok(Target::Network(net.trunc()));
        }

        if raw.chars().any(char::is_whitespace) {
            return Err(invalid("host names cannot contain whitespace"));
        }

        Ok(Target::Host(raw.to_string()))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Network(net) => write!(f, "{net}"),
            Target::Host(host) => f.write_str(host),
        }
    }
}

// ── Discovery ─────────────────────────────────────────────────────

/// A live host as reported by the discovery engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredHost {
    pub ip: Ipv4Addr,
    pub mac: Option<String>,
    pub manufacturer: Option<String>,
    pub hostname: Option<String>,
    pub open_ports: BTreeSet<u16>,
    /// Port → service description. Keys are always a subset of `open_ports`.
    pub services: BTreeMap<u16, String>,
    pub os: Option<String>,
}

impl DiscoveredHost {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip,
            mac: None,
            manufacturer: None,
            hostname: None,
            open_ports: BTreeSet::new(),
            services: BTreeMap::new(),
            os: None,
        }
    }

    /// Record an open port together with its service description.
    pub fn add_open_port(&mut self, port: u16, description: impl Into<String>) {
        self.open_ports.insert(port);
        self.services.insert(port, description.into());
    }
}

// ── SSH ───────────────────────────────────────────────────────────

/// The introspection values collected over an SSH session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SshField {
    Os,
    Kernel,
    Uptime,
    Cpu,
    Memory,
    Disk,
}

impl SshField {
    pub const ALL: [SshField; 6] = [
        SshField::Os,
        SshField::Kernel,
        SshField::Uptime,
        SshField::Cpu,
        SshField::Memory,
        SshField::Disk,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SshField::Os => "OS",
            SshField::Kernel => "Kernel",
            SshField::Uptime => "Uptime",
            SshField::Cpu => "CPU",
            SshField::Memory => "Memory",
            SshField::Disk => "Disk",
        }
    }
}

/// Result of the SSH introspection probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<String>,
    /// Per-command failures, keyed by field name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub command_errors: BTreeMap<String, String>,
    /// Set when no session could be established.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl SshInfo {
    /// A record for a probe whose session could not be established.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn set(&mut self, field: SshField, value: String) {
        let slot = match field {
            SshField::Os => &mut self.os,
            SshField::Kernel => &mut self.kernel,
            SshField::Uptime => &mut self.uptime,
            SshField::Cpu => &mut self.cpu,
            SshField::Memory => &mut self.memory,
            SshField::Disk => &mut self.disk,
        };
        *slot = Some(value);
    }

    pub fn get(&self, field: SshField) -> Option<&str> {
        match field {
            SshField::Os => self.os.as_deref(),
            SshField::Kernel => self.kernel.as_deref(),
            SshField::Uptime => self.uptime.as_deref(),
            SshField::Cpu => self.cpu.as_deref(),
            SshField::Memory => self.memory.as_deref(),
            SshField::Disk => self.disk.as_deref(),
        }
    }
}

// ── RDP ───────────────────────────────────────────────────────────

/// Result of the remote-desktop reachability probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RdpInfo {
    pub accessible: bool,
    pub port: u16,
    /// Reverse-DNS name, only when it resolved to something other than the address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl RdpInfo {
    pub fn reachable(port: u16) -> Self {
        Self {
            accessible: true,
            port,
            hostname: None,
            error: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn unreachable(port: u16, error: impl Into<String>) -> Self {
        Self {
            accessible: false,
            port,
            hostname: None,
            error: Some(error.into()),
            extra: BTreeMap::new(),
        }
    }
}

// ── SNMP ──────────────────────────────────────────────────────────

/// The standard MIB-II system group values queried over SNMP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnmpField {
    SysDescr,
    SysUpTime,
    SysContact,
    SysName,
    SysLocation,
}

impl SnmpField {
    pub const ALL: [SnmpField; 5] = [
        SnmpField::SysDescr,
        SnmpField::SysUpTime,
        SnmpField::SysContact,
        SnmpField::SysName,
        SnmpField::SysLocation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SnmpField::SysDescr => "sysDescr",
            SnmpField::SysUpTime => "sysUpTime",
            SnmpField::SysContact => "sysContact",
            SnmpField::SysName => "sysName",
            SnmpField::SysLocation => "sysLocation",
        }
    }
}

/// Result of the SNMP probe. Partial results are normal: each OID is
/// queried on its own and failures land in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnmpInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys_descr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys_up_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys_location: Option<String>,
    /// Per-OID failures, keyed by the OID's MIB name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
    /// Set when no SNMP session could be opened at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl SnmpInfo {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn set(&mut self, field: SnmpField, value: String) {
        let slot = match field {
            SnmpField::SysDescr => &mut self.sys_descr,
            SnmpField::SysUpTime => &mut self.sys_up_time,
            SnmpField::SysContact => &mut self.sys_contact,
            SnmpField::SysName => &mut self.sys_name,
            SnmpField::SysLocation => &mut self.sys_location,
        };
        *slot = Some(value);
    }

    pub fn record_error(&mut self, field: SnmpField, error: impl Into<String>) {
        self.errors.insert(field.name().to_string(), error.into());
    }

    /// Number of OIDs that returned a value.
    pub fn answered(&self) -> usize {
        [
            &self.sys_descr,
            &self.sys_up_time,
            &self.sys_contact,
            &self.sys_name,
            &self.sys_location,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}

// ── Web ───────────────────────────────────────────────────────────

/// Result of the web service probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebInfo {
    pub security: WebSecurity,
    pub performance: WebPerformance,
    /// Sensitive path → finding. Paths answering 404 are never present.
    #[serde(default)]
    pub vulnerabilities: BTreeMap<String, PathFinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebInfo {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// True when either HTTP or HTTPS answered the reachability check.
    pub fn reachable(&self) -> bool {
        [&self.security.http, &self.security.https]
            .iter()
            .any(|e| e.as_ref().is_some_and(|s| s.enabled))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSecurity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<EndpointStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https: Option<EndpointStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateInfo>,
    /// Security header name → whether the HTTPS response carried it.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub security_headers: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_error: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// Outcome of the HEAD reachability check on one scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointStatus {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInfo {
    pub subject: String,
    pub issuer: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl CertificateInfo {
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at <= self.not_after
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebPerformance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses_caching: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses_compression: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// Classification of one sensitive path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "finding", rename_all = "camelCase")]
pub enum PathFinding {
    /// 401 or 403: the path exists behind credentials.
    AuthenticationRequired { status: u16 },
    /// Any other non-404 status.
    Accessible { status: u16 },
    /// The request itself failed.
    Error { message: String },
}

// ── Device ────────────────────────────────────────────────────────

/// Probe results for one host. `None` means the probe was not attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeSet {
    pub ssh: Option<SshInfo>,
    pub rdp: Option<RdpInfo>,
    pub snmp: Option<SnmpInfo>,
    pub web: Option<WebInfo>,
}

impl ProbeSet {
    pub fn with_ssh(mut self, info: SshInfo) -> Self {
        self.ssh = Some(info);
        self
    }

    pub fn with_rdp(mut self, info: RdpInfo) -> Self {
        self.rdp = Some(info);
        self
    }

    pub fn with_snmp(mut self, info: SnmpInfo) -> Self {
        self.snmp = Some(info);
        self
    }

    pub fn with_web(mut self, info: WebInfo) -> Self {
        self.web = Some(info);
        self
    }

    pub fn attempted(&self) -> usize {
        [
            self.ssh.is_some(),
            self.rdp.is_some(),
            self.snmp.is_some(),
            self.web.is_some(),
        ]
        .iter()
        .filter(|a| **a)
        .count()
    }
}

/// The canonical merged record for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub ip: Ipv4Addr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default)]
    pub open_ports: BTreeSet<u16>,
    #[serde(default)]
    pub services: BTreeMap<u16, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    /// Reserved for future scoring; never populated by the pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_info: Option<SshInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rdp_info: Option<RdpInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snmp_info: Option<SnmpInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_info: Option<WebInfo>,
}
