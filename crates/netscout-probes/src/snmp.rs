//! SNMP v2c system-group probe.
//!
//! Queries each standard system OID on its own with a read-only community.
//! A partial answer (some OIDs resolved, others not) is a normal result.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use snmp2::{Oid, SyncSession, Value};

use netscout_core::types::{SnmpField, SnmpInfo};

use crate::error::{ProbeError, Result};
use crate::Probe;

pub const SNMP_PORT: u16 = 161;

/// MIB-II system group, `1.3.6.1.2.1.1.x.0`.
pub const SYSTEM_OIDS: [(SnmpField, &[u64]); 5] = [
    (SnmpField::SysDescr, &[1, 3, 6, 1, 2, 1, 1, 1, 0]),
    (SnmpField::SysUpTime, &[1, 3, 6, 1, 2, 1, 1, 3, 0]),
    (SnmpField::SysContact, &[1, 3, 6, 1, 2, 1, 1, 4, 0]),
    (SnmpField::SysName, &[1, 3, 6, 1, 2, 1, 1, 5, 0]),
    (SnmpField::SysLocation, &[1, 3, 6, 1, 2, 1, 1, 6, 0]),
];

pub struct SnmpProbe {
    community: String,
    port: u16,
    timeout: Duration,
}

impl SnmpProbe {
    /// `timeout` applies to each individual GET.
    pub fn new(community: &str, timeout: Duration) -> Self {
        Self {
            community: community.to_string(),
            port: SNMP_PORT,
            timeout,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

#[async_trait]
impl Probe for SnmpProbe {
    type Output = SnmpInfo;

    fn name(&self) -> &'static str {
        "snmp"
    }

    fn deadline(&self) -> Duration {
        self.timeout * (SYSTEM_OIDS.len() as u32 + 1)
    }

    async fn probe(&self, ip: Ipv4Addr) -> SnmpInfo {
        let addr = SocketAddr::from((ip, self.port));
        let community = self.community.clone();
        let timeout = self.timeout;

        match tokio::task::spawn_blocking(move || {
            query_system_group(addr, community.as_bytes(), timeout)
        })
        .await
        {
            Ok(info) => {
                tracing::debug!(
                    ip = %ip,
                    answered = info.answered(),
                    failed = info.errors.len(),
                    "SNMP query complete"
                );
                info
            }
            Err(e) => SnmpInfo::failed(ProbeError::from(e).to_string()),
        }
    }

    fn failure(&self, error: String) -> SnmpInfo {
        SnmpInfo::failed(error)
    }
}

/// Query every system OID over one session, recording each outcome separately.
pub fn query_system_group(addr: SocketAddr, community: &[u8], timeout: Duration) -> SnmpInfo {
    let mut session = match SyncSession::new_v2c(addr, community, Some(timeout), 0) {
        Ok(session) => session,
        Err(e) => return SnmpInfo::failed(format!("Could not open SNMP session: {e}")),
    };

    let mut info = SnmpInfo::default();
    for (field, arcs) in SYSTEM_OIDS {
        match get_value(&mut session, arcs) {
            Ok(value) => info.set(field, value),
            Err(e) => info.record_error(field, e.to_string()),
        }
    }
    info
}

fn get_value(session: &mut SyncSession, arcs: &[u64]) -> Result<String> {
    let oid = Oid::from(arcs).map_err(|e| ProbeError::Snmp(format!("invalid OID: {e:?}")))?;
    let mut response = session
        .get(&oid)
        .map_err(|e| ProbeError::Snmp(format!("{e:?}")))?;

    let (_, value) = response
        .varbinds
        .next()
        .ok_or_else(|| ProbeError::Snmp("empty response".to_string()))?;
    render_value(&value)
}

fn render_value(value: &Value) -> Result<String> {
    match value {
        Value::OctetString(bytes) => Ok(String::from_utf8_lossy(bytes).trim().to_string()),
        Value::Integer(n) => Ok(n.to_string()),
        Value::Counter32(n) | Value::Unsigned32(n) => Ok(n.to_string()),
        Value::Counter64(n) => Ok(n.to_string()),
        Value::Timeticks(ticks) => Ok(format_timeticks(*ticks)),
        Value::IpAddress(octets) => Ok(Ipv4Addr::from(*octets).to_string()),
        Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => {
            Err(ProbeError::Snmp("no such object".to_string()))
        }
        other => Ok(format!("{other:?}")),
    }
}

/// Render hundredths of a second as `Nd HH:MM:SS.cc`.
pub fn format_timeticks(ticks: u32) -> String {
    let centis = ticks % 100;
    let total_secs = ticks / 100;
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;
    format!("{days}d {hours:02}:{minutes:02}:{seconds:02}.{centis:02}")
}
