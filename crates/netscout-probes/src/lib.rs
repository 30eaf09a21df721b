//! netscout-probes: Enrichment probes run against every discovered host.
//!
//! Each probe speaks one protocol through an existing client library and
//! reports a typed record from `netscout-core`. Probes never return errors:
//! a failure is recorded inside the probe's own result so that one probe
//! cannot stop the others.

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;

pub mod error;
pub mod rdp;
pub mod snmp;
pub mod ssh;
pub mod web;

pub use error::ProbeError;
pub use rdp::RdpProbe;
pub use snmp::SnmpProbe;
pub use ssh::{SshCredentials, SshProbe};
pub use web::WebProbe;

/// A single enrichment probe.
#[async_trait]
pub trait Probe: Send + Sync {
    /// The record this probe produces, attempted-and-failed included.
    type Output: Send + 'static;

    /// Short protocol name used in logs.
    fn name(&self) -> &'static str;

    /// Wall-clock budget for probing one host, covering every request made.
    fn deadline(&self) -> Duration;

    /// Probe one host. Never fails; failures are part of the output.
    async fn probe(&self, ip: Ipv4Addr) -> Self::Output;

    /// The record to report when the probe did not finish within its deadline.
    fn failure(&self, error: String) -> Self::Output;
}
