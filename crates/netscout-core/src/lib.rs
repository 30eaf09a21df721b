//! netscout-core: Shared types and error handling for the netscout pipeline.
//!
//! This crate provides the data model every other netscout crate speaks:
//! - Scan targets (CIDR networks or bare hosts)
//! - Hosts as reported by the discovery engine
//! - Typed per-protocol probe records (SSH, RDP, SNMP, Web)
//! - The canonical merged `Device` and the per-target `Report`

pub mod error;
pub mod report;
pub mod types;

pub use error::CoreError;
pub use report::Report;
pub use types::{
    Device, DiscoveredHost, ProbeSet, RdpInfo, SnmpInfo, SshInfo, Target, WebInfo,
};
