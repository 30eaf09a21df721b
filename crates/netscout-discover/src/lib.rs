//! netscout-discover: Network discovery and inventory for netscout.
//!
//! Runs nmap against each target, enriches every live host with the
//! protocol probes from `netscout-probes`, merges the results into one
//! `Device` per address, and exports a JSON (and optionally HTML) report
//! per target.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod export;
pub mod nmap_xml;
pub mod normalize;
pub mod pipeline;
pub mod scanner;
pub mod targets;
