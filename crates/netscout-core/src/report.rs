//! The per-target inventory report.
//!
//! A `Report` is created once per scanned target. Its timestamp and target are
//! fixed at construction; devices are appended one at a time, fully formed,
//! and an address can appear only once.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::types::{Device, Target};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    scan_timestamp: i64,
    scanned_network_target: String,
    scan_engine_info: Option<String>,
    devices: Vec<Device>,
    #[serde(skip)]
    seen: HashSet<Ipv4Addr>,
}

impl Report {
    pub fn new(target: &Target, scan_engine_info: Option<String>) -> Self {
        Self::at(target, scan_engine_info, Utc::now())
    }

    /// Build a report stamped with an explicit creation time.
    pub fn at(target: &Target, scan_engine_info: Option<String>, created: DateTime<Utc>) -> Self {
        Self {
            scan_timestamp: created.timestamp_millis(),
            scanned_network_target: target.to_string(),
            scan_engine_info,
            devices: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Append a completed device. Fails if the address is already present.
    pub fn push_device(&mut self, device: Device) -> Result<()> {
        if !self.seen.insert(device.ip) {
            return Err(CoreError::DuplicateDevice(device.ip));
        }
        self.devices.push(device);
        Ok(())
    }

    /// Creation time in milliseconds since the Unix epoch.
    pub fn scan_timestamp(&self) -> i64 {
        self.scan_timestamp
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.scan_timestamp)
    }

    pub fn target(&self) -> &str {
        &self.scanned_network_target
    }

    pub fn scan_engine_info(&self) -> Option<&str> {
        self.scan_engine_info.as_deref()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn device(&self, ip: Ipv4Addr) -> Option<&Device> {
        self.devices.iter().find(|d| d.ip == ip)
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
