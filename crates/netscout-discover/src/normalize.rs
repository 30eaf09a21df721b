//! Merge discovery and probe output into canonical `Device` records.
//!
//! Each probe owns exactly one slot on the `Device`, so the merge does not
//! depend on the order in which probes finished.

use netscout_core::{Device, DiscoveredHost, ProbeSet, Report, Target};

/// Build the device record for one host once all of its probes completed.
pub fn merge(host: DiscoveredHost, probes: ProbeSet) -> Device {
    Device {
        ip: host.ip,
        hostname: host.hostname,
        open_ports: host.open_ports,
        services: host.services,
        mac: host.mac,
        manufacturer: host.manufacturer,
        os: host.os,
        risk_level: None,
        ssh_info: probes.ssh,
        rdp_info: probes.rdp,
        snmp_info: probes.snmp,
        web_info: probes.web,
    }
}

/// Build a report from devices already merged, keeping their order.
pub fn assemble(
    target: &Target,
    engine_info: Option<String>,
    devices: impl IntoIterator<Item = Device>,
) -> Report {
    let mut aggregator = Aggregator::new(target, engine_info);
    for device in devices {
        aggregator.append(device);
    }
    aggregator.finish()
}

/// Owns the report for one target run and is its only writer.
#[derive(Debug)]
pub struct Aggregator {
    report: Report,
}

impl Aggregator {
    pub fn new(target: &Target, engine_info: Option<String>) -> Self {
        Self {
            report: Report::new(target, engine_info),
        }
    }

    /// Append a finished device. A repeated address is logged and dropped;
    /// the first device for an address wins.
    pub fn append(&mut self, device: Device) -> bool {
        let ip = device.ip;
        match self.report.push_device(device) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(ip = %ip, target = %self.report.target(), error = %e, "Dropping duplicate device");
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.report.device_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn finish(self) -> Report {
        self.report
    }
}
