//! Scan target resolution.
//!
//! Turns local interface state into the list of networks to scan. The
//! computation runs over plain `InterfaceSnapshot` values so it can be
//! exercised without touching the host's real interfaces.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::IpNetwork;

use netscout_core::Target;

/// Interface name prefixes for container bridges, hypervisor links, and VPN tunnels.
pub const VIRTUAL_PREFIXES: [&str; 12] = [
    "docker", "veth", "br-", "virbr", "vmnet", "vboxnet", "tun", "tap", "utun", "zt",
    "tailscale", "wg",
];

/// The subset of interface state target resolution depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSnapshot {
    pub name: String,
    pub is_up: bool,
    pub is_loopback: bool,
    pub is_point_to_point: bool,
    /// IPv4 addresses with their prefix lengths.
    pub ipv4: Vec<(Ipv4Addr, u8)>,
}

impl InterfaceSnapshot {
    pub fn is_virtual(&self) -> bool {
        self.is_point_to_point || VIRTUAL_PREFIXES.iter().any(|p| self.name.starts_with(p))
    }

    /// Up, not loopback, not virtual.
    pub fn is_candidate(&self) -> bool {
        self.is_up && !self.is_loopback && !self.is_virtual()
    }
}

impl From<&NetworkInterface> for InterfaceSnapshot {
    fn from(iface: &NetworkInterface) -> Self {
        let ipv4 = iface
            .ips
            .iter()
            .filter_map(|net| match net {
                IpNetwork::V4(v4) => Some((v4.ip(), v4.prefix())),
                IpNetwork::V6(_) => None,
            })
            .collect();

        Self {
            name: iface.name.clone(),
            is_up: iface.is_up(),
            is_loopback: iface.is_loopback(),
            is_point_to_point: iface.is_point_to_point(),
            ipv4,
        }
    }
}

/// How the pipeline obtains its targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetStrategy {
    /// Scan exactly these targets, in order.
    Fixed(Vec<Target>),
    /// Scan the networks attached to local interfaces, or `fallback` if none.
    AutoDetect { fallback: Target },
}

impl TargetStrategy {
    pub fn resolve(&self) -> Vec<Target> {
        match self {
            TargetStrategy::Fixed(targets) => targets.clone(),
            TargetStrategy::AutoDetect { fallback } => detect_local_networks(fallback),
        }
    }
}

/// Network address of `ip` under a `/prefix` mask. `None` unless 1 ≤ prefix ≤ 32.
pub fn network_address(ip: Ipv4Addr, prefix: u8) -> Option<Ipv4Addr> {
    if !(1..=32).contains(&prefix) {
        return None;
    }
    let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
    Some(Ipv4Addr::from(u32::from(ip) & mask))
}

/// Networks attached to candidate interfaces, deduplicated in first-seen order.
pub fn local_networks(snapshots: &[InterfaceSnapshot]) -> Vec<Target> {
    let mut seen = HashSet::new();
    let mut targets = Vec::new();

    for iface in snapshots.iter().filter(|i| i.is_candidate()) {
        for &(ip, prefix) in &iface.ipv4 {
            let Some(network) = network_address(ip, prefix) else {
                tracing::debug!(interface = %iface.name, ip = %ip, prefix, "Ignoring address with unusable prefix");
                continue;
            };
            let Ok(net) = Ipv4Net::new(network, prefix) else {
                continue;
            };
            if seen.insert(net) {
                targets.push(Target::Network(net));
            }
        }
    }

    targets
}

/// Local networks, or `fallback` alone when none were found.
pub fn resolve_targets(snapshots: &[InterfaceSnapshot], fallback: &Target) -> Vec<Target> {
    let targets = local_networks(snapshots);
    if targets.is_empty() {
        tracing::warn!(fallback = %fallback, "No local networks detected, using fallback");
        return vec![fallback.clone()];
    }
    targets
}

/// Inspect the host's interfaces and resolve scan targets from them.
pub fn detect_local_networks(fallback: &Target) -> Vec<Target> {
    let snapshots: Vec<InterfaceSnapshot> = datalink::interfaces()
        .iter()
        .map(InterfaceSnapshot::from)
        .collect();

    let targets = resolve_targets(&snapshots, fallback);
    tracing::info!(
        interfaces = snapshots.len(),
        targets = targets.len(),
        "Resolved local scan targets"
    );
    targets
}
