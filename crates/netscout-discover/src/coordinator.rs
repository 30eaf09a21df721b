//! Probe coordination.
//!
//! Every discovered host gets its own task, and inside that task the four
//! probes run concurrently, each in a task of its own under its own deadline.
//! A probe that times out or panics turns into that probe's error record; the
//! host's other probes are unaffected. At most `max_concurrent_hosts` host
//! tasks are in flight, and the coordinator is the only writer to the
//! aggregator.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::{JoinError, JoinSet};

use netscout_core::{Device, DiscoveredHost, ProbeSet, RdpInfo, SnmpInfo, SshInfo, WebInfo};
use netscout_probes::{
    Probe, ProbeError, RdpProbe, SnmpProbe, SshCredentials, SshProbe, WebProbe,
};

use crate::config::ProbeConfig;
use crate::normalize::{merge, Aggregator};

pub type SharedProbe<T> = Arc<dyn Probe<Output = T>>;

/// The probes run against every host. `None` means the probe is disabled
/// and its slot on the device stays empty.
#[derive(Clone, Default)]
pub struct ProbeSuite {
    pub ssh: Option<SharedProbe<SshInfo>>,
    pub rdp: Option<SharedProbe<RdpInfo>>,
    pub snmp: Option<SharedProbe<SnmpInfo>>,
    pub web: Option<SharedProbe<WebInfo>>,
}

impl ProbeSuite {
    /// A suite with every probe disabled.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build the enabled probes. A probe that cannot be constructed is left
    /// out with a warning and the others still run.
    pub fn from_config(config: &ProbeConfig) -> Self {
        let mut suite = Self::none();

        if config.ssh_enabled {
            let credentials = SshCredentials {
                username: config.ssh_username.clone(),
                password: config.ssh_password.clone(),
            };
            suite.ssh = Some(Arc::new(SshProbe::new(
                credentials,
                Duration::from_secs(config.ssh_timeout_secs),
            )));
        }
        if config.rdp_enabled {
            suite.rdp = Some(Arc::new(RdpProbe::new(Duration::from_secs(
                config.rdp_timeout_secs,
            ))));
        }
        if config.snmp_enabled {
            suite.snmp = Some(Arc::new(SnmpProbe::new(
                &config.snmp_community,
                Duration::from_millis(config.snmp_timeout_ms),
            )));
        }
        if config.web_enabled {
            suite.web = web_probe(WebProbe::new(Duration::from_secs(config.web_timeout_secs)));
        }

        suite
    }

    /// Names of the enabled probes, for logging.
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            self.ssh.as_ref().map(|p| p.name()),
            self.rdp.as_ref().map(|p| p.name()),
            self.snmp.as_ref().map(|p| p.name()),
            self.web.as_ref().map(|p| p.name()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Run every enabled probe against `ip` concurrently.
    pub async fn enrich(&self, ip: Ipv4Addr) -> ProbeSet {
        let (ssh, rdp, snmp, web) = tokio::join!(
            run_enabled(self.ssh.clone(), ip),
            run_enabled(self.rdp.clone(), ip),
            run_enabled(self.snmp.clone(), ip),
            run_enabled(self.web.clone(), ip),
        );
        ProbeSet {
            ssh,
            rdp,
            snmp,
            web,
        }
    }
}

fn web_probe(built: std::result::Result<WebProbe, ProbeError>) -> Option<SharedProbe<WebInfo>> {
    match built {
        Ok(web) => Some(Arc::new(web)),
        Err(e) => {
            tracing::warn!(error = %e, "Web probe unavailable, continuing without it");
            None
        }
    }
}

async fn run_enabled<T: Send + 'static>(probe: Option<SharedProbe<T>>, ip: Ipv4Addr) -> Option<T> {
    match probe {
        Some(probe) => Some(run_probe(probe, ip).await),
        None => None,
    }
}

/// Run one probe in its own task under the probe's deadline.
pub async fn run_probe<T: Send + 'static>(probe: SharedProbe<T>, ip: Ipv4Addr) -> T {
    let name = probe.name();
    let deadline = probe.deadline();
    let start = Instant::now();

    let task = {
        let probe = Arc::clone(&probe);
        tokio::spawn(async move { probe.probe(ip).await })
    };
    let abort = task.abort_handle();

    match tokio::time::timeout(deadline, task).await {
        Ok(Ok(output)) => {
            tracing::debug!(
                probe = name,
                ip = %ip,
                duration_ms = start.elapsed().as_millis(),
                "Probe finished"
            );
            output
        }
        Ok(Err(e)) => {
            tracing::error!(probe = name, ip = %ip, error = %e, "Probe task failed");
            probe.failure(format!("{name} probe failed: {e}"))
        }
        Err(_) => {
            abort.abort();
            tracing::warn!(
                probe = name,
                ip = %ip,
                deadline_ms = deadline.as_millis(),
                "Probe exceeded its deadline"
            );
            probe.failure(format!(
                "{name} probe timed out after {}ms",
                deadline.as_millis()
            ))
        }
    }
}

/// Counters for one enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    pub dispatched: usize,
    pub appended: usize,
    /// Hosts never dispatched because the run deadline passed.
    pub not_dispatched: usize,
    pub failed_tasks: usize,
}

/// Fans discovered hosts out to the probe suite with bounded parallelism.
pub struct ProbeCoordinator {
    suite: Arc<ProbeSuite>,
    max_concurrent_hosts: usize,
}

impl ProbeCoordinator {
    pub fn new(suite: ProbeSuite, max_concurrent_hosts: usize) -> Self {
        Self {
            suite: Arc::new(suite),
            max_concurrent_hosts: max_concurrent_hosts.max(1),
        }
    }

    pub fn suite(&self) -> &ProbeSuite {
        &self.suite
    }

    /// Enrich `hosts` and append each finished device to `aggregator`.
    ///
    /// With one host in flight, devices are appended in discovery order.
    /// Once `run_deadline` has passed no further hosts are dispatched; hosts
    /// already running are still collected.
    pub async fn enrich_all(
        &self,
        hosts: Vec<DiscoveredHost>,
        aggregator: &mut Aggregator,
        run_deadline: Option<Instant>,
    ) -> EnrichStats {
        let total = hosts.len();
        let mut stats = EnrichStats::default();
        let mut tasks = JoinSet::new();

        for host in hosts {
            while tasks.len() >= self.max_concurrent_hosts {
                match tasks.join_next().await {
                    Some(joined) => collect(joined, aggregator, &mut stats),
                    None => break,
                }
            }

            if run_deadline.is_some_and(|d| Instant::now() >= d) {
                stats.not_dispatched = total - stats.dispatched;
                tracing::warn!(
                    remaining = stats.not_dispatched,
                    "Run deadline reached, no further hosts dispatched"
                );
                break;
            }

            let suite = Arc::clone(&self.suite);
            tasks.spawn(async move {
                let ip = host.ip;
                let probes = suite.enrich(ip).await;
                tracing::debug!(ip = %ip, attempted = probes.attempted(), "Host enriched");
                merge(host, probes)
            });
            stats.dispatched += 1;
        }

        while let Some(joined) = tasks.join_next().await {
            collect(joined, aggregator, &mut stats);
        }

        tracing::info!(
            dispatched = stats.dispatched,
            appended = stats.appended,
            not_dispatched = stats.not_dispatched,
            failed_tasks = stats.failed_tasks,
            "Enrichment complete"
        );
        stats
    }
}

fn collect(
    joined: std::result::Result<Device, JoinError>,
    aggregator: &mut Aggregator,
    stats: &mut EnrichStats,
) {
    match joined {
        Ok(device) => {
            if aggregator.append(device) {
                stats.appended += 1;
            }
        }
        Err(e) => {
            stats.failed_tasks += 1;
            tracing::error!(error = %e, "Host enrichment task panicked");
        }
    }
}
