//! End-to-end pipeline tests with stub discovery and stub probes.
//!
//! No network access: discovery returns canned hosts and every probe
//! answers from memory.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use netscout_core::{DiscoveredHost, SnmpInfo, SshInfo, Target};
use netscout_discover::coordinator::{ProbeCoordinator, ProbeSuite};
use netscout_discover::error::{DiscoverError, Result};
use netscout_discover::pipeline::{Pipeline, PipelineOptions};
use netscout_discover::scanner::{Discovery, DiscoverySource};
use netscout_discover::targets::TargetStrategy;
use netscout_probes::Probe;

/// Canned discovery results keyed by target text. Unknown targets fail.
struct StubSource {
    results: HashMap<String, Vec<DiscoveredHost>>,
}

#[async_trait]
impl DiscoverySource for StubSource {
    async fn discover_hosts(&self, target: &Target) -> Result<Discovery> {
        match self.results.get(&target.to_string()) {
            Some(hosts) => Ok(Discovery {
                hosts: hosts.clone(),
                engine_info: Some("nmap 7.94".to_string()),
                skipped: 0,
            }),
            None => Err(DiscoverError::NmapTimeout(Duration::from_secs(900))),
        }
    }
}

/// An SSH probe for a host that refuses connections.
struct UnreachableSsh;

#[async_trait]
impl Probe for UnreachableSsh {
    type Output = SshInfo;

    fn name(&self) -> &'static str {
        "ssh"
    }

    fn deadline(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn probe(&self, ip: Ipv4Addr) -> SshInfo {
        SshInfo::failed(format!("Connection to {ip}:22 failed: Connection refused"))
    }

    fn failure(&self, error: String) -> SshInfo {
        SshInfo::failed(error)
    }
}

struct NamedSnmp;

#[async_trait]
impl Probe for NamedSnmp {
    type Output = SnmpInfo;

    fn name(&self) -> &'static str {
        "snmp"
    }

    fn deadline(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn probe(&self, ip: Ipv4Addr) -> SnmpInfo {
        let mut info = SnmpInfo::default();
        info.sys_name = Some(format!("device-{}", ip.octets()[3]));
        info
    }

    fn failure(&self, error: String) -> SnmpInfo {
        SnmpInfo::failed(error)
    }
}

fn ssh_host() -> DiscoveredHost {
    let mut host = DiscoveredHost::new(Ipv4Addr::new(10, 0, 0, 5));
    host.add_open_port(22, "ssh");
    host
}

fn options(dir: &std::path::Path) -> PipelineOptions {
    PipelineOptions {
        output_dir: dir.to_path_buf(),
        html_report: true,
        run_timeout: None,
        engine_info: None,
    }
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_unreachable_ssh_host_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let source = StubSource {
        results: HashMap::from([("10.0.0.0/24".to_string(), vec![ssh_host()])]),
    };
    let suite = ProbeSuite {
        ssh: Some(Arc::new(UnreachableSsh)),
        ..ProbeSuite::none()
    };
    let pipeline = Pipeline::new(
        Arc::new(source),
        ProbeCoordinator::new(suite, 1),
        options(dir.path()),
    );

    let strategy = TargetStrategy::Fixed(vec!["10.0.0.0/24".parse().unwrap()]);
    let summary = pipeline.run(&strategy).await;

    assert_eq!(summary.outcomes.len(), 1);
    let outcome = &summary.outcomes[0];
    assert!(outcome.discovery_error.is_none());
    assert_eq!(outcome.report.device_count(), 1);

    let device = &outcome.report.devices()[0];
    assert_eq!(device.ip, Ipv4Addr::new(10, 0, 0, 5));
    assert_eq!(device.open_ports.iter().copied().collect::<Vec<_>>(), vec![22]);
    assert_eq!(device.services[&22], "ssh");
    assert!(device.rdp_info.is_none());

    let json = read_json(&outcome.artifacts.as_ref().unwrap().json);
    let ssh = json["devices"][0]["sshInfo"].as_object().unwrap();
    assert_eq!(ssh.len(), 1);
    assert!(ssh["error"].as_str().unwrap().contains("Connection refused"));
    assert_eq!(json["devices"][0]["services"], json!({"22": "ssh"}));
    assert_eq!(json["scanEngineInfo"], "nmap 7.94");
    assert!(json["devices"][0].get("snmpInfo").is_none());
}

#[tokio::test]
async fn test_failed_target_does_not_stop_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut second = DiscoveredHost::new(Ipv4Addr::new(10, 1, 0, 9));
    second.add_open_port(161, "snmp");
    let source = StubSource {
        results: HashMap::from([("10.1.0.0/24".to_string(), vec![second])]),
    };
    let suite = ProbeSuite {
        snmp: Some(Arc::new(NamedSnmp)),
        ..ProbeSuite::none()
    };
    let mut opts = options(dir.path());
    opts.engine_info = Some("Nmap version 7.94".to_string());
    let pipeline = Pipeline::new(Arc::new(source), ProbeCoordinator::new(suite, 4), opts);

    let strategy = TargetStrategy::Fixed(vec![
        "10.9.0.0/24".parse().unwrap(),
        "10.1.0.0/24".parse().unwrap(),
    ]);
    let summary = pipeline.run(&strategy).await;

    assert_eq!(summary.outcomes.len(), 2);
    assert_eq!(summary.device_count(), 1);

    let failed = &summary.outcomes[0];
    assert!(failed.discovery_error.as_deref().unwrap().contains("did not finish"));
    assert_eq!(failed.report.device_count(), 0);
    let failed_json = read_json(&failed.artifacts.as_ref().unwrap().json);
    assert_eq!(failed_json["devices"], json!([]));
    assert_eq!(failed_json["scanEngineInfo"], "Nmap version 7.94");

    let ok = &summary.outcomes[1];
    assert_eq!(
        ok.report.devices()[0]
            .snmp_info
            .as_ref()
            .unwrap()
            .sys_name
            .as_deref(),
        Some("device-9")
    );
    let artifacts = ok.artifacts.as_ref().unwrap();
    assert!(artifacts.json.ends_with("scan_report_10.1.0.0_24_2.json"));
    let html = std::fs::read_to_string(artifacts.html.as_ref().unwrap()).unwrap();
    assert!(html.contains("device-9"));
}

#[tokio::test]
async fn test_no_probes_yields_discovery_only_devices() {
    let dir = tempfile::tempdir().unwrap();
    let source = StubSource {
        results: HashMap::from([("10.0.0.0/24".to_string(), vec![ssh_host()])]),
    };
    let pipeline = Pipeline::new(
        Arc::new(source),
        ProbeCoordinator::new(ProbeSuite::none(), 8),
        options(dir.path()),
    );

    let strategy = TargetStrategy::Fixed(vec!["10.0.0.0/24".parse().unwrap()]);
    let summary = pipeline.run(&strategy).await;

    let json = read_json(&summary.outcomes[0].artifacts.as_ref().unwrap().json);
    let device = json["devices"][0].as_object().unwrap();
    for key in ["sshInfo", "rdpInfo", "snmpInfo", "webInfo"] {
        assert!(!device.contains_key(key), "{key} should be absent");
    }
}

#[tokio::test]
async fn test_expired_run_deadline_skips_targets() {
    let dir = tempfile::tempdir().unwrap();
    let source = StubSource {
        results: HashMap::from([("10.0.0.0/24".to_string(), vec![ssh_host()])]),
    };
    let mut opts = options(dir.path());
    opts.run_timeout = Some(Duration::ZERO);
    let pipeline = Pipeline::new(
        Arc::new(source),
        ProbeCoordinator::new(ProbeSuite::none(), 1),
        opts,
    );

    let strategy = TargetStrategy::Fixed(vec!["10.0.0.0/24".parse().unwrap()]);
    let summary = pipeline.run(&strategy).await;

    assert!(summary.outcomes.is_empty());
    assert_eq!(summary.skipped_targets.len(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_discovery_timeout_yields_zero_devices() {
    use std::os::unix::fs::PermissionsExt;

    use netscout_discover::scanner::NmapScanner;

    let dir = tempfile::tempdir().unwrap();
    let nmap = dir.path().join("nmap");
    std::fs::write(&nmap, "#!/bin/sh\nexec sleep 30\n").unwrap();
    std::fs::set_permissions(&nmap, std::fs::Permissions::from_mode(0o755)).unwrap();

    let scanner = NmapScanner::new(nmap.to_str().unwrap(), Duration::from_millis(200));
    let pipeline = Pipeline::new(
        Arc::new(scanner),
        ProbeCoordinator::new(ProbeSuite::none(), 1),
        options(&dir.path().join("out")),
    );

    let target: Target = "10.0.0.0/24".parse().unwrap();
    let outcome = pipeline.scan_target(&target, None).await;

    assert_eq!(outcome.report.device_count(), 0);
    assert!(outcome.discovery_error.is_some());
}
