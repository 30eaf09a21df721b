//! Configuration for the netscout discovery pipeline.

use serde::Deserialize;

use netscout_core::Target;

use crate::error::{DiscoverError, Result};
use crate::targets::TargetStrategy;

/// Top-level discover configuration.
///
/// Loaded from the `netscout.toml` `[discover]` section or
/// `NETSCOUT_DISCOVER__` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverConfig {
    /// Path to the nmap binary (default: "nmap").
    #[serde(default = "default_nmap_path")]
    pub nmap_path: String,

    /// Explicit targets (CIDR or host). Empty means auto-detect local networks.
    #[serde(default)]
    pub targets: Vec<String>,

    /// Network scanned when auto-detection finds nothing.
    #[serde(default = "default_fallback_network")]
    pub fallback_network: String,

    /// Wall-clock limit for one nmap run.
    #[serde(default = "default_discovery_timeout")]
    pub discovery_timeout_secs: u64,

    /// Stop dispatching new hosts once the run has lasted this long.
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,

    /// Maximum hosts enriched at the same time.
    #[serde(default = "default_max_concurrent_hosts")]
    pub max_concurrent_hosts: usize,

    /// Directory receiving the JSON and HTML artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Also render an HTML report next to each JSON artifact.
    #[serde(default = "default_true")]
    pub html_report: bool,

    #[serde(default)]
    pub probes: ProbeConfig,
}

/// Per-probe switches, credentials, and timeouts.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_true")]
    pub ssh_enabled: bool,
    #[serde(default = "default_true")]
    pub rdp_enabled: bool,
    #[serde(default = "default_true")]
    pub snmp_enabled: bool,
    #[serde(default = "default_true")]
    pub web_enabled: bool,

    #[serde(default = "default_ssh_username")]
    pub ssh_username: String,
    #[serde(default = "default_ssh_password")]
    pub ssh_password: String,
    #[serde(default = "default_snmp_community")]
    pub snmp_community: String,

    /// Connect and per-command timeout for SSH.
    #[serde(default = "default_ssh_timeout")]
    pub ssh_timeout_secs: u64,
    #[serde(default = "default_rdp_timeout")]
    pub rdp_timeout_secs: u64,
    /// Timeout for each SNMP GET.
    #[serde(default = "default_snmp_timeout_ms")]
    pub snmp_timeout_ms: u64,
    /// Timeout for each HTTP request.
    #[serde(default = "default_web_timeout")]
    pub web_timeout_secs: u64,
}

impl ProbeConfig {
    pub fn disable_all(&mut self) {
        self.ssh_enabled = false;
        self.rdp_enabled = false;
        self.snmp_enabled = false;
        self.web_enabled = false;
    }

    pub fn any_enabled(&self) -> bool {
        self.ssh_enabled || self.rdp_enabled || self.snmp_enabled || self.web_enabled
    }
}

fn default_nmap_path() -> String {
    "nmap".to_string()
}

fn default_fallback_network() -> String {
    "192.168.1.0/24".to_string()
}

fn default_discovery_timeout() -> u64 {
    900
}

fn default_max_concurrent_hosts() -> usize {
    8
}

fn default_output_dir() -> String {
    "./reports".to_string()
}

fn default_ssh_username() -> String {
    "admin".to_string()
}

fn default_ssh_password() -> String {
    "admin".to_string()
}

fn default_snmp_community() -> String {
    "public".to_string()
}

fn default_ssh_timeout() -> u64 {
    10
}

fn default_rdp_timeout() -> u64 {
    3
}

fn default_snmp_timeout_ms() -> u64 {
    1000
}

fn default_web_timeout() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            nmap_path: default_nmap_path(),
            targets: Vec::new(),
            fallback_network: default_fallback_network(),
            discovery_timeout_secs: default_discovery_timeout(),
            run_timeout_secs: None,
            max_concurrent_hosts: default_max_concurrent_hosts(),
            output_dir: default_output_dir(),
            html_report: true,
            probes: ProbeConfig::default(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ssh_enabled: true,
            rdp_enabled: true,
            snmp_enabled: true,
            web_enabled: true,
            ssh_username: default_ssh_username(),
            ssh_password: default_ssh_password(),
            snmp_community: default_snmp_community(),
            ssh_timeout_secs: default_ssh_timeout(),
            rdp_timeout_secs: default_rdp_timeout(),
            snmp_timeout_ms: default_snmp_timeout_ms(),
            web_timeout_secs: default_web_timeout(),
        }
    }
}

impl DiscoverConfig {
    /// Load `<file_prefix>.toml` (optional) layered under `NETSCOUT_DISCOVER__*`
    /// environment variables. A missing `[discover]` section yields defaults.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("NETSCOUT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| DiscoverError::Config(e.to_string()))?;

        match cfg.get::<DiscoverConfig>("discover") {
            Ok(c) => Ok(c),
            Err(config::ConfigError::NotFound(_)) => Ok(DiscoverConfig::default()),
            Err(e) => {
                tracing::warn!(error = %e, "Invalid [discover] section, using defaults");
                Ok(DiscoverConfig::default())
            }
        }
    }

    /// Fixed targets when any are configured, otherwise local auto-detection.
    pub fn target_strategy(&self) -> Result<TargetStrategy> {
        if self.targets.is_empty() {
            let fallback: Target = self.fallback_network.parse()?;
            return Ok(TargetStrategy::AutoDetect { fallback });
        }

        let targets = self
            .targets
            .iter()
            .map(|t| t.parse::<Target>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(TargetStrategy::Fixed(targets))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiscoverConfig::default();
        assert_eq!(config.nmap_path, "nmap");
        assert!(config.targets.is_empty());
        assert_eq!(config.fallback_network, "192.168.1.0/24");
        assert_eq!(config.discovery_timeout_secs, 900);
        assert_eq!(config.run_timeout_secs, None);
        assert_eq!(config.max_concurrent_hosts, 8);
        assert!(config.html_report);

        let probes = &config.probes;
        assert!(probes.any_enabled());
        assert_eq!(probes.snmp_community, "public");
        assert_eq!(probes.ssh_timeout_secs, 10);
        assert_eq!(probes.rdp_timeout_secs, 3);
        assert_eq!(probes.snmp_timeout_ms, 1000);
        assert_eq!(probes.web_timeout_secs, 5);
    }

    #[test]
    fn test_disable_all_probes() {
        let mut probes = ProbeConfig::default();
        probes.disable_all();
        assert!(!probes.any_enabled());
    }

    #[test]
    fn test_empty_targets_auto_detect() {
        let strategy = DiscoverConfig::default().target_strategy().unwrap();
        match strategy {
            TargetStrategy::AutoDetect { fallback } => {
                assert_eq!(fallback.to_string(), "192.168.1.0/24");
            }
            other => panic!("expected auto-detect, got {other:?}"),
        }
    }

    #[test]
    fn test_explicit_targets_are_fixed() {
        let config = DiscoverConfig {
            targets: vec!["10.0.0.0/24".to_string(), "printer.lan".to_string()],
            ..Default::default()
        };
        match config.target_strategy().unwrap() {
            TargetStrategy::Fixed(targets) => {
                assert_eq!(targets.len(), 2);
                assert_eq!(targets[1], Target::Host("printer.lan".to_string()));
            }
            other => panic!("expected fixed targets, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_target_rejected() {
        let config = DiscoverConfig {
            targets: vec!["10.0.0.0/40".to_string()],
            ..Default::default()
        };
        assert!(config.target_strategy().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netscout.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"[discover]
targets = ["10.1.0.0/16"]
max_concurrent_hosts = 2
html_report = false

[discover.probes]
snmp_enabled = false
snmp_community = "monitoring"
"#
        )
        .unwrap();

        let prefix = dir.path().join("netscout");
        let config = DiscoverConfig::load(prefix.to_str().unwrap()).unwrap();

        assert_eq!(config.targets, vec!["10.1.0.0/16".to_string()]);
        assert_eq!(config.max_concurrent_hosts, 2);
        assert!(!config.html_report);
        assert!(!config.probes.snmp_enabled);
        assert!(config.probes.ssh_enabled);
        assert_eq!(config.probes.snmp_community, "monitoring");
        assert_eq!(config.nmap_path, "nmap");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent");
        let config = DiscoverConfig::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(config.max_concurrent_hosts, 8);
    }
}
