//! Nmap process wrapper.
//!
//! Executes nmap as a child process via `tokio::process::Command` with a
//! wall-clock deadline. stdout and stderr are drained by two spawned tasks
//! for the whole lifetime of the process so a chatty scan can never block
//! on a full pipe. A process that overruns its deadline is killed and its
//! output discarded.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use uuid::Uuid;

use netscout_core::{DiscoveredHost, Target};

use crate::error::{DiscoverError, Result};
use crate::nmap_xml;

/// Fixed nmap flags: TCP connect scan, version detection, OS detection, no ping.
pub const NMAP_FLAGS: [&str; 4] = ["-sT", "-sV", "-O", "-Pn"];

/// How long to wait for the drain tasks after the process is gone.
pub const DRAIN_GRACE: Duration = Duration::from_secs(5);

/// How the discovery process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Exited with status zero.
    Exited,
    /// Exited with a non-zero status (`-1` when killed by a signal).
    Failed { code: i32 },
    /// Overran its deadline and was killed.
    TimedOut,
    /// Could not be started at all.
    Unavailable { reason: String },
}

/// Everything captured from one discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryOutput {
    pub scan_id: Uuid,
    /// Raw XML from stdout. Empty on timeout.
    pub raw_report: String,
    /// stderr text. Empty on timeout.
    pub diagnostics: String,
    pub outcome: ProcessOutcome,
    pub duration: Duration,
}

impl DiscoveryOutput {
    pub fn succeeded(&self) -> bool {
        self.outcome == ProcessOutcome::Exited
    }
}

/// Hosts found on one target.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub hosts: Vec<DiscoveredHost>,
    pub engine_info: Option<String>,
    pub skipped: usize,
}

/// Anything that can list the live hosts behind a target.
#[async_trait]
pub trait DiscoverySource: Send + Sync {
    async fn discover_hosts(&self, target: &Target) -> Result<Discovery>;
}

/// Wrapper around the nmap binary.
pub struct NmapScanner {
    nmap_path: String,
    deadline: Duration,
}

impl NmapScanner {
    pub fn new(nmap_path: &str, deadline: Duration) -> Self {
        Self {
            nmap_path: nmap_path.to_string(),
            deadline,
        }
    }

    /// Verify nmap is installed and return the first line of `--version`.
    pub async fn verify_installation(&self) -> Result<String> {
        let output = Command::new(&self.nmap_path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| DiscoverError::NmapNotFound {
                path: self.nmap_path.clone(),
                reason: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    /// Run nmap against `target`, bounded by `deadline`.
    ///
    /// Never fails: process-level problems are reported through
    /// [`DiscoveryOutput::outcome`].
    pub async fn discover(&self, target: &str, deadline: Duration) -> DiscoveryOutput {
        let scan_id = Uuid::new_v4();
        let start = Instant::now();

        tracing::info!(
            scan_id = %scan_id,
            target = %target,
            deadline_secs = deadline.as_secs(),
            "Starting nmap scan"
        );

        let spawned = Command::new(&self.nmap_path)
            .args(NMAP_FLAGS)
            .arg("-oX")
            .arg("-")
            .arg("--noninteractive")
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(scan_id = %scan_id, path = %self.nmap_path, error = %e, "Failed to start nmap");
                return DiscoveryOutput {
                    scan_id,
                    raw_report: String::new(),
                    diagnostics: String::new(),
                    outcome: ProcessOutcome::Unavailable {
                        reason: e.to_string(),
                    },
                    duration: start.elapsed(),
                };
            }
        };

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let waited = tokio::time::timeout(deadline, child.wait()).await;
        let outcome = match waited {
            Ok(Ok(status)) if status.success() => ProcessOutcome::Exited,
            Ok(Ok(status)) => ProcessOutcome::Failed {
                code: status.code().unwrap_or(-1),
            },
            Ok(Err(e)) => ProcessOutcome::Unavailable {
                reason: e.to_string(),
            },
            Err(_) => {
                if let Err(e) = child.start_kill() {
                    tracing::warn!(scan_id = %scan_id, error = %e, "Failed to signal nmap");
                }
                if let Err(e) = child.wait().await {
                    tracing::warn!(scan_id = %scan_id, error = %e, "Failed to reap nmap");
                }
                ProcessOutcome::TimedOut
            }
        };

        let raw_report = collect(stdout).await;
        let diagnostics = collect(stderr).await;
        let duration = start.elapsed();

        let (raw_report, diagnostics) = if outcome == ProcessOutcome::TimedOut {
            tracing::warn!(
                scan_id = %scan_id,
                target = %target,
                duration_ms = duration.as_millis(),
                "Nmap scan exceeded its deadline and was killed"
            );
            (String::new(), String::new())
        } else {
            (raw_report, diagnostics)
        };

        tracing::info!(
            scan_id = %scan_id,
            target = %target,
            outcome = ?outcome,
            bytes = raw_report.len(),
            duration_ms = duration.as_millis(),
            "Nmap scan finished"
        );

        DiscoveryOutput {
            scan_id,
            raw_report,
            diagnostics,
            outcome,
            duration,
        }
    }
}

#[async_trait]
impl DiscoverySource for NmapScanner {
    async fn discover_hosts(&self, target: &Target) -> Result<Discovery> {
        let output = self.discover(&target.to_string(), self.deadline).await;

        match output.outcome {
            ProcessOutcome::Exited => {}
            ProcessOutcome::Failed { code } => {
                return Err(DiscoverError::NmapFailed {
                    code,
                    stderr: output.diagnostics.trim().to_string(),
                })
            }
            ProcessOutcome::TimedOut => return Err(DiscoverError::NmapTimeout(self.deadline)),
            ProcessOutcome::Unavailable { reason } => {
                return Err(DiscoverError::NmapNotFound {
                    path: self.nmap_path.clone(),
                    reason,
                })
            }
        }

        let parsed = nmap_xml::parse_discovery(output.raw_report.as_bytes())?;
        tracing::info!(
            scan_id = %output.scan_id,
            target = %target,
            hosts_up = parsed.hosts.len(),
            skipped = parsed.skipped,
            "Parsed nmap output"
        );

        Ok(Discovery {
            hosts: parsed.hosts,
            engine_info: parsed.scanner_version,
            skipped: parsed.skipped,
        })
    }
}

fn drain<R>(mut reader: R) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Err(e) = reader.read_to_end(&mut buf).await {
            tracing::debug!(error = %e, "Pipe read ended with error");
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Join a drain task, giving up after [`DRAIN_GRACE`].
async fn collect(handle: Option<JoinHandle<String>>) -> String {
    let Some(mut handle) = handle else {
        return String::new();
    };
    match tokio::time::timeout(DRAIN_GRACE, &mut handle).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Pipe drain task failed");
            String::new()
        }
        Err(_) => {
            handle.abort();
            tracing::warn!("Pipe drain did not finish within grace period");
            String::new()
        }
    }
}
