//! End-to-end scan pipeline.
//!
//! Targets are scanned one after another: discover → enrich → aggregate →
//! export. A failure on one target degrades that target to an empty report
//! and the run moves on to the next.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use netscout_core::{Report, Target};

use crate::coordinator::{EnrichStats, ProbeCoordinator};
use crate::export::{self, ExportedArtifacts};
use crate::normalize::Aggregator;
use crate::scanner::DiscoverySource;
use crate::targets::TargetStrategy;

/// Run-wide settings.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub output_dir: PathBuf,
    pub html_report: bool,
    /// Stop dispatching hosts and targets once the run has lasted this long.
    pub run_timeout: Option<Duration>,
    /// Engine description used when the discovery output carries none.
    pub engine_info: Option<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./reports"),
            html_report: true,
            run_timeout: None,
            engine_info: None,
        }
    }
}

/// What happened to one target.
#[derive(Debug)]
pub struct TargetOutcome {
    pub report: Report,
    pub enrich: EnrichStats,
    /// Set when discovery failed and the report is empty because of it.
    pub discovery_error: Option<String>,
    pub artifacts: Option<ExportedArtifacts>,
}

impl TargetOutcome {
    pub fn open_port_count(&self) -> usize {
        self.report.devices().iter().map(|d| d.open_ports.len()).sum()
    }

    pub fn service_count(&self) -> usize {
        self.report.devices().iter().map(|d| d.services.len()).sum()
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub outcomes: Vec<TargetOutcome>,
    /// Targets never started because the run deadline passed.
    pub skipped_targets: Vec<Target>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn device_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.report.device_count()).sum()
    }
}

pub struct Pipeline {
    source: Arc<dyn DiscoverySource>,
    coordinator: ProbeCoordinator,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn DiscoverySource>,
        coordinator: ProbeCoordinator,
        options: PipelineOptions,
    ) -> Self {
        Self {
            source,
            coordinator,
            options,
        }
    }

    /// Resolve targets from `strategy` and scan each of them in order.
    pub async fn run(&self, strategy: &TargetStrategy) -> RunSummary {
        let run_id = Uuid::new_v4();
        let start = Instant::now();
        let run_deadline = self.options.run_timeout.map(|t| start + t);
        let targets = strategy.resolve();

        tracing::info!(
            run_id = %run_id,
            targets = targets.len(),
            probes = ?self.coordinator.suite().enabled(),
            "Scan run started"
        );

        let mut outcomes = Vec::with_capacity(targets.len());
        let mut skipped_targets = Vec::new();

        for (i, target) in targets.into_iter().enumerate() {
            if run_deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::warn!(run_id = %run_id, target = %target, "Run deadline reached, target not scanned");
                skipped_targets.push(target);
                continue;
            }

            let mut outcome = self.scan_target(&target, run_deadline).await;
            match export::export_report(
                &outcome.report,
                &self.options.output_dir,
                i + 1,
                self.options.html_report,
            ) {
                Ok(artifacts) => outcome.artifacts = Some(artifacts),
                Err(e) => {
                    tracing::error!(run_id = %run_id, target = %target, error = %e, "Export failed")
                }
            }

            tracing::info!(
                run_id = %run_id,
                target = %target,
                devices = outcome.report.device_count(),
                open_ports = outcome.open_port_count(),
                services = outcome.service_count(),
                "Target complete"
            );
            outcomes.push(outcome);
        }

        let summary = RunSummary {
            run_id,
            outcomes,
            skipped_targets,
            duration: start.elapsed(),
        };
        tracing::info!(
            run_id = %run_id,
            targets = summary.outcomes.len(),
            skipped = summary.skipped_targets.len(),
            devices = summary.device_count(),
            duration_ms = summary.duration.as_millis(),
            "Scan run complete"
        );
        summary
    }

    /// Discover and enrich one target. Never fails; a discovery error yields
    /// an empty report.
    pub async fn scan_target(&self, target: &Target, run_deadline: Option<Instant>) -> TargetOutcome {
        let discovery = match self.source.discover_hosts(target).await {
            Ok(discovery) => discovery,
            Err(e) => {
                tracing::warn!(target = %target, error = %e, "Discovery failed, reporting no hosts");
                let report = Aggregator::new(target, self.options.engine_info.clone()).finish();
                return TargetOutcome {
                    report,
                    enrich: EnrichStats::default(),
                    discovery_error: Some(e.to_string()),
                    artifacts: None,
                };
            }
        };

        let engine_info = discovery
            .engine_info
            .or_else(|| self.options.engine_info.clone());
        let mut aggregator = Aggregator::new(target, engine_info);
        let enrich = self
            .coordinator
            .enrich_all(discovery.hosts, &mut aggregator, run_deadline)
            .await;

        TargetOutcome {
            report: aggregator.finish(),
            enrich,
            discovery_error: None,
            artifacts: None,
        }
    }
}
