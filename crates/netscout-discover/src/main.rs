//! CLI entry point for the netscout network inventory scanner.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use netscout_discover::config::DiscoverConfig;
use netscout_discover::coordinator::{ProbeCoordinator, ProbeSuite};
use netscout_discover::pipeline::{Pipeline, PipelineOptions};
use netscout_discover::scanner::NmapScanner;

#[derive(Parser)]
#[command(name = "netscout")]
#[command(about = "Discover hosts with nmap, probe them, and export an inventory report")]
struct Cli {
    /// Target to scan (CIDR such as 10.0.1.0/24, or a host). Repeatable;
    /// overrides the configured targets. Without any, local networks are detected.
    #[arg(short, long)]
    target: Vec<String>,

    /// Config file prefix (default: netscout).
    #[arg(short, long, default_value = "netscout")]
    config: String,

    /// Directory for report artifacts (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip SSH, RDP, SNMP, and web probes; report discovery results only.
    #[arg(long)]
    no_probes: bool,

    /// Write only the JSON artifact.
    #[arg(long)]
    no_html: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,

    /// Maximum hosts probed at the same time (overrides config).
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.json_logs {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let mut config = DiscoverConfig::load(&cli.config)?;
    apply_overrides(&cli, &mut config);

    let strategy = config.target_strategy()?;

    // Verify nmap installation. A missing binary degrades every target to zero hosts.
    let scanner = NmapScanner::new(
        &config.nmap_path,
        Duration::from_secs(config.discovery_timeout_secs),
    );
    let engine_info = match scanner.verify_installation().await {
        Ok(version) => {
            tracing::info!(nmap_version = %version, "Nmap verified");
            Some(version).filter(|v| !v.is_empty())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Nmap unavailable, targets will report no hosts");
            None
        }
    };

    let suite = ProbeSuite::from_config(&config.probes);
    let coordinator = ProbeCoordinator::new(suite, config.max_concurrent_hosts);
    let options = PipelineOptions {
        output_dir: PathBuf::from(&config.output_dir),
        html_report: config.html_report,
        run_timeout: config.run_timeout_secs.map(Duration::from_secs),
        engine_info,
    };

    let pipeline = Pipeline::new(Arc::new(scanner), coordinator, options);
    let summary = pipeline.run(&strategy).await;

    for outcome in &summary.outcomes {
        if let Some(artifacts) = &outcome.artifacts {
            println!(
                "{}: {} devices, {} open ports -> {}",
                outcome.report.target(),
                outcome.report.device_count(),
                outcome.open_port_count(),
                artifacts.json.display()
            );
        }
    }

    Ok(())
}

fn apply_overrides(cli: &Cli, config: &mut DiscoverConfig) {
    if !cli.target.is_empty() {
        config.targets = cli.target.clone();
    }
    if let Some(output) = &cli.output {
        config.output_dir = output.display().to_string();
    }
    if cli.no_probes {
        config.probes.disable_all();
    }
    if cli.no_html {
        config.html_report = false;
    }
    if let Some(concurrency) = cli.concurrency {
        config.max_concurrent_hosts = concurrency;
    }
}
