//! Cluster-behavior simulator.
//!
//! Runs a scripted scenario of node-health events under fixed-rate
//! synthetic traffic, dispatching every request through both the
//! gradient and the traditional router, and exposes the recorded
//! outcomes as Prometheus metrics.

#![forbid(unsafe_code)]

mod http_api;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use gradsim_core::{Scenario, ScenarioRunner};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "gradsim")]
#[command(
    author,
    version,
    about = "Cluster-behavior simulator comparing gradient and traditional request routing"
)]
struct Cli {
    /// Path to the scenario file (TOML)
    scenario: PathBuf,

    /// Port for the metrics/health HTTP endpoint
    #[arg(long, default_value = "9090")]
    metrics_port: u16,

    /// Master seed for the simulation's random draws (0 = derive from entropy)
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Do not serve the metrics HTTP endpoint
    #[arg(long)]
    no_metrics_server: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // An invalid scenario aborts here; the run never starts with one.
    let scenario = Scenario::load(&cli.scenario)
        .with_context(|| format!("failed to load scenario {}", cli.scenario.display()))?;
    info!(
        "Loaded scenario `{}`: {} nodes, {} events",
        scenario.name,
        scenario.nodes.len(),
        scenario.events.len()
    );

    metrics::register_metrics().context("failed to register prometheus collectors")?;

    if !cli.no_metrics_server {
        let state = http_api::HttpState {
            scenario: scenario.name.clone(),
            version: env!("CARGO_PKG_VERSION"),
            started_at: Instant::now(),
        };
        let _server = http_api::start_server(cli.metrics_port, state).await;
    }

    let seed = if cli.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    } else {
        cli.seed
    };
    info!(seed, "using master seed");

    let node_ids: Vec<String> = scenario.nodes.iter().map(|n| n.id.clone()).collect();
    let sink = Arc::new(metrics::PrometheusSink);
    let runner = ScenarioRunner::new(scenario, seed, sink).context("scenario rejected")?;
    let report = runner.run().await.context("scenario run failed")?;

    metrics::log_summary(&node_ids);
    info!(
        "Scenario `{}` finished: {} ticks, {} events applied",
        report.scenario, report.ticks, report.events_applied
    );

    Ok(())
}
