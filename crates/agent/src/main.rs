//! YARN stats agent
//!
//! Loads the check configuration, builds one check per instance and runs
//! them on an interval, writing every gauge and event as a JSON log line.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use yarn_lib::{CheckConfig, Emitter, TracingEmitter, YarnCheck};

mod config;
mod runner;

const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!(version = AGENT_VERSION, "Starting yarn-stats-agent");

    let agent = config::AgentConfig::load()?;
    let check_config = CheckConfig::load(&agent.check_config).with_context(|| {
        format!(
            "failed to load check configuration from {}",
            agent.check_config.display()
        )
    })?;

    let emitter: Arc<dyn Emitter> = Arc::new(TracingEmitter::new(&agent.check_name));
    let checks = build_checks(&check_config, emitter)?;
    info!(
        instances = checks.len(),
        interval_secs = agent.interval_secs,
        "Agent configured"
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let runner = runner::CheckRunner::new(checks, agent.interval(), agent.run_timeout());
    let handle = tokio::spawn(runner.run(shutdown_rx));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!(reason = "SIGINT received", "Shutting down");
    let _ = shutdown_tx.send(());
    handle.await?;

    Ok(())
}

fn build_checks(check_config: &CheckConfig, emitter: Arc<dyn Emitter>) -> Result<Vec<Arc<YarnCheck>>> {
    let instances = check_config.resolve()?;
    instances
        .into_iter()
        .map(|instance| Ok(Arc::new(YarnCheck::connect(instance, emitter.clone())?)))
        .collect()
}
