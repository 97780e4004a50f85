//! `sim-worker`: serves tasks read from stdin.
//!
//! Logs go to stderr; stdout carries nothing but reply lines.

use anyhow::{Context, Result};
use cat_03_sim_worker::{run_stdio_loop, WorkerConfig};
use caterer_telemetry::{init_telemetry, LogTarget, TelemetryConfig};
use sim_engine::LifeEngine;
use std::io;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::for_component("worker", LogTarget::Stderr))
        .context("Failed to initialize telemetry")?;

    let config = WorkerConfig::from_env();
    config.validate()?;
    let executor = config.build_executor(Arc::new(LifeEngine::new()));

    info!(
        pid = std::process::id(),
        output_dir = %config.output_dir.display(),
        renderer = config.renderer_cmd.is_some(),
        resizer = config.resizer.is_some(),
        "Worker ready"
    );

    let served = run_stdio_loop(&executor, io::stdin().lock(), io::stdout().lock())
        .context("Worker I/O failed")?;

    info!(served, "Input closed, worker exiting");
    Ok(())
}
