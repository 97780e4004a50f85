//! `caterer`: runs simulation commands against a supervised worker.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use caterer_runtime::{parse_shell_line, start_dispatcher, Commands, Invocation, Reply, RuntimeConfig};
use caterer_telemetry::{encode_metrics, init_telemetry, LogTarget, TelemetryConfig};
use sim_engine::{LifeEngine, SimulationEngine};

/// Caterer: cellular-automaton simulations rendered to GIF
#[derive(Parser, Debug)]
#[command(name = "caterer")]
#[command(about = "Run sim / identify commands against a supervised simulation worker")]
struct Args {
    /// User id the commands run as (checked against CATERER_ADMINS)
    #[arg(short, long, default_value = "local")]
    user: String,

    /// Print Prometheus metrics to stderr before exiting
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Run one command, e.g. `caterer exec -p glider.rle -- sim 30`
    Exec {
        /// File holding the pattern RLE
        #[arg(short, long)]
        pattern: Option<PathBuf>,

        /// Command words
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        argv: Vec<String>,
    },
    /// Read commands from stdin, one per line; `cmd args | <rle>` attaches a pattern
    Shell {
        /// Pattern used by lines that do not attach one
        #[arg(short, long)]
        pattern: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _telemetry = init_telemetry(TelemetryConfig::for_component("runtime", LogTarget::Stderr))
        .context("Failed to initialize telemetry")?;

    let config = RuntimeConfig::from_env().context("Invalid configuration")?;
    config.validate().context("Invalid configuration")?;
    info!(
        mode = ?config.worker_mode,
        job_timeout_secs = config.job_timeout.as_secs(),
        renderer_timeout_secs = config.renderer_timeout.as_secs(),
        admins = config.admins.len(),
        "Caterer starting"
    );

    let engine: Arc<dyn SimulationEngine> = Arc::new(LifeEngine::new());
    let dispatcher = start_dispatcher(&config, engine.clone());
    let commands = Commands::new(dispatcher.clone(), engine, config.admins.clone());

    let result = match args.mode {
        Mode::Exec { pattern, argv } => {
            let pattern = read_pattern(pattern.as_deref())?;
            let reply = commands
                .run(Invocation::new(&args.user, argv, pattern))
                .await;
            print_reply(&mut io::stdout().lock(), &reply)
        }
        Mode::Shell { pattern } => {
            let default_pattern = read_pattern(pattern.as_deref())?;
            run_shell(&commands, &args.user, default_pattern).await
        }
    };

    match dispatcher.stats().await {
        Ok(stats) => info!(
            submitted = stats.submitted,
            completed = stats.completed,
            failed = stats.failed,
            timed_out = stats.timed_out,
            restarts = stats.restarts,
            "Dispatcher stats"
        ),
        Err(e) => warn!(error = %e, "Dispatcher stats unavailable"),
    }
    if let Err(e) = dispatcher.shutdown().await {
        warn!(error = %e, "Dispatcher was already stopped");
    }
    if args.metrics {
        eprint!("{}", encode_metrics()?);
    }
    result
}

fn read_pattern(path: Option<&Path>) -> Result<Option<String>> {
    path.map(|p| {
        std::fs::read_to_string(p).with_context(|| format!("Failed to read {}", p.display()))
    })
    .transpose()
}

async fn run_shell(commands: &Commands, user: &str, default_pattern: Option<String>) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<String>(16);

    // Blocking stdin reader on its own thread.
    let reader = tokio::task::spawn_blocking(move || -> io::Result<()> {
        for line in io::stdin().lock().lines() {
            if tx.blocking_send(line?).is_err() {
                break;
            }
        }
        Ok(())
    });

    while let Some(line) = rx.recv().await {
        let Some((argv, pattern)) = parse_shell_line(&line) else {
            continue;
        };
        let pattern = pattern.or_else(|| default_pattern.clone());
        let reply = commands.run(Invocation::new(user, argv, pattern)).await;
        print_reply(&mut io::stdout().lock(), &reply)?;
    }

    reader.await.context("stdin reader panicked")??;
    Ok(())
}

fn print_reply(out: &mut impl Write, reply: &Reply) -> Result<()> {
    if let Some(content) = &reply.content {
        writeln!(out, "{content}")?;
    }
    if let Some(file) = &reply.file {
        writeln!(out, "[attached {}]", file.display())?;
    }
    out.flush()?;
    Ok(())
}
