use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use action_tracker::{load_generator, ActionTracker, SimulationConfig};

/// Record action durations and report the mean time per action
#[derive(Parser)]
#[command(name = "action-tracker", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read one JSON event per line and print the stats
    Ingest {
        /// Input file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Stop at the first rejected line
        #[arg(long)]
        strict: bool,
    },
    /// Drive the tracker from concurrent workers and print the stats
    Simulate {
        /// JSON file with simulation settings; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long)]
        workers: Option<u32>,

        #[arg(long)]
        events: Option<u32>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        invalid_pct: Option<u8>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn,action_tracker=info",
        1 => "debug",
        _ => "trace",
    };

    // stdout carries the stats JSON; everything else goes to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(cli.verbose >= 2)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ingest { input, strict } => run_ingest(input, strict).await,
        Commands::Simulate {
            config,
            workers,
            events,
            seed,
            invalid_pct,
        } => run_simulate(config, workers, events, seed, invalid_pct).await,
    }
}

// ─── ingest ──────────────────────────────────────────────────────

async fn run_ingest(input: Option<PathBuf>, strict: bool) -> Result<()> {
    let tracker = ActionTracker::new();

    let (accepted, rejected) = match &input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("cannot open {}", path.display()))?;
            ingest_lines(&tracker, file, strict).await?
        }
        None => ingest_lines(&tracker, tokio::io::stdin(), strict).await?,
    };

    info!(accepted, rejected, "ingest finished");
    println!("{}", tracker.get_stats_async().await?);
    Ok(())
}

async fn ingest_lines<R>(tracker: &ActionTracker, reader: R, strict: bool) -> Result<(u64, u64)>
where
    R: AsyncRead + Unpin,
{
    let mut lines = LinesStream::new(BufReader::new(reader).lines());
    let (mut accepted, mut rejected) = (0u64, 0u64);
    let mut lineno = 0u64;

    while let Some(line) = lines.next().await {
        let line = line.context("failed to read input")?;
        lineno += 1;
        if line.trim().is_empty() {
            continue;
        }

        match tracker.add_action_async(&line).await {
            Ok(()) => accepted += 1,
            Err(e) if strict => {
                return Err(e).with_context(|| format!("line {lineno}"));
            }
            Err(e) => {
                warn!(line = lineno, error = %e, "skipping line");
                rejected += 1;
            }
        }
    }

    Ok((accepted, rejected))
}

// ─── simulate ────────────────────────────────────────────────────

async fn run_simulate(
    config_path: Option<PathBuf>,
    workers: Option<u32>,
    events: Option<u32>,
    seed: Option<u64>,
    invalid_pct: Option<u8>,
) -> Result<()> {
    // ── 1. Resolve configuration ────────────────────────────────
    let mut config = match &config_path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("cannot read {}", path.display()))?;
            SimulationConfig::from_json(&raw)?
        }
        None => SimulationConfig::default(),
    };
    if let Some(w) = workers {
        config.workers = w;
    }
    if let Some(n) = events {
        config.events_per_worker = n;
    }
    if let Some(s) = seed {
        config.seed = s;
    }
    if let Some(p) = invalid_pct {
        config.invalid_pct = p;
    }
    debug!(?config, "simulation config");

    // ── 2. Wire up stop flag ────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, stopping workers");
                running.store(false, Ordering::SeqCst);
            }
        });
    }

    // ── 3. Run and report ───────────────────────────────────────
    let tracker = Arc::new(ActionTracker::new());
    let report = load_generator::run(running, tracker.clone(), config).await?;

    eprintln!(
        "accepted {} / rejected {} in {:.3}s",
        report.accepted,
        report.rejected,
        report.elapsed.as_secs_f64()
    );
    println!("{}", tracker.get_stats_async().await?);
    Ok(())
}
