//! Headless Tactics Runner
//!
//! Runs decision ticks on a recorded snapshot or a generated skirmish and
//! prints the orders as JSON.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use spirit_swarm::core::config::{load_config, TacticsConfig};
use spirit_swarm::core::error::Result;
use spirit_swarm::memory::{InMemoryStore, JsonFileStore, MemoryStore};
use spirit_swarm::scenario::random_skirmish;
use spirit_swarm::tick::{Agent, TickOutcome};
use spirit_swarm::world::Snapshot;
use tracing_subscriber::EnvFilter;

/// Headless Tactics Runner - replay snapshots through the decision engine
#[derive(Parser, Debug)]
#[command(name = "tactics_runner")]
#[command(about = "Run decision ticks on a snapshot and print the orders as JSON")]
struct Args {
    /// Snapshot JSON file recorded from the engine
    #[arg(long, conflicts_with = "seed")]
    snapshot: Option<PathBuf>,

    /// Seed for a generated skirmish (used when no snapshot is given)
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Units per side in a generated skirmish
    #[arg(long, default_value_t = 20)]
    units: usize,

    /// Tactics config TOML (defaults to built-in values)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file persisting memory between runs
    #[arg(long)]
    memory: Option<PathBuf>,

    /// Ticks to run on the same snapshot
    #[arg(long, default_value_t = 1)]
    ticks: u32,

    /// Include per-tick summaries in the output
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunOutput {
    ticks: Vec<TickOutcome>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spirit_swarm=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tactics_runner: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => TacticsConfig::default(),
    };

    let snapshot: Snapshot = match &args.snapshot {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => random_skirmish(args.seed, args.units),
    };

    let output = match &args.memory {
        Some(path) => run_ticks(Agent::new(JsonFileStore::new(path), config), snapshot, args)?,
        None => run_ticks(Agent::new(InMemoryStore::new(), config), snapshot, args)?,
    };

    if args.verbose {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let orders: Vec<_> = output.ticks.iter().map(|t| &t.orders).collect();
        println!("{}", serde_json::to_string_pretty(&orders)?);
    }
    Ok(())
}

fn run_ticks<S: MemoryStore>(mut agent: Agent<S>, snapshot: Snapshot, args: &Args) -> Result<RunOutput> {
    let mut ticks = Vec::with_capacity(args.ticks as usize);
    for n in 0..args.ticks.max(1) {
        let mut snapshot = snapshot.clone();
        snapshot.tick += n as u64;
        ticks.push(agent.tick(snapshot)?);
    }
    Ok(RunOutput { ticks })
}
