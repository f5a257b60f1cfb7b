use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use empire_app::demo;
use empire_app::game_loop::{self, dispatch};
use empire_core::config::GameConfig;
use empire_core::state::WorldSnapshot;
use empire_sim::SimulationEngine;

/// Run the Agents of Empire simulation without a renderer.
#[derive(Debug, Parser)]
#[command(name = "empire", version, about)]
struct Args {
    /// JSON config file; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the simulation seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 900)]
    ticks: u64,

    /// Pace the loop in wall-clock time on its own thread.
    #[arg(long)]
    realtime: bool,

    /// Drive the world with a scripted player.
    #[arg(long)]
    demo: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate().context("invalid config")?;

    let engine = SimulationEngine::new(config).context("building simulation")?;
    let snapshot = if args.realtime {
        run_realtime(engine, &args)?
    } else {
        run_batch(engine, &args)
    };

    let stats = &snapshot.stats;
    info!(
        tick = snapshot.time.tick,
        elapsed = snapshot.time.elapsed_secs,
        agents = stats.living_agents,
        dragons = stats.dragon_count,
        quests_done = stats.completed_quest_count,
        "run finished"
    );
    println!("{}", serde_json::to_string_pretty(stats)?);
    Ok(())
}

/// Step the engine as fast as possible.
fn run_batch(mut engine: SimulationEngine, args: &Args) -> WorldSnapshot {
    let mut snapshot = engine.snapshot();
    for _ in 0..args.ticks {
        if args.demo {
            let next_tick = snapshot.time.tick + 1;
            for command in demo::script(next_tick, &snapshot) {
                let _ = dispatch(&mut engine, command);
            }
        }
        snapshot = engine.tick();
    }
    snapshot
}

/// Run on the paced game loop thread, feeding demo orders from this one.
fn run_realtime(engine: SimulationEngine, args: &Args) -> Result<WorldSnapshot> {
    let frame = Duration::from_secs_f64(engine.config().dt());
    let handle = game_loop::spawn_game_loop(engine, Some(args.ticks))
        .context("spawning game loop thread")?;

    let mut last_tick = 0;
    while !handle.thread.is_finished() {
        std::thread::sleep(frame);
        if !args.demo {
            continue;
        }
        let Some(snapshot) = handle.latest() else {
            continue;
        };
        let current = snapshot.time.tick;
        for tick in last_tick + 1..=current {
            for command in demo::script(tick, &snapshot) {
                // The loop may finish between polls.
                let _ = handle.send(command);
            }
        }
        last_tick = current;
    }

    let snapshot = handle.latest();
    if handle.shutdown().is_err() {
        bail!("game loop thread panicked");
    }
    snapshot.context("game loop produced no frames")
}
