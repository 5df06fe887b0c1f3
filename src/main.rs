//! Delve - headless runner
//!
//! Generates a dungeon, drives the player with a seeded stream of random
//! intents and prints where things ended up.

use std::path::PathBuf;

use clap::Parser;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use delve::core::error::Result;
use delve::core::types::{Depth, Turn};
use delve::turn::{Intent, TurnEvent, TurnLog, TurnScheduler};
use delve::{Dungeon, DungeonConfig};

/// Energy granted to every entity each turn
const ENERGY_PER_TURN: i32 = 10;

/// Delve - run the dungeon kernel without a display
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Run a seeded dungeon simulation and print the result")]
struct Args {
    /// Random seed; overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Turns to simulate
    #[arg(long, default_value_t = 100)]
    turns: u64,

    /// TOML config file (missing fields keep their defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    turns_run: Turn,
    player_alive: bool,
    depth: Depth,
    entities: usize,
    map: Vec<String>,
    events: Vec<TurnEvent>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("delve=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DungeonConfig::load(path)?,
        None => DungeonConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    tracing::info!("Delve starting (seed {})", config.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut dungeon = Dungeon::generate(&config, &mut rng)?;
    let player = dungeon.add_player(&config)?;
    let mut scheduler = TurnScheduler::new(player);

    let intents = Intent::all();
    let mut log = TurnLog::new();
    let mut events = Vec::new();

    for _ in 0..args.turns {
        let intent = intents.choose(&mut rng).copied().unwrap_or_default();
        scheduler.step(&mut dungeon, intent, ENERGY_PER_TURN, &mut log);
        if dungeon.swap_depth(player) {
            tracing::info!("player reached depth {}", dungeon.topology.current_depth());
        }
        for event in log.drain() {
            tracing::debug!("turn {}: {}", event.turn, event.description);
            events.push(event);
        }
        if !dungeon.entities.contains(player) {
            tracing::info!("player died on turn {}", scheduler.turn());
            break;
        }
    }

    let summary = RunSummary {
        seed: config.seed,
        turns_run: scheduler.turn(),
        player_alive: dungeon.entities.contains(player),
        depth: dungeon.topology.current_depth(),
        entities: dungeon.entities.len(),
        map: dungeon.render_current(),
        events,
    };

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        other => {
            if other != "text" {
                eprintln!("Unknown format '{}', defaulting to text", other);
            }
            print_text(&summary);
        }
    }
    Ok(())
}

fn print_text(summary: &RunSummary) {
    for row in &summary.map {
        println!("{}", row);
    }
    println!();
    for event in summary.events.iter().rev().take(10).rev() {
        println!("[{}] {}", event.turn, event.description);
    }
    println!();
    println!("Seed: {}", summary.seed);
    println!("Turns: {}", summary.turns_run);
    println!("Depth: {}", summary.depth);
    println!("Entities: {}", summary.entities);
    println!("Player: {}", if summary.player_alive { "alive" } else { "dead" });
}
