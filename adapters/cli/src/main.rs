#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Lane Defence scenario headlessly.

mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lane_defence_core::Event;
use lane_defence_system_builder::BuilderRequest;
use lane_defence_system_session::Session;
use lane_defence_world::query;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Ten minutes of simulated time.
const DEFAULT_TICK_LIMIT: u64 = 36_000;

/// Runs a Lane Defence scenario without a renderer and logs what happens.
#[derive(Debug, Parser)]
#[command(name = "lane-defence", version)]
struct Cli {
    /// TOML scenario file; built-in defaults are used when omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Overrides the scenario seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of ticks to simulate.
    #[arg(long, default_value_t = DEFAULT_TICK_LIMIT)]
    ticks: u64,
    /// Request applied before the first tick, as ACTION@X,Y (e.g. sniper@100,300).
    #[arg(long = "build", value_parser = scenario::parse_request)]
    builds: Vec<BuilderRequest>,
}

/// Entry point for the Lane Defence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut scenario = scenario::load(cli.scenario.as_deref())?;
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    let mut session = Session::new(&scenario).context("failed to start session")?;
    for request in cli.builds {
        session.submit(request);
    }

    let mut events = Vec::new();
    let mut ticks = 0;
    while ticks < cli.ticks && session.step(&mut events) {
        ticks += 1;
        for event in events.drain(..) {
            report(&event);
        }
    }

    let world = session.world();
    info!(
        ticks,
        outcome = ?session.outcome(),
        gold = %query::gold(world),
        waves_remaining = session.waves().waves_remaining(),
        "simulation stopped"
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn report(event: &Event) {
    match event {
        Event::PlacementRejected { kind, cell, reason } => warn!(
            kind = kind.label(),
            column = cell.column(),
            row = cell.row(),
            ?reason,
            "placement rejected"
        ),
        Event::UpgradeRejected { cell, reason } => warn!(
            column = cell.column(),
            row = cell.row(),
            ?reason,
            "upgrade rejected"
        ),
        Event::SaleRejected { cell, reason } => warn!(
            column = cell.column(),
            row = cell.row(),
            ?reason,
            "sale rejected"
        ),
        Event::EnemyBreached { mob } => warn!(mob = mob.get(), "enemy breached"),
        Event::GameOver => warn!("game over"),
        Event::GameWon => info!("game won"),
        Event::TimeAdvanced { .. } => {}
        other => debug!(event = ?other),
    }
}
