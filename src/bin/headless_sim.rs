//! Headless settlement runner
//!
//! Seeds a small settlement for each player, runs the tick loop and reports
//! what got built and produced.

use std::path::PathBuf;

use clap::Parser;
use colony_sim::{
    EventKind, MaterialSlot, MaterialType, NodeName, PlayerId, RecipeCatalog, Result, Simulation,
    SimulationConfig, UnitRole, Vec2,
};

/// Headless Colony Runner - seeded settlements without clients
#[derive(Parser, Debug)]
#[command(name = "headless_sim")]
#[command(about = "Run the settlement simulation without clients and print a summary")]
struct Args {
    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Number of players (settlements are spaced 100 units apart)
    #[arg(long, default_value_t = 2)]
    players: u32,

    /// Seed for deterministic runs (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Recipe tables (TOML)
    #[arg(long)]
    recipes: Option<PathBuf>,

    /// Print every player's final snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("colony_sim=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let recipes = match &args.recipes {
        Some(path) => RecipeCatalog::load_from_toml(path)?,
        None => RecipeCatalog::with_defaults(),
    };

    if let Err(err) = colony_sim::core::config::set_config(config.clone()) {
        tracing::warn!(%err, "global config not installed");
    }
    let mut sim = Simulation::new(config, recipes)?;
    for p in 0..args.players {
        seed_settlement(&mut sim, PlayerId(p + 1), Vec2::new(100.0 * p as f64, 0.0))?;
    }

    tracing::info!(players = args.players, ticks = args.ticks, "running");

    let (mut built, mut created, mut hatched) = (0usize, 0usize, 0usize);
    for _ in 0..args.ticks {
        sim.tick()?;
        for event in sim.drain_events() {
            match event.kind {
                EventKind::NodeBuilt { .. } => built += 1,
                EventKind::MaterialCreated { .. } => created += 1,
                EventKind::UnitCreated { .. } => hatched += 1,
                _ => {}
            }
        }
    }

    println!("=== Colony Summary after {} ticks ===", sim.current_tick());
    println!(
        "Nodes built: {}  Materials produced: {}  Units hatched: {}",
        built, created, hatched
    );
    for state in sim.players() {
        let snapshot = sim.snapshot(state.id())?;
        println!(
            "Player {}: {}/{} nodes built, {} units",
            state.id(),
            snapshot.built_nodes(),
            snapshot.nodes.len(),
            snapshot.units.len()
        );
        let stock: Vec<String> = MaterialType::ALL
            .iter()
            .map(|kind| (kind, state.material_count(*kind)))
            .filter(|(_, count)| *count > 0)
            .map(|(kind, count)| format!("{}={}", kind, count))
            .collect();
        println!("  stock: {}", stock.join(" "));

        if args.json {
            println!("{}", snapshot.to_json()?);
        }
    }

    Ok(())
}

/// Root with starting stock, two working producers and two open sites
fn seed_settlement(sim: &mut Simulation, player: PlayerId, origin: Vec2) -> Result<()> {
    sim.add_player(player, origin)?;
    let root = sim
        .player(player)
        .and_then(|p| p.root())
        .map(|n| n.id())
        .ok_or(colony_sim::SimError::PlayerNotFound(player))?;

    let at = |x: f64, y: f64| Vec2::new(origin.x + x, origin.y + y);
    let field = sim.build_node(player, root, NodeName::GrassField, at(7.0, 0.0))?;
    let well = sim.build_node(player, root, NodeName::Well, at(-7.0, 0.0))?;
    sim.build_node(player, root, NodeName::SandTransit, at(0.0, 6.0))?;
    sim.build_node(player, root, NodeName::SeedStorage, at(0.0, -8.0))?;

    let state = sim
        .player_mut(player)
        .ok_or(colony_sim::SimError::PlayerNotFound(player))?;
    state.complete_node(field)?;
    state.complete_node(well)?;

    for _ in 0..6 {
        state.spawn_material(MaterialType::Grass, MaterialSlot::Output(root))?;
    }
    for _ in 0..4 {
        state.spawn_material(MaterialType::Sand, MaterialSlot::Output(root))?;
    }

    for role in [
        UnitRole::Producer,
        UnitRole::Producer,
        UnitRole::Transporter,
        UnitRole::Transporter,
        UnitRole::Builder,
    ] {
        state.spawn_unit(root, role)?;
    }
    Ok(())
}
