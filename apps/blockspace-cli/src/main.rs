mod entities;

use anyhow::Context;
use blockspace_common::{BlockPos, Direction};
use blockspace_kernel::{ID_KEY, PlacedEntity, X_KEY, Y_KEY, Z_KEY};
use blockspace_sync::{ClientWorld, HostConfig, ServerWorld};
use blockspace_tag::RegionFile;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use entities::{Crate, Planter, TankData, TankSegment};

#[derive(Parser)]
#[command(name = "blockspace-cli", about = "CLI tool for blockspace placed entities")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Host config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and config
    Info,
    /// Place entities, rotate one, sync to an observer, save and reload
    Demo {
        /// Where to write the region file (kept after the demo)
        #[arg(short, long, default_value = "demo.region")]
        out: PathBuf,
    },
    /// Print every entity stored in a region file
    Inspect {
        /// Region file to read
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => HostConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HostConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("blockspace-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("config: {}", serde_json::to_string(&config)?);
        }
        Commands::Demo { out } => run_demo(config, out)?,
        Commands::Inspect { path } => inspect(&path)?,
    }

    Ok(())
}

fn run_demo(config: HostConfig, out: PathBuf) -> anyhow::Result<()> {
    let crate_pos = BlockPos::new(0, 64, 0);
    let planter_pos = crate_pos.offset(Direction::East).offset(Direction::East);
    let tank = TankData {
        origin: BlockPos::new(4, 64, 0),
        size: 2,
        fluid: "water".into(),
        volume: 8_000,
    };
    let tank_positions = [tank.origin, tank.origin.offset(Direction::East)];

    let mut server = ServerWorld::new(config.clone());
    let mut client = ClientWorld::new(config.clone());
    server.place(PlacedEntity::new(crate_pos, Crate { items: 12 }))?;
    server.place(PlacedEntity::new(planter_pos, Planter { growth: 3 }))?;
    for pos in tank_positions {
        server.place(PlacedEntity::with_multi_block(pos, TankSegment, tank.clone()))?;
    }
    // The observer mirrors the same positions with empty state.
    for pos in server.positions() {
        let kind = server.get(pos).map(PlacedEntity::kind).context("placed entity")?;
        client.place(entities::create(kind, pos).context("unknown demo kind")?)?;
    }

    let initial = server.flush_updates();
    println!("initial sync: {} packets", initial.len());
    for packet in &initial {
        client.receive(&packet.encode()?)?;
    }

    let rotated = server.rotate(crate_pos, Direction::North)?;
    let refused = !server.rotate(planter_pos, Direction::North)?;
    server.rotate(crate_pos, Direction::North)?;
    println!("rotate crate north: accepted={rotated}; rotate planter: refused={refused}");

    let updates = server.flush_updates();
    println!(
        "update requests={} packets={}",
        server.tracker().requests_seen(),
        updates.len()
    );
    for packet in &updates {
        client.apply(packet)?;
    }
    println!("client rerenders: {:?}", client.take_rerenders());

    for pos in [crate_pos, planter_pos, tank_positions[0]] {
        if let Some(entity) = client.get(pos) {
            println!("client {} at {pos}: facing {}", entity.kind(), entity.orientation());
            for line in entity.overlay_information() {
                println!("  {line}");
            }
        }
    }

    server.save_region(&out)?;
    tracing::info!(path = %out.display(), "region written");
    let mut reloaded = ServerWorld::new(config);
    let count = reloaded.load_region(&out, entities::create)?;
    let facing = reloaded
        .get(crate_pos)
        .map(PlacedEntity::orientation)
        .unwrap_or_default();
    println!(
        "saved {} entities to {}, reloaded {count}, crate facing {facing}",
        server.len(),
        out.display()
    );
    Ok(())
}

fn inspect(path: &Path) -> anyhow::Result<()> {
    let tags = RegionFile::new(path)
        .read()
        .with_context(|| format!("reading region {}", path.display()))?;
    println!("{}: {} entities", path.display(), tags.len());

    for tag in &tags {
        println!("{}", serde_json::to_string_pretty(tag)?);
        let kind = tag.get_string(ID_KEY)?;
        let pos = BlockPos::new(tag.get_int(X_KEY)?, tag.get_int(Y_KEY)?, tag.get_int(Z_KEY)?);
        let Some(mut entity) = entities::create(kind, pos) else {
            println!("  (unknown kind {kind})");
            continue;
        };
        if let Err(e) = entity.read_tag(tag) {
            println!("  (restore failed: {e})");
        }
        println!("  facing {}", entity.orientation());
        for line in entity.overlay_information() {
            println!("  {line}");
        }
    }
    Ok(())
}
