//! nodeweave - animated procedural node network.
//!
//! Opens a window by default; `--snapshot` renders offscreen to a PNG.

use std::path::PathBuf;

use clap::Parser;
use nodeweave::{NetworkConfig, NetworkSimulation, SimulationError};

#[derive(Parser)]
#[command(name = "nodeweave")]
#[command(about = "Procedural 3D node network with flowing data particles")]
struct Cli {
    /// JSON file with network options (missing keys use defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible network
    #[arg(short, long)]
    seed: Option<u64>,

    /// Window or snapshot width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window or snapshot height in pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Render offscreen and write the last frame to this PNG
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Frames to run before writing the snapshot
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<(), SimulationError> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => NetworkConfig::load(path)?,
        None => NetworkConfig::default(),
    };

    if cli.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let mut simulation = NetworkSimulation::new()
        .with_config(config)
        .with_window_size(cli.width, cli.height);
    if let Some(seed) = cli.seed {
        simulation = simulation.with_seed(seed);
    }

    match cli.snapshot {
        Some(path) => simulation.render_snapshot(cli.frames, path),
        None => simulation.run(),
    }
}
