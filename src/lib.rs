#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Terrain Engine
//!
//! A chunked voxel-terrain engine: a block world stored as fixed-size cubic areas linked into a
//! neighbor graph, filled with noise terrain and trees as observers move, meshed with a greedy
//! mesher into packed vertex buffers, and running a discrete digital-circuit simulation over
//! the same blocks.
//!
//! ## Key Modules
//!
//! * `core` - Shared-ownership primitives used across worker threads
//! * `engine_state` - The tick driver and every subsystem: voxels, circuits, meshing, tasks
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use cgmath::Point3;
//! use terrain_engine::{EngineConfig, EngineState, Observer};
//!
//! let mut engine = EngineState::new(EngineConfig::default()).unwrap();
//! let observers = [Observer::new(1, Point3::new(0.0, 20.0, 0.0))];
//! engine.tick(Duration::from_millis(50), &observers);
//! engine.frame();
//! ```
//!
//! Networking, player physics, GPU upload and UI live outside this crate; they feed it
//! observers and edits and consume the meshes.

use std::time::Duration;

use cgmath::Point3;
use log::{error, info};

pub mod core;
pub mod engine_state;

pub use engine_state::{
    circuits::CircuitSimulation,
    config::EngineConfig,
    error::{TerrainError, TerrainResult},
    rendering::{meshing::mesh::AreaMesh, MeshManager, PackedVertex},
    voxels::{
        block::{block_type::BlockType, direction::Direction},
        change::BlockEdit,
        spawn::Observer,
        world::World,
    },
    EngineState, TickStats,
};

/// Simulated tick length of the headless run.
const HEADLESS_TICK: Duration = Duration::from_millis(50);
/// Upper bound of ticks in the headless run.
const HEADLESS_MAX_TICKS: u64 = 200;

/// Runs the engine headless around a single observer at the origin.
///
/// The first command-line argument, if any, is a JSON configuration file.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config_path = std::env::args().nth(1);
    if let Err(err) = run_headless(config_path.as_deref()) {
        error!("{}", err);
    }
}

fn run_headless(config_path: Option<&str>) -> TerrainResult<()> {
    let config = match config_path {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    let mut engine = EngineState::new(config)?;
    let observers = [Observer::new(0, Point3::new(0.0, 0.0, 0.0))];

    while engine.tick_count() < HEADLESS_MAX_TICKS {
        let stats = engine.tick(HEADLESS_TICK, &observers);
        engine.frame();
        if stats.areas_spawned == 0 && stats.spawns_pending == 0 {
            break;
        }
    }

    let meshes = engine.meshes().stats();
    info!(
        "{} ticks: {} areas, {} meshes, {} quads, {} stalled structures",
        engine.tick_count(),
        engine.world().len(),
        meshes.meshes,
        meshes.quads,
        engine.world().stalled_structure_count()
    );
    match engine.spawn_location(0, 0) {
        Ok(spawn) => info!("Spawn location: {:?}", spawn),
        Err(err) => error!("No spawn location at the origin: {}", err),
    }
    Ok(())
}
