//! # Engine State Module
//!
//! The tick driver of the terrain engine.
//!
//! ## Key Components
//!
//! * `EngineState` - owns the world and every subsystem, and runs them in order
//! * `voxels` - blocks, areas, the world graph, spawning and generation
//! * `circuits` - the logic simulation over circuit blocks
//! * `rendering` - greedy meshing of dirty areas
//! * `task_management` - the worker pool running generation and meshing
//!
//! ## Tick Order
//!
//! 1. Clear the spawn flags left by the previous tick
//! 2. Ask the spawn scheduler which areas to create
//! 3. Generate them on workers; results are inserted and linked before anything else runs
//! 4. Place queued structures whose neighbors now exist
//! 5. Advance the circuit simulation
//!
//! Meshing runs separately in `frame()`, after the tick that dirtied the areas.

use std::sync::Arc;
use std::time::Duration;

use cgmath::Point3;
use log::{debug, info};
use web_time::Instant;

pub mod circuits;
pub mod config;
pub mod error;
pub mod rendering;
pub mod task_management;
pub mod voxels;

use circuits::{CircuitSimulation, CircuitTickStats};
use config::EngineConfig;
use error::TerrainResult;
use rendering::{
    meshing::{mesh::AreaSnapshot, scratch::ScratchPool, MeshManager},
    tasks::area_mesh_generation_task::AreaMeshGenerationTask,
};
use task_management::{task::TaskContext, TaskManager};
use voxels::{
    block::block_type::BlockType,
    change::BlockEdit,
    generation::{structures::StructureStats, TerrainGenerator},
    spawn::{Observer, SpawnScheduler},
    tasks::area_generation_task::AreaGenerationTask,
    world::World,
};

/// Blocks a spawn search may descend before giving up.
const SPAWN_SEARCH_STEPS: usize = 512;

/// What one simulation tick did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Number of the tick, starting at 1.
    pub tick: u64,
    /// Areas created this tick.
    pub areas_spawned: usize,
    /// Area coordinates still waiting for creation.
    pub spawns_pending: usize,
    /// Structure placement results.
    pub structures: StructureStats,
    /// Circuit simulation results.
    pub circuits: CircuitTickStats,
}

/// The main state container of the terrain engine.
///
/// # Examples
///
/// ```ignore
/// let mut engine = EngineState::new(EngineConfig::default())?;
/// let observers = [Observer::new(1, Point3::new(0.0, 20.0, 0.0))];
/// loop {
///     engine.tick(Duration::from_millis(50), &observers);
///     engine.frame();
///     for position in engine.meshes_mut().drain_updates() {
///         // hand engine.meshes().get(position) to the renderer
///     }
/// }
/// ```
pub struct EngineState {
    config: EngineConfig,
    world: World,
    generator: Arc<TerrainGenerator>,
    scheduler: SpawnScheduler,
    circuits: CircuitSimulation,
    task_manager: TaskManager,
    meshes: MeshManager,
    scratch_pool: ScratchPool,
    ticks: u64,
}

impl EngineState {
    /// Creates an engine from a configuration.
    ///
    /// # Errors
    /// Returns `TerrainError::InvalidConfig` if the configuration fails validation.
    pub fn new(config: EngineConfig) -> TerrainResult<Self> {
        config.validate()?;

        let generator = TerrainGenerator::new(
            config.area_size,
            config.terrain.clone(),
            config.structures.clone(),
        );
        info!(
            "Terrain engine: area size {}, seed {}, {} workers",
            config.area_size, config.terrain.seed, config.worker_threads
        );

        Ok(EngineState {
            world: World::new(config.area_size),
            generator: Arc::new(generator),
            scheduler: SpawnScheduler::new(&config.spawn),
            circuits: CircuitSimulation::new(&config.circuits),
            task_manager: TaskManager::new(config.worker_threads),
            meshes: MeshManager::default(),
            scratch_pool: ScratchPool::default(),
            ticks: 0,
            config,
        })
    }

    /// Runs one simulation tick of length `dt` around `observers`.
    pub fn tick(&mut self, dt: Duration, observers: &[Observer]) -> TickStats {
        self.ticks += 1;
        self.world.clear_spawn_flags();

        let batch = self.scheduler.schedule(&self.world, observers);
        for &position in &batch {
            self.task_manager.publish_task(Box::new(AreaGenerationTask::new(
                self.generator.clone(),
                position,
            )));
        }
        self.wait_for_tasks();

        let structures = self
            .world
            .place_structures(&self.generator, self.config.structures.max_retries);
        let circuits = self.circuits.update(dt, &mut self.world);

        TickStats {
            tick: self.ticks,
            areas_spawned: batch.len(),
            spawns_pending: self.scheduler.pending_len(),
            structures,
            circuits,
        }
    }

    /// Meshes every area flagged for remeshing. Returns the number of areas meshed.
    ///
    /// Does nothing when meshing is disabled.
    pub fn frame(&mut self) -> usize {
        if !self.config.meshing_enabled {
            return 0;
        }

        let start = Instant::now();
        let dirty: Vec<_> = self
            .world
            .areas()
            .filter(|(_, area)| area.needs_remesh)
            .map(|(id, _)| id)
            .collect();
        for &id in &dirty {
            let snapshot = AreaSnapshot::capture(&self.world, id);
            self.task_manager.publish_task(Box::new(AreaMeshGenerationTask::new(
                snapshot,
                self.scratch_pool.clone(),
            )));
        }
        self.wait_for_tasks();

        if !dirty.is_empty() {
            debug!(
                "Meshed {} areas in {:?}, {} meshes stored",
                dirty.len(),
                start.elapsed(),
                self.meshes.len()
            );
        }
        dirty.len()
    }

    fn wait_for_tasks(&mut self) {
        let mut context = TaskContext {
            world: &mut self.world,
            meshes: &mut self.meshes,
        };
        self.task_manager.wait_for_idle(&mut context);
    }

    /// Applies a gameplay edit. Circuits see it on their next logic tick.
    ///
    /// # Errors
    /// Returns `TerrainError::AreaNotLoaded` if the target area does not exist yet.
    pub fn apply_edit(&mut self, edit: BlockEdit) -> TerrainResult<BlockType> {
        self.world.apply_edit(edit)
    }

    /// Position just above the highest solid block of the world column `(x, z)`.
    ///
    /// # Errors
    /// Returns `TerrainError::AreaNotLoaded` or `TerrainError::SearchExceeded` when the column
    /// is not generated far enough; the caller should retry later or pick another column.
    pub fn spawn_location(&self, x: i32, z: i32) -> TerrainResult<Point3<f64>> {
        let structures = &self.config.structures;
        let n = self.config.area_size as i32;
        let floor = self.config.terrain.sea_level - n;
        let mut top = self.config.terrain.sky_level
            + structures.base_trunk_height
            + 2 * structures.noise_range
            + 1;
        // start in the highest generated area of the column
        while top > floor && self.world.area_containing(Point3::new(x, top, z)).is_none() {
            top = top.div_euclid(n) * n - 1;
        }
        let surface = self.world.find_surface(x, z, top, SPAWN_SEARCH_STEPS)?;
        Ok(Point3::new(
            surface.x as f64 + 0.5,
            (surface.y + 1) as f64,
            surface.z as f64 + 0.5,
        ))
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The block world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the block world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The terrain generator.
    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// The circuit simulation.
    pub fn circuits(&self) -> &CircuitSimulation {
        &self.circuits
    }

    /// Finished meshes.
    pub fn meshes(&self) -> &MeshManager {
        &self.meshes
    }

    /// Mutable access to finished meshes, to drain updates.
    pub fn meshes_mut(&mut self) -> &mut MeshManager {
        &mut self.meshes
    }

    /// Number of ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Area coordinates still waiting for creation.
    pub fn pending_spawns(&self) -> usize {
        self.scheduler.pending_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(workers: usize) -> EngineConfig {
        let mut config = EngineConfig {
            worker_threads: workers,
            ..EngineConfig::default()
        };
        config.spawn.initial_spawn_extent = 1;
        config.spawn.max_creations_per_tick = 10;
        config.spawn.view_range = 0;
        config
    }

    #[test]
    fn initial_extent_spawns_over_three_ticks() {
        let mut engine = EngineState::new(config(0)).unwrap();
        let dt = Duration::from_millis(50);
        assert_eq!(engine.tick(dt, &[]).areas_spawned, 10);
        assert_eq!(engine.tick(dt, &[]).areas_spawned, 10);
        let stats = engine.tick(dt, &[]);
        assert_eq!(stats.areas_spawned, 7);
        assert_eq!(stats.spawns_pending, 0);
        assert_eq!(engine.world().len(), 27);
        assert_eq!(engine.tick_count(), 3);
    }

    #[test]
    fn frame_meshes_dirty_areas_once() {
        let mut engine = EngineState::new(config(2)).unwrap();
        for _ in 0..3 {
            engine.tick(Duration::from_millis(50), &[]);
        }
        assert_eq!(engine.frame(), 27);
        assert_eq!(engine.meshes().len(), 27);
        assert!(engine.world().areas().all(|(_, area)| !area.needs_remesh));
        assert_eq!(engine.frame(), 0);
    }

    #[test]
    fn disabled_meshing_builds_nothing() {
        let mut engine = EngineState::new(EngineConfig {
            meshing_enabled: false,
            ..config(0)
        })
        .unwrap();
        engine.tick(Duration::from_millis(50), &[]);
        assert_eq!(engine.frame(), 0);
        assert!(engine.meshes().is_empty());
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let bad = EngineConfig {
            area_size: 0,
            ..EngineConfig::default()
        };
        assert!(EngineState::new(bad).is_err());
    }

    #[test]
    fn spawn_location_stands_on_the_ground() {
        let mut engine = EngineState::new(config(0)).unwrap();
        for _ in 0..3 {
            engine.tick(Duration::from_millis(50), &[]);
        }
        let spawn = engine.spawn_location(3, 5).unwrap();
        let feet = Point3::new(3, spawn.y as i32, 5);
        let below = feet + cgmath::Vector3::new(0, -1, 0);
        assert!(engine.world().block_at(below).unwrap().is_solid());
        assert!(!engine
            .world()
            .block_at(feet)
            .is_some_and(|block| block.is_solid()));
    }

    #[test]
    fn edits_outside_the_world_are_reported() {
        let mut engine = EngineState::new(config(0)).unwrap();
        let result = engine.apply_edit(BlockEdit::new(
            Point3::new(1000, 0, 0),
            BlockType::STONE,
        ));
        assert!(result.is_err());
    }
}
