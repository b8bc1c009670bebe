//! # Area Generation Task
//!
//! Generates the blocks of one area off the owning thread. Linking is not parallel: the result
//! inserts the area into the world when it is handled, before any later phase reads links.

use std::sync::Arc;

use cgmath::Point3;
use log::trace;

use crate::engine_state::{
    task_management::task::{Task, TaskContext, TaskResult},
    voxels::{area::Area, generation::TerrainGenerator},
};

/// A task that fills the area at `position`.
pub struct AreaGenerationTask {
    generator: Arc<TerrainGenerator>,
    position: Point3<i32>,
}

impl AreaGenerationTask {
    /// Creates a generation task for the area at `position` (area-grid coordinates).
    pub fn new(generator: Arc<TerrainGenerator>, position: Point3<i32>) -> Self {
        AreaGenerationTask {
            generator,
            position,
        }
    }
}

impl Task for AreaGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(AreaGenerationTaskResult {
            area: self.generator.generate(self.position),
        })
    }
}

/// The filled area, waiting to be linked into the world.
pub struct AreaGenerationTaskResult {
    area: Area,
}

impl TaskResult for AreaGenerationTaskResult {
    /// Inserts the area and links it to its existing neighbors.
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>> {
        let position = self.area.position;
        let structures = self.area.pending_structures();
        context.world.insert_area(self.area);
        trace!(
            "Area {:?} generated with {} queued structures",
            position,
            structures
        );
        Vec::new()
    }
}
