//! Task for generating the mesh of one area in a background thread.
//!
//! The task owns a snapshot of the area and its neighbors, so the owning thread may keep
//! editing the world while it runs. The finished mesh is stored on the owning thread, and the
//! area's remesh flag is cleared there.

use crate::engine_state::{
    rendering::meshing::{
        mesh::{greedy, AreaMesh, AreaSnapshot},
        scratch::ScratchPool,
    },
    task_management::task::{Task, TaskContext, TaskResult},
};

/// A task that meshes one area.
pub struct AreaMeshGenerationTask {
    snapshot: AreaSnapshot,
    scratch_pool: ScratchPool,
}

impl AreaMeshGenerationTask {
    /// Creates a mesh task over `snapshot`, borrowing visited bitmaps from `scratch_pool`.
    pub fn new(snapshot: AreaSnapshot, scratch_pool: ScratchPool) -> Self {
        AreaMeshGenerationTask {
            snapshot,
            scratch_pool,
        }
    }
}

impl Task for AreaMeshGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let mut scratch = self.scratch_pool.acquire(self.snapshot.size.pow(3));
        let mesh = greedy::greedy(&self.snapshot, &mut scratch);
        self.scratch_pool.release(scratch);
        Box::new(AreaMeshGenerationTaskResult { mesh })
    }
}

/// The finished mesh of one area.
pub struct AreaMeshGenerationTaskResult {
    mesh: AreaMesh,
}

impl TaskResult for AreaMeshGenerationTaskResult {
    /// Stores the mesh and clears the area's remesh flag.
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>> {
        if let Some(id) = context.world.locate(self.mesh.position) {
            context.world.area_mut(id).needs_remesh = false;
        }
        context.meshes.insert(self.mesh);
        Vec::new()
    }
}
