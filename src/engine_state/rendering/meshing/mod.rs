//! Mesh generation and management for areas.
//!
//! Dirty areas are snapshotted together with their neighbors and meshed on worker threads.
//! Finished meshes land in the `MeshManager`, keyed by area position, where the external
//! renderer picks them up.
//!
//! # Architecture
//! - `MeshManager`: latest mesh of every area, plus the list of positions updated since the
//!   renderer last looked
//! - `ScratchPool`: visited bitmaps shared by mesh workers
//! - `mesh`: the greedy mesher and its buffers

use std::collections::HashMap;

use cgmath::Point3;

pub mod mesh;
pub mod scratch;

use mesh::AreaMesh;

/// Aggregate numbers about stored meshes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MeshStats {
    /// Areas with a stored mesh.
    pub meshes: usize,
    /// Quads over all stored meshes.
    pub quads: usize,
    /// Vertices over all stored meshes.
    pub vertices: usize,
}

/// Stores the latest mesh of every area.
#[derive(Debug, Default)]
pub struct MeshManager {
    meshes: HashMap<Point3<i32>, AreaMesh>,
    updated: Vec<Point3<i32>>,
}

impl MeshManager {
    /// Stores a mesh, replacing any previous mesh of the same area.
    pub fn insert(&mut self, mesh: AreaMesh) {
        let position = mesh.position;
        self.meshes.insert(position, mesh);
        if !self.updated.contains(&position) {
            self.updated.push(position);
        }
    }

    /// The latest mesh of the area at `position`.
    pub fn get(&self, position: Point3<i32>) -> Option<&AreaMesh> {
        self.meshes.get(&position)
    }

    /// Number of stored meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Returns `true` if no mesh is stored.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Positions whose mesh changed since the last call.
    pub fn drain_updates(&mut self) -> Vec<Point3<i32>> {
        std::mem::take(&mut self.updated)
    }

    /// Totals over all stored meshes.
    pub fn stats(&self) -> MeshStats {
        self.meshes.values().fold(
            MeshStats {
                meshes: self.meshes.len(),
                ..MeshStats::default()
            },
            |mut stats, mesh| {
                stats.quads += mesh.quad_count;
                stats.vertices += mesh.vertices.len();
                stats
            },
        )
    }
}
