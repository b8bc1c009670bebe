//! Mesh buffers for one area.
//!
//! Vertex and index buffers start with fixed headroom, grow in fixed steps while faces are
//! emitted, and are trimmed to the emitted size once the area is done.

use cgmath::Point3;

use crate::engine_state::rendering::vertex::PackedVertex;

use super::face::Face;

/// Initial vertex capacity of a mesh under construction.
pub const INITIAL_VERTEX_CAPACITY: usize = 4096;
/// Initial index capacity of a mesh under construction.
pub const INITIAL_INDEX_CAPACITY: usize = 6144;
/// Vertices added to the capacity each time the buffer runs low.
pub const VERTEX_GROWTH: usize = 2048;
/// Indices added to the capacity each time the buffer runs low.
pub const INDEX_GROWTH: usize = 3072;

/// Two triangles over the four corners of a quad.
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Finished geometry of one area.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaMesh {
    /// Grid position of the meshed area.
    pub position: Point3<i32>,
    /// Four vertices per quad.
    pub vertices: Vec<PackedVertex>,
    /// Six indices per quad.
    pub indices: Vec<u32>,
    /// Number of emitted quads.
    pub quad_count: usize,
}

impl AreaMesh {
    /// Returns `true` if the area has no visible face.
    pub fn is_empty(&self) -> bool {
        self.quad_count == 0
    }
}

/// Growable vertex and index buffers.
#[derive(Debug)]
pub struct MeshBuffers {
    vertices: Vec<PackedVertex>,
    indices: Vec<u32>,
    quad_count: usize,
}

impl Default for MeshBuffers {
    fn default() -> Self {
        MeshBuffers {
            vertices: Vec::with_capacity(INITIAL_VERTEX_CAPACITY),
            indices: Vec::with_capacity(INITIAL_INDEX_CAPACITY),
            quad_count: 0,
        }
    }
}

impl MeshBuffers {
    /// Appends one quad.
    pub fn push_face(&mut self, face: &Face) {
        if self.vertices.len() + 4 > self.vertices.capacity() {
            self.vertices.reserve_exact(VERTEX_GROWTH);
        }
        if self.indices.len() + 6 > self.indices.capacity() {
            self.indices.reserve_exact(INDEX_GROWTH);
        }

        let first = self.vertices.len() as u32;
        let texture = face.block.texture_index(face.direction);
        for corner in face.corners() {
            self.vertices.push(PackedVertex::new(
                corner.x as u8,
                corner.y as u8,
                corner.z as u8,
                texture,
                face.direction,
            ));
        }
        self.indices
            .extend(QUAD_INDICES.iter().map(|offset| first + offset));
        self.quad_count += 1;
    }

    /// Number of quads emitted so far.
    pub fn quad_count(&self) -> usize {
        self.quad_count
    }

    /// Current vertex capacity.
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.capacity()
    }

    /// Trims the buffers and returns the finished mesh.
    pub fn finish(mut self, position: Point3<i32>) -> AreaMesh {
        self.vertices.shrink_to_fit();
        self.indices.shrink_to_fit();
        AreaMesh {
            position,
            vertices: self.vertices,
            indices: self.indices,
            quad_count: self.quad_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::{block_type::BlockType, direction::Direction};

    fn face(x: i32) -> Face {
        Face {
            origin: Point3::new(x % 16, 0, 0),
            length: 1,
            direction: Direction::YP,
            block: BlockType::STONE,
        }
    }

    #[test]
    fn quads_use_a_six_index_fan() {
        let mut buffers = MeshBuffers::default();
        buffers.push_face(&face(0));
        buffers.push_face(&face(1));
        let mesh = buffers.finish(Point3::new(0, 0, 0));
        assert_eq!(mesh.quad_count, 2);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn buffers_grow_past_their_initial_capacity_and_are_trimmed() {
        let mut buffers = MeshBuffers::default();
        let quads = INITIAL_VERTEX_CAPACITY / 4 + 10;
        for x in 0..quads {
            buffers.push_face(&face(x as i32));
        }
        assert!(buffers.vertex_capacity() >= INITIAL_VERTEX_CAPACITY + VERTEX_GROWTH);
        let mesh = buffers.finish(Point3::new(1, 2, 3));
        assert_eq!(mesh.vertices.len(), quads * 4);
        assert_eq!(mesh.indices.len(), quads * 6);
        assert_eq!(mesh.position, Point3::new(1, 2, 3));
    }
}
