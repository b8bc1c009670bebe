//! Mesh generation for areas.
//!
//! # Architecture
//! - [`greedy`]: the greedy mesher and the read-only `AreaSnapshot` it works on
//! - [`Face`]: one merged run of block faces, emitted as a quad
//! - [`AreaMesh`]: the finished packed vertex and index buffers of one area
//!
//! # Usage
//! ```ignore
//! let snapshot = AreaSnapshot::capture(&world, id);
//! let mut scratch = pool.acquire(snapshot.size.pow(3));
//! let mesh = greedy::greedy(&snapshot, &mut scratch);
//! pool.release(scratch);
//! ```

mod face;
pub mod greedy;
mod mesh;

pub use face::Face;
pub use greedy::AreaSnapshot;
pub use mesh::{
    AreaMesh, MeshBuffers, INDEX_GROWTH, INITIAL_INDEX_CAPACITY, INITIAL_VERTEX_CAPACITY,
    VERTEX_GROWTH,
};
