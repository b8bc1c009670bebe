//! Surface geometry for the block world.
//!
//! This module turns dirty areas into packed vertex and index buffers for an external
//! renderer. No GPU work happens here: the renderer collects finished meshes from the
//! `MeshManager`.

pub mod meshing;
pub mod tasks;
pub mod vertex;

pub use meshing::MeshManager;
pub use vertex::PackedVertex;
