//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `AreaMeshGenerationTask`: meshes one dirty area from a snapshot of it and its neighbors

pub mod area_mesh_generation_task;
