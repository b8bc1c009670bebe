//! # Voxel Task System
//!
//! Tasks that fill newly spawned areas on worker threads. The filled area travels back to the
//! owning thread, which inserts it into the world and links it into the neighbor graph.

pub mod area_generation_task;
