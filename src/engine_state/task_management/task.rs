//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system.
//!
//! ## Core Components
//! - `Task`: a unit of work executed on a worker thread
//! - `TaskResult`: the outcome of a task, applied on the owning thread
//! - `TaskContext`: the mutable engine state a result is applied to
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the owning thread with a `TaskContext`
//! 5. The result can spawn follow-up tasks
//!
//! ## Thread Safety
//! Tasks own everything they read: generation tasks hold the shared generator, mesh tasks hold
//! `Arc` snapshots of block arrays. Nothing a worker touches is mutated while it runs.

use crate::engine_state::{rendering::meshing::MeshManager, voxels::world::World};

/// Mutable engine state handed to task results on the owning thread.
pub struct TaskContext<'a> {
    /// The area store.
    pub world: &'a mut World,
    /// Finished meshes, keyed by area position.
    pub meshes: &'a mut MeshManager,
}

/// A unit of work that can be executed on a worker thread.
///
/// Tasks should be self-contained and own all the data they need.
pub trait Task: Send {
    /// Performs the work and returns a result for the owning thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The result of processing a `Task`.
///
/// Results run on the owning thread, one at a time, with exclusive access to the engine
/// state in `context`. Keep them cheap: the heavy lifting belongs in `Task::process`.
pub trait TaskResult: Send {
    /// Applies the result and returns any follow-up tasks.
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>>;
}
