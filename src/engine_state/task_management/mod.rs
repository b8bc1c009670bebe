//! # Task Management System
//!
//! This module runs generation and meshing work on a pool of worker threads.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: central coordinator for task distribution and worker management
//! - `Task`: a unit of work that can be executed on a worker
//! - `TaskResult`: the result of a completed task, which can spawn additional tasks
//! - `TaskChannel`: communication channel between the owning thread and one worker
//!
//! Each worker is a `std::thread` with a dedicated pair of `mpsc` channels. Tasks are handed
//! out round-robin, at most `MAX_TASKS_IN_FLIGHT` per worker; the rest wait in a FIFO queue.
//! Results are applied on the owning thread in `process_completed_tasks()`.
//!
//! With zero workers every task runs inline inside `publish_task()` and its result waits for
//! the next `process_completed_tasks()`, which keeps single-threaded runs deterministic.
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks and return results
//! 4. Results are handled in `process_completed_tasks()` or `wait_for_idle()`
//! 5. Results can spawn new tasks
//!
//! ## Example Usage
//! ```ignore
//! let mut task_manager = TaskManager::new(num_workers);
//! task_manager.publish_task(Box::new(AreaGenerationTask::new(generator.clone(), position)));
//!
//! // Phase barrier: every published task and its follow-ups are handled on return.
//! task_manager.wait_for_idle(&mut context);
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{error, info};
use task::{Task, TaskContext, TaskResult};

/// A communication channel between the owning thread and a worker thread.
///
/// # Fields
/// - `task_sender`: sends tasks to the worker
/// - `result_receiver`: receives task results from the worker
/// - `num_tasks_in_flight`: number of tasks sent but not yet answered
/// - `alive`: cleared once the worker is found disconnected
/// - `_worker`: handle to the worker thread
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    alive: bool,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// Worker threads exit when the manager is dropped and their task channel closes. A worker
/// that dies (a panicking task) is marked dead; its remaining work runs inline from then on.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    inline_results: VecDeque<Box<dyn TaskResult + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Kept at 1 so a slow task never holds other work hostage behind it.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with `num_workers` worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create. `0` executes tasks inline.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        if num_workers > 0 {
            info!(
                "Starting {} workers, available parallelism: {:?}",
                num_workers,
                thread::available_parallelism()
            );
        }

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                alive: true,
                _worker: worker,
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            inline_results: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of live worker threads.
    pub fn num_workers(&self) -> usize {
        self.channels.iter().filter(|channel| channel.alive).count()
    }

    /// Returns `true` when no task is queued, running, or waiting to be handled.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty()
            && self.inline_results.is_empty()
            && self
                .channels
                .iter()
                .all(|channel| channel.num_tasks_in_flight == 0)
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was sent; the in-flight counter is incremented
    /// - `Err(task)` if the worker is gone; the channel is marked dead
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        let channel = &mut self.channels[channel_idx];
        match channel.task_sender.send(task) {
            Ok(_) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => {
                error!("Worker {} disconnected", channel_idx);
                channel.alive = false;
                Err(task.0)
            }
        }
    }

    /// Finds a live worker channel that can accept a new task, round-robin from the last
    /// used one.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|step| (self.current_channel + step) % count)
            .find(|&idx| {
                let channel = &self.channels[idx];
                channel.alive && channel.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT
            })
    }

    fn has_live_workers(&self) -> bool {
        self.channels.iter().any(|channel| channel.alive)
    }

    fn run_inline(&mut self, task: Box<dyn Task + Send>) {
        let result = task.process();
        self.inline_results.push_back(result);
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was handed to a worker (or ran inline)
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        if !self.has_live_workers() {
            self.run_inline(task);
            return true;
        }

        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => self.publish_task(task),
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks to workers until the queue is empty or every worker is busy.
    pub fn process_queued_tasks(&mut self) {
        while let Some(task) = self.queued_tasks.pop_front() {
            if !self.has_live_workers() {
                self.run_inline(task);
                continue;
            }
            let Some(channel_idx) = self.find_available_channel() else {
                self.queued_tasks.push_front(task);
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => self.queued_tasks.push_front(task),
            }
        }
    }

    /// Handles every result that is already available, without blocking.
    ///
    /// Follow-up tasks returned by the results are published afterwards.
    pub fn process_completed_tasks(&mut self, context: &mut TaskContext<'_>) {
        let mut tasks_to_queue = Vec::new();

        while let Some(result) = self.inline_results.pop_front() {
            tasks_to_queue.extend(result.handle_result(context));
        }

        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight -= 1;
                tasks_to_queue.extend(result.handle_result(context));
            }
        }

        for task in tasks_to_queue {
            self.publish_task(task);
        }
    }

    /// Blocks until every published task, and every task they spawn, has been handled.
    pub fn wait_for_idle(&mut self, context: &mut TaskContext<'_>) {
        loop {
            self.process_completed_tasks(context);
            self.process_queued_tasks();
            if self.is_idle() {
                return;
            }

            let mut follow_ups = Vec::new();
            if let Some(channel) = self
                .channels
                .iter_mut()
                .find(|channel| channel.num_tasks_in_flight > 0)
            {
                match channel.result_receiver.recv() {
                    Ok(result) => {
                        channel.num_tasks_in_flight -= 1;
                        follow_ups = result.handle_result(context);
                    }
                    Err(_) => {
                        error!(
                            "Worker died with {} tasks in flight",
                            channel.num_tasks_in_flight
                        );
                        channel.num_tasks_in_flight = 0;
                        channel.alive = false;
                    }
                }
            }

            for task in follow_ups {
                self.publish_task(task);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        rendering::meshing::MeshManager,
        voxels::{area::Area, world::World},
    };
    use cgmath::Point3;

    struct InsertTask {
        position: Point3<i32>,
        chain: u32,
    }

    struct InsertResult {
        area: Area,
        chain: u32,
    }

    impl Task for InsertTask {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            Box::new(InsertResult {
                area: Area::new(self.position, 4),
                chain: self.chain,
            })
        }
    }

    impl TaskResult for InsertResult {
        fn handle_result(
            self: Box<Self>,
            context: &mut TaskContext<'_>,
        ) -> Vec<Box<dyn Task + Send>> {
            let next = self.area.position + cgmath::Vector3::new(0, 1, 0);
            context.world.insert_area(self.area);
            if self.chain > 0 {
                vec![Box::new(InsertTask {
                    position: next,
                    chain: self.chain - 1,
                })]
            } else {
                Vec::new()
            }
        }
    }

    fn run(num_workers: usize) -> World {
        let mut world = World::new(4);
        let mut meshes = MeshManager::default();
        let mut manager = TaskManager::new(num_workers);
        for x in 0..6 {
            manager.publish_task(Box::new(InsertTask {
                position: Point3::new(x, 0, 0),
                chain: 2,
            }));
        }
        let mut context = TaskContext {
            world: &mut world,
            meshes: &mut meshes,
        };
        manager.wait_for_idle(&mut context);
        assert!(manager.is_idle());
        world
    }

    #[test]
    fn inline_execution_handles_follow_ups() {
        let world = run(0);
        assert_eq!(world.len(), 18);
    }

    #[test]
    fn worker_pool_handles_follow_ups() {
        let world = run(3);
        assert_eq!(world.len(), 18);
        for x in 0..6 {
            for y in 0..3 {
                assert!(world.contains(Point3::new(x, y, 0)));
            }
        }
    }
}
