//! # Spawn Scheduler
//!
//! Decides which areas must exist. Every tick, the cube of areas within the view range of each
//! observer's containing area is checked against the world; missing coordinates are queued and
//! at most `max_creations_per_tick` of them are handed to generation.
//!
//! Offsets are visited nearest first (Manhattan distance), so the areas closest to an observer
//! are the first ones encountered. Coordinates that did not fit into a tick's budget stay
//! queued for the following ticks.

use std::collections::{HashSet, VecDeque};

use cgmath::{Point3, Vector3};
use log::debug;

use crate::engine_state::config::SpawnConfig;

use super::world::World;

/// An entity whose surroundings must be generated.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Observer {
    /// Caller-defined identifier.
    pub id: u64,
    /// Position in world block units.
    pub position: Point3<f64>,
}

impl Observer {
    /// Creates an observer.
    pub fn new(id: u64, position: Point3<f64>) -> Self {
        Observer { id, position }
    }

    /// World coordinate of the block containing the observer.
    pub fn block_position(&self) -> Point3<i32> {
        Point3::new(
            self.position.x.floor() as i32,
            self.position.y.floor() as i32,
            self.position.z.floor() as i32,
        )
    }
}

/// Queues area coordinates for creation.
pub struct SpawnScheduler {
    max_per_tick: usize,
    offsets: Vec<Vector3<i32>>,
    pending: VecDeque<Point3<i32>>,
    queued: HashSet<Point3<i32>>,
}

impl SpawnScheduler {
    /// Creates a scheduler and queues the initial cube of areas around the origin.
    pub fn new(config: &SpawnConfig) -> Self {
        let mut scheduler = SpawnScheduler {
            max_per_tick: config.max_creations_per_tick,
            offsets: cube_offsets(config.view_range),
            pending: VecDeque::new(),
            queued: HashSet::new(),
        };
        for offset in cube_offsets(config.initial_spawn_extent) {
            scheduler.enqueue(Point3::new(offset.x, offset.y, offset.z));
        }
        scheduler
    }

    fn enqueue(&mut self, position: Point3<i32>) {
        if self.queued.insert(position) {
            self.pending.push_back(position);
        }
    }

    /// Number of coordinates waiting for creation.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Collects the coordinates wanted by `observers` and returns the ones to create this tick.
    pub fn schedule(&mut self, world: &World, observers: &[Observer]) -> Vec<Point3<i32>> {
        for observer in observers {
            let center = world.area_position_of(observer.block_position());
            for index in 0..self.offsets.len() {
                let position = center + self.offsets[index];
                if !world.contains(position) {
                    self.enqueue(position);
                }
            }
        }

        let mut batch = Vec::with_capacity(self.max_per_tick.min(self.pending.len()));
        while batch.len() < self.max_per_tick {
            let Some(position) = self.pending.pop_front() else {
                break;
            };
            self.queued.remove(&position);
            if !world.contains(position) {
                batch.push(position);
            }
        }

        if !batch.is_empty() {
            debug!(
                "Spawning {} areas, {} still queued",
                batch.len(),
                self.pending.len()
            );
        }
        batch
    }
}

/// Offsets of the cube `[-range, range]³`, nearest first.
fn cube_offsets(range: i32) -> Vec<Vector3<i32>> {
    let mut offsets = Vec::with_capacity(((2 * range + 1).pow(3)) as usize);
    for z in -range..=range {
        for y in -range..=range {
            for x in -range..=range {
                offsets.push(Vector3::new(x, y, z));
            }
        }
    }
    offsets.sort_by_key(|offset| offset.x.abs() + offset.y.abs() + offset.z.abs());
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::area::Area;

    fn config(view_range: i32, initial: i32, max: usize) -> SpawnConfig {
        SpawnConfig {
            view_range,
            initial_spawn_extent: initial,
            max_creations_per_tick: max,
        }
    }

    #[test]
    fn offsets_start_at_the_center() {
        let offsets = cube_offsets(2);
        assert_eq!(offsets.len(), 125);
        assert_eq!(offsets[0], Vector3::new(0, 0, 0));
        let distances: Vec<i32> = offsets
            .iter()
            .map(|o| o.x.abs() + o.y.abs() + o.z.abs())
            .collect();
        assert!(distances.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn initial_extent_is_drained_over_several_ticks() {
        let world = World::new(16);
        let mut scheduler = SpawnScheduler::new(&config(0, 1, 10));
        assert_eq!(scheduler.pending_len(), 27);
        assert_eq!(scheduler.schedule(&world, &[]).len(), 10);
        assert_eq!(scheduler.schedule(&world, &[]).len(), 10);
        assert_eq!(scheduler.schedule(&world, &[]).len(), 7);
        assert!(scheduler.schedule(&world, &[]).is_empty());
    }

    #[test]
    fn existing_areas_are_never_requested() {
        let mut world = World::new(16);
        world.insert_area(Area::new(Point3::new(0, 0, 0), 16));
        let mut scheduler = SpawnScheduler::new(&config(1, 0, 100));
        let observer = Observer::new(1, Point3::new(3.5, 2.0, 7.25));
        let batch = scheduler.schedule(&world, &[observer]);
        assert_eq!(batch.len(), 26);
        assert!(!batch.contains(&Point3::new(0, 0, 0)));
    }

    #[test]
    fn overlapping_observers_are_unioned() {
        let world = World::new(16);
        let mut scheduler = SpawnScheduler::new(&config(1, 0, 1000));
        let observers = [
            Observer::new(1, Point3::new(0.0, 0.0, 0.0)),
            Observer::new(2, Point3::new(17.0, 0.0, 0.0)),
        ];
        let batch = scheduler.schedule(&world, &observers);
        // two 3×3×3 cubes offset by one area along X share 18 coordinates
        assert_eq!(batch.len(), 27 + 27 - 18);
        let unique: HashSet<_> = batch.iter().copied().collect();
        assert_eq!(unique.len(), batch.len());
    }

    #[test]
    fn observers_in_negative_space_use_floor() {
        let world = World::new(16);
        let mut scheduler = SpawnScheduler::new(&config(0, 0, 10));
        let batch = scheduler.schedule(&world, &[Observer::new(1, Point3::new(-0.5, 0.0, 0.0))]);
        assert_eq!(batch, vec![Point3::new(-1, 0, 0)]);
    }
}
