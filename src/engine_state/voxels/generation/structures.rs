//! # Structure Placement
//!
//! Structures are queued against the area holding their root, with extents large enough for
//! any shape they can roll. Each tick every area with queued structures tries to place them:
//!
//! 1. If the structure's box crosses a face of the area whose neighbor does not exist yet, the
//!    record is put back unchanged and retried next tick.
//! 2. Otherwise the box is clipped to the area. Each clipped-off slab becomes a new record in
//!    the neighbor's frame (its origin offset keeps pointing at the original root) and joins the
//!    neighbor's queue for the next tick.
//! 3. The locally owned sub-volume is written.
//!
//! Writes are order independent (wood overwrites, leaves only fill air), so the final layout
//! does not depend on the order in which neighbors appear.
//!
//! A record that keeps waiting past its retry budget is parked as stalled and counted. Parked
//! records are re-queued with a fresh budget when a new neighbor links to their area.

use std::collections::VecDeque;

use cgmath::{Point3, Vector3};
use log::{trace, warn};

use crate::engine_state::voxels::{
    area::{Area, AreaId},
    block::{block_type::BlockType, direction::Direction},
    world::World,
};

use super::TerrainGenerator;

/// The kinds of structure the generator can place.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StructureKind {
    /// A tree rooted on the terrain surface.
    Tree,
}

/// A pending structure, or the part of one that falls into a single area.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructureRecord {
    /// Anchor position in the local frame of the queueing area.
    pub base: Point3<i32>,
    /// Extent of the box below the anchor on each axis.
    pub negative_extent: Vector3<i32>,
    /// Extent of the box above the anchor on each axis.
    pub positive_extent: Vector3<i32>,
    /// Offset from the anchor to the structure's root.
    pub origin_offset: Vector3<i32>,
    /// What to build.
    pub kind: StructureKind,
    /// Seed of the shape noise.
    pub seed: u8,
    retries: u32,
}

impl StructureRecord {
    /// A record whose anchor is the structure's root.
    pub fn new(
        kind: StructureKind,
        seed: u8,
        base: Point3<i32>,
        negative_extent: Vector3<i32>,
        positive_extent: Vector3<i32>,
    ) -> Self {
        StructureRecord {
            base,
            negative_extent,
            positive_extent,
            origin_offset: Vector3::new(0, 0, 0),
            kind,
            seed,
            retries: 0,
        }
    }

    /// Builds the record covering `[min, max]` for a structure rooted at `origin`.
    fn from_box(
        kind: StructureKind,
        seed: u8,
        origin: Point3<i32>,
        min: Point3<i32>,
        max: Point3<i32>,
    ) -> Self {
        let base = Point3::new(
            origin.x.clamp(min.x, max.x),
            origin.y.clamp(min.y, max.y),
            origin.z.clamp(min.z, max.z),
        );
        StructureRecord {
            base,
            negative_extent: base - min,
            positive_extent: max - base,
            origin_offset: origin - base,
            kind,
            seed,
            retries: 0,
        }
    }

    /// The structure's root in the local frame.
    pub fn origin(&self) -> Point3<i32> {
        self.base + self.origin_offset
    }

    /// Lowest corner of the box, inclusive.
    pub fn min_corner(&self) -> Point3<i32> {
        self.base - self.negative_extent
    }

    /// Highest corner of the box, inclusive.
    pub fn max_corner(&self) -> Point3<i32> {
        self.base + self.positive_extent
    }

    /// Ticks this record has waited for a neighbor.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Returns `true` if both records describe the same box of the same structure.
    pub fn same_placement(&self, other: &StructureRecord) -> bool {
        StructureRecord {
            retries: 0,
            ..self.clone()
        } == StructureRecord {
            retries: 0,
            ..other.clone()
        }
    }

    /// First face the box crosses whose neighbor does not exist.
    pub fn missing_neighbor(&self, area: &Area) -> Option<Direction> {
        let n = area.size() as i32;
        let (min, max) = (self.min_corner(), self.max_corner());
        (0..3)
            .flat_map(|axis| {
                [
                    (min[axis] < 0).then(|| Direction::from_axis(axis, false)),
                    (max[axis] >= n).then(|| Direction::from_axis(axis, true)),
                ]
            })
            .flatten()
            .find(|&direction| area.neighbor(direction).is_none())
    }

    /// Clips the box to an area of side `n`.
    ///
    /// Returns the locally owned record and, for every crossed face, the remainder expressed
    /// in the frame of the neighbor across that face. Axes are clipped in X, Y, Z order, so a
    /// corner beyond two faces is handed on through one neighbor to the next.
    pub fn split(&self, n: i32) -> (StructureRecord, Vec<(Direction, StructureRecord)>) {
        let origin = self.origin();
        let (mut min, mut max) = (self.min_corner(), self.max_corner());
        let mut remainders = Vec::new();

        for axis in 0..3 {
            if min[axis] < 0 {
                let (mut rest_min, mut rest_max, mut rest_origin) = (min, max, origin);
                rest_max[axis] = -1;
                rest_min[axis] += n;
                rest_max[axis] += n;
                rest_origin[axis] += n;
                remainders.push((
                    Direction::from_axis(axis, false),
                    StructureRecord::from_box(
                        self.kind,
                        self.seed,
                        rest_origin,
                        rest_min,
                        rest_max,
                    ),
                ));
                min[axis] = 0;
            }
            if max[axis] >= n {
                let (mut rest_min, mut rest_max, mut rest_origin) = (min, max, origin);
                rest_min[axis] = 0;
                rest_max[axis] -= n;
                rest_origin[axis] -= n;
                remainders.push((
                    Direction::from_axis(axis, true),
                    StructureRecord::from_box(
                        self.kind,
                        self.seed,
                        rest_origin,
                        rest_min,
                        rest_max,
                    ),
                ));
                max[axis] = n - 1;
            }
        }

        (
            StructureRecord::from_box(self.kind, self.seed, origin, min, max),
            remainders,
        )
    }
}

/// Structures waiting for placement in one area.
#[derive(Debug, Default)]
pub struct StructureQueue {
    pending: VecDeque<StructureRecord>,
    stalled: Vec<StructureRecord>,
}

impl StructureQueue {
    /// Queues a record for the next placement pass.
    pub fn push(&mut self, record: StructureRecord) {
        self.pending.push_back(record);
    }

    /// Records waiting for the next placement pass.
    pub fn pending(&self) -> impl Iterator<Item = &StructureRecord> {
        self.pending.iter()
    }

    /// Records parked after exhausting their retry budget.
    pub fn stalled(&self) -> impl Iterator<Item = &StructureRecord> {
        self.stalled.iter()
    }

    /// Number of pending records.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of parked records.
    pub fn stalled_len(&self) -> usize {
        self.stalled.len()
    }

    fn take_pending(&mut self) -> VecDeque<StructureRecord> {
        std::mem::take(&mut self.pending)
    }

    fn park(&mut self, record: StructureRecord) {
        self.stalled.push(record);
    }

    /// Moves every parked record back into the pending queue with a fresh retry budget.
    pub fn revive_stalled(&mut self) {
        for mut record in self.stalled.drain(..) {
            record.retries = 0;
            self.pending.push_back(record);
        }
    }
}

/// Outcome of one placement pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StructureStats {
    /// Sub-volumes written.
    pub placed: usize,
    /// Remainders handed to neighbors.
    pub forwarded: usize,
    /// Records put back to wait for a neighbor.
    pub deferred: usize,
    /// Records parked this pass after exhausting their retry budget.
    pub stalled: usize,
}

impl World {
    /// Queues a structure against an area.
    pub fn queue_structure(&mut self, id: AreaId, record: StructureRecord) {
        self.area_mut(id).structures.push(record);
    }

    /// Total number of parked structures across the world.
    pub fn stalled_structure_count(&self) -> usize {
        self.areas().map(|(_, area)| area.stalled_structures()).sum()
    }

    /// Runs one placement pass over every area with queued structures.
    ///
    /// Remainders forwarded during the pass are handled by the next pass.
    pub fn place_structures(
        &mut self,
        generator: &TerrainGenerator,
        max_retries: u32,
    ) -> StructureStats {
        let mut stats = StructureStats::default();
        let n = self.area_size() as i32;

        let mut work: Vec<(AreaId, VecDeque<StructureRecord>)> = Vec::new();
        for id in self.area_ids() {
            if self.area(id).pending_structures() > 0 {
                work.push((id, self.area_mut(id).structures.take_pending()));
            }
        }

        for (id, records) in work {
            for mut record in records {
                if let Some(direction) = record.missing_neighbor(self.area(id)) {
                    record.retries += 1;
                    if record.retries > max_retries {
                        warn!(
                            "{:?} at {:?} in area {:?} stalled waiting for its {:?} neighbor",
                            record.kind,
                            record.origin(),
                            self.area(id).position,
                            direction
                        );
                        self.area_mut(id).structures.park(record);
                        stats.stalled += 1;
                    } else {
                        self.area_mut(id).structures.push(record);
                        stats.deferred += 1;
                    }
                    continue;
                }

                let (local, remainders) = record.split(n);
                for (direction, remainder) in remainders {
                    if let Some(neighbor) = self.area(id).neighbor(direction) {
                        self.area_mut(neighbor).structures.push(remainder);
                        stats.forwarded += 1;
                    }
                }
                self.build_structure(id, &local, generator);
                stats.placed += 1;
            }
        }
        stats
    }

    /// Writes the part of a structure that falls into the record's box.
    fn build_structure(
        &mut self,
        id: AreaId,
        record: &StructureRecord,
        generator: &TerrainGenerator,
    ) {
        let origin = record.origin();
        let world_origin = self.world_position(id, origin);
        let (min, max) = (record.min_corner(), record.max_corner());
        let inside = |p: Point3<i32>| {
            (min.x..=max.x).contains(&p.x)
                && (min.y..=max.y).contains(&p.y)
                && (min.z..=max.z).contains(&p.z)
        };

        let mut changed = false;
        let area = self.area_mut(id);
        for (offset, block) in generator.structure_voxels(record.kind, world_origin, record.seed) {
            let local = origin + offset;
            if !inside(local) || !area.contains_local(local) {
                continue;
            }
            let index = area.index(local);
            let current = area.block(index);
            let write = match block {
                BlockType::LEAVES => current.is_air(),
                _ => current != block,
            };
            if write {
                let previous = area.set_block(index, block);
                // the next logic tick re-classifies overwritten circuit blocks
                if previous.logic_traits().is_some() {
                    area.record_edit(index);
                }
                changed = true;
            }
        }

        if changed {
            self.mark_remesh_with_neighbors(id);
        }
        trace!(
            "Placed {:?} sub-volume {:?}..={:?} rooted at {:?}",
            record.kind,
            min,
            max,
            world_origin
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_at(base: Point3<i32>) -> StructureRecord {
        StructureRecord::new(
            StructureKind::Tree,
            9,
            base,
            Vector3::new(3, 0, 3),
            Vector3::new(3, 6, 3),
        )
    }

    #[test]
    fn interior_records_do_not_split() {
        let record = tree_at(Point3::new(8, 2, 8));
        let (local, remainders) = record.split(16);
        assert!(remainders.is_empty());
        assert!(local.same_placement(&record));
    }

    #[test]
    fn crossing_positive_x_forwards_the_slab() {
        let record = tree_at(Point3::new(15, 5, 8));
        let (local, remainders) = record.split(16);

        assert_eq!(local.min_corner(), Point3::new(12, 5, 5));
        assert_eq!(local.max_corner(), Point3::new(15, 11, 11));
        assert_eq!(local.origin(), Point3::new(15, 5, 8));

        assert_eq!(remainders.len(), 1);
        let (direction, rest) = &remainders[0];
        assert_eq!(*direction, Direction::XP);
        assert_eq!(rest.min_corner(), Point3::new(0, 5, 5));
        assert_eq!(rest.max_corner(), Point3::new(2, 11, 11));
        assert_eq!(rest.origin(), Point3::new(-1, 5, 8));
        assert_eq!(rest.origin_offset, Vector3::new(-1, 0, 0));
    }

    #[test]
    fn corners_are_handed_on_axis_by_axis() {
        let record = tree_at(Point3::new(1, 3, 14));
        let (local, remainders) = record.split(16);
        assert_eq!(local.min_corner(), Point3::new(0, 3, 11));
        assert_eq!(local.max_corner(), Point3::new(4, 9, 15));

        let directions: Vec<_> = remainders.iter().map(|(d, _)| *d).collect();
        assert_eq!(directions, vec![Direction::XN, Direction::ZP]);

        // the XN slab still carries the full Z range and splits again over there
        let (_, west) = &remainders[0];
        assert_eq!(west.min_corner(), Point3::new(14, 3, 11));
        assert_eq!(west.max_corner(), Point3::new(15, 9, 17));
        // the ZP slab only covers the X range kept locally
        let (_, north) = &remainders[1];
        assert_eq!(north.min_corner(), Point3::new(0, 3, 0));
        assert_eq!(north.max_corner(), Point3::new(4, 9, 1));
        assert_eq!(north.origin(), Point3::new(1, 3, -2));
    }

    #[test]
    fn missing_neighbor_reports_crossed_faces_only() {
        let area = Area::new(Point3::new(0, 0, 0), 16);
        assert_eq!(tree_at(Point3::new(8, 2, 8)).missing_neighbor(&area), None);
        assert_eq!(
            tree_at(Point3::new(15, 5, 8)).missing_neighbor(&area),
            Some(Direction::XP)
        );
        assert_eq!(
            tree_at(Point3::new(8, 12, 8)).missing_neighbor(&area),
            Some(Direction::YP)
        );
    }

    #[test]
    fn revive_resets_the_retry_budget() {
        let mut queue = StructureQueue::default();
        let mut record = tree_at(Point3::new(0, 0, 0));
        record.retries = 7;
        queue.park(record);
        assert_eq!((queue.pending_len(), queue.stalled_len()), (0, 1));
        queue.revive_stalled();
        assert_eq!((queue.pending_len(), queue.stalled_len()), (1, 0));
        assert_eq!(queue.pending().next().unwrap().retries(), 0);
    }
}
