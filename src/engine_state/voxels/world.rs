//! # World Module
//!
//! This module provides the `World` struct, the area store and neighbor graph.
//!
//! ## Architecture
//!
//! Areas live in an arena (`Vec<Area>`) and are addressed by `AreaId`. A hash map from area-grid
//! coordinates to ids gives O(1) amortized lookup. Areas are never removed, so ids and neighbor
//! links stay valid forever.
//!
//! Neighbor links are stored in each area as `[Option<AreaId>; 6]` indexed by `Direction`.
//! They are established once, when the later of two adjacent areas is inserted, and always in
//! both directions.

use std::collections::HashMap;

use cgmath::{Point3, Vector3};
use log::{trace, warn};

use super::{
    area::{Area, AreaId},
    block::{block_type::BlockType, direction::Direction},
};

/// The area store and neighbor graph.
pub struct World {
    areas: Vec<Area>,
    lookup: HashMap<Point3<i32>, AreaId>,
    area_size: usize,
    newly_spawned: Vec<AreaId>,
}

impl World {
    /// Creates an empty world whose areas have side length `area_size`.
    pub fn new(area_size: usize) -> Self {
        World {
            areas: Vec::new(),
            lookup: HashMap::new(),
            area_size,
            newly_spawned: Vec::new(),
        }
    }

    /// Side length `N` of every area.
    pub fn area_size(&self) -> usize {
        self.area_size
    }

    /// Number of areas.
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Returns `true` if no area exists yet.
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Finds the area at an area-grid coordinate.
    pub fn locate(&self, position: Point3<i32>) -> Option<AreaId> {
        self.lookup.get(&position).copied()
    }

    /// Returns `true` if an area exists at the area-grid coordinate.
    pub fn contains(&self, position: Point3<i32>) -> bool {
        self.lookup.contains_key(&position)
    }

    /// Area by id.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this world.
    pub fn area(&self, id: AreaId) -> &Area {
        &self.areas[id]
    }

    /// Mutable area by id.
    pub fn area_mut(&mut self, id: AreaId) -> &mut Area {
        &mut self.areas[id]
    }

    /// Area at an area-grid coordinate.
    pub fn area_at(&self, position: Point3<i32>) -> Option<&Area> {
        self.locate(position).map(|id| &self.areas[id])
    }

    /// Iterates every area with its id, in creation order.
    pub fn areas(&self) -> impl Iterator<Item = (AreaId, &Area)> {
        self.areas.iter().enumerate()
    }

    /// Ids of every area, in creation order.
    pub fn area_ids(&self) -> std::ops::Range<AreaId> {
        0..self.areas.len()
    }

    /// Inserts a freshly generated area and links it into the neighbor graph.
    ///
    /// If an area already exists at the same coordinate the new one is dropped and the
    /// existing id is returned.
    pub fn insert_area(&mut self, area: Area) -> AreaId {
        if let Some(existing) = self.locate(area.position) {
            warn!("Area {:?} generated twice, keeping the first", area.position);
            return existing;
        }

        let id = self.areas.len();
        self.lookup.insert(area.position, id);
        self.areas.push(area);
        self.newly_spawned.push(id);
        self.link_new_area(id);
        id
    }

    /// Wires the links between a new area and every existing axis-adjacent area.
    ///
    /// Existing neighbors are marked for remeshing since their shared boundary changed, and
    /// their parked structures are given another chance.
    fn link_new_area(&mut self, id: AreaId) {
        let position = self.areas[id].position;
        for direction in Direction::all() {
            let Some(neighbor) = self.locate(position + direction.offset()) else {
                continue;
            };
            self.areas[id].set_neighbor(direction, neighbor);

            let neighbor_area = &mut self.areas[neighbor];
            neighbor_area.set_neighbor(direction.opposite(), id);
            neighbor_area.needs_remesh = true;
            neighbor_area.structures.revive_stalled();

            trace!(
                "Linked area {:?} to {:?} along {:?}",
                position,
                neighbor_area.position,
                direction
            );
        }
    }

    /// Clears the "newly spawned" flag of the areas created during the previous tick.
    pub fn clear_spawn_flags(&mut self) {
        for id in self.newly_spawned.drain(..) {
            self.areas[id].newly_spawned = false;
        }
    }

    /// Ids of the areas created since the spawn flags were last cleared.
    pub fn newly_spawned(&self) -> &[AreaId] {
        &self.newly_spawned
    }

    /// Area-grid coordinate of the area containing a world block coordinate.
    pub fn area_position_of(&self, world: Point3<i32>) -> Point3<i32> {
        let n = self.area_size as i32;
        Point3::new(world.x.div_euclid(n), world.y.div_euclid(n), world.z.div_euclid(n))
    }

    /// Id of the area containing a world block coordinate, if it exists.
    pub fn area_containing(&self, world: Point3<i32>) -> Option<AreaId> {
        self.locate(self.area_position_of(world))
    }

    /// Splits a world block coordinate into its area-grid coordinate and local position.
    pub fn split_world(&self, world: Point3<i32>) -> (Point3<i32>, Point3<i32>) {
        let n = self.area_size as i32;
        (
            self.area_position_of(world),
            Point3::new(world.x.rem_euclid(n), world.y.rem_euclid(n), world.z.rem_euclid(n)),
        )
    }

    /// World block coordinate of a local position inside an area.
    pub fn world_position(&self, id: AreaId, local: Point3<i32>) -> Point3<i32> {
        self.areas[id].world_origin() + Vector3::new(local.x, local.y, local.z)
    }

    /// Translates a local position that may lie outside its area into the frame of the area
    /// that actually holds it, walking neighbor links one axis at a time.
    ///
    /// Returns `None` as soon as a required neighbor does not exist.
    pub fn resolve(&self, mut id: AreaId, mut local: Point3<i32>) -> Option<(AreaId, Point3<i32>)> {
        let n = self.area_size as i32;
        for axis in 0..3 {
            while local[axis] < 0 {
                id = self.areas[id].neighbor(Direction::from_axis(axis, false))?;
                local[axis] += n;
            }
            while local[axis] >= n {
                id = self.areas[id].neighbor(Direction::from_axis(axis, true))?;
                local[axis] -= n;
            }
        }
        Some((id, local))
    }

    /// Resolves a local position to an area and flat block index.
    pub fn resolve_index(&self, id: AreaId, local: Point3<i32>) -> Option<(AreaId, usize)> {
        self.resolve(id, local)
            .map(|(owner, local)| (owner, self.areas[owner].index(local)))
    }

    /// Finds the area and flat index holding a world block coordinate.
    pub fn locate_block(&self, world: Point3<i32>) -> Option<(AreaId, usize)> {
        let (position, local) = self.split_world(world);
        let id = self.locate(position)?;
        Some((id, self.areas[id].index(local)))
    }

    /// Block at a world coordinate, if its area exists.
    pub fn block_at(&self, world: Point3<i32>) -> Option<BlockType> {
        self.locate_block(world)
            .map(|(id, index)| self.areas[id].block(index))
    }

    /// Block at an offset from a local position, following neighbor links.
    pub fn block_at_offset(
        &self,
        id: AreaId,
        local: Point3<i32>,
        offset: Vector3<i32>,
    ) -> Option<BlockType> {
        self.resolve_index(id, local + offset)
            .map(|(owner, index)| self.areas[owner].block(index))
    }
}
