//! Greedy meshing implementation for voxel rendering.
//!
//! For each of the six face directions the area is swept with the run axis innermost. At every
//! uncovered solid block whose face is visible, a run is extended along the run axis while the
//! block type stays the same and the face stays visible. Every merged cell is marked in the
//! direction's visited bitmap, and each run becomes one quad.
//!
//! A face is visible when the cell it points into is air. At the area boundary that cell lives
//! in the neighbor area; a missing neighbor counts as air.
//!
//! Blocks reached by the last power pass are drawn as their "on" variant.

use std::sync::Arc;

use bitvec::prelude::BitVec;
use cgmath::Point3;
use log::trace;
use web_time::Instant;

use crate::engine_state::{
    rendering::meshing::scratch::VisitedScratch,
    voxels::{
        area::AreaId,
        block::{block_type::BlockType, direction::Direction},
        world::World,
    },
};

use super::{
    face::{run_axis, Face},
    mesh::{AreaMesh, MeshBuffers},
};

/// Read-only copy of one area and its neighbors, taken for a mesh worker.
///
/// Block arrays are shared with the world copy-on-write, so taking a snapshot is cheap and
/// later edits never show through.
#[derive(Debug, Clone)]
pub struct AreaSnapshot {
    /// Grid position of the area.
    pub position: Point3<i32>,
    /// Side length of the area.
    pub size: usize,
    /// The area's blocks.
    pub blocks: Arc<Vec<BlockType>>,
    /// Power bits of the area's blocks.
    pub powered: BitVec,
    /// Blocks of each existing neighbor, indexed by `Direction`.
    pub neighbors: [Option<Arc<Vec<BlockType>>>; 6],
}

impl AreaSnapshot {
    /// Snapshots area `id` and its linked neighbors.
    pub fn capture(world: &World, id: AreaId) -> Self {
        let area = world.area(id);
        let neighbors = *area.neighbors();
        AreaSnapshot {
            position: area.position,
            size: area.size(),
            blocks: area.snapshot(),
            powered: area.powered_bits().clone(),
            neighbors: neighbors.map(|neighbor| neighbor.map(|id| world.area(id).snapshot())),
        }
    }

    fn index(&self, local: Point3<i32>) -> usize {
        let n = self.size as i32;
        (local.y + local.x * n + local.z * n * n) as usize
    }

    fn contains(&self, local: Point3<i32>) -> bool {
        let n = self.size as i32;
        (0..n).contains(&local.x) && (0..n).contains(&local.y) && (0..n).contains(&local.z)
    }

    /// Block type drawn at `index`.
    pub fn shown(&self, index: usize) -> BlockType {
        let block = self.blocks[index];
        match block.logic_traits() {
            Some(traits) if self.powered[index] => traits.on_state,
            _ => block,
        }
    }

    /// Whether the face of the block at `local` pointing along `direction` can be seen.
    pub fn face_visible(&self, local: Point3<i32>, direction: Direction) -> bool {
        let next = local + direction.offset();
        if self.contains(next) {
            return self.blocks[self.index(next)].is_air();
        }

        let Some(neighbor) = &self.neighbors[direction as usize] else {
            return true;
        };
        let n = self.size as i32;
        let wrapped = Point3::new(
            next.x.rem_euclid(n),
            next.y.rem_euclid(n),
            next.z.rem_euclid(n),
        );
        neighbor
            .get(self.index(wrapped))
            .map_or(true, |block| block.is_air())
    }
}

/// Meshes one area.
///
/// `scratch` must have been reset to the area's volume.
pub fn greedy(snapshot: &AreaSnapshot, scratch: &mut VisitedScratch) -> AreaMesh {
    let start = Instant::now();
    let n = snapshot.size as i32;
    let mut buffers = MeshBuffers::default();

    for direction in Direction::all() {
        let d = direction as usize;
        let run = run_axis(direction);
        let outer_a = (run + 1) % 3;
        let outer_b = (run + 2) % 3;

        for a in 0..n {
            for b in 0..n {
                let cell = |r: i32| {
                    let mut local = Point3::new(0, 0, 0);
                    local[run] = r;
                    local[outer_a] = a;
                    local[outer_b] = b;
                    local
                };

                let mut r = 0;
                while r < n {
                    let origin = cell(r);
                    let index = snapshot.index(origin);
                    let block = snapshot.shown(index);
                    if block.is_air()
                        || scratch.is_visited(d, index)
                        || !snapshot.face_visible(origin, direction)
                    {
                        r += 1;
                        continue;
                    }

                    let mut length = 0;
                    while r < n {
                        let local = cell(r);
                        let index = snapshot.index(local);
                        if snapshot.shown(index) != block
                            || scratch.is_visited(d, index)
                            || !snapshot.face_visible(local, direction)
                        {
                            break;
                        }
                        scratch.visit(d, index);
                        length += 1;
                        r += 1;
                    }

                    buffers.push_face(&Face {
                        origin,
                        length,
                        direction,
                        block,
                    });
                }
            }
        }
    }

    let mesh = buffers.finish(snapshot.position);
    trace!(
        "Meshed area {:?}: {} quads in {:?}",
        snapshot.position,
        mesh.quad_count,
        start.elapsed()
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        rendering::meshing::scratch::ScratchPool,
        voxels::area::Area,
    };

    fn mesh(world: &World, id: AreaId) -> AreaMesh {
        let snapshot = AreaSnapshot::capture(world, id);
        let pool = ScratchPool::default();
        let mut scratch = pool.acquire(snapshot.size.pow(3));
        greedy(&snapshot, &mut scratch)
    }

    fn quads_facing(mesh: &AreaMesh, direction: Direction) -> usize {
        mesh.vertices
            .chunks(4)
            .filter(|quad| quad[0].normal() == Some(direction))
            .count()
    }

    fn solid_area(position: Point3<i32>) -> Area {
        let mut area = Area::new(position, 16);
        for index in 0..area.volume() {
            area.set_block(index, BlockType::STONE);
        }
        area
    }

    #[test]
    fn single_block_has_six_faces() {
        let mut world = World::new(16);
        let id = world.insert_area(Area::new(Point3::new(0, 0, 0), 16));
        world.write_block(id, 0, BlockType::DIRT);
        let mesh = mesh(&world, id);
        assert_eq!(mesh.quad_count, 6);
        for direction in Direction::all() {
            assert_eq!(quads_facing(&mesh, direction), 1);
        }
    }

    #[test]
    fn column_merges_into_runs() {
        let mut world = World::new(16);
        let id = world.insert_area(Area::new(Point3::new(0, 0, 0), 16));
        for y in 0..16 {
            let index = world.area(id).index(Point3::new(4, y, 4));
            world.write_block(id, index, BlockType::WOOD);
        }
        let mesh = mesh(&world, id);
        // four sides as one run each, plus top and bottom
        assert_eq!(mesh.quad_count, 6);
    }

    #[test]
    fn different_types_break_runs() {
        let mut world = World::new(16);
        let id = world.insert_area(Area::new(Point3::new(0, 0, 0), 16));
        world.write_block(id, 0, BlockType::STONE);
        world.write_block(id, 1, BlockType::DIRT);
        let mesh = mesh(&world, id);
        assert_eq!(quads_facing(&mesh, Direction::XN), 2);
        assert_eq!(quads_facing(&mesh, Direction::YP), 1);
        assert_eq!(quads_facing(&mesh, Direction::YN), 1);
    }

    #[test]
    fn linked_solid_neighbor_hides_the_shared_boundary() {
        let mut world = World::new(16);
        let id = world.insert_area(solid_area(Point3::new(0, 0, 0)));
        let alone = mesh(&world, id);
        assert_eq!(quads_facing(&alone, Direction::XP), 16);

        world.insert_area(solid_area(Point3::new(1, 0, 0)));
        let linked = mesh(&world, id);
        assert_eq!(quads_facing(&linked, Direction::XP), 0);
        assert_eq!(alone.quad_count - linked.quad_count, 16);

        let other = mesh(&world, 1);
        assert_eq!(quads_facing(&other, Direction::XN), 0);
    }

    #[test]
    fn powered_wires_are_drawn_lit() {
        let mut world = World::new(16);
        let id = world.insert_area(Area::new(Point3::new(0, 0, 0), 16));
        world.write_block(id, 0, BlockType::OFF_WIRE);
        world.write_block(id, 1, BlockType::OFF_WIRE);
        world.area_mut(id).set_powered(1, true);

        let mesh = mesh(&world, id);
        let lit = BlockType::ON_WIRE.texture_index(Direction::XN);
        let dark = BlockType::OFF_WIRE.texture_index(Direction::XN);
        let side_textures: Vec<u8> = mesh
            .vertices
            .chunks(4)
            .filter(|quad| quad[0].normal() == Some(Direction::XN))
            .map(|quad| quad[0].texture_index())
            .collect();
        // the power bit splits the column into two runs
        assert_eq!(side_textures.len(), 2);
        assert!(side_textures.contains(&lit));
        assert!(side_textures.contains(&dark));
    }

    #[test]
    fn vertices_stay_inside_the_area_bounds() {
        let mut world = World::new(16);
        let id = world.insert_area(solid_area(Point3::new(0, 0, 0)));
        let mesh = mesh(&world, id);
        assert!(mesh
            .vertices
            .iter()
            .all(|vertex| vertex.x() <= 16 && vertex.y() <= 16 && vertex.z() <= 16));
        assert_eq!(mesh.indices.len(), mesh.quad_count * 6);
    }
}
