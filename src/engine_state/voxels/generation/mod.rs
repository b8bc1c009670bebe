//! # Generation Pipeline
//!
//! Fills newly spawned areas from a 2-D height noise and queues the structures (trees) rooted in
//! them. Structures that reach into other areas are placed later, see [`structures`].
//!
//! ## Terrain fill
//!
//! For a block at world `(x, y, z)`:
//! - `y <= sea_level` is always solid
//! - above sea level, the noise at `(x, z)` is mapped to `[0, 1]` and interpolated between sea
//!   and sky level into a cutoff height; the block is solid iff `y <= cutoff`
//!
//! Solid blocks are layered: the column's top block is the surface block, a thin band below it
//! is the subsurface block, and everything deeper is the deep block with sparse ores. The column
//! heightmap is accumulated while the blocks are written.

pub mod structures;
pub mod trees;

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use cgmath::{Point3, Vector3};
use noise::{NoiseFn, Perlin};

use crate::engine_state::config::{StructureConfig, TerrainConfig};

use super::{
    area::{heightmap::ColumnHeightmap, Area},
    block::block_type::BlockType,
};
use structures::{StructureKind, StructureRecord};
use trees::TreeShape;

const ORE_SALT: u64 = 0x6f72_6573;
const TREE_SALT: u64 = 0x7472_6565;

/// Deterministic terrain generator shared by all generation workers.
pub struct TerrainGenerator {
    area_size: usize,
    terrain: TerrainConfig,
    structures: StructureConfig,
    noise: Perlin,
}

impl TerrainGenerator {
    /// Creates a generator for areas of side `area_size`.
    pub fn new(area_size: usize, terrain: TerrainConfig, structures: StructureConfig) -> Self {
        let noise = Perlin::new(terrain.seed);
        TerrainGenerator {
            area_size,
            terrain,
            structures,
            noise,
        }
    }

    /// Side length of the areas produced.
    pub fn area_size(&self) -> usize {
        self.area_size
    }

    /// Structure parameters.
    pub fn structure_config(&self) -> &StructureConfig {
        &self.structures
    }

    /// Terrain parameters.
    pub fn terrain_config(&self) -> &TerrainConfig {
        &self.terrain
    }

    /// Height noise at a world column, scaled into `[0, 1]`.
    pub fn height_noise(&self, x: i32, z: i32) -> f64 {
        let frequency = self.terrain.noise_frequency;
        let sample = self.noise.get([x as f64 * frequency, z as f64 * frequency]);
        ((sample + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// World y of the highest solid block of a column.
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        let sea = self.terrain.sea_level as f64;
        let sky = self.terrain.sky_level as f64;
        let cutoff = sea + self.height_noise(x, z) * (sky - sea);
        (cutoff.floor() as i32).max(self.terrain.sea_level)
    }

    /// Block at a world position given the surface height of its column.
    pub fn block_for(&self, world: Point3<i32>, surface: i32) -> BlockType {
        if world.y > surface {
            BlockType::AIR
        } else if world.y == surface {
            self.terrain.surface_block
        } else if world.y >= surface - self.terrain.subsurface_depth {
            self.terrain.subsurface_block
        } else {
            let roll = hash_rng(self.terrain.seed, ORE_SALT, world).f64();
            if roll < self.terrain.gem_chance {
                BlockType::GEM
            } else if roll < self.terrain.gem_chance + self.terrain.tin_chance {
                BlockType::TIN
            } else {
                self.terrain.deep_block
            }
        }
    }

    /// Generates the blocks of the area at `position` and queues the trees rooted in it.
    pub fn generate(&self, position: Point3<i32>) -> Area {
        let n = self.area_size;
        let origin = Point3::new(
            position.x * n as i32,
            position.y * n as i32,
            position.z * n as i32,
        );

        let mut blocks = Vec::with_capacity(n * n * n);
        let mut heightmap = ColumnHeightmap::empty(n);
        let mut trees = Vec::new();

        for z in 0..n {
            for x in 0..n {
                let world_x = origin.x + x as i32;
                let world_z = origin.z + z as i32;
                let surface = self.surface_height(world_x, world_z);
                let column = heightmap.column_index(x, z);

                for y in 0..n {
                    let world = Point3::new(world_x, origin.y + y as i32, world_z);
                    let block = self.block_for(world, surface);
                    if block.is_solid() {
                        heightmap.include(column, y);
                    }
                    blocks.push(block);
                }

                let root_y = surface + 1 - origin.y;
                if (0..n as i32).contains(&root_y) {
                    if let Some(record) =
                        self.roll_tree(Point3::new(x as i32, root_y, z as i32), world_x, world_z)
                    {
                        trees.push(record);
                    }
                }
            }
        }

        let mut area = Area::from_parts(position, n, blocks, heightmap);
        for record in trees {
            area.structures.push(record);
        }
        area
    }

    fn roll_tree(&self, root: Point3<i32>, world_x: i32, world_z: i32) -> Option<StructureRecord> {
        let mut rng = hash_rng(self.terrain.seed, TREE_SALT, Point3::new(world_x, 0, world_z));
        if rng.f64() >= self.structures.tree_chance {
            return None;
        }
        let (negative, positive) = TreeShape::max_extents(&self.structures);
        Some(StructureRecord::new(
            StructureKind::Tree,
            rng.u8(..),
            root,
            negative,
            positive,
        ))
    }

    /// Shape of the tree whose root sits at `world_root`.
    pub fn tree_shape(&self, world_root: Point3<i32>, seed: u8) -> TreeShape {
        let mut rng = hash_rng(self.terrain.seed, TREE_SALT ^ seed as u64, world_root);
        TreeShape::roll(&self.structures, &mut rng)
    }

    /// Voxels of a structure relative to its origin.
    pub fn structure_voxels(
        &self,
        kind: StructureKind,
        world_origin: Point3<i32>,
        seed: u8,
    ) -> Vec<(Vector3<i32>, BlockType)> {
        match kind {
            StructureKind::Tree => self.tree_shape(world_origin, seed).voxels(),
        }
    }
}

/// A random generator seeded from the world seed, a salt and a world position.
pub fn hash_rng(seed: u32, salt: u64, position: Point3<i32>) -> fastrand::Rng {
    let mut hasher = DefaultHasher::new();
    (seed, salt, position.x, position.y, position.z).hash(&mut hasher);
    fastrand::Rng::with_seed(hasher.finish())
}
