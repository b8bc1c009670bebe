//! # Area Module
//!
//! This module provides the `Area` struct: a cube of `N`×`N`×`N` blocks, the unit of storage,
//! meshing and neighbor linking.
//!
//! ## Layout
//!
//! Blocks are stored in a flat array at `idx = y + x·N + z·N²`, so a vertical column is
//! contiguous in memory. The array sits behind an `Arc` and is copied on write, which lets mesh
//! workers hold read-only snapshots of an area and its neighbors while the simulation keeps
//! editing.
//!
//! Alongside the blocks every area carries:
//! - six optional neighbor links, indexed by `Direction`
//! - the per-column heightmap
//! - the circuit medium: stored logic state, power bit and output direction per block
//! - the queue of structures waiting to be placed into it
//! - the list of block indices edited since the last circuit tick

pub mod heightmap;

use std::sync::Arc;

use bitvec::prelude::BitVec;
use cgmath::Point3;
use log::error;

use crate::engine_state::error::{TerrainError, TerrainResult};

use super::{
    block::{block_type::BlockType, direction::Direction},
    generation::structures::StructureQueue,
};
use heightmap::ColumnHeightmap;

/// Index of an area inside the world's arena. Areas are never removed, so an id stays valid
/// for the lifetime of the world.
pub type AreaId = usize;

/// The default side length of an area in blocks.
pub const DEFAULT_AREA_SIZE: usize = 16;

/// A cube of blocks at a fixed position of the area grid.
pub struct Area {
    /// Position in area-grid coordinates (units of `N` blocks).
    pub position: Point3<i32>,
    size: usize,
    blocks: Arc<Vec<BlockType>>,
    neighbors: [Option<AreaId>; 6],
    /// Set when the area is created, cleared at the start of the following tick.
    pub newly_spawned: bool,
    /// Set whenever the surface geometry must be rebuilt.
    pub needs_remesh: bool,
    heightmap: ColumnHeightmap,
    logic_state: BitVec,
    powered: BitVec,
    output_directions: Vec<Direction>,
    pub(crate) structures: StructureQueue,
    edited: Vec<usize>,
}

impl Area {
    /// Creates an area filled with air.
    pub fn new(position: Point3<i32>, size: usize) -> Self {
        Area::from_parts(
            position,
            size,
            vec![BlockType::AIR; size * size * size],
            ColumnHeightmap::empty(size),
        )
    }

    /// Creates an area from a filled block array and its matching heightmap.
    pub fn from_parts(
        position: Point3<i32>,
        size: usize,
        blocks: Vec<BlockType>,
        heightmap: ColumnHeightmap,
    ) -> Self {
        let volume = size * size * size;
        debug_assert_eq!(blocks.len(), volume);
        Area {
            position,
            size,
            blocks: Arc::new(blocks),
            neighbors: [None; 6],
            newly_spawned: true,
            needs_remesh: true,
            heightmap,
            logic_state: BitVec::repeat(false, volume),
            powered: BitVec::repeat(false, volume),
            output_directions: vec![Direction::default(); volume],
            structures: StructureQueue::default(),
            edited: Vec::new(),
        }
    }

    /// Side length `N`.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of blocks, `N³`.
    #[inline]
    pub fn volume(&self) -> usize {
        self.blocks.len()
    }

    /// World coordinate of the block at local `(0, 0, 0)`.
    pub fn world_origin(&self) -> Point3<i32> {
        let n = self.size as i32;
        Point3::new(self.position.x * n, self.position.y * n, self.position.z * n)
    }

    /// Returns `true` if `local` lies inside the `[0, N)` cube.
    #[inline]
    pub fn contains_local(&self, local: Point3<i32>) -> bool {
        let n = self.size as i32;
        (0..n).contains(&local.x) && (0..n).contains(&local.y) && (0..n).contains(&local.z)
    }

    /// Flat index of an in-bounds local position.
    #[inline]
    pub fn index(&self, local: Point3<i32>) -> usize {
        debug_assert!(self.contains_local(local), "local position {local:?} out of bounds");
        let n = self.size;
        local.y as usize + local.x as usize * n + local.z as usize * n * n
    }

    /// Flat index of a local position, rejecting positions outside the cube.
    ///
    /// # Errors
    /// An out-of-bounds position means the caller's addressing arithmetic is wrong; it is
    /// logged and reported as `TerrainError::BlockIndexOutOfBounds`.
    pub fn checked_index(&self, local: Point3<i32>) -> TerrainResult<usize> {
        if self.contains_local(local) {
            Ok(self.index(local))
        } else {
            error!(
                "Block address {:?} outside area {:?} of size {}",
                local, self.position, self.size
            );
            Err(TerrainError::BlockIndexOutOfBounds {
                position: local,
                size: self.size,
            })
        }
    }

    /// Local position of a flat index.
    #[inline]
    pub fn local_position(&self, index: usize) -> Point3<i32> {
        let n = self.size;
        Point3::new(
            ((index / n) % n) as i32,
            (index % n) as i32,
            (index / (n * n)) as i32,
        )
    }

    /// Block at a flat index.
    #[inline]
    pub fn block(&self, index: usize) -> BlockType {
        self.blocks[index]
    }

    /// Block at an in-bounds local position.
    #[inline]
    pub fn block_at(&self, local: Point3<i32>) -> BlockType {
        self.blocks[self.index(local)]
    }

    /// The whole block array.
    pub fn blocks(&self) -> &[BlockType] {
        &self.blocks
    }

    /// A shared read-only snapshot of the block array.
    pub fn snapshot(&self) -> Arc<Vec<BlockType>> {
        Arc::clone(&self.blocks)
    }

    /// Writes a block and keeps the column heightmap current. Returns the previous block.
    ///
    /// Remesh flags are not touched here; writes that must be seen by neighbors go through
    /// the world.
    pub fn set_block(&mut self, index: usize, block: BlockType) -> BlockType {
        let blocks = Arc::make_mut(&mut self.blocks);
        let previous = std::mem::replace(&mut blocks[index], block);
        if previous.is_solid() != block.is_solid() {
            let n = self.size;
            let column_base = index - index % n;
            let local = self.local_position(index);
            let column = self
                .heightmap
                .column_index(local.x as usize, local.z as usize);
            let blocks = &self.blocks;
            self.heightmap.on_block_changed(
                column,
                local.y as usize,
                previous.is_solid(),
                block.is_solid(),
                |y| blocks[column_base + y].is_solid(),
            );
        }
        previous
    }

    /// The column heightmap.
    pub fn heightmap(&self) -> &ColumnHeightmap {
        &self.heightmap
    }

    /// Lowest non-air y of column `(x, z)`, or `N` if empty.
    pub fn column_min(&self, x: usize, z: usize) -> usize {
        self.heightmap.min(self.heightmap.column_index(x, z))
    }

    /// One past the highest non-air y of column `(x, z)`, or `0` if empty.
    pub fn column_max(&self, x: usize, z: usize) -> usize {
        self.heightmap.max(self.heightmap.column_index(x, z))
    }

    /// Neighbor link in `direction`.
    #[inline]
    pub fn neighbor(&self, direction: Direction) -> Option<AreaId> {
        self.neighbors[direction as usize]
    }

    /// All six neighbor links, indexed by `Direction`.
    pub fn neighbors(&self) -> &[Option<AreaId>; 6] {
        &self.neighbors
    }

    pub(crate) fn set_neighbor(&mut self, direction: Direction, neighbor: AreaId) {
        self.neighbors[direction as usize] = Some(neighbor);
    }

    /// Stored boolean circuit state of a block.
    #[inline]
    pub fn logic_state(&self, index: usize) -> bool {
        self.logic_state[index]
    }

    /// Overwrites the stored circuit state of a block.
    #[inline]
    pub fn set_logic_state(&mut self, index: usize, state: bool) {
        self.logic_state.set(index, state);
    }

    /// Whether the last power pass reached this block.
    #[inline]
    pub fn is_powered(&self, index: usize) -> bool {
        self.powered[index]
    }

    /// Power bits of every block, indexed like the block array.
    pub fn powered_bits(&self) -> &BitVec {
        &self.powered
    }

    #[inline]
    pub(crate) fn set_powered(&mut self, index: usize, powered: bool) {
        self.powered.set(index, powered);
    }

    /// Output direction of a gate block.
    #[inline]
    pub fn output_direction(&self, index: usize) -> Direction {
        self.output_directions[index]
    }

    /// Sets the output direction of a gate block.
    pub fn set_output_direction(&mut self, index: usize, direction: Direction) {
        self.output_directions[index] = direction;
    }

    pub(crate) fn record_edit(&mut self, index: usize) {
        self.edited.push(index);
    }

    /// Returns `true` if blocks were edited since the last circuit tick.
    pub fn has_edits(&self) -> bool {
        !self.edited.is_empty()
    }

    pub(crate) fn take_edits(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.edited)
    }

    /// Number of structures waiting to be placed into this area.
    pub fn pending_structures(&self) -> usize {
        self.structures.pending_len()
    }

    /// Number of structures parked after exhausting their retry budget.
    pub fn stalled_structures(&self) -> usize {
        self.structures.stalled_len()
    }
}
