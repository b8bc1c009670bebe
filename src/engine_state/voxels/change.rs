//! # Change Propagation
//!
//! Every block write goes through here so that the column heightmap stays exact and the owning
//! area plus each existing neighbor get flagged for remeshing before the next mesh scan.

use cgmath::Point3;
use log::debug;

use crate::engine_state::error::{TerrainError, TerrainResult};

use super::{
    area::AreaId,
    block::{block_type::BlockType, direction::Direction},
    world::World,
};

/// A block edit request coming from gameplay.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockEdit {
    /// World block coordinate to overwrite.
    pub position: Point3<i32>,
    /// The new block.
    pub block: BlockType,
    /// Output direction for gate blocks. Left unchanged when `None`.
    pub direction: Option<Direction>,
}

impl BlockEdit {
    /// An edit without an output direction.
    pub fn new(position: Point3<i32>, block: BlockType) -> Self {
        BlockEdit {
            position,
            block,
            direction: None,
        }
    }

    /// An edit placing a block facing `direction`.
    pub fn facing(position: Point3<i32>, block: BlockType, direction: Direction) -> Self {
        BlockEdit {
            position,
            block,
            direction: Some(direction),
        }
    }
}

impl World {
    /// Flags an area and every existing neighbor for remeshing.
    pub fn mark_remesh_with_neighbors(&mut self, id: AreaId) {
        let neighbors = *self.area(id).neighbors();
        self.area_mut(id).needs_remesh = true;
        for neighbor in neighbors.into_iter().flatten() {
            self.area_mut(neighbor).needs_remesh = true;
        }
    }

    /// Writes a block and propagates the change. Returns the previous block.
    ///
    /// Writing the block that is already present changes nothing.
    pub fn write_block(&mut self, id: AreaId, index: usize, block: BlockType) -> BlockType {
        let previous = self.area_mut(id).set_block(index, block);
        if previous != block {
            self.mark_remesh_with_neighbors(id);
        }
        previous
    }

    /// Applies a gameplay edit and records it for the next circuit tick.
    ///
    /// # Errors
    /// Returns `TerrainError::AreaNotLoaded` if the target area does not exist yet.
    pub fn apply_edit(&mut self, edit: BlockEdit) -> TerrainResult<BlockType> {
        let (position, local) = self.split_world(edit.position);
        let id = self
            .locate(position)
            .ok_or(TerrainError::AreaNotLoaded(position))?;
        let index = self.area(id).checked_index(local)?;

        if let Some(direction) = edit.direction {
            self.area_mut(id).set_output_direction(index, direction);
        }
        let previous = self.write_block(id, index, edit.block);
        self.area_mut(id).record_edit(index);
        debug!(
            "Edit at {:?}: {:?} -> {:?}",
            edit.position, previous, edit.block
        );
        Ok(previous)
    }
}
