//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides functionality for block type identification, conversion and classification
//! into the terrain, vegetation and circuit categories.

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::engine_state::error::{TerrainError, TerrainResult};

use super::{
    direction::Direction, BlockTypeSize, LogicTraits, BLOCK_NAMES, BLOCK_TYPE_TO_TEXTURE_INDICES,
    LOGIC_TRAITS,
};

/// Enumerates all possible block types in the voxel world.
///
/// The discriminants are stable: they key the static lookup tables in the parent module and
/// the `FromPrimitive` derive converts raw bytes back into variants.
#[allow(non_camel_case_types)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// Absence of a block. Non-solid and transparent.
    #[default]
    AIR = 0,
    /// Deep terrain.
    STONE = 1,
    /// Subsurface band below the terrain surface.
    DIRT = 2,
    /// Terrain surface.
    GRASS = 3,
    /// Sparse ore embedded in stone.
    TIN = 4,
    /// Rare ore embedded in stone.
    GEM = 5,
    /// Tree trunks.
    WOOD = 6,
    /// Tree crowns.
    LEAVES = 7,
    /// Unpowered wire.
    OFF_WIRE = 8,
    /// Powered wire.
    ON_WIRE = 9,
    /// Two-input AND gate.
    AND_GATE = 10,
    /// Two-input OR gate.
    OR_GATE = 11,
    /// Two-input XOR gate.
    XOR_GATE = 12,
    /// Single-input inverter.
    NOT_GATE = 13,
    /// Switch in its off position.
    OFF_SWITCH = 14,
    /// Switch in its on position.
    ON_SWITCH = 15,
    /// Unlit lamp.
    OFF_LAMP = 16,
    /// Lit lamp.
    ON_LAMP = 17,
    /// Signal source that toggles every logic tick.
    CLOCK = 18,
}

impl BlockType {
    /// Number of block type variants.
    pub const COUNT: usize = 19;

    /// Converts a raw `BlockTypeSize` into a `BlockType`, if it names a variant.
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    /// Looks a block type up by its lowercase name, e.g. `"off_wire"`.
    ///
    /// # Errors
    /// Returns `TerrainError::UnknownBlock` if the name matches no block type.
    pub fn from_name(name: &str) -> TerrainResult<Self> {
        BLOCK_NAMES
            .get(name)
            .copied()
            .ok_or_else(|| TerrainError::UnknownBlock(name.to_string()))
    }

    /// Returns `true` for the air block.
    #[inline]
    pub fn is_air(self) -> bool {
        self == BlockType::AIR
    }

    /// Returns `true` for every block that occupies its cell.
    #[inline]
    pub fn is_solid(self) -> bool {
        self != BlockType::AIR
    }

    /// Returns the static circuit properties of this block type, if it is a circuit element.
    pub fn logic_traits(self) -> Option<&'static LogicTraits> {
        LOGIC_TRAITS.get(&(self as BlockTypeSize))
    }

    /// Returns `true` for blocks registered as signal sources (switches and clocks).
    pub fn is_input(self) -> bool {
        matches!(
            self,
            BlockType::OFF_SWITCH | BlockType::ON_SWITCH | BlockType::CLOCK
        )
    }

    /// Returns `true` for the four gate types.
    pub fn is_gate(self) -> bool {
        matches!(
            self,
            BlockType::AND_GATE | BlockType::OR_GATE | BlockType::XOR_GATE | BlockType::NOT_GATE
        )
    }

    /// Returns `true` for blocks that carry a signal onward once their state changes.
    pub fn is_conductor(self) -> bool {
        matches!(
            self,
            BlockType::OFF_WIRE | BlockType::ON_WIRE | BlockType::OFF_LAMP | BlockType::ON_LAMP
        )
    }

    /// Returns the texture-unit index used for the face of this block pointing along `direction`.
    pub fn texture_index(self, direction: Direction) -> u8 {
        BLOCK_TYPE_TO_TEXTURE_INDICES[self as usize][direction as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_discriminant_round_trips_through_from_int() {
        for raw in 0..BlockType::COUNT as u8 {
            let block = BlockType::from_int(raw).unwrap();
            assert_eq!(block as u8, raw);
        }
        assert_eq!(BlockType::from_int(BlockType::COUNT as u8), None);
    }

    #[test]
    fn names_resolve_to_blocks() {
        assert_eq!(BlockType::from_name("off_wire").unwrap(), BlockType::OFF_WIRE);
        assert_eq!(BlockType::from_name("clock").unwrap(), BlockType::CLOCK);
        assert!(matches!(
            BlockType::from_name("lava"),
            Err(TerrainError::UnknownBlock(_))
        ));
    }

    #[test]
    fn logic_traits_cover_exactly_the_circuit_blocks() {
        for raw in 0..BlockType::COUNT as u8 {
            let block = BlockType::from_int(raw).unwrap();
            let is_circuit = block.is_input() || block.is_gate() || block.is_conductor();
            assert_eq!(block.logic_traits().is_some(), is_circuit, "{block:?}");
        }
    }

    #[test]
    fn conductors_switch_between_their_variants() {
        let wire = BlockType::OFF_WIRE.logic_traits().unwrap();
        assert_eq!(wire.on_state, BlockType::ON_WIRE);
        assert_eq!(wire.off_state, BlockType::OFF_WIRE);
        assert!(wire.can_receive_signal);

        let lamp = BlockType::ON_LAMP.logic_traits().unwrap();
        assert_eq!(lamp.on_state, BlockType::ON_LAMP);
        assert_eq!(lamp.off_state, BlockType::OFF_LAMP);

        assert!(!BlockType::OFF_SWITCH.logic_traits().unwrap().can_receive_signal);
        assert!(!BlockType::AND_GATE.logic_traits().unwrap().can_receive_signal);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&BlockType::ON_LAMP).unwrap();
        assert_eq!(json, "\"on_lamp\"");
        let parsed: BlockType = serde_json::from_str("\"grass\"").unwrap();
        assert_eq!(parsed, BlockType::GRASS);
    }
}
