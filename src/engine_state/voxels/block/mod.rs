//! # Block Module
//!
//! Block type definitions, the six face/neighbor directions, and the static per-type lookup
//! tables: face textures, block names and circuit properties.

use block_type::BlockType;
use phf::phf_map;

pub mod block_type;
pub mod direction;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Maps each block type to its texture-unit index for each face.
///
/// The outer array is indexed by `BlockType` as a `usize`, the inner array by `Direction`:
/// [XN, XP, YN, YP, ZN, ZP]. Indices must fit in the 5 bits reserved by the packed vertex.
pub static BLOCK_TYPE_TO_TEXTURE_INDICES: [[u8; 6]; BlockType::COUNT] = [
    [0, 0, 0, 0, 0, 0],       // AIR (never meshed)
    [1, 1, 1, 1, 1, 1],       // STONE
    [2, 2, 2, 2, 2, 2],       // DIRT
    [3, 3, 2, 4, 3, 3],       // GRASS (top: 4, bottom: dirt, sides: 3)
    [5, 5, 5, 5, 5, 5],       // TIN
    [6, 6, 6, 6, 6, 6],       // GEM
    [7, 7, 8, 8, 7, 7],       // WOOD (rings on top and bottom)
    [9, 9, 9, 9, 9, 9],       // LEAVES
    [10, 10, 10, 10, 10, 10], // OFF_WIRE
    [11, 11, 11, 11, 11, 11], // ON_WIRE
    [12, 12, 12, 13, 12, 12], // AND_GATE
    [12, 12, 12, 14, 12, 12], // OR_GATE
    [12, 12, 12, 15, 12, 12], // XOR_GATE
    [12, 12, 12, 16, 12, 12], // NOT_GATE
    [17, 17, 17, 17, 17, 17], // OFF_SWITCH
    [18, 18, 18, 18, 18, 18], // ON_SWITCH
    [19, 19, 19, 19, 19, 19], // OFF_LAMP
    [20, 20, 20, 20, 20, 20], // ON_LAMP
    [21, 21, 21, 22, 21, 21], // CLOCK
];

/// Static circuit properties of a block type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LogicTraits {
    /// Whether the block takes part in the power pass.
    pub powerable: bool,
    /// Whether propagation may overwrite the block's stored state.
    pub can_receive_signal: bool,
    /// Block type shown while the stored state is on.
    pub on_state: BlockType,
    /// Block type shown while the stored state is off.
    pub off_state: BlockType,
}

impl LogicTraits {
    /// Returns the variant matching `state`.
    pub fn variant(&self, state: bool) -> BlockType {
        if state {
            self.on_state
        } else {
            self.off_state
        }
    }
}

const WIRE: LogicTraits = LogicTraits {
    powerable: true,
    can_receive_signal: true,
    on_state: BlockType::ON_WIRE,
    off_state: BlockType::OFF_WIRE,
};

const LAMP: LogicTraits = LogicTraits {
    powerable: true,
    can_receive_signal: true,
    on_state: BlockType::ON_LAMP,
    off_state: BlockType::OFF_LAMP,
};

const SWITCH: LogicTraits = LogicTraits {
    powerable: false,
    can_receive_signal: false,
    on_state: BlockType::ON_SWITCH,
    off_state: BlockType::OFF_SWITCH,
};

const fn gate(block: BlockType) -> LogicTraits {
    LogicTraits {
        powerable: false,
        can_receive_signal: false,
        on_state: block,
        off_state: block,
    }
}

/// Circuit properties keyed by `BlockType` discriminant. Blocks absent from the map take no
/// part in circuits.
pub static LOGIC_TRAITS: phf::Map<BlockTypeSize, LogicTraits> = phf_map! {
    8u8 => WIRE,
    9u8 => WIRE,
    10u8 => gate(BlockType::AND_GATE),
    11u8 => gate(BlockType::OR_GATE),
    12u8 => gate(BlockType::XOR_GATE),
    13u8 => gate(BlockType::NOT_GATE),
    14u8 => SWITCH,
    15u8 => SWITCH,
    16u8 => LAMP,
    17u8 => LAMP,
    18u8 => gate(BlockType::CLOCK),
};

/// Block types by their lowercase name.
pub static BLOCK_NAMES: phf::Map<&'static str, BlockType> = phf_map! {
    "air" => BlockType::AIR,
    "stone" => BlockType::STONE,
    "dirt" => BlockType::DIRT,
    "grass" => BlockType::GRASS,
    "tin" => BlockType::TIN,
    "gem" => BlockType::GEM,
    "wood" => BlockType::WOOD,
    "leaves" => BlockType::LEAVES,
    "off_wire" => BlockType::OFF_WIRE,
    "on_wire" => BlockType::ON_WIRE,
    "and_gate" => BlockType::AND_GATE,
    "or_gate" => BlockType::OR_GATE,
    "xor_gate" => BlockType::XOR_GATE,
    "not_gate" => BlockType::NOT_GATE,
    "off_switch" => BlockType::OFF_SWITCH,
    "on_switch" => BlockType::ON_SWITCH,
    "off_lamp" => BlockType::OFF_LAMP,
    "on_lamp" => BlockType::ON_LAMP,
    "clock" => BlockType::CLOCK,
};
