//! Packed vertex format for area meshes.
//!
//! Each vertex is a single 32-bit word so a mesh can be uploaded to the renderer as is.

use crate::engine_state::voxels::block::direction::Direction;

const POSITION_BITS: u32 = 8;
const TEXTURE_BITS: u32 = 5;
const TEXTURE_SHIFT: u32 = 3 * POSITION_BITS;
const NORMAL_SHIFT: u32 = TEXTURE_SHIFT + TEXTURE_BITS;
const POSITION_MASK: u32 = (1 << POSITION_BITS) - 1;
const TEXTURE_MASK: u32 = (1 << TEXTURE_BITS) - 1;

/// A vertex of an area mesh.
///
/// # Memory Layout
/// - bits 0..8: local x
/// - bits 8..16: local y
/// - bits 16..24: local z
/// - bits 24..29: texture-unit index
/// - bits 29..32: face normal, as a `Direction` discriminant
///
/// Total size: 4 bytes
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedVertex(pub u32);

impl PackedVertex {
    /// Packs a vertex. Positions range over `0..=N` (a face may sit on the far boundary);
    /// the texture index keeps its low 5 bits.
    pub fn new(x: u8, y: u8, z: u8, texture_index: u8, normal: Direction) -> Self {
        PackedVertex(
            x as u32
                | (y as u32) << POSITION_BITS
                | (z as u32) << (2 * POSITION_BITS)
                | (texture_index as u32 & TEXTURE_MASK) << TEXTURE_SHIFT
                | (normal as u32) << NORMAL_SHIFT,
        )
    }

    /// Local x.
    pub fn x(self) -> u8 {
        (self.0 & POSITION_MASK) as u8
    }

    /// Local y.
    pub fn y(self) -> u8 {
        (self.0 >> POSITION_BITS & POSITION_MASK) as u8
    }

    /// Local z.
    pub fn z(self) -> u8 {
        (self.0 >> (2 * POSITION_BITS) & POSITION_MASK) as u8
    }

    /// Texture-unit index.
    pub fn texture_index(self) -> u8 {
        (self.0 >> TEXTURE_SHIFT & TEXTURE_MASK) as u8
    }

    /// Face normal, or `None` for a tag outside the six directions.
    pub fn normal(self) -> Option<Direction> {
        Direction::all().get((self.0 >> NORMAL_SHIFT) as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_occupy_disjoint_bits() {
        let vertex = PackedVertex::new(16, 3, 255, 19, Direction::ZP);
        assert_eq!(vertex.x(), 16);
        assert_eq!(vertex.y(), 3);
        assert_eq!(vertex.z(), 255);
        assert_eq!(vertex.texture_index(), 19);
        assert_eq!(vertex.normal(), Some(Direction::ZP));
    }

    #[test]
    fn texture_index_is_truncated_to_five_bits() {
        let vertex = PackedVertex::new(0, 0, 0, 0b11_0001, Direction::XN);
        assert_eq!(vertex.texture_index(), 1);
        assert_eq!(vertex.normal(), Some(Direction::XN));
        assert_eq!(bytemuck::bytes_of(&vertex).len(), 4);
    }
}
