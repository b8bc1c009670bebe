//! # Direction Module
//!
//! The six axis directions. They name block faces for meshing, index the neighbor array of
//! every area, and orient circuit gates.

use cgmath::Vector3;

/// One of the six axis-aligned directions.
///
/// The discriminant is used as an array index (neighbor links, visited bitmaps, texture
/// tables) and as the 3-bit normal tag of packed vertices.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, Default)]
pub enum Direction {
    /// Negative X.
    XN = 0,
    /// Positive X.
    #[default]
    XP = 1,
    /// Negative Y (down).
    YN = 2,
    /// Positive Y (up).
    YP = 3,
    /// Negative Z.
    ZN = 4,
    /// Positive Z.
    ZP = 5,
}

impl Direction {
    /// Returns all six directions in discriminant order.
    pub const fn all() -> [Direction; 6] {
        [
            Direction::XN,
            Direction::XP,
            Direction::YN,
            Direction::YP,
            Direction::ZN,
            Direction::ZP,
        ]
    }

    /// Returns the direction pointing the other way along the same axis.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::XN => Direction::XP,
            Direction::XP => Direction::XN,
            Direction::YN => Direction::YP,
            Direction::YP => Direction::YN,
            Direction::ZN => Direction::ZP,
            Direction::ZP => Direction::ZN,
        }
    }

    /// Axis index: 0 for X, 1 for Y, 2 for Z.
    pub const fn axis(self) -> usize {
        self as usize / 2
    }

    /// Returns `true` for the positive direction of each axis.
    pub const fn is_positive(self) -> bool {
        self as usize % 2 == 1
    }

    /// Unit offset of one step in this direction.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            Direction::XN => Vector3::new(-1, 0, 0),
            Direction::XP => Vector3::new(1, 0, 0),
            Direction::YN => Vector3::new(0, -1, 0),
            Direction::YP => Vector3::new(0, 1, 0),
            Direction::ZN => Vector3::new(0, 0, -1),
            Direction::ZP => Vector3::new(0, 0, 1),
        }
    }

    /// The two input sides of a two-input gate whose output points along `self`.
    ///
    /// Inputs are perpendicular to the output in the horizontal plane: an output along X reads
    /// from `ZN`/`ZP`, any other output reads from `XN`/`XP`.
    pub const fn gate_inputs(self) -> [Direction; 2] {
        match self {
            Direction::XN | Direction::XP => [Direction::ZN, Direction::ZP],
            _ => [Direction::XN, Direction::XP],
        }
    }

    /// Returns the direction for an axis index and sign.
    pub const fn from_axis(axis: usize, positive: bool) -> Direction {
        match (axis, positive) {
            (0, false) => Direction::XN,
            (0, true) => Direction::XP,
            (1, false) => Direction::YN,
            (1, true) => Direction::YP,
            (2, false) => Direction::ZN,
            _ => Direction::ZP,
        }
    }
}
