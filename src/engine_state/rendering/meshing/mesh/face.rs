use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::block::{block_type::BlockType, direction::Direction};

/// Axis along which faces pointing in `direction` are merged into runs.
///
/// Side faces run vertically, top and bottom faces run along X.
pub fn run_axis(direction: Direction) -> usize {
    if direction.axis() == 1 {
        0
    } else {
        1
    }
}

fn dot(a: Vector3<i32>, b: Vector3<i32>) -> i32 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

fn unit(axis: usize) -> Vector3<i32> {
    let mut vector = Vector3::new(0, 0, 0);
    vector[axis] = 1;
    vector
}

/// A merged run of same-type block faces, one quad in the final mesh.
///
/// `origin` is the local cell where the run starts; the run covers `length` cells along
/// `run_axis(direction)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// First cell of the run, in area-local coordinates.
    pub origin: Point3<i32>,
    /// Number of merged cells.
    pub length: i32,
    /// Which side of the blocks the face covers.
    pub direction: Direction,
    /// Block type of every merged cell.
    pub block: BlockType,
}

impl Face {
    /// The four corners of the quad, counter-clockwise when seen from outside the blocks.
    pub fn corners(&self) -> [Point3<i32>; 4] {
        let axis = self.direction.axis();
        let run = run_axis(self.direction);
        let width = 3 - axis - run;

        let mut base = self.origin;
        if self.direction.is_positive() {
            base[axis] += 1;
        }
        let along = unit(run) * self.length;
        let across = unit(width);

        let outward = dot(unit(run).cross(unit(width)), self.direction.offset());
        if outward > 0 {
            [base, base + along, base + along + across, base + across]
        } else {
            [base, base + across, base + along + across, base + along]
        }
    }

    /// The local cells whose faces this quad covers.
    pub fn cells(&self) -> impl Iterator<Item = Point3<i32>> + '_ {
        let step = unit(run_axis(self.direction));
        (0..self.length).map(move |offset| self.origin + step * offset)
    }
}
