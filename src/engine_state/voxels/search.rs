//! Column searches over the neighbor graph.
//!
//! Used to place observers on the ground. The search walks down through `YN` links and uses the
//! column heightmaps to skip empty stretches. It gives up with an error, never a panic, when an
//! area on the way is missing or when it descends further than its step bound.

use cgmath::Point3;

use crate::engine_state::error::{TerrainError, TerrainResult};

use super::{block::direction::Direction, world::World};

impl World {
    /// Finds the highest solid block of the world column `(x, z)` at or below `top_y`.
    ///
    /// # Errors
    /// - `TerrainError::AreaNotLoaded` if the search reaches an area that does not exist
    /// - `TerrainError::SearchExceeded` if no solid block lies within `max_steps` blocks
    pub fn find_surface(
        &self,
        x: i32,
        z: i32,
        top_y: i32,
        max_steps: usize,
    ) -> TerrainResult<Point3<i32>> {
        let n = self.area_size() as i32;
        let (mut position, local) = self.split_world(Point3::new(x, top_y, z));
        let mut id = self
            .locate(position)
            .ok_or(TerrainError::AreaNotLoaded(position))?;
        let mut start = local.y;
        let mut steps = 0usize;

        loop {
            let area = self.area(id);
            let column_top = area.column_max(local.x as usize, local.z as usize) as i32 - 1;
            if column_top >= 0 {
                let mut y = start.min(column_top);
                steps += (start - y) as usize;
                while y >= 0 && steps <= max_steps {
                    if area.block_at(Point3::new(local.x, y, local.z)).is_solid() {
                        return Ok(self.world_position(id, Point3::new(local.x, y, local.z)));
                    }
                    y -= 1;
                    steps += 1;
                }
            } else {
                steps += (start + 1) as usize;
            }

            if steps > max_steps {
                return Err(TerrainError::SearchExceeded { steps });
            }

            position.y -= 1;
            id = area
                .neighbor(Direction::YN)
                .ok_or(TerrainError::AreaNotLoaded(position))?;
            start = n - 1;
        }
    }
}
