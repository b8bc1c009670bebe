//! Tree shapes.
//!
//! A tree is a one-block trunk of wood with a cylindrical crown of leaves around the upper half
//! of the trunk and a 3×3 cap of leaves on top. Trunk height and crown radius are the configured
//! base values plus a noise term in `0..=noise_range`.

use cgmath::Vector3;

use crate::engine_state::{config::StructureConfig, voxels::block::block_type::BlockType};

/// Rolled dimensions of one tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TreeShape {
    /// Number of wood blocks in the trunk.
    pub trunk_height: i32,
    /// Radius of the leaf cylinder.
    pub crown_radius: i32,
}

impl TreeShape {
    /// Rolls a tree shape from the configuration and a seeded generator.
    pub fn roll(config: &StructureConfig, rng: &mut fastrand::Rng) -> Self {
        TreeShape {
            trunk_height: config.base_trunk_height + rng.i32(0..=config.noise_range),
            crown_radius: config.base_crown_radius + rng.i32(0..=config.noise_range),
        }
    }

    /// Negative and positive extents that bound every tree the configuration can produce.
    pub fn max_extents(config: &StructureConfig) -> (Vector3<i32>, Vector3<i32>) {
        let radius = (config.base_crown_radius + config.noise_range).max(1);
        let height = config.base_trunk_height + config.noise_range;
        (
            Vector3::new(radius, 0, radius),
            Vector3::new(radius, height, radius),
        )
    }

    /// Voxels of the tree relative to its root, the lowest trunk block.
    pub fn voxels(&self) -> Vec<(Vector3<i32>, BlockType)> {
        let mut voxels = Vec::new();
        for y in 0..self.trunk_height {
            voxels.push((Vector3::new(0, y, 0), BlockType::WOOD));
        }

        let radius = self.crown_radius;
        for y in self.trunk_height / 2..self.trunk_height {
            for dz in -radius..=radius {
                for dx in -radius..=radius {
                    if (dx, dz) != (0, 0) && dx * dx + dz * dz <= radius * radius {
                        voxels.push((Vector3::new(dx, y, dz), BlockType::LEAVES));
                    }
                }
            }
        }

        for dz in -1..=1 {
            for dx in -1..=1 {
                voxels.push((Vector3::new(dx, self.trunk_height, dz), BlockType::LEAVES));
            }
        }
        voxels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolled_shapes_stay_within_the_configured_range() {
        let config = StructureConfig::default();
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..100 {
            let shape = TreeShape::roll(&config, &mut rng);
            assert!((3..=5).contains(&shape.trunk_height));
            assert!((1..=3).contains(&shape.crown_radius));
        }
    }

    #[test]
    fn voxels_fit_in_the_max_extents() {
        let config = StructureConfig::default();
        let (negative, positive) = TreeShape::max_extents(&config);
        let shape = TreeShape {
            trunk_height: 5,
            crown_radius: 3,
        };
        for (offset, _) in shape.voxels() {
            assert!(offset.x >= -negative.x && offset.x <= positive.x);
            assert!(offset.y >= -negative.y && offset.y <= positive.y);
            assert!(offset.z >= -negative.z && offset.z <= positive.z);
        }
    }

    #[test]
    fn trunk_is_wood_and_cap_is_leaves() {
        let shape = TreeShape {
            trunk_height: 4,
            crown_radius: 1,
        };
        let voxels = shape.voxels();
        let wood: Vec<_> = voxels
            .iter()
            .filter(|(_, block)| *block == BlockType::WOOD)
            .map(|(offset, _)| *offset)
            .collect();
        assert_eq!(wood.len(), 4);
        assert!(wood.iter().all(|offset| offset.x == 0 && offset.z == 0));

        let cap = voxels
            .iter()
            .filter(|(offset, block)| offset.y == 4 && *block == BlockType::LEAVES)
            .count();
        assert_eq!(cap, 9);

        // radius 1 crown on the upper half: y = 2 and y = 3, four leaves each
        let crown = voxels
            .iter()
            .filter(|(offset, block)| offset.y < 4 && *block == BlockType::LEAVES)
            .count();
        assert_eq!(crown, 8);
        assert!(voxels.iter().all(|(offset, _)| offset.y >= 0));
    }
}
