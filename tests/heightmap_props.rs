use cgmath::Point3;
use proptest::prelude::*;
use terrain_engine::engine_state::voxels::{
    area::Area,
    block::block_type::BlockType,
};

const SIZE: usize = 6;

fn expected(area: &Area, x: usize, z: usize) -> (usize, usize) {
    let solid: Vec<usize> = (0..SIZE)
        .filter(|&y| {
            area.block_at(Point3::new(x as i32, y as i32, z as i32))
                .is_solid()
        })
        .collect();
    match (solid.first(), solid.last()) {
        (Some(&min), Some(&max)) => (min, max + 1),
        _ => (SIZE, 0),
    }
}

proptest! {
    #[test]
    fn heightmap_tracks_every_write(
        writes in prop::collection::vec((0..SIZE, 0..SIZE, 0..SIZE, any::<bool>()), 0..200)
    ) {
        let mut area = Area::new(Point3::new(0, 0, 0), SIZE);
        for (x, y, z, solid) in writes {
            let block = if solid { BlockType::STONE } else { BlockType::AIR };
            let index = area.index(Point3::new(x as i32, y as i32, z as i32));
            area.set_block(index, block);

            let (min, max) = expected(&area, x, z);
            prop_assert_eq!(area.column_min(x, z), min);
            prop_assert_eq!(area.column_max(x, z), max);
        }

        for x in 0..SIZE {
            for z in 0..SIZE {
                let (min, max) = expected(&area, x, z);
                prop_assert_eq!((area.column_min(x, z), area.column_max(x, z)), (min, max));
            }
        }
    }
}
