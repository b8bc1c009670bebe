//! Periodic power pass.
//!
//! Floods outward from every switched-on source through powerable blocks and records the
//! result in each area's power bits. Wires carry power further; lamps are lit but stop the
//! flood. The bits from the previous pass are cleared first, and areas whose bits changed are
//! flagged for remeshing.

use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::engine_state::voxels::{
    block::{block_type::BlockType, direction::Direction},
    world::World,
};

use super::registry::{BlockRef, LogicRegistry};

/// Recomputes power bits. Returns the set of powered blocks as `(area, index)` pairs.
pub(super) fn power_pass(
    world: &mut World,
    registry: &LogicRegistry,
    previous: &HashSet<(usize, usize)>,
) -> HashSet<(usize, usize)> {
    for &(id, index) in previous {
        world.area_mut(id).set_powered(index, false);
    }

    let view: &World = world;
    let mut queue: VecDeque<BlockRef> = registry
        .inputs
        .values()
        .copied()
        .filter(|source| is_live_source(view, *source))
        .collect();
    let mut powered = HashSet::new();

    while let Some(from) = queue.pop_front() {
        for direction in Direction::all() {
            let Some((id, local)) = world.resolve(from.area, from.local + direction.offset())
            else {
                continue;
            };
            let area = world.area(id);
            let index = area.index(local);
            let block = area.block(index);
            let powerable = block.logic_traits().is_some_and(|traits| traits.powerable);
            if !powerable || !powered.insert((id, index)) {
                continue;
            }
            world.area_mut(id).set_powered(index, true);
            if matches!(block, BlockType::OFF_WIRE | BlockType::ON_WIRE) {
                queue.push_back(BlockRef { area: id, local });
            }
        }
    }

    let mut changed_areas: Vec<usize> = previous
        .symmetric_difference(&powered)
        .map(|&(id, _)| id)
        .collect();
    changed_areas.sort_unstable();
    changed_areas.dedup();
    for &id in &changed_areas {
        world.area_mut(id).needs_remesh = true;
    }

    debug!(
        "Power pass: {} blocks powered, {} areas changed",
        powered.len(),
        changed_areas.len()
    );
    powered
}

fn is_live_source(world: &World, source: BlockRef) -> bool {
    let area = world.area(source.area);
    let index = area.index(source.local);
    match area.block(index) {
        BlockType::ON_SWITCH => true,
        BlockType::CLOCK => area.logic_state(index),
        _ => false,
    }
}
