//! Registries of circuit blocks.
//!
//! Three disjoint maps keyed by world block coordinate: signal sources (switches and clocks),
//! gates, and the subset of gates currently active. They are owned by one `CircuitSimulation`,
//! so independent worlds never share circuit state.

use std::collections::HashMap;

use cgmath::Point3;

use crate::engine_state::voxels::{
    area::AreaId,
    block::block_type::BlockType,
    world::World,
};

/// Location of a circuit block: owning area and local position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockRef {
    /// Owning area.
    pub area: AreaId,
    /// Position inside the owning area.
    pub local: Point3<i32>,
}

impl BlockRef {
    /// Flat block index inside the owning area.
    pub fn index(&self, world: &World) -> usize {
        world.area(self.area).index(self.local)
    }

    /// Current block type.
    pub fn block(&self, world: &World) -> BlockType {
        world.area(self.area).block_at(self.local)
    }
}

/// Source, gate and active-gate registries.
#[derive(Debug, Default)]
pub struct LogicRegistry {
    pub(super) inputs: HashMap<Point3<i32>, BlockRef>,
    pub(super) gates: HashMap<Point3<i32>, BlockRef>,
    pub(super) active_gates: HashMap<Point3<i32>, BlockRef>,
    pub(super) reevaluate: Vec<BlockRef>,
}

impl LogicRegistry {
    /// Number of registered signal sources.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Number of registered gates.
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Number of gates currently active.
    pub fn active_gate_count(&self) -> usize {
        self.active_gates.len()
    }

    /// Returns `true` if the gate at a world coordinate is active.
    pub fn is_gate_active(&self, world_position: Point3<i32>) -> bool {
        self.active_gates.contains_key(&world_position)
    }

    /// Entries of a registry ordered by world coordinate.
    pub(super) fn ordered(map: &HashMap<Point3<i32>, BlockRef>) -> Vec<BlockRef> {
        let mut entries: Vec<_> = map.iter().map(|(&key, &entry)| (key, entry)).collect();
        entries.sort_unstable_by_key(|(key, _)| (key.x, key.y, key.z));
        entries.into_iter().map(|(_, entry)| entry).collect()
    }

    /// Drains the edits recorded since the last tick, re-classifies each edited block, and
    /// returns the blocks to reset this tick.
    ///
    /// Edited blocks start over: their stored state is cleared (a switch stores its position)
    /// and their power bit is dropped.
    pub(super) fn collect(&mut self, world: &mut World) -> Vec<BlockRef> {
        let mut staged = std::mem::take(&mut self.reevaluate);

        for id in world.area_ids() {
            if !world.area(id).has_edits() {
                continue;
            }
            for index in world.area_mut(id).take_edits() {
                let area = world.area_mut(id);
                let local = area.local_position(index);
                let block = area.block(index);
                area.set_logic_state(index, block == BlockType::ON_SWITCH);
                area.set_powered(index, false);

                let key = world.world_position(id, local);
                let entry = BlockRef { area: id, local };
                self.inputs.remove(&key);
                self.gates.remove(&key);
                self.active_gates.remove(&key);
                if block.is_input() {
                    self.inputs.insert(key, entry);
                } else if block.is_gate() {
                    self.gates.insert(key, entry);
                }
                staged.push(entry);
            }
        }
        staged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{area::Area, change::BlockEdit};

    #[test]
    fn collect_classifies_and_reclassifies_edits() {
        let mut world = World::new(16);
        world.insert_area(Area::new(Point3::new(0, 0, 0), 16));
        let mut registry = LogicRegistry::default();

        let switch = Point3::new(1, 1, 1);
        let gate = Point3::new(4, 1, 1);
        world.apply_edit(BlockEdit::new(switch, BlockType::OFF_SWITCH)).unwrap();
        world.apply_edit(BlockEdit::new(gate, BlockType::AND_GATE)).unwrap();
        world.apply_edit(BlockEdit::new(Point3::new(2, 1, 1), BlockType::OFF_WIRE)).unwrap();

        let staged = registry.collect(&mut world);
        assert_eq!(staged.len(), 3);
        assert_eq!((registry.input_count(), registry.gate_count()), (1, 1));

        world.apply_edit(BlockEdit::new(gate, BlockType::AIR)).unwrap();
        world.apply_edit(BlockEdit::new(switch, BlockType::CLOCK)).unwrap();
        registry.collect(&mut world);
        assert_eq!((registry.input_count(), registry.gate_count()), (1, 0));
        assert!(!world.area(0).has_edits());
    }

    #[test]
    fn switches_store_their_position() {
        let mut world = World::new(16);
        world.insert_area(Area::new(Point3::new(0, 0, 0), 16));
        let mut registry = LogicRegistry::default();
        world.apply_edit(BlockEdit::new(Point3::new(0, 0, 0), BlockType::ON_SWITCH)).unwrap();
        registry.collect(&mut world);
        assert!(world.area(0).logic_state(0));
    }
}
