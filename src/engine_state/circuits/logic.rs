//! Signal propagation and gate evaluation.

use std::collections::VecDeque;

use log::trace;

use crate::engine_state::voxels::{
    block::{block_type::BlockType, direction::Direction},
    world::World,
};

use super::registry::{BlockRef, LogicRegistry};

/// Breadth-first signal propagation over one queue of `(block, signal)` pairs.
///
/// Returns the number of stored states that changed.
pub(super) fn propagate(world: &mut World, mut queue: VecDeque<(BlockRef, bool)>) -> usize {
    let mut changes = 0;

    while let Some((from, signal)) = queue.pop_front() {
        let area = world.area(from.area);
        let index = area.index(from.local);
        let block = area.block(index);

        match block {
            BlockType::OFF_SWITCH if signal => {}
            BlockType::CLOCK if signal && !area.logic_state(index) => {}
            BlockType::AND_GATE | BlockType::OR_GATE | BlockType::XOR_GATE => {
                let output = area.output_direction(index);
                changes += evaluate_neighbor(world, from, output, signal, &mut queue);
            }
            BlockType::NOT_GATE => {
                let output = area.output_direction(index);
                let input = read_neighbor(world, from, output.opposite()).unwrap_or(false);
                changes += evaluate_neighbor(world, from, output, signal && !input, &mut queue);
            }
            _ => {
                for direction in Direction::all() {
                    changes += evaluate_neighbor(world, from, direction, signal, &mut queue);
                }
            }
        }
    }
    changes
}

/// Toggles every clock among `sources`. Returns the clocks that just switched off.
///
/// Clocks flip before propagation starts, so a clock going dark feeds the off pass and never
/// races the on pass of another source sharing its wires.
pub(super) fn toggle_clocks(world: &mut World, sources: &[BlockRef]) -> Vec<BlockRef> {
    let mut stopped = Vec::new();
    for &entry in sources {
        let index = entry.index(world);
        let area = world.area_mut(entry.area);
        if area.block(index) != BlockType::CLOCK {
            continue;
        }
        let state = !area.logic_state(index);
        area.set_logic_state(index, state);
        if !state {
            stopped.push(entry);
        }
    }
    stopped
}

/// Offers `signal` to the neighbor of `from` in `direction`.
///
/// Blocks that cannot receive a signal, or already hold it, are left alone. A changed block
/// switches to its matching on/off variant, and conductors carry the signal onward.
fn evaluate_neighbor(
    world: &mut World,
    from: BlockRef,
    direction: Direction,
    signal: bool,
    queue: &mut VecDeque<(BlockRef, bool)>,
) -> usize {
    let Some((target, local)) = world.resolve(from.area, from.local + direction.offset()) else {
        return 0;
    };
    let area = world.area(target);
    let index = area.index(local);
    let block = area.block(index);
    let Some(traits) = block.logic_traits() else {
        return 0;
    };
    if !traits.can_receive_signal || area.logic_state(index) == signal {
        return 0;
    }

    world.area_mut(target).set_logic_state(index, signal);
    if block.is_conductor() {
        queue.push_back((BlockRef { area: target, local }, signal));
    }
    world.write_block(target, index, traits.variant(signal));
    trace!("{:?} -> {} at {:?}", block, signal, world.world_position(target, local));
    1
}

/// Stored state of the circuit block next to `from`, or `None` if there is none.
fn read_neighbor(world: &World, from: BlockRef, direction: Direction) -> Option<bool> {
    let (target, local) = world.resolve(from.area, from.local + direction.offset())?;
    let area = world.area(target);
    let index = area.index(local);
    area.block(index).logic_traits()?;
    Some(area.logic_state(index))
}

/// Computed output of one gate.
struct GateOutcome {
    entry: BlockRef,
    active: bool,
    state: bool,
}

fn evaluate_gate(world: &World, entry: BlockRef) -> Option<GateOutcome> {
    let area = world.area(entry.area);
    let index = area.index(entry.local);
    let output = area.output_direction(index);

    let (active, state) = match area.block(index) {
        BlockType::NOT_GATE => match read_neighbor(world, entry, output.opposite()) {
            Some(input) => (true, !input),
            None => (false, false),
        },
        block @ (BlockType::AND_GATE | BlockType::OR_GATE | BlockType::XOR_GATE) => {
            let on = output
                .gate_inputs()
                .into_iter()
                .filter(|&side| read_neighbor(world, entry, side) == Some(true))
                .count();
            let active = match block {
                BlockType::AND_GATE => on >= 2,
                BlockType::OR_GATE => on >= 1,
                _ => on == 1,
            };
            (active, active)
        }
        _ => return None,
    };
    Some(GateOutcome {
        entry,
        active,
        state,
    })
}

/// Re-evaluates every registered gate against the states left by propagation.
///
/// All gates read their inputs before any of them is updated, so the outcome does not depend
/// on registry order. Gates that just became inactive are queued so the next tick clears their
/// downstream signal.
pub(super) fn evaluate_gates(world: &mut World, registry: &mut LogicRegistry) {
    let view: &World = world;
    let outcomes: Vec<_> = registry
        .gates
        .iter()
        .filter_map(|(&key, &entry)| evaluate_gate(view, entry).map(|outcome| (key, outcome)))
        .collect();

    for (key, outcome) in outcomes {
        let index = outcome.entry.index(world);
        world
            .area_mut(outcome.entry.area)
            .set_logic_state(index, outcome.state);

        if outcome.active {
            registry.active_gates.insert(key, outcome.entry);
        } else if registry.active_gates.remove(&key).is_some() {
            registry.reevaluate.push(outcome.entry);
        }
    }
}
