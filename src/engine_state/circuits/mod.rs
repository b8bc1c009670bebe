//! # Circuit Simulation
//!
//! Discrete logic running on top of the block world.
//!
//! ## Architecture
//!
//! * **Registry**: sources, gates and active gates, keyed by world block coordinate
//! * **Logic**: breadth-first signal propagation and gate evaluation
//! * **Power**: a slower flood from live sources that marks powered blocks
//!
//! ## Logic Tick
//!
//! 1. Collect the edits recorded since the last tick and re-register the edited blocks
//! 2. Toggle every clock
//! 3. Propagate "off" from every edited block, every clock that just stopped and every gate
//!    that just went inactive
//! 4. Propagate "on" from every live source and every active gate, in world-coordinate order
//! 5. Re-evaluate every gate against its input neighbors
//!
//! Propagation only overwrites blocks that can receive a signal, and only when their stored
//! state differs, so each block changes at most once per pass and every pass terminates. A
//! changed block switches to its on/off variant through `World::write_block`, which flags the
//! owning area and its neighbors for remeshing.
//!
//! All circuit state lives in one `CircuitSimulation` owned by the engine; nothing is global.

pub mod registry;

mod logic;
mod power;

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use log::debug;

use crate::engine_state::{config::CircuitConfig, voxels::world::World};

use registry::LogicRegistry;

/// What one `update` did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CircuitTickStats {
    /// Logic ticks run.
    pub logic_ticks: u32,
    /// Power passes run.
    pub power_passes: u32,
    /// Stored block states changed by propagation.
    pub state_changes: usize,
}

/// Circuit state and timers for one world.
pub struct CircuitSimulation {
    registry: LogicRegistry,
    powered: HashSet<(usize, usize)>,
    logic_period: Duration,
    power_period: Duration,
    logic_elapsed: Duration,
    power_elapsed: Duration,
}

impl CircuitSimulation {
    /// Creates an empty simulation with the periods from `config`.
    pub fn new(config: &CircuitConfig) -> Self {
        CircuitSimulation {
            registry: LogicRegistry::default(),
            powered: HashSet::new(),
            logic_period: config.logic_period(),
            power_period: config.power_period(),
            logic_elapsed: Duration::ZERO,
            power_elapsed: Duration::ZERO,
        }
    }

    /// The block registries.
    pub fn registry(&self) -> &LogicRegistry {
        &self.registry
    }

    /// Number of blocks powered by the last power pass.
    pub fn powered_count(&self) -> usize {
        self.powered.len()
    }

    /// Advances the timers by `dt` and runs whatever became due.
    ///
    /// At most one logic tick and one power pass run per call; time beyond one period is
    /// dropped rather than replayed in a burst.
    pub fn update(&mut self, dt: Duration, world: &mut World) -> CircuitTickStats {
        let mut stats = CircuitTickStats::default();

        self.logic_elapsed += dt;
        if self.logic_elapsed >= self.logic_period {
            self.logic_elapsed = (self.logic_elapsed - self.logic_period).min(self.logic_period);
            stats.state_changes += self.step(world);
            stats.logic_ticks += 1;
        }

        self.power_elapsed += dt;
        if self.power_elapsed >= self.power_period {
            self.power_elapsed = (self.power_elapsed - self.power_period).min(self.power_period);
            self.power_pass(world);
            stats.power_passes += 1;
        }
        stats
    }

    /// Runs one logic tick immediately. Returns the number of stored states changed.
    pub fn step(&mut self, world: &mut World) -> usize {
        let mut staged = self.registry.collect(world);
        let staged_len = staged.len();

        let sources = LogicRegistry::ordered(&self.registry.inputs);
        staged.extend(logic::toggle_clocks(world, &sources));

        let off_queue: VecDeque<_> = staged.into_iter().map(|entry| (entry, false)).collect();
        let mut changes = logic::propagate(world, off_queue);

        let on_queue: VecDeque<_> = sources
            .into_iter()
            .chain(LogicRegistry::ordered(&self.registry.active_gates))
            .map(|entry| (entry, true))
            .collect();
        changes += logic::propagate(world, on_queue);

        logic::evaluate_gates(world, &mut self.registry);

        if staged_len > 0 || changes > 0 {
            debug!(
                "Logic tick: {} edits, {} state changes, {} active gates",
                staged_len,
                changes,
                self.registry.active_gate_count()
            );
        }
        changes
    }

    /// Runs one power pass immediately.
    pub fn power_pass(&mut self, world: &mut World) {
        self.powered = power::power_pass(world, &self.registry, &self.powered);
    }
}
