//! Reusable visited bitmaps for the mesher.
//!
//! Meshing one area needs a per-direction, per-cell visited bitmap. Instead of allocating six
//! bitmaps for every area, workers take a set from a shared pool and give it back when done.

use bitvec::prelude::BitVec;

use crate::core::MtResource;

/// Six visited bitmaps, one per face direction, each sized to an area's volume.
#[derive(Debug, Default)]
pub struct VisitedScratch {
    visited: [BitVec; 6],
}

impl VisitedScratch {
    /// Clears every bitmap and sizes it to `volume` cells.
    pub fn reset(&mut self, volume: usize) {
        for bits in &mut self.visited {
            bits.clear();
            bits.resize(volume, false);
        }
    }

    /// Whether the face of `index` pointing along `direction` is already covered.
    pub fn is_visited(&self, direction: usize, index: usize) -> bool {
        self.visited[direction][index]
    }

    /// Marks the face of `index` pointing along `direction` as covered.
    pub fn visit(&mut self, direction: usize, index: usize) {
        self.visited[direction].set(index, true);
    }
}

/// Shared pool of `VisitedScratch` sets. Clones share the pool.
#[derive(Clone, Default)]
pub struct ScratchPool {
    free: MtResource<Vec<VisitedScratch>>,
}

impl ScratchPool {
    /// Takes a cleared scratch set for an area of `volume` cells.
    pub fn acquire(&self, volume: usize) -> VisitedScratch {
        let mut scratch = self.free.get_mut().pop().unwrap_or_default();
        scratch.reset(volume);
        scratch
    }

    /// Returns a scratch set to the pool.
    pub fn release(&self, scratch: VisitedScratch) {
        self.free.get_mut().push(scratch);
    }

    /// Number of idle scratch sets.
    pub fn idle(&self) -> usize {
        self.free.get().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_scratch_is_reused_cleared() {
        let pool = ScratchPool::default();
        let mut scratch = pool.acquire(64);
        scratch.visit(3, 10);
        assert!(scratch.is_visited(3, 10));
        pool.release(scratch);
        assert_eq!(pool.idle(), 1);

        let scratch = pool.acquire(64);
        assert_eq!(pool.idle(), 0);
        assert!(!scratch.is_visited(3, 10));
    }
}
