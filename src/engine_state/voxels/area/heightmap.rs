//! Per-column occupied-height summaries.
//!
//! For every `(x, z)` column of an area, `min` is the lowest non-air y (or `N` when the column
//! is empty) and `max` is one past the highest non-air y (or `0` when empty). Both are stored as
//! bytes, which bounds the area side length to 255.

/// The `(min, max)` byte arrays of one area, indexed by `x + z * N`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnHeightmap {
    size: usize,
    min: Vec<u8>,
    max: Vec<u8>,
}

impl ColumnHeightmap {
    /// Creates the heightmap of an area with every column empty.
    pub fn empty(size: usize) -> Self {
        debug_assert!(size <= u8::MAX as usize);
        ColumnHeightmap {
            size,
            min: vec![size as u8; size * size],
            max: vec![0; size * size],
        }
    }

    /// Column index for local `(x, z)`.
    #[inline]
    pub fn column_index(&self, x: usize, z: usize) -> usize {
        x + z * self.size
    }

    /// Lowest non-air y of the column, or `N` if empty.
    #[inline]
    pub fn min(&self, column: usize) -> usize {
        self.min[column] as usize
    }

    /// One past the highest non-air y of the column, or `0` if empty.
    #[inline]
    pub fn max(&self, column: usize) -> usize {
        self.max[column] as usize
    }

    /// Returns `true` if the column holds no solid block.
    #[inline]
    pub fn is_column_empty(&self, column: usize) -> bool {
        self.max[column] == 0
    }

    /// Widens the column bounds to include a solid block at `y`.
    pub fn include(&mut self, column: usize, y: usize) {
        if y < self.min(column) {
            self.min[column] = y as u8;
        }
        if y + 1 > self.max(column) {
            self.max[column] = (y + 1) as u8;
        }
    }

    /// Shrinks the column bounds after the solid block at `y` became air.
    ///
    /// Nothing changes unless `y` was the current bottom or top. `is_solid` reports the
    /// occupancy of the other cells of the column; the cell at `y` is never queried.
    pub fn exclude(&mut self, column: usize, y: usize, is_solid: impl Fn(usize) -> bool) {
        let (low, high) = (self.min(column), self.max(column));
        if y != low && y + 1 != high {
            return;
        }

        match (low..high).find(|&other| other != y && is_solid(other)) {
            None => {
                self.min[column] = self.size as u8;
                self.max[column] = 0;
            }
            Some(bottom) => {
                let top = (bottom..high)
                    .rev()
                    .find(|&other| other != y && is_solid(other))
                    .unwrap_or(bottom);
                self.min[column] = bottom as u8;
                self.max[column] = (top + 1) as u8;
            }
        }
    }

    /// Applies a block write at `y` given the solidity before and after the write.
    pub fn on_block_changed(
        &mut self,
        column: usize,
        y: usize,
        was_solid: bool,
        is_solid_now: bool,
        is_solid: impl Fn(usize) -> bool,
    ) {
        match (was_solid, is_solid_now) {
            (false, true) => self.include(column, y),
            (true, false) => self.exclude(column, y, is_solid),
            _ => {}
        }
    }
}
