//! The working distance map and its allocation.
//!
//! A [`DistanceMap`] is a dense grid, sized to the output bitmap, of
//! [`DistanceCell`] records pairing a squared distance with the offset to
//! the nearest known boundary point. It is created fresh for every render
//! call, seeded by the decoder, mutated in place by the sweep engine,
//! read once by the encoder, and dropped before the call returns — it
//! never outlives a single invocation, so no locking is needed.
//!
//! Allocation goes through the host-supplied [`GridAllocator`] handle;
//! [`HeapAllocator`] is the default implementation backed by
//! `Vec::try_reserve_exact`, which turns out-of-memory into a reported
//! [`SdfError::AllocationFailure`] instead of an abort.

use crate::fixed::{F16Dot16, FixedVec};
use crate::types::SdfError;

/// Squared-distance sentinel for cells with no boundary candidate yet
/// (padding beyond the source bitmap, or interior cells before the sweep
/// reaches them).
pub const DIST_SQ_UNKNOWN: i64 = i64::MAX;

/// Per-cell record of the euclidean distance transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceCell {
    /// Squared distance to `near`, 32.32 fixed point, or
    /// [`DIST_SQ_UNKNOWN`]. Always equals `near.length_sq()` when a
    /// candidate is present.
    pub dist_sq: i64,

    /// Offset from this cell's center to the nearest boundary point. May
    /// point outside the grid during intermediate passes.
    pub near: FixedVec,

    /// Coverage of this cell in `[0, 1]`. Kept separately from the
    /// distance so the output sign is defined even where no distance is
    /// known yet.
    pub alpha: F16Dot16,
}

impl DistanceCell {
    /// A cell with zero coverage and no boundary candidate.
    pub const EMPTY: Self = Self {
        dist_sq: DIST_SQ_UNKNOWN,
        near: FixedVec::ZERO,
        alpha: F16Dot16::ZERO,
    };

    /// `true` once a nearest-boundary candidate has been recorded.
    #[must_use]
    pub const fn has_candidate(&self) -> bool {
        self.dist_sq != DIST_SQ_UNKNOWN
    }

    /// `true` when this cell counts as interior for the output sign.
    #[must_use]
    pub fn is_inside(&self) -> bool {
        self.alpha >= F16Dot16::HALF
    }
}

impl Default for DistanceCell {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Host-supplied capability for acquiring the working grid storage.
///
/// Implementations must be reentrant: independent render calls may
/// allocate concurrently from separate threads.
pub trait GridAllocator: Send + Sync {
    /// Allocate storage for `count` cells, initialized to
    /// [`DistanceCell::EMPTY`].
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::AllocationFailure`] when the memory cannot be
    /// obtained.
    fn alloc_cells(&self, count: usize) -> Result<Vec<DistanceCell>, SdfError>;
}

/// Default allocator backed by the global heap.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapAllocator;

impl GridAllocator for HeapAllocator {
    fn alloc_cells(&self, count: usize) -> Result<Vec<DistanceCell>, SdfError> {
        let mut cells = Vec::new();
        cells.try_reserve_exact(count)?;
        cells.resize(count, DistanceCell::EMPTY);
        Ok(cells)
    }
}

/// Dense 2D grid of distance records, addressed by flat index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMap {
    cells: Vec<DistanceCell>,
    width: u32,
    rows: u32,
}

impl DistanceMap {
    /// Allocate a `width x rows` map through the given allocator.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::InvalidArgument`] for zero dimensions or a
    /// cell count that overflows `usize`, and
    /// [`SdfError::AllocationFailure`] when the allocator fails.
    pub fn new(
        allocator: &dyn GridAllocator,
        width: u32,
        rows: u32,
    ) -> Result<Self, SdfError> {
        if width == 0 || rows == 0 {
            return Err(SdfError::InvalidArgument("distance map has zero dimension"));
        }
        let count = (width as usize)
            .checked_mul(rows as usize)
            .ok_or(SdfError::InvalidArgument("distance map cell count overflows"))?;
        let cells = allocator.alloc_cells(count)?;
        Ok(Self { cells, width, rows })
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Cell at `(x, y)`, or `None` out of range.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<&DistanceCell> {
        if x >= self.width || y >= self.rows {
            return None;
        }
        self.cells.get(y as usize * self.width as usize + x as usize)
    }

    /// Mutable cell at `(x, y)`, or `None` out of range.
    #[must_use]
    pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut DistanceCell> {
        if x >= self.width || y >= self.rows {
            return None;
        }
        self.cells
            .get_mut(y as usize * self.width as usize + x as usize)
    }

    /// All cells in row-major order (testing and diagnostics).
    #[must_use]
    pub fn cells(&self) -> &[DistanceCell] {
        &self.cells
    }
}
