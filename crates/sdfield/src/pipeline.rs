//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::render_with`] which runs the entire transform in one
//! call, [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use sdfield::{Pipeline, RasterParams, SdfError};
//! # use sdfield::bitmap::{PixelFormat, SourceBitmap, TargetBitmap};
//! # use sdfield::map::HeapAllocator;
//! # fn run() -> Result<(), SdfError> {
//! let coverage = [255_u8; 16];
//! let source = SourceBitmap::new(4, 4, 4, PixelFormat::Gray, &coverage)?;
//! let mut out = [0_u8; 64];
//! let mut target = TargetBitmap::new(8, 8, 8, &mut out)?;
//!
//! let stats = Pipeline::new(source, RasterParams::default())
//!     .seed(target.dimensions(), &HeapAllocator)?
//!     .propagate()
//!     .encode(&mut target)?
//!     .into_stats();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for fallible stages). The working distance map is
//! accessible between stages, and all validation happens in
//! [`Pending::seed`] before the map is allocated: bad parameters or an
//! unsupported source format never touch the target bitmap.

use crate::bitmap::{Dimensions, SourceBitmap, TargetBitmap};
use crate::encode::{EncodeStats, encode_distances};
use crate::map::{DistanceMap, GridAllocator};
use crate::seed::{SeedStats, seed_distance_map};
use crate::sweep::{SweepStats, propagate};
use crate::types::{RasterParams, SdfError};

/// Counters from every stage of one render call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Seeding counters.
    pub seed: SeedStats,
    /// Propagation counters.
    pub sweep: SweepStats,
    /// Encoding counters.
    pub encode: EncodeStats,
}

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// The source view and parameters are stored but not yet touched. Call
/// [`seed`](Self::seed) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing — call .seed() to continue"]
pub struct Pending<'a> {
    source: SourceBitmap<'a>,
    params: RasterParams,
}

impl<'a> Pending<'a> {
    /// The source bitmap view.
    #[must_use]
    pub const fn source(&self) -> SourceBitmap<'a> {
        self.source
    }

    /// Validate everything, allocate the working map sized to `target`,
    /// and seed it from the source.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::CorruptedParameters`] for a parameter block
    /// tagged for a different engine, [`SdfError::InvalidArgument`] for
    /// an out-of-range spread or a target smaller than the source,
    /// [`SdfError::UnsupportedFormat`] for a source format without a
    /// decoder, and [`SdfError::AllocationFailure`] when the map cannot
    /// be allocated. All of these leave the target bitmap untouched.
    pub fn seed(
        self,
        target: Dimensions,
        allocator: &dyn GridAllocator,
    ) -> Result<Seeded, SdfError> {
        self.params.validate()?;
        crate::seed::ensure_decodable(self.source.format())?;
        if !target.contains(self.source.dimensions()) {
            return Err(SdfError::InvalidArgument("target grid smaller than source bitmap"));
        }
        let mut map = DistanceMap::new(allocator, target.width, target.height)?;
        let seed_stats = seed_distance_map(&self.source, &mut map, self.params.flip_y)?;
        Ok(Seeded {
            params: self.params,
            map,
            seed_stats,
        })
    }
}

// ───────────────────────── Stage 1: Seeded ───────────────────────────

/// Pipeline state after decoding and edge seeding.
///
/// The working map holds coverage for every cell and sub-pixel distance
/// seeds along the coverage boundary. Call
/// [`propagate`](Self::propagate) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing — call .propagate() to continue"]
pub struct Seeded {
    params: RasterParams,
    map: DistanceMap,
    seed_stats: SeedStats,
}

impl Seeded {
    /// The seeded working map.
    #[must_use]
    pub const fn distance_map(&self) -> &DistanceMap {
        &self.map
    }

    /// Seeding counters.
    #[must_use]
    pub const fn seed_stats(&self) -> SeedStats {
        self.seed_stats
    }

    /// Run both distance sweeps and advance to the next stage.
    pub fn propagate(mut self) -> Propagated {
        let sweep_stats = propagate(&mut self.map);
        Propagated {
            params: self.params,
            map: self.map,
            seed_stats: self.seed_stats,
            sweep_stats,
        }
    }
}

// ───────────────────────── Stage 2: Propagated ───────────────────────

/// Pipeline state after distance propagation.
///
/// Every cell reachable from an edge now holds its nearest boundary
/// point. Call [`encode`](Self::encode) to write the output bitmap.
#[must_use = "pipeline stages are consumed by advancing — call .encode() to continue"]
pub struct Propagated {
    params: RasterParams,
    map: DistanceMap,
    seed_stats: SeedStats,
    sweep_stats: SweepStats,
}

impl Propagated {
    /// The propagated working map.
    #[must_use]
    pub const fn distance_map(&self) -> &DistanceMap {
        &self.map
    }

    /// Propagation counters.
    #[must_use]
    pub const fn sweep_stats(&self) -> SweepStats {
        self.sweep_stats
    }

    /// Encode the map into `target` — the final pipeline step.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::InvalidArgument`] when the target dimensions
    /// do not match the map this pipeline was seeded with.
    pub fn encode(self, target: &mut TargetBitmap<'_>) -> Result<Encoded, SdfError> {
        let encode_stats = encode_distances(&self.map, &self.params, target)?;
        Ok(Encoded {
            stats: RenderStats {
                seed: self.seed_stats,
                sweep: self.sweep_stats,
                encode: encode_stats,
            },
        })
    }
}

// ───────────────────────── Stage 3: Encoded ──────────────────────────

/// Pipeline state after encoding — the final stage.
#[must_use = "call .into_stats() to extract the RenderStats"]
pub struct Encoded {
    stats: RenderStats,
}

impl Encoded {
    /// Counters from every stage.
    #[must_use]
    pub const fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Consume the pipeline and return the stage counters.
    #[must_use]
    pub const fn into_stats(self) -> RenderStats {
        self.stats
    }
}

// ───────────────────── Pipeline entry point ──────────────────────────

/// Incremental distance-field pipeline.
///
/// Created via [`Pipeline::new`], which stores the source view and
/// parameters without doing any processing. The caller then chains
/// stage methods; each consumes the current state and returns the next,
/// making it a compile-time error to skip stages or call them out of
/// order.
pub struct Pipeline;

impl Pipeline {
    /// Create a new pipeline from a source view and render parameters.
    ///
    /// No processing or validation is performed — call
    /// [`.seed()`](Pending::seed) to begin.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(source: SourceBitmap<'_>, params: RasterParams) -> Pending<'_> {
        Pending { source, params }
    }
}
