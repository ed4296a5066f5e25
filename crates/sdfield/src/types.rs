//! Shared parameter and error types for the distance-field pipeline.

use std::collections::TryReserveError;

use serde::{Deserialize, Serialize};

use crate::bitmap::PixelFormat;

/// Smallest accepted spread radius, in pixels.
pub const SPREAD_MIN: i32 = 2;

/// Largest accepted spread radius, in pixels.
pub const SPREAD_MAX: i32 = 32;

/// Default spread radius.
pub const SPREAD_DEFAULT: i32 = 8;

/// Discriminant tagging a parameter block for a particular raster engine.
///
/// The signed-distance pipeline only accepts
/// [`SignedDistance`](Self::SignedDistance); a block tagged for a
/// conventional coverage raster fails with
/// [`SdfError::CorruptedParameters`] instead of being silently
/// misinterpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RasterMode {
    /// Render a signed distance field.
    #[default]
    SignedDistance,
    /// Render plain coverage (handled by a different engine).
    Coverage,
}

/// Parameters resolved once per render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterParams {
    /// How far, in pixels, distances extend before saturating. Must lie
    /// in `[SPREAD_MIN, SPREAD_MAX]`; out-of-range values are a hard
    /// validation error, never silently clamped.
    pub spread: i32,

    /// Read source rows (and write target rows) bottom-up, for bitmaps
    /// whose origin convention is inverted relative to the output.
    pub flip_y: bool,

    /// Reserved for overlapping-contour support; accepted but currently
    /// without effect.
    pub overlaps: bool,

    /// Engine discriminant; see [`RasterMode`].
    pub mode: RasterMode,
}

impl Default for RasterParams {
    fn default() -> Self {
        Self {
            spread: SPREAD_DEFAULT,
            flip_y: false,
            overlaps: false,
            mode: RasterMode::SignedDistance,
        }
    }
}

impl RasterParams {
    /// Check the parameter block before any allocation happens.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::CorruptedParameters`] when the block is not
    /// tagged for the signed-distance engine, and
    /// [`SdfError::InvalidArgument`] when `spread` lies outside
    /// `[SPREAD_MIN, SPREAD_MAX]`.
    pub const fn validate(&self) -> Result<(), SdfError> {
        if !matches!(self.mode, RasterMode::SignedDistance) {
            return Err(SdfError::CorruptedParameters);
        }
        if self.spread < SPREAD_MIN || self.spread > SPREAD_MAX {
            return Err(SdfError::InvalidArgument("spread outside [SPREAD_MIN, SPREAD_MAX]"));
        }
        Ok(())
    }
}

/// Errors surfaced by the pipeline.
///
/// Every internal step returns the first error it detects; the driver
/// aborts immediately with no partial output and no retry.
#[derive(Debug, thiserror::Error)]
pub enum SdfError {
    /// A structural precondition on the inputs failed.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The source pixel format has no decoder yet.
    #[error("unsupported source pixel format: {0}")]
    UnsupportedFormat(PixelFormat),

    /// The working distance map could not be allocated.
    #[error("could not allocate the working distance map: {0}")]
    AllocationFailure(#[from] TryReserveError),

    /// The raster instance has no allocator handle configured.
    #[error("raster has no allocator handle configured")]
    InvalidHandle,

    /// The parameter block is not tagged for this engine.
    #[error("parameter block is not tagged for the signed-distance raster")]
    CorruptedParameters,
}
