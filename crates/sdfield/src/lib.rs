//! sdfield: 8-bit coverage bitmaps to signed distance fields (sans-IO).
//!
//! Converts an anti-aliased (or monochrome) glyph bitmap into a signed
//! distance field through: decode + edge seeding -> two-sweep euclidean
//! distance propagation -> signed 8-bit encoding. Distances carry
//! sub-pixel precision recovered from the coverage gradient, so the
//! output is usable for scalable rendering effects (outlines, glow,
//! sharp magnification) without re-rasterizing the source.
//!
//! This crate has **no I/O dependencies** -- it operates on caller-owned
//! byte buffers and returns structured data. File loading and image
//! codecs live in the accompanying tools.

pub mod bitmap;
pub mod diagnostics;
pub mod encode;
pub mod fixed;
pub mod map;
pub mod pipeline;
pub mod raster;
pub mod seed;
pub mod sweep;
pub mod types;

pub use bitmap::{Dimensions, PixelFormat, SourceBitmap, TargetBitmap};
pub use diagnostics::{RenderDiagnostics, render_with_diagnostics};
pub use map::{GridAllocator, HeapAllocator};
pub use pipeline::{Pipeline, RenderStats};
pub use raster::{BitmapSdfRaster, Raster};
pub use types::{RasterMode, RasterParams, SPREAD_DEFAULT, SPREAD_MAX, SPREAD_MIN, SdfError};

/// Render a source bitmap into a signed distance field.
///
/// The working storage comes from the global heap; use [`render_with`]
/// to supply a custom [`GridAllocator`].
///
/// The target may be larger than the source: the source is centered and
/// the surrounding padding filled with exterior distances. With
/// `params.flip_y`, source rows are read bottom-up and target rows
/// written bottom-up, converting between origin conventions.
///
/// # Errors
///
/// Returns [`SdfError::CorruptedParameters`] for a parameter block
/// tagged for a different engine, [`SdfError::InvalidArgument`] for an
/// out-of-range spread or a target smaller than the source,
/// [`SdfError::UnsupportedFormat`] for a source format without a
/// decoder, and [`SdfError::AllocationFailure`] when the working map
/// cannot be allocated. On any error the target is left untouched.
pub fn render(
    source: &SourceBitmap<'_>,
    target: &mut TargetBitmap<'_>,
    params: &RasterParams,
) -> Result<RenderStats, SdfError> {
    render_with(source, target, params, &HeapAllocator)
}

/// Render with a caller-supplied allocator for the working map.
///
/// # Errors
///
/// Same as [`render`].
pub fn render_with(
    source: &SourceBitmap<'_>,
    target: &mut TargetBitmap<'_>,
    params: &RasterParams,
    allocator: &dyn GridAllocator,
) -> Result<RenderStats, SdfError> {
    Pipeline::new(*source, *params)
        .seed(target.dimensions(), allocator)?
        .propagate()
        .encode(target)
        .map(pipeline::Encoded::into_stats)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// A centered 2x2 full-coverage square in a 6x6 gray bitmap.
    fn square_source_pixels() -> [u8; 36] {
        let mut pixels = [0_u8; 36];
        for y in 2..4 {
            for x in 2..4 {
                pixels[y * 6 + x] = 255;
            }
        }
        pixels
    }

    #[test]
    fn render_produces_signed_output() {
        let pixels = square_source_pixels();
        let source = SourceBitmap::new(6, 6, 6, PixelFormat::Gray, &pixels).unwrap();
        let mut out = [0_u8; 36];
        let mut target = TargetBitmap::new(6, 6, 6, &mut out).unwrap();
        render(&source, &mut target, &RasterParams::default()).unwrap();

        // Interior above the midpoint, far exterior below.
        assert!(out[6 * 2 + 2] > 128);
        assert!(out[0] < 128);
    }

    #[test]
    fn render_is_deterministic() {
        let pixels = square_source_pixels();
        let source = SourceBitmap::new(6, 6, 6, PixelFormat::Gray, &pixels).unwrap();
        let params = RasterParams::default();

        let mut first = [0_u8; 36];
        let mut target = TargetBitmap::new(6, 6, 6, &mut first).unwrap();
        render(&source, &mut target, &params).unwrap();

        let mut second = [0_u8; 36];
        let mut target = TargetBitmap::new(6, 6, 6, &mut second).unwrap();
        render(&source, &mut target, &params).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn render_rejects_bad_spread_without_touching_target() {
        let pixels = square_source_pixels();
        let source = SourceBitmap::new(6, 6, 6, PixelFormat::Gray, &pixels).unwrap();
        let params = RasterParams {
            spread: SPREAD_MAX + 1,
            ..RasterParams::default()
        };
        let mut out = [9_u8; 36];
        let mut target = TargetBitmap::new(6, 6, 6, &mut out).unwrap();
        assert!(render(&source, &mut target, &params).is_err());
        assert!(out.iter().all(|&b| b == 9));
    }

    #[test]
    fn render_with_custom_allocator_matches_default() {
        let pixels = square_source_pixels();
        let source = SourceBitmap::new(6, 6, 6, PixelFormat::Gray, &pixels).unwrap();
        let params = RasterParams::default();

        let mut default_out = [0_u8; 36];
        let mut target = TargetBitmap::new(6, 6, 6, &mut default_out).unwrap();
        render(&source, &mut target, &params).unwrap();

        let mut custom_out = [0_u8; 36];
        let mut target = TargetBitmap::new(6, 6, 6, &mut custom_out).unwrap();
        render_with(&source, &mut target, &params, &HeapAllocator).unwrap();

        assert_eq!(default_out, custom_out);
    }
}
