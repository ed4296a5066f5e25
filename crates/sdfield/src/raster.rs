//! Raster front-end: the engine-style entry point over the pipeline.
//!
//! A [`BitmapSdfRaster`] is a long-lived handle a host embeds once and
//! renders through many times. It carries the allocator used for every
//! working map; rendering is `&self`, so one instance can serve
//! concurrent calls from separate threads — each call allocates its own
//! map and shares nothing.
//!
//! Hosts that want one render with no setup can use
//! [`crate::render`] instead.

use std::sync::Arc;

use crate::bitmap::{SourceBitmap, TargetBitmap};
use crate::map::GridAllocator;
use crate::pipeline::{Pipeline, RenderStats};
use crate::types::{RasterMode, RasterParams, SdfError};

/// The engine interface a host drives.
pub trait Raster: Send + Sync {
    /// Replace the allocator backing future renders.
    fn reset(&mut self, allocator: Arc<dyn GridAllocator>);

    /// Select the render mode.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::CorruptedParameters`] for any mode this
    /// engine does not implement.
    fn set_mode(&mut self, mode: RasterMode) -> Result<(), SdfError>;

    /// Render `source` into `target` with the given parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::InvalidHandle`] when no allocator is
    /// configured, plus every error the underlying pipeline reports.
    fn render(
        &self,
        source: &SourceBitmap<'_>,
        target: &mut TargetBitmap<'_>,
        params: &RasterParams,
    ) -> Result<RenderStats, SdfError>;
}

/// The bitmap-to-signed-distance raster engine.
///
/// [`Default`] builds an unconfigured instance that fails every render
/// with [`SdfError::InvalidHandle`] until [`reset`](Raster::reset)
/// installs an allocator; [`new`](Self::new) builds a ready one.
#[derive(Clone, Default)]
pub struct BitmapSdfRaster {
    allocator: Option<Arc<dyn GridAllocator>>,
}

impl BitmapSdfRaster {
    /// Create a raster backed by the given allocator.
    #[must_use]
    pub fn new(allocator: Arc<dyn GridAllocator>) -> Self {
        Self {
            allocator: Some(allocator),
        }
    }
}

impl std::fmt::Debug for BitmapSdfRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitmapSdfRaster")
            .field("configured", &self.allocator.is_some())
            .finish()
    }
}

impl Raster for BitmapSdfRaster {
    fn reset(&mut self, allocator: Arc<dyn GridAllocator>) {
        self.allocator = Some(allocator);
    }

    fn set_mode(&mut self, mode: RasterMode) -> Result<(), SdfError> {
        // Only one mode exists here; the check still catches parameter
        // blocks meant for a coverage engine.
        match mode {
            RasterMode::SignedDistance => Ok(()),
            RasterMode::Coverage => Err(SdfError::CorruptedParameters),
        }
    }

    fn render(
        &self,
        source: &SourceBitmap<'_>,
        target: &mut TargetBitmap<'_>,
        params: &RasterParams,
    ) -> Result<RenderStats, SdfError> {
        let allocator = self.allocator.as_deref().ok_or(SdfError::InvalidHandle)?;
        Pipeline::new(*source, *params)
            .seed(target.dimensions(), allocator)?
            .propagate()
            .encode(target)
            .map(crate::pipeline::Encoded::into_stats)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::bitmap::PixelFormat;
    use crate::map::HeapAllocator;

    fn gray_source(width: u32, height: u32, pixels: &[u8]) -> SourceBitmap<'_> {
        SourceBitmap::new(width, height, width, PixelFormat::Gray, pixels).unwrap()
    }

    #[test]
    fn default_raster_has_no_handle() {
        let raster = BitmapSdfRaster::default();
        let coverage = [255_u8; 4];
        let source = gray_source(2, 2, &coverage);
        let mut out = [0_u8; 16];
        let mut target = TargetBitmap::new(4, 4, 4, &mut out).unwrap();
        assert!(matches!(
            raster.render(&source, &mut target, &RasterParams::default()),
            Err(SdfError::InvalidHandle),
        ));
    }

    #[test]
    fn reset_installs_an_allocator() {
        let mut raster = BitmapSdfRaster::default();
        raster.reset(Arc::new(HeapAllocator));
        let coverage = [255_u8; 4];
        let source = gray_source(2, 2, &coverage);
        let mut out = [0_u8; 16];
        let mut target = TargetBitmap::new(4, 4, 4, &mut out).unwrap();
        assert!(
            raster
                .render(&source, &mut target, &RasterParams::default())
                .is_ok(),
        );
    }

    #[test]
    fn set_mode_accepts_only_signed_distance() {
        let mut raster = BitmapSdfRaster::new(Arc::new(HeapAllocator));
        assert!(raster.set_mode(RasterMode::SignedDistance).is_ok());
        assert!(matches!(
            raster.set_mode(RasterMode::Coverage),
            Err(SdfError::CorruptedParameters),
        ));
    }

    #[test]
    fn render_matches_direct_pipeline() {
        let coverage = [0, 128, 255, 255, 128, 0, 0, 255, 128];
        let source = gray_source(3, 3, &coverage);
        let params = RasterParams::default();

        let raster = BitmapSdfRaster::new(Arc::new(HeapAllocator));
        let mut via_raster = [0_u8; 49];
        let mut target = TargetBitmap::new(7, 7, 7, &mut via_raster).unwrap();
        raster.render(&source, &mut target, &params).unwrap();

        let mut direct = [0_u8; 49];
        let mut target = TargetBitmap::new(7, 7, 7, &mut direct).unwrap();
        crate::render_with(&source, &mut target, &params, &HeapAllocator).unwrap();

        assert_eq!(via_raster, direct);
    }

    #[test]
    fn renders_through_trait_object() {
        let raster: Box<dyn Raster> = Box::new(BitmapSdfRaster::new(Arc::new(HeapAllocator)));
        let coverage = [255_u8; 4];
        let source = gray_source(2, 2, &coverage);
        let mut out = [0_u8; 36];
        let mut target = TargetBitmap::new(6, 6, 6, &mut out).unwrap();
        let stats = raster
            .render(&source, &mut target, &RasterParams::default())
            .unwrap();
        assert!(stats.seed.edge_cells > 0);
    }
}
