//! Borrowed bitmap views at the pipeline boundary.
//!
//! The core operates on caller-owned byte buffers and never allocates
//! pixel storage itself: [`SourceBitmap`] is a read-only view of the
//! coverage raster, [`TargetBitmap`] a mutable view of the 8-bit signed
//! distance output. Both validate their structural invariants (non-zero
//! dimensions, row pitch, buffer length) at construction so the pipeline
//! stages can rely on in-bounds addressing.

use serde::{Deserialize, Serialize};

use crate::types::SdfError;

/// Pixel encoding of a source coverage bitmap.
///
/// Only [`Gray`](Self::Gray) (8-bit coverage, one byte per pixel) and
/// [`Mono`](Self::Mono) (1 bit per pixel, most significant bit first)
/// currently decode. The remaining layouts are recognized so callers get
/// a precise [`SdfError::UnsupportedFormat`] instead of a generic
/// failure; [`None`](Self::None) marks a bitmap whose format was never
/// set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Format not set.
    #[default]
    None,
    /// 1 bit per pixel, MSB first within each byte.
    Mono,
    /// 8-bit grayscale coverage, one byte per pixel.
    Gray,
    /// 2 bits per pixel grayscale.
    Gray2,
    /// 4 bits per pixel grayscale.
    Gray4,
    /// 16-bit grayscale coverage.
    Gray16,
    /// Horizontal LCD subpixel layout (three samples per pixel).
    Lcd,
    /// Vertical LCD subpixel layout.
    LcdV,
}

impl PixelFormat {
    /// Minimum bytes one row of `width` pixels occupies in this format,
    /// or `None` when the format has no defined row layout here.
    #[must_use]
    pub const fn min_pitch(self, width: u32) -> Option<u32> {
        match self {
            Self::Gray => Some(width),
            Self::Mono => Some(width.div_ceil(8)),
            Self::Gray2 => Some(width.div_ceil(4)),
            Self::Gray4 => Some(width.div_ceil(2)),
            Self::Gray16 => Some(width.saturating_mul(2)),
            Self::Lcd | Self::LcdV => Some(width.saturating_mul(3)),
            Self::None => None,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Mono => "mono",
            Self::Gray => "gray",
            Self::Gray2 => "gray2",
            Self::Gray4 => "gray4",
            Self::Gray16 => "gray16",
            Self::Lcd => "lcd",
            Self::LcdV => "lcd-v",
        };
        f.write_str(name)
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels (number of rows).
    pub height: u32,
}

impl Dimensions {
    /// `true` when this grid is at least as large as `other` on both axes.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.width >= other.width && self.height >= other.height
    }
}

/// Read-only view of a caller-owned coverage bitmap.
///
/// The buffer must remain valid for the duration of the render call;
/// the borrow makes that a compile-time guarantee.
#[derive(Debug, Clone, Copy)]
pub struct SourceBitmap<'a> {
    width: u32,
    height: u32,
    pitch: u32,
    format: PixelFormat,
    buffer: &'a [u8],
}

impl<'a> SourceBitmap<'a> {
    /// Create a source view, validating dimension/pitch/buffer consistency.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::InvalidArgument`] for zero dimensions, a pitch
    /// smaller than one row of pixels, or a buffer shorter than
    /// `pitch * height`. Formats without a defined row layout (only
    /// [`PixelFormat::None`]) skip the pitch check; the pipeline rejects
    /// them during validation.
    pub fn new(
        width: u32,
        height: u32,
        pitch: u32,
        format: PixelFormat,
        buffer: &'a [u8],
    ) -> Result<Self, SdfError> {
        if width == 0 || height == 0 {
            return Err(SdfError::InvalidArgument("source bitmap has zero dimension"));
        }
        if let Some(min_pitch) = format.min_pitch(width)
            && pitch < min_pitch
        {
            return Err(SdfError::InvalidArgument("source pitch smaller than a row"));
        }
        let needed = pitch as usize * height as usize;
        if buffer.len() < needed {
            return Err(SdfError::InvalidArgument("source buffer shorter than pitch * height"));
        }
        Ok(Self {
            width,
            height,
            pitch,
            format,
            buffer,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row pitch in bytes.
    #[must_use]
    pub const fn pitch(&self) -> u32 {
        self.pitch
    }

    /// Pixel format.
    #[must_use]
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// Width and height together.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Byte at `(byte_x, y)` in raw buffer coordinates.
    ///
    /// `byte_x` is a byte offset within the row, not a pixel column:
    /// sub-byte formats pack several pixels per byte. In-bounds access is
    /// guaranteed by the constructor checks for `byte_x < pitch`.
    #[must_use]
    pub fn row_byte(&self, byte_x: u32, y: u32) -> u8 {
        let index = y as usize * self.pitch as usize + byte_x as usize;
        self.buffer.get(index).copied().unwrap_or(0)
    }
}

/// Mutable view of the caller-allocated 8-bit output bitmap.
///
/// The pixel format is fixed: one byte per pixel, signed distance mapped
/// linearly onto `[0, 255]` with the zero level at 128.
#[derive(Debug)]
pub struct TargetBitmap<'a> {
    width: u32,
    height: u32,
    pitch: u32,
    buffer: &'a mut [u8],
}

impl<'a> TargetBitmap<'a> {
    /// Create a target view, validating dimension/pitch/buffer consistency.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::InvalidArgument`] for zero dimensions,
    /// `pitch < width`, or a buffer shorter than `pitch * height`.
    pub fn new(
        width: u32,
        height: u32,
        pitch: u32,
        buffer: &'a mut [u8],
    ) -> Result<Self, SdfError> {
        if width == 0 || height == 0 {
            return Err(SdfError::InvalidArgument("target bitmap has zero dimension"));
        }
        if pitch < width {
            return Err(SdfError::InvalidArgument("target pitch smaller than width"));
        }
        let needed = pitch as usize * height as usize;
        if buffer.len() < needed {
            return Err(SdfError::InvalidArgument("target buffer shorter than pitch * height"));
        }
        Ok(Self {
            width,
            height,
            pitch,
            buffer,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Width and height together.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Write one output pixel. Out-of-range coordinates are ignored; the
    /// encoder only produces in-range ones.
    pub fn put(&mut self, x: u32, y: u32, value: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y as usize * self.pitch as usize + x as usize;
        if let Some(slot) = self.buffer.get_mut(index) {
            *slot = value;
        }
    }

    /// Read back one output pixel (testing and diagnostics).
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = y as usize * self.pitch as usize + x as usize;
        self.buffer.get(index).copied()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn source_rejects_zero_dimensions() {
        let buf = [0_u8; 4];
        assert!(matches!(
            SourceBitmap::new(0, 2, 2, PixelFormat::Gray, &buf),
            Err(SdfError::InvalidArgument(_)),
        ));
        assert!(matches!(
            SourceBitmap::new(2, 0, 2, PixelFormat::Gray, &buf),
            Err(SdfError::InvalidArgument(_)),
        ));
    }

    #[test]
    fn source_rejects_short_buffer() {
        let buf = [0_u8; 3];
        assert!(matches!(
            SourceBitmap::new(2, 2, 2, PixelFormat::Gray, &buf),
            Err(SdfError::InvalidArgument(_)),
        ));
    }

    #[test]
    fn source_rejects_narrow_pitch() {
        let buf = [0_u8; 16];
        assert!(matches!(
            SourceBitmap::new(4, 2, 3, PixelFormat::Gray, &buf),
            Err(SdfError::InvalidArgument(_)),
        ));
    }

    #[test]
    fn source_accepts_padded_pitch() {
        let buf = [0_u8; 12];
        let bitmap = SourceBitmap::new(2, 2, 6, PixelFormat::Gray, &buf);
        assert!(bitmap.is_ok());
    }

    #[test]
    fn mono_pitch_is_bit_packed() {
        assert_eq!(PixelFormat::Mono.min_pitch(1), Some(1));
        assert_eq!(PixelFormat::Mono.min_pitch(8), Some(1));
        assert_eq!(PixelFormat::Mono.min_pitch(9), Some(2));
        // A 9-pixel-wide mono row fits in 2 bytes.
        let buf = [0_u8; 2];
        assert!(SourceBitmap::new(9, 1, 2, PixelFormat::Mono, &buf).is_ok());
    }

    #[test]
    fn row_byte_addresses_by_pitch() {
        let buf = [1, 2, 3, 4, 5, 6];
        let bitmap = SourceBitmap::new(2, 2, 3, PixelFormat::Gray, &buf).unwrap();
        assert_eq!(bitmap.row_byte(0, 0), 1);
        assert_eq!(bitmap.row_byte(1, 0), 2);
        assert_eq!(bitmap.row_byte(0, 1), 4);
    }

    #[test]
    fn target_rejects_inconsistent_views() {
        let mut buf = [0_u8; 4];
        assert!(matches!(
            TargetBitmap::new(0, 2, 2, &mut buf),
            Err(SdfError::InvalidArgument(_)),
        ));
        assert!(matches!(
            TargetBitmap::new(4, 2, 2, &mut buf),
            Err(SdfError::InvalidArgument(_)),
        ));
        assert!(matches!(
            TargetBitmap::new(2, 4, 2, &mut buf),
            Err(SdfError::InvalidArgument(_)),
        ));
    }

    #[test]
    fn target_put_and_get_round_trip() {
        let mut buf = [0_u8; 6];
        let mut target = TargetBitmap::new(2, 2, 3, &mut buf).unwrap();
        target.put(1, 1, 200);
        assert_eq!(target.get(1, 1), Some(200));
        assert_eq!(target.get(0, 0), Some(0));
        // Pitch-padded byte stays untouched.
        assert_eq!(buf[5], 0);
        assert_eq!(buf[4], 200);
    }

    #[test]
    fn dimensions_contains() {
        let big = Dimensions {
            width: 8,
            height: 8,
        };
        let small = Dimensions {
            width: 4,
            height: 8,
        };
        assert!(big.contains(small));
        assert!(!small.contains(big));
        assert!(big.contains(big));
    }
}
