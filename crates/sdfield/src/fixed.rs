//! Fixed-point arithmetic for sub-pixel distances and coordinates.
//!
//! The pipeline measures everything in 16.16 fixed point ([`F16Dot16`]):
//! coverage samples, nearest-point offsets, and linear distances. Squared
//! distances are compared as 32.32 values in `i64` so the hot propagation
//! loop never needs a square root or risks overflow. The spread encoder
//! narrows final distances through 6.10 ([`F6Dot10`]) before scaling to
//! the 8-bit output range.
//!
//! All sample-to-coverage and distance-to-output conversions go through
//! these types; no raw shifts or casts happen elsewhere in the crate.

use std::ops::{Add, Neg, Sub};

/// Clamp an `i64` intermediate into `i32` range.
#[allow(clippy::cast_possible_truncation)]
const fn clamp_to_i32(v: i64) -> i32 {
    if v > i32::MAX as i64 {
        i32::MAX
    } else if v < i32::MIN as i64 {
        i32::MIN
    } else {
        v as i32
    }
}

/// A 16.16 signed fixed-point number.
///
/// Backed by an `i32`: the upper 16 bits are the integer part, the lower
/// 16 the fraction. Arithmetic saturates instead of wrapping, so a chain
/// of operations can never silently overflow into nonsense distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct F16Dot16(i32);

impl F16Dot16 {
    /// Number of fractional bits.
    pub const FRAC_BITS: u32 = 16;

    /// The value 0.
    pub const ZERO: Self = Self(0);
    /// The value 1.
    pub const ONE: Self = Self(1 << Self::FRAC_BITS);
    /// The value 0.5, the mid-coverage threshold separating inside from
    /// outside.
    pub const HALF: Self = Self(1 << (Self::FRAC_BITS - 1));
    /// Largest representable value.
    pub const MAX: Self = Self(i32::MAX);
    /// Smallest representable value.
    pub const MIN: Self = Self(i32::MIN);

    /// Reinterpret raw bits as a fixed-point value.
    #[must_use]
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    /// The raw bit representation.
    #[must_use]
    pub const fn to_bits(self) -> i32 {
        self.0
    }

    /// Convert a small integer (|v| < 2^15) such as a spread radius or a
    /// unit grid step.
    #[must_use]
    pub const fn from_int(v: i32) -> Self {
        Self(v << Self::FRAC_BITS)
    }

    /// Round to the nearest integer (ties toward positive infinity).
    #[must_use]
    pub const fn to_int_round(self) -> i32 {
        clamp_to_i32((self.0 as i64 + (1 << (Self::FRAC_BITS - 1))) >> Self::FRAC_BITS)
    }

    /// Absolute value, saturating at [`F16Dot16::MAX`].
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// `true` when the value is strictly negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Saturating fixed-point multiplication with round-to-nearest.
    #[must_use]
    pub const fn mul(self, rhs: Self) -> Self {
        let product = self.0 as i64 * rhs.0 as i64;
        Self(clamp_to_i32(
            (product + (1 << (Self::FRAC_BITS - 1))) >> Self::FRAC_BITS,
        ))
    }

    /// Saturating fixed-point division. Division by zero saturates to
    /// [`F16Dot16::MAX`] or [`F16Dot16::MIN`] depending on the sign of
    /// the dividend.
    #[must_use]
    pub const fn div(self, rhs: Self) -> Self {
        if rhs.0 == 0 {
            return if self.0 < 0 { Self::MIN } else { Self::MAX };
        }
        let quotient = ((self.0 as i64) << Self::FRAC_BITS) / rhs.0 as i64;
        Self(clamp_to_i32(quotient))
    }

    /// Square root of a non-negative fixed-point value.
    ///
    /// Negative inputs return zero.
    #[must_use]
    pub fn sqrt(self) -> Self {
        if self.0 <= 0 {
            return Self::ZERO;
        }
        // sqrt(v * 2^-16) == sqrt(v << 16) * 2^-16.
        let widened = (self.0 as u64) << Self::FRAC_BITS;
        Self(clamp_to_i32(widened.isqrt() as i64))
    }

    /// Clamp into `[lo, hi]`.
    #[must_use]
    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        Self(self.0.clamp(lo.0, hi.0))
    }
}

impl Add for F16Dot16 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for F16Dot16 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for F16Dot16 {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

/// Linear distance corresponding to a 32.32 squared distance, as produced
/// by [`FixedVec::length_sq`]. This is the single square root taken per
/// cell, at encode time.
#[must_use]
pub fn sqrt_of_squared(dist_sq: i64) -> F16Dot16 {
    if dist_sq <= 0 {
        return F16Dot16::ZERO;
    }
    // sqrt(v * 2^-32) == sqrt(v) * 2^-16, so the integer square root of
    // the raw 32.32 value is directly the 16.16 result.
    F16Dot16::from_bits(clamp_to_i32((dist_sq as u64).isqrt() as i64))
}

/// A 2-vector of 16.16 components: the offset from a cell center to its
/// nearest boundary point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedVec {
    /// Horizontal offset.
    pub x: F16Dot16,
    /// Vertical offset.
    pub y: F16Dot16,
}

impl FixedVec {
    /// The zero vector.
    pub const ZERO: Self = Self {
        x: F16Dot16::ZERO,
        y: F16Dot16::ZERO,
    };

    /// Create a vector from components.
    #[must_use]
    pub const fn new(x: F16Dot16, y: F16Dot16) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean length as a 32.32 value.
    ///
    /// Components are at most 2^31 in magnitude, so each square fits in
    /// 62 bits; the sum saturates rather than wrapping.
    #[must_use]
    pub const fn length_sq(self) -> i64 {
        let x = self.x.to_bits() as i64;
        let y = self.y.to_bits() as i64;
        (x * x).saturating_add(y * y)
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> F16Dot16 {
        sqrt_of_squared(self.length_sq())
    }
}

/// A 6.10 signed fixed-point number, the quantization step applied to
/// clamped distances before the 8-bit output mapping.
///
/// Backed by an `i16`: 6 integer bits cover the full spread range
/// (`[-32, +32]` saturates exactly at the ends).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct F6Dot10(i16);

impl F6Dot10 {
    /// Number of fractional bits.
    pub const FRAC_BITS: u32 = 10;

    /// The value 1.
    pub const ONE: Self = Self(1 << Self::FRAC_BITS);

    /// Reinterpret raw bits as a 6.10 value.
    #[must_use]
    pub const fn from_bits(bits: i16) -> Self {
        Self(bits)
    }

    /// The raw bit representation.
    #[must_use]
    pub const fn to_bits(self) -> i16 {
        self.0
    }

    /// Narrow a 16.16 value to 6.10, rounding to nearest and saturating
    /// at the `i16` range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_f16d16(v: F16Dot16) -> Self {
        const SHIFT: u32 = F16Dot16::FRAC_BITS - F6Dot10::FRAC_BITS;
        let rounded = (v.to_bits() as i64 + (1 << (SHIFT - 1))) >> SHIFT;
        if rounded > i16::MAX as i64 {
            Self(i16::MAX)
        } else if rounded < i16::MIN as i64 {
            Self(i16::MIN)
        } else {
            Self(rounded as i16)
        }
    }
}
