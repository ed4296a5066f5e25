//! Signed-distance encoding into the 8-bit output bitmap.
//!
//! The encoder takes the one square root per cell the rest of the
//! pipeline avoided, applies the sign from the cell's coverage (inside
//! positive, outside negative), saturates at the spread radius, narrows
//! to 6.10 precision, and maps the result linearly onto `[0, 255]` with
//! the zero level at 128. Cells the sweep never reached (a map with no
//! edges at all) saturate at the spread with the coverage sign, so a
//! fully empty bitmap encodes as all 0.

use crate::bitmap::TargetBitmap;
use crate::fixed::{F6Dot10, F16Dot16, sqrt_of_squared};
use crate::map::DistanceMap;
use crate::types::{RasterParams, SdfError};

/// Counters produced by encoding, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Cells whose distance met or exceeded the spread and saturated.
    pub clamped_cells: u64,
}

/// Map one quantized distance onto the 8-bit range.
///
/// `[-spread, +spread]` maps linearly onto `[0, 255]`: `-spread` is 0,
/// zero distance is exactly 128, `+spread` is 255.
fn to_byte(q: F6Dot10, spread: i32) -> u8 {
    let s = spread << F6Dot10::FRAC_BITS;
    let q = i32::from(q.to_bits());
    // Adding `s` to the scaled numerator rounds to the nearest step.
    let byte = ((q + s) * 255 + s) / (2 * s);
    u8::try_from(byte.clamp(0, 255)).unwrap_or(255)
}

/// Encode the propagated distance map into the target bitmap.
///
/// The target must have the same dimensions as the map. With `flip_y`
/// set, rows are written bottom-up, matching the inverted read of the
/// source.
///
/// # Errors
///
/// Returns [`SdfError::InvalidArgument`] when the target dimensions do
/// not match the map.
pub fn encode_distances(
    map: &DistanceMap,
    params: &RasterParams,
    target: &mut TargetBitmap<'_>,
) -> Result<EncodeStats, SdfError> {
    if target.width() != map.width() || target.height() != map.rows() {
        return Err(SdfError::InvalidArgument("target dimensions do not match the distance map"));
    }

    let spread_fix = F16Dot16::from_int(params.spread);
    let mut stats = EncodeStats::default();

    for y in 0..map.rows() {
        let out_y = if params.flip_y { map.rows() - y - 1 } else { y };
        for x in 0..map.width() {
            let Some(cell) = map.get(x, y) else { continue };

            // Unreached cells are farther than the spread by definition.
            let dist = if cell.has_candidate() {
                sqrt_of_squared(cell.dist_sq)
            } else {
                F16Dot16::MAX
            };
            if dist >= spread_fix {
                stats.clamped_cells += 1;
            }

            let signed = if cell.is_inside() { dist } else { -dist };
            let clamped = signed.clamp(-spread_fix, spread_fix);
            let quantized = F6Dot10::from_f16d16(clamped);
            target.put(x, out_y, to_byte(quantized, params.spread));
        }
    }

    Ok(stats)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixed::FixedVec;
    use crate::map::{DistanceMap, HeapAllocator};

    fn fresh_map(width: u32, rows: u32) -> DistanceMap {
        DistanceMap::new(&HeapAllocator, width, rows).unwrap()
    }

    fn set_cell(map: &mut DistanceMap, x: u32, y: u32, near: FixedVec, alpha: F16Dot16) {
        let cell = map.get_mut(x, y).unwrap();
        cell.near = near;
        cell.dist_sq = near.length_sq();
        cell.alpha = alpha;
    }

    fn params(spread: i32) -> RasterParams {
        RasterParams {
            spread,
            ..RasterParams::default()
        }
    }

    #[test]
    fn byte_mapping_endpoints() {
        let spread = 8;
        let s = F6Dot10::from_f16d16(F16Dot16::from_int(spread));
        let neg_s = F6Dot10::from_f16d16(F16Dot16::from_int(-spread));
        let zero = F6Dot10::from_f16d16(F16Dot16::ZERO);
        assert_eq!(to_byte(neg_s, spread), 0);
        assert_eq!(to_byte(zero, spread), 128);
        assert_eq!(to_byte(s, spread), 255);
    }

    #[test]
    fn byte_mapping_is_monotonic() {
        let spread = 4;
        let mut last = 0;
        for step in -(spread << 10)..=(spread << 10) {
            let byte = to_byte(F6Dot10::from_bits(i16::try_from(step).unwrap()), spread);
            assert!(byte >= last, "mapping decreased at step {step}");
            last = byte;
        }
    }

    #[test]
    fn dimension_mismatch_rejected() {
        let map = fresh_map(3, 3);
        let mut buf = [0_u8; 4];
        let mut target = TargetBitmap::new(2, 2, 2, &mut buf).unwrap();
        assert!(matches!(
            encode_distances(&map, &params(8), &mut target),
            Err(SdfError::InvalidArgument(_)),
        ));
    }

    #[test]
    fn boundary_cell_encodes_to_midpoint() {
        let mut map = fresh_map(1, 1);
        set_cell(&mut map, 0, 0, FixedVec::ZERO, F16Dot16::HALF);
        let mut buf = [0_u8; 1];
        let mut target = TargetBitmap::new(1, 1, 1, &mut buf).unwrap();
        encode_distances(&map, &params(8), &mut target).unwrap();
        assert_eq!(buf[0], 128);
    }

    #[test]
    fn unreached_cells_saturate_with_coverage_sign() {
        let mut map = fresh_map(2, 1);
        // No candidates anywhere; one cell inside, one outside.
        map.get_mut(0, 0).unwrap().alpha = F16Dot16::ONE;
        let mut buf = [0_u8; 2];
        let mut target = TargetBitmap::new(2, 1, 2, &mut buf).unwrap();
        let stats = encode_distances(&map, &params(8), &mut target).unwrap();
        assert_eq!(buf[0], 255);
        assert_eq!(buf[1], 0);
        assert_eq!(stats.clamped_cells, 2);
    }

    #[test]
    fn distances_beyond_spread_clamp() {
        let mut map = fresh_map(2, 1);
        let far = FixedVec::new(F16Dot16::from_int(10), F16Dot16::ZERO);
        set_cell(&mut map, 0, 0, far, F16Dot16::ONE);
        set_cell(&mut map, 1, 0, far, F16Dot16::ZERO);
        let mut buf = [0_u8; 2];
        let mut target = TargetBitmap::new(2, 1, 2, &mut buf).unwrap();
        let stats = encode_distances(&map, &params(4), &mut target).unwrap();
        assert_eq!(buf[0], 255);
        assert_eq!(buf[1], 0);
        assert_eq!(stats.clamped_cells, 2);
    }

    #[test]
    fn inside_is_above_midpoint_outside_below() {
        let mut map = fresh_map(2, 1);
        let near = FixedVec::new(F16Dot16::from_int(2), F16Dot16::ZERO);
        set_cell(&mut map, 0, 0, near, F16Dot16::ONE);
        set_cell(&mut map, 1, 0, near, F16Dot16::ZERO);
        let mut buf = [0_u8; 2];
        let mut target = TargetBitmap::new(2, 1, 2, &mut buf).unwrap();
        encode_distances(&map, &params(8), &mut target).unwrap();
        assert!(buf[0] > 128, "interior cell must encode above 128");
        assert!(buf[1] < 128, "exterior cell must encode below 128");
        // Same distance either side of the boundary is symmetric around
        // the midpoint.
        assert_eq!(u16::from(buf[0]) + u16::from(buf[1]), 255);
    }

    #[test]
    fn farther_exterior_cells_encode_lower() {
        let spread = 8;
        let mut map = fresh_map(4, 1);
        for x in 0..4_u32 {
            let near = FixedVec::new(F16Dot16::from_int(i32::try_from(x).unwrap()), F16Dot16::ZERO);
            set_cell(&mut map, x, 0, near, F16Dot16::ZERO);
        }
        let mut buf = [0_u8; 4];
        let mut target = TargetBitmap::new(4, 1, 4, &mut buf).unwrap();
        encode_distances(&map, &params(spread), &mut target).unwrap();
        // Exterior distances grow with x, so bytes must fall.
        assert!(buf[0] > buf[1] && buf[1] > buf[2] && buf[2] > buf[3]);
    }

    #[test]
    fn flip_y_writes_rows_bottom_up() {
        let mut map = fresh_map(1, 2);
        set_cell(&mut map, 0, 0, FixedVec::ZERO, F16Dot16::ONE);
        set_cell(
            &mut map,
            0,
            1,
            FixedVec::new(F16Dot16::from_int(3), F16Dot16::ZERO),
            F16Dot16::ZERO,
        );
        let mut plain = [0_u8; 2];
        let mut target = TargetBitmap::new(1, 2, 1, &mut plain).unwrap();
        encode_distances(&map, &params(8), &mut target).unwrap();

        let mut flipped = [0_u8; 2];
        let mut target = TargetBitmap::new(1, 2, 1, &mut flipped).unwrap();
        let flip = RasterParams {
            flip_y: true,
            ..params(8)
        };
        encode_distances(&map, &flip, &mut target).unwrap();

        assert_eq!(plain[0], flipped[1]);
        assert_eq!(plain[1], flipped[0]);
        assert_ne!(plain[0], plain[1]);
    }

    #[test]
    fn pitch_padding_left_untouched() {
        let mut map = fresh_map(2, 2);
        for y in 0..2 {
            for x in 0..2 {
                set_cell(&mut map, x, y, FixedVec::ZERO, F16Dot16::ONE);
            }
        }
        let mut buf = [7_u8; 6];
        let mut target = TargetBitmap::new(2, 2, 3, &mut buf).unwrap();
        encode_distances(&map, &params(8), &mut target).unwrap();
        assert_eq!(buf[2], 7);
        assert_eq!(buf[5], 7);
    }
}
