//! Pixel decoding and distance-map seeding.
//!
//! The decoder maps each source pixel to a normalized coverage sample
//! (0 = fully outside, 1 = fully inside, fractional = on the edge) and
//! centers the source within the target grid. Cells along the coverage
//! edge are then seeded with a sub-pixel distance estimate derived from
//! the local coverage gradient; everything else keeps the "no candidate"
//! sentinel and is resolved later by the sweep engine.
//!
//! Coverage is tracked separately from the seeded distance so the final
//! sign is defined even for cells whose distance is still unknown
//! (padding beyond the source, deep interior).

use crate::bitmap::{PixelFormat, SourceBitmap};
use crate::fixed::{F16Dot16, FixedVec};
use crate::map::{DIST_SQ_UNKNOWN, DistanceCell, DistanceMap};
use crate::types::SdfError;

/// sqrt(2) in 16.16, the cardinal-neighbor weight of the gradient kernel.
const SQRT2: F16Dot16 = F16Dot16::from_bits(92_682);

/// The 8-neighborhood, in scan order.
const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Counters produced by seeding, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedStats {
    /// Number of cells classified as edge cells and given an initial
    /// distance.
    pub edge_cells: u64,
}

/// Reads one pixel's coverage from a source bitmap. `x` and `y` are
/// source pixel coordinates with any vertical flip already resolved.
type CoverageReader = fn(&SourceBitmap<'_>, u32, u32) -> F16Dot16;

/// Pick the decode strategy for a pixel format.
///
/// All strategies share the same output contract: a 16.16 coverage
/// sample in `[0, 1]` with full coverage mapping to exactly 1.0.
fn coverage_reader(format: PixelFormat) -> Result<CoverageReader, SdfError> {
    match format {
        PixelFormat::Gray => Ok(gray_coverage),
        PixelFormat::Mono => Ok(mono_coverage),
        PixelFormat::None => Err(SdfError::InvalidArgument("source pixel format not set")),
        other => Err(SdfError::UnsupportedFormat(other)),
    }
}

/// Check that a format can be decoded, without decoding anything.
///
/// Used by the driver to reject unsupported sources before the working
/// map is allocated.
pub(crate) fn ensure_decodable(format: PixelFormat) -> Result<(), SdfError> {
    coverage_reader(format).map(|_| ())
}

/// 8-bit grayscale coverage.
///
/// The sample 255 is promoted to 256 before the 0.8 -> 16.16 shift so a
/// fully covered pixel yields exactly `F16Dot16::ONE` rather than the
/// truncated 255/256 — the top of the sample range is reserved for
/// "completely inside".
fn gray_coverage(source: &SourceBitmap<'_>, x: u32, y: u32) -> F16Dot16 {
    let mut sample = i32::from(source.row_byte(x, y));
    if sample == 255 {
        sample = 256;
    }
    F16Dot16::from_bits(sample << 8)
}

/// 1-bit monochrome coverage, MSB first: a set bit is fully inside.
fn mono_coverage(source: &SourceBitmap<'_>, x: u32, y: u32) -> F16Dot16 {
    let byte = source.row_byte(x / 8, y);
    let mask = 0x80_u8 >> (x % 8);
    if byte & mask == 0 {
        F16Dot16::ZERO
    } else {
        F16Dot16::ONE
    }
}

/// Decode the source bitmap into the distance map and seed edge cells.
///
/// The source is centered within the target grid (odd differences bias
/// the padding toward the top-left). Every cell is written: in-source
/// cells get their coverage, padding cells zero coverage, and both start
/// with the sentinel distance until edge seeding fills in the cells that
/// straddle the coverage boundary.
///
/// Seeding is deterministic: the same source and parameters always
/// produce an identical map.
///
/// # Errors
///
/// Returns [`SdfError::InvalidArgument`] when the map is smaller than
/// the source on either axis or the format was never set, and
/// [`SdfError::UnsupportedFormat`] for recognized but undecoded formats.
pub fn seed_distance_map(
    source: &SourceBitmap<'_>,
    map: &mut DistanceMap,
    flip_y: bool,
) -> Result<SeedStats, SdfError> {
    if map.width() < source.width() || map.rows() < source.height() {
        return Err(SdfError::InvalidArgument("target grid smaller than source bitmap"));
    }
    let read = coverage_reader(source.format())?;

    let x_pad = (map.width() - source.width()) / 2;
    let y_pad = (map.rows() - source.height()) / 2;

    // First pass: coverage for every cell, sentinel distances throughout.
    for ty in 0..map.rows() {
        for tx in 0..map.width() {
            let alpha = source_coords(tx, ty, x_pad, y_pad, source).map_or(
                F16Dot16::ZERO,
                |(sx, sy)| {
                    let row = if flip_y { source.height() - sy - 1 } else { sy };
                    read(source, sx, row)
                },
            );
            if let Some(cell) = map.get_mut(tx, ty) {
                *cell = DistanceCell {
                    dist_sq: DIST_SQ_UNKNOWN,
                    near: FixedVec::ZERO,
                    alpha,
                };
            }
        }
    }

    // Second pass: sub-pixel seeds for the cells on the coverage edge.
    let mut stats = SeedStats::default();
    for ty in 0..map.rows() {
        for tx in 0..map.width() {
            if !is_edge_cell(map, tx, ty) {
                continue;
            }
            let near = edge_offset(map, tx, ty);
            if let Some(cell) = map.get_mut(tx, ty) {
                cell.near = near;
                cell.dist_sq = near.length_sq();
                stats.edge_cells += 1;
            }
        }
    }

    Ok(stats)
}

/// Map a target cell back to source pixel coordinates, or `None` for
/// padding cells outside the centered source region.
fn source_coords(
    tx: u32,
    ty: u32,
    x_pad: u32,
    y_pad: u32,
    source: &SourceBitmap<'_>,
) -> Option<(u32, u32)> {
    let sx = tx.checked_sub(x_pad)?;
    let sy = ty.checked_sub(y_pad)?;
    (sx < source.width() && sy < source.height()).then_some((sx, sy))
}

/// Coverage at `(x, y)`, zero outside the grid.
fn alpha_at(map: &DistanceMap, x: i64, y: i64) -> F16Dot16 {
    if x < 0 || y < 0 {
        return F16Dot16::ZERO;
    }
    u32::try_from(x)
        .ok()
        .zip(u32::try_from(y).ok())
        .and_then(|(x, y)| map.get(x, y))
        .map_or(F16Dot16::ZERO, |cell| cell.alpha)
}

/// A cell is an edge cell when its coverage is strictly fractional, or
/// when it is fully covered but touches a fully empty 8-neighbor.
/// Neighbors beyond the grid count as empty, so full-coverage cells on
/// the grid border are edges and the interior field decays inward even
/// when the source fills the whole target.
fn is_edge_cell(map: &DistanceMap, x: u32, y: u32) -> bool {
    let alpha = map.get(x, y).map_or(F16Dot16::ZERO, |cell| cell.alpha);
    if alpha == F16Dot16::ZERO {
        return false;
    }
    if alpha < F16Dot16::ONE {
        return true;
    }
    NEIGHBORS_8.iter().any(|&(dx, dy)| {
        let nx = i64::from(x) + i64::from(dx);
        let ny = i64::from(y) + i64::from(dy);
        alpha_at(map, nx, ny) == F16Dot16::ZERO
    })
}

/// Estimate the offset from an edge cell's center to the coverage-0.5
/// iso-line.
///
/// The local gradient is approximated from the 8 neighbors (cardinals
/// weighted sqrt 2, diagonals 1) and the anti-aliased distance-transform
/// edge formula converts the cell's own coverage into a signed distance
/// along that gradient. The returned vector points at the estimated
/// boundary, so its squared length is a valid initial `dist_sq`.
fn edge_offset(map: &DistanceMap, x: u32, y: u32) -> FixedVec {
    let alpha = map.get(x, y).map_or(F16Dot16::ZERO, |cell| cell.alpha);
    let a = |dx: i32, dy: i32| alpha_at(map, i64::from(x) + i64::from(dx), i64::from(y) + i64::from(dy));

    let (nw, n, ne) = (a(-1, -1), a(0, -1), a(1, -1));
    let (w, e) = (a(-1, 0), a(1, 0));
    let (sw, s, se) = (a(-1, 1), a(0, 1), a(1, 1));

    let gx = (e - w).mul(SQRT2) + (ne - nw) + (se - sw);
    let gy = (s - n).mul(SQRT2) + (sw - nw) + (se - ne);

    if gx == F16Dot16::ZERO && gy == F16Dot16::ZERO {
        // Degenerate gradient (e.g. an isolated fractional pixel): the
        // direction is unknowable, so fall back to an axis-aligned guess.
        return FixedVec::new(F16Dot16::HALF - alpha, F16Dot16::ZERO);
    }

    let glen = FixedVec::new(gx, gy).length();
    let dir = FixedVec::new(gx.div(glen), gy.div(glen));
    let df = edge_distance(dir, alpha);
    FixedVec::new(dir.x.mul(df), dir.y.mul(df))
}

/// Distance from the cell center to the coverage-0.5 iso-line along the
/// normalized gradient `dir`, given the cell's coverage `alpha`.
///
/// Positive values point along the gradient (cell mostly outside),
/// negative against it (cell mostly inside).
fn edge_distance(dir: FixedVec, alpha: F16Dot16) -> F16Dot16 {
    let ax = dir.x.abs();
    let ay = dir.y.abs();
    // Order the components so ax >= ay; the formula is symmetric.
    let (ax, ay) = if ax >= ay { (ax, ay) } else { (ay, ax) };

    if ay == F16Dot16::ZERO {
        // Straight horizontal/vertical edge through the pixel.
        return F16Dot16::HALF - alpha;
    }

    // Coverage below `a1` (or above `1 - a1`) means the iso-line cuts a
    // corner triangle of the pixel; in between it crosses two opposite
    // sides.
    let a1 = ay.div(ax).mul(F16Dot16::HALF);
    let half_sum = (ax + ay).mul(F16Dot16::HALF);

    if alpha < a1 {
        let t = ax.mul(ay).mul(alpha);
        half_sum - (t + t).sqrt()
    } else if alpha < F16Dot16::ONE - a1 {
        (F16Dot16::HALF - alpha).mul(ax)
    } else {
        let t = ax.mul(ay).mul(F16Dot16::ONE - alpha);
        (t + t).sqrt() - half_sum
    }
}
