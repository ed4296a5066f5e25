//! 8-point sequential euclidean distance propagation.
//!
//! Two sweeps over the seeded map resolve every cell's nearest boundary
//! point. The forward sweep walks rows top to bottom, relaxing each cell
//! from its already-visited neighbors (the row above plus the cell to the
//! left, then a right-to-left pass within the row); the backward sweep
//! mirrors it bottom to top. A cell adopts a neighbor's candidate only
//! when the neighbor's boundary point, re-measured from this cell's
//! center, is strictly closer than what the cell already holds — ties
//! keep the incumbent.
//!
//! Comparisons use squared distances throughout; no square root is taken
//! here.

use crate::fixed::{F16Dot16, FixedVec};
use crate::map::DistanceMap;

/// Counters produced by propagation, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Cells improved during the forward sweep.
    pub forward_updates: u64,
    /// Cells improved during the backward sweep.
    pub backward_updates: u64,
}

/// Relax `(x, y)` from its neighbor at `(x + dx, y + dy)`.
///
/// The neighbor's offset vector is re-based onto this cell by adding the
/// grid step, and adopted when strictly closer. Returns `true` on an
/// update.
fn relax(map: &mut DistanceMap, x: u32, y: u32, dx: i32, dy: i32) -> bool {
    let nx = i64::from(x) + i64::from(dx);
    let ny = i64::from(y) + i64::from(dy);
    let (Ok(nx), Ok(ny)) = (u32::try_from(nx), u32::try_from(ny)) else {
        return false;
    };
    let Some(neighbor) = map.get(nx, ny).copied() else {
        return false;
    };
    if !neighbor.has_candidate() {
        return false;
    }
    let candidate = FixedVec::new(
        neighbor.near.x + F16Dot16::from_int(dx),
        neighbor.near.y + F16Dot16::from_int(dy),
    );
    let dist_sq = candidate.length_sq();
    let Some(cell) = map.get_mut(x, y) else {
        return false;
    };
    if dist_sq < cell.dist_sq {
        cell.dist_sq = dist_sq;
        cell.near = candidate;
        true
    } else {
        false
    }
}

/// Propagate seeded distances to every cell of the map.
///
/// After both sweeps every cell reachable from a seed holds a boundary
/// candidate; a map with no seeds at all is left untouched. The result is
/// deterministic for a given seeded map.
pub fn propagate(map: &mut DistanceMap) -> SweepStats {
    let mut stats = SweepStats::default();

    // Forward: top to bottom. Within each row, relax left-to-right from
    // the row above and the left neighbor, then right-to-left from the
    // right neighbor.
    for y in 0..map.rows() {
        for x in 0..map.width() {
            for (dx, dy) in [(-1, -1), (0, -1), (1, -1), (-1, 0)] {
                stats.forward_updates += u64::from(relax(map, x, y, dx, dy));
            }
        }
        for x in (0..map.width()).rev() {
            stats.forward_updates += u64::from(relax(map, x, y, 1, 0));
        }
    }

    // Backward: bottom to top, mirrored.
    for y in (0..map.rows()).rev() {
        for x in (0..map.width()).rev() {
            for (dx, dy) in [(1, 1), (0, 1), (-1, 1), (1, 0)] {
                stats.backward_updates += u64::from(relax(map, x, y, dx, dy));
            }
        }
        for x in 0..map.width() {
            stats.backward_updates += u64::from(relax(map, x, y, -1, 0));
        }
    }

    stats
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::map::{DIST_SQ_UNKNOWN, DistanceMap, HeapAllocator};

    fn fresh_map(width: u32, rows: u32) -> DistanceMap {
        DistanceMap::new(&HeapAllocator, width, rows).unwrap()
    }

    fn seed_point(map: &mut DistanceMap, x: u32, y: u32) {
        let cell = map.get_mut(x, y).unwrap();
        cell.dist_sq = 0;
        cell.near = FixedVec::ZERO;
    }

    #[test]
    fn empty_map_stays_empty() {
        let mut map = fresh_map(4, 4);
        let stats = propagate(&mut map);
        assert_eq!(stats, SweepStats::default());
        assert!(map.cells().iter().all(|c| !c.has_candidate()));
    }

    #[test]
    fn single_seed_reaches_every_cell() {
        let mut map = fresh_map(5, 5);
        seed_point(&mut map, 2, 2);
        propagate(&mut map);
        assert!(map.cells().iter().all(crate::map::DistanceCell::has_candidate));
    }

    #[test]
    fn single_seed_distances_are_exact() {
        // With one seed, every cell's nearest point is the seed itself,
        // so the propagated offsets are the exact grid offsets.
        let mut map = fresh_map(5, 5);
        seed_point(&mut map, 2, 2);
        propagate(&mut map);
        for y in 0..5_u32 {
            for x in 0..5_u32 {
                let cell = map.get(x, y).unwrap();
                let ex = F16Dot16::from_int(2 - x as i32);
                let ey = F16Dot16::from_int(2 - y as i32);
                let expected = FixedVec::new(ex, ey);
                assert_eq!(cell.near, expected, "offset at ({x}, {y})");
                assert_eq!(cell.dist_sq, expected.length_sq(), "distance at ({x}, {y})");
            }
        }
    }

    #[test]
    fn corner_seed_reaches_opposite_corner() {
        let mut map = fresh_map(8, 8);
        seed_point(&mut map, 0, 0);
        propagate(&mut map);
        let far = map.get(7, 7).unwrap();
        let expected = FixedVec::new(F16Dot16::from_int(-7), F16Dot16::from_int(-7));
        assert_eq!(far.near, expected);
        assert_eq!(far.dist_sq, expected.length_sq());
    }

    #[test]
    fn two_seeds_take_the_closer_one() {
        let mut map = fresh_map(9, 1);
        seed_point(&mut map, 0, 0);
        seed_point(&mut map, 8, 0);
        propagate(&mut map);
        // Cell 2 is closer to the left seed, cell 6 to the right one.
        assert_eq!(
            map.get(2, 0).unwrap().near,
            FixedVec::new(F16Dot16::from_int(-2), F16Dot16::ZERO),
        );
        assert_eq!(
            map.get(6, 0).unwrap().near,
            FixedVec::new(F16Dot16::from_int(2), F16Dot16::ZERO),
        );
    }

    #[test]
    fn equidistant_seeds_still_give_minimal_distance() {
        let mut map = fresh_map(5, 1);
        seed_point(&mut map, 0, 0);
        seed_point(&mut map, 4, 0);
        propagate(&mut map);
        // The middle cell is 2 pixels from either seed; whichever
        // candidate wins, the distance is the minimum.
        let middle = map.get(2, 0).unwrap();
        assert_eq!(middle.dist_sq, (2_i64 * 2) << 32);
    }

    #[test]
    fn converged_map_sees_no_further_updates() {
        let mut map = fresh_map(6, 6);
        seed_point(&mut map, 1, 4);
        propagate(&mut map);
        let again = propagate(&mut map);
        assert_eq!(again, SweepStats::default());
    }

    #[test]
    fn sub_pixel_seed_offset_is_carried() {
        // A seed whose boundary point sits half a pixel to its right:
        // the neighbor two cells left must see 2.5 pixels.
        let mut map = fresh_map(5, 1);
        let near = FixedVec::new(F16Dot16::HALF, F16Dot16::ZERO);
        let cell = map.get_mut(2, 0).unwrap();
        cell.near = near;
        cell.dist_sq = near.length_sq();
        propagate(&mut map);
        let left = map.get(0, 0).unwrap();
        let expected = FixedVec::new(
            F16Dot16::from_int(2) + F16Dot16::HALF,
            F16Dot16::ZERO,
        );
        assert_eq!(left.near, expected);
        assert_eq!(left.dist_sq, expected.length_sq());
    }

    #[test]
    fn distances_never_increase() {
        let mut map = fresh_map(7, 7);
        seed_point(&mut map, 3, 3);
        seed_point(&mut map, 0, 6);
        propagate(&mut map);
        let after_first: Vec<i64> = map.cells().iter().map(|c| c.dist_sq).collect();
        propagate(&mut map);
        for (cell, before) in map.cells().iter().zip(after_first) {
            assert!(cell.dist_sq <= before);
        }
    }

    #[test]
    fn unseeded_region_keeps_sentinel_only_when_unreachable() {
        let mut map = fresh_map(3, 3);
        seed_point(&mut map, 1, 1);
        propagate(&mut map);
        assert!(map.cells().iter().all(|c| c.dist_sq != DIST_SQ_UNKNOWN));
    }
}
