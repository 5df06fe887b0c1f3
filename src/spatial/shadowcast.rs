//! Recursive shadowcasting field of view
//!
//! Scans each of the eight octants row by row outward from the origin,
//! tracking the still-visible angular window as a pair of slopes. Slopes
//! are compared as exact rationals built from half-cell offsets, so no
//! floating point error can leak light into a neighbouring cell.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::core::types::Position;
use crate::spatial::grid::Grid;

/// Octant transforms `(xx, xy, yx, yy)`
const OCTANTS: [(i32, i32, i32, i32); 8] = [
    (1, 0, 0, 1),
    (0, 1, 1, 0),
    (0, -1, 1, 0),
    (-1, 0, 0, 1),
    (-1, 0, 0, -1),
    (0, -1, -1, 0),
    (0, 1, -1, 0),
    (1, 0, 0, -1),
];

/// Rational slope `num / den` with `den > 0`
#[derive(Debug, Clone, Copy)]
struct Slope {
    num: i64,
    den: i64,
}

impl Slope {
    fn new(num: i64, den: i64) -> Self {
        if den < 0 {
            Self { num: -num, den: -den }
        } else {
            Self { num, den }
        }
    }

    /// Slope through the cell corner nearer the window start: `(dx - 0.5) / (dy + 0.5)`
    fn leading(dx: i32, dy: i32) -> Self {
        Self::new(2 * dx as i64 - 1, 2 * dy as i64 + 1)
    }

    /// Slope through the far corner: `(dx + 0.5) / (dy - 0.5)`
    fn trailing(dx: i32, dy: i32) -> Self {
        Self::new(2 * dx as i64 + 1, 2 * dy as i64 - 1)
    }
}

impl PartialEq for Slope {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Slope {}

impl Ord for Slope {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.num * other.den).cmp(&(other.num * self.den))
    }
}

impl PartialOrd for Slope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct Scan<'a> {
    snapshot: &'a Grid<u8>,
    origin: Position,
    radius: i32,
    radius_sq: i64,
    opacity_threshold: u8,
    visible: BTreeSet<Position>,
}

impl Scan<'_> {
    /// Out-of-grid cells are opaque and never visible
    fn is_opaque(&self, pos: Position) -> bool {
        self.snapshot
            .get(pos)
            .map_or(true, |&value| value > self.opacity_threshold)
    }

    fn cast_light(
        &mut self,
        row: i32,
        mut start: Slope,
        end: Slope,
        (xx, xy, yx, yy): (i32, i32, i32, i32),
    ) {
        if start < end {
            return;
        }
        let mut new_start = start;

        for j in row..=self.radius {
            let dy = -j;
            let mut dx = -j - 1;
            let mut blocked = false;

            while dx <= 0 {
                dx += 1;
                let pos = Position::new(
                    self.origin.row + dx * yx + dy * yy,
                    self.origin.col + dx * xx + dy * xy,
                );
                let leading = Slope::leading(dx, dy);
                let trailing = Slope::trailing(dx, dy);

                if start < trailing {
                    continue;
                } else if end > leading {
                    break;
                }

                let dist_sq = (dx as i64) * (dx as i64) + (dy as i64) * (dy as i64);
                if dist_sq < self.radius_sq && self.snapshot.in_bounds(pos) {
                    self.visible.insert(pos);
                }

                let opaque = self.is_opaque(pos);
                if blocked {
                    if opaque {
                        new_start = trailing;
                        continue;
                    }
                    blocked = false;
                    start = new_start;
                } else if opaque && j < self.radius {
                    // Blocker: scan the sub-window up to it, resume past it
                    blocked = true;
                    self.cast_light(j + 1, start, leading, (xx, xy, yx, yy));
                    new_start = trailing;
                }
            }

            if blocked {
                break;
            }
        }
    }
}

/// Cells visible from `origin` within `radius`
///
/// A cell whose snapshot value exceeds `opacity_threshold` is itself
/// visible but hides what lies behind it. A cell is visible only if its
/// squared distance from the origin is strictly below `radius²`; the origin
/// is always included, even with a zero radius or an opaque origin.
pub fn compute_visible(
    snapshot: &Grid<u8>,
    origin: Position,
    radius: i32,
    opacity_threshold: u8,
) -> BTreeSet<Position> {
    let radius = radius.max(0);
    let mut scan = Scan {
        snapshot,
        origin,
        radius,
        radius_sq: radius as i64 * radius as i64,
        opacity_threshold,
        visible: BTreeSet::new(),
    };
    scan.visible.insert(origin);

    for octant in OCTANTS {
        scan.cast_light(1, Slope::new(1, 1), Slope::new(0, 1), octant);
    }

    scan.visible
}
