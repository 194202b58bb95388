//! Geometric primitives: points, sweep directions, and a few polygon helpers.

use std::cmp::Ordering;

use crate::num::{cmp_f64, CheapOrderedFloat};

/// A two-dimensional point.
///
/// Points are sorted by `y` and then by `x`. This is the sweep order of a
/// [`ScanDirection::Horizontal`] pass; use [`ScanDirection::compare`] for the
/// order of an arbitrary pass.
#[derive(Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    /// Vertical coordinate.
    pub y: f64,
    /// Horizontal coordinate.
    pub x: f64,
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        (
            CheapOrderedFloat::from(self.y),
            CheapOrderedFloat::from(self.x),
        )
            .cmp(&(
                CheapOrderedFloat::from(other.y),
                CheapOrderedFloat::from(other.x),
            ))
    }
}

impl PartialOrd for Point {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Point {}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl Point {
    /// Create a new point.
    ///
    /// Note that the `x` coordinate comes first, even though points sort by `y`
    /// first.
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Converts to a `kurbo` point.
    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(self.x, self.y)
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub(crate) fn has_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// The axis along which a sweep pass moves.
///
/// A rectilinear router sweeps once per axis. The *sweep coordinate* of a
/// point is its position along the direction of motion, and its
/// *perpendicular coordinate* is its position along the scan line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ScanDirection {
    /// The scan line is parallel to the x axis and moves toward increasing y.
    Horizontal,
    /// The scan line is parallel to the y axis and moves toward increasing x.
    Vertical,
}

impl ScanDirection {
    /// Both directions, in the order a full routing pass runs them.
    pub const ALL: [ScanDirection; 2] = [ScanDirection::Horizontal, ScanDirection::Vertical];

    /// The coordinate along the direction of motion.
    #[inline]
    pub fn sweep_coord(self, p: Point) -> f64 {
        match self {
            ScanDirection::Horizontal => p.y,
            ScanDirection::Vertical => p.x,
        }
    }

    /// The coordinate along the scan line.
    #[inline]
    pub fn perp_coord(self, p: Point) -> f64 {
        match self {
            ScanDirection::Horizontal => p.x,
            ScanDirection::Vertical => p.y,
        }
    }

    /// Builds a point from its sweep and perpendicular coordinates.
    #[inline]
    pub fn point(self, sweep: f64, perp: f64) -> Point {
        match self {
            ScanDirection::Horizontal => Point::new(perp, sweep),
            ScanDirection::Vertical => Point::new(sweep, perp),
        }
    }

    /// The other direction.
    pub fn perpendicular(self) -> ScanDirection {
        match self {
            ScanDirection::Horizontal => ScanDirection::Vertical,
            ScanDirection::Vertical => ScanDirection::Horizontal,
        }
    }

    /// Sweep order: by sweep coordinate, then by perpendicular coordinate.
    pub fn compare(self, a: Point, b: Point) -> Ordering {
        cmp_f64(self.sweep_coord(a), self.sweep_coord(b))
            .then_with(|| cmp_f64(self.perp_coord(a), self.perp_coord(b)))
    }

    /// Compares only the sweep coordinates.
    pub fn compare_sweep(self, a: Point, b: Point) -> Ordering {
        cmp_f64(self.sweep_coord(a), self.sweep_coord(b))
    }

    /// Compares only the perpendicular coordinates.
    pub fn compare_perp(self, a: Point, b: Point) -> Ordering {
        cmp_f64(self.perp_coord(a), self.perp_coord(b))
    }

    /// Is the segment from `a` to `b` parallel to the scan line?
    pub fn is_flat(self, a: Point, b: Point) -> bool {
        self.sweep_coord(a) == self.sweep_coord(b)
    }

    /// The range of sweep coordinates covered by a rectangle.
    pub fn sweep_range(self, rect: &kurbo::Rect) -> (f64, f64) {
        match self {
            ScanDirection::Horizontal => (rect.min_y(), rect.max_y()),
            ScanDirection::Vertical => (rect.min_x(), rect.max_x()),
        }
    }

    /// The range of perpendicular coordinates covered by a rectangle.
    pub fn perp_range(self, rect: &kurbo::Rect) -> (f64, f64) {
        self.perpendicular().sweep_range(rect)
    }
}

/// A compass direction, with north pointing toward increasing `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    /// Toward increasing `y`.
    North,
    /// Toward increasing `x`.
    East,
    /// Toward decreasing `y`.
    South,
    /// Toward decreasing `x`.
    West,
}

impl Direction {
    /// The dominant direction of travel from `a` to `b`.
    ///
    /// Ties between the axes go to the horizontal one; `a == b` gives `East`.
    pub fn between(a: Point, b: Point) -> Direction {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        if dy.abs() > dx.abs() {
            if dy > 0.0 {
                Direction::North
            } else {
                Direction::South
            }
        } else if dx < 0.0 {
            Direction::West
        } else {
            Direction::East
        }
    }

    /// The opposite direction.
    pub fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Twice the signed area of the triangle `a, b, c`: positive if they turn counter-clockwise.
pub(crate) fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn cyclic_pairs(points: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    points
        .iter()
        .copied()
        .zip(points.iter().copied().cycle().skip(1))
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    cross(a, b, p) == 0.0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

/// Is `p` inside the closed polygon, counting the boundary as inside?
pub(crate) fn polygon_contains(polygon: &[Point], p: Point) -> bool {
    let mut inside = false;
    for (a, b) in cyclic_pairs(polygon) {
        if on_segment(a, b, p) {
            return true;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Where the segment `p0 -> p1` meets the polygon's boundary, as pairs of
/// segment parameter `t` in `[0, 1]` and point, in increasing order of `t`.
///
/// Where the segment runs along a polygon edge, both ends of the overlap are
/// reported.
pub(crate) fn boundary_hits(polygon: &[Point], p0: Point, p1: Point) -> Vec<(f64, Point)> {
    let d = (p1.x - p0.x, p1.y - p0.y);
    let on_p0_p1 = |mut q: Point| {
        if p0.x == p1.x {
            q.x = p0.x;
        }
        if p0.y == p1.y {
            q.y = p0.y;
        }
        q
    };
    let mut ret = Vec::new();
    for (a, b) in cyclic_pairs(polygon) {
        let e = (b.x - a.x, b.y - a.y);
        let denom = d.0 * e.1 - d.1 * e.0;
        let w = (a.x - p0.x, a.y - p0.y);
        if denom != 0.0 {
            let t = (w.0 * e.1 - w.1 * e.0) / denom;
            let s = (w.0 * d.1 - w.1 * d.0) / denom;
            if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&s) {
                ret.push((t, on_p0_p1(affine(a, b, s))));
            }
        } else if cross(p0, p1, a) == 0.0 {
            let len2 = d.0 * d.0 + d.1 * d.1;
            if len2 == 0.0 {
                continue;
            }
            let param = |q: Point| ((q.x - p0.x) * d.0 + (q.y - p0.y) * d.1) / len2;
            let (ta, tb) = (param(a), param(b));
            let (lo, lo_pt) = if ta.min(tb) <= 0.0 {
                (0.0, p0)
            } else if ta < tb {
                (ta, a)
            } else {
                (tb, b)
            };
            let (hi, hi_pt) = if ta.max(tb) >= 1.0 {
                (1.0, p1)
            } else if ta > tb {
                (ta, a)
            } else {
                (tb, b)
            };
            if lo <= hi {
                ret.push((lo, lo_pt));
                ret.push((hi, hi_pt));
            }
        }
    }
    ret.sort_by(|a, b| cmp_f64(a.0, b.0));
    ret.dedup_by(|a, b| a.0 == b.0);
    ret
}

/// Compute an affine combination between `a` and `b`; that is, `(1 - t) * a + t * b`.
///
/// Coordinates that `a` and `b` share come out exactly.
pub(crate) fn affine(a: Point, b: Point, t: f64) -> Point {
    if t == 0.0 {
        return a;
    } else if t == 1.0 {
        return b;
    }
    let lerp = |u: f64, v: f64| if u == v { u } else { (1.0 - t) * u + t * v };
    Point::new(lerp(a.x, b.x), lerp(a.y, b.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn directions_swap_coordinates() {
        let p = Point::new(1.0, 2.0);
        assert_eq!(ScanDirection::Horizontal.sweep_coord(p), 2.0);
        assert_eq!(ScanDirection::Horizontal.perp_coord(p), 1.0);
        assert_eq!(ScanDirection::Vertical.sweep_coord(p), 1.0);
        assert_eq!(ScanDirection::Vertical.perp_coord(p), 2.0);
        for dir in ScanDirection::ALL {
            assert_eq!(dir.point(dir.sweep_coord(p), dir.perp_coord(p)), p);
        }
    }

    #[test]
    fn horizontal_order_is_point_order() {
        let a = Point::new(5.0, 0.0);
        let b = Point::new(0.0, 1.0);
        assert_eq!(ScanDirection::Horizontal.compare(a, b), a.cmp(&b));
        assert_eq!(ScanDirection::Vertical.compare(a, b), Ordering::Greater);
    }

    #[test]
    fn containment_includes_boundary() {
        let sq = square();
        assert!(polygon_contains(&sq, Point::new(5.0, 5.0)));
        assert!(polygon_contains(&sq, Point::new(0.0, 5.0)));
        assert!(polygon_contains(&sq, Point::new(10.0, 10.0)));
        assert!(!polygon_contains(&sq, Point::new(10.5, 5.0)));
        assert!(!polygon_contains(&sq, Point::new(-1.0, -1.0)));
    }

    #[test]
    fn boundary_hits_of_crossing_segment() {
        let hits = boundary_hits(&square(), Point::new(-10.0, 5.0), Point::new(20.0, 5.0));
        assert_eq!(
            hits,
            vec![
                (1.0 / 3.0, Point::new(0.0, 5.0)),
                (2.0 / 3.0, Point::new(10.0, 5.0))
            ]
        );
    }

    #[test]
    fn boundary_hits_of_overlapping_segment() {
        let hits = boundary_hits(&square(), Point::new(5.0, 0.0), Point::new(20.0, 0.0));
        assert_eq!(hits[0], (0.0, Point::new(5.0, 0.0)));
        assert_eq!(*hits.last().unwrap(), (1.0 / 3.0, Point::new(10.0, 0.0)));
    }

    #[test]
    fn compass() {
        let o = Point::new(0.0, 0.0);
        assert_eq!(Direction::between(o, Point::new(0.0, 3.0)), Direction::North);
        assert_eq!(Direction::between(o, Point::new(-3.0, 1.0)), Direction::West);
        assert_eq!(Direction::North.reverse(), Direction::South);
    }
}
