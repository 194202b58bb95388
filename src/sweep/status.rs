//! The status line: obstacle sides currently crossing the scan line.

use std::{cmp::Ordering, collections::BTreeSet, ops::Bound};

use crate::{
    num::cmp_f64,
    obstacles::ObstacleSide,
    Point, ScanDirection,
};

// A key in the status line's tree.
//
// Only `Side`s are ever stored. The probes are for searching: a `Below` probe
// sorts before every side passing through its point and an `Above` probe
// after, so that no stored key is ever equal to a probe.
#[derive(Clone, Copy, Debug)]
enum Entry {
    Side(ObstacleSide),
    Below(Point, ScanDirection),
    Above(Point, ScanDirection),
}

impl Entry {
    fn probe(&self) -> Option<(Point, ScanDirection, Ordering)> {
        match self {
            Entry::Side(_) => None,
            Entry::Below(p, dir) => Some((*p, *dir, Ordering::Less)),
            Entry::Above(p, dir) => Some((*p, *dir, Ordering::Greater)),
        }
    }
}

/// Compares two sides that are both active at some sweep coordinate.
///
/// Sides don't cross, so comparing them anywhere in their common sweep range
/// gives the same answer, except where they touch. We try the start of the
/// common range and then its end.
fn cmp_sides(a: &ObstacleSide, b: &ObstacleSide) -> Ordering {
    let lo = a.start_sweep().max(b.start_sweep());
    let hi = a.end_sweep().min(b.end_sweep());
    cmp_f64(a.perp_at(lo), b.perp_at(lo))
        .then_with(|| cmp_f64(a.perp_at(hi), b.perp_at(hi)))
        .then_with(|| {
            if a.obstacle == b.obstacle {
                a.kind.cmp(&b.kind)
            } else {
                // Between different obstacles that overlap along a side, the
                // high side comes first.
                b.kind.cmp(&a.kind).then(a.obstacle.cmp(&b.obstacle))
            }
        })
        .then_with(|| a.dir.compare(a.start, b.start))
        .then_with(|| a.dir.compare(a.end, b.end))
}

fn cmp_probe(side: &ObstacleSide, p: Point, dir: ScanDirection, tie: Ordering) -> Ordering {
    cmp_f64(side.perp_at(dir.sweep_coord(p)), dir.perp_coord(p)).then(tie.reverse())
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Entry::Side(a), Entry::Side(b)) => cmp_sides(a, b),
            (Entry::Side(a), _) => {
                let (p, dir, tie) = other.probe().unwrap_or_else(|| unreachable!());
                cmp_probe(a, p, dir, tie)
            }
            (_, Entry::Side(b)) => {
                let (p, dir, tie) = self.probe().unwrap_or_else(|| unreachable!());
                cmp_probe(b, p, dir, tie).reverse()
            }
            _ => {
                let (p, dir, tie) = self.probe().unwrap_or_else(|| unreachable!());
                let (q, _, other_tie) = other.probe().unwrap_or_else(|| unreachable!());
                dir.compare_perp(p, q)
                    .then(dir.compare_sweep(p, q))
                    .then(tie.cmp(&other_tie))
            }
        }
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

/// The obstacle sides that cross the scan line, ordered along it.
///
/// Every side in here is active at the current sweep position. Since obstacle
/// sides don't cross one another, their order along the scan line stays the
/// same for as long as they're all active; this is what lets us keep them in
/// a `BTreeSet` even though their positions change as the sweep moves.
#[derive(Clone, Debug)]
pub struct StatusLine {
    dir: ScanDirection,
    sides: BTreeSet<Entry>,
}

impl StatusLine {
    /// Creates an empty status line for a sweep in direction `dir`.
    pub fn new(dir: ScanDirection) -> Self {
        StatusLine {
            dir,
            sides: BTreeSet::new(),
        }
    }

    /// Adds a side, returning `false` if it was already there.
    pub fn insert(&mut self, side: ObstacleSide) -> bool {
        debug_assert_eq!(side.dir, self.dir);
        self.sides.insert(Entry::Side(side))
    }

    /// Removes a side, returning `false` if it wasn't there.
    pub fn remove(&mut self, side: &ObstacleSide) -> bool {
        self.sides.remove(&Entry::Side(*side))
    }

    /// The nearest side strictly above `p` on the scan line through `p`.
    pub fn above(&self, p: Point) -> Option<&ObstacleSide> {
        self.sides
            .range((Bound::Excluded(Entry::Above(p, self.dir)), Bound::Unbounded))
            .next()
            .map(Entry::side)
    }

    /// The nearest side strictly below `p` on the scan line through `p`.
    pub fn below(&self, p: Point) -> Option<&ObstacleSide> {
        self.sides
            .range((Bound::Unbounded, Bound::Excluded(Entry::Below(p, self.dir))))
            .next_back()
            .map(Entry::side)
    }

    /// The side immediately above `side`.
    pub fn next_high(&self, side: &ObstacleSide) -> Option<&ObstacleSide> {
        self.sides
            .range((Bound::Excluded(Entry::Side(*side)), Bound::Unbounded))
            .next()
            .map(Entry::side)
    }

    /// The side immediately below `side`.
    pub fn next_low(&self, side: &ObstacleSide) -> Option<&ObstacleSide> {
        self.sides
            .range((Bound::Unbounded, Bound::Excluded(Entry::Side(*side))))
            .next_back()
            .map(Entry::side)
    }

    /// Iterates over the sides from low to high.
    pub fn iter(&self) -> impl Iterator<Item = &ObstacleSide> + '_ {
        self.sides.iter().map(Entry::side)
    }

    /// The number of active sides.
    pub fn len(&self) -> usize {
        self.sides.len()
    }

    /// Are there no active sides?
    pub fn is_empty(&self) -> bool {
        self.sides.is_empty()
    }

    /// Checks that every side is active at sweep coordinate `sweep` and that
    /// the sides are in order there.
    ///
    /// This is slow, so it only does anything with the `slow-asserts` feature.
    pub fn check_invariants(&self, sweep: f64) {
        if !cfg!(feature = "slow-asserts") {
            return;
        }
        for side in self.iter() {
            assert!(
                side.start_sweep() <= sweep && sweep <= side.end_sweep(),
                "{side:?} isn't active at {sweep}"
            );
        }
        let sides: Vec<_> = self.iter().collect();
        for pair in sides.windows(2) {
            assert!(
                pair[0].perp_at(sweep) <= pair[1].perp_at(sweep),
                "{:?} and {:?} are out of order at {sweep}",
                pair[0],
                pair[1]
            );
        }
    }
}

impl Entry {
    fn side(&self) -> &ObstacleSide {
        match self {
            Entry::Side(s) => s,
            // Probes are never inserted.
            Entry::Below(..) | Entry::Above(..) => unreachable!(),
        }
    }
}

impl ObstacleSide {
    /// Is `self` below `other` in the status line?
    pub fn is_below(&self, other: &ObstacleSide) -> bool {
        cmp_sides(self, other).is_lt()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{obstacles::SideKind, ObstacleIdx};

    const H: ScanDirection = ScanDirection::Horizontal;

    fn side(o: usize, kind: SideKind, a: (f64, f64), b: (f64, f64)) -> ObstacleSide {
        ObstacleSide::new(ObstacleIdx(o), kind, a.into(), b.into(), H).unwrap()
    }

    // The two sides of an axis-aligned box.
    fn sides_of_box(o: usize, x0: f64, x1: f64, y0: f64, y1: f64) -> [ObstacleSide; 2] {
        [
            side(o, SideKind::Low, (x0, y0), (x0, y1)),
            side(o, SideKind::High, (x1, y0), (x1, y1)),
        ]
    }

    #[test]
    fn neighbors() {
        let mut status = StatusLine::new(H);
        let [a_lo, a_hi] = sides_of_box(0, 0.0, 10.0, 0.0, 10.0);
        let [b_lo, b_hi] = sides_of_box(1, 20.0, 30.0, 5.0, 15.0);
        for s in [b_hi, a_lo, b_lo, a_hi] {
            assert!(status.insert(s));
        }
        assert!(!status.insert(a_lo));
        assert_eq!(status.len(), 4);

        let p = Point::new(15.0, 7.0);
        assert_eq!(status.below(p), Some(&a_hi));
        assert_eq!(status.above(p), Some(&b_lo));

        // Strict: a point on a side doesn't see that side.
        let on = Point::new(10.0, 7.0);
        assert_eq!(status.below(on), Some(&a_lo));
        assert_eq!(status.above(on), Some(&b_lo));

        assert_eq!(status.next_high(&a_hi), Some(&b_lo));
        assert_eq!(status.next_low(&a_lo), None);
        assert_eq!(
            status.iter().copied().collect::<Vec<_>>(),
            vec![a_lo, a_hi, b_lo, b_hi]
        );

        assert!(status.remove(&a_hi));
        assert!(!status.remove(&a_hi));
        assert_eq!(status.below(p), Some(&a_lo));
        status.check_invariants(7.0);
    }

    #[test]
    fn shared_open_vertex() {
        // A diamond's two sides both start at its bottom vertex.
        let lo = side(0, SideKind::Low, (5.0, 0.0), (0.0, 5.0));
        let hi = side(0, SideKind::High, (5.0, 0.0), (10.0, 5.0));
        let mut status = StatusLine::new(H);
        status.insert(hi);
        status.insert(lo);
        assert_eq!(status.iter().copied().collect::<Vec<_>>(), vec![lo, hi]);

        let bottom = Point::new(5.0, 0.0);
        assert_eq!(status.above(bottom), None);
        assert_eq!(status.below(bottom), None);
        assert_eq!(status.above(Point::new(4.0, 0.0)), Some(&lo));
    }

    #[test]
    fn touching_boxes() {
        // Two boxes sharing a vertical edge: the high side comes first.
        let [_, a_hi] = sides_of_box(0, 0.0, 10.0, 0.0, 10.0);
        let [b_lo, _] = sides_of_box(1, 10.0, 20.0, 0.0, 10.0);
        assert!(a_hi.is_below(&b_lo));
        assert!(!b_lo.is_below(&a_hi));
    }

    proptest! {
        // A row of boxes, inserted in random order, comes out sorted.
        #[test]
        fn sorted_row(order in Just((0..8usize).collect::<Vec<_>>()).prop_shuffle(), y in 0.0f64..10.0) {
            let mut status = StatusLine::new(H);
            let boxes: Vec<_> = (0..8)
                .map(|i| sides_of_box(i, 20.0 * i as f64, 20.0 * i as f64 + 10.0, i as f64 * -0.5, 10.0 + i as f64))
                .collect();
            for i in order {
                for s in boxes[i] {
                    status.insert(s);
                }
            }
            let expected: Vec<_> = boxes.iter().flatten().copied().collect();
            prop_assert_eq!(status.iter().copied().collect::<Vec<_>>(), expected);
            for i in 0..7 {
                let between = Point::new(20.0 * i as f64 + 15.0, y);
                prop_assert_eq!(status.below(between), Some(&boxes[i][1]));
                prop_assert_eq!(status.above(between), Some(&boxes[i + 1][0]));
            }
        }
    }
}
