//! Splitting an obstacle's boundary into a low chain and a high chain.
//!
//! Relative to a sweep direction, the vertex that the sweep reaches first is
//! the *open* vertex and the one it reaches last is the *close* vertex. The
//! two boundary paths between them are the low chain (toward smaller
//! perpendicular coordinates) and the high chain. Every other vertex is a bend
//! on exactly one of the chains.

use arrayvec::ArrayVec;

use crate::{
    obstacles::{Obstacle, ObstacleSide, SideKind},
    Error, ObstacleIdx, Point, ScanDirection,
};

/// The role of an obstacle vertex in a sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum VertexClass {
    /// The first vertex the sweep reaches.
    Open,
    /// The last vertex the sweep reaches.
    Close,
    /// An interior vertex of the low chain.
    LowBend,
    /// An interior vertex of the high chain.
    HighBend,
}

/// An obstacle's boundary, split into chains for one sweep direction.
///
/// Both chains start at the open vertex and end at the close vertex, and
/// their sweep coordinates never decrease.
#[derive(Clone, Debug)]
pub struct ObstacleChains {
    obstacle: ObstacleIdx,
    dir: ScanDirection,
    points: Vec<Point>,
    low: Vec<usize>,
    high: Vec<usize>,
    // For each vertex, its class and its position in the chain it belongs to.
    class: Vec<(VertexClass, usize)>,
}

impl ObstacleChains {
    /// Classifies the vertices of a non-degenerate obstacle.
    ///
    /// Fails if the obstacle isn't monotone in the sweep direction, meaning
    /// some scan line would cut it into more than one piece.
    pub fn new(idx: ObstacleIdx, obstacle: &Obstacle, dir: ScanDirection) -> Result<Self, Error> {
        let points = obstacle.points();
        let n = points.len();
        debug_assert!(n >= 3);

        let open = (0..n)
            .min_by(|&a, &b| dir.compare(points[a], points[b]))
            .unwrap_or(0);
        let close = (0..n)
            .max_by(|&a, &b| dir.compare(points[a], points[b]))
            .unwrap_or(0);

        let walk = |step: usize| {
            let mut chain = vec![open];
            let mut i = open;
            while i != close {
                i = (i + step) % n;
                chain.push(i);
            }
            chain
        };
        let forward = walk(1);
        let backward = walk(n - 1);

        // Twice the signed area, with the perpendicular coordinate as the
        // horizontal axis and the sweep coordinate as the vertical one. When
        // positive, the boundary turns counter-clockwise and so leaves the
        // open vertex heading toward larger perpendicular coordinates.
        let area: f64 = (0..n)
            .map(|i| {
                let a = points[i];
                let b = points[(i + 1) % n];
                dir.perp_coord(a) * dir.sweep_coord(b) - dir.perp_coord(b) * dir.sweep_coord(a)
            })
            .sum();
        let (low, high) = if area > 0.0 {
            (backward, forward)
        } else {
            (forward, backward)
        };

        for chain in [&low, &high] {
            let monotone = chain
                .windows(2)
                .all(|w| dir.sweep_coord(points[w[0]]) <= dir.sweep_coord(points[w[1]]));
            if !monotone {
                return Err(Error::NonMonotoneObstacle {
                    obstacle: idx,
                    direction: dir,
                });
            }
        }

        let mut class = vec![(VertexClass::LowBend, 0); n];
        for (pos, &v) in low.iter().enumerate() {
            class[v] = (VertexClass::LowBend, pos);
        }
        for (pos, &v) in high.iter().enumerate() {
            class[v] = (VertexClass::HighBend, pos);
        }
        class[open] = (VertexClass::Open, 0);
        class[close] = (VertexClass::Close, 0);

        Ok(ObstacleChains {
            obstacle: idx,
            dir,
            points: points.to_vec(),
            low,
            high,
            class,
        })
    }

    /// The index of the open vertex.
    pub fn open(&self) -> usize {
        self.low[0]
    }

    /// The index of the close vertex.
    pub fn close(&self) -> usize {
        self.low[self.low.len() - 1]
    }

    /// The vertex at `idx`.
    pub fn point(&self, idx: usize) -> Point {
        self.points[idx]
    }

    /// The class of every vertex, in the obstacle's vertex order.
    pub fn classes(&self) -> impl Iterator<Item = (usize, VertexClass)> + '_ {
        self.class.iter().enumerate().map(|(v, (c, _))| (v, *c))
    }

    /// The class of the vertex at `idx`.
    pub fn class(&self, idx: usize) -> VertexClass {
        self.class[idx].0
    }

    /// The chain of the given kind, as vertex indices in sweep order.
    pub fn chain(&self, kind: SideKind) -> &[usize] {
        match kind {
            SideKind::Low => &self.low,
            SideKind::High => &self.high,
        }
    }

    fn position(&self, kind: SideKind, vertex: usize) -> Option<usize> {
        let (class, pos) = self.class[vertex];
        match (class, kind) {
            (VertexClass::Open, _) => Some(0),
            (VertexClass::Close, _) => Some(self.chain(kind).len() - 1),
            (VertexClass::LowBend, SideKind::Low) | (VertexClass::HighBend, SideKind::High) => {
                Some(pos)
            }
            _ => None,
        }
    }

    /// The vertex following `vertex` on chain `kind`, in sweep order.
    pub fn next(&self, kind: SideKind, vertex: usize) -> Option<usize> {
        let pos = self.position(kind, vertex)?;
        self.chain(kind).get(pos + 1).copied()
    }

    /// The vertex preceding `vertex` on chain `kind`, in sweep order.
    pub fn prev(&self, kind: SideKind, vertex: usize) -> Option<usize> {
        let pos = self.position(kind, vertex)?;
        pos.checked_sub(1).map(|p| self.chain(kind)[p])
    }

    /// The vertices adjacent to `vertex` along the boundary.
    pub fn neighbors(&self, vertex: usize) -> ArrayVec<usize, 2> {
        let n = self.points.len();
        let mut ret = ArrayVec::new();
        ret.push((vertex + n - 1) % n);
        ret.push((vertex + 1) % n);
        ret
    }

    /// The side of chain `kind` that starts at `vertex`, unless that side is
    /// flat or `vertex` is the end of the chain.
    pub fn side_from(&self, kind: SideKind, vertex: usize) -> Option<ObstacleSide> {
        let next = self.next(kind, vertex)?;
        ObstacleSide::new(
            self.obstacle,
            kind,
            self.points[vertex],
            self.points[next],
            self.dir,
        )
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use super::*;
    use crate::Obstacles;

    fn classify(points: &[(f64, f64)], dir: ScanDirection) -> Result<ObstacleChains, Error> {
        let mut obs = Obstacles::default();
        let idx = obs.add_obstacle(points.iter().copied(), None);
        ObstacleChains::new(idx, &obs[idx], dir)
    }

    fn classes(chains: &ObstacleChains) -> Vec<VertexClass> {
        chains.classes().map(|(_, c)| c).collect()
    }

    const SQUARE: [(f64, f64); 4] = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];

    #[test]
    fn rectangle_horizontal() {
        use VertexClass::*;
        let chains = classify(&SQUARE, ScanDirection::Horizontal).unwrap();
        assert_eq!(classes(&chains), vec![Open, HighBend, Close, LowBend]);
        assert_eq!(chains.chain(SideKind::Low), &[0, 3, 2]);
        assert_eq!(chains.chain(SideKind::High), &[0, 1, 2]);

        // The bottom is flat, so the high chain has no side at the open vertex.
        assert!(chains.side_from(SideKind::High, 0).is_none());
        let low = chains.side_from(SideKind::Low, 0).unwrap();
        assert_eq!(low.end, Point::new(0.0, 10.0));
        assert_eq!(chains.next(SideKind::High, 1), Some(2));
        assert_eq!(chains.next(SideKind::Low, 1), None);
    }

    #[test]
    fn rectangle_vertical() {
        use VertexClass::*;
        // Clockwise this time, to check that orientation doesn't matter.
        let cw: Vec<_> = SQUARE.iter().rev().copied().collect();
        let chains = classify(&cw, ScanDirection::Vertical).unwrap();
        // cw is TL, TR, BR, BL.
        assert_eq!(classes(&chains), vec![HighBend, Close, LowBend, Open]);
    }

    #[test]
    fn diamond() {
        use VertexClass::*;
        let chains = classify(
            &[(5.0, 0.0), (10.0, 5.0), (5.0, 10.0), (0.0, 5.0)],
            ScanDirection::Horizontal,
        )
        .unwrap();
        assert_eq!(classes(&chains), vec![Open, HighBend, Close, LowBend]);
        let high = chains.side_from(SideKind::High, 0).unwrap();
        assert_eq!(high.kind, SideKind::High);
        assert!(high.perp_delta() > 0.0);
        assert_eq!(chains.prev(SideKind::Low, 3), Some(0));
    }

    #[test]
    fn non_monotone() {
        let u = [
            (0.0, 0.0),
            (30.0, 0.0),
            (30.0, 30.0),
            (20.0, 30.0),
            (20.0, 10.0),
            (10.0, 10.0),
            (10.0, 30.0),
            (0.0, 30.0),
        ];
        assert_matches!(
            classify(&u, ScanDirection::Horizontal),
            Err(Error::NonMonotoneObstacle {
                direction: ScanDirection::Horizontal,
                ..
            })
        );
        assert!(classify(&u, ScanDirection::Vertical).is_ok());
    }

    proptest! {
        #[test]
        fn one_open_one_close(
            n in 3usize..12,
            rotation in 0.0f64..std::f64::consts::TAU,
            radius in 1.0f64..100.0,
            cx in -100.0f64..100.0,
            cy in -100.0f64..100.0,
        ) {
            let points: Vec<_> = (0..n)
                .map(|i| {
                    let theta = rotation + std::f64::consts::TAU * i as f64 / n as f64;
                    (cx + radius * theta.cos(), cy + radius * theta.sin())
                })
                .collect();
            for dir in ScanDirection::ALL {
                let chains = classify(&points, dir).unwrap();
                let cs = classes(&chains);
                prop_assert_eq!(cs.len(), n);
                prop_assert_eq!(cs.iter().filter(|c| **c == VertexClass::Open).count(), 1);
                prop_assert_eq!(cs.iter().filter(|c| **c == VertexClass::Close).count(), 1);
                let open = chains.point(chains.open());
                for (v, _) in chains.classes() {
                    prop_assert!(dir.compare(open, chains.point(v)).is_le());
                }
            }
        }
    }
}
