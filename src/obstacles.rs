//! Obstacles, obstacle groups, and the sides that the sweep line tracks.

use crate::{
    geom::{cross, polygon_contains, ScanDirection},
    Error, Point,
};

typed_arena!(
    /// An index into the obstacle arena of an [`Obstacles`].
    ObstacleVec,
    ObstacleIdx,
    "o_"
);

typed_arena!(
    /// An index into the group arena of an [`Obstacles`].
    GroupVec,
    GroupIdx,
    "g_"
);

/// A closed polygon that routes must go around.
///
/// The vertex list is cleaned up on construction: repeated vertices (which
/// would make zero-length sides) and collinear vertices are dropped.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Obstacle {
    points: Vec<Point>,
    group: Option<GroupIdx>,
    zero_length_sides: usize,
}

impl Obstacle {
    fn new(points: impl IntoIterator<Item = Point>, group: Option<GroupIdx>) -> Self {
        let mut points: Vec<Point> = points.into_iter().collect();
        // A closed polyline may repeat its first point at the end.
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        let before = points.len();
        points.dedup();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        let zero_length_sides = before - points.len();

        // Removing one collinear vertex can make its neighbors collinear, so
        // keep going until nothing changes.
        loop {
            let n = points.len();
            if n < 3 {
                break;
            }
            let Some(i) = (0..n)
                .find(|&i| cross(points[(i + n - 1) % n], points[i], points[(i + 1) % n]) == 0.0)
            else {
                break;
            };
            points.remove(i);
        }

        Obstacle {
            points,
            group,
            zero_length_sides,
        }
    }

    /// The cleaned-up vertices, in their original cyclic order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The group that this obstacle belongs to, if any.
    pub fn group(&self) -> Option<GroupIdx> {
        self.group
    }

    /// How many zero-length sides were dropped during cleanup.
    pub fn zero_length_sides(&self) -> usize {
        self.zero_length_sides
    }

    /// An obstacle with fewer than three distinct, non-collinear vertices
    /// encloses no area, and the sweep skips it.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3
    }

    /// The bounding box of the obstacle's vertices.
    pub fn bounding_box(&self) -> Option<kurbo::Rect> {
        bounding_box(&self.points)
    }

    /// The smallest and largest sweep coordinates of this obstacle.
    pub fn sweep_extent(&self, dir: ScanDirection) -> (f64, f64) {
        self.points
            .iter()
            .map(|p| dir.sweep_coord(*p))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s), hi.max(s))
            })
    }
}

/// A nesting region for obstacles.
///
/// Groups are not obstacles: routes may cross their boundaries, but every
/// crossing is recorded on the edge that makes it.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Group {
    boundary: Vec<Point>,
    parent: Option<GroupIdx>,
}

impl Group {
    /// The closed boundary of this group.
    pub fn boundary(&self) -> &[Point] {
        &self.boundary
    }

    /// The group that directly contains this one.
    pub fn parent(&self) -> Option<GroupIdx> {
        self.parent
    }

    /// Does this group's region (boundary included) contain `p`?
    pub fn contains(&self, p: Point) -> bool {
        polygon_contains(&self.boundary, p)
    }
}

/// An arena of obstacles and their groups.
///
/// This is the read-only input to a sweep. Obstacles are indexed by
/// [`ObstacleIdx`] and groups by [`GroupIdx`]; both can be retrieved by
/// indexing with square brackets.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct Obstacles {
    obstacles: ObstacleVec<Obstacle>,
    groups: GroupVec<Group>,
}

impl Obstacles {
    /// Adds an obstacle with the given boundary, returning its index.
    pub fn add_obstacle<P: Into<Point>>(
        &mut self,
        points: impl IntoIterator<Item = P>,
        group: Option<GroupIdx>,
    ) -> ObstacleIdx {
        self.obstacles
            .push(Obstacle::new(points.into_iter().map(Into::into), group))
    }

    /// Adds a rectangular obstacle.
    pub fn add_rect(&mut self, rect: kurbo::Rect, group: Option<GroupIdx>) -> ObstacleIdx {
        self.add_obstacle(rect_points(rect), group)
    }

    /// Adds a group with the given boundary, returning its index.
    pub fn add_group<P: Into<Point>>(
        &mut self,
        boundary: impl IntoIterator<Item = P>,
        parent: Option<GroupIdx>,
    ) -> GroupIdx {
        self.groups.push(Group {
            boundary: boundary.into_iter().map(Into::into).collect(),
            parent,
        })
    }

    /// Adds a rectangular group.
    pub fn add_group_rect(&mut self, rect: kurbo::Rect, parent: Option<GroupIdx>) -> GroupIdx {
        self.add_group(rect_points(rect), parent)
    }

    /// The number of obstacles.
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// Are there no obstacles?
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Iterates over obstacles and their indices.
    pub fn obstacles(&self) -> impl Iterator<Item = (ObstacleIdx, &Obstacle)> + '_ {
        self.obstacles.iter()
    }

    /// Iterates over groups and their indices.
    pub fn groups(&self) -> impl Iterator<Item = (GroupIdx, &Group)> + '_ {
        self.groups.iter()
    }

    /// The number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// The box containing every obstacle and group, or `None` if there are neither.
    pub fn bounding_box(&self) -> Option<kurbo::Rect> {
        self.obstacles
            .iter()
            .map(|(_, o)| o.points.as_slice())
            .chain(self.groups.iter().map(|(_, g)| g.boundary.as_slice()))
            .filter_map(bounding_box)
            .reduce(|a, b| a.union(b))
    }

    /// Checks that the input is something we can sweep.
    ///
    /// Coordinates must be finite, group references must exist, and every
    /// obstacle must lie within its declared group.
    pub fn validate(&self) -> Result<(), Error> {
        let all_points = self
            .obstacles
            .iter()
            .flat_map(|(_, o)| o.points.iter())
            .chain(self.groups.iter().flat_map(|(_, g)| g.boundary.iter()));
        check_points(all_points)?;

        for (_, group) in self.groups.iter() {
            if let Some(parent) = group.parent {
                self.groups.get(parent).ok_or(Error::UnknownGroup(parent))?;
            }
        }
        for (idx, obstacle) in self.obstacles.iter() {
            let Some(group_idx) = obstacle.group else {
                continue;
            };
            let group = self
                .groups
                .get(group_idx)
                .ok_or(Error::UnknownGroup(group_idx))?;
            if !obstacle.points.iter().all(|p| group.contains(*p)) {
                return Err(Error::ObstacleOutsideGroup {
                    obstacle: idx,
                    group: group_idx,
                });
            }
        }
        Ok(())
    }
}

impl std::ops::Index<ObstacleIdx> for Obstacles {
    type Output = Obstacle;

    fn index(&self, index: ObstacleIdx) -> &Obstacle {
        &self.obstacles[index]
    }
}

impl std::ops::Index<GroupIdx> for Obstacles {
    type Output = Group;

    fn index(&self, index: GroupIdx) -> &Group {
        &self.groups[index]
    }
}

/// Returns an error if any point is infinite or NaN.
pub(crate) fn check_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Result<(), Error> {
    for p in points {
        if p.has_nan() {
            return Err(Error::NaN);
        }
        if !p.is_finite() {
            return Err(Error::Infinity);
        }
    }
    Ok(())
}

pub(crate) fn bounding_box(points: &[Point]) -> Option<kurbo::Rect> {
    let (first, rest) = points.split_first()?;
    let rect = kurbo::Rect::from_points(first.to_kurbo(), first.to_kurbo());
    Some(rest.iter().fold(rect, |r, p| r.union_pt(p.to_kurbo())))
}

fn rect_points(rect: kurbo::Rect) -> [Point; 4] {
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ]
}

/// Which boundary chain of its obstacle a side belongs to.
///
/// Relative to the scan line, the obstacle's interior is on the high side of
/// a `Low` side and on the low side of a `High` side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum SideKind {
    /// A side on the low-perpendicular boundary chain.
    Low,
    /// A side on the high-perpendicular boundary chain.
    High,
}

/// A boundary segment of an obstacle, in sweep order.
///
/// `start` has the smaller sweep coordinate. Sides that are parallel to the
/// scan line are never built; the sweep handles those at vertex events.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ObstacleSide {
    /// The obstacle whose boundary this is.
    pub obstacle: ObstacleIdx,
    /// Which chain of the obstacle this side is on.
    pub kind: SideKind,
    /// The endpoint with the smaller sweep coordinate.
    pub start: Point,
    /// The endpoint with the larger sweep coordinate.
    pub end: Point,
    /// The direction that `start` and `end` are ordered in.
    pub dir: ScanDirection,
}

impl ObstacleSide {
    pub(crate) fn new(
        obstacle: ObstacleIdx,
        kind: SideKind,
        a: Point,
        b: Point,
        dir: ScanDirection,
    ) -> Option<Self> {
        if dir.is_flat(a, b) {
            return None;
        }
        let (start, end) = if dir.sweep_coord(a) < dir.sweep_coord(b) {
            (a, b)
        } else {
            (b, a)
        };
        Some(ObstacleSide {
            obstacle,
            kind,
            start,
            end,
            dir,
        })
    }

    /// The sweep coordinate where this side begins.
    pub fn start_sweep(&self) -> f64 {
        self.dir.sweep_coord(self.start)
    }

    /// The sweep coordinate where this side ends.
    pub fn end_sweep(&self) -> f64 {
        self.dir.sweep_coord(self.end)
    }

    /// The smallest and largest perpendicular coordinates on this side.
    pub fn perp_range(&self) -> (f64, f64) {
        let a = self.dir.perp_coord(self.start);
        let b = self.dir.perp_coord(self.end);
        (a.min(b), a.max(b))
    }

    /// The change in perpendicular coordinate from `start` to `end`.
    pub fn perp_delta(&self) -> f64 {
        self.dir.perp_coord(self.end) - self.dir.perp_coord(self.start)
    }

    /// The perpendicular coordinate of this side at a sweep coordinate.
    ///
    /// Sweep coordinates outside the side are clamped to its endpoints, and
    /// the endpoints themselves are returned exactly.
    pub fn perp_at(&self, sweep: f64) -> f64 {
        let s0 = self.start_sweep();
        let s1 = self.end_sweep();
        let p0 = self.dir.perp_coord(self.start);
        let p1 = self.dir.perp_coord(self.end);
        if sweep <= s0 {
            p0
        } else if sweep >= s1 {
            p1
        } else {
            let t = (sweep - s0) / (s1 - s0);
            p0 + t * (p1 - p0)
        }
    }

    /// The point of this side at a sweep coordinate.
    pub fn point_at(&self, sweep: f64) -> Point {
        if sweep == self.start_sweep() {
            self.start
        } else if sweep == self.end_sweep() {
            self.end
        } else {
            self.dir.point(sweep, self.perp_at(sweep))
        }
    }

    /// Is `p` one of this side's endpoints?
    pub fn is_endpoint(&self, p: Point) -> bool {
        p == self.start || p == self.end
    }

    /// Does a ray leaving a point of this side in the sweep direction go into
    /// the side's obstacle (or run along the side)?
    pub fn encloses_ray(&self) -> bool {
        match self.kind {
            SideKind::Low => self.perp_delta() <= 0.0,
            SideKind::High => self.perp_delta() >= 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn cleanup_drops_duplicates_and_collinear_points() {
        let mut obs = Obstacles::default();
        let idx = obs.add_obstacle(
            [
                (0.0, 0.0),
                (5.0, 0.0),
                (10.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ],
            None,
        );
        let o = &obs[idx];
        assert_eq!(o.points(), &[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]);
        // The repeated corner counts; repeating the first point at the end
        // just closes the polyline.
        assert_eq!(o.zero_length_sides(), 1);
        assert!(!o.is_degenerate());
    }

    #[test]
    fn closed_polyline_is_clean() {
        let mut obs = Obstacles::default();
        let idx = obs.add_obstacle(
            [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)],
            None,
        );
        assert_eq!(obs[idx].points().len(), 4);
        assert_eq!(obs[idx].zero_length_sides(), 0);
    }

    #[test]
    fn zero_width_obstacle_is_degenerate() {
        let mut obs = Obstacles::default();
        let idx = obs.add_obstacle([(5.0, 0.0), (5.0, 0.0), (5.0, 10.0), (5.0, 10.0)], None);
        assert!(obs[idx].is_degenerate());
        assert_eq!(obs[idx].points().len(), 2);
        assert_eq!(obs[idx].zero_length_sides(), 2);
    }

    #[test]
    fn validation() {
        let mut obs = Obstacles::default();
        let g = obs.add_group_rect(kurbo::Rect::new(0.0, 0.0, 10.0, 10.0), None);
        obs.add_rect(kurbo::Rect::new(1.0, 1.0, 2.0, 2.0), Some(g));
        assert_eq!(obs.validate(), Ok(()));

        let o = obs.add_rect(kurbo::Rect::new(8.0, 8.0, 12.0, 12.0), Some(g));
        assert_matches!(obs.validate(), Err(Error::ObstacleOutsideGroup { obstacle, group }) => {
            assert_eq!(obstacle, o);
            assert_eq!(group, g);
        });

        let mut obs = Obstacles::default();
        obs.add_rect(kurbo::Rect::new(1.0, 1.0, 2.0, 2.0), Some(GroupIdx(3)));
        assert_matches!(obs.validate(), Err(Error::UnknownGroup(GroupIdx(3))));

        let mut obs = Obstacles::default();
        obs.add_obstacle([(0.0, 0.0), (f64::NAN, 1.0), (1.0, 1.0)], None);
        assert_matches!(obs.validate(), Err(Error::NaN));
    }

    #[test]
    fn side_interpolation() {
        let side = ObstacleSide::new(
            ObstacleIdx(0),
            SideKind::Low,
            p(10.0, 4.0),
            p(0.0, 0.0),
            ScanDirection::Horizontal,
        )
        .unwrap();
        assert_eq!(side.start, p(0.0, 0.0));
        assert_eq!(side.perp_at(2.0), 5.0);
        assert_eq!(side.perp_at(-1.0), 0.0);
        assert_eq!(side.point_at(4.0), p(10.0, 4.0));
        assert!(!side.encloses_ray());

        assert!(ObstacleSide::new(
            ObstacleIdx(0),
            SideKind::Low,
            p(0.0, 1.0),
            p(3.0, 1.0),
            ScanDirection::Horizontal
        )
        .is_none());
    }

    #[test]
    fn bounding_box_covers_groups() {
        let mut obs = Obstacles::default();
        assert_eq!(obs.bounding_box(), None);
        obs.add_rect(kurbo::Rect::new(1.0, 1.0, 2.0, 2.0), None);
        obs.add_group_rect(kurbo::Rect::new(-5.0, 0.0, 3.0, 3.0), None);
        assert_eq!(
            obs.bounding_box(),
            Some(kurbo::Rect::new(-5.0, 0.0, 3.0, 3.0))
        );
    }
}
