//! Bookkeeping for edges that cross the boundaries of obstacle groups.
//!
//! Groups nest, and a route that leaves or enters a group has to pass through
//! its boundary. The sweep doesn't care about groups, but the router that
//! consumes the graph does, so every edge carries a [`PointAndCrossings`]
//! listing the group boundaries it passes, in the order it passes them.

use std::cmp::Ordering;

use crate::{
    geom::{boundary_hits, Direction},
    num::cmp_f64,
    obstacles::GroupVec,
    Error, GroupIdx, Obstacles, Point,
};

/// A place where an edge passes through the boundary of a group.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct GroupBoundaryCrossing {
    /// The group whose boundary is crossed.
    pub group: GroupIdx,
    /// Where the boundary is crossed.
    pub location: Point,
    /// From the crossing point, the direction that leads into the group.
    pub direction_to_inside: Direction,
}

/// A point, together with the group boundaries that an edge ending there
/// crosses on its way.
///
/// The crossings are in the order that they're met when travelling toward
/// `location`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PointAndCrossings {
    location: Point,
    crossings: Vec<GroupBoundaryCrossing>,
}

impl PointAndCrossings {
    /// Creates a new value. The crossings are taken to be in traversal order.
    pub fn new(location: Point, crossings: Vec<GroupBoundaryCrossing>) -> Self {
        PointAndCrossings {
            location,
            crossings,
        }
    }

    /// The point that the crossings lead to.
    pub fn location(&self) -> Point {
        self.location
    }

    /// The crossings, in traversal order.
    pub fn crossings(&self) -> &[GroupBoundaryCrossing] {
        &self.crossings
    }

    /// Are there no crossings at all?
    pub fn is_empty(&self) -> bool {
        self.crossings.is_empty()
    }

    /// The crossings whose inside lies in direction `dir`.
    pub fn crossings_toward(
        &self,
        dir: Direction,
    ) -> impl Iterator<Item = &GroupBoundaryCrossing> + '_ {
        self.crossings
            .iter()
            .filter(move |c| c.direction_to_inside == dir)
    }
}

/// A sorted list of [`PointAndCrossings`] along a path, with a read cursor.
///
/// A router walks a path and, at every path point, pops the crossings that
/// lie at or before it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointAndCrossingsList {
    list: Vec<PointAndCrossings>,
    cursor: usize,
}

impl PointAndCrossingsList {
    /// The number of entries, including ones already popped.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Is the list empty?
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Appends an entry. Entries must be added in point order.
    pub fn add(&mut self, location: Point, crossings: Vec<GroupBoundaryCrossing>) {
        debug_assert!(self.list.last().map_or(true, |last| last.location <= location));
        self.list.push(PointAndCrossings::new(location, crossings));
    }

    /// Returns the entry under the cursor and advances past it.
    pub fn pop(&mut self) -> Option<&PointAndCrossings> {
        let ret = self.list.get(self.cursor)?;
        self.cursor += 1;
        Some(ret)
    }

    /// Is there an unpopped entry at or before `p`?
    pub fn current_is_before_or_at(&self, p: Point) -> bool {
        self.list
            .get(self.cursor)
            .is_some_and(|entry| entry.location <= p)
    }

    /// Moves the cursor back to the start.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// All entries, in order.
    pub fn entries(&self) -> &[PointAndCrossings] {
        &self.list
    }

    /// Merges another sorted list into this one, dropping entries of `other`
    /// at locations we already have. Resets the cursor.
    pub fn merge_from(&mut self, other: &PointAndCrossingsList) {
        self.reset();
        let mut merged = Vec::with_capacity(self.list.len() + other.list.len());
        let mut ours = std::mem::take(&mut self.list).into_iter().peekable();
        let mut theirs = other.list.iter().peekable();
        loop {
            let ord = match (ours.peek(), theirs.peek()) {
                (None, None) => break,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.location.cmp(&b.location),
            };
            match ord {
                Ordering::Less => merged.extend(ours.next()),
                Ordering::Greater => merged.extend(theirs.next().cloned()),
                Ordering::Equal => {
                    merged.extend(ours.next());
                    theirs.next();
                }
            }
        }
        self.list = merged;
    }

    /// Drops every entry outside the closed range from `start` to `end`.
    /// Resets the cursor.
    pub fn trim(&mut self, start: Point, end: Point) {
        self.reset();
        self.list
            .retain(|entry| entry.location >= start && entry.location <= end);
    }
}

/// Computes group crossings for segments between graph points.
pub struct GroupCrossingRecorder<'a> {
    obstacles: &'a Obstacles,
    context: kurbo::Rect,
    depth: GroupVec<usize>,
}

impl<'a> GroupCrossingRecorder<'a> {
    /// Creates a recorder for the groups in `obstacles`.
    ///
    /// Points outside `context` (boundary included) can't be resolved.
    pub fn new(obstacles: &'a Obstacles, context: kurbo::Rect) -> Self {
        let mut depth = GroupVec::with_size(obstacles.group_count());
        for (idx, _) in obstacles.groups() {
            let mut d = 0;
            let mut cur = obstacles[idx].parent();
            while let Some(parent) = cur {
                d += 1;
                cur = obstacles[parent].parent();
                // Parent cycles aren't a nesting; cut them off.
                if d > obstacles.group_count() {
                    break;
                }
            }
            depth[idx] = d;
        }
        GroupCrossingRecorder {
            obstacles,
            context,
            depth,
        }
    }

    /// All groups containing `p`, outermost first.
    pub fn containing_groups(&self, p: Point) -> Result<Vec<GroupIdx>, Error> {
        let c = &self.context;
        if !(p.x >= c.x0 && p.x <= c.x1 && p.y >= c.y0 && p.y <= c.y1) {
            return Err(Error::OutsideGroupContext(p));
        }
        let mut ret: Vec<_> = self
            .obstacles
            .groups()
            .filter(|(_, g)| g.contains(p))
            .map(|(idx, _)| idx)
            .collect();
        ret.sort_by_key(|idx| (self.depth[*idx], *idx));
        Ok(ret)
    }

    /// The innermost group containing `p`.
    pub fn immediate_group(&self, p: Point) -> Result<Option<GroupIdx>, Error> {
        Ok(self.containing_groups(p)?.last().copied())
    }

    /// The group boundaries crossed by the segment from `origin` to
    /// `destination`, attached to `destination`.
    ///
    /// Every place where the segment passes from outside a group to inside
    /// it (or back) is a crossing, so a segment that passes straight through
    /// a group crosses its boundary twice. Points on a group's boundary count
    /// as inside it. Where several crossings share a point, exits come
    /// before entries, and both are ordered by nesting.
    pub fn record(&self, origin: Point, destination: Point) -> Result<PointAndCrossings, Error> {
        // Only for the context check; containment is tested per group below.
        self.containing_groups(origin)?;
        self.containing_groups(destination)?;

        let travel = Direction::between(origin, destination);
        let mut found: Vec<(f64, bool, GroupBoundaryCrossing)> = Vec::new();
        for (group, g) in self.obstacles.groups() {
            let mut hits = boundary_hits(g.boundary(), origin, destination);
            hits.dedup_by(|a, b| a.1 == b.1);

            let mut inside = g.contains(origin);
            let mut stops = hits.iter().copied().peekable();
            while let Some((t, location)) = stops.next() {
                let next_t = stops.peek().map_or(1.0, |(t, _)| *t);
                let after = if t >= 1.0 {
                    g.contains(destination)
                } else {
                    let mid = (t + next_t) / 2.0;
                    g.contains(Point::new(
                        origin.x + mid * (destination.x - origin.x),
                        origin.y + mid * (destination.y - origin.y),
                    ))
                };
                if after != inside {
                    found.push((
                        t,
                        after,
                        GroupBoundaryCrossing {
                            group,
                            location,
                            direction_to_inside: if after { travel } else { travel.reverse() },
                        },
                    ));
                }
                inside = after;
            }
        }
        found.sort_by(|(ta, entering_a, a), (tb, entering_b, b)| {
            let (da, db) = (self.depth[a.group], self.depth[b.group]);
            let nesting = if *entering_a { da.cmp(&db) } else { db.cmp(&da) };
            cmp_f64(*ta, *tb)
                .then(entering_a.cmp(entering_b))
                .then(nesting)
                .then(a.group.cmp(&b.group))
        });

        Ok(PointAndCrossings::new(
            destination,
            found.into_iter().map(|(_, _, c)| c).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use kurbo::Rect;

    use super::*;

    fn nested() -> (Obstacles, GroupIdx, GroupIdx, GroupIdx) {
        let mut obs = Obstacles::default();
        let outer = obs.add_group_rect(Rect::new(0.0, 0.0, 100.0, 100.0), None);
        let inner = obs.add_group_rect(Rect::new(10.0, 10.0, 40.0, 40.0), Some(outer));
        let other = obs.add_group_rect(Rect::new(60.0, 10.0, 90.0, 40.0), Some(outer));
        (obs, outer, inner, other)
    }

    fn context() -> Rect {
        Rect::new(-1.0, -1.0, 101.0, 101.0)
    }

    #[test]
    fn same_group_has_no_crossings() {
        let (obs, _, inner, _) = nested();
        let rec = GroupCrossingRecorder::new(&obs, context());
        let a = Point::new(20.0, 20.0);
        let b = Point::new(30.0, 20.0);
        assert_eq!(rec.immediate_group(a).unwrap(), Some(inner));
        assert!(rec.record(a, b).unwrap().is_empty());
    }

    #[test]
    fn sibling_groups() {
        let (obs, _, inner, other) = nested();
        let rec = GroupCrossingRecorder::new(&obs, context());
        let pac = rec
            .record(Point::new(20.0, 20.0), Point::new(70.0, 20.0))
            .unwrap();
        assert_eq!(pac.location(), Point::new(70.0, 20.0));
        let groups: Vec<_> = pac.crossings().iter().map(|c| c.group).collect();
        assert_eq!(groups, vec![inner, other]);
        assert_eq!(pac.crossings()[0].location, Point::new(40.0, 20.0));
        assert_eq!(pac.crossings()[0].direction_to_inside, Direction::West);
        assert_eq!(pac.crossings()[1].location, Point::new(60.0, 20.0));
        assert_eq!(pac.crossings()[1].direction_to_inside, Direction::East);
        assert_eq!(pac.crossings_toward(Direction::East).count(), 1);
    }

    #[test]
    fn entering_from_the_root() {
        let (obs, outer, inner, _) = nested();
        let rec = GroupCrossingRecorder::new(&obs, context());
        let pac = rec
            .record(Point::new(20.0, -1.0), Point::new(20.0, 20.0))
            .unwrap();
        let groups: Vec<_> = pac.crossings().iter().map(|c| c.group).collect();
        assert_eq!(groups, vec![outer, inner]);
        assert!(pac
            .crossings()
            .iter()
            .all(|c| c.direction_to_inside == Direction::North));
    }

    #[test]
    fn passing_through_groups() {
        let mut obs = Obstacles::default();
        let g = obs.add_group_rect(Rect::new(40.0, 0.0, 60.0, 100.0), None);
        let rec = GroupCrossingRecorder::new(&obs, context());
        let pac = rec
            .record(Point::new(0.0, 50.0), Point::new(100.0, 50.0))
            .unwrap();
        assert_eq!(
            pac.crossings(),
            &[
                GroupBoundaryCrossing {
                    group: g,
                    location: Point::new(40.0, 50.0),
                    direction_to_inside: Direction::East,
                },
                GroupBoundaryCrossing {
                    group: g,
                    location: Point::new(60.0, 50.0),
                    direction_to_inside: Direction::West,
                },
            ]
        );

        // Inside the outer group the whole way, but through both inner ones.
        let (obs, _, inner, other) = nested();
        let rec = GroupCrossingRecorder::new(&obs, context());
        let pac = rec
            .record(Point::new(5.0, 20.0), Point::new(95.0, 20.0))
            .unwrap();
        let found: Vec<_> = pac
            .crossings()
            .iter()
            .map(|c| (c.group, c.location.x, c.direction_to_inside))
            .collect();
        assert_eq!(
            found,
            vec![
                (inner, 10.0, Direction::East),
                (inner, 40.0, Direction::West),
                (other, 60.0, Direction::East),
                (other, 90.0, Direction::West),
            ]
        );

        // Ending on a corner enters the group there; starting on the outer
        // boundary and staying inside crosses nothing.
        let pac = rec
            .record(Point::new(0.0, 10.0), Point::new(10.0, 10.0))
            .unwrap();
        let found: Vec<_> = pac
            .crossings()
            .iter()
            .map(|c| (c.group, c.location, c.direction_to_inside))
            .collect();
        assert_eq!(found, vec![(inner, Point::new(10.0, 10.0), Direction::East)]);
    }

    #[test]
    fn outside_context() {
        let (obs, _, _, _) = nested();
        let rec = GroupCrossingRecorder::new(&obs, context());
        assert_matches!(
            rec.record(Point::new(0.0, 0.0), Point::new(500.0, 0.0)),
            Err(Error::OutsideGroupContext(_))
        );
    }

    #[test]
    fn list_merge_and_trim() {
        let p = |x| Point::new(x, 0.0);
        let mut a = PointAndCrossingsList::default();
        a.add(p(1.0), vec![]);
        a.add(p(3.0), vec![]);
        let mut b = PointAndCrossingsList::default();
        b.add(p(2.0), vec![]);
        b.add(p(3.0), vec![]);
        b.add(p(4.0), vec![]);

        a.merge_from(&b);
        let locs: Vec<_> = a.entries().iter().map(|e| e.location().x).collect();
        assert_eq!(locs, vec![1.0, 2.0, 3.0, 4.0]);

        assert!(a.current_is_before_or_at(p(1.5)));
        assert_eq!(a.pop().map(|e| e.location()), Some(p(1.0)));
        assert!(!a.current_is_before_or_at(p(1.5)));

        a.trim(p(2.0), p(3.0));
        assert_eq!(a.len(), 2);
        assert_eq!(a.pop().map(|e| e.location()), Some(p(2.0)));
    }
}
