//! Sweep events, the queue they wait in, and the record of consumed events.

use std::collections::BTreeSet;

use crate::{
    num::CheapOrderedFloat,
    obstacles::ObstacleSide,
    Error, ObstacleIdx, Point, ScanDirection,
};

use super::lookahead::RayIdx;

typed_arena!(
    /// An index into the [`Events`] record.
    EventVec,
    EventIdx,
    "e_"
);

/// An event at an obstacle vertex.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct VertexEvent {
    /// The vertex itself.
    pub site: Point,
    /// The obstacle that the vertex belongs to.
    pub obstacle: ObstacleIdx,
    /// The index of the vertex in the obstacle's point list.
    pub vertex: usize,
}

/// A ray hitting an obstacle side.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ReflectionEvent {
    /// The point where the ray hits the side.
    pub site: Point,
    /// The event that cast the ray.
    pub previous: EventIdx,
    /// Where the ray started.
    pub previous_site: Point,
    /// The obstacle that was hit.
    pub obstacle: ObstacleIdx,
    /// The side that was hit.
    pub side: ObstacleSide,
    /// The ray that hit it.
    pub ray: RayIdx,
}

/// Something that happens at a point of the sweep.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum SweepEvent {
    /// A stop at a sweep coordinate, for emitting a full scan line there.
    ///
    /// The site's perpendicular coordinate is just outside the graph box, so
    /// that this comes before every other event at the same coordinate.
    AxisCoordinate {
        /// Where the scan line starts.
        site: Point,
    },
    /// The first vertex of an obstacle.
    Open(VertexEvent),
    /// The last vertex of an obstacle.
    Close(VertexEvent),
    /// An interior vertex of an obstacle's high chain.
    HighBend(VertexEvent),
    /// An interior vertex of an obstacle's low chain.
    LowBend(VertexEvent),
    /// A ray hitting the low side of an obstacle.
    LowReflection(ReflectionEvent),
    /// A ray hitting the high side of an obstacle.
    HighReflection(ReflectionEvent),
}

impl SweepEvent {
    /// Where this event happens.
    pub fn site(&self) -> Point {
        match self {
            SweepEvent::AxisCoordinate { site } => *site,
            SweepEvent::Open(v)
            | SweepEvent::Close(v)
            | SweepEvent::HighBend(v)
            | SweepEvent::LowBend(v) => v.site,
            SweepEvent::LowReflection(r) | SweepEvent::HighReflection(r) => r.site,
        }
    }

    /// Among events at the same point, smaller precedence goes first.
    ///
    /// An obstacle's sides are in the status line before anything that
    /// might query them happens at the same point.
    pub fn precedence(&self) -> u8 {
        match self {
            SweepEvent::AxisCoordinate { .. } | SweepEvent::Open(_) => 0,
            SweepEvent::Close(_) | SweepEvent::HighBend(_) | SweepEvent::LowBend(_) => 1,
            SweepEvent::LowReflection(_) | SweepEvent::HighReflection(_) => 2,
        }
    }

    /// The obstacle that this event belongs to, if any.
    pub fn obstacle(&self) -> Option<ObstacleIdx> {
        match self {
            SweepEvent::AxisCoordinate { .. } => None,
            SweepEvent::Open(v)
            | SweepEvent::Close(v)
            | SweepEvent::HighBend(v)
            | SweepEvent::LowBend(v) => Some(v.obstacle),
            SweepEvent::LowReflection(r) | SweepEvent::HighReflection(r) => Some(r.obstacle),
        }
    }

    /// The reflection data, if this is a reflection.
    pub fn reflection(&self) -> Option<&ReflectionEvent> {
        match self {
            SweepEvent::LowReflection(r) | SweepEvent::HighReflection(r) => Some(r),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
struct QueueEntry {
    sweep: CheapOrderedFloat,
    perp: CheapOrderedFloat,
    precedence: u8,
    seq: u64,
    event: SweepEvent,
}

impl QueueEntry {
    fn key(&self) -> (CheapOrderedFloat, CheapOrderedFloat, u8, u64) {
        (self.sweep, self.perp, self.precedence, self.seq)
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

/// The pending events of a sweep, in sweep order.
///
/// Events are ordered by sweep coordinate, then perpendicular coordinate,
/// then [`SweepEvent::precedence`], and finally by the order they were
/// pushed in.
#[derive(Clone, Debug)]
pub struct EventQueue {
    dir: ScanDirection,
    entries: BTreeSet<QueueEntry>,
    next_seq: u64,
    position: Option<Point>,
}

impl EventQueue {
    /// Creates an empty queue for a sweep in direction `dir`.
    pub fn new(dir: ScanDirection) -> Self {
        EventQueue {
            dir,
            entries: BTreeSet::new(),
            next_seq: 0,
            position: None,
        }
    }

    /// The site of the most recently popped event.
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// Would an event at `site` be behind the sweep?
    pub fn is_behind(&self, site: Point) -> bool {
        self.position
            .is_some_and(|pos| self.dir.compare(site, pos).is_lt())
    }

    /// Schedules an event.
    ///
    /// The sweep never goes backwards, so it's an error to push an event
    /// behind the most recently popped one.
    pub fn push(&mut self, event: SweepEvent) -> Result<(), Error> {
        let site = event.site();
        if let Some(position) = self.position.filter(|_| self.is_behind(site)) {
            return Err(Error::EventBehindSweep { site, position });
        }
        self.entries.insert(QueueEntry {
            sweep: self.dir.sweep_coord(site).into(),
            perp: self.dir.perp_coord(site).into(),
            precedence: event.precedence(),
            seq: self.next_seq,
            event,
        });
        self.next_seq += 1;
        Ok(())
    }

    /// Removes and returns the next event.
    pub fn pop(&mut self) -> Option<SweepEvent> {
        let entry = self.entries.pop_first()?;
        self.position = Some(entry.event.site());
        Some(entry.event)
    }

    /// The next event, without removing it.
    pub fn peek(&self) -> Option<&SweepEvent> {
        self.entries.first().map(|e| &e.event)
    }

    /// The number of pending events.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Are there no pending events?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every event that a sweep has processed, in processing order.
///
/// Reflection events refer back to the event that cast their ray, so a
/// reflection chain can be followed backwards after the sweep is done.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct Events {
    events: EventVec<SweepEvent>,
}

impl Events {
    pub(crate) fn record(&mut self, event: SweepEvent) -> EventIdx {
        self.events.push(event)
    }

    /// The number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Were no events recorded?
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterates over the events in processing order.
    pub fn iter(&self) -> impl Iterator<Item = (EventIdx, &SweepEvent)> + '_ {
        self.events.iter()
    }

    /// The reflection chain ending at `idx`, from the start of the chain to
    /// `idx`.
    ///
    /// The first element is the non-reflection event that cast the first ray.
    pub fn chain(&self, idx: EventIdx) -> Vec<EventIdx> {
        let mut ret = vec![idx];
        let mut cur = idx;
        while let Some(r) = self.events.get(cur).and_then(SweepEvent::reflection) {
            cur = r.previous;
            ret.push(cur);
        }
        ret.reverse();
        ret
    }
}

impl std::ops::Index<EventIdx> for Events {
    type Output = SweepEvent;

    fn index(&self, index: EventIdx) -> &SweepEvent {
        &self.events[index]
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn vertex(x: f64, y: f64) -> VertexEvent {
        VertexEvent {
            site: Point::new(x, y),
            obstacle: ObstacleIdx(0),
            vertex: 0,
        }
    }

    #[test]
    fn ordering() {
        let mut q = EventQueue::new(ScanDirection::Horizontal);
        q.push(SweepEvent::Close(vertex(0.0, 1.0))).unwrap();
        q.push(SweepEvent::LowBend(vertex(5.0, 0.0))).unwrap();
        q.push(SweepEvent::Open(vertex(5.0, 0.0))).unwrap();
        q.push(SweepEvent::Open(vertex(-5.0, 0.0))).unwrap();
        q.push(SweepEvent::AxisCoordinate {
            site: Point::new(-10.0, 1.0),
        })
        .unwrap();

        let order: Vec<_> = std::iter::from_fn(|| q.pop()).collect();
        assert_matches!(order[0], SweepEvent::Open(v) if v.site.x == -5.0);
        assert_matches!(order[1], SweepEvent::Open(v) if v.site.x == 5.0);
        assert_matches!(order[2], SweepEvent::LowBend(_));
        assert_matches!(order[3], SweepEvent::AxisCoordinate { .. });
        assert_matches!(order[4], SweepEvent::Close(_));
    }

    #[test]
    fn vertical_sweep_order() {
        let mut q = EventQueue::new(ScanDirection::Vertical);
        q.push(SweepEvent::Open(vertex(1.0, 0.0))).unwrap();
        q.push(SweepEvent::Open(vertex(0.0, 5.0))).unwrap();
        assert_eq!(q.pop().map(|e| e.site()), Some(Point::new(0.0, 5.0)));
    }

    #[test]
    fn equal_keys_keep_push_order() {
        let mut q = EventQueue::new(ScanDirection::Horizontal);
        let mut a = vertex(0.0, 0.0);
        a.vertex = 1;
        let mut b = vertex(0.0, 0.0);
        b.vertex = 2;
        q.push(SweepEvent::LowBend(a)).unwrap();
        q.push(SweepEvent::HighBend(b)).unwrap();
        assert_matches!(q.pop(), Some(SweepEvent::LowBend(v)) if v.vertex == 1);
        assert_matches!(q.pop(), Some(SweepEvent::HighBend(v)) if v.vertex == 2);
        assert!(q.is_empty());
    }

    #[test]
    fn pushing_behind_the_sweep_fails() {
        let mut q = EventQueue::new(ScanDirection::Horizontal);
        q.push(SweepEvent::Open(vertex(0.0, 5.0))).unwrap();
        q.pop();
        assert_matches!(
            q.push(SweepEvent::Close(vertex(0.0, 4.0))),
            Err(Error::EventBehindSweep { site, position }) => {
                assert_eq!(site, Point::new(0.0, 4.0));
                assert_eq!(position, Point::new(0.0, 5.0));
            }
        );
        // Same sweep coordinate but lower on the scan line is also behind.
        assert!(q.push(SweepEvent::Close(vertex(-1.0, 5.0))).is_err());
        // The current position itself is fine.
        assert!(q.push(SweepEvent::Close(vertex(0.0, 5.0))).is_ok());
        assert_eq!(q.len(), 1);
    }
}
