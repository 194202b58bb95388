//! The sweep-line implementation.
//!
//! A [`SweepPass`] moves a scan line across the obstacles in one
//! [`ScanDirection`](crate::ScanDirection), stopping at obstacle vertices, at
//! requested axis coordinates, and wherever a ray cast ahead of the scan line
//! hits an obstacle side. At each stop it emits the visibility edges that
//! become known there.

mod classify;
mod events;
mod lookahead;
mod pass;
mod status;

pub use classify::{ObstacleChains, VertexClass};
pub use events::{EventIdx, EventQueue, Events, ReflectionEvent, SweepEvent, VertexEvent};
pub use lookahead::{strike, LookaheadScan, Ray, RayIdx};
pub use pass::{PassOutput, SweepPass};
pub use status::StatusLine;

use crate::{ObstacleIdx, Obstacles, Point, Port, WaypointPort};

/// Something wrong with the input that the sweep worked around.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum Anomaly {
    /// An obstacle had repeated vertices, which were dropped.
    ZeroLengthSide {
        /// The obstacle.
        obstacle: ObstacleIdx,
        /// How many zero-length sides it had.
        count: usize,
    },
    /// An obstacle encloses no area, so nothing is routed around it.
    ///
    /// Its vertices still appear in the graph.
    DegenerateObstacle {
        /// The obstacle.
        obstacle: ObstacleIdx,
    },
    /// A reflection chain was cut short.
    ReflectionLimit {
        /// The reflection where the chain stopped.
        site: Point,
        /// How many times the chain had bounced before getting there.
        bounces: usize,
    },
    /// A waypoint lies inside an obstacle and can't see anything.
    WaypointInsideObstacle {
        /// The waypoint.
        location: Point,
    },
}

/// The sentinel boundary: everything that needs routing, inflated by
/// `offset`.
///
/// Returns `None` if there are no obstacles, groups, or ports.
pub(crate) fn routing_bounds(
    obstacles: &Obstacles,
    ports: &[WaypointPort],
    offset: f64,
) -> Option<kurbo::Rect> {
    let port_boxes = ports.iter().map(|p| {
        let loc = p.location().to_kurbo();
        kurbo::Rect::from_points(loc, loc)
    });
    obstacles
        .bounding_box()
        .into_iter()
        .chain(port_boxes)
        .reduce(|a, b| a.union(b))
        .map(|r| r.inflate(offset, offset))
}
