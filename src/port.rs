//! Routing anchors.

use crate::Point;

/// Something a route can start or end at.
///
/// Ports on real node boundaries are resolved outside this crate; the sweep
/// only needs to know where a port is and whether it has boundary geometry.
pub trait Port {
    /// Where the port is.
    fn location(&self) -> Point;

    /// The boundary curve that a route to this port gets clipped against.
    fn curve(&self) -> Option<&kurbo::BezPath>;
}

/// A port at a fixed point with no boundary curve.
///
/// Routing to a waypoint means routing to exactly this point, not to the
/// boundary of some node. Every waypoint becomes a vertex of the visibility
/// graph, and the sweep casts rays from it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WaypointPort {
    location: Point,
}

impl WaypointPort {
    /// Creates a waypoint at `location`.
    pub fn new(location: impl Into<Point>) -> Self {
        WaypointPort {
            location: location.into(),
        }
    }
}

impl Port for WaypointPort {
    fn location(&self) -> Point {
        self.location
    }

    fn curve(&self) -> Option<&kurbo::BezPath> {
        None
    }
}
