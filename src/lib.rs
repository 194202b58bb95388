#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

#[macro_use]
mod typed_vec;

#[cfg(any(test, feature = "arbitrary"))]
pub mod arbitrary;
pub mod crossings;
mod geom;
pub mod graph;
mod num;
pub mod obstacles;
mod port;
pub mod sweep;

#[cfg(feature = "generators")]
pub mod generators;

pub use geom::{Direction, Point, ScanDirection};
pub use obstacles::{GroupIdx, ObstacleIdx, Obstacles};
pub use port::{Port, WaypointPort};
pub use sweep::{Anomaly, PassOutput, SweepPass};

use crossings::GroupCrossingRecorder;
use graph::VisibilityGraph;

/// Tunable parameters of a sweep.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// How many times a single ray may bounce off obstacle sides.
    ///
    /// Chains that would bounce more often than this are truncated, and an
    /// [`Anomaly::ReflectionLimit`] is reported.
    pub max_reflections: usize,
    /// How far outside the obstacles' bounding box the sentinel boundary
    /// lies. Rays and scan segments that hit nothing end there.
    pub sentinel_offset: f64,
    /// Whether to emit a full scan line at the extreme sweep coordinates of
    /// every obstacle, in addition to the scan lines at waypoints.
    pub extreme_axis_lines: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            max_reflections: 64,
            sentinel_offset: 1.0,
            extreme_axis_lines: true,
        }
    }
}

/// The ways a sweep can fail.
///
/// All of these indicate bad input or a broken invariant; recoverable
/// trouble with the geometry is reported as an [`Anomaly`] instead.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// At least one of the inputs was infinite.
    #[error("one of the inputs was infinite")]
    Infinity,
    /// At least one of the inputs was not a number.
    #[error("one of the inputs had a NaN")]
    NaN,
    /// An obstacle's boundary goes backwards along the sweep direction.
    #[error("obstacle {obstacle:?} is not monotone along the {direction:?} sweep")]
    NonMonotoneObstacle {
        /// The offending obstacle.
        obstacle: ObstacleIdx,
        /// The sweep direction it failed for.
        direction: ScanDirection,
    },
    /// An event was scheduled behind the current sweep position.
    #[error("event at {site:?} is behind the sweep position {position:?}")]
    EventBehindSweep {
        /// Where the event would have happened.
        site: Point,
        /// Where the sweep was at the time.
        position: Point,
    },
    /// A point lies outside the region that groups are resolved in.
    #[error("point {0:?} is outside every group context")]
    OutsideGroupContext(Point),
    /// An obstacle isn't inside the group it claims to belong to.
    #[error("obstacle {obstacle:?} is not inside its group {group:?}")]
    ObstacleOutsideGroup {
        /// The offending obstacle.
        obstacle: ObstacleIdx,
        /// The group it was declared in.
        group: GroupIdx,
    },
    /// A group index that doesn't exist.
    #[error("unknown group {0:?}")]
    UnknownGroup(GroupIdx),
}

/// The combined result of sweeping in both directions.
#[derive(Clone, Debug, serde::Serialize)]
pub struct SweepOutput {
    /// The merged sparse visibility graph, with group crossings annotated.
    pub graph: VisibilityGraph,
    /// Everything that went wrong but didn't stop the sweep.
    pub anomalies: Vec<Anomaly>,
}

/// Builds the sparse visibility graph for routing rectilinear edges around
/// `obstacles`.
///
/// This runs a [`SweepPass`] in each [`ScanDirection`], merges the results,
/// splits edges where another edge ends on them or crosses them, and attaches
/// the group crossings to every edge.
pub fn sparse_visibility_graph(
    obstacles: &Obstacles,
    ports: &[WaypointPort],
    config: &SweepConfig,
) -> Result<SweepOutput, Error> {
    let mut graph = VisibilityGraph::default();
    let mut anomalies: Vec<Anomaly> = Vec::new();
    for dir in ScanDirection::ALL {
        let pass = SweepPass::new(obstacles, ports, dir, config)?.run()?;
        graph.merge(&pass.graph);
        for anomaly in pass.anomalies {
            if !anomalies.contains(&anomaly) {
                anomalies.push(anomaly);
            }
        }
    }

    if let Some(bounds) = sweep::routing_bounds(obstacles, ports, config.sentinel_offset) {
        graph.add_crossing_vertices();
        graph.split_collinear();
        graph.annotate_crossings(&GroupCrossingRecorder::new(obstacles, bounds))?;
    }
    tracing::debug!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        anomalies = anomalies.len(),
        "built sparse visibility graph"
    );

    #[cfg(feature = "debug-svg")]
    {
        if let Err(e) = svg::save("visibility.svg", &graph.dump_svg()) {
            tracing::warn!("failed to save debug svg: {e}");
        }
    }

    Ok(SweepOutput { graph, anomalies })
}
