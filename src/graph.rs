//! The sparse visibility graph that a sweep produces.
//!
//! Vertices are keyed by their exact coordinates, so two passes (or two
//! events in the same pass) that produce the same point produce the same
//! vertex. Every edge is axis-parallel.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet, BinaryHeap},
    ops::Bound,
};

use crate::{
    crossings::{GroupCrossingRecorder, PointAndCrossings},
    num::CheapOrderedFloat,
    Error, ObstacleIdx, Point,
};

typed_arena!(
    /// An index into the vertices of a [`VisibilityGraph`].
    VertexVec,
    VertexIdx,
    "v_"
);

/// Where a vertex came from.
///
/// When the same point is produced more than once, it keeps the largest kind
/// (in declaration order) that it was produced with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum VertexKind {
    /// The end of a ray or scan segment that hit nothing.
    Boundary,
    /// A point where a ray or scan segment stopped at an obstacle side.
    Steiner,
    /// The point where a reflection event happened.
    Reflection,
    /// A vertex of an obstacle.
    ObstacleVertex(ObstacleIdx),
    /// A waypoint port.
    Waypoint,
}

/// A vertex of the visibility graph.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct VisibilityVertex {
    /// Where it is.
    pub point: Point,
    /// What produced it.
    pub kind: VertexKind,
}

/// An axis-parallel edge of the visibility graph.
///
/// `source` is the endpoint that comes first in [`Point`] order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VisibilityEdge {
    /// The smaller endpoint.
    pub source: VertexIdx,
    /// The larger endpoint.
    pub target: VertexIdx,
    /// The group boundaries crossed going from `source` to `target`.
    ///
    /// This is `None` until [`VisibilityGraph::annotate_crossings`] runs.
    pub crossings: Option<PointAndCrossings>,
}

/// A graph of axis-parallel segments along which edges can be routed.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct VisibilityGraph {
    vertices: VertexVec<VisibilityVertex>,
    edges: Vec<VisibilityEdge>,
    #[serde(skip)]
    by_point: BTreeMap<Point, VertexIdx>,
    #[serde(skip)]
    edge_set: BTreeSet<(VertexIdx, VertexIdx)>,
}

impl VisibilityGraph {
    /// Adds a vertex at `point`, or upgrades the kind of the vertex that's
    /// already there.
    pub fn add_vertex(&mut self, point: Point, kind: VertexKind) -> VertexIdx {
        if let Some(&idx) = self.by_point.get(&point) {
            let v = &mut self.vertices[idx];
            v.kind = v.kind.max(kind);
            return idx;
        }
        let idx = self.vertices.push(VisibilityVertex { point, kind });
        self.by_point.insert(point, idx);
        idx
    }

    fn vertex_or_steiner(&mut self, point: Point) -> VertexIdx {
        match self.by_point.get(&point) {
            Some(&idx) => idx,
            None => self.add_vertex(point, VertexKind::Steiner),
        }
    }

    /// Adds an edge between two points, creating [`VertexKind::Steiner`]
    /// vertices for endpoints that aren't in the graph yet.
    ///
    /// Returns `false` if the edge was already there or has zero length.
    pub fn add_edge(&mut self, p: Point, q: Point) -> bool {
        if p == q {
            return false;
        }
        debug_assert!(p.x == q.x || p.y == q.y, "{p:?} -> {q:?} isn't axis-parallel");
        let (p, q) = if p < q { (p, q) } else { (q, p) };
        let source = self.vertex_or_steiner(p);
        let target = self.vertex_or_steiner(q);
        self.insert_edge(source, target, None)
    }

    fn insert_edge(
        &mut self,
        source: VertexIdx,
        target: VertexIdx,
        crossings: Option<PointAndCrossings>,
    ) -> bool {
        if !self.edge_set.insert((source, target)) {
            return false;
        }
        self.edges.push(VisibilityEdge {
            source,
            target,
            crossings,
        });
        true
    }

    /// The vertex at exactly `p`, if there is one.
    pub fn vertex_at(&self, p: Point) -> Option<&VisibilityVertex> {
        self.by_point.get(&p).map(|idx| &self.vertices[*idx])
    }

    /// Is there an edge between `p` and `q`, in either order?
    pub fn has_edge(&self, p: Point, q: Point) -> bool {
        let (p, q) = if p < q { (p, q) } else { (q, p) };
        match (self.by_point.get(&p), self.by_point.get(&q)) {
            (Some(&s), Some(&t)) => self.edge_set.contains(&(s, t)),
            _ => false,
        }
    }

    /// Iterates over the vertices, in the order they were added.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexIdx, &VisibilityVertex)> + '_ {
        self.vertices.iter()
    }

    /// Iterates over the edges, in the order they were added.
    pub fn edges(&self) -> impl Iterator<Item = &VisibilityEdge> + '_ {
        self.edges.iter()
    }

    /// The endpoints of an edge, as points.
    pub fn endpoints(&self, edge: &VisibilityEdge) -> (Point, Point) {
        (
            self.vertices[edge.source].point,
            self.vertices[edge.target].point,
        )
    }

    /// The number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// The number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Adds all of `other`'s vertices and edges to this graph.
    pub fn merge(&mut self, other: &VisibilityGraph) {
        for (_, v) in other.vertices() {
            self.add_vertex(v.point, v.kind);
        }
        for e in other.edges() {
            let (p, q) = other.endpoints(e);
            let source = self.by_point[&p];
            let target = self.by_point[&q];
            self.insert_edge(source, target, e.crossings.clone());
        }
    }

    /// Adds a [`VertexKind::Steiner`] vertex wherever a horizontal edge and a
    /// vertical edge cross in both of their interiors.
    ///
    /// Follow this with [`VisibilityGraph::split_collinear`] to break the
    /// crossing edges at the new vertices.
    pub fn add_crossing_vertices(&mut self) {
        // Sweep left to right. At each x, horizontal edges ending there leave
        // the active set, vertical edges there look for active edges strictly
        // inside their y range, and then horizontal edges starting there join.
        // Only interior crossings count, hence that order.
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
        enum Step {
            Leave,
            Query,
            Join,
        }

        let mut steps: Vec<(CheapOrderedFloat, Step, usize)> = Vec::new();
        for (i, edge) in self.edges.iter().enumerate() {
            let (p, q) = self.endpoints(edge);
            if p.y == q.y {
                steps.push((p.x.into(), Step::Join, i));
                steps.push((q.x.into(), Step::Leave, i));
            } else {
                steps.push((p.x.into(), Step::Query, i));
            }
        }
        steps.sort();

        // Active horizontal edges, by y. Collinear edges can overlap, so count them.
        let mut active: BTreeMap<CheapOrderedFloat, usize> = BTreeMap::new();
        let mut crossings = Vec::new();
        for (x, step, i) in steps {
            let (p, q) = self.endpoints(&self.edges[i]);
            match step {
                Step::Join => *active.entry(p.y.into()).or_default() += 1,
                Step::Leave => {
                    let y = CheapOrderedFloat::from(p.y);
                    if let Some(count) = active.get_mut(&y) {
                        *count -= 1;
                        if *count == 0 {
                            active.remove(&y);
                        }
                    }
                }
                Step::Query => {
                    let range = (
                        Bound::Excluded(CheapOrderedFloat::from(p.y)),
                        Bound::Excluded(CheapOrderedFloat::from(q.y)),
                    );
                    crossings.extend(
                        active
                            .range(range)
                            .map(|(y, _)| Point::new(x.into_inner(), y.into_inner())),
                    );
                }
            }
        }

        for p in crossings {
            self.vertex_or_steiner(p);
        }
    }

    /// The length of the shortest path between two vertices, or `None` if
    /// either is missing or they aren't connected.
    pub fn shortest_path_length(&self, from: Point, to: Point) -> Option<f64> {
        let start = *self.by_point.get(&from)?;
        let goal = *self.by_point.get(&to)?;

        let mut adjacent: VertexVec<Vec<(VertexIdx, f64)>> =
            VertexVec::with_size(self.vertices.len());
        for edge in &self.edges {
            let (p, q) = self.endpoints(edge);
            let len = (q.x - p.x) + (q.y - p.y);
            adjacent[edge.source].push((edge.target, len));
            adjacent[edge.target].push((edge.source, len));
        }

        let mut dist: VertexVec<Option<f64>> = VertexVec::with_size(self.vertices.len());
        let mut queue = BinaryHeap::new();
        dist[start] = Some(0.0);
        queue.push(Reverse((CheapOrderedFloat::from(0.0), start)));
        while let Some(Reverse((d, v))) = queue.pop() {
            let d = d.into_inner();
            if v == goal {
                return Some(d);
            }
            if dist[v].is_some_and(|best| best < d) {
                continue;
            }
            for &(w, len) in &adjacent[v] {
                let through_v = d + len;
                if dist[w].map_or(true, |best| through_v < best) {
                    dist[w] = Some(through_v);
                    queue.push(Reverse((through_v.into(), w)));
                }
            }
        }
        None
    }

    /// Splits every edge that passes through another vertex, so that edges
    /// only meet at their endpoints.
    ///
    /// Crossing annotations are dropped from the edges that get split.
    pub fn split_collinear(&mut self) {
        // Vertices sorted along vertical lines. (`by_point` already sorts them
        // along horizontal lines.)
        let by_column: BTreeMap<(CheapOrderedFloat, CheapOrderedFloat), VertexIdx> = self
            .by_point
            .iter()
            .map(|(p, idx)| ((p.x.into(), p.y.into()), *idx))
            .collect();

        let old_edges = std::mem::take(&mut self.edges);
        self.edge_set.clear();
        for edge in old_edges {
            let (p, q) = self.endpoints(&edge);
            let stops: Vec<VertexIdx> = if p.y == q.y {
                self.by_point.range(p..=q).map(|(_, idx)| *idx).collect()
            } else {
                let lo = (CheapOrderedFloat::from(p.x), CheapOrderedFloat::from(p.y));
                let hi = (CheapOrderedFloat::from(q.x), CheapOrderedFloat::from(q.y));
                by_column.range(lo..=hi).map(|(_, idx)| *idx).collect()
            };
            if stops.len() <= 2 {
                self.insert_edge(edge.source, edge.target, edge.crossings);
                continue;
            }
            for pair in stops.windows(2) {
                self.insert_edge(pair[0], pair[1], None);
            }
        }
    }

    /// Attaches group crossings to every edge.
    pub fn annotate_crossings(&mut self, recorder: &GroupCrossingRecorder) -> Result<(), Error> {
        for i in 0..self.edges.len() {
            let (p, q) = self.endpoints(&self.edges[i]);
            self.edges[i].crossings = Some(recorder.record(p, q)?);
        }
        Ok(())
    }

    /// Draws the graph, for debugging.
    #[cfg(feature = "debug-svg")]
    pub fn dump_svg(&self) -> svg::Document {
        let bbox = self
            .vertices()
            .map(|(_, v)| kurbo::Rect::from_points(v.point.to_kurbo(), v.point.to_kurbo()))
            .reduce(|a, b| a.union(b))
            .unwrap_or_default();
        let pad = 1.0 + bbox.width().max(bbox.height()) * 0.05;
        let stroke_width = pad / 10.0;
        let mut document = svg::Document::new().set(
            "viewBox",
            (
                bbox.min_x() - pad,
                bbox.min_y() - pad,
                bbox.width() + 2.0 * pad,
                bbox.height() + 2.0 * pad,
            ),
        );
        for edge in self.edges() {
            let (p, q) = self.endpoints(edge);
            let data = svg::node::element::path::Data::new()
                .move_to((p.x, p.y))
                .line_to((q.x, q.y));
            let color = match edge.crossings.as_ref() {
                Some(c) if !c.is_empty() => "red",
                _ => "black",
            };
            let path = svg::node::element::Path::new()
                .set("d", data)
                .set("stroke", color)
                .set("stroke-width", stroke_width)
                .set("stroke-linecap", "round");
            document = document.add(path);
        }
        for (_, v) in self.vertices() {
            let color = match v.kind {
                VertexKind::Boundary => "gray",
                VertexKind::Steiner => "green",
                VertexKind::Reflection => "orange",
                VertexKind::ObstacleVertex(_) => "blue",
                VertexKind::Waypoint => "purple",
            };
            let circle = svg::node::element::Circle::new()
                .set("cx", v.point.x)
                .set("cy", v.point.y)
                .set("r", 2.0 * stroke_width)
                .set("fill", color);
            document = document.add(circle);
        }
        document
    }
}
