//! One sweep across the obstacles, in one direction.

use std::collections::{BTreeMap, BTreeSet};

use arrayvec::ArrayVec;

use crate::{
    graph::{VertexKind, VisibilityGraph},
    num::CheapOrderedFloat,
    obstacles::{check_points, ObstacleIdx, ObstacleSide, ObstacleVec, SideKind},
    Error, Obstacles, Point, Port, ScanDirection, SweepConfig, WaypointPort,
};

use super::{
    classify::{ObstacleChains, VertexClass},
    events::{EventIdx, EventQueue, Events, ReflectionEvent, SweepEvent, VertexEvent},
    lookahead::{strike, LookaheadScan, RayIdx},
    routing_bounds,
    status::StatusLine,
    Anomaly,
};

/// The sides of an obstacle that are currently in the status line.
#[derive(Clone, Copy, Debug, Default)]
struct ActiveSides {
    low: Option<ObstacleSide>,
    high: Option<ObstacleSide>,
}

impl ActiveSides {
    fn get_mut(&mut self, kind: SideKind) -> &mut Option<ObstacleSide> {
        match kind {
            SideKind::Low => &mut self.low,
            SideKind::High => &mut self.high,
        }
    }
}

/// Everything a finished [`SweepPass`] produced.
#[derive(Clone, Debug, serde::Serialize)]
pub struct PassOutput {
    /// The direction that was swept.
    pub direction: ScanDirection,
    /// The visibility edges found by this pass.
    pub graph: VisibilityGraph,
    /// Every event that was processed, in order.
    pub events: Events,
    /// Problems with the input that the pass worked around.
    pub anomalies: Vec<Anomaly>,
}

/// A single sweep in one direction.
///
/// Create one with [`SweepPass::new`], and then either call
/// [`SweepPass::run`] to do the whole thing, or step through it with
/// [`SweepPass::next_event`] and look at the state in between.
pub struct SweepPass<'a> {
    obstacles: &'a Obstacles,
    dir: ScanDirection,
    max_reflections: usize,
    // The sentinel boundary, as ranges of sweep and perpendicular coordinates.
    sweep_bounds: (f64, f64),
    perp_bounds: (f64, f64),
    chains: ObstacleVec<Option<ObstacleChains>>,
    active: ObstacleVec<ActiveSides>,
    waypoints: BTreeMap<CheapOrderedFloat, Vec<Point>>,
    queue: EventQueue,
    events: Events,
    status: StatusLine,
    lookahead: LookaheadScan,
    graph: VisibilityGraph,
    anomalies: Vec<Anomaly>,
}

fn report(anomalies: &mut Vec<Anomaly>, anomaly: Anomaly) {
    tracing::warn!(?anomaly, "sweep anomaly");
    anomalies.push(anomaly);
}

impl<'a> SweepPass<'a> {
    /// Prepares a sweep in direction `dir`.
    ///
    /// This validates the input, classifies every obstacle vertex, and
    /// schedules the initial events.
    pub fn new(
        obstacles: &'a Obstacles,
        ports: &[WaypointPort],
        dir: ScanDirection,
        config: &SweepConfig,
    ) -> Result<Self, Error> {
        obstacles.validate()?;
        let locations: Vec<Point> = ports.iter().map(Port::location).collect();
        check_points(&locations)?;

        let bounds = routing_bounds(obstacles, ports, config.sentinel_offset)
            .unwrap_or(kurbo::Rect::ZERO);
        let mut pass = SweepPass {
            obstacles,
            dir,
            max_reflections: config.max_reflections,
            sweep_bounds: dir.sweep_range(&bounds),
            perp_bounds: dir.perp_range(&bounds),
            chains: ObstacleVec::with_size(obstacles.len()),
            active: ObstacleVec::with_size(obstacles.len()),
            waypoints: BTreeMap::new(),
            queue: EventQueue::new(dir),
            events: Events::default(),
            status: StatusLine::new(dir),
            lookahead: LookaheadScan::new(dir),
            graph: VisibilityGraph::default(),
            anomalies: Vec::new(),
        };

        let mut axis_coords = BTreeSet::new();
        for (idx, obstacle) in obstacles.obstacles() {
            if obstacle.zero_length_sides() > 0 {
                report(
                    &mut pass.anomalies,
                    Anomaly::ZeroLengthSide {
                        obstacle: idx,
                        count: obstacle.zero_length_sides(),
                    },
                );
            }
            if obstacle.is_degenerate() {
                report(
                    &mut pass.anomalies,
                    Anomaly::DegenerateObstacle { obstacle: idx },
                );
                for p in obstacle.points() {
                    pass.graph.add_vertex(*p, VertexKind::ObstacleVertex(idx));
                }
                continue;
            }

            let chains = ObstacleChains::new(idx, obstacle, dir)?;
            for (vertex, class) in chains.classes() {
                let v = VertexEvent {
                    site: chains.point(vertex),
                    obstacle: idx,
                    vertex,
                };
                pass.queue.push(match class {
                    VertexClass::Open => SweepEvent::Open(v),
                    VertexClass::Close => SweepEvent::Close(v),
                    VertexClass::LowBend => SweepEvent::LowBend(v),
                    VertexClass::HighBend => SweepEvent::HighBend(v),
                })?;
            }
            let (lo, hi) = obstacle.sweep_extent(dir);
            if config.extreme_axis_lines {
                axis_coords.insert(CheapOrderedFloat::from(lo));
                axis_coords.insert(CheapOrderedFloat::from(hi));
            }
            pass.chains[idx] = Some(chains);
        }

        for p in locations {
            let c = CheapOrderedFloat::from(dir.sweep_coord(p));
            axis_coords.insert(c);
            pass.waypoints.entry(c).or_default().push(p);
        }
        for c in axis_coords {
            let site = dir.point(c.into_inner(), pass.perp_bounds.0);
            pass.queue.push(SweepEvent::AxisCoordinate { site })?;
        }

        tracing::debug!(
            direction = ?dir,
            obstacles = obstacles.len(),
            waypoints = ports.len(),
            events = pass.queue.len(),
            "starting sweep pass"
        );
        Ok(pass)
    }

    /// The direction of this sweep.
    pub fn direction(&self) -> ScanDirection {
        self.dir
    }

    /// The site of the most recently processed event.
    pub fn position(&self) -> Option<Point> {
        self.queue.position()
    }

    /// The obstacle sides crossing the scan line at the current position.
    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    /// The events processed so far.
    pub fn events(&self) -> &Events {
        &self.events
    }

    /// The graph built so far.
    pub fn graph(&self) -> &VisibilityGraph {
        &self.graph
    }

    /// Processes the next event, returning its index in [`SweepPass::events`].
    ///
    /// Returns `Ok(None)` when there's nothing left to do. Reflections whose
    /// ray was stopped by something closer are skipped without being
    /// recorded.
    pub fn next_event(&mut self) -> Result<Option<EventIdx>, Error> {
        loop {
            let Some(event) = self.queue.pop() else {
                return Ok(None);
            };
            if let Some(r) = event.reflection() {
                if !self.lookahead.is_active(r.ray) {
                    tracing::trace!(site = ?r.site, ray = ?r.ray, "dropping stale reflection");
                    continue;
                }
            }

            let idx = self.events.record(event);
            tracing::trace!(?idx, ?event, "processing event");
            match event {
                SweepEvent::AxisCoordinate { site } => self.process_axis_coordinate(idx, site)?,
                SweepEvent::Open(v) => self.process_vertex(idx, v, VertexClass::Open)?,
                SweepEvent::Close(v) => self.process_vertex(idx, v, VertexClass::Close)?,
                SweepEvent::LowBend(v) => self.process_vertex(idx, v, VertexClass::LowBend)?,
                SweepEvent::HighBend(v) => self.process_vertex(idx, v, VertexClass::HighBend)?,
                SweepEvent::LowReflection(r) | SweepEvent::HighReflection(r) => {
                    self.process_reflection(idx, r)?
                }
            }
            self.status
                .check_invariants(self.dir.sweep_coord(event.site()));
            return Ok(Some(idx));
        }
    }

    /// Runs the sweep to completion.
    pub fn run(mut self) -> Result<PassOutput, Error> {
        while self.next_event()?.is_some() {}

        // Whatever is still in flight saw nothing, all the way to the end.
        let leftover: Vec<RayIdx> = self.lookahead.active().collect();
        for ray in leftover {
            let origin = self.lookahead[ray].origin;
            let end = self
                .dir
                .point(self.sweep_bounds.1, self.dir.perp_coord(origin));
            self.graph.add_vertex(end, VertexKind::Boundary);
            self.graph.add_edge(origin, end);
            self.lookahead.terminate(ray);
        }
        self.graph.split_collinear();

        tracing::debug!(
            direction = ?self.dir,
            events = self.events.len(),
            vertices = self.graph.vertex_count(),
            edges = self.graph.edge_count(),
            anomalies = self.anomalies.len(),
            "finished sweep pass"
        );
        Ok(PassOutput {
            direction: self.dir,
            graph: self.graph,
            events: self.events,
            anomalies: self.anomalies,
        })
    }

    fn sweep(&self, p: Point) -> f64 {
        self.dir.sweep_coord(p)
    }

    fn perp(&self, p: Point) -> f64 {
        self.dir.perp_coord(p)
    }

    // The point on the sentinel boundary that's reached by going from `p`
    // along the scan line toward `kind`.
    fn boundary_point(&mut self, p: Point, kind: SideKind) -> Point {
        let perp = match kind {
            SideKind::Low => self.perp_bounds.0,
            SideKind::High => self.perp_bounds.1,
        };
        let q = self.dir.point(self.sweep(p), perp);
        self.graph.add_vertex(q, VertexKind::Boundary);
        q
    }

    // Is `p`, a vertex of `own`, inside some other obstacle?
    fn is_enclosed(&self, p: Point, own: ObstacleIdx) -> bool {
        self.status
            .below(p)
            .is_some_and(|side| side.kind == SideKind::Low && side.obstacle != own)
    }

    fn process_vertex(
        &mut self,
        idx: EventIdx,
        ev: VertexEvent,
        class: VertexClass,
    ) -> Result<(), Error> {
        let o = ev.obstacle;
        let p = ev.site;
        let s = self.sweep(p);
        let Some(chains) = self.chains[o].as_ref() else {
            return Ok(());
        };
        let neighbors: ArrayVec<Point, 2> = chains
            .neighbors(ev.vertex)
            .iter()
            .map(|&w| chains.point(w))
            .collect();
        let low_next = chains.next(SideKind::Low, ev.vertex).map(|w| chains.point(w));
        let high_next = chains
            .next(SideKind::High, ev.vertex)
            .map(|w| chains.point(w));
        let new_low = chains.side_from(SideKind::Low, ev.vertex);
        let new_high = chains.side_from(SideKind::High, ev.vertex);

        // A flat edge stops every ray that runs into it.
        for &w in &neighbors {
            if self.dir.is_flat(p, w) && self.perp(w) > self.perp(p) {
                self.block_rays(self.perp(p), self.perp(w), s);
            }
        }

        let mut inserted: ArrayVec<ObstacleSide, 2> = ArrayVec::new();
        match class {
            VertexClass::Open => {
                inserted.extend(new_low);
                inserted.extend(new_high);
                self.active[o] = ActiveSides {
                    low: new_low,
                    high: new_high,
                };
            }
            VertexClass::LowBend | VertexClass::HighBend => {
                let (kind, new) = if class == VertexClass::LowBend {
                    (SideKind::Low, new_low)
                } else {
                    (SideKind::High, new_high)
                };
                if let Some(old) = self.active[o].get_mut(kind).take() {
                    self.status.remove(&old);
                }
                inserted.extend(new);
                *self.active[o].get_mut(kind) = new;
            }
            VertexClass::Close => {
                let sides = std::mem::take(&mut self.active[o]);
                for side in [sides.low, sides.high].into_iter().flatten() {
                    self.status.remove(&side);
                }
            }
        }
        for side in &inserted {
            self.status.insert(*side);
        }
        for side in inserted {
            self.strike_rays_in_range(&side)?;
        }

        self.graph.add_vertex(p, VertexKind::ObstacleVertex(o));
        for &w in &neighbors {
            let axis_parallel = p.x == w.x || p.y == w.y;
            if axis_parallel && self.dir.compare(p, w).is_lt() {
                self.graph.add_edge(p, w);
            }
        }

        let flat_toward = |kind: SideKind| {
            neighbors.iter().any(|&w| {
                self.dir.is_flat(p, w)
                    && match kind {
                        SideKind::Low => self.perp(w) < self.perp(p),
                        SideKind::High => self.perp(w) > self.perp(p),
                    }
            })
        };
        let extend_low = matches!(
            class,
            VertexClass::Open | VertexClass::Close | VertexClass::LowBend
        ) && !flat_toward(SideKind::Low);
        let extend_high = matches!(
            class,
            VertexClass::Open | VertexClass::Close | VertexClass::HighBend
        ) && !flat_toward(SideKind::High);
        if extend_low {
            self.extend(p, SideKind::Low);
        }
        if extend_high {
            self.extend(p, SideKind::High);
        }

        let perp = self.perp(p);
        let goes_up = |q: Option<Point>| q.is_some_and(|q| self.perp(q) > perp);
        let goes_down = |q: Option<Point>| q.is_some_and(|q| self.perp(q) < perp);
        let exterior = match class {
            VertexClass::Close => true,
            VertexClass::LowBend => goes_up(low_next),
            VertexClass::HighBend => goes_down(high_next),
            VertexClass::Open => goes_up(low_next) || goes_down(high_next),
        };
        if exterior && !self.is_enclosed(p, o) {
            self.cast_ray(p, idx, 0)?;
        }

        if class == VertexClass::Close {
            self.recheck_after_close(p)?;
        }
        Ok(())
    }

    // Emits the scan segment from `p` to the nearest side (or the boundary)
    // toward `kind`.
    fn extend(&mut self, p: Point, kind: SideKind) {
        let side = match kind {
            SideKind::Low => self.status.below(p),
            SideKind::High => self.status.above(p),
        }
        .copied();
        let q = match side {
            Some(side) => side.point_at(self.sweep(p)),
            None => self.boundary_point(p, kind),
        };
        self.graph.add_edge(p, q);
    }

    fn block_rays(&mut self, lo: f64, hi: f64, sweep: f64) {
        for ray in self.lookahead.in_range(lo, hi) {
            let origin = self.lookahead[ray].origin;
            if self.sweep(origin) <= sweep {
                self.lookahead.terminate(ray);
                let hit = self.dir.point(sweep, self.perp(origin));
                self.graph.add_edge(origin, hit);
            }
        }
    }

    fn cast_ray(&mut self, origin: Point, source: EventIdx, bounces: usize) -> Result<(), Error> {
        let ray = self.lookahead.cast(origin, source, bounces);
        let neighbors = [
            self.status.below(origin).copied(),
            self.status.above(origin).copied(),
        ];
        for side in neighbors.into_iter().flatten() {
            self.try_strike(ray, &side)?;
        }
        Ok(())
    }

    fn strike_rays_in_range(&mut self, side: &ObstacleSide) -> Result<(), Error> {
        let (lo, hi) = side.perp_range();
        for ray in self.lookahead.in_range(lo, hi) {
            self.try_strike(ray, side)?;
        }
        Ok(())
    }

    // When an obstacle closes, the rays that had it as a neighbor now see
    // past it.
    fn recheck_after_close(&mut self, p: Point) -> Result<(), Error> {
        let below = self.status.below(p).copied();
        let above = self.status.above(p).copied();
        let s = self.sweep(p);
        let lo = below.map_or(self.perp_bounds.0, |side| side.perp_at(s));
        let hi = above.map_or(self.perp_bounds.1, |side| side.perp_at(s));
        for ray in self.lookahead.in_range(lo, hi) {
            for side in [below, above].iter().flatten() {
                self.try_strike(ray, side)?;
            }
        }
        Ok(())
    }

    // Schedules a reflection if `ray` hits `side` ahead of the sweep.
    fn try_strike(&mut self, ray: RayIdx, side: &ObstacleSide) -> Result<(), Error> {
        let r = self.lookahead[ray];
        let (sweep, perp) = (self.sweep(r.origin), self.perp(r.origin));
        // A ray starting on the side runs away from it.
        if side.perp_at(sweep) == perp && side.start_sweep() <= sweep {
            return Ok(());
        }
        let Some(site) = strike(side, perp, sweep) else {
            return Ok(());
        };
        if self.queue.is_behind(site) {
            return Ok(());
        }
        let reflection = ReflectionEvent {
            site,
            previous: r.source,
            previous_site: r.origin,
            obstacle: side.obstacle,
            side: *side,
            ray,
        };
        self.queue.push(match side.kind {
            SideKind::Low => SweepEvent::LowReflection(reflection),
            SideKind::High => SweepEvent::HighReflection(reflection),
        })
    }

    fn process_reflection(&mut self, idx: EventIdx, r: ReflectionEvent) -> Result<(), Error> {
        let ray = self.lookahead[r.ray];
        self.lookahead.terminate(r.ray);
        self.graph.add_vertex(r.site, VertexKind::Reflection);
        self.graph.add_edge(ray.origin, r.site);

        if r.side.is_endpoint(r.site) {
            // The vertex event there takes over.
            return Ok(());
        }
        if ray.bounces >= self.max_reflections {
            report(
                &mut self.anomalies,
                Anomaly::ReflectionLimit {
                    site: r.site,
                    bounces: ray.bounces,
                },
            );
            return Ok(());
        }

        // Bounce sideways, away from the side we hit. Searching from the side
        // itself (rather than from the site) keeps us from finding it again.
        let s = self.sweep(r.site);
        let neighbor = match r.side.kind {
            SideKind::Low => self.status.next_low(&r.side),
            SideKind::High => self.status.next_high(&r.side),
        }
        .copied();
        let q = match neighbor {
            Some(n) => n.point_at(s),
            None => self.boundary_point(r.site, r.side.kind),
        };
        self.graph.add_edge(r.site, q);

        if let Some(n) = neighbor {
            if q != n.end && !n.encloses_ray() {
                self.cast_ray(q, idx, ray.bounces + 1)?;
            }
        }
        Ok(())
    }

    fn process_axis_coordinate(&mut self, idx: EventIdx, site: Point) -> Result<(), Error> {
        let c = self.sweep(site);
        let low_end = self.boundary_point(site, SideKind::Low);

        // Find the free intervals of the scan line. Obstacles that end right
        // here don't block anything.
        let mut intervals: Vec<(Point, Point)> = Vec::new();
        let mut depth = 0usize;
        let mut free_start = low_end;
        for side in self.status.iter() {
            if self.obstacles[side.obstacle].sweep_extent(self.dir).1 == c {
                continue;
            }
            let p = side.point_at(c);
            match side.kind {
                SideKind::Low => {
                    if depth == 0 {
                        intervals.push((free_start, p));
                    }
                    depth += 1;
                }
                SideKind::High => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        free_start = p;
                    }
                }
            }
        }
        if depth == 0 {
            let high_end = self.boundary_point(site, SideKind::High);
            intervals.push((free_start, high_end));
        }

        let mut stops: Vec<Vec<Point>> = intervals.iter().map(|(a, b)| vec![*a, *b]).collect();
        let mut waypoints = self
            .waypoints
            .get(&CheapOrderedFloat::from(c))
            .cloned()
            .unwrap_or_default();
        waypoints.sort();
        waypoints.dedup();
        for w in waypoints {
            self.graph.add_vertex(w, VertexKind::Waypoint);
            let perp = self.perp(w);
            let interval = intervals
                .iter()
                .position(|(a, b)| self.perp(*a) <= perp && perp <= self.perp(*b));
            match interval {
                Some(i) => {
                    stops[i].push(w);
                    self.cast_ray(w, idx, 0)?;
                }
                None => report(
                    &mut self.anomalies,
                    Anomaly::WaypointInsideObstacle { location: w },
                ),
            }
        }

        for mut points in stops {
            points.sort_by(|a, b| self.dir.compare_perp(*a, *b));
            for pair in points.windows(2) {
                self.graph.add_edge(pair[0], pair[1]);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for SweepPass<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepPass")
            .field("dir", &self.dir)
            .field("position", &self.queue.position())
            .field("pending", &self.queue.len())
            .field("status", &self.status)
            .field("rays", &self.lookahead.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::ObstacleIdx;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn square(x: f64, y: f64, size: f64) -> kurbo::Rect {
        kurbo::Rect::new(x, y, x + size, y + size)
    }

    fn run(obs: &Obstacles, ports: &[WaypointPort], dir: ScanDirection) -> PassOutput {
        SweepPass::new(obs, ports, dir, &SweepConfig::default())
            .unwrap()
            .run()
            .unwrap()
    }

    #[test]
    fn single_square() {
        let mut obs = Obstacles::default();
        obs.add_rect(square(0.0, 0.0, 10.0), None);
        let out = run(&obs, &[], ScanDirection::Horizontal);
        let g = &out.graph;

        for v in [p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)] {
            assert_matches!(
                g.vertex_at(v).map(|v| v.kind),
                Some(VertexKind::ObstacleVertex(ObstacleIdx(0)))
            );
        }
        // The sides are edges, and the corners see out to the boundary.
        assert!(g.has_edge(p(0.0, 0.0), p(10.0, 0.0)));
        assert!(g.has_edge(p(0.0, 0.0), p(0.0, 10.0)));
        assert!(g.has_edge(p(-1.0, 0.0), p(0.0, 0.0)));
        assert!(g.has_edge(p(10.0, 0.0), p(11.0, 0.0)));
        assert!(g.has_edge(p(-1.0, 10.0), p(0.0, 10.0)));
        assert!(g.has_edge(p(0.0, 10.0), p(0.0, 11.0)));
        assert!(g.has_edge(p(10.0, 10.0), p(10.0, 11.0)));
        assert!(out.anomalies.is_empty());
        assert!(!out
            .events
            .iter()
            .any(|(_, e)| e.reflection().is_some()));
    }

    #[test]
    fn stepping() {
        let mut obs = Obstacles::default();
        obs.add_rect(square(0.0, 0.0, 10.0), None);
        let mut pass = SweepPass::new(
            &obs,
            &[],
            ScanDirection::Vertical,
            &SweepConfig::default(),
        )
        .unwrap();
        assert_eq!(pass.position(), None);
        assert_eq!(pass.direction(), ScanDirection::Vertical);

        // The axis coordinate event at x = 0 comes first.
        let first = pass.next_event().unwrap().unwrap();
        assert_matches!(pass.events()[first], SweepEvent::AxisCoordinate { .. });
        let open = pass.next_event().unwrap().unwrap();
        assert_matches!(pass.events()[open], SweepEvent::Open(v) if v.site == p(0.0, 0.0));
        assert_eq!(pass.status().len(), 1);

        while pass.next_event().unwrap().is_some() {}
        assert!(pass.status().is_empty());
        assert!(pass.graph().has_edge(p(0.0, 0.0), p(0.0, 10.0)));
    }

    #[test]
    fn waypoint_sees_obstacle() {
        let mut obs = Obstacles::default();
        obs.add_rect(square(0.0, 10.0, 10.0), None);
        let ports = [WaypointPort::new((5.0, 0.0))];
        let out = run(&obs, &ports, ScanDirection::Horizontal);
        let g = &out.graph;

        assert_eq!(g.vertex_at(p(5.0, 0.0)).unwrap().kind, VertexKind::Waypoint);
        // The scan line through the waypoint, split at the waypoint.
        assert!(g.has_edge(p(-1.0, 0.0), p(5.0, 0.0)));
        assert!(g.has_edge(p(5.0, 0.0), p(11.0, 0.0)));
        // Its ray stops at the bottom of the square.
        assert!(g.has_edge(p(5.0, 0.0), p(5.0, 10.0)));
        assert_eq!(g.vertex_at(p(5.0, 10.0)).unwrap().kind, VertexKind::Steiner);
    }

    #[test]
    fn waypoint_inside_obstacle() {
        let mut obs = Obstacles::default();
        obs.add_rect(square(0.0, 0.0, 10.0), None);
        let ports = [WaypointPort::new((5.0, 5.0))];
        let out = run(&obs, &ports, ScanDirection::Horizontal);
        assert_eq!(
            out.anomalies,
            vec![Anomaly::WaypointInsideObstacle {
                location: p(5.0, 5.0)
            }]
        );
        assert!(out.graph.vertex_at(p(5.0, 5.0)).is_some());
        // The scan line at the waypoint stops at the square.
        assert!(out.graph.has_edge(p(-1.0, 5.0), p(0.0, 5.0)));
        assert!(!out.graph.has_edge(p(0.0, 5.0), p(5.0, 5.0)));
    }

    #[test]
    fn non_monotone_obstacle_fails() {
        let mut obs = Obstacles::default();
        obs.add_obstacle(
            [
                (0.0, 0.0),
                (30.0, 0.0),
                (30.0, 30.0),
                (20.0, 30.0),
                (20.0, 10.0),
                (10.0, 10.0),
                (10.0, 30.0),
                (0.0, 30.0),
            ],
            None,
        );
        assert_matches!(
            SweepPass::new(&obs, &[], ScanDirection::Horizontal, &SweepConfig::default()),
            Err(Error::NonMonotoneObstacle { .. })
        );
    }

    #[test]
    fn bad_port() {
        let obs = Obstacles::default();
        let ports = [WaypointPort::new((f64::INFINITY, 0.0))];
        assert_matches!(
            SweepPass::new(&obs, &ports, ScanDirection::Horizontal, &SweepConfig::default()),
            Err(Error::Infinity)
        );
    }
}
