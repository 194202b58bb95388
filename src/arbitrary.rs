//! Utilities for fuzz and/or property testing using `arbitrary`.

use arbitrary::Unstructured;
use kurbo::Rect;

use crate::{
    obstacles::Obstacle,
    sparse_visibility_graph,
    sweep::{SweepEvent, SweepPass},
    GroupIdx, Obstacles, Point, ScanDirection, SweepConfig, WaypointPort,
};

/// The side length of one cell of the grid that generated obstacles live in.
pub const CELL: f64 = 100.0;

/// Generate an arbitrary float in some range.
pub fn float_in_range(
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let num: u32 = u.arbitrary()?;
    let t = num as f64 / u32::MAX as f64;
    Ok((1.0 - t) * start + t * end)
}

/// Generate a float in some range, but give it a chance to be exactly one of
/// a few interesting values.
///
/// Coincident coordinates are where sweeps tend to go wrong, so we make them
/// likely.
fn snapped_float_in_range(
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let snap: u8 = u.int_in_range(0..=3)?;
    match snap {
        0 => Ok(start),
        1 => Ok(end),
        2 => Ok((start + end) / 2.0),
        _ => float_in_range(start, end, u),
    }
}

/// A convex polygon inside the square cell whose bottom-left corner is
/// `(x0, y0)`.
///
/// The polygon stays away from the cell's edges, so polygons in different
/// cells never touch.
fn convex_in_cell(x0: f64, y0: f64, u: &mut Unstructured<'_>) -> Result<Vec<Point>, arbitrary::Error> {
    let margin = CELL / 10.0;
    let (lo_x, hi_x) = (x0 + margin, x0 + CELL - margin);
    let (lo_y, hi_y) = (y0 + margin, y0 + CELL - margin);

    let kind: u8 = u.int_in_range(0..=2)?;
    let ret = match kind {
        // An axis-aligned box.
        0 => {
            let xa = snapped_float_in_range(lo_x, hi_x, u)?;
            let xb = snapped_float_in_range(lo_x, hi_x, u)?;
            let ya = snapped_float_in_range(lo_y, hi_y, u)?;
            let yb = snapped_float_in_range(lo_y, hi_y, u)?;
            vec![
                Point::new(xa.min(xb), ya.min(yb)),
                Point::new(xa.max(xb), ya.min(yb)),
                Point::new(xa.max(xb), ya.max(yb)),
                Point::new(xa.min(xb), ya.max(yb)),
            ]
        }
        // A quadrilateral with one vertex on each side of a box.
        1 => {
            let bottom = snapped_float_in_range(lo_x, hi_x, u)?;
            let right = snapped_float_in_range(lo_y, hi_y, u)?;
            let top = snapped_float_in_range(lo_x, hi_x, u)?;
            let left = snapped_float_in_range(lo_y, hi_y, u)?;
            vec![
                Point::new(bottom, lo_y),
                Point::new(hi_x, right),
                Point::new(top, hi_y),
                Point::new(lo_x, left),
            ]
        }
        // A regular polygon.
        _ => {
            let n: usize = u.int_in_range(3..=8)?;
            let rotation = float_in_range(0.0, std::f64::consts::TAU, u)?;
            let radius = float_in_range(CELL / 20.0, CELL / 2.0 - margin, u)?;
            let (cx, cy) = (x0 + CELL / 2.0, y0 + CELL / 2.0);
            (0..n)
                .map(|i| {
                    let theta = rotation + std::f64::consts::TAU * i as f64 / n as f64;
                    Point::new(cx + radius * theta.cos(), cy + radius * theta.sin())
                })
                .collect()
        }
    };
    Ok(ret)
}

/// Generate a set of non-overlapping convex obstacles, some of them in
/// groups.
///
/// Obstacles live in the cells of a grid with at most `max_size` cells on a
/// side. Some cells are empty, and some rows of cells are put in a group.
pub fn obstacles(max_size: usize, u: &mut Unstructured<'_>) -> Result<Obstacles, arbitrary::Error> {
    let rows: usize = u.int_in_range(1..=max_size.max(1))?;
    let cols: usize = u.int_in_range(1..=max_size.max(1))?;
    let mut obs = Obstacles::default();
    for j in 0..rows {
        let y0 = j as f64 * CELL;
        let group: Option<GroupIdx> = if u.ratio(1, 3)? {
            Some(obs.add_group_rect(
                Rect::new(0.0, y0 + 1.0, cols as f64 * CELL, y0 + CELL - 1.0),
                None,
            ))
        } else {
            None
        };
        for i in 0..cols {
            if u.ratio(1, 4)? {
                continue;
            }
            let points = convex_in_cell(i as f64 * CELL, y0, u)?;
            obs.add_obstacle(points, group);
        }
    }
    Ok(obs)
}

/// Generate some waypoints somewhere near the obstacles.
///
/// They might be inside obstacles.
pub fn waypoints(obstacles: &Obstacles, u: &mut Unstructured<'_>) -> Result<Vec<WaypointPort>, arbitrary::Error> {
    let bbox = obstacles.bounding_box().unwrap_or(Rect::new(0.0, 0.0, CELL, CELL));
    let count: usize = u.int_in_range(0..=4)?;
    (0..count)
        .map(|_| {
            let x = snapped_float_in_range(bbox.x0, bbox.x1, u)?;
            let y = snapped_float_in_range(bbox.y0, bbox.y1, u)?;
            Ok(WaypointPort::new((x, y)))
        })
        .collect()
}

/// Sweeps arbitrary obstacles in both directions and checks the output.
///
/// Panics if something is wrong, so it can be driven by a fuzzer or by
/// `arbtest`.
pub fn check_sweep(u: &mut Unstructured<'_>) -> Result<(), arbitrary::Error> {
    let obs = obstacles(4, u)?;
    let ports = waypoints(&obs, u)?;
    let config = SweepConfig {
        max_reflections: u.int_in_range(0..=8)?,
        ..SweepConfig::default()
    };

    for dir in ScanDirection::ALL {
        let out = SweepPass::new(&obs, &ports, dir, &config)
            .and_then(SweepPass::run)
            .unwrap_or_else(|e| panic!("{dir:?} pass failed: {e}"));

        for (idx, o) in obs.obstacles() {
            if o.is_degenerate() {
                continue;
            }
            let count = |f: fn(&SweepEvent) -> bool| {
                out.events
                    .iter()
                    .filter(|(_, e)| e.obstacle() == Some(idx) && f(e))
                    .count()
            };
            assert_eq!(count(|e| matches!(e, SweepEvent::Open(_))), 1);
            assert_eq!(count(|e| matches!(e, SweepEvent::Close(_))), 1);
        }

        for (idx, event) in out.events.iter() {
            if event.reflection().is_none() {
                continue;
            }
            let chain = out.events.chain(idx);
            for pair in chain.windows(2) {
                let a = dir.sweep_coord(out.events[pair[0]].site());
                let b = dir.sweep_coord(out.events[pair[1]].site());
                assert!(a < b, "reflection chain {chain:?} goes backwards");
            }
        }
    }

    let out = sparse_visibility_graph(&obs, &ports, &config)
        .unwrap_or_else(|e| panic!("sweep failed: {e}"));
    for (_, o) in obs.obstacles() {
        for p in o.points() {
            assert!(out.graph.vertex_at(*p).is_some(), "{p:?} is missing");
        }
    }
    for e in out.graph.edges() {
        let (p, q) = out.graph.endpoints(e);
        assert!(p < q);
        assert!(p.x == q.x || p.y == q.y, "{p:?} -> {q:?} is slanted");
        assert!(e.crossings.is_some());
    }

    // Facing corners of two boxes with nothing between them are joined by a
    // shortest rectilinear path.
    let boxes: Vec<_> = obs
        .obstacles()
        .filter_map(|(idx, o)| as_box(o).map(|r| (idx, r)))
        .collect();
    let bboxes: Vec<_> = obs
        .obstacles()
        .filter_map(|(idx, o)| o.bounding_box().map(|r| (idx, r)))
        .collect();
    for &(i, a) in &boxes {
        for &(j, b) in &boxes {
            let (p, q) = if b.x0 > a.x1 && b.y0 > a.y1 {
                (Point::new(a.x1, a.y1), Point::new(b.x0, b.y0))
            } else if b.x1 < a.x0 && b.y0 > a.y1 {
                (Point::new(a.x0, a.y1), Point::new(b.x1, b.y0))
            } else {
                continue;
            };
            let corridor = Rect::from_points(p.to_kurbo(), q.to_kurbo());
            let blocked = bboxes.iter().any(|&(k, r)| {
                k != i
                    && k != j
                    && r.x0 <= corridor.x1
                    && r.x1 >= corridor.x0
                    && r.y0 <= corridor.y1
                    && r.y1 >= corridor.y0
            });
            if blocked {
                continue;
            }

            let manhattan = (q.x - p.x).abs() + (q.y - p.y).abs();
            let dist = out
                .graph
                .shortest_path_length(p, q)
                .unwrap_or_else(|| panic!("no path from {p:?} to {q:?}"));
            assert!(
                (dist - manhattan).abs() <= 1e-9 * (1.0 + manhattan),
                "path from {p:?} to {q:?} has length {dist}, expected {manhattan}"
            );
        }
    }
    Ok(())
}

/// The obstacle's bounding box, if the obstacle is exactly that box.
fn as_box(o: &Obstacle) -> Option<Rect> {
    let bbox = o.bounding_box()?;
    let is_corner =
        |p: &Point| (p.x == bbox.x0 || p.x == bbox.x1) && (p.y == bbox.y0 || p.y == bbox.y1);
    (o.points().len() == 4 && o.points().iter().all(is_corner)).then_some(bbox)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_obstacles_are_valid() {
        arbtest::arbtest(|u| {
            let obs = obstacles(4, u)?;
            assert_eq!(obs.validate(), Ok(()));
            Ok(())
        });
    }

    #[test]
    fn sweep() {
        arbtest::arbtest(check_sweep);
    }
}
