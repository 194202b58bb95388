//! Utilities for generating examples, benchmarks, and test cases.

use kurbo::Rect;

use crate::{Obstacles, Point, WaypointPort};

type Contours = Vec<Vec<Point>>;

/// Generate a bunch of squares, arranged in a grid.
///
/// The bottom-left of the first square is at (x0, y0). Each square has size
/// `size x size`, and the distance between squares (both horizontally and
/// vertically) is `offset`.
///
/// If `slant` is non-zero, generates parallelograms instead of squares: the
/// right-hand side of each square gets translated up by `slant`.
fn squares((x0, y0): (f64, f64), size: f64, offset: f64, slant: f64, count: usize) -> Contours {
    let mut ret = Vec::new();
    for i in 0..count {
        let x = x0 + i as f64 * offset;
        for j in 0..count {
            let y = y0 + j as f64 * offset;
            ret.push(vec![
                Point::new(x, y),
                Point::new(x + size, y + slant),
                Point::new(x + size, y + size + slant),
                Point::new(x, y + size),
            ]);
        }
    }

    ret
}

fn obstacles_from(contours: Contours) -> Obstacles {
    let mut obs = Obstacles::default();
    for c in contours {
        obs.add_obstacle(c, None);
    }
    obs
}

/// An `n` by `n` grid of squares.
///
/// Everything is axis-aligned, so a sweep over this never reflects.
pub fn grid(n: usize) -> Obstacles {
    obstacles_from(squares((0.0, 0.0), 30.0, 40.0, 0.0, n))
}

/// Like `grid`, but with parallelograms instead of squares.
///
/// The slanted sides make rays bounce in the horizontal sweep.
pub fn slanted_grid(n: usize) -> Obstacles {
    obstacles_from(squares((0.0, 0.0), 30.0, 40.0, 10.0, n))
}

/// An `n` by `n` grid of diamonds, with every other row shifted by half a
/// cell.
pub fn diamonds(n: usize) -> Obstacles {
    let mut contours = Vec::new();
    for j in 0..n {
        let shift = if j % 2 == 0 { 0.0 } else { 20.0 };
        for i in 0..n {
            let cx = 40.0 * i as f64 + shift;
            let cy = 40.0 * j as f64;
            contours.push(vec![
                Point::new(cx, cy - 15.0),
                Point::new(cx + 15.0, cy),
                Point::new(cx, cy + 15.0),
                Point::new(cx - 15.0, cy),
            ]);
        }
    }
    obstacles_from(contours)
}

/// An `n` by `n` grid of squares, each in its own group, with the groups in
/// each row sharing a parent group.
pub fn nested_groups(n: usize) -> Obstacles {
    let mut obs = Obstacles::default();
    for j in 0..n {
        let y = 40.0 * j as f64;
        let row = obs.add_group_rect(
            Rect::new(-4.0, y - 4.0, 40.0 * n as f64, y + 34.0),
            None,
        );
        for i in 0..n {
            let x = 40.0 * i as f64;
            let group = obs.add_group_rect(Rect::new(x - 2.0, y - 2.0, x + 32.0, y + 32.0), Some(row));
            obs.add_rect(Rect::new(x, y, x + 30.0, y + 30.0), Some(group));
        }
    }
    obs
}

/// Waypoints in the gaps of a `grid(n)` or `slanted_grid(n)`.
pub fn gap_waypoints(n: usize) -> Vec<WaypointPort> {
    (0..n)
        .flat_map(|i| {
            (0..n).map(move |j| WaypointPort::new((40.0 * i as f64 + 35.0, 40.0 * j as f64 + 35.0)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenes_are_valid() {
        for obs in [grid(3), slanted_grid(3), diamonds(3), nested_groups(3)] {
            assert_eq!(obs.validate(), Ok(()));
            assert_eq!(obs.len(), 9);
        }
        assert_eq!(nested_groups(3).group_count(), 12);
        assert_eq!(gap_waypoints(3).len(), 9);
    }
}
