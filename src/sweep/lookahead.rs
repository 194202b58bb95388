//! Rays that have been cast but haven't hit anything yet.
//!
//! A ray leaves a point in the sweep direction at a fixed perpendicular
//! coordinate. It waits here until an obstacle side shows up in front of it
//! (at which point we schedule a reflection event) or until something closer
//! blocks it.

use std::{collections::BTreeSet, ops::Bound};

use crate::{num::CheapOrderedFloat, obstacles::ObstacleSide, Point};

use super::events::EventIdx;

typed_arena!(
    /// An index into the rays of a [`LookaheadScan`].
    RayVec,
    RayIdx,
    "r_"
);

/// A ray cast in the sweep direction.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Ray {
    /// Where the ray starts.
    pub origin: Point,
    /// The event that cast the ray.
    pub source: EventIdx,
    /// How many reflections led up to this ray.
    pub bounces: usize,
    active: bool,
}

/// The pending rays of a sweep, ordered by perpendicular coordinate.
#[derive(Clone, Debug)]
pub struct LookaheadScan {
    dir: crate::ScanDirection,
    rays: RayVec<Ray>,
    active: BTreeSet<(CheapOrderedFloat, RayIdx)>,
}

impl LookaheadScan {
    /// Creates an empty scan for a sweep in direction `dir`.
    pub fn new(dir: crate::ScanDirection) -> Self {
        LookaheadScan {
            dir,
            rays: RayVec::default(),
            active: BTreeSet::new(),
        }
    }

    /// Starts a new ray at `origin`.
    pub fn cast(&mut self, origin: Point, source: EventIdx, bounces: usize) -> RayIdx {
        let idx = self.rays.push(Ray {
            origin,
            source,
            bounces,
            active: true,
        });
        self.active
            .insert((self.dir.perp_coord(origin).into(), idx));
        idx
    }

    /// The active rays with perpendicular coordinates in `[lo, hi]`, from
    /// low to high.
    pub fn in_range(&self, lo: f64, hi: f64) -> Vec<RayIdx> {
        if !(lo <= hi) {
            return Vec::new();
        }
        let start = (CheapOrderedFloat::from(lo), RayIdx(0));
        let end = (CheapOrderedFloat::from(hi), RayIdx(usize::MAX));
        self.active
            .range((Bound::Included(start), Bound::Included(end)))
            .map(|(_, idx)| *idx)
            .collect()
    }

    /// Stops a ray. Returns `false` if it was already stopped.
    pub fn terminate(&mut self, idx: RayIdx) -> bool {
        let ray = &mut self.rays[idx];
        if !ray.active {
            return false;
        }
        ray.active = false;
        self.active
            .remove(&(self.dir.perp_coord(ray.origin).into(), idx));
        true
    }

    /// Is this ray still waiting for a hit?
    pub fn is_active(&self, idx: RayIdx) -> bool {
        self.rays[idx].active
    }

    /// All the rays that haven't been stopped yet, from low to high.
    pub fn active(&self) -> impl Iterator<Item = RayIdx> + '_ {
        self.active.iter().map(|(_, idx)| *idx)
    }

    /// The number of active rays.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Are there no active rays?
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl std::ops::Index<RayIdx> for LookaheadScan {
    type Output = Ray;

    fn index(&self, index: RayIdx) -> &Ray {
        &self.rays[index]
    }
}

/// Where a ray at perpendicular coordinate `perp`, starting from sweep
/// coordinate `origin_sweep`, hits `side`.
///
/// Only hits strictly ahead of the origin count. A side that runs parallel to
/// the ray is never hit. The returned point has exactly the ray's
/// perpendicular coordinate.
pub fn strike(side: &ObstacleSide, perp: f64, origin_sweep: f64) -> Option<Point> {
    let dir = side.dir;
    let delta = side.perp_delta();
    if delta == 0.0 {
        return None;
    }
    let p0 = dir.perp_coord(side.start);
    let t = (perp - p0) / delta;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    let sweep = if perp == p0 {
        side.start_sweep()
    } else if perp == dir.perp_coord(side.end) {
        side.end_sweep()
    } else {
        side.start_sweep() + t * (side.end_sweep() - side.start_sweep())
    };
    (sweep > origin_sweep).then(|| dir.point(sweep, perp))
}
