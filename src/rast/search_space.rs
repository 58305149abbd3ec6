//! Polar parameter boxes explored by [`super::RastLineFinder`].
use std::f32::consts::PI;

use crate::geometry::{self, Line2, EPS};
use crate::priority_queue::HeapOrder;

/// Lines with unit normal `n = (cos θ, sin θ)` and offset `d`, i.e. the points
/// `p` with `(p - origin) · n = d`, for `d ∈ [min_dist, max_dist]` and
/// `θ ∈ [min_angle, max_angle]` (radians).
#[derive(Clone, Debug)]
pub struct SearchSpace {
    pub min_dist: f32,
    pub max_dist: f32,
    pub min_angle: f32,
    pub max_angle: f32,
    /// Indices of points that may lie on some line of this box.
    pub points: Vec<usize>,
}

/// Shared context for building and splitting boxes.
pub(crate) struct SpaceContext<'a> {
    pub points: &'a [[f32; 2]],
    pub origin: [f32; 2],
    pub dist_tolerance: f32,
    pub min_dist_span: f32,
    pub min_angle_span: f32,
}

impl SearchSpace {
    /// Box restricted to those of `candidates` consistent with it.
    pub(crate) fn new(
        ctx: &SpaceContext<'_>,
        min_dist: f32,
        max_dist: f32,
        min_angle: f32,
        max_angle: f32,
        candidates: &[usize],
    ) -> Self {
        let lo = min_dist - ctx.dist_tolerance;
        let hi = max_dist + ctx.dist_tolerance;
        let points = candidates
            .iter()
            .copied()
            .filter(|&idx| {
                let rel = geometry::sub(ctx.points[idx], ctx.origin);
                let (dmin, dmax) = dist_range(rel, min_angle, max_angle);
                dmax >= lo && dmin <= hi
            })
            .collect();
        Self {
            min_dist,
            max_dist,
            min_angle,
            max_angle,
            points,
        }
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub(crate) fn subdivide_dist(&self, ctx: &SpaceContext<'_>) -> Option<(Self, Self)> {
        if self.max_dist - self.min_dist <= ctx.min_dist_span {
            return None;
        }
        let mid = 0.5 * (self.min_dist + self.max_dist);
        Some((
            Self::new(ctx, self.min_dist, mid, self.min_angle, self.max_angle, &self.points),
            Self::new(ctx, mid, self.max_dist, self.min_angle, self.max_angle, &self.points),
        ))
    }

    pub(crate) fn subdivide_angle(&self, ctx: &SpaceContext<'_>) -> Option<(Self, Self)> {
        if self.max_angle - self.min_angle <= ctx.min_angle_span {
            return None;
        }
        let mid = 0.5 * (self.min_angle + self.max_angle);
        Some((
            Self::new(ctx, self.min_dist, self.max_dist, self.min_angle, mid, &self.points),
            Self::new(ctx, self.min_dist, self.max_dist, mid, self.max_angle, &self.points),
        ))
    }

    /// Line at the centre of the box, as a unit-length segment starting at the
    /// foot of the perpendicular from `origin`.
    pub fn representative_line(&self, origin: [f32; 2]) -> Line2 {
        let theta = 0.5 * (self.min_angle + self.max_angle);
        let dist = 0.5 * (self.min_dist + self.max_dist);
        let normal = [theta.cos(), theta.sin()];
        let foot = geometry::add(origin, geometry::scale(normal, dist));
        let dir = [-normal[1], normal[0]];
        Line2::new(foot, geometry::add(foot, dir))
    }

    /// Drop indices whose point is no longer available.
    pub(crate) fn prune(&mut self, available: &[bool]) {
        self.points.retain(|&idx| available[idx]);
    }
}

/// Range of `rel · (cos θ, sin θ)` for `θ ∈ [a0, a1]`.
pub(crate) fn dist_range(rel: [f32; 2], a0: f32, a1: f32) -> (f32, f32) {
    let r = geometry::norm(rel);
    if r <= EPS {
        return (0.0, 0.0);
    }
    let phi = rel[1].atan2(rel[0]);
    let d0 = r * (a0 - phi).cos();
    let d1 = r * (a1 - phi).cos();
    let mut lo = d0.min(d1);
    let mut hi = d0.max(d1);
    if angle_in_interval(phi, a0, a1) {
        hi = r;
    }
    if angle_in_interval(phi + PI, a0, a1) {
        lo = -r;
    }
    (lo, hi)
}

fn angle_in_interval(t: f32, a0: f32, a1: f32) -> bool {
    let turns = ((a0 - t) / (2.0 * PI)).ceil();
    t + turns * 2.0 * PI <= a1
}

/// Max-heap order: boxes with more candidate points are explored first.
pub(crate) struct ByPointCount;

impl HeapOrder<SearchSpace> for ByPointCount {
    #[inline]
    fn higher_than(&self, lhs: &SearchSpace, rhs: &SearchSpace) -> bool {
        lhs.point_count() > rhs.point_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dist_range_covers_sinusoid_extrema() {
        // Point on +x axis: d(θ) = 10 cos θ over [-π/4, π/4] peaks at θ = 0.
        let (lo, hi) = dist_range([10.0, 0.0], -PI / 4.0, PI / 4.0);
        assert!((hi - 10.0).abs() < 1e-4);
        assert!((lo - 10.0 * (PI / 4.0).cos()).abs() < 1e-4);

        // Point on -x axis reaches its minimum at θ = 0.
        let (lo, hi) = dist_range([-10.0, 0.0], -0.1, 0.1);
        assert!((lo + 10.0).abs() < 1e-4);
        assert!(hi < -9.9);
    }

    #[test]
    fn representative_line_matches_box_centre() {
        let space = SearchSpace {
            min_dist: 4.0,
            max_dist: 6.0,
            min_angle: -0.01,
            max_angle: 0.01,
            points: Vec::new(),
        };
        let line = space.representative_line([0.0, 0.0]);
        assert!((line.p1[0] - 5.0).abs() < 1e-4);
        assert!(line.p1[1].abs() < 1e-4);
        assert!((line.length() - 1.0).abs() < 1e-4);
        assert!(line.delta()[0].abs() < 1e-4);
    }
}
