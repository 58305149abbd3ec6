//! RAST (Recognition by Adaptive Subdivision of Transformation space) line
//! finder over 2D point clouds.
//!
//! Lines are parameterised in polar form relative to an origin: unit normal
//! angle `θ` and signed offset `d`. The finder keeps a best-first queue of
//! parameter boxes ordered by how many points could still lie on a line of the
//! box. Expanding a box bisects it along the distance or angle axis, keeping
//! whichever split yields the smaller combined point count (the tighter one).
//! A box that cannot be split any further within the configured tolerances is
//! reported as a line, and its points are withdrawn before the next search.
//!
//! Repeated [`RastLineFinder::find_next`] calls therefore return lines in
//! order of decreasing support.
mod search_space;

pub use search_space::SearchSpace;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::angle::deg_to_rad;
use crate::geometry::{self, Line2};
use crate::priority_queue::PriorityQueue;
use search_space::{ByPointCount, SpaceContext};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RastLineFinderParams {
    /// Reference point for the polar parameterisation.
    pub origin: [f32; 2],
    /// Lower bound of the line normal's angle, degrees.
    pub min_angle_deg: f32,
    /// Upper bound of the line normal's angle, degrees.
    pub max_angle_deg: f32,
    /// Angular resolution at which subdivision stops, degrees.
    pub angle_tolerance_deg: f32,
    /// Maximum perpendicular distance of a support point from its line.
    pub max_dist_from_line: f32,
    /// Lines need at least this many support points.
    pub min_support_points: usize,
}

impl Default for RastLineFinderParams {
    fn default() -> Self {
        Self {
            origin: [0.0, 0.0],
            min_angle_deg: -90.0,
            max_angle_deg: 90.0,
            angle_tolerance_deg: 0.1,
            max_dist_from_line: 1.0,
            min_support_points: 3,
        }
    }
}

impl RastLineFinderParams {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.origin[0].is_finite() && self.origin[1].is_finite()) {
            return Err("origin must be finite".to_string());
        }
        if !(self.min_angle_deg.is_finite() && self.max_angle_deg.is_finite()) {
            return Err("angle range must be finite".to_string());
        }
        if self.min_angle_deg >= self.max_angle_deg {
            return Err(format!(
                "min_angle_deg ({}) must be below max_angle_deg ({})",
                self.min_angle_deg, self.max_angle_deg
            ));
        }
        if self.max_angle_deg - self.min_angle_deg > 180.0 {
            return Err("angle range must not exceed 180 degrees".to_string());
        }
        if !(self.angle_tolerance_deg > 0.0) {
            return Err("angle_tolerance_deg must be positive".to_string());
        }
        if !(self.max_dist_from_line > 0.0) {
            return Err("max_dist_from_line must be positive".to_string());
        }
        if self.min_support_points < 2 {
            return Err("min_support_points must be at least 2".to_string());
        }
        Ok(())
    }
}

/// A line reported by the finder together with the indices of the input
/// points supporting it.
#[derive(Clone, Debug)]
pub struct FoundLine {
    pub line: Line2,
    pub support: Vec<usize>,
}

pub struct RastLineFinder {
    points: Vec<[f32; 2]>,
    available: Vec<bool>,
    params: RastLineFinderParams,
    queue: PriorityQueue<SearchSpace>,
    needs_pruning: bool,
}

impl RastLineFinder {
    /// Build the finder and seed the root search space. Invalid parameters are
    /// rejected with a message.
    pub fn new(points: Vec<[f32; 2]>, params: RastLineFinderParams) -> Result<Self, String> {
        params.validate()?;
        let mut finder = Self {
            available: vec![true; points.len()],
            points,
            params,
            queue: PriorityQueue::new(),
            needs_pruning: false,
        };
        finder.seed();
        Ok(finder)
    }

    pub fn params(&self) -> &RastLineFinderParams {
        &self.params
    }

    pub fn points(&self) -> &[[f32; 2]] {
        &self.points
    }

    fn context(&self) -> SpaceContext<'_> {
        let tol = self.params.max_dist_from_line;
        SpaceContext {
            points: &self.points,
            origin: self.params.origin,
            dist_tolerance: 0.5 * tol,
            min_dist_span: tol,
            min_angle_span: deg_to_rad(self.params.angle_tolerance_deg),
        }
    }

    fn seed(&mut self) {
        if self.points.len() < self.params.min_support_points {
            return;
        }
        let origin = self.params.origin;
        let max_r = self
            .points
            .iter()
            .map(|&p| geometry::distance(p, origin))
            .fold(0.0f32, f32::max);
        let all: Vec<usize> = (0..self.points.len()).collect();
        let root = {
            let ctx = self.context();
            let reach = max_r + ctx.dist_tolerance;
            SearchSpace::new(
                &ctx,
                -reach,
                reach,
                deg_to_rad(self.params.min_angle_deg),
                deg_to_rad(self.params.max_angle_deg),
                &all,
            )
        };
        if root.point_count() >= self.params.min_support_points {
            self.queue.push(root, &mut ByPointCount);
        }
    }

    /// Next best-supported line, or `None` once no box with enough available
    /// points remains.
    pub fn find_next(&mut self) -> Option<FoundLine> {
        if self.needs_pruning {
            self.prune_queue();
            self.needs_pruning = false;
        }

        let min_support = self.params.min_support_points;
        while let Some(space) = self.queue.pop(&mut ByPointCount) {
            let split = {
                let ctx = self.context();
                match (space.subdivide_dist(&ctx), space.subdivide_angle(&ctx)) {
                    (Some(d), Some(a)) => {
                        let d_total = d.0.point_count() + d.1.point_count();
                        let a_total = a.0.point_count() + a.1.point_count();
                        Some(if d_total <= a_total { d } else { a })
                    }
                    (Some(d), None) => Some(d),
                    (None, Some(a)) => Some(a),
                    (None, None) => None,
                }
            };

            match split {
                Some((first, second)) => {
                    for half in [first, second] {
                        if half.point_count() >= min_support {
                            self.queue.push(half, &mut ByPointCount);
                        }
                    }
                }
                None => {
                    let line = space.representative_line(self.params.origin);
                    for &idx in &space.points {
                        self.available[idx] = false;
                    }
                    self.needs_pruning = true;
                    debug!(
                        "RastLineFinder::find_next support={} queued={}",
                        space.points.len(),
                        self.queue.len()
                    );
                    return Some(FoundLine {
                        line,
                        support: space.points,
                    });
                }
            }
        }
        None
    }

    fn prune_queue(&mut self) {
        let available = &self.available;
        let min_support = self.params.min_support_points;
        self.queue.retain_mut(&mut ByPointCount, |space| {
            space.prune(available);
            space.point_count() >= min_support
        });
    }
}
