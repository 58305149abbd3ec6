//! Vertical content bounds of a binarized page.
//!
//! Each column contributes its topmost and bottommost ink pixel. A left and a
//! right [`Envelope`] collect these extremes into convex chains; the chain
//! segments that run more vertically than horizontally feed a RAST search for
//! the dominant near-vertical line, which is then refined by a
//! length-weighted orthogonal least-squares fit over its support.
//!
//! The returned lines always span the image from `y = 0` to `y = height`.
mod envelope;

pub use envelope::{column_ranges, Envelope, Side, VertRange};

use log::{debug, warn};
use nalgebra::{Matrix2, SymmetricEigen};

use crate::geometry::{self, Line2, EPS};
use crate::image::BinaryImage;
use crate::rast::{RastLineFinder, RastLineFinderParams};

/// Largest deviation from vertical (degrees) a bound line may have.
const MAX_BOUND_SKEW_DEG: f32 = 45.0;

/// Detect the `(left, right)` content bounds of `mask` (`true` = ink).
///
/// Without any ink the bounds fall back to the image's left and right edges.
pub fn detect_vert_content_bounds(mask: &BinaryImage) -> (Line2, Line2) {
    let (w, h) = (mask.width() as f32, mask.height() as f32);
    let max_segment_len = ((w * w + h * h) / 3.0).sqrt();
    let ranges = column_ranges(mask);

    let left_env = Envelope::from_ranges(Side::Left, &ranges, max_segment_len);
    let right_env = Envelope::from_ranges(Side::Right, &ranges, max_segment_len);

    let left = fit_bound(&left_env, [w * 0.5, h * 0.5])
        .unwrap_or_else(|| Line2::vertical(0.0, h));
    let right = fit_bound(&right_env, [w * 0.5, h * 0.5])
        .unwrap_or_else(|| Line2::vertical((w - 1.0).max(0.0), h));

    let left = extend_to_height(left, h);
    let right = extend_to_height(right, h);
    debug!(
        "detect_vert_content_bounds left_env={} right_env={} left=({:.1}..{:.1}) right=({:.1}..{:.1})",
        left_env.len(),
        right_env.len(),
        left.p1[0],
        left.p2[0],
        right.p1[0],
        right.p2[0]
    );
    (left, right)
}

/// Envelope vertex with the accumulated length of its usable segments.
#[derive(Clone, Copy, Debug)]
struct WeightedPoint {
    p: [f32; 2],
    weight: f32,
}

/// Dominant near-vertical line along an envelope, `None` for an empty one.
fn fit_bound(env: &Envelope, origin: [f32; 2]) -> Option<Line2> {
    let points: Vec<[f32; 2]> = env.points().iter().copied().collect();
    match points.len() {
        0 => return None,
        1 => return Some(Line2::vertical(points[0][0], points[0][1] + 1.0)),
        _ => {}
    }

    let mut weighted: Vec<WeightedPoint> = Vec::new();
    let mut vertex_slot: Vec<Option<usize>> = vec![None; points.len()];
    for (i, pair) in points.windows(2).enumerate() {
        let d = geometry::sub(pair[1], pair[0]);
        let len = geometry::norm(d);
        if len <= EPS || d[0].abs() > d[1].abs() {
            continue;
        }
        for k in [i, i + 1] {
            let slot = *vertex_slot[k].get_or_insert_with(|| {
                weighted.push(WeightedPoint {
                    p: points[k],
                    weight: 0.0,
                });
                weighted.len() - 1
            });
            weighted[slot].weight += 0.5 * len;
        }
    }

    if weighted.len() < 2 {
        debug!("fit_bound {:?}: no near-vertical segments, using outermost column", env.side());
        return env.outermost_vertical();
    }

    let params = RastLineFinderParams {
        origin,
        min_angle_deg: -MAX_BOUND_SKEW_DEG,
        max_angle_deg: MAX_BOUND_SKEW_DEG,
        min_support_points: 2,
        ..RastLineFinderParams::default()
    };
    let cloud: Vec<[f32; 2]> = weighted.iter().map(|wp| wp.p).collect();
    let found = RastLineFinder::new(cloud, params)
        .ok()
        .and_then(|mut finder| finder.find_next());
    let Some(found) = found else {
        debug!("fit_bound {:?}: no RAST line, using outermost column", env.side());
        return env.outermost_vertical();
    };

    let support: Vec<WeightedPoint> = found.support.iter().map(|&i| weighted[i]).collect();
    let fitted = weighted_line_fit(&support).filter(is_near_vertical);
    Some(fitted.unwrap_or_else(|| {
        warn!("fit_bound degenerate least-squares system, keeping RAST line");
        found.line
    }))
}

fn is_near_vertical(line: &Line2) -> bool {
    let d = line.delta();
    d[0].abs() <= d[1].abs()
}

/// Orthogonal regression weighted by segment length. `None` when the weights
/// vanish or the points do not determine a direction.
fn weighted_line_fit(points: &[WeightedPoint]) -> Option<Line2> {
    let total: f32 = points.iter().map(|wp| wp.weight).sum();
    if total <= EPS {
        return None;
    }
    let mut mean = [0.0f32; 2];
    for wp in points {
        mean[0] += wp.weight * wp.p[0];
        mean[1] += wp.weight * wp.p[1];
    }
    mean = geometry::scale(mean, 1.0 / total);

    let mut cov = Matrix2::<f32>::zeros();
    for wp in points {
        let d = geometry::sub(wp.p, mean);
        cov[(0, 0)] += wp.weight * d[0] * d[0];
        cov[(0, 1)] += wp.weight * d[0] * d[1];
        cov[(1, 1)] += wp.weight * d[1] * d[1];
    }
    cov[(1, 0)] = cov[(0, 1)];

    let eig = SymmetricEigen::new(cov);
    let (major, minor) = if eig.eigenvalues[0] >= eig.eigenvalues[1] {
        (0, 1)
    } else {
        (1, 0)
    };
    if eig.eigenvalues[major] <= EPS || eig.eigenvalues[major] - eig.eigenvalues[minor] <= EPS {
        return None;
    }
    let v = eig.eigenvectors.column(major);
    let dir = geometry::normalized([v[0], v[1]])?;
    Some(Line2::new(mean, geometry::add(mean, dir)))
}

/// Extend to `y = 0 .. height`; near-horizontal lines become vertical lines
/// through their midpoint.
fn extend_to_height(line: Line2, height: f32) -> Line2 {
    match (line.x_at_y(0.0), line.x_at_y(height)) {
        (Some(top), Some(bottom)) => Line2::new([top, 0.0], [bottom, height]),
        _ => {
            let mid = line.point_at(0.5);
            Line2::vertical(mid[0], height)
        }
    }
}
