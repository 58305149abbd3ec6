//! Plausibility filters applied to traced and refined curves.
use crate::angle::{deg_to_rad, signed_turn};
use crate::geometry::{self, Line2, Polyline};

use super::CurvatureRule;

/// Horizontal offset of `p` to the right of `bound` (a line running top to
/// bottom); negative on the left.
fn offset_right_of(bound: &Line2, p: [f32; 2]) -> f32 {
    match bound.x_at_y(p[1]) {
        Some(x) => p[0] - x,
        None => -bound.signed_distance(p),
    }
}

/// `true` when `p` lies between `left` and `right`, with `margin` slack on
/// both sides.
pub fn is_inside_bounds(p: [f32; 2], left: &Line2, right: &Line2, margin: f32) -> bool {
    offset_right_of(left, p) >= -margin && offset_right_of(right, p) <= margin
}

/// Drop curves whose extent along `across` is below `min_span`.
pub fn filter_short(polylines: &mut Vec<Polyline>, across: [f32; 2], min_span: f32) {
    polylines.retain(|pl| match (pl.first(), pl.last()) {
        (Some(&a), Some(&b)) if pl.len() >= 2 => {
            geometry::dot(geometry::sub(b, a), across).abs() >= min_span
        }
        _ => false,
    });
}

/// Drop curves with neither endpoint between the bounds.
pub fn filter_out_of_bounds(polylines: &mut Vec<Polyline>, left: &Line2, right: &Line2, margin: f32) {
    polylines.retain(|pl| match (pl.first(), pl.last()) {
        (Some(&a), Some(&b)) => {
            is_inside_bounds(a, left, right, margin) || is_inside_bounds(b, left, right, margin)
        }
        _ => false,
    });
}

/// Check the turns between consecutive segments. Turns above `turn_deg` are
/// significant; `rule` decides which combinations reject the curve.
pub fn is_curvature_consistent(polyline: &[[f32; 2]], turn_deg: f32, rule: CurvatureRule) -> bool {
    let threshold = deg_to_rad(turn_deg);
    let mut significant_positive = false;
    let mut significant_negative = false;
    let mut prev_dir: Option<[f32; 2]> = None;
    for pair in polyline.windows(2) {
        let Some(dir) = geometry::normalized(geometry::sub(pair[1], pair[0])) else {
            continue;
        };
        if let Some(prev) = prev_dir {
            let turn = signed_turn(&prev, &dir);
            if turn > threshold {
                significant_positive = true;
            } else if turn < -threshold {
                significant_negative = true;
            }
        }
        prev_dir = Some(dir);
    }
    match rule {
        CurvatureRule::SignFlip => !(significant_positive && significant_negative),
        CurvatureRule::Literal => !significant_positive,
    }
}

/// Drop curves failing [`is_curvature_consistent`].
pub fn filter_curvature(polylines: &mut Vec<Polyline>, turn_deg: f32, rule: CurvatureRule) {
    polylines.retain(|pl| is_curvature_consistent(pl, turn_deg, rule));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> (Line2, Line2) {
        (Line2::vertical(10.0, 100.0), Line2::vertical(90.0, 100.0))
    }

    #[test]
    fn inside_bounds_respects_margin() {
        let (l, r) = bounds();
        assert!(is_inside_bounds([50.0, 20.0], &l, &r, 0.0));
        assert!(!is_inside_bounds([8.0, 20.0], &l, &r, 0.0));
        assert!(is_inside_bounds([8.0, 20.0], &l, &r, 3.0));
        assert!(!is_inside_bounds([95.0, 20.0], &l, &r, 3.0));
    }

    #[test]
    fn out_of_bounds_and_short_curves_are_dropped() {
        let (l, r) = bounds();
        let mut curves = vec![
            vec![[0.0, 10.0], [5.0, 10.0]],
            vec![[12.0, 30.0], [88.0, 31.0]],
            vec![[40.0, 50.0], [45.0, 50.0]],
        ];
        filter_out_of_bounds(&mut curves, &l, &r, 1.0);
        assert_eq!(curves.len(), 2);
        filter_short(&mut curves, [1.0, 0.0], 0.3 * 80.0);
        assert_eq!(curves, vec![vec![[12.0, 30.0], [88.0, 31.0]]]);
    }

    #[test]
    fn zigzag_fails_sign_flip_rule() {
        let zigzag = vec![[0.0, 0.0], [10.0, 0.0], [20.0, 10.0], [30.0, 0.0]];
        assert!(!is_curvature_consistent(&zigzag, 30.0, CurvatureRule::SignFlip));

        // Bending one way only (a smile on screen).
        let arc = vec![[0.0, 0.0], [10.0, 8.0], [20.0, 10.0], [30.0, 8.0], [40.0, 0.0]];
        assert!(is_curvature_consistent(&arc, 30.0, CurvatureRule::SignFlip));
        assert!(is_curvature_consistent(&arc, 10.0, CurvatureRule::SignFlip));
        let frown: Vec<[f32; 2]> = arc.iter().map(|p| [p[0], -p[1]]).collect();
        assert!(!is_curvature_consistent(&frown, 10.0, CurvatureRule::Literal));
    }

    #[test]
    fn literal_rule_rejects_any_clockwise_turn() {
        let right_turn = vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]];
        assert!(is_curvature_consistent(&right_turn, 30.0, CurvatureRule::SignFlip));
        assert!(!is_curvature_consistent(&right_turn, 30.0, CurvatureRule::Literal));
        let left_turn = vec![[0.0, 0.0], [10.0, 0.0], [10.0, -10.0]];
        assert!(is_curvature_consistent(&left_turn, 30.0, CurvatureRule::Literal));
    }
}
