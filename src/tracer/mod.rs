//! Text-line and page-edge tracing between the vertical content bounds.
//!
//! Two strategies produce candidate polylines:
//! - [`gradient_path`]: shortest paths across the directional derivative
//!   field, strongest on the top and bottom edges of the text block;
//! - [`region_graph`]: region growing in the thick text mask plus a walk over
//!   region adjacency, one polyline per text line.
//!
//! Candidates are oriented left to right and pass through the filters in
//! [`filter`]. Fewer than two survivors yield an empty result.
pub mod filter;
pub mod gradient_path;
mod node;
mod options;
pub mod region_graph;

pub use filter::{
    filter_curvature, filter_out_of_bounds, filter_short, is_curvature_consistent,
    is_inside_bounds,
};
pub use gradient_path::trace_gradient_paths;
pub use node::{NodeTag, PathNode, RegionCell};
pub use options::{CurvatureRule, TraceStrategy, TracerOptions};
pub use region_graph::{trace_region_graph, Edge, EdgeNode, Region, RegionGraph};

use log::debug;

use crate::geometry::{self, Line2, Polyline};
use crate::image::{BinaryImage, ImageF32};

/// Average downward unit direction of two bound lines.
pub fn down_direction(left: &Line2, right: &Line2) -> Option<[f32; 2]> {
    let downward = |line: &Line2| {
        let d = line.unit_direction()?;
        Some(if d[1] < 0.0 { geometry::scale(d, -1.0) } else { d })
    };
    let sum = geometry::add(downward(left)?, downward(right)?);
    geometry::normalized(sum)
}

/// Unit vector perpendicular to `down`, pointing from `first` toward
/// `second`.
pub fn across_direction(first: &Line2, second: &Line2, down: [f32; 2]) -> Option<[f32; 2]> {
    let perp = [-down[1], down[0]];
    let towards = geometry::sub(second.point_at(0.5), first.point_at(0.5));
    let sign = geometry::dot(perp, towards);
    if sign.abs() <= geometry::EPS {
        return None;
    }
    Some(if sign > 0.0 {
        perp
    } else {
        geometry::scale(perp, -1.0)
    })
}

/// Distance between the bounds measured across the page at mid height.
pub fn bound_distance(left: &Line2, right: &Line2) -> f32 {
    geometry::distance(left.point_at(0.5), right.point_at(0.5))
}

#[derive(Clone, Debug, Default)]
pub struct TextLineTracer {
    options: TracerOptions,
}

impl TextLineTracer {
    pub fn new(options: TracerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TracerOptions {
        &self.options
    }

    /// Trace candidate curves over `gray` (intensities in `[0, 1]`, dark ink)
    /// between `left` and `right`. `thick_mask` restricts the region-graph
    /// tracer. Returned curves run left to right and passed the length and
    /// bounds filters; the result is empty when fewer than two survive.
    pub fn trace(
        &self,
        gray: &ImageF32,
        thick_mask: &BinaryImage,
        left: &Line2,
        right: &Line2,
    ) -> Vec<Polyline> {
        let opts = &self.options;
        let mut curves = match opts.strategy {
            TraceStrategy::GradientPath => trace_gradient_paths(gray, left, right, opts),
            TraceStrategy::RegionGraph => trace_region_graph(gray, thick_mask, left, right, opts),
            TraceStrategy::Both => {
                let mut all = trace_gradient_paths(gray, left, right, opts);
                all.extend(trace_region_graph(gray, thick_mask, left, right, opts));
                all
            }
        };
        let traced = curves.len();

        for curve in &mut curves {
            geometry::orient_left_to_right(curve);
        }
        let across = down_direction(left, right)
            .and_then(|down| across_direction(left, right, down))
            .unwrap_or([1.0, 0.0]);
        filter_short(
            &mut curves,
            across,
            opts.min_span_fraction * bound_distance(left, right),
        );
        filter_out_of_bounds(&mut curves, left, right, opts.bounds_margin_px);

        debug!(
            "TextLineTracer::trace strategy={:?} traced={} kept={}",
            opts.strategy,
            traced,
            curves.len()
        );
        if curves.len() < 2 {
            curves.clear();
        }
        curves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_direction_averages_slanted_bounds() {
        let left = Line2::new([10.0, 0.0], [0.0, 100.0]);
        let right = Line2::new([100.0, 100.0], [90.0, 0.0]);
        let down = down_direction(&left, &right).unwrap();
        assert!(down[0].abs() < 1e-5);
        assert!((down[1] - 1.0).abs() < 1e-5);
        let across = across_direction(&left, &right, down).unwrap();
        assert!((across[0] - 1.0).abs() < 1e-5);
        assert!(across_direction(&left, &left, down).is_none());
    }
}
