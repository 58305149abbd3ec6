//! Knobs for the text-line / edge tracer and its candidate filters.
//!
//! Pixel quantities refer to the working resolution the detector traces at.
use serde::{Deserialize, Serialize};

/// Which tracer produces the candidate curves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStrategy {
    /// Shortest paths over the directional derivative field. Finds the
    /// strongest horizontal edges (top/bottom of the text block).
    GradientPath,
    /// Region growing inside the thick mask and a walk over the region
    /// adjacency graph. Finds interior text lines.
    #[default]
    RegionGraph,
    /// Union of both tracers.
    Both,
}

/// How the curvature-consistency filter interprets significant turns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurvatureRule {
    /// Reject curves that turn significantly in both directions (zig-zags).
    #[default]
    SignFlip,
    /// Reject curves with any significant clockwise turn, regardless of
    /// counter-clockwise ones.
    Literal,
}

/// Configuration for [`super::TextLineTracer`].
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TracerOptions {
    pub strategy: TraceStrategy,
    /// Horizontal Gaussian sigma applied before tracing.
    pub blur_h_sigma: f32,
    /// Vertical Gaussian sigma applied before tracing.
    pub blur_v_sigma: f32,
    /// Upper bound on curves reported by the gradient-path tracer.
    pub max_paths: usize,
    /// Minimum distance between two path endpoints on the second bound.
    pub min_endpoint_separation_px: f32,
    /// Maximum distance between consecutive nodes of an output polyline.
    pub max_node_spacing_px: f32,
    /// Extra cost per unit of `1 - cos` between an edge and the left→right
    /// direction in the region-graph search.
    pub slope_weight: f32,
    /// Curves spanning less than this fraction of the bound-to-bound distance
    /// are discarded.
    pub min_span_fraction: f32,
    /// Slack when testing whether an endpoint lies between the bounds.
    pub bounds_margin_px: f32,
    /// Turns larger than this count as significant for the curvature filter.
    pub curvature_turn_deg: f32,
    pub curvature_rule: CurvatureRule,
}

impl Default for TracerOptions {
    fn default() -> Self {
        Self {
            strategy: TraceStrategy::default(),
            blur_h_sigma: 6.0,
            blur_v_sigma: 1.5,
            max_paths: 12,
            min_endpoint_separation_px: 12.0,
            max_node_spacing_px: 20.0,
            slope_weight: 2.0,
            min_span_fraction: 0.3,
            bounds_margin_px: 5.0,
            curvature_turn_deg: 30.0,
            curvature_rule: CurvatureRule::default(),
        }
    }
}
