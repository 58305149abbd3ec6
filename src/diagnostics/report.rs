use serde::Serialize;

use super::TimingBreakdown;
use crate::geometry::{Dpi, Line2};

/// Why a run produced no distortion model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotFoundReason {
    /// Empty image, invalid DPI or empty content rectangle.
    DegenerateInput,
    /// The two content bounds coincide.
    CoincidentBounds,
    /// Fewer than two curves survived tracing and filtering.
    InsufficientCurves,
}

/// Working-resolution geometry of the run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingImage {
    pub width: usize,
    pub height: usize,
    pub dpi: Dpi,
    pub scale_x: f32,
    pub scale_y: f32,
}

/// Per-stage counters.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCounts {
    /// Ink pixels left after binarization cleanup.
    pub ink_pixels: usize,
    /// Curves returned by the tracer (after its length and bounds filters).
    pub traced_curves: usize,
    /// Curves surviving refinement and the curvature filter.
    pub refined_curves: usize,
}

/// Outcome and diagnostics of one [`crate::detector::DewarpDetector`] run.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_found_reason: Option<NotFoundReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working: Option<WorkingImage>,
    /// Content bounds in original image coordinates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[Line2; 2]>,
    pub curve_count: usize,
    pub counts: StageCounts,
    pub timings: TimingBreakdown,
}

impl DetectionReport {
    pub fn not_found(reason: NotFoundReason) -> Self {
        Self {
            found: false,
            not_found_reason: Some(reason),
            ..Self::default()
        }
    }

    pub fn mark_not_found(&mut self, reason: NotFoundReason) {
        self.found = false;
        self.not_found_reason = Some(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case() {
        let report = DetectionReport::not_found(NotFoundReason::CoincidentBounds);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["found"], false);
        assert_eq!(json["notFoundReason"], "coincidentBounds");
        assert_eq!(json["curveCount"], 0);
        assert!(json.get("bounds").is_none());
        assert!(json["counts"].get("inkPixels").is_some());
    }
}
