use serde::Serialize;

use crate::geometry::{Line2, Polyline};

/// Receiver of a successful detection, in input image coordinates.
///
/// The detector first reports the two vertical bounds, then every curve in
/// top-to-bottom order. Nothing is emitted when detection fails.
pub trait DistortionModelSink {
    fn set_vertical_bounds(&mut self, left: Line2, right: Line2);
    fn add_horizontal_curve(&mut self, curve: Polyline);
}

/// Sink collecting the model into plain data.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistortionCurves {
    pub bounds: Option<[Line2; 2]>,
    pub curves: Vec<Polyline>,
}

impl DistortionCurves {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.bounds.is_some() && self.curves.len() >= 2
    }
}

impl DistortionModelSink for DistortionCurves {
    fn set_vertical_bounds(&mut self, left: Line2, right: Line2) {
        self.bounds = Some([left, right]);
    }

    fn add_horizontal_curve(&mut self, curve: Polyline) {
        self.curves.push(curve);
    }
}
