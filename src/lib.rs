#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod geometry;
pub mod image;
pub mod status;

// “Expert” modules – the individual stages, public for tools and tests.
pub mod angle;
pub mod bounds;
pub mod edges;
pub mod filters;
pub mod grid;
pub mod priority_queue;
pub mod rast;
pub mod snake;
pub mod tracer;

// --- High-level re-exports -------------------------------------------------

// Main entry points: detector, its parameters and the model sink.
pub use crate::detector::{DewarpDetector, DewarpParams, DistortionCurves, DistortionModelSink};

// Outcome of a run.
pub use crate::diagnostics::{DetectionReport, NotFoundReason};
pub use crate::error::Cancelled;

// Stage entry points usable on their own.
pub use crate::bounds::detect_vert_content_bounds;
pub use crate::snake::SnakeRefiner;
pub use crate::tracer::TextLineTracer;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use page_dewarp::prelude::*;
///
/// # fn main() -> Result<(), Cancelled> {
/// let (w, h) = (1240usize, 1754usize);
/// let gray = vec![255u8; w * h];
/// let img = ImageU8 { w, h, stride: w, data: &gray };
///
/// let detector = DewarpDetector::new(DewarpParams::default());
/// let mut model = DistortionCurves::new();
/// let report = detector.process(
///     &img,
///     Dpi::new(150.0, 150.0),
///     ContentRect::full(w, h),
///     &NeverCancelled,
///     &mut model,
/// )?;
/// println!("found={} curves={}", report.found, model.curves.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::geometry::{ContentRect, Dpi, Line2, Polyline};
    pub use crate::image::ImageU8;
    pub use crate::status::{CancelFlag, NeverCancelled, TaskStatus};
    pub use crate::{
        Cancelled, DetectionReport, DewarpDetector, DewarpParams, DistortionCurves,
        DistortionModelSink,
    };
}
