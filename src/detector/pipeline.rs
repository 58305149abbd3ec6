//! Detector pipeline turning a page image into a distortion model.
//!
//! Typical usage:
//! ```no_run
//! use page_dewarp::detector::{DewarpDetector, DewarpParams, DistortionCurves};
//! use page_dewarp::geometry::{ContentRect, Dpi};
//! use page_dewarp::image::ImageU8;
//! use page_dewarp::status::NeverCancelled;
//!
//! # fn example(gray: ImageU8) -> Result<(), page_dewarp::Cancelled> {
//! let detector = DewarpDetector::new(DewarpParams::default());
//! let mut model = DistortionCurves::new();
//! let rect = ContentRect::full(gray.w, gray.h);
//! let report = detector.process(&gray, Dpi::new(300.0, 300.0), rect, &NeverCancelled, &mut model)?;
//! if report.found {
//!     println!("{} curves", model.curves.len());
//! }
//! # Ok(())
//! # }
//! ```

// Stages
// - Downscale: resample the input to the working DPI.
// - Binarize: blur, Otsu level, drop specks, erase outside the content rect.
// - Bounds: left/right content bounds from the column envelopes.
// - Trace: candidate curves between the bounds, length/bounds filtered.
// - Refine: snake refinement followed by the curvature filter.
// - Emit: map back to input coordinates, order, hand over to the sink.

use std::time::Instant;

use log::debug;

use super::params::DewarpParams;
use super::scaling::WorkingScale;
use super::sink::DistortionModelSink;
use crate::bounds::detect_vert_content_bounds;
use crate::diagnostics::{DetectionReport, NotFoundReason, TimingBreakdown, WorkingImage};
use crate::error::Cancelled;
use crate::filters::gaussian_blur;
use crate::geometry::{self, ContentRect, Dpi, Line2, Polyline};
use crate::image::{BinaryImage, ImageF32, ImageU8};
use crate::snake::SnakeRefiner;
use crate::status::TaskStatus;
use crate::tracer::{down_direction, filter_curvature, TextLineTracer};

/// Bounds closer than this at both ends count as coincident.
const COINCIDENT_BOUNDS_PX: f32 = 1e-3;

/// Where the ink mask comes from.
#[derive(Clone, Copy)]
enum MaskSource<'m> {
    /// Built-in binarization restricted to a content rectangle.
    Binarize(ContentRect),
    /// Caller-supplied mask at input resolution.
    External(&'m BinaryImage),
}

pub struct DewarpDetector {
    params: DewarpParams,
}

impl DewarpDetector {
    pub fn new(params: DewarpParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DewarpParams {
        &self.params
    }

    /// Detect the vertical bounds and horizontal curves of `image`.
    ///
    /// On success the bounds and at least two curves are emitted into `sink`
    /// in input coordinates and the report has `found = true`. Degenerate
    /// input or insufficient evidence yields `found = false` with nothing
    /// emitted. `status` is polled between stages.
    pub fn process(
        &self,
        image: &ImageU8<'_>,
        dpi: Dpi,
        content_rect: ContentRect,
        status: &dyn TaskStatus,
        sink: &mut dyn DistortionModelSink,
    ) -> Result<DetectionReport, Cancelled> {
        self.run(image, dpi, MaskSource::Binarize(content_rect), status, sink)
    }

    /// Like [`DewarpDetector::process`] but with a caller-supplied ink mask
    /// (`true` = ink) at the resolution of `image`, replacing the built-in
    /// binarization.
    pub fn process_with_mask(
        &self,
        image: &ImageU8<'_>,
        dpi: Dpi,
        mask: &BinaryImage,
        status: &dyn TaskStatus,
        sink: &mut dyn DistortionModelSink,
    ) -> Result<DetectionReport, Cancelled> {
        self.run(image, dpi, MaskSource::External(mask), status, sink)
    }

    fn run(
        &self,
        image: &ImageU8<'_>,
        dpi: Dpi,
        source: MaskSource<'_>,
        status: &dyn TaskStatus,
        sink: &mut dyn DistortionModelSink,
    ) -> Result<DetectionReport, Cancelled> {
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();

        if is_degenerate(image, dpi, &source) {
            debug!(
                "DewarpDetector::process degenerate input {}x{} dpi={:?}",
                image.w, image.h, dpi
            );
            let mut report = DetectionReport::not_found(NotFoundReason::DegenerateInput);
            report.timings = finish(timings, total_start);
            return Ok(report);
        }

        let scale = WorkingScale::new(image.w, image.h, dpi, self.params.working_dpi);
        let mut report = DetectionReport {
            working: Some(WorkingImage {
                width: scale.width,
                height: scale.height,
                dpi: scale.dpi,
                scale_x: scale.scale_x(),
                scale_y: scale.scale_y(),
            }),
            ..DetectionReport::default()
        };

        let gray = timings.measure("downscale", || {
            ImageF32::from_gray_image(&scale.downscale(image))
        });

        let mask = timings.measure("binarize", || match source {
            MaskSource::Binarize(rect) => self.binarize(&gray, &rect.mapped(&scale.to_working)),
            MaskSource::External(mask) => scale.downscale_mask(mask),
        });
        report.counts.ink_pixels = mask.count_ink();
        status.throw_if_cancelled()?;

        let (left, right) = timings.measure("bounds", || detect_vert_content_bounds(&mask));
        let orig_h = image.h as f32;
        report.bounds = Some([
            left.mapped(&scale.to_original).spanning_height(orig_h),
            right.mapped(&scale.to_original).spanning_height(orig_h),
        ]);
        if bounds_coincide(&left, &right) {
            debug!("DewarpDetector::process coincident bounds");
            report.mark_not_found(NotFoundReason::CoincidentBounds);
            report.timings = finish(timings, total_start);
            return Ok(report);
        }
        status.throw_if_cancelled()?;

        let tracer = TextLineTracer::new(self.params.tracer.clone());
        let mut curves = timings.measure("trace", || {
            let thick = mask.dilated(self.params.thick_mask_radius);
            tracer.trace(&gray, &thick, &left, &right)
        });
        report.counts.traced_curves = curves.len();
        status.throw_if_cancelled()?;

        timings.measure("refine", || {
            let down = down_direction(&left, &right).unwrap_or([0.0, 1.0]);
            let refiner = SnakeRefiner::new(&gray, scale.dpi, down, self.params.snake.clone());
            refiner.refine(&mut curves, self.params.snake_iterations);
            let opts = tracer.options();
            filter_curvature(&mut curves, opts.curvature_turn_deg, opts.curvature_rule);
        });
        report.counts.refined_curves = curves.len();
        status.throw_if_cancelled()?;

        if curves.len() < 2 {
            debug!(
                "DewarpDetector::process insufficient curves traced={} refined={}",
                report.counts.traced_curves,
                curves.len()
            );
            report.mark_not_found(NotFoundReason::InsufficientCurves);
            report.timings = finish(timings, total_start);
            return Ok(report);
        }

        let emit_start = Instant::now();
        let curves = to_original_order(&curves, &scale);
        if let Some([left, right]) = report.bounds {
            sink.set_vertical_bounds(left, right);
        }
        report.curve_count = curves.len();
        for curve in curves {
            sink.add_horizontal_curve(curve);
        }
        timings.push("emit", emit_start.elapsed().as_secs_f64() * 1000.0);

        report.found = true;
        report.timings = finish(timings, total_start);
        debug!(
            "DewarpDetector::process found curves={} total_ms={:.2}",
            report.curve_count, report.timings.total_ms
        );
        Ok(report)
    }

    fn binarize(&self, gray: &ImageF32, working_rect: &ContentRect) -> BinaryImage {
        let sigma = self.params.binarize_blur_sigma;
        let blurred = gaussian_blur(gray, sigma, sigma);
        let mut mask = BinaryImage::otsu(&blurred.to_gray_image());
        mask.remove_small_components(self.params.min_component_area);
        mask.erase_outside(working_rect);
        mask
    }
}

fn is_degenerate(image: &ImageU8<'_>, dpi: Dpi, source: &MaskSource<'_>) -> bool {
    if image.w == 0 || image.h == 0 || image.stride < image.w {
        return true;
    }
    let needed = (image.h - 1) * image.stride + image.w;
    if image.data.len() < needed || !dpi.is_valid() {
        return true;
    }
    match source {
        MaskSource::Binarize(rect) => rect.is_empty(),
        MaskSource::External(mask) => mask.width() != image.w || mask.height() != image.h,
    }
}

fn bounds_coincide(left: &Line2, right: &Line2) -> bool {
    geometry::distance(left.p1, right.p1) <= COINCIDENT_BOUNDS_PX
        && geometry::distance(left.p2, right.p2) <= COINCIDENT_BOUNDS_PX
}

/// Map curves back to input coordinates, each running left to right, sorted
/// top to bottom by mean y.
fn to_original_order(curves: &[Polyline], scale: &WorkingScale) -> Vec<Polyline> {
    let mut out: Vec<Polyline> = curves
        .iter()
        .map(|c| {
            let mut mapped = scale.to_original.apply_polyline(c);
            geometry::orient_left_to_right(&mut mapped);
            mapped
        })
        .collect();
    out.sort_by(|a, b| mean_y(a).total_cmp(&mean_y(b)));
    out
}

fn mean_y(curve: &[[f32; 2]]) -> f32 {
    if curve.is_empty() {
        return 0.0;
    }
    curve.iter().map(|p| p[1]).sum::<f32>() / curve.len() as f32
}

fn finish(mut timings: TimingBreakdown, start: Instant) -> TimingBreakdown {
    timings.total_ms = start.elapsed().as_secs_f64() * 1000.0;
    timings
}
