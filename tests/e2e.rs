mod common;

use std::cell::Cell;

use common::init_logger;
use common::synthetic_image::{page_with_bars, page_with_stroke, page_with_words, PageLayout};
use page_dewarp::detector::{DewarpDetector, DewarpParams, DistortionCurves};
use page_dewarp::diagnostics::NotFoundReason;
use page_dewarp::geometry::{ContentRect, Dpi, Line2, Polyline};
use page_dewarp::image::{BinaryImage, ImageU8};
use page_dewarp::status::{CancelFlag, NeverCancelled, TaskStatus};
use page_dewarp::tracer::{is_inside_bounds, TraceStrategy};
use page_dewarp::Cancelled;

fn bars_layout() -> PageLayout {
    PageLayout {
        width: 320,
        height: 240,
        x0: 40,
        x1: 280,
        line_tops: vec![60, 110, 160],
        line_height: 12,
        sag: 0.0,
    }
}

fn params(strategy: TraceStrategy) -> DewarpParams {
    let mut params = DewarpParams::default();
    params.tracer.strategy = strategy;
    params
}

fn mean_y(curve: &Polyline) -> f32 {
    curve.iter().map(|p| p[1]).sum::<f32>() / curve.len() as f32
}

fn point_nearest_x(curve: &Polyline, x: f32) -> [f32; 2] {
    *curve
        .iter()
        .min_by(|a, b| (a[0] - x).abs().total_cmp(&(b[0] - x).abs()))
        .expect("curve has points")
}

/// Properties every emitted model must have.
fn assert_model_shape(model: &DistortionCurves, margin: f32) -> (Line2, Line2) {
    let [left, right] = model.bounds.expect("bounds emitted");
    assert!(model.curves.len() >= 2, "expected at least two curves");
    for curve in &model.curves {
        assert!(curve.len() >= 2);
        let (first, last) = (curve[0], curve[curve.len() - 1]);
        assert!(first[0] < last[0], "curve must run left to right: {curve:?}");
        assert!(
            is_inside_bounds(first, &left, &right, margin)
                && is_inside_bounds(last, &left, &right, margin),
            "endpoints outside bounds: {first:?} {last:?}"
        );
    }
    for pair in model.curves.windows(2) {
        assert!(mean_y(&pair[0]) <= mean_y(&pair[1]), "curves must be sorted top to bottom");
    }
    (left, right)
}

#[test]
fn straight_bars_give_bounds_and_curves() {
    init_logger();
    let layout = bars_layout();
    let buffer = page_with_bars(&layout);
    let image = ImageU8::packed(layout.width, layout.height, &buffer);

    let detector = DewarpDetector::new(params(TraceStrategy::GradientPath));
    let mut model = DistortionCurves::new();
    let report = detector
        .process(
            &image,
            Dpi::new(200.0, 200.0),
            ContentRect::full(layout.width, layout.height),
            &NeverCancelled,
            &mut model,
        )
        .expect("not cancelled");

    assert!(report.found, "report: {report:?}");
    assert!(report.not_found_reason.is_none());
    assert_eq!(report.curve_count, model.curves.len());
    assert!(report.counts.ink_pixels > 0);
    for stage in ["downscale", "binarize", "bounds", "trace", "refine", "emit"] {
        assert!(report.timings.stage_ms(stage).is_some(), "missing stage {stage}");
    }

    let (left, right) = assert_model_shape(&model, 6.0);
    for line in [&left, &right] {
        assert_eq!(line.p1[1], 0.0);
        assert_eq!(line.p2[1], layout.height as f32);
    }
    assert!((left.p1[0] - 40.0).abs() < 2.0 && (left.p2[0] - 40.0).abs() < 2.0);
    assert!((right.p1[0] - 279.0).abs() < 2.0 && (right.p2[0] - 279.0).abs() < 2.0);

    let centers: Vec<f32> = layout
        .line_tops
        .iter()
        .map(|&top| layout.line_center_at(top, layout.x0))
        .collect();
    for curve in &model.curves {
        let (first, last) = (curve[0], curve[curve.len() - 1]);
        assert!((first[1] - last[1]).abs() < 4.0, "curve should stay level: {curve:?}");
        let y = mean_y(curve);
        let nearest = centers
            .iter()
            .map(|c| (c - y).abs())
            .fold(f32::INFINITY, f32::min);
        assert!(nearest < 9.0, "curve at y={y} is not on a text line");
    }
}

#[test]
fn curved_lines_keep_their_sag() {
    init_logger();
    let layout = PageLayout {
        line_tops: vec![50, 110, 170],
        sag: 12.0,
        ..bars_layout()
    };
    let buffer = page_with_bars(&layout);
    let image = ImageU8::packed(layout.width, layout.height, &buffer);

    let detector = DewarpDetector::new(params(TraceStrategy::GradientPath));
    let mut model = DistortionCurves::new();
    let report = detector
        .process(
            &image,
            Dpi::new(200.0, 200.0),
            ContentRect::full(layout.width, layout.height),
            &NeverCancelled,
            &mut model,
        )
        .expect("not cancelled");
    assert!(report.found, "report: {report:?}");
    assert_model_shape(&model, 6.0);

    let top = &model.curves[0];
    let (first, last) = (top[0], top[top.len() - 1]);
    let mid = point_nearest_x(top, 160.0);
    assert!(
        mid[1] > 0.5 * (first[1] + last[1]) + 5.0,
        "expected a downward bulge, got {top:?}"
    );
}

#[test]
fn worded_lines_are_linked_by_region_graph() {
    init_logger();
    let layout = bars_layout();
    let buffer = page_with_words(&layout, 28, 5);
    let image = ImageU8::packed(layout.width, layout.height, &buffer);

    let detector = DewarpDetector::new(params(TraceStrategy::RegionGraph));
    let mut model = DistortionCurves::new();
    let report = detector
        .process(
            &image,
            Dpi::new(200.0, 200.0),
            ContentRect::full(layout.width, layout.height),
            &NeverCancelled,
            &mut model,
        )
        .expect("not cancelled");
    assert!(report.found, "report: {report:?}");
    assert_model_shape(&model, 6.0);
}

#[test]
fn high_dpi_input_is_reported_in_input_coordinates() {
    init_logger();
    let layout = PageLayout {
        width: 640,
        height: 480,
        x0: 80,
        x1: 560,
        line_tops: vec![120, 220, 320],
        line_height: 24,
        sag: 0.0,
    };
    let buffer = page_with_bars(&layout);
    let image = ImageU8::packed(layout.width, layout.height, &buffer);

    let detector = DewarpDetector::new(params(TraceStrategy::GradientPath));
    let mut model = DistortionCurves::new();
    let report = detector
        .process(
            &image,
            Dpi::new(400.0, 400.0),
            ContentRect::full(layout.width, layout.height),
            &NeverCancelled,
            &mut model,
        )
        .expect("not cancelled");
    assert!(report.found, "report: {report:?}");
    let working = report.working.expect("working image reported");
    assert_eq!((working.width, working.height), (320, 240));

    let (left, right) = assert_model_shape(&model, 12.0);
    assert_eq!(left.p2[1], 480.0);
    assert!((left.p1[0] - 80.0).abs() < 4.0);
    assert!((right.p1[0] - 559.0).abs() < 4.0);
    for curve in &model.curves {
        let y = mean_y(curve);
        assert!((100.0..360.0).contains(&y), "curve at y={y} outside the text block");
    }
}

#[test]
fn blank_page_is_not_found() {
    init_logger();
    let buffer = vec![255u8; 200 * 150];
    let image = ImageU8::packed(200, 150, &buffer);
    let detector = DewarpDetector::new(DewarpParams::default());
    let mut model = DistortionCurves::new();
    let report = detector
        .process(
            &image,
            Dpi::new(200.0, 200.0),
            ContentRect::full(200, 150),
            &NeverCancelled,
            &mut model,
        )
        .expect("not cancelled");
    assert!(!report.found);
    assert_eq!(report.not_found_reason, Some(NotFoundReason::InsufficientCurves));
    assert_eq!(report.counts.ink_pixels, 0);
    assert!(model.bounds.is_none() && model.curves.is_empty());
}

#[test]
fn single_stroke_gives_coincident_bounds() {
    init_logger();
    let buffer = page_with_stroke(60, 60, 20, 10, 50);
    let image = ImageU8::packed(60, 60, &buffer);
    let mut params = DewarpParams::default();
    params.binarize_blur_sigma = 0.0;
    params.min_component_area = 1;
    let detector = DewarpDetector::new(params);
    let mut model = DistortionCurves::new();
    let report = detector
        .process(
            &image,
            Dpi::new(200.0, 200.0),
            ContentRect::full(60, 60),
            &NeverCancelled,
            &mut model,
        )
        .expect("not cancelled");
    assert!(!report.found);
    assert_eq!(report.not_found_reason, Some(NotFoundReason::CoincidentBounds));
    assert!(model.bounds.is_none());
}

#[test]
fn content_rect_outside_ink_finds_nothing() {
    init_logger();
    let layout = bars_layout();
    let buffer = page_with_bars(&layout);
    let image = ImageU8::packed(layout.width, layout.height, &buffer);
    let detector = DewarpDetector::new(params(TraceStrategy::GradientPath));
    let mut model = DistortionCurves::new();
    let report = detector
        .process(
            &image,
            Dpi::new(200.0, 200.0),
            ContentRect::new(0.0, 0.0, 320.0, 40.0),
            &NeverCancelled,
            &mut model,
        )
        .expect("not cancelled");
    assert!(!report.found);
    assert_eq!(report.counts.ink_pixels, 0);
    assert!(model.curves.is_empty());
}

/// Reports cancellation from the `cancel_on`-th poll onwards.
struct CancelAfter {
    polls: Cell<usize>,
    cancel_on: usize,
}

impl TaskStatus for CancelAfter {
    fn is_cancelled(&self) -> bool {
        let n = self.polls.get() + 1;
        self.polls.set(n);
        n >= self.cancel_on
    }
}

#[test]
fn cancellation_is_honoured_between_stages() {
    init_logger();
    let layout = bars_layout();
    let buffer = page_with_bars(&layout);
    let image = ImageU8::packed(layout.width, layout.height, &buffer);
    let detector = DewarpDetector::new(params(TraceStrategy::GradientPath));
    let rect = ContentRect::full(layout.width, layout.height);
    let dpi = Dpi::new(200.0, 200.0);

    let counting = CancelAfter {
        polls: Cell::new(0),
        cancel_on: usize::MAX,
    };
    let mut model = DistortionCurves::new();
    let report = detector
        .process(&image, dpi, rect, &counting, &mut model)
        .expect("never cancelled");
    assert!(report.found);
    let polls = counting.polls.get();
    assert_eq!(polls, 4);

    for cancel_on in 1..=polls {
        let status = CancelAfter {
            polls: Cell::new(0),
            cancel_on,
        };
        let mut model = DistortionCurves::new();
        let res = detector.process(&image, dpi, rect, &status, &mut model);
        assert_eq!(res.unwrap_err(), Cancelled);
        assert!(model.bounds.is_none() && model.curves.is_empty());
    }

    let flag = CancelFlag::new();
    flag.cancel();
    let mut model = DistortionCurves::new();
    assert!(detector.process(&image, dpi, rect, &flag, &mut model).is_err());
}

#[test]
fn external_mask_replaces_binarization() {
    init_logger();
    let layout = bars_layout();
    let buffer = page_with_bars(&layout);
    let image = ImageU8::packed(layout.width, layout.height, &buffer);
    let mut mask = BinaryImage::new(layout.width, layout.height);
    for &top in &layout.line_tops {
        mask.fill_rect(layout.x0, top, layout.x1, top + layout.line_height, true);
    }

    let detector = DewarpDetector::new(params(TraceStrategy::GradientPath));
    let mut model = DistortionCurves::new();
    let report = detector
        .process_with_mask(&image, Dpi::new(200.0, 200.0), &mask, &NeverCancelled, &mut model)
        .expect("not cancelled");
    assert!(report.found, "report: {report:?}");
    assert_eq!(report.counts.ink_pixels, mask.count_ink());
    let (left, right) = assert_model_shape(&model, 6.0);
    assert!((left.p1[0] - 40.0).abs() < 1.0);
    assert!((right.p1[0] - 279.0).abs() < 1.0);
}
