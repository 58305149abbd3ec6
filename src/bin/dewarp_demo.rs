use page_dewarp::config::dewarp_demo::{self, DewarpDemoConfig, PageConfig};
use page_dewarp::detector::{DewarpDetector, DistortionCurves};
use page_dewarp::diagnostics::DetectionReport;
use page_dewarp::geometry::ContentRect;
use page_dewarp::image::io::{load_grayscale_image, save_overlay, write_json_file};
use page_dewarp::status::NeverCancelled;
use serde::Serialize;
use std::env;
use std::path::Path;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = dewarp_demo::load_config(Path::new(&config_path))?;
    let detector = DewarpDetector::new(config.params.clone());

    let results = process_pages(&config, &detector);

    let mut failures = 0usize;
    for (page, result) in config.pages.iter().zip(results) {
        match result {
            Ok(summary) => println!(
                "{}: found={} curves={} total_ms={:.1}",
                page.input.display(),
                summary.report.found,
                summary.model.curves.len(),
                summary.report.timings.total_ms
            ),
            Err(err) => {
                failures += 1;
                eprintln!("{}: {err}", page.input.display());
            }
        }
    }
    if failures > 0 {
        return Err(format!("{failures} of {} pages failed", config.pages.len()));
    }
    Ok(())
}

#[cfg(feature = "parallel")]
fn process_pages(
    config: &DewarpDemoConfig,
    detector: &DewarpDetector,
) -> Vec<Result<PageSummary, String>> {
    use rayon::prelude::*;
    config
        .pages
        .par_iter()
        .map(|page| process_page(config, detector, page))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn process_pages(
    config: &DewarpDemoConfig,
    detector: &DewarpDetector,
) -> Vec<Result<PageSummary, String>> {
    config
        .pages
        .iter()
        .map(|page| process_page(config, detector, page))
        .collect()
}

fn process_page(
    config: &DewarpDemoConfig,
    detector: &DewarpDetector,
    page: &PageConfig,
) -> Result<PageSummary, String> {
    let gray = load_grayscale_image(&page.input)?;
    let view = gray.as_view();
    let rect = page
        .content_rect
        .unwrap_or_else(|| ContentRect::full(gray.width(), gray.height()));

    let mut model = DistortionCurves::new();
    let report = detector
        .process(&view, page.dpi, rect, &NeverCancelled, &mut model)
        .map_err(|e| e.to_string())?;

    let stem = page.output_stem();
    let summary = PageSummary {
        input: page.input.display().to_string(),
        report,
        model,
    };
    write_json_file(&config.output.json_path(&stem), &summary)?;
    if config.output.overlay {
        let bounds = summary
            .model
            .bounds
            .as_ref()
            .or(summary.report.bounds.as_ref())
            .map(|[l, r]| (l, r));
        save_overlay(
            &view,
            bounds,
            &summary.model.curves,
            &config.output.overlay_path(&stem),
        )?;
    }
    Ok(summary)
}

fn usage() -> String {
    "Usage: dewarp_demo <config.json>".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageSummary {
    input: String,
    report: DetectionReport,
    model: DistortionCurves,
}
