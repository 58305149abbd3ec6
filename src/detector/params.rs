//! Parameters of the dewarping detector, loadable from JSON.
//!
//! Defaults target 200 DPI working images of printed pages. Pixel-valued
//! knobs of the tracer and the snake refiner refer to that working
//! resolution, not to the input image.
use serde::Deserialize;

use crate::snake::SnakeOptions;
use crate::tracer::TracerOptions;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DewarpParams {
    /// Resolution the pipeline works at. Inputs above it are downscaled,
    /// inputs below it are processed as is.
    pub working_dpi: f32,
    /// Gaussian sigma (working pixels) applied before binarization.
    pub binarize_blur_sigma: f32,
    /// Ink components with fewer pixels are dropped after binarization.
    pub min_component_area: usize,
    /// Dilation radius turning the ink mask into the thick text mask used by
    /// the region-graph tracer.
    pub thick_mask_radius: u8,
    /// Iteration budget per snake, shared by the coarse and fine passes.
    pub snake_iterations: usize,
    pub tracer: TracerOptions,
    pub snake: SnakeOptions,
}

impl Default for DewarpParams {
    fn default() -> Self {
        Self {
            working_dpi: 200.0,
            binarize_blur_sigma: 1.0,
            min_component_area: 6,
            thick_mask_radius: 3,
            snake_iterations: 60,
            tracer: TracerOptions::default(),
            snake: SnakeOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracer::TraceStrategy;

    #[test]
    fn partial_json_keeps_defaults() {
        let params: DewarpParams = serde_json::from_str(
            r#"{ "working_dpi": 150, "tracer": { "strategy": "gradient_path" } }"#,
        )
        .unwrap();
        assert_eq!(params.working_dpi, 150.0);
        assert_eq!(params.tracer.strategy, TraceStrategy::GradientPath);
        assert_eq!(params.tracer.max_paths, TracerOptions::default().max_paths);
        assert_eq!(params.snake_iterations, 60);
    }
}
