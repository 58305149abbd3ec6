use serde::Deserialize;

/// Weights of the snake energy terms.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EnergyWeights {
    /// Weight of the derivative sampled at the upper rib end.
    pub top: f32,
    /// Weight of the derivative sampled at the lower rib end.
    pub bottom: f32,
    /// Weight of the relative deviation from the average segment length.
    pub elasticity: f32,
    /// Weight of the squared difference of consecutive unit segments.
    pub bending: f32,
    /// Cost of any segment shorter than one pixel.
    pub degenerate_penalty: f32,
}

impl Default for EnergyWeights {
    fn default() -> Self {
        Self {
            top: 1.0,
            bottom: 1.0,
            elasticity: 0.2,
            bending: 1.8,
            degenerate_penalty: 1000.0,
        }
    }
}

/// Configuration for [`super::SnakeRefiner`].
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SnakeOptions {
    /// Target distance between snake nodes.
    pub node_spacing_px: f32,
    /// Initial rib half-length of every node.
    pub rib_half_length_px: f32,
    /// First-pass blur sigma per DPI (`sigma = sigma_per_dpi * dpi`); the
    /// second pass uses half of it.
    pub sigma_per_dpi: f32,
    /// Displacement step of the first iteration, pixels.
    pub initial_step_factor: f32,
    /// A converged fine pass stops once halving drops the step below this.
    pub min_step_factor: f32,
    pub weights: EnergyWeights,
}

impl Default for SnakeOptions {
    fn default() -> Self {
        Self {
            node_spacing_px: 20.0,
            rib_half_length_px: 4.0,
            sigma_per_dpi: 4.0 / 200.0,
            initial_step_factor: 1.0,
            min_step_factor: 1.0 / 16.0,
            weights: EnergyWeights::default(),
        }
    }
}
