//! Active-contour refinement of traced text lines.
//!
//! Each polyline becomes a [`Snake`]: nodes about `node_spacing_px` apart,
//! each carrying a rib (half-thickness) across the text line. An iteration
//! applies three moves in order, each solved by dynamic programming over a
//! small set of displacements:
//!
//! 1. thickness adjustment of the head and tail ribs,
//! 2. tangent movement of interior nodes,
//! 3. normal movement of all nodes.
//!
//! Refinement runs two passes over progressively less blurred gradients. The
//! coarse pass stops at the first iteration without movement; the fine pass
//! halves the step instead. Both passes draw from one iteration budget.
pub mod energy;
pub mod optimizer;
mod options;
pub mod types;

pub use energy::{GradientField, SnakeEnergy};
pub use optimizer::Optimizer;
pub use options::{EnergyWeights, SnakeOptions};
pub use types::{FrenetFrame, Snake, SnakeLength, SnakeNode};

use log::debug;

use crate::geometry::{Dpi, Polyline};
use crate::image::ImageF32;

/// What an iteration without movement does to the pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnConvergence {
    Stop,
    GoFiner,
}

/// Outcome of one [`SnakeRefiner::evolve`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvolveStats {
    pub iterations: usize,
    /// Iterations in which at least one move changed the snake.
    pub changed_iterations: usize,
}

pub struct SnakeRefiner<'a> {
    image: &'a ImageF32,
    dpi: Dpi,
    unit_down: [f32; 2],
    options: SnakeOptions,
}

impl<'a> SnakeRefiner<'a> {
    /// `image` holds intensities in `[0, 1]` with dark ink; `dpi` is its
    /// resolution and `unit_down` the page's downward direction.
    pub fn new(image: &'a ImageF32, dpi: Dpi, unit_down: [f32; 2], options: SnakeOptions) -> Self {
        Self {
            image,
            dpi,
            unit_down,
            options,
        }
    }

    pub fn options(&self) -> &SnakeOptions {
        &self.options
    }

    /// Gradient field for a pass; `sigma_scale` is 1 for the coarse pass and
    /// 0.5 for the fine one.
    pub fn gradient_field(&self, sigma_scale: f32) -> GradientField {
        let k = self.options.sigma_per_dpi * sigma_scale;
        GradientField::new(
            self.image,
            k * self.dpi.horizontal,
            k * self.dpi.vertical,
            self.unit_down,
        )
    }

    /// Refine every polyline in place with at most `iterations` iterations
    /// each. Polylines that do not yield at least two snake nodes are left
    /// untouched.
    pub fn refine(&self, polylines: &mut [Polyline], iterations: usize) {
        if polylines.is_empty() {
            return;
        }
        let mut snakes: Vec<Snake> = polylines
            .iter()
            .map(|pl| {
                Snake::from_polyline(
                    pl,
                    self.options.node_spacing_px,
                    self.options.rib_half_length_px,
                    iterations,
                )
            })
            .collect();

        let coarse = self.gradient_field(1.0);
        let mut stats = EvolveStats::default();
        for snake in &mut snakes {
            let s = self.evolve(snake, &coarse, OnConvergence::Stop);
            stats.iterations += s.iterations;
            stats.changed_iterations += s.changed_iterations;
        }
        let fine = self.gradient_field(0.5);
        for snake in &mut snakes {
            let s = self.evolve(snake, &fine, OnConvergence::GoFiner);
            stats.iterations += s.iterations;
            stats.changed_iterations += s.changed_iterations;
        }
        debug!(
            "SnakeRefiner::refine snakes={} iterations={} changed={}",
            snakes.len(),
            stats.iterations,
            stats.changed_iterations
        );

        for (pl, snake) in polylines.iter_mut().zip(&snakes) {
            if snake.len() >= 2 {
                *pl = snake.to_polyline();
            }
        }
    }

    /// Run iterations on `snake` until convergence or until its budget is
    /// spent.
    pub fn evolve(
        &self,
        snake: &mut Snake,
        field: &GradientField,
        on_convergence: OnConvergence,
    ) -> EvolveStats {
        let mut stats = EvolveStats::default();
        if snake.len() < 2 {
            return stats;
        }
        let energy = SnakeEnergy::new(field, &self.options.weights);
        let mut factor = self.options.initial_step_factor;
        while snake.iterations_remaining > 0 {
            snake.iterations_remaining -= 1;
            stats.iterations += 1;

            let mut changed = Optimizer::new(snake, self.unit_down, factor)
                .thickness_adjustment(snake, &energy);
            changed |= Optimizer::new(snake, self.unit_down, factor).tangent_movement(snake, &energy);
            changed |= Optimizer::new(snake, self.unit_down, factor).normal_movement(snake, &energy);

            if changed {
                stats.changed_iterations += 1;
                continue;
            }
            match on_convergence {
                OnConvergence::Stop => break,
                OnConvergence::GoFiner => {
                    factor *= 0.5;
                    if factor < self.options.min_step_factor {
                        break;
                    }
                }
            }
        }
        stats
    }
}
