//! Energy terms minimised by the snake moves.
use super::EnergyWeights;
use crate::edges::directional_derivative;
use crate::filters::gaussian_blur;
use crate::geometry::{self, EPS};
use crate::image::ImageF32;

/// Blurred derivative of the intensity along the page's down direction.
///
/// Dark text on a bright page gives negative values along the upper edge of
/// a text line and positive values along the lower edge.
#[derive(Clone, Debug)]
pub struct GradientField {
    field: ImageF32,
}

impl GradientField {
    pub fn new(gray: &ImageF32, h_sigma: f32, v_sigma: f32, unit_down: [f32; 2]) -> Self {
        let blurred = gaussian_blur(gray, h_sigma, v_sigma);
        Self {
            field: directional_derivative(&blurred, unit_down),
        }
    }

    /// Field value at `p`, 0 outside the image.
    #[inline]
    pub fn sample(&self, p: [f32; 2]) -> f32 {
        self.field.sample_bilinear(p[0], p[1]).unwrap_or(0.0)
    }

    pub fn image(&self) -> &ImageF32 {
        &self.field
    }
}

pub struct SnakeEnergy<'a> {
    field: &'a GradientField,
    weights: &'a EnergyWeights,
}

impl<'a> SnakeEnergy<'a> {
    pub fn new(field: &'a GradientField, weights: &'a EnergyWeights) -> Self {
        Self { field, weights }
    }

    /// Attraction of the rib ends: the upper end wants a bright-to-dark
    /// transition, the lower one a dark-to-bright transition.
    #[inline]
    pub fn external(&self, center: [f32; 2], down_normal: [f32; 2], rib_half_length: f32) -> f32 {
        let offset = geometry::scale(down_normal, rib_half_length);
        let top = geometry::sub(center, offset);
        let bottom = geometry::add(center, offset);
        self.weights.top * self.field.sample(top) - self.weights.bottom * self.field.sample(bottom)
    }

    /// Relative deviation of segment `a → b` from `avg_len`.
    #[inline]
    pub fn elasticity(&self, a: [f32; 2], b: [f32; 2], avg_len: f32) -> f32 {
        let len = geometry::distance(a, b);
        if len < 1.0 || avg_len <= EPS {
            return self.weights.degenerate_penalty;
        }
        self.weights.elasticity * (avg_len - len).abs() / avg_len
    }

    /// Change of direction at `b` between segments `a → b` and `b → c`.
    #[inline]
    pub fn bending(&self, a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> f32 {
        let prev = geometry::sub(b, a);
        let next = geometry::sub(c, b);
        let prev_len = geometry::norm(prev);
        let next_len = geometry::norm(next);
        if prev_len < 1.0 || next_len < 1.0 {
            return self.weights.degenerate_penalty;
        }
        let diff = geometry::sub(
            geometry::scale(next, 1.0 / next_len),
            geometry::scale(prev, 1.0 / prev_len),
        );
        self.weights.bending * geometry::dot(diff, diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_field() -> GradientField {
        let mut img = ImageF32::new(10, 10);
        img.data.fill(0.5);
        GradientField::new(&img, 1.0, 1.0, [0.0, 1.0])
    }

    #[test]
    fn internal_terms() {
        let field = flat_field();
        let weights = EnergyWeights::default();
        let energy = SnakeEnergy::new(&field, &weights);
        assert_eq!(energy.elasticity([0.0, 0.0], [20.0, 0.0], 20.0), 0.0);
        assert!((energy.elasticity([0.0, 0.0], [10.0, 0.0], 20.0) - 0.1).abs() < 1e-6);
        assert_eq!(energy.elasticity([0.0, 0.0], [0.5, 0.0], 20.0), 1000.0);
        assert_eq!(energy.bending([0.0, 0.0], [10.0, 0.0], [20.0, 0.0]), 0.0);
        assert!((energy.bending([0.0, 0.0], [10.0, 0.0], [10.0, 10.0]) - 3.6).abs() < 1e-5);
        assert_eq!(energy.bending([0.0, 0.0], [0.0, 0.0], [10.0, 0.0]), 1000.0);
    }

    #[test]
    fn external_prefers_ribs_on_line_edges() {
        // Dark band on rows 10..16 of a bright page.
        let mut img = ImageF32::new(40, 30);
        for y in 0..30 {
            for x in 0..40 {
                img.set(x, y, if (10..16).contains(&y) { 0.0 } else { 1.0 });
            }
        }
        let field = GradientField::new(&img, 0.0, 0.0, [0.0, 1.0]);
        let weights = EnergyWeights::default();
        let energy = SnakeEnergy::new(&field, &weights);
        let on_edges = energy.external([20.0, 12.5], [0.0, 1.0], 3.0);
        let off_edges = energy.external([20.0, 22.5], [0.0, 1.0], 3.0);
        assert!(on_edges < -0.5, "{on_edges}");
        assert_eq!(off_edges, 0.0);
    }
}
