//! Sobel gradients and directional derivative fields.
//!
//! - Convolves the 3×3 Sobel pair with border clamping (replicate).
//! - A directional derivative is the gradient projected onto a fixed unit
//!   vector, e.g. the average direction of the vertical content bounds or the
//!   page's "down" direction.
//!
//! Complexity: O(W·H) per pass; memory: two float buffers.
use crate::image::{ImageF32, ImageView, ImageViewMut};

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Total absolute weight of a Sobel kernel. After dividing by it, a unit step
/// in `[0, 1]` intensities yields 0.5 on each of the two rows straddling it.
pub const SOBEL_NORMALIZER: f32 = 8.0;

/// Per‑pixel gradient buffers.
#[derive(Clone, Debug)]
pub struct Grad {
    /// Horizontal derivative (convolution with kernel X)
    pub gx: ImageF32,
    /// Vertical derivative (convolution with kernel Y)
    pub gy: ImageF32,
}

impl Grad {
    /// Project the gradient onto `dir` (not required to be unit length).
    pub fn directional(&self, dir: [f32; 2]) -> ImageF32 {
        let mut out = ImageF32::new(self.gx.w, self.gx.h);
        for y in 0..out.h {
            let gx = self.gx.row(y);
            let gy = self.gy.row(y);
            for ((o, &dx), &dy) in out.row_mut(y).iter_mut().zip(gx).zip(gy) {
                *o = dx * dir[0] + dy * dir[1];
            }
        }
        out
    }
}

fn gradients_with_kernels(l: &ImageF32, kernel_x: &Kernel3, kernel_y: &Kernel3) -> Grad {
    let w = l.w;
    let h = l.h;
    let mut gx = ImageF32::new(w, h);
    let mut gy = ImageF32::new(w, h);

    if w == 0 || h == 0 {
        return Grad { gx, gy };
    }

    for y in 0..h {
        let y_idx = [y.saturating_sub(1), y, (y + 1).min(h - 1)];
        let rows = [l.row(y_idx[0]), l.row(y_idx[1]), l.row(y_idx[2])];
        let out_gx = gx.row_mut(y);
        let out_gy = gy.row_mut(y);
        for x in 0..w {
            let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];

            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            for (ky, yy_row) in rows.iter().enumerate() {
                for (kx, &xi) in x_idx.iter().enumerate() {
                    sum_x += yy_row[xi] * kernel_x[ky][kx];
                    sum_y += yy_row[xi] * kernel_y[ky][kx];
                }
            }
            out_gx[x] = sum_x;
            out_gy[x] = sum_y;
        }
    }

    Grad { gx, gy }
}

/// Compute Sobel gradients on a single‑channel float image.
pub fn sobel_gradients(l: &ImageF32) -> Grad {
    gradients_with_kernels(l, &SOBEL_KERNEL_X, &SOBEL_KERNEL_Y)
}

/// Sobel derivative along `dir`, divided by [`SOBEL_NORMALIZER`].
pub fn directional_derivative(l: &ImageF32, dir: [f32; 2]) -> ImageF32 {
    let scale = 1.0 / SOBEL_NORMALIZER;
    sobel_gradients(l).directional([dir[0] * scale, dir[1] * scale])
}

/// Rescale so the largest absolute value becomes 1. All-zero fields are left
/// untouched.
pub fn normalize_symmetric(field: &mut ImageF32) {
    let max = field.max_abs();
    if max > f32::EPSILON {
        let inv = 1.0 / max;
        for v in &mut field.data {
            *v *= inv;
        }
    }
}
