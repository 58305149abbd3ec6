//! Separable smoothing filters with independent horizontal and vertical taps.
//!
//! Text lines are elongated horizontally, so the tracers and the snake
//! refiner blur with a larger horizontal than vertical sigma. Border samples
//! clamp to the image extents (replicate).
use crate::image::{ImageF32, ImageView, ImageViewMut};

/// 1D filter applied once along rows and once along columns.
pub trait SeparableFilter {
    /// Taps in left-to-right order; the centre tap sits at `taps().len() / 2`.
    fn taps(&self) -> &[f32];
}

/// Normalised sampled Gaussian truncated at three sigma.
#[derive(Clone, Debug)]
pub struct GaussianKernel {
    taps: Vec<f32>,
}

impl GaussianKernel {
    /// Non-positive or non-finite sigma gives the identity kernel.
    pub fn new(sigma: f32) -> Self {
        if !sigma.is_finite() || sigma <= 1e-3 {
            return Self { taps: vec![1.0] };
        }
        let radius = (3.0 * sigma).ceil().max(1.0) as usize;
        let denom = 2.0 * sigma * sigma;
        let mut taps: Vec<f32> = (0..=2 * radius)
            .map(|i| {
                let d = i as f32 - radius as f32;
                (-d * d / denom).exp()
            })
            .collect();
        let sum: f32 = taps.iter().sum();
        for t in &mut taps {
            *t /= sum;
        }
        Self { taps }
    }

    pub fn radius(&self) -> usize {
        self.taps.len() / 2
    }
}

impl SeparableFilter for GaussianKernel {
    #[inline]
    fn taps(&self) -> &[f32] {
        &self.taps
    }
}

/// Apply `horizontal` along rows, then `vertical` along columns.
pub fn blur_separable(
    src: &ImageF32,
    horizontal: &dyn SeparableFilter,
    vertical: &dyn SeparableFilter,
) -> ImageF32 {
    let (w, h) = (src.w, src.h);
    if w == 0 || h == 0 {
        return ImageF32::new(w, h);
    }

    let mut tmp = ImageF32::new(w, h);
    let taps = horizontal.taps();
    let radius = taps.len() / 2;
    for y in 0..h {
        let src_row = src.row(y);
        let dst_row = tmp.row_mut(y);
        for (x, dst_px) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &tap) in taps.iter().enumerate() {
                let sx = clamp_index(x as isize + k as isize - radius as isize, w);
                acc += tap * src_row[sx];
            }
            *dst_px = acc;
        }
    }

    let mut out = ImageF32::new(w, h);
    let taps = vertical.taps();
    let radius = taps.len() / 2;
    for y in 0..h {
        let dst_row = out.row_mut(y);
        for (k, &tap) in taps.iter().enumerate() {
            let sy = clamp_index(y as isize + k as isize - radius as isize, h);
            let src_row = tmp.row(sy);
            for (dst_px, &s) in dst_row.iter_mut().zip(src_row) {
                *dst_px += tap * s;
            }
        }
    }
    out
}

/// Gaussian blur with separate sigmas (pixels) per axis.
pub fn gaussian_blur(src: &ImageF32, h_sigma: f32, v_sigma: f32) -> ImageF32 {
    blur_separable(
        src,
        &GaussianKernel::new(h_sigma),
        &GaussianKernel::new(v_sigma),
    )
}

fn clamp_index(idx: isize, upper: usize) -> usize {
    if upper == 0 || idx < 0 {
        0
    } else if (idx as usize) >= upper {
        upper - 1
    } else {
        idx as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalised() {
        let k = GaussianKernel::new(2.5);
        let sum: f32 = k.taps().iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(k.taps().len(), 2 * k.radius() + 1);
        assert_eq!(GaussianKernel::new(0.0).taps(), &[1.0]);
    }

    #[test]
    fn blur_preserves_constant_image() {
        let mut img = ImageF32::new(9, 7);
        img.fill(0.4);
        let out = gaussian_blur(&img, 3.0, 1.0);
        assert!(out.data.iter().all(|v| (v - 0.4).abs() < 1e-5));
    }

    #[test]
    fn horizontal_only_blur_keeps_rows_independent() {
        let mut img = ImageF32::new(8, 4);
        for x in 0..8 {
            img.set(x, 2, 1.0);
        }
        let out = gaussian_blur(&img, 2.0, 0.0);
        assert!(out.row(1).iter().all(|&v| v == 0.0));
        assert!(out.row(2).iter().all(|&v| (v - 1.0).abs() < 1e-5));
    }
}
