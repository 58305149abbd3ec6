//! Mapping between the input image and the working-resolution image.
//!
//! - Downscales inputs whose DPI exceeds the working DPI (never upscales).
//! - Keeps the forward and inverse [`AffineMap`] so bounds and curves found
//!   at working resolution can be reported in input coordinates.
use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::geometry::{AffineMap, Dpi};
use crate::image::{BinaryImage, ImageU8};

#[derive(Clone, Copy, Debug)]
pub struct WorkingScale {
    pub width: usize,
    pub height: usize,
    pub dpi: Dpi,
    /// Input → working coordinates.
    pub to_working: AffineMap,
    /// Working → input coordinates.
    pub to_original: AffineMap,
}

impl WorkingScale {
    pub fn new(width: usize, height: usize, dpi: Dpi, working_dpi: f32) -> Self {
        let factor = |src_dpi: f32| {
            if working_dpi.is_finite() && working_dpi > 0.0 && src_dpi > working_dpi {
                working_dpi / src_dpi
            } else {
                1.0
            }
        };
        let fx = factor(dpi.horizontal);
        let fy = factor(dpi.vertical);
        let w = ((width as f32 * fx).round() as usize).clamp(1, width.max(1));
        let h = ((height as f32 * fy).round() as usize).clamp(1, height.max(1));
        let sx = w as f32 / width.max(1) as f32;
        let sy = h as f32 / height.max(1) as f32;
        let to_working = AffineMap::scaling(sx, sy);
        Self {
            width: w,
            height: h,
            dpi: Dpi::new(dpi.horizontal * sx, dpi.vertical * sy),
            to_working,
            to_original: to_working.inverse(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.to_working == AffineMap::identity()
    }

    /// Working-resolution copy of `image`.
    pub fn downscale(&self, image: &ImageU8<'_>) -> GrayImage {
        let full = image.to_gray_image();
        if self.width == image.w && self.height == image.h {
            return full;
        }
        imageops::resize(&full, self.width as u32, self.height as u32, FilterType::Triangle)
    }

    /// Working-resolution copy of an input-resolution ink mask. A working
    /// pixel is ink when at least half of its footprint is.
    pub fn downscale_mask(&self, mask: &BinaryImage) -> BinaryImage {
        if self.width == mask.width() && self.height == mask.height() {
            return mask.clone();
        }
        let resized = imageops::resize(
            &mask.to_mask_image(),
            self.width as u32,
            self.height as u32,
            FilterType::Triangle,
        );
        BinaryImage::from_threshold_above(&resized, 127)
    }

    pub fn scale_x(&self) -> f32 {
        self.to_working.m[(0, 0)]
    }

    pub fn scale_y(&self) -> f32 {
        self.to_working.m[(1, 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downscales_high_dpi_only() {
        let s = WorkingScale::new(600, 900, Dpi::new(400.0, 400.0), 200.0);
        assert_eq!((s.width, s.height), (300, 450));
        assert!((s.dpi.horizontal - 200.0).abs() < 1e-3);
        let p = s.to_original.apply(s.to_working.apply([123.0, 456.0]));
        assert!((p[0] - 123.0).abs() < 1e-3 && (p[1] - 456.0).abs() < 1e-3);

        let s = WorkingScale::new(100, 80, Dpi::new(150.0, 150.0), 200.0);
        assert_eq!((s.width, s.height), (100, 80));
        assert!(s.is_identity());
    }

    #[test]
    fn resized_image_matches_working_size() {
        let data = vec![200u8; 40 * 30];
        let view = ImageU8::packed(40, 30, &data);
        let s = WorkingScale::new(40, 30, Dpi::new(400.0, 300.0), 200.0);
        let img = s.downscale(&view);
        assert_eq!((img.width(), img.height()), (20, 20));
        assert!(img.as_raw().iter().all(|&v| v.abs_diff(200) <= 1));
    }

    #[test]
    fn mask_downscale_keeps_solid_blocks() {
        let mut mask = BinaryImage::new(40, 40);
        mask.fill_rect(8, 8, 24, 24, true);
        let s = WorkingScale::new(40, 40, Dpi::new(400.0, 400.0), 200.0);
        let small = s.downscale_mask(&mask);
        assert_eq!((small.width(), small.height()), (20, 20));
        assert!(small.get(8, 8));
        assert!(!small.get(2, 2));
        assert!(!small.get(15, 15));
    }
}
