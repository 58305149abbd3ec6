//! Owned single-channel f32 image in row-major layout (stride == width).
//!
//! Used for blurred intensity and gradient fields. Intensities converted from
//! 8-bit sources live in `[0, 1]`.
use super::{ImageU8, ImageView};

#[derive(Clone, Debug)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Number of f32 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![0.0; w * h],
        }
    }

    /// Convert an 8-bit view to `[0, 1]` intensities.
    pub fn from_u8(gray: &ImageU8<'_>) -> Self {
        let mut out = Self::new(gray.w, gray.h);
        for (y, src) in gray.rows().enumerate() {
            let dst = &mut out.data[y * gray.w..(y + 1) * gray.w];
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = s as f32 / 255.0;
            }
        }
        out
    }

    /// Convert an `image::GrayImage` to `[0, 1]` intensities.
    pub fn from_gray_image(gray: &image::GrayImage) -> Self {
        let (w, h) = (gray.width() as usize, gray.height() as usize);
        let data = gray.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Bilinear sample; `None` when the 2×2 footprint leaves the image.
    #[inline]
    pub fn sample_bilinear(&self, x: f32, y: f32) -> Option<f32> {
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }
        let xf = x.floor();
        let yf = y.floor();
        let x0 = xf as usize;
        let y0 = yf as usize;
        if x0 + 1 >= self.w || y0 + 1 >= self.h {
            return None;
        }
        let tx = x - xf;
        let ty = y - yf;
        let base = y0 * self.stride + x0;
        let v00 = self.data[base];
        let v10 = self.data[base + 1];
        let v01 = self.data[base + self.stride];
        let v11 = self.data[base + self.stride + 1];
        let top = v00 + (v10 - v00) * tx;
        let bottom = v01 + (v11 - v01) * tx;
        Some(top + (bottom - top) * ty)
    }

    /// Quantize `[0, 1]` intensities back to 8 bits (values are clamped).
    pub fn to_gray_image(&self) -> image::GrayImage {
        let mut out = image::GrayImage::new(self.w as u32, self.h as u32);
        for (dst, &v) in out.iter_mut().zip(self.data.iter()) {
            *dst = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        out
    }

    /// Largest absolute value, 0 for an empty image.
    pub fn max_abs(&self) -> f32 {
        self.data.iter().fold(0.0f32, |acc, v| acc.max(v.abs()))
    }
}

impl crate::image::traits::ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[f32]> {
        (self.stride == self.w).then_some(&self.data[..self.w * self.h])
    }
}

impl crate::image::traits::ImageViewMut for ImageF32 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }

    #[inline]
    fn as_mut_slice(&mut self) -> Option<&mut [f32]> {
        if self.stride == self.w {
            Some(&mut self.data[..self.w * self.h])
        } else {
            None
        }
    }
}
