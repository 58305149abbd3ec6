//! I/O helpers for page images, overlays and JSON.
//!
//! - `load_grayscale_image`: read a PNG/JPEG/TIFF into an owned 8-bit gray buffer.
//! - `save_overlay`: draw bounds and curves over the page and write an RGB PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::ImageU8;
use crate::geometry::Line2;
use crate::grid::GridLineTraverser;
use image::{Rgb, RgbImage};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Owned 8-bit grayscale buffer with stride and borrowed view conversion.
#[derive(Clone, Debug)]
pub struct GrayImageU8 {
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
}

impl GrayImageU8 {
    /// Construct an owned grayscale buffer given raw bytes.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            stride: width,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Borrow as a read-only `ImageU8` view
    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8 {
            w: self.width,
            h: self.height,
            stride: self.stride,
            data: &self.data,
        }
    }
}

/// Load an image from disk and convert to 8-bit grayscale.
pub fn load_grayscale_image(path: &Path) -> Result<GrayImageU8, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    Ok(GrayImageU8::new(width, height, img.into_raw()))
}

const BOUND_COLOR: Rgb<u8> = Rgb([0, 96, 255]);
const CURVE_COLOR: Rgb<u8> = Rgb([230, 30, 30]);

/// Render the page with the vertical bounds (blue) and curves (red) on top.
pub fn save_overlay(
    page: &ImageU8<'_>,
    bounds: Option<(&Line2, &Line2)>,
    curves: &[Vec<[f32; 2]>],
    path: &Path,
) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let mut out = RgbImage::new(page.w as u32, page.h as u32);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let v = page.get(x as usize, y as usize);
        *px = Rgb([v, v, v]);
    }
    if let Some((left, right)) = bounds {
        draw_segment(&mut out, left.p1, left.p2, BOUND_COLOR);
        draw_segment(&mut out, right.p1, right.p2, BOUND_COLOR);
    }
    for curve in curves {
        for pair in curve.windows(2) {
            draw_segment(&mut out, pair[0], pair[1], CURVE_COLOR);
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

fn draw_segment(canvas: &mut RgbImage, p1: [f32; 2], p2: [f32; 2], color: Rgb<u8>) {
    let (w, h) = (canvas.width() as i32, canvas.height() as i32);
    for (x, y) in GridLineTraverser::new(p1, p2) {
        if x >= 0 && y >= 0 && x < w && y < h {
            canvas.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
