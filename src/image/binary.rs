//! Owned binary mask (`true` = ink) with the cleanup steps the detector
//! applies before content-bound detection.
//!
//! Heavy lifting (Otsu level, connected components, morphology) is delegated
//! to `imageproc`, which works on 8-bit images where 255 marks foreground.
use crate::geometry::ContentRect;
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::region_labelling::{connected_components, Connectivity};

const INK: u8 = 255;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryImage {
    w: usize,
    h: usize,
    data: Vec<bool>,
}

impl BinaryImage {
    /// All-background mask.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![false; w * h],
        }
    }

    /// Mark pixels darker than or equal to `level` as ink.
    pub fn from_threshold(gray: &GrayImage, level: u8) -> Self {
        let (w, h) = (gray.width() as usize, gray.height() as usize);
        let data = gray.as_raw().iter().map(|&v| v <= level).collect();
        Self { w, h, data }
    }

    /// Mark pixels brighter than `level` as ink (for foreground-is-bright
    /// masks).
    pub fn from_threshold_above(gray: &GrayImage, level: u8) -> Self {
        let (w, h) = (gray.width() as usize, gray.height() as usize);
        let data = gray.as_raw().iter().map(|&v| v > level).collect();
        Self { w, h, data }
    }

    /// Global Otsu binarization.
    pub fn otsu(gray: &GrayImage) -> Self {
        let level = imageproc::contrast::otsu_level(gray);
        Self::from_threshold(gray, level)
    }

    /// Interpret a foreground-is-non-zero 8-bit mask.
    pub fn from_mask_image(mask: &GrayImage) -> Self {
        let (w, h) = (mask.width() as usize, mask.height() as usize);
        let data = mask.as_raw().iter().map(|&v| v != 0).collect();
        Self { w, h, data }
    }

    pub fn to_mask_image(&self) -> GrayImage {
        let raw = self
            .data
            .iter()
            .map(|&ink| if ink { INK } else { 0 })
            .collect();
        GrayImage::from_raw(self.w as u32, self.h as u32, raw)
            .unwrap_or_else(|| GrayImage::new(self.w as u32, self.h as u32))
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, ink: bool) {
        self.data[y * self.w + x] = ink;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[bool] {
        &self.data[y * self.w..(y + 1) * self.w]
    }

    pub fn count_ink(&self) -> usize {
        self.data.iter().filter(|&&ink| ink).count()
    }

    /// Set every pixel of the axis-aligned rectangle to `ink`.
    pub fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, ink: bool) {
        let x1 = x1.min(self.w);
        let y1 = y1.min(self.h);
        for y in y0.min(y1)..y1 {
            let row = &mut self.data[y * self.w..(y + 1) * self.w];
            for px in &mut row[x0.min(x1)..x1] {
                *px = ink;
            }
        }
    }

    /// Clear everything outside `rect` (given in this mask's coordinates).
    pub fn erase_outside(&mut self, rect: &ContentRect) {
        let x0 = rect.x.max(0.0).floor() as usize;
        let y0 = rect.y.max(0.0).floor() as usize;
        let x1 = (rect.x + rect.width).max(0.0).ceil() as usize;
        let y1 = (rect.y + rect.height).max(0.0).ceil() as usize;
        for y in 0..self.h {
            let inside_y = y >= y0 && y < y1;
            let row = &mut self.data[y * self.w..(y + 1) * self.w];
            for (x, px) in row.iter_mut().enumerate() {
                if !inside_y || x < x0 || x >= x1 {
                    *px = false;
                }
            }
        }
    }

    /// Drop 8-connected ink components with fewer than `min_area` pixels.
    pub fn remove_small_components(&mut self, min_area: usize) {
        if min_area <= 1 || self.w == 0 || self.h == 0 {
            return;
        }
        let labels = connected_components(&self.to_mask_image(), Connectivity::Eight, Luma([0u8]));
        let mut areas: Vec<usize> = Vec::new();
        for Luma([label]) in labels.pixels() {
            let label = *label as usize;
            if label == 0 {
                continue;
            }
            if areas.len() <= label {
                areas.resize(label + 1, 0);
            }
            areas[label] += 1;
        }
        for (px, Luma([label])) in self.data.iter_mut().zip(labels.pixels()) {
            let label = *label as usize;
            if label != 0 && areas[label] < min_area {
                *px = false;
            }
        }
    }

    /// Morphological dilation with a square structuring element of radius `k`.
    pub fn dilated(&self, k: u8) -> Self {
        if k == 0 {
            return self.clone();
        }
        let dilated = imageproc::morphology::dilate(&self.to_mask_image(), Norm::LInf, k);
        Self::from_mask_image(&dilated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_components_are_removed() {
        let mut mask = BinaryImage::new(20, 20);
        mask.fill_rect(2, 2, 10, 10, true);
        mask.set(15, 15, true);
        mask.remove_small_components(4);
        assert!(mask.get(5, 5));
        assert!(!mask.get(15, 15));
        assert_eq!(mask.count_ink(), 64);
    }

    #[test]
    fn erase_outside_keeps_rect() {
        let mut mask = BinaryImage::new(10, 10);
        mask.fill_rect(0, 0, 10, 10, true);
        mask.erase_outside(&ContentRect::new(2.0, 3.0, 4.0, 5.0));
        assert_eq!(mask.count_ink(), 20);
        assert!(mask.get(2, 3));
        assert!(!mask.get(6, 3));
        assert!(!mask.get(2, 8));
    }
}
