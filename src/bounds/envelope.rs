//! Per-side convex envelopes of the columns' extreme ink pixels.
use std::collections::VecDeque;

use crate::geometry::{self, Line2, EPS};
use crate::image::BinaryImage;

/// Topmost and bottommost ink rows of one column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertRange {
    pub top: usize,
    pub bottom: usize,
}

/// Extreme ink rows for every column; `None` for columns without ink.
pub fn column_ranges(mask: &BinaryImage) -> Vec<Option<VertRange>> {
    let mut ranges: Vec<Option<VertRange>> = vec![None; mask.width()];
    for y in 0..mask.height() {
        for (range, &ink) in ranges.iter_mut().zip(mask.row(y)) {
            if !ink {
                continue;
            }
            match range {
                Some(r) => r.bottom = y,
                None => *range = Some(VertRange { top: y, bottom: y }),
            }
        }
    }
    ranges
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Swept left to right.
    Left,
    /// Swept right to left.
    Right,
}

/// Chain of envelope vertices ordered top to bottom.
///
/// A new column extends the top end only when its top pixel is strictly
/// higher than the current top vertex, and likewise for the bottom end.
/// Before a vertex is attached, the vertices next to it that would make the
/// chain concave on this side are trimmed, as long as the segment replacing
/// them stays within `max_segment_len`.
#[derive(Clone, Debug)]
pub struct Envelope {
    side: Side,
    max_segment_len: f32,
    points: VecDeque<[f32; 2]>,
}

impl Envelope {
    pub fn new(side: Side, max_segment_len: f32) -> Self {
        Self {
            side,
            max_segment_len,
            points: VecDeque::new(),
        }
    }

    /// Sweep the columns in this side's order and build the envelope.
    pub fn from_ranges(side: Side, ranges: &[Option<VertRange>], max_segment_len: f32) -> Self {
        let mut env = Self::new(side, max_segment_len);
        let mut visit = |x: usize| {
            if let Some(range) = ranges[x] {
                env.add_column(x, range);
            }
        };
        match side {
            Side::Left => (0..ranges.len()).for_each(&mut visit),
            Side::Right => (0..ranges.len()).rev().for_each(&mut visit),
        }
        env
    }

    pub fn points(&self) -> &VecDeque<[f32; 2]> {
        &self.points
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Vertical line through the outermost vertex on this side, `None` when
    /// empty.
    pub fn outermost_vertical(&self) -> Option<Line2> {
        let xs = self.points.iter().map(|p| p[0]);
        let x = match self.side {
            Side::Left => xs.reduce(f32::min),
            Side::Right => xs.reduce(f32::max),
        }?;
        Some(Line2::vertical(x, 1.0))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn add_column(&mut self, x: usize, range: VertRange) {
        let top = [x as f32, range.top as f32];
        let bottom = [x as f32, range.bottom as f32];
        if self.points.is_empty() {
            self.points.push_back(top);
            if range.bottom != range.top {
                self.points.push_back(bottom);
            }
            return;
        }
        if self.points.front().is_some_and(|front| top[1] < front[1]) {
            self.attach_top(top);
        }
        if self.points.back().is_some_and(|back| bottom[1] > back[1]) {
            self.attach_bottom(bottom);
        }
    }

    /// `true` when `a → b → c` (top to bottom) bends inward on this side.
    fn is_concave(&self, a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> bool {
        let turn = geometry::cross(geometry::sub(b, a), geometry::sub(c, b));
        match self.side {
            Side::Left => turn >= -EPS,
            Side::Right => turn <= EPS,
        }
    }

    fn attach_top(&mut self, p: [f32; 2]) {
        while self.points.len() >= 2 {
            let a = self.points[0];
            let b = self.points[1];
            if !self.is_concave(p, a, b) {
                break;
            }
            if geometry::distance(p, b) > self.max_segment_len {
                break;
            }
            self.points.pop_front();
        }
        self.points.push_front(p);
    }

    fn attach_bottom(&mut self, p: [f32; 2]) {
        while self.points.len() >= 2 {
            let n = self.points.len();
            let a = self.points[n - 1];
            let b = self.points[n - 2];
            if !self.is_concave(b, a, p) {
                break;
            }
            if geometry::distance(b, p) > self.max_segment_len {
                break;
            }
            self.points.pop_back();
        }
        self.points.push_back(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_track_extreme_rows() {
        let mut mask = BinaryImage::new(4, 6);
        mask.set(1, 2, true);
        mask.set(1, 4, true);
        mask.set(3, 0, true);
        let ranges = column_ranges(&mask);
        assert_eq!(ranges[0], None);
        assert_eq!(ranges[1], Some(VertRange { top: 2, bottom: 4 }));
        assert_eq!(ranges[3], Some(VertRange { top: 0, bottom: 0 }));
    }

    #[test]
    fn left_envelope_drops_concave_vertex() {
        let mut env = Envelope::new(Side::Left, 1000.0);
        env.add_column(0, VertRange { top: 10, bottom: 20 });
        env.add_column(2, VertRange { top: 9, bottom: 20 });
        env.add_column(10, VertRange { top: 0, bottom: 30 });
        // (2, 9) lies right of the chord (0, 10) → (10, 0).
        let pts: Vec<_> = env.points().iter().copied().collect();
        assert_eq!(pts, vec![[10.0, 0.0], [0.0, 10.0], [0.0, 20.0], [10.0, 30.0]]);
    }

    #[test]
    fn long_segments_stop_trimming() {
        let mut env = Envelope::new(Side::Left, 5.0);
        env.add_column(0, VertRange { top: 10, bottom: 10 });
        env.add_column(3, VertRange { top: 9, bottom: 10 });
        env.add_column(20, VertRange { top: 0, bottom: 10 });
        let pts: Vec<_> = env.points().iter().copied().collect();
        assert_eq!(pts, vec![[20.0, 0.0], [3.0, 9.0], [0.0, 10.0]]);
    }

    #[test]
    fn right_envelope_mirrors_left() {
        let ranges = vec![
            Some(VertRange { top: 0, bottom: 30 }),
            None,
            Some(VertRange { top: 9, bottom: 20 }),
            Some(VertRange { top: 10, bottom: 20 }),
        ];
        let env = Envelope::from_ranges(Side::Right, &ranges, 1000.0);
        let pts: Vec<_> = env.points().iter().copied().collect();
        assert_eq!(pts, vec![[0.0, 0.0], [3.0, 10.0], [3.0, 20.0], [0.0, 30.0]]);
    }
}
