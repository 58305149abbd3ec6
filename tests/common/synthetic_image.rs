pub const PAPER: u8 = 245;
pub const INK: u8 = 25;

/// Layout of a synthetic text block: ink spans columns `x0..x1`, every line
/// starts at one of `line_tops` and is `line_height` rows tall.
#[derive(Clone, Debug)]
pub struct PageLayout {
    pub width: usize,
    pub height: usize,
    pub x0: usize,
    pub x1: usize,
    pub line_tops: Vec<usize>,
    pub line_height: usize,
    /// Downward bulge of every line at the block centre; 0 gives straight
    /// lines. Lines keep their nominal position at `x0` and `x1`.
    pub sag: f32,
}

impl PageLayout {
    /// Vertical displacement of the lines at column `x`.
    pub fn offset_at(&self, x: usize) -> f32 {
        let half = 0.5 * (self.x1 - self.x0) as f32;
        if half <= 0.0 {
            return 0.0;
        }
        let centre = self.x0 as f32 + half;
        let t = (x as f32 - centre) / half;
        self.sag * (1.0 - t * t).max(0.0)
    }

    /// Mid-height row of the line starting at `top`, at column `x`.
    pub fn line_center_at(&self, top: usize, x: usize) -> f32 {
        top as f32 + self.offset_at(x) + 0.5 * (self.line_height as f32 - 1.0)
    }
}

/// Continuous dark bars, one per line.
pub fn page_with_bars(layout: &PageLayout) -> Vec<u8> {
    render(layout, |_| true)
}

/// Lines broken into words of `word_len` columns separated by `gap` columns.
pub fn page_with_words(layout: &PageLayout, word_len: usize, gap: usize) -> Vec<u8> {
    assert!(word_len > 0, "word length must be positive");
    let x0 = layout.x0;
    render(layout, |x| (x - x0) % (word_len + gap) < word_len)
}

fn render(layout: &PageLayout, inked_column: impl Fn(usize) -> bool) -> Vec<u8> {
    assert!(layout.width > 0 && layout.height > 0, "image dimensions must be positive");
    assert!(layout.x1 <= layout.width, "text block must fit the page");

    let mut img = vec![PAPER; layout.width * layout.height];
    for x in layout.x0..layout.x1 {
        if !inked_column(x) {
            continue;
        }
        let offset = layout.offset_at(x).round() as usize;
        for &top in &layout.line_tops {
            let y0 = top + offset;
            let y1 = (y0 + layout.line_height).min(layout.height);
            for y in y0..y1 {
                img[y * layout.width + x] = INK;
            }
        }
    }
    img
}

/// A single-column vertical stroke of ink from `y0` to `y1` (exclusive).
pub fn page_with_stroke(width: usize, height: usize, x: usize, y0: usize, y1: usize) -> Vec<u8> {
    let mut img = vec![PAPER; width * height];
    for y in y0..y1.min(height) {
        img[y * width + x] = 0;
    }
    img
}
