//! Padded 2D buffers and digital line rasterization.
//!
//! [`Grid`] owns one contiguous buffer holding `width × height` interior cells
//! surrounded by `padding` layers of border cells on every side. Raster
//! searches (shortest paths, region growing) initialize the border with a
//! sentinel value so that neighbour lookups around interior cells never need
//! explicit bounds checks: the padded linear index of a cell plus one of
//! [`Grid::neighbor_offsets`] always stays inside the buffer.
//!
//! [`GridLineTraverser`] yields the integer cells visited by a real-valued
//! segment and is used to seed and sample searches along boundary lines.

mod traverser;

pub use traverser::GridLineTraverser;

/// 8-neighbourhood in the order used by neighbour-index tags.
pub const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Index into [`NEIGHBORS`] pointing in the opposite direction.
#[inline]
pub const fn opposite_neighbor(idx: usize) -> usize {
    7 - idx
}

#[derive(Clone, Debug)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    padding: usize,
    stride: usize,
    storage: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Allocate a grid with every cell (interior and padding) set to `fill`.
    pub fn new(width: usize, height: usize, padding: usize, fill: T) -> Self {
        let stride = width + 2 * padding;
        let rows = height + 2 * padding;
        Self {
            width,
            height,
            padding,
            stride,
            storage: vec![fill; stride * rows],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Elements between vertically adjacent cells, `width + 2 * padding`.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Fill every padding cell, leaving the interior untouched.
    pub fn init_padding(&mut self, value: T) {
        let p = self.padding;
        if p == 0 {
            return;
        }
        let stride = self.stride;
        let rows = self.height + 2 * p;
        for y in 0..rows {
            let row = &mut self.storage[y * stride..(y + 1) * stride];
            if y < p || y >= p + self.height {
                row.fill(value.clone());
            } else {
                row[..p].fill(value.clone());
                row[p + self.width..].fill(value.clone());
            }
        }
    }

    /// Fill every interior cell, leaving the padding untouched.
    pub fn init_interior(&mut self, value: T) {
        for y in 0..self.height {
            self.row_mut(y).fill(value.clone());
        }
    }

    /// Linear index into the padded buffer for signed interior coordinates.
    /// Valid for `x ∈ [-padding, width + padding)` and likewise for `y`.
    #[inline]
    pub fn padded_index(&self, x: isize, y: isize) -> usize {
        let p = self.padding as isize;
        debug_assert!(x >= -p && x < self.width as isize + p);
        debug_assert!(y >= -p && y < self.height as isize + p);
        ((y + p) as usize) * self.stride + (x + p) as usize
    }

    /// Interior coordinates of a padded linear index.
    #[inline]
    pub fn coords(&self, idx: usize) -> (isize, isize) {
        let p = self.padding as isize;
        (
            (idx % self.stride) as isize - p,
            (idx / self.stride) as isize - p,
        )
    }

    /// Linear deltas matching [`NEIGHBORS`].
    pub fn neighbor_offsets(&self) -> [isize; 8] {
        let s = self.stride as isize;
        let mut out = [0isize; 8];
        for (o, (dx, dy)) in out.iter_mut().zip(NEIGHBORS) {
            *o = dy * s + dx;
        }
        out
    }

    #[inline]
    pub fn get(&self, x: isize, y: isize) -> &T {
        &self.storage[self.padded_index(x, y)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: isize, y: isize) -> &mut T {
        let idx = self.padded_index(x, y);
        &mut self.storage[idx]
    }

    #[inline]
    pub fn node(&self, idx: usize) -> &T {
        &self.storage[idx]
    }

    #[inline]
    pub fn node_mut(&mut self, idx: usize) -> &mut T {
        &mut self.storage[idx]
    }

    /// Interior cells of row `y`.
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let start = (y + self.padding) * self.stride + self.padding;
        &self.storage[start..start + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = (y + self.padding) * self.stride + self.padding;
        &mut self.storage[start..start + self.width]
    }

    /// Interior cells in row-major order.
    pub fn interior(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.height).flat_map(move |y| self.row(y).iter())
    }

    /// Interior cells with their `(x, y)` coordinates.
    pub fn interior_indexed(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        (0..self.height).flat_map(move |y| {
            self.row(y)
                .iter()
                .enumerate()
                .map(move |(x, cell)| (x, y, cell))
        })
    }

    /// The whole buffer including padding, row-major with [`Grid::stride`].
    #[inline]
    pub fn padded_data(&self) -> &[T] {
        &self.storage
    }

    #[inline]
    pub fn padded_data_mut(&mut self) -> &mut [T] {
        &mut self.storage
    }

    /// Exchange contents (dimensions included) with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }
}
