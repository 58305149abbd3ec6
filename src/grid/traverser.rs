/// Integer cells visited by a real-valued segment.
///
/// The number of stops is `max(|dx|, |dy|) + 1` where `dx`, `dy` come from the
/// rounded endpoints; stops are evenly spaced along the segment and rounded to
/// the nearest cell, so consecutive cells are 8-connected.
#[derive(Clone, Debug)]
pub struct GridLineTraverser {
    p1: [f32; 2],
    p2: [f32; 2],
    dt: f32,
    total_stops: usize,
    stops_done: usize,
}

impl GridLineTraverser {
    pub fn new(p1: [f32; 2], p2: [f32; 2]) -> Self {
        let dx = (p2[0].round() - p1[0].round()).abs();
        let dy = (p2[1].round() - p1[1].round()).abs();
        let spans = if dx.is_finite() && dy.is_finite() {
            dx.max(dy) as usize
        } else {
            0
        };
        let dt = if spans == 0 { 0.0 } else { 1.0 / spans as f32 };
        Self {
            p1,
            p2,
            dt,
            total_stops: spans + 1,
            stops_done: 0,
        }
    }

    pub fn from_line(line: &crate::geometry::Line2) -> Self {
        Self::new(line.p1, line.p2)
    }

    fn point_at(&self, t: f32) -> [f32; 2] {
        [
            self.p1[0] + (self.p2[0] - self.p1[0]) * t,
            self.p1[1] + (self.p2[1] - self.p1[1]) * t,
        ]
    }
}

impl Iterator for GridLineTraverser {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<(i32, i32)> {
        if self.stops_done >= self.total_stops {
            return None;
        }
        let t = if self.stops_done + 1 == self.total_stops {
            1.0
        } else {
            self.stops_done as f32 * self.dt
        };
        self.stops_done += 1;
        let p = self.point_at(t);
        Some((p[0].round() as i32, p[1].round() as i32))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total_stops - self.stops_done;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GridLineTraverser {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_line_visits_each_column() {
        let cells: Vec<_> = GridLineTraverser::new([0.2, 3.4], [5.0, 3.4]).collect();
        assert_eq!(cells, (0..=5).map(|x| (x, 3)).collect::<Vec<_>>());
    }

    #[test]
    fn diagonal_cells_are_connected() {
        let cells: Vec<_> = GridLineTraverser::new([0.0, 0.0], [7.0, 3.0]).collect();
        assert_eq!(cells.len(), 8);
        assert_eq!(cells.first(), Some(&(0, 0)));
        assert_eq!(cells.last(), Some(&(7, 3)));
        for pair in cells.windows(2) {
            assert!((pair[1].0 - pair[0].0).abs() <= 1);
            assert!((pair[1].1 - pair[0].1).abs() <= 1);
        }
    }

    #[test]
    fn degenerate_line_yields_single_cell() {
        let mut it = GridLineTraverser::new([2.4, 2.6], [2.4, 2.6]);
        assert_eq!(it.len(), 1);
        assert_eq!(it.next(), Some((2, 3)));
        assert_eq!(it.next(), None);
    }
}
