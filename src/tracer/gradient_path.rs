//! Shortest paths from the first content bound to the second one across the
//! directional derivative field.
//!
//! The cost of a path is the largest `1 - |derivative|` along it, so cheap
//! paths stay on strong horizontal edges end to end. Relaxation is a
//! multi-source Dijkstra seeded from every cell of the first bound; only
//! neighbours whose offset points toward the second bound are relaxed, which
//! keeps paths monotone across the page.
use log::debug;

use super::node::PathNode;
use super::TracerOptions;
use crate::edges::{directional_derivative, normalize_symmetric};
use crate::filters::gaussian_blur;
use crate::geometry::{self, Line2, Polyline};
use crate::grid::{opposite_neighbor, Grid, GridLineTraverser, NEIGHBORS};
use crate::image::{ImageF32, ImageView};
use crate::priority_queue::{HeapOrder, PriorityQueue};

/// Heap order over padded node indices: lower cost first.
struct CostOrder<'a> {
    nodes: &'a mut Grid<PathNode>,
}

impl HeapOrder<usize> for CostOrder<'_> {
    #[inline]
    fn higher_than(&self, lhs: &usize, rhs: &usize) -> bool {
        self.nodes.node(*lhs).cost < self.nodes.node(*rhs).cost
    }

    #[inline]
    fn set_index(&mut self, item: &usize, heap_idx: usize) {
        self.nodes.node_mut(*item).heap_idx = heap_idx as u32;
    }
}

/// Trace up to `opts.max_paths` curves from `first` to `second` over
/// `gray` (intensities in `[0, 1]`). Curves run from the first bound to the
/// second.
pub fn trace_gradient_paths(
    gray: &ImageF32,
    first: &Line2,
    second: &Line2,
    opts: &TracerOptions,
) -> Vec<Polyline> {
    let (w, h) = (gray.w, gray.h);
    if w < 2 || h < 2 {
        return Vec::new();
    }
    let Some(down) = super::down_direction(first, second) else {
        return Vec::new();
    };
    let Some(across) = super::across_direction(first, second, down) else {
        return Vec::new();
    };

    let blurred = gaussian_blur(gray, opts.blur_h_sigma, opts.blur_v_sigma);
    let mut deriv = directional_derivative(&blurred, down);
    normalize_symmetric(&mut deriv);

    let mut nodes = Grid::new(w, h, 1, PathNode::border());
    for y in 0..h {
        for (node, &d) in nodes.row_mut(y).iter_mut().zip(deriv.row(y)) {
            *node = PathNode::new(d);
        }
    }

    relax(&mut nodes, first, across);

    let endpoints = pick_endpoints(&nodes, second, opts);
    let paths: Vec<Polyline> = endpoints
        .into_iter()
        .filter_map(|idx| trace_back(&nodes, idx))
        .map(|dense| downsample(&dense, opts.max_node_spacing_px))
        .filter(|path| path.len() >= 2)
        .collect();
    debug!("trace_gradient_paths paths={}", paths.len());
    paths
}

fn relax(nodes: &mut Grid<PathNode>, first: &Line2, across: [f32; 2]) {
    let offsets = nodes.neighbor_offsets();
    let allowed: Vec<usize> = (0..8)
        .filter(|&i| {
            let (dx, dy) = NEIGHBORS[i];
            geometry::dot([dx as f32, dy as f32], across) > geometry::EPS
        })
        .collect();

    let mut queue: PriorityQueue<usize> = PriorityQueue::new();
    let mut order = CostOrder { nodes };

    for (x, y) in GridLineTraverser::from_line(first) {
        let (x, y) = (x as isize, y as isize);
        if x < 0 || y < 0 || x >= order.nodes.width() as isize || y >= order.nodes.height() as isize
        {
            continue;
        }
        let idx = order.nodes.padded_index(x, y);
        let node = order.nodes.node_mut(idx);
        let seed_cost = 1.0 - node.deriv.abs();
        if node.is_queued() || seed_cost >= node.cost {
            continue;
        }
        node.cost = seed_cost;
        queue.push(idx, &mut order);
    }

    while let Some(idx) = queue.pop(&mut order) {
        let node = order.nodes.node_mut(idx);
        node.heap_idx = PathNode::NOT_QUEUED;
        node.tag.set_finalized();
        let cost = node.cost;

        for &n in &allowed {
            let nidx = (idx as isize + offsets[n]) as usize;
            let neighbor = order.nodes.node_mut(nidx);
            if neighbor.tag.is_finalized() {
                continue;
            }
            let new_cost = cost.max(1.0 - neighbor.deriv.abs());
            if new_cost >= neighbor.cost {
                continue;
            }
            neighbor.cost = new_cost;
            neighbor.tag.set_predecessor(opposite_neighbor(n));
            if neighbor.is_queued() {
                let heap_idx = neighbor.heap_idx as usize;
                queue.reposition(heap_idx, &mut order);
            } else {
                queue.push(nidx, &mut order);
            }
        }
    }
}

/// Lowest-cost cells along `second`, pairwise at least
/// `min_endpoint_separation_px` apart.
fn pick_endpoints(nodes: &Grid<PathNode>, second: &Line2, opts: &TracerOptions) -> Vec<usize> {
    let mut candidates: Vec<(f32, usize)> = GridLineTraverser::from_line(second)
        .filter_map(|(x, y)| {
            let (x, y) = (x as isize, y as isize);
            if x < 0 || y < 0 || x >= nodes.width() as isize || y >= nodes.height() as isize {
                return None;
            }
            let idx = nodes.padded_index(x, y);
            let node = nodes.node(idx);
            (node.tag.is_finalized() && node.cost < 1.0).then_some((node.cost, idx))
        })
        .collect();
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

    let min_sep_sq = opts.min_endpoint_separation_px * opts.min_endpoint_separation_px;
    let mut chosen: Vec<usize> = Vec::new();
    for (_, idx) in candidates {
        if chosen.len() >= opts.max_paths {
            break;
        }
        let p = cell_center(nodes, idx);
        let separated = chosen.iter().all(|&other| {
            let q = cell_center(nodes, other);
            let d = geometry::sub(p, q);
            geometry::dot(d, d) >= min_sep_sq
        });
        if separated {
            chosen.push(idx);
        }
    }
    chosen
}

fn cell_center(nodes: &Grid<PathNode>, idx: usize) -> [f32; 2] {
    let (x, y) = nodes.coords(idx);
    [x as f32, y as f32]
}

/// Dense path from the seed to `end`, following predecessors.
fn trace_back(nodes: &Grid<PathNode>, end: usize) -> Option<Polyline> {
    let offsets = nodes.neighbor_offsets();
    let mut path = vec![cell_center(nodes, end)];
    let mut idx = end;
    let limit = nodes.width() * nodes.height();
    while let Some(pred) = nodes.node(idx).tag.predecessor() {
        idx = (idx as isize + offsets[pred]) as usize;
        path.push(cell_center(nodes, idx));
        if path.len() > limit {
            return None;
        }
    }
    path.reverse();
    Some(path)
}

/// Keep the first and last points and as few interior points as needed so
/// that consecutive output points are at most `max_spacing` apart.
pub fn downsample(dense: &[[f32; 2]], max_spacing: f32) -> Polyline {
    let Some((&first, rest)) = dense.split_first() else {
        return Vec::new();
    };
    let mut out = vec![first];
    let mut last = first;
    for (i, &p) in rest.iter().enumerate() {
        let is_last = i + 1 == rest.len();
        let next_too_far = rest
            .get(i + 1)
            .is_some_and(|&next| geometry::distance(last, next) > max_spacing);
        if is_last || next_too_far {
            out.push(p);
            last = p;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bright page with a dark band between rows `top` and `bottom`.
    fn band_image(w: usize, h: usize, top: usize, bottom: usize) -> ImageF32 {
        let mut img = ImageF32::new(w, h);
        for y in 0..h {
            let v = if (top..bottom).contains(&y) { 0.0 } else { 1.0 };
            for x in 0..w {
                img.set(x, y, v);
            }
        }
        img
    }

    #[test]
    fn paths_follow_band_edges() {
        let img = band_image(120, 60, 25, 35);
        let left = Line2::vertical(5.0, 60.0);
        let right = Line2::vertical(114.0, 60.0);
        let opts = TracerOptions {
            max_paths: 2,
            min_endpoint_separation_px: 6.0,
            ..TracerOptions::default()
        };
        let paths = trace_gradient_paths(&img, &left, &right, &opts);
        assert_eq!(paths.len(), 2);
        let mut rows: Vec<f32> = paths.iter().map(|p| p.last().unwrap()[1]).collect();
        rows.sort_by(f32::total_cmp);
        assert!((rows[0] - 24.5).abs() <= 1.5, "{rows:?}");
        assert!((rows[1] - 34.5).abs() <= 1.5, "{rows:?}");
        for path in &paths {
            assert_eq!(path.first().unwrap()[0], 5.0);
            assert_eq!(path.last().unwrap()[0], 114.0);
            for pair in path.windows(2) {
                assert!(geometry::distance(pair[0], pair[1]) <= 20.0 + 1e-4);
                assert!(pair[1][0] > pair[0][0]);
            }
        }
    }

    #[test]
    fn downsample_respects_spacing() {
        let dense: Vec<[f32; 2]> = (0..=50).map(|x| [x as f32, 0.0]).collect();
        let sparse = downsample(&dense, 10.0);
        assert_eq!(sparse.first(), Some(&[0.0, 0.0]));
        assert_eq!(sparse.last(), Some(&[50.0, 0.0]));
        assert_eq!(sparse.len(), 6);
        assert!(downsample(&[], 10.0).is_empty());
    }

    #[test]
    fn flat_image_yields_no_paths() {
        let img = band_image(40, 30, 0, 0);
        let left = Line2::vertical(2.0, 30.0);
        let right = Line2::vertical(37.0, 30.0);
        assert!(trace_gradient_paths(&img, &left, &right, &TracerOptions::default()).is_empty());
    }
}
