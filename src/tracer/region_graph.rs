//! Text-line tracing by region growing and a walk over region adjacency.
//!
//! Local peaks of the blurred ink intensity seed regions that grow inside the
//! thick text mask, brightest ink first. Regions touching through the mask are
//! joined by edges; a shortest-path search over the edges, where turning at a
//! shared region costs `1 - cos(turn)`, links the leftmost regions of each
//! text line to its rightmost ones.
use log::{debug, warn};

use super::node::RegionCell;
use super::TracerOptions;
use crate::angle::cos_between;
use crate::filters::gaussian_blur;
use crate::geometry::{self, Line2, Polyline};
use crate::grid::Grid;
use crate::image::{BinaryImage, ImageF32, ImageView};
use crate::priority_queue::{HeapOrder, PriorityQueue};

/// Connected area grown from one intensity peak.
#[derive(Clone, Debug, Default)]
pub struct Region {
    pub centroid: [f32; 2],
    pub pixel_count: usize,
    /// Indices of adjacent regions, ascending.
    pub neighbors: Vec<usize>,
}

/// Unordered pair of region indices stored as `(lesser, greater)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    lesser: usize,
    greater: usize,
}

impl Edge {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            lesser: a.min(b),
            greater: a.max(b),
        }
    }

    #[inline]
    pub fn lesser(&self) -> usize {
        self.lesser
    }

    #[inline]
    pub fn greater(&self) -> usize {
        self.greater
    }
}

/// An [`Edge`] oriented left to right, with shortest-path bookkeeping.
#[derive(Clone, Debug)]
pub struct EdgeNode {
    pub edge: Edge,
    pub tail: usize,
    pub head: usize,
    pub cost: f32,
    pub pred: Option<usize>,
    /// Leftmost region the best path starts from.
    pub src: usize,
    heap_idx: usize,
    finalized: bool,
}

impl EdgeNode {
    const NOT_QUEUED: usize = usize::MAX;
}

/// Regions and their adjacency, produced once per image.
#[derive(Clone, Debug, Default)]
pub struct RegionGraph {
    pub regions: Vec<Region>,
    pub edges: Vec<Edge>,
}

#[derive(Clone, Copy, Debug)]
struct FloodEntry {
    idx: usize,
    gray: u8,
    seq: u32,
}

/// Brighter ink first, then first come first served.
struct FloodOrder;

impl HeapOrder<FloodEntry> for FloodOrder {
    #[inline]
    fn higher_than(&self, lhs: &FloodEntry, rhs: &FloodEntry) -> bool {
        lhs.gray > rhs.gray || (lhs.gray == rhs.gray && lhs.seq < rhs.seq)
    }
}

impl RegionGraph {
    /// Grow regions over `levels` (ink intensity, 0 = no ink) restricted to
    /// `mask`.
    pub fn grow(levels: &[u8], mask: &BinaryImage) -> Self {
        let (w, h) = (mask.width(), mask.height());
        debug_assert_eq!(levels.len(), w * h);
        let mut cells = Grid::new(w, h, 1, RegionCell::border());
        for y in 0..h {
            let mask_row = mask.row(y);
            let level_row = &levels[y * w..(y + 1) * w];
            for ((cell, &ink), &level) in cells.row_mut(y).iter_mut().zip(mask_row).zip(level_row) {
                *cell = RegionCell::new(level);
                if !ink {
                    cell.set_finalized();
                }
            }
        }

        let offsets = cells.neighbor_offsets();
        let mut queue: PriorityQueue<FloodEntry> = PriorityQueue::new();
        let mut seq = 0u32;
        let mut next_label = 1u32;
        'seeding: for y in 0..h as isize {
            for x in 0..w as isize {
                let idx = cells.padded_index(x, y);
                let cell = *cells.node(idx);
                if cell.is_finalized() || cell.gray() == 0 {
                    continue;
                }
                let is_peak = offsets.iter().enumerate().all(|(n, &off)| {
                    let other = cells.node((idx as isize + off) as usize).gray();
                    // Neighbours 0..4 precede this cell in raster order.
                    if n < 4 {
                        cell.gray() > other
                    } else {
                        cell.gray() >= other
                    }
                });
                if !is_peak {
                    continue;
                }
                if next_label > RegionCell::MAX_LABEL {
                    warn!("RegionGraph::grow label space exhausted, ignoring further peaks");
                    break 'seeding;
                }
                cells.node_mut(idx).set_label(next_label);
                next_label += 1;
                queue.push(
                    FloodEntry {
                        idx,
                        gray: cell.gray(),
                        seq,
                    },
                    &mut FloodOrder,
                );
                seq += 1;
            }
        }

        let mut edges: Vec<Edge> = Vec::new();
        while let Some(entry) = queue.pop(&mut FloodOrder) {
            let cell = *cells.node(entry.idx);
            if cell.is_finalized() {
                continue;
            }
            cells.node_mut(entry.idx).set_finalized();
            let label = cell.label();
            for &off in &offsets {
                let nidx = (entry.idx as isize + off) as usize;
                let neighbor = *cells.node(nidx);
                let other = neighbor.label();
                if other == 0 {
                    if neighbor.is_finalized() {
                        continue;
                    }
                    cells.node_mut(nidx).set_label(label);
                    queue.push(
                        FloodEntry {
                            idx: nidx,
                            gray: neighbor.gray(),
                            seq,
                        },
                        &mut FloodOrder,
                    );
                    seq += 1;
                } else if other != label {
                    edges.push(Edge::new(label as usize - 1, other as usize - 1));
                }
            }
        }
        edges.sort_unstable();
        edges.dedup();

        let region_count = (next_label - 1) as usize;
        let mut sums = vec![[0.0f64; 2]; region_count];
        let mut regions = vec![Region::default(); region_count];
        for (x, y, cell) in cells.interior_indexed() {
            let label = cell.label() as usize;
            if label == 0 {
                continue;
            }
            sums[label - 1][0] += x as f64;
            sums[label - 1][1] += y as f64;
            regions[label - 1].pixel_count += 1;
        }
        for (region, sum) in regions.iter_mut().zip(&sums) {
            if region.pixel_count > 0 {
                let n = region.pixel_count as f64;
                region.centroid = [(sum[0] / n) as f32, (sum[1] / n) as f32];
            }
        }
        for edge in &edges {
            regions[edge.lesser].neighbors.push(edge.greater);
            regions[edge.greater].neighbors.push(edge.lesser);
        }
        for region in &mut regions {
            region.neighbors.sort_unstable();
        }

        Self { regions, edges }
    }
}

/// Heap order over edge-node indices: lower cost first.
struct EdgeCostOrder<'a> {
    nodes: &'a mut [EdgeNode],
}

impl HeapOrder<usize> for EdgeCostOrder<'_> {
    #[inline]
    fn higher_than(&self, lhs: &usize, rhs: &usize) -> bool {
        self.nodes[*lhs].cost < self.nodes[*rhs].cost
    }

    #[inline]
    fn set_index(&mut self, item: &usize, heap_idx: usize) {
        self.nodes[*item].heap_idx = heap_idx;
    }
}

/// Trace text lines between `first` and `second` over `gray` (intensities in
/// `[0, 1]`, dark ink) restricted to `thick_mask`.
pub fn trace_region_graph(
    gray: &ImageF32,
    thick_mask: &BinaryImage,
    first: &Line2,
    second: &Line2,
    opts: &TracerOptions,
) -> Vec<Polyline> {
    if gray.w != thick_mask.width() || gray.h != thick_mask.height() || gray.is_empty() {
        return Vec::new();
    }
    let Some(down) = super::down_direction(first, second) else {
        return Vec::new();
    };
    let Some(across) = super::across_direction(first, second, down) else {
        return Vec::new();
    };

    let blurred = gaussian_blur(gray, opts.blur_h_sigma, opts.blur_v_sigma);
    let levels: Vec<u8> = blurred
        .data
        .iter()
        .map(|&v| ((1.0 - v) * 255.0).round().clamp(0.0, 255.0) as u8)
        .collect();
    let graph = RegionGraph::grow(&levels, thick_mask);
    let polylines = link_regions(&graph, across, opts.slope_weight);
    debug!(
        "trace_region_graph regions={} edges={} lines={}",
        graph.regions.len(),
        graph.edges.len(),
        polylines.len()
    );
    polylines
}

/// Shortest paths over oriented edges from leftmost to rightmost regions,
/// assigned greedily one to one.
///
/// Each edge node keeps only the source of its cheapest path, so a rightmost
/// region whose best path starts at an already assigned source is left
/// unlinked; its paths from other sources are not tried.
pub fn link_regions(graph: &RegionGraph, across: [f32; 2], slope_weight: f32) -> Vec<Polyline> {
    let regions = &graph.regions;
    let pos = |r: usize| geometry::dot(regions[r].centroid, across);
    let is_leftmost = |r: usize| regions[r].neighbors.iter().all(|&n| pos(n) >= pos(r));
    let is_rightmost = |r: usize| regions[r].neighbors.iter().all(|&n| pos(n) <= pos(r));

    let mut nodes: Vec<EdgeNode> = graph
        .edges
        .iter()
        .map(|&edge| {
            let (tail, head) = if pos(edge.lesser) <= pos(edge.greater) {
                (edge.lesser, edge.greater)
            } else {
                (edge.greater, edge.lesser)
            };
            EdgeNode {
                edge,
                tail,
                head,
                cost: f32::MAX,
                pred: None,
                src: tail,
                heap_idx: EdgeNode::NOT_QUEUED,
                finalized: false,
            }
        })
        .collect();
    let step = |node: &EdgeNode| {
        geometry::sub(regions[node.head].centroid, regions[node.tail].centroid)
    };
    let slope_cost = |s: [f32; 2]| slope_weight * (1.0 - cos_between(&s, &across));

    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); regions.len()];
    for (i, node) in nodes.iter().enumerate() {
        outgoing[node.tail].push(i);
    }

    let mut queue: PriorityQueue<usize> = PriorityQueue::new();
    let mut order = EdgeCostOrder { nodes: &mut nodes };
    for i in 0..order.nodes.len() {
        let tail = order.nodes[i].tail;
        if !is_leftmost(tail) {
            continue;
        }
        order.nodes[i].cost = slope_cost(step(&order.nodes[i]));
        queue.push(i, &mut order);
    }

    while let Some(i) = queue.pop(&mut order) {
        order.nodes[i].heap_idx = EdgeNode::NOT_QUEUED;
        order.nodes[i].finalized = true;
        let cur_step = step(&order.nodes[i]);
        let (cost, src, head) = (order.nodes[i].cost, order.nodes[i].src, order.nodes[i].head);
        for &j in &outgoing[head] {
            if order.nodes[j].finalized {
                continue;
            }
            let next_step = step(&order.nodes[j]);
            let turn_cost = 1.0 - cos_between(&cur_step, &next_step);
            let new_cost = cost + turn_cost + slope_cost(next_step);
            if new_cost >= order.nodes[j].cost {
                continue;
            }
            let node = &mut order.nodes[j];
            node.cost = new_cost;
            node.pred = Some(i);
            node.src = src;
            if node.heap_idx != EdgeNode::NOT_QUEUED {
                let heap_idx = node.heap_idx;
                queue.reposition(heap_idx, &mut order);
            } else {
                queue.push(j, &mut order);
            }
        }
    }

    // Best incoming path per rightmost region.
    let mut best: Vec<Option<usize>> = vec![None; regions.len()];
    for (i, node) in nodes.iter().enumerate() {
        if !node.finalized || !is_rightmost(node.head) {
            continue;
        }
        let current = best[node.head];
        match current {
            Some(b) if nodes[b].cost <= node.cost => {}
            _ => best[node.head] = Some(i),
        }
    }
    let mut candidates: Vec<usize> = best.into_iter().flatten().collect();
    candidates.sort_by(|&a, &b| nodes[a].cost.total_cmp(&nodes[b].cost));

    let mut src_used = vec![false; regions.len()];
    let mut dst_used = vec![false; regions.len()];
    let mut polylines = Vec::new();
    for end in candidates {
        let (src, dst) = (nodes[end].src, nodes[end].head);
        if src_used[src] || dst_used[dst] {
            continue;
        }
        src_used[src] = true;
        dst_used[dst] = true;

        let mut chain = vec![regions[dst].centroid];
        let mut cur = Some(end);
        while let Some(i) = cur {
            chain.push(regions[nodes[i].tail].centroid);
            cur = nodes[i].pred;
        }
        chain.reverse();
        polylines.push(chain);
    }
    polylines
}
