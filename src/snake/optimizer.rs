//! Discrete moves of one snake iteration.
//!
//! Every move picks, by dynamic programming along the chain, one of three
//! displacements `{0, +f, -f}` per node (or per end rib) that minimises the
//! snake energy. Ties keep the zero displacement, so a snake sitting in a
//! flat energy landscape does not drift.
use super::energy::SnakeEnergy;
use super::types::{FrenetFrame, Snake, SnakeLength};
use crate::geometry::{self, EPS};

const NUM_CANDIDATES: usize = 3;

/// Per-iteration view of a snake: step factor, frames and arc lengths.
pub struct Optimizer {
    factor: f32,
    frames: Vec<FrenetFrame>,
    length: SnakeLength,
}

impl Optimizer {
    pub fn new(snake: &Snake, unit_down: [f32; 2], factor: f32) -> Self {
        Self {
            factor,
            frames: FrenetFrame::for_snake(snake, unit_down),
            length: SnakeLength::new(snake),
        }
    }

    #[inline]
    fn displacements(&self) -> [f32; NUM_CANDIDATES] {
        [0.0, self.factor, -self.factor]
    }

    /// Vary the head and tail rib half-lengths jointly; interior ribs are
    /// interpolated by arc-length fraction. Returns `true` when a non-zero
    /// adjustment won.
    pub fn thickness_adjustment(&self, snake: &mut Snake, energy: &SnakeEnergy<'_>) -> bool {
        let n = snake.len();
        if n == 0 {
            return false;
        }
        let head = snake.nodes[0].rib_half_length;
        let tail = snake.nodes[n - 1].rib_half_length;
        let deltas = [0.0, 0.5 * self.factor, -0.5 * self.factor];

        let mut best_energy = f32::MAX;
        let mut best = (0usize, 0usize);
        for (hi, &dh) in deltas.iter().enumerate() {
            let head_rib = head + dh;
            if head_rib <= EPS {
                continue;
            }
            for (ti, &dt) in deltas.iter().enumerate() {
                let tail_rib = tail + dt;
                if tail_rib <= EPS {
                    continue;
                }
                let total: f32 = (0..n)
                    .map(|i| {
                        let rib = self.interpolated_rib(i, head_rib, tail_rib);
                        energy.external(snake.nodes[i].center, self.frames[i].unit_down_normal, rib)
                    })
                    .sum();
                if total < best_energy {
                    best_energy = total;
                    best = (hi, ti);
                }
            }
        }

        let head_rib = head + deltas[best.0];
        let tail_rib = tail + deltas[best.1];
        for i in 0..n {
            snake.nodes[i].rib_half_length = self.interpolated_rib(i, head_rib, tail_rib);
        }
        best != (0, 0)
    }

    fn interpolated_rib(&self, node: usize, head: f32, tail: f32) -> f32 {
        head + (tail - head) * self.length.arc_fraction(node)
    }

    /// Slide interior nodes along their tangents. The end nodes stay put.
    pub fn tangent_movement(&self, snake: &mut Snake, energy: &SnakeEnergy<'_>) -> bool {
        let n = snake.len();
        if n < 3 {
            return false;
        }
        let disp = self.displacements();
        let avg = self.length.avg_segment_length();
        let candidates_of = |i: usize| if i == 0 || i + 1 == n { 1 } else { NUM_CANDIDATES };
        let position = |i: usize, k: usize| {
            geometry::add(
                snake.nodes[i].center,
                geometry::scale(self.frames[i].unit_tangent, disp[k]),
            )
        };
        let external = |i: usize, k: usize| {
            energy.external(
                position(i, k),
                self.frames[i].unit_down_normal,
                snake.nodes[i].rib_half_length,
            )
        };

        let mut cost = vec![[f32::MAX; NUM_CANDIDATES]; n];
        let mut back = vec![[0usize; NUM_CANDIDATES]; n];
        cost[0][0] = external(0, 0);
        for i in 1..n {
            for k in 0..candidates_of(i) {
                let here = position(i, k);
                let ext = external(i, k);
                for j in 0..candidates_of(i - 1) {
                    let c = cost[i - 1][j] + ext + energy.elasticity(position(i - 1, j), here, avg);
                    if c < cost[i][k] {
                        cost[i][k] = c;
                        back[i][k] = j;
                    }
                }
            }
        }

        let mut choice = vec![0usize; n];
        for i in (1..n).rev() {
            choice[i - 1] = back[i][choice[i]];
        }
        self.apply(snake, &choice, |frame| frame.unit_tangent)
    }

    /// Slide all nodes along their normals, with bending measured over the
    /// two preceding nodes.
    pub fn normal_movement(&self, snake: &mut Snake, energy: &SnakeEnergy<'_>) -> bool {
        let n = snake.len();
        if n < 2 {
            return false;
        }
        let disp = self.displacements();
        let avg = self.length.avg_segment_length();
        let position = |i: usize, k: usize| {
            geometry::add(
                snake.nodes[i].center,
                geometry::scale(self.frames[i].unit_down_normal, disp[k]),
            )
        };
        let external = |i: usize, k: usize| {
            energy.external(
                position(i, k),
                self.frames[i].unit_down_normal,
                snake.nodes[i].rib_half_length,
            )
        };

        // State (j, k): node i-1 takes candidate j, node i takes candidate k.
        const S: usize = NUM_CANDIDATES * NUM_CANDIDATES;
        let state = |j: usize, k: usize| j * NUM_CANDIDATES + k;
        let mut cost = vec![[f32::MAX; S]; n];
        let mut back = vec![[0usize; S]; n];

        for j in 0..NUM_CANDIDATES {
            for k in 0..NUM_CANDIDATES {
                cost[1][state(j, k)] =
                    external(0, j) + external(1, k) + energy.elasticity(position(0, j), position(1, k), avg);
            }
        }
        for i in 2..n {
            for j in 0..NUM_CANDIDATES {
                let prev = position(i - 1, j);
                for k in 0..NUM_CANDIDATES {
                    let here = position(i, k);
                    let local = external(i, k) + energy.elasticity(prev, here, avg);
                    let s = state(j, k);
                    for l in 0..NUM_CANDIDATES {
                        let c = cost[i - 1][state(l, j)]
                            + local
                            + energy.bending(position(i - 2, l), prev, here);
                        if c < cost[i][s] {
                            cost[i][s] = c;
                            back[i][s] = l;
                        }
                    }
                }
            }
        }

        let mut best_state = 0usize;
        for s in 1..S {
            if cost[n - 1][s] < cost[n - 1][best_state] {
                best_state = s;
            }
        }
        let mut choice = vec![0usize; n];
        choice[n - 1] = best_state % NUM_CANDIDATES;
        choice[n - 2] = best_state / NUM_CANDIDATES;
        for i in (2..n).rev() {
            let s = state(choice[i - 1], choice[i]);
            choice[i - 2] = back[i][s];
        }
        self.apply(snake, &choice, |frame| frame.unit_down_normal)
    }

    /// Move node `i` by candidate `choice[i]` along `axis(frame_i)`. Returns
    /// `true` when any node moved.
    fn apply(
        &self,
        snake: &mut Snake,
        choice: &[usize],
        axis: impl Fn(&FrenetFrame) -> [f32; 2],
    ) -> bool {
        let disp = self.displacements();
        let mut max_sqdist = 0.0f32;
        for ((node, &k), frame) in snake.nodes.iter_mut().zip(choice).zip(&self.frames) {
            let shift = geometry::scale(axis(frame), disp[k]);
            node.center = geometry::add(node.center, shift);
            max_sqdist = max_sqdist.max(geometry::dot(shift, shift));
        }
        max_sqdist > EPS
    }
}
