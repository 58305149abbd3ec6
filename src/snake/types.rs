use crate::geometry::{self, EPS};

/// One snake node: a centre on the text line and the half-thickness of the
/// line at that point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnakeNode {
    pub center: [f32; 2],
    pub rib_half_length: f32,
}

/// Chain of nodes ordered along the traced curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Snake {
    pub nodes: Vec<SnakeNode>,
    /// Iterations left, shared by all refinement passes.
    pub iterations_remaining: usize,
}

impl Snake {
    /// Resample `polyline` at equal arc-length steps of about `spacing`.
    /// The last polyline point always becomes the last node.
    pub fn from_polyline(
        polyline: &[[f32; 2]],
        spacing: f32,
        rib_half_length: f32,
        iterations: usize,
    ) -> Self {
        let mut nodes = Vec::new();
        let total = geometry::polyline_length(polyline);
        if let (Some(&first), Some(&last)) = (polyline.first(), polyline.last()) {
            let segments = if total <= EPS || spacing <= EPS {
                0
            } else {
                ((total / spacing).round() as usize).max(1)
            };
            nodes.push(first);
            if segments > 0 {
                let step = total / segments as f32;
                let mut seg = 0usize;
                let mut seg_start = 0.0f32;
                for i in 1..segments {
                    let target = step * i as f32;
                    while seg + 1 < polyline.len() - 1
                        && seg_start + geometry::distance(polyline[seg], polyline[seg + 1]) < target
                    {
                        seg_start += geometry::distance(polyline[seg], polyline[seg + 1]);
                        seg += 1;
                    }
                    let seg_len = geometry::distance(polyline[seg], polyline[seg + 1]);
                    let t = if seg_len <= EPS {
                        0.0
                    } else {
                        ((target - seg_start) / seg_len).clamp(0.0, 1.0)
                    };
                    nodes.push(geometry::lerp(polyline[seg], polyline[seg + 1], t));
                }
                nodes.push(last);
            }
        }
        Self {
            nodes: nodes
                .into_iter()
                .map(|center| SnakeNode {
                    center,
                    rib_half_length,
                })
                .collect(),
            iterations_remaining: iterations,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn to_polyline(&self) -> Vec<[f32; 2]> {
        self.nodes.iter().map(|n| n.center).collect()
    }
}

/// Arc-length bookkeeping over the current node centres.
#[derive(Clone, Debug)]
pub struct SnakeLength {
    arc_length_at_node: Vec<f32>,
    total: f32,
    avg_segment_length: f32,
}

impl SnakeLength {
    pub fn new(snake: &Snake) -> Self {
        let mut arc_length_at_node = Vec::with_capacity(snake.len());
        let mut total = 0.0f32;
        let mut prev: Option<[f32; 2]> = None;
        for node in &snake.nodes {
            if let Some(p) = prev {
                total += geometry::distance(p, node.center);
            }
            arc_length_at_node.push(total);
            prev = Some(node.center);
        }
        let segments = snake.len().saturating_sub(1);
        let avg_segment_length = if segments == 0 {
            0.0
        } else {
            total / segments as f32
        };
        Self {
            arc_length_at_node,
            total,
            avg_segment_length,
        }
    }

    #[inline]
    pub fn total(&self) -> f32 {
        self.total
    }

    #[inline]
    pub fn avg_segment_length(&self) -> f32 {
        self.avg_segment_length
    }

    #[inline]
    pub fn arc_length_at(&self, node: usize) -> f32 {
        self.arc_length_at_node[node]
    }

    /// Position of `node` along the snake in `[0, 1]`.
    pub fn arc_fraction(&self, node: usize) -> f32 {
        if self.total > EPS {
            self.arc_length_at_node[node] / self.total
        } else if self.arc_length_at_node.len() > 1 {
            node as f32 / (self.arc_length_at_node.len() - 1) as f32
        } else {
            0.0
        }
    }
}

/// Local tangent and the normal pointing "down" the page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrenetFrame {
    pub unit_tangent: [f32; 2],
    pub unit_down_normal: [f32; 2],
}

impl FrenetFrame {
    /// Frames for every node. Tangents average the adjacent unit segments;
    /// normals are flipped to agree with `unit_down`.
    pub fn for_snake(snake: &Snake, unit_down: [f32; 2]) -> Vec<FrenetFrame> {
        let fallback_tangent = [unit_down[1], -unit_down[0]];
        let centers: Vec<[f32; 2]> = snake.nodes.iter().map(|n| n.center).collect();
        let unit_segment = |i: usize| {
            geometry::normalized(geometry::sub(centers[i + 1], centers[i])).unwrap_or([0.0, 0.0])
        };
        (0..centers.len())
            .map(|i| {
                let mut sum = [0.0f32; 2];
                if i > 0 {
                    sum = geometry::add(sum, unit_segment(i - 1));
                }
                if i + 1 < centers.len() {
                    sum = geometry::add(sum, unit_segment(i));
                }
                let unit_tangent = geometry::normalized(sum).unwrap_or(fallback_tangent);
                let mut normal = [unit_tangent[1], -unit_tangent[0]];
                if geometry::dot(normal, unit_down) < 0.0 {
                    normal = geometry::scale(normal, -1.0);
                }
                FrenetFrame {
                    unit_tangent,
                    unit_down_normal: normal,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resampling_keeps_endpoints_and_spacing() {
        let polyline = vec![[0.0, 0.0], [30.0, 0.0], [30.0, 70.0]];
        let snake = Snake::from_polyline(&polyline, 20.0, 4.0, 10);
        assert_eq!(snake.len(), 6);
        assert_eq!(snake.nodes[0].center, [0.0, 0.0]);
        assert_eq!(snake.nodes[5].center, [30.0, 70.0]);
        assert!((snake.nodes[2].center[0] - 30.0).abs() < 1e-4);
        assert!((snake.nodes[2].center[1] - 10.0).abs() < 1e-4);
        assert!(snake.nodes.iter().all(|n| n.rib_half_length == 4.0));
        assert_eq!(snake.iterations_remaining, 10);
    }

    #[test]
    fn degenerate_polyline_becomes_single_node() {
        let snake = Snake::from_polyline(&[[5.0, 5.0], [5.0, 5.0]], 20.0, 4.0, 1);
        assert_eq!(snake.len(), 1);
        assert!(Snake::from_polyline(&[], 20.0, 4.0, 1).is_empty());
    }

    #[test]
    fn frames_point_down() {
        let snake = Snake::from_polyline(&[[40.0, 0.0], [0.0, 0.0]], 20.0, 4.0, 1);
        let frames = FrenetFrame::for_snake(&snake, [0.0, 1.0]);
        assert_eq!(frames.len(), 3);
        for f in &frames {
            assert!((f.unit_down_normal[1] - 1.0).abs() < 1e-6);
            assert!((f.unit_tangent[0] + 1.0).abs() < 1e-6);
        }
        let length = SnakeLength::new(&snake);
        assert_eq!(length.total(), 40.0);
        assert_eq!(length.avg_segment_length(), 20.0);
        assert_eq!(length.arc_fraction(1), 0.5);
    }
}
