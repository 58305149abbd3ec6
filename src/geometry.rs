//! Small 2D geometry toolkit shared by the bounds detector, tracers and the
//! snake refiner. Points are plain `[f32; 2]`; affine maps use `nalgebra`.
use log::warn;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

pub const EPS: f32 = 1e-6;

/// Ordered sequence of points, front to back. No implied closure.
pub type Polyline = Vec<[f32; 2]>;

#[inline]
pub fn add(a: [f32; 2], b: [f32; 2]) -> [f32; 2] {
    [a[0] + b[0], a[1] + b[1]]
}

#[inline]
pub fn sub(a: [f32; 2], b: [f32; 2]) -> [f32; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

#[inline]
pub fn scale(a: [f32; 2], s: f32) -> [f32; 2] {
    [a[0] * s, a[1] * s]
}

#[inline]
pub fn dot(a: [f32; 2], b: [f32; 2]) -> f32 {
    a[0] * b[0] + a[1] * b[1]
}

/// z component of the 3D cross product.
#[inline]
pub fn cross(a: [f32; 2], b: [f32; 2]) -> f32 {
    a[0] * b[1] - a[1] * b[0]
}

#[inline]
pub fn norm(a: [f32; 2]) -> f32 {
    dot(a, a).sqrt()
}

#[inline]
pub fn distance(a: [f32; 2], b: [f32; 2]) -> f32 {
    norm(sub(a, b))
}

/// Unit vector or `None` for (near) zero input.
#[inline]
pub fn normalized(a: [f32; 2]) -> Option<[f32; 2]> {
    let len = norm(a);
    (len > EPS).then(|| scale(a, 1.0 / len))
}

#[inline]
pub fn lerp(a: [f32; 2], b: [f32; 2], t: f32) -> [f32; 2] {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]
}

/// Sum of segment lengths.
pub fn polyline_length(polyline: &[[f32; 2]]) -> f32 {
    polyline.windows(2).map(|w| distance(w[0], w[1])).sum()
}

/// Reverse `polyline` if it runs right to left.
pub fn orient_left_to_right(polyline: &mut Polyline) {
    if let (Some(front), Some(back)) = (polyline.first(), polyline.last()) {
        if front[0] > back[0] {
            polyline.reverse();
        }
    }
}

/// Straight line through two points. Also used as a finite segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line2 {
    pub p1: [f32; 2],
    pub p2: [f32; 2],
}

impl Line2 {
    pub fn new(p1: [f32; 2], p2: [f32; 2]) -> Self {
        Self { p1, p2 }
    }

    /// Vertical line `x = const` spanning `[0, height]`.
    pub fn vertical(x: f32, height: f32) -> Self {
        Self::new([x, 0.0], [x, height])
    }

    #[inline]
    pub fn delta(&self) -> [f32; 2] {
        sub(self.p2, self.p1)
    }

    #[inline]
    pub fn length(&self) -> f32 {
        norm(self.delta())
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.length() <= EPS
    }

    #[inline]
    pub fn point_at(&self, t: f32) -> [f32; 2] {
        lerp(self.p1, self.p2, t)
    }

    pub fn unit_direction(&self) -> Option<[f32; 2]> {
        normalized(self.delta())
    }

    /// Signed perpendicular distance; the sign follows
    /// `cross(p2 - p1, p - p1)`.
    pub fn signed_distance(&self, p: [f32; 2]) -> f32 {
        let len = self.length();
        if len <= EPS {
            return distance(self.p1, p);
        }
        cross(self.delta(), sub(p, self.p1)) / len
    }

    /// x coordinate where the (infinite) line crosses horizontal `y`.
    pub fn x_at_y(&self, y: f32) -> Option<f32> {
        let d = self.delta();
        if d[1].abs() <= EPS {
            return None;
        }
        let t = (y - self.p1[1]) / d[1];
        Some(self.p1[0] + t * d[0])
    }

    /// Extend the line so that it spans from `y = 0` to `y = height`.
    /// Lines that are (near) horizontal are returned unchanged.
    pub fn spanning_height(&self, height: f32) -> Self {
        match (self.x_at_y(0.0), self.x_at_y(height)) {
            (Some(top), Some(bottom)) => Self::new([top, 0.0], [bottom, height]),
            _ => *self,
        }
    }

    pub fn mapped(&self, map: &AffineMap) -> Self {
        Self::new(map.apply(self.p1), map.apply(self.p2))
    }
}

/// Horizontal and vertical resolution of an image in dots per inch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dpi {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Dpi {
    pub fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.horizontal.is_finite()
            && self.vertical.is_finite()
            && self.horizontal > 0.0
            && self.vertical > 0.0
    }
}

impl Default for Dpi {
    fn default() -> Self {
        Self::new(300.0, 300.0)
    }
}

/// Axis-aligned content rectangle in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ContentRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn mapped(&self, map: &AffineMap) -> Self {
        let a = map.apply([self.x, self.y]);
        let b = map.apply([self.x + self.width, self.y + self.height]);
        let x0 = a[0].min(b[0]);
        let y0 = a[1].min(b[1]);
        Self::new(x0, y0, (a[0] - b[0]).abs(), (a[1] - b[1]).abs())
    }
}

/// 2D affine transform stored as a homogeneous 3×3 matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineMap {
    pub m: Matrix3<f32>,
}

impl AffineMap {
    pub fn identity() -> Self {
        Self {
            m: Matrix3::identity(),
        }
    }

    pub fn scaling(sx: f32, sy: f32) -> Self {
        Self {
            m: Matrix3::new(sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0),
        }
    }

    #[inline]
    pub fn apply(&self, p: [f32; 2]) -> [f32; 2] {
        let v = self.m * Vector3::new(p[0], p[1], 1.0);
        [v[0], v[1]]
    }

    pub fn apply_polyline(&self, polyline: &[[f32; 2]]) -> Polyline {
        polyline.iter().map(|&p| self.apply(p)).collect()
    }

    /// Inverse map; a singular matrix falls back to identity.
    pub fn inverse(&self) -> Self {
        match self.m.try_inverse() {
            Some(m) => Self { m },
            None => {
                warn!("AffineMap::inverse singular transform, using identity");
                Self::identity()
            }
        }
    }
}
