//! Angle utilities shared by the RAST finder, the region-graph tracer and the
//! curvature filter.
use std::f32::consts::PI;

#[inline]
pub fn deg_to_rad(deg: f32) -> f32 {
    deg * (PI / 180.0)
}

#[inline]
pub fn rad_to_deg(rad: f32) -> f32 {
    rad * (180.0 / PI)
}

/// Wrap an angle into `[-π, π)`.
#[inline]
pub fn wrap_pi(angle: f32) -> f32 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

/// Computes the unsigned angle between two 2D vectors in radians.
/// Returns a value in [0, π]. Zero if the vectors are parallel
/// and pointing in the same direction; π if they are opposite.
#[inline]
pub fn angle_between(a: &[f32; 2], b: &[f32; 2]) -> f32 {
    cos_between(a, b).acos()
}

/// Cosine of the angle between two vectors, clamped to [-1, 1].
#[inline]
pub fn cos_between(a: &[f32; 2], b: &[f32; 2]) -> f32 {
    let dot = a[0] * b[0] + a[1] * b[1];
    let na = (a[0] * a[0] + a[1] * a[1]).sqrt().max(1e-6);
    let nb = (b[0] * b[0] + b[1] * b[1]).sqrt().max(1e-6);
    (dot / (na * nb)).clamp(-1.0, 1.0)
}

/// Signed turn from `a` to `b` in `(-π, π]`. Positive turns are clockwise on
/// screen (y axis pointing down).
#[inline]
pub fn signed_turn(a: &[f32; 2], b: &[f32; 2]) -> f32 {
    let cross = a[0] * b[1] - a[1] * b[0];
    let dot = a[0] * b[0] + a[1] * b[1];
    cross.atan2(dot)
}
