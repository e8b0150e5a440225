//! Decomposition helpers for usvg transforms.

use usvg::Transform;

/// Rotation of a transform in degrees.
pub fn rotation_degrees(t: &Transform) -> f32 {
    t.ky.atan2(t.sx).to_degrees()
}

/// Uniform scale factor of a transform (square root of the area scale).
pub fn uniform_scale(t: &Transform) -> f32 {
    (t.sx * t.sy - t.kx * t.ky).abs().sqrt()
}

/// Map a point through a transform.
pub fn map_point(t: &Transform, x: f32, y: f32) -> (f32, f32) {
    (t.sx * x + t.kx * y + t.tx, t.ky * x + t.sy * y + t.ty)
}
