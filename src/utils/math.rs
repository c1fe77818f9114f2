//! Additional 2D math helpers layered on top of `glam`.

use glam::{Mat2, Vec2};

/// 2D cross product of two vectors, yielding the scalar z component.
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Cross product of a scalar (z-axis) and a vector: `s x v`.
pub fn cross_sv(s: f32, v: Vec2) -> Vec2 {
    Vec2::new(-s * v.y, s * v.x)
}

/// Cross product of a vector and a scalar (z-axis): `v x s`.
pub fn cross_vs(v: Vec2, s: f32) -> Vec2 {
    Vec2::new(s * v.y, -s * v.x)
}

/// Solves `a * x = b` without forming the inverse, guarding against a
/// singular matrix by returning zero.
pub fn solve22(a: Mat2, b: Vec2) -> Vec2 {
    let a11 = a.col(0).x;
    let a21 = a.col(0).y;
    let a12 = a.col(1).x;
    let a22 = a.col(1).y;
    let mut det = a11 * a22 - a12 * a21;
    if det != 0.0 {
        det = 1.0 / det;
    }
    Vec2::new(det * (a22 * b.x - a12 * b.y), det * (a11 * b.y - a21 * b.x))
}
