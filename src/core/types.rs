use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 2D rotation stored as sine/cosine of the angle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rot {
    pub s: f32,
    pub c: f32,
}

impl Default for Rot {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Rot {
    pub const IDENTITY: Self = Self { s: 0.0, c: 1.0 };

    pub fn from_angle(angle: f32) -> Self {
        Self {
            s: angle.sin(),
            c: angle.cos(),
        }
    }

    pub fn angle(&self) -> f32 {
        self.s.atan2(self.c)
    }

    /// Rotates a vector from local into world orientation.
    pub fn apply(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x - self.s * v.y, self.s * v.x + self.c * v.y)
    }

    /// Rotates a vector from world into local orientation.
    pub fn apply_inverse(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x + self.s * v.y, -self.s * v.x + self.c * v.y)
    }

    /// Composes two rotations: `self * other`.
    pub fn mul(&self, other: Rot) -> Rot {
        Rot {
            s: self.s * other.c + self.c * other.s,
            c: self.c * other.c - self.s * other.s,
        }
    }

    /// Composes the inverse of this rotation with another: `self^-1 * other`.
    pub fn mul_t(&self, other: Rot) -> Rot {
        Rot {
            s: self.c * other.s - self.s * other.c,
            c: self.c * other.c + self.s * other.s,
        }
    }
}

/// Rigid transform mapping shape-local coordinates to world coordinates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    pub rotation: Rot,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        rotation: Rot::IDENTITY,
    };

    pub fn new(position: Vec2, angle: f32) -> Self {
        Self {
            position,
            rotation: Rot::from_angle(angle),
        }
    }

    /// Maps a local point into world space.
    pub fn apply(&self, v: Vec2) -> Vec2 {
        self.rotation.apply(v) + self.position
    }

    /// Maps a world point into local space.
    pub fn apply_inverse(&self, v: Vec2) -> Vec2 {
        self.rotation.apply_inverse(v - self.position)
    }

    /// Frame composition: `self * other` maps other-local into world.
    pub fn mul(&self, other: &Transform) -> Transform {
        Transform {
            position: self.rotation.apply(other.position) + self.position,
            rotation: self.rotation.mul(other.rotation),
        }
    }

    /// Relative frame: `self^-1 * other` maps other-local into self-local.
    pub fn mul_t(&self, other: &Transform) -> Transform {
        Transform {
            position: self.rotation.apply_inverse(other.position - self.position),
            rotation: self.rotation.mul_t(other.rotation),
        }
    }
}

/// Linear and angular velocity of a rigid body.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec2,
    pub angular: f32,
}

/// Mass, center of mass, and rotational inertia computed from a shape.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MassData {
    pub mass: f32,
    pub center: Vec2,
    pub inertia: f32,
}

/// Motion of a body's center of mass over one step. `c0`/`a0` are the state
/// at the start of the step, `c`/`a` the current state; `local_center` is the
/// center of mass in body-local coordinates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Sweep {
    pub local_center: Vec2,
    pub c0: Vec2,
    pub c: Vec2,
    pub a0: f32,
    pub a: f32,
}

impl Sweep {
    /// Interpolated transform at `beta` in [0, 1] along the sweep.
    pub fn transform_at(&self, beta: f32) -> Transform {
        let position = self.c0.lerp(self.c, beta);
        let angle = (1.0 - beta) * self.a0 + beta * self.a;
        let rotation = Rot::from_angle(angle);
        Transform {
            position: position - rotation.apply(self.local_center),
            rotation,
        }
    }

    /// Advances the start of the sweep to `alpha`, keeping the endpoint.
    pub fn advance(&mut self, alpha: f32) {
        self.c0 = self.c0.lerp(self.c, alpha);
        self.a0 = (1.0 - alpha) * self.a0 + alpha * self.a;
    }

    /// Wraps the angles into [-pi, pi] to keep trigonometry accurate.
    pub fn normalize(&mut self) {
        let two_pi = 2.0 * std::f32::consts::PI;
        let d = two_pi * (self.a0 / two_pi).floor();
        self.a0 -= d;
        self.a -= d;
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Aabb {
    pub lower: Vec2,
    pub upper: Vec2,
}

impl Aabb {
    pub fn new(lower: Vec2, upper: Vec2) -> Self {
        let aabb = Self { lower, upper };
        debug_assert!(aabb.is_valid());
        aabb
    }

    pub fn is_valid(&self) -> bool {
        let d = self.upper - self.lower;
        d.x >= 0.0 && d.y >= 0.0 && self.lower.is_finite() && self.upper.is_finite()
    }

    pub fn center(&self) -> Vec2 {
        (self.lower + self.upper) * 0.5
    }

    pub fn extents(&self) -> Vec2 {
        (self.upper - self.lower) * 0.5
    }

    /// Perimeter, used as the tree's insertion cost heuristic.
    pub fn perimeter(&self) -> f32 {
        let d = self.upper - self.lower;
        2.0 * (d.x + d.y)
    }

    pub fn combine(&self, other: &Aabb) -> Aabb {
        Aabb {
            lower: self.lower.min(other.lower),
            upper: self.upper.max(other.upper),
        }
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &Aabb) -> bool {
        self.lower.x <= other.lower.x
            && self.lower.y <= other.lower.y
            && other.upper.x <= self.upper.x
            && other.upper.y <= self.upper.y
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d1 = other.lower - self.upper;
        let d2 = self.lower - other.upper;
        d1.x <= 0.0 && d1.y <= 0.0 && d2.x <= 0.0 && d2.y <= 0.0
    }

    /// Returns this box grown by `margin` on every side.
    pub fn expand(&self, margin: f32) -> Aabb {
        let r = Vec2::splat(margin);
        Aabb {
            lower: self.lower - r,
            upper: self.upper + r,
        }
    }

    /// Intersects the segment `p1 -> p2` with the box, returning the entry
    /// fraction along the segment if it hits.
    pub fn ray_intersect(&self, p1: Vec2, p2: Vec2) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        let d = p2 - p1;

        for i in 0..2 {
            if d[i].abs() < f32::EPSILON {
                if p1[i] < self.lower[i] || self.upper[i] < p1[i] {
                    return None;
                }
            } else {
                let inv_d = 1.0 / d[i];
                let mut t1 = (self.lower[i] - p1[i]) * inv_d;
                let mut t2 = (self.upper[i] - p1[i]) * inv_d;
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }
                t_min = t_min.max(t1);
                t_max = t_max.min(t2);
                if t_min > t_max {
                    return None;
                }
            }
        }

        if t_min < 0.0 || 1.0 < t_min {
            return None;
        }
        Some(t_min)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            lower: Vec2::ZERO,
            upper: Vec2::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rot_round_trips_vectors() {
        let q = Rot::from_angle(0.7);
        let v = Vec2::new(1.0, -2.0);
        let back = q.apply_inverse(q.apply(v));
        assert!((back - v).length() < 1e-6);
        assert!((q.angle() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn transform_composition_matches_sequential_application() {
        let a = Transform::new(Vec2::new(1.0, 2.0), 0.5);
        let b = Transform::new(Vec2::new(-3.0, 0.5), -1.2);
        let p = Vec2::new(0.25, 0.75);
        let composed = a.mul(&b).apply(p);
        let sequential = a.apply(b.apply(p));
        assert!((composed - sequential).length() < 1e-5);

        let rel = a.mul_t(&b);
        assert!((a.mul(&rel).apply(p) - b.apply(p)).length() < 1e-5);
    }

    #[test]
    fn aabb_union_contains_both_inputs() {
        let a = Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(0.5, 2.0));
        let b = Aabb::new(Vec2::new(0.0, -3.0), Vec2::new(4.0, 0.0));
        let u = a.combine(&b);
        assert!(u.is_valid());
        assert!(u.contains(&a));
        assert!(u.contains(&b));
    }

    #[test]
    fn aabb_overlap_is_symmetric_and_touch_inclusive() {
        let a = Aabb::new(Vec2::ZERO, Vec2::ONE);
        let b = Aabb::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        let c = Aabb::new(Vec2::new(1.1, 0.0), Vec2::new(2.0, 1.0));
        assert!(a.overlaps(&b) && b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn aabb_segment_cast_finds_entry_fraction() {
        let b = Aabb::new(Vec2::new(1.0, -1.0), Vec2::new(2.0, 1.0));
        let t = b
            .ray_intersect(Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0))
            .expect("segment crosses the box");
        assert!((t - 0.25).abs() < 1e-6);
        assert!(b
            .ray_intersect(Vec2::new(0.0, 2.0), Vec2::new(4.0, 2.0))
            .is_none());
    }

    #[test]
    fn sweep_interpolates_between_endpoints() {
        let sweep = Sweep {
            local_center: Vec2::ZERO,
            c0: Vec2::ZERO,
            c: Vec2::new(2.0, 0.0),
            a0: 0.0,
            a: 1.0,
        };
        let xf = sweep.transform_at(0.5);
        assert!((xf.position - Vec2::new(1.0, 0.0)).length() < 1e-6);
        assert!((xf.rotation.angle() - 0.5).abs() < 1e-6);
    }
}
