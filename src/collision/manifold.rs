use glam::Vec2;

use crate::{
    collision::clipping::ContactId,
    config::{LINEAR_SLOP, MAX_MANIFOLD_POINTS},
    core::types::Transform,
};

/// Which local frame the manifold's `local_normal`/`local_point` live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifoldKind {
    /// Circle-circle: both anchors are circle centers, the normal is derived
    /// from the world positions.
    Circles,
    /// Reference face on shape A; anchors on B.
    FaceA,
    /// Reference face on shape B; anchors on A.
    FaceB,
}

/// One contact point of a manifold. The impulse accumulators persist the
/// previous step's solution for warm starting; `id` is the cross-frame
/// identity used to match them forward.
#[derive(Debug, Clone, Copy)]
pub struct ManifoldPoint {
    pub local_point: Vec2,
    pub normal_impulse: f32,
    pub tangent_impulse: f32,
    pub id: ContactId,
}

impl Default for ManifoldPoint {
    fn default() -> Self {
        Self {
            local_point: Vec2::ZERO,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
            id: ContactId::ZERO,
        }
    }
}

/// Narrow-phase output for one shape pair: up to two contact points plus the
/// shared normal data, all in shape-local frames so the solver can re-derive
/// world geometry from fresher transforms.
#[derive(Debug, Clone, Copy)]
pub struct Manifold {
    pub kind: ManifoldKind,
    pub local_normal: Vec2,
    pub local_point: Vec2,
    pub points: [ManifoldPoint; MAX_MANIFOLD_POINTS],
    pub point_count: usize,
}

impl Default for Manifold {
    fn default() -> Self {
        Self::empty()
    }
}

impl Manifold {
    pub fn empty() -> Self {
        Self {
            kind: ManifoldKind::Circles,
            local_normal: Vec2::ZERO,
            local_point: Vec2::ZERO,
            points: [ManifoldPoint::default(); MAX_MANIFOLD_POINTS],
            point_count: 0,
        }
    }
}

/// World-space view of a manifold: unit normal from A to B and the midpoints
/// between the two skins at each contact.
#[derive(Debug, Clone, Copy)]
pub struct WorldManifold {
    pub normal: Vec2,
    pub points: [Vec2; MAX_MANIFOLD_POINTS],
    pub separations: [f32; MAX_MANIFOLD_POINTS],
}

impl WorldManifold {
    pub fn new(
        manifold: &Manifold,
        xf_a: &Transform,
        radius_a: f32,
        xf_b: &Transform,
        radius_b: f32,
    ) -> Self {
        let mut out = Self {
            normal: Vec2::X,
            points: [Vec2::ZERO; MAX_MANIFOLD_POINTS],
            separations: [0.0; MAX_MANIFOLD_POINTS],
        };
        if manifold.point_count == 0 {
            return out;
        }

        match manifold.kind {
            ManifoldKind::Circles => {
                let point_a = xf_a.apply(manifold.local_point);
                let point_b = xf_b.apply(manifold.points[0].local_point);
                let d = point_b - point_a;
                // Coincident centers fall back to a fixed axis.
                if d.length_squared() > LINEAR_SLOP * LINEAR_SLOP * 1e-4 {
                    out.normal = d.normalize();
                }
                let c_a = point_a + radius_a * out.normal;
                let c_b = point_b - radius_b * out.normal;
                out.points[0] = (c_a + c_b) * 0.5;
                out.separations[0] = (c_b - c_a).dot(out.normal);
            }
            ManifoldKind::FaceA => {
                out.normal = xf_a.rotation.apply(manifold.local_normal);
                let plane_point = xf_a.apply(manifold.local_point);
                for i in 0..manifold.point_count {
                    let clip_point = xf_b.apply(manifold.points[i].local_point);
                    let c_a = clip_point
                        + (radius_a - (clip_point - plane_point).dot(out.normal)) * out.normal;
                    let c_b = clip_point - radius_b * out.normal;
                    out.points[i] = (c_a + c_b) * 0.5;
                    out.separations[i] = (c_b - c_a).dot(out.normal);
                }
            }
            ManifoldKind::FaceB => {
                let normal = xf_b.rotation.apply(manifold.local_normal);
                let plane_point = xf_b.apply(manifold.local_point);
                for i in 0..manifold.point_count {
                    let clip_point = xf_a.apply(manifold.points[i].local_point);
                    let c_b = clip_point
                        + (radius_b - (clip_point - plane_point).dot(normal)) * normal;
                    let c_a = clip_point - radius_a * normal;
                    out.points[i] = (c_a + c_b) * 0.5;
                    out.separations[i] = (c_a - c_b).dot(normal);
                }
                // Report the normal pointing from A toward B.
                out.normal = -normal;
            }
        }

        out
    }
}
