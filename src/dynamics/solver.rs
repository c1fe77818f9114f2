//! Sequential-impulse contact solver.
//!
//! Each step rebuilds one [`ContactConstraint`] per touching contact,
//! warm-starts from the impulses cached in the manifolds, iterates the
//! velocity constraints (friction first, then the normal LCP), and finally
//! runs non-linear Gauss-Seidel position correction on the body sweeps.

use glam::{Mat2, Vec2};

use crate::{
    collision::{
        contact::Contact,
        manifold::{ManifoldKind, WorldManifold},
    },
    config::{
        BLOCK_SOLVER_MAX_CONDITION, LINEAR_SLOP, MAX_LINEAR_CORRECTION, MAX_MANIFOLD_POINTS,
        VELOCITY_THRESHOLD,
    },
    core::{body::Body, fixture::Fixture, types::Transform},
    utils::{
        allocator::{Arena, EntityId},
        math::{cross, cross_sv, cross_vs},
    },
};

/// Solver-local state for one contact point.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintPoint {
    pub r_a: Vec2,
    pub r_b: Vec2,
    pub normal_impulse: f32,
    pub tangent_impulse: f32,
    pub normal_mass: f32,
    pub tangent_mass: f32,
    /// Mass-ratio-preserving effective mass used only by position
    /// correction, so heavy/light pairs converge proportionally.
    pub equalized_mass: f32,
    pub velocity_bias: f32,
}

/// Solver-local state for one touching contact. Rebuilt every step; nothing
/// here survives except the impulses copied back by [`ContactSolver::finalize`].
#[derive(Debug, Clone)]
pub struct ContactConstraint {
    pub contact: EntityId,
    pub body_a: EntityId,
    pub body_b: EntityId,
    pub normal: Vec2,
    pub friction: f32,
    pub points: [ConstraintPoint; MAX_MANIFOLD_POINTS],
    pub point_count: usize,
    /// Whether the 2x2 block solver may be used; cleared when K is
    /// ill-conditioned and the points are solved independently instead.
    pub block_solve: bool,
    k: Mat2,
    normal_mass: Mat2,
    // Position-solver inputs, carried from the manifold.
    kind: ManifoldKind,
    local_normal: Vec2,
    local_point: Vec2,
    local_points: [Vec2; MAX_MANIFOLD_POINTS],
    radius_a: f32,
    radius_b: f32,
    // Mass-normalized inverse masses (one for dynamic, zero for static),
    // used only by position correction so both bodies of a pair move by the
    // same amount regardless of their mass ratio.
    eq_inv_mass_a: f32,
    eq_inv_mass_b: f32,
    eq_inv_inertia_a: f32,
    eq_inv_inertia_b: f32,
}

/// World-space contact geometry recomputed from current transforms during
/// position solving; never cached across iterations.
pub(crate) struct PositionSolverManifold {
    pub normal: Vec2,
    pub point: Vec2,
    pub separation: f32,
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn position_solver_manifold(
    kind: ManifoldKind,
    local_normal: Vec2,
    local_point: Vec2,
    local_points: &[Vec2],
    index: usize,
    radius_a: f32,
    radius_b: f32,
    xf_a: &Transform,
    xf_b: &Transform,
) -> PositionSolverManifold {
    debug_assert!(index < local_points.len());
    match kind {
        ManifoldKind::Circles => {
            let point_a = xf_a.apply(local_point);
            let point_b = xf_b.apply(local_points[0]);
            let d = point_b - point_a;
            let normal = if d.length_squared() > f32::EPSILON {
                d.normalize()
            } else {
                Vec2::X
            };
            PositionSolverManifold {
                normal,
                point: (point_a + point_b) * 0.5,
                separation: d.dot(normal) - radius_a - radius_b,
            }
        }
        ManifoldKind::FaceA => {
            let normal = xf_a.rotation.apply(local_normal);
            let plane_point = xf_a.apply(local_point);
            let clip_point = xf_b.apply(local_points[index]);
            PositionSolverManifold {
                normal,
                point: clip_point,
                separation: (clip_point - plane_point).dot(normal) - radius_a - radius_b,
            }
        }
        ManifoldKind::FaceB => {
            let normal = xf_b.rotation.apply(local_normal);
            let plane_point = xf_b.apply(local_point);
            let clip_point = xf_a.apply(local_points[index]);
            PositionSolverManifold {
                // Flip so the reported normal points from A to B.
                normal: -normal,
                point: clip_point,
                separation: (clip_point - plane_point).dot(normal) - radius_a - radius_b,
            }
        }
    }
}

/// Batches all touching contacts into velocity and position constraints for
/// one step.
pub struct ContactSolver {
    pub constraints: Vec<ContactConstraint>,
}

impl ContactSolver {
    /// Builds constraints for the given contacts. `dt_ratio` scales the
    /// warm-start impulses when the timestep changed between frames;
    /// `warm_starting` zeroes them entirely when disabled.
    pub fn new(
        dt_ratio: f32,
        warm_starting: bool,
        contact_ids: &[EntityId],
        contacts: &Arena<Contact>,
        fixtures: &Arena<Fixture>,
        bodies: &Arena<Body>,
    ) -> Self {
        let mut constraints = Vec::with_capacity(contact_ids.len());

        for &id in contact_ids {
            let contact = match contacts.get(id) {
                Some(c) => c,
                None => continue,
            };
            if !contact.touching || !contact.enabled || contact.manifold.point_count == 0 {
                continue;
            }
            let (fixture_a, fixture_b) = match (
                fixtures.get(contact.fixture_a),
                fixtures.get(contact.fixture_b),
            ) {
                (Some(a), Some(b)) => (a, b),
                _ => continue,
            };
            let (body_a_id, body_b_id) = (fixture_a.body, fixture_b.body);
            let (a, b) = match (bodies.get(body_a_id), bodies.get(body_b_id)) {
                (Some(a), Some(b)) => (a, b),
                _ => continue,
            };

            let manifold = &contact.manifold;
            let radius_a = fixture_a.shape.radius();
            let radius_b = fixture_b.shape.radius();
            let world =
                WorldManifold::new(manifold, &a.transform, radius_a, &b.transform, radius_b);
            let normal = world.normal;
            let tangent = cross_vs(normal, 1.0);

            let mut cc = ContactConstraint {
                contact: id,
                body_a: body_a_id,
                body_b: body_b_id,
                normal,
                friction: contact.friction,
                points: [ConstraintPoint::default(); MAX_MANIFOLD_POINTS],
                point_count: manifold.point_count,
                block_solve: false,
                k: Mat2::ZERO,
                normal_mass: Mat2::ZERO,
                kind: manifold.kind,
                local_normal: manifold.local_normal,
                local_point: manifold.local_point,
                local_points: [Vec2::ZERO; MAX_MANIFOLD_POINTS],
                radius_a,
                radius_b,
                eq_inv_mass_a: a.mass * a.inv_mass,
                eq_inv_mass_b: b.mass * b.inv_mass,
                eq_inv_inertia_a: a.mass * a.inv_inertia,
                eq_inv_inertia_b: b.mass * b.inv_inertia,
            };

            for j in 0..manifold.point_count {
                let mp = &manifold.points[j];
                cc.local_points[j] = mp.local_point;

                let point = &mut cc.points[j];
                point.r_a = world.points[j] - a.sweep.c;
                point.r_b = world.points[j] - b.sweep.c;

                let rn_a = cross(point.r_a, normal);
                let rn_b = cross(point.r_b, normal);
                let k_normal = a.inv_mass
                    + b.inv_mass
                    + a.inv_inertia * rn_a * rn_a
                    + b.inv_inertia * rn_b * rn_b;
                debug_assert!(k_normal > f32::EPSILON);
                point.normal_mass = 1.0 / k_normal;

                // Equalized mass pairs with the mass-normalized inverse
                // masses above, preserving mass ratios in position
                // correction.
                let k_equalized = cc.eq_inv_mass_a
                    + cc.eq_inv_mass_b
                    + cc.eq_inv_inertia_a * rn_a * rn_a
                    + cc.eq_inv_inertia_b * rn_b * rn_b;
                point.equalized_mass = if k_equalized > f32::EPSILON {
                    1.0 / k_equalized
                } else {
                    0.0
                };

                let rt_a = cross(point.r_a, tangent);
                let rt_b = cross(point.r_b, tangent);
                let k_tangent = a.inv_mass
                    + b.inv_mass
                    + a.inv_inertia * rt_a * rt_a
                    + b.inv_inertia * rt_b * rt_b;
                debug_assert!(k_tangent > f32::EPSILON);
                point.tangent_mass = 1.0 / k_tangent;

                // Restitution bias, only above the approach-speed threshold
                // so resting contacts do not vibrate.
                let dv = b.velocity.linear + cross_sv(b.velocity.angular, point.r_b)
                    - a.velocity.linear
                    - cross_sv(a.velocity.angular, point.r_a);
                let v_rel = normal.dot(dv);
                if v_rel < -VELOCITY_THRESHOLD {
                    point.velocity_bias = -contact.restitution * v_rel;
                }

                if warm_starting {
                    point.normal_impulse = dt_ratio * mp.normal_impulse;
                    point.tangent_impulse = dt_ratio * mp.tangent_impulse;
                }
            }

            if cc.point_count == 2 {
                let rn1_a = cross(cc.points[0].r_a, normal);
                let rn1_b = cross(cc.points[0].r_b, normal);
                let rn2_a = cross(cc.points[1].r_a, normal);
                let rn2_b = cross(cc.points[1].r_b, normal);

                let k11 = a.inv_mass
                    + b.inv_mass
                    + a.inv_inertia * rn1_a * rn1_a
                    + b.inv_inertia * rn1_b * rn1_b;
                let k22 = a.inv_mass
                    + b.inv_mass
                    + a.inv_inertia * rn2_a * rn2_a
                    + b.inv_inertia * rn2_b * rn2_b;
                let k12 = a.inv_mass
                    + b.inv_mass
                    + a.inv_inertia * rn1_a * rn2_a
                    + b.inv_inertia * rn1_b * rn2_b;

                if k11 * k11 < BLOCK_SOLVER_MAX_CONDITION * (k11 * k22 - k12 * k12) {
                    cc.k = Mat2::from_cols(Vec2::new(k11, k12), Vec2::new(k12, k22));
                    cc.normal_mass = cc.k.inverse();
                    cc.block_solve = true;
                }
                // Otherwise K is ill-conditioned (nearly redundant points);
                // the points are solved independently.
            }

            constraints.push(cc);
        }

        Self { constraints }
    }

    /// Applies the carried-forward impulses so the velocity iterations start
    /// from last frame's solution.
    pub fn warm_start(&self, bodies: &mut Arena<Body>) {
        for cc in &self.constraints {
            let (a, b) = match bodies.get2_mut(cc.body_a, cc.body_b) {
                Some(pair) => pair,
                None => continue,
            };
            let tangent = cross_vs(cc.normal, 1.0);
            for point in cc.points.iter().take(cc.point_count) {
                let impulse = point.normal_impulse * cc.normal + point.tangent_impulse * tangent;
                a.velocity.linear -= a.inv_mass * impulse;
                a.velocity.angular -= a.inv_inertia * cross(point.r_a, impulse);
                b.velocity.linear += b.inv_mass * impulse;
                b.velocity.angular += b.inv_inertia * cross(point.r_b, impulse);
            }
        }
    }

    /// One Gauss-Seidel sweep over all constraints: friction impulses first,
    /// clamped by the current normal impulse, then the normal LCP.
    pub fn solve_velocity_constraints(&mut self, bodies: &mut Arena<Body>) {
        for cc in &mut self.constraints {
            let (a, b) = match bodies.get2_mut(cc.body_a, cc.body_b) {
                Some(pair) => pair,
                None => continue,
            };
            let mut va = a.velocity.linear;
            let mut wa = a.velocity.angular;
            let mut vb = b.velocity.linear;
            let mut wb = b.velocity.angular;

            let normal = cc.normal;
            let tangent = cross_vs(normal, 1.0);
            let friction = cc.friction;

            // Coulomb friction, updated incrementally against the current
            // normal impulse.
            for point in cc.points.iter_mut().take(cc.point_count) {
                let dv = vb + cross_sv(wb, point.r_b) - va - cross_sv(wa, point.r_a);
                let vt = dv.dot(tangent);
                let lambda = point.tangent_mass * -vt;

                let max_friction = friction * point.normal_impulse;
                let new_impulse =
                    (point.tangent_impulse + lambda).clamp(-max_friction, max_friction);
                let lambda = new_impulse - point.tangent_impulse;
                point.tangent_impulse = new_impulse;

                let impulse = lambda * tangent;
                va -= a.inv_mass * impulse;
                wa -= a.inv_inertia * cross(point.r_a, impulse);
                vb += b.inv_mass * impulse;
                wb += b.inv_inertia * cross(point.r_b, impulse);
            }

            if cc.point_count == 1 || !cc.block_solve {
                for point in cc.points.iter_mut().take(cc.point_count) {
                    let dv = vb + cross_sv(wb, point.r_b) - va - cross_sv(wa, point.r_a);
                    let vn = dv.dot(normal);
                    let lambda = -point.normal_mass * (vn - point.velocity_bias);

                    let new_impulse = (point.normal_impulse + lambda).max(0.0);
                    let lambda = new_impulse - point.normal_impulse;
                    point.normal_impulse = new_impulse;

                    let impulse = lambda * normal;
                    va -= a.inv_mass * impulse;
                    wa -= a.inv_inertia * cross(point.r_a, impulse);
                    vb += b.inv_mass * impulse;
                    wb += b.inv_inertia * cross(point.r_b, impulse);
                }
            } else {
                // Two-point LCP solved exactly by case enumeration:
                //   vn = K x + b,  x >= 0,  vn >= 0,  x . vn = 0
                // The four cases (both active, one active, none) are tried in
                // order and the first feasible solution is applied.
                let accumulated = Vec2::new(cc.points[0].normal_impulse, cc.points[1].normal_impulse);
                debug_assert!(accumulated.x >= 0.0 && accumulated.y >= 0.0);

                let dv1 =
                    vb + cross_sv(wb, cc.points[0].r_b) - va - cross_sv(wa, cc.points[0].r_a);
                let dv2 = vb + cross_sv(wb, cc.points[1].r_b) - va - cross_sv(wa, cc.points[1].r_a);
                let vn1 = dv1.dot(normal);
                let vn2 = dv2.dot(normal);

                let mut rhs = Vec2::new(
                    vn1 - cc.points[0].velocity_bias,
                    vn2 - cc.points[1].velocity_bias,
                );
                rhs -= cc.k * accumulated;

                let solution = 'cases: {
                    // Case 1: both points remain in contact.
                    let x = -(cc.normal_mass * rhs);
                    if x.x >= 0.0 && x.y >= 0.0 {
                        break 'cases Some(x);
                    }
                    // Case 2: point 1 active, point 2 separating.
                    let x = Vec2::new(-cc.points[0].normal_mass * rhs.x, 0.0);
                    let vn2 = cc.k.col(0).y * x.x + rhs.y;
                    if x.x >= 0.0 && vn2 >= 0.0 {
                        break 'cases Some(x);
                    }
                    // Case 3: point 2 active, point 1 separating.
                    let x = Vec2::new(0.0, -cc.points[1].normal_mass * rhs.y);
                    let vn1 = cc.k.col(1).x * x.y + rhs.x;
                    if x.y >= 0.0 && vn1 >= 0.0 {
                        break 'cases Some(x);
                    }
                    // Case 4: both separating.
                    if rhs.x >= 0.0 && rhs.y >= 0.0 {
                        break 'cases Some(Vec2::ZERO);
                    }
                    // Degenerate; keep the accumulated impulses as they are.
                    None
                };

                if let Some(x) = solution {
                    let d = x - accumulated;
                    let p1 = d.x * normal;
                    let p2 = d.y * normal;
                    va -= a.inv_mass * (p1 + p2);
                    wa -= a.inv_inertia
                        * (cross(cc.points[0].r_a, p1) + cross(cc.points[1].r_a, p2));
                    vb += b.inv_mass * (p1 + p2);
                    wb += b.inv_inertia
                        * (cross(cc.points[0].r_b, p1) + cross(cc.points[1].r_b, p2));
                    cc.points[0].normal_impulse = x.x;
                    cc.points[1].normal_impulse = x.y;
                }
            }

            a.velocity.linear = va;
            a.velocity.angular = wa;
            b.velocity.linear = vb;
            b.velocity.angular = wb;
        }
    }

    /// Copies the solved impulses back into the live manifolds so the next
    /// step's contact update can warm-start from them.
    pub fn finalize(&self, contacts: &mut Arena<Contact>) {
        for cc in &self.constraints {
            if let Some(contact) = contacts.get_mut(cc.contact) {
                for j in 0..cc.point_count {
                    contact.manifold.points[j].normal_impulse = cc.points[j].normal_impulse;
                    contact.manifold.points[j].tangent_impulse = cc.points[j].tangent_impulse;
                }
            }
        }
    }

    /// One non-linear Gauss-Seidel position sweep over the body sweeps.
    /// Separations are recomputed from current positions each time; the
    /// Baumgarte-clamped correction is applied through the equalized mass and
    /// the transforms are re-derived immediately. Returns whether the worst
    /// remaining separation is within tolerance.
    pub fn solve_position_constraints(&self, bodies: &mut Arena<Body>, baumgarte: f32) -> bool {
        let mut min_separation: f32 = 0.0;

        for cc in &self.constraints {
            let (a, b) = match bodies.get2_mut(cc.body_a, cc.body_b) {
                Some(pair) => pair,
                None => continue,
            };

            for j in 0..cc.point_count {
                let xf_a = a.sweep.transform_at(1.0);
                let xf_b = b.sweep.transform_at(1.0);
                let psm = position_solver_manifold(
                    cc.kind,
                    cc.local_normal,
                    cc.local_point,
                    &cc.local_points,
                    j,
                    cc.radius_a,
                    cc.radius_b,
                    &xf_a,
                    &xf_b,
                );

                let r_a = psm.point - a.sweep.c;
                let r_b = psm.point - b.sweep.c;
                min_separation = min_separation.min(psm.separation);

                let correction = (baumgarte * (psm.separation + LINEAR_SLOP))
                    .clamp(-MAX_LINEAR_CORRECTION, 0.0);
                let impulse = -cc.points[j].equalized_mass * correction;
                let p = impulse * psm.normal;

                a.sweep.c -= cc.eq_inv_mass_a * p;
                a.sweep.a -= cc.eq_inv_inertia_a * cross(r_a, p);
                a.synchronize_transform();

                b.sweep.c += cc.eq_inv_mass_b * p;
                b.sweep.a += cc.eq_inv_inertia_b * cross(r_b, p);
                b.synchronize_transform();
            }
        }

        min_separation >= -1.5 * LINEAR_SLOP
    }
}
