//! Position-only continuous-collision correction.
//!
//! Used for a single fast body flagged by the owner's sweep test. The solver
//! repeats the contact position correction with the other body of every pair
//! held immovable, pushing the fast body back out of penetration without
//! touching any velocity.

use glam::Vec2;

use crate::{
    collision::{contact::Contact, manifold::ManifoldKind},
    config::{LINEAR_SLOP, MAX_LINEAR_CORRECTION, MAX_MANIFOLD_POINTS},
    core::{body::Body, fixture::Fixture},
    dynamics::solver::position_solver_manifold,
    utils::{
        allocator::{Arena, EntityId},
        math::cross,
    },
};

#[derive(Debug, Clone)]
struct ToiConstraint {
    body_a: EntityId,
    body_b: EntityId,
    kind: ManifoldKind,
    local_normal: Vec2,
    local_point: Vec2,
    local_points: [Vec2; MAX_MANIFOLD_POINTS],
    point_count: usize,
    radius_a: f32,
    radius_b: f32,
}

/// Builds one constraint per touching contact of the designated body and
/// solves them by repeated position sweeps until converged or capped.
pub struct ToiSolver {
    toi_body: EntityId,
    constraints: Vec<ToiConstraint>,
}

impl ToiSolver {
    pub fn new(toi_body: EntityId) -> Self {
        Self {
            toi_body,
            constraints: Vec::new(),
        }
    }

    /// Gathers the touching, non-sensor contacts that involve the TOI body.
    pub fn initialize(
        &mut self,
        contact_ids: &[EntityId],
        contacts: &Arena<Contact>,
        fixtures: &Arena<Fixture>,
    ) {
        self.constraints.clear();

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
            if fixture_a.sensor || fixture_b.sensor {
                continue;
            }
            if fixture_a.body != self.toi_body && fixture_b.body != self.toi_body {
                continue;
            }

            let manifold = &contact.manifold;
            let mut local_points = [Vec2::ZERO; MAX_MANIFOLD_POINTS];
            for j in 0..manifold.point_count {
                local_points[j] = manifold.points[j].local_point;
            }
            self.constraints.push(ToiConstraint {
                body_a: fixture_a.body,
                body_b: fixture_b.body,
                kind: manifold.kind,
                local_normal: manifold.local_normal,
                local_point: manifold.local_point,
                local_points,
                point_count: manifold.point_count,
                radius_a: fixture_a.shape.radius(),
                radius_b: fixture_b.shape.radius(),
            });
        }
    }

    /// One position sweep. Only the TOI body receives corrections; the other
    /// body of every pair contributes zero effective mass. Returns whether
    /// the worst separation is within tolerance.
    pub fn solve(&self, bodies: &mut Arena<Body>, baumgarte: f32) -> bool {
        let mut min_separation: f32 = 0.0;

        for tc in &self.constraints {
            let (a, b) = match bodies.get2_mut(tc.body_a, tc.body_b) {
                Some(pair) => pair,
                None => continue,
            };

            // Mass-normalized contributions, with the non-TOI body zeroed so
            // only the fast body moves.
            let (mass_a, inertia_a) = if tc.body_a == self.toi_body {
                (a.mass * a.inv_mass, a.mass * a.inv_inertia)
            } else {
                (0.0, 0.0)
            };
            let (mass_b, inertia_b) = if tc.body_b == self.toi_body {
                (b.mass * b.inv_mass, b.mass * b.inv_inertia)
            } else {
                (0.0, 0.0)
            };

            for j in 0..tc.point_count {
                let xf_a = a.sweep.transform_at(1.0);
                let xf_b = b.sweep.transform_at(1.0);
                let psm = position_solver_manifold(
                    tc.kind,
                    tc.local_normal,
                    tc.local_point,
                    &tc.local_points,
                    j,
                    tc.radius_a,
                    tc.radius_b,
                    &xf_a,
                    &xf_b,
                );

                let r_a = psm.point - a.sweep.c;
                let r_b = psm.point - b.sweep.c;
                min_separation = min_separation.min(psm.separation);

                let correction = (baumgarte * (psm.separation + LINEAR_SLOP))
                    .clamp(-MAX_LINEAR_CORRECTION, 0.0);

                let rn_a = cross(r_a, psm.normal);
                let rn_b = cross(r_b, psm.normal);
                let k = mass_a + mass_b + inertia_a * rn_a * rn_a + inertia_b * rn_b * rn_b;
                let impulse = if k > 0.0 { -correction / k } else { 0.0 };
                let p = impulse * psm.normal;

                a.sweep.c -= mass_a * p;
                a.sweep.a -= inertia_a * cross(r_a, p);
                a.synchronize_transform();

                b.sweep.c += mass_b * p;
                b.sweep.a += inertia_b * cross(r_b, p);
                b.synchronize_transform();
            }
        }

        min_separation >= -1.5 * LINEAR_SLOP
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collision::contact::{Contact, ContactKind, NoEvents},
        collision::shapes::Shape,
        config::TOI_BAUMGARTE,
        core::body::BodyKind,
    };

    #[test]
    fn only_the_toi_body_moves() {
        let mut bodies = Arena::new();
        let mut fixtures = Arena::new();
        let mut contacts = Arena::new();

        // Fast circle overlapping a static box.
        let shape = Shape::circle(Vec2::ZERO, 0.5);
        let mut fast = Body::new(BodyKind::Dynamic, Vec2::new(0.0, 0.2), 0.0);
        fast.set_mass_data(&shape.compute_mass(1.0));
        fast.velocity.linear = Vec2::new(0.0, -50.0);
        let fast_id = bodies.insert(fast);

        let ground_shape = Shape::boxed(5.0, 0.5);
        let ground = Body::new(BodyKind::Static, Vec2::new(0.0, -0.5), 0.0);
        let ground_id = bodies.insert(ground);

        let mut fixture_a = Fixture::new(ground_shape);
        fixture_a.body = ground_id;
        let fa = fixtures.insert(fixture_a);
        let mut fixture_b = Fixture::new(shape);
        fixture_b.body = fast_id;
        let fb = fixtures.insert(fixture_b);

        let mut contact = Contact::new(fa, fb, 0, 0, ContactKind::PolygonCircle, 0.3, 0.0);
        let (sa, xa) = {
            let f = fixtures.get(fa).unwrap();
            (f.shape.clone(), bodies.get(ground_id).unwrap().transform)
        };
        let (sb, xb) = {
            let f = fixtures.get(fb).unwrap();
            (f.shape.clone(), bodies.get(fast_id).unwrap().transform)
        };
        contact.update(&sa, &xa, &sb, &xb, false, &mut NoEvents);
        assert!(contact.touching);
        let c_id = contacts.insert(contact);

        let velocity_before = bodies.get(fast_id).unwrap().velocity.linear;
        let ground_center_before = bodies.get(ground_id).unwrap().sweep.c;

        let mut solver = ToiSolver::new(fast_id);
        solver.initialize(&[c_id], &contacts, &fixtures);
        let mut converged = false;
        for _ in 0..20 {
            if solver.solve(&mut bodies, TOI_BAUMGARTE) {
                converged = true;
                break;
            }
        }
        assert!(converged);

        let fast_body = bodies.get(fast_id).unwrap();
        // Pushed up and out of the ground, velocity untouched.
        assert!(fast_body.sweep.c.y > 0.2);
        assert_eq!(fast_body.velocity.linear, velocity_before);
        assert_eq!(bodies.get(ground_id).unwrap().sweep.c, ground_center_before);
    }
}
