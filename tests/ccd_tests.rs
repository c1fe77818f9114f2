//! TOI solver behavior: position-only correction for a single fast body.

use impulse2d::collision::contact::{Contact, ContactKind, NoEvents};
use impulse2d::config::{LINEAR_SLOP, TOI_BAUMGARTE, TOI_POSITION_ITERATIONS};
use impulse2d::*;

/// A fast circle whose sweep this step passed into a thin static edge. The
/// owner detected the tunneling sweep, rolled the body to the overlap
/// configuration, and hands the contact to the TOI solver.
fn tunneling_setup() -> (
    Arena<Body>,
    Arena<Fixture>,
    Arena<Contact>,
    EntityId,
    EntityId,
) {
    let mut bodies = Arena::new();
    let mut fixtures = Arena::new();
    let mut contacts = Arena::new();

    let edge_shape = Shape::Edge(EdgeShape::new(Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0)));
    let edge_body = bodies.insert(Body::new(BodyKind::Static, Vec2::ZERO, 0.0));
    let mut edge_fixture = Fixture::new(edge_shape);
    edge_fixture.body = edge_body;
    let edge_fixture_id = fixtures.insert(edge_fixture);

    let circle_shape = Shape::circle(Vec2::ZERO, 0.25);
    let mut bullet = Body::new(BodyKind::Dynamic, Vec2::new(0.0, 0.1), 0.0);
    bullet.bullet = true;
    bullet.set_mass_data(&circle_shape.compute_mass(1.0));
    bullet.velocity.linear = Vec2::new(0.0, -80.0);
    let bullet_id = bodies.insert(bullet);
    let mut bullet_fixture = Fixture::new(circle_shape);
    bullet_fixture.body = bullet_id;
    let bullet_fixture_id = fixtures.insert(bullet_fixture);

    let mut contact = Contact::new(
        edge_fixture_id,
        bullet_fixture_id,
        0,
        0,
        ContactKind::EdgeCircle,
        0.2,
        0.0,
    );
    let shape_a = fixtures.get(edge_fixture_id).unwrap().shape.clone();
    let shape_b = fixtures.get(bullet_fixture_id).unwrap().shape.clone();
    let xf_a = bodies.get(edge_body).unwrap().transform;
    let xf_b = bodies.get(bullet_id).unwrap().transform;
    contact.update(&shape_a, &xf_a, &shape_b, &xf_b, false, &mut NoEvents);
    assert!(contact.touching, "setup must start in penetration");
    let contact_id = contacts.insert(contact);

    (bodies, fixtures, contacts, bullet_id, contact_id)
}

#[test]
fn toi_solver_ends_with_non_negative_separation() {
    let (mut bodies, fixtures, contacts, bullet_id, contact_id) = tunneling_setup();

    let mut solver = ToiSolver::new(bullet_id);
    solver.initialize(&[contact_id], &contacts, &fixtures);

    let mut converged = false;
    for _ in 0..TOI_POSITION_ITERATIONS {
        if solver.solve(&mut bodies, TOI_BAUMGARTE) {
            converged = true;
            break;
        }
    }
    assert!(converged, "TOI solver hit the iteration cap");

    // The circle surface sits at or above the edge within tolerance.
    let bullet = bodies.get(bullet_id).unwrap();
    let surface = bullet.sweep.c.y - 0.25;
    assert!(
        surface >= -2.0 * LINEAR_SLOP,
        "bullet still penetrating: surface at {surface}"
    );
}

#[test]
fn toi_solver_leaves_velocity_untouched() {
    let (mut bodies, fixtures, contacts, bullet_id, contact_id) = tunneling_setup();
    let before = bodies.get(bullet_id).unwrap().velocity;

    let mut solver = ToiSolver::new(bullet_id);
    solver.initialize(&[contact_id], &contacts, &fixtures);
    for _ in 0..TOI_POSITION_ITERATIONS {
        if solver.solve(&mut bodies, TOI_BAUMGARTE) {
            break;
        }
    }

    let after = bodies.get(bullet_id).unwrap().velocity;
    assert_eq!(before.linear, after.linear);
    assert_eq!(before.angular, after.angular);
}

#[test]
fn toi_solver_never_moves_the_static_geometry() {
    let (mut bodies, fixtures, contacts, bullet_id, contact_id) = tunneling_setup();

    let edge_id = bodies
        .iter()
        .find(|(_, b)| b.is_static())
        .map(|(id, _)| id)
        .unwrap();
    let edge_before = bodies.get(edge_id).unwrap().transform;

    let mut solver = ToiSolver::new(bullet_id);
    solver.initialize(&[contact_id], &contacts, &fixtures);
    for _ in 0..TOI_POSITION_ITERATIONS {
        if solver.solve(&mut bodies, TOI_BAUMGARTE) {
            break;
        }
    }

    let edge_after = bodies.get(edge_id).unwrap().transform;
    assert_eq!(edge_before.position, edge_after.position);
}
