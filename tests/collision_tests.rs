use approx::assert_relative_eq;
use impulse2d::collision::narrowphase::{
    collide_circles, collide_edge_and_polygon, collide_polygon_and_circle, collide_polygons,
};
use impulse2d::*;

#[test]
fn circle_circle_overlap_matches_expected_geometry() {
    // Circle A at the origin, circle B at (1.5, 0), both radius 1:
    // one point, normal along +x, separation -0.5.
    let a = CircleShape::new(Vec2::ZERO, 1.0);
    let b = CircleShape::new(Vec2::ZERO, 1.0);
    let xf_a = Transform::IDENTITY;
    let xf_b = Transform::new(Vec2::new(1.5, 0.0), 0.0);

    let manifold = collide_circles(&a, &xf_a, &b, &xf_b);
    assert_eq!(manifold.point_count, 1);

    let world = WorldManifold::new(&manifold, &xf_a, 1.0, &xf_b, 1.0);
    assert_relative_eq!(world.normal.x, 1.0, epsilon = 1e-5);
    assert_relative_eq!(world.normal.y, 0.0, epsilon = 1e-5);
    assert_relative_eq!(world.separations[0], -0.5, epsilon = 1e-5);
}

#[test]
fn box_box_face_contact_produces_two_points() {
    let a = PolygonShape::boxed(1.0, 1.0);
    let b = PolygonShape::boxed(1.0, 1.0);
    let xf_a = Transform::IDENTITY;
    let xf_b = Transform::new(Vec2::new(1.9, 0.0), 0.0);

    let manifold = collide_polygons(&a, &xf_a, &b, &xf_b);
    assert_eq!(manifold.point_count, 2);
    assert!(matches!(
        manifold.kind,
        ManifoldKind::FaceA | ManifoldKind::FaceB
    ));
    assert!(
        manifold.local_normal.x.abs() > 0.99,
        "local normal should be along x, got {:?}",
        manifold.local_normal
    );
}

#[test]
fn box_box_touching_inside_skin_still_collides() {
    // 2x2 boxes at (0,0) and (2.01,0): the 0.01 gap sits inside the summed
    // 0.02 skin radius, so a (shallow) contact is reported.
    let a = PolygonShape::boxed(1.0, 1.0);
    let b = PolygonShape::boxed(1.0, 1.0);
    let manifold = collide_polygons(
        &a,
        &Transform::IDENTITY,
        &b,
        &Transform::new(Vec2::new(2.01, 0.0), 0.0),
    );
    assert!(manifold.point_count >= 1);

    // Just outside the summed skin: no contact.
    let manifold = collide_polygons(
        &a,
        &Transform::IDENTITY,
        &b,
        &Transform::new(Vec2::new(2.03, 0.0), 0.0),
    );
    assert_eq!(manifold.point_count, 0);
}

#[test]
fn all_manifolds_respect_the_point_count_bound() {
    let box_shape = PolygonShape::boxed(1.0, 0.5);
    let circle = CircleShape::new(Vec2::ZERO, 0.75);
    let edge = EdgeShape::new(Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0));

    for i in 0..24 {
        let angle = i as f32 * 0.26;
        let offset = Vec2::new((i as f32 * 0.37).sin() * 2.0, (i as f32 * 0.61).cos() * 2.0);
        let xf_a = Transform::IDENTITY;
        let xf_b = Transform::new(offset, angle);

        let m1 = collide_polygons(&box_shape, &xf_a, &box_shape, &xf_b);
        let m2 = collide_polygon_and_circle(&box_shape, &xf_a, &circle, &xf_b);
        let m3 = collide_edge_and_polygon(&edge, &xf_a, &box_shape, &xf_b);
        for m in [m1, m2, m3] {
            assert!(m.point_count <= 2);
        }
    }
}

#[test]
fn reference_face_hysteresis_is_stable_for_symmetric_overlap() {
    // Perfectly symmetric boxes: whichever face wins must keep winning when
    // the configuration barely changes.
    let a = PolygonShape::boxed(1.0, 1.0);
    let b = PolygonShape::boxed(1.0, 1.0);
    let xf_a = Transform::IDENTITY;

    let kind0 = collide_polygons(&a, &xf_a, &b, &Transform::new(Vec2::new(1.9, 0.0), 0.0)).kind;
    for i in 1..20 {
        let x = 1.9 + i as f32 * 1e-5;
        let kind = collide_polygons(&a, &xf_a, &b, &Transform::new(Vec2::new(x, 0.0), 0.0)).kind;
        assert_eq!(kind, kind0, "reference face flipped at x = {x}");
    }
}

#[test]
fn contact_ids_are_stable_when_reference_polygon_flips() {
    // A wide box against a tall box: nudge the pair so the reference face
    // role could change; point ids must stay matchable (same key set).
    let a = PolygonShape::boxed(2.0, 0.5);
    let b = PolygonShape::boxed(0.5, 2.0);
    let xf_a = Transform::IDENTITY;

    let m1 = collide_polygons(&a, &xf_a, &b, &Transform::new(Vec2::new(0.0, 2.45), 0.0));
    let m2 = collide_polygons(&a, &xf_a, &b, &Transform::new(Vec2::new(0.001, 2.45), 0.0));
    assert!(m1.point_count > 0 && m2.point_count > 0);

    let keys1: Vec<u32> = (0..m1.point_count).map(|i| m1.points[i].id.key()).collect();
    let keys2: Vec<u32> = (0..m2.point_count).map(|i| m2.points[i].id.key()).collect();
    for key in &keys2 {
        assert!(
            keys1.contains(key),
            "point id {key:#010x} appeared from nowhere after a tiny nudge"
        );
    }
}

#[test]
fn chain_children_collide_like_their_edges() {
    let chain = ChainShape::open(&[
        Vec2::new(-4.0, 0.0),
        Vec2::new(0.0, 0.0),
        Vec2::new(4.0, 0.0),
    ]);
    let shape = Shape::Chain(chain);
    let circle = Shape::circle(Vec2::ZERO, 0.5);
    let xf_b = Transform::new(Vec2::new(-2.0, 0.4), 0.0);

    assert_eq!(shape.child_count(), 2);
    assert!(test_overlap(&shape, 0, &Transform::IDENTITY, &circle, 0, &xf_b));
    assert!(!test_overlap(&shape, 1, &Transform::IDENTITY, &circle, 0, &xf_b));
}
