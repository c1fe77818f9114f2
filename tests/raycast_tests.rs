use approx::assert_relative_eq;
use impulse2d::*;

fn world_with_targets() -> (PhysicsWorld, EntityId, EntityId) {
    let mut world = PhysicsWorld::new(Vec2::ZERO);

    let near_body = world.create_body(Body::new(BodyKind::Static, Vec2::new(4.0, 0.0), 0.0));
    let near = world.create_fixture(near_body, Fixture::new(Shape::circle(Vec2::ZERO, 1.0)));

    let far_body = world.create_body(Body::new(BodyKind::Static, Vec2::new(10.0, 0.0), 0.0));
    let far = world.create_fixture(far_body, Fixture::new(Shape::boxed(1.0, 1.0)));

    (world, near, far)
}

#[test]
fn closest_hit_wins() {
    let (world, near, _far) = world_with_targets();
    let hit = world
        .ray_cast_closest(Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0))
        .expect("ray should hit the near circle");
    assert_eq!(hit.fixture, near);
    // Circle surface at x = 3.
    assert_relative_eq!(hit.point.x, 3.0, epsilon = 1e-4);
    assert_relative_eq!(hit.normal.x, -1.0, epsilon = 1e-4);
    assert_relative_eq!(hit.fraction, 3.0 / 20.0, epsilon = 1e-4);
}

#[test]
fn ray_reaches_the_far_target_when_aimed_past_the_near_one() {
    let (world, _near, far) = world_with_targets();
    // Fire above the circle but through the box.
    let hit = world
        .ray_cast_closest(Vec2::new(0.0, 0.8), Vec2::new(20.0, 0.8))
        .expect("ray should hit the far box");
    assert_eq!(hit.fixture, far);
    assert_relative_eq!(hit.point.x, 9.0, epsilon = 1e-3);
}

#[test]
fn misses_return_none() {
    let (world, _, _) = world_with_targets();
    assert!(world
        .ray_cast_closest(Vec2::new(0.0, 5.0), Vec2::new(20.0, 5.0))
        .is_none());
}

#[test]
fn edge_shapes_are_hittable_from_both_sides() {
    let mut world = PhysicsWorld::new(Vec2::ZERO);
    let body = world.create_body(Body::new(BodyKind::Static, Vec2::ZERO, 0.0));
    world.create_fixture(
        body,
        Fixture::new(Shape::Edge(EdgeShape::new(
            Vec2::new(-2.0, 1.0),
            Vec2::new(2.0, 1.0),
        ))),
    );

    let from_above = world
        .ray_cast_closest(Vec2::new(0.0, 3.0), Vec2::new(0.0, -3.0))
        .expect("hit from above");
    assert!(from_above.normal.y > 0.99);

    let from_below = world
        .ray_cast_closest(Vec2::new(0.0, -3.0), Vec2::new(0.0, 3.0))
        .expect("hit from below");
    assert!(from_below.normal.y < -0.99);
}

#[test]
fn aabb_query_sees_only_nearby_fixtures() {
    let (world, near, far) = world_with_targets();
    let mut seen = Vec::new();
    world.query_aabb(
        &Aabb::new(Vec2::new(2.0, -2.0), Vec2::new(6.0, 2.0)),
        |fixture, _child| {
            seen.push(fixture);
            true
        },
    );
    assert!(seen.contains(&near));
    assert!(!seen.contains(&far));
}
