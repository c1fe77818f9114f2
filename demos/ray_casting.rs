//! Casts a fan of rays at a small scene and prints what they hit.
//!
//! Run with `cargo run --example ray_casting`.

use impulse2d::*;

fn main() {
    let mut world = PhysicsWorld::new(Vec2::ZERO);

    let circle_body = world.create_body(Body::new(BodyKind::Static, Vec2::new(5.0, 2.0), 0.0));
    world.create_fixture(circle_body, Fixture::new(Shape::circle(Vec2::ZERO, 1.0)));

    let box_body = world.create_body(Body::new(
        BodyKind::Static,
        Vec2::new(5.0, -2.0),
        std::f32::consts::FRAC_PI_4,
    ));
    world.create_fixture(box_body, Fixture::new(Shape::boxed(1.0, 1.0)));

    let wall_body = world.create_body(Body::new(BodyKind::Static, Vec2::ZERO, 0.0));
    world.create_fixture(
        wall_body,
        Fixture::new(Shape::Edge(EdgeShape::new(
            Vec2::new(9.0, -5.0),
            Vec2::new(9.0, 5.0),
        ))),
    );

    let origin = Vec2::ZERO;
    for i in 0..=16 {
        let angle = (i as f32 / 16.0 - 0.5) * std::f32::consts::FRAC_PI_2;
        let target = origin + 12.0 * Vec2::new(angle.cos(), angle.sin());
        match world.ray_cast_closest(origin, target) {
            Some(hit) => println!(
                "ray {i:>2}: hit at ({:>6.3}, {:>6.3})  normal ({:>5.2}, {:>5.2})  fraction {:.3}",
                hit.point.x, hit.point.y, hit.normal.x, hit.normal.y, hit.fraction
            ),
            None => println!("ray {i:>2}: no hit"),
        }
    }
}
