//! Drops a column of boxes onto the ground and prints how the stack settles.
//!
//! Run with `cargo run --example stacking`.

use impulse2d::*;

fn main() {
    let mut world = PhysicsWorld::new(Vec2::new(0.0, -10.0));

    let ground = world.create_body(Body::new(BodyKind::Static, Vec2::new(0.0, -0.5), 0.0));
    world.create_fixture(
        ground,
        Fixture::new(Shape::boxed(20.0, 0.5)).with_friction(0.6),
    );

    let mut boxes = Vec::new();
    for i in 0..10 {
        let body = world.create_body(Body::new(
            BodyKind::Dynamic,
            Vec2::new(0.02 * (i % 2) as f32, 0.6 + i as f32 * 1.1),
            0.0,
        ));
        world.create_fixture(
            body,
            Fixture::new(Shape::boxed(0.5, 0.5))
                .with_density(1.0)
                .with_friction(0.6),
        );
        boxes.push(body);
    }

    let dt = 1.0 / 60.0;
    for step in 0..=300 {
        if step > 0 {
            world.step(dt);
        }
        if step % 60 == 0 {
            let kinetic: f32 = boxes
                .iter()
                .map(|&id| {
                    let b = world.body(id).unwrap();
                    0.5 * b.mass * b.velocity.linear.length_squared()
                })
                .sum();
            println!(
                "t = {:>4.1}s  contacts = {:>2}  kinetic energy = {kinetic:.4}",
                step as f32 * dt,
                world.touching_contact_count(),
            );
        }
    }

    println!("\nfinal stack:");
    for (i, &id) in boxes.iter().enumerate() {
        let c = world.body(id).unwrap().world_center();
        println!("  box {i:>2}: ({:>6.3}, {:>6.3})", c.x, c.y);
    }
}
