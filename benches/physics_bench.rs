use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use impulse2d::*;
use std::hint::black_box;

const DT: f32 = 1.0 / 60.0;

fn build_stack_world(columns: usize, rows: usize) -> PhysicsWorld {
    let mut world = PhysicsWorld::new(Vec2::new(0.0, -10.0));
    let ground = world.create_body(Body::new(BodyKind::Static, Vec2::new(0.0, -0.5), 0.0));
    world.create_fixture(
        ground,
        Fixture::new(Shape::boxed(columns as f32 * 2.0 + 10.0, 0.5)).with_friction(0.6),
    );

    for col in 0..columns {
        for row in 0..rows {
            let x = col as f32 * 1.5 - columns as f32 * 0.75;
            let y = 0.55 + row as f32 * 1.05;
            let body = world.create_body(Body::new(BodyKind::Dynamic, Vec2::new(x, y), 0.0));
            world.create_fixture(
                body,
                Fixture::new(Shape::boxed(0.5, 0.5)).with_friction(0.6),
            );
        }
    }
    world
}

fn bench_world_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_step");
    for &(columns, rows) in &[(4usize, 4usize), (8, 8), (16, 8)] {
        let count = columns * rows;
        group.bench_with_input(
            BenchmarkId::new("stack", count),
            &(columns, rows),
            |b, &(columns, rows)| {
                b.iter(|| {
                    let mut world = build_stack_world(columns, rows);
                    for _ in 0..10 {
                        world.step(black_box(DT));
                    }
                    world
                })
            },
        );
    }
    group.finish();
}

fn bench_broadphase_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadphase");
    for &count in &[128usize, 512, 2048] {
        group.bench_with_input(BenchmarkId::new("churn", count), &count, |b, &count| {
            b.iter(|| {
                let mut bp: BroadPhase<usize> = BroadPhase::new();
                let mut ids = Vec::with_capacity(count);
                for i in 0..count {
                    let x = (i % 64) as f32 * 1.5;
                    let y = (i / 64) as f32 * 1.5;
                    let aabb = Aabb::new(Vec2::new(x, y), Vec2::new(x + 1.0, y + 1.0));
                    ids.push(bp.create_proxy(aabb, i));
                }
                let mut pairs = 0usize;
                bp.update_pairs(|_, _| pairs += 1);
                for (i, &id) in ids.iter().enumerate() {
                    let x = (i % 64) as f32 * 1.5 + 0.8;
                    let y = (i / 64) as f32 * 1.5;
                    let aabb = Aabb::new(Vec2::new(x, y), Vec2::new(x + 1.0, y + 1.0));
                    bp.move_proxy(id, aabb, Vec2::new(0.8, 0.0));
                }
                bp.update_pairs(|_, _| pairs += 1);
                black_box(pairs)
            })
        });
    }
    group.finish();
}

fn bench_ray_casts(c: &mut Criterion) {
    let world = build_stack_world(16, 8);
    c.bench_function("ray_cast_closest", |b| {
        b.iter(|| {
            let mut hits = 0;
            for i in 0..64 {
                let x = i as f32 * 0.4 - 12.0;
                if world
                    .ray_cast_closest(Vec2::new(x, 20.0), Vec2::new(x, -1.0))
                    .is_some()
                {
                    hits += 1;
                }
            }
            black_box(hits)
        })
    });
}

criterion_group!(
    benches,
    bench_world_step,
    bench_broadphase_churn,
    bench_ray_casts
);
criterion_main!(benches);
