use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    collision::{
        narrowphase::find_max_separation,
        shapes::{CircleShape, EdgeShape, PolygonShape, Shape},
    },
    core::types::Transform,
};

/// Segment cast input: the ray goes from `p1` toward `p2`, clipped to
/// `max_fraction` of that span.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RayCastInput {
    pub p1: Vec2,
    pub p2: Vec2,
    pub max_fraction: f32,
}

/// Segment cast hit: fraction along the input segment plus the surface
/// normal at the hit point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RayCastOutput {
    pub normal: Vec2,
    pub fraction: f32,
}

/// Boolean overlap test between two shape children, used by sensor contacts
/// instead of manifold generation. Exact distance tests cover the circle
/// pairs; convex SAT covers the polygon and edge pairs. Radii are added
/// symmetrically, matching the manifold generators.
pub fn test_overlap(
    shape_a: &Shape,
    child_a: usize,
    xf_a: &Transform,
    shape_b: &Shape,
    child_b: usize,
    xf_b: &Transform,
) -> bool {
    match (shape_a, shape_b) {
        (Shape::Circle(a), Shape::Circle(b)) => circles_overlap(a, xf_a, b, xf_b),
        (Shape::Polygon(a), Shape::Circle(b)) => polygon_circle_overlap(a, xf_a, b, xf_b),
        (Shape::Circle(a), Shape::Polygon(b)) => polygon_circle_overlap(b, xf_b, a, xf_a),
        (Shape::Edge(a), Shape::Circle(b)) => edge_circle_overlap(a, xf_a, b, xf_b),
        (Shape::Circle(a), Shape::Edge(b)) => edge_circle_overlap(b, xf_b, a, xf_a),
        (Shape::Chain(a), Shape::Circle(b)) => {
            edge_circle_overlap(&a.child_edge(child_a), xf_a, b, xf_b)
        }
        (Shape::Circle(a), Shape::Chain(b)) => {
            edge_circle_overlap(&b.child_edge(child_b), xf_b, a, xf_a)
        }
        (Shape::Polygon(a), Shape::Polygon(b)) => polygons_overlap(a, xf_a, b, xf_b),
        (Shape::Edge(a), Shape::Polygon(b)) => {
            polygons_overlap(&PolygonShape::from_edge(a), xf_a, b, xf_b)
        }
        (Shape::Polygon(a), Shape::Edge(b)) => {
            polygons_overlap(a, xf_a, &PolygonShape::from_edge(b), xf_b)
        }
        (Shape::Chain(a), Shape::Polygon(b)) => polygons_overlap(
            &PolygonShape::from_edge(&a.child_edge(child_a)),
            xf_a,
            b,
            xf_b,
        ),
        (Shape::Polygon(a), Shape::Chain(b)) => polygons_overlap(
            a,
            xf_a,
            &PolygonShape::from_edge(&b.child_edge(child_b)),
            xf_b,
        ),
        // Edge/chain pairs carry no mass on either side and never collide.
        _ => false,
    }
}

fn circles_overlap(a: &CircleShape, xf_a: &Transform, b: &CircleShape, xf_b: &Transform) -> bool {
    let d = xf_b.apply(b.center) - xf_a.apply(a.center);
    let r = a.radius + b.radius;
    d.length_squared() <= r * r
}

fn polygon_circle_overlap(
    poly: &PolygonShape,
    xf_a: &Transform,
    circle: &CircleShape,
    xf_b: &Transform,
) -> bool {
    let c_local = xf_a.apply_inverse(xf_b.apply(circle.center));
    let r = poly.radius + circle.radius;
    closest_on_polygon_distance_squared(poly, c_local) <= r * r
}

fn edge_circle_overlap(
    edge: &EdgeShape,
    xf_a: &Transform,
    circle: &CircleShape,
    xf_b: &Transform,
) -> bool {
    let q = xf_a.apply_inverse(xf_b.apply(circle.center));
    let r = edge.radius + circle.radius;
    segment_distance_squared(edge.vertex1, edge.vertex2, q) <= r * r
}

fn polygons_overlap(
    a: &PolygonShape,
    xf_a: &Transform,
    b: &PolygonShape,
    xf_b: &Transform,
) -> bool {
    let total_radius = a.radius + b.radius;
    let (_, separation_a) = find_max_separation(a, xf_a, b, xf_b);
    if separation_a > total_radius {
        return false;
    }
    let (_, separation_b) = find_max_separation(b, xf_b, a, xf_a);
    separation_b <= total_radius
}

/// Squared distance from a point to a polygon, zero when inside.
fn closest_on_polygon_distance_squared(poly: &PolygonShape, point: Vec2) -> f32 {
    let count = poly.vertices.len();
    let mut max_separation = f32::MIN;
    let mut best = 0;
    for i in 0..count {
        let s = poly.normals[i].dot(point - poly.vertices[i]);
        if s > max_separation {
            max_separation = s;
            best = i;
        }
    }
    if max_separation <= 0.0 {
        return 0.0;
    }
    segment_distance_squared(
        poly.vertices[best],
        poly.vertices[(best + 1) % count],
        point,
    )
}

fn segment_distance_squared(a: Vec2, b: Vec2, point: Vec2) -> f32 {
    let e = b - a;
    let len_sq = e.length_squared();
    if len_sq < f32::EPSILON {
        return (point - a).length_squared();
    }
    let t = ((point - a).dot(e) / len_sq).clamp(0.0, 1.0);
    (point - (a + t * e)).length_squared()
}
