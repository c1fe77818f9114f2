use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    collision::queries::{RayCastInput, RayCastOutput},
    config::{MAX_POLYGON_VERTICES, POLYGON_RADIUS},
    core::types::{Aabb, MassData, Transform},
    utils::math::{cross, cross_vs},
};

/// Solid disc described by a local center and radius.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircleShape {
    pub center: Vec2,
    pub radius: f32,
}

impl CircleShape {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Convex polygon with counter-clockwise vertices and outward edge normals.
/// Carries the standard skin radius so corners behave as slightly rounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonShape {
    pub vertices: Vec<Vec2>,
    pub normals: Vec<Vec2>,
    pub centroid: Vec2,
    pub radius: f32,
}

impl PolygonShape {
    /// Builds a polygon from counter-clockwise convex vertices.
    pub fn new(points: &[Vec2]) -> Self {
        debug_assert!(points.len() >= 3 && points.len() <= MAX_POLYGON_VERTICES);
        let vertices = points.to_vec();
        let normals = edge_normals(&vertices);
        debug_assert!(is_convex_ccw(&vertices));
        let centroid = polygon_centroid(&vertices);
        Self {
            vertices,
            normals,
            centroid,
            radius: POLYGON_RADIUS,
        }
    }

    /// Axis-aligned box with the given half extents, centered at the origin.
    pub fn boxed(half_width: f32, half_height: f32) -> Self {
        Self::new(&[
            Vec2::new(-half_width, -half_height),
            Vec2::new(half_width, -half_height),
            Vec2::new(half_width, half_height),
            Vec2::new(-half_width, half_height),
        ])
    }

    /// Box with the given half extents, offset and rotated in shape-local space.
    pub fn boxed_at(half_width: f32, half_height: f32, center: Vec2, angle: f32) -> Self {
        let xf = Transform::new(center, angle);
        let mut shape = Self::boxed(half_width, half_height);
        for v in &mut shape.vertices {
            *v = xf.apply(*v);
        }
        for n in &mut shape.normals {
            *n = xf.rotation.apply(*n);
        }
        shape.centroid = center;
        shape
    }

    /// Degenerate two-vertex polygon standing in for an edge segment, used by
    /// the edge collision path so it can share the polygon clipping code.
    pub(crate) fn from_edge(edge: &EdgeShape) -> Self {
        let e = edge.vertex2 - edge.vertex1;
        let n = cross_vs(e, 1.0).normalize_or_zero();
        Self {
            vertices: vec![edge.vertex1, edge.vertex2],
            normals: vec![n, -n],
            centroid: (edge.vertex1 + edge.vertex2) * 0.5,
            radius: edge.radius,
        }
    }
}

/// Line segment with optional adjacent "ghost" vertices describing chain
/// connectivity. Ghosts never collide themselves; they only suppress internal
/// edge artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeShape {
    pub vertex1: Vec2,
    pub vertex2: Vec2,
    pub vertex0: Option<Vec2>,
    pub vertex3: Option<Vec2>,
    pub radius: f32,
}

impl EdgeShape {
    pub fn new(vertex1: Vec2, vertex2: Vec2) -> Self {
        Self {
            vertex1,
            vertex2,
            vertex0: None,
            vertex3: None,
            radius: POLYGON_RADIUS,
        }
    }

    pub fn with_ghosts(mut self, vertex0: Option<Vec2>, vertex3: Option<Vec2>) -> Self {
        self.vertex0 = vertex0;
        self.vertex3 = vertex3;
        self
    }
}

/// Sequence of edges, open or closed. Children are edge segments with ghost
/// vertices taken from the neighbors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainShape {
    pub vertices: Vec<Vec2>,
    pub closed: bool,
    pub radius: f32,
}

impl ChainShape {
    pub fn open(vertices: &[Vec2]) -> Self {
        debug_assert!(vertices.len() >= 2);
        Self {
            vertices: vertices.to_vec(),
            closed: false,
            radius: POLYGON_RADIUS,
        }
    }

    pub fn closed(vertices: &[Vec2]) -> Self {
        debug_assert!(vertices.len() >= 3);
        Self {
            vertices: vertices.to_vec(),
            closed: true,
            radius: POLYGON_RADIUS,
        }
    }

    pub fn child_count(&self) -> usize {
        if self.closed {
            self.vertices.len()
        } else {
            self.vertices.len() - 1
        }
    }

    /// Materializes child `index` as an edge with neighbor ghosts filled in.
    pub fn child_edge(&self, index: usize) -> EdgeShape {
        debug_assert!(index < self.child_count());
        let n = self.vertices.len();
        let v1 = self.vertices[index];
        let v2 = self.vertices[(index + 1) % n];

        let vertex0 = if index > 0 {
            Some(self.vertices[index - 1])
        } else if self.closed {
            Some(self.vertices[n - 1])
        } else {
            None
        };
        let vertex3 = if index + 2 < n {
            Some(self.vertices[index + 2])
        } else if self.closed {
            Some(self.vertices[(index + 2) % n])
        } else {
            None
        };

        let mut edge = EdgeShape::new(v1, v2).with_ghosts(vertex0, vertex3);
        edge.radius = self.radius;
        edge
    }
}

/// Collision geometry attached to a fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    Circle(CircleShape),
    Polygon(PolygonShape),
    Edge(EdgeShape),
    Chain(ChainShape),
}

impl Shape {
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Shape::Circle(CircleShape::new(center, radius))
    }

    pub fn boxed(half_width: f32, half_height: f32) -> Self {
        Shape::Polygon(PolygonShape::boxed(half_width, half_height))
    }

    /// Skin radius of the shape (or of any child, for chains).
    pub fn radius(&self) -> f32 {
        match self {
            Shape::Circle(c) => c.radius,
            Shape::Polygon(p) => p.radius,
            Shape::Edge(e) => e.radius,
            Shape::Chain(c) => c.radius,
        }
    }

    pub fn child_count(&self) -> usize {
        match self {
            Shape::Chain(chain) => chain.child_count(),
            _ => 1,
        }
    }

    /// World-space bounding box of child `child` under `xf`.
    pub fn compute_aabb(&self, xf: &Transform, child: usize) -> Aabb {
        match self {
            Shape::Circle(c) => {
                let p = xf.apply(c.center);
                let r = Vec2::splat(c.radius);
                Aabb::new(p - r, p + r)
            }
            Shape::Polygon(p) => {
                let mut lower = xf.apply(p.vertices[0]);
                let mut upper = lower;
                for v in &p.vertices[1..] {
                    let w = xf.apply(*v);
                    lower = lower.min(w);
                    upper = upper.max(w);
                }
                let r = Vec2::splat(p.radius);
                Aabb::new(lower - r, upper + r)
            }
            Shape::Edge(e) => edge_aabb(e, xf),
            Shape::Chain(chain) => edge_aabb(&chain.child_edge(child), xf),
        }
    }

    /// Mass properties for the given density. Edges and chains are static
    /// geometry and report zero mass.
    pub fn compute_mass(&self, density: f32) -> MassData {
        match self {
            Shape::Circle(c) => {
                let mass = density * std::f32::consts::PI * c.radius * c.radius;
                MassData {
                    mass,
                    center: c.center,
                    inertia: mass * (0.5 * c.radius * c.radius + c.center.length_squared()),
                }
            }
            Shape::Polygon(p) => polygon_mass(&p.vertices, density),
            Shape::Edge(e) => MassData {
                mass: 0.0,
                center: (e.vertex1 + e.vertex2) * 0.5,
                inertia: 0.0,
            },
            Shape::Chain(_) => MassData::default(),
        }
    }

    /// Casts a segment against child `child`, in world space.
    pub fn ray_cast(
        &self,
        input: &RayCastInput,
        xf: &Transform,
        child: usize,
    ) -> Option<RayCastOutput> {
        match self {
            Shape::Circle(c) => ray_cast_circle(c, input, xf),
            Shape::Polygon(p) => ray_cast_polygon(p, input, xf),
            Shape::Edge(e) => ray_cast_edge(e, input, xf),
            Shape::Chain(chain) => ray_cast_edge(&chain.child_edge(child), input, xf),
        }
    }
}

fn edge_aabb(edge: &EdgeShape, xf: &Transform) -> Aabb {
    let v1 = xf.apply(edge.vertex1);
    let v2 = xf.apply(edge.vertex2);
    let r = Vec2::splat(edge.radius);
    Aabb::new(v1.min(v2) - r, v1.max(v2) + r)
}

fn edge_normals(vertices: &[Vec2]) -> Vec<Vec2> {
    let count = vertices.len();
    (0..count)
        .map(|i| {
            let edge = vertices[(i + 1) % count] - vertices[i];
            debug_assert!(edge.length_squared() > f32::EPSILON * f32::EPSILON);
            cross_vs(edge, 1.0).normalize_or_zero()
        })
        .collect()
}

fn is_convex_ccw(vertices: &[Vec2]) -> bool {
    let count = vertices.len();
    (0..count).all(|i| {
        let e1 = vertices[(i + 1) % count] - vertices[i];
        let e2 = vertices[(i + 2) % count] - vertices[(i + 1) % count];
        cross(e1, e2) > -1e-6
    })
}

fn polygon_centroid(vertices: &[Vec2]) -> Vec2 {
    let count = vertices.len();
    let mut centroid = Vec2::ZERO;
    let mut area = 0.0;
    let reference = vertices[0];

    for i in 0..count {
        let e1 = vertices[i] - reference;
        let e2 = vertices[(i + 1) % count] - reference;
        let triangle_area = 0.5 * cross(e1, e2);
        area += triangle_area;
        centroid += triangle_area * (e1 + e2) / 3.0;
    }

    debug_assert!(area > f32::EPSILON);
    centroid / area + reference
}

fn polygon_mass(vertices: &[Vec2], density: f32) -> MassData {
    let count = vertices.len();
    let reference = vertices[0];
    let mut center = Vec2::ZERO;
    let mut area = 0.0;
    let mut second_moment = 0.0;
    const K_INV3: f32 = 1.0 / 3.0;

    for i in 0..count {
        let e1 = vertices[i] - reference;
        let e2 = vertices[(i + 1) % count] - reference;
        let d = cross(e1, e2);
        let triangle_area = 0.5 * d;
        area += triangle_area;
        center += triangle_area * K_INV3 * (e1 + e2);

        let intx2 = e1.x * e1.x + e2.x * e1.x + e2.x * e2.x;
        let inty2 = e1.y * e1.y + e2.y * e1.y + e2.y * e2.y;
        second_moment += (0.25 * K_INV3 * d) * (intx2 + inty2);
    }

    let mass = density * area;
    debug_assert!(area > f32::EPSILON);
    center /= area;
    let shape_center = center + reference;

    // Second moment is about `reference`; shift to the shape origin.
    let inertia = density * second_moment
        + mass * (shape_center.length_squared() - center.length_squared());

    MassData {
        mass,
        center: shape_center,
        inertia,
    }
}

fn ray_cast_circle(
    circle: &CircleShape,
    input: &RayCastInput,
    xf: &Transform,
) -> Option<RayCastOutput> {
    let position = xf.apply(circle.center);
    let s = input.p1 - position;
    let b = s.length_squared() - circle.radius * circle.radius;

    let r = input.p2 - input.p1;
    let c = s.dot(r);
    let rr = r.length_squared();
    let sigma = c * c - rr * b;
    if sigma < 0.0 || rr < f32::EPSILON {
        return None;
    }

    let mut t = -(c + sigma.sqrt());
    if 0.0 <= t && t <= input.max_fraction * rr {
        t /= rr;
        return Some(RayCastOutput {
            fraction: t,
            normal: (s + t * r).normalize_or_zero(),
        });
    }
    None
}

fn ray_cast_polygon(
    polygon: &PolygonShape,
    input: &RayCastInput,
    xf: &Transform,
) -> Option<RayCastOutput> {
    // Work in the polygon frame: clip the parameter interval against each
    // face half-plane.
    let p1 = xf.apply_inverse(input.p1);
    let p2 = xf.apply_inverse(input.p2);
    let d = p2 - p1;

    let mut lower = 0.0;
    let mut upper = input.max_fraction;
    let mut index = None;

    for i in 0..polygon.vertices.len() {
        let numerator = polygon.normals[i].dot(polygon.vertices[i] - p1);
        let denominator = polygon.normals[i].dot(d);

        if denominator == 0.0 {
            if numerator < 0.0 {
                return None;
            }
        } else {
            let t = numerator / denominator;
            if denominator < 0.0 && t > lower {
                lower = t;
                index = Some(i);
            } else if denominator > 0.0 && t < upper {
                upper = t;
            }
        }

        if upper < lower {
            return None;
        }
    }

    index.map(|i| RayCastOutput {
        fraction: lower,
        normal: xf.rotation.apply(polygon.normals[i]),
    })
}

fn ray_cast_edge(edge: &EdgeShape, input: &RayCastInput, xf: &Transform) -> Option<RayCastOutput> {
    let p1 = xf.apply_inverse(input.p1);
    let p2 = xf.apply_inverse(input.p2);
    let d = p2 - p1;

    let e = edge.vertex2 - edge.vertex1;
    let normal = Vec2::new(e.y, -e.x).normalize_or_zero();
    if normal == Vec2::ZERO {
        return None;
    }

    let numerator = normal.dot(edge.vertex1 - p1);
    let denominator = normal.dot(d);
    if denominator == 0.0 {
        return None;
    }

    let t = numerator / denominator;
    if t < 0.0 || input.max_fraction < t {
        return None;
    }

    let q = p1 + t * d;
    let rr = e.length_squared();
    if rr == 0.0 {
        return None;
    }
    let s = (q - edge.vertex1).dot(e) / rr;
    if !(0.0..=1.0).contains(&s) {
        return None;
    }

    let world_normal = if numerator > 0.0 { -normal } else { normal };
    Some(RayCastOutput {
        fraction: t,
        normal: xf.rotation.apply(world_normal),
    })
}
