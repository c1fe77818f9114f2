//! Narrow-phase manifold generators, one per unordered shape-type pair.
//!
//! Every generator is a pure function of two shapes and their transforms and
//! fills a caller-owned [`Manifold`]. Shape skin radii are added symmetrically
//! throughout, so polygons collide as if their corners were rounded and the
//! circle and polygon paths share one clipping pipeline.

use glam::Vec2;

use crate::{
    collision::{
        clipping::{clip_segment_to_line, ClipVertex, ContactId, FeatureKind},
        manifold::{Manifold, ManifoldKind},
        shapes::{CircleShape, EdgeShape, PolygonShape},
    },
    config::LINEAR_SLOP,
    core::types::Transform,
    utils::math::cross_vs,
};

/// Hysteresis for the reference-face choice. The incumbent axis keeps the
/// role unless the challenger beats it by a relative and absolute margin;
/// without this the reference face flip-flops between nearly equal axes and
/// the solver jitters.
const RELATIVE_TOL: f32 = 0.98;
const ABSOLUTE_TOL: f32 = 0.001;

/// Circle-circle: a point manifold anchored on both centers. The world normal
/// is derived later from the transforms, with a degenerate-safe fallback for
/// coincident centers.
pub fn collide_circles(
    circle_a: &CircleShape,
    xf_a: &Transform,
    circle_b: &CircleShape,
    xf_b: &Transform,
) -> Manifold {
    let mut manifold = Manifold::empty();

    let p_a = xf_a.apply(circle_a.center);
    let p_b = xf_b.apply(circle_b.center);
    let d = p_b - p_a;
    let radius = circle_a.radius + circle_b.radius;
    if d.length_squared() > radius * radius {
        return manifold;
    }

    manifold.kind = ManifoldKind::Circles;
    manifold.local_point = circle_a.center;
    manifold.points[0].local_point = circle_b.center;
    manifold.points[0].id = ContactId::ZERO;
    manifold.point_count = 1;
    manifold
}

/// Polygon-circle: finds the face of maximum separation, then clamps the
/// circle center to the nearest edge region (vertex / vertex / interior).
pub fn collide_polygon_and_circle(
    polygon_a: &PolygonShape,
    xf_a: &Transform,
    circle_b: &CircleShape,
    xf_b: &Transform,
) -> Manifold {
    let mut manifold = Manifold::empty();

    // Circle center in the polygon's frame.
    let c = xf_b.apply(circle_b.center);
    let c_local = xf_a.apply_inverse(c);

    let radius = polygon_a.radius + circle_b.radius;
    let count = polygon_a.vertices.len();
    let mut normal_index = 0;
    let mut separation = f32::MIN;

    for i in 0..count {
        let s = polygon_a.normals[i].dot(c_local - polygon_a.vertices[i]);
        if s > radius {
            // Separating axis found.
            return manifold;
        }
        if s > separation {
            separation = s;
            normal_index = i;
        }
    }

    let v1 = polygon_a.vertices[normal_index];
    let v2 = polygon_a.vertices[(normal_index + 1) % count];

    if separation < f32::EPSILON {
        // Center inside the polygon: use the face of least penetration.
        manifold.kind = ManifoldKind::FaceA;
        manifold.local_normal = polygon_a.normals[normal_index];
        manifold.local_point = (v1 + v2) * 0.5;
        manifold.points[0].local_point = circle_b.center;
        manifold.points[0].id = ContactId::ZERO;
        manifold.point_count = 1;
        return manifold;
    }

    // Barycentric edge-region test.
    let u1 = (c_local - v1).dot(v2 - v1);
    let u2 = (c_local - v2).dot(v1 - v2);
    if u1 <= 0.0 {
        if c_local.distance_squared(v1) > radius * radius {
            return manifold;
        }
        manifold.local_normal = (c_local - v1).normalize_or_zero();
        manifold.local_point = v1;
    } else if u2 <= 0.0 {
        if c_local.distance_squared(v2) > radius * radius {
            return manifold;
        }
        manifold.local_normal = (c_local - v2).normalize_or_zero();
        manifold.local_point = v2;
    } else {
        let face_center = (v1 + v2) * 0.5;
        let s = (c_local - face_center).dot(polygon_a.normals[normal_index]);
        if s > radius {
            return manifold;
        }
        manifold.local_normal = polygon_a.normals[normal_index];
        manifold.local_point = face_center;
    }

    manifold.kind = ManifoldKind::FaceA;
    manifold.points[0].local_point = circle_b.center;
    manifold.points[0].id = ContactId::ZERO;
    manifold.point_count = 1;
    manifold
}

/// Edge-circle: barycentric projection onto the segment, plus ghost-vertex
/// ownership checks so a circle sitting on a shared chain vertex produces one
/// contact, not one per adjoining edge.
pub fn collide_edge_and_circle(
    edge_a: &EdgeShape,
    xf_a: &Transform,
    circle_b: &CircleShape,
    xf_b: &Transform,
) -> Manifold {
    let mut manifold = Manifold::empty();

    let q = xf_a.apply_inverse(xf_b.apply(circle_b.center));
    let a = edge_a.vertex1;
    let b = edge_a.vertex2;
    let e = b - a;

    let u = e.dot(b - q);
    let v = e.dot(q - a);
    let radius = edge_a.radius + circle_b.radius;

    if v <= 0.0 {
        // Region A.
        let d = q - a;
        if d.length_squared() > radius * radius {
            return manifold;
        }
        if let Some(a1) = edge_a.vertex0 {
            let e1 = a - a1;
            // Q lies in the previous edge's span: that edge owns the contact.
            if e1.dot(a - q) > 0.0 {
                return manifold;
            }
        }
        manifold.kind = ManifoldKind::Circles;
        manifold.local_point = a;
        manifold.points[0].local_point = circle_b.center;
        manifold.points[0].id =
            ContactId::new(0, 0, FeatureKind::Vertex, FeatureKind::Vertex);
        manifold.point_count = 1;
        return manifold;
    }

    if u <= 0.0 {
        // Region B.
        let d = q - b;
        if d.length_squared() > radius * radius {
            return manifold;
        }
        if let Some(b2) = edge_a.vertex3 {
            let e2 = b2 - b;
            if e2.dot(q - b) > 0.0 {
                return manifold;
            }
        }
        manifold.kind = ManifoldKind::Circles;
        manifold.local_point = b;
        manifold.points[0].local_point = circle_b.center;
        manifold.points[0].id =
            ContactId::new(1, 0, FeatureKind::Vertex, FeatureKind::Vertex);
        manifold.point_count = 1;
        return manifold;
    }

    // Region AB (edge interior).
    let den = e.length_squared();
    debug_assert!(den > 0.0);
    let p = (u * a + v * b) / den;
    let d = q - p;
    if d.length_squared() > radius * radius {
        return manifold;
    }

    let mut n = Vec2::new(-e.y, e.x);
    if n.dot(q - a) < 0.0 {
        n = -n;
    }
    manifold.kind = ManifoldKind::FaceA;
    manifold.local_normal = n.normalize_or_zero();
    manifold.local_point = a;
    manifold.points[0].local_point = circle_b.center;
    manifold.points[0].id = ContactId::new(0, 0, FeatureKind::Face, FeatureKind::Vertex);
    manifold.point_count = 1;
    manifold
}

/// Separation of `poly2` from face `edge1` of `poly1`, measured along the
/// face normal in world space.
fn edge_separation(
    poly1: &PolygonShape,
    xf1: &Transform,
    edge1: usize,
    poly2: &PolygonShape,
    xf2: &Transform,
) -> f32 {
    let normal_world = xf1.rotation.apply(poly1.normals[edge1]);
    let normal2 = xf2.rotation.apply_inverse(normal_world);

    // Support point of poly2 along the negated normal.
    let mut best = 0;
    let mut best_dot = f32::MAX;
    for (i, v) in poly2.vertices.iter().enumerate() {
        let dot = v.dot(normal2);
        if dot < best_dot {
            best_dot = dot;
            best = i;
        }
    }

    let v1 = xf1.apply(poly1.vertices[edge1]);
    let v2 = xf2.apply(poly2.vertices[best]);
    (v2 - v1).dot(normal_world)
}

/// Finds the face of `poly1` with the greatest separation from `poly2` using
/// a local hill climb seeded by the centroid-to-centroid direction. Not
/// guaranteed globally optimal for pathological vertex orderings; good enough
/// for well-formed convex input and cheap in the common case.
pub(crate) fn find_max_separation(
    poly1: &PolygonShape,
    xf1: &Transform,
    poly2: &PolygonShape,
    xf2: &Transform,
) -> (usize, f32) {
    let count = poly1.vertices.len();

    // Seed with the face normal most aligned with the direction to poly2.
    let d = xf2.apply(poly2.centroid) - xf1.apply(poly1.centroid);
    let d_local = xf1.rotation.apply_inverse(d);
    let mut best_edge = 0;
    let mut best_dot = f32::MIN;
    for (i, n) in poly1.normals.iter().enumerate() {
        let dot = n.dot(d_local);
        if dot > best_dot {
            best_dot = dot;
            best_edge = i;
        }
    }

    let s = edge_separation(poly1, xf1, best_edge, poly2, xf2);

    let prev_edge = (best_edge + count - 1) % count;
    let s_prev = edge_separation(poly1, xf1, prev_edge, poly2, xf2);
    let next_edge = (best_edge + 1) % count;
    let s_next = edge_separation(poly1, xf1, next_edge, poly2, xf2);

    let (mut best_edge, mut best_s, increment) = if s_prev > s && s_prev > s_next {
        (prev_edge, s_prev, count - 1)
    } else if s_next > s {
        (next_edge, s_next, 1)
    } else {
        return (best_edge, s);
    };

    loop {
        let edge = (best_edge + increment) % count;
        let s = edge_separation(poly1, xf1, edge, poly2, xf2);
        if s > best_s {
            best_edge = edge;
            best_s = s;
        } else {
            return (best_edge, best_s);
        }
    }
}

/// Picks the edge of `poly2` most anti-parallel to the reference face normal.
fn find_incident_edge(
    poly1: &PolygonShape,
    xf1: &Transform,
    edge1: usize,
    poly2: &PolygonShape,
    xf2: &Transform,
) -> [ClipVertex; 2] {
    let count2 = poly2.vertices.len();

    let normal1 = xf2
        .rotation
        .apply_inverse(xf1.rotation.apply(poly1.normals[edge1]));

    let mut index = 0;
    let mut min_dot = f32::MAX;
    for (i, n) in poly2.normals.iter().enumerate() {
        let dot = n.dot(normal1);
        if dot < min_dot {
            min_dot = dot;
            index = i;
        }
    }

    let i1 = index;
    let i2 = (i1 + 1) % count2;
    [
        ClipVertex {
            v: xf2.apply(poly2.vertices[i1]),
            id: ContactId::new(
                edge1 as u8,
                i1 as u8,
                FeatureKind::Face,
                FeatureKind::Vertex,
            ),
        },
        ClipVertex {
            v: xf2.apply(poly2.vertices[i2]),
            id: ContactId::new(
                edge1 as u8,
                i2 as u8,
                FeatureKind::Face,
                FeatureKind::Vertex,
            ),
        },
    ]
}

/// Shared reference-face/incident-edge clipping used by the polygon-polygon
/// and edge-polygon paths. `flip` means `poly1` is shape B of the owning
/// contact, and contact ids are swapped so identity stays stable regardless
/// of which shape won the reference role this frame.
fn clip_faces(
    poly1: &PolygonShape,
    xf1: &Transform,
    edge1: usize,
    poly2: &PolygonShape,
    xf2: &Transform,
    total_radius: f32,
    kind: ManifoldKind,
    flip: bool,
) -> Manifold {
    let mut manifold = Manifold::empty();

    let incident = find_incident_edge(poly1, xf1, edge1, poly2, xf2);

    let count1 = poly1.vertices.len();
    let iv1 = edge1;
    let iv2 = (edge1 + 1) % count1;
    let v11 = poly1.vertices[iv1];
    let v12 = poly1.vertices[iv2];

    let local_tangent = (v12 - v11).normalize_or_zero();
    let local_normal = cross_vs(local_tangent, 1.0);
    let plane_point = (v11 + v12) * 0.5;

    let tangent = xf1.rotation.apply(local_tangent);
    let normal = cross_vs(tangent, 1.0);

    let v11w = xf1.apply(v11);
    let v12w = xf1.apply(v12);

    let front_offset = normal.dot(v11w);
    let side_offset1 = -tangent.dot(v11w) + total_radius;
    let side_offset2 = tangent.dot(v12w) + total_radius;

    let (clip1, np1) = clip_segment_to_line(&incident, -tangent, side_offset1, iv1 as u8);
    if np1 < 2 {
        return manifold;
    }
    let (clip2, np2) = clip_segment_to_line(&clip1, tangent, side_offset2, iv2 as u8);
    if np2 < 2 {
        return manifold;
    }

    manifold.kind = kind;
    manifold.local_normal = local_normal;
    manifold.local_point = plane_point;

    for clip in &clip2 {
        let separation = normal.dot(clip.v) - front_offset;
        if separation <= total_radius {
            let point = &mut manifold.points[manifold.point_count];
            point.local_point = xf2.apply_inverse(clip.v);
            point.id = if flip { clip.id.swapped() } else { clip.id };
            manifold.point_count += 1;
        }
    }

    manifold
}

/// Polygon-polygon SAT with reference-face hysteresis and incident-edge
/// clipping.
pub fn collide_polygons(
    poly_a: &PolygonShape,
    xf_a: &Transform,
    poly_b: &PolygonShape,
    xf_b: &Transform,
) -> Manifold {
    let total_radius = poly_a.radius + poly_b.radius;

    let (edge_a, separation_a) = find_max_separation(poly_a, xf_a, poly_b, xf_b);
    if separation_a > total_radius {
        return Manifold::empty();
    }

    let (edge_b, separation_b) = find_max_separation(poly_b, xf_b, poly_a, xf_a);
    if separation_b > total_radius {
        return Manifold::empty();
    }

    if separation_b > RELATIVE_TOL * separation_a + ABSOLUTE_TOL {
        clip_faces(
            poly_b,
            xf_b,
            edge_b,
            poly_a,
            xf_a,
            total_radius,
            ManifoldKind::FaceB,
            true,
        )
    } else {
        clip_faces(
            poly_a,
            xf_a,
            edge_a,
            poly_b,
            xf_b,
            total_radius,
            ManifoldKind::FaceA,
            false,
        )
    }
}

/// Classification of the joint an edge shares with an adjacent ghost edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeJoint {
    Concave,
    Flat,
    Convex,
}

fn classify_joint(collision_normal: Vec2, anchor: Vec2, adjacent: Vec2) -> EdgeJoint {
    let offset = collision_normal.dot(adjacent - anchor);
    if offset > LINEAR_SLOP {
        EdgeJoint::Concave
    } else if offset < -LINEAR_SLOP {
        EdgeJoint::Convex
    } else {
        EdgeJoint::Flat
    }
}

/// Edge-polygon: the edge acts as a degenerate two-vertex polygon. Ghost
/// joints decide whether a neighboring chain edge owns the collision
/// (convex steal, concave deferral) and whether boundary contact points must
/// be suppressed (flat joints, where the neighbor would produce duplicates).
pub fn collide_edge_and_polygon(
    edge_a: &EdgeShape,
    xf_a: &Transform,
    poly_b: &PolygonShape,
    xf_b: &Transform,
) -> Manifold {
    let total_radius = edge_a.radius + poly_b.radius;

    let v1 = edge_a.vertex1;
    let v2 = edge_a.vertex2;
    let e = v2 - v1;
    if e.length_squared() < f32::EPSILON {
        return Manifold::empty();
    }

    // Work in the edge's frame.
    let xf = xf_a.mul_t(xf_b);
    let verts: Vec<Vec2> = poly_b.vertices.iter().map(|v| xf.apply(*v)).collect();
    let centroid = xf.apply(poly_b.centroid);

    // Collision-side normal: the edge is two-sided, so face whichever side
    // the polygon is on.
    let mut normal = cross_vs(e, 1.0).normalize();
    let front = normal.dot(centroid - v1) >= 0.0;
    if !front {
        normal = -normal;
    }
    let tangent = e.normalize();

    // Deepest polygon vertex against the edge face.
    let mut edge_sep = f32::MAX;
    let mut deepest = verts[0];
    for v in &verts {
        let s = normal.dot(*v - v1);
        if s < edge_sep {
            edge_sep = s;
            deepest = *v;
        }
    }
    if edge_sep > total_radius {
        return Manifold::empty();
    }

    let joint1 = edge_a.vertex0.map(|v0| classify_joint(normal, v1, v0));
    let joint2 = edge_a.vertex3.map(|v3| classify_joint(normal, v2, v3));

    if let Some(v0) = edge_a.vertex0 {
        match joint1 {
            Some(EdgeJoint::Convex) => {
                // The previous edge steals the collision when the polygon is
                // more separated from it, so chains collide with the correct
                // sub-edge instead of a corner artifact.
                let e0 = v1 - v0;
                let mut n0 = cross_vs(e0, 1.0).normalize_or_zero();
                if n0.dot(centroid - v1) < 0.0 {
                    n0 = -n0;
                }
                let neighbor_sep = verts
                    .iter()
                    .map(|v| n0.dot(*v - v1))
                    .fold(f32::MAX, f32::min);
                if neighbor_sep > edge_sep {
                    return Manifold::empty();
                }
            }
            Some(EdgeJoint::Concave) => {
                // The pocket interior belongs to the neighbor: defer when the
                // deepest point lies past the shared vertex.
                if tangent.dot(deepest - v1) < 0.0 {
                    return Manifold::empty();
                }
            }
            _ => {}
        }
    }

    if let Some(v3) = edge_a.vertex3 {
        match joint2 {
            Some(EdgeJoint::Convex) => {
                let e2 = v3 - v2;
                let mut n2 = cross_vs(e2, 1.0).normalize_or_zero();
                if n2.dot(centroid - v2) < 0.0 {
                    n2 = -n2;
                }
                let neighbor_sep = verts
                    .iter()
                    .map(|v| n2.dot(*v - v2))
                    .fold(f32::MAX, f32::min);
                if neighbor_sep > edge_sep {
                    return Manifold::empty();
                }
            }
            Some(EdgeJoint::Concave) => {
                if tangent.dot(deepest - v2) > 0.0 {
                    return Manifold::empty();
                }
            }
            _ => {}
        }
    }

    // Best polygon face axis against the edge segment.
    let mut poly_edge = 0;
    let mut poly_sep = f32::MIN;
    for i in 0..poly_b.vertices.len() {
        let n = xf.rotation.apply(poly_b.normals[i]);
        let anchor = verts[i];
        let s = (n.dot(v1 - anchor)).min(n.dot(v2 - anchor));
        if s > poly_sep {
            poly_sep = s;
            poly_edge = i;
        }
    }
    if poly_sep > total_radius {
        return Manifold::empty();
    }

    let edge_poly = PolygonShape::from_edge(edge_a);
    // The two-vertex polygon's faces are the two sides of the segment; pick
    // the one facing the polygon.
    let reference_edge = if front { 0 } else { 1 };

    let mut manifold = if poly_sep > RELATIVE_TOL * edge_sep + ABSOLUTE_TOL {
        clip_faces(
            poly_b,
            xf_b,
            poly_edge,
            &edge_poly,
            xf_a,
            total_radius,
            ManifoldKind::FaceB,
            true,
        )
    } else {
        clip_faces(
            &edge_poly,
            xf_a,
            reference_edge,
            poly_b,
            xf_b,
            total_radius,
            ManifoldKind::FaceA,
            false,
        )
    };

    // Flat joints: the neighboring edge generates an identical boundary
    // point. The convention is that an edge owns its second vertex, so points
    // keyed to this edge's first vertex are dropped.
    if joint1 == Some(EdgeJoint::Flat) {
        let mut kept = 0;
        for i in 0..manifold.point_count {
            let id = manifold.points[i].id;
            let boundary =
                id.type_a() == FeatureKind::Vertex && id.index_a() == 0;
            if !boundary {
                manifold.points[kept] = manifold.points[i];
                kept += 1;
            }
        }
        manifold.point_count = kept;
    }

    manifold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::manifold::WorldManifold;

    #[test]
    fn overlapping_circles_produce_one_point() {
        let a = CircleShape::new(Vec2::ZERO, 1.0);
        let b = CircleShape::new(Vec2::ZERO, 1.0);
        let xf_a = Transform::IDENTITY;
        let xf_b = Transform::new(Vec2::new(1.5, 0.0), 0.0);

        let manifold = collide_circles(&a, &xf_a, &b, &xf_b);
        assert_eq!(manifold.point_count, 1);

        let wm = WorldManifold::new(&manifold, &xf_a, a.radius, &xf_b, b.radius);
        assert!((wm.normal - Vec2::X).length() < 1e-5);
        assert!((wm.separations[0] + 0.5).abs() < 1e-5);
    }

    #[test]
    fn separated_circles_produce_no_points() {
        let a = CircleShape::new(Vec2::ZERO, 1.0);
        let b = CircleShape::new(Vec2::ZERO, 1.0);
        let manifold = collide_circles(
            &a,
            &Transform::IDENTITY,
            &b,
            &Transform::new(Vec2::new(2.5, 0.0), 0.0),
        );
        assert_eq!(manifold.point_count, 0);
    }

    #[test]
    fn box_face_contact_produces_two_points() {
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
        assert!(manifold.local_normal.x.abs() > 0.99);

        let wm = WorldManifold::new(&manifold, &xf_a, a.radius, &xf_b, b.radius);
        assert!((wm.normal - Vec2::X).length() < 1e-5);
    }

    #[test]
    fn boxes_beyond_skin_produce_no_points() {
        let a = PolygonShape::boxed(1.0, 1.0);
        let b = PolygonShape::boxed(1.0, 1.0);
        let manifold = collide_polygons(
            &a,
            &Transform::IDENTITY,
            &b,
            &Transform::new(Vec2::new(2.03, 0.0), 0.0),
        );
        assert_eq!(manifold.point_count, 0);
    }

    #[test]
    fn manifold_generation_is_deterministic() {
        let a = PolygonShape::boxed(1.0, 1.0);
        let b = PolygonShape::boxed(0.5, 2.0);
        let xf_a = Transform::new(Vec2::new(0.1, -0.2), 0.3);
        let xf_b = Transform::new(Vec2::new(1.2, 0.4), -0.9);

        let m1 = collide_polygons(&a, &xf_a, &b, &xf_b);
        let m2 = collide_polygons(&a, &xf_a, &b, &xf_b);
        assert_eq!(m1.point_count, m2.point_count);
        for i in 0..m1.point_count {
            assert_eq!(m1.points[i].local_point, m2.points[i].local_point);
            assert_eq!(m1.points[i].id.key(), m2.points[i].id.key());
        }
    }

    #[test]
    fn polygon_circle_vertex_region_uses_corner_normal() {
        let poly = PolygonShape::boxed(1.0, 1.0);
        let circle = CircleShape::new(Vec2::ZERO, 0.5);
        // Circle off the top-right corner, diagonal contact.
        let xf_b = Transform::new(Vec2::new(1.3, 1.3), 0.0);
        let manifold =
            collide_polygon_and_circle(&poly, &Transform::IDENTITY, &circle, &xf_b);
        assert_eq!(manifold.point_count, 1);
        assert_eq!(manifold.kind, ManifoldKind::FaceA);
        let expected = Vec2::new(1.0, 1.0).normalize();
        assert!((manifold.local_normal - expected).length() < 1e-4);
        assert_eq!(manifold.local_point, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn polygon_circle_face_region_uses_face_normal() {
        let poly = PolygonShape::boxed(1.0, 1.0);
        let circle = CircleShape::new(Vec2::ZERO, 0.5);
        let manifold = collide_polygon_and_circle(
            &poly,
            &Transform::IDENTITY,
            &circle,
            &Transform::new(Vec2::new(0.0, 1.4), 0.0),
        );
        assert_eq!(manifold.point_count, 1);
        assert!((manifold.local_normal - Vec2::Y).length() < 1e-6);
    }

    #[test]
    fn chained_edges_yield_one_contact_at_shared_vertex() {
        // Two collinear edges meeting at (1, 0); circle resting exactly on
        // the shared vertex.
        let left = EdgeShape::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0))
            .with_ghosts(None, Some(Vec2::new(2.0, 0.0)));
        let right = EdgeShape::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0))
            .with_ghosts(Some(Vec2::new(0.0, 0.0)), None);
        let circle = CircleShape::new(Vec2::ZERO, 0.5);
        let xf_b = Transform::new(Vec2::new(1.0, 0.4), 0.0);

        let m_left = collide_edge_and_circle(&left, &Transform::IDENTITY, &circle, &xf_b);
        let m_right = collide_edge_and_circle(&right, &Transform::IDENTITY, &circle, &xf_b);
        let total = m_left.point_count + m_right.point_count;
        assert_eq!(total, 1, "shared vertex must be owned by exactly one edge");
    }

    #[test]
    fn edge_polygon_face_contact() {
        let edge = EdgeShape::new(Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0));
        let poly = PolygonShape::boxed(0.5, 0.5);
        let xf_b = Transform::new(Vec2::new(0.0, 0.49), 0.0);

        let manifold =
            collide_edge_and_polygon(&edge, &Transform::IDENTITY, &poly, &xf_b);
        assert_eq!(manifold.point_count, 2);
        let wm = WorldManifold::new(&manifold, &Transform::IDENTITY, edge.radius, &xf_b, poly.radius);
        assert!((wm.normal - Vec2::Y).length() < 1e-4);
    }

    #[test]
    fn flat_chain_does_not_duplicate_boundary_points() {
        // Box straddling the joint of two flat edges.
        let left = EdgeShape::new(Vec2::new(-2.0, 0.0), Vec2::new(0.0, 0.0))
            .with_ghosts(None, Some(Vec2::new(2.0, 0.0)));
        let right = EdgeShape::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0))
            .with_ghosts(Some(Vec2::new(-2.0, 0.0)), None);
        let poly = PolygonShape::boxed(0.5, 0.5);
        let xf_b = Transform::new(Vec2::new(0.0, 0.49), 0.0);

        let m_left = collide_edge_and_polygon(&left, &Transform::IDENTITY, &poly, &xf_b);
        let m_right = collide_edge_and_polygon(&right, &Transform::IDENTITY, &poly, &xf_b);
        // Each edge clips the box against its own span; the flat joint must
        // not yield the same corner twice.
        assert!(m_left.point_count + m_right.point_count <= 3);
        assert!(m_left.point_count >= 1);
        assert!(m_right.point_count >= 1);
    }

    #[test]
    fn hill_climb_handles_near_degenerate_polygon() {
        // Thin sliver with nearly collinear vertices: the local ascent is not
        // guaranteed globally optimal here, but it must stay well-behaved.
        let sliver = PolygonShape::new(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, -0.001),
            Vec2::new(4.0, 0.0),
            Vec2::new(2.0, 0.2),
        ]);
        let box_shape = PolygonShape::boxed(0.5, 0.5);
        let manifold = collide_polygons(
            &sliver,
            &Transform::IDENTITY,
            &box_shape,
            &Transform::new(Vec2::new(2.0, 0.6), 0.1),
        );
        assert!(manifold.point_count <= 2);
    }
}
