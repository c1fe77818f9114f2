use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Which part of a shape a contact point was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Vertex,
    Face,
}

impl FeatureKind {
    fn to_bits(self) -> u32 {
        match self {
            FeatureKind::Vertex => 0,
            FeatureKind::Face => 1,
        }
    }

    fn from_bits(bits: u32) -> Self {
        if bits == 0 {
            FeatureKind::Vertex
        } else {
            FeatureKind::Face
        }
    }
}

/// Packed contact feature key: vertex-or-face index and feature type for each
/// shape of a pair, in one 32-bit word. Two points with equal keys refer to
/// the same geometric contact across frames, which is what lets warm-start
/// impulses carry over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactId(u32);

impl ContactId {
    pub const ZERO: Self = Self(0);

    pub fn new(index_a: u8, index_b: u8, type_a: FeatureKind, type_b: FeatureKind) -> Self {
        Self(
            index_a as u32
                | (index_b as u32) << 8
                | type_a.to_bits() << 16
                | type_b.to_bits() << 24,
        )
    }

    pub fn key(self) -> u32 {
        self.0
    }

    pub fn index_a(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub fn index_b(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    pub fn type_a(self) -> FeatureKind {
        FeatureKind::from_bits((self.0 >> 16) & 0xff)
    }

    pub fn type_b(self) -> FeatureKind {
        FeatureKind::from_bits((self.0 >> 24) & 0xff)
    }

    /// Exchanges the A and B features. Used when the collision routine ran
    /// with the shapes in the opposite order from the owning contact, so
    /// point identity stays stable regardless of which shape was chosen as
    /// the reference this frame.
    pub fn swapped(self) -> Self {
        Self::new(self.index_b(), self.index_a(), self.type_b(), self.type_a())
    }
}

/// A candidate contact point flowing through the clipping pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipVertex {
    pub v: Vec2,
    pub id: ContactId,
}

/// Clips a two-point segment against the half-plane `dot(normal, x) <= offset`.
/// Returns the surviving points; fewer than two means the segment left the
/// reference face's side region entirely.
pub fn clip_segment_to_line(
    v_in: &[ClipVertex; 2],
    normal: Vec2,
    offset: f32,
    vertex_index_a: u8,
) -> ([ClipVertex; 2], usize) {
    let mut v_out = [ClipVertex::default(); 2];
    let mut count = 0;

    let distance0 = normal.dot(v_in[0].v) - offset;
    let distance1 = normal.dot(v_in[1].v) - offset;

    if distance0 <= 0.0 {
        v_out[count] = v_in[0];
        count += 1;
    }
    if distance1 <= 0.0 {
        v_out[count] = v_in[1];
        count += 1;
    }

    // The segment straddles the plane; emit the intersection point, keyed to
    // the clipping vertex on A and the incident edge on B.
    if distance0 * distance1 < 0.0 {
        let interp = distance0 / (distance0 - distance1);
        v_out[count] = ClipVertex {
            v: v_in[0].v + interp * (v_in[1].v - v_in[0].v),
            id: ContactId::new(
                vertex_index_a,
                v_in[0].id.index_b(),
                FeatureKind::Vertex,
                FeatureKind::Face,
            ),
        };
        count += 1;
    }

    (v_out, count)
}
