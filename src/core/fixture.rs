use serde::{Deserialize, Serialize};

use crate::{collision::shapes::Shape, utils::allocator::EntityId};

/// Collision filtering data: category/mask bits plus a group override.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Filter {
    pub category: u16,
    pub mask: u16,
    /// Non-zero groups override the category bits: fixtures sharing a
    /// positive group always collide, a negative group never collide.
    pub group: i16,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            category: 0x0001,
            mask: u16::MAX,
            group: 0,
        }
    }
}

impl Filter {
    pub fn should_collide(&self, other: &Filter) -> bool {
        if self.group == other.group && self.group != 0 {
            return self.group > 0;
        }
        (self.mask & other.category) != 0 && (self.category & other.mask) != 0
    }
}

/// One broad-phase proxy owned by a fixture: the tree id for one shape child.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FixtureProxy {
    pub proxy_id: i32,
    pub child: usize,
}

/// Attaches a shape to a body along with its surface material and filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub body: EntityId,
    pub shape: Shape,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    /// Sensors detect overlap but never generate solver constraints.
    pub sensor: bool,
    pub filter: Filter,
    pub proxies: Vec<FixtureProxy>,
}

impl Fixture {
    pub fn new(shape: Shape) -> Self {
        Self {
            body: EntityId::NULL,
            shape,
            density: 1.0,
            friction: 0.3,
            restitution: 0.0,
            sensor: false,
            filter: Filter::default(),
            proxies: Vec::new(),
        }
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn as_sensor(mut self) -> Self {
        self.sensor = true;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }
}

/// Fixed mixing rule for pair friction: geometric mean, so one slippery
/// surface dominates.
pub fn mix_friction(a: f32, b: f32) -> f32 {
    (a * b).sqrt()
}

/// Fixed mixing rule for pair restitution: the bouncier surface wins.
pub fn mix_restitution(a: f32, b: f32) -> f32 {
    a.max(b)
}
