//! Impulse2D – a sequential-impulse 2D rigid-body physics engine.
//!
//! The crate is built around the classic collision-and-resolution pipeline:
//! a dynamic AABB tree broad phase narrows the pair problem, per-shape-pair
//! manifold generators compute exact contact geometry, persistent contacts
//! carry solved impulses across steps for warm starting, and an iterative
//! impulse solver resolves velocities followed by non-linear position
//! correction. A position-only TOI solver handles fast bodies flagged by the
//! caller's continuous-collision sweep.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod utils;
pub mod world;

pub use glam::{Mat2, Vec2};

pub use crate::collision::{
    broadphase::BroadPhase,
    clipping::{ContactId, FeatureKind},
    contact::{Contact, ContactEvents, ContactKind, NoEvents},
    dynamic_tree::DynamicTree,
    manifold::{Manifold, ManifoldKind, ManifoldPoint, WorldManifold},
    queries::{test_overlap, RayCastInput, RayCastOutput},
    shapes::{ChainShape, CircleShape, EdgeShape, PolygonShape, Shape},
};
pub use crate::core::{
    body::{Body, BodyKind},
    fixture::{Filter, Fixture},
    types::{Aabb, MassData, Rot, Sweep, Transform, Velocity},
};
pub use crate::dynamics::{integrator::Integrator, solver::ContactSolver, toi::ToiSolver};
pub use crate::utils::allocator::{Arena, EntityId};
pub use crate::world::{PhysicsWorld, RayCastHit};
