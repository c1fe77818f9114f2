//! Collision detection: shapes, broad phase (dynamic AABB tree), narrow
//! phase (per-pair manifold generators), persistent contacts, and queries.

pub mod broadphase;
pub mod clipping;
pub mod contact;
pub mod dynamic_tree;
pub mod manifold;
pub mod narrowphase;
pub mod queries;
pub mod shapes;

pub use broadphase::BroadPhase;
pub use clipping::{ContactId, FeatureKind};
pub use contact::{Contact, ContactEvents, ContactKind, NoEvents};
pub use dynamic_tree::DynamicTree;
pub use manifold::{Manifold, ManifoldKind, ManifoldPoint, WorldManifold};
pub use queries::{test_overlap, RayCastInput, RayCastOutput};
pub use shapes::{ChainShape, CircleShape, EdgeShape, PolygonShape, Shape};
