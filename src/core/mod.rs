//! Core types describing simulation entities and shared geometry data.

pub mod body;
pub mod fixture;
pub mod types;

pub use body::{Body, BodyKind};
pub use fixture::{Filter, Fixture, FixtureProxy};
pub use types::{Aabb, MassData, Rot, Sweep, Transform, Velocity};
