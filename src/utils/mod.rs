//! Utility helpers: math extensions, the generational arena, logging, and
//! step profiling.

pub mod allocator;
pub mod logging;
pub mod math;
pub mod profiling;

pub use allocator::{Arena, EntityId};
pub use math::{cross, cross_sv, cross_vs};
