//! Contact resolution: velocity/position solving, TOI correction, and
//! integration.

pub mod integrator;
pub mod solver;
pub mod toi;

pub use integrator::Integrator;
pub use solver::{ContactConstraint, ContactSolver};
pub use toi::ToiSolver;
