//! Global tuning constants for the Impulse2D engine.

use std::f32::consts::PI;

/// Collision and constraint tolerance, in meters. Contacts are allowed to
/// overlap by this much so the solver does not jitter at rest.
pub const LINEAR_SLOP: f32 = 0.005;

/// Angular analogue of [`LINEAR_SLOP`], in radians.
pub const ANGULAR_SLOP: f32 = 2.0 / 180.0 * PI;

/// Skin radius carried by polygon shapes. Polygons behave as if their corners
/// were rounded by this amount, which lets circles and polygons share one
/// clipping pipeline.
pub const POLYGON_RADIUS: f32 = 2.0 * LINEAR_SLOP;

/// Maximum vertices a convex polygon shape may carry.
pub const MAX_POLYGON_VERTICES: usize = 8;

/// Maximum contact points in one manifold.
pub const MAX_MANIFOLD_POINTS: usize = 2;

/// Fixed margin added to proxy AABBs stored in the dynamic tree, so small
/// movements do not force a tree update.
pub const AABB_EXTENSION: f32 = 0.1;

/// Scale applied to the per-step displacement when predicting a moved proxy's
/// future AABB.
pub const AABB_MULTIPLIER: f32 = 2.0;

/// Relative approach speed below which restitution is ignored. Keeps resting
/// contacts from gaining energy.
pub const VELOCITY_THRESHOLD: f32 = 1.0;

/// Fraction of positional error fed back per position iteration.
pub const BAUMGARTE: f32 = 0.2;

/// Positional feedback used by the TOI solver.
pub const TOI_BAUMGARTE: f32 = 0.75;

/// Largest positional correction applied in a single iteration, in meters.
pub const MAX_LINEAR_CORRECTION: f32 = 0.2;

/// Largest translation of a body in a single step, in meters.
pub const MAX_TRANSLATION: f32 = 2.0;

/// Largest rotation of a body in a single step, in radians.
pub const MAX_ROTATION: f32 = 0.5 * PI;

/// Condition-number bound for the two-point block solver. Beyond this the
/// 2x2 system is treated as two independent points.
pub const BLOCK_SOLVER_MAX_CONDITION: f32 = 100.0;

/// Default gravity vector applied in the physics world (Y-up).
pub const DEFAULT_GRAVITY: [f32; 2] = [0.0, -9.81];

/// Default integration timestep (in seconds).
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Number of velocity iterations performed by the contact solver per step.
pub const DEFAULT_VELOCITY_ITERATIONS: u32 = 8;

/// Number of position iterations performed by the contact solver per step.
pub const DEFAULT_POSITION_ITERATIONS: u32 = 3;

/// Iteration cap for the TOI position solver.
pub const TOI_POSITION_ITERATIONS: u32 = 20;

/// Default damping applied to linear velocity.
pub const DEFAULT_LINEAR_DAMPING: f32 = 0.0;

/// Default damping applied to angular velocity.
pub const DEFAULT_ANGULAR_DAMPING: f32 = 0.0;
