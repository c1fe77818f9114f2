use glam::Vec2;

use crate::{
    config::{MAX_ROTATION, MAX_TRANSLATION},
    core::body::Body,
    utils::allocator::Arena,
};

/// Semi-implicit Euler integration over the body arena. Velocities first,
/// positions after the velocity solve, operating on the sweeps so position
/// correction can refine the result afterwards.
pub struct Integrator;

impl Integrator {
    /// Applies gravity and damping to all dynamic bodies.
    pub fn integrate_velocities(bodies: &mut Arena<Body>, gravity: Vec2, dt: f32) {
        for (_, body) in bodies.iter_mut() {
            if !body.is_dynamic() || !body.enabled {
                continue;
            }
            body.velocity.linear += dt * body.gravity_scale * gravity;
            // Damping as a cheap implicit decay, stable for any dt.
            body.velocity.linear *= 1.0 / (1.0 + dt * body.linear_damping);
            body.velocity.angular *= 1.0 / (1.0 + dt * body.angular_damping);
        }
    }

    /// Advances every non-static body's sweep by its velocity, clamping
    /// per-step translation and rotation to keep the solver's linearization
    /// honest.
    pub fn integrate_positions(bodies: &mut Arena<Body>, dt: f32) {
        for (_, body) in bodies.iter_mut() {
            if body.is_static() || !body.enabled {
                continue;
            }

            let mut translation = dt * body.velocity.linear;
            if translation.length_squared() > MAX_TRANSLATION * MAX_TRANSLATION {
                let ratio = MAX_TRANSLATION / translation.length();
                body.velocity.linear *= ratio;
                translation *= ratio;
            }
            let mut rotation = dt * body.velocity.angular;
            if rotation.abs() > MAX_ROTATION {
                let ratio = MAX_ROTATION / rotation.abs();
                body.velocity.angular *= ratio;
                rotation *= ratio;
            }

            body.sweep.c0 = body.sweep.c;
            body.sweep.a0 = body.sweep.a;
            body.sweep.c += translation;
            body.sweep.a += rotation;
        }
    }
}
