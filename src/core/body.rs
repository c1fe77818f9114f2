use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    config::{DEFAULT_ANGULAR_DAMPING, DEFAULT_LINEAR_DAMPING},
    core::types::{MassData, Sweep, Transform, Velocity},
    utils::{allocator::EntityId, math::cross},
};

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves; infinite mass.
    Static,
    /// Moves under its own velocity but ignores forces and impulses.
    Kinematic,
    /// Fully simulated.
    Dynamic,
}

/// Rigid body: mass state, velocities, and the sweep the solver corrects.
/// Fixtures attach shapes to it; the body itself carries no geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub kind: BodyKind,
    pub transform: Transform,
    pub sweep: Sweep,
    pub velocity: Velocity,
    pub mass: f32,
    pub inv_mass: f32,
    pub inertia: f32,
    pub inv_inertia: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub gravity_scale: f32,
    /// Flags the body for continuous-collision handling by the owner.
    pub bullet: bool,
    pub enabled: bool,
    pub fixtures: Vec<EntityId>,
}

impl Body {
    pub fn new(kind: BodyKind, position: Vec2, angle: f32) -> Self {
        let transform = Transform::new(position, angle);
        let sweep = Sweep {
            local_center: Vec2::ZERO,
            c0: position,
            c: position,
            a0: angle,
            a: angle,
        };
        let (mass, inv_mass) = match kind {
            BodyKind::Dynamic => (1.0, 1.0),
            _ => (0.0, 0.0),
        };
        Self {
            kind,
            transform,
            sweep,
            velocity: Velocity::default(),
            mass,
            inv_mass,
            inertia: 0.0,
            inv_inertia: 0.0,
            linear_damping: DEFAULT_LINEAR_DAMPING,
            angular_damping: DEFAULT_ANGULAR_DAMPING,
            gravity_scale: 1.0,
            bullet: false,
            enabled: true,
            fixtures: Vec::new(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }

    /// World-space center of mass.
    pub fn world_center(&self) -> Vec2 {
        self.sweep.c
    }

    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    pub fn angle(&self) -> f32 {
        self.sweep.a
    }

    /// Installs mass properties computed from the attached fixtures. Static
    /// and kinematic bodies always keep zero mass; dynamic bodies get at
    /// least unit mass so they never become unresponsive.
    pub fn set_mass_data(&mut self, data: &MassData) {
        if !self.is_dynamic() {
            self.mass = 0.0;
            self.inv_mass = 0.0;
            self.inertia = 0.0;
            self.inv_inertia = 0.0;
            let center = self.transform.apply(Vec2::ZERO);
            self.sweep.local_center = Vec2::ZERO;
            self.sweep.c0 = center;
            self.sweep.c = center;
            return;
        }

        self.mass = if data.mass > 0.0 { data.mass } else { 1.0 };
        self.inv_mass = 1.0 / self.mass;

        if data.inertia > 0.0 {
            // Shift the shape-origin inertia to the center of mass.
            self.inertia = data.inertia - self.mass * data.center.length_squared();
            debug_assert!(self.inertia > 0.0);
            self.inv_inertia = 1.0 / self.inertia;
        } else {
            self.inertia = 0.0;
            self.inv_inertia = 0.0;
        }

        // Preserve the velocity of the new center of mass.
        let old_center = self.sweep.c;
        self.sweep.local_center = data.center;
        let new_center = self.transform.apply(data.center);
        self.sweep.c0 = new_center;
        self.sweep.c = new_center;
        self.velocity.linear += crate::utils::math::cross_sv(
            self.velocity.angular,
            new_center - old_center,
        );
    }

    /// Applies an impulse at a world point, affecting both linear and
    /// angular velocity.
    pub fn apply_impulse(&mut self, impulse: Vec2, point: Vec2) {
        if !self.is_dynamic() {
            return;
        }
        self.velocity.linear += self.inv_mass * impulse;
        self.velocity.angular += self.inv_inertia * cross(point - self.sweep.c, impulse);
    }

    /// Re-derives the body transform from the sweep endpoint. Called after
    /// every positional correction.
    pub fn synchronize_transform(&mut self) {
        self.transform = Transform::new(Vec2::ZERO, self.sweep.a);
        self.transform.position = self.sweep.c - self.transform.rotation.apply(self.sweep.local_center);
    }
}
