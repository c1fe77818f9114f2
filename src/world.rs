use std::time::Instant;

use glam::Vec2;

use crate::{
    collision::{
        broadphase::BroadPhase,
        contact::{Contact, ContactEvents, NoEvents},
        queries::RayCastInput,
    },
    config::{
        BAUMGARTE, DEFAULT_POSITION_ITERATIONS, DEFAULT_VELOCITY_ITERATIONS,
    },
    core::{
        body::Body,
        fixture::{Fixture, FixtureProxy},
        types::{Aabb, MassData},
    },
    dynamics::{integrator::Integrator, solver::ContactSolver},
    utils::{
        allocator::{Arena, EntityId},
        logging::ScopedTimer,
        profiling::StepProfiler,
    },
    world::contact_graph::{ContactGraph, ProxyData},
};

pub mod contact_graph;

/// Closest-hit result of a world ray cast.
#[derive(Debug, Clone, Copy)]
pub struct RayCastHit {
    pub fixture: EntityId,
    pub child: usize,
    pub point: Vec2,
    pub normal: Vec2,
    pub fraction: f32,
}

/// Central simulation container: owns bodies, fixtures, the broad phase, and
/// the contact graph, and runs the collision-and-resolution pipeline once per
/// [`PhysicsWorld::step`].
///
/// One step is one synchronous sequence (broad-phase pairs, contact updates,
/// velocity integration, N velocity iterations, position integration, M
/// position iterations, proxy synchronization) with contacts processed in
/// stable creation order so results are reproducible.
pub struct PhysicsWorld {
    pub bodies: Arena<Body>,
    pub fixtures: Arena<Fixture>,
    pub gravity: Vec2,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    pub warm_starting: bool,
    broad_phase: BroadPhase<ProxyData>,
    graph: ContactGraph,
    inv_dt0: f32,
    profiler: StepProfiler,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            bodies: Arena::new(),
            fixtures: Arena::new(),
            gravity,
            velocity_iterations: DEFAULT_VELOCITY_ITERATIONS,
            position_iterations: DEFAULT_POSITION_ITERATIONS,
            warm_starting: true,
            broad_phase: BroadPhase::new(),
            graph: ContactGraph::new(),
            inv_dt0: 0.0,
            profiler: StepProfiler::default(),
        }
    }

    pub fn create_body(&mut self, body: Body) -> EntityId {
        self.bodies.insert(body)
    }

    /// Attaches a fixture to a body, creating one broad-phase proxy per shape
    /// child and refreshing the body's mass data.
    pub fn create_fixture(&mut self, body_id: EntityId, mut fixture: Fixture) -> EntityId {
        let transform = match self.bodies.get(body_id) {
            Some(body) => body.transform,
            None => return EntityId::NULL,
        };
        fixture.body = body_id;
        fixture.proxies.clear();

        let fixture_id = self.fixtures.insert(fixture);
        let child_count = self.fixtures.get(fixture_id).unwrap().shape.child_count();
        for child in 0..child_count {
            let aabb = self
                .fixtures
                .get(fixture_id)
                .unwrap()
                .shape
                .compute_aabb(&transform, child);
            let proxy_id = self.broad_phase.create_proxy(
                aabb,
                ProxyData {
                    fixture: fixture_id,
                    child,
                },
            );
            self.fixtures
                .get_mut(fixture_id)
                .unwrap()
                .proxies
                .push(FixtureProxy { proxy_id, child });
        }

        if let Some(body) = self.bodies.get_mut(body_id) {
            body.fixtures.push(fixture_id);
        }
        self.reset_mass_data(body_id);
        fixture_id
    }

    /// Removes a fixture, its proxies, and every contact referencing it.
    pub fn destroy_fixture(&mut self, fixture_id: EntityId) {
        let Some(fixture) = self.fixtures.get(fixture_id) else {
            return;
        };
        let body_id = fixture.body;
        let proxies = fixture.proxies.clone();
        for proxy in proxies {
            self.broad_phase.destroy_proxy(proxy.proxy_id);
        }
        self.graph.purge_fixture(fixture_id, &mut NoEvents);
        self.fixtures.remove(fixture_id);
        if let Some(body) = self.bodies.get_mut(body_id) {
            body.fixtures.retain(|&f| f != fixture_id);
        }
        self.reset_mass_data(body_id);
    }

    /// Removes a body and all of its fixtures.
    pub fn destroy_body(&mut self, body_id: EntityId) {
        let fixture_ids = match self.bodies.get(body_id) {
            Some(body) => body.fixtures.clone(),
            None => return,
        };
        for fixture_id in fixture_ids {
            self.destroy_fixture(fixture_id);
        }
        self.bodies.remove(body_id);
    }

    /// Recomputes a body's mass from its attached fixtures.
    pub fn reset_mass_data(&mut self, body_id: EntityId) {
        let Some(body) = self.bodies.get(body_id) else {
            return;
        };
        let mut total = MassData::default();
        for &fixture_id in &body.fixtures {
            if let Some(fixture) = self.fixtures.get(fixture_id) {
                let data = fixture.shape.compute_mass(fixture.density);
                if data.mass > 0.0 {
                    total.center =
                        (total.center * total.mass + data.center * data.mass)
                            / (total.mass + data.mass);
                }
                total.mass += data.mass;
                total.inertia += data.inertia;
            }
        }
        self.bodies.get_mut(body_id).unwrap().set_mass_data(&total);
    }

    pub fn body(&self, id: EntityId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: EntityId) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    pub fn fixture(&self, id: EntityId) -> Option<&Fixture> {
        self.fixtures.get(id)
    }

    pub fn contacts(&self) -> impl Iterator<Item = (EntityId, &Contact)> + '_ {
        self.graph.contacts.iter()
    }

    pub fn contact_count(&self) -> usize {
        self.graph.len()
    }

    pub fn touching_contact_count(&self) -> usize {
        self.graph.touching_contacts().len()
    }

    pub fn profiler(&self) -> &StepProfiler {
        &self.profiler
    }

    /// Advances the simulation by `dt` seconds without event callbacks.
    pub fn step(&mut self, dt: f32) {
        self.step_with(dt, &mut NoEvents);
    }

    /// Advances the simulation by `dt` seconds, raising contact events on
    /// `events` synchronously as they occur.
    pub fn step_with<E: ContactEvents + ?Sized>(&mut self, dt: f32, events: &mut E) {
        if dt <= 0.0 {
            return;
        }
        let _step_timer = ScopedTimer::new("world_step");
        let step_start = Instant::now();
        self.profiler.reset();

        // New candidate pairs from proxies that moved last step.
        let t0 = Instant::now();
        {
            let graph = &mut self.graph;
            let fixtures = &self.fixtures;
            let bodies = &self.bodies;
            self.broad_phase
                .update_pairs(|a, b| graph.add_pair(a, b, fixtures, bodies));
        }
        self.profiler.broad_phase_time = t0.elapsed();

        // Narrow phase: refresh manifolds, raise begin/end/pre-solve.
        let t0 = Instant::now();
        self.graph
            .update(&self.bodies, &self.fixtures, &self.broad_phase, events);
        self.profiler.narrow_phase_time = t0.elapsed();

        Integrator::integrate_velocities(&mut self.bodies, self.gravity, dt);

        // Velocity solve over all touching contacts, warm-started with the
        // impulses carried in the manifolds.
        let t0 = Instant::now();
        let touching = self.graph.touching_contacts();
        let dt_ratio = if self.inv_dt0 > 0.0 {
            dt * self.inv_dt0
        } else {
            0.0
        };
        let mut solver = ContactSolver::new(
            dt_ratio,
            self.warm_starting,
            &touching,
            &self.graph.contacts,
            &self.fixtures,
            &self.bodies,
        );
        solver.warm_start(&mut self.bodies);
        for _ in 0..self.velocity_iterations {
            solver.solve_velocity_constraints(&mut self.bodies);
        }
        solver.finalize(&mut self.graph.contacts);

        Integrator::integrate_positions(&mut self.bodies, dt);

        let mut converged = false;
        for _ in 0..self.position_iterations {
            if solver.solve_position_constraints(&mut self.bodies, BAUMGARTE) {
                converged = true;
                break;
            }
        }
        if !converged && !touching.is_empty() {
            log::trace!(
                "position solve left residual penetration across {} contacts",
                touching.len()
            );
        }
        self.profiler.solver_time = t0.elapsed();

        self.synchronize_fixtures();

        self.inv_dt0 = 1.0 / dt;
        self.profiler.body_count = self.bodies.len();
        self.profiler.contact_count = self.graph.len();
        self.profiler.touching_count = touching.len();
        self.profiler.total_step_time = step_start.elapsed();
        self.profiler.report_if_enabled();
    }

    /// Re-derives transforms from the solved sweeps and pushes the swept
    /// AABBs of every moved fixture into the broad phase for the next step's
    /// pair generation.
    fn synchronize_fixtures(&mut self) {
        let ids: Vec<EntityId> = self.bodies.ids().collect();
        for id in ids {
            let body = self.bodies.get_mut(id).unwrap();
            if body.is_static() || !body.enabled {
                continue;
            }
            body.synchronize_transform();

            let body = self.bodies.get(id).unwrap();
            let xf0 = body.sweep.transform_at(0.0);
            let xf1 = body.transform;
            let displacement = body.sweep.c - body.sweep.c0;
            for &fixture_id in &body.fixtures {
                let Some(fixture) = self.fixtures.get(fixture_id) else {
                    continue;
                };
                for proxy in &fixture.proxies {
                    let aabb0 = fixture.shape.compute_aabb(&xf0, proxy.child);
                    let aabb1 = fixture.shape.compute_aabb(&xf1, proxy.child);
                    self.broad_phase
                        .move_proxy(proxy.proxy_id, aabb0.combine(&aabb1), displacement);
                }
            }
        }
    }

    /// Casts a segment through the world and returns the closest solid hit.
    /// The per-leaf callback narrows the active fraction as closer hits are
    /// found, pruning the rest of the tree.
    pub fn ray_cast_closest(&self, p1: Vec2, p2: Vec2) -> Option<RayCastHit> {
        let input = RayCastInput {
            p1,
            p2,
            max_fraction: 1.0,
        };
        let mut best: Option<RayCastHit> = None;

        self.broad_phase.ray_cast(&input, |sub, proxy| {
            let data = self.broad_phase.user_data(proxy);
            let Some(fixture) = self.fixtures.get(data.fixture) else {
                return sub.max_fraction;
            };
            let Some(body) = self.bodies.get(fixture.body) else {
                return sub.max_fraction;
            };
            match fixture.shape.ray_cast(sub, &body.transform, data.child) {
                Some(output) => {
                    best = Some(RayCastHit {
                        fixture: data.fixture,
                        child: data.child,
                        point: sub.p1 + output.fraction * (sub.p2 - sub.p1),
                        normal: output.normal,
                        fraction: output.fraction,
                    });
                    output.fraction
                }
                None => sub.max_fraction,
            }
        });

        best
    }

    /// Visits every fixture child whose fat proxy AABB overlaps `aabb`.
    /// Returning `false` stops the query.
    pub fn query_aabb(&self, aabb: &Aabb, mut callback: impl FnMut(EntityId, usize) -> bool) {
        self.broad_phase.query(aabb, |proxy| {
            let data = self.broad_phase.user_data(proxy);
            callback(data.fixture, data.child)
        });
    }

    /// Periodic broad-phase tree maintenance; safe to call on any schedule.
    pub fn rebalance_broad_phase(&mut self, iterations: usize) {
        self.broad_phase.rebalance(iterations);
    }
}
