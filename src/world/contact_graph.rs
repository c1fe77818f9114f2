use std::collections::HashMap;

use crate::{
    collision::{
        broadphase::BroadPhase,
        contact::{Contact, ContactEvents, ContactKind},
    },
    core::{
        body::Body,
        fixture::{mix_friction, mix_restitution, Fixture},
    },
    utils::allocator::{Arena, EntityId},
};

/// Opaque payload stored on every broad-phase proxy: which fixture child the
/// proxy stands for.
#[derive(Debug, Clone, Copy)]
pub struct ProxyData {
    pub fixture: EntityId,
    pub child: usize,
}

/// Owns the persistent contacts. Contacts live in a free-list arena and are
/// looked up by the unordered broad-phase proxy-id pair, so re-colliding the
/// same pair reuses storage instead of churning the heap.
pub struct ContactGraph {
    pub contacts: Arena<Contact>,
    pair_map: HashMap<(i32, i32), EntityId>,
    keys: HashMap<EntityId, (i32, i32)>,
}

impl Default for ContactGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactGraph {
    pub fn new() -> Self {
        Self {
            contacts: Arena::new(),
            pair_map: HashMap::new(),
            keys: HashMap::new(),
        }
    }

    /// Broad-phase pair callback: acquires a contact for a fresh candidate
    /// pair, or does nothing if one already exists. Same-body pairs,
    /// static-static pairs, and shape combinations with no generator are
    /// rejected here once, not every step.
    pub fn add_pair(
        &mut self,
        a: ProxyData,
        b: ProxyData,
        fixtures: &Arena<Fixture>,
        bodies: &Arena<Body>,
    ) {
        let (fixture_a, fixture_b) = match (fixtures.get(a.fixture), fixtures.get(b.fixture)) {
            (Some(fa), Some(fb)) => (fa, fb),
            _ => return,
        };
        if fixture_a.body == fixture_b.body {
            return;
        }
        let (body_a, body_b) = match (bodies.get(fixture_a.body), bodies.get(fixture_b.body)) {
            (Some(ba), Some(bb)) => (ba, bb),
            _ => return,
        };
        if !body_a.is_dynamic() && !body_b.is_dynamic() {
            return;
        }

        let (kind, swapped) = match ContactKind::classify(&fixture_a.shape, &fixture_b.shape) {
            Some(k) => k,
            None => return,
        };
        let (first, second) = if swapped { (b, a) } else { (a, b) };

        let proxy_a = fixtures.get(first.fixture).unwrap().proxies[first.child].proxy_id;
        let proxy_b = fixtures.get(second.fixture).unwrap().proxies[second.child].proxy_id;
        let key = (proxy_a.min(proxy_b), proxy_a.max(proxy_b));
        if self.pair_map.contains_key(&key) {
            return;
        }

        let contact = Contact::new(
            first.fixture,
            second.fixture,
            first.child,
            second.child,
            kind,
            mix_friction(fixture_a.friction, fixture_b.friction),
            mix_restitution(fixture_a.restitution, fixture_b.restitution),
        );
        let id = self.contacts.insert(contact);
        self.pair_map.insert(key, id);
        self.keys.insert(id, key);
    }

    /// Per-step narrow-phase pass in stable arena order: destroys contacts
    /// whose fat AABBs separated or whose endpoints died, applies filtering,
    /// and updates the rest.
    pub fn update<E: ContactEvents + ?Sized>(
        &mut self,
        bodies: &Arena<Body>,
        fixtures: &Arena<Fixture>,
        broad_phase: &BroadPhase<ProxyData>,
        events: &mut E,
    ) {
        let ids: Vec<EntityId> = self.contacts.ids().collect();
        for id in ids {
            let (fixture_a_id, fixture_b_id, child_a, child_b) = {
                let contact = self.contacts.get(id).expect("contact listed but missing");
                (
                    contact.fixture_a,
                    contact.fixture_b,
                    contact.child_a,
                    contact.child_b,
                )
            };

            let (fixture_a, fixture_b) =
                match (fixtures.get(fixture_a_id), fixtures.get(fixture_b_id)) {
                    (Some(fa), Some(fb)) => (fa, fb),
                    _ => {
                        self.destroy(id, events);
                        continue;
                    }
                };
            let (body_a, body_b) = match (bodies.get(fixture_a.body), bodies.get(fixture_b.body)) {
                (Some(ba), Some(bb)) => (ba, bb),
                _ => {
                    self.destroy(id, events);
                    continue;
                }
            };

            // Stale pair: fat AABBs no longer overlap.
            let proxy_a = fixture_a.proxies[child_a].proxy_id;
            let proxy_b = fixture_b.proxies[child_b].proxy_id;
            if !broad_phase.test_overlap(proxy_a, proxy_b) {
                self.destroy(id, events);
                continue;
            }

            // Filtering is checked before generation; a failed filter forces
            // an empty manifold without running the generator.
            let filtered = !fixture_a.filter.should_collide(&fixture_b.filter)
                || !body_a.enabled
                || !body_b.enabled;
            let contact = self.contacts.get_mut(id).unwrap();
            if filtered {
                contact.manifold.point_count = 0;
                if contact.touching {
                    contact.touching = false;
                    events.end_contact(contact);
                }
                continue;
            }

            let sensor = fixture_a.sensor || fixture_b.sensor;
            contact.update(
                &fixture_a.shape,
                &body_a.transform,
                &fixture_b.shape,
                &body_b.transform,
                sensor,
                events,
            );
        }
    }

    /// Ids of contacts that should reach the solver this step, in stable
    /// order. Sensor contacts never carry points, so they drop out here.
    pub fn touching_contacts(&self) -> Vec<EntityId> {
        self.contacts
            .iter()
            .filter(|(_, c)| c.touching && c.enabled && c.manifold.point_count > 0)
            .map(|(id, _)| id)
            .collect()
    }

    /// Destroys every contact referencing the fixture. Called when a fixture
    /// or its body is removed.
    pub fn purge_fixture<E: ContactEvents + ?Sized>(&mut self, fixture: EntityId, events: &mut E) {
        let ids: Vec<EntityId> = self
            .contacts
            .iter()
            .filter(|(_, c)| c.fixture_a == fixture || c.fixture_b == fixture)
            .map(|(id, _)| id)
            .collect();
        for id in ids {
            self.destroy(id, events);
        }
    }

    fn destroy<E: ContactEvents + ?Sized>(&mut self, id: EntityId, events: &mut E) {
        if let Some(contact) = self.contacts.get(id) {
            if contact.touching {
                events.end_contact(contact);
            }
        }
        if let Some(key) = self.keys.remove(&id) {
            self.pair_map.remove(&key);
        }
        self.contacts.remove(id);
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}
