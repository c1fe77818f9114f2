use crate::{
    collision::{
        manifold::Manifold,
        narrowphase::{
            collide_circles, collide_edge_and_circle, collide_edge_and_polygon,
            collide_polygon_and_circle, collide_polygons,
        },
        queries::test_overlap,
        shapes::Shape,
    },
    core::types::Transform,
    utils::allocator::EntityId,
};

/// Callbacks surfaced to the owning world during contact updates. All hooks
/// run synchronously inside the step.
pub trait ContactEvents {
    /// A contact transitioned to touching.
    fn begin_contact(&mut self, _contact: &Contact) {}
    /// A touching contact stopped touching (or was destroyed while touching).
    fn end_contact(&mut self, _contact: &Contact) {}
    /// A touching contact is about to be solved. The old manifold carries the
    /// previous step's points; mutating the contact here (disabling it or
    /// zeroing the manifold) cancels its response for this step.
    fn pre_solve(&mut self, _contact: &mut Contact, _old_manifold: &Manifold) {}
}

/// Event sink that ignores everything.
pub struct NoEvents;

impl ContactEvents for NoEvents {}

/// Which manifold generator a contact dispatches to. Fixed at creation from
/// the two shape types, with shape order normalized so each unordered pair
/// maps to exactly one generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    CircleCircle,
    PolygonCircle,
    PolygonPolygon,
    EdgeCircle,
    EdgePolygon,
}

impl ContactKind {
    /// Classifies a shape pair. Returns the generator and whether the
    /// fixtures must be stored swapped so that shape A is the generator's
    /// first argument. `None` means the pair never collides (edge vs. edge).
    pub fn classify(a: &Shape, b: &Shape) -> Option<(ContactKind, bool)> {
        use Shape::*;
        match (a, b) {
            (Circle(_), Circle(_)) => Some((ContactKind::CircleCircle, false)),
            (Polygon(_), Circle(_)) => Some((ContactKind::PolygonCircle, false)),
            (Circle(_), Polygon(_)) => Some((ContactKind::PolygonCircle, true)),
            (Polygon(_), Polygon(_)) => Some((ContactKind::PolygonPolygon, false)),
            (Edge(_) | Chain(_), Circle(_)) => Some((ContactKind::EdgeCircle, false)),
            (Circle(_), Edge(_) | Chain(_)) => Some((ContactKind::EdgeCircle, true)),
            (Edge(_) | Chain(_), Polygon(_)) => Some((ContactKind::EdgePolygon, false)),
            (Polygon(_), Edge(_) | Chain(_)) => Some((ContactKind::EdgePolygon, true)),
            (Edge(_) | Chain(_), Edge(_) | Chain(_)) => None,
        }
    }
}

/// Persistent narrow-phase state for one fixture pair (one chain child each).
/// Created when the broad phase first overlaps the fattened AABBs, updated
/// once per step, destroyed when the AABBs separate or an endpoint dies.
#[derive(Debug, Clone)]
pub struct Contact {
    pub fixture_a: EntityId,
    pub fixture_b: EntityId,
    pub child_a: usize,
    pub child_b: usize,
    pub kind: ContactKind,
    pub manifold: Manifold,
    /// Mixed fixture friction, fixed at creation.
    pub friction: f32,
    /// Mixed fixture restitution, fixed at creation.
    pub restitution: f32,
    pub enabled: bool,
    pub touching: bool,
}

impl Contact {
    pub fn new(
        fixture_a: EntityId,
        fixture_b: EntityId,
        child_a: usize,
        child_b: usize,
        kind: ContactKind,
        friction: f32,
        restitution: f32,
    ) -> Self {
        Self {
            fixture_a,
            fixture_b,
            child_a,
            child_b,
            kind,
            manifold: Manifold::empty(),
            friction,
            restitution,
            enabled: true,
            touching: false,
        }
    }

    /// Runs the matching manifold generator. Pure: does not touch the cached
    /// manifold.
    pub fn evaluate(
        &self,
        shape_a: &Shape,
        xf_a: &Transform,
        shape_b: &Shape,
        xf_b: &Transform,
    ) -> Manifold {
        match self.kind {
            ContactKind::CircleCircle => match (shape_a, shape_b) {
                (Shape::Circle(a), Shape::Circle(b)) => collide_circles(a, xf_a, b, xf_b),
                _ => unreachable!("contact kind does not match shapes"),
            },
            ContactKind::PolygonCircle => match (shape_a, shape_b) {
                (Shape::Polygon(a), Shape::Circle(b)) => {
                    collide_polygon_and_circle(a, xf_a, b, xf_b)
                }
                _ => unreachable!("contact kind does not match shapes"),
            },
            ContactKind::PolygonPolygon => match (shape_a, shape_b) {
                (Shape::Polygon(a), Shape::Polygon(b)) => collide_polygons(a, xf_a, b, xf_b),
                _ => unreachable!("contact kind does not match shapes"),
            },
            ContactKind::EdgeCircle => match (shape_a, shape_b) {
                (Shape::Edge(a), Shape::Circle(b)) => collide_edge_and_circle(a, xf_a, b, xf_b),
                (Shape::Chain(chain), Shape::Circle(b)) => {
                    collide_edge_and_circle(&chain.child_edge(self.child_a), xf_a, b, xf_b)
                }
                _ => unreachable!("contact kind does not match shapes"),
            },
            ContactKind::EdgePolygon => match (shape_a, shape_b) {
                (Shape::Edge(a), Shape::Polygon(b)) => collide_edge_and_polygon(a, xf_a, b, xf_b),
                (Shape::Chain(chain), Shape::Polygon(b)) => {
                    collide_edge_and_polygon(&chain.child_edge(self.child_a), xf_a, b, xf_b)
                }
                _ => unreachable!("contact kind does not match shapes"),
            },
        }
    }

    /// Per-step update: regenerates the manifold (or runs the overlap test
    /// for sensors), carries warm-start impulses forward by contact id, and
    /// raises begin/end/pre-solve notifications.
    pub fn update<E: ContactEvents + ?Sized>(
        &mut self,
        shape_a: &Shape,
        xf_a: &Transform,
        shape_b: &Shape,
        xf_b: &Transform,
        sensor: bool,
        events: &mut E,
    ) {
        let old_manifold = self.manifold;
        let was_touching = self.touching;

        let touching;
        if sensor {
            touching = test_overlap(shape_a, self.child_a, xf_a, shape_b, self.child_b, xf_b);
            self.manifold.point_count = 0;
        } else {
            let mut manifold = self.evaluate(shape_a, xf_a, shape_b, xf_b);

            // Match new points against the previous manifold by feature key
            // so solved impulses survive across frames. The search is
            // order-independent over at most two points.
            for i in 0..manifold.point_count {
                let point = &mut manifold.points[i];
                point.normal_impulse = 0.0;
                point.tangent_impulse = 0.0;
                for j in 0..old_manifold.point_count {
                    let old_point = &old_manifold.points[j];
                    if old_point.id.key() == point.id.key() {
                        point.normal_impulse = old_point.normal_impulse;
                        point.tangent_impulse = old_point.tangent_impulse;
                        break;
                    }
                }
            }

            touching = manifold.point_count > 0;
            self.manifold = manifold;
        }
        self.touching = touching;

        if !was_touching && touching {
            events.begin_contact(self);
        }
        if was_touching && !touching {
            events.end_contact(self);
        }
        if !sensor && touching {
            events.pre_solve(self, &old_manifold);
        }
    }
}
