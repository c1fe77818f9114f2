//! Dynamic AABB tree used by the broad phase.
//!
//! Leaves own one fattened proxy AABB plus opaque user data; internal nodes
//! own two children and the union of their AABBs. Insertion descends by a
//! perimeter cost weighted by subtree leaf count, removal promotes the
//! sibling; no height balancing is performed. [`DynamicTree::rebalance`] can
//! be called on a schedule to bound degradation over time.

use glam::Vec2;

use crate::{
    collision::queries::RayCastInput,
    config::{AABB_EXTENSION, AABB_MULTIPLIER},
    core::types::Aabb,
    utils::math::cross_sv,
};

pub const NULL_NODE: i32 = -1;

#[derive(Debug, Clone)]
struct TreeNode<T> {
    aabb: Aabb,
    user_data: Option<T>,
    /// Parent when allocated, next free slot otherwise.
    parent_or_next: i32,
    child1: i32,
    child2: i32,
    leaf_count: i32,
}

impl<T> TreeNode<T> {
    fn is_leaf(&self) -> bool {
        self.child1 == NULL_NODE
    }
}

/// Spatial index over fattened AABB proxies.
pub struct DynamicTree<T: Copy> {
    nodes: Vec<TreeNode<T>>,
    root: i32,
    free_list: i32,
    /// Rotating selector used by `rebalance` to pick leaves.
    path: u32,
}

impl<T: Copy> Default for DynamicTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> DynamicTree<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: NULL_NODE,
            free_list: NULL_NODE,
            path: 0,
        }
    }

    fn allocate_node(&mut self) -> i32 {
        if self.free_list != NULL_NODE {
            let id = self.free_list;
            self.free_list = self.nodes[id as usize].parent_or_next;
            let node = &mut self.nodes[id as usize];
            node.parent_or_next = NULL_NODE;
            node.child1 = NULL_NODE;
            node.child2 = NULL_NODE;
            node.user_data = None;
            node.leaf_count = 0;
            return id;
        }

        let id = self.nodes.len() as i32;
        self.nodes.push(TreeNode {
            aabb: Aabb::default(),
            user_data: None,
            parent_or_next: NULL_NODE,
            child1: NULL_NODE,
            child2: NULL_NODE,
            leaf_count: 0,
        });
        id
    }

    fn free_node(&mut self, id: i32) {
        let node = &mut self.nodes[id as usize];
        node.parent_or_next = self.free_list;
        node.user_data = None;
        node.child1 = NULL_NODE;
        node.child2 = NULL_NODE;
        self.free_list = id;
    }

    /// Creates a proxy for the given tight AABB. The stored AABB is fattened
    /// by a fixed margin so small motions do not touch the tree.
    pub fn create_proxy(&mut self, aabb: Aabb, user_data: T) -> i32 {
        let id = self.allocate_node();
        let node = &mut self.nodes[id as usize];
        node.aabb = aabb.expand(AABB_EXTENSION);
        node.user_data = Some(user_data);
        node.leaf_count = 1;
        self.insert_leaf(id);
        id
    }

    pub fn destroy_proxy(&mut self, id: i32) {
        debug_assert!(self.nodes[id as usize].is_leaf());
        self.remove_leaf(id);
        self.free_node(id);
    }

    /// Updates a proxy after its shape moved. Returns whether the tree was
    /// actually touched: if the new tight AABB still fits inside the stored
    /// fat AABB nothing happens. On re-insertion the stored AABB is fattened
    /// and additionally extended along the predicted displacement so that
    /// most subsequent moves stay free.
    pub fn move_proxy(&mut self, id: i32, aabb: Aabb, displacement: Vec2) -> bool {
        debug_assert!(self.nodes[id as usize].is_leaf());
        if self.nodes[id as usize].aabb.contains(&aabb) {
            return false;
        }

        self.remove_leaf(id);

        let mut fat = aabb.expand(AABB_EXTENSION);
        let d = AABB_MULTIPLIER * displacement;
        if d.x < 0.0 {
            fat.lower.x += d.x;
        } else {
            fat.upper.x += d.x;
        }
        if d.y < 0.0 {
            fat.lower.y += d.y;
        } else {
            fat.upper.y += d.y;
        }

        self.nodes[id as usize].aabb = fat;
        self.insert_leaf(id);
        true
    }

    /// The stored (fattened) AABB of a proxy.
    pub fn fat_aabb(&self, id: i32) -> Aabb {
        self.nodes[id as usize].aabb
    }

    pub fn user_data(&self, id: i32) -> T {
        self.nodes[id as usize]
            .user_data
            .expect("proxy id refers to an internal node")
    }

    /// Number of live proxies.
    pub fn leaf_count(&self) -> usize {
        if self.root == NULL_NODE {
            0
        } else {
            self.nodes[self.root as usize].leaf_count as usize
        }
    }

    fn insert_leaf(&mut self, leaf: i32) {
        if self.root == NULL_NODE {
            self.root = leaf;
            self.nodes[leaf as usize].parent_or_next = NULL_NODE;
            return;
        }

        // Descend toward the cheaper child: combined perimeter weighted by
        // how many leaves the subtree holds. This bounds tree badness
        // without a full re-optimization.
        let leaf_aabb = self.nodes[leaf as usize].aabb;
        let mut index = self.root;
        while !self.nodes[index as usize].is_leaf() {
            let child1 = self.nodes[index as usize].child1;
            let child2 = self.nodes[index as usize].child2;

            let cost1 = self.nodes[child1 as usize].leaf_count as f32
                * self.nodes[child1 as usize]
                    .aabb
                    .combine(&leaf_aabb)
                    .perimeter();
            let cost2 = self.nodes[child2 as usize].leaf_count as f32
                * self.nodes[child2 as usize]
                    .aabb
                    .combine(&leaf_aabb)
                    .perimeter();

            index = if cost1 < cost2 { child1 } else { child2 };
        }

        let sibling = index;
        let old_parent = self.nodes[sibling as usize].parent_or_next;
        let new_parent = self.allocate_node();
        {
            let node = &mut self.nodes[new_parent as usize];
            node.parent_or_next = old_parent;
            node.child1 = sibling;
            node.child2 = leaf;
        }
        self.nodes[sibling as usize].parent_or_next = new_parent;
        self.nodes[leaf as usize].parent_or_next = new_parent;

        if old_parent == NULL_NODE {
            self.root = new_parent;
        } else if self.nodes[old_parent as usize].child1 == sibling {
            self.nodes[old_parent as usize].child1 = new_parent;
        } else {
            self.nodes[old_parent as usize].child2 = new_parent;
        }

        self.refit_upward(new_parent);
    }

    fn remove_leaf(&mut self, leaf: i32) {
        if leaf == self.root {
            self.root = NULL_NODE;
            return;
        }

        let parent = self.nodes[leaf as usize].parent_or_next;
        let grandparent = self.nodes[parent as usize].parent_or_next;
        let sibling = if self.nodes[parent as usize].child1 == leaf {
            self.nodes[parent as usize].child2
        } else {
            self.nodes[parent as usize].child1
        };

        if grandparent == NULL_NODE {
            self.root = sibling;
            self.nodes[sibling as usize].parent_or_next = NULL_NODE;
            self.free_node(parent);
            return;
        }

        // Promote the sibling into the parent's slot, then refit ancestors.
        if self.nodes[grandparent as usize].child1 == parent {
            self.nodes[grandparent as usize].child1 = sibling;
        } else {
            self.nodes[grandparent as usize].child2 = sibling;
        }
        self.nodes[sibling as usize].parent_or_next = grandparent;
        self.free_node(parent);
        self.refit_upward(grandparent);
    }

    /// Recomputes AABB unions and leaf counts from `start` to the root.
    fn refit_upward(&mut self, start: i32) {
        let mut index = start;
        while index != NULL_NODE {
            let child1 = self.nodes[index as usize].child1;
            let child2 = self.nodes[index as usize].child2;
            debug_assert!(child1 != NULL_NODE && child2 != NULL_NODE);
            self.nodes[index as usize].aabb = self.nodes[child1 as usize]
                .aabb
                .combine(&self.nodes[child2 as usize].aabb);
            self.nodes[index as usize].leaf_count =
                self.nodes[child1 as usize].leaf_count + self.nodes[child2 as usize].leaf_count;
            index = self.nodes[index as usize].parent_or_next;
        }
    }

    /// Removes and re-inserts `iterations` leaves, walking a rotating path
    /// through the tree. Called by the owner on a schedule, not every step.
    pub fn rebalance(&mut self, iterations: usize) {
        if self.root == NULL_NODE {
            return;
        }

        for _ in 0..iterations {
            let mut node = self.root;
            let mut bit = 0;
            while !self.nodes[node as usize].is_leaf() {
                let selector = (self.path >> bit) & 1;
                node = if selector == 0 {
                    self.nodes[node as usize].child1
                } else {
                    self.nodes[node as usize].child2
                };
                bit = (bit + 1) & 31;
            }
            self.path = self.path.wrapping_add(1);

            self.remove_leaf(node);
            self.insert_leaf(node);
        }
    }

    /// Visits every leaf whose fat AABB overlaps `aabb`. Returning `false`
    /// from the callback stops the query.
    pub fn query(&self, aabb: &Aabb, mut callback: impl FnMut(i32) -> bool) {
        let mut stack = Vec::with_capacity(64);
        stack.push(self.root);

        while let Some(index) = stack.pop() {
            if index == NULL_NODE {
                continue;
            }
            let node = &self.nodes[index as usize];
            if !node.aabb.overlaps(aabb) {
                continue;
            }
            if node.is_leaf() {
                if !callback(index) {
                    return;
                }
            } else {
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }
    }

    /// Casts a segment through the tree. The callback receives the current
    /// clipped input and a leaf proxy, and returns a new maximum fraction:
    /// zero terminates the cast, a positive value narrows the active segment
    /// so that closer hits prune more of the tree.
    pub fn ray_cast(
        &self,
        input: &RayCastInput,
        mut callback: impl FnMut(&RayCastInput, i32) -> f32,
    ) {
        let p1 = input.p1;
        let p2 = input.p2;
        let r = (p2 - p1).normalize_or_zero();
        if r == Vec2::ZERO {
            return;
        }

        // Perpendicular axis used for the segment/AABB separation test.
        let v = cross_sv(1.0, r);
        let abs_v = v.abs();

        let mut max_fraction = input.max_fraction;
        let mut segment_aabb = segment_bounds(p1, p2, max_fraction);

        let mut stack = Vec::with_capacity(64);
        stack.push(self.root);

        while let Some(index) = stack.pop() {
            if index == NULL_NODE {
                continue;
            }
            let node = &self.nodes[index as usize];
            if !node.aabb.overlaps(&segment_aabb) {
                continue;
            }

            let c = node.aabb.center();
            let h = node.aabb.extents();
            let separation = (v.dot(p1 - c)).abs() - abs_v.dot(h);
            if separation > 0.0 {
                continue;
            }

            if node.is_leaf() {
                let sub_input = RayCastInput {
                    p1,
                    p2,
                    max_fraction,
                };
                let value = callback(&sub_input, index);
                if value == 0.0 {
                    return;
                }
                if value > 0.0 {
                    max_fraction = value;
                    segment_aabb = segment_bounds(p1, p2, max_fraction);
                }
            } else {
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }
    }

    /// Checks structural invariants: parent links, AABB unions, leaf counts.
    pub fn validate(&self) -> bool {
        self.validate_node(self.root, NULL_NODE)
    }

    fn validate_node(&self, index: i32, parent: i32) -> bool {
        if index == NULL_NODE {
            return true;
        }
        let node = &self.nodes[index as usize];
        if node.parent_or_next != parent {
            return false;
        }
        if node.is_leaf() {
            return node.child2 == NULL_NODE && node.user_data.is_some() && node.leaf_count == 1;
        }

        let child1 = &self.nodes[node.child1 as usize];
        let child2 = &self.nodes[node.child2 as usize];
        let union = child1.aabb.combine(&child2.aabb);
        if (union.lower - node.aabb.lower).length() > 1e-6
            || (union.upper - node.aabb.upper).length() > 1e-6
        {
            return false;
        }
        if node.leaf_count != child1.leaf_count + child2.leaf_count {
            return false;
        }
        self.validate_node(node.child1, index) && self.validate_node(node.child2, index)
    }
}

fn segment_bounds(p1: Vec2, p2: Vec2, max_fraction: f32) -> Aabb {
    let t = p1 + max_fraction * (p2 - p1);
    Aabb {
        lower: p1.min(t),
        upper: p1.max(t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(x: f32, y: f32) -> Aabb {
        Aabb::new(Vec2::new(x, y), Vec2::new(x + 1.0, y + 1.0))
    }

    #[test]
    fn tree_stays_consistent_under_churn() {
        let mut tree = DynamicTree::new();
        let mut ids = Vec::new();
        for i in 0..32 {
            let x = (i % 8) as f32 * 3.0;
            let y = (i / 8) as f32 * 3.0;
            ids.push(tree.create_proxy(unit_box(x, y), i));
        }
        assert!(tree.validate());
        assert_eq!(tree.leaf_count(), 32);

        for (i, &id) in ids.iter().enumerate() {
            if i % 3 == 0 {
                tree.move_proxy(id, unit_box(i as f32 * 1.5, 20.0), Vec2::new(0.5, 0.0));
            }
        }
        assert!(tree.validate());

        for &id in ids.iter().take(16) {
            tree.destroy_proxy(id);
        }
        assert!(tree.validate());
        assert_eq!(tree.leaf_count(), 16);
    }

    #[test]
    fn query_with_own_tight_aabb_finds_the_proxy() {
        let mut tree = DynamicTree::new();
        let mut ids = Vec::new();
        for i in 0..16 {
            ids.push(tree.create_proxy(unit_box(i as f32 * 2.0, 0.0), i));
        }
        for (i, &id) in ids.iter().enumerate() {
            let tight = unit_box(i as f32 * 2.0, 0.0);
            let mut found = false;
            tree.query(&tight, |proxy| {
                if proxy == id {
                    found = true;
                }
                true
            });
            assert!(found, "proxy {i} not returned for its own tight AABB");
        }
    }

    #[test]
    fn small_moves_do_not_touch_the_tree() {
        let mut tree = DynamicTree::new();
        let id = tree.create_proxy(unit_box(0.0, 0.0), 0u32);
        // Inside the fattening margin: no re-insertion.
        let nudged = Aabb::new(Vec2::new(0.02, 0.0), Vec2::new(1.02, 1.0));
        assert!(!tree.move_proxy(id, nudged, Vec2::new(0.02, 0.0)));
        // Far outside: re-inserted.
        assert!(tree.move_proxy(id, unit_box(5.0, 5.0), Vec2::new(5.0, 5.0)));
        assert!(tree.validate());
    }

    #[test]
    fn displacement_extends_the_fat_aabb_forward() {
        let mut tree = DynamicTree::new();
        let id = tree.create_proxy(unit_box(0.0, 0.0), 0u32);
        tree.move_proxy(id, unit_box(3.0, 0.0), Vec2::new(1.0, 0.0));
        let fat = tree.fat_aabb(id);
        // Extension is applied along +x only.
        assert!(fat.upper.x >= 4.0 + AABB_EXTENSION + AABB_MULTIPLIER * 1.0 - 1e-6);
        assert!(fat.lower.x <= 3.0 - AABB_EXTENSION + 1e-6);
    }

    #[test]
    fn ray_cast_visits_proxies_on_the_segment() {
        let mut tree = DynamicTree::new();
        for i in 0..8 {
            tree.create_proxy(unit_box(i as f32 * 4.0, 0.0), i);
        }
        // Off-axis proxy that the ray must not visit.
        tree.create_proxy(unit_box(4.0, 30.0), 100);

        let mut visited = Vec::new();
        let input = RayCastInput {
            p1: Vec2::new(-1.0, 0.5),
            p2: Vec2::new(40.0, 0.5),
            max_fraction: 1.0,
        };
        tree.ray_cast(&input, |sub, proxy| {
            visited.push(tree.user_data(proxy));
            sub.max_fraction
        });
        assert_eq!(visited.len(), 8);
        assert!(!visited.contains(&100));
    }

    #[test]
    fn ray_cast_zero_return_stops_the_cast() {
        let mut tree = DynamicTree::new();
        for i in 0..8 {
            tree.create_proxy(unit_box(i as f32 * 4.0, 0.0), i);
        }
        let mut count = 0;
        let input = RayCastInput {
            p1: Vec2::new(-1.0, 0.5),
            p2: Vec2::new(40.0, 0.5),
            max_fraction: 1.0,
        };
        tree.ray_cast(&input, |_, _| {
            count += 1;
            0.0
        });
        assert_eq!(count, 1);
    }

    #[test]
    fn rebalance_preserves_contents() {
        let mut tree = DynamicTree::new();
        for i in 0..24 {
            tree.create_proxy(unit_box(i as f32, i as f32 * 0.5), i);
        }
        tree.rebalance(16);
        assert!(tree.validate());
        assert_eq!(tree.leaf_count(), 24);
    }
}
