use glam::Vec2;

use crate::{
    collision::{
        dynamic_tree::{DynamicTree, NULL_NODE},
        queries::RayCastInput,
    },
    core::types::Aabb,
};

/// Broad phase driver: wraps the dynamic tree, tracks which proxies changed
/// their fattened AABB since the last [`BroadPhase::update_pairs`], and
/// reports candidate pairs exactly once.
///
/// The contract (create/destroy/move proxy, pair enumeration, query, ray
/// cast) is index-agnostic; an alternate spatial index such as a quad tree
/// could be substituted behind the same interface.
pub struct BroadPhase<T: Copy> {
    tree: DynamicTree<T>,
    move_buffer: Vec<i32>,
    pair_buffer: Vec<(i32, i32)>,
}

impl<T: Copy> Default for BroadPhase<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> BroadPhase<T> {
    pub fn new() -> Self {
        Self {
            tree: DynamicTree::new(),
            move_buffer: Vec::new(),
            pair_buffer: Vec::new(),
        }
    }

    pub fn create_proxy(&mut self, aabb: Aabb, user_data: T) -> i32 {
        let id = self.tree.create_proxy(aabb, user_data);
        self.move_buffer.push(id);
        id
    }

    pub fn destroy_proxy(&mut self, id: i32) {
        self.move_buffer.retain(|&moved| moved != id);
        self.tree.destroy_proxy(id);
    }

    /// Forwards to the tree; buffers the proxy for pair generation only when
    /// the fat AABB actually changed.
    pub fn move_proxy(&mut self, id: i32, aabb: Aabb, displacement: Vec2) {
        if self.tree.move_proxy(id, aabb, displacement) {
            self.move_buffer.push(id);
        }
    }

    /// Re-buffers a proxy without moving it, forcing its pairs to be
    /// re-evaluated on the next update.
    pub fn touch_proxy(&mut self, id: i32) {
        self.move_buffer.push(id);
    }

    /// Whether the fat AABBs of two proxies overlap.
    pub fn test_overlap(&self, id_a: i32, id_b: i32) -> bool {
        self.tree.fat_aabb(id_a).overlaps(&self.tree.fat_aabb(id_b))
    }

    pub fn fat_aabb(&self, id: i32) -> Aabb {
        self.tree.fat_aabb(id)
    }

    pub fn user_data(&self, id: i32) -> T {
        self.tree.user_data(id)
    }

    pub fn proxy_count(&self) -> usize {
        self.tree.leaf_count()
    }

    /// Reports every distinct unordered proxy pair whose fat AABBs overlap
    /// and where at least one member moved since the previous call. Sorting
    /// the pair buffer deduplicates pairs that two moved proxies would
    /// otherwise report twice; a proxy never pairs with itself.
    pub fn update_pairs(&mut self, mut callback: impl FnMut(T, T)) {
        self.pair_buffer.clear();

        let tree = &self.tree;
        let pair_buffer = &mut self.pair_buffer;
        for &moved in &self.move_buffer {
            if moved == NULL_NODE {
                continue;
            }
            let fat = tree.fat_aabb(moved);
            tree.query(&fat, |other| {
                if other != moved {
                    pair_buffer.push((moved.min(other), moved.max(other)));
                }
                true
            });
        }
        self.move_buffer.clear();

        self.pair_buffer.sort_unstable();
        let mut i = 0;
        while i < self.pair_buffer.len() {
            let pair = self.pair_buffer[i];
            callback(self.tree.user_data(pair.0), self.tree.user_data(pair.1));
            // Skip duplicates reported by both moved proxies.
            i += 1;
            while i < self.pair_buffer.len() && self.pair_buffer[i] == pair {
                i += 1;
            }
        }
    }

    pub fn query(&self, aabb: &Aabb, callback: impl FnMut(i32) -> bool) {
        self.tree.query(aabb, callback);
    }

    pub fn ray_cast(&self, input: &RayCastInput, callback: impl FnMut(&RayCastInput, i32) -> f32) {
        self.tree.ray_cast(input, callback);
    }

    /// Periodic tree maintenance; see [`DynamicTree::rebalance`].
    pub fn rebalance(&mut self, iterations: usize) {
        self.tree.rebalance(iterations);
    }
}
