use impulse2d::*;

fn square(x: f32, y: f32, half: f32) -> Aabb {
    Aabb::new(Vec2::new(x - half, y - half), Vec2::new(x + half, y + half))
}

#[test]
fn tree_invariants_hold_through_a_long_edit_sequence() {
    let mut tree = DynamicTree::new();
    let mut ids = Vec::new();

    for i in 0..64 {
        let x = (i % 8) as f32 * 2.5;
        let y = (i / 8) as f32 * 2.5;
        ids.push(tree.create_proxy(square(x, y, 0.5), i));
        assert!(tree.validate(), "tree invalid after insert {i}");
    }

    for round in 0..4 {
        for (i, &id) in ids.iter().enumerate() {
            if (i + round) % 5 == 0 {
                let x = (i as f32 * 1.3) % 25.0;
                tree.move_proxy(id, square(x, round as f32 * 4.0, 0.5), Vec2::new(1.0, 0.0));
            }
        }
        assert!(tree.validate(), "tree invalid after move round {round}");
    }

    for &id in ids.iter().step_by(2) {
        tree.destroy_proxy(id);
    }
    assert!(tree.validate());
    assert_eq!(tree.leaf_count(), 32);
}

#[test]
fn every_proxy_is_found_by_its_own_tight_aabb() {
    let mut tree = DynamicTree::new();
    let mut ids = Vec::new();
    for i in 0..40 {
        let x = (i as f32 * 1.7) % 13.0;
        let y = (i as f32 * 2.3) % 11.0;
        ids.push((tree.create_proxy(square(x, y, 0.4), i), square(x, y, 0.4)));
    }

    for &(id, tight) in &ids {
        let mut hit = false;
        tree.query(&tight, |proxy| {
            if proxy == id {
                hit = true;
                return false; // stop as soon as the proxy is found
            }
            true
        });
        assert!(hit, "proxy {id} missing from its own tight AABB query");
    }
}

#[test]
fn update_pairs_never_reports_duplicates_or_self_pairs() {
    let mut bp: BroadPhase<u32> = BroadPhase::new();
    let mut ids = Vec::new();
    // A cluster where everything overlaps everything.
    for i in 0..8u32 {
        ids.push(bp.create_proxy(square(i as f32 * 0.1, 0.0, 1.0), i));
    }

    let mut pairs = Vec::new();
    bp.update_pairs(|a, b| pairs.push((a.min(b), a.max(b))));

    for &(a, b) in &pairs {
        assert_ne!(a, b, "self pair reported");
    }
    let mut sorted = pairs.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), pairs.len(), "duplicate pair reported");
    // 8 mutually overlapping proxies: all 28 unordered pairs.
    assert_eq!(pairs.len(), 28);
}

#[test]
fn only_moved_proxies_generate_new_pairs() {
    let mut bp: BroadPhase<u32> = BroadPhase::new();
    let a = bp.create_proxy(square(0.0, 0.0, 1.0), 0);
    let _b = bp.create_proxy(square(10.0, 0.0, 1.0), 1);
    bp.update_pairs(|_, _| panic!("nothing overlaps yet"));

    // Move A next to B: one pair.
    bp.move_proxy(a, square(9.0, 0.0, 1.0), Vec2::new(9.0, 0.0));
    let mut pairs = Vec::new();
    bp.update_pairs(|x, y| pairs.push((x, y)));
    assert_eq!(pairs.len(), 1);

    // Nothing moved since: no pairs at all.
    bp.update_pairs(|_, _| panic!("no proxies moved"));
}

#[test]
fn rebalance_keeps_queries_correct() {
    let mut tree = DynamicTree::new();
    for i in 0..50 {
        tree.create_proxy(square(i as f32, 0.0, 0.4), i);
    }
    tree.rebalance(64);
    assert!(tree.validate());

    let mut found = Vec::new();
    tree.query(&square(10.0, 0.0, 0.55), |proxy| {
        found.push(tree.user_data(proxy));
        true
    });
    found.sort_unstable();
    assert_eq!(found, vec![9, 10, 11]);
}
