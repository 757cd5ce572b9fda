use pictoforge::tree::{NodeId, PageTree};
use proptest::prelude::*;

// --- STRATEGIES ---

// Node i > 0 hangs under some node in 0..i.
prop_compose! {
    fn arb_tree()(size in 1usize..40)(
        parents in proptest::collection::vec(any::<prop::sample::Index>(), size - 1)
    ) -> PageTree {
        let mut tree = PageTree::new("home");
        for (i, p) in parents.iter().enumerate() {
            let id = tree.add_node(&format!("page{}", i + 1)).unwrap();
            tree.insert_child(p.index(i + 1), id).unwrap();
        }
        tree
    }
}

fn naive_distance(tree: &PageTree, a: NodeId, b: NodeId) -> usize {
    let ancestors = |mut n: NodeId| {
        let mut v = vec![n];
        while let Some(p) = tree.parent(n) {
            v.push(p);
            n = p;
        }
        v
    };
    let (up_a, up_b) = (ancestors(a), ancestors(b));
    for (i, n) in up_a.iter().enumerate() {
        if let Some(j) = up_b.iter().position(|m| m == n) {
            return i + j;
        }
    }
    unreachable!("every node descends from the root")
}

proptest! {
    #[test]
    fn prop_path_to_self_is_trivial(tree in arb_tree()) {
        for n in 0..tree.len() {
            let path = tree.path_finding(n, n).unwrap();
            prop_assert_eq!(path.distance, 0);
            prop_assert_eq!(path.nodes, vec![n]);
        }
    }

    #[test]
    fn prop_distance_is_symmetric_and_bounded(tree in arb_tree()) {
        for a in 0..tree.len() {
            for b in 0..tree.len() {
                let d = tree.distance(a, b).unwrap();
                prop_assert_eq!(d, tree.distance(b, a).unwrap());
                prop_assert!(d <= tree.depth(a).unwrap() + tree.depth(b).unwrap());
                prop_assert_eq!(d, naive_distance(&tree, a, b));
            }
        }
    }

    #[test]
    fn prop_path_is_a_chain_of_edges(tree in arb_tree()) {
        for a in 0..tree.len() {
            for b in 0..tree.len() {
                let path = tree.path_finding(a, b).unwrap();
                prop_assert_eq!(path.nodes.first(), Some(&a));
                prop_assert_eq!(path.nodes.last(), Some(&b));
                prop_assert_eq!(path.nodes.len(), path.distance + 1);
                for hop in path.nodes.windows(2) {
                    let linked = tree.parent(hop[0]) == Some(hop[1]) || tree.parent(hop[1]) == Some(hop[0]);
                    prop_assert!(linked);
                }
            }
        }
    }

    #[test]
    fn prop_euler_tour_length(tree in arb_tree()) {
        prop_assert_eq!(tree.euler_tour().len(), 2 * tree.len() - 1);
    }
}

#[test]
fn test_reparent_updates_lca() {
    let mut tree = PageTree::new("home");
    let a = tree.add_node("a").unwrap();
    let b = tree.add_node("b").unwrap();
    let c = tree.add_node("c").unwrap();
    tree.insert_child(0, a).unwrap();
    tree.insert_child(0, b).unwrap();
    tree.insert_child(a, c).unwrap();

    assert_eq!(tree.find_lca(c, b).unwrap().node, 0);
    assert_eq!(tree.distance(c, b).unwrap(), 3);
    assert!(tree.has_cached_tour());

    tree.reparent(c, b).unwrap();
    assert!(!tree.has_cached_tour());
    assert_eq!(tree.find_lca(c, b).unwrap().node, b);
    assert_eq!(tree.distance(c, b).unwrap(), 1);
    assert_eq!(tree.depth(c), Some(2));
}
