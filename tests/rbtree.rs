use proptest::prelude::*;
use rbsched::{Color, RbTree};
use std::rc::Rc;

fn assert_balanced<T: Ord>(tree: &RbTree<T>) {
    if let Err(violation) = tree.validate() {
        panic!("tree of {} nodes is broken: {violation}", tree.len());
    }
    let bound = 2.0 * ((tree.len() + 1) as f64).log2();
    assert!(
        tree.height() as f64 <= bound,
        "height {} exceeds {bound}",
        tree.height()
    );
}

fn levels(tree: &RbTree<i32>) -> Vec<(i32, Color, Option<i32>, Option<i32>)> {
    tree.traverse_levels()
        .map(|(k, c, l, r)| (*k, c, l.copied(), r.copied()))
        .collect()
}

#[test]
fn test_single_key_is_black_root() {
    let mut tree = RbTree::new();
    tree.insert(10);
    assert_eq!(levels(&tree), [(10, Color::Black, None, None)]);
    assert_eq!(tree.minimum().map(|n| *n.key()), Some(10));
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_ascending_keys_rebalance() {
    let tree: RbTree<i32> = [10, 20, 30].into_iter().collect();
    assert_eq!(
        levels(&tree),
        [
            (20, Color::Black, Some(10), Some(30)),
            (10, Color::Red, None, None),
            (30, Color::Red, None, None),
        ]
    );
    assert_eq!(tree.height(), 2);
    assert_balanced(&tree);
}

#[test]
fn test_descending_keys_rebalance() {
    let tree: RbTree<i32> = [30, 20, 10].into_iter().collect();
    assert_eq!(
        levels(&tree),
        [
            (20, Color::Black, Some(10), Some(30)),
            (10, Color::Red, None, None),
            (30, Color::Red, None, None),
        ]
    );
    assert_eq!(tree.height(), 2);
    assert_balanced(&tree);
}

#[test]
fn test_balanced_insert_order() {
    let tree: RbTree<i32> = [20, 10, 30, 5, 15, 25, 35].into_iter().collect();
    assert!(tree.height() <= 3);
    assert_eq!(tree.minimum().map(|n| *n.key()), Some(5));

    let mut keys: Vec<_> = tree.traverse_levels().map(|(k, ..)| *k).collect();
    assert_eq!(keys[0], 20);
    keys.sort();
    assert_eq!(keys, [5, 10, 15, 20, 25, 30, 35]);
    assert_balanced(&tree);
}

#[test]
fn test_duplicates_go_left() {
    let tree: RbTree<i32> = [10, 10].into_iter().collect();
    assert_eq!(
        levels(&tree),
        [
            (10, Color::Black, Some(10), None),
            (10, Color::Red, None, None),
        ]
    );
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [10, 10]);
}

#[test]
fn test_empty_tree() {
    let tree = RbTree::<i32>::new();
    assert!(tree.is_empty());
    assert!(tree.minimum().is_none());
    assert!(tree.maximum().is_none());
    assert_eq!(tree.traverse_levels().count(), 0);
    assert_eq!(tree.iter().next(), None);
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.validate(), Ok(0));
}

#[test]
fn test_minimum_ignores_right_children() {
    // the root has only a right child, so the minimum is the root itself
    let tree: RbTree<i32> = [10, 20].into_iter().collect();
    let min = tree.minimum().unwrap();
    assert_eq!(*min.key(), 10);
    assert!(min.parent().is_none());
    assert_eq!(min.right().map(|r| *r.key()), Some(20));
    assert_eq!(tree.maximum().map(|n| *n.key()), Some(20));
}

#[test]
fn test_node_refs_navigate_both_ways() {
    let tree: RbTree<i32> = (1..=15).collect();
    let root = tree.root().unwrap();
    assert_eq!(root.color(), Color::Black);
    let left = root.left().unwrap();
    assert_eq!(left.parent().map(|p| *p.key()), Some(*root.key()));
    assert!(left.key() < root.key());
    let right = root.right().unwrap();
    assert_eq!(right.parent().map(|p| *p.key()), Some(*root.key()));
    assert!(right.key() > root.key());
}

#[test]
fn test_sequential_inserts_stay_balanced() {
    let mut tree = RbTree::new();
    for key in 0..1024 {
        tree.insert(key);
        assert_balanced(&tree);
    }
    assert!(tree.height() <= 20);
    assert_eq!(tree.minimum().map(|n| *n.key()), Some(0));
    assert_eq!(tree.iter().len(), 1024);
    assert!(tree.iter().copied().eq(0..1024));
}

#[test]
fn test_zigzag_inserts_stay_balanced() {
    let mut tree = RbTree::new();
    for i in 0..500 {
        tree.insert(if i % 2 == 0 { i } else { 1000 - i });
        assert_balanced(&tree);
    }
    assert_eq!(tree.len(), 500);
}

#[cfg(feature = "rand")]
#[test]
fn test_random_inserts_keep_multiset() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut tree = RbTree::new();
    let mut inserted = Vec::new();
    for i in 0..2000 {
        let key: u16 = rng.gen_range(0..300);
        tree.insert(key);
        inserted.push(key);
        if i % 97 == 0 {
            assert_balanced(&tree);
        }
    }
    assert_balanced(&tree);

    inserted.sort();
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), inserted);
    let min = *tree.minimum().unwrap().key();
    assert_eq!(min, inserted[0]);
    assert!(tree.iter().all(|k| min <= *k));

    let mut by_level: Vec<_> = tree.traverse_levels().map(|(k, ..)| *k).collect();
    by_level.sort();
    assert_eq!(by_level, inserted);
    assert!(tree.contains(&inserted[1000]));
    assert!(!tree.contains(&300));
}

#[test]
fn test_traversal_reports_children() {
    let tree: RbTree<i32> = [20, 10, 30, 5].into_iter().collect();
    for (key, _, left, right) in tree.traverse_levels() {
        if let Some(l) = left {
            assert!(l <= key);
        }
        if let Some(r) = right {
            assert!(r > key);
        }
    }
    assert_eq!(
        levels(&tree),
        [
            (20, Color::Black, Some(10), Some(30)),
            (10, Color::Black, Some(5), None),
            (30, Color::Black, None, None),
            (5, Color::Red, None, None),
        ]
    );
}

#[test]
fn test_drop_releases_every_key() {
    let words: Vec<_> = ["pear", "apple", "fig", "kiwi", "plum", "date"]
        .into_iter()
        .map(|w| Rc::new(w.to_string()))
        .collect();
    let mut tree = RbTree::new();
    for word in &words {
        tree.insert(Rc::clone(word));
    }
    assert_balanced(&tree);
    assert_eq!(tree.minimum().map(|n| n.key().as_str()), Some("apple"));
    assert!(format!("{tree:?}").contains("\"kiwi\""));
    assert!(words.iter().all(|w| Rc::strong_count(w) == 2));

    drop(tree);
    assert!(words.iter().all(|w| Rc::strong_count(w) == 1));
}

#[test]
fn test_equal_keys_split_across_rotation() {
    // the third 10 triggers a right rotation that lifts the middle one
    let tree: RbTree<i32> = [10, 10, 10].into_iter().collect();
    assert_eq!(
        levels(&tree),
        [
            (10, Color::Black, Some(10), Some(10)),
            (10, Color::Red, None, None),
            (10, Color::Red, None, None),
        ]
    );
    assert_eq!(tree.validate(), Ok(1));
}

#[test]
fn test_long_run_of_equal_keys_stays_valid() {
    let mut tree = RbTree::new();
    for _ in 0..300 {
        tree.insert(7u8);
        assert_balanced(&tree);
    }
    assert_eq!(tree.len(), 300);
    assert!(tree.iter().all(|k| *k == 7));
    assert_eq!(tree.minimum().map(|n| *n.key()), Some(7));
}

#[test]
fn test_contains_with_duplicates() {
    let tree: RbTree<i32> = [5, 3, 5, 8, 5, 3, 5, 1].into_iter().collect();
    assert_balanced(&tree);
    for key in [1, 3, 5, 8] {
        assert!(tree.contains(&key), "{key} missing");
    }
    for key in [0, 2, 4, 6, 9] {
        assert!(!tree.contains(&key), "{key} found");
    }
    assert_eq!(tree.iter().filter(|k| **k == 5).count(), 4);
}

fn sorted(mut keys: Vec<i32>) -> Vec<i32> {
    keys.sort();
    keys
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every prefix of a random insert sequence keeps the red-black shape.
    #[test]
    fn inserts_keep_invariants(keys in proptest::collection::vec(0..50i32, 0..500)) {
        let mut tree = RbTree::new();
        for key in &keys {
            tree.insert(*key);
            prop_assert!(tree.validate().is_ok(), "{:?} after {}", tree.validate(), key);
        }
        let bound = 2.0 * ((tree.len() + 1) as f64).log2();
        prop_assert!(tree.height() as f64 <= bound);
    }

    #[test]
    fn inserts_keep_multiset(keys in proptest::collection::vec(0..50i32, 0..500)) {
        let tree: RbTree<i32> = keys.iter().copied().collect();
        prop_assert_eq!(tree.len(), keys.len());
        prop_assert_eq!(tree.iter().copied().collect::<Vec<_>>(), sorted(keys.clone()));
        let by_level = tree.traverse_levels().map(|(k, ..)| *k).collect();
        prop_assert_eq!(sorted(by_level), sorted(keys));
    }

    #[test]
    fn minimum_is_smallest_key(keys in proptest::collection::vec(0..50i32, 0..500)) {
        let tree: RbTree<i32> = keys.iter().copied().collect();
        prop_assert_eq!(tree.minimum().map(|n| *n.key()), keys.iter().min().copied());
        prop_assert_eq!(tree.maximum().map(|n| *n.key()), keys.iter().max().copied());
        for key in 0..50 {
            prop_assert_eq!(tree.contains(&key), keys.contains(&key));
        }
    }
}
