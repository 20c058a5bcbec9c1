//! Integration tests for the B+tree index.
//!
//! Property tests check the tree against `std::collections::BTreeMap`.

use proptest::prelude::*;
use std::collections::BTreeMap;
use tabledb::index::BpTreeMap;
use tabledb::{Error, KeyIndex};

fn load<const ORDER: usize>(keys: &[i64]) -> (BpTreeMap<i64, i64, ORDER>, BTreeMap<i64, i64>) {
    let mut tree = BpTreeMap::<i64, i64, ORDER>::new();
    let mut model = BTreeMap::new();
    for &k in keys {
        let accepted = tree.put(k, k.wrapping_mul(10)).is_ok();
        let fresh = !model.contains_key(&k);
        assert_eq!(accepted, fresh, "put({}) disagreed with model", k);
        model.entry(k).or_insert(k.wrapping_mul(10));
    }
    (tree, model)
}

proptest! {
    #[test]
    fn prop_matches_model(keys in prop::collection::vec(-500i64..500, 0..300)) {
        let (tree, model) = load::<4>(&keys);

        prop_assert_eq!(tree.len(), model.len());
        prop_assert!(tree.check_invariants().is_ok());

        let entries: Vec<(i64, i64)> = tree.entries().into_iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(i64, i64)> = model.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(entries, expected);

        for k in -510i64..510 {
            prop_assert_eq!(tree.get(&k), model.get(&k));
        }
    }

    #[test]
    fn prop_range_maps_match_model(
        keys in prop::collection::vec(0i64..200, 1..150),
        a in 0i64..200,
        b in 0i64..200,
    ) {
        let (tree, model) = load::<5>(&keys);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        let head: Vec<i64> = tree.head_map(&hi).into_iter().map(|(k, _)| *k).collect();
        let tail: Vec<i64> = tree.tail_map(&lo).into_iter().map(|(k, _)| *k).collect();
        let sub: Vec<i64> = tree.sub_map(&lo, &hi).into_iter().map(|(k, _)| *k).collect();

        prop_assert_eq!(head, model.range(..hi).map(|(k, _)| *k).collect::<Vec<_>>());
        prop_assert_eq!(tail, model.range(lo..).map(|(k, _)| *k).collect::<Vec<_>>());
        prop_assert_eq!(sub, model.range(lo..hi).map(|(k, _)| *k).collect::<Vec<_>>());
    }

    #[test]
    fn prop_small_order_keeps_invariants(keys in prop::collection::vec(any::<i64>(), 0..200)) {
        let (tree, model) = load::<3>(&keys);

        prop_assert!(tree.check_invariants().is_ok());
        prop_assert_eq!(tree.first_key().ok(), model.keys().next());
        prop_assert_eq!(tree.last_key().ok(), model.keys().next_back());
    }
}

#[test]
fn test_descending_inserts() {
    let mut tree = BpTreeMap::<i64, String>::new();
    for k in (0..1000).rev() {
        tree.put(k, k.to_string()).unwrap();
    }

    tree.check_invariants().unwrap();
    assert_eq!(tree.len(), 1000);
    assert_eq!(tree.first_key().unwrap(), &0);
    assert_eq!(tree.last_key().unwrap(), &999);
    assert_eq!(tree.get(&512).map(String::as_str), Some("512"));
}

#[test]
fn test_empty_tree_errors() {
    let tree = BpTreeMap::<i64, i64>::new();

    assert!(matches!(tree.first_key(), Err(Error::EmptyStructure)));
    assert!(matches!(tree.last_key(), Err(Error::EmptyStructure)));
    assert!(tree.entries().is_empty());
    assert!(tree.sub_map(&10, &0).is_empty());
}

#[test]
fn test_through_trait_object() {
    fn fill(index: &mut dyn KeyIndex<i64, i64>) {
        for k in 0..100 {
            index.put(k, -k).unwrap();
        }
    }

    let mut tree = BpTreeMap::<i64, i64, 8>::new();
    fill(&mut tree);

    assert_eq!(KeyIndex::len(&tree), 100);
    assert_eq!(KeyIndex::get(&tree, &42), Some(&-42));
    assert!(tree.height() >= 2);
}
