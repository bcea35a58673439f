//! Ordering and membership behaviour of the shared map, driven only through
//! its public interface.
use ordered_bag::{Key, SharedOrderedMap};

fn traversal_keys<K, V>(map: &SharedOrderedMap<K, V>) -> Vec<K>
where
    K: Eq + std::hash::Hash + Clone,
    V: Clone,
{
    map.traverse().map(|entry| entry.key).collect()
}

#[test]
fn distinct_adds_come_back_in_order() {
    let _ = env_logger::try_init();

    let map = SharedOrderedMap::new();
    let keys: Vec<String> = (0..50).map(|i| format!("key-{}", (i * 37) % 50)).collect();
    for (i, k) in keys.iter().enumerate() {
        map.add(k.clone(), i);
    }

    assert_eq!(keys, traversal_keys(&map));
    let positions: Vec<usize> = map.traverse().map(|entry| entry.index).collect();
    assert_eq!((0..50).collect::<Vec<_>>(), positions);
}

#[test]
fn update_leaves_order_alone() {
    let map = SharedOrderedMap::new();
    map.add("k1", "v1");
    map.add("k2", "v2");

    assert_eq!(Some("v3"), map.update("k1", "v3"));
    assert_eq!(vec!["k1", "k2"], traversal_keys(&map));
    assert_eq!(Some("v3"), map.get("k1"));
}

#[test]
fn update_never_resurrects() {
    let map: SharedOrderedMap<&str, u32> = SharedOrderedMap::new();

    assert_eq!(None, map.update("missing", 1));
    assert_eq!(0, map.count());
    assert!(!map.has("missing"));
}

#[test]
fn delete_removes_from_both_structures() {
    let map = SharedOrderedMap::new();
    map.add("a", 1);

    assert!(map.delete("a"));
    assert!(!map.has("a"));
    assert_eq!(0, map.count());
    assert!(map.keys().is_empty());
    assert_eq!(0, map.traverse().count());
}

#[test]
fn re_add_overwrites_in_place() {
    let map = SharedOrderedMap::new();
    map.add("z", 0);
    map.add("a", 1);
    map.add("b", 5);
    map.add("a", 2);

    assert_eq!(3, map.count());
    assert_eq!(Some(2), map.get("a"));
    assert_eq!(vec!["z", "a", "b"], traversal_keys(&map));
}

#[test]
fn delete_keeps_relative_order_of_the_rest() {
    let map = SharedOrderedMap::new();
    for k in ["a", "b", "c", "d", "e"] {
        map.add(k, ());
    }

    map.delete("b");
    map.delete("d");
    map.add("f", ());

    assert_eq!(vec!["a", "c", "e", "f"], traversal_keys(&map));
    assert_eq!(vec!["a", "c", "e", "f"], map.ordered_keys());
}

#[test]
fn string_keys_skip_other_key_types() {
    let map = SharedOrderedMap::new();
    map.add(Key::from("a"), 1);
    map.add(Key::from(7i64), 2);

    assert_eq!(vec!["a".to_owned()], map.string_keys());
    assert_eq!(2, map.keys().len());
}

#[test]
fn plain_string_maps_are_all_string_keys() {
    let map = SharedOrderedMap::new();
    map.add(String::from("b"), 1);
    map.add(String::from("a"), 2);

    let mut keys = map.string_keys();
    keys.sort();
    assert_eq!(vec!["a", "b"], keys);
}
