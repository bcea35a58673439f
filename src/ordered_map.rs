//! A hash map that remembers the order its keys were first inserted in.

use std::{
    borrow::Borrow,
    collections::{hash_map::RandomState, HashMap},
    fmt,
    hash::{BuildHasher, Hash},
    mem,
};

use log::trace;

use crate::linked_list::{self, LinkedList, NodeHandle};
use crate::string_key::StringKey;

/// Stores a value in the map with the handle to its key's position in the
/// order sequence.
#[derive(Clone)]
struct Slot<V> {
    /// The value being stored.
    value: V,

    /// A handle to this entry's position in the order sequence.
    node: NodeHandle,
}

/// A layer on top of [`HashMap`] which keeps a second structure, the order
/// sequence, recording the order keys were first inserted in. Overwriting a
/// key leaves it where it was; removing a key unlinks it without disturbing
/// anyone else.
///
/// Lookup, insertion, update and removal are all O(1). Ordered iteration
/// walks the order sequence and resolves each key against the map.
///
/// This type is not synchronised; see [`SharedOrderedMap`] for the variant
/// that can be shared across threads.
///
/// [`SharedOrderedMap`]: crate::SharedOrderedMap
#[derive(Clone)]
pub struct OrderedMap<K, V, S = RandomState>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    entries: HashMap<K, Slot<V>, S>,
    order: LinkedList<K>,
}

impl<K, V> OrderedMap<K, V, RandomState>
where
    K: Eq + Hash + Clone,
{
    /// Makes a new, empty map.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Makes a new map with room for `capacity` entries before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hash_builder(capacity, Default::default())
    }
}

impl<K, V, S> OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    pub fn with_capacity_and_hash_builder(
        capacity: usize,
        hash_builder: S,
    ) -> Self {
        Self {
            entries: HashMap::with_capacity_and_hasher(capacity, hash_builder),
            order: LinkedList::with_capacity(capacity),
        }
    }

    /// Stores `v` under `k`, returning the previous value at that key. A new
    /// key goes to the back of the order; an existing key keeps its place.
    pub fn insert(&mut self, k: K, v: V) -> Option<V> {
        if let Some(slot) = self.entries.get_mut(&k) {
            trace!("overwriting existing entry in place");
            let previous = mem::replace(&mut slot.value, v);

            #[cfg(test)]
            self.continuity_test();

            return Some(previous);
        }

        let node = self.order.push_back(k.clone());
        self.entries.insert(k, Slot { value: v, node });
        trace!("appended new entry at position {}", self.len() - 1);

        #[cfg(test)]
        self.continuity_test();

        None
    }

    /// Overwrites the value at `k` only if `k` is already present, handing
    /// back the new value. Never creates a key: an absent key yields `None`
    /// and leaves the map untouched.
    pub fn update<Q>(&mut self, k: &Q, v: V) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.entries.get_mut(k) {
            Some(slot) => {
                slot.value = v;
                Some(&slot.value)
            }
            None => {
                trace!("ignoring update of absent key");
                None
            }
        }
    }

    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(k).map(|slot| &slot.value)
    }

    pub fn get_mut<Q>(&mut self, k: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_mut(k).map(|slot| &mut slot.value)
    }

    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(k)
    }

    /// Removes `k` from both the map and the order sequence, returning its
    /// value if it was present.
    pub fn remove<Q>(&mut self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.entries.remove(k)?;
        self.order.remove_node(slot.node);
        trace!("removed entry, {} remain", self.len());

        #[cfg(test)]
        self.continuity_test();

        Some(slot.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();

        #[cfg(test)]
        {
            assert_eq!(0, self.len());
            self.continuity_test();
        }
    }

    /// The number of entries, which is also the length of the order.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every key in the map, in no particular order. Use
    /// [`ordered_keys`](Self::ordered_keys) or [`iter`](Self::iter) when the
    /// order matters.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.keys()
    }

    /// Every key in insertion order.
    pub fn ordered_keys(&self) -> impl ExactSizeIterator<Item = &K> + '_ {
        self.order.iter()
    }

    /// The keys which are strings underneath, in no particular order. Keys of
    /// any other kind are skipped.
    pub fn string_keys(&self) -> Vec<String>
    where
        K: StringKey,
    {
        self.entries
            .keys()
            .filter_map(|k| k.as_str_key())
            .map(str::to_owned)
            .collect()
    }

    /// Walks the map in insertion order, yielding each entry with its
    /// 0-based position.
    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter {
            keys: self.order.iter(),
            index: 0,
            entries: &self.entries,
        }
    }

    #[cfg(test)]
    fn continuity_test(&self) {
        // the order holds exactly one node per entry
        assert_eq!(self.entries.len(), self.order.len());

        let mut count = 0;
        for k in self.order.iter() {
            count += 1;
            assert!(count <= self.len());
            assert!(self.entries.contains_key(k));
        }
        assert_eq!(self.len(), count);

        // and every entry's handle points back at its own key, so no key
        // can appear in the order twice
        for (k, slot) in self.entries.iter() {
            assert!(self.order.get(slot.node) == Some(k));
        }
    }
}

impl<K, V, S> Default for OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_capacity_and_hash_builder(0, S::default())
    }
}

impl<K, V, S> fmt::Debug for OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(_, k, v)| (k, v)))
            .finish()
    }
}

impl<K, V, S> Extend<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    type Item = (usize, &'a K, &'a V);
    type IntoIter = Iter<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Insertion-order iterator over an [`OrderedMap`].
pub struct Iter<'a, K, V, S> {
    keys: linked_list::Iter<'a, K>,
    index: usize,
    entries: &'a HashMap<K, Slot<V>, S>,
}

impl<'a, K, V, S> Iterator for Iter<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (usize, &'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries;
        for k in &mut self.keys {
            let index = self.index;
            self.index += 1;

            if let Some(slot) = entries.get(k) {
                return Some((index, k, &slot.value));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::OrderedMap;

    fn order(map: &OrderedMap<&'static str, u32>) -> Vec<&'static str> {
        map.iter().map(|(_, k, _)| *k).collect()
    }

    #[test]
    fn insertion_order_is_kept() {
        let mut map = OrderedMap::new();
        assert_eq!(None, map.insert("c", 3));
        assert_eq!(None, map.insert("a", 1));
        assert_eq!(None, map.insert("b", 2));

        assert_eq!(vec!["c", "a", "b"], order(&map));
        let positions: Vec<usize> = map.iter().map(|(i, _, _)| i).collect();
        assert_eq!(vec![0, 1, 2], positions);
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut map = OrderedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);

        assert_eq!(Some(1), map.insert("a", 10));
        assert_eq!(Some(&20), map.update("b", 20));

        assert_eq!(2, map.len());
        assert_eq!(vec!["a", "b"], order(&map));
        assert_eq!(Some(&10), map.get("a"));
    }

    #[test]
    fn update_never_inserts() {
        let mut map: OrderedMap<&'static str, u32> = OrderedMap::new();
        assert_eq!(None, map.update("missing", 1));
        assert!(map.is_empty());
        assert!(!map.contains_key("missing"));
    }

    /// Adds three elements to the map and removes the middle, then the head
    /// node, to ensure the structure remains consistent throughout.
    #[test]
    fn head_removal() {
        let mut map = OrderedMap::with_capacity(5);
        map.insert("a", 0);
        map.insert("b", 1);
        map.insert("c", 2);

        assert_eq!(Some(1), map.remove("b"));
        assert_eq!(vec!["a", "c"], order(&map));
        assert_eq!(Some(0), map.remove("a"));
        assert_eq!(vec!["c"], order(&map));
        assert_eq!(Some(2), map.remove("c"));
        assert!(order(&map).is_empty());
        assert_eq!(None, map.remove("c"));
    }

    /// Same as above, but takes the tail out second.
    #[test]
    fn tail_removal() {
        let mut map = OrderedMap::with_capacity(5);
        map.insert("a", 0);
        map.insert("b", 1);
        map.insert("c", 2);

        assert_eq!(Some(1), map.remove("b"));
        assert_eq!(Some(2), map.remove("c"));
        assert_eq!(vec!["a"], order(&map));
        assert_eq!(Some(0), map.remove("a"));
        assert!(map.is_empty());
    }

    #[test]
    fn reinserted_key_goes_to_the_back() {
        let mut map = OrderedMap::new();
        map.insert("a", 0);
        map.insert("b", 1);
        map.remove("a");
        map.insert("a", 2);

        assert_eq!(vec!["b", "a"], order(&map));
    }

    #[test]
    fn keys_and_string_keys() {
        let mut map = OrderedMap::new();
        map.insert(String::from("x"), 1);
        map.insert(String::from("y"), 2);

        let mut keys: Vec<&String> = map.keys().collect();
        keys.sort();
        assert_eq!(vec!["x", "y"], keys);

        let mut strings = map.string_keys();
        strings.sort();
        assert_eq!(vec!["x", "y"], strings);

        let ordered: Vec<&String> = map.ordered_keys().collect();
        assert_eq!(vec!["x", "y"], ordered);
    }

    #[test]
    fn collect_and_debug() {
        let map: OrderedMap<&'static str, u32> =
            vec![("b", 2), ("a", 1), ("b", 3)].into_iter().collect();

        assert_eq!(2, map.len());
        assert_eq!(r#"{"b": 3, "a": 1}"#, format!("{:?}", map));
    }

    #[test]
    fn clear() {
        let mut map = OrderedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.clear();

        assert!(map.is_empty());
        map.insert("c", 3);
        assert_eq!(vec!["c"], order(&map));
    }
}
