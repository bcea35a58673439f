use parking_lot::RwLock;
use std::{
    borrow::Borrow,
    collections::hash_map::RandomState,
    fmt,
    hash::{BuildHasher, Hash},
    iter::{Enumerate, FusedIterator},
    sync::Arc,
    vec,
};

use log::trace;

use crate::ordered_map::OrderedMap;
use crate::string_key::StringKey;

/// Wrapper for an [`OrderedMap`] which is shareable across thread
/// boundaries. Cloning the wrapper hands out another handle to the same map.
///
/// Every mutation holds the write lock for the whole of the map and order
/// update, so no reader ever sees one without the other. Reads take the read
/// lock and clone the value out, so no reference escapes the lock and no
/// caller code ever runs while it is held.
pub struct SharedOrderedMap<K, V, S = RandomState>(Arc<RwLock<OrderedMap<K, V, S>>>)
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher;

impl<K, V> SharedOrderedMap<K, V, RandomState>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::with_map(OrderedMap::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_map(OrderedMap::with_capacity(capacity))
    }
}

impl<K, V, S> SharedOrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    pub fn with_capacity_and_hash_builder(
        capacity: usize,
        hash_builder: S,
    ) -> Self {
        Self::with_map(OrderedMap::with_capacity_and_hash_builder(
            capacity,
            hash_builder,
        ))
    }

    /// Wraps a map into a shared accessor, making it safe to move across
    /// thread boundaries. Whatever order the map already has is kept.
    pub fn with_map(map: OrderedMap<K, V, S>) -> Self {
        Self(Arc::new(RwLock::new(map)))
    }

    /// Stores `v` under `k` and returns the stored value. A new key is
    /// appended to the order; an existing key is overwritten where it stands.
    /// Concurrent adds of the same key resolve to whoever takes the lock last.
    pub fn add(&self, k: K, v: V) -> V {
        let stored = v.clone();
        self.0.write().insert(k, v);
        stored
    }

    /// Stores `v` under `k` unless `k` is already present. Returns the value
    /// now in the map, and whether it is the one passed in.
    pub fn get_or_add(&self, k: K, v: V) -> (V, bool) {
        let mut map = self.0.write();
        if let Some(existing) = map.get(&k) {
            return (existing.clone(), false);
        }

        map.insert(k, v.clone());
        (v, true)
    }

    /// Overwrites the value at `k` if it is present, returning the new value.
    /// `None` means nothing was written: update never creates a key.
    pub fn update<Q>(&self, k: &Q, v: V) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.write().update(k, v).cloned()
    }

    /// Get a copy of the value at `k`. This clones it to minimize the lock
    /// time of the map.
    pub fn get<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.read().get(k).cloned()
    }

    pub fn has<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.read().contains_key(k)
    }

    /// Removes `k` from the map and from the order, reporting whether it was
    /// there to begin with.
    pub fn delete<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove(k).is_some()
    }

    /// Remove an entry from the map, returning the removed value if it
    /// existed.
    pub fn remove<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.write().remove(k)
    }

    /// Clears the map.
    pub fn clear(&self) {
        self.0.write().clear()
    }

    /// The number of entries in the map at present.
    pub fn count(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// A snapshot of every key, in no particular order.
    pub fn keys(&self) -> Vec<K> {
        self.0.read().keys().cloned().collect()
    }

    /// A snapshot of every key, in insertion order.
    pub fn ordered_keys(&self) -> Vec<K> {
        self.0.read().ordered_keys().cloned().collect()
    }

    /// A snapshot of the keys which are strings underneath, in no particular
    /// order.
    pub fn string_keys(&self) -> Vec<String>
    where
        K: StringKey,
    {
        self.0.read().string_keys()
    }

    /// Starts a fresh pass over the map in insertion order.
    ///
    /// The order is copied when this is called; each value is then looked up
    /// in the live map as the traversal reaches it. A key deleted in the
    /// meantime is skipped, and keys added after the call are not visited.
    /// The lock is only held for the copy and for each lookup, never while
    /// the caller is handling an entry.
    pub fn traverse(&self) -> Traversal<K, V, S> {
        Traversal {
            map: self.clone(),
            keys: self.ordered_keys().into_iter().enumerate(),
        }
    }

    /// An owned, unsynchronised copy of the map with its order intact.
    pub fn snapshot(&self) -> OrderedMap<K, V, S>
    where
        S: Clone,
    {
        (*self.0.read()).clone()
    }
}

impl<K, V, S> Clone for SharedOrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn clone(&self) -> Self {
        SharedOrderedMap(self.0.clone())
    }
}

impl<K, V, S> Default for SharedOrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_map(OrderedMap::default())
    }
}

impl<K, V, S> From<OrderedMap<K, V, S>> for SharedOrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn from(map: OrderedMap<K, V, S>) -> Self {
        Self::with_map(map)
    }
}

impl<K, V, S> fmt::Debug for SharedOrderedMap<K, V, S>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone + fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedOrderedMap")
            .field(&*self.0.read())
            .finish()
    }
}

/// One entry visited by a [`Traversal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    /// The key's 0-based position in the order when the traversal started.
    pub index: usize,
    pub key: K,
    pub value: V,
}

/// A single lazy pass over a [`SharedOrderedMap`] in insertion order. See
/// [`SharedOrderedMap::traverse`].
pub struct Traversal<K, V, S = RandomState>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    map: SharedOrderedMap<K, V, S>,
    keys: Enumerate<vec::IntoIter<K>>,
}

impl<K, V, S> Iterator for Traversal<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    type Item = Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, key) in &mut self.keys {
            match self.map.get(&key) {
                Some(value) => return Some(Entry { index, key, value }),
                None => trace!("skipping entry {} removed mid-traversal", index),
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.keys.size_hint().1)
    }
}

impl<K, V, S> FusedIterator for Traversal<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
}
