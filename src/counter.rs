//! Named atomic counters which notify interested parties after every update.

use std::{
    fmt,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use log::debug;
use parking_lot::RwLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::shared_map::SharedOrderedMap;

/// Something to run after a counter has been updated. It sees the counter
/// with the update already applied.
pub type Callback = Arc<dyn Fn(&AtomicCounter) + Send + Sync>;

/// A single named counter.
pub struct AtomicCounter {
    token: String,
    count: AtomicI64,
    callbacks: RwLock<Vec<Callback>>,
}

impl AtomicCounter {
    pub fn new(token: impl Into<String>, initial: i64) -> Self {
        Self {
            token: token.into(),
            count: AtomicI64::new(initial),
            callbacks: RwLock::new(Vec::new()),
        }
    }

    /// The name this counter was registered under.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Adds `delta` (which may be negative) and returns the updated count,
    /// then runs every callback. Overflow wraps.
    pub fn add(&self, delta: i64) -> i64 {
        let count = self.count.fetch_add(delta, Ordering::SeqCst).wrapping_add(delta);

        // copy the callbacks out so one of them can register another without
        // deadlocking against us
        let callbacks = self.callbacks.read().clone();
        for callback in callbacks.iter() {
            callback(self);
        }

        count
    }

    pub fn get(&self) -> i64 {
        self.count.load(Ordering::SeqCst)
    }

    /// Registers a callback, returning whether the callback list grew.
    pub fn add_callback<F>(&self, f: F) -> bool
    where
        F: Fn(&AtomicCounter) + Send + Sync + 'static,
    {
        let mut callbacks = self.callbacks.write();
        let before = callbacks.len();
        callbacks.push(Arc::new(f));
        callbacks.len() > before
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            token: self.token.clone(),
            count: self.get(),
        }
    }
}

impl fmt::Debug for AtomicCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicCounter")
            .field("token", &self.token)
            .field("count", &self.get())
            .field("callbacks", &self.callbacks.read().len())
            .finish()
    }
}

/// A point-in-time reading of one counter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CounterSnapshot {
    pub token: String,
    pub count: i64,
}

/// A set of counters addressed by name. Cloning the registry hands out
/// another handle to the same counters, so it can be passed to whichever
/// subsystem needs it.
#[derive(Clone, Default)]
pub struct CounterRegistry {
    counters: SharedOrderedMap<String, Arc<AtomicCounter>>,
}

impl CounterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to the counter named `token` and returns its new count.
    /// A counter which doesn't exist yet is created with `delta` as its
    /// starting value; creation does not run callbacks, since there can't
    /// be any yet.
    pub fn count(&self, token: &str, delta: i64) -> i64 {
        if let Some(counter) = self.counters.get(token) {
            return counter.add(delta);
        }

        let (counter, created) = self.counters.get_or_add(
            token.to_owned(),
            Arc::new(AtomicCounter::new(token, delta)),
        );

        if created {
            debug!("created counter {:?} at {}", token, delta);
            delta
        } else {
            // somebody else created it between our lookup and our insert
            counter.add(delta)
        }
    }

    /// Applies the same delta to several counters at once.
    pub fn count_many<I>(&self, tokens: I, delta: i64)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for token in tokens {
            self.count(token.as_ref(), delta);
        }
    }

    /// Registers a callback on the counter named `token`, creating the
    /// counter at zero if needed. Returns whether the callback was added.
    pub fn add_callback<F>(&self, token: &str, f: F) -> bool
    where
        F: Fn(&AtomicCounter) + Send + Sync + 'static,
    {
        let (counter, created) = self.counters.get_or_add(
            token.to_owned(),
            Arc::new(AtomicCounter::new(token, 0)),
        );

        if created {
            debug!("created counter {:?} to hold a callback", token);
        }

        counter.add_callback(f)
    }

    /// The count for `token`, or 0 for a counter that doesn't exist.
    pub fn get(&self, token: &str) -> i64 {
        self.counter(token).map_or(0, |counter| counter.get())
    }

    pub fn counter(&self, token: &str) -> Option<Arc<AtomicCounter>> {
        self.counters.get(token)
    }

    /// Drops the counter named `token` from the registry. Anyone still
    /// holding it keeps a working, but unregistered, counter.
    pub fn remove(&self, token: &str) -> Option<Arc<AtomicCounter>> {
        let removed = self.counters.remove(token);
        if removed.is_some() {
            debug!("removed counter {:?}", token);
        }
        removed
    }

    /// Drops every counter.
    pub fn clear(&self) {
        self.counters.clear();
    }

    pub fn len(&self) -> usize {
        self.counters.count()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Counter names in the order they were created.
    pub fn tokens(&self) -> Vec<String> {
        self.counters.ordered_keys()
    }

    /// Reads every counter, in the order they were created.
    pub fn snapshot(&self) -> Vec<CounterSnapshot> {
        self.counters
            .traverse()
            .map(|entry| entry.value.snapshot())
            .collect()
    }
}

impl fmt::Debug for CounterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.snapshot()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    };

    use super::{AtomicCounter, CounterRegistry, CounterSnapshot};

    #[test]
    fn counter_adds_and_notifies() {
        let counter = AtomicCounter::new("hits", 5);
        let seen = Arc::new(AtomicI64::new(0));

        let seen_by_callback = seen.clone();
        assert!(counter.add_callback(move |c| {
            seen_by_callback.store(c.get(), Ordering::SeqCst);
        }));

        assert_eq!(8, counter.add(3));
        assert_eq!(8, seen.load(Ordering::SeqCst));
        assert_eq!(6, counter.add(-2));
        assert_eq!(6, seen.load(Ordering::SeqCst));
        assert_eq!("hits", counter.token());
    }

    #[test]
    fn callbacks_may_register_callbacks() {
        let counter = AtomicCounter::new("nested", 0);
        counter.add_callback(|c| {
            c.add_callback(|_| {});
        });

        counter.add(1);
        counter.add(1);
        assert_eq!(3, counter.callbacks.read().len());
    }

    #[test]
    fn registry_creates_on_first_count() {
        let registry = CounterRegistry::new();

        assert_eq!(10, registry.count("jobs", 10));
        assert_eq!(7, registry.count("jobs", -3));
        assert_eq!(7, registry.get("jobs"));
        assert_eq!(0, registry.get("missing"));
        assert!(registry.counter("missing").is_none());
    }

    #[test]
    fn creation_does_not_fire_callbacks() {
        let registry = CounterRegistry::new();
        let fired = Arc::new(AtomicI64::new(0));

        let fired_by_callback = fired.clone();
        assert!(registry.add_callback("queued", move |_| {
            fired_by_callback.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(0, registry.get("queued"));

        registry.count("queued", 2);
        registry.count_many(vec!["queued", "other"], 1);

        assert_eq!(2, fired.load(Ordering::SeqCst));
        assert_eq!(3, registry.get("queued"));
        assert_eq!(1, registry.get("other"));
    }

    #[test]
    fn snapshot_is_in_creation_order() {
        let registry = CounterRegistry::new();
        registry.count("b", 2);
        registry.count("a", 1);
        registry.count("b", 1);

        assert_eq!(vec!["b", "a"], registry.tokens());
        assert_eq!(
            vec![
                CounterSnapshot {
                    token: "b".to_owned(),
                    count: 3
                },
                CounterSnapshot {
                    token: "a".to_owned(),
                    count: 1
                },
            ],
            registry.snapshot()
        );
    }

    #[test]
    fn remove_and_clear() {
        let registry = CounterRegistry::new();
        registry.count("a", 1);
        registry.count("b", 1);

        let a = registry.remove("a").unwrap();
        assert_eq!(2, a.add(1));
        assert_eq!(0, registry.get("a"));
        assert!(registry.remove("a").is_none());
        assert_eq!(1, registry.len());

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn clones_share_counters() {
        let registry = CounterRegistry::new();
        let other = registry.clone();

        other.count("shared", 4);
        assert_eq!(4, registry.get("shared"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_serializes_with_plain_field_names() {
        let snapshot = AtomicCounter::new("t", 2).snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(r#"{"token":"t","count":2}"#, json);
    }
}
