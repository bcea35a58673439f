//! Insertion-ordered maps, plus a couple of small things that like to live in
//! them.
//!
//! [`OrderedMap`] is a hash map which also keeps its keys in the order they
//! were first inserted. Overwriting a key leaves it where it was; removing one
//! doesn't disturb anybody else. [`SharedOrderedMap`] wraps it up behind a
//! single lock so it can be handed around between threads, and walks it with
//! a [`Traversal`] that copes with entries vanishing underneath it.
//!
//! ```
//! use ordered_bag::SharedOrderedMap;
//!
//! let map = SharedOrderedMap::new();
//! map.add("first", 1);
//! map.add("second", 2);
//! map.update("first", 10);
//!
//! let keys: Vec<&str> = map.traverse().map(|e| e.key).collect();
//! assert_eq!(vec!["first", "second"], keys);
//! assert_eq!(Some(10), map.get("first"));
//! ```
//!
//! With the `counters` feature, [`CounterRegistry`] keeps named atomic
//! counters with update callbacks. With the `params` feature, [`Params`] is a
//! loosely-typed settings bag with coercing accessors.

mod linked_list;
mod ordered_map;
mod shared_map;
mod string_key;

#[cfg(feature = "counters")]
pub mod counter;
#[cfg(feature = "params")]
pub mod params;

pub use crate::ordered_map::{Iter, OrderedMap};
pub use crate::shared_map::{Entry, SharedOrderedMap, Traversal};
pub use crate::string_key::{Key, StringKey};

#[cfg(feature = "counters")]
pub use crate::counter::{AtomicCounter, CounterRegistry, CounterSnapshot};
#[cfg(feature = "params")]
pub use crate::params::{Param, ParamError, Params, Value};
