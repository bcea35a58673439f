//! Lets a map pick out the keys that are strings underneath, without the map
//! itself caring what its key type is.

use std::{borrow::Cow, fmt, rc::Rc, sync::Arc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A key which may or may not be string-shaped.
pub trait StringKey {
    /// The key as a string slice, or `None` when it is some other kind of
    /// key.
    fn as_str_key(&self) -> Option<&str>;
}

impl StringKey for String {
    fn as_str_key(&self) -> Option<&str> {
        Some(self)
    }
}

impl StringKey for str {
    fn as_str_key(&self) -> Option<&str> {
        Some(self)
    }
}

impl<T> StringKey for &T
where
    T: StringKey + ?Sized,
{
    fn as_str_key(&self) -> Option<&str> {
        (**self).as_str_key()
    }
}

impl StringKey for Box<str> {
    fn as_str_key(&self) -> Option<&str> {
        Some(self)
    }
}

impl StringKey for Rc<str> {
    fn as_str_key(&self) -> Option<&str> {
        Some(self)
    }
}

impl StringKey for Arc<str> {
    fn as_str_key(&self) -> Option<&str> {
        Some(self)
    }
}

impl<'a> StringKey for Cow<'a, str> {
    fn as_str_key(&self) -> Option<&str> {
        Some(self)
    }
}

macro_rules! never_string_key {
    ($($t:ty),*) => {
        $(
            impl StringKey for $t {
                fn as_str_key(&self) -> Option<&str> {
                    None
                }
            }
        )*
    };
}

never_string_key!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char
);

/// A key for maps whose key domain mixes strings with other scalars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Key {
    Str(String),
    Int(i64),
    UInt(u64),
    Bool(bool),
}

impl StringKey for Key {
    fn as_str_key(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => f.write_str(s),
            Key::Int(i) => write!(f, "{}", i),
            Key::UInt(u) => write!(f, "{}", u),
            Key::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i64::from(i))
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<u32> for Key {
    fn from(u: u32) -> Self {
        Key::UInt(u64::from(u))
    }
}

impl From<u64> for Key {
    fn from(u: u64) -> Self {
        Key::UInt(u)
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}
