//! A loosely-typed bag of settings. Values go in as whatever they happen to
//! be and come out as whatever the caller asks for, coerced where that makes
//! sense and defaulted where it doesn't.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ordered_map::OrderedMap;

/// Why a [`Param`] couldn't produce the type asked of it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("parameter has no value")]
    Missing,

    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot parse {input:?} as {expected}")]
    Parse {
        expected: &'static str,
        input: String,
    },
}

/// A dynamically-typed setting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// A short name for the kind of value, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }

    fn mismatch(&self, expected: &'static str) -> ParamError {
        match self {
            Value::Null => ParamError::Missing,
            other => ParamError::Mismatch {
                expected,
                found: other.kind(),
            },
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                for item in items {
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! value_from {
    ($variant:ident: $($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from!(Bool: bool);
value_from!(Int: i8, i16, i32, i64, u8, u16, u32);
value_from!(Float: f32, f64);
value_from!(Str: String, &str);

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Accepts the same spellings as a Go-style `ParseBool`.
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn parse_error(expected: &'static str, input: &str) -> ParamError {
    ParamError::Parse {
        expected,
        input: input.to_owned(),
    }
}

/// One setting pulled out of a [`Params`] bag. The infallible accessors
/// return the type's default when the value can't be coerced; the `try_`
/// variants say why.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Param(Value);

impl Param {
    pub fn new(value: impl Into<Value>) -> Self {
        Param(value.into())
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// True for a param that was never set.
    pub fn is_empty(&self) -> bool {
        self.0 == Value::Null
    }

    /// Scalars render with their usual formatting and a list of strings is
    /// concatenated without separators. A list holding anything but strings
    /// is a mismatch.
    pub fn try_string(&self) -> Result<String, ParamError> {
        match &self.0 {
            Value::Str(s) => Ok(s.clone()),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => {
                Ok(self.0.to_string())
            }
            Value::List(items) => items
                .iter()
                .map(|item| match item {
                    Value::Str(s) => Ok(s.as_str()),
                    other => Err(other.mismatch("string")),
                })
                .collect(),
            Value::Null => Err(ParamError::Missing),
        }
    }

    pub fn string(&self) -> String {
        self.try_string().unwrap_or_default()
    }

    /// Strings parse as base-10 integers; floats truncate toward zero.
    pub fn try_int64(&self) -> Result<i64, ParamError> {
        match &self.0 {
            Value::Int(i) => Ok(*i),
            Value::Float(x) => Ok(*x as i64),
            Value::Str(s) => s.parse().map_err(|_| parse_error("int", s)),
            other => Err(other.mismatch("int")),
        }
    }

    pub fn int64(&self) -> i64 {
        self.try_int64().unwrap_or_default()
    }

    pub fn try_float64(&self) -> Result<f64, ParamError> {
        match &self.0 {
            Value::Float(x) => Ok(*x),
            Value::Int(i) => Ok(*i as f64),
            Value::Str(s) => s.parse().map_err(|_| parse_error("float", s)),
            other => Err(other.mismatch("float")),
        }
    }

    pub fn float64(&self) -> f64 {
        self.try_float64().unwrap_or_default()
    }

    pub fn try_bool(&self) -> Result<bool, ParamError> {
        match &self.0 {
            Value::Bool(b) => Ok(*b),
            Value::Str(s) => parse_bool(s).ok_or_else(|| parse_error("bool", s)),
            other => Err(other.mismatch("bool")),
        }
    }

    pub fn bool(&self) -> bool {
        self.try_bool().unwrap_or_default()
    }

    /// The elements of a list which can be read as strings; nested lists of
    /// strings are flattened. Anything but a list yields nothing.
    pub fn strings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Value::List(items) = &self.0 {
            for item in items {
                match item {
                    Value::Str(s) => out.push(s.clone()),
                    Value::Int(_) | Value::Float(_) => out.push(item.to_string()),
                    Value::List(nested) => out.extend(nested.iter().filter_map(
                        |v| match v {
                            Value::Str(s) => Some(s.clone()),
                            _ => None,
                        },
                    )),
                    Value::Null | Value::Bool(_) => {}
                }
            }
        }
        out
    }

    /// The elements of a list which coerce to integers. Anything but a list
    /// yields nothing.
    pub fn ints(&self) -> Vec<i64> {
        self.list_of(Param::try_int64)
    }

    /// The elements of a list which coerce to floats. Anything but a list
    /// yields nothing.
    pub fn floats(&self) -> Vec<f64> {
        self.list_of(Param::try_float64)
    }

    fn list_of<T>(&self, f: fn(&Param) -> Result<T, ParamError>) -> Vec<T> {
        match &self.0 {
            Value::List(items) => items
                .iter()
                .filter_map(|item| f(&Param(item.clone())).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Param(value)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

static EMPTY: Param = Param(Value::Null);

/// A keyed collection of [`Param`]s which remembers the order keys were
/// first set in.
#[derive(Debug, Clone, Default)]
pub struct Params {
    params: OrderedMap<String, Param>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bag from several layers of settings. The first layer to
    /// mention a key wins, so pass the most specific settings first and the
    /// defaults last.
    pub fn parse<I, L, K, V>(layers: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut params = Self::new();
        for layer in layers {
            for (key, value) in layer {
                let key = key.into();
                if !params.has(&key) {
                    params.add(key, value);
                }
            }
        }
        params
    }

    /// Sets `key`, replacing anything already there. Chains.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.params.insert(key.into(), Param::new(value));
        self
    }

    /// The param at `key`, or an empty one if it was never set.
    pub fn get(&self, key: &str) -> &Param {
        self.params.get(key).unwrap_or(&EMPTY)
    }

    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Keys in the order they were first set.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.params.ordered_keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> + '_ {
        self.params.iter().map(|(_, k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params::parse(std::iter::once(iter))
    }
}
