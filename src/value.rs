//! # Cache Values
//!
//! This module defines `CacheValue`, the type of everything stored under a key in
//! the cache service. A value is a scalar (string, number, boolean or null), an
//! ordered list of values, or a string-keyed mapping of values.
//!
//! `CacheValue` is serialized and deserialized through `serde_json::Value`, so it
//! is JSON-identical on the wire. The client never validates the shape of a value
//! beyond JSON-serializability; the service decides what it is willing to store.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Represents the different shapes a cached value can take.
///
/// # Examples
///
/// ```rust
/// use kv_cache_client::CacheValue;
///
/// let cars = CacheValue::from(vec!["Toyota", "Opel", "Ford"]);
/// assert_eq!(cars.as_list().map(|l| l.len()), Some(3));
///
/// let month = CacheValue::from("June");
/// assert_eq!(month.as_str(), Some("June"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum CacheValue {
    /// JSON `null`.
    Null,
    /// A boolean value.
    Bool(bool),
    /// An integer or floating point number, kept exactly as the service sent it.
    Number(Number),
    /// A textual value.
    String(String),
    /// An ordered sequence of values.
    List(Vec<CacheValue>),
    /// A mapping from string keys to values.
    Map(BTreeMap<String, CacheValue>),
}

impl CacheValue {
    /// Returns the string slice if this is a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CacheValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an `i64` if it is an integral number that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CacheValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Returns the value as a `u64` if it is a non-negative integral number.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            CacheValue::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    /// Returns the value as an `f64` if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CacheValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CacheValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[CacheValue]> {
        match self {
            CacheValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, CacheValue>> {
        match self {
            CacheValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CacheValue::Null)
    }

    /// A short name of the value's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheValue::Null => "null",
            CacheValue::Bool(_) => "bool",
            CacheValue::Number(_) => "number",
            CacheValue::String(_) => "string",
            CacheValue::List(_) => "list",
            CacheValue::Map(_) => "map",
        }
    }
}

impl From<Value> for CacheValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => CacheValue::Null,
            Value::Bool(b) => CacheValue::Bool(b),
            Value::Number(n) => CacheValue::Number(n),
            Value::String(s) => CacheValue::String(s),
            Value::Array(items) => CacheValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                CacheValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<CacheValue> for Value {
    fn from(value: CacheValue) -> Self {
        match value {
            CacheValue::Null => Value::Null,
            CacheValue::Bool(b) => Value::Bool(b),
            CacheValue::Number(n) => Value::Number(n),
            CacheValue::String(s) => Value::String(s),
            CacheValue::List(items) => Value::Array(items.into_iter().map(Into::into).collect()),
            CacheValue::Map(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        CacheValue::String(value.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        CacheValue::String(value)
    }
}

impl From<bool> for CacheValue {
    fn from(value: bool) -> Self {
        CacheValue::Bool(value)
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CacheValue {
                fn from(value: $t) -> Self {
                    CacheValue::Number(Number::from(value))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl From<f64> for CacheValue {
    /// Non-finite floats have no JSON representation and become `Null`.
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(CacheValue::Null, CacheValue::Number)
    }
}

impl<T: Into<CacheValue>> From<Vec<T>> for CacheValue {
    fn from(values: Vec<T>) -> Self {
        CacheValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<CacheValue>> From<BTreeMap<String, T>> for CacheValue {
    fn from(map: BTreeMap<String, T>) -> Self {
        CacheValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<CacheValue>> From<HashMap<String, T>> for CacheValue {
    fn from(map: HashMap<String, T>) -> Self {
        CacheValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl fmt::Display for CacheValue {
    /// Renders the value as compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::from(self.clone()))
    }
}
