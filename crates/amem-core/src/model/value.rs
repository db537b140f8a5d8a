//! Tagged-union value type for opaque memory metadata.
//!
//! The source system treats metadata as a dynamically-typed map; we keep
//! that flexibility but make the variants explicit rather than falling back
//! to `serde_json::Value` everywhere, so callers pattern-match exhaustively
//! on a closed set of shapes instead of re-discovering JSON's type zoo.

use std::collections::BTreeMap;

/// A single metadata value: string, number, boolean, list, or nested map.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// UTF-8 text.
    String(String),
    /// Signed integer.
    Int(i64),
    /// Floating point.
    Real(f64),
    /// Boolean.
    Bool(bool),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Nested map, keys sorted for deterministic serialization.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Borrow as a string, if this is a `String` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as an integer, if this is an `Int` variant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Borrow as a float, if this is a `Real` variant.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Opaque key-value metadata map carried on a memory record.
pub type Metadata = BTreeMap<String, Value>;

/// Merge `other` into `base` key-wise, `other` winning on key collision.
/// Used by the sync coordinator's field-merge conflict strategy (§4.7).
pub fn merge_metadata(base: &Metadata, other: &Metadata) -> Metadata {
    let mut merged = base.clone();
    for (k, v) in other {
        merged.insert(k.clone(), v.clone());
    }
    merged
}
