//! TreeValue - the data the inspector renders.
//!
//! A superset of JSON: `Undefined`, `Function`, `Date` and `Map` exist so
//! that hosts carrying those shapes (script runtimes, debuggers) can still be
//! inspected. Objects and maps keep their entry order.

use crate::path::{NodePath, PathSegment};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Polymorphic value rendered by the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
    /// A callable, identified by name only.
    Function(String),
    Date(DateTime<Utc>),
    /// Ordered string-keyed entries.
    Object(Vec<(String, TreeValue)>),
    Array(Vec<TreeValue>),
    /// Ordered entries with arbitrary keys.
    Map(Vec<(TreeValue, TreeValue)>),
}

impl TreeValue {
    /// Number of direct children (0 for primitives).
    pub fn entry_count(&self) -> usize {
        match self {
            Self::Object(entries) => entries.len(),
            Self::Array(items) => items.len(),
            Self::Map(entries) => entries.len(),
            _ => 0,
        }
    }

    /// Direct children paired with the path segment that reaches them.
    ///
    /// Map keys are addressed by their display form. Keys sharing a label
    /// (`1` and `"1"`, or two object keys) share a path, and lookups by
    /// that path reach the first of them.
    pub fn children(&self) -> Vec<(PathSegment, &TreeValue)> {
        match self {
            Self::Object(entries) => entries
                .iter()
                .map(|(key, value)| (PathSegment::Key(key.clone()), value))
                .collect(),
            Self::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, value)| (PathSegment::Index(index), value))
                .collect(),
            Self::Map(entries) => entries
                .iter()
                .map(|(key, value)| (PathSegment::Key(key.key_label()), value))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Look up a direct child.
    pub fn child(&self, segment: &PathSegment) -> Option<&TreeValue> {
        match (self, segment) {
            (Self::Object(entries), PathSegment::Key(key)) => entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, value)| value),
            (Self::Object(entries), PathSegment::Index(index)) => {
                let key = index.to_string();
                entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
            }
            (Self::Array(items), PathSegment::Index(index)) => items.get(*index),
            (Self::Array(items), PathSegment::Key(key)) => {
                key.parse::<usize>().ok().and_then(|index| items.get(index))
            }
            (Self::Map(entries), segment) => {
                let label = segment.to_string();
                entries
                    .iter()
                    .find(|(k, _)| k.key_label() == label)
                    .map(|(_, value)| value)
            }
            _ => None,
        }
    }

    /// Resolve a path from this value.
    pub fn at(&self, path: &NodePath) -> Option<&TreeValue> {
        path.segments()
            .iter()
            .try_fold(self, |value, segment| value.child(segment))
    }

    /// Short display of a leaf value, as shown next to its key.
    pub fn preview(&self) -> String {
        match self {
            Self::String(s) => format!("{s:?}"),
            Self::Number(n) => format_number(*n),
            Self::Boolean(b) => b.to_string(),
            Self::Null => "null".to_string(),
            Self::Undefined => "undefined".to_string(),
            Self::Function(name) => format!("ƒ {name}()"),
            Self::Date(date) => date.to_rfc3339_opts(SecondsFormat::Millis, true),
            Self::Object(entries) if entries.is_empty() => "{}".to_string(),
            Self::Object(_) => "{…}".to_string(),
            Self::Array(items) if items.is_empty() => "[]".to_string(),
            Self::Array(_) => "[…]".to_string(),
            Self::Map(entries) if entries.is_empty() => "Map {}".to_string(),
            Self::Map(_) => "Map {…}".to_string(),
        }
    }

    /// The label used when this value is a map key.
    pub fn key_label(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            other => other.preview(),
        }
    }

    /// Lossy conversion back to JSON, used for copying values.
    ///
    /// Undefined becomes `null`, functions and dates become strings, maps
    /// become objects keyed by their key labels.
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Value::from(*n as i64),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Null | Self::Undefined => Value::Null,
            Self::Function(_) | Self::Date(_) => Value::String(self.preview()),
            Self::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Self::Array(items) => Value::Array(items.iter().map(TreeValue::to_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.key_label(), value.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        n.to_string()
    }
}

impl From<Value> for TreeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for TreeValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for TreeValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for TreeValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for TreeValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for TreeValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for TreeValue {
    fn from(date: DateTime<Utc>) -> Self {
        Self::Date(date)
    }
}
