/*!
 * Content tree representation.
 *
 * A `ContentValue` is the in-memory form of an entity's translatable fields:
 * text leaves, numbers, booleans, nulls, ordered sequences and keyed mappings,
 * arbitrarily nested. Source rows are parsed into this shape, walked by the
 * tree translator, and flattened back to text by the storage serializer.
 */

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use crate::errors::SerializeError;

/// Top-level field name to value mapping for one entity
pub type ContentFields = BTreeMap<String, ContentValue>;

/// A node of a content tree
#[derive(Debug, Clone, PartialEq)]
pub enum ContentValue {
    /// Text leaf, the only kind that gets translated
    Text(String),
    /// Numeric leaf
    Number(f64),
    /// Boolean leaf
    Bool(bool),
    /// Explicit null
    Null,
    /// Ordered list of values
    Sequence(Vec<ContentValue>),
    /// Keyed values in authored order; keys are never translated
    Mapping(IndexMap<String, ContentValue>),
}

impl ContentValue {
    /// Convenience constructor for text leaves
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns the text if this is a text leaf
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this node is a sequence or mapping
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Sequence(_) | Self::Mapping(_))
    }

    /// Number of non-empty text leaves under this node
    pub fn text_leaf_count(&self) -> usize {
        match self {
            Self::Text(text) if !text.trim().is_empty() => 1,
            Self::Sequence(items) => items.iter().map(Self::text_leaf_count).sum(),
            Self::Mapping(entries) => entries.values().map(Self::text_leaf_count).sum(),
            _ => 0,
        }
    }

    /// Maximum nesting depth; leaves are depth 0
    pub fn depth(&self) -> usize {
        match self {
            Self::Sequence(items) => 1 + items.iter().map(Self::depth).max().unwrap_or(0),
            Self::Mapping(entries) => 1 + entries.values().map(Self::depth).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// Convert to a JSON value
    ///
    /// Fails when a number cannot be represented in JSON (NaN or infinity).
    pub fn to_json(&self) -> Result<Value, SerializeError> {
        self.to_json_at("$")
    }

    fn to_json_at(&self, path: &str) -> Result<Value, SerializeError> {
        match self {
            Self::Text(text) => Ok(Value::String(text.clone())),
            Self::Number(number) => Number::from_f64(*number)
                .map(|n| {
                    // Keep integral values integral so "3" does not become "3.0"
                    if number.fract() == 0.0 && number.abs() < 9_007_199_254_740_992.0 {
                        Value::Number(Number::from(*number as i64))
                    } else {
                        Value::Number(n)
                    }
                })
                .ok_or_else(|| SerializeError::NonFiniteNumber {
                    path: path.to_string(),
                }),
            Self::Bool(flag) => Ok(Value::Bool(*flag)),
            Self::Null => Ok(Value::Null),
            Self::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| item.to_json_at(&format!("{}[{}]", path, index)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Self::Mapping(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json_at(&format!("{}.{}", path, key))?);
                }
                Ok(Value::Object(map))
            }
        }
    }
}

impl From<Value> for ContentValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Number(number) => Self::Number(number.as_f64().unwrap_or_default()),
            Value::Bool(flag) => Self::Bool(flag),
            Value::Null => Self::Null,
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(entries) => Self::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ContentValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ContentValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
