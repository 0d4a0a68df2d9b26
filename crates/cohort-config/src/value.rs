//! The value representation written to and read from configuration trees.
//!
//! [`ConfigValue`] is self-contained: the YAML grammar is an external
//! collaborator (`serde_yml`) whose parsed documents convert into this
//! enum at the load boundary. A `Table` at a write site means "nested
//! structure" and dispatches to tree merge; every other variant is a leaf
//! stored in a node.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A configuration value.
///
/// Untagged serialization keeps the on-disk shape identical to plain
/// YAML/JSON scalars, sequences, and mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Explicit null.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Integer(i64),
    /// Floating-point scalar.
    Float(f64),
    /// String scalar.
    String(String),
    /// Ordered list of values (stored at a leaf as-is).
    Sequence(Vec<ConfigValue>),
    /// Nested mapping; dispatches to tree merge when written.
    Table(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// True for the `Table` variant.
    pub const fn is_table(&self) -> bool {
        matches!(self, Self::Table(_))
    }

    /// The boolean value, if this is a `Bool`.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The integer value, if this is an `Integer`.
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// The numeric value as `f64`, if this is a `Float` or an `Integer`.
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// The string slice, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// The element list, if this is a `Sequence`.
    pub fn as_sequence(&self) -> Option<&[Self]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// The nested mapping, if this is a `Table`.
    pub const fn as_table(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for ConfigValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(items: Vec<ConfigValue>) -> Self {
        Self::Sequence(items)
    }
}

impl From<BTreeMap<String, ConfigValue>> for ConfigValue {
    fn from(table: BTreeMap<String, ConfigValue>) -> Self {
        Self::Table(table)
    }
}

impl From<serde_yml::Value> for ConfigValue {
    /// Convert a parsed YAML document.
    ///
    /// Integers that fit `i64` stay integral; larger numbers degrade to
    /// floats. Mapping keys that are not strings are skipped -- the
    /// configuration namespace is string-keyed by design.
    fn from(value: serde_yml::Value) -> Self {
        match value {
            serde_yml::Value::Null => Self::Null,
            serde_yml::Value::Bool(value) => Self::Bool(value),
            serde_yml::Value::Number(number) => number.as_i64().map_or_else(
                || number.as_f64().map_or(Self::Null, Self::Float),
                Self::Integer,
            ),
            serde_yml::Value::String(value) => Self::String(value),
            serde_yml::Value::Sequence(items) => {
                Self::Sequence(items.into_iter().map(Self::from).collect())
            }
            serde_yml::Value::Mapping(mapping) => Self::Table(
                mapping
                    .into_iter()
                    .filter_map(|(key, value)| {
                        key.as_str().map(|key| (key.to_owned(), Self::from(value)))
                    })
                    .collect(),
            ),
            serde_yml::Value::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}
