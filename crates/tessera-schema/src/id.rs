// SPDX-License-Identifier: Apache-2.0
//! Entity identity values.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of an entity record within its type's table.
///
/// Ids are either strings or integers, matching what an id field (or a
/// composite-key extractor) can produce from a JSON response. Integer ids
/// order before string ids so that table iteration stays deterministic.
/// Serializes as the bare JSON value it was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Integer identity (e.g. a numeric primary key).
    Int(i64),
    /// String identity (e.g. a UUID or slug).
    Str(String),
}

impl EntityId {
    /// Extracts an id from a JSON value, if the value can act as one.
    ///
    /// Strings and integers qualify; everything else (objects, arrays,
    /// floats, booleans, null) does not.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Str(s.clone())),
            Value::Number(n) => n.as_i64().map(Self::Int),
            _ => None,
        }
    }

    /// Renders the id back into the JSON value it was extracted from.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Str(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}
