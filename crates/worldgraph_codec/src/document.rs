//! The self-describing document model.
//!
//! A document enumerates a format version and the full set of entities —
//! identifier, kind, fields, references — and nothing else. Field values
//! are written as `{"type": ..., "value": ...}` pairs so a reader needs no
//! schema to interpret them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use worldgraph_foundation::{Error, Result, Value};

/// The current document format version.
pub const FORMAT_VERSION: u32 = 1;

/// A persisted world: format version plus every entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldDocument {
    /// Format version tag.
    pub format: u32,
    /// Every live entity, in identifier order.
    pub entities: Vec<EntityDoc>,
}

/// One persisted entity.
///
/// `fields` values stay raw JSON here: known names are decoded into
/// [`ValueDoc`]s against the schema at load time, unknown names are carried
/// opaquely so a newer format's data survives an edit session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityDoc {
    /// Stable identifier serial.
    pub id: u64,
    /// Kind name (lowercase).
    pub kind: String,
    /// Field name -> tagged value (or unknown payload).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, serde_json::Value>,
    /// Relationship name -> target identifiers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub references: BTreeMap<String, Vec<u64>>,
}

/// A field value in its self-describing wire form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ValueDoc {
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Single-line string.
    String(String),
    /// Free-form prose.
    Text(String),
    /// ISO calendar date (`YYYY-MM-DD`).
    Date(String),
    /// Enumeration token.
    Choice(String),
}

impl ValueDoc {
    /// Converts a live value into its wire form.
    ///
    /// Nil has no wire form: an unset field is simply absent.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Nil => None,
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Int(n) => Some(Self::Int(*n)),
            Value::Float(n) => Some(Self::Float(*n)),
            Value::String(s) => Some(Self::String(s.to_string())),
            Value::Text(s) => Some(Self::Text(s.to_string())),
            Value::Date(d) => Some(Self::Date(d.format("%Y-%m-%d").to_string())),
            Value::Choice(t) => Some(Self::Choice(t.to_string())),
        }
    }

    /// Converts the wire form back into a live value.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` when a date string is not a valid ISO date.
    pub fn into_value(self) -> Result<Value> {
        Ok(match self {
            Self::Bool(b) => Value::Bool(b),
            Self::Int(n) => Value::Int(n),
            Self::Float(n) => Value::Float(n),
            Self::String(s) => Value::String(s.into()),
            Self::Text(s) => Value::Text(s.into()),
            Self::Date(s) => {
                let date = NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|e| Error::parse(format!("invalid date '{s}': {e}")))?;
                Value::Date(date)
            }
            Self::Choice(t) => Value::Choice(t.into()),
        })
    }
}
