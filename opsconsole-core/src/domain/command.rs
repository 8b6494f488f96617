//! Command domain types
//!
//! Command types are described by the backend as flat lists of field
//! descriptions. A field description carries both the metadata needed to
//! build a form control and, for recorded commands, the current value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A submittable command kind and the fields it accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandType {
    /// Command type name, unique across the schema
    #[serde(rename = "type")]
    pub command_type: String,

    /// Ordered field descriptions for this type
    #[serde(default)]
    pub field_descriptions: Vec<FieldDescription>,
}

/// Metadata and current value of one command field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescription {
    /// '.'-delimited field identifier, unique within a command type
    pub id: String,

    /// Field name without its nesting prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basename: Option<String>,

    /// Name of the class declaring this field
    pub parent_class_name: String,

    /// Type hint shown next to the control (e.g. "[int]")
    #[serde(default)]
    pub hint: String,

    /// Stringified default value, if the field has one
    #[serde(default)]
    pub placeholder: Option<String>,

    /// Current value, present on recorded commands
    #[serde(default, rename = "val", alias = "value")]
    pub value: Option<FieldValue>,

    /// Allowed options for enumerated fields
    #[serde(default)]
    pub allowed: Option<Vec<String>>,

    #[serde(default)]
    pub is_bool: bool,

    #[serde(default)]
    pub optional: bool,
}

impl FieldDescription {
    /// Key that identifies this field's control across every rendered command type
    pub fn control_key(&self) -> String {
        format!("{}-{}", self.parent_class_name, self.id)
    }

    /// Allowed options, empty when the field is not enumerated
    pub fn allowed_values(&self) -> &[String] {
        self.allowed.as_deref().unwrap_or(&[])
    }
}

/// A field value as carried on the wire
///
/// The backend sends strings for most fields and real booleans for
/// boolean fields; submissions use the same untagged representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    /// Whether a checkbox seeded with this value starts checked
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            FieldValue::Text(s) => is_truthy_str(s),
        }
    }

    /// Whether the value renders as an empty string
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

/// Parse a boolean spelled the way the backend accepts it
///
/// Returns `None` for strings outside the vocabulary.
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Truthiness of a textual value: known spellings first, then non-emptiness
pub fn is_truthy_str(input: &str) -> bool {
    parse_bool(input).unwrap_or(!input.is_empty())
}

/// A previously submitted command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Server timestamp in milliseconds since the Unix epoch
    pub timestamp_ms: i64,

    #[serde(rename = "type")]
    pub command_type: String,

    /// Backend-assigned unique key, used to resend the command
    pub key: String,

    #[serde(default)]
    pub field_descriptions: Vec<FieldDescription>,
}

impl Command {
    /// Submission time, if the timestamp is representable
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }

    /// Link to the send page pre-populated with this command
    pub fn resend_link(&self) -> String {
        format!("/commands/send?key={}", self.key)
    }
}
