//! Log tail domain types
//!
//! The tail endpoint sends one line per message in the form
//! `timestamp\tprocess\tpayload`, where the payload is usually a JSON
//! object with `type` and `message` keys. Parsing is best effort: anything
//! that does not fit degrades to an unstructured record instead of failing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::html::escape_html;

/// One parsed line from the log tail stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub process_name: String,
    pub message_type: String,
    pub message: String,

    /// Set when the frame had the `timestamp\tprocess\tpayload` shape
    #[serde(default)]
    pub structured: bool,
}

impl LogRecord {
    /// Parse a single tail frame
    ///
    /// A single trailing line terminator is ignored.
    pub fn parse_frame(frame: &str) -> Self {
        let frame = frame
            .strip_suffix('\n')
            .map(|f| f.strip_suffix('\r').unwrap_or(f))
            .unwrap_or(frame);

        let fields: Vec<&str> = frame.split('\t').collect();
        let [timestamp, process_name, payload] = fields.as_slice() else {
            return Self {
                message: frame.to_string(),
                ..Default::default()
            };
        };

        let (message_type, message) = match serde_json::from_str::<Map<String, Value>>(payload) {
            Ok(object) => (json_text(object.get("type")), json_text(object.get("message"))),
            Err(_) => (String::new(), payload.to_string()),
        };

        Self {
            timestamp: timestamp.to_string(),
            process_name: process_name.to_string(),
            message_type,
            message,
            structured: true,
        }
    }

    /// Whether the frame had the three-field shape
    pub fn is_structured(&self) -> bool {
        self.structured
    }

    /// Tab-separated display line
    pub fn display_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.timestamp, self.process_name, self.message_type, self.message
        )
    }

    /// Display line with HTML-significant characters escaped
    pub fn to_html_line(&self) -> String {
        escape_html(&self.display_line())
    }
}

fn json_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Optional allow-list of process names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessFilter {
    allowed: Option<HashSet<String>>,
}

impl ProcessFilter {
    /// A filter that accepts every record
    pub fn allow_all() -> Self {
        Self { allowed: None }
    }

    /// A filter that accepts only the given process names
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: Some(names.into_iter().map(Into::into).collect()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.allowed.is_some()
    }

    /// Whether a record should be forwarded to the sink
    ///
    /// Unstructured lines carry no process name and always pass.
    pub fn accepts(&self, record: &LogRecord) -> bool {
        match &self.allowed {
            Some(allowed) if record.structured => allowed.contains(&record.process_name),
            _ => true,
        }
    }
}

impl From<Option<HashSet<String>>> for ProcessFilter {
    fn from(allowed: Option<HashSet<String>>) -> Self {
        Self { allowed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structured_json_frame() {
        let record = LogRecord::parse_frame(
            "2024-01-01T00:00:00\tpinger\t{\"type\": \"INFO\", \"message\": \"ping sent\"}\n",
        );

        assert_eq!(record.timestamp, "2024-01-01T00:00:00");
        assert_eq!(record.process_name, "pinger");
        assert_eq!(record.message_type, "INFO");
        assert_eq!(record.message, "ping sent");
        assert!(record.is_structured());
    }

    #[test]
    fn test_parse_structured_non_json_payload() {
        let record = LogRecord::parse_frame("ts\tponger\tplain text {not json");

        assert_eq!(record.timestamp, "ts");
        assert_eq!(record.process_name, "ponger");
        assert_eq!(record.message_type, "");
        assert_eq!(record.message, "plain text {not json");
    }

    #[test]
    fn test_parse_json_scalar_payload_is_raw() {
        let record = LogRecord::parse_frame("ts\tponger\t42");
        assert_eq!(record.message_type, "");
        assert_eq!(record.message, "42");
    }

    #[test]
    fn test_parse_json_missing_keys() {
        let record = LogRecord::parse_frame("ts\tp\t{\"message\": \"only message\"}");
        assert_eq!(record.message_type, "");
        assert_eq!(record.message, "only message");
    }

    #[test]
    fn test_parse_wrong_field_count() {
        for frame in ["no tabs here", "one\ttab", "a\tb\tc\td"] {
            let record = LogRecord::parse_frame(frame);
            assert_eq!(record.timestamp, "");
            assert_eq!(record.process_name, "");
            assert_eq!(record.message_type, "");
            assert_eq!(record.message, frame);
            assert!(!record.is_structured());
        }
    }

    #[test]
    fn test_filter_allow_list() {
        let filter = ProcessFilter::only(["A", "B"]);
        let a = LogRecord::parse_frame("ts\tA\tmsg");
        let c = LogRecord::parse_frame("ts\tC\tmsg");

        assert!(filter.accepts(&a));
        assert!(!filter.accepts(&c));
        assert!(ProcessFilter::allow_all().accepts(&c));
    }

    #[test]
    fn test_filter_passes_unstructured_when_active() {
        let filter = ProcessFilter::only(["A"]);
        assert!(filter.accepts(&LogRecord::parse_frame("Traceback (most recent call last):")));
        assert!(filter.accepts(&LogRecord::parse_frame("one\ttab")));
    }

    #[test]
    fn test_empty_fields_still_structured() {
        let record = LogRecord::parse_frame("\t\t{\"type\": \"INFO\", \"message\": \"hi\"}");
        assert!(record.is_structured());
        assert_eq!(record.process_name, "");
        assert_eq!(record.message, "hi");

        // A structured record with an empty process name is not on any allow-list
        assert!(!ProcessFilter::only(["A"]).accepts(&record));
    }

    #[test]
    fn test_html_line_is_escaped() {
        let record = LogRecord::parse_frame("ts\tweb\t<b>hi</b>");
        assert_eq!(
            record.to_html_line(),
            "ts\tweb\t\t&lt;b&gt;hi&lt;&#x2F;b&gt;"
        );
    }
}
