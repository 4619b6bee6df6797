//! Input-side entities: the raw report and the records extracted from it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::{Result, VerifyError};

/// Untyped report as supplied by a bug hunt.
///
/// Carries the parsed JSON value and the text it came from. The text is kept
/// because the credibility scan looks for evidence anywhere in the report,
/// including fields the extractor does not model.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReport {
    value: Value,
    text: String,
}

impl RawReport {
    /// Parse a report from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| VerifyError::MalformedReport(format!("report is not valid JSON: {e}")))?;
        Ok(Self {
            value,
            text: text.to_string(),
        })
    }

    /// Wrap an already-parsed value. The text form is its compact JSON encoding.
    pub fn from_value(value: Value) -> Self {
        let text = value.to_string();
        Self { value, text }
    }

    /// Read and parse a report file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Timestamp as found in reports: epoch seconds or a preformatted string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Epoch(f64),
    Text(String),
}

/// One executed test scenario from `test_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestExecutionRecord {
    pub scenario: String,
    /// Wall-clock duration in seconds.
    pub duration: f64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    pub bugs_found: u64,
}

impl Default for TestExecutionRecord {
    fn default() -> Self {
        Self {
            scenario: String::new(),
            duration: 0.0,
            success: false,
            timestamp: None,
            bugs_found: 0,
        }
    }
}

/// A single claimed bug, explicit or reconstructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugRecord {
    pub scenario: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    /// Duration in seconds of the test that reported the bug.
    pub duration: f64,
    pub bug_index: u64,
    /// Synthesized from a `bugs_found` count rather than an explicit bug list.
    pub reconstructed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BugRecord {
    /// Description text, or the empty string when the bug has none.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_str_rejects_non_json() {
        let err = RawReport::from_json_str("not json at all").unwrap_err();
        assert!(matches!(err, VerifyError::MalformedReport(_)));
    }

    #[test]
    fn from_json_str_keeps_original_text() {
        let text = r#"{ "test_history": [], "note": "No module named 'torch'" }"#;
        let raw = RawReport::from_json_str(text).expect("parse");
        assert_eq!(raw.text(), text);
        assert!(raw.value().get("test_history").is_some());
    }

    #[test]
    fn from_value_renders_text() {
        let raw = RawReport::from_value(json!({ "test_history": [] }));
        assert!(raw.text().contains("test_history"));
    }

    #[test]
    fn timestamp_accepts_number_or_string() {
        let epoch: Timestamp = serde_json::from_value(json!(1717171717.5)).expect("epoch");
        assert_eq!(epoch, Timestamp::Epoch(1717171717.5));

        let text: Timestamp = serde_json::from_value(json!("2026-01-01T00:00:00Z")).expect("text");
        assert_eq!(text, Timestamp::Text("2026-01-01T00:00:00Z".to_string()));
    }

    #[test]
    fn bug_record_omits_missing_description() {
        let bug = BugRecord {
            scenario: "Cache Warmup".to_string(),
            timestamp: None,
            duration: 0.2,
            bug_index: 0,
            reconstructed: true,
            description: None,
        };
        let v = serde_json::to_value(&bug).expect("serialize");
        assert!(v.get("description").is_none());
        assert_eq!(bug.description_text(), "");
    }
}
