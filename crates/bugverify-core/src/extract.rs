//! Bug record extraction.
//!
//! Reports arrive in three shapes: an explicit `detailed_bugs` list, an
//! explicit `bug_database` list, or only a `test_history` whose `bugs_found`
//! counts imply bugs. [`ParsedReport::parse`] validates the report once and
//! records which shape applies as a [`BugSource`]; everything downstream works
//! on typed records.

use serde_json::{Map, Value};

use crate::config::MAX_RECONSTRUCTED_BUGS;
use crate::domain::{BugRecord, RawReport, Result, TestExecutionRecord, Timestamp, VerifyError};

/// Where a report's bug records come from, in resolution priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum BugSource {
    /// Non-empty `detailed_bugs` list.
    Detailed(Vec<BugRecord>),
    /// Non-empty `bug_database` list (no usable `detailed_bugs`).
    Database(Vec<BugRecord>),
    /// No explicit list; bugs are synthesized from `bugs_found` counts.
    Reconstructed,
}

impl BugSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Detailed(_) => "detailed_bugs",
            Self::Database(_) => "bug_database",
            Self::Reconstructed => "reconstructed",
        }
    }
}

/// A report validated at the extraction boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    pub test_history: Vec<TestExecutionRecord>,
    pub source: BugSource,
}

impl ParsedReport {
    /// Validate a raw report with the default reconstruction limit.
    pub fn parse(raw: &RawReport) -> Result<Self> {
        Self::parse_bounded(raw, MAX_RECONSTRUCTED_BUGS)
    }

    /// Validate a raw report.
    ///
    /// Fails when `test_history` is missing or not a list, or when bugs must
    /// be reconstructed and the `bugs_found` counts add up to more than
    /// `max_reconstructed_bugs`. Individual entries are read leniently:
    /// missing or mistyped fields take their default value.
    pub fn parse_bounded(raw: &RawReport, max_reconstructed_bugs: u64) -> Result<Self> {
        let history = match raw.value().get("test_history") {
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(VerifyError::MalformedReport(format!(
                    "test_history must be a list, found {}",
                    json_type_name(other)
                )))
            }
            None => {
                return Err(VerifyError::MalformedReport(
                    "test_history is missing".to_string(),
                ))
            }
        };

        let test_history: Vec<TestExecutionRecord> =
            history.iter().map(parse_test_record).collect();

        let source = if let Some(bugs) = explicit_bugs(raw.value(), "detailed_bugs") {
            BugSource::Detailed(bugs)
        } else if let Some(bugs) = explicit_bugs(raw.value(), "bug_database") {
            BugSource::Database(bugs)
        } else {
            let claimed = test_history
                .iter()
                .fold(0u64, |sum, t| sum.saturating_add(t.bugs_found));
            if claimed > max_reconstructed_bugs {
                return Err(VerifyError::MalformedReport(format!(
                    "bugs_found counts add up to {claimed}, above the limit of {max_reconstructed_bugs}"
                )));
            }
            BugSource::Reconstructed
        };

        Ok(Self {
            test_history,
            source,
        })
    }

    /// Bug records paired with the test execution that produced them.
    ///
    /// Reconstructed bugs are paired with their source record. Explicit bugs
    /// are paired with the first record of the same scenario, preferring one
    /// whose timestamp also matches.
    pub fn bugs_with_origin(&self) -> Vec<(BugRecord, Option<TestExecutionRecord>)> {
        match &self.source {
            BugSource::Detailed(bugs) | BugSource::Database(bugs) => bugs
                .iter()
                .map(|bug| (bug.clone(), self.find_origin(bug).cloned()))
                .collect(),
            BugSource::Reconstructed => self
                .test_history
                .iter()
                .flat_map(|test| {
                    (0..test.bugs_found).map(move |bug_index| {
                        let bug = BugRecord {
                            scenario: test.scenario.clone(),
                            timestamp: test.timestamp.clone(),
                            duration: test.duration,
                            bug_index,
                            reconstructed: true,
                            description: None,
                        };
                        (bug, Some(test.clone()))
                    })
                })
                .collect(),
        }
    }

    fn find_origin(&self, bug: &BugRecord) -> Option<&TestExecutionRecord> {
        let mut same_scenario = self
            .test_history
            .iter()
            .filter(|t| t.scenario == bug.scenario);

        if bug.timestamp.is_some() {
            if let Some(exact) = same_scenario
                .clone()
                .find(|t| t.timestamp == bug.timestamp)
            {
                return Some(exact);
            }
        }
        same_scenario.next()
    }
}

/// Normalize a raw report into bug records, preserving source order.
pub fn extract(raw: &RawReport) -> Result<Vec<BugRecord>> {
    let parsed = ParsedReport::parse(raw)?;
    Ok(parsed
        .bugs_with_origin()
        .into_iter()
        .map(|(bug, _)| bug)
        .collect())
}

fn explicit_bugs(report: &Value, key: &str) -> Option<Vec<BugRecord>> {
    match report.get(key) {
        Some(Value::Array(entries)) if !entries.is_empty() => Some(
            entries
                .iter()
                .enumerate()
                .map(|(position, entry)| parse_bug_entry(position, entry))
                .collect(),
        ),
        _ => None,
    }
}

fn parse_test_record(entry: &Value) -> TestExecutionRecord {
    let Some(obj) = entry.as_object() else {
        return TestExecutionRecord::default();
    };
    TestExecutionRecord {
        scenario: field_str(obj, "scenario").unwrap_or_default(),
        duration: field_f64(obj, "duration").unwrap_or(0.0),
        success: field_bool(obj, "success").unwrap_or(false),
        timestamp: field_timestamp(obj, "timestamp"),
        bugs_found: field_u64(obj, "bugs_found").unwrap_or(0),
    }
}

fn parse_bug_entry(position: usize, entry: &Value) -> BugRecord {
    let empty = Map::new();
    let obj = entry.as_object().unwrap_or(&empty);
    let description = ["description", "error", "message"]
        .iter()
        .filter_map(|key| field_str(obj, key))
        .find(|text| !text.trim().is_empty());

    BugRecord {
        scenario: field_str(obj, "scenario").unwrap_or_default(),
        timestamp: field_timestamp(obj, "timestamp"),
        duration: field_f64(obj, "duration").unwrap_or(0.0),
        bug_index: field_u64(obj, "bug_index").unwrap_or(position as u64),
        reconstructed: field_bool(obj, "reconstructed").unwrap_or(false),
        description,
    }
}

fn field_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field_f64(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn field_u64(obj: &Map<String, Value>, key: &str) -> Option<u64> {
    match obj.get(key)? {
        // Whole-valued floats such as `3.0` or `1e19` count; fractions are mistyped.
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn field_bool(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    match obj.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn field_timestamp(obj: &Map<String, Value>, key: &str) -> Option<Timestamp> {
    match obj.get(key)? {
        Value::Number(n) => n.as_f64().map(Timestamp::Epoch),
        Value::String(s) => Some(Timestamp::Text(s.clone())),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
