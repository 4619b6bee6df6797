//! Output-side entities: per-bug verdicts and the aggregate report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::report::BugRecord;

/// Reason recorded when a bug could not be evaluated.
pub const VERIFICATION_ERROR_REASON: &str = "verification error";

/// Classification of one bug record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub bug: BugRecord,
    pub is_real: bool,
    /// Confidence in the classification, 0.0–1.0.
    pub confidence: f64,
    pub reasons: Vec<String>,
}

impl VerificationResult {
    /// Zero-confidence false positive for a bug whose evaluation failed.
    pub fn errored(bug: BugRecord) -> Self {
        Self {
            bug,
            is_real: false,
            confidence: 0.0,
            reasons: vec![VERIFICATION_ERROR_REASON.to_string()],
        }
    }
}

/// Run-level judgement of the test history, independent of individual bugs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredibilityAnalysis {
    pub credibility_issues: Vec<String>,
    pub positive_findings: Vec<String>,
    /// Fraction of quality checks satisfied, 0.0–1.0.
    pub quality_score: f64,
}

/// Per-scenario counts backing the "Bug Type | Claimed | Verified" table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBreakdown {
    pub claimed: usize,
    pub verified: usize,
    pub false_positives: usize,
    /// Mean confidence of this scenario's verdicts.
    pub confidence: f64,
}

/// Final output of a verification run.
///
/// # Invariants
///
/// `verified_real_bugs + false_positives == total_bugs_claimed`, and
/// `bug_results` holds exactly one entry per claimed bug in extraction order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub total_bugs_claimed: usize,
    pub verified_real_bugs: usize,
    pub false_positives: usize,
    pub verification_confidence: f64,
    pub analysis: CredibilityAnalysis,
    pub recommendations: Vec<String>,
    pub bug_results: Vec<VerificationResult>,
    pub scenario_breakdown: BTreeMap<String, ScenarioBreakdown>,
}

impl AggregateReport {
    /// Whether the counters agree with each other and with `bug_results`.
    pub fn is_consistent(&self) -> bool {
        self.verified_real_bugs + self.false_positives == self.total_bugs_claimed
            && self.bug_results.len() == self.total_bugs_claimed
    }
}
