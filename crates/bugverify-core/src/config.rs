//! Verifier configuration: thresholds and keyword vocabularies.
//!
//! Every keyword list is matched case-insensitively as a substring. Defaults
//! are deliberately generic; deployments tune them through a TOML or JSON file
//! loaded with [`VerifierConfig::load`]. Keys missing from the file keep their
//! default value.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Result, VerifyError};

/// Minimum plausible test duration in seconds.
pub const REALISM_THRESHOLD: f64 = 0.01;

/// Upper bound on bugs synthesized from `bugs_found` counts in one report.
pub const MAX_RECONSTRUCTED_BUGS: u64 = 100_000;

/// Thresholds and vocabularies consumed by the rule table and the analyzers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Durations below this (seconds) are implausibly fast.
    pub realism_threshold: f64,
    /// Durations below this (seconds) count as near-zero for dependency-gated scenarios.
    pub dependency_gate_threshold: f64,
    /// Confidence deducted per suspicion signal.
    pub suspicion_weight: f64,
    /// Confidence assigned to corroborated bugs.
    pub corroborated_confidence: f64,
    /// Confidence assigned when no signal fired at all.
    pub unsuspicious_confidence: f64,
    /// Fast-test ratio above which the run gets a credibility issue.
    pub fast_ratio_issue_threshold: f64,
    /// Fast-test ratio below which the run earns a quality point.
    pub fast_ratio_quality_threshold: f64,
    /// Success rate below which the run gets a positive finding.
    pub low_success_rate_threshold: f64,
    /// Distinct scenario count that must be exceeded to earn a quality point.
    pub min_distinct_scenarios: usize,
    /// Reports whose `bugs_found` counts add up to more than this are malformed.
    pub max_reconstructed_bugs: u64,
    /// Per-bug verification tasks in flight at once on the concurrent path.
    pub max_concurrent_verifications: usize,
    /// Scenario name fragments for tests that cannot finish without a heavy dependency.
    pub dependency_gated_scenarios: Vec<String>,
    /// Scenario name fragments marking security tests.
    pub security_scenario_keywords: Vec<String>,
    /// Vocabulary that gives a security bug authentication detail.
    pub auth_keywords: Vec<String>,
    /// Infrastructure components whose connection failures corroborate a bug.
    pub infrastructure_dependencies: Vec<String>,
    /// Connection-style failure phrases.
    pub connection_failure_phrases: Vec<String>,
    /// Markers of error detail in the raw report text.
    pub error_detail_markers: Vec<String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            realism_threshold: REALISM_THRESHOLD,
            dependency_gate_threshold: 0.001,
            suspicion_weight: 0.25,
            corroborated_confidence: 0.9,
            unsuspicious_confidence: 0.8,
            fast_ratio_issue_threshold: 0.5,
            fast_ratio_quality_threshold: 0.3,
            low_success_rate_threshold: 0.7,
            min_distinct_scenarios: 3,
            max_reconstructed_bugs: MAX_RECONSTRUCTED_BUGS,
            max_concurrent_verifications: 64,
            dependency_gated_scenarios: strings(&[
                "machine learning",
                "ml pipeline",
                "model inference",
                "embedding",
                "vector search",
                "transformer",
                "gpu",
                "neural",
            ]),
            security_scenario_keywords: strings(&[
                "security",
                "auth",
                "injection",
                "xss",
                "csrf",
                "permission",
            ]),
            auth_keywords: strings(&[
                "auth",
                "token",
                "credential",
                "password",
                "session",
                "login",
                "jwt",
                "permission",
            ]),
            infrastructure_dependencies: strings(&[
                "redis",
                "postgres",
                "mysql",
                "mongodb",
                "elasticsearch",
                "kafka",
                "rabbitmq",
                "memcached",
            ]),
            connection_failure_phrases: strings(&[
                "connection refused",
                "could not connect",
                "failed to connect",
                "connection reset",
                "connection timed out",
                "econnrefused",
            ]),
            error_detail_markers: strings(&["error", "exception", "traceback"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl VerifierConfig {
    /// Parse and validate a TOML config.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; `.json` files are JSON, anything else is TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }

    /// Reject thresholds that would break the confidence invariants.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("realism_threshold", self.realism_threshold),
            ("dependency_gate_threshold", self.dependency_gate_threshold),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(VerifyError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number of seconds (got {value})"
                )));
            }
        }

        let unit_interval = [
            ("suspicion_weight", self.suspicion_weight),
            ("corroborated_confidence", self.corroborated_confidence),
            ("unsuspicious_confidence", self.unsuspicious_confidence),
            ("fast_ratio_issue_threshold", self.fast_ratio_issue_threshold),
            ("fast_ratio_quality_threshold", self.fast_ratio_quality_threshold),
            ("low_success_rate_threshold", self.low_success_rate_threshold),
        ];
        for (name, value) in unit_interval {
            if !(0.0..=1.0).contains(&value) {
                return Err(VerifyError::InvalidConfig(format!(
                    "{name} must be within 0.0–1.0 (got {value})"
                )));
            }
        }

        if self.max_reconstructed_bugs == 0 {
            return Err(VerifyError::InvalidConfig(
                "max_reconstructed_bugs must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent_verifications == 0 {
            return Err(VerifyError::InvalidConfig(
                "max_concurrent_verifications must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// First keyword from `keywords` contained in `text`, ignoring case.
pub(crate) fn find_keyword<'a>(text: &str, keywords: &'a [String]) -> Option<&'a str> {
    let lowered = text.to_lowercase();
    keywords
        .iter()
        .map(String::as_str)
        .filter(|k| !k.is_empty())
        .find(|k| lowered.contains(&k.to_lowercase()))
}
