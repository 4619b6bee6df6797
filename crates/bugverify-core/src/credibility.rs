//! Run-level credibility analysis.
//!
//! Judges the test history as a whole, independent of individual bug
//! verdicts. A high share of implausibly fast tests is a credibility issue.
//! A low success rate is treated as evidence that the hunt found genuine
//! problems, so it is reported as a positive finding.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::{find_keyword, VerifierConfig};
use crate::domain::{CredibilityAnalysis, TestExecutionRecord};

/// Number of boolean checks that make up the quality score.
const QUALITY_CHECKS: f64 = 4.0;

fn import_failure_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r#"No module named \\?['"]?([A-Za-z_][A-Za-z0-9_.]*)"#,
            r#"Cannot find module \\?['"]([^'"\\]+)"#,
            r"unresolved import `([A-Za-z0-9_:]+)`",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Modules named by import-failure messages in `text`, in order of first appearance.
pub fn import_failures(text: &str) -> Vec<String> {
    let mut hits: Vec<(usize, String)> = import_failure_patterns()
        .iter()
        .flat_map(|re| {
            re.captures_iter(text).filter_map(|caps| {
                let module = caps.get(1)?;
                Some((module.start(), module.as_str().to_string()))
            })
        })
        .collect();
    hits.sort_by_key(|(pos, _)| *pos);

    let mut seen = HashSet::new();
    hits.into_iter()
        .map(|(_, module)| module)
        .filter(|module| seen.insert(module.clone()))
        .collect()
}

/// Analyze a test history and the raw report text it came from.
pub fn analyze(
    config: &VerifierConfig,
    history: &[TestExecutionRecord],
    raw_text: &str,
) -> CredibilityAnalysis {
    let mut analysis = CredibilityAnalysis::default();
    let total = history.len();

    // Invalid durations are verification errors per bug, not fast tests.
    let fast = history
        .iter()
        .filter(|t| t.duration.is_finite() && t.duration >= 0.0)
        .filter(|t| t.duration < config.realism_threshold)
        .count();
    let succeeded = history.iter().filter(|t| t.success).count();
    let fast_ratio = ratio(fast, total);

    if total > 0 && fast_ratio > config.fast_ratio_issue_threshold {
        analysis
            .credibility_issues
            .push(format!("{fast}/{total} tests completed suspiciously fast"));
    }

    if total > 0 && ratio(succeeded, total) < config.low_success_rate_threshold {
        analysis.positive_findings.push(format!(
            "Low success rate ({succeeded}/{total}) indicates real issues"
        ));
    }

    for module in import_failures(raw_text) {
        analysis.positive_findings.push(format!(
            "Import failure for module '{module}' shows genuine dependency errors"
        ));
    }

    let distinct_scenarios: HashSet<&str> = history
        .iter()
        .map(|t| t.scenario.as_str())
        .filter(|s| !s.is_empty())
        .collect();

    let checks = [
        total > 0 && fast_ratio < config.fast_ratio_quality_threshold,
        succeeded < total,
        find_keyword(raw_text, &config.error_detail_markers).is_some(),
        distinct_scenarios.len() > config.min_distinct_scenarios,
    ];
    let passed = checks.iter().filter(|c| **c).count() as f64;
    analysis.quality_score = passed / QUALITY_CHECKS;

    analysis
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(scenario: &str, duration: f64, success: bool) -> TestExecutionRecord {
        TestExecutionRecord {
            scenario: scenario.to_string(),
            duration,
            success,
            timestamp: None,
            bugs_found: 0,
        }
    }

    #[test]
    fn empty_history_scores_zero() {
        let analysis = analyze(&VerifierConfig::default(), &[], r#"{"test_history":[]}"#);
        assert!(analysis.credibility_issues.is_empty());
        assert!(analysis.positive_findings.is_empty());
        assert_eq!(analysis.quality_score, 0.0);
    }

    #[test]
    fn fast_majority_is_a_credibility_issue() {
        let history: Vec<_> = (0..7)
            .map(|i| record(&format!("S{i}"), if i < 5 { 0.001 } else { 0.5 }, true))
            .collect();
        let analysis = analyze(&VerifierConfig::default(), &history, "");
        assert_eq!(analysis.credibility_issues.len(), 1);
        assert!(analysis.credibility_issues[0].contains("5/7"));
    }

    #[test]
    fn exactly_half_fast_is_not_an_issue() {
        let history = vec![record("A", 0.001, true), record("B", 0.5, true)];
        let analysis = analyze(&VerifierConfig::default(), &history, "");
        assert!(analysis.credibility_issues.is_empty());
    }

    #[test]
    fn invalid_durations_are_not_fast() {
        let history = vec![
            record("A", -1.0, true),
            record("B", f64::NEG_INFINITY, true),
            record("C", 0.001, true),
            record("D", 0.5, true),
        ];
        let analysis = analyze(&VerifierConfig::default(), &history, "");
        assert!(analysis.credibility_issues.is_empty());

        let mostly_fast = vec![
            record("A", -1.0, true),
            record("B", 0.001, true),
            record("C", 0.002, true),
            record("D", 0.5, true),
        ];
        let analysis = analyze(&VerifierConfig::default(), &mostly_fast, "");
        assert!(analysis.credibility_issues.is_empty());
    }

    #[test]
    fn low_success_rate_is_a_positive_finding() {
        let history: Vec<_> = (0..7).map(|i| record("S", 0.5, i < 3)).collect();
        let analysis = analyze(&VerifierConfig::default(), &history, "");
        assert!(analysis
            .positive_findings
            .iter()
            .any(|f| f.contains("3/7") && f.contains("Low success rate")));
    }

    #[test]
    fn import_failures_are_named_once_in_order() {
        let text = r#"ModuleNotFoundError: No module named 'torch' ... No module named \"redis\" ... No module named 'torch'"#;
        assert_eq!(import_failures(text), vec!["torch", "redis"]);

        let node = "Error: Cannot find module 'express'";
        assert_eq!(import_failures(node), vec!["express"]);

        let rust = "error[E0432]: unresolved import `tokio::sync`";
        assert_eq!(import_failures(rust), vec!["tokio::sync"]);
    }

    #[test]
    fn import_failure_becomes_positive_finding() {
        let analysis = analyze(
            &VerifierConfig::default(),
            &[],
            "No module named 'sentence_transformers'",
        );
        assert_eq!(analysis.positive_findings.len(), 1);
        assert!(analysis.positive_findings[0].contains("sentence_transformers"));
    }

    #[test]
    fn quality_score_counts_checks() {
        let history = vec![
            record("A", 0.5, true),
            record("B", 0.5, false),
            record("C", 0.5, true),
            record("D", 0.5, true),
        ];
        let full = analyze(&VerifierConfig::default(), &history, "Traceback: boom");
        assert_eq!(full.quality_score, 1.0);

        let no_error_text = analyze(&VerifierConfig::default(), &history, "all fine");
        assert_eq!(no_error_text.quality_score, 0.75);

        let all_pass_few = vec![record("A", 0.5, true), record("B", 0.5, true)];
        let partial = analyze(&VerifierConfig::default(), &all_pass_few, "");
        assert_eq!(partial.quality_score, 0.25);
    }
}
