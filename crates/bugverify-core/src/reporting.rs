//! Report artifacts for CI consumers.
//!
//! - `verification.json` + `verification.digest`: the aggregate report with a
//!   SHA-256 integrity digest
//! - markdown summary with the per-scenario bug table

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{AggregateReport, Result, VerifyError};

/// Persisted output of one verification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationArtifact {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    /// Report file the run was computed from, when known.
    pub source: Option<String>,
    pub report: AggregateReport,
}

impl VerificationArtifact {
    pub fn new(run_id: impl Into<String>, source: Option<String>, report: AggregateReport) -> Self {
        Self {
            run_id: run_id.into(),
            generated_at: Utc::now(),
            source,
            report,
        }
    }
}

/// SHA-256 hex digest of `data`.
pub fn content_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Persist `<dir>/<run_id>/verification.json` and `<dir>/<run_id>/verification.digest`.
pub fn write_verification_artifact(artifact: &VerificationArtifact, dir: &Path) -> Result<PathBuf> {
    let run_dir = dir.join(&artifact.run_id);
    std::fs::create_dir_all(&run_dir)?;

    let path = run_dir.join("verification.json");
    let json = serde_json::to_vec_pretty(artifact)?;
    std::fs::write(&path, &json)?;
    std::fs::write(run_dir.join("verification.digest"), content_digest(&json))?;

    Ok(path)
}

/// Read `<dir>/<run_id>/verification.json`, verifying it against its digest.
pub fn read_verification_artifact(run_id: &str, dir: &Path) -> Result<VerificationArtifact> {
    let run_dir = dir.join(run_id);
    let json = std::fs::read(run_dir.join("verification.json"))?;
    let expected = std::fs::read_to_string(run_dir.join("verification.digest"))?;

    let actual = content_digest(&json);
    if expected.trim() != actual {
        return Err(VerifyError::DigestMismatch {
            expected: expected.trim().to_string(),
            actual,
        });
    }
    Ok(serde_json::from_slice(&json)?)
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn table_cell(text: &str) -> String {
    if text.is_empty() {
        "(unnamed)".to_string()
    } else {
        text.replace('|', "\\|")
    }
}

fn push_list(md: &mut String, items: &[String]) {
    if items.is_empty() {
        md.push_str("none\n");
    }
    for item in items {
        md.push_str(&format!("- {}\n", item));
    }
}

/// Render the markdown summary of a report.
pub fn render_verification_md(report: &AggregateReport) -> String {
    let mut md = String::from("# Bug Verification Report\n\n");
    md.push_str(&format!(
        "- bugs claimed: {}\n- verified real: {}\n- false positives: {}\n- verification confidence: {}\n- report quality score: {}\n",
        report.total_bugs_claimed,
        report.verified_real_bugs,
        report.false_positives,
        percent(report.verification_confidence),
        percent(report.analysis.quality_score),
    ));

    md.push_str("\n## Bugs by Scenario\n\n");
    if report.scenario_breakdown.is_empty() {
        md.push_str("no bugs claimed\n");
    } else {
        md.push_str("| Bug Type | Claimed | Verified | False Positives | Confidence |\n");
        md.push_str("|---|---|---|---|---|\n");
        for (scenario, row) in &report.scenario_breakdown {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                table_cell(scenario),
                row.claimed,
                row.verified,
                row.false_positives,
                percent(row.confidence),
            ));
        }
    }

    md.push_str("\n## Credibility Issues\n\n");
    push_list(&mut md, &report.analysis.credibility_issues);

    md.push_str("\n## Positive Findings\n\n");
    push_list(&mut md, &report.analysis.positive_findings);

    md.push_str("\n## Recommendations\n\n");
    for (i, rec) in report.recommendations.iter().enumerate() {
        md.push_str(&format!("{}. {}\n", i + 1, rec));
    }
    md
}
