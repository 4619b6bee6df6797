//! Structured observability hooks for verification runs.
//!
//! Every run executes inside a `bugverify.run` span carrying its `run_id`, so
//! per-bug events emitted deep in the verifier are attributed to the run
//! without threading the id through every call.

use tracing::{debug, info, warn};

use crate::domain::{BugVerificationError, CredibilityAnalysis, VerificationResult};

/// Span for one verification run.
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("bugverify.run", run_id = %run_id)
}

/// RAII guard that enters the run span for the duration of a synchronous run.
///
/// Async callers should attach [`run_span`] with `Instrument` instead; an
/// entered span must not be held across `.await`.
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(run_id: &str) -> Self {
        Self {
            _span: run_span(run_id).entered(),
        }
    }
}

/// Emit event: verification started.
pub fn emit_verification_started(run_id: &str, source: &str, bugs: usize, tests: usize) {
    info!(
        event = "verification.started",
        run_id = %run_id,
        source = %source,
        bugs = bugs,
        tests = tests,
    );
}

/// Emit event: one bug classified.
pub fn emit_bug_verified(result: &VerificationResult) {
    debug!(
        event = "bug.verified",
        scenario = %result.bug.scenario,
        bug_index = result.bug.bug_index,
        is_real = result.is_real,
        confidence = result.confidence,
    );
}

/// Emit event: a bug could not be evaluated and was downgraded (warning level).
pub fn emit_bug_verification_error(scenario: &str, bug_index: u64, error: &BugVerificationError) {
    warn!(
        event = "bug.verification_error",
        scenario = %scenario,
        bug_index = bug_index,
        error = %error,
    );
}

/// Emit event: run-level credibility analysis completed.
pub fn emit_credibility_analyzed(run_id: &str, analysis: &CredibilityAnalysis) {
    info!(
        event = "credibility.analyzed",
        run_id = %run_id,
        issues = analysis.credibility_issues.len(),
        positive_findings = analysis.positive_findings.len(),
        quality_score = analysis.quality_score,
    );
}

/// Emit event: verification finished.
pub fn emit_verification_finished(
    run_id: &str,
    claimed: usize,
    verified: usize,
    confidence: f64,
    duration_ms: u64,
) {
    info!(
        event = "verification.finished",
        run_id = %run_id,
        claimed = claimed,
        verified = verified,
        false_positives = claimed - verified,
        confidence = confidence,
        duration_ms = duration_ms,
    );
}
