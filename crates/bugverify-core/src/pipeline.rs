//! Verification pipeline.
//!
//! Load → Extract → Verify (per bug) → Aggregate ‖ Analyze → Recommend → Emit.
//!
//! [`verify_report`] runs the whole pass on the calling thread.
//! [`verify_report_concurrent`] fans per-bug verification out to tokio tasks,
//! at most `max_concurrent_verifications` at a time, and runs the credibility
//! analysis alongside them, joining everything before aggregation. Both produce identical reports for the same input.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::Instrument;

use crate::aggregate::{aggregate, scenario_breakdown};
use crate::config::VerifierConfig;
use crate::credibility;
use crate::domain::{
    AggregateReport, BugRecord, BugVerificationError, CredibilityAnalysis, RawReport, Result,
    TestExecutionRecord, VerificationResult, VerifyError,
};
use crate::extract::ParsedReport;
use crate::obs::{self, RunSpan};
use crate::patterns::PatternRuleSet;
use crate::recommend::recommend;
use crate::verifier::verify;

/// Per-bug verification step run inside each concurrent task.
type BugVerifier = fn(
    &PatternRuleSet,
    &VerifierConfig,
    BugRecord,
    Option<&TestExecutionRecord>,
) -> VerificationResult;

/// Everything a run needs besides the report itself.
///
/// Passed explicitly into the pipeline; there is no process-wide state.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationContext {
    /// Identifier attached to every event the run emits.
    pub run_id: String,
    pub config: VerifierConfig,
    pub rules: PatternRuleSet,
}

impl VerificationContext {
    /// Context with the default config and the standard rule table.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            config: VerifierConfig::default(),
            rules: PatternRuleSet::standard(),
        }
    }

    /// Override the config.
    pub fn with_config(mut self, config: VerifierConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the rule table.
    pub fn with_rules(mut self, rules: PatternRuleSet) -> Self {
        self.rules = rules;
        self
    }
}

/// Verify a report on the current thread.
pub fn verify_report(ctx: &VerificationContext, raw: &RawReport) -> Result<AggregateReport> {
    let _span = RunSpan::enter(&ctx.run_id);
    ctx.config.validate()?;
    let started = Instant::now();

    let parsed = ParsedReport::parse_bounded(raw, ctx.config.max_reconstructed_bugs)?;
    let pairs = parsed.bugs_with_origin();
    obs::emit_verification_started(
        &ctx.run_id,
        parsed.source.label(),
        pairs.len(),
        parsed.test_history.len(),
    );

    let results: Vec<VerificationResult> = pairs
        .into_iter()
        .map(|(bug, origin)| verify(&ctx.rules, &ctx.config, bug, origin.as_ref()))
        .collect();
    let analysis = credibility::analyze(&ctx.config, &parsed.test_history, raw.text());

    Ok(assemble(ctx, results, analysis, started))
}

/// Verify a report with per-bug verification spread across tokio tasks.
pub async fn verify_report_concurrent(
    ctx: Arc<VerificationContext>,
    raw: Arc<RawReport>,
) -> Result<AggregateReport> {
    let span = obs::run_span(&ctx.run_id);
    run_concurrent(ctx, raw).instrument(span).await
}

async fn run_concurrent(
    ctx: Arc<VerificationContext>,
    raw: Arc<RawReport>,
) -> Result<AggregateReport> {
    run_concurrent_with(ctx, raw, verify).await
}

async fn run_concurrent_with(
    ctx: Arc<VerificationContext>,
    raw: Arc<RawReport>,
    verifier: BugVerifier,
) -> Result<AggregateReport> {
    ctx.config.validate()?;
    let started = Instant::now();

    let parsed = Arc::new(ParsedReport::parse_bounded(
        &raw,
        ctx.config.max_reconstructed_bugs,
    )?);
    let pairs = parsed.bugs_with_origin();
    obs::emit_verification_started(
        &ctx.run_id,
        parsed.source.label(),
        pairs.len(),
        parsed.test_history.len(),
    );

    let analysis_task = {
        let ctx = Arc::clone(&ctx);
        let parsed = Arc::clone(&parsed);
        let raw = Arc::clone(&raw);
        tokio::spawn(
            async move { credibility::analyze(&ctx.config, &parsed.test_history, raw.text()) }
                .in_current_span(),
        )
    };

    let bugs: Vec<BugRecord> = pairs.iter().map(|(bug, _)| bug.clone()).collect();

    // Barrier: every per-bug verdict is in before aggregation starts.
    // `buffered` yields in input order, so results line up with `bugs`.
    let joined: Vec<_> = stream::iter(pairs)
        .map(|(bug, origin)| {
            let ctx = Arc::clone(&ctx);
            tokio::spawn(
                async move { verifier(&ctx.rules, &ctx.config, bug, origin.as_ref()) }
                    .in_current_span(),
            )
        })
        .buffered(ctx.config.max_concurrent_verifications)
        .collect()
        .await;
    let results: Vec<VerificationResult> = bugs
        .into_iter()
        .zip(joined)
        .map(|(bug, outcome)| match outcome {
            Ok(result) => result,
            Err(join_err) => {
                let err = BugVerificationError::TaskAborted {
                    bug_index: bug.bug_index,
                    reason: join_err.to_string(),
                };
                obs::emit_bug_verification_error(&bug.scenario, bug.bug_index, &err);
                VerificationResult::errored(bug)
            }
        })
        .collect();

    let analysis = analysis_task
        .await
        .map_err(|e| VerifyError::TaskFailed(format!("credibility analysis: {e}")))?;

    Ok(assemble(&ctx, results, analysis, started))
}

fn assemble(
    ctx: &VerificationContext,
    results: Vec<VerificationResult>,
    analysis: CredibilityAnalysis,
    started: Instant,
) -> AggregateReport {
    obs::emit_credibility_analyzed(&ctx.run_id, &analysis);

    let total = results.len();
    let verified = results.iter().filter(|r| r.is_real).count();
    let mut report = AggregateReport {
        total_bugs_claimed: total,
        verified_real_bugs: verified,
        false_positives: total - verified,
        verification_confidence: aggregate(&results),
        analysis,
        recommendations: Vec::new(),
        scenario_breakdown: scenario_breakdown(&results),
        bug_results: results,
    };
    report.recommendations = recommend(&ctx.config, &report);

    obs::emit_verification_finished(
        &ctx.run_id,
        report.total_bugs_claimed,
        report.verified_real_bugs,
        report.verification_confidence,
        started.elapsed().as_millis() as u64,
    );
    report
}
