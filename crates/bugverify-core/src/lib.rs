//! bugverify core library
//!
//! Skeptical verification of bug-hunt reports: decides which claimed bugs are
//! credible, scores confidence, flags run-level credibility problems and
//! produces prioritized recommendations.

pub mod aggregate;
pub mod config;
pub mod credibility;
pub mod domain;
pub mod extract;
pub mod obs;
pub mod patterns;
pub mod pipeline;
pub mod recommend;
pub mod reporting;
pub mod telemetry;
pub mod verifier;

pub use aggregate::{aggregate, scenario_breakdown};
pub use config::{VerifierConfig, REALISM_THRESHOLD};
pub use credibility::{analyze, import_failures};
pub use domain::{
    AggregateReport, BugRecord, BugVerificationError, CredibilityAnalysis, RawReport, Result,
    ScenarioBreakdown, TestExecutionRecord, Timestamp, VerificationResult, VerifyError,
    VERIFICATION_ERROR_REASON,
};
pub use extract::{extract, BugSource, ParsedReport};
pub use obs::{run_span, RunSpan};
pub use patterns::{
    check_rule, detect, PatternRule, PatternRuleSet, RuleInput, Signal, SignalKind, Signals,
};
pub use pipeline::{verify_report, verify_report_concurrent, VerificationContext};
pub use recommend::{recommend, CLOSING_RECOMMENDATIONS};
pub use reporting::{
    content_digest, read_verification_artifact, render_verification_md,
    write_verification_artifact, VerificationArtifact,
};
pub use telemetry::init_tracing;
pub use verifier::{classify, verify};

/// bugverify version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
