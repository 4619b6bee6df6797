//! Domain models for bug verification.
//!
//! - `RawReport`: immutable input as loaded from a bug hunt
//! - `TestExecutionRecord` / `BugRecord`: normalized records extracted from it
//! - `VerificationResult` / `AggregateReport`: verdicts produced by a run

pub mod error;
pub mod report;
pub mod verdict;

pub use error::{BugVerificationError, Result, VerifyError};
pub use report::{BugRecord, RawReport, TestExecutionRecord, Timestamp};
pub use verdict::{
    AggregateReport, CredibilityAnalysis, ScenarioBreakdown, VerificationResult,
    VERIFICATION_ERROR_REASON,
};
