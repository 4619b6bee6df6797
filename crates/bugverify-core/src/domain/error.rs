//! Error taxonomy for bug verification.

/// Failure while verifying a single bug record.
///
/// These never abort a run: the verifier converts them into a zero-confidence
/// false-positive result for the affected bug.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BugVerificationError {
    #[error("invalid duration {duration} for bug {bug_index} in scenario '{scenario}'")]
    InvalidDuration {
        scenario: String,
        bug_index: u64,
        duration: f64,
    },

    #[error("verification task for bug {bug_index} aborted: {reason}")]
    TaskAborted { bug_index: u64, reason: String },
}

/// Fatal errors produced by the verification engine and its glue.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("malformed report: {0}")]
    MalformedReport(String),

    #[error("invalid verifier config: {0}")]
    InvalidConfig(String),

    #[error("verification task failed: {0}")]
    TaskFailed(String),

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for verification operations.
pub type Result<T> = std::result::Result<T, VerifyError>;
