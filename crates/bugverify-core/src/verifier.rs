//! Single-bug classification.
//!
//! Turns the signals fired for one bug into a [`VerificationResult`]:
//!
//! - any corroboration → real, with the corroborated confidence; coincident
//!   suspicions are ignored
//! - otherwise → false positive, confidence `1 - Σ suspicion weights`
//!   floored at zero, or the unsuspicious confidence when nothing fired
//!
//! Evaluation failures are contained here; they never escape to the run.

use crate::config::VerifierConfig;
use crate::domain::{BugRecord, TestExecutionRecord, VerificationResult};
use crate::obs;
use crate::patterns::{detect, PatternRuleSet, Signals};

/// Verify one bug against the rule table.
pub fn verify(
    rule_set: &PatternRuleSet,
    config: &VerifierConfig,
    bug: BugRecord,
    origin: Option<&TestExecutionRecord>,
) -> VerificationResult {
    match detect(rule_set, config, &bug, origin) {
        Ok(signals) => {
            let result = classify(bug, &signals, config);
            obs::emit_bug_verified(&result);
            result
        }
        Err(err) => {
            obs::emit_bug_verification_error(&bug.scenario, bug.bug_index, &err);
            VerificationResult::errored(bug)
        }
    }
}

/// Classify a bug from already-detected signals.
pub fn classify(bug: BugRecord, signals: &Signals, config: &VerifierConfig) -> VerificationResult {
    if !signals.corroborations.is_empty() {
        return VerificationResult {
            bug,
            is_real: true,
            confidence: config.corroborated_confidence.clamp(0.0, 1.0),
            reasons: signals.corroboration_messages(),
        };
    }

    let confidence = if signals.suspicions.is_empty() {
        config.unsuspicious_confidence
    } else {
        1.0 - signals.suspicion_weight()
    };

    VerificationResult {
        bug,
        is_real: false,
        confidence: confidence.clamp(0.0, 1.0),
        reasons: signals.suspicion_messages(),
    }
}
