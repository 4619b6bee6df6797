//! Suspicion and corroboration rules.
//!
//! Evaluates a [`BugRecord`] (plus the test execution that produced it, when
//! known) against an ordered [`PatternRuleSet`]. Every rule is checked; rules
//! are not mutually exclusive. Each match produces a [`Signal`] that either
//! casts doubt on the bug (suspicion) or confirms it (corroboration).

use serde::{Deserialize, Serialize};

use crate::config::{find_keyword, VerifierConfig};
use crate::domain::{BugRecord, BugVerificationError, TestExecutionRecord};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A single detection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternRule {
    /// Bug was synthesized from a `bugs_found` count.
    Reconstructed,
    /// Test finished faster than the realism threshold.
    TooFast,
    /// Dependency-gated scenario finished in near-zero time.
    MissingDependency,
    /// Security scenario, judged by whether the description carries auth detail.
    SecurityAuthDetail,
    /// Infrastructure component named together with a connection failure.
    InfrastructureFailure,
}

/// Ordered rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRuleSet {
    pub rules: Vec<PatternRule>,
}

impl PatternRuleSet {
    /// All rules in their canonical evaluation order.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                PatternRule::Reconstructed,
                PatternRule::TooFast,
                PatternRule::MissingDependency,
                PatternRule::SecurityAuthDetail,
                PatternRule::InfrastructureFailure,
            ],
        }
    }

    /// An empty table; every bug comes out signal-free.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: PatternRule) -> Self {
        self.rules.push(rule);
        self
    }
}

impl Default for PatternRuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Direction of a fired rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Suspicion,
    Corroboration,
}

/// Evidence produced by one fired rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub rule: PatternRule,
    pub kind: SignalKind,
    pub message: String,
    /// Confidence deducted by a suspicion; zero for corroborations.
    pub weight: f64,
    /// Keyword that made the rule fire, for keyword-driven rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
}

/// All signals fired for one bug, split by direction, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    pub suspicions: Vec<Signal>,
    pub corroborations: Vec<Signal>,
}

impl Signals {
    pub fn suspicion_messages(&self) -> Vec<String> {
        self.suspicions.iter().map(|s| s.message.clone()).collect()
    }

    pub fn corroboration_messages(&self) -> Vec<String> {
        self.corroborations.iter().map(|s| s.message.clone()).collect()
    }

    /// Sum of suspicion weights.
    pub fn suspicion_weight(&self) -> f64 {
        self.suspicions.iter().map(|s| s.weight).sum()
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Facts about one bug that the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub bug: &'a BugRecord,
    pub origin: Option<&'a TestExecutionRecord>,
    /// Duration used for timing rules.
    pub duration: f64,
}

impl<'a> RuleInput<'a> {
    /// Build the rule input, resolving the effective duration.
    ///
    /// A bug that reports no duration borrows its originating test's duration.
    /// Negative or non-finite durations are rejected.
    pub fn new(
        bug: &'a BugRecord,
        origin: Option<&'a TestExecutionRecord>,
    ) -> Result<Self, BugVerificationError> {
        let duration = match origin {
            Some(test) if bug.duration == 0.0 => test.duration,
            _ => bug.duration,
        };
        if !duration.is_finite() || duration < 0.0 {
            return Err(BugVerificationError::InvalidDuration {
                scenario: bug.scenario.clone(),
                bug_index: bug.bug_index,
                duration,
            });
        }
        Ok(Self {
            bug,
            origin,
            duration,
        })
    }
}

/// Evaluate every rule of `rule_set` against one bug.
pub fn detect(
    rule_set: &PatternRuleSet,
    config: &VerifierConfig,
    bug: &BugRecord,
    origin: Option<&TestExecutionRecord>,
) -> Result<Signals, BugVerificationError> {
    let input = RuleInput::new(bug, origin)?;
    let mut signals = Signals::default();

    for rule in &rule_set.rules {
        if let Some(signal) = check_rule(*rule, &input, config) {
            match signal.kind {
                SignalKind::Suspicion => signals.suspicions.push(signal),
                SignalKind::Corroboration => signals.corroborations.push(signal),
            }
        }
    }

    Ok(signals)
}

/// Evaluate a single rule.
pub fn check_rule(
    rule: PatternRule,
    input: &RuleInput<'_>,
    config: &VerifierConfig,
) -> Option<Signal> {
    let suspicion = |message: String| Signal {
        rule,
        kind: SignalKind::Suspicion,
        message,
        weight: config.suspicion_weight,
        matched: None,
    };
    let corroboration = |message: String| Signal {
        rule,
        kind: SignalKind::Corroboration,
        message,
        weight: 0.0,
        matched: None,
    };

    match rule {
        PatternRule::Reconstructed => input
            .bug
            .reconstructed
            .then(|| suspicion("lacks detailed description".to_string())),
        PatternRule::TooFast => (input.duration < config.realism_threshold)
            .then(|| suspicion(format!("completed too fast: {}s", input.duration))),
        PatternRule::MissingDependency => {
            let gated = find_keyword(&input.bug.scenario, &config.dependency_gated_scenarios)?;
            if input.duration < config.dependency_gate_threshold {
                Some(Signal {
                    matched: Some(gated.to_string()),
                    ..suspicion("ran successfully without required dependency".to_string())
                })
            } else {
                None
            }
        }
        PatternRule::SecurityAuthDetail => {
            find_keyword(&input.bug.scenario, &config.security_scenario_keywords)?;
            match find_keyword(input.bug.description_text(), &config.auth_keywords) {
                Some(_) => Some(corroboration(
                    "security bug with auth implications".to_string(),
                )),
                None => Some(suspicion("security bug lacking auth detail".to_string())),
            }
        }
        PatternRule::InfrastructureFailure => {
            let text = format!("{} {}", input.bug.scenario, input.bug.description_text());
            let component = find_keyword(&text, &config.infrastructure_dependencies)?;
            let phrase = find_keyword(&text, &config.connection_failure_phrases)?;
            Some(Signal {
                matched: Some(format!("{component}: {phrase}")),
                ..corroboration("confirmed by infrastructure failure signature".to_string())
            })
        }
    }
}
