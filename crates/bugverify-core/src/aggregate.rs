//! Confidence aggregation and per-scenario rollups.

use std::collections::BTreeMap;

use crate::domain::{ScenarioBreakdown, VerificationResult};

/// Mean confidence across all verdicts; `0.0` when there are none.
///
/// Every bug counts equally.
pub fn aggregate(results: &[VerificationResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let total: f64 = results.iter().map(|r| r.confidence).sum();
    (total / results.len() as f64).clamp(0.0, 1.0)
}

/// Group verdicts by scenario name.
pub fn scenario_breakdown(results: &[VerificationResult]) -> BTreeMap<String, ScenarioBreakdown> {
    let mut grouped: BTreeMap<String, Vec<&VerificationResult>> = BTreeMap::new();
    for r in results {
        grouped.entry(r.bug.scenario.clone()).or_default().push(r);
    }

    grouped
        .into_iter()
        .map(|(scenario, group)| {
            let verified = group.iter().filter(|r| r.is_real).count();
            let confidence = group.iter().map(|r| r.confidence).sum::<f64>() / group.len() as f64;
            let row = ScenarioBreakdown {
                claimed: group.len(),
                verified,
                false_positives: group.len() - verified,
                confidence,
            };
            (scenario, row)
        })
        .collect()
}
