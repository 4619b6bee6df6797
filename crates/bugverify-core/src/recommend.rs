//! Recommendation generation.

use crate::config::VerifierConfig;
use crate::domain::AggregateReport;

/// Recommendations appended to every report, in order.
pub const CLOSING_RECOMMENDATIONS: [&str; 4] = [
    "Add honeypot validation tests that must fail, proving the harness detects planted bugs",
    "Require detailed error messages in every bug report",
    "Run tests against real dependencies instead of stubs or mocks",
    "Add network activity monitoring to confirm genuine cross-component interaction",
];

/// Build the ordered recommendation list for a report whose counters and
/// `bug_results` are already filled in.
pub fn recommend(config: &VerifierConfig, report: &AggregateReport) -> Vec<String> {
    let mut out = Vec::new();

    if report.false_positives > report.verified_real_bugs {
        out.push(
            "Add detailed bug descriptions (error message, failing input, stack trace) \
             instead of bare bug counts"
                .to_string(),
        );
        out.push(format!(
            "Enforce a minimum realistic test duration of {}s and reject faster results",
            config.realism_threshold
        ));
    }

    // (scenario, confirmed count) in order of first appearance.
    let mut confirmed: Vec<(&str, usize)> = Vec::new();
    for r in report.bug_results.iter().filter(|r| r.is_real) {
        match confirmed
            .iter_mut()
            .find(|(scenario, _)| *scenario == r.bug.scenario)
        {
            Some((_, count)) => *count += 1,
            None => confirmed.push((r.bug.scenario.as_str(), 1)),
        }
    }
    // Stable sort keeps first-appearance order among equal counts.
    confirmed.sort_by(|a, b| b.1.cmp(&a.1));
    for (scenario, count) in confirmed {
        out.push(format!(
            "Focus debugging on {scenario} ({count} confirmed bugs)"
        ));
    }

    out.extend(CLOSING_RECOMMENDATIONS.iter().map(|s| s.to_string()));
    out
}
