use bugverify_core::{
    verify_report, AggregateReport, RawReport, VerificationContext, VerifyError,
    CLOSING_RECOMMENDATIONS,
};
use serde_json::{json, Value};

fn run(value: Value) -> AggregateReport {
    verify_report(
        &VerificationContext::new("run-it"),
        &RawReport::from_value(value),
    )
    .expect("verify")
}

fn history(records: &[(&str, f64, bool, u64)]) -> Value {
    Value::Array(
        records
            .iter()
            .enumerate()
            .map(|(i, (scenario, duration, success, bugs_found))| {
                json!({
                    "scenario": scenario,
                    "duration": duration,
                    "success": success,
                    "timestamp": 1_700_000_000.0 + i as f64,
                    "bugs_found": bugs_found,
                })
            })
            .collect(),
    )
}

#[test]
fn empty_input_yields_zero_report() {
    let report = run(json!({ "test_history": [] }));
    assert_eq!(report.total_bugs_claimed, 0);
    assert_eq!(report.verification_confidence, 0.0);
    assert!(report.bug_results.is_empty());
    assert!(report.scenario_breakdown.is_empty());
    assert_eq!(
        report.recommendations,
        CLOSING_RECOMMENDATIONS.map(String::from).to_vec()
    );
}

#[test]
fn missing_history_is_typed_fatal_error() {
    let err = verify_report(
        &VerificationContext::new("run-it"),
        &RawReport::from_value(json!({ "bug_database": [] })),
    )
    .unwrap_err();
    assert!(matches!(err, VerifyError::MalformedReport(_)));
}

#[test]
fn absurd_bugs_found_is_typed_fatal_error() {
    let err = verify_report(
        &VerificationContext::new("run-it"),
        &RawReport::from_value(json!({
            "test_history": [{ "scenario": "A", "duration": 0.5, "success": false, "bugs_found": 1e19 }]
        })),
    )
    .unwrap_err();
    assert!(matches!(err, VerifyError::MalformedReport(_)));
}

#[test]
fn pipeline_isolation_scenario() {
    let report = run(json!({
        "test_history": [
            { "scenario": "Security Validation", "duration": 0.50, "success": true, "bugs_found": 0 },
            { "scenario": "Pipeline Data Isolation", "duration": 0.096, "success": false, "bugs_found": 1 },
        ],
        "detailed_bugs": [
            { "scenario": "Pipeline Data Isolation", "duration": 0.096, "reconstructed": true },
        ],
    }));

    assert_eq!(report.total_bugs_claimed, 1);
    assert_eq!(report.verified_real_bugs, 0);
    assert_eq!(report.false_positives, 1);

    let result = &report.bug_results[0];
    assert!(!result.is_real);
    assert_eq!(result.confidence, 0.75);
    assert_eq!(result.reasons.len(), 1);
    assert_eq!(report.verification_confidence, 0.75);

    let row = &report.scenario_breakdown["Pipeline Data Isolation"];
    assert_eq!((row.claimed, row.verified, row.false_positives), (1, 0, 1));

    assert!(report.recommendations[0].contains("detailed bug descriptions"));
}

#[test]
fn storage_backend_connection_failure_is_real_regardless_of_duration() {
    for duration in [0.0, 0.002, 3.5] {
        let report = run(json!({
            "test_history": [],
            "detailed_bugs": [{
                "scenario": "Session Store",
                "duration": duration,
                "description": "PostgreSQL error: connection refused (127.0.0.1:5432)",
            }],
        }));
        let result = &report.bug_results[0];
        assert!(result.is_real, "duration {duration}");
        assert_eq!(result.confidence, 0.9);
        assert_eq!(report.verified_real_bugs, 1);
        assert_eq!(
            report.recommendations[0],
            "Focus debugging on Session Store (1 confirmed bugs)"
        );
    }
}

#[test]
fn reconstructed_fast_bug_is_at_most_half_confident() {
    let report = run(json!({
        "test_history": history(&[("Queue Drain", 0.003, false, 2)]),
    }));
    assert_eq!(report.total_bugs_claimed, 2);
    for result in &report.bug_results {
        assert!(result.bug.reconstructed);
        assert!(!result.is_real);
        assert!(result.confidence <= 0.5);
    }
}

#[test]
fn fast_majority_and_low_success_rate() {
    let report = run(json!({
        "test_history": history(&[
            ("S1", 0.001, true, 0),
            ("S2", 0.001, true, 0),
            ("S3", 0.001, true, 0),
            ("S4", 0.001, false, 0),
            ("S5", 0.001, false, 0),
            ("S6", 0.4, false, 0),
            ("S7", 0.4, false, 0),
        ]),
    }));
    assert!(report
        .analysis
        .credibility_issues
        .iter()
        .any(|i| i.contains("5/7")));
    assert!(report
        .analysis
        .positive_findings
        .iter()
        .any(|f| f.contains("3/7")));
}

#[test]
fn import_failure_in_report_text_is_positive_finding() {
    let report = run(json!({
        "test_history": history(&[("Embedding Search", 0.2, false, 0)]),
        "logs": ["ModuleNotFoundError: No module named 'faiss'"],
    }));
    assert!(report
        .analysis
        .positive_findings
        .iter()
        .any(|f| f.contains("faiss")));
}

#[test]
fn verifying_twice_is_byte_identical() {
    let input = json!({
        "test_history": history(&[
            ("Auth Token Refresh", 0.004, false, 1),
            ("Cache Layer", 0.3, false, 2),
            ("Model Inference", 0.0001, true, 1),
            ("Rate Limiter", 0.8, true, 0),
        ]),
        "bug_database": [
            { "scenario": "Auth Token Refresh", "description": "refresh token reused after logout" },
            { "scenario": "Cache Layer", "description": "redis: connection refused" },
            { "scenario": "Model Inference", "duration": 0.0001 },
        ],
    });
    let first = serde_json::to_string(&run(input.clone())).expect("serialize");
    let second = serde_json::to_string(&run(input)).expect("serialize");
    assert_eq!(first, second);
}

#[test]
fn counters_stay_consistent_across_input_shapes() {
    let inputs = vec![
        json!({ "test_history": history(&[("A", 0.0, false, 3), ("B", 0.5, true, 1)]) }),
        json!({
            "test_history": history(&[("A", 0.2, false, 1)]),
            "detailed_bugs": [
                { "scenario": "A", "description": "mysql: could not connect" },
                { "scenario": "Security Audit", "description": "password stored in plain text" },
                { "scenario": "Security Audit" },
                { "scenario": "B", "duration": "-1" },
            ],
        }),
        json!({ "test_history": [{}, "garbage", null], "bug_database": [{}] }),
    ];

    for input in inputs {
        let report = run(input);
        assert!(report.is_consistent());
        assert!((0.0..=1.0).contains(&report.verification_confidence));
        assert!((0.0..=1.0).contains(&report.analysis.quality_score));
        for result in &report.bug_results {
            assert!((0.0..=1.0).contains(&result.confidence));
        }
        let breakdown_total: usize = report.scenario_breakdown.values().map(|r| r.claimed).sum();
        assert_eq!(breakdown_total, report.total_bugs_claimed);
    }
}

#[test]
fn security_bug_classification_depends_on_auth_detail() {
    let report = run(json!({
        "test_history": history(&[("Security Audit", 0.4, false, 0)]),
        "detailed_bugs": [
            { "scenario": "Security Audit", "description": "password stored in plain text" },
            { "scenario": "Security Audit", "description": "unexpected 500 on /admin" },
        ],
    }));
    assert!(report.bug_results[0].is_real);
    assert_eq!(report.bug_results[0].confidence, 0.9);
    assert!(!report.bug_results[1].is_real);
    assert_eq!(report.bug_results[1].confidence, 0.75);
    assert_eq!(
        report.bug_results[1].reasons,
        vec!["security bug lacking auth detail".to_string()]
    );
}
