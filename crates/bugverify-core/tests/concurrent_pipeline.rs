use std::sync::Arc;

use bugverify_core::{
    verify_report, verify_report_concurrent, RawReport, VerificationContext, VerifyError,
};
use serde_json::json;

fn mixed_report() -> RawReport {
    RawReport::from_value(json!({
        "test_history": [
            { "scenario": "Auth Token Refresh", "duration": 0.004, "success": false, "bugs_found": 2 },
            { "scenario": "Cache Layer", "duration": 0.31, "success": false, "bugs_found": 1 },
            { "scenario": "Model Inference", "duration": 0.0001, "success": true, "bugs_found": 1 },
            { "scenario": "Rate Limiter", "duration": 0.8, "success": true, "bugs_found": 0 },
            { "scenario": "Broker Fanout", "duration": -2.0, "success": false, "bugs_found": 1 },
        ],
        "notes": "Traceback: No module named 'torch'",
    }))
}

#[tokio::test]
async fn concurrent_matches_sequential() {
    let ctx = VerificationContext::new("run-concurrent");
    let raw = mixed_report();

    let sequential = verify_report(&ctx, &raw).expect("sequential");
    let concurrent = verify_report_concurrent(Arc::new(ctx), Arc::new(raw))
        .await
        .expect("concurrent");

    assert_eq!(sequential, concurrent);
    assert_eq!(concurrent.total_bugs_claimed, 5);
    assert!(concurrent.is_consistent());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_preserves_extraction_order() {
    let bugs: Vec<_> = (0..64)
        .map(|i| json!({ "scenario": format!("S{i}"), "duration": 0.2, "bug_index": i }))
        .collect();
    let raw = RawReport::from_value(json!({ "test_history": [], "detailed_bugs": bugs }));

    let report = verify_report_concurrent(
        Arc::new(VerificationContext::new("run-order")),
        Arc::new(raw),
    )
    .await
    .expect("concurrent");

    let indices: Vec<u64> = report.bug_results.iter().map(|r| r.bug.bug_index).collect();
    assert_eq!(indices, (0..64).collect::<Vec<u64>>());
}

#[tokio::test]
async fn concurrent_invalid_bug_is_recovered() {
    let report = verify_report_concurrent(
        Arc::new(VerificationContext::new("run-recover")),
        Arc::new(mixed_report()),
    )
    .await
    .expect("concurrent");

    let broker = report
        .bug_results
        .iter()
        .find(|r| r.bug.scenario == "Broker Fanout")
        .expect("broker bug present");
    assert_eq!(broker.confidence, 0.0);
    assert_eq!(broker.reasons, vec!["verification error".to_string()]);
}

#[tokio::test]
async fn concurrent_malformed_report_fails() {
    let err = verify_report_concurrent(
        Arc::new(VerificationContext::new("run-bad")),
        Arc::new(RawReport::from_value(json!({ "test_history": "nope" }))),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, VerifyError::MalformedReport(_)));
}
