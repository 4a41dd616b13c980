use super::outcome::{CheckinOutcome, PlatformOutcome};
use crate::account::Platform;

#[test]
fn test_success_outcome_shape() {
    let outcome = CheckinOutcome::succeeded("password", Some("ok".to_string()));
    assert!(outcome.success);
    assert_eq!(outcome.method, "password");
    assert_eq!(outcome.summary.as_deref(), Some("ok"));
    assert!(outcome.error.is_none());
    assert!(outcome.platform_results.is_empty());
}

#[test]
fn test_failure_outcome_carries_error() {
    let outcome = CheckinOutcome::failed("linuxdo", "login rejected");
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("login rejected"));
}

#[test]
fn test_platform_results_are_ordered() {
    let mut outcome = CheckinOutcome::failed("linuxdo", "AnyRouter login failed");
    outcome.platform_results = vec![PlatformOutcome::failed(Platform::AnyRouter, "login failed")];

    assert_eq!(outcome.platform_results.len(), 1);
    assert_eq!(outcome.platform_results[0].platform, Platform::AnyRouter);
    assert!(!outcome.platform_results[0].success);
}

#[test]
fn test_outcome_serializes_without_empty_fields() {
    let outcome = CheckinOutcome::succeeded("session", None);
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"success": true, "method": "session"})
    );
}
