//! Tests for drift job orchestration.

use super::*;
use crate::drift::EmbeddingSet;
use crate::store::{InMemoryEmbeddingStore, MemoryAlertSink, MemoryResultSink};
use serde_json::Value;
use std::io::Write;

fn constant_set(n: usize, value: f64) -> EmbeddingSet {
    let vectors = (0..n)
        .map(|i| vec![value + (i % 5) as f64 * 0.1, value - (i % 5) as f64 * 0.1])
        .collect();
    EmbeddingSet::new(vectors).expect("uniform vectors")
}

fn prod_config() -> DriftJobConfig {
    DriftJobConfig {
        environment: "prod".to_string(),
        ..DriftJobConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[test]
fn test_run_detects_drift_and_alerts() {
    let store = InMemoryEmbeddingStore::new(constant_set(50, 0.0), constant_set(20, 100.0));
    let mut job = DriftJob::new(prod_config(), store, MemoryAlertSink::new(), MemoryResultSink::new());

    let outcome = job.run().expect("run");
    assert!(matches!(outcome, DriftOutcome::Completed { drifted: true, .. }));

    assert_eq!(job.results().reports.len(), 1);
    assert_eq!(job.alerts().alerts.len(), 1);

    let (subject, body) = &job.alerts().alerts[0];
    assert_eq!(subject, "[PROD] Data Drift Detected - ML Pipeline");
    assert_eq!(body["alert_type"], Value::from("data_drift_detected"));
    assert_eq!(body["environment"], Value::from("prod"));
    assert!(body["summary"]["mean_shift_magnitude"].as_f64().expect("number") > 0.2);
    assert_eq!(body["recommendations"].as_array().expect("array").len(), 3);
}

#[test]
fn test_run_without_drift_stores_but_does_not_alert() {
    let set = constant_set(50, 1.0);
    let store = InMemoryEmbeddingStore::new(set.clone(), set);
    let mut job = DriftJob::new(prod_config(), store, MemoryAlertSink::new(), MemoryResultSink::new());

    let outcome = job.run().expect("run");
    assert!(matches!(outcome, DriftOutcome::Completed { drifted: false, .. }));
    assert_eq!(job.results().reports.len(), 1);
    assert!(job.alerts().alerts.is_empty());
}

#[test]
fn test_run_skips_on_empty_recent_window() {
    let empty = EmbeddingSet::new(Vec::new()).expect("empty");
    let store = InMemoryEmbeddingStore::new(constant_set(50, 0.0), empty);
    let mut job = DriftJob::new(prod_config(), store, MemoryAlertSink::new(), MemoryResultSink::new());

    let outcome = job.run().expect("run");
    assert!(matches!(outcome, DriftOutcome::Skipped { .. }));
    // Nothing stored, nothing alerted: the run never reached detection.
    assert!(job.results().reports.is_empty());
    assert!(job.alerts().alerts.is_empty());
}

#[test]
fn test_run_error_path_sends_error_alert() {
    // Empty reference with a non-empty recent window is a validation
    // failure, not a skip.
    let empty = EmbeddingSet::new(Vec::new()).expect("empty");
    let store = InMemoryEmbeddingStore::new(empty, constant_set(20, 0.0));
    let mut job = DriftJob::new(prod_config(), store, MemoryAlertSink::new(), MemoryResultSink::new());

    let err = job.run().unwrap_err();
    assert!(matches!(err, DriftJobError::Detection(_)));

    assert_eq!(job.alerts().alerts.len(), 1);
    let (subject, body) = &job.alerts().alerts[0];
    assert_eq!(subject, "[PROD] Data Drift Detection Error - ML Pipeline");
    assert_eq!(body["alert_type"], Value::from("drift_detection_error"));
    assert!(body["error"].as_str().expect("string").contains("reference"));
}

// ---------------------------------------------------------------------------
// Side-effect failures never abort the run
// ---------------------------------------------------------------------------

struct FailingAlertSink;

impl crate::store::AlertSink for FailingAlertSink {
    fn publish(&mut self, _: &str, _: &Value) -> crate::store::StoreResult<()> {
        Err(crate::store::StoreError::NotFound("topic gone".to_string()))
    }
}

struct FailingResultSink;

impl crate::store::ResultSink for FailingResultSink {
    fn store(&mut self, _: &crate::drift::DriftReport) -> crate::store::StoreResult<()> {
        Err(crate::store::StoreError::NotFound("bucket gone".to_string()))
    }
}

#[test]
fn test_alert_failure_does_not_abort_run() {
    let store = InMemoryEmbeddingStore::new(constant_set(50, 0.0), constant_set(20, 100.0));
    let mut job = DriftJob::new(prod_config(), store, FailingAlertSink, MemoryResultSink::new());

    let outcome = job.run().expect("alert failure is a logged side effect");
    assert!(matches!(outcome, DriftOutcome::Completed { drifted: true, .. }));
    assert_eq!(job.results().reports.len(), 1);
}

#[test]
fn test_result_store_failure_does_not_abort_run() {
    let store = InMemoryEmbeddingStore::new(constant_set(50, 0.0), constant_set(20, 100.0));
    let mut job = DriftJob::new(prod_config(), store, MemoryAlertSink::new(), FailingResultSink);

    let outcome = job.run().expect("store failure is a logged side effect");
    assert!(matches!(outcome, DriftOutcome::Completed { drifted: true, .. }));
    // The drift alert itself still went out.
    assert_eq!(job.alerts().alerts.len(), 1);
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_config_defaults() {
    let config = DriftJobConfig::default();
    assert_eq!(config.environment, "dev");
    assert_eq!(config.recent_window_hours, 24);
    assert_eq!(config.thresholds, crate::drift::DriftThresholds::default());
}

#[test]
fn test_config_from_json_file_partial() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(
        file,
        r#"{{"environment": "staging", "thresholds": {{"mean_shift": 0.5}}}}"#
    )
    .expect("write");

    let config = DriftJobConfig::from_json_file(file.path()).expect("load");
    assert_eq!(config.environment, "staging");
    assert_eq!(config.recent_window_hours, 24);
    assert_eq!(config.thresholds.mean_shift, 0.5);
    assert_eq!(config.thresholds.ks_p_value, 0.05);
}

#[test]
fn test_config_from_missing_file() {
    let err = DriftJobConfig::from_json_file("/nonexistent/vigia.json").unwrap_err();
    assert!(matches!(err, crate::store::StoreError::Io(_)));
}
