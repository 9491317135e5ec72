//! End-to-end drift job run over JSON file storage.

use std::fs;

use chrono::Utc;
use vigia::job::{DriftJob, DriftJobConfig, DriftOutcome};
use vigia::store::{JsonFileEmbeddingStore, JsonFileResultSink, MemoryAlertSink};

#[test]
fn drift_job_over_json_files() {
    let data_dir = tempfile::tempdir().expect("tempdir");
    let results_dir = tempfile::tempdir().expect("tempdir");

    // Reference population clustered near the origin.
    let reference: Vec<Vec<f64>> = (0..40).map(|i| vec![(i % 7) as f64 * 0.1, 0.5]).collect();
    fs::write(
        data_dir.path().join("training_embeddings.json"),
        serde_json::to_string(&serde_json::json!({ "embeddings": reference })).expect("json"),
    )
    .expect("write reference");

    // Today's production captures, far from the reference.
    let capture_dir = data_dir
        .path()
        .join("production_embeddings")
        .join(Utc::now().date_naive().format("%Y/%m/%d").to_string());
    fs::create_dir_all(&capture_dir).expect("mkdir");
    let recent: Vec<Vec<f64>> = (0..15).map(|i| vec![50.0 + (i % 7) as f64 * 0.1, 40.0]).collect();
    fs::write(
        capture_dir.join("capture.json"),
        serde_json::to_string(&serde_json::json!({ "embeddings": recent })).expect("json"),
    )
    .expect("write recent");

    let config = DriftJobConfig {
        environment: "prod".to_string(),
        ..DriftJobConfig::default()
    };
    let mut job = DriftJob::new(
        config,
        JsonFileEmbeddingStore::new(data_dir.path()),
        MemoryAlertSink::new(),
        JsonFileResultSink::new(results_dir.path()),
    );

    let (report, drifted) = match job.run().expect("run") {
        DriftOutcome::Completed { report, drifted } => (report, drifted),
        other => panic!("expected a completed run, got {other:?}"),
    };
    assert!(drifted);
    assert_eq!(report.reference_samples, 40);
    assert_eq!(report.recent_samples, 15);

    // Alert went out with the production subject line.
    assert_eq!(job.alerts().alerts.len(), 1);
    assert_eq!(job.alerts().alerts[0].0, "[PROD] Data Drift Detected - ML Pipeline");

    // Report landed at its timestamp-derived path.
    let report_path = results_dir.path().join(format!(
        "drift_results/{}/{}_drift_results.json",
        report.timestamp.format("%Y/%m/%d"),
        report.timestamp.format("%H%M%S"),
    ));
    assert!(report_path.is_file());
}
