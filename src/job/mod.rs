//! Drift Detection Job
//!
//! Orchestrates one scheduled drift check: load the reference and recent
//! embedding populations, run detection, alert when drift is flagged, and
//! persist the report for historical tracking.
//!
//! Side effects are strictly subordinate to the primary computation: a
//! failed alert publish or report store is logged and never aborts a run
//! that already produced a valid report. Detection-path failures propagate
//! to the caller after a best-effort error alert.

#[cfg(test)]
mod tests;

use std::fs;
use std::path::Path;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::drift::{DriftDetector, DriftError, DriftReport, DriftThresholds};
use crate::store::{AlertSink, EmbeddingStore, ResultSink, StoreError, StoreResult};

/// Configuration for the drift job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftJobConfig {
    /// Environment label used in alert subjects (e.g. "dev", "prod").
    pub environment: String,
    /// How far back the recent window reaches.
    pub recent_window_hours: i64,
    /// Drift alert thresholds.
    pub thresholds: DriftThresholds,
}

impl Default for DriftJobConfig {
    fn default() -> Self {
        Self {
            environment: "dev".to_string(),
            recent_window_hours: 24,
            thresholds: DriftThresholds::default(),
        }
    }
}

impl DriftJobConfig {
    /// Load configuration from a JSON file. Missing fields fall back to
    /// the defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Outcome of one drift job run.
#[derive(Debug, Clone, PartialEq)]
pub enum DriftOutcome {
    /// Detection ran to completion.
    Completed {
        /// The produced report.
        report: DriftReport,
        /// Whether any threshold fired.
        drifted: bool,
    },
    /// Detection was skipped — an expected condition, not a failure.
    Skipped {
        /// Why the run was skipped.
        reason: String,
    },
}

/// Errors aborting a drift job run.
#[derive(Debug, Error)]
pub enum DriftJobError {
    /// The detector rejected its input.
    #[error(transparent)]
    Detection(#[from] DriftError),

    /// Loading embeddings failed.
    #[error("embedding store error: {0}")]
    Store(#[from] StoreError),
}

/// A single scheduled drift check over injected collaborators.
#[derive(Debug)]
pub struct DriftJob<E, A, R>
where
    E: EmbeddingStore,
    A: AlertSink,
    R: ResultSink,
{
    config: DriftJobConfig,
    detector: DriftDetector,
    embeddings: E,
    alerts: A,
    results: R,
}

impl<E, A, R> DriftJob<E, A, R>
where
    E: EmbeddingStore,
    A: AlertSink,
    R: ResultSink,
{
    /// Assemble a job from configuration and collaborators.
    pub fn new(config: DriftJobConfig, embeddings: E, alerts: A, results: R) -> Self {
        let detector = DriftDetector::new(config.thresholds);
        Self {
            config,
            detector,
            embeddings,
            alerts,
            results,
        }
    }

    /// The report sink, for inspecting stored reports.
    #[must_use]
    pub fn results(&self) -> &R {
        &self.results
    }

    /// The alert sink, for inspecting published alerts.
    #[must_use]
    pub fn alerts(&self) -> &A {
        &self.alerts
    }

    /// Run one drift check.
    ///
    /// On a detection-path failure, a best-effort error alert is published
    /// before the error is returned.
    pub fn run(&mut self) -> Result<DriftOutcome, DriftJobError> {
        info!(environment = %self.config.environment, "starting data drift detection");
        match self.detect_and_report() {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(error = %e, "data drift detection failed");
                self.send_error_alert(&e);
                Err(e)
            }
        }
    }

    fn detect_and_report(&mut self) -> Result<DriftOutcome, DriftJobError> {
        let reference = self.embeddings.load_reference()?;
        info!(samples = reference.len(), "loaded reference embeddings");

        let window = Duration::hours(self.config.recent_window_hours);
        let recent = self.embeddings.load_recent(window)?;
        info!(samples = recent.len(), "loaded recent embeddings");

        if recent.is_empty() {
            warn!("no recent embeddings found, skipping drift detection");
            return Ok(DriftOutcome::Skipped {
                reason: "no recent embeddings found".to_string(),
            });
        }

        let report = self.detector.detect(&reference, &recent)?;
        let drifted = self.detector.is_drifted(&report);

        if drifted {
            self.send_drift_alert(&report);
        }

        if let Err(e) = self.results.store(&report) {
            error!(error = %e, "failed to store drift report");
        }

        info!(drifted, "data drift detection completed");
        Ok(DriftOutcome::Completed { report, drifted })
    }

    fn send_drift_alert(&mut self, report: &DriftReport) {
        let subject = format!(
            "[{}] Data Drift Detected - ML Pipeline",
            self.config.environment.to_uppercase()
        );
        let body = json!({
            "alert_type": "data_drift_detected",
            "environment": self.config.environment,
            "timestamp": report.timestamp.to_rfc3339(),
            "summary": {
                "ks_test_p_value": report.ks_min_p_value,
                "cosine_similarity_change": report.similarity_change,
                "mean_shift_magnitude": report.mean_shift_magnitude,
            },
            "recommendations": [
                "Review recent input data for anomalies",
                "Consider retraining the model if drift persists",
                "Check data preprocessing pipeline for changes",
            ],
        });
        if let Err(e) = self.alerts.publish(&subject, &body) {
            error!(error = %e, "failed to publish drift alert");
        }
    }

    fn send_error_alert(&mut self, err: &DriftJobError) {
        let subject = format!(
            "[{}] Data Drift Detection Error - ML Pipeline",
            self.config.environment.to_uppercase()
        );
        let body = json!({
            "alert_type": "drift_detection_error",
            "environment": self.config.environment,
            "timestamp": Utc::now().to_rfc3339(),
            "error": err.to_string(),
        });
        if let Err(e) = self.alerts.publish(&subject, &body) {
            error!(error = %e, "failed to publish error alert");
        }
    }
}
