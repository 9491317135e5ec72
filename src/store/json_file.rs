//! JSON file-backed embedding store and result sink.
//!
//! Mirrors the blob-store layout the drift job reads and writes:
//!
//! - `{root}/training_embeddings.json` — the reference set
//! - `{root}/production_embeddings/YYYY/MM/DD/*.json` — recent captures
//! - `{root}/drift_results/YYYY/MM/DD/HHMMSS_drift_results.json` — reports

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::info;

use super::error::{StoreError, StoreResult};
use super::traits::{EmbeddingStore, ResultSink};
use crate::drift::{DriftReport, EmbeddingSet};

const REFERENCE_FILE: &str = "training_embeddings.json";
const RECENT_DIR: &str = "production_embeddings";
const RESULTS_DIR: &str = "drift_results";

/// Wire shape of one embedding document.
#[derive(Debug, Deserialize)]
struct EmbeddingDocument {
    embeddings: Vec<Vec<f64>>,
}

fn read_document(path: &Path) -> StoreResult<Vec<Vec<f64>>> {
    let json = fs::read_to_string(path)?;
    let doc: EmbeddingDocument = serde_json::from_str(&json)?;
    Ok(doc.embeddings)
}

/// Embedding store reading JSON documents from a directory tree.
#[derive(Debug)]
pub struct JsonFileEmbeddingStore {
    root: PathBuf,
}

impl JsonFileEmbeddingStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl EmbeddingStore for JsonFileEmbeddingStore {
    fn load_reference(&self) -> StoreResult<EmbeddingSet> {
        let path = self.root.join(REFERENCE_FILE);
        if !path.exists() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        let vectors = read_document(&path)?;
        EmbeddingSet::new(vectors).map_err(|e| StoreError::Malformed(e.to_string()))
    }

    fn load_recent(&self, window: Duration) -> StoreResult<EmbeddingSet> {
        let end = Utc::now();
        let start = end - window;

        let mut vectors = Vec::new();
        let mut day = start.date_naive();
        let last = end.date_naive();
        while day <= last {
            let dir = self
                .root
                .join(RECENT_DIR)
                .join(day.format("%Y/%m/%d").to_string());
            if dir.is_dir() {
                for entry in fs::read_dir(&dir)? {
                    let path = entry?.path();
                    if path.extension().and_then(|e| e.to_str()) == Some("json") {
                        vectors.extend(read_document(&path)?);
                    }
                }
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        EmbeddingSet::new(vectors).map_err(|e| StoreError::Malformed(e.to_string()))
    }
}

/// Result sink writing each report to a timestamp-derived JSON path.
#[derive(Debug)]
pub struct JsonFileResultSink {
    root: PathBuf,
}

impl JsonFileResultSink {
    /// Create a sink rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ResultSink for JsonFileResultSink {
    fn store(&mut self, report: &DriftReport) -> StoreResult<()> {
        let rel = format!(
            "{RESULTS_DIR}/{}/{}_drift_results.json",
            report.timestamp.format("%Y/%m/%d"),
            report.timestamp.format("%H%M%S"),
        );
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json)?;
        info!(path = %path.display(), "drift report stored");
        Ok(())
    }
}
