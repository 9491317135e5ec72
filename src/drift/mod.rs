//! Embedding Drift Detection
//!
//! Quantifies distributional divergence between a reference (training-time)
//! embedding population and a recent (production) window:
//!
//! - Per-dimension two-sample Kolmogorov-Smirnov tests (min and mean p-value)
//! - Cosine similarity between the two centroids
//! - Euclidean centroid-shift magnitude
//! - Spread ratio (recent std over reference std, averaged across dimensions)
//!
//! Any single trigger exceeding its threshold flags drift; the heuristics
//! are deliberately independent rather than combined into a weighted score.
//!
//! # Example
//!
//! ```
//! use vigia::drift::{DriftDetector, DriftThresholds, EmbeddingSet};
//!
//! # fn main() -> Result<(), vigia::drift::DriftError> {
//! let reference = EmbeddingSet::new(vec![vec![0.0, 1.0]; 50])?;
//! let recent = EmbeddingSet::new(vec![vec![5.0, 9.0]; 20])?;
//!
//! let detector = DriftDetector::new(DriftThresholds::default());
//! let report = detector.detect(&reference, &recent)?;
//! assert!(detector.is_drifted(&report));
//! # Ok(())
//! # }
//! ```

mod statistical;


pub use statistical::{cosine_similarity, ks_2samp, ks_p_value};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Guard added to the reference std in the spread-ratio denominator.
const STD_RATIO_EPSILON: f64 = 1e-8;

/// Errors from drift detection.
#[derive(Debug, Error)]
pub enum DriftError {
    /// One of the input populations has no samples.
    #[error("empty {which} embedding set")]
    EmptyEmbeddings { which: &'static str },

    /// Vectors within a single set disagree on dimensionality.
    #[error("ragged embedding set: vector {index} has {found} dimensions, expected {expected}")]
    RaggedDimensions { index: usize, found: usize, expected: usize },

    /// Vectors carry no dimensions at all.
    #[error("embedding vectors have zero dimensions")]
    NoDimensions,
}

/// Result alias for drift operations.
pub type Result<T> = std::result::Result<T, DriftError>;

/// An ordered collection of fixed-dimension embedding vectors.
///
/// All vectors in a set share one dimensionality; construction validates
/// this. An empty set is representable (a production window may contain no
/// traffic) but [`DriftDetector::detect`] rejects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSet {
    vectors: Vec<Vec<f64>>,
}

impl EmbeddingSet {
    /// Build a set from raw vectors, validating uniform dimensionality.
    pub fn new(vectors: Vec<Vec<f64>>) -> Result<Self> {
        if let Some(first) = vectors.first() {
            let expected = first.len();
            for (index, v) in vectors.iter().enumerate() {
                if v.len() != expected {
                    return Err(DriftError::RaggedDimensions {
                        index,
                        found: v.len(),
                        expected,
                    });
                }
            }
        }
        Ok(Self { vectors })
    }

    /// Number of samples in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// True if the set holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Dimensionality of the vectors (0 for an empty set).
    #[must_use]
    pub fn dim(&self) -> usize {
        self.vectors.first().map_or(0, Vec::len)
    }

    /// The underlying vectors.
    #[must_use]
    pub fn vectors(&self) -> &[Vec<f64>] {
        &self.vectors
    }

    /// Marginal values of dimension `d` across all samples.
    fn column(&self, d: usize) -> Vec<f64> {
        self.vectors.iter().map(|v| v[d]).collect()
    }

    /// Per-dimension mean over the first `dims` dimensions.
    fn centroid(&self, dims: usize) -> Vec<f64> {
        let n = self.vectors.len() as f64;
        (0..dims)
            .map(|d| self.vectors.iter().map(|v| v[d]).sum::<f64>() / n)
            .collect()
    }
}

/// Alert thresholds for the three drift triggers.
///
/// Externally configurable; the defaults match the values the drift job
/// shipped with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftThresholds {
    /// Minimum per-dimension KS p-value below which drift fires.
    pub ks_p_value: f64,
    /// Centroid similarity change (1 - cosine) above which drift fires.
    pub cosine: f64,
    /// Euclidean centroid-shift magnitude above which drift fires.
    pub mean_shift: f64,
}

impl Default for DriftThresholds {
    fn default() -> Self {
        Self {
            ks_p_value: 0.05,
            cosine: 0.1,
            mean_shift: 0.2,
        }
    }
}

/// Immutable record of one drift detection run.
///
/// Created fresh per invocation and never mutated afterwards; persistence
/// is the job of a [`ResultSink`](crate::store::ResultSink) collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    /// When the detection ran.
    pub timestamp: DateTime<Utc>,
    /// Sample count of the reference set.
    pub reference_samples: usize,
    /// Sample count of the recent set.
    pub recent_samples: usize,
    /// Per-dimension KS p-values, indexed by dimension.
    pub ks_p_values: Vec<f64>,
    /// Minimum KS p-value: the single most divergent dimension.
    pub ks_min_p_value: f64,
    /// Mean KS p-value: smooths noise across dimensions.
    pub ks_mean_p_value: f64,
    /// Cosine similarity of the two centroids, in [-1, 1].
    /// 0 by convention when either centroid has zero norm.
    pub cosine_similarity: f64,
    /// 1 - cosine similarity.
    pub similarity_change: f64,
    /// Euclidean norm of the centroid difference.
    pub mean_shift_magnitude: f64,
    /// Mean over dimensions of std(recent) / (std(reference) + 1e-8).
    pub std_ratio: f64,
}

/// Stateless detector comparing two embedding populations.
#[derive(Debug, Clone, Default)]
pub struct DriftDetector {
    thresholds: DriftThresholds,
}

impl DriftDetector {
    /// Create a detector with the given alert thresholds.
    #[must_use]
    pub fn new(thresholds: DriftThresholds) -> Self {
        Self { thresholds }
    }

    /// The configured thresholds.
    #[must_use]
    pub fn thresholds(&self) -> &DriftThresholds {
        &self.thresholds
    }

    /// Compare the two populations and produce a [`DriftReport`].
    ///
    /// Fails if either set is empty. On a dimensionality mismatch between
    /// the sets, only the first `min(dim_ref, dim_recent)` dimensions are
    /// compared — an inherited policy that silently drops signal from the
    /// wider set; a warning is logged (degraded mode, not a failure).
    pub fn detect(&self, reference: &EmbeddingSet, recent: &EmbeddingSet) -> Result<DriftReport> {
        if reference.is_empty() {
            return Err(DriftError::EmptyEmbeddings { which: "reference" });
        }
        if recent.is_empty() {
            return Err(DriftError::EmptyEmbeddings { which: "recent" });
        }

        let min_dim = reference.dim().min(recent.dim());
        if min_dim == 0 {
            return Err(DriftError::NoDimensions);
        }
        if reference.dim() != recent.dim() {
            warn!(
                reference_dim = reference.dim(),
                recent_dim = recent.dim(),
                compared = min_dim,
                "embedding dimensionality mismatch, comparing overlapping dimensions only"
            );
        }

        let mut ks_p_values = Vec::with_capacity(min_dim);
        let mut std_ratio_sum = 0.0;
        for d in 0..min_dim {
            let ref_col = reference.column(d);
            let recent_col = recent.column(d);

            let (_statistic, p_value) = ks_2samp(&ref_col, &recent_col);
            ks_p_values.push(p_value);

            std_ratio_sum += statistical::population_std(&recent_col)
                / (statistical::population_std(&ref_col) + STD_RATIO_EPSILON);
        }

        let ks_min_p_value = ks_p_values.iter().copied().fold(f64::INFINITY, f64::min);
        let ks_mean_p_value = ks_p_values.iter().sum::<f64>() / ks_p_values.len() as f64;

        let reference_centroid = reference.centroid(min_dim);
        let recent_centroid = recent.centroid(min_dim);
        let cosine = cosine_similarity(&reference_centroid, &recent_centroid);
        let mean_shift_magnitude =
            statistical::euclidean_distance(&reference_centroid, &recent_centroid);

        Ok(DriftReport {
            timestamp: Utc::now(),
            reference_samples: reference.len(),
            recent_samples: recent.len(),
            ks_min_p_value,
            ks_mean_p_value,
            ks_p_values,
            cosine_similarity: cosine,
            similarity_change: 1.0 - cosine,
            mean_shift_magnitude,
            std_ratio: std_ratio_sum / min_dim as f64,
        })
    }

    /// Decide whether a report crosses the drift thresholds.
    ///
    /// Logical OR across three independent heuristics: any single trigger
    /// fires the alert.
    #[must_use]
    pub fn is_drifted(&self, report: &DriftReport) -> bool {
        report.ks_min_p_value < self.thresholds.ks_p_value
            || report.similarity_change > self.thresholds.cosine
            || report.mean_shift_magnitude > self.thresholds.mean_shift
    }
}
