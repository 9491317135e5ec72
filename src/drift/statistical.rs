//! Statistical helpers for embedding drift detection.

/// Two-sample Kolmogorov-Smirnov test.
///
/// Returns `(statistic, p_value)` where the statistic is the maximum
/// absolute difference between the two empirical CDFs and the p-value
/// comes from the asymptotic Kolmogorov distribution.
///
/// Either sample being empty yields `(0.0, 1.0)` (no evidence of
/// divergence from nothing).
pub fn ks_2samp(sample_a: &[f64], sample_b: &[f64]) -> (f64, f64) {
    if sample_a.is_empty() || sample_b.is_empty() {
        return (0.0, 1.0);
    }

    let mut a = sample_a.to_vec();
    let mut b = sample_b.to_vec();
    a.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
    b.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));

    let n1 = a.len() as f64;
    let n2 = b.len() as f64;

    // Merge walk over both sorted samples, tracking the CDF gap at each
    // observed value. Each step consumes the entire run of the current
    // smallest value from both sides before evaluating the gap, so tied
    // values shared by samples of unequal size do not inflate the
    // statistic.
    let mut d_max = 0.0f64;
    let mut i = 0usize;
    let mut j = 0usize;
    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        let diff = (i as f64 / n1 - j as f64 / n2).abs();
        d_max = d_max.max(diff);
    }

    let n_eff = (n1 * n2) / (n1 + n2);
    let lambda = d_max * n_eff.sqrt();
    (d_max, ks_p_value(lambda))
}

/// Approximate p-value for a KS statistic using the Kolmogorov distribution.
///
/// Asymptotic series: P(D > d) ≈ 2 * sum_{k=1}^∞ (-1)^{k+1} * exp(-2 * k^2 * λ^2)
pub fn ks_p_value(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let mut p = 0.0;
    for k in 1..=100 {
        let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
        let term = sign * (-2.0 * f64::from(k).powi(2) * lambda.powi(2)).exp();
        p += term;
        if term.abs() < 1e-10 {
            break;
        }
    }
    (2.0 * p).clamp(0.0, 1.0)
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 by convention when either vector has zero norm, so that a
/// degenerate centroid reads as maximally dissimilar rather than NaN.
pub fn cosine_similarity(u: &[f64], v: &[f64]) -> f64 {
    let dot: f64 = u.iter().zip(v.iter()).map(|(x, y)| x * y).sum();
    let norm_u = u.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_v = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_u == 0.0 || norm_v == 0.0 {
        return 0.0;
    }
    dot / (norm_u * norm_v)
}

/// Euclidean distance between two equal-length vectors.
pub(crate) fn euclidean_distance(u: &[f64], v: &[f64]) -> f64 {
    u.iter()
        .zip(v.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Population standard deviation (biased, divisor n).
pub(crate) fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}
