//! Linkage summary statistics

use crate::algorithm::linkage::types::{LinkageMetrics, LinkageTable};

/// Compute pair counts, match rate and mean score of a linkage result
///
/// An empty result gives zero counts and 0.0 rates.
#[must_use]
pub fn compute_linkage_metrics(result: &LinkageTable) -> LinkageMetrics {
    let total_pairs = result.len();
    if total_pairs == 0 {
        return LinkageMetrics::default();
    }

    let matched_pairs = result.iter().filter(|row| row.is_match).count();
    let score_sum: f64 = result.iter().map(|row| row.score).sum();

    LinkageMetrics {
        total_pairs,
        matched_pairs,
        match_rate: matched_pairs as f64 / total_pairs as f64,
        avg_score: score_sum / total_pairs as f64,
    }
}
