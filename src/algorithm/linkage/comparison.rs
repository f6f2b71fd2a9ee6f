//! Field comparison for candidate pairs

use chrono::NaiveDate;

use crate::algorithm::linkage::types::{CandidatePair, ComparisonVector};
use crate::config::LinkageConfig;
use crate::models::death::{DeathRecord, DeathTable};
use crate::models::discharge::{DischargeRecord, DischargeTable};

/// Gaussian similarity `exp(-d² / (2·scale²))` of a difference `d`
///
/// 1.0 at zero difference, strictly decreasing in `|d|` and symmetric.
#[must_use]
pub fn gaussian_similarity(difference: f64, scale: f64) -> f64 {
    (-(difference * difference) / (2.0 * scale * scale)).exp()
}

/// 1.0 when both three-character diagnoses are byte-equal, else 0.0
#[must_use]
pub fn diagnosis_score(a: &str, b: &str) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    Some(if a.as_bytes() == b.as_bytes() { 1.0 } else { 0.0 })
}

/// Similarity of two ages after rounding each to whole years (ties to even)
#[must_use]
pub fn age_score(a: Option<f64>, b: Option<f64>, scale: f64) -> Option<f64> {
    let (a, b) = (a?.round_ties_even(), b?.round_ties_even());
    Some(gaussian_similarity(a - b, scale))
}

/// Similarity of two dates, compared as whole days since the Unix epoch
#[must_use]
pub fn date_score(a: Option<NaiveDate>, b: Option<NaiveDate>, scale: f64) -> Option<f64> {
    let days = (a? - b?).num_days();
    Some(gaussian_similarity(days as f64, scale))
}

/// Compare one death record with one discharge record
#[must_use]
pub fn compare_records(
    death: &DeathRecord,
    discharge: &DischargeRecord,
    config: &LinkageConfig,
) -> ComparisonVector {
    ComparisonVector {
        diagnosis: diagnosis_score(&death.diagnosis, &discharge.diagnosis),
        age: age_score(death.age_years, discharge.age_years, config.age_scale),
        date: date_score(death.death_date, discharge.discharge_date, config.date_scale),
    }
}

/// Compare the records of a candidate pair
#[must_use]
pub fn compare_pair(
    pair: CandidatePair,
    deaths: &DeathTable,
    discharges: &DischargeTable,
    config: &LinkageConfig,
) -> ComparisonVector {
    compare_records(&deaths[pair.death_idx], &discharges[pair.discharge_idx], config)
}
