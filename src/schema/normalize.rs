//! Per-field normalization shared by the registry table builders.
//!
//! Every function here is pure and total: unparseable input becomes `None`
//! (or `Unknown`) instead of an error, so one bad field never aborts a record.

use chrono::NaiveDate;

use crate::config::DiagnosisSet;
use crate::models::types::{AgeGroup, RegistrySchema, Sex};

/// Width of a canonical municipality code (IBGE code without check digit)
pub const MUNICIPALITY_CODE_WIDTH: usize = 6;

/// Days per year used when deriving age from two dates
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Normalize a municipality code to six digits
///
/// Takes the first run of digits, left-pads it with zeros to six characters
/// and truncates to six. Input without digits yields `None`.
#[must_use]
pub fn canonicalize_municipality(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return None;
    }
    let padded = format!("{digits:0>width$}", width = MUNICIPALITY_CODE_WIDTH);
    Some(padded[..MUNICIPALITY_CODE_WIDTH].to_string())
}

/// Parse a compact date in `YYYYMMDD` or, failing that, `DDMMYYYY` form
///
/// Non-digit characters are stripped first, so `2022-03-15` and `15/03/2022`
/// both parse.
#[must_use]
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let digits: String = raw?.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(&digits, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(&digits, "%d%m%Y"))
        .ok()
}

/// Map a registry sex code to [`Sex`]
///
/// Numeric codes may arrive as `"1"`, `"1.0"` or with padding.
#[must_use]
pub fn standardize_sex(raw: Option<&str>, schema: RegistrySchema) -> Sex {
    let Some(code) = raw.and_then(|s| s.trim().parse::<f64>().ok()) else {
        return Sex::Unknown;
    };
    if code.fract() != 0.0 {
        return Sex::Unknown;
    }
    // Both registries code male as 1
    match code as i64 {
        1 => Sex::Male,
        c if c == schema.female_code() => Sex::Female,
        _ => Sex::Unknown,
    }
}

/// First three characters of a diagnosis code, uppercased
#[must_use]
pub fn extract_diagnosis3(raw: &str) -> String {
    raw.to_uppercase().chars().take(3).collect()
}

/// Whether a code lies in the pneumonia range J12-J18
///
/// Any trailing characters after the range prefix are accepted, so `J18X1`
/// is in the set while `J11` and the empty string are not.
#[must_use]
pub fn is_in_diagnosis_set(raw: Option<&str>) -> bool {
    raw.is_some_and(|code| DiagnosisSet::pneumonia().contains(code))
}

/// Assign an age in years to its profile bucket
#[must_use]
pub fn bucket_age(age_years: Option<f64>) -> AgeGroup {
    let Some(age) = age_years.filter(|a| a.is_finite() && *a >= 0.0) else {
        return AgeGroup::Unknown;
    };
    AgeGroup::ALL
        .into_iter()
        .find(|group| group.contains(age))
        .unwrap_or(AgeGroup::Unknown)
}

/// Age in years between birth and a reference date
#[must_use]
pub fn age_between(birth: NaiveDate, reference: NaiveDate) -> f64 {
    (reference - birth).num_days() as f64 / DAYS_PER_YEAR
}

/// Normalize a categorical code
///
/// Codes read from float columns (`"3.0"`) collapse to their integer form so
/// they group with the same code read from text or integer columns.
#[must_use]
pub fn normalize_code(raw: Option<&str>) -> Option<String> {
    let code = raw.map(str::trim).filter(|s| !s.is_empty())?;
    let integral = parse_number(Some(code)).filter(|v| code.contains('.') && v.fract() == 0.0);
    Some(integral.map_or_else(|| code.to_string(), |value| format!("{value:.0}")))
}

/// Parse a numeric field, rejecting non-finite values
#[must_use]
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
