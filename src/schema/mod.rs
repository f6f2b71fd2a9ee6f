//! Field-level schema handling for the raw registry batches.
//!
//! [`normalize`] holds the pure per-field transforms; [`columns`] knows which
//! raw column names each registry vintage uses for a field.

pub mod columns;
pub mod normalize;

pub use normalize::{
    bucket_age, canonicalize_municipality, extract_diagnosis3, is_in_diagnosis_set,
    normalize_code, parse_date, standardize_sex,
};
