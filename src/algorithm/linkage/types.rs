//! Type definitions for the record linkage algorithm
//!
//! This module contains the types passed between blocking, comparison,
//! classification and result assembly.

use std::fmt;

use arrow::datatypes::{DataType, Field, Schema};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::table::Table;
use crate::models::traits::ArrowSchema;
use crate::models::types::Sex;

/// Composite blocking key: municipality, year-month of the record date, sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockKey<'a> {
    /// Six-digit municipality code
    pub municipality: &'a str,
    /// Calendar year of the record date
    pub year: i32,
    /// Calendar month of the record date (1-12)
    pub month: u32,
    /// Standardized sex
    pub sex: Sex,
}

/// A death record and a discharge record sharing a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidatePair {
    /// Row index in the death table
    pub death_idx: usize,
    /// Row index in the discharge table
    pub discharge_idx: usize,
}

impl CandidatePair {
    /// Create a new candidate pair
    #[must_use]
    pub const fn new(death_idx: usize, discharge_idx: usize) -> Self {
        Self {
            death_idx,
            discharge_idx,
        }
    }
}

/// Similarity scores of one candidate pair
///
/// A component is `None` when one of its inputs is missing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComparisonVector {
    /// 1.0 when the three-character diagnoses are equal, else 0.0
    pub diagnosis: Option<f64>,
    /// Gaussian similarity of the rounded ages
    pub age: Option<f64>,
    /// Gaussian similarity of the dates
    pub date: Option<f64>,
}

impl ComparisonVector {
    /// Number of comparison fields
    pub const LEN: usize = 3;

    /// Field names in component order
    pub const FIELDS: [&'static str; Self::LEN] = ["diagnosis", "age", "date"];

    /// Components in [`ComparisonVector::FIELDS`] order
    #[must_use]
    pub const fn components(&self) -> [Option<f64>; Self::LEN] {
        [self.diagnosis, self.age, self.date]
    }

    /// Sum of the present components
    #[must_use]
    pub fn aggregate(&self) -> f64 {
        self.components().into_iter().flatten().sum()
    }

    /// Binary agreement per field; missing components disagree
    #[must_use]
    pub fn agreement(&self, threshold: f64) -> [bool; Self::LEN] {
        self.components().map(|c| c.is_some_and(|score| score >= threshold))
    }
}

/// One scored candidate pair joined with both source records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkageRow {
    pub death_idx: usize,
    pub discharge_idx: usize,
    pub is_match: bool,
    /// Sum of the present comparison scores
    pub score: f64,
    pub diagnosis_score: Option<f64>,
    pub age_score: Option<f64>,
    pub date_score: Option<f64>,
    pub death_municipality: Option<String>,
    pub death_year: i32,
    pub death_sex: Sex,
    pub death_age_years: Option<f64>,
    pub death_date: Option<NaiveDate>,
    pub death_diagnosis: String,
    pub discharge_municipality: Option<String>,
    pub discharge_year: i32,
    pub discharge_sex: Sex,
    pub discharge_age_years: Option<f64>,
    pub discharge_date: Option<NaiveDate>,
    pub discharge_diagnosis: String,
}

impl LinkageRow {
    /// The pair this row scores
    #[must_use]
    pub const fn pair(&self) -> CandidatePair {
        CandidatePair::new(self.death_idx, self.discharge_idx)
    }
}

impl ArrowSchema for LinkageRow {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("death_idx", DataType::UInt64, false),
            Field::new("discharge_idx", DataType::UInt64, false),
            Field::new("is_match", DataType::Boolean, false),
            Field::new("score", DataType::Float64, false),
            Field::new("diagnosis_score", DataType::Float64, true),
            Field::new("age_score", DataType::Float64, true),
            Field::new("date_score", DataType::Float64, true),
            Field::new("death_municipality", DataType::Utf8, true),
            Field::new("death_year", DataType::Int32, false),
            Field::new("death_sex", DataType::Utf8, false),
            Field::new("death_age_years", DataType::Float64, true),
            Field::new("death_date", DataType::Date32, true),
            Field::new("death_diagnosis", DataType::Utf8, false),
            Field::new("discharge_municipality", DataType::Utf8, true),
            Field::new("discharge_year", DataType::Int32, false),
            Field::new("discharge_sex", DataType::Utf8, false),
            Field::new("discharge_age_years", DataType::Float64, true),
            Field::new("discharge_date", DataType::Date32, true),
            Field::new("discharge_diagnosis", DataType::Utf8, false),
        ])
    }
}

/// Linkage result table, sorted by score descending
pub type LinkageTable = Table<LinkageRow>;

/// How the match decisions of a linkage run were made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassificationMethod {
    /// The configured classifier produced the decisions
    Classifier(&'static str),
    /// The classifier failed and the score threshold was applied
    ThresholdFallback,
    /// There were no candidate pairs to classify
    NotRun,
}

impl fmt::Display for ClassificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classifier(name) => f.write_str(name),
            Self::ThresholdFallback => f.write_str("threshold_fallback"),
            Self::NotRun => f.write_str("not_run"),
        }
    }
}

/// Result of a linkage run
#[derive(Debug, Clone, PartialEq)]
pub struct LinkageResult {
    /// Scored pairs joined with both records
    pub table: LinkageTable,
    /// How matches were decided
    pub method: ClassificationMethod,
}

impl LinkageResult {
    /// A result with no candidate pairs
    #[must_use]
    pub fn empty() -> Self {
        Self {
            table: LinkageTable::empty(),
            method: ClassificationMethod::NotRun,
        }
    }
}

/// Summary statistics of a linkage result
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinkageMetrics {
    /// Number of candidate pairs
    pub total_pairs: usize,
    /// Number of pairs classified as matches
    pub matched_pairs: usize,
    /// `matched_pairs / total_pairs`, 0.0 when there are no pairs
    pub match_rate: f64,
    /// Mean aggregate score over all pairs, 0.0 when there are no pairs
    pub avg_score: f64,
}
