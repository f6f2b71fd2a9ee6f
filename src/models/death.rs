//! Standardized death record model
//!
//! One row per death certificate whose underlying cause lies in the
//! diagnosis set, produced by the mortality table builder.

use arrow::datatypes::{DataType, Field, Schema};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::table::Table;
use crate::models::traits::ArrowSchema;
use crate::models::types::{AgeGroup, Sex};

/// A death certificate after field normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathRecord {
    /// Six-digit municipality of residence
    pub municipality: Option<String>,
    /// Registry year the record was published under
    pub year: i32,
    /// Standardized sex
    pub sex: Sex,
    /// Age in years; fractional for infant deaths
    pub age_years: Option<f64>,
    /// Education level code as coded by the registry
    pub education: Option<String>,
    /// Date of death
    pub death_date: Option<NaiveDate>,
    /// Three-character underlying cause of death
    pub diagnosis: String,
    /// Age bucket derived from `age_years`
    pub age_group: AgeGroup,
}

/// Standardized death table
pub type DeathTable = Table<DeathRecord>;

impl ArrowSchema for DeathRecord {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("municipality", DataType::Utf8, true),
            Field::new("year", DataType::Int32, false),
            Field::new("sex", DataType::Utf8, false),
            Field::new("age_years", DataType::Float64, true),
            Field::new("education", DataType::Utf8, true),
            Field::new("death_date", DataType::Date32, true),
            Field::new("diagnosis", DataType::Utf8, false),
            Field::new("age_group", DataType::Utf8, false),
        ])
    }
}
