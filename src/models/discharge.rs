//! Standardized hospital discharge model
//!
//! One row per hospitalization that ended in an in-hospital death with a
//! principal diagnosis in the diagnosis set.

use arrow::datatypes::{DataType, Field, Schema};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::table::Table;
use crate::models::traits::ArrowSchema;
use crate::models::types::Sex;

/// A discharge-by-death episode after field normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DischargeRecord {
    /// Six-digit municipality of residence
    pub municipality: Option<String>,
    /// Registry year the record was published under
    pub year: i32,
    /// Standardized sex
    pub sex: Sex,
    /// Age in years at discharge
    pub age_years: Option<f64>,
    /// Discharge (death) date
    pub discharge_date: Option<NaiveDate>,
    /// Three-character principal diagnosis
    pub diagnosis: String,
}

/// Standardized discharge table
pub type DischargeTable = Table<DischargeRecord>;

impl ArrowSchema for DischargeRecord {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("municipality", DataType::Utf8, true),
            Field::new("year", DataType::Int32, false),
            Field::new("sex", DataType::Utf8, false),
            Field::new("age_years", DataType::Float64, true),
            Field::new("discharge_date", DataType::Date32, true),
            Field::new("diagnosis", DataType::Utf8, false),
        ])
    }
}
