//! Hospital discharge registry
//!
//! Keeps general hospitalizations that ended in an in-hospital death with a
//! principal diagnosis in the diagnosis set, and projects them onto
//! [`DischargeRecord`].

use arrow::array::StringArray;
use arrow::record_batch::RecordBatch;

use crate::config::DiagnosisSet;
use crate::models::discharge::DischargeRecord;
use crate::models::types::RegistrySchema;
use crate::registry::{BuildOutcome, RegisterLoader, optional_column, required_column};
use crate::schema::columns::discharge;
use crate::schema::normalize::{
    age_between, canonicalize_municipality, extract_diagnosis3, parse_date, parse_number,
    standardize_sex,
};
use crate::utils::arrow::{optional_value, string_value};

/// Authorization type of a general hospitalization
const GENERAL_IDENT: &str = "1";

fn is_death_outcome(outcome: &StringArray, row: usize) -> bool {
    parse_number(string_value(outcome, row)).is_some_and(|code| code == 1.0)
}

fn is_general_admission(ident: Option<&StringArray>, row: usize) -> bool {
    ident.is_none_or(|ident| string_value(ident, row) == Some(GENERAL_IDENT))
}

/// Build standardized discharge rows from one raw discharge batch
///
/// The outcome and diagnosis columns are required. Without the outcome flag
/// no row can be shown to be a death, so the batch yields an empty outcome.
/// Age is derived from the birth and discharge dates when both parse and
/// falls back to the reported age otherwise.
#[must_use]
pub fn build_discharge_table(
    batch: &RecordBatch,
    year: i32,
    diagnoses: &DiagnosisSet,
) -> BuildOutcome<DischargeRecord> {
    let outcome = match required_column(batch, &discharge::OUTCOME) {
        Ok(outcome) => outcome,
        Err(reason) => return BuildOutcome::empty(reason),
    };
    let diagnosis = match required_column(batch, &discharge::DIAGNOSIS) {
        Ok(diagnosis) => diagnosis,
        Err(reason) => return BuildOutcome::empty(reason),
    };

    let ident = optional_column(batch, &discharge::IDENT);
    let municipality = optional_column(batch, &discharge::MUNICIPALITY);
    let discharge_date = optional_column(batch, &discharge::DISCHARGE_DATE);
    let sex = optional_column(batch, &discharge::SEX);
    let birth_date = optional_column(batch, &discharge::BIRTH_DATE);
    let age = optional_column(batch, &discharge::AGE);

    let rows = (0..batch.num_rows())
        .filter(|&row| is_general_admission(ident.as_ref(), row))
        .filter(|&row| is_death_outcome(&outcome, row))
        .filter_map(|row| {
            let code = string_value(&diagnosis, row).filter(|code| diagnoses.contains(code))?;
            let discharged = parse_date(optional_value(discharge_date.as_ref(), row));
            let born = parse_date(optional_value(birth_date.as_ref(), row));
            let age_years = match (born, discharged) {
                (Some(born), Some(discharged)) => Some(age_between(born, discharged)),
                _ => parse_number(optional_value(age.as_ref(), row)),
            };
            Some(DischargeRecord {
                municipality: canonicalize_municipality(optional_value(municipality.as_ref(), row)),
                year,
                sex: standardize_sex(optional_value(sex.as_ref(), row), RegistrySchema::Discharge),
                age_years,
                discharge_date: discharged,
                diagnosis: extract_diagnosis3(code),
            })
        })
        .collect();

    BuildOutcome::from_rows(rows)
}

/// Loader for the hospital discharge registry
#[derive(Debug, Clone, Default)]
pub struct DischargeRegister {
    diagnoses: DiagnosisSet,
}

impl DischargeRegister {
    /// Create a loader keeping discharges whose diagnosis lies in `diagnoses`
    #[must_use]
    pub const fn new(diagnoses: DiagnosisSet) -> Self {
        Self { diagnoses }
    }
}

impl RegisterLoader for DischargeRegister {
    type Record = DischargeRecord;

    fn get_register_name(&self) -> &'static str {
        "discharge"
    }

    fn build(&self, batch: &RecordBatch, year: i32) -> BuildOutcome<DischargeRecord> {
        build_discharge_table(batch, year, &self.diagnoses)
    }
}
