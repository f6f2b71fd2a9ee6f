//! Mortality registry (death certificates)
//!
//! Keeps the certificates whose underlying cause lies in the diagnosis set
//! and projects them onto [`DeathRecord`].

use arrow::record_batch::RecordBatch;

use crate::config::DiagnosisSet;
use crate::models::death::DeathRecord;
use crate::models::types::RegistrySchema;
use crate::registry::{
    BuildOutcome, RegisterLoader, optional_column, optional_prefixed_column, required_column,
};
use crate::schema::columns::mortality;
use crate::schema::normalize::{
    bucket_age, canonicalize_municipality, extract_diagnosis3, normalize_code, parse_date,
    parse_number, standardize_sex,
};
use crate::utils::arrow::{optional_value, string_value};

/// Build standardized death rows from one raw mortality batch
///
/// The cause-of-death column is required; without it the batch yields an
/// empty outcome. Other absent columns project to missing values.
#[must_use]
pub fn build_death_table(
    batch: &RecordBatch,
    year: i32,
    diagnoses: &DiagnosisSet,
) -> BuildOutcome<DeathRecord> {
    let cause = match required_column(batch, &mortality::CAUSE) {
        Ok(cause) => cause,
        Err(reason) => return BuildOutcome::empty(reason),
    };

    let municipality = optional_column(batch, &mortality::MUNICIPALITY);
    let death_date = optional_column(batch, &mortality::DEATH_DATE);
    let sex = optional_column(batch, &mortality::SEX);
    let age = optional_column(batch, &mortality::AGE);
    let education = optional_prefixed_column(batch, mortality::EDUCATION_PREFIX, "education");

    let rows = (0..batch.num_rows())
        .filter_map(|row| {
            let code = string_value(&cause, row).filter(|code| diagnoses.contains(code))?;
            let age_years = parse_number(optional_value(age.as_ref(), row));
            Some(DeathRecord {
                municipality: canonicalize_municipality(optional_value(municipality.as_ref(), row)),
                year,
                sex: standardize_sex(optional_value(sex.as_ref(), row), RegistrySchema::Mortality),
                age_years,
                education: normalize_code(optional_value(education.as_ref(), row)),
                death_date: parse_date(optional_value(death_date.as_ref(), row)),
                diagnosis: extract_diagnosis3(code),
                age_group: bucket_age(age_years),
            })
        })
        .collect();

    BuildOutcome::from_rows(rows)
}

/// Loader for the mortality registry
#[derive(Debug, Clone, Default)]
pub struct MortalityRegister {
    diagnoses: DiagnosisSet,
}

impl MortalityRegister {
    /// Create a loader keeping deaths whose cause lies in `diagnoses`
    #[must_use]
    pub const fn new(diagnoses: DiagnosisSet) -> Self {
        Self { diagnoses }
    }
}

impl RegisterLoader for MortalityRegister {
    type Record = DeathRecord;

    fn get_register_name(&self) -> &'static str {
        "mortality"
    }

    fn build(&self, batch: &RecordBatch, year: i32) -> BuildOutcome<DeathRecord> {
        build_death_table(batch, year, &self.diagnoses)
    }
}
