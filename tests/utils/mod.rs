use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;

use pneumo_linkage::models::{DeathRecord, DischargeRecord, Sex};
use pneumo_linkage::schema::normalize::bucket_age;
use pneumo_linkage::utils::io::write_parquet_atomic;

/// Municipality of the reference linkage scenario (Belo Horizonte)
pub const REFERENCE_MUNICIPALITY: &str = "310620";

/// Parse an ISO date literal
#[must_use]
pub fn date(iso: &str) -> NaiveDate {
    NaiveDate::parse_from_str(iso, "%Y-%m-%d").unwrap()
}

/// A standardized death record
#[must_use]
pub fn death(municipality: &str, iso_date: &str, sex: Sex, age: f64, diagnosis: &str) -> DeathRecord {
    let death_date = date(iso_date);
    DeathRecord {
        municipality: Some(municipality.to_string()),
        year: chrono::Datelike::year(&death_date),
        sex,
        age_years: Some(age),
        education: None,
        death_date: Some(death_date),
        diagnosis: diagnosis.to_string(),
        age_group: bucket_age(Some(age)),
    }
}

/// A standardized discharge record
#[must_use]
pub fn discharge(
    municipality: &str,
    iso_date: &str,
    sex: Sex,
    age: f64,
    diagnosis: &str,
) -> DischargeRecord {
    let discharge_date = date(iso_date);
    DischargeRecord {
        municipality: Some(municipality.to_string()),
        year: chrono::Datelike::year(&discharge_date),
        sex,
        age_years: Some(age),
        discharge_date: Some(discharge_date),
        diagnosis: diagnosis.to_string(),
    }
}

/// The reference pair: same municipality and diagnosis, one year and one day apart
#[must_use]
pub fn reference_pair() -> (DeathRecord, DischargeRecord) {
    (
        death(REFERENCE_MUNICIPALITY, "2022-03-15", Sex::Male, 70.0, "J18"),
        discharge(REFERENCE_MUNICIPALITY, "2022-03-14", Sex::Male, 71.0, "J18"),
    )
}

/// Nullable string column
#[must_use]
pub fn strings(values: &[Option<&str>]) -> ArrayRef {
    Arc::new(StringArray::from(values.to_vec()))
}

/// Integer column
#[must_use]
pub fn ints(values: &[i32]) -> ArrayRef {
    Arc::new(Int32Array::from(values.to_vec()))
}

/// Float column
#[must_use]
pub fn floats(values: &[f64]) -> ArrayRef {
    Arc::new(Float64Array::from(values.to_vec()))
}

/// Build a raw batch from named columns
#[must_use]
pub fn raw_batch(columns: Vec<(&str, ArrayRef)>) -> RecordBatch {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
        .collect();
    let arrays = columns.into_iter().map(|(_, array)| array).collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
}

/// Raw mortality extract with one pneumonia death per municipality and one
/// cardiac death that must be filtered out
#[must_use]
pub fn raw_mortality_batch() -> RecordBatch {
    raw_batch(vec![
        ("CAUSABAS", strings(&[Some("J189"), Some("I219"), Some("J159")])),
        ("CODMUNRES", strings(&[Some("3106200"), Some("3106200"), Some("530010")])),
        ("DTOBITO", strings(&[Some("15032022"), Some("20032022"), Some("01032022")])),
        ("SEXO", strings(&[Some("2"), Some("1"), Some("1")])),
        ("IDADE_ANOS", strings(&[Some("80"), Some("60"), Some("45")])),
        ("ESC2010", strings(&[Some("3"), None, None])),
    ])
}

/// Raw discharge extract: one in-hospital pneumonia death, one survivor and
/// one non-general admission
#[must_use]
pub fn raw_discharge_batch() -> RecordBatch {
    raw_batch(vec![
        ("DIAG_PRINC", strings(&[Some("J18"), Some("J159"), Some("J180")])),
        ("MUNIC_RES", strings(&[Some("310620"), Some("530010"), Some("310620")])),
        ("DT_SAIDA", strings(&[Some("20220316"), Some("20220320"), Some("20220316")])),
        ("SEXO", strings(&[Some("3"), Some("1"), Some("3")])),
        ("IDADE", strings(&[Some("79"), Some("45"), Some("79")])),
        ("MORTE", ints(&[1, 0, 1])),
        ("IDENT", strings(&[Some("1"), Some("1"), Some("5")])),
    ])
}

/// Raw population extract with the upstream column names
#[must_use]
pub fn raw_population_batch() -> RecordBatch {
    raw_batch(vec![
        ("CODMUNICIPIO", strings(&[Some("310620"), Some("530010")])),
        ("ANO", ints(&[2022, 2022])),
        ("POPULACAO", floats(&[2_530_701.0, 3_094_325.0])),
    ])
}

/// Lay out a complete input directory for the year 2022
pub fn write_input_dir(dir: &Path) {
    std::fs::create_dir_all(dir.join("deaths")).unwrap();
    std::fs::create_dir_all(dir.join("discharges")).unwrap();
    write_parquet_atomic(&dir.join("deaths").join("2022.parquet"), &raw_mortality_batch()).unwrap();
    write_parquet_atomic(&dir.join("discharges").join("2022.parquet"), &raw_discharge_batch())
        .unwrap();
    write_parquet_atomic(&dir.join("population.parquet"), &raw_population_batch()).unwrap();
}

