use pneumo_linkage::config::DiagnosisSet;
use pneumo_linkage::models::Sex;
use pneumo_linkage::registry::{EmptyReason, build_discharge_table};

use crate::utils::{date, ints, raw_batch, raw_discharge_batch, strings};

#[test]
fn test_only_general_in_hospital_deaths_are_kept() {
    let table = build_discharge_table(&raw_discharge_batch(), 2022, &DiagnosisSet::pneumonia())
        .into_table();

    assert_eq!(table.len(), 1);
    let record = &table[0];
    assert_eq!(record.municipality.as_deref(), Some("310620"));
    assert_eq!(record.sex, Sex::Female);
    assert_eq!(record.age_years, Some(79.0));
    assert_eq!(record.discharge_date, Some(date("2022-03-16")));
    assert_eq!(record.diagnosis, "J18");
}

#[test]
fn test_age_from_birth_date() {
    let batch = raw_batch(vec![
        ("DIAG_PRINCIPAL", strings(&[Some("J181")])),
        ("DT_SAIDA", strings(&[Some("20220316")])),
        ("NASC", strings(&[Some("19420316")])),
        ("IDADE", strings(&[Some("12")])),
        ("MORTE", strings(&[Some("1.0")])),
    ]);
    let table = build_discharge_table(&batch, 2022, &DiagnosisSet::pneumonia()).into_table();

    assert_eq!(table.len(), 1);
    let age = table[0].age_years.unwrap();
    assert!((age - 80.0).abs() < 0.01, "age {age}");
}

#[test]
fn test_missing_ident_keeps_every_admission_type() {
    let batch = raw_batch(vec![
        ("DIAG_PRINC", strings(&[Some("J18"), Some("J13")])),
        ("MORTE", ints(&[1, 1])),
    ]);
    let table = build_discharge_table(&batch, 2022, &DiagnosisSet::pneumonia()).into_table();
    assert_eq!(table.len(), 2);
    assert!(table.iter().all(|r| r.municipality.is_none()));
}

#[test]
fn test_missing_outcome_column_yields_empty_outcome() {
    let batch = raw_batch(vec![("DIAG_PRINC", strings(&[Some("J18")]))]);
    let outcome = build_discharge_table(&batch, 2022, &DiagnosisSet::pneumonia());
    assert_eq!(
        outcome.reason(),
        Some(&EmptyReason::MissingColumn { field: "outcome" })
    );
}
