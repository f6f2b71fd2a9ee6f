use pneumo_linkage::config::DiagnosisSet;
use pneumo_linkage::models::{AgeGroup, Sex};
use pneumo_linkage::registry::{BuildOutcome, EmptyReason, build_death_table};

use crate::utils::{date, floats, raw_batch, raw_mortality_batch, strings};

#[test]
fn test_pneumonia_deaths_are_standardized() {
    let table = build_death_table(&raw_mortality_batch(), 2022, &DiagnosisSet::pneumonia())
        .into_table();

    assert_eq!(table.len(), 2);
    let first = &table[0];
    assert_eq!(first.municipality.as_deref(), Some("310620"));
    assert_eq!(first.year, 2022);
    assert_eq!(first.sex, Sex::Female);
    assert_eq!(first.age_years, Some(80.0));
    assert_eq!(first.age_group, AgeGroup::Age75Plus);
    assert_eq!(first.education.as_deref(), Some("3"));
    assert_eq!(first.death_date, Some(date("2022-03-15")));
    assert_eq!(first.diagnosis, "J18");

    assert_eq!(table[1].diagnosis, "J15");
    assert_eq!(table[1].education, None);
}

#[test]
fn test_older_vintage_aliases() {
    let batch = raw_batch(vec![
        ("CB_PRE", strings(&[Some("J12"), Some("A09")])),
        ("MUNCOD", strings(&[Some("5300108"), None])),
        ("DT_OBITO", strings(&[Some("2019-07-01"), None])),
    ]);
    let table = build_death_table(&batch, 2019, &DiagnosisSet::pneumonia()).into_table();

    assert_eq!(table.len(), 1);
    assert_eq!(table[0].municipality.as_deref(), Some("530010"));
    assert_eq!(table[0].death_date, Some(date("2019-07-01")));
    assert_eq!(table[0].sex, Sex::Unknown);
    assert_eq!(table[0].age_group, AgeGroup::Unknown);
}

#[test]
fn test_missing_cause_column_yields_empty_outcome() {
    let batch = raw_batch(vec![("SEXO", strings(&[Some("1")]))]);
    let outcome = build_death_table(&batch, 2022, &DiagnosisSet::pneumonia());
    assert_eq!(
        outcome.reason(),
        Some(&EmptyReason::MissingColumn { field: "cause" })
    );
}

#[test]
fn test_no_pneumonia_rows() {
    let batch = raw_batch(vec![("CAUSABAS", strings(&[Some("I219"), None]))]);
    let outcome = build_death_table(&batch, 2022, &DiagnosisSet::pneumonia());
    assert!(matches!(
        outcome,
        BuildOutcome::Empty {
            reason: EmptyReason::NoMatchingRows
        }
    ));
}

#[test]
fn test_custom_diagnosis_set() {
    let set = DiagnosisSet::from_prefixes(["I21"]);
    let table = build_death_table(&raw_mortality_batch(), 2022, &set).into_table();
    assert_eq!(table.len(), 1);
    assert_eq!(table[0].diagnosis, "I21");
    assert_eq!(table[0].sex, Sex::Male);
}

#[test]
fn test_float_education_codes_group_with_text_codes() {
    let batch = raw_batch(vec![
        ("CAUSABAS", strings(&[Some("J18"), Some("J12")])),
        ("ESC", floats(&[3.0, 9.0])),
    ]);
    let table = build_death_table(&batch, 2022, &DiagnosisSet::pneumonia()).into_table();

    let education: Vec<_> = table.iter().map(|r| r.education.as_deref()).collect();
    assert_eq!(education, vec![Some("3"), Some("9")]);
}
