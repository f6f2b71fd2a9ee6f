use std::fs;

use pneumo_linkage::config::DiagnosisSet;
use pneumo_linkage::registry::{DischargeRegister, MortalityRegister, RegisterLoader};
use pneumo_linkage::utils::io::write_parquet_atomic;

use crate::utils::{raw_batch, raw_discharge_batch, raw_mortality_batch, strings};

#[test]
fn test_load_years_from_files_and_directories() {
    let dir = tempfile::tempdir().unwrap();
    let deaths = dir.path().join("deaths");
    fs::create_dir_all(deaths.join("2021")).unwrap();
    write_parquet_atomic(&deaths.join("2021").join("MG.parquet"), &raw_mortality_batch()).unwrap();
    write_parquet_atomic(&deaths.join("2021").join("DF.parquet"), &raw_mortality_batch()).unwrap();
    write_parquet_atomic(&deaths.join("2022.parquet"), &raw_mortality_batch()).unwrap();
    write_parquet_atomic(&deaths.join("2023.parquet"), &raw_mortality_batch()).unwrap();

    let register = MortalityRegister::new(DiagnosisSet::pneumonia());
    assert_eq!(register.get_register_name(), "mortality");

    let table = register.load(&deaths, &[2021, 2022]).unwrap();
    assert_eq!(table.len(), 6);
    assert!(table.iter().take(4).all(|r| r.year == 2021));
    assert!(table.iter().skip(4).all(|r| r.year == 2022));

    let everything = register.load(&deaths, &[]).unwrap();
    assert_eq!(everything.len(), 8);
}

#[test]
fn test_batches_without_required_columns_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let discharges = dir.path().join("discharges");
    fs::create_dir_all(&discharges).unwrap();
    write_parquet_atomic(&discharges.join("2021.parquet"), &raw_batch(vec![(
        "DIAG_PRINC",
        strings(&[Some("J18")]),
    )]))
    .unwrap();
    write_parquet_atomic(&discharges.join("2022.parquet"), &raw_discharge_batch()).unwrap();

    let table = DischargeRegister::new(DiagnosisSet::pneumonia())
        .load(&discharges, &[])
        .unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table[0].year, 2022);
}

#[test]
fn test_missing_registry_directory_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let table = MortalityRegister::default()
        .load(&dir.path().join("deaths"), &[2022])
        .unwrap();
    assert!(table.is_empty());
}
