use pneumo_linkage::registry::{build_population_table, load_population_table};
use pneumo_linkage::utils::io::write_parquet_atomic;

use crate::utils::{floats, ints, raw_batch, raw_population_batch, strings};

#[test]
fn test_upstream_column_names() {
    let table = build_population_table(&raw_population_batch()).into_table();
    assert_eq!(table.len(), 2);
    assert_eq!(table[0].municipality, "310620");
    assert_eq!(table[0].year, 2022);
    assert_eq!(table[0].population, 2_530_701);
}

#[test]
fn test_incomplete_rows_dropped() {
    let batch = raw_batch(vec![
        ("mun6", strings(&[Some("3106200"), None, Some("530010")])),
        ("ano", ints(&[2021, 2021, 2021])),
        ("pop", floats(&[100.0, 200.0, f64::NAN])),
    ]);
    let table = build_population_table(&batch).into_table();
    assert_eq!(table.len(), 1);
    assert_eq!(table[0].municipality, "310620");
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("population.parquet");
    write_parquet_atomic(&path, &raw_population_batch()).unwrap();

    let table = load_population_table(&path).unwrap();
    assert_eq!(table.len(), 2);
    assert!(
        load_population_table(&dir.path().join("absent.parquet"))
            .unwrap()
            .is_empty()
    );
}
