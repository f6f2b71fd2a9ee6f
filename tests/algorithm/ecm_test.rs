use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pneumo_linkage::algorithm::linkage::{
    ClassificationMethod, ClassifierFailure, ComparisonVector, EcmClassifier, RecordLinker,
    compute_linkage_metrics,
};
use pneumo_linkage::config::{EmConfig, LinkageConfig};
use pneumo_linkage::models::{DeathRecord, DeathTable, DischargeRecord, DischargeTable, Sex};

use crate::utils::{death, discharge};

const BLOCKS: usize = 10;
const DEATHS_PER_BLOCK: usize = 6;
const TRUE_MATCHES_PER_BLOCK: usize = 4;
const DECOYS_PER_BLOCK: usize = 2;

fn random_fields(rng: &mut StdRng) -> (f64, String, String) {
    let age = f64::from(rng.random_range(0..100_i32));
    let day = rng.random_range(1..=28);
    let diagnosis = format!("J{}", rng.random_range(12..=18));
    (age, format!("2022-03-{day:02}"), diagnosis)
}

/// Blocks where the first discharges copy a death exactly and the rest are
/// unrelated decoys
fn synthetic_tables(seed: u64) -> (DeathTable, DischargeTable, Vec<(usize, usize)>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut deaths: Vec<DeathRecord> = Vec::new();
    let mut discharges: Vec<DischargeRecord> = Vec::new();
    let mut truth = Vec::new();

    for block in 0..BLOCKS {
        let municipality = format!("31{block:04}");
        let first_death = deaths.len();
        for _ in 0..DEATHS_PER_BLOCK {
            let (age, date, diagnosis) = random_fields(&mut rng);
            deaths.push(death(&municipality, &date, Sex::Female, age, &diagnosis));
        }
        for offset in 0..TRUE_MATCHES_PER_BLOCK {
            let source = &deaths[first_death + offset];
            truth.push((first_death + offset, discharges.len()));
            discharges.push(DischargeRecord {
                municipality: source.municipality.clone(),
                year: source.year,
                sex: source.sex,
                age_years: source.age_years,
                discharge_date: source.death_date,
                diagnosis: source.diagnosis.clone(),
            });
        }
        for _ in 0..DECOYS_PER_BLOCK {
            let (age, date, diagnosis) = random_fields(&mut rng);
            discharges.push(discharge(&municipality, &date, Sex::Female, age, &diagnosis));
        }
    }

    (DeathTable::new(deaths), DischargeTable::new(discharges), truth)
}

#[test]
fn test_em_recovers_planted_matches() {
    let (deaths, discharges, truth) = synthetic_tables(42);
    let result = RecordLinker::new(LinkageConfig::new().use_parallel(false))
        .unwrap()
        .link(&deaths, &discharges);

    assert_eq!(result.method, ClassificationMethod::Classifier("ecm"));
    assert_eq!(result.table.len(), BLOCKS * DEATHS_PER_BLOCK * DEATHS_PER_BLOCK);

    for &(death_idx, discharge_idx) in &truth {
        let row = result
            .table
            .iter()
            .find(|row| row.death_idx == death_idx && row.discharge_idx == discharge_idx)
            .unwrap();
        assert!(row.is_match, "planted pair ({death_idx}, {discharge_idx}) missed");
    }

    let false_positives = result
        .table
        .iter()
        .filter(|row| row.is_match && !truth.contains(&(row.death_idx, row.discharge_idx)))
        .count();
    assert!(false_positives < truth.len(), "{false_positives} false positives");

    let metrics = compute_linkage_metrics(&result.table);
    assert!(metrics.matched_pairs >= truth.len());
}

#[test]
fn test_parallel_and_sequential_agree() {
    let (deaths, discharges, _) = synthetic_tables(7);
    let sequential = RecordLinker::new(LinkageConfig::new().use_parallel(false))
        .unwrap()
        .link(&deaths, &discharges);
    let parallel = RecordLinker::new(LinkageConfig::new().use_parallel(true).with_workers(4))
        .unwrap()
        .link(&deaths, &discharges);
    assert_eq!(sequential, parallel);
}

#[test]
fn test_ecm_refuses_constant_field() {
    let vectors: Vec<ComparisonVector> = (0..20)
        .map(|i| ComparisonVector {
            diagnosis: Some(1.0),
            age: Some(if i % 2 == 0 { 1.0 } else { 0.0 }),
            date: Some(if i % 3 == 0 { 1.0 } else { 0.0 }),
        })
        .collect();
    let failure = EcmClassifier::new(EmConfig::default()).fit(&vectors).unwrap_err();
    assert!(matches!(
        failure,
        ClassifierFailure::ZeroVariance { field: "diagnosis" }
    ));
}
