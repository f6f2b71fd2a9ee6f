use std::fs;

use pneumo_linkage::algorithm::aggregate::RateTable;
use pneumo_linkage::algorithm::linkage::LinkageTable;
use pneumo_linkage::config::{LinkageConfig, PipelineConfig};
use pneumo_linkage::pipeline::{self, PipelineContext, outputs};
use pneumo_linkage::utils::io::read_parquet;
use pneumo_linkage::Error;

use crate::utils::write_input_dir;

fn config(input: &std::path::Path, results: &std::path::Path) -> PipelineConfig {
    PipelineConfig::new(vec![2022])
        .with_ufs(vec!["MG".to_string(), "DF".to_string()])
        .with_input_dir(input)
        .with_results_dir(results)
        .with_linkage(LinkageConfig::new().use_parallel(false))
}

#[test]
fn test_end_to_end_run() {
    let input = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    write_input_dir(input.path());

    let context = PipelineContext::load(config(input.path(), results.path())).unwrap();
    assert_eq!(context.inputs().deaths.len(), 2);
    assert_eq!(context.inputs().discharges.len(), 1);
    assert_eq!(context.inputs().population.len(), 2);

    let output = pipeline::run(&context).unwrap();
    let written = pipeline::persist(&context, &output, results.path()).unwrap();

    for name in [
        outputs::RATES,
        outputs::RATE_SUMMARY,
        outputs::PROFILE_SUMMARY,
        outputs::LINKAGE,
        outputs::DEATHS,
        outputs::DISCHARGES,
        outputs::SUMMARY,
        "profile_age_group.parquet",
        "profile_sex.parquet",
        "profile_education.parquet",
    ] {
        assert!(results.path().join(name).is_file(), "{name} not written");
    }
    assert_eq!(written.len(), 10);

    let leftovers: Vec<_> = fs::read_dir(results.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "tmp"))
        .collect();
    assert!(leftovers.is_empty());

    let linkage_batches = read_parquet(&results.path().join(outputs::LINKAGE)).unwrap();
    let linkage = LinkageTable::from_record_batch(&linkage_batches[0]).unwrap();
    assert_eq!(linkage, output.linkage.table);
    assert_eq!(linkage.len(), 1);
    assert!(linkage[0].is_match);

    let rate_batches = read_parquet(&results.path().join(outputs::RATES)).unwrap();
    let rates = RateTable::from_record_batch(&rate_batches[0]).unwrap();
    assert_eq!(rates.len(), 2);
    assert!(rates.iter().all(|rate| rate.rate_per_100k.is_some()));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(results.path().join(outputs::SUMMARY)).unwrap())
            .unwrap();
    assert_eq!(summary["period"], "2022-2022");
    assert_eq!(summary["ufs"], "MG,DF");
    assert_eq!(summary["deaths"], 2);
    assert_eq!(summary["discharges"], 1);
    assert_eq!(summary["rate_rows"], 2);
    assert_eq!(summary["classification"], "threshold_fallback");
    assert_eq!(summary["total_pairs"], 1);
    assert_eq!(summary["matched_pairs"], 1);
    assert_eq!(summary["match_rate"], 1.0);
}

#[test]
fn test_empty_tables_are_not_written() {
    let input = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();

    let context = PipelineContext::load(config(input.path(), results.path())).unwrap();
    let output = pipeline::run(&context).unwrap();
    let written = pipeline::persist(&context, &output, results.path()).unwrap();

    assert_eq!(written, vec![results.path().join(outputs::SUMMARY)]);
    assert_eq!(output.summary.rate_rows, 0);
    assert_eq!(output.summary.classification, "not_run");
}

#[test]
fn test_invalid_config_fails_before_reading() {
    let config = PipelineConfig::new(vec![2022])
        .with_input_dir("/nonexistent/input")
        .with_linkage(LinkageConfig::new().with_fallback_threshold(f64::NAN));
    assert!(matches!(
        PipelineContext::load(config),
        Err(Error::InvalidConfig(_))
    ));
}
