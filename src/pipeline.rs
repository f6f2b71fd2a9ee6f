//! End-to-end pipeline: load, aggregate, link, persist
//!
//! A run is a [`PipelineContext`] (validated configuration plus the loaded
//! standardized tables) threaded through pure stage functions. Only
//! [`PipelineContext::load`] and [`persist`] touch the filesystem.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;
use serde::Serialize;

use crate::algorithm::aggregate::{
    ProfileDimension, ProfileTable, RateTable, YearRateSummary, YearTotal, aggregate_deaths,
    build_profiles, compute_rates, summarize_profile, summarize_rates_by_year,
};
use crate::algorithm::linkage::{
    ClassificationMethod, LinkageMetrics, LinkageResult, PairClassifier, RecordLinker,
    compute_linkage_metrics,
};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::models::death::DeathTable;
use crate::models::discharge::DischargeTable;
use crate::models::population::PopulationTable;
use crate::models::table::Table;
use crate::models::traits::ArrowSchema;
use crate::registry::{
    DischargeRegister, MortalityRegister, RegisterLoader, load_population_table,
};
use crate::utils::io::{write_json_atomic, write_parquet_atomic};
use crate::utils::logging::{create_load_spinner, finish_progress_bar, log_operation_start};

/// Subdirectory of the input directory holding raw death batches
pub const DEATHS_DIR: &str = "deaths";
/// Subdirectory of the input directory holding raw discharge batches
pub const DISCHARGES_DIR: &str = "discharges";
/// Population file inside the input directory
pub const POPULATION_FILE: &str = "population.parquet";

/// Output file names
pub mod outputs {
    pub const RATES: &str = "rates_by_municipality_year.parquet";
    pub const RATE_SUMMARY: &str = "rate_summary_by_year.parquet";
    pub const PROFILE_SUMMARY: &str = "profile_summary_by_year.parquet";
    pub const LINKAGE: &str = "linkage_deaths_discharges.parquet";
    pub const DEATHS: &str = "deaths_standardized.parquet";
    pub const DISCHARGES: &str = "discharges_standardized.parquet";
    pub const SUMMARY: &str = "summary.json";

    /// File name of one demographic profile
    #[must_use]
    pub fn profile(dimension: super::ProfileDimension) -> String {
        format!("profile_{}.parquet", dimension.name())
    }
}

/// Standardized tables a run works on
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    pub deaths: DeathTable,
    pub discharges: DischargeTable,
    pub population: PopulationTable,
}

/// Immutable state of a run
#[derive(Debug, Clone)]
pub struct PipelineContext {
    config: PipelineConfig,
    inputs: PipelineInputs,
}

impl PipelineContext {
    /// Create a context from tables already in memory
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the configuration is invalid
    pub fn new(config: PipelineConfig, inputs: PipelineInputs) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, inputs })
    }

    /// Validate the configuration, then read and standardize every input
    ///
    /// Expects `deaths/` and `discharges/` below the input directory, each
    /// holding one parquet file or directory per year, and an optional
    /// `population.parquet`.
    pub fn load(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let start = Instant::now();
        let input_dir = config.input_dir.as_path();
        log_operation_start("Loading pipeline inputs from", input_dir.display());
        let spinner = create_load_spinner(input_dir);

        let deaths = MortalityRegister::new(config.diagnosis_set.clone())
            .load(&input_dir.join(DEATHS_DIR), &config.years)?;
        let discharges = DischargeRegister::new(config.diagnosis_set.clone())
            .load(&input_dir.join(DISCHARGES_DIR), &config.years)?;
        let population = load_population_table(&input_dir.join(POPULATION_FILE))?;

        finish_progress_bar(&spinner, Some("Registries loaded"));
        info!(
            "Loaded {} deaths, {} discharges and {} population rows in {:?}",
            deaths.len(),
            discharges.len(),
            population.len(),
            start.elapsed()
        );

        Ok(Self {
            config,
            inputs: PipelineInputs {
                deaths,
                discharges,
                population,
            },
        })
    }

    /// Get the run configuration
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Get the standardized inputs
    #[must_use]
    pub const fn inputs(&self) -> &PipelineInputs {
        &self.inputs
    }
}

/// Flat key-value summary of a run, written as `summary.json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// `min-max` of the configured years, or `all`
    pub period: String,
    /// Comma-separated federative units, or `all`
    pub ufs: String,
    pub deaths: usize,
    pub discharges: usize,
    pub rate_rows: usize,
    /// Strategy that produced the match decisions
    pub classification: String,
    #[serde(flatten)]
    pub linkage: LinkageMetrics,
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub rates: RateTable,
    pub rate_summary: Table<YearRateSummary>,
    pub profiles: Vec<(ProfileDimension, ProfileTable)>,
    pub profile_summary: Table<YearTotal>,
    pub linkage: LinkageResult,
    pub metrics: LinkageMetrics,
    pub summary: RunSummary,
}

/// Rates, rate summary and profiles of the death table
#[must_use]
pub fn aggregate_stage(
    context: &PipelineContext,
) -> (RateTable, Table<YearRateSummary>, Vec<(ProfileDimension, ProfileTable)>) {
    let inputs = context.inputs();
    let counts = aggregate_deaths(&inputs.deaths);
    let rates = compute_rates(&counts, &inputs.population);
    let rate_summary = summarize_rates_by_year(&rates);
    let profiles = build_profiles(&inputs.deaths);
    info!(
        "Aggregated {} deaths into {} rate rows",
        inputs.deaths.len(),
        rates.len()
    );
    (rates, rate_summary, profiles)
}

/// Link deaths to discharges with the given linker
#[must_use]
pub fn linkage_stage<C: PairClassifier>(
    context: &PipelineContext,
    linker: &RecordLinker<C>,
) -> (LinkageResult, LinkageMetrics) {
    let inputs = context.inputs();
    let result = linker.link(&inputs.deaths, &inputs.discharges);
    let metrics = compute_linkage_metrics(&result.table);
    (result, metrics)
}

/// Run every stage with the EM classifier
pub fn run(context: &PipelineContext) -> Result<PipelineOutput> {
    let linker = RecordLinker::new(context.config().linkage.clone())?;
    Ok(run_with_linker(context, &linker))
}

/// Run every stage with a caller-supplied linker
#[must_use]
pub fn run_with_linker<C: PairClassifier>(
    context: &PipelineContext,
    linker: &RecordLinker<C>,
) -> PipelineOutput {
    let start = Instant::now();
    let config = context.config();
    info!("Running pipeline for period {}", config.period());

    let (rates, rate_summary, profiles) = aggregate_stage(context);
    let profile_summary = Table::concat(
        profiles
            .iter()
            .map(|(dimension, profile)| summarize_profile(*dimension, profile)),
    );
    let (linkage, metrics) = linkage_stage(context, linker);

    let summary = RunSummary {
        period: config.period(),
        ufs: config
            .ufs
            .as_ref()
            .filter(|ufs| !ufs.is_empty())
            .map_or_else(|| "all".to_string(), |ufs| ufs.join(",")),
        deaths: context.inputs().deaths.len(),
        discharges: context.inputs().discharges.len(),
        rate_rows: rates.len(),
        classification: linkage.method.to_string(),
        linkage: metrics,
    };

    info!("Pipeline finished in {:?}", start.elapsed());
    PipelineOutput {
        rates,
        rate_summary,
        profiles,
        profile_summary,
        linkage,
        metrics,
        summary,
    }
}

fn write_table<R: ArrowSchema>(dir: &Path, name: &str, table: &Table<R>) -> Result<Option<PathBuf>> {
    if table.is_empty() {
        info!("Skipping empty output {name}");
        return Ok(None);
    }
    let path = dir.join(name);
    write_parquet_atomic(&path, &table.to_record_batch()?)?;
    Ok(Some(path))
}

/// Write every non-empty output table and the run summary to `results_dir`
///
/// Returns the paths written. Each file is written atomically.
pub fn persist(
    context: &PipelineContext,
    output: &PipelineOutput,
    results_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let start = Instant::now();
    fs::create_dir_all(results_dir).map_err(|e| Error::io(results_dir, e))?;
    log_operation_start("Writing results to", results_dir.display());

    let inputs = context.inputs();
    let mut written = Vec::new();
    written.extend(write_table(results_dir, outputs::RATES, &output.rates)?);
    written.extend(write_table(
        results_dir,
        outputs::RATE_SUMMARY,
        &output.rate_summary,
    )?);
    for (dimension, profile) in &output.profiles {
        written.extend(write_table(results_dir, &outputs::profile(*dimension), profile)?);
    }
    written.extend(write_table(
        results_dir,
        outputs::PROFILE_SUMMARY,
        &output.profile_summary,
    )?);
    written.extend(write_table(
        results_dir,
        outputs::LINKAGE,
        &output.linkage.table,
    )?);
    written.extend(write_table(results_dir, outputs::DEATHS, &inputs.deaths)?);
    written.extend(write_table(
        results_dir,
        outputs::DISCHARGES,
        &inputs.discharges,
    )?);

    let summary_path = results_dir.join(outputs::SUMMARY);
    write_json_atomic(&summary_path, &output.summary)?;
    written.push(summary_path);

    info!(
        "Wrote {} result files to {} in {:?}",
        written.len(),
        results_dir.display(),
        start.elapsed()
    );
    Ok(written)
}

impl PipelineOutput {
    /// Whether linkage ran on the EM classifier rather than a fallback
    #[must_use]
    pub fn used_classifier(&self) -> bool {
        matches!(self.linkage.method, ClassificationMethod::Classifier(_))
    }
}
