//! Configuration for the pneumonia mortality pipeline.
//!
//! Configuration is validated once, before any data is read. Invalid values
//! are programmer errors and fail fast with [`Error::InvalidConfig`].

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Environment variable overriding the number of linkage worker threads
pub const WORKERS_ENV_VAR: &str = "PNEUMO_LINKAGE_WORKERS";

/// Helper function to get the worker count from environment
#[must_use]
pub fn get_worker_count() -> Option<usize> {
    std::env::var(WORKERS_ENV_VAR)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0)
}

/// Set of three-character diagnosis prefixes defining the cohort
///
/// A raw code belongs to the set when, uppercased, it starts with one of the
/// prefixes. The default is the pneumonia range J12-J18.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisSet {
    prefixes: Vec<String>,
}

impl Default for DiagnosisSet {
    fn default() -> Self {
        Self::pneumonia()
    }
}

impl DiagnosisSet {
    /// Pneumonia codes J12 through J18
    #[must_use]
    pub fn pneumonia() -> Self {
        Self {
            prefixes: (12..=18).map(|n| format!("J{n}")).collect(),
        }
    }

    /// Create a set from explicit prefixes
    #[must_use]
    pub fn from_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|p| p.as_ref().trim().to_uppercase())
                .collect(),
        }
    }

    /// Prefixes in the set
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Whether a raw diagnosis code belongs to the set
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        let code = code.to_uppercase();
        self.prefixes.iter().any(|prefix| code.starts_with(prefix.as_str()))
    }

    /// Check the set is usable
    pub fn validate(&self) -> Result<()> {
        if self.prefixes.is_empty() {
            return Err(Error::config("diagnosis set is empty"));
        }
        if let Some(prefix) = self.prefixes.iter().find(|p| p.is_empty()) {
            return Err(Error::config(format!(
                "diagnosis set contains an empty prefix: {prefix:?}"
            )));
        }
        Ok(())
    }
}

/// Parameters of the latent-class EM classifier
#[derive(Debug, Clone, PartialEq)]
pub struct EmConfig {
    /// A comparison score at or above this value counts as agreement
    pub binarize_threshold: f64,
    /// Maximum number of EM iterations
    pub max_iterations: usize,
    /// Convergence tolerance on the largest parameter change
    pub tolerance: f64,
    /// Fewer candidate pairs than this makes the model unidentifiable
    pub min_pairs: usize,
    /// Initial agreement probability among matches
    pub initial_m: f64,
    /// Initial agreement probability among non-matches
    pub initial_u: f64,
    /// Initial share of matches among candidate pairs
    pub initial_match_prior: f64,
}

impl Default for EmConfig {
    fn default() -> Self {
        Self {
            binarize_threshold: 0.5,
            max_iterations: 100,
            tolerance: 1e-6,
            min_pairs: 10,
            initial_m: 0.9,
            initial_u: 0.1,
            initial_match_prior: 0.1,
        }
    }
}

impl EmConfig {
    /// Check every parameter is in range
    pub fn validate(&self) -> Result<()> {
        if !(self.binarize_threshold > 0.0 && self.binarize_threshold <= 1.0) {
            return Err(Error::config(format!(
                "binarize threshold must be in (0, 1], got {}",
                self.binarize_threshold
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::config("EM needs at least one iteration"));
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(Error::config(format!(
                "EM tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        for (name, value) in [
            ("initial m probability", self.initial_m),
            ("initial u probability", self.initial_u),
            ("initial match prior", self.initial_match_prior),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(Error::config(format!(
                    "{name} must be strictly between 0 and 1, got {value}"
                )));
            }
        }
        if self.initial_m <= self.initial_u {
            return Err(Error::config(
                "initial m probability must exceed initial u probability",
            ));
        }
        Ok(())
    }
}

/// Configuration for the record linkage step
#[derive(Debug, Clone, PartialEq)]
pub struct LinkageConfig {
    /// Gaussian kernel scale for age differences, in years
    pub age_scale: f64,
    /// Gaussian kernel scale for date differences, in days
    pub date_scale: f64,
    /// Aggregate score at or above which the fallback rule declares a match
    pub fallback_threshold: f64,
    /// Parameters of the unsupervised classifier
    pub em: EmConfig,
    /// Whether blocks are compared on a worker pool
    pub use_parallel: bool,
    /// Number of worker threads for block comparison
    pub workers: usize,
}

impl Default for LinkageConfig {
    fn default() -> Self {
        Self {
            age_scale: 2.0,
            date_scale: 3.0,
            fallback_threshold: 2.0,
            em: EmConfig::default(),
            use_parallel: true,
            workers: get_worker_count().unwrap_or_else(num_cpus::get),
        }
    }
}

impl LinkageConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the age kernel scale
    #[must_use]
    pub const fn with_age_scale(mut self, years: f64) -> Self {
        self.age_scale = years;
        self
    }

    /// Set the date kernel scale
    #[must_use]
    pub const fn with_date_scale(mut self, days: f64) -> Self {
        self.date_scale = days;
        self
    }

    /// Set the fallback threshold
    #[must_use]
    pub const fn with_fallback_threshold(mut self, threshold: f64) -> Self {
        self.fallback_threshold = threshold;
        self
    }

    /// Set the EM parameters
    #[must_use]
    pub fn with_em(mut self, em: EmConfig) -> Self {
        self.em = em;
        self
    }

    /// Set whether to compare blocks in parallel
    #[must_use]
    pub const fn use_parallel(mut self, parallel: bool) -> Self {
        self.use_parallel = parallel;
        self
    }

    /// Set the number of worker threads
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Check every parameter is in range
    pub fn validate(&self) -> Result<()> {
        for (name, scale) in [("age scale", self.age_scale), ("date scale", self.date_scale)] {
            if !(scale > 0.0 && scale.is_finite()) {
                return Err(Error::config(format!(
                    "{name} must be a positive finite number, got {scale}"
                )));
            }
        }
        if !self.fallback_threshold.is_finite() || self.fallback_threshold < 0.0 {
            return Err(Error::config(format!(
                "fallback threshold must be a non-negative finite number, got {}",
                self.fallback_threshold
            )));
        }
        if self.workers == 0 {
            return Err(Error::config("worker count must be at least 1"));
        }
        self.em.validate()
    }
}

/// Configuration for a full pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Registry years to process
    pub years: Vec<i32>,
    /// Federative units covered by the input (informational)
    pub ufs: Option<Vec<String>>,
    /// Directory holding the raw registry batches and population file
    pub input_dir: PathBuf,
    /// Directory the output tables are written to
    pub results_dir: PathBuf,
    /// Diagnosis cohort definition
    pub diagnosis_set: DiagnosisSet,
    /// Record linkage parameters
    pub linkage: LinkageConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            years: Vec::new(),
            ufs: None,
            input_dir: PathBuf::from("./data/input"),
            results_dir: PathBuf::from("./data/results"),
            diagnosis_set: DiagnosisSet::default(),
            linkage: LinkageConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new pipeline configuration for the given years
    #[must_use]
    pub fn new(years: Vec<i32>) -> Self {
        Self {
            years,
            ..Self::default()
        }
    }

    /// Restrict the run to the given federative units
    #[must_use]
    pub fn with_ufs(mut self, ufs: Vec<String>) -> Self {
        self.ufs = Some(ufs);
        self
    }

    /// Set the input directory
    #[must_use]
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    /// Set the results directory
    #[must_use]
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    /// Set the diagnosis set
    #[must_use]
    pub fn with_diagnosis_set(mut self, set: DiagnosisSet) -> Self {
        self.diagnosis_set = set;
        self
    }

    /// Set the linkage configuration
    #[must_use]
    pub fn with_linkage(mut self, linkage: LinkageConfig) -> Self {
        self.linkage = linkage;
        self
    }

    /// Human-readable period, e.g. `2019-2022`
    #[must_use]
    pub fn period(&self) -> String {
        match (self.years.iter().min(), self.years.iter().max()) {
            (Some(min), Some(max)) => format!("{min}-{max}"),
            _ => "all".to_string(),
        }
    }

    /// Check the whole configuration
    pub fn validate(&self) -> Result<()> {
        self.diagnosis_set.validate()?;
        self.linkage.validate()
    }
}
