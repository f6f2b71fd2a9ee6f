//! Pneumonia mortality statistics and probabilistic linkage of death records
//! to hospital discharges.
//!
//! The crate reads raw mortality and hospital-discharge extracts from parquet,
//! standardizes them into typed tables, computes municipal mortality rates and
//! demographic profiles, and links deaths to in-hospital deaths without a
//! shared identifier.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod schema;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{DiagnosisSet, EmConfig, LinkageConfig, PipelineConfig};
pub use error::{Error, Result};
pub use models::{
    AgeGroup, ArrowSchema, DeathRecord, DeathTable, DischargeRecord, DischargeTable,
    PopulationRecord, PopulationTable, Sex, Table,
};

// Linkage and aggregation
pub use algorithm::aggregate::{aggregate_deaths, build_profiles, compute_rates};
pub use algorithm::linkage::{
    ClassificationMethod, EcmClassifier, LinkageMetrics, LinkageResult, PairClassifier,
    RecordLinker, ThresholdClassifier, compute_linkage_metrics, link_records,
};

// Pipeline
pub use pipeline::{PipelineContext, PipelineInputs, PipelineOutput, RunSummary, persist, run};

// Arrow types
pub use arrow::record_batch::RecordBatch;
