//! Probabilistic linkage of death records to hospital discharges
//!
//! The two registries share no identifier. Candidate pairs are generated by
//! blocking on municipality, year-month and sex, scored on diagnosis, age and
//! date similarity, and classified as match or non-match without labels.
//!
//! Stages:
//! - [`blocking`]: candidate pair generation
//! - [`comparison`]: per-pair similarity scores
//! - [`classifier`]: match decisions (EM with a threshold fallback)
//! - [`linker`]: orchestration and result assembly
//! - [`metrics`]: summary statistics

pub mod blocking;
pub mod classifier;
pub mod comparison;
pub mod linker;
pub mod metrics;
pub mod types;

pub use blocking::{build_blocks, candidate_pairs};
pub use classifier::{
    ClassifierFailure, EcmClassifier, EcmModel, PairClassifier, ThresholdClassifier,
};
pub use comparison::{compare_records, gaussian_similarity};
pub use linker::{RecordLinker, link_records};
pub use metrics::compute_linkage_metrics;
pub use types::{
    BlockKey, CandidatePair, ClassificationMethod, ComparisonVector, LinkageMetrics,
    LinkageResult, LinkageRow, LinkageTable,
};
