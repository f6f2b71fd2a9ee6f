//! Record linker: blocking, comparison, classification and result assembly
//!
//! Blocks are independent, so they are compared on a dedicated rayon pool when
//! parallelism is enabled. The merged comparisons are put back in pair
//! generation order before classification, which keeps results identical
//! across thread counts.

use std::time::Instant;

use indicatif::{ParallelProgressIterator, ProgressIterator};
use log::info;
use rayon::prelude::*;

use crate::algorithm::linkage::blocking::{Block, build_blocks};
use crate::algorithm::linkage::classifier::{
    ClassifierFailure, EcmClassifier, PairClassifier, ThresholdClassifier,
};
use crate::algorithm::linkage::comparison::compare_pair;
use crate::algorithm::linkage::types::{
    CandidatePair, ClassificationMethod, ComparisonVector, LinkageResult, LinkageRow, LinkageTable,
};
use crate::config::LinkageConfig;
use crate::error::Result;
use crate::models::death::DeathTable;
use crate::models::discharge::DischargeTable;
use crate::utils::logging::{create_block_progress_bar, finish_and_clear, log_degraded_mode};

type Scored = (CandidatePair, ComparisonVector);

/// Probabilistic linker of death records to discharge-by-death records
#[derive(Debug, Clone)]
pub struct RecordLinker<C = EcmClassifier> {
    config: LinkageConfig,
    classifier: C,
}

impl RecordLinker<EcmClassifier> {
    /// Create a linker using the EM classifier configured in `config`
    ///
    /// # Errors
    /// Returns [`InvalidConfig`](crate::Error::InvalidConfig) if `config` does not validate
    pub fn new(config: LinkageConfig) -> Result<Self> {
        config.validate()?;
        let classifier = EcmClassifier::new(config.em.clone());
        Ok(Self { config, classifier })
    }
}

impl<C: PairClassifier> RecordLinker<C> {
    /// Replace the classification strategy
    #[must_use]
    pub fn with_classifier<D: PairClassifier>(self, classifier: D) -> RecordLinker<D> {
        RecordLinker {
            config: self.config,
            classifier,
        }
    }

    /// Get the linkage configuration
    #[must_use]
    pub const fn config(&self) -> &LinkageConfig {
        &self.config
    }

    /// Link the two tables
    ///
    /// Either table being empty, or no pair sharing a block, yields an empty
    /// result. Classifier failures fall back to the score threshold.
    #[must_use]
    pub fn link(&self, deaths: &DeathTable, discharges: &DischargeTable) -> LinkageResult {
        if deaths.is_empty() || discharges.is_empty() {
            info!(
                "Skipping linkage: {} death and {} discharge records",
                deaths.len(),
                discharges.len()
            );
            return LinkageResult::empty();
        }

        let start = Instant::now();
        let blocks = build_blocks(deaths, discharges);
        let pair_count: usize = blocks.iter().map(Block::pair_count).sum();
        info!(
            "Linking {} death and {} discharge records: {} blocks, {} candidate pairs",
            deaths.len(),
            discharges.len(),
            blocks.len(),
            pair_count
        );
        if pair_count == 0 {
            return LinkageResult::empty();
        }

        let mut scored = self.compare_blocks(&blocks, deaths, discharges);
        scored.sort_unstable_by_key(|(pair, _)| *pair);

        let vectors: Vec<ComparisonVector> = scored.iter().map(|(_, vector)| *vector).collect();
        let (decisions, method) = self.classify(&vectors);

        let table = assemble(&scored, &decisions, deaths, discharges);
        info!(
            "Linkage finished in {:?}: {} of {} pairs matched ({method:?})",
            start.elapsed(),
            table.iter().filter(|row| row.is_match).count(),
            table.len()
        );
        LinkageResult { table, method }
    }

    fn compare_blocks(
        &self,
        blocks: &[Block<'_>],
        deaths: &DeathTable,
        discharges: &DischargeTable,
    ) -> Vec<Scored> {
        let score_block = |block: &Block<'_>| -> Vec<Scored> {
            block
                .pairs()
                .map(|pair| (pair, compare_pair(pair, deaths, discharges, &self.config)))
                .collect()
        };

        let pb = create_block_progress_bar(blocks.len());
        let scored = if self.config.use_parallel && self.config.workers > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.workers)
                .build()
            {
                Ok(pool) => pool.install(|| {
                    blocks
                        .par_iter()
                        .progress_with(pb.clone())
                        .flat_map_iter(score_block)
                        .collect()
                }),
                Err(e) => {
                    log_degraded_mode("Block comparison", e, "sequential comparison");
                    blocks.iter().progress_with(pb.clone()).flat_map(score_block).collect()
                }
            }
        } else {
            blocks.iter().progress_with(pb.clone()).flat_map(score_block).collect()
        };
        finish_and_clear(&pb);
        scored
    }

    fn classify(&self, vectors: &[ComparisonVector]) -> (Vec<bool>, ClassificationMethod) {
        let outcome = self
            .classifier
            .fit_and_classify(vectors)
            .and_then(|decisions| {
                if decisions.len() == vectors.len() {
                    Ok(decisions)
                } else {
                    Err(ClassifierFailure::LengthMismatch {
                        expected: vectors.len(),
                        actual: decisions.len(),
                    })
                }
            });

        match outcome {
            Ok(decisions) => (decisions, ClassificationMethod::Classifier(self.classifier.name())),
            Err(failure) => {
                let fallback = ThresholdClassifier::new(self.config.fallback_threshold);
                log_degraded_mode(
                    "Linkage classification",
                    &failure,
                    &format!("score threshold {}", fallback.threshold),
                );
                (fallback.classify(vectors), ClassificationMethod::ThresholdFallback)
            }
        }
    }
}

/// Join decisions back to both records and sort by score, descending
///
/// `scored` must be in pair generation order; the sort is stable so ties keep
/// that order.
fn assemble(
    scored: &[Scored],
    decisions: &[bool],
    deaths: &DeathTable,
    discharges: &DischargeTable,
) -> LinkageTable {
    let mut rows: Vec<LinkageRow> = scored
        .iter()
        .zip(decisions)
        .map(|(&(pair, vector), &is_match)| {
            let death = &deaths[pair.death_idx];
            let discharge = &discharges[pair.discharge_idx];
            LinkageRow {
                death_idx: pair.death_idx,
                discharge_idx: pair.discharge_idx,
                is_match,
                score: vector.aggregate(),
                diagnosis_score: vector.diagnosis,
                age_score: vector.age,
                date_score: vector.date,
                death_municipality: death.municipality.clone(),
                death_year: death.year,
                death_sex: death.sex,
                death_age_years: death.age_years,
                death_date: death.death_date,
                death_diagnosis: death.diagnosis.clone(),
                discharge_municipality: discharge.municipality.clone(),
                discharge_year: discharge.year,
                discharge_sex: discharge.sex,
                discharge_age_years: discharge.age_years,
                discharge_date: discharge.discharge_date,
                discharge_diagnosis: discharge.diagnosis.clone(),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.score.total_cmp(&a.score));
    LinkageTable::new(rows)
}

/// Link two tables with the default EM classifier
///
/// # Errors
/// Returns [`InvalidConfig`](crate::Error::InvalidConfig) before any record is read if `config`
/// does not validate
pub fn link_records(
    deaths: &DeathTable,
    discharges: &DischargeTable,
    config: &LinkageConfig,
) -> Result<LinkageResult> {
    Ok(RecordLinker::new(config.clone())?.link(deaths, discharges))
}
