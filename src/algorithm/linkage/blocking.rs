//! Candidate pair generation by blocking
//!
//! Only records sharing municipality, year-month and sex are ever compared.
//! Records without a municipality or without a date have no key and can
//! never be part of a candidate pair.

use std::collections::hash_map::Entry;

use chrono::Datelike;
use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use smallvec::{SmallVec, smallvec};

use crate::algorithm::linkage::types::{BlockKey, CandidatePair};
use crate::models::death::{DeathRecord, DeathTable};
use crate::models::discharge::{DischargeRecord, DischargeTable};
use crate::models::types::Sex;

/// Row indices of one side of a block; most blocks are small
pub type BlockRows = SmallVec<[usize; 4]>;

/// Death and discharge rows sharing one blocking key
#[derive(Debug, Clone, PartialEq)]
pub struct Block<'a> {
    pub key: BlockKey<'a>,
    /// Death rows in table order
    pub deaths: BlockRows,
    /// Discharge rows in table order
    pub discharges: BlockRows,
}

impl Block<'_> {
    /// Number of candidate pairs in the block
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.deaths.len() * self.discharges.len()
    }

    /// Every pair of the block in generation order
    pub fn pairs(&self) -> impl Iterator<Item = CandidatePair> + '_ {
        self.deaths.iter().flat_map(move |&death_idx| {
            self.discharges
                .iter()
                .map(move |&discharge_idx| CandidatePair::new(death_idx, discharge_idx))
        })
    }
}

fn block_key(municipality: Option<&str>, date: Option<NaiveDate>, sex: Sex) -> Option<BlockKey<'_>> {
    let municipality = municipality?;
    let date = date?;
    Some(BlockKey {
        municipality,
        year: date.year(),
        month: date.month(),
        sex,
    })
}

/// Blocking key of a death record
#[must_use]
pub fn death_block_key(record: &DeathRecord) -> Option<BlockKey<'_>> {
    block_key(record.municipality.as_deref(), record.death_date, record.sex)
}

/// Blocking key of a discharge record
#[must_use]
pub fn discharge_block_key(record: &DischargeRecord) -> Option<BlockKey<'_>> {
    block_key(record.municipality.as_deref(), record.discharge_date, record.sex)
}

/// Partition both tables into blocks with at least one record on each side
///
/// Blocks are ordered by their first death row, so iterating blocks and then
/// [`Block::pairs`] visits pairs in (death row, discharge row) order.
#[must_use]
pub fn build_blocks<'a>(deaths: &'a DeathTable, discharges: &'a DischargeTable) -> Vec<Block<'a>> {
    let mut discharge_rows: FxHashMap<BlockKey<'a>, BlockRows> = FxHashMap::default();
    for (idx, record) in discharges.iter().enumerate() {
        if let Some(key) = discharge_block_key(record) {
            discharge_rows.entry(key).or_default().push(idx);
        }
    }

    let mut blocks: Vec<Block<'a>> = Vec::new();
    let mut positions: FxHashMap<BlockKey<'a>, usize> = FxHashMap::default();
    for (idx, record) in deaths.iter().enumerate() {
        let Some(key) = death_block_key(record) else {
            continue;
        };
        let Some(candidates) = discharge_rows.get(&key) else {
            continue;
        };
        match positions.entry(key) {
            Entry::Occupied(position) => blocks[*position.get()].deaths.push(idx),
            Entry::Vacant(position) => {
                position.insert(blocks.len());
                blocks.push(Block {
                    key,
                    deaths: smallvec![idx],
                    discharges: candidates.clone(),
                });
            }
        }
    }

    log::debug!(
        "Blocking produced {} blocks from {} death and {} discharge records",
        blocks.len(),
        deaths.len(),
        discharges.len()
    );
    blocks
}

/// All candidate pairs in generation order
#[must_use]
pub fn candidate_pairs(deaths: &DeathTable, discharges: &DischargeTable) -> Vec<CandidatePair> {
    let mut pairs: Vec<CandidatePair> = build_blocks(deaths, discharges)
        .iter()
        .flat_map(|block| block.pairs())
        .collect();
    pairs.sort_unstable();
    pairs
}
