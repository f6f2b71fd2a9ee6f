use chrono::NaiveDate;
use proptest::prelude::*;

use pneumo_linkage::algorithm::linkage::blocking::{death_block_key, discharge_block_key};
use pneumo_linkage::algorithm::linkage::{CandidatePair, build_blocks, candidate_pairs};
use pneumo_linkage::models::{
    AgeGroup, DeathRecord, DeathTable, DischargeRecord, DischargeTable, Sex,
};

/// Raw blocking fields: municipality choice, (year, month, day), sex choice
type Fields = (Option<usize>, Option<(i32, u32, u32)>, usize);

const MUNICIPALITIES: [&str; 3] = ["310620", "355030", "530010"];
const SEXES: [Sex; 3] = [Sex::Male, Sex::Female, Sex::Unknown];

fn fields() -> impl Strategy<Value = Fields> {
    (
        proptest::option::weighted(0.9, 0usize..MUNICIPALITIES.len()),
        proptest::option::weighted(0.9, (2021i32..=2022, 1u32..=3, 1u32..=28)),
        0usize..SEXES.len(),
    )
}

fn to_date(ymd: Option<(i32, u32, u32)>) -> Option<NaiveDate> {
    ymd.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
}

fn to_death((municipality, ymd, sex): Fields) -> DeathRecord {
    DeathRecord {
        municipality: municipality.map(|i| MUNICIPALITIES[i].to_string()),
        year: ymd.map_or(2022, |(y, _, _)| y),
        sex: SEXES[sex],
        age_years: Some(70.0),
        education: None,
        death_date: to_date(ymd),
        diagnosis: "J18".to_string(),
        age_group: AgeGroup::Age60To74,
    }
}

fn to_discharge((municipality, ymd, sex): Fields) -> DischargeRecord {
    DischargeRecord {
        municipality: municipality.map(|i| MUNICIPALITIES[i].to_string()),
        year: ymd.map_or(2022, |(y, _, _)| y),
        sex: SEXES[sex],
        age_years: Some(71.0),
        discharge_date: to_date(ymd),
        diagnosis: "J18".to_string(),
    }
}

/// Every (death, discharge) pair whose keys exist and are equal
fn all_pairs_with_equal_keys(
    deaths: &DeathTable,
    discharges: &DischargeTable,
) -> Vec<CandidatePair> {
    let mut pairs = Vec::new();
    for (death_idx, death) in deaths.iter().enumerate() {
        let Some(key) = death_block_key(death) else {
            continue;
        };
        for (discharge_idx, discharge) in discharges.iter().enumerate() {
            if discharge_block_key(discharge) == Some(key) {
                pairs.push(CandidatePair::new(death_idx, discharge_idx));
            }
        }
    }
    pairs
}

proptest! {
    #[test]
    fn blocking_matches_all_pairs_filter(
        raw_deaths in proptest::collection::vec(fields(), 0..25),
        raw_discharges in proptest::collection::vec(fields(), 0..25),
    ) {
        let deaths = DeathTable::new(raw_deaths.into_iter().map(to_death).collect());
        let discharges = DischargeTable::new(raw_discharges.into_iter().map(to_discharge).collect());

        let pairs = candidate_pairs(&deaths, &discharges);
        prop_assert_eq!(&pairs, &all_pairs_with_equal_keys(&deaths, &discharges));

        let mut deduped = pairs.clone();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), pairs.len());
    }

    #[test]
    fn blocks_have_both_sides_and_one_key(
        raw_deaths in proptest::collection::vec(fields(), 0..25),
        raw_discharges in proptest::collection::vec(fields(), 0..25),
    ) {
        let deaths = DeathTable::new(raw_deaths.into_iter().map(to_death).collect());
        let discharges = DischargeTable::new(raw_discharges.into_iter().map(to_discharge).collect());

        for block in build_blocks(&deaths, &discharges) {
            prop_assert!(!block.deaths.is_empty());
            prop_assert!(!block.discharges.is_empty());
            for &idx in &block.deaths {
                prop_assert_eq!(death_block_key(&deaths[idx]), Some(block.key));
            }
            for &idx in &block.discharges {
                prop_assert_eq!(discharge_block_key(&discharges[idx]), Some(block.key));
            }
        }
    }
}
