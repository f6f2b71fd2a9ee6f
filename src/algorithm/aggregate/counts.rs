//! Death counts by municipality and year

use std::collections::BTreeMap;

use arrow::datatypes::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

use crate::models::death::DeathTable;
use crate::models::table::Table;
use crate::models::traits::ArrowSchema;

/// Number of deaths in one municipality and year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathCount {
    /// Municipality of residence; `None` groups deaths without one
    pub municipality: Option<String>,
    pub year: i32,
    pub deaths: u64,
}

/// Death counts ordered by (municipality, year)
pub type DeathCountTable = Table<DeathCount>;

impl ArrowSchema for DeathCount {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("municipality", DataType::Utf8, true),
            Field::new("year", DataType::Int32, false),
            Field::new("deaths", DataType::UInt64, false),
        ])
    }
}

/// Count deaths by (municipality, year)
///
/// Deaths without a municipality are kept in their own group.
#[must_use]
pub fn aggregate_deaths(deaths: &DeathTable) -> DeathCountTable {
    let mut counts: BTreeMap<(Option<&str>, i32), u64> = BTreeMap::new();
    for record in deaths {
        *counts
            .entry((record.municipality.as_deref(), record.year))
            .or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((municipality, year), deaths)| DeathCount {
            municipality: municipality.map(str::to_string),
            year,
            deaths,
        })
        .collect()
}
