//! Municipal population denominators

use arrow::datatypes::{DataType, Field, Schema};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::models::table::Table;
use crate::models::traits::ArrowSchema;

/// Resident population of one municipality in one year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRecord {
    /// Six-digit municipality code
    pub municipality: String,
    /// Reference year
    pub year: i32,
    /// Resident population
    pub population: u64,
}

/// Population table keyed by (municipality, year)
pub type PopulationTable = Table<PopulationRecord>;

impl ArrowSchema for PopulationRecord {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("municipality", DataType::Utf8, false),
            Field::new("year", DataType::Int32, false),
            Field::new("population", DataType::UInt64, false),
        ])
    }
}

/// Build a lookup from (municipality, year) to population
///
/// The first row for a key wins. Conflicting denominators are not reconciled.
#[must_use]
pub fn population_index(table: &PopulationTable) -> FxHashMap<(&str, i32), u64> {
    let mut index = FxHashMap::default();
    for record in table {
        index
            .entry((record.municipality.as_str(), record.year))
            .or_insert(record.population);
    }
    index
}
