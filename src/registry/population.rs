//! Municipal population estimates
//!
//! Population files come from several sources with their own column names.
//! Columns are resolved by alias, municipality codes are canonicalized, and
//! rows missing any of municipality, year or population are dropped.

use std::path::Path;

use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::models::population::{PopulationRecord, PopulationTable};
use crate::registry::{BuildOutcome, required_column};
use crate::schema::columns::population;
use crate::schema::normalize::{canonicalize_municipality, parse_number};
use crate::utils::arrow::string_value;
use crate::utils::io::read_parquet;
use crate::utils::logging::log_warning;

/// Build population rows from one batch
#[must_use]
pub fn build_population_table(batch: &RecordBatch) -> BuildOutcome<PopulationRecord> {
    let municipality = match required_column(batch, &population::MUNICIPALITY) {
        Ok(column) => column,
        Err(reason) => return BuildOutcome::empty(reason),
    };
    let year = match required_column(batch, &population::YEAR) {
        Ok(column) => column,
        Err(reason) => return BuildOutcome::empty(reason),
    };
    let count = match required_column(batch, &population::POPULATION) {
        Ok(column) => column,
        Err(reason) => return BuildOutcome::empty(reason),
    };

    let rows = (0..batch.num_rows())
        .filter_map(|row| {
            let municipality = canonicalize_municipality(string_value(&municipality, row))?;
            let year = parse_number(string_value(&year, row))
                .filter(|y| y.fract() == 0.0)
                .map(|y| y as i32)?;
            let population = parse_number(string_value(&count, row))
                .filter(|p| *p >= 0.0)
                .map(|p| p.round() as u64)?;
            Some(PopulationRecord {
                municipality,
                year,
                population,
            })
        })
        .collect();

    BuildOutcome::from_rows(rows)
}

/// Load a population table from a parquet file
///
/// A missing file yields an empty table: every rate is then null.
///
/// # Errors
/// Returns an error if the file exists but cannot be read
pub fn load_population_table(path: &Path) -> Result<PopulationTable> {
    if !path.is_file() {
        log_warning("No population table found, rates will be null", Some(&path.display()));
        return Ok(PopulationTable::empty());
    }

    let tables: Vec<PopulationTable> = read_parquet(path)?
        .iter()
        .filter_map(|batch| match build_population_table(batch) {
            BuildOutcome::Built(table) => Some(table),
            BuildOutcome::Empty { reason } => {
                log_warning(&format!("Population batch skipped ({reason})"), Some(&path.display()));
                None
            }
        })
        .collect();

    Ok(PopulationTable::concat(tables))
}
