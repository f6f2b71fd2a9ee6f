//! Registry table builders
//!
//! This module turns raw registry batches into the standardized tables used
//! by the linker and the aggregator:
//! - Mortality registry: death certificates ([`mortality`])
//! - Hospital discharge registry: discharge-by-death episodes ([`discharge`])
//! - Municipal population estimates ([`population`])
//!
//! A batch that lacks a required column is an expected condition between data
//! vintages. Builders report it as [`BuildOutcome::Empty`] with a reason
//! instead of failing the run.

pub mod discharge;
pub mod mortality;
pub mod population;

use std::fmt;
use std::path::Path;
use std::time::Instant;

use arrow::array::StringArray;
use arrow::record_batch::RecordBatch;

use crate::error::{Error, Result};
use crate::models::table::Table;
use crate::schema::columns::ColumnAliases;
use crate::utils::arrow::{
    as_string_array, find_column_with_prefix, required_string_column, string_column,
};
use crate::utils::io::{
    YearSource, get_available_year_sources, load_parquet_files_parallel, read_parquet,
};
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

pub use discharge::{DischargeRegister, build_discharge_table};
pub use mortality::{MortalityRegister, build_death_table};
pub use population::{build_population_table, load_population_table};

/// Why a builder produced no rows for a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// None of the known column names for a required field is present
    MissingColumn { field: &'static str },
    /// A required column is present but cannot be read as text
    UnreadableColumn { field: &'static str },
    /// Every row was filtered out
    NoMatchingRows,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn { field } => write!(f, "missing required column for '{field}'"),
            Self::UnreadableColumn { field } => write!(f, "unreadable column for '{field}'"),
            Self::NoMatchingRows => f.write_str("no rows matched the filters"),
        }
    }
}

/// Result of building a standardized table from one raw batch
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome<R> {
    /// At least one row survived the filters
    Built(Table<R>),
    /// No rows, and why
    Empty { reason: EmptyReason },
}

impl<R> BuildOutcome<R> {
    /// Wrap filtered rows, reporting `NoMatchingRows` when there are none
    #[must_use]
    pub fn from_rows(rows: Vec<R>) -> Self {
        if rows.is_empty() {
            Self::Empty {
                reason: EmptyReason::NoMatchingRows,
            }
        } else {
            Self::Built(Table::new(rows))
        }
    }

    /// Shorthand for an empty outcome
    #[must_use]
    pub const fn empty(reason: EmptyReason) -> Self {
        Self::Empty { reason }
    }

    /// The built table, or an empty one
    #[must_use]
    pub fn into_table(self) -> Table<R> {
        match self {
            Self::Built(table) => table,
            Self::Empty { .. } => Table::empty(),
        }
    }

    /// Reason for an empty outcome
    #[must_use]
    pub const fn reason(&self) -> Option<&EmptyReason> {
        match self {
            Self::Built(_) => None,
            Self::Empty { reason } => Some(reason),
        }
    }
}

/// One raw registry batch together with the registry year it belongs to
#[derive(Debug, Clone)]
pub struct RegistryBatch {
    /// Registry year
    pub year: i32,
    /// Raw columns as extracted
    pub batch: RecordBatch,
}

/// Locate a required column and read it as text
pub(crate) fn required_column(
    batch: &RecordBatch,
    aliases: &ColumnAliases,
) -> std::result::Result<StringArray, EmptyReason> {
    required_string_column(batch, aliases).map_err(|e| match e {
        Error::ColumnNotFound { .. } => EmptyReason::MissingColumn {
            field: aliases.field,
        },
        other => {
            log::debug!("Column for '{}' unreadable: {other}", aliases.field);
            EmptyReason::UnreadableColumn {
                field: aliases.field,
            }
        }
    })
}

/// Locate an optional column and read it as text
///
/// An absent or unreadable column projects to missing values.
pub(crate) fn optional_column(batch: &RecordBatch, aliases: &ColumnAliases) -> Option<StringArray> {
    string_column(batch, aliases).unwrap_or_else(|e| {
        log_warning(
            &format!("Ignoring unreadable column for '{}'", aliases.field),
            Some(&e),
        );
        None
    })
}

/// Locate the first column named with `prefix` and read it as text
///
/// Like [`optional_column`], an unreadable column is logged and ignored.
pub(crate) fn optional_prefixed_column(
    batch: &RecordBatch,
    prefix: &str,
    field: &str,
) -> Option<StringArray> {
    let (name, array) = find_column_with_prefix(batch, prefix)?;
    as_string_array(&array, &name)
        .map_err(|e| {
            log_warning(
                &format!("Ignoring unreadable column '{name}' for '{field}'"),
                Some(&e),
            );
        })
        .ok()
}

/// A registry whose raw batches build into a standardized table
pub trait RegisterLoader: Send + Sync {
    /// Standardized row type
    type Record: Send;

    /// Get the name of the register
    fn get_register_name(&self) -> &'static str;

    /// Build standardized rows from one raw batch
    fn build(&self, batch: &RecordBatch, year: i32) -> BuildOutcome<Self::Record>;

    /// Build and concatenate many batches, logging every empty outcome
    fn build_all(&self, batches: &[RegistryBatch]) -> Table<Self::Record> {
        let tables = batches.iter().filter_map(|raw| match self.build(&raw.batch, raw.year) {
            BuildOutcome::Built(table) => Some(table),
            BuildOutcome::Empty { reason } => {
                log::info!(
                    "{} batch for {} produced no rows: {reason}",
                    self.get_register_name(),
                    raw.year
                );
                None
            }
        });
        Table::concat(tables)
    }

    /// Read the raw batches for the requested years below `base_path`
    ///
    /// An empty `years` slice reads every year present.
    fn load_batches(&self, base_path: &Path, years: &[i32]) -> Result<Vec<RegistryBatch>> {
        let sources = get_available_year_sources(base_path, years);
        if sources.is_empty() {
            log_warning(
                &format!("No {} extracts found", self.get_register_name()),
                Some(&base_path.display()),
            );
        }

        let mut batches = Vec::new();
        for (year, source) in sources {
            log::debug!(
                "Reading {} extract for {year} from {}",
                self.get_register_name(),
                source.path().display()
            );
            let raw = match &source {
                YearSource::Directory(dir) => load_parquet_files_parallel(dir)?,
                YearSource::File(file) => read_parquet(file)?,
            };
            batches.extend(raw.into_iter().map(|batch| RegistryBatch { year, batch }));
        }
        Ok(batches)
    }

    /// Read and build the standardized table for the requested years
    fn load(&self, base_path: &Path, years: &[i32]) -> Result<Table<Self::Record>> {
        let start = Instant::now();
        log_operation_start(
            &format!("Loading {} registry from", self.get_register_name()),
            base_path.display(),
        );

        let batches = self.load_batches(base_path, years)?;
        let table = self.build_all(&batches);

        log_operation_complete("Built", base_path.display(), table.len(), Some(start.elapsed()));
        Ok(table)
    }
}
