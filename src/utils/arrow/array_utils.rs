//! Utilities for working with Arrow arrays.
//!
//! Raw registry batches arrive with inconsistent column types between
//! vintages (codes as integers in one year, strings in the next). Columns are
//! therefore located by alias and read through a cast to `Utf8`, leaving the
//! interpretation of each value to the field normalizers.

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::debug;

use crate::error::{Error, Result};
use crate::schema::columns::ColumnAliases;

/// Find the first column of a batch matching one of the aliases
///
/// # Returns
///
/// * `Some((name, array))` - The raw column name that matched and its array
/// * `None` - If none of the candidate names is present
#[must_use]
pub fn find_column(batch: &RecordBatch, aliases: &ColumnAliases) -> Option<(&'static str, ArrayRef)> {
    let schema = batch.schema();
    aliases.candidates.iter().find_map(|&name| {
        schema
            .index_of(name)
            .ok()
            .map(|idx| (name, batch.column(idx).clone()))
    })
}

/// Find the first column whose uppercased name starts with `prefix`
#[must_use]
pub fn find_column_with_prefix(batch: &RecordBatch, prefix: &str) -> Option<(String, ArrayRef)> {
    let schema = batch.schema();
    schema
        .fields()
        .iter()
        .position(|field| field.name().to_uppercase().starts_with(prefix))
        .map(|idx| (schema.field(idx).name().clone(), batch.column(idx).clone()))
}

/// Read any array as strings
///
/// Numbers become their decimal representation and dates their ISO form.
///
/// # Errors
///
/// Returns an error if Arrow cannot cast the column to `Utf8`.
pub fn as_string_array(array: &ArrayRef, column_name: &str) -> Result<StringArray> {
    let converted = if array.data_type() == &DataType::Utf8 {
        array.clone()
    } else {
        debug!(
            "Casting column '{column_name}' from {:?} to Utf8",
            array.data_type()
        );
        cast(array, &DataType::Utf8)?
    };

    converted
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| Error::InvalidDataType {
            column: column_name.to_string(),
            expected: "Utf8".to_string(),
        })
}

/// Locate a column by alias and read it as strings
///
/// # Returns
///
/// * `Ok(Some(array))` - The column was found and could be read
/// * `Ok(None)` - None of the aliases is present in the batch
pub fn string_column(batch: &RecordBatch, aliases: &ColumnAliases) -> Result<Option<StringArray>> {
    find_column(batch, aliases)
        .map(|(name, array)| as_string_array(&array, name))
        .transpose()
}

/// Locate a column that must be present and read it as strings
///
/// # Errors
///
/// Returns [`Error::ColumnNotFound`] if none of the aliases is present, or
/// the cast error if the column cannot be read.
pub fn required_string_column(batch: &RecordBatch, aliases: &ColumnAliases) -> Result<StringArray> {
    string_column(batch, aliases)?.ok_or_else(|| Error::ColumnNotFound {
        column: aliases.field.to_string(),
    })
}

/// Value of a string array at `row`, treating nulls and blank strings as missing
#[must_use]
pub fn string_value(array: &StringArray, row: usize) -> Option<&str> {
    if row >= array.len() || array.is_null(row) {
        return None;
    }
    let value = array.value(row).trim();
    (!value.is_empty()).then_some(value)
}

/// Value at `row` of an optional column
#[must_use]
pub fn optional_value(array: Option<&StringArray>, row: usize) -> Option<&str> {
    array.and_then(|a| string_value(a, row))
}
