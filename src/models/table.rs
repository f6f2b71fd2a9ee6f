//! Immutable, index-addressable tables of standardized records

use std::ops::Index;

use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::models::traits::ArrowSchema;

/// An ordered table of rows
///
/// Row positions are the record indices reported by the linker, so a table is
/// never reordered once it has been built.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<R> {
    rows: Vec<R>,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R> Table<R> {
    /// Create a table from rows
    #[must_use]
    pub const fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    /// Create an empty table
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at `index`, if any
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&R> {
        self.rows.get(index)
    }

    /// Iterate over rows in table order
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    /// Borrow the rows
    #[must_use]
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Concatenate tables, keeping the order of the inputs
    #[must_use]
    pub fn concat(tables: impl IntoIterator<Item = Self>) -> Self {
        let rows = tables.into_iter().flat_map(|table| table.rows).collect();
        Self { rows }
    }
}

impl<R: ArrowSchema> Table<R> {
    /// Convert the table to a `RecordBatch`
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        R::to_record_batch(&self.rows)
    }

    /// Read a table back from a `RecordBatch`
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        Ok(Self::new(R::from_record_batch(batch)?))
    }
}

impl<R> Index<usize> for Table<R> {
    type Output = R;

    fn index(&self, index: usize) -> &Self::Output {
        &self.rows[index]
    }
}

impl<R> FromIterator<R> for Table<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a, R> IntoIterator for &'a Table<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
