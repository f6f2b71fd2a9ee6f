//! Trait definitions for table rows
//!
//! Every flat row type produced by the pipeline can be converted to and from
//! an Arrow `RecordBatch` with a fixed schema.

use std::sync::Arc;

use arrow::datatypes::{FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// A trait for rows that can be converted to and from Arrow `RecordBatch`.
///
/// Conversion goes through `serde_arrow` against the explicit schema, so the
/// written column types never depend on the sampled data (an empty table
/// still carries the full schema).
pub trait ArrowSchema: Serialize + DeserializeOwned + Sized {
    /// Get the Arrow schema for this row type
    fn schema() -> Schema;

    /// Convert a slice of rows to a `RecordBatch`
    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch> {
        let fields: Vec<FieldRef> = Self::schema().fields().iter().map(Arc::clone).collect();
        Ok(serde_arrow::to_record_batch(&fields, &rows)?)
    }

    /// Convert a `RecordBatch` written with [`ArrowSchema::schema`] back to rows
    fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        Ok(serde_arrow::from_record_batch(batch)?)
    }
}
