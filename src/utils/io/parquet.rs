//! Parquet file operations
//!
//! This module provides utilities for reading the raw registry extracts and
//! population tables, and for writing output tables atomically: each file is
//! written under a temporary name and renamed into place only once complete.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Suffix appended to files while they are being written
pub const TEMP_SUFFIX: &str = "tmp";

/// Helper function to get batch size from environment
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var("PARQUET_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
}

/// Validates that a directory exists and is a directory
///
/// # Errors
/// Returns an error if the directory does not exist or is not a directory
pub fn validate_directory(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(Error::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "directory does not exist"),
        ));
    }
    Ok(())
}

/// Read a parquet file into Arrow record batches
///
/// # Errors
/// Returns an error if the file cannot be opened or if the Parquet file is invalid
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_operation_start("Reading parquet file", path.display());

    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(get_batch_size().unwrap_or(DEFAULT_BATCH_SIZE))
        .build()?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;

    let rows = batches.iter().map(RecordBatch::num_rows).sum();
    log_operation_complete("Read", path.display(), rows, Some(start.elapsed()));
    Ok(batches)
}

/// Find all Parquet files in a directory, sorted by name
///
/// # Errors
/// Returns an error if the directory cannot be read
pub fn find_parquet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    validate_directory(dir)?;

    let parquet_files = fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()).map_err(|e| Error::io(dir, e)))
        .filter_ok(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "parquet"))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .sorted()
        .collect_vec();

    if parquet_files.is_empty() {
        log_warning("No Parquet files found in directory", Some(&dir.display()));
    }

    Ok(parquet_files)
}

/// Load all parquet files from a directory in parallel
///
/// Batches keep the file-name order of [`find_parquet_files`], so repeated
/// runs see records in the same order.
///
/// # Errors
/// Returns an error if the directory cannot be read or any file is invalid
pub fn load_parquet_files_parallel(dir: &Path) -> Result<Vec<RecordBatch>> {
    let parquet_files = find_parquet_files(dir)?;
    if parquet_files.is_empty() {
        return Ok(Vec::new());
    }

    let per_file: Vec<Result<Vec<RecordBatch>>> = parquet_files
        .par_iter()
        .map(|path| read_parquet(path))
        .collect();

    let mut combined = Vec::new();
    for batches in per_file {
        combined.extend(batches?);
    }

    log::info!(
        "Loaded {} batches from {} Parquet files in {}",
        combined.len(),
        parquet_files.len(),
        dir.display()
    );
    Ok(combined)
}

/// Temporary sibling path used while `path` is being written
#[must_use]
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

/// Write through a temporary file and move it into place when `write` succeeds
///
/// On any failure the temporary file is removed and `path` is left untouched.
fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(File) -> Result<()>,
{
    let tmp = temp_path(path);
    let result = File::create(&tmp)
        .map_err(|e| Error::io(&tmp, e))
        .and_then(write)
        .and_then(|()| fs::rename(&tmp, path).map_err(|e| Error::io(path, e)));

    if result.is_err() && tmp.exists() {
        if let Err(e) = fs::remove_file(&tmp) {
            log_warning(&format!("Failed to remove temporary file ({e})"), Some(&tmp.display()));
        }
    }
    result
}

/// Write a record batch to a parquet file atomically
///
/// # Errors
/// Returns an error if the file cannot be created, written or renamed
pub fn write_parquet_atomic(path: &Path, batch: &RecordBatch) -> Result<()> {
    let start = Instant::now();
    log_operation_start("Writing parquet file", path.display());

    write_atomic(path, |file| {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(batch)?;
        writer.close()?;
        Ok(())
    })?;

    log::info!(
        "Wrote {} rows to {} in {:?}",
        batch.num_rows(),
        path.display(),
        start.elapsed()
    );
    Ok(())
}

/// Write a value as pretty-printed JSON atomically
///
/// # Errors
/// Returns an error if the file cannot be created, written or renamed
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, |file| {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush().map_err(|e| Error::io(path, e))?;
        Ok(())
    })
}
