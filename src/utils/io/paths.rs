//! Discovery of per-year registry extracts
//!
//! Raw extracts are laid out one year per entry below a registry directory,
//! either as a `<year>/` directory of parquet files or a single
//! `<year>.parquet` file.

use std::path::{Path, PathBuf};

use itertools::Itertools;

/// Where the raw extract for one registry year lives
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum YearSource {
    /// A directory of parquet files
    Directory(PathBuf),
    /// A single parquet file
    File(PathBuf),
}

impl YearSource {
    /// Path of the directory or file
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(path) | Self::File(path) => path,
        }
    }
}

fn year_of(path: &Path) -> Option<(i32, YearSource)> {
    if path.is_dir() {
        let year = path.file_name()?.to_str()?.parse::<i32>().ok()?;
        return Some((year, YearSource::Directory(path.to_path_buf())));
    }
    if path.is_file() && path.extension().is_some_and(|ext| ext == "parquet") {
        let year = path.file_stem()?.to_str()?.parse::<i32>().ok()?;
        return Some((year, YearSource::File(path.to_path_buf())));
    }
    None
}

/// Get the available year sources in a registry directory
///
/// Only the requested years are returned; an empty `years` slice selects
/// every year found. Results are ordered by year. A missing directory yields
/// no sources.
#[must_use]
pub fn get_available_year_sources(dir: &Path, years: &[i32]) -> Vec<(i32, YearSource)> {
    if !dir.exists() {
        return Vec::new();
    }

    std::fs::read_dir(dir)
        .ok()
        .map(|entries| {
            entries
                .filter_map(|res: std::io::Result<std::fs::DirEntry>| res.ok())
                .filter_map(|entry| year_of(&entry.path()))
                .filter(|(year, _)| years.is_empty() || years.contains(year))
                .sorted()
                .collect()
        })
        .unwrap_or_default()
}
