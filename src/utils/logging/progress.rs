//! Progress reporting for the long-running pipeline stages
//!
//! Bars draw to stderr through indicatif, which hides them when stderr is not
//! a terminal.

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Template of the block comparison bar
pub const BLOCK_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} blocks ({per_sec}) {msg}";

/// Template of the input loading spinner
pub const LOAD_TEMPLATE: &str = "{spinner:.green} {elapsed_precise} {msg}";

/// Linkage runs with fewer blocks than this get a hidden bar
pub const MIN_BLOCKS_FOR_BAR: usize = 64;

/// Create the progress bar of the block comparison stage
///
/// # Arguments
/// * `blocks` - Number of blocks to compare
#[must_use]
pub fn create_block_progress_bar(blocks: usize) -> ProgressBar {
    if blocks < MIN_BLOCKS_FOR_BAR {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(blocks as u64);
    if let Ok(style) = ProgressStyle::with_template(BLOCK_TEMPLATE) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message("comparing candidate pairs");
    pb
}

/// Create a spinner shown while registry extracts are read from `input_dir`
#[must_use]
pub fn create_load_spinner(input_dir: &Path) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template(LOAD_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(format!("loading {}", input_dir.display()));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a progress bar with an optional final message
pub fn finish_progress_bar(pb: &ProgressBar, message: Option<&str>) {
    if let Some(msg) = message {
        pb.finish_with_message(msg.to_string());
    } else {
        pb.finish();
    }
}

/// Finish and clear a progress bar
pub fn finish_and_clear(pb: &ProgressBar) {
    pb.finish_and_clear();
}
