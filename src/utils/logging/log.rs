//! Logging utilities
//!
//! This module provides standardized logging functions for pipeline stages
//! and file operations.

use std::fmt::Display;
use std::time::Duration;

/// Log an operation start with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `target` - File, directory or table being operated on
pub fn log_operation_start(operation: &str, target: impl Display) {
    log::info!("{operation} {target}");
}

/// Log an operation completion with consistent format
///
/// # Arguments
/// * `operation` - Past-tense verb, e.g. `Read` or `Built`
/// * `target` - File, directory or table that was operated on
/// * `records` - Number of records produced
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(
    operation: &str,
    target: impl Display,
    records: usize,
    elapsed: Option<Duration>,
) {
    let timing = elapsed.map(|d| format!(" in {d:?}")).unwrap_or_default();
    log::info!("{operation} {records} records from {target}{timing}");
}

/// Log an operation warning with consistent format
///
/// # Arguments
/// * `message` - Warning message
/// * `target` - Optional file or table related to the warning
pub fn log_warning(message: &str, target: Option<&dyn Display>) {
    if let Some(target) = target {
        log::warn!("{message}: {target}");
    } else {
        log::warn!("{message}");
    }
}

/// Log that a stage continued with a reduced strategy instead of failing
///
/// # Arguments
/// * `stage` - Pipeline stage that degraded
/// * `reason` - Why the preferred strategy could not run
/// * `fallback` - What is used instead
pub fn log_degraded_mode(stage: &str, reason: impl Display, fallback: &str) {
    log::warn!("{stage} running in degraded mode ({reason}); using {fallback}");
}
