//! Arrow data handling utilities
//!
//! This module contains helpers for locating columns in raw registry batches
//! and reading their values independent of the stored Arrow type.

pub mod array_utils;

// Re-export commonly used functions for convenience
pub use array_utils::{
    as_string_array, find_column, find_column_with_prefix, optional_value, required_string_column,
    string_column,
    string_value,
};
