//! Utility functions and modules
//!
//! This module contains helpers shared across the crate: Arrow column access,
//! parquet IO and logging.

pub mod arrow;
pub mod io;
pub mod logging;
