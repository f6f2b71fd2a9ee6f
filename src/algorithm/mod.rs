//! Algorithm implementations for the mortality analysis
//!
//! - [`linkage`]: probabilistic linkage of deaths to hospital discharges
//! - [`aggregate`]: death counts, mortality rates and demographic profiles

pub mod aggregate;
pub mod linkage;
