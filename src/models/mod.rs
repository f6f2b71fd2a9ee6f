//! Domain models for the pneumonia mortality pipeline
//!
//! This module contains the standardized tables exchanged between the table
//! builders, the record linker and the aggregator.

pub mod death;
pub mod discharge;
pub mod population;
pub mod table;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use death::{DeathRecord, DeathTable};
pub use discharge::{DischargeRecord, DischargeTable};
pub use population::{PopulationRecord, PopulationTable};
pub use table::Table;
pub use traits::ArrowSchema;
pub use types::{AgeGroup, RegistrySchema, Sex};
