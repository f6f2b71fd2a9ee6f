//! Death counts, mortality rates and demographic profiles
//!
//! Everything here depends only on the standardized death table and the
//! population table; it is independent of the record linkage.

pub mod counts;
pub mod profiles;
pub mod rates;

pub use counts::{DeathCount, DeathCountTable, aggregate_deaths};
pub use profiles::{
    MISSING_LABEL, ProfileDimension, ProfileRow, ProfileTable, YearTotal, build_profile,
    build_profiles, summarize_profile,
};
pub use rates::{
    MortalityRate, RateTable, YearRateSummary, compute_rates, mortality_rate,
    summarize_rates_by_year,
};
