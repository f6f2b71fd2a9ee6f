//! Population-normalized mortality rates

use std::collections::BTreeMap;

use arrow::datatypes::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

use crate::algorithm::aggregate::counts::DeathCountTable;
use crate::models::population::{PopulationTable, population_index};
use crate::models::table::Table;
use crate::models::traits::ArrowSchema;

/// Rates are expressed per this many residents
pub const RATE_BASE: f64 = 100_000.0;

/// Mortality rate of one municipality and year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortalityRate {
    pub municipality: Option<String>,
    pub year: i32,
    pub deaths: u64,
    /// Resident population; `None` when no denominator is known
    pub population: Option<u64>,
    /// Deaths per 100,000 residents; `None` without a positive population
    pub rate_per_100k: Option<f64>,
}

/// Rate table ordered by (year, municipality)
pub type RateTable = Table<MortalityRate>;

impl ArrowSchema for MortalityRate {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("municipality", DataType::Utf8, true),
            Field::new("year", DataType::Int32, false),
            Field::new("deaths", DataType::UInt64, false),
            Field::new("population", DataType::UInt64, true),
            Field::new("rate_per_100k", DataType::Float64, true),
        ])
    }
}

/// Deaths per 100,000 residents, `None` when population is missing or zero
#[must_use]
pub fn mortality_rate(deaths: u64, population: Option<u64>) -> Option<f64> {
    population
        .filter(|&p| p > 0)
        .map(|p| deaths as f64 / p as f64 * RATE_BASE)
}

/// Join death counts with population and compute rates
///
/// Every count row is kept; counts without a population row get a null
/// population and rate.
#[must_use]
pub fn compute_rates(counts: &DeathCountTable, population: &PopulationTable) -> RateTable {
    let index = population_index(population);

    let mut rates: Vec<MortalityRate> = counts
        .iter()
        .map(|count| {
            let population = count
                .municipality
                .as_deref()
                .and_then(|municipality| index.get(&(municipality, count.year)).copied());
            MortalityRate {
                municipality: count.municipality.clone(),
                year: count.year,
                deaths: count.deaths,
                population,
                rate_per_100k: mortality_rate(count.deaths, population),
            }
        })
        .collect();

    rates.sort_by(|a, b| (a.year, &a.municipality).cmp(&(b.year, &b.municipality)));
    RateTable::new(rates)
}

/// Yearly totals of a rate table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRateSummary {
    pub year: i32,
    /// Total deaths
    pub deaths: u64,
    /// Total known population
    pub population: u64,
    /// Mean of the non-null municipal rates, rounded to two decimals
    pub mean_rate_per_100k: Option<f64>,
}

impl ArrowSchema for YearRateSummary {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("year", DataType::Int32, false),
            Field::new("deaths", DataType::UInt64, false),
            Field::new("population", DataType::UInt64, false),
            Field::new("mean_rate_per_100k", DataType::Float64, true),
        ])
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Summarize a rate table by year
#[must_use]
pub fn summarize_rates_by_year(rates: &RateTable) -> Table<YearRateSummary> {
    let mut by_year: BTreeMap<i32, (u64, u64, f64, usize)> = BTreeMap::new();
    for rate in rates {
        let entry = by_year.entry(rate.year).or_default();
        entry.0 += rate.deaths;
        entry.1 += rate.population.unwrap_or(0);
        if let Some(r) = rate.rate_per_100k {
            entry.2 += r;
            entry.3 += 1;
        }
    }

    by_year
        .into_iter()
        .map(|(year, (deaths, population, rate_sum, rate_count))| YearRateSummary {
            year,
            deaths,
            population,
            mean_rate_per_100k: (rate_count > 0).then(|| round2(rate_sum / rate_count as f64)),
        })
        .collect()
}
