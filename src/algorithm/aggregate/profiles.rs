//! Demographic death profiles
//!
//! A profile counts deaths by year and one demographic dimension. Missing
//! values of every dimension (unknown age, unknown sex, absent education) are
//! kept in one group labelled [`MISSING_LABEL`].

use std::collections::BTreeMap;
use std::fmt;

use arrow::datatypes::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

use crate::models::death::{DeathRecord, DeathTable};
use crate::models::table::Table;
use crate::models::traits::ArrowSchema;
use crate::models::types::{AgeGroup, Sex};

/// Label of the group collecting missing dimension values
pub const MISSING_LABEL: &str = "missing";

/// Dimension a profile is broken down by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileDimension {
    AgeGroup,
    Sex,
    Education,
}

impl ProfileDimension {
    /// All dimensions in output order
    pub const ALL: [Self; 3] = [Self::AgeGroup, Self::Sex, Self::Education];

    /// Name used in file names and logs
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AgeGroup => "age_group",
            Self::Sex => "sex",
            Self::Education => "education",
        }
    }

    fn value_of(self, record: &DeathRecord) -> ProfileValue<'_> {
        match self {
            Self::AgeGroup => ProfileValue::Age(record.age_group),
            Self::Sex => ProfileValue::Sex(record.sex),
            Self::Education => ProfileValue::Education(record.education.as_deref()),
        }
    }
}

impl fmt::Display for ProfileDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sortable value of a dimension; groups order by the value, not the label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ProfileValue<'a> {
    Age(AgeGroup),
    Sex(Sex),
    Education(Option<&'a str>),
}

impl ProfileValue<'_> {
    fn label(self) -> String {
        match self {
            Self::Age(AgeGroup::Unknown) | Self::Sex(Sex::Unknown) | Self::Education(None) => {
                MISSING_LABEL.to_string()
            }
            Self::Age(group) => group.label().to_string(),
            Self::Sex(sex) => sex.as_str().to_string(),
            Self::Education(Some(level)) => level.to_string(),
        }
    }
}

/// Deaths in one year with one dimension value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub year: i32,
    /// Dimension value label, or [`MISSING_LABEL`]
    pub value: String,
    pub deaths: u64,
}

/// Profile table ordered by (year, dimension value)
pub type ProfileTable = Table<ProfileRow>;

impl ArrowSchema for ProfileRow {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("year", DataType::Int32, false),
            Field::new("value", DataType::Utf8, false),
            Field::new("deaths", DataType::UInt64, false),
        ])
    }
}

/// Count deaths by (year, dimension value)
#[must_use]
pub fn build_profile(deaths: &DeathTable, dimension: ProfileDimension) -> ProfileTable {
    let mut counts: BTreeMap<(i32, ProfileValue<'_>), u64> = BTreeMap::new();
    for record in deaths {
        *counts.entry((record.year, dimension.value_of(record))).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((year, value), deaths)| ProfileRow {
            year,
            value: value.label(),
            deaths,
        })
        .collect()
}

/// Build every profile
#[must_use]
pub fn build_profiles(deaths: &DeathTable) -> Vec<(ProfileDimension, ProfileTable)> {
    ProfileDimension::ALL
        .into_iter()
        .map(|dimension| (dimension, build_profile(deaths, dimension)))
        .collect()
}

/// Total deaths in one year of a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearTotal {
    /// Profile dimension name
    pub profile: String,
    pub year: i32,
    pub deaths: u64,
}

impl ArrowSchema for YearTotal {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("profile", DataType::Utf8, false),
            Field::new("year", DataType::Int32, false),
            Field::new("deaths", DataType::UInt64, false),
        ])
    }
}

/// Sum a profile over its dimension values
#[must_use]
pub fn summarize_profile(dimension: ProfileDimension, profile: &ProfileTable) -> Table<YearTotal> {
    let mut totals: BTreeMap<i32, u64> = BTreeMap::new();
    for row in profile {
        *totals.entry(row.year).or_default() += row.deaths;
    }
    totals
        .into_iter()
        .map(|(year, deaths)| YearTotal {
            profile: dimension.name().to_string(),
            year,
            deaths,
        })
        .collect()
}
