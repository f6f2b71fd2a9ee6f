//! Common domain type definitions
//!
//! This module contains the small enums shared by the standardized death and
//! discharge tables. They serialize as their short string labels so the
//! tables stay flat when written to Arrow.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Source registry whose coding conventions a raw value follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrySchema {
    /// Mortality registry (death certificates)
    Mortality,
    /// Hospital discharge registry
    Discharge,
}

impl RegistrySchema {
    /// Numeric code used for female sex in this registry
    #[must_use]
    pub const fn female_code(self) -> i64 {
        match self {
            Self::Mortality => 2,
            Self::Discharge => 3,
        }
    }
}

/// Standardized sex of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sex {
    /// Male
    Male,
    /// Female
    Female,
    /// Ignored, missing or not coded
    Unknown,
}

impl Sex {
    /// Short label written to output tables
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Unknown => "U",
        }
    }

    /// Parse a label previously produced by [`Sex::as_str`]
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "M" => Self::Male,
            "F" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Sex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// Age group used in the demographic death profiles
///
/// Each bucket is a half-open interval in years. `Unknown` collects records
/// without a usable age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeGroup {
    /// [0, 1)
    Infant,
    /// [1, 5)
    Age1To4,
    /// [5, 15)
    Age5To14,
    /// [15, 25)
    Age15To24,
    /// [25, 45)
    Age25To44,
    /// [45, 60)
    Age45To59,
    /// [60, 75)
    Age60To74,
    /// [75, ∞)
    Age75Plus,
    /// Missing or invalid age
    Unknown,
}

impl AgeGroup {
    /// All groups in display order
    pub const ALL: [Self; 9] = [
        Self::Infant,
        Self::Age1To4,
        Self::Age5To14,
        Self::Age15To24,
        Self::Age25To44,
        Self::Age45To59,
        Self::Age60To74,
        Self::Age75Plus,
        Self::Unknown,
    ];

    /// Half-open `[lower, upper)` age interval in years; `None` for `Unknown`
    #[must_use]
    pub const fn bounds(self) -> Option<(f64, f64)> {
        match self {
            Self::Infant => Some((0.0, 1.0)),
            Self::Age1To4 => Some((1.0, 5.0)),
            Self::Age5To14 => Some((5.0, 15.0)),
            Self::Age15To24 => Some((15.0, 25.0)),
            Self::Age25To44 => Some((25.0, 45.0)),
            Self::Age45To59 => Some((45.0, 60.0)),
            Self::Age60To74 => Some((60.0, 75.0)),
            Self::Age75Plus => Some((75.0, f64::INFINITY)),
            Self::Unknown => None,
        }
    }

    /// Whether `age` falls in this group's interval
    #[must_use]
    pub fn contains(self, age: f64) -> bool {
        self.bounds()
            .is_some_and(|(lower, upper)| age >= lower && age < upper)
    }

    /// Label written to output tables
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Infant => "<1",
            Self::Age1To4 => "1-4",
            Self::Age5To14 => "5-14",
            Self::Age15To24 => "15-24",
            Self::Age25To44 => "25-44",
            Self::Age45To59 => "45-59",
            Self::Age60To74 => "60-74",
            Self::Age75Plus => "75+",
            Self::Unknown => "Unknown",
        }
    }

    /// Inverse of [`AgeGroup::label`]; unrecognized labels map to `Unknown`
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|group| group.label() == label)
            .unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for AgeGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for AgeGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}
