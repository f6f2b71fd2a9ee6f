//! Raw column names per registry
//!
//! Registry extracts change column names between data vintages. Each field
//! lists its known names in order of preference; the first one present in a
//! batch is used.

/// Known raw column names for one logical field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnAliases {
    /// Logical field name, used in log messages and empty-table reasons
    pub field: &'static str,
    /// Raw column names in order of preference
    pub candidates: &'static [&'static str],
}

impl ColumnAliases {
    /// Create an alias list
    #[must_use]
    pub const fn new(field: &'static str, candidates: &'static [&'static str]) -> Self {
        Self { field, candidates }
    }
}

/// Mortality registry (death certificate) columns
pub mod mortality {
    use super::ColumnAliases;

    /// Underlying cause of death
    pub const CAUSE: ColumnAliases = ColumnAliases::new("cause", &["CAUSABAS", "CB_PRE"]);
    /// Municipality of residence
    pub const MUNICIPALITY: ColumnAliases =
        ColumnAliases::new("municipality", &["CODMUNRES", "MUNCODDV", "MUNCOD"]);
    /// Date of death
    pub const DEATH_DATE: ColumnAliases = ColumnAliases::new("death_date", &["DTOBITO", "DT_OBITO"]);
    /// Sex
    pub const SEX: ColumnAliases = ColumnAliases::new("sex", &["SEXO"]);
    /// Decoded age in years
    pub const AGE: ColumnAliases = ColumnAliases::new("age", &["IDADE_ANOS"]);
    /// Education columns start with this prefix (`ESC`, `ESC2010`, ...)
    pub const EDUCATION_PREFIX: &str = "ESC";
}

/// Hospital discharge registry columns
pub mod discharge {
    use super::ColumnAliases;

    /// Hospitalization authorization type; only "1" (general) is kept
    pub const IDENT: ColumnAliases = ColumnAliases::new("ident", &["IDENT"]);
    /// In-hospital death flag
    pub const OUTCOME: ColumnAliases = ColumnAliases::new("outcome", &["MORTE"]);
    /// Principal diagnosis
    pub const DIAGNOSIS: ColumnAliases =
        ColumnAliases::new("diagnosis", &["DIAG_PRINC", "DIAG_PRINCIPAL"]);
    /// Municipality of residence
    pub const MUNICIPALITY: ColumnAliases = ColumnAliases::new("municipality", &["MUNIC_RES"]);
    /// Discharge date
    pub const DISCHARGE_DATE: ColumnAliases = ColumnAliases::new("discharge_date", &["DT_SAIDA"]);
    /// Sex
    pub const SEX: ColumnAliases = ColumnAliases::new("sex", &["SEXO"]);
    /// Birth date
    pub const BIRTH_DATE: ColumnAliases = ColumnAliases::new("birth_date", &["NASC"]);
    /// Reported age
    pub const AGE: ColumnAliases = ColumnAliases::new("age", &["IDADE"]);
}

/// Population table columns
pub mod population {
    use super::ColumnAliases;

    /// Municipality code
    pub const MUNICIPALITY: ColumnAliases =
        ColumnAliases::new("municipality", &["municipality", "CODMUNICIPIO", "mun6"]);
    /// Reference year
    pub const YEAR: ColumnAliases = ColumnAliases::new("year", &["year", "ANO", "ano"]);
    /// Resident population
    pub const POPULATION: ColumnAliases =
        ColumnAliases::new("population", &["population", "POPULACAO", "pop"]);
}
