//! Analysis configuration.
//!
//! Every literal the analysis depends on lives here as a named structure
//! passed explicitly into the transformations: the bloc exclusion set, the
//! policy series, and the years and country of interest.
//!
//! A configuration file is plain JSON. It is validated against the embedded
//! `schemas/analysis-config.json` before being deserialized, and any field
//! left out falls back to [`AnalysisConfig::default`].
//!
//! ```json
//! {
//!   "referenceYear": 2019,
//!   "focusCountry": "IRL",
//!   "exclusions": ["OECD", "EU28"],
//!   "policy": { "name": "Corporate tax rate", "unit": "%", "points": { "1994": 40 } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::models::Measure;
use crate::validation::validate_analysis_config;

/// Aggregate pseudo-countries present in the OECD GDP export.
pub const DEFAULT_BLOC_CODES: [&str; 5] = ["OECD", "OECDE", "EU28", "EU27_2020", "EA19"];

/// Irish corporate tax rate (%) by year.
pub const IRISH_CORPORATE_TAX_RATES: [(i32, f64); 9] = [
    (1994, 40.0),
    (1996, 38.0),
    (1997, 36.0),
    (1998, 32.0),
    (1999, 28.0),
    (2000, 24.0),
    (2001, 20.0),
    (2002, 16.0),
    (2003, 12.5),
];

// =============================================================================
// Bloc Exclusions
// =============================================================================

/// Country codes removed before ranking or aggregating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct BlocExclusions {
    codes: BTreeSet<String>,
}

impl BlocExclusions {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// An empty set (nothing excluded).
    pub fn none() -> Self {
        Self {
            codes: BTreeSet::new(),
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }
}

impl Default for BlocExclusions {
    fn default() -> Self {
        Self::new(DEFAULT_BLOC_CODES)
    }
}

// =============================================================================
// Policy Series
// =============================================================================

/// Sparse year -> value mapping for a policy variable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicySeries {
    /// Display name (e.g. "Corporate tax rate").
    pub name: String,
    /// Unit label for the secondary axis.
    #[serde(default)]
    pub unit: String,
    pub points: BTreeMap<i32, f64>,
}

impl PolicySeries {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, points: impl IntoIterator<Item = (i32, f64)>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            points: points.into_iter().collect(),
        }
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.points.get(&year).copied()
    }

    /// Earliest year with a known value.
    pub fn first_year(&self) -> Option<i32> {
        self.points.keys().next().copied()
    }
}

impl Default for PolicySeries {
    fn default() -> Self {
        Self::new("Corporate tax rate", "%", IRISH_CORPORATE_TAX_RATES)
    }
}

// =============================================================================
// Analysis Config
// =============================================================================

/// Parameters of a full analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// Year used for the ranking table.
    pub reference_year: i32,

    /// First year of the growth window.
    pub growth_start_year: i32,

    /// Last year of the growth window.
    pub growth_end_year: i32,

    /// Country compared against the policy series and world aggregates.
    pub focus_country: String,

    /// Last year kept in the world comparison (the final export year is partial).
    pub comparison_last_year: Option<i32>,

    /// Measure that must survive cleaning.
    pub measure: Measure,

    pub exclusions: BlocExclusions,

    pub policy: PolicySeries,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reference_year: 2019,
            growth_start_year: 1970,
            growth_end_year: 2019,
            focus_country: "IRL".to_string(),
            comparison_last_year: Some(2019),
            measure: Measure::LevelsMillionsUsd,
            exclusions: BlocExclusions::default(),
            policy: PolicySeries::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Validate an already-parsed JSON value and deserialize it.
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        validate_analysis_config(&value).map_err(|errors| ConfigError::Schema { errors })?;
        let config: Self = serde_json::from_value(value)?;
        config.check()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Cross-field checks the schema cannot express.
    fn check(&self) -> ConfigResult<()> {
        if self.growth_start_year >= self.growth_end_year {
            return Err(ConfigError::InvalidValue {
                field: "growthStartYear".to_string(),
                message: format!(
                    "must be before growthEndYear ({} >= {})",
                    self.growth_start_year, self.growth_end_year
                ),
            });
        }
        if self.exclusions.contains(&self.focus_country) {
            return Err(ConfigError::InvalidValue {
                field: "focusCountry".to_string(),
                message: format!("{} is listed as an excluded bloc", self.focus_country),
            });
        }
        Ok(())
    }
}
