//! Domain models for the GDP trends pipeline.
//!
//! Every table the pipeline produces is a named record type:
//!
//! - [`Observation`] - Raw (country, year, measure, value) row
//! - [`CleanedSeries`] - One levels row per (country, year)
//! - [`YearSlice`] - Ranked single-year table without blocs
//! - [`GrowthResult`] - Cross-country growth over a window
//! - [`AnnualSeries`] - One country's year-over-year change
//! - [`EnrichedSeries`] - Annual series joined with a policy variable
//! - [`AggregateSeries`] - Per-year sum/mean/median across countries
//! - [`ComparisonRecord`] - Country row against the aggregates

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{IntegrityError, IntegrityResult};

// =============================================================================
// Measure
// =============================================================================

/// GDP measure as coded in the OECD export.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Measure {
    /// Total GDP in millions of USD (MLN_USD).
    #[default]
    #[serde(rename = "MLN_USD")]
    LevelsMillionsUsd,
    /// GDP per head in USD (USD_CAP).
    #[serde(rename = "USD_CAP")]
    PerCapita,
}

impl Measure {
    /// Parse a measure from its OECD code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "MLN_USD" => Some(Self::LevelsMillionsUsd),
            "USD_CAP" => Some(Self::PerCapita),
            _ => None,
        }
    }

    /// Convert to OECD code.
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::LevelsMillionsUsd => "MLN_USD",
            Self::PerCapita => "USD_CAP",
        }
    }
}

impl std::fmt::Display for Measure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_code())
    }
}

// =============================================================================
// Raw Observation
// =============================================================================

/// A single row of the source file after typing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub country_code: String,
    pub year: i32,
    pub measure: Measure,
    pub value: f64,
}

impl Observation {
    pub fn new(country_code: impl Into<String>, year: i32, measure: Measure, value: f64) -> Self {
        Self {
            country_code: country_code.into(),
            year,
            measure,
            value,
        }
    }
}

// =============================================================================
// Cleaned Series
// =============================================================================

/// One levels observation, administrative columns dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CleanedRow {
    pub country_code: String,
    pub year: i32,
    pub value: f64,
}

/// Deduplicated series, unique on (country_code, year).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CleanedSeries {
    measure: Measure,
    rows: Vec<CleanedRow>,
}

impl CleanedSeries {
    /// Build a series, rejecting duplicate (country, year) keys.
    pub fn from_rows(measure: Measure, rows: Vec<CleanedRow>) -> IntegrityResult<Self> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !seen.insert((row.country_code.as_str(), row.year)) {
                return Err(IntegrityError::DuplicateKey {
                    country: row.country_code.clone(),
                    year: row.year,
                });
            }
        }
        Ok(Self { measure, rows })
    }

    pub fn measure(&self) -> Measure {
        self.measure
    }

    pub fn rows(&self) -> &[CleanedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows for one country, in source order.
    pub fn country<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a CleanedRow> + 'a {
        self.rows.iter().filter(move |r| r.country_code == code)
    }

    /// Rows for one year, in source order.
    pub fn year(&self, year: i32) -> impl Iterator<Item = &CleanedRow> {
        self.rows.iter().filter(move |r| r.year == year)
    }

    /// New series keeping only rows accepted by `keep`.
    ///
    /// Filtering cannot introduce duplicates, so the key invariant carries over.
    pub fn filtered<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&CleanedRow) -> bool,
    {
        Self {
            measure: self.measure,
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Re-express the series as raw observations.
    pub fn to_observations(&self) -> Vec<Observation> {
        self.rows
            .iter()
            .map(|r| Observation::new(r.country_code.clone(), r.year, self.measure, r.value))
            .collect()
    }
}

/// Number of countries reporting in a given year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YearCoverage {
    pub year: i32,
    pub country_count: usize,
}

// =============================================================================
// Year Slice
// =============================================================================

/// A country's value in a slice, with its descending-value rank.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedRow {
    pub country_code: String,
    pub value: f64,
    /// 1.0 is the highest value; exact ties share the average rank.
    pub rank: f64,
}

/// Single-year table, blocs excluded, sorted ascending by value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YearSlice {
    pub year: i32,
    pub rows: Vec<RankedRow>,
}

impl YearSlice {
    pub fn get(&self, code: &str) -> Option<&RankedRow> {
        self.rows.iter().find(|r| r.country_code == code)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// Growth
// =============================================================================

/// Growth of one country between two years.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GrowthRecord {
    pub country_code: String,
    pub value_start: f64,
    pub value_end: f64,
    pub pct_growth: f64,
}

/// Cross-country growth, sorted ascending by `pct_growth`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GrowthResult {
    pub start_year: i32,
    pub end_year: i32,
    pub records: Vec<GrowthRecord>,
    /// Codes present in only one of the two slices (inner join drop).
    pub excluded: Vec<String>,
}

/// Change of a year relative to the previous calendar year.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnnualChange {
    /// Earliest year of the series (0 %).
    Baseline,
    /// Percentage change from the previous calendar year.
    Percent(f64),
    /// The previous calendar year is missing; no delta is computed.
    Gap {
        #[serde(rename = "previousYear")]
        previous_year: i32,
    },
}

impl AnnualChange {
    /// Percentage for plotting; `None` across a gap.
    pub fn percent(&self) -> Option<f64> {
        match self {
            Self::Baseline => Some(0.0),
            Self::Percent(p) => Some(*p),
            Self::Gap { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnnualRow {
    pub year: i32,
    pub value: f64,
    pub annual_change: AnnualChange,
}

/// One country's series sorted by year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnnualSeries {
    pub country_code: String,
    pub rows: Vec<AnnualRow>,
}

impl AnnualSeries {
    pub fn get(&self, year: i32) -> Option<&AnnualRow> {
        self.rows.iter().find(|r| r.year == year)
    }
}

// =============================================================================
// Enrichment
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRow {
    pub year: i32,
    pub value: f64,
    pub annual_change: AnnualChange,
    /// `None` before the first known policy value.
    pub policy_value: Option<f64>,
}

/// Annual series joined with a forward-filled policy variable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedSeries {
    pub country_code: String,
    pub policy_name: String,
    pub rows: Vec<EnrichedRow>,
}

impl EnrichedSeries {
    pub fn get(&self, year: i32) -> Option<&EnrichedRow> {
        self.rows.iter().find(|r| r.year == year)
    }
}

// =============================================================================
// Aggregates
// =============================================================================

/// Cross-country statistics for one year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow {
    pub year: i32,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub country_count: usize,
}

/// Aggregates keyed by year, ascending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSeries {
    pub rows: Vec<AggregateRow>,
}

impl AggregateSeries {
    pub fn get(&self, year: i32) -> Option<&AggregateRow> {
        self.rows
            .binary_search_by_key(&year, |r| r.year)
            .ok()
            .map(|i| &self.rows[i])
    }
}

/// A country row set against the world aggregates of its year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRecord {
    pub year: i32,
    pub value: f64,
    pub annual_change: AnnualChange,
    pub policy_value: Option<f64>,
    pub sum: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// `median - value`
    pub median_diff: Option<f64>,
    /// `median_diff / value * 100`
    pub median_diff_pct: Option<f64>,
}

// =============================================================================
// Tests
// =============================================================================
