//! High-level pipeline API: load, clean, slice, grow, enrich, aggregate.
//!
//! # Example
//!
//! ```rust,ignore
//! use gdp_trends::{analyze_file, AnalysisConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = analyze_file(Path::new("GDP Hist.csv"), &AnalysisConfig::default())?;
//!     for row in report.ranking.rows.iter().rev().take(5) {
//!         println!("{:>5} {:>4} {:.0}", row.rank, row.country_code, row.value);
//!     }
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::Path;

use super::aggregate::{aggregate_by_year, compare_with_aggregates};
use super::charts::{annual_growth_chart, comparison_chart, growth_chart, policy_chart, ranking_chart, ChartSpec};
use super::cleaner::{clean, year_coverage};
use super::enrich::{enrich, since_first_policy};
use super::growth::{annual_growth, cross_country_growth};
use super::slice::year_slice;
use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{
    AggregateSeries, AnnualSeries, ComparisonRecord, EnrichedSeries, GrowthResult, Observation, YearCoverage,
    YearSlice,
};
use crate::parser::{load_bytes_auto, load_file_auto, LoadedData};

/// Source file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Every table of one analysis run, ready for a renderer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Present when the run started from a file or bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceInfo>,
    pub config: AnalysisConfig,
    pub raw_count: usize,
    pub cleaned_count: usize,
    pub coverage: Vec<YearCoverage>,
    pub ranking: YearSlice,
    pub growth: GrowthResult,
    pub annual: AnnualSeries,
    pub enriched: EnrichedSeries,
    /// `enriched` from the first year with a policy value.
    pub policy_window: EnrichedSeries,
    pub aggregates: AggregateSeries,
    pub comparison: Vec<ComparisonRecord>,
    pub charts: Vec<ChartSpec>,
}

/// Analyze a GDP export on disk.
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> AnalysisResult<AnalysisReport> {
    log_info(format!("Reading {}", path.display()));
    let loaded = load_file_auto(path)?;
    analyze_loaded(loaded, config)
}

/// Analyze GDP export bytes (e.g. an upload).
pub fn analyze_bytes(bytes: &[u8], config: &AnalysisConfig) -> AnalysisResult<AnalysisReport> {
    let loaded = load_bytes_auto(bytes)?;
    analyze_loaded(loaded, config)
}

fn analyze_loaded(loaded: LoadedData, config: &AnalysisConfig) -> AnalysisResult<AnalysisReport> {
    log_success(format!("Detected encoding: {}", loaded.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(loaded.delimiter)));
    log_success(format!("Read {} rows", loaded.observations.len()));
    log_info(format!("📋 {} columns:", loaded.headers.len()));
    for (i, col) in loaded.headers.iter().enumerate() {
        log_info_indent(format!("[{:2}] {}", i + 1, col), 1);
    }

    let source = SourceInfo {
        encoding: loaded.encoding,
        delimiter: loaded.delimiter,
        headers: loaded.headers,
        row_count: loaded.observations.len(),
    };

    let mut report = analyze_observations(&loaded.observations, config)?;
    report.source = Some(source);
    Ok(report)
}

/// Run every stage over already-loaded observations.
pub fn analyze_observations(observations: &[Observation], config: &AnalysisConfig) -> AnalysisResult<AnalysisReport> {
    if observations.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    log_info("🧹 Cleaning...");
    let cleaned = clean(observations, config.measure)?;
    let coverage = year_coverage(&cleaned);

    log_info(format!("🏆 Ranking countries for {}...", config.reference_year));
    let ranking = year_slice(&cleaned, config.reference_year, &config.exclusions);
    if ranking.is_empty() {
        log_warning(format!("No data for {}", config.reference_year));
    } else {
        log_success(format!("{} countries ranked", ranking.rows.len()));
    }

    log_info(format!(
        "📈 Growth {}-{}...",
        config.growth_start_year, config.growth_end_year
    ));
    let growth = cross_country_growth(&cleaned, config.growth_start_year, config.growth_end_year, &config.exclusions)?;
    log_success(format!("{} countries with data in both years", growth.records.len()));
    if !growth.excluded.is_empty() {
        log_warning(format!(
            "Missing one end of the window: {}",
            growth.excluded.join(", ")
        ));
    }

    log_info(format!("🔎 Annual growth for {}...", config.focus_country));
    let annual = annual_growth(&cleaned, &config.focus_country)?;
    if annual.rows.is_empty() {
        log_warning(format!("No data for {}", config.focus_country));
    }
    let gaps = annual
        .rows
        .iter()
        .filter(|r| r.annual_change.percent().is_none())
        .count();
    if gaps > 0 {
        log_warning(format!("{} gap(s) in the {} series", gaps, config.focus_country));
    }

    log_info(format!("🧾 Joining {}...", config.policy.name));
    let enriched = enrich(&annual, &config.policy);
    let policy_window = since_first_policy(&enriched);

    log_info("🌍 Aggregating world totals...");
    let aggregates = aggregate_by_year(&cleaned, &config.exclusions);
    let comparison = compare_with_aggregates(&enriched, &aggregates, config.comparison_last_year)?;
    log_success(format!("{} years compared", comparison.len()));

    let charts = vec![
        ranking_chart(&ranking),
        growth_chart(&growth),
        annual_growth_chart(&annual),
        policy_chart(&policy_window, &config.policy.unit),
        comparison_chart(&config.focus_country, &comparison),
    ];

    Ok(AnalysisReport {
        source: None,
        config: config.clone(),
        raw_count: observations.len(),
        cleaned_count: cleaned.len(),
        coverage,
        ranking,
        growth,
        annual,
        enriched,
        policy_window,
        aggregates,
        comparison,
        charts,
    })
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
