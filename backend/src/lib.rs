//! # GDP Trends - national GDP cleaning, ranking and comparison
//!
//! Turns the OECD historical GDP export into the tables behind a set of
//! charts: a reference-year ranking, growth over a multi-decade window, one
//! country's annual growth, that country against a policy variable, and that
//! country against world aggregates.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────┐   ┌─────────┐   ┌───────────────────┐   ┌──────────┐
//! │ CSV File │──▶│ Loader  │──▶│ Cleaner │──▶│ Slice / Growth /  │──▶│  Report  │
//! │ (OECD)   │   │(auto-enc│   │ (dedup) │   │ Enrich / Aggregate│   │ + charts │
//! └──────────┘   └─────────┘   └─────────┘   └───────────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gdp_trends::{analyze_file, AnalysisConfig};
//!
//! let report = analyze_file("GDP Hist.csv".as_ref(), &AnalysisConfig::default()).unwrap();
//! println!("{} countries ranked for {}", report.ranking.rows.len(), report.ranking.year);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Named record types for every table
//! - [`config`] - Analysis parameters, bloc exclusions, policy series
//! - [`parser`] - CSV loading with auto-detection
//! - [`transform`] - Cleaning, slicing, growth, enrichment, aggregation
//! - [`validation`] - JSON Schema validation of configuration
//! - [`api`] - HTTP API server and log streaming

// Core modules
pub mod error;
pub mod models;
pub mod config;

// Loading
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AnalysisError, AnalysisResult, ArithmeticError, ConfigError, IntegrityError, LoadError, ServerError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AggregateRow, AggregateSeries, AnnualChange, AnnualRow, AnnualSeries, CleanedRow, CleanedSeries,
    ComparisonRecord, EnrichedRow, EnrichedSeries, GrowthRecord, GrowthResult, Measure, Observation,
    RankedRow, YearCoverage, YearSlice,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{AnalysisConfig, BlocExclusions, PolicySeries, DEFAULT_BLOC_CODES, IRISH_CORPORATE_TAX_RATES};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, load_bytes_auto, load_file_auto, normalize_country_code,
    parse_observations, LoadedData,
};

// =============================================================================
// Re-exports - Transformations
// =============================================================================

pub use transform::{
    aggregate_by_year, annual_growth, clean, compare_with_aggregates, cross_country_growth, enrich,
    exclude_blocs, since_first_policy, year_coverage, year_slice, ChartSpec,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{analyze_bytes, analyze_file, analyze_observations, AnalysisReport, SourceInfo};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_analysis_config, validate_analysis_config};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, AnalyzeResponse, ReportMetadata};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
