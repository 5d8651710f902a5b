//! Error types for the GDP trends pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`LoadError`] - Reading and decoding the source CSV
//! - [`IntegrityError`] - Data-integrity violations found while cleaning
//! - [`ArithmeticError`] - Undefined percentage computations
//! - [`ConfigError`] - Analysis configuration loading and validation
//! - [`AnalysisError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP surface errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while loading raw observations from a delimited file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode content.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Malformed CSV structure.
    #[error("Invalid CSV format: {0}")]
    Format(String),

    /// Empty input.
    #[error("CSV input is empty")]
    EmptyFile,

    /// A required column is missing from the header row.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A field could not be converted to its typed value.
    #[error("Line {line}, column '{column}' (value '{value}'): {message}")]
    InvalidField {
        line: usize,
        column: String,
        value: String,
        message: String,
    },
}

// =============================================================================
// Integrity Errors
// =============================================================================

/// Data-integrity violations detected while cleaning.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// More than one measure survived deduplication.
    #[error("Expected a single measure after cleaning, found: {}", .measures.join(", "))]
    MixedMeasures { measures: Vec<String> },

    /// The single surviving measure is not the expected one.
    #[error("Expected measure {expected}, found {found}")]
    UnexpectedMeasure { expected: String, found: String },

    /// Two rows share a (country, year) key.
    #[error("Duplicate observation for {country} in {year}")]
    DuplicateKey { country: String, year: i32 },
}

// =============================================================================
// Arithmetic Errors
// =============================================================================

/// Undefined arithmetic in a derived metric.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ArithmeticError {
    /// A percentage was requested against a zero base value.
    #[error("Division by zero computing {operation} for {country} in {year}")]
    DivisionByZero {
        operation: &'static str,
        country: String,
        year: i32,
    },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors loading an analysis configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config does not satisfy the embedded schema.
    #[error("Config failed schema validation: {}", .errors.join("; "))]
    Schema { errors: Vec<String> },

    /// Semantically invalid value.
    #[error("Invalid config value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

// =============================================================================
// Analysis Errors (top-level)
// =============================================================================

/// Top-level analysis errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::analyze_file`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Loading error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Integrity error.
    #[error("Integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    /// Arithmetic error.
    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// No observations to analyze.
    #[error("No observations to analyze")]
    EmptyInput,
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Analysis error.
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for cleaning operations.
pub type IntegrityResult<T> = Result<T, IntegrityError>;

/// Result type for derived metrics.
pub type ArithmeticResult<T> = Result<T, ArithmeticError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // LoadError -> AnalysisError
        let load_err = LoadError::EmptyFile;
        let analysis_err: AnalysisError = load_err.into();
        assert!(analysis_err.to_string().contains("empty"));

        // ArithmeticError -> AnalysisError
        let arith_err = ArithmeticError::DivisionByZero {
            operation: "growth",
            country: "IRL".into(),
            year: 1970,
        };
        let analysis_err: AnalysisError = arith_err.into();
        assert!(analysis_err.to_string().contains("IRL"));
    }

    #[test]
    fn test_invalid_field_format() {
        let err = LoadError::InvalidField {
            line: 5,
            column: "TIME".into(),
            value: "abc".into(),
            message: "not a year".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Line 5"));
        assert!(msg.contains("column 'TIME'"));
        assert!(msg.contains("value 'abc'"));
    }

    #[test]
    fn test_mixed_measures_lists_all() {
        let err = IntegrityError::MixedMeasures {
            measures: vec!["MLN_USD".into(), "USD_CAP".into()],
        };
        assert!(err.to_string().contains("MLN_USD, USD_CAP"));
    }
}
