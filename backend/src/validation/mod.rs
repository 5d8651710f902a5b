//! JSON Schema validation for analysis configuration.
//!
//! Configuration files are checked against `schemas/analysis-config.json`
//! (JSON Schema Draft 7), embedded at compile time, before they are
//! deserialized. This surfaces every problem at once instead of stopping at
//! the first serde error.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use gdp_trends::validate_analysis_config;
//!
//! let config = json!({ "referenceYear": 2019, "focusCountry": "IRL" });
//! assert!(validate_analysis_config(&config).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static ANALYSIS_CONFIG_SCHEMA: Lazy<Result<Value, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/analysis-config.json"))
        .map_err(|e| format!("Invalid embedded schema: {}", e))
});

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with every error otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Boolean variant of [`validate`].
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate against the analysis configuration schema.
pub fn validate_analysis_config(data: &Value) -> Result<(), Vec<String>> {
    let schema = ANALYSIS_CONFIG_SCHEMA.as_ref().map_err(|e| vec![e.clone()])?;
    validate(schema, data)
}

/// Quick check against the analysis configuration schema.
pub fn is_valid_analysis_config(data: &Value) -> bool {
    match ANALYSIS_CONFIG_SCHEMA.as_ref() {
        Ok(schema) => is_valid(schema, data),
        Err(_) => false,
    }
}
