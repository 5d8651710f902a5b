//! REST API types for rendering clients.
//!
//! The report is returned as-is; every table and chart descriptor is already
//! in the camelCase JSON shape a chart renderer consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::transform::pipeline::AnalysisReport;

/// Response sent after a CSV upload has been analyzed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready" or "warning"
    pub status: String,

    /// When the report was produced
    pub generated_at: DateTime<Utc>,

    /// Summary for quick display
    pub metadata: ReportMetadata,

    /// Full report
    pub report: AnalysisReport,
}

/// Summary counts of a report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub raw_rows: usize,
    pub cleaned_rows: usize,
    pub ranked_countries: usize,
    pub growth_countries: usize,
    /// Countries dropped from the growth join
    pub growth_excluded: Vec<String>,
    /// Years of the focus series whose predecessor is missing
    pub annual_gaps: Vec<i32>,
}

impl From<AnalysisReport> for AnalyzeResponse {
    fn from(report: AnalysisReport) -> Self {
        let annual_gaps: Vec<i32> = report
            .annual
            .rows
            .iter()
            .filter(|r| r.annual_change.percent().is_none())
            .map(|r| r.year)
            .collect();

        let metadata = ReportMetadata {
            raw_rows: report.raw_count,
            cleaned_rows: report.cleaned_count,
            ranked_countries: report.ranking.rows.len(),
            growth_countries: report.growth.records.len(),
            growth_excluded: report.growth.excluded.clone(),
            annual_gaps,
        };

        let complete = metadata.annual_gaps.is_empty() && !report.ranking.is_empty();

        AnalyzeResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if complete { "ready" } else { "warning" }.to_string(),
            generated_at: Utc::now(),
            metadata,
            report,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "generatedAt": Utc::now(),
        "error": error,
        "report": null
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::models::{Measure, Observation};
    use crate::transform::pipeline::analyze_observations;

    #[test]
    fn test_response_from_report() {
        let observations = vec![
            Observation::new("IRL", 2018, Measure::LevelsMillionsUsd, 100.0),
            Observation::new("IRL", 2019, Measure::LevelsMillionsUsd, 110.0),
            Observation::new("USA", 2019, Measure::LevelsMillionsUsd, 1000.0),
        ];
        let config = AnalysisConfig {
            growth_start_year: 2018,
            ..AnalysisConfig::default()
        };
        let report = analyze_observations(&observations, &config).unwrap();
        let response = AnalyzeResponse::from(report);

        assert_eq!(response.status, "ready");
        assert_eq!(response.metadata.raw_rows, 3);
        assert_eq!(response.metadata.ranked_countries, 2);
        assert_eq!(response.metadata.growth_excluded, vec!["USA".to_string()]);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["jobId"].is_string());
        assert_eq!(json["report"]["ranking"]["year"], 2019);
    }

    #[test]
    fn test_error_response() {
        let json = error_response("CSV input is empty");
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "CSV input is empty");
        assert!(json["report"].is_null());
    }
}
