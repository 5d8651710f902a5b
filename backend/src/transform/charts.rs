//! Renderer-agnostic chart descriptors.
//!
//! Nothing here draws. Each [`ChartSpec`] carries the x-axis categories and
//! the numeric series a renderer needs, with gaps as `null`.

use serde::{Deserialize, Serialize};

use crate::models::{AnnualSeries, ComparisonRecord, EnrichedSeries, GrowthResult, YearSlice};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub label: String,
    /// Color hint for the renderer.
    pub color: String,
    pub axis: Axis,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    /// Country codes or years, as strings.
    pub x: Vec<String>,
    pub y_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_y_label: Option<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartSeries {
    fn new(label: impl Into<String>, color: &str, axis: Axis, values: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            color: color.to_string(),
            axis,
            values,
        }
    }
}

/// GDP of every country in the reference year, smallest first.
pub fn ranking_chart(slice: &YearSlice) -> ChartSpec {
    ChartSpec {
        title: format!("GDP per country {} in millions USD", slice.year),
        kind: ChartKind::Bar,
        x_label: "Country".to_string(),
        x: slice.rows.iter().map(|r| r.country_code.clone()).collect(),
        y_label: "GDP in millions USD".to_string(),
        secondary_y_label: None,
        series: vec![ChartSeries::new(
            "GDP",
            "steelblue",
            Axis::Primary,
            slice.rows.iter().map(|r| Some(r.value)).collect(),
        )],
    }
}

/// Percentage growth over the window, lowest first.
pub fn growth_chart(growth: &GrowthResult) -> ChartSpec {
    ChartSpec {
        title: format!("GDP Growth {}-{}", growth.start_year, growth.end_year),
        kind: ChartKind::Bar,
        x_label: "Country".to_string(),
        x: growth.records.iter().map(|r| r.country_code.clone()).collect(),
        y_label: "% Growth".to_string(),
        secondary_y_label: None,
        series: vec![ChartSeries::new(
            "% Growth",
            "steelblue",
            Axis::Primary,
            growth.records.iter().map(|r| Some(r.pct_growth)).collect(),
        )],
    }
}

/// GDP on the primary axis, annual change on the secondary axis.
pub fn annual_growth_chart(annual: &AnnualSeries) -> ChartSpec {
    ChartSpec {
        title: format!("{} GDP Growth", annual.country_code),
        kind: ChartKind::Line,
        x_label: "Year".to_string(),
        x: annual.rows.iter().map(|r| r.year.to_string()).collect(),
        y_label: "GDP in millions USD".to_string(),
        secondary_y_label: Some("Annual % Growth".to_string()),
        series: vec![
            ChartSeries::new("GDP", "red", Axis::Primary, annual.rows.iter().map(|r| Some(r.value)).collect()),
            ChartSeries::new(
                "Annual %",
                "blue",
                Axis::Secondary,
                annual.rows.iter().map(|r| r.annual_change.percent()).collect(),
            ),
        ],
    }
}

/// GDP against the policy variable, secondary axis for the policy.
pub fn policy_chart(enriched: &EnrichedSeries, unit: &str) -> ChartSpec {
    let secondary = if unit.is_empty() {
        enriched.policy_name.clone()
    } else {
        format!("{} {}", enriched.policy_name, unit)
    };

    ChartSpec {
        title: format!("{} GDP Growth vs {}", enriched.country_code, enriched.policy_name),
        kind: ChartKind::Line,
        x_label: "Year".to_string(),
        x: enriched.rows.iter().map(|r| r.year.to_string()).collect(),
        y_label: "GDP in millions USD".to_string(),
        secondary_y_label: Some(secondary),
        series: vec![
            ChartSeries::new("GDP", "red", Axis::Primary, enriched.rows.iter().map(|r| Some(r.value)).collect()),
            ChartSeries::new(
                enriched.policy_name.clone(),
                "blue",
                Axis::Secondary,
                enriched.rows.iter().map(|r| r.policy_value).collect(),
            ),
        ],
    }
}

/// Country GDP against the world median and mean.
pub fn comparison_chart(country: &str, records: &[ComparisonRecord]) -> ChartSpec {
    ChartSpec {
        title: format!("{} GDP vs Total World", country),
        kind: ChartKind::Line,
        x_label: "Year".to_string(),
        x: records.iter().map(|r| r.year.to_string()).collect(),
        y_label: "GDP in millions".to_string(),
        secondary_y_label: None,
        series: vec![
            ChartSeries::new(format!("{} GDP", country), "red", Axis::Primary, records.iter().map(|r| Some(r.value)).collect()),
            ChartSeries::new("Median GDP", "blue", Axis::Primary, records.iter().map(|r| r.median).collect()),
            ChartSeries::new("Mean GDP", "black", Axis::Primary, records.iter().map(|r| r.mean).collect()),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnnualChange, AnnualRow, EnrichedRow, RankedRow};

    #[test]
    fn test_ranking_chart_follows_slice_order() {
        let slice = YearSlice {
            year: 2019,
            rows: vec![
                RankedRow { country_code: "IRL".into(), value: 10.0, rank: 2.0 },
                RankedRow { country_code: "USA".into(), value: 100.0, rank: 1.0 },
            ],
        };
        let chart = ranking_chart(&slice);

        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.x, vec!["IRL", "USA"]);
        assert_eq!(chart.series[0].values, vec![Some(10.0), Some(100.0)]);
        assert!(chart.title.contains("2019"));
    }

    #[test]
    fn test_annual_chart_gap_is_null() {
        let annual = AnnualSeries {
            country_code: "IRL".into(),
            rows: vec![
                AnnualRow { year: 1970, value: 1.0, annual_change: AnnualChange::Baseline },
                AnnualRow { year: 1972, value: 2.0, annual_change: AnnualChange::Gap { previous_year: 1970 } },
            ],
        };
        let chart = annual_growth_chart(&annual);

        assert_eq!(chart.series[1].axis, Axis::Secondary);
        assert_eq!(chart.series[1].values, vec![Some(0.0), None]);

        let json = serde_json::to_value(&chart).unwrap();
        assert!(json["series"][1]["values"][1].is_null());
        assert_eq!(json["secondaryYLabel"], "Annual % Growth");
    }

    #[test]
    fn test_policy_chart_labels() {
        let enriched = EnrichedSeries {
            country_code: "IRL".into(),
            policy_name: "Corporate tax rate".into(),
            rows: vec![EnrichedRow {
                year: 1994,
                value: 1.0,
                annual_change: AnnualChange::Baseline,
                policy_value: Some(40.0),
            }],
        };
        let chart = policy_chart(&enriched, "%");
        assert_eq!(chart.secondary_y_label.as_deref(), Some("Corporate tax rate %"));
        assert_eq!(chart.series[1].values, vec![Some(40.0)]);
    }
}
