//! World aggregates per year and comparison of one country against them.

use std::collections::BTreeMap;

use crate::api::logs::log_info;
use crate::config::BlocExclusions;
use crate::error::{ArithmeticError, ArithmeticResult};
use crate::models::{AggregateRow, AggregateSeries, CleanedSeries, ComparisonRecord, EnrichedSeries};

/// A copy of `series` without bloc rows. The input is left untouched.
pub fn exclude_blocs(series: &CleanedSeries, exclusions: &BlocExclusions) -> CleanedSeries {
    let filtered = series.filtered(|r| !exclusions.contains(&r.country_code));
    log_info(format!(
        "Excluded {} bloc rows, {} country rows remain",
        series.len() - filtered.len(),
        filtered.len()
    ));
    filtered
}

/// Median of a non-empty set; mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sum, mean and median of every year across non-bloc countries.
pub fn aggregate_by_year(series: &CleanedSeries, exclusions: &BlocExclusions) -> AggregateSeries {
    let countries = exclude_blocs(series, exclusions);

    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for row in countries.rows() {
        by_year.entry(row.year).or_default().push(row.value);
    }

    let rows = by_year
        .into_iter()
        .filter_map(|(year, values)| {
            let sum: f64 = values.iter().sum();
            let median = median(&values)?;
            Some(AggregateRow {
                year,
                sum,
                mean: sum / values.len() as f64,
                median,
                country_count: values.len(),
            })
        })
        .collect();

    AggregateSeries { rows }
}

/// Left join of the aggregates onto a country's enriched series.
///
/// Years after `last_year` are dropped. Years without aggregates keep `None`
/// in the aggregate and difference fields.
pub fn compare_with_aggregates(
    country: &EnrichedSeries,
    aggregates: &AggregateSeries,
    last_year: Option<i32>,
) -> ArithmeticResult<Vec<ComparisonRecord>> {
    country
        .rows
        .iter()
        .filter(|r| last_year.map_or(true, |last| r.year <= last))
        .map(|row| {
            let aggregate = aggregates.get(row.year);
            let median_diff = aggregate.map(|a| a.median - row.value);

            let median_diff_pct = match median_diff {
                Some(_) if row.value == 0.0 => {
                    return Err(ArithmeticError::DivisionByZero {
                        operation: "median difference",
                        country: country.country_code.clone(),
                        year: row.year,
                    });
                }
                Some(diff) => Some(diff / row.value * 100.0),
                None => None,
            };

            Ok(ComparisonRecord {
                year: row.year,
                value: row.value,
                annual_change: row.annual_change,
                policy_value: row.policy_value,
                sum: aggregate.map(|a| a.sum),
                mean: aggregate.map(|a| a.mean),
                median: aggregate.map(|a| a.median),
                median_diff,
                median_diff_pct,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnnualChange, CleanedRow, EnrichedRow, Measure};

    fn series(rows: &[(&str, i32, f64)]) -> CleanedSeries {
        CleanedSeries::from_rows(
            Measure::LevelsMillionsUsd,
            rows.iter()
                .map(|(c, y, v)| CleanedRow {
                    country_code: c.to_string(),
                    year: *y,
                    value: *v,
                })
                .collect(),
        )
        .unwrap()
    }

    fn enriched(rows: &[(i32, f64)]) -> EnrichedSeries {
        EnrichedSeries {
            country_code: "IRL".into(),
            policy_name: "Tax".into(),
            rows: rows
                .iter()
                .map(|&(year, value)| EnrichedRow {
                    year,
                    value,
                    annual_change: AnnualChange::Baseline,
                    policy_value: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_sum_mean_median() {
        let data = series(&[("A", 2000, 10.0), ("B", 2000, 20.0), ("C", 2000, 30.0)]);
        let aggregates = aggregate_by_year(&data, &BlocExclusions::default());

        let row = aggregates.get(2000).unwrap();
        assert_eq!(row.sum, 60.0);
        assert_eq!(row.mean, 20.0);
        assert_eq!(row.median, 20.0);
        assert_eq!(row.country_count, 3);
    }

    #[test]
    fn test_blocs_excluded_and_input_untouched() {
        let data = series(&[("A", 2000, 10.0), ("OECD", 2000, 1000.0), ("B", 2000, 30.0)]);
        let aggregates = aggregate_by_year(&data, &BlocExclusions::default());

        assert_eq!(aggregates.get(2000).unwrap().sum, 40.0);
        assert_eq!(data.len(), 3);
        assert!(data.rows().iter().any(|r| r.country_code == "OECD"));
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_years_ascending() {
        let data = series(&[("A", 2001, 1.0), ("A", 1999, 1.0), ("A", 2000, 1.0)]);
        let years: Vec<i32> = aggregate_by_year(&data, &BlocExclusions::none())
            .rows
            .iter()
            .map(|r| r.year)
            .collect();
        assert_eq!(years, vec![1999, 2000, 2001]);
    }

    #[test]
    fn test_comparison_diffs() {
        let data = series(&[("IRL", 2000, 10.0), ("B", 2000, 20.0), ("C", 2000, 30.0)]);
        let aggregates = aggregate_by_year(&data, &BlocExclusions::default());
        let records = compare_with_aggregates(&enriched(&[(2000, 10.0)]), &aggregates, None).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].median, Some(20.0));
        assert_eq!(records[0].median_diff, Some(10.0));
        assert_eq!(records[0].median_diff_pct, Some(100.0));
    }

    #[test]
    fn test_comparison_missing_year_left_unset() {
        let aggregates = aggregate_by_year(&series(&[("A", 2000, 10.0)]), &BlocExclusions::default());
        let records = compare_with_aggregates(&enriched(&[(1999, 5.0), (2000, 5.0)]), &aggregates, None).unwrap();

        assert_eq!(records[0].sum, None);
        assert_eq!(records[0].median_diff, None);
        assert_eq!(records[1].sum, Some(10.0));
    }

    #[test]
    fn test_comparison_last_year() {
        let aggregates = aggregate_by_year(&series(&[("A", 2019, 10.0), ("A", 2020, 9.0)]), &BlocExclusions::default());
        let records = compare_with_aggregates(&enriched(&[(2019, 5.0), (2020, 5.0)]), &aggregates, Some(2019)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 2019);
    }

    #[test]
    fn test_zero_country_value_is_error() {
        let aggregates = aggregate_by_year(&series(&[("A", 2000, 10.0)]), &BlocExclusions::default());
        let err = compare_with_aggregates(&enriched(&[(2000, 0.0)]), &aggregates, None).unwrap_err();
        assert!(matches!(err, ArithmeticError::DivisionByZero { year: 2000, .. }));
    }
}
