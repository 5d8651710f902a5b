//! Growth over a window and year-over-year change.

use std::collections::{BTreeSet, HashMap};

use super::slice::year_slice;
use crate::config::BlocExclusions;
use crate::error::{ArithmeticError, ArithmeticResult};
use crate::models::{AnnualChange, AnnualRow, AnnualSeries, CleanedSeries, GrowthRecord, GrowthResult};

/// `(to - from) / from * 100`, refusing a zero base.
pub fn pct_change(
    from: f64,
    to: f64,
    operation: &'static str,
    country: &str,
    year: i32,
) -> ArithmeticResult<f64> {
    if from == 0.0 {
        return Err(ArithmeticError::DivisionByZero {
            operation,
            country: country.to_string(),
            year,
        });
    }
    Ok((to - from) / from * 100.0)
}

/// Growth between `start_year` and `end_year` for every country present in
/// both years, sorted ascending by percentage.
///
/// Bloc exclusion applies to both slices before the join. Countries reporting
/// in only one of the two years are listed in [`GrowthResult::excluded`].
pub fn cross_country_growth(
    series: &CleanedSeries,
    start_year: i32,
    end_year: i32,
    exclusions: &BlocExclusions,
) -> ArithmeticResult<GrowthResult> {
    let start = year_slice(series, start_year, exclusions);
    let end = year_slice(series, end_year, exclusions);

    let end_values: HashMap<&str, f64> = end
        .rows
        .iter()
        .map(|r| (r.country_code.as_str(), r.value))
        .collect();

    let mut records = Vec::new();
    for row in &start.rows {
        if let Some(&value_end) = end_values.get(row.country_code.as_str()) {
            let pct_growth = pct_change(row.value, value_end, "growth", &row.country_code, start_year)?;
            records.push(GrowthRecord {
                country_code: row.country_code.clone(),
                value_start: row.value,
                value_end,
                pct_growth,
            });
        }
    }
    records.sort_by(|a, b| a.pct_growth.total_cmp(&b.pct_growth));

    let start_codes: BTreeSet<&str> = start.rows.iter().map(|r| r.country_code.as_str()).collect();
    let end_codes: BTreeSet<&str> = end_values.keys().copied().collect();
    let excluded = start_codes
        .symmetric_difference(&end_codes)
        .map(|c| c.to_string())
        .collect();

    Ok(GrowthResult {
        start_year,
        end_year,
        records,
        excluded,
    })
}

/// One country's series sorted by year with the change from the previous
/// calendar year.
///
/// The earliest year is the baseline. A year whose predecessor is missing is
/// marked as a gap rather than compared against an older value.
pub fn annual_growth(series: &CleanedSeries, country: &str) -> ArithmeticResult<AnnualSeries> {
    let mut points: Vec<(i32, f64)> = series.country(country).map(|r| (r.year, r.value)).collect();
    points.sort_by_key(|(year, _)| *year);

    let mut rows: Vec<AnnualRow> = Vec::with_capacity(points.len());
    let mut previous: Option<(i32, f64)> = None;

    for (year, value) in points {
        let annual_change = match previous {
            None => AnnualChange::Baseline,
            Some((prev_year, prev_value)) if prev_year == year - 1 => {
                AnnualChange::Percent(pct_change(prev_value, value, "annual growth", country, year)?)
            }
            Some((prev_year, _)) => AnnualChange::Gap { previous_year: prev_year },
        };
        rows.push(AnnualRow {
            year,
            value,
            annual_change,
        });
        previous = Some((year, value));
    }

    Ok(AnnualSeries {
        country_code: country.to_string(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CleanedRow, Measure};

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

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn test_inner_join_drops_unmatched() {
        let data = series(&[("A", 1970, 100.0), ("B", 1970, 200.0), ("A", 2019, 150.0), ("C", 2019, 300.0)]);
        let result = cross_country_growth(&data, 1970, 2019, &BlocExclusions::default()).unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].country_code, "A");
        assert_close(result.records[0].pct_growth, 50.0);
        assert_eq!(result.excluded, vec!["B".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_growth_sorted_ascending() {
        let data = series(&[
            ("A", 1970, 100.0),
            ("B", 1970, 100.0),
            ("C", 1970, 100.0),
            ("A", 2019, 400.0),
            ("B", 2019, 50.0),
            ("C", 2019, 200.0),
        ]);
        let result = cross_country_growth(&data, 1970, 2019, &BlocExclusions::default()).unwrap();
        let order: Vec<&str> = result.records.iter().map(|r| r.country_code.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
        assert_close(result.records[0].pct_growth, -50.0);
    }

    #[test]
    fn test_blocs_excluded_from_both_years() {
        let data = series(&[("A", 1970, 100.0), ("OECD", 1970, 1000.0), ("A", 2019, 110.0), ("OECD", 2019, 2000.0)]);
        let result = cross_country_growth(&data, 1970, 2019, &BlocExclusions::default()).unwrap();
        assert_eq!(result.records.len(), 1);
        assert!(result.excluded.is_empty());
    }

    #[test]
    fn test_zero_start_value_is_error() {
        let data = series(&[("A", 1970, 0.0), ("A", 2019, 10.0)]);
        let err = cross_country_growth(&data, 1970, 2019, &BlocExclusions::default()).unwrap_err();
        assert!(matches!(err, ArithmeticError::DivisionByZero { ref country, .. } if country == "A"));
    }

    #[test]
    fn test_annual_growth() {
        let data = series(&[("IRL", 1971, 110.0), ("IRL", 1970, 100.0), ("IRL", 1972, 99.0), ("USA", 1970, 5.0)]);
        let annual = annual_growth(&data, "IRL").unwrap();

        let years: Vec<i32> = annual.rows.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![1970, 1971, 1972]);
        assert_eq!(annual.rows[0].annual_change, AnnualChange::Baseline);
        assert_close(annual.rows[1].annual_change.percent().unwrap(), 10.0);
        assert_close(annual.rows[2].annual_change.percent().unwrap(), -10.0);
    }

    #[test]
    fn test_annual_growth_marks_gaps() {
        let data = series(&[("IRL", 1970, 100.0), ("IRL", 1971, 110.0), ("IRL", 1974, 120.0), ("IRL", 1975, 132.0)]);
        let annual = annual_growth(&data, "IRL").unwrap();

        assert_eq!(annual.get(1974).unwrap().annual_change, AnnualChange::Gap { previous_year: 1971 });
        assert_close(annual.get(1975).unwrap().annual_change.percent().unwrap(), 10.0);
    }

    #[test]
    fn test_annual_growth_zero_previous_is_error() {
        let data = series(&[("IRL", 1970, 0.0), ("IRL", 1971, 110.0)]);
        assert!(annual_growth(&data, "IRL").is_err());
    }

    #[test]
    fn test_unknown_country_is_empty() {
        let data = series(&[("IRL", 1970, 100.0)]);
        let annual = annual_growth(&data, "XXX").unwrap();
        assert!(annual.rows.is_empty());
    }
}
