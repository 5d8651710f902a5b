//! Reduce raw observations to one levels value per (country, year).
//!
//! The OECD export carries two rows per (country, year): total GDP in
//! millions of USD followed by GDP per head. Deduplication keeps the first
//! row of each pair, then checks that a single measure survived.
//!
//! ```text
//! IRL 1970 MLN_USD 4312.5   ─┐
//! IRL 1970 USD_CAP 1451.2    ├──▶  IRL 1970 4312.5
//! IRL 1971 MLN_USD 4791.0   ─┘     IRL 1971 4791.0
//! IRL 1971 USD_CAP 1590.9
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::api::logs::{log_info, log_success};
use crate::error::{IntegrityError, IntegrityResult};
use crate::models::{CleanedRow, CleanedSeries, Measure, Observation, YearCoverage};

/// Deduplicate on (country, year) keeping the first row, and require that
/// exactly `expected` remains.
pub fn clean(observations: &[Observation], expected: Measure) -> IntegrityResult<CleanedSeries> {
    let mut seen: HashSet<(&str, i32)> = HashSet::with_capacity(observations.len());
    let kept: Vec<&Observation> = observations
        .iter()
        .filter(|o| seen.insert((o.country_code.as_str(), o.year)))
        .collect();

    let removed = observations.len() - kept.len();
    log_info(format!(
        "Cleaning {} observations: {} duplicate (country, year) rows dropped",
        observations.len(),
        removed
    ));

    check_single_measure(&kept, expected)?;

    let rows = kept
        .into_iter()
        .map(|o| CleanedRow {
            country_code: o.country_code.clone(),
            year: o.year,
            value: o.value,
        })
        .collect();

    let series = CleanedSeries::from_rows(expected, rows)?;
    log_success(format!("{} rows of {} remain", series.len(), expected));
    Ok(series)
}

fn check_single_measure(rows: &[&Observation], expected: Measure) -> IntegrityResult<()> {
    let measures: BTreeSet<&'static str> = rows.iter().map(|o| o.measure.to_code()).collect();

    match measures.len() {
        0 => Ok(()),
        1 if rows[0].measure == expected => Ok(()),
        1 => Err(IntegrityError::UnexpectedMeasure {
            expected: expected.to_string(),
            found: rows[0].measure.to_string(),
        }),
        _ => Err(IntegrityError::MixedMeasures {
            measures: measures.into_iter().map(String::from).collect(),
        }),
    }
}

/// Count of rows per year, latest year first.
pub fn year_coverage(series: &CleanedSeries) -> Vec<YearCoverage> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for row in series.rows() {
        *counts.entry(row.year).or_default() += 1;
    }

    counts
        .into_iter()
        .rev()
        .map(|(year, country_count)| YearCoverage { year, country_count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(code: &str, year: i32, value: f64) -> Observation {
        Observation::new(code, year, Measure::LevelsMillionsUsd, value)
    }

    fn per_capita(code: &str, year: i32, value: f64) -> Observation {
        Observation::new(code, year, Measure::PerCapita, value)
    }

    fn sample() -> Vec<Observation> {
        vec![
            levels("IRL", 1970, 4312.5),
            per_capita("IRL", 1970, 1451.2),
            levels("IRL", 1971, 4791.0),
            per_capita("IRL", 1971, 1590.9),
            levels("USA", 1970, 1073303.0),
            per_capita("USA", 1970, 5234.3),
        ]
    }

    #[test]
    fn test_keeps_first_of_each_pair() {
        let series = clean(&sample(), Measure::LevelsMillionsUsd).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.rows()[0].value, 4312.5);
        assert_eq!(series.rows()[1].value, 4791.0);
        assert_eq!(series.measure(), Measure::LevelsMillionsUsd);
    }

    #[test]
    fn test_unique_keys_after_cleaning() {
        let series = clean(&sample(), Measure::LevelsMillionsUsd).unwrap();
        let keys: HashSet<(&str, i32)> = series
            .rows()
            .iter()
            .map(|r| (r.country_code.as_str(), r.year))
            .collect();
        assert_eq!(keys.len(), series.len());
    }

    #[test]
    fn test_idempotent() {
        let once = clean(&sample(), Measure::LevelsMillionsUsd).unwrap();
        let twice = clean(&once.to_observations(), Measure::LevelsMillionsUsd).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_mixed_measures_fail() {
        // per-capita row listed first for 1971
        let observations = vec![
            levels("IRL", 1970, 4312.5),
            per_capita("IRL", 1970, 1451.2),
            per_capita("IRL", 1971, 1590.9),
            levels("IRL", 1971, 4791.0),
        ];
        let err = clean(&observations, Measure::LevelsMillionsUsd).unwrap_err();
        assert!(matches!(err, IntegrityError::MixedMeasures { ref measures } if measures.len() == 2));
    }

    #[test]
    fn test_unexpected_measure_fails() {
        let observations = vec![per_capita("IRL", 1970, 1451.2)];
        let err = clean(&observations, Measure::LevelsMillionsUsd).unwrap_err();
        assert!(matches!(err, IntegrityError::UnexpectedMeasure { .. }));
    }

    #[test]
    fn test_empty_input() {
        let series = clean(&[], Measure::LevelsMillionsUsd).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_year_coverage_latest_first() {
        let series = clean(&sample(), Measure::LevelsMillionsUsd).unwrap();
        let coverage = year_coverage(&series);

        assert_eq!(
            coverage,
            vec![
                YearCoverage { year: 1971, country_count: 1 },
                YearCoverage { year: 1970, country_count: 2 },
            ]
        );
    }
}
