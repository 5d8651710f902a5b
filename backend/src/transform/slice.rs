//! Single-year ranking table.

use crate::config::BlocExclusions;
use crate::models::{CleanedSeries, RankedRow, YearSlice};

/// Countries reporting in `year`, blocs removed, sorted ascending by value
/// and ranked by descending value.
///
/// A year with no data yields an empty slice.
pub fn year_slice(series: &CleanedSeries, year: i32, exclusions: &BlocExclusions) -> YearSlice {
    let mut rows: Vec<RankedRow> = series
        .year(year)
        .filter(|r| !exclusions.contains(&r.country_code))
        .map(|r| RankedRow {
            country_code: r.country_code.clone(),
            value: r.value,
            rank: 0.0,
        })
        .collect();

    rows.sort_by(|a, b| a.value.total_cmp(&b.value));
    assign_descending_ranks(&mut rows);

    YearSlice { year, rows }
}

/// Rank rows already sorted ascending by value: the largest value gets 1.0,
/// and each run of equal values shares the average of the ranks it spans.
fn assign_descending_ranks(rows: &mut [RankedRow]) {
    let n = rows.len();
    let mut start = 0;

    while start < n {
        let mut end = start;
        while end + 1 < n && rows[end + 1].value == rows[start].value {
            end += 1;
        }

        // ascending position i has descending rank n - i
        let rank = (2 * n - start - end) as f64 / 2.0;
        for row in &mut rows[start..=end] {
            row.rank = rank;
        }
        start = end + 1;
    }
}
