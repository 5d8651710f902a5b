//! Join a sparse policy series onto a country's annual series.

use crate::config::PolicySeries;
use crate::models::{AnnualSeries, EnrichedRow, EnrichedSeries};

/// Left join on year with forward fill.
///
/// Every year of `annual` is kept. A year without its own policy value takes
/// the previous row's value; rows before the first match stay `None`.
pub fn enrich(annual: &AnnualSeries, policy: &PolicySeries) -> EnrichedSeries {
    let mut carried: Option<f64> = None;

    let rows = annual
        .rows
        .iter()
        .map(|row| {
            let policy_value = policy.get(row.year).or(carried);
            carried = policy_value;
            EnrichedRow {
                year: row.year,
                value: row.value,
                annual_change: row.annual_change,
                policy_value,
            }
        })
        .collect();

    EnrichedSeries {
        country_code: annual.country_code.clone(),
        policy_name: policy.name.clone(),
        rows,
    }
}

/// Rows from the first year with a policy value onward.
pub fn since_first_policy(series: &EnrichedSeries) -> EnrichedSeries {
    let rows = series
        .rows
        .iter()
        .skip_while(|r| r.policy_value.is_none())
        .cloned()
        .collect();

    EnrichedSeries {
        country_code: series.country_code.clone(),
        policy_name: series.policy_name.clone(),
        rows,
    }
}
