//! Transformation module.
//!
//! Each stage is a pure function from one table to a new one:
//! - Cleaner: raw observations to a deduplicated levels series
//! - Slice: single-year ranking without blocs
//! - Growth: window growth and year-over-year change
//! - Enrich: policy variable join with forward fill
//! - Aggregate: world sum/mean/median and country comparison
//! - Charts: renderer-agnostic chart descriptors
//! - Pipeline: all of the above in one run

pub mod aggregate;
pub mod charts;
pub mod cleaner;
pub mod enrich;
pub mod growth;
pub mod pipeline;
pub mod slice;

pub use aggregate::{aggregate_by_year, compare_with_aggregates, exclude_blocs, median};
pub use charts::{Axis, ChartKind, ChartSeries, ChartSpec};
pub use cleaner::{clean, year_coverage};
pub use enrich::{enrich, since_first_policy};
pub use growth::{annual_growth, cross_country_growth, pct_change};
pub use pipeline::*;
pub use slice::year_slice;
