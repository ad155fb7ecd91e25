//! Date-axis helpers shared by the monthly chart panels.

use chrono::{Datelike, Days, NaiveDate};
use nido_core::DateSpan;

/// X-axis limits for monthly date charts.
///
/// All panels of a figure share one axis so the charts line up vertically.
/// With year-one clipping enabled the right limit is pinned to one year
/// after the first day regardless of how much data follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyAxis {
    pub left: NaiveDate,
    pub right: NaiveDate,
}

impl MonthlyAxis {
    #[must_use]
    pub fn new(span: DateSpan, year_one_only: bool) -> Self {
        let left = span.first;
        let right = if year_one_only {
            one_year_after(left)
        } else {
            // A degenerate one-day span still needs a non-empty axis.
            span.last
                .max(left.checked_add_days(Days::new(1)).unwrap_or(span.last))
        };
        Self { left, right }
    }
}

fn one_year_after(date: NaiveDate) -> NaiveDate {
    date.with_year(date.year() + 1)
        .unwrap_or_else(|| date + chrono::Duration::days(365))
}
