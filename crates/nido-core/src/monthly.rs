//! Calendar-month resampling of daily series.
//!
//! Buckets are labelled with the first day of their month and cover every
//! month in the input span, so monthly series are as gap-free as the daily
//! series they come from.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// One calendar-month bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyBucket {
    /// First day of the month this bucket covers.
    pub month: NaiveDate,
    pub value: f64,
}

/// First day of `date`'s month.
#[must_use]
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn next_month(month: NaiveDate) -> Option<NaiveDate> {
    let (year, next) = if month.month() == 12 {
        (month.year() + 1, 1)
    } else {
        (month.year(), month.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, next, 1)
}

/// Every month-start from the first through the last item's month.
fn month_span(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let mut current = month_start(first);
    let end = month_start(last);
    while current <= end {
        months.push(current);
        match next_month(current) {
            Some(next) => current = next,
            None => break,
        }
    }
    months
}

/// Sums a daily value into monthly buckets.
///
/// Months inside the span with no contributing days appear with value zero.
/// Returns an empty vector for an empty input.
pub fn resample_sum<T, D, V>(days: &[T], date_of: D, value_of: V) -> Vec<MonthlyBucket>
where
    D: Fn(&T) -> NaiveDate,
    V: Fn(&T) -> f64,
{
    resample(days, date_of, |items| items.iter().map(|item| value_of(item)).sum())
}

/// Counts the days matching `predicate` per month.
#[allow(clippy::cast_precision_loss)]
pub fn count_days_where<T, D, P>(days: &[T], date_of: D, predicate: P) -> Vec<MonthlyBucket>
where
    D: Fn(&T) -> NaiveDate,
    P: Fn(&T) -> bool,
{
    resample(days, date_of, |items| {
        items.iter().filter(|item| predicate(item)).count() as f64
    })
}

fn resample<T, D, F>(days: &[T], date_of: D, reduce: F) -> Vec<MonthlyBucket>
where
    D: Fn(&T) -> NaiveDate,
    F: Fn(&[&T]) -> f64,
{
    let Some(first) = days.iter().map(&date_of).min() else {
        return Vec::new();
    };
    let last = days.iter().map(&date_of).max().unwrap_or(first);

    let mut groups: std::collections::BTreeMap<NaiveDate, Vec<&T>> =
        std::collections::BTreeMap::new();
    for day in days {
        groups
            .entry(month_start(date_of(day)))
            .or_default()
            .push(day);
    }

    month_span(first, last)
        .into_iter()
        .map(|month| {
            let items = groups.get(&month).map_or(&[][..], Vec::as_slice);
            MonthlyBucket {
                month,
                value: reduce(items),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn sums_within_a_month() {
        // Daily counts [2, 3, 4] on consecutive days of one month.
        let days = vec![
            (date(2019, 5, 10), 2.0),
            (date(2019, 5, 11), 3.0),
            (date(2019, 5, 12), 4.0),
        ];
        let buckets = resample_sum(&days, |d| d.0, |d| d.1);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].month, date(2019, 5, 1));
        assert!((buckets[0].value - 9.0).abs() < 1e-9);
    }

    #[test]
    fn buckets_are_labelled_with_month_start() {
        let days = vec![(date(2019, 5, 31), 1.0), (date(2019, 6, 1), 1.0)];
        let buckets = resample_sum(&days, |d| d.0, |d| d.1);
        let months: Vec<_> = buckets.iter().map(|b| b.month).collect();
        assert_eq!(months, vec![date(2019, 5, 1), date(2019, 6, 1)]);
    }

    #[test]
    fn empty_months_inside_span_are_zero() {
        let days = vec![(date(2019, 1, 15), 5.0), (date(2019, 3, 15), 7.0)];
        let buckets = resample_sum(&days, |d| d.0, |d| d.1);
        assert_eq!(buckets.len(), 3);
        assert!((buckets[1].value).abs() < f64::EPSILON);
    }

    #[test]
    fn spans_a_year_boundary() {
        let days = vec![(date(2018, 12, 20), 1.0), (date(2019, 1, 5), 1.0)];
        let buckets = resample_sum(&days, |d| d.0, |d| d.1);
        let months: Vec<_> = buckets.iter().map(|b| b.month).collect();
        assert_eq!(months, vec![date(2018, 12, 1), date(2019, 1, 1)]);
    }

    #[test]
    fn counts_days_matching_predicate() {
        let days = vec![
            (date(2019, 2, 1), 0.0),
            (date(2019, 2, 2), 3.0),
            (date(2019, 2, 3), 0.0),
            (date(2019, 3, 1), 0.0),
        ];
        let buckets = count_days_where(&days, |d| d.0, |d| d.1 == 0.0);
        assert!((buckets[0].value - 2.0).abs() < 1e-9);
        assert!((buckets[1].value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_yields_no_buckets() {
        let days: Vec<(NaiveDate, f64)> = Vec::new();
        assert!(resample_sum(&days, |d| d.0, |d| d.1).is_empty());
    }
}
