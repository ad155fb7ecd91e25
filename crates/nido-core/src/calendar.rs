//! Calendar-day bucketing primitives.
//!
//! Every daily series in nido is keyed by the date component of a record's
//! begin timestamp. The helpers here build the contiguous day range for a
//! series, group records by that key in a single pass, and classify
//! timestamps against daytime windows.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// An inclusive, contiguous range of calendar days.
///
/// Daily aggregation iterates every day in the span, including days with no
/// records, so output series never have gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl DateSpan {
    /// Builds a span covering every date produced by the iterator.
    ///
    /// Returns `None` when the iterator is empty.
    pub fn from_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Option<Self> {
        let mut iter = dates.into_iter();
        let start = iter.next()?;
        let (first, last) = iter.fold((start, start), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self { first, last })
    }

    /// Creates a span from explicit endpoints, normalizing reversed input.
    #[must_use]
    pub fn new(first: NaiveDate, last: NaiveDate) -> Self {
        if last < first {
            Self {
                first: last,
                last: first,
            }
        } else {
            Self { first, last }
        }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last
    }

    /// Number of days in the span (at least 1).
    #[must_use]
    pub fn len_days(&self) -> i64 {
        (self.last - self.first).num_days() + 1
    }

    /// Iterates every day in the span in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let first = self.first;
        let last = self.last;
        std::iter::successors(Some(first), move |d| {
            d.checked_add_days(Days::new(1)).filter(|next| *next <= last)
        })
    }
}

/// A half-open window of the day in decimal hours, `[start, end)`.
///
/// Decimal hours keep the comparison consistent with the 24-hour strip
/// visualizations, which plot the same quantity. An event exactly on the end
/// boundary belongs to the complement window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start_hour: f64,
    pub end_hour: f64,
}

impl DayWindow {
    #[must_use]
    pub const fn from_hours(start_hour: f64, end_hour: f64) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    #[must_use]
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let hour = decimal_hour(timestamp);
        hour >= self.start_hour && hour < self.end_hour
    }
}

/// Time-of-day as a fraction of hours since midnight (e.g. 13:30 -> 13.5).
#[must_use]
pub fn decimal_hour(timestamp: NaiveDateTime) -> f64 {
    f64::from(timestamp.hour())
        + f64::from(timestamp.minute()) / 60.0
        + f64::from(timestamp.second()) / 3600.0
}

/// Groups records by calendar day in a single pass.
///
/// The returned map is ordered by date; days without records are simply
/// absent and must be filled in by the caller's span iteration.
pub fn group_by_day<T, F>(records: &[T], day_of: F) -> BTreeMap<NaiveDate, Vec<&T>>
where
    F: Fn(&T) -> NaiveDate,
{
    let mut groups: BTreeMap<NaiveDate, Vec<&T>> = BTreeMap::new();
    for record in records {
        groups.entry(day_of(record)).or_default().push(record);
    }
    groups
}

/// Elapsed time between two timestamps in fractional hours.
#[must_use]
pub fn hours_between(earlier: NaiveDateTime, later: NaiveDateTime) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let seconds = (later - earlier).num_seconds() as f64;
    seconds / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn span_from_dates_finds_extremes() {
        let span = DateSpan::from_dates(vec![
            date(2019, 3, 5),
            date(2019, 1, 2),
            date(2019, 2, 10),
        ])
        .unwrap();
        assert_eq!(span.first, date(2019, 1, 2));
        assert_eq!(span.last, date(2019, 3, 5));
    }

    #[test]
    fn span_from_empty_is_none() {
        assert!(DateSpan::from_dates(Vec::new()).is_none());
    }

    #[test]
    fn span_iteration_is_contiguous() {
        let span = DateSpan::new(date(2019, 1, 30), date(2019, 2, 2));
        let days: Vec<_> = span.iter().collect();
        assert_eq!(
            days,
            vec![
                date(2019, 1, 30),
                date(2019, 1, 31),
                date(2019, 2, 1),
                date(2019, 2, 2),
            ]
        );
        assert_eq!(span.len_days(), 4);
    }

    #[test]
    fn span_normalizes_reversed_endpoints() {
        let span = DateSpan::new(date(2019, 5, 1), date(2019, 4, 1));
        assert_eq!(span.first, date(2019, 4, 1));
        assert_eq!(span.last, date(2019, 5, 1));
    }

    #[test]
    fn window_is_half_open() {
        let window = DayWindow::from_hours(7.0, 20.0);
        assert!(!window.contains(datetime(2019, 1, 1, 6, 59)));
        assert!(window.contains(datetime(2019, 1, 1, 7, 0)));
        assert!(window.contains(datetime(2019, 1, 1, 19, 59)));
        assert!(!window.contains(datetime(2019, 1, 1, 20, 0)));
    }

    #[test]
    fn decimal_hour_includes_minutes() {
        let h = decimal_hour(datetime(2019, 1, 1, 13, 30));
        assert!((h - 13.5).abs() < 1e-9);
    }

    #[test]
    fn group_by_day_buckets_records() {
        let stamps = vec![
            datetime(2019, 1, 1, 8, 0),
            datetime(2019, 1, 2, 9, 0),
            datetime(2019, 1, 1, 22, 0),
        ];
        let groups = group_by_day(&stamps, |t| t.date());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&date(2019, 1, 1)].len(), 2);
        assert_eq!(groups[&date(2019, 1, 2)].len(), 1);
    }

    #[test]
    fn hours_between_is_fractional() {
        let gap = hours_between(datetime(2019, 1, 1, 23, 0), datetime(2019, 1, 2, 1, 30));
        assert!((gap - 2.5).abs() < 1e-9);
    }
}
