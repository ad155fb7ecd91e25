//! Misc medical-event series.
//!
//! The misc table is already one row per day; the monthly sums go through
//! [`crate::monthly`]. This module adds the gap series for sparse events
//! (days since the last occurrence).

use chrono::NaiveDate;
use serde::Serialize;

use crate::record::MiscRecord;

/// A sparse-event occurrence with the gap since the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GapPoint {
    pub date: NaiveDate,
    /// `None` on the first occurrence.
    pub days_since_previous: Option<i64>,
}

/// Gap series for the days where `count_of` is non-zero.
///
/// Records must be date-sorted, which the misc loader guarantees.
pub fn occurrence_gaps<F>(records: &[MiscRecord], count_of: F) -> Vec<GapPoint>
where
    F: Fn(&MiscRecord) -> u32,
{
    let mut gaps = Vec::new();
    let mut previous: Option<NaiveDate> = None;
    for record in records.iter().filter(|r| count_of(r) > 0) {
        gaps.push(GapPoint {
            date: record.date,
            days_since_previous: previous.map(|p| (record.date - p).num_days()),
        });
        previous = Some(record.date);
    }
    gaps
}
