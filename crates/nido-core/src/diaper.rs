//! Daily diaper aggregation.
//!
//! Counts changes per day, splits pees and poops (a combined change
//! increments both), tracks the running total across the whole range, and
//! derives the poop ratio and the mean gap between changes.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::{DateSpan, group_by_day, hours_between};
use crate::record::DiaperRecord;

/// Days whose poop ratio reaches this percentage count as diarrhea days.
pub const DIARRHEA_RATIO_CUTOFF: f64 = 65.0;

/// Diaper statistics for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiaperDay {
    pub date: NaiveDate,
    pub total: usize,
    pub pees: usize,
    pub poops: usize,
    /// Running change count from the first day of the range through this one.
    pub cumulative: usize,
    /// Poops as a percentage of changes, `None` on zero-change days.
    pub poop_ratio: Option<f64>,
    /// Mean hours between consecutive changes; needs at least two changes.
    pub change_gap_hours: Option<f64>,
}

impl DiaperDay {
    /// Whether this day counts toward the monthly constipation series.
    #[must_use]
    pub const fn is_constipated(&self) -> bool {
        self.poops == 0
    }

    /// Whether this day counts toward the monthly diarrhea series.
    #[must_use]
    pub fn is_diarrhea(&self) -> bool {
        self.poop_ratio
            .is_some_and(|ratio| ratio >= DIARRHEA_RATIO_CUTOFF)
    }
}

/// Aggregates diaper changes into one row per day across `span`.
pub fn aggregate_daily(records: &[DiaperRecord], span: DateSpan) -> Vec<DiaperDay> {
    let groups = group_by_day(records, DiaperRecord::day);

    let mut days = Vec::with_capacity(usize::try_from(span.len_days()).unwrap_or_default());
    let mut cumulative = 0;
    for date in span.iter() {
        let changes = groups.get(&date).map_or(&[][..], Vec::as_slice);
        cumulative += changes.len();
        days.push(summarize_day(date, changes, cumulative));
    }
    days
}

#[allow(clippy::cast_precision_loss)]
fn summarize_day(date: NaiveDate, changes: &[&DiaperRecord], cumulative: usize) -> DiaperDay {
    let total = changes.len();
    let pees = changes.iter().filter(|c| c.contents.is_pee()).count();
    let poops = changes.iter().filter(|c| c.contents.is_poop()).count();

    let poop_ratio = (total > 0).then(|| poops as f64 / total as f64 * 100.0);

    // Mean of the actual gaps: span between first and last change divided by
    // the number of gaps, undefined with fewer than two changes.
    let change_gap_hours = (total >= 2).then(|| {
        let first = changes[0].time;
        let last = changes[total - 1].time;
        hours_between(first, last) / (total - 1) as f64
    });

    DiaperDay {
        date,
        total,
        pees,
        poops,
        cumulative,
        poop_ratio,
        change_gap_hours,
    }
}
