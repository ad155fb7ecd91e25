//! Daily feeding aggregation.
//!
//! One summary row per calendar day: volume statistics, session count,
//! day/night split, and gaps between daytime feedings. The day and night
//! windows partition the clock, so the two split sums always add back up to
//! the daily total.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::{DateSpan, DayWindow, group_by_day, hours_between};
use crate::record::FeedingRecord;

/// Milliliters per fluid ounce, for combining bottle and solid totals.
pub const ML_PER_OZ: f64 = 29.5735;

/// Default daytime window for feedings: 07:00 (inclusive) to 20:00
/// (exclusive). Nighttime is the complement.
#[must_use]
pub const fn default_day_window() -> DayWindow {
    DayWindow::from_hours(7.0, 20.0)
}

/// Feeding statistics for one calendar day.
///
/// Volume fields are in the unit of the underlying records (mL for bottle,
/// oz for solids). `mean`/`min`/`max` and the gap statistics are `None` on
/// days where too few feedings occurred to define them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeedingDay {
    pub date: NaiveDate,
    pub sum: f64,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub sessions: usize,
    pub daytime_sum: f64,
    pub nighttime_sum: f64,
    /// Largest gap between consecutive daytime feedings, in hours.
    pub gap_max_hours: Option<f64>,
    pub gap_mean_hours: Option<f64>,
    pub gap_min_hours: Option<f64>,
}

/// Aggregates feeding records into one row per day across `span`.
///
/// Records outside the span are ignored (the span may be a debug override
/// narrower than the data). Days with no feedings produce identity
/// aggregates: zero sums and counts, undefined statistics.
pub fn aggregate_daily(
    records: &[FeedingRecord],
    span: DateSpan,
    day_window: DayWindow,
) -> Vec<FeedingDay> {
    let groups = group_by_day(records, FeedingRecord::day);

    span.iter()
        .map(|date| {
            let feedings = groups.get(&date).map_or(&[][..], Vec::as_slice);
            summarize_day(date, feedings, day_window)
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn summarize_day(date: NaiveDate, feedings: &[&FeedingRecord], day_window: DayWindow) -> FeedingDay {
    let sum: f64 = feedings.iter().map(|f| f.amount).sum();
    let sessions = feedings.len();
    let mean = (sessions > 0).then(|| sum / sessions as f64);
    let min = feedings.iter().map(|f| f.amount).fold(None, |acc: Option<f64>, v| {
        Some(acc.map_or(v, |a| a.min(v)))
    });
    let max = feedings.iter().map(|f| f.amount).fold(None, |acc: Option<f64>, v| {
        Some(acc.map_or(v, |a| a.max(v)))
    });

    // Loaders sort chronologically, so daytime rows stay in time order here.
    let daytime: Vec<&&FeedingRecord> = feedings
        .iter()
        .filter(|f| day_window.contains(f.time))
        .collect();
    let daytime_sum: f64 = daytime.iter().map(|f| f.amount).sum();
    let nighttime_sum = sum - daytime_sum;

    let gaps: Vec<f64> = daytime
        .windows(2)
        .map(|pair| hours_between(pair[0].time, pair[1].time))
        .collect();
    let (gap_max_hours, gap_mean_hours, gap_min_hours) = if gaps.is_empty() {
        (None, None, None)
    } else {
        let total: f64 = gaps.iter().sum();
        (
            Some(gaps.iter().copied().fold(f64::MIN, f64::max)),
            Some(total / gaps.len() as f64),
            Some(gaps.iter().copied().fold(f64::MAX, f64::min)),
        )
    };

    FeedingDay {
        date,
        sum,
        mean,
        min,
        max,
        sessions,
        daytime_sum,
        nighttime_sum,
        gap_max_hours,
        gap_mean_hours,
        gap_min_hours,
    }
}

/// Combines bottle and solid daily totals into one series in ounces.
///
/// Bottle volumes convert from mL; solids are already in oz. Days present in
/// only one series contribute the other as zero, aligned by date rather than
/// by position so the two series may cover different ranges.
#[must_use]
pub fn combine_bottle_solid(bottle: &[FeedingDay], solid: &[FeedingDay]) -> Vec<(NaiveDate, f64)> {
    let solids: std::collections::BTreeMap<NaiveDate, f64> =
        solid.iter().map(|d| (d.date, d.sum)).collect();
    let mut combined: std::collections::BTreeMap<NaiveDate, f64> = bottle
        .iter()
        .map(|d| (d.date, d.sum / ML_PER_OZ))
        .collect();
    for (date, oz) in solids {
        *combined.entry(date).or_insert(0.0) += oz;
    }
    combined.into_iter().collect()
}
