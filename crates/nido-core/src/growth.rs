//! Growth and weight series derivation.
//!
//! Ages are fractional months (elapsed days over the mean synodic-calendar
//! month length). The scale's weight series is reindexed to every calendar
//! day before the rate-of-change is computed, so measurement gaps surface as
//! missing values rather than stretched slopes.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::DateSpan;
use crate::record::{GrowthRecord, WeightRecord};

/// Mean calendar-month length in days (365.2425 / 12).
pub const DAYS_PER_MONTH: f64 = 30.436875;

/// Ounces per kilogram, for the rate-of-change series.
pub const OZ_PER_KG: f64 = 35.274;

/// Trailing window for the weight rate-of-change average, in days.
pub const ROC_WINDOW_DAYS: usize = 14;

/// Age at `date` in fractional months.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn age_months(birthday: NaiveDate, date: NaiveDate) -> f64 {
    (date - birthday).num_days() as f64 / DAYS_PER_MONTH
}

/// One clinic measurement plotted against age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasurementPoint {
    pub date: NaiveDate,
    pub age_months: f64,
    pub value: f64,
}

/// Height measurements against age, skipping rows without a height.
#[must_use]
pub fn height_series(records: &[GrowthRecord], birthday: NaiveDate) -> Vec<MeasurementPoint> {
    records
        .iter()
        .filter_map(|r| {
            r.height_cm.map(|value| MeasurementPoint {
                date: r.date,
                age_months: age_months(birthday, r.date),
                value,
            })
        })
        .collect()
}

/// Head-circumference measurements against age.
#[must_use]
pub fn head_series(records: &[GrowthRecord], birthday: NaiveDate) -> Vec<MeasurementPoint> {
    records
        .iter()
        .filter_map(|r| {
            r.head_circumference_cm.map(|value| MeasurementPoint {
                date: r.date,
                age_months: age_months(birthday, r.date),
                value,
            })
        })
        .collect()
}

/// One day of the reindexed weight series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightDay {
    pub date: NaiveDate,
    pub age_months: f64,
    /// Scale reading for the day, `None` when nothing was recorded.
    pub weight_kg: Option<f64>,
    /// Growth-standard percentile in `[0, 100]`, when the scale reported one.
    pub percentile: Option<f64>,
    /// Trailing 14-day mean of the day-over-day change, in ounces.
    pub roc_oz: Option<f64>,
}

/// Builds the daily weight series from raw scale readings.
///
/// Dates with more than one reading are dropped entirely (conflicting scale
/// entries are untrustworthy), the remainder is reindexed to every calendar
/// day in the observed range, and the rate-of-change average runs over a
/// trailing [`ROC_WINDOW_DAYS`] window. Days where the day-over-day diff is
/// undefined contribute zero to the window, matching a series that treats
/// unmeasured days as flat.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn weight_daily(records: &[WeightRecord], birthday: NaiveDate) -> Vec<WeightDay> {
    let deduped = drop_duplicate_dates(records);
    let Some(span) = DateSpan::from_dates(deduped.iter().map(|r| r.date)) else {
        return Vec::new();
    };

    let by_date: std::collections::BTreeMap<NaiveDate, &WeightRecord> =
        deduped.iter().map(|r| (r.date, *r)).collect();

    let mut days = Vec::with_capacity(usize::try_from(span.len_days()).unwrap_or_default());
    let mut diffs: Vec<f64> = Vec::with_capacity(days.capacity());
    let mut previous_weight: Option<f64> = None;
    for date in span.iter() {
        let reading = by_date.get(&date);
        let weight_kg = reading.map(|r| r.weight_kg);
        let percentile = reading.and_then(|r| r.percentile.map(|p| p * 100.0));

        let diff = match (previous_weight, weight_kg) {
            (Some(prev), Some(current)) => current - prev,
            _ => 0.0,
        };
        diffs.push(diff);
        // The diff chain only links adjacent days; a missing day breaks it.
        previous_weight = weight_kg;

        let index = diffs.len();
        let roc_oz = (index >= ROC_WINDOW_DAYS).then(|| {
            let window = &diffs[index - ROC_WINDOW_DAYS..index];
            window.iter().sum::<f64>() / ROC_WINDOW_DAYS as f64 * OZ_PER_KG
        });

        days.push(WeightDay {
            date,
            age_months: age_months(birthday, date),
            weight_kg,
            percentile,
            roc_oz,
        });
    }
    days
}

/// Pairs each height measurement with the same-day scale weight, for the
/// weight-for-length chart. Heights without a weight reading are skipped.
#[must_use]
pub fn weight_length_pairs(
    heights: &[MeasurementPoint],
    weights: &[WeightDay],
) -> Vec<(f64, f64)> {
    let by_date: std::collections::BTreeMap<NaiveDate, f64> = weights
        .iter()
        .filter_map(|w| w.weight_kg.map(|kg| (w.date, kg)))
        .collect();
    heights
        .iter()
        .filter_map(|h| by_date.get(&h.date).map(|kg| (h.value, *kg)))
        .collect()
}

fn drop_duplicate_dates(records: &[WeightRecord]) -> Vec<&WeightRecord> {
    let mut counts: std::collections::BTreeMap<NaiveDate, usize> =
        std::collections::BTreeMap::new();
    for record in records {
        *counts.entry(record.date).or_default() += 1;
    }
    records
        .iter()
        .filter(|r| counts.get(&r.date).copied() == Some(1))
        .collect()
}
