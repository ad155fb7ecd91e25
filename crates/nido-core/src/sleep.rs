//! Daily sleep aggregation.
//!
//! Sessions are attributed to the calendar day they begin. A session that
//! crosses midnight splits its duration: the portion past midnight is
//! subtracted from the start day's total and carried forward as a credit
//! onto the next day, so summing the daily totals over the whole range
//! recovers the raw session total exactly.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::{DateSpan, DayWindow, decimal_hour, group_by_day, hours_between};
use crate::record::SleepRecord;

/// Sessions at or below this length are ignored when computing awake gaps.
/// They still count toward total duration; the tracking app logs brief
/// resettles that would otherwise split one long awake stretch in two.
pub const MIN_GAP_SESSION_HOURS: f64 = 2.0 / 60.0;

/// Default nap window: sessions contained in 07:00-19:00 count as naps.
#[must_use]
pub const fn default_nap_window() -> DayWindow {
    DayWindow::from_hours(7.0, 19.0)
}

/// Sleep statistics for one calendar day, durations in fractional hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SleepDay {
    pub date: NaiveDate,
    /// Number of nap sessions (contained in the nap window, same-day).
    pub naps: usize,
    /// Total sleep attributed to this day after midnight splitting.
    pub total_hours: f64,
    /// Portion of the total spent in nap sessions.
    pub nap_hours: f64,
    /// Remainder of the total outside nap sessions.
    pub night_hours: f64,
    /// Longest single session beginning this day, unsplit.
    pub longest_hours: Option<f64>,
    /// Longest awake stretch between consecutive sessions.
    pub max_awake_hours: Option<f64>,
}

/// Aggregates sleep sessions into one row per day across `span`.
///
/// Days are processed chronologically so the midnight carry-over flows from
/// each day into the next. A day with no sessions still receives whatever
/// the previous day carried past midnight.
pub fn aggregate_daily(
    records: &[SleepRecord],
    span: DateSpan,
    nap_window: DayWindow,
) -> Vec<SleepDay> {
    let groups = group_by_day(records, SleepRecord::day);

    let mut days = Vec::with_capacity(usize::try_from(span.len_days()).unwrap_or_default());
    let mut carried_hours = 0.0;
    for date in span.iter() {
        let sessions = groups.get(&date).map_or(&[][..], Vec::as_slice);
        let (day, carry_out) = summarize_day(date, sessions, carried_hours, nap_window);
        carried_hours = carry_out;
        days.push(day);
    }
    days
}

fn summarize_day(
    date: NaiveDate,
    sessions: &[&SleepRecord],
    carried_hours: f64,
    nap_window: DayWindow,
) -> (SleepDay, f64) {
    let mut total_hours: f64 = sessions.iter().map(|s| s.duration_hours()).sum();

    // Defer the past-midnight portion of each crossing session to tomorrow.
    let carry_out: f64 = sessions
        .iter()
        .filter(|s| s.crosses_midnight())
        .map(|s| decimal_hour(s.end))
        .sum();
    total_hours += carried_hours;
    total_hours -= carry_out;

    let longest_hours = sessions
        .iter()
        .map(|s| s.duration_hours())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));

    // Awake gaps skip sub-threshold resettles; sessions arrive begin-sorted.
    let gap_sessions: Vec<&&SleepRecord> = sessions
        .iter()
        .filter(|s| s.duration_hours() > MIN_GAP_SESSION_HOURS)
        .collect();
    let max_awake_hours = gap_sessions
        .windows(2)
        .map(|pair| hours_between(pair[0].end, pair[1].begin))
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));

    let nap_sessions: Vec<&&SleepRecord> = sessions
        .iter()
        .filter(|s| {
            s.end.date() == date && nap_window.contains(s.begin) && nap_window.contains(s.end)
        })
        .collect();
    let naps = nap_sessions.len();
    let nap_hours: f64 = nap_sessions.iter().map(|s| s.duration_hours()).sum();
    let night_hours = total_hours - nap_hours;

    let day = SleepDay {
        date,
        naps,
        total_hours,
        nap_hours,
        night_hours,
        longest_hours,
        max_awake_hours,
    };
    (day, carry_out)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 6, d).unwrap()
    }

    fn stamp(d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(d).and_hms_opt(h, min, 0).unwrap()
    }

    fn session(begin: NaiveDateTime, end: NaiveDateTime) -> SleepRecord {
        SleepRecord { begin, end }
    }

    #[test]
    fn midnight_crossing_splits_between_days() {
        // 23:00 -> 01:30: 1.0 h on the start day, 1.5 h on the next.
        let records = vec![session(stamp(1, 23, 0), stamp(2, 1, 30))];
        let span = DateSpan::new(date(1), date(2));
        let days = aggregate_daily(&records, span, default_nap_window());

        assert!((days[0].total_hours - 1.0).abs() < 1e-9);
        assert!((days[1].total_hours - 1.5).abs() < 1e-9);
        let total: f64 = days.iter().map(|d| d.total_hours).sum();
        assert!((total - 2.5).abs() < 1e-9, "no duration lost or duplicated");
    }

    #[test]
    fn carry_over_conserves_raw_duration_over_many_days() {
        let records = vec![
            session(stamp(1, 9, 0), stamp(1, 10, 30)),
            session(stamp(1, 22, 0), stamp(2, 6, 0)),
            session(stamp(2, 13, 0), stamp(2, 14, 0)),
            session(stamp(2, 23, 30), stamp(3, 7, 15)),
            session(stamp(3, 12, 0), stamp(3, 13, 45)),
        ];
        let raw: f64 = records.iter().map(SleepRecord::duration_hours).sum();
        let span = DateSpan::new(date(1), date(3));
        let days = aggregate_daily(&records, span, default_nap_window());
        let attributed: f64 = days.iter().map(|d| d.total_hours).sum();
        assert!((attributed - raw).abs() < 1e-9);
    }

    #[test]
    fn empty_day_still_receives_carry() {
        // Session ends at 02:00 on day 2; day 2 has no sessions of its own.
        let records = vec![session(stamp(1, 22, 0), stamp(2, 2, 0))];
        let span = DateSpan::new(date(1), date(3));
        let days = aggregate_daily(&records, span, default_nap_window());

        assert!((days[0].total_hours - 2.0).abs() < 1e-9);
        assert!((days[1].total_hours - 2.0).abs() < 1e-9);
        assert_eq!(days[1].naps, 0);
        assert_eq!(days[1].longest_hours, None);
        assert_eq!(days[1].max_awake_hours, None);
        assert!((days[2].total_hours).abs() < f64::EPSILON);
    }

    #[test]
    fn longest_session_is_unsplit() {
        let records = vec![
            session(stamp(1, 9, 0), stamp(1, 10, 0)),
            session(stamp(1, 22, 0), stamp(2, 4, 0)),
        ];
        let span = DateSpan::new(date(1), date(2));
        let days = aggregate_daily(&records, span, default_nap_window());
        // The crossing session counts its full 6 h as the longest, even
        // though only 2 h of it land on day 1's total.
        assert!((days[0].longest_hours.unwrap() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn short_sessions_excluded_from_gaps_but_not_total() {
        let records = vec![
            session(stamp(1, 8, 0), stamp(1, 9, 0)),
            // One-minute resettle in the middle of the awake stretch.
            session(stamp(1, 11, 0), stamp(1, 11, 1)),
            session(stamp(1, 15, 0), stamp(1, 16, 0)),
        ];
        let span = DateSpan::new(date(1), date(1));
        let day = aggregate_daily(&records, span, default_nap_window())[0];

        // Gap measured 09:00 -> 15:00, skipping the resettle.
        assert!((day.max_awake_hours.unwrap() - 6.0).abs() < 1e-9);
        // Total still includes the one-minute session.
        assert!((day.total_hours - (2.0 + 1.0 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn naps_require_containment_in_window_and_day() {
        let records = vec![
            session(stamp(1, 9, 0), stamp(1, 10, 0)),   // nap
            session(stamp(1, 6, 30), stamp(1, 7, 30)),  // begins before window
            session(stamp(1, 18, 30), stamp(1, 19, 30)), // ends after window
            session(stamp(1, 12, 0), stamp(1, 12, 45)), // nap
            session(stamp(1, 21, 0), stamp(2, 6, 0)),   // crosses midnight
        ];
        let span = DateSpan::new(date(1), date(2));
        let days = aggregate_daily(&records, span, default_nap_window());
        assert_eq!(days[0].naps, 2);
        assert!((days[0].nap_hours - 1.75).abs() < 1e-9);
        assert!(
            (days[0].nap_hours + days[0].night_hours - days[0].total_hours).abs() < 1e-9,
            "nap and night hours partition the total"
        );
    }

    #[test]
    fn nap_window_end_is_exclusive() {
        let records = vec![session(stamp(1, 18, 0), stamp(1, 19, 0))];
        let span = DateSpan::new(date(1), date(1));
        let day = aggregate_daily(&records, span, default_nap_window())[0];
        // Ends exactly at 19:00, outside the half-open window.
        assert_eq!(day.naps, 0);
    }

    #[test]
    fn single_session_has_no_awake_gap() {
        let records = vec![session(stamp(1, 9, 0), stamp(1, 11, 0))];
        let span = DateSpan::new(date(1), date(1));
        let day = aggregate_daily(&records, span, default_nap_window())[0];
        assert_eq!(day.max_awake_hours, None);
    }
}
