//! 24-hour day-strip visualizations.
//!
//! Each day of life is one column; the clock runs down the other axis with
//! midnight at the top. Sleep renders as bars spanning session times (split
//! at midnight like the daily aggregation), feedings and diapers render as
//! scatter points.

use chrono::NaiveDate;
use nido_core::calendar::decimal_hour;
use nido_core::{DiaperRecord, FeedingRecord, SleepRecord};
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use crate::canvas::{Chart, ChartError, draw_err};
use crate::style;

/// Day-strip layout: days across the x axis (horizontal, the default) or
/// down the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Caps the day axis at one year when year-one clipping is on.
fn day_axis_end(max_day: i32, year_one_only: bool) -> i32 {
    if year_one_only { 366 } else { max_day.max(2) }
}

/// Day number of `date` relative to the series' first day, starting at 1.
#[allow(clippy::cast_possible_truncation)]
fn day_number(first: NaiveDate, date: NaiveDate) -> i32 {
    ((date - first).num_days() + 1) as i32
}

// The clock axis is drawn ascending with the hour transformed so midnight
// sits at the top; labels undo the transform.
fn flip(hour: f64) -> f64 {
    24.0 - hour
}

#[allow(clippy::cast_possible_truncation)]
fn hour_label(value: f64) -> String {
    let hour = (24.0 - value).round() as i32;
    format!("{}:00", hour.rem_euclid(24))
}

fn week_label(day: i32) -> String {
    ((day - 1) / 7).to_string()
}

/// The sleep day-strip figure.
#[derive(Debug)]
pub struct SleepStrip {
    /// (day, start hour, duration): bars never cross midnight.
    bars: Vec<(i32, f64, f64)>,
    day_end: i32,
    orientation: Orientation,
    labels: bool,
}

impl SleepStrip {
    pub fn new(
        sessions: &[SleepRecord],
        year_one_only: bool,
        orientation: Orientation,
        labels: bool,
    ) -> Result<Self, ChartError> {
        let first = sessions
            .iter()
            .map(SleepRecord::day)
            .min()
            .ok_or(ChartError::Empty("sleep strip"))?;

        let mut bars = Vec::with_capacity(sessions.len());
        let mut max_day = 1;
        for session in sessions {
            let day = day_number(first, session.day());
            let start = decimal_hour(session.begin);
            if session.crosses_midnight() {
                // Split at midnight: remainder lands on the next strip.
                bars.push((day, start, 24.0 - start));
                bars.push((day + 1, 0.0, decimal_hour(session.end)));
                max_day = max_day.max(day + 1);
            } else {
                bars.push((day, start, session.duration_hours()));
                max_day = max_day.max(day);
            }
        }

        Ok(Self {
            bars,
            day_end: day_axis_end(max_day, year_one_only),
            orientation,
            labels,
        })
    }
}

impl Chart for SleepStrip {
    fn name(&self) -> &'static str {
        "sleep-strip"
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), ChartError> {
        match self.orientation {
            Orientation::Horizontal => self.draw_horizontal(root),
            Orientation::Vertical => self.draw_vertical(root),
        }
    }
}

impl SleepStrip {
    fn draw_horizontal<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), ChartError> {
        let mut builder = ChartBuilder::on(root);
        builder
            .margin(style::PANEL_MARGIN * 2)
            .x_label_area_size(style::X_LABEL_AREA)
            .y_label_area_size(style::Y_LABEL_AREA);
        if self.labels {
            builder.caption("Sleep", (style::FONT_FAMILY, style::STRIP_TITLE_FONT_SIZE));
        }
        let mut chart = builder
            .build_cartesian_2d(1..self.day_end, 0.0..24.0)
            .map_err(draw_err)?;

        let week_formatter = |day: &i32| week_label(*day);
        let clock_formatter = |value: &f64| hour_label(*value);
        let mut mesh = chart.configure_mesh();
        mesh.x_labels(27)
            .y_labels(25)
            .x_label_formatter(&week_formatter)
            .y_label_formatter(&clock_formatter)
            .label_style((style::FONT_FAMILY, style::STRIP_AXIS_FONT_SIZE));
        if self.labels {
            mesh.x_desc("Age (weeks)").y_desc("Time of Day");
        }
        mesh.draw().map_err(draw_err)?;

        chart
            .draw_series(self.bars.iter().map(|(day, start, duration)| {
                Rectangle::new(
                    [(*day, flip(*start)), (*day + 1, flip(start + duration))],
                    style::SERIES.filled(),
                )
            }))
            .map_err(draw_err)?;
        Ok(())
    }

    fn draw_vertical<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), ChartError> {
        let mut builder = ChartBuilder::on(root);
        builder
            .margin(style::PANEL_MARGIN * 2)
            .x_label_area_size(style::X_LABEL_AREA)
            .y_label_area_size(style::Y_LABEL_AREA);
        if self.labels {
            builder.caption("Sleep", (style::FONT_FAMILY, style::STRIP_TITLE_FONT_SIZE));
        }
        // Days run down the y axis, the clock runs left to right.
        let mut chart = builder
            .build_cartesian_2d(0.0..24.0, 1..self.day_end)
            .map_err(draw_err)?;

        let clock_formatter = |value: &f64| hour_label(flip(*value));
        let week_formatter = |day: &i32| week_label(*day);
        let mut mesh = chart.configure_mesh();
        mesh.x_labels(25)
            .y_labels(27)
            .x_label_formatter(&clock_formatter)
            .y_label_formatter(&week_formatter)
            .label_style((style::FONT_FAMILY, style::STRIP_AXIS_FONT_SIZE));
        if self.labels {
            mesh.x_desc("Time of Day").y_desc("Age (weeks)");
        }
        mesh.draw().map_err(draw_err)?;

        chart
            .draw_series(self.bars.iter().map(|(day, start, duration)| {
                Rectangle::new(
                    [(*start, *day), (start + duration, *day + 1)],
                    style::SERIES.filled(),
                )
            }))
            .map_err(draw_err)?;
        Ok(())
    }
}

/// One scatter group of a point strip, with its legend entry.
struct StripGroup {
    label: String,
    color: RGBColor,
    points: Vec<(i32, f64)>,
}

/// A scatter day-strip figure (feedings or diaper changes).
pub struct PointStrip {
    title: &'static str,
    groups: Vec<StripGroup>,
    day_end: i32,
    labels: bool,
}

impl PointStrip {
    /// Bottle and solid feedings as two colored groups.
    ///
    /// Bottle days are numbered from the first bottle feeding; solids are
    /// numbered from their own first day and shifted by the age at which
    /// they started, so both series share the age axis.
    pub fn feeding(
        bottle: &[FeedingRecord],
        solid: &[FeedingRecord],
        birthday: NaiveDate,
        year_one_only: bool,
        labels: bool,
    ) -> Result<Self, ChartError> {
        if bottle.is_empty() && solid.is_empty() {
            return Err(ChartError::Empty("feeding strip"));
        }

        let mut groups = Vec::new();
        let mut max_day = 1;

        if let Some(first) = bottle.iter().map(FeedingRecord::day).min() {
            let points: Vec<(i32, f64)> = bottle
                .iter()
                .map(|f| (day_number(first, f.day()), decimal_hour(f.time)))
                .collect();
            max_day = max_day.max(points.iter().map(|(d, _)| *d).max().unwrap_or(1));
            groups.push(StripGroup {
                label: "Bottle Feeding".to_string(),
                color: RED,
                points,
            });
        }

        if let Some(first) = solid.iter().map(FeedingRecord::day).min() {
            let start_offset = day_number(birthday, first) - 1;
            let points: Vec<(i32, f64)> = solid
                .iter()
                .map(|f| {
                    (
                        day_number(first, f.day()) + start_offset,
                        decimal_hour(f.time),
                    )
                })
                .collect();
            max_day = max_day.max(points.iter().map(|(d, _)| *d).max().unwrap_or(1));
            groups.push(StripGroup {
                label: "Solid Feeding".to_string(),
                color: BLUE,
                points,
            });
        }

        Ok(Self {
            title: "Feeding",
            groups,
            day_end: day_axis_end(max_day, year_one_only),
            labels,
        })
    }

    /// Diaper changes colored by what they found.
    pub fn diapers(
        changes: &[DiaperRecord],
        year_one_only: bool,
        labels: bool,
    ) -> Result<Self, ChartError> {
        let first = changes
            .iter()
            .map(DiaperRecord::day)
            .min()
            .ok_or(ChartError::Empty("diaper strip"))?;

        let palette: [(&str, RGBColor); 5] = [
            ("Poop, Yellow", BLUE),
            ("Poop, Green", GREEN),
            ("Poop, Brown", MAGENTA),
            ("Poop, Others", RED),
            ("Pee", YELLOW),
        ];
        let mut buckets: [Vec<(i32, f64)>; 5] = Default::default();
        let mut max_day = 1;
        for change in changes {
            let day = day_number(first, change.day());
            max_day = max_day.max(day);
            let index = diaper_group(change);
            buckets[index].push((day, decimal_hour(change.time)));
        }

        let groups = palette
            .into_iter()
            .zip(buckets)
            .map(|((label, color), points)| StripGroup {
                label: label.to_string(),
                color,
                points,
            })
            .collect();

        Ok(Self {
            title: "Diapers",
            groups,
            day_end: day_axis_end(max_day, year_one_only),
            labels,
        })
    }
}

fn diaper_group(change: &DiaperRecord) -> usize {
    if !change.contents.is_poop() {
        return 4;
    }
    match change.color.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("yellow") => 0,
        Some("green") => 1,
        Some("brown") => 2,
        _ => 3,
    }
}

impl Chart for PointStrip {
    fn name(&self) -> &'static str {
        self.title
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), ChartError> {
        let mut builder = ChartBuilder::on(root);
        builder
            .margin(style::PANEL_MARGIN * 2)
            .x_label_area_size(style::X_LABEL_AREA)
            .y_label_area_size(style::Y_LABEL_AREA);
        if self.labels {
            builder.caption(self.title, (style::FONT_FAMILY, style::STRIP_TITLE_FONT_SIZE));
        }
        let mut chart = builder
            .build_cartesian_2d(1..self.day_end, 0.0..24.0)
            .map_err(draw_err)?;

        let week_formatter = |day: &i32| week_label(*day);
        let clock_formatter = |value: &f64| hour_label(*value);
        let mut mesh = chart.configure_mesh();
        mesh.x_labels(27)
            .y_labels(25)
            .x_label_formatter(&week_formatter)
            .y_label_formatter(&clock_formatter)
            .label_style((style::FONT_FAMILY, style::STRIP_AXIS_FONT_SIZE));
        if self.labels {
            mesh.x_desc("Age (weeks)").y_desc("Time of Day");
        }
        mesh.draw().map_err(draw_err)?;

        for group in &self.groups {
            if group.points.is_empty() {
                continue;
            }
            let color = group.color;
            chart
                .draw_series(
                    group
                        .points
                        .iter()
                        .map(|(day, hour)| Circle::new((*day, flip(*hour)), 4, color.filled())),
                )
                .map_err(draw_err)?
                .label(&group.label)
                .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
        }

        if self.labels {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font((style::FONT_FAMILY, style::STRIP_AXIS_FONT_SIZE))
                .draw()
                .map_err(draw_err)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use nido_core::DiaperContents;

    use super::*;

    fn stamp(d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 1, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn crossing_session_splits_into_two_bars() {
        let sessions = vec![SleepRecord {
            begin: stamp(1, 23, 0),
            end: stamp(2, 1, 30),
        }];
        let strip = SleepStrip::new(&sessions, false, Orientation::Horizontal, true).unwrap();
        assert_eq!(strip.bars.len(), 2);
        assert_eq!(strip.bars[0], (1, 23.0, 1.0));
        assert_eq!(strip.bars[1], (2, 0.0, 1.5));
    }

    #[test]
    fn day_axis_caps_at_year_one() {
        let sessions = vec![
            SleepRecord {
                begin: stamp(1, 9, 0),
                end: stamp(1, 10, 0),
            },
        ];
        let strip = SleepStrip::new(&sessions, true, Orientation::Horizontal, false).unwrap();
        assert_eq!(strip.day_end, 366);
    }

    #[test]
    fn empty_sessions_are_rejected() {
        let err = SleepStrip::new(&[], false, Orientation::Horizontal, true).unwrap_err();
        assert!(matches!(err, ChartError::Empty(_)));
    }

    #[test]
    fn solid_feedings_shift_by_start_age() {
        let birthday = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        let bottle = vec![FeedingRecord {
            time: stamp(1, 8, 0),
            amount: 90.0,
        }];
        // Solids start on day 10 of life.
        let solid = vec![FeedingRecord {
            time: stamp(10, 12, 0),
            amount: 1.0,
        }];
        let strip = PointStrip::feeding(&bottle, &solid, birthday, false, true).unwrap();
        let solid_group = &strip.groups[1];
        assert_eq!(solid_group.points[0].0, 10);
    }

    #[test]
    fn diaper_groups_split_by_contents_and_color() {
        let changes = vec![
            DiaperRecord {
                time: stamp(1, 8, 0),
                contents: DiaperContents::Pee,
                color: None,
            },
            DiaperRecord {
                time: stamp(1, 10, 0),
                contents: DiaperContents::Poop,
                color: Some("green".to_string()),
            },
            DiaperRecord {
                time: stamp(1, 12, 0),
                contents: DiaperContents::PeeAndPoop,
                color: Some("mustard".to_string()),
            },
        ];
        let strip = PointStrip::diapers(&changes, false, true).unwrap();
        assert_eq!(strip.groups[4].points.len(), 1, "pee");
        assert_eq!(strip.groups[1].points.len(), 1, "green poop");
        assert_eq!(strip.groups[3].points.len(), 1, "other color");
    }

    #[test]
    fn hour_labels_run_down_from_midnight() {
        assert_eq!(hour_label(24.0), "0:00");
        assert_eq!(hour_label(17.0), "7:00");
        assert_eq!(hour_label(0.0), "0:00");
    }
}
