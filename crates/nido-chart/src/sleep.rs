//! The sleep figure: six panels of daily sleep statistics.

use chrono::NaiveDate;
use nido_core::{DateSpan, SleepDay};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::axis::MonthlyAxis;
use crate::canvas::{Chart, ChartError};
use crate::panel::{date_line_panel, grid};
use crate::series::OptPoint;

/// 2x3 figure over a daily sleep series.
#[derive(Debug)]
pub struct SleepCharts<'a> {
    days: &'a [SleepDay],
    axis: MonthlyAxis,
}

impl<'a> SleepCharts<'a> {
    pub fn new(days: &'a [SleepDay], year_one_only: bool) -> Result<Self, ChartError> {
        let span = DateSpan::from_dates(days.iter().map(|d| d.date))
            .ok_or(ChartError::Empty("sleep charts"))?;
        Ok(Self {
            days,
            axis: MonthlyAxis::new(span, year_one_only),
        })
    }

    fn daily<F: Fn(&SleepDay) -> Option<f64>>(&self, value: F) -> Vec<OptPoint<NaiveDate>> {
        self.days.iter().map(|d| (d.date, value(d))).collect()
    }
}

impl Chart for SleepCharts<'_> {
    fn name(&self) -> &'static str {
        "sleep"
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), ChartError> {
        let panels = grid(root, 2, 3);
        let axis = &self.axis;

        date_line_panel(
            &panels[0],
            "Sleep: Daily Total Naps (7:00-19:00)",
            "Total Naps",
            axis,
            &self.daily(|d| Some(d.naps as f64)),
        )?;
        date_line_panel(
            &panels[1],
            "Sleep: Daily Longest Sleep Duration (Hr)",
            "Longest Sleep (Hr)",
            axis,
            &self.daily(|d| d.longest_hours),
        )?;
        date_line_panel(
            &panels[2],
            "Sleep: Daily Total Sleep (Hr)",
            "Total Sleep (Hr)",
            axis,
            &self.daily(|d| Some(d.total_hours)),
        )?;
        date_line_panel(
            &panels[3],
            "Sleep: Daily Total Daytime Sleep (Hr)",
            "Daytime Sleep (Hr)",
            axis,
            &self.daily(|d| Some(d.nap_hours)),
        )?;
        date_line_panel(
            &panels[4],
            "Sleep: Daily Total Nighttime Sleep (Hr)",
            "Nighttime Sleep (Hr)",
            axis,
            &self.daily(|d| Some(d.night_hours)),
        )?;
        date_line_panel(
            &panels[5],
            "Sleep: Daily Maximum Awake Duration (Hr)",
            "Max Awake (Hr)",
            axis,
            &self.daily(|d| d.max_awake_hours),
        )?;
        Ok(())
    }
}
