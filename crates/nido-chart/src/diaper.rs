//! The diaper figure: nine panels of daily and monthly diaper series.

use chrono::NaiveDate;
use nido_core::monthly::{self, MonthlyBucket};
use nido_core::{DateSpan, DiaperDay};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::axis::MonthlyAxis;
use crate::canvas::{Chart, ChartError};
use crate::panel::{date_line_panel, grid};
use crate::series::OptPoint;

/// 3x3 figure over a daily diaper series.
#[derive(Debug)]
pub struct DiaperCharts<'a> {
    days: &'a [DiaperDay],
    monthly_totals: Vec<MonthlyBucket>,
    constipation: Vec<MonthlyBucket>,
    diarrhea: Vec<MonthlyBucket>,
    axis: MonthlyAxis,
}

impl<'a> DiaperCharts<'a> {
    pub fn new(days: &'a [DiaperDay], year_one_only: bool) -> Result<Self, ChartError> {
        let span = DateSpan::from_dates(days.iter().map(|d| d.date))
            .ok_or(ChartError::Empty("diaper charts"))?;

        #[allow(clippy::cast_precision_loss)]
        let monthly_totals = monthly::resample_sum(days, |d| d.date, |d| d.total as f64);
        let constipation = monthly::count_days_where(days, |d| d.date, DiaperDay::is_constipated);
        let diarrhea = monthly::count_days_where(days, |d| d.date, DiaperDay::is_diarrhea);

        Ok(Self {
            days,
            monthly_totals,
            constipation,
            diarrhea,
            axis: MonthlyAxis::new(span, year_one_only),
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn daily<F: Fn(&DiaperDay) -> Option<f64>>(&self, value: F) -> Vec<OptPoint<NaiveDate>> {
        self.days.iter().map(|d| (d.date, value(d))).collect()
    }
}

fn bucket_points(buckets: &[MonthlyBucket]) -> Vec<OptPoint<NaiveDate>> {
    buckets.iter().map(|b| (b.month, Some(b.value))).collect()
}

impl Chart for DiaperCharts<'_> {
    fn name(&self) -> &'static str {
        "diaper"
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), ChartError> {
        let panels = grid(root, 3, 3);
        let axis = &self.axis;

        date_line_panel(
            &panels[0],
            "Diaper: Total Diapers (Cumulative)",
            "Total Diapers",
            axis,
            &self.daily(|d| Some(d.cumulative as f64)),
        )?;
        date_line_panel(
            &panels[1],
            "Diaper: Number of Diapers by Month",
            "Diapers per Month",
            axis,
            &bucket_points(&self.monthly_totals),
        )?;
        date_line_panel(
            &panels[2],
            "Diaper: Number of Diapers by Day",
            "Diapers per Day",
            axis,
            &self.daily(|d| Some(d.total as f64)),
        )?;
        date_line_panel(
            &panels[3],
            "Diaper: Daily Total Pees",
            "Total Pees",
            axis,
            &self.daily(|d| Some(d.pees as f64)),
        )?;
        date_line_panel(
            &panels[4],
            "Diaper: Daily Total Poops",
            "Total Poops",
            axis,
            &self.daily(|d| Some(d.poops as f64)),
        )?;
        date_line_panel(
            &panels[5],
            "Diaper: Average Time Between Changes (Hours)",
            "Hours Between Changes",
            axis,
            &self.daily(|d| d.change_gap_hours),
        )?;
        date_line_panel(
            &panels[6],
            "Diaper: Poop as Percentage of Changes",
            "Poop Ratio (%)",
            axis,
            &self.daily(|d| d.poop_ratio),
        )?;
        date_line_panel(
            &panels[7],
            "Diaper: Constipated Days by Month",
            "Constipated Days",
            axis,
            &bucket_points(&self.constipation),
        )?;
        date_line_panel(
            &panels[8],
            "Diaper: Diarrhea Days by Month",
            "Diarrhea Days",
            axis,
            &bucket_points(&self.diarrhea),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_is_rejected() {
        let err = DiaperCharts::new(&[], false).unwrap_err();
        assert!(matches!(err, ChartError::Empty(_)));
    }

    #[test]
    fn monthly_series_are_derived_on_construction() {
        let days = vec![
            DiaperDay {
                date: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
                total: 8,
                pees: 6,
                poops: 0,
                cumulative: 8,
                poop_ratio: Some(0.0),
                change_gap_hours: Some(2.0),
            },
            DiaperDay {
                date: NaiveDate::from_ymd_opt(2019, 2, 1).unwrap(),
                total: 6,
                pees: 2,
                poops: 5,
                cumulative: 14,
                poop_ratio: Some(83.3),
                change_gap_hours: Some(3.0),
            },
        ];
        let charts = DiaperCharts::new(&days, false).unwrap();
        assert_eq!(charts.monthly_totals.len(), 2);
        assert!((charts.constipation[0].value - 1.0).abs() < 1e-9);
        assert!((charts.diarrhea[1].value - 1.0).abs() < 1e-9);
    }
}
