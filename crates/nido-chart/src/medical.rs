//! The medical figure: monthly sums of misc events and vomit gap series.

use chrono::NaiveDate;
use nido_core::medical::occurrence_gaps;
use nido_core::monthly::{self, MonthlyBucket};
use nido_core::{DateSpan, MiscRecord};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::axis::MonthlyAxis;
use crate::canvas::{Chart, ChartError};
use crate::panel::{date_line_panel, grid};
use crate::series::OptPoint;

/// 2x3 figure (four panels used) over the misc medical table.
#[derive(Debug)]
pub struct MedicalCharts {
    vomit_monthly: Vec<MonthlyBucket>,
    daycare_monthly: Vec<MonthlyBucket>,
    doctor_monthly: Vec<MonthlyBucket>,
    vomit_gaps: Vec<OptPoint<NaiveDate>>,
    axis: MonthlyAxis,
}

impl MedicalCharts {
    #[allow(clippy::cast_precision_loss)]
    pub fn new(records: &[MiscRecord], year_one_only: bool) -> Result<Self, ChartError> {
        let span = DateSpan::from_dates(records.iter().map(|r| r.date))
            .ok_or(ChartError::Empty("medical charts"))?;

        let vomit_gaps = occurrence_gaps(records, |r| r.vomit)
            .into_iter()
            .map(|gap| (gap.date, gap.days_since_previous.map(|d| d as f64)))
            .collect();

        Ok(Self {
            vomit_monthly: monthly::resample_sum(records, |r| r.date, |r| f64::from(r.vomit)),
            daycare_monthly: monthly::resample_sum(records, |r| r.date, |r| f64::from(r.daycare)),
            doctor_monthly: monthly::resample_sum(records, |r| r.date, |r| f64::from(r.doctor)),
            vomit_gaps,
            axis: MonthlyAxis::new(span, year_one_only),
        })
    }
}

fn bucket_points(buckets: &[MonthlyBucket]) -> Vec<OptPoint<NaiveDate>> {
    buckets.iter().map(|b| (b.month, Some(b.value))).collect()
}

impl Chart for MedicalCharts {
    fn name(&self) -> &'static str {
        "medical"
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), ChartError> {
        let panels = grid(root, 2, 3);
        let axis = &self.axis;

        date_line_panel(
            &panels[0],
            "Total Number of Vomits by Month",
            "Total Vomits",
            axis,
            &bucket_points(&self.vomit_monthly),
        )?;
        date_line_panel(
            &panels[1],
            "Days Since Last Vomit",
            "Days Since Last Vomit",
            axis,
            &self.vomit_gaps,
        )?;
        date_line_panel(
            &panels[2],
            "Number of Days in Daycare by Month",
            "Days in Daycare",
            axis,
            &bucket_points(&self.daycare_monthly),
        )?;
        date_line_panel(
            &panels[3],
            "Total Number of Doctor Visits by Month",
            "Doctor Visits",
            axis,
            &bucket_points(&self.doctor_monthly),
        )?;
        Ok(())
    }
}
