//! The feeding figure: volume, session, and timing panels for bottle and
//! solid feedings.

use chrono::NaiveDate;
use nido_core::feeding::combine_bottle_solid;
use nido_core::{DateSpan, FeedingDay};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::axis::MonthlyAxis;
use crate::canvas::{Chart, ChartError};
use crate::panel::{BandPoint, date_band_panel, date_line_panel, grid};
use crate::series::OptPoint;

/// 3x3 figure (eight panels used) over bottle and solid daily series.
#[derive(Debug)]
pub struct FeedingCharts<'a> {
    bottle: &'a [FeedingDay],
    solid: &'a [FeedingDay],
    combined_oz: Vec<(NaiveDate, f64)>,
    axis: MonthlyAxis,
}

impl<'a> FeedingCharts<'a> {
    pub fn new(
        bottle: &'a [FeedingDay],
        solid: &'a [FeedingDay],
        year_one_only: bool,
    ) -> Result<Self, ChartError> {
        // Solids start months after bottles; the axis follows whichever
        // series exists, preferring the longer bottle history.
        let span = DateSpan::from_dates(bottle.iter().chain(solid).map(|d| d.date))
            .ok_or(ChartError::Empty("feeding charts"))?;
        Ok(Self {
            bottle,
            solid,
            combined_oz: combine_bottle_solid(bottle, solid),
            axis: MonthlyAxis::new(span, year_one_only),
        })
    }

    fn bottle_daily<F: Fn(&FeedingDay) -> Option<f64>>(&self, value: F) -> Vec<OptPoint<NaiveDate>> {
        self.bottle.iter().map(|d| (d.date, value(d))).collect()
    }
}

impl Chart for FeedingCharts<'_> {
    fn name(&self) -> &'static str {
        "feeding"
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), ChartError> {
        let panels = grid(root, 3, 3);
        let axis = &self.axis;

        let volume_band: Vec<BandPoint> = self
            .bottle
            .iter()
            .map(|d| BandPoint {
                date: d.date,
                mid: d.mean,
                lo: d.min,
                hi: d.max,
            })
            .collect();
        date_band_panel(
            &panels[0],
            "Eat: Daily Volume Per Session (mL)",
            "Volume Per Session (mL)",
            axis,
            &volume_band,
        )?;
        date_line_panel(
            &panels[1],
            "Eat: Daily Number of Feeding Sessions",
            "Feeding Sessions",
            axis,
            &self.bottle_daily(|d| Some(d.sessions as f64)),
        )?;
        date_line_panel(
            &panels[2],
            "Eat: Daily Total Volume (mL)",
            "Daily Total (mL)",
            axis,
            &self.bottle_daily(|d| Some(d.sum)),
        )?;
        date_line_panel(
            &panels[3],
            "Eat: Daily Total Daytime Volume (mL)",
            "Daytime Volume (mL)",
            axis,
            &self.bottle_daily(|d| Some(d.daytime_sum)),
        )?;
        date_line_panel(
            &panels[4],
            "Eat: Daily Total Nighttime Volume (mL)",
            "Nighttime Volume (mL)",
            axis,
            &self.bottle_daily(|d| Some(d.nighttime_sum)),
        )?;
        date_line_panel(
            &panels[5],
            "Eat: Daily Total Solid Feeding (oz)",
            "Solid Feeding (oz)",
            axis,
            &self
                .solid
                .iter()
                .map(|d| (d.date, Some(d.sum)))
                .collect::<Vec<_>>(),
        )?;
        date_line_panel(
            &panels[6],
            "Eat: Daily Total Bottle + Solid (oz)",
            "Bottle + Solid (oz)",
            axis,
            &self
                .combined_oz
                .iter()
                .map(|(date, oz)| (*date, Some(*oz)))
                .collect::<Vec<_>>(),
        )?;
        let gap_band: Vec<BandPoint> = self
            .bottle
            .iter()
            .map(|d| BandPoint {
                date: d.date,
                mid: d.gap_mean_hours,
                lo: d.gap_min_hours,
                hi: d.gap_max_hours,
            })
            .collect();
        date_band_panel(
            &panels[7],
            "Eat: Daytime Feeding Time Gap (Hr)",
            "Feeding Time Gap (Hr)",
            axis,
            &gap_band,
        )?;
        Ok(())
    }
}
