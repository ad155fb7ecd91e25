//! Reusable panel drawers.
//!
//! Every figure in nido is a grid of panels drawn with one of four shapes:
//! a date-keyed line, a date-keyed mean/min/max band, an x/y line, or an
//! x/y line over percentile reference curves. All drawers are generic over
//! the backend so the same figure renders to PNG or SVG.

use chrono::NaiveDate;
use nido_core::PercentileTable;
use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::ranged1d::Ranged;
use plotters::coord::types::{RangedCoordf64, RangedDate};
use plotters::prelude::*;

use crate::axis::MonthlyAxis;
use crate::canvas::{ChartError, draw_err};
use crate::series::{OptPoint, present_runs, y_extent, y_extent_tight};
use crate::style;

/// Splits the root area into an evenly sized panel grid.
pub(crate) fn grid<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    rows: usize,
    cols: usize,
) -> Vec<DrawingArea<DB, Shift>> {
    root.split_evenly((rows, cols))
}

/// A date panel plotting one possibly-gappy series as a line.
pub(crate) fn date_line_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    y_desc: &str,
    axis: &MonthlyAxis,
    points: &[OptPoint<NaiveDate>],
) -> Result<(), ChartError> {
    let (y_lo, y_hi) = y_extent(points.iter().filter_map(|(_, v)| *v));
    let mut chart = ChartBuilder::on(area)
        .margin(style::PANEL_MARGIN)
        .caption(title, (style::FONT_FAMILY, style::TITLE_FONT_SIZE))
        .x_label_area_size(style::X_LABEL_AREA)
        .y_label_area_size(style::Y_LABEL_AREA)
        .build_cartesian_2d(axis.left..axis.right, y_lo..y_hi)
        .map_err(draw_err)?;
    configure_date_mesh(&mut chart, y_desc)?;
    draw_runs(&mut chart, points, &style::SERIES)
}

/// A date-aligned mean value with its min/max envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BandPoint {
    pub date: NaiveDate,
    pub mid: Option<f64>,
    pub lo: Option<f64>,
    pub hi: Option<f64>,
}

/// A date panel plotting a mean line inside a shaded min/max band.
pub(crate) fn date_band_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    y_desc: &str,
    axis: &MonthlyAxis,
    points: &[BandPoint],
) -> Result<(), ChartError> {
    let (y_lo, y_hi) = y_extent(
        points
            .iter()
            .flat_map(|p| [p.mid, p.lo, p.hi])
            .flatten(),
    );
    let mut chart = ChartBuilder::on(area)
        .margin(style::PANEL_MARGIN)
        .caption(title, (style::FONT_FAMILY, style::TITLE_FONT_SIZE))
        .x_label_area_size(style::X_LABEL_AREA)
        .y_label_area_size(style::Y_LABEL_AREA)
        .build_cartesian_2d(axis.left..axis.right, y_lo..y_hi)
        .map_err(draw_err)?;
    configure_date_mesh(&mut chart, y_desc)?;

    // Shade each contiguous stretch where the whole band is defined.
    let mut segment: Vec<(NaiveDate, f64, f64, f64)> = Vec::new();
    let mut segments: Vec<Vec<(NaiveDate, f64, f64, f64)>> = Vec::new();
    for point in points {
        if let (Some(mid), Some(lo), Some(hi)) = (point.mid, point.lo, point.hi) {
            segment.push((point.date, mid, lo, hi));
        } else if !segment.is_empty() {
            segments.push(std::mem::take(&mut segment));
        }
    }
    if !segment.is_empty() {
        segments.push(segment);
    }

    for segment in segments.iter().filter(|s| s.len() >= 2) {
        let mut upper: Vec<(NaiveDate, f64)> =
            segment.iter().map(|(date, mid, ..)| (*date, *mid)).collect();
        upper.extend(segment.iter().rev().map(|(date, _, _, hi)| (*date, *hi)));
        chart
            .draw_series(std::iter::once(Polygon::new(
                upper,
                style::SERIES.mix(style::BAND_ALPHA).filled(),
            )))
            .map_err(draw_err)?;

        let mut lower: Vec<(NaiveDate, f64)> =
            segment.iter().map(|(date, mid, ..)| (*date, *mid)).collect();
        lower.extend(segment.iter().rev().map(|(date, _, lo, _)| (*date, *lo)));
        chart
            .draw_series(std::iter::once(Polygon::new(
                lower,
                style::SERIES.mix(style::BAND_ALPHA).filled(),
            )))
            .map_err(draw_err)?;
    }

    let mid_points: Vec<OptPoint<NaiveDate>> =
        points.iter().map(|p| (p.date, p.mid)).collect();
    draw_runs(&mut chart, &mid_points, &style::SERIES)
}

/// A plain x/y line panel (used for the age-keyed growth series).
pub(crate) fn xy_line_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    x_range: (f64, f64),
    points: &[OptPoint<f64>],
) -> Result<(), ChartError> {
    let (y_lo, y_hi) = y_extent_tight(points.iter().filter_map(|(_, v)| *v));
    let mut chart = ChartBuilder::on(area)
        .margin(style::PANEL_MARGIN)
        .caption(title, (style::FONT_FAMILY, style::TITLE_FONT_SIZE))
        .x_label_area_size(style::X_LABEL_AREA)
        .y_label_area_size(style::Y_LABEL_AREA)
        .build_cartesian_2d(x_range.0..x_range.1, y_lo..y_hi)
        .map_err(draw_err)?;
    chart
        .configure_mesh()
        .x_labels(style::X_LABEL_COUNT)
        .y_labels(style::Y_LABEL_COUNT)
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style((style::FONT_FAMILY, style::AXIS_FONT_SIZE))
        .draw()
        .map_err(draw_err)?;
    draw_runs(&mut chart, points, &style::MEASUREMENT)
}

/// An x/y measurement line over the nine percentile reference curves.
pub(crate) fn percentile_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    table: &PercentileTable,
    measurements: &[(f64, f64)],
    x_range: (f64, f64),
) -> Result<(), ChartError> {
    let band_values = table
        .rows
        .iter()
        .filter(|row| row.x >= x_range.0 && row.x <= x_range.1)
        .flat_map(|row| row.bands);
    let (y_lo, y_hi) = y_extent_tight(band_values.chain(measurements.iter().map(|(_, y)| *y)));

    let mut chart = ChartBuilder::on(area)
        .margin(style::PANEL_MARGIN)
        .caption(title, (style::FONT_FAMILY, style::TITLE_FONT_SIZE))
        .x_label_area_size(style::X_LABEL_AREA)
        .y_label_area_size(style::Y_LABEL_AREA)
        .build_cartesian_2d(x_range.0..x_range.1, y_lo..y_hi)
        .map_err(draw_err)?;
    chart
        .configure_mesh()
        .x_labels(style::X_LABEL_COUNT)
        .y_labels(style::Y_LABEL_COUNT)
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style((style::FONT_FAMILY, style::AXIS_FONT_SIZE))
        .draw()
        .map_err(draw_err)?;

    for band_index in 0..nido_core::reference::BAND_COLUMNS.len() {
        chart
            .draw_series(LineSeries::new(
                table.band(band_index),
                style::REFERENCE.mix(style::REFERENCE_ALPHA),
            ))
            .map_err(draw_err)?;
    }

    if measurements.len() == 1 {
        chart
            .draw_series(std::iter::once(Circle::new(
                measurements[0],
                3,
                style::MEASUREMENT.filled(),
            )))
            .map_err(draw_err)?;
    } else {
        chart
            .draw_series(LineSeries::new(
                measurements.iter().copied(),
                ShapeStyle::from(&style::MEASUREMENT).stroke_width(2),
            ))
            .map_err(draw_err)?;
    }
    Ok(())
}

fn configure_date_mesh<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedDate<NaiveDate>, RangedCoordf64>>,
    y_desc: &str,
) -> Result<(), ChartError> {
    chart
        .configure_mesh()
        .x_labels(style::X_LABEL_COUNT)
        .y_labels(style::Y_LABEL_COUNT)
        .x_desc("Date")
        .y_desc(y_desc)
        .x_label_formatter(&|date: &NaiveDate| date.format("%b %y").to_string())
        .label_style((style::FONT_FAMILY, style::AXIS_FONT_SIZE))
        .draw()
        .map_err(draw_err)?;
    Ok(())
}

fn draw_runs<DB, X>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<X, RangedCoordf64>>,
    points: &[OptPoint<X::ValueType>],
    color: &RGBColor,
) -> Result<(), ChartError>
where
    DB: DrawingBackend,
    X: Ranged<ValueType: Copy + 'static>,
{
    for run in present_runs(points) {
        if run.len() == 1 {
            // A lone point between gaps would vanish in a line series.
            chart
                .draw_series(std::iter::once(Circle::new(run[0], 3, color.filled())))
                .map_err(draw_err)?;
        } else {
            chart
                .draw_series(LineSeries::new(run, color))
                .map_err(draw_err)?;
        }
    }
    Ok(())
}
