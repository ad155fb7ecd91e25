//! Shared figure styling.

use plotters::prelude::*;

pub(crate) const FONT_FAMILY: &str = "sans-serif";

pub(crate) const TITLE_FONT_SIZE: i32 = 22;
pub(crate) const AXIS_FONT_SIZE: i32 = 14;
pub(crate) const STRIP_TITLE_FONT_SIZE: i32 = 40;
pub(crate) const STRIP_AXIS_FONT_SIZE: i32 = 18;

pub(crate) const PANEL_MARGIN: i32 = 12;
pub(crate) const X_LABEL_AREA: u32 = 44;
pub(crate) const Y_LABEL_AREA: u32 = 64;
pub(crate) const X_LABEL_COUNT: usize = 12;
pub(crate) const Y_LABEL_COUNT: usize = 6;

/// Primary data series.
pub(crate) const SERIES: RGBColor = RGBColor(31, 119, 180);
/// Measurement overlays on reference charts.
pub(crate) const MEASUREMENT: RGBColor = RED;
/// Percentile reference curves, drawn faint.
pub(crate) const REFERENCE: RGBColor = RGBColor(100, 100, 100);
pub(crate) const REFERENCE_ALPHA: f64 = 0.4;
/// Band fill between min/max envelopes and the mean.
pub(crate) const BAND_ALPHA: f64 = 0.3;
