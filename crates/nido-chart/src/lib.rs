//! Multi-panel chart rendering for nido.
//!
//! This crate turns the aggregates from `nido-core` into rendered figures:
//! - Category figures: diaper, sleep, feeding, growth, medical
//! - 24-hour day-strip visualizations for sleep, feeding, and diapers
//! - PNG and SVG export at configurable dimensions

mod axis;
mod canvas;
mod diaper;
mod feeding;
mod growth;
mod medical;
mod panel;
mod series;
mod sleep;
mod strips;
mod style;

pub use axis::MonthlyAxis;
pub use canvas::{Chart, ChartError, ImageEncoding, RenderOptions, render};
pub use diaper::DiaperCharts;
pub use feeding::FeedingCharts;
pub use growth::{GrowthCharts, GrowthReferences};
pub use medical::MedicalCharts;
pub use sleep::SleepCharts;
pub use strips::{Orientation, PointStrip, SleepStrip};
