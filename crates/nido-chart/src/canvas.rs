//! Canvas setup and image export.
//!
//! Charts describe themselves against an abstract drawing backend; this
//! module owns the concrete backends and turns a drawn canvas into encoded
//! image bytes (PNG via an RGB buffer, or SVG text).

use std::io::Cursor;

use image::{DynamicImage, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chart rendering errors.
#[derive(Debug, Error)]
pub enum ChartError {
    /// A plotters drawing primitive failed.
    #[error("chart drawing failed: {0}")]
    Draw(String),
    /// The chart has no data to establish an axis range from.
    #[error("cannot render {0}: no data in range")]
    Empty(&'static str),
    /// PNG encoding failed.
    #[error("failed to encode chart image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Maps any backend error into [`ChartError::Draw`].
pub(crate) fn draw_err<E: std::error::Error>(err: E) -> ChartError {
    ChartError::Draw(err.to_string())
}

/// Output image encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    #[default]
    Png,
    Svg,
}

impl ImageEncoding {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

/// Canvas size and encoding for one rendered chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub encoding: ImageEncoding,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 3200,
            height: 2000,
            encoding: ImageEncoding::Png,
        }
    }
}

/// A multi-panel figure that can draw itself onto any backend.
pub trait Chart {
    /// Human-readable name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Draws the whole figure onto a prepared (filled) root area.
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), ChartError>;
}

/// Renders a chart to encoded image bytes.
pub fn render<C: Chart>(chart: &C, options: &RenderOptions) -> Result<Vec<u8>, ChartError> {
    tracing::debug!(
        chart = chart.name(),
        width = options.width,
        height = options.height,
        encoding = ?options.encoding,
        "rendering chart"
    );
    match options.encoding {
        ImageEncoding::Png => render_png(chart, options.width, options.height),
        ImageEncoding::Svg => render_svg(chart, options.width, options.height),
    }
}

fn render_png<C: Chart>(chart: &C, width: u32, height: u32) -> Result<Vec<u8>, ChartError> {
    let mut rgb_buffer = vec![255u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut rgb_buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        chart.draw(&root)?;
        root.present().map_err(draw_err)?;
    }

    let rgb_image = RgbImage::from_raw(width, height, rgb_buffer)
        .ok_or_else(|| ChartError::Draw("image buffer conversion failed".to_string()))?;
    let mut output = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb_image).write_to(&mut output, image::ImageFormat::Png)?;
    Ok(output.into_inner())
}

fn render_svg<C: Chart>(chart: &C, width: u32, height: u32) -> Result<Vec<u8>, ChartError> {
    let mut document = String::new();
    {
        let root = SVGBackend::with_string(&mut document, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        chart.draw(&root)?;
        root.present().map_err(draw_err)?;
    }
    Ok(document.into_bytes())
}
