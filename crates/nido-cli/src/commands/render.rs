//! Render command: the chart job fan-out.
//!
//! One job per enabled figure. Jobs are fully independent (each loads its
//! own inputs and writes its own output file), so they run on the rayon
//! pool and each returns an explicit report; a crashed job is surfaced at
//! the end instead of silently dropping a chart.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use nido_chart::{
    DiaperCharts, FeedingCharts, GrowthCharts, GrowthReferences, MedicalCharts, PointStrip,
    SleepCharts, SleepStrip,
};
use nido_core::{DateSpan, record, reference};
use rayon::prelude::*;

use crate::config::{ChartKind, Config};

/// Outcome of one chart job.
#[derive(Debug)]
pub struct JobReport {
    pub kind: ChartKind,
    pub output: PathBuf,
    pub duration: Duration,
    pub result: Result<()>,
}

/// Renders every enabled chart (optionally restricted by `only`).
pub fn run(config: &Config, only: &[ChartKind]) -> Result<()> {
    let kinds: Vec<ChartKind> = ChartKind::ALL
        .into_iter()
        .filter(|kind| config.charts.enabled(*kind))
        .filter(|kind| only.is_empty() || only.contains(kind))
        .collect();
    if kinds.is_empty() {
        bail!("no charts enabled; check the [charts] config section");
    }

    std::fs::create_dir_all(&config.output.directory).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output.directory.display()
        )
    })?;

    let started = Instant::now();
    let reports: Vec<JobReport> = kinds
        .par_iter()
        .map(|kind| run_job(config, *kind))
        .collect();
    let elapsed = started.elapsed();

    let mut failed = 0usize;
    for report in &reports {
        match &report.result {
            Ok(()) => {
                tracing::info!(
                    chart = %report.kind,
                    path = %report.output.display(),
                    took = ?report.duration,
                    "chart rendered"
                );
            }
            Err(err) => {
                failed += 1;
                tracing::error!(chart = %report.kind, "chart failed: {err:#}");
            }
        }
    }

    println!(
        "Rendered {}/{} charts in {elapsed:.2?}",
        reports.len() - failed,
        reports.len()
    );
    if failed > 0 {
        bail!("{failed} of {} chart jobs failed", reports.len());
    }
    Ok(())
}

fn run_job(config: &Config, kind: ChartKind) -> JobReport {
    let started = Instant::now();
    let output = config.output_path(kind);
    let result = render_job(config, kind, &output);
    JobReport {
        kind,
        output,
        duration: started.elapsed(),
        result,
    }
}

fn render_job(config: &Config, kind: ChartKind, output: &std::path::Path) -> Result<()> {
    let bytes = build_chart(config, kind)?;
    std::fs::write(output, &bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    publish(config, kind, &bytes);
    Ok(())
}

/// Loads, aggregates, and renders one figure to image bytes.
fn build_chart(config: &Config, kind: ChartKind) -> Result<Vec<u8>> {
    let options = config.render_options();
    let year_one = config.output.year_one_only;

    let bytes = match kind {
        ChartKind::Diaper => {
            let records = record::load_diaper_changes(&config.input.diaper)?;
            let span = chart_span(config, records.iter().map(record::DiaperRecord::day))
                .context("no diaper records in range")?;
            let days = nido_core::diaper::aggregate_daily(&records, span);
            nido_chart::render(&DiaperCharts::new(&days, year_one)?, &options)?
        }
        ChartKind::Sleep => {
            let records = record::load_sleep_sessions(&config.input.sleep)?;
            let span = chart_span(config, records.iter().map(record::SleepRecord::day))
                .context("no sleep records in range")?;
            let days = nido_core::sleep::aggregate_daily(
                &records,
                span,
                nido_core::sleep::default_nap_window(),
            );
            nido_chart::render(&SleepCharts::new(&days, year_one)?, &options)?
        }
        ChartKind::Feeding => {
            let (bottle_days, solid_days) = feeding_days(config)?;
            nido_chart::render(
                &FeedingCharts::new(&bottle_days, &solid_days, year_one)?,
                &options,
            )?
        }
        ChartKind::Growth => {
            let references = growth_references(config)?;
            let birthday = config.profile.birthday;

            let measurements = record::load_growth_measurements(&config.input.growth)?;
            let heights = nido_core::growth::height_series(&measurements, birthday);
            let heads = nido_core::growth::head_series(&measurements, birthday);

            let readings = record::load_weight_readings(&config.input.weight)?;
            let weight = nido_core::growth::weight_daily(&readings, birthday);

            nido_chart::render(
                &GrowthCharts::new(&weight, &heights, &heads, &references, year_one),
                &options,
            )?
        }
        ChartKind::Medical => {
            let records = record::load_misc_events(&config.input.misc)?;
            nido_chart::render(&MedicalCharts::new(&records, year_one)?, &options)?
        }
        ChartKind::SleepStrip => {
            let records = record::load_sleep_sessions(&config.input.sleep)?;
            let strip = SleepStrip::new(
                &records,
                year_one,
                config.output.sleep_strip_orientation,
                config.output.strip_labels,
            )?;
            nido_chart::render(&strip, &options)?
        }
        ChartKind::FeedingStrip => {
            let bottle = record::load_bottle_feedings(&config.input.feeding_bottle)?;
            let solid = record::load_solid_feedings(&config.input.feeding_solid)?;
            let strip = PointStrip::feeding(
                &bottle,
                &solid,
                config.profile.birthday,
                year_one,
                config.output.strip_labels,
            )?;
            nido_chart::render(&strip, &options)?
        }
        ChartKind::DiaperStrip => {
            let records = record::load_diaper_changes(&config.input.diaper)?;
            let strip = PointStrip::diapers(&records, year_one, config.output.strip_labels)?;
            nido_chart::render(&strip, &options)?
        }
    };
    Ok(bytes)
}

/// Daily feeding series for both bottle and solid inputs.
///
/// Shared by the feeding figure and `nido summary`.
pub(crate) fn feeding_days(
    config: &Config,
) -> Result<(Vec<nido_core::FeedingDay>, Vec<nido_core::FeedingDay>)> {
    let window = nido_core::feeding::default_day_window();

    let bottle = record::load_bottle_feedings(&config.input.feeding_bottle)?;
    let bottle_days = chart_span(config, bottle.iter().map(record::FeedingRecord::day))
        .map(|span| nido_core::feeding::aggregate_daily(&bottle, span, window))
        .unwrap_or_default();

    // Solids may legitimately be empty for the first months.
    let solid = record::load_solid_feedings(&config.input.feeding_solid)?;
    let solid_days = chart_span(config, solid.iter().map(record::FeedingRecord::day))
        .map(|span| nido_core::feeding::aggregate_daily(&solid, span, window))
        .unwrap_or_default();

    Ok((bottle_days, solid_days))
}

fn growth_references(config: &Config) -> Result<GrowthReferences> {
    let sex = config.profile.sex;
    Ok(GrowthReferences {
        weight_for_age: reference::load_for_age(&config.input.weight_for_age, sex)?,
        length_for_age: reference::load_for_age(&config.input.length_for_age, sex)?,
        head_for_age: reference::load_for_age(&config.input.head_for_age, sex)?,
        weight_for_length: reference::load_for_length(&config.input.weight_for_length, sex)?,
    })
}

/// The span charts aggregate over: the debug override when set, otherwise
/// the observed record range.
pub(crate) fn chart_span<I: Iterator<Item = NaiveDate>>(
    config: &Config,
    dates: I,
) -> Option<DateSpan> {
    config
        .debug
        .override_span()
        .or_else(|| DateSpan::from_dates(dates))
}

/// Best-effort upload; failures are logged, never fatal.
fn publish(config: &Config, kind: ChartKind, bytes: &[u8]) {
    if !config.share.enabled {
        return;
    }
    let Some(endpoint) = config.share.endpoint.as_deref() else {
        tracing::warn!("share.enabled is set but share.endpoint is missing");
        return;
    };

    let content_type = match config.output.format {
        nido_chart::ImageEncoding::Png => "image/png",
        nido_chart::ImageEncoding::Svg => "image/svg+xml",
    };
    let uploaded = nido_share::Client::new(endpoint)
        .and_then(|client| client.publish(kind.file_stem(), content_type, bytes));
    if let Err(err) = uploaded {
        tracing::warn!(chart = %kind, "publish failed: {err}");
    }
}
