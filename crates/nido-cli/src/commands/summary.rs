//! Summary command: a textual or JSON tail of one daily series.

use std::fmt::Write;

use anyhow::{Context, Result};
use nido_core::{DiaperDay, FeedingDay, SleepDay, record};

use crate::cli::SummaryCategory;
use crate::commands::render::{chart_span, feeding_days};
use crate::config::Config;

/// Runs the summary command.
pub fn run(config: &Config, category: SummaryCategory, days: usize, json: bool) -> Result<()> {
    let output = match category {
        SummaryCategory::Feeding => {
            let (bottle, _solid) = feeding_days(config)?;
            let tail = tail(&bottle, days);
            if json {
                serde_json::to_string_pretty(tail)?
            } else {
                format_feeding(tail)
            }
        }
        SummaryCategory::Sleep => {
            let records = record::load_sleep_sessions(&config.input.sleep)?;
            let span = chart_span(config, records.iter().map(record::SleepRecord::day))
                .context("no sleep records in range")?;
            let all = nido_core::sleep::aggregate_daily(
                &records,
                span,
                nido_core::sleep::default_nap_window(),
            );
            let tail = tail(&all, days);
            if json {
                serde_json::to_string_pretty(tail)?
            } else {
                format_sleep(tail)
            }
        }
        SummaryCategory::Diaper => {
            let records = record::load_diaper_changes(&config.input.diaper)?;
            let span = chart_span(config, records.iter().map(record::DiaperRecord::day))
                .context("no diaper records in range")?;
            let all = nido_core::diaper::aggregate_daily(&records, span);
            let tail = tail(&all, days);
            if json {
                serde_json::to_string_pretty(tail)?
            } else {
                format_diaper(tail)
            }
        }
    };
    println!("{output}");
    Ok(())
}

fn tail<T>(rows: &[T], days: usize) -> &[T] {
    &rows[rows.len().saturating_sub(days)..]
}

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

fn format_feeding(days: &[FeedingDay]) -> String {
    let mut output = String::new();
    writeln!(output, "FEEDING (last {} days)", days.len()).unwrap();
    writeln!(
        output,
        "{:<12} {:>8} {:>9} {:>8} {:>8} {:>8}",
        "Date", "Total", "Sessions", "Mean", "Min", "Max"
    )
    .unwrap();
    for day in days {
        writeln!(
            output,
            "{:<12} {:>8.1} {:>9} {:>8} {:>8} {:>8}",
            day.date,
            day.sum,
            day.sessions,
            opt(day.mean),
            opt(day.min),
            opt(day.max)
        )
        .unwrap();
    }
    output
}

fn format_sleep(days: &[SleepDay]) -> String {
    let mut output = String::new();
    writeln!(output, "SLEEP (last {} days)", days.len()).unwrap();
    writeln!(
        output,
        "{:<12} {:>8} {:>6} {:>9} {:>10}",
        "Date", "Total", "Naps", "Longest", "Max Awake"
    )
    .unwrap();
    for day in days {
        writeln!(
            output,
            "{:<12} {:>8.1} {:>6} {:>9} {:>10}",
            day.date,
            day.total_hours,
            day.naps,
            opt(day.longest_hours),
            opt(day.max_awake_hours)
        )
        .unwrap();
    }
    output
}

fn format_diaper(days: &[DiaperDay]) -> String {
    let mut output = String::new();
    writeln!(output, "DIAPERS (last {} days)", days.len()).unwrap();
    writeln!(
        output,
        "{:<12} {:>6} {:>6} {:>6} {:>8} {:>11}",
        "Date", "Total", "Pees", "Poops", "Ratio", "Cumulative"
    )
    .unwrap();
    for day in days {
        writeln!(
            output,
            "{:<12} {:>6} {:>6} {:>6} {:>8} {:>11}",
            day.date,
            day.total,
            day.pees,
            day.poops,
            opt(day.poop_ratio),
            day.cumulative
        )
        .unwrap();
    }
    output
}
