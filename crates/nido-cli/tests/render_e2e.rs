//! End-to-end tests for the render pipeline.
//!
//! Builds a full set of fixture CSV exports in a temp directory, runs the
//! `nido` binary against them, and checks every enabled figure lands on
//! disk with a non-trivial size.

use std::fmt::Write as _;
use std::path::Path;
use std::process::Command;

use chrono::{Days, NaiveDate};
use tempfile::TempDir;

fn nido_binary() -> String {
    env!("CARGO_BIN_EXE_nido").to_string()
}

fn first_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()
}

const DAY_COUNT: u64 = 41;

fn app_timestamp(date: NaiveDate, hour: u32, minute: u32) -> String {
    date.and_hms_opt(hour, minute, 0)
        .unwrap()
        .format("%m/%d/%Y %I:%M:%S %p")
        .to_string()
}

fn write_fixtures(dir: &Path) {
    let days: Vec<NaiveDate> = (0..DAY_COUNT)
        .map(|offset| first_day() + Days::new(offset))
        .collect();

    // Bottle feedings: three sessions a day.
    let mut bottle = String::from("Baby,Time of feeding,Amount(ml)\n");
    for day in &days {
        for (hour, amount) in [(7, 90), (13, 120), (22, 60)] {
            writeln!(bottle, "Z,{},{amount}", app_timestamp(*day, hour, 30)).unwrap();
        }
    }
    std::fs::write(dir.join("feeding_bottle.csv"), bottle).unwrap();

    // Solid feedings start three weeks in.
    let mut solid = String::from("Baby,Time of feeding,Amount\n");
    for day in days.iter().skip(21) {
        writeln!(solid, "Z,{},2", app_timestamp(*day, 12, 0)).unwrap();
    }
    std::fs::write(dir.join("feeding_solid.csv"), solid).unwrap();

    // Sleep: two naps plus a night session that crosses midnight.
    let mut sleep = String::from("Baby,Begin time,End time\n");
    for day in &days {
        writeln!(
            sleep,
            "Z,{},{}",
            app_timestamp(*day, 9, 0),
            app_timestamp(*day, 10, 15)
        )
        .unwrap();
        writeln!(
            sleep,
            "Z,{},{}",
            app_timestamp(*day, 14, 0),
            app_timestamp(*day, 15, 30)
        )
        .unwrap();
        writeln!(
            sleep,
            "Z,{},{}",
            app_timestamp(*day, 21, 0),
            app_timestamp(*day + Days::new(1), 5, 45)
        )
        .unwrap();
    }
    std::fs::write(dir.join("sleep.csv"), sleep).unwrap();

    // Diapers: four changes a day with mixed contents.
    let mut diaper = String::from("Baby,Diaper time,In the diaper,Color\n");
    for day in &days {
        writeln!(diaper, "Z,{},pee,", app_timestamp(*day, 6, 0)).unwrap();
        writeln!(diaper, "Z,{},poo,yellow", app_timestamp(*day, 11, 0)).unwrap();
        writeln!(diaper, "Z,{},pee and poo,green", app_timestamp(*day, 16, 0)).unwrap();
        writeln!(diaper, "Z,{},pee,", app_timestamp(*day, 20, 0)).unwrap();
    }
    std::fs::write(dir.join("diaper.csv"), diaper).unwrap();

    // Clinic growth measurements: sparse.
    let mut growth = String::from("Date,Height(cm),Head Circ.(cm)\n");
    for (index, day) in days.iter().step_by(10).enumerate() {
        writeln!(
            growth,
            "{},{},{}",
            day.format("%Y/%m/%d"),
            54.0 + index as f64,
            37.0 + 0.5 * index as f64
        )
        .unwrap();
    }
    std::fs::write(dir.join("growth.csv"), growth).unwrap();

    // Daily scale readings.
    let mut weight = String::from("Start Time,Amount,Percentile\n");
    for (index, day) in days.iter().enumerate() {
        writeln!(
            weight,
            "{},{:.3},{:.2}",
            app_timestamp(*day, 7, 5),
            4.2 + 0.02 * index as f64,
            0.5
        )
        .unwrap();
    }
    std::fs::write(dir.join("weight.csv"), weight).unwrap();

    // Misc medical bookkeeping with blanks.
    let mut misc = String::from("Date,Vomit,Daycare,Doctor\n");
    for (index, day) in days.iter().enumerate() {
        let vomit = if index % 9 == 0 { "1" } else { "" };
        let daycare = if index % 3 == 0 { "1" } else { "" };
        let doctor = if index % 20 == 0 { "1" } else { "" };
        writeln!(misc, "{},{vomit},{daycare},{doctor}", day.format("%m/%d/%Y")).unwrap();
    }
    std::fs::write(dir.join("misc.csv"), misc).unwrap();

    // Reference percentile tables, both sexes.
    let for_age = percentile_table("Agemos", &[0.0, 3.0, 6.0, 9.0, 12.0], 3.0, 0.8);
    std::fs::write(dir.join("wtageinf.csv"), &for_age).unwrap();
    let len_age = percentile_table("Agemos", &[0.0, 3.0, 6.0, 9.0, 12.0], 50.0, 3.0);
    std::fs::write(dir.join("lenageinf.csv"), &len_age).unwrap();
    let head_age = percentile_table("Agemos", &[0.0, 3.0, 6.0, 9.0, 12.0], 35.0, 1.2);
    std::fs::write(dir.join("hcageinf.csv"), &head_age).unwrap();
    let wt_len = percentile_table("Length", &[50.0, 60.0, 70.0, 80.0], 3.2, 0.15);
    std::fs::write(dir.join("wtleninf.csv"), &wt_len).unwrap();
}

/// Builds a plausible two-sex percentile table: bands spread around a base
/// value that grows linearly with the x column.
fn percentile_table(x_column: &str, xs: &[f64], base: f64, slope: f64) -> String {
    let mut table = format!("Sex,{x_column},P3,P5,P10,P25,P50,P75,P90,P95,P97\n");
    for sex in [1, 2] {
        for x in xs {
            let center = base + slope * x;
            write!(table, "{sex},{x}").unwrap();
            for spread in [-0.3, -0.25, -0.18, -0.09, 0.0, 0.09, 0.18, 0.25, 0.3] {
                write!(table, ",{:.3}", center * (1.0 + spread)).unwrap();
            }
            table.push('\n');
        }
    }
    table
}

fn write_config(dir: &Path) -> std::path::PathBuf {
    let output_dir = dir.join("out");
    let config = format!(
        r#"
[profile]
birthday = "2019-01-01"
sex = "boy"

[input]
diaper = "{data}/diaper.csv"
sleep = "{data}/sleep.csv"
feeding_bottle = "{data}/feeding_bottle.csv"
feeding_solid = "{data}/feeding_solid.csv"
growth = "{data}/growth.csv"
weight = "{data}/weight.csv"
misc = "{data}/misc.csv"
weight_for_age = "{data}/wtageinf.csv"
length_for_age = "{data}/lenageinf.csv"
head_for_age = "{data}/hcageinf.csv"
weight_for_length = "{data}/wtleninf.csv"

[output]
directory = "{out}"
format = "png"
width = 800
height = 600
"#,
        data = dir.display(),
        out = output_dir.display(),
    );
    let path = dir.join("config.toml");
    std::fs::write(&path, config).unwrap();
    path
}

#[test]
fn render_writes_every_enabled_figure() {
    let temp = TempDir::new().unwrap();
    write_fixtures(temp.path());
    let config = write_config(temp.path());

    let output = Command::new(nido_binary())
        .arg("--config")
        .arg(&config)
        .arg("render")
        .output()
        .expect("failed to run nido render");
    assert!(
        output.status.success(),
        "render should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let expected = [
        "diaper_charts.png",
        "sleep_charts.png",
        "feeding_charts.png",
        "growth_charts.png",
        "medical_charts.png",
        "sleep_viz.png",
        "feeding_viz.png",
        "diaper_viz.png",
    ];
    for name in expected {
        let path = temp.path().join("out").join(name);
        let size = std::fs::metadata(&path)
            .unwrap_or_else(|_| panic!("{name} should exist"))
            .len();
        assert!(size > 1024, "{name} should be non-trivial, got {size} bytes");
    }
}

#[test]
fn render_only_restricts_jobs() {
    let temp = TempDir::new().unwrap();
    write_fixtures(temp.path());
    let config = write_config(temp.path());

    let output = Command::new(nido_binary())
        .arg("--config")
        .arg(&config)
        .args(["render", "--only", "diaper"])
        .output()
        .expect("failed to run nido render");
    assert!(output.status.success());

    let out_dir = temp.path().join("out");
    assert!(out_dir.join("diaper_charts.png").exists());
    assert!(!out_dir.join("sleep_charts.png").exists());
}

#[test]
fn missing_input_fails_only_that_job() {
    let temp = TempDir::new().unwrap();
    write_fixtures(temp.path());
    // Remove one input so its job fails while siblings keep working.
    std::fs::remove_file(temp.path().join("misc.csv")).unwrap();
    let config = write_config(temp.path());

    let output = Command::new(nido_binary())
        .arg("--config")
        .arg(&config)
        .arg("render")
        .output()
        .expect("failed to run nido render");

    // The failure must be observable in the exit status...
    assert!(!output.status.success(), "a failed job must fail the run");
    // ...while independent jobs still produced their files.
    let out_dir = temp.path().join("out");
    assert!(out_dir.join("diaper_charts.png").exists());
    assert!(!out_dir.join("medical_charts.png").exists());
}

#[test]
fn summary_json_is_contiguous_daily_series() {
    let temp = TempDir::new().unwrap();
    write_fixtures(temp.path());
    let config = write_config(temp.path());

    let output = Command::new(nido_binary())
        .arg("--config")
        .arg(&config)
        .args(["summary", "--category", "diaper", "--days", "7", "--json"])
        .output()
        .expect("failed to run nido summary");
    assert!(
        output.status.success(),
        "summary should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 7);
    for row in rows {
        assert_eq!(row["total"], 4);
        assert_eq!(row["poops"], 2);
    }
    // Cumulative counts keep climbing across the tail.
    let cumulative: Vec<i64> = rows
        .iter()
        .map(|row| row["cumulative"].as_i64().unwrap())
        .collect();
    assert!(cumulative.windows(2).all(|pair| pair[1] > pair[0]));
}
