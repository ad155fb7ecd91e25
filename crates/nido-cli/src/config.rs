//! Configuration loading and management.
//!
//! Configuration merges defaults, the platform config file, an explicit
//! `--config` file, and `NIDO_*` environment variables, in that order. The
//! parsed [`Config`] is passed by reference everywhere; nothing reads
//! configuration from global state.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::ValueEnum;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use nido_chart::{ImageEncoding, Orientation, RenderOptions};
use nido_core::{DateSpan, Sex};
use serde::{Deserialize, Serialize};

/// One renderable figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Diaper,
    Sleep,
    Feeding,
    Growth,
    Medical,
    SleepStrip,
    FeedingStrip,
    DiaperStrip,
}

impl ChartKind {
    pub const ALL: [Self; 8] = [
        Self::Diaper,
        Self::Sleep,
        Self::Feeding,
        Self::Growth,
        Self::Medical,
        Self::SleepStrip,
        Self::FeedingStrip,
        Self::DiaperStrip,
    ];

    /// Output file stem for this figure.
    #[must_use]
    pub const fn file_stem(self) -> &'static str {
        match self {
            Self::Diaper => "diaper_charts",
            Self::Sleep => "sleep_charts",
            Self::Feeding => "feeding_charts",
            Self::Growth => "growth_charts",
            Self::Medical => "medical_charts",
            Self::SleepStrip => "sleep_viz",
            Self::FeedingStrip => "feeding_viz",
            Self::DiaperStrip => "diaper_viz",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub profile: Profile,
    pub input: InputPaths,
    pub output: OutputConfig,
    pub charts: ChartToggles,
    pub debug: DebugConfig,
    pub share: ShareConfig,
}

/// Who the charts are about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub birthday: NaiveDate,
    pub sex: Sex,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            birthday: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or_default(),
            sex: Sex::Boy,
        }
    }
}

/// Paths to the input CSV exports and reference tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputPaths {
    pub diaper: PathBuf,
    pub sleep: PathBuf,
    pub feeding_bottle: PathBuf,
    pub feeding_solid: PathBuf,
    pub growth: PathBuf,
    pub weight: PathBuf,
    pub misc: PathBuf,
    pub weight_for_age: PathBuf,
    pub length_for_age: PathBuf,
    pub head_for_age: PathBuf,
    pub weight_for_length: PathBuf,
}

impl Default for InputPaths {
    fn default() -> Self {
        let data = PathBuf::from("data");
        Self {
            diaper: data.join("diaper.csv"),
            sleep: data.join("sleep.csv"),
            feeding_bottle: data.join("feeding_bottle.csv"),
            feeding_solid: data.join("feeding_solid.csv"),
            growth: data.join("growth.csv"),
            weight: data.join("weight.csv"),
            misc: data.join("misc.csv"),
            weight_for_age: data.join("wtageinf.csv"),
            length_for_age: data.join("lenageinf.csv"),
            head_for_age: data.join("hcageinf.csv"),
            weight_for_length: data.join("wtleninf.csv"),
        }
    }
}

/// Where and how charts are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub format: ImageEncoding,
    pub width: u32,
    pub height: u32,
    /// Clip every date/age axis to the first year of life.
    pub year_one_only: bool,
    /// Layout of the sleep day-strip figure.
    pub sleep_strip_orientation: Orientation,
    /// Titles, axis labels, and legends on the day-strip figures.
    pub strip_labels: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let defaults = RenderOptions::default();
        Self {
            directory: PathBuf::from("build"),
            format: defaults.encoding,
            width: defaults.width,
            height: defaults.height,
            year_one_only: false,
            sleep_strip_orientation: Orientation::Horizontal,
            strip_labels: true,
        }
    }
}

/// Per-figure enable flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartToggles {
    pub diaper: bool,
    pub sleep: bool,
    pub feeding: bool,
    pub growth: bool,
    pub medical: bool,
    pub sleep_strip: bool,
    pub feeding_strip: bool,
    pub diaper_strip: bool,
}

impl Default for ChartToggles {
    fn default() -> Self {
        Self {
            diaper: true,
            sleep: true,
            feeding: true,
            growth: true,
            medical: true,
            sleep_strip: true,
            feeding_strip: true,
            diaper_strip: true,
        }
    }
}

impl ChartToggles {
    #[must_use]
    pub const fn enabled(&self, kind: ChartKind) -> bool {
        match kind {
            ChartKind::Diaper => self.diaper,
            ChartKind::Sleep => self.sleep,
            ChartKind::Feeding => self.feeding,
            ChartKind::Growth => self.growth,
            ChartKind::Medical => self.medical,
            ChartKind::SleepStrip => self.sleep_strip,
            ChartKind::FeedingStrip => self.feeding_strip,
            ChartKind::DiaperStrip => self.diaper_strip,
        }
    }
}

/// Date-range override for fast debug renders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct DebugConfig {
    pub enabled: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DebugConfig {
    /// The overridden span, when debug mode is fully configured.
    #[must_use]
    pub fn override_span(&self) -> Option<DateSpan> {
        if !self.enabled {
            return None;
        }
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(DateSpan::new(start, end)),
            _ => None,
        }
    }
}

/// Optional publishing to a chart-sharing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShareConfig {
    pub enabled: bool,
    pub endpoint: Option<String>,
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (NIDO_*)
        figment = figment.merge(Env::prefixed("NIDO_"));

        figment.extract()
    }

    /// Canvas options for the chart renderer.
    #[must_use]
    pub const fn render_options(&self) -> RenderOptions {
        RenderOptions {
            width: self.output.width,
            height: self.output.height,
            encoding: self.output.format,
        }
    }

    /// Output file path for one figure.
    #[must_use]
    pub fn output_path(&self, kind: ChartKind) -> PathBuf {
        self.output.directory.join(format!(
            "{}.{}",
            kind.file_stem(),
            self.output.format.extension()
        ))
    }
}

/// Returns the platform-specific config directory for nido.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("nido"))
}
