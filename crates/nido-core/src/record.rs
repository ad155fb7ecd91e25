//! Typed records loaded from tracking-app CSV exports.
//!
//! Each loader reads one delimited table with fixed column names, parses the
//! app's timestamp format, and returns records sorted chronologically. Any
//! missing column or unparseable cell is a [`LoadError`], fatal for the
//! chart job that needed the table.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Timestamp format used by the tracking-app exports (`12/25/2019 07:30:00 AM`).
pub const APP_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Date format of the growth-measurement export.
pub const GROWTH_DATE_FORMAT: &str = "%Y/%m/%d";

/// Date format of the misc-event export and the scale export's date portion.
pub const SHORT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Errors raised while loading a record table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not a well-formed delimited table.
    #[error("failed to parse {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// A required column is absent from the header row.
    #[error("{}: missing required column {column:?}", path.display())]
    MissingColumn { path: PathBuf, column: String },
    /// A timestamp cell did not match the expected format.
    #[error("{} row {row}: invalid timestamp {value:?}", path.display())]
    Timestamp {
        path: PathBuf,
        row: usize,
        value: String,
    },
    /// A numeric cell did not parse.
    #[error("{} row {row}: invalid number {value:?} in column {column:?}", path.display())]
    Number {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },
    /// A diaper-contents cell held an unrecognized value.
    #[error("{} row {row}: unrecognized diaper contents {value:?}", path.display())]
    DiaperContents {
        path: PathBuf,
        row: usize,
        value: String,
    },
}

/// A single bottle or solid feeding.
///
/// Bottle amounts are milliliters; solid amounts are ounces. The two kinds
/// come from separate files with the same shape, so one record type serves
/// both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeedingRecord {
    pub time: NaiveDateTime,
    pub amount: f64,
}

impl FeedingRecord {
    #[must_use]
    pub const fn day(&self) -> NaiveDate {
        self.time.date()
    }
}

/// A sleep session with begin and end timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SleepRecord {
    pub begin: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl SleepRecord {
    /// The calendar day this session is attributed to (begin timestamp).
    #[must_use]
    pub const fn day(&self) -> NaiveDate {
        self.begin.date()
    }

    /// Session length in fractional hours.
    #[must_use]
    pub fn duration_hours(&self) -> f64 {
        crate::calendar::hours_between(self.begin, self.end)
    }

    /// Whether the session ends on a later calendar day than it begins.
    #[must_use]
    pub fn crosses_midnight(&self) -> bool {
        self.end.date() > self.begin.date()
    }
}

/// What a diaper change found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiaperContents {
    Pee,
    Poop,
    PeeAndPoop,
}

impl DiaperContents {
    #[must_use]
    pub const fn is_pee(self) -> bool {
        matches!(self, Self::Pee | Self::PeeAndPoop)
    }

    #[must_use]
    pub const fn is_poop(self) -> bool {
        matches!(self, Self::Poop | Self::PeeAndPoop)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "pee" => Some(Self::Pee),
            "poo" => Some(Self::Poop),
            "pee and poo" => Some(Self::PeeAndPoop),
            _ => None,
        }
    }
}

/// One diaper change. `color` is only recorded for poops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiaperRecord {
    pub time: NaiveDateTime,
    pub contents: DiaperContents,
    pub color: Option<String>,
}

impl DiaperRecord {
    #[must_use]
    pub const fn day(&self) -> NaiveDate {
        self.time.date()
    }
}

/// A growth measurement (clinic visits; height and head circumference are
/// recorded independently, so either may be absent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthRecord {
    pub date: NaiveDate,
    pub height_cm: Option<f64>,
    pub head_circumference_cm: Option<f64>,
}

/// A daily weight reading from the pediatric scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightRecord {
    pub date: NaiveDate,
    pub weight_kg: f64,
    /// Growth-standard percentile as a fraction in `[0, 1]`, when the scale
    /// app computed one.
    pub percentile: Option<f64>,
}

/// A day of miscellaneous medical bookkeeping. Blank cells read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MiscRecord {
    pub date: NaiveDate,
    pub vomit: u32,
    pub daycare: u32,
    pub doctor: u32,
}

/// Loads bottle feedings (`Time of feeding`, `Amount(ml)`).
pub fn load_bottle_feedings(path: &Path) -> Result<Vec<FeedingRecord>, LoadError> {
    load_feedings(path, "Amount(ml)")
}

/// Loads solid feedings (`Time of feeding`, `Amount`).
pub fn load_solid_feedings(path: &Path) -> Result<Vec<FeedingRecord>, LoadError> {
    load_feedings(path, "Amount")
}

fn load_feedings(path: &Path, amount_column: &str) -> Result<Vec<FeedingRecord>, LoadError> {
    let table = Table::open(path)?;
    let time_col = table.column("Time of feeding")?;
    let amount_col = table.column(amount_column)?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (row, record) in table.iter() {
        let time = table.timestamp(record, time_col, row, APP_TIMESTAMP_FORMAT)?;
        let amount = table.number(record, amount_col, row, amount_column)?;
        records.push(FeedingRecord { time, amount });
    }
    records.sort_by_key(|r| r.time);
    tracing::debug!(count = records.len(), path = %path.display(), "loaded feeding records");
    Ok(records)
}

/// Loads sleep sessions (`Begin time`, `End time`).
pub fn load_sleep_sessions(path: &Path) -> Result<Vec<SleepRecord>, LoadError> {
    let table = Table::open(path)?;
    let begin_col = table.column("Begin time")?;
    let end_col = table.column("End time")?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (row, record) in table.iter() {
        let begin = table.timestamp(record, begin_col, row, APP_TIMESTAMP_FORMAT)?;
        let end = table.timestamp(record, end_col, row, APP_TIMESTAMP_FORMAT)?;
        records.push(SleepRecord { begin, end });
    }
    records.sort_by_key(|r| r.begin);
    tracing::debug!(count = records.len(), path = %path.display(), "loaded sleep records");
    Ok(records)
}

/// Loads diaper changes (`Diaper time`, `In the diaper`, optional `Color`).
pub fn load_diaper_changes(path: &Path) -> Result<Vec<DiaperRecord>, LoadError> {
    let table = Table::open(path)?;
    let time_col = table.column("Diaper time")?;
    let contents_col = table.column("In the diaper")?;
    let color_col = table.try_column("Color");

    let mut records = Vec::with_capacity(table.rows.len());
    for (row, record) in table.iter() {
        let time = table.timestamp(record, time_col, row, APP_TIMESTAMP_FORMAT)?;
        let raw = field(record, contents_col);
        let contents =
            DiaperContents::parse(raw).ok_or_else(|| LoadError::DiaperContents {
                path: path.to_path_buf(),
                row,
                value: raw.to_string(),
            })?;
        let color = color_col
            .map(|col| field(record, col).trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        records.push(DiaperRecord {
            time,
            contents,
            color,
        });
    }
    records.sort_by_key(|r| r.time);
    tracing::debug!(count = records.len(), path = %path.display(), "loaded diaper records");
    Ok(records)
}

/// Loads growth measurements (`Date`, `Height(cm)`, `Head Circ.(cm)`).
pub fn load_growth_measurements(path: &Path) -> Result<Vec<GrowthRecord>, LoadError> {
    let table = Table::open(path)?;
    let date_col = table.column("Date")?;
    let height_col = table.column("Height(cm)")?;
    let head_col = table.column("Head Circ.(cm)")?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (row, record) in table.iter() {
        let date = table.date(record, date_col, row, GROWTH_DATE_FORMAT)?;
        let height_cm = table.optional_number(record, height_col, row, "Height(cm)")?;
        let head_circumference_cm = table.optional_number(record, head_col, row, "Head Circ.(cm)")?;
        records.push(GrowthRecord {
            date,
            height_cm,
            head_circumference_cm,
        });
    }
    records.sort_by_key(|r| r.date);
    Ok(records)
}

/// Loads scale readings (`Start Time`, `Amount`, optional `Percentile`).
///
/// The scale export stamps each reading with a full timestamp; only the date
/// portion is meaningful, the rest is discarded. Rows with an empty weight
/// cell are skipped (the scale records tare events the same way).
pub fn load_weight_readings(path: &Path) -> Result<Vec<WeightRecord>, LoadError> {
    let table = Table::open(path)?;
    let time_col = table.column("Start Time")?;
    let amount_col = table.column("Amount")?;
    let percentile_col = table.try_column("Percentile");

    let mut records = Vec::with_capacity(table.rows.len());
    for (row, record) in table.iter() {
        let raw_time = field(record, time_col).trim();
        let date_part = raw_time.get(0..10).unwrap_or(raw_time);
        let date = NaiveDate::parse_from_str(date_part, SHORT_DATE_FORMAT).map_err(|_| {
            LoadError::Timestamp {
                path: path.to_path_buf(),
                row,
                value: raw_time.to_string(),
            }
        })?;
        let Some(weight_kg) = table.optional_number(record, amount_col, row, "Amount")? else {
            continue;
        };
        let percentile = match percentile_col {
            Some(col) => table.optional_number(record, col, row, "Percentile")?,
            None => None,
        };
        records.push(WeightRecord {
            date,
            weight_kg,
            percentile,
        });
    }
    records.sort_by_key(|r| r.date);
    tracing::debug!(count = records.len(), path = %path.display(), "loaded weight records");
    Ok(records)
}

/// Loads misc medical events (`Date`, `Vomit`, `Daycare`, `Doctor`).
pub fn load_misc_events(path: &Path) -> Result<Vec<MiscRecord>, LoadError> {
    let table = Table::open(path)?;
    let date_col = table.column("Date")?;
    let vomit_col = table.column("Vomit")?;
    let daycare_col = table.column("Daycare")?;
    let doctor_col = table.column("Doctor")?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (row, record) in table.iter() {
        let date = table.date(record, date_col, row, SHORT_DATE_FORMAT)?;
        let vomit = table.count(record, vomit_col, row, "Vomit")?;
        let daycare = table.count(record, daycare_col, row, "Daycare")?;
        let doctor = table.count(record, doctor_col, row, "Doctor")?;
        records.push(MiscRecord {
            date,
            vomit,
            daycare,
            doctor,
        });
    }
    records.sort_by_key(|r| r.date);
    Ok(records)
}

/// A CSV table with header-indexed column access.
///
/// All loaders in this crate (including the percentile reference tables in
/// [`crate::reference`]) go through this so that error reporting stays
/// uniform: file path, 1-based data row, column name.
pub(crate) struct Table {
    path: PathBuf,
    columns: HashMap<String, usize>,
    rows: Vec<csv::StringRecord>,
}

impl Table {
    pub(crate) fn open(path: &Path) -> Result<Self, LoadError> {
        let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

        let headers = reader.headers().map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let columns = headers
            .iter()
            .enumerate()
            .map(|(index, name)| (name.trim().to_string(), index))
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record.map_err(|source| LoadError::Csv {
                path: path.to_path_buf(),
                source,
            })?);
        }

        Ok(Self {
            path: path.to_path_buf(),
            columns,
            rows,
        })
    }

    pub(crate) fn column(&self, name: &str) -> Result<usize, LoadError> {
        self.try_column(name).ok_or_else(|| LoadError::MissingColumn {
            path: self.path.clone(),
            column: name.to_string(),
        })
    }

    pub(crate) fn try_column(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    /// Iterates rows with their 1-based data row number.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &csv::StringRecord)> {
        self.rows.iter().enumerate().map(|(i, r)| (i + 1, r))
    }

    pub(crate) fn timestamp(
        &self,
        record: &csv::StringRecord,
        col: usize,
        row: usize,
        format: &str,
    ) -> Result<NaiveDateTime, LoadError> {
        let value = field(record, col).trim();
        NaiveDateTime::parse_from_str(value, format).map_err(|_| LoadError::Timestamp {
            path: self.path.clone(),
            row,
            value: value.to_string(),
        })
    }

    pub(crate) fn date(
        &self,
        record: &csv::StringRecord,
        col: usize,
        row: usize,
        format: &str,
    ) -> Result<NaiveDate, LoadError> {
        let value = field(record, col).trim();
        NaiveDate::parse_from_str(value, format).map_err(|_| LoadError::Timestamp {
            path: self.path.clone(),
            row,
            value: value.to_string(),
        })
    }

    pub(crate) fn number(
        &self,
        record: &csv::StringRecord,
        col: usize,
        row: usize,
        column: &str,
    ) -> Result<f64, LoadError> {
        self.optional_number(record, col, row, column)?
            .ok_or_else(|| LoadError::Number {
                path: self.path.clone(),
                row,
                column: column.to_string(),
                value: String::new(),
            })
    }

    pub(crate) fn optional_number(
        &self,
        record: &csv::StringRecord,
        col: usize,
        row: usize,
        column: &str,
    ) -> Result<Option<f64>, LoadError> {
        let value = field(record, col).trim();
        if value.is_empty() {
            return Ok(None);
        }
        value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| LoadError::Number {
                path: self.path.clone(),
                row,
                column: column.to_string(),
                value: value.to_string(),
            })
    }

    /// Parses a small non-negative count; blank cells are zero.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn count(
        &self,
        record: &csv::StringRecord,
        col: usize,
        row: usize,
        column: &str,
    ) -> Result<u32, LoadError> {
        Ok(self
            .optional_number(record, col, row, column)?
            .map_or(0, |v| v.max(0.0).round() as u32))
    }
}

/// Field access tolerant of short rows (flexible CSV): missing cells read as
/// empty, which the per-type parsers then reject or default as appropriate.
pub(crate) fn field(record: &csv::StringRecord, col: usize) -> &str {
    record.get(col).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_and_sorts_bottle_feedings() {
        let file = write_fixture(
            "Baby,Time of feeding,Amount(ml)\n\
             Zelda,01/02/2019 09:00:00 PM,120\n\
             Zelda,01/02/2019 07:30:00 AM,90\n",
        );
        let records = load_bottle_feedings(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].time < records[1].time);
        assert!((records[0].amount - 90.0).abs() < f64::EPSILON);
        assert_eq!(
            records[0].day(),
            NaiveDate::from_ymd_opt(2019, 1, 2).unwrap()
        );
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let file = write_fixture("Time of feeding\n01/02/2019 07:30:00 AM\n");
        let err = load_bottle_feedings(file.path()).unwrap_err();
        match err {
            LoadError::MissingColumn { column, .. } => assert_eq!(column, "Amount(ml)"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn bad_timestamp_is_fatal() {
        let file = write_fixture(
            "Time of feeding,Amount(ml)\n2019-01-02 07:30,90\n",
        );
        let err = load_bottle_feedings(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Timestamp { row: 1, .. }));
    }

    #[test]
    fn diaper_contents_parse_and_split() {
        let file = write_fixture(
            "Diaper time,In the diaper,Color\n\
             01/02/2019 08:00:00 AM,pee and poo,yellow\n\
             01/02/2019 11:00:00 AM,pee,\n",
        );
        let records = load_diaper_changes(file.path()).unwrap();
        assert!(records[0].contents.is_pee());
        assert!(records[0].contents.is_poop());
        assert_eq!(records[0].color.as_deref(), Some("yellow"));
        assert!(records[1].contents.is_pee());
        assert!(!records[1].contents.is_poop());
        assert_eq!(records[1].color, None);
    }

    #[test]
    fn unknown_diaper_contents_is_fatal() {
        let file = write_fixture(
            "Diaper time,In the diaper\n01/02/2019 08:00:00 AM,dry\n",
        );
        let err = load_diaper_changes(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::DiaperContents { .. }));
    }

    #[test]
    fn sleep_sessions_know_their_day_and_duration() {
        let file = write_fixture(
            "Begin time,End time\n\
             01/02/2019 11:00:00 PM,01/03/2019 01:30:00 AM\n",
        );
        let records = load_sleep_sessions(file.path()).unwrap();
        let session = records[0];
        assert_eq!(session.day(), NaiveDate::from_ymd_opt(2019, 1, 2).unwrap());
        assert!(session.crosses_midnight());
        assert!((session.duration_hours() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn weight_readings_strip_time_and_skip_blank_rows() {
        let file = write_fixture(
            "Start Time,Amount,Percentile\n\
             11/30/2018 07:12:00 AM,4.21,0.52\n\
             12/01/2018 07:15:00 AM,,\n",
        );
        let records = load_weight_readings(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].date,
            NaiveDate::from_ymd_opt(2018, 11, 30).unwrap()
        );
        assert_eq!(records[0].percentile, Some(0.52));
    }

    #[test]
    fn misc_blank_cells_read_as_zero() {
        let file = write_fixture(
            "Date,Vomit,Daycare,Doctor\n\
             01/02/2019,1,,\n\
             01/03/2019,,1,1\n",
        );
        let records = load_misc_events(file.path()).unwrap();
        assert_eq!(records[0].vomit, 1);
        assert_eq!(records[0].daycare, 0);
        assert_eq!(records[1].doctor, 1);
    }

    #[test]
    fn growth_rows_allow_partial_measurements() {
        let file = write_fixture(
            "Date,Height(cm),Head Circ.(cm)\n\
             2019/01/02,57.5,\n\
             2019/02/02,,39.0\n",
        );
        let records = load_growth_measurements(file.path()).unwrap();
        assert_eq!(records[0].height_cm, Some(57.5));
        assert_eq!(records[0].head_circumference_cm, None);
        assert_eq!(records[1].head_circumference_cm, Some(39.0));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_bottle_feedings(Path::new("/nonexistent/feeding.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
