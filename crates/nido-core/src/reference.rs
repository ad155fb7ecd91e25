//! Pediatric growth-standard reference tables.
//!
//! The CDC publishes percentile bands keyed by sex and age in months (or by
//! length, for the weight-for-length standard). These are comparison
//! overlays only; nothing here is computed from the child's data.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::record::{LoadError, Table};

/// Child's sex, matching the reference tables' 1/2 coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Boy,
    Girl,
}

impl Sex {
    /// The code used in the CDC tables' `Sex` column.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Boy => 1,
            Self::Girl => 2,
        }
    }
}

impl std::str::FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boy" => Ok(Self::Boy),
            "girl" => Ok(Self::Girl),
            _ => Err(format!("invalid sex: {s} (expected boy or girl)")),
        }
    }
}

/// Percentile band columns, low to high.
pub const BAND_COLUMNS: [&str; 9] = ["P3", "P5", "P10", "P25", "P50", "P75", "P90", "P95", "P97"];

/// One reference row: an x position (age in months, or length in cm) and the
/// nine percentile band values at that position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileRow {
    pub x: f64,
    pub bands: [f64; 9],
}

/// A reference table filtered to one sex and sorted by x.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileTable {
    pub rows: Vec<PercentileRow>,
}

impl PercentileTable {
    /// The values of band `index` across the table, for drawing one curve.
    pub fn band(&self, index: usize) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.rows.iter().map(move |row| (row.x, row.bands[index]))
    }

    #[must_use]
    pub fn x_max(&self) -> Option<f64> {
        self.rows.last().map(|row| row.x)
    }
}

/// Loads a percentile table keyed by age in months (`Agemos`).
pub fn load_for_age(path: &Path, sex: Sex) -> Result<PercentileTable, LoadError> {
    load_table(path, sex, "Agemos")
}

/// Loads the weight-for-length table (keyed by `Length`).
pub fn load_for_length(path: &Path, sex: Sex) -> Result<PercentileTable, LoadError> {
    load_table(path, sex, "Length")
}

fn load_table(path: &Path, sex: Sex, x_column: &str) -> Result<PercentileTable, LoadError> {
    let table = Table::open(path)?;
    let sex_col = table.column("Sex")?;
    let x_col = table.column(x_column)?;
    let band_cols: Vec<usize> = BAND_COLUMNS
        .iter()
        .map(|name| table.column(name))
        .collect::<Result<_, _>>()?;

    let mut rows = Vec::new();
    for (row, record) in table.iter() {
        let row_sex = table.number(record, sex_col, row, "Sex")?;
        #[allow(clippy::float_cmp, clippy::cast_lossless)]
        if row_sex != sex.code() as f64 {
            continue;
        }
        let x = table.number(record, x_col, row, x_column)?;
        let mut bands = [0.0; 9];
        for (index, slot) in bands.iter_mut().enumerate() {
            *slot = table.number(record, band_cols[index], row, BAND_COLUMNS[index])?;
        }
        rows.push(PercentileRow { x, bands });
    }
    rows.sort_by(|a, b| a.x.total_cmp(&b.x));
    tracing::debug!(rows = rows.len(), path = %path.display(), "loaded percentile table");
    Ok(PercentileTable { rows })
}
