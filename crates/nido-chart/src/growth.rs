//! The growth figure: measurements over pediatric percentile references.

use nido_core::PercentileTable;
use nido_core::growth::{MeasurementPoint, WeightDay};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::canvas::{Chart, ChartError};
use crate::panel::{grid, percentile_panel, xy_line_panel};
use crate::series::OptPoint;

/// Reference tables backing the growth figure.
pub struct GrowthReferences {
    pub weight_for_age: PercentileTable,
    pub length_for_age: PercentileTable,
    pub head_for_age: PercentileTable,
    pub weight_for_length: PercentileTable,
}

/// 2x3 figure of growth measurements against reference curves.
pub struct GrowthCharts<'a> {
    weight: &'a [WeightDay],
    heights: &'a [MeasurementPoint],
    heads: &'a [MeasurementPoint],
    weight_length: Vec<(f64, f64)>,
    references: &'a GrowthReferences,
    age_max: f64,
}

impl<'a> GrowthCharts<'a> {
    #[must_use]
    pub fn new(
        weight: &'a [WeightDay],
        heights: &'a [MeasurementPoint],
        heads: &'a [MeasurementPoint],
        references: &'a GrowthReferences,
        year_one_only: bool,
    ) -> Self {
        let observed_max = weight
            .iter()
            .map(|w| w.age_months)
            .chain(heights.iter().map(|h| h.age_months))
            .chain(heads.iter().map(|h| h.age_months))
            .fold(0.0_f64, f64::max);
        // Year one pins the age axis to 12 months; otherwise it grows with
        // the data but never shrinks below a year.
        let age_max = if year_one_only {
            12.0
        } else {
            observed_max.ceil().max(12.0)
        };

        Self {
            weight,
            heights,
            heads,
            weight_length: nido_core::growth::weight_length_pairs(heights, weight),
            references,
            age_max,
        }
    }

    fn weight_measurements(&self) -> Vec<(f64, f64)> {
        self.weight
            .iter()
            .filter_map(|w| w.weight_kg.map(|kg| (w.age_months, kg)))
            .collect()
    }
}

impl Chart for GrowthCharts<'_> {
    fn name(&self) -> &'static str {
        "growth"
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), ChartError> {
        let panels = grid(root, 2, 3);
        let age_range = (0.0, self.age_max);

        percentile_panel(
            &panels[0],
            "Weight vs. Age",
            "Age (months)",
            "Weight (kg)",
            &self.references.weight_for_age,
            &self.weight_measurements(),
            age_range,
        )?;

        let percentile_points: Vec<OptPoint<f64>> = self
            .weight
            .iter()
            .map(|w| (w.age_months, w.percentile))
            .collect();
        xy_line_panel(
            &panels[1],
            "Weight Percentile vs. Age",
            "Age (months)",
            "Weight Percentile (%)",
            age_range,
            &percentile_points,
        )?;

        let roc_points: Vec<OptPoint<f64>> = self
            .weight
            .iter()
            .map(|w| (w.age_months, w.roc_oz))
            .collect();
        xy_line_panel(
            &panels[2],
            "Average Daily Weight Gain vs. Age",
            "Age (months)",
            "Average Daily Weight Gain (oz)",
            age_range,
            &roc_points,
        )?;

        percentile_panel(
            &panels[3],
            "Length vs. Age",
            "Age (months)",
            "Length (cm)",
            &self.references.length_for_age,
            &self
                .heights
                .iter()
                .map(|h| (h.age_months, h.value))
                .collect::<Vec<_>>(),
            age_range,
        )?;

        percentile_panel(
            &panels[4],
            "Head Circumference vs. Age",
            "Age (months)",
            "Head Circumference (cm)",
            &self.references.head_for_age,
            &self
                .heads
                .iter()
                .map(|h| (h.age_months, h.value))
                .collect::<Vec<_>>(),
            age_range,
        )?;

        // The weight-for-length panel is keyed by length, not age.
        let table = &self.references.weight_for_length;
        let length_range = length_extent(table, &self.weight_length);
        percentile_panel(
            &panels[5],
            "Weight vs. Length",
            "Length (cm)",
            "Weight (kg)",
            table,
            &self.weight_length,
            length_range,
        )?;
        Ok(())
    }
}

fn length_extent(table: &PercentileTable, pairs: &[(f64, f64)]) -> (f64, f64) {
    let xs = table
        .rows
        .iter()
        .map(|r| r.x)
        .chain(pairs.iter().map(|(x, _)| *x));
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for x in xs {
        lo = lo.min(x);
        hi = hi.max(x);
    }
    if lo > hi { (45.0, 110.0) } else { (lo, hi) }
}

#[cfg(test)]
mod tests {
    use nido_core::reference::PercentileRow;

    use super::*;

    fn references() -> GrowthReferences {
        let table = PercentileTable {
            rows: vec![
                PercentileRow {
                    x: 0.0,
                    bands: [2.5, 2.6, 2.8, 3.0, 3.3, 3.7, 4.0, 4.2, 4.3],
                },
                PercentileRow {
                    x: 12.0,
                    bands: [8.0, 8.3, 8.6, 9.0, 9.6, 10.3, 10.9, 11.2, 11.5],
                },
            ],
        };
        GrowthReferences {
            weight_for_age: table.clone(),
            length_for_age: table.clone(),
            head_for_age: table.clone(),
            weight_for_length: table,
        }
    }

    #[test]
    fn year_one_pins_age_axis() {
        let refs = references();
        let charts = GrowthCharts::new(&[], &[], &[], &refs, true);
        assert!((charts.age_max - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn age_axis_grows_with_data() {
        let refs = references();
        let weight = vec![WeightDay {
            date: chrono::NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
            age_months: 18.3,
            weight_kg: Some(10.0),
            percentile: None,
            roc_oz: None,
        }];
        let charts = GrowthCharts::new(&weight, &[], &[], &refs, false);
        assert!((charts.age_max - 19.0).abs() < f64::EPSILON);
    }

    #[test]
    fn length_extent_falls_back_when_empty() {
        let empty = PercentileTable { rows: Vec::new() };
        assert_eq!(length_extent(&empty, &[]), (45.0, 110.0));
    }
}
