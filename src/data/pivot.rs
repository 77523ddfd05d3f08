use std::collections::{BTreeMap, BTreeSet};

use super::filter::ChartSlice;
use super::model::Measure;

// ---------------------------------------------------------------------------
// PivotMatrix – region × vaccine coverage grid
// ---------------------------------------------------------------------------

/// Dense region-by-vaccine matrix for the intensity heatmap.
///
/// Rows and columns are sorted by name. A cell is `None` when the chart
/// slice has no row for that (region, vaccine) pair; absent cells never
/// take part in statistics. Duplicate pairs are averaged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PivotMatrix {
    regions: Vec<String>,
    vaccines: Vec<String>,
    /// Row-major, `regions.len() * vaccines.len()` cells.
    cells: Vec<Option<f64>>,
}

impl PivotMatrix {
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn vaccines(&self) -> &[String] {
        &self.vaccines
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Cell by position.
    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.regions.len() || col >= self.vaccines.len() {
            return None;
        }
        self.cells[row * self.vaccines.len() + col]
    }

    /// Cell by name.
    pub fn get(&self, region: &str, vaccine: &str) -> Option<f64> {
        let row = self.regions.binary_search_by(|r| r.as_str().cmp(region)).ok()?;
        let col = self.vaccines.binary_search_by(|v| v.as_str().cmp(vaccine)).ok()?;
        self.cell(row, col)
    }

    /// One row of cells, in column order.
    pub fn row(&self, row: usize) -> Option<&[Option<f64>]> {
        if row >= self.regions.len() {
            return None;
        }
        let width = self.vaccines.len();
        self.cells.get(row * width..(row + 1) * width)
    }

    /// Number of present cells.
    pub fn present(&self) -> usize {
        self.cells.iter().flatten().count()
    }

    /// `(min, max)` over present cells; `None` when every cell is absent.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Build the matrix from the chart slice.
pub fn pivot(chart: &ChartSlice<'_>) -> PivotMatrix {
    let mut sums: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
    let mut vaccines: BTreeSet<&str> = BTreeSet::new();

    for rec in chart.rows() {
        let Measure::CoveragePercent(rate) = rec.measure() else {
            continue;
        };
        let acc = sums
            .entry((rec.region.as_str(), rec.vaccine.as_str()))
            .or_insert((0.0, 0));
        acc.0 += rate;
        acc.1 += 1;
        vaccines.insert(&rec.vaccine);
    }

    let regions: Vec<&str> = sums
        .keys()
        .map(|(region, _)| *region)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let vaccines: Vec<&str> = vaccines.into_iter().collect();

    let mut cells = Vec::with_capacity(regions.len() * vaccines.len());
    for region in &regions {
        for vaccine in &vaccines {
            cells.push(
                sums.get(&(*region, *vaccine))
                    .map(|(sum, n)| sum / *n as f64),
            );
        }
    }

    PivotMatrix {
        regions: regions.into_iter().map(str::to_string).collect(),
        vaccines: vaccines.into_iter().map(str::to_string).collect(),
        cells,
    }
}
