use std::collections::BTreeMap;

use super::filter::{ChartSlice, KpiSlice};
use super::model::{Measure, Record};

// ---------------------------------------------------------------------------
// KPI aggregates
// ---------------------------------------------------------------------------

/// Summed target population. `is_empty` separates "no demographic rows" from
/// a genuine total of zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationTotal {
    pub thousands: f64,
    pub is_empty: bool,
}

impl PopulationTotal {
    /// The total, or `None` when there was nothing to sum.
    pub fn value(&self) -> Option<f64> {
        (!self.is_empty).then_some(self.thousands)
    }
}

pub fn total_target_population(kpi: &KpiSlice<'_>) -> PopulationTotal {
    let thousands = kpi
        .rows()
        .iter()
        .filter_map(|rec| match rec.measure() {
            Measure::PopulationThousands(v) => Some(v),
            _ => None,
        })
        .sum();
    PopulationTotal {
        thousands,
        is_empty: kpi.is_empty(),
    }
}

fn coverage(rec: &Record) -> Option<f64> {
    match rec.measure() {
        Measure::CoveragePercent(v) => Some(v),
        _ => None,
    }
}

/// Arithmetic mean of the coverage rates; `None` over zero rows.
pub fn average_coverage(chart: &ChartSlice<'_>) -> Option<f64> {
    mean(chart.rows().iter().filter_map(|rec| coverage(rec)))
}

/// Highest coverage rate; `None` over zero rows.
pub fn max_coverage(chart: &ChartSlice<'_>) -> Option<f64> {
    chart
        .rows()
        .iter()
        .filter_map(|rec| coverage(rec))
        .max_by(f64::total_cmp)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

// ---------------------------------------------------------------------------
// Per-region means
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RegionAverage {
    pub region: String,
    pub mean: f64,
    /// Number of rows averaged.
    pub rows: usize,
}

/// Ordering of [`region_averages`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionOrder {
    /// Ascending region name.
    #[default]
    ByRegion,
    /// Highest mean first; ties by region name.
    ByRateDescending,
}

/// Mean coverage per region. Regions without chart rows do not appear.
pub fn region_averages(chart: &ChartSlice<'_>, order: RegionOrder) -> Vec<RegionAverage> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for rec in chart.rows() {
        if let Some(v) = coverage(rec) {
            let acc = groups.entry(rec.region.as_str()).or_insert((0.0, 0));
            acc.0 += v;
            acc.1 += 1;
        }
    }

    let mut out: Vec<RegionAverage> = groups
        .into_iter()
        .map(|(region, (sum, n))| RegionAverage {
            region: region.to_string(),
            mean: sum / n as f64,
            rows: n,
        })
        .collect();

    if order == RegionOrder::ByRateDescending {
        out.sort_by(|a, b| b.mean.total_cmp(&a.mean).then_with(|| a.region.cmp(&b.region)));
    }
    out
}

// ---------------------------------------------------------------------------
// Per-region breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownEntry {
    pub vaccine: String,
    pub rate: f64,
}

/// Chart rows of one region, ascending by rate. Ties keep source order.
pub fn region_breakdown(chart: &ChartSlice<'_>, region: &str) -> Vec<BreakdownEntry> {
    let mut entries: Vec<BreakdownEntry> = chart
        .rows()
        .iter()
        .filter(|rec| rec.region == region)
        .filter_map(|rec| {
            coverage(rec).map(|rate| BreakdownEntry {
                vaccine: rec.vaccine.clone(),
                rate,
            })
        })
        .collect();
    // sort_by is stable
    entries.sort_by(|a, b| a.rate.total_cmp(&b.rate));
    entries
}
