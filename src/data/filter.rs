use std::collections::BTreeSet;

use super::model::{Category, ChartCategory, Dataset, Record};

// ---------------------------------------------------------------------------
// Selection – what the user picked in the side panel
// ---------------------------------------------------------------------------

/// Current region set and chart category.
///
/// An empty region set is valid: every derived view is then reported as
/// "no selection" instead of being aggregated over zero rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub regions: BTreeSet<String>,
    pub category: ChartCategory,
}

impl Selection {
    pub fn new<I, S>(regions: I, category: ChartCategory) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            regions: regions.into_iter().map(Into::into).collect(),
            category,
        }
    }

    /// Initial state: the first `n` regions in sorted order.
    pub fn with_default_regions(dataset: &Dataset, n: usize) -> Self {
        Self::new(dataset.regions.iter().take(n).cloned(), ChartCategory::default())
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn toggle_region(&mut self, region: &str) {
        if !self.regions.remove(region) {
            self.regions.insert(region.to_string());
        }
    }

    pub fn select_all(&mut self, dataset: &Dataset) {
        self.regions = dataset.regions.iter().cloned().collect();
    }

    pub fn select_none(&mut self) {
        self.regions.clear();
    }
}

// ---------------------------------------------------------------------------
// Slices
// ---------------------------------------------------------------------------

/// Demographic rows of the selected regions. Values are populations in
/// thousands.
#[derive(Debug, Clone, Default)]
pub struct KpiSlice<'a>(Vec<&'a Record>);

/// Rows of the selected regions for one chart category. Values are coverage
/// percentages.
#[derive(Debug, Clone)]
pub struct ChartSlice<'a> {
    rows: Vec<&'a Record>,
}

impl<'a> KpiSlice<'a> {
    pub fn rows(&self) -> &[&'a Record] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> ChartSlice<'a> {
    pub fn rows(&self) -> &[&'a Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Rows whose region is in `regions`, in source order. An empty set yields
/// no rows.
pub fn filter_by_region<'a>(dataset: &'a Dataset, regions: &BTreeSet<String>) -> Vec<&'a Record> {
    if regions.is_empty() {
        return Vec::new();
    }
    dataset
        .records
        .iter()
        .filter(|rec| regions.contains(&rec.region))
        .collect()
}

pub fn kpi_slice<'a>(rows: &[&'a Record]) -> KpiSlice<'a> {
    KpiSlice(
        rows.iter()
            .copied()
            .filter(|rec| rec.category == Category::Demographic)
            .collect(),
    )
}

pub fn chart_slice<'a>(rows: &[&'a Record], category: ChartCategory) -> ChartSlice<'a> {
    ChartSlice {
        rows: rows
            .iter()
            .copied()
            .filter(|rec| category.matches(&rec.category))
            .collect(),
    }
}
