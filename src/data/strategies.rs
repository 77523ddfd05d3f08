//! `proptest` generators shared by the data-layer tests.

use std::collections::BTreeSet;

use proptest::prelude::*;

use super::aggregate::RegionOrder;
use super::filter::Selection;
use super::model::{Category, ChartCategory, Dataset, Record, SourceFormat};

pub const REGIONS: [&str; 5] = ["Bicol", "CAR", "MIMAROPA", "NCR", "Soccsksargen"];
const VACCINES: [&str; 4] = ["BCG", "FIC", "MCV1", "OPV3"];

pub fn category() -> impl Strategy<Value = Category> {
    prop_oneof![
        Just(Category::Demographic),
        Just(Category::BasicAntigen),
        Just(Category::SummaryIndicator),
        Just(Category::Other("Year".to_string())),
    ]
}

pub fn record() -> impl Strategy<Value = Record> {
    (0..REGIONS.len(), category(), 0..VACCINES.len(), 0.0..100.0f64)
        .prop_map(|(r, cat, v, value)| Record::new(REGIONS[r], cat, VACCINES[v], value))
}

/// Up to 40 rows over a small pool, so duplicates and gaps are common.
pub fn dataset() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(record(), 0..40)
        .prop_map(|records| Dataset::from_records(records, SourceFormat::Csv, Vec::new(), 0))
}

/// Any subset of the region pool plus one region no dataset contains.
pub fn regions() -> impl Strategy<Value = BTreeSet<String>> {
    let mut pool: Vec<String> = REGIONS.iter().map(|r| r.to_string()).collect();
    pool.push("Nowhere".to_string());
    let len = pool.len();
    prop::sample::subsequence(pool, 0..=len)
        .prop_map(|picked| picked.into_iter().collect::<BTreeSet<String>>())
}

pub fn chart_category() -> impl Strategy<Value = ChartCategory> {
    prop::sample::select(ChartCategory::ALL.to_vec())
}

pub fn selection() -> impl Strategy<Value = Selection> {
    (regions(), chart_category()).prop_map(|(regions, category)| Selection { regions, category })
}

pub fn region_order() -> impl Strategy<Value = RegionOrder> {
    prop_oneof![Just(RegionOrder::ByRegion), Just(RegionOrder::ByRateDescending)]
}
