use super::aggregate::{
    average_coverage, max_coverage, region_averages, region_breakdown, total_target_population,
    BreakdownEntry, PopulationTotal, RegionAverage, RegionOrder,
};
use super::filter::{chart_slice, filter_by_region, kpi_slice, Selection};
use super::model::{ChartCategory, Dataset};
use super::pivot::{pivot, PivotMatrix};

// ---------------------------------------------------------------------------
// Derived views for one selection
// ---------------------------------------------------------------------------

/// Coverage rows of one region, ascending by rate.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionBreakdown {
    pub region: String,
    pub entries: Vec<BreakdownEntry>,
}

/// Everything the dashboard draws for a non-empty selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Views {
    pub category: ChartCategory,
    pub population: PopulationTotal,
    pub average_coverage: Option<f64>,
    pub max_coverage: Option<f64>,
    pub region_averages: Vec<RegionAverage>,
    pub pivot: PivotMatrix,
    /// One entry per selected region that has chart rows.
    pub breakdowns: Vec<RegionBreakdown>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    /// No region selected; nothing was aggregated.
    NoSelection,
    Populated(Views),
}

impl DashboardView {
    pub fn views(&self) -> Option<&Views> {
        match self {
            DashboardView::NoSelection => None,
            DashboardView::Populated(v) => Some(v),
        }
    }
}

/// Recompute every derived view from scratch.
pub fn compute_views(dataset: &Dataset, selection: &Selection, order: RegionOrder) -> DashboardView {
    if selection.is_empty() {
        return DashboardView::NoSelection;
    }

    let rows = filter_by_region(dataset, &selection.regions);
    let kpi = kpi_slice(&rows);
    let chart = chart_slice(&rows, selection.category);

    let breakdowns = selection
        .regions
        .iter()
        .map(|region| RegionBreakdown {
            region: region.clone(),
            entries: region_breakdown(&chart, region),
        })
        .filter(|b| !b.entries.is_empty())
        .collect();

    log::debug!(
        "recomputed views: {} regions, {} kpi rows, {} chart rows",
        selection.regions.len(),
        kpi.rows().len(),
        chart.len()
    );

    DashboardView::Populated(Views {
        category: selection.category,
        population: total_target_population(&kpi),
        average_coverage: average_coverage(&chart),
        max_coverage: max_coverage(&chart),
        region_averages: region_averages(&chart, order),
        pivot: pivot(&chart),
        breakdowns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Category, Record, SourceFormat};
    use crate::data::strategies as arb;
    use proptest::prelude::*;

    fn two_regions() -> Dataset {
        let records = vec![
            Record::new("A", Category::Demographic, "Target Population", 1000.0),
            Record::new("A", Category::SummaryIndicator, "BCG", 80.0),
            Record::new("B", Category::Demographic, "Target Population", 2000.0),
            Record::new("B", Category::SummaryIndicator, "BCG", 90.0),
        ];
        Dataset::from_records(records, SourceFormat::Csv, Vec::new(), 0)
    }

    #[test]
    fn test_end_to_end_two_regions() {
        let ds = two_regions();
        let sel = Selection::new(["A", "B"], ChartCategory::SummaryIndicator);

        let view = compute_views(&ds, &sel, RegionOrder::ByRegion);
        let v = view.views().expect("populated");

        assert_eq!(v.population.value(), Some(3000.0));
        assert_eq!(v.average_coverage, Some(85.0));
        assert_eq!(v.max_coverage, Some(90.0));

        let avgs: Vec<_> = v
            .region_averages
            .iter()
            .map(|r| (r.region.as_str(), r.mean))
            .collect();
        assert_eq!(avgs, vec![("A", 80.0), ("B", 90.0)]);

        assert_eq!(v.pivot.get("A", "BCG"), Some(80.0));
        assert_eq!(v.pivot.get("B", "BCG"), Some(90.0));
        assert_eq!(v.pivot.present(), 2);

        assert_eq!(v.breakdowns.len(), 2);
        assert_eq!(v.breakdowns[0].region, "A");
        assert_eq!(v.breakdowns[0].entries[0].rate, 80.0);
    }

    #[test]
    fn test_empty_selection_reports_no_selection() {
        let ds = two_regions();
        for category in ChartCategory::ALL {
            let sel = Selection::new(Vec::<String>::new(), category);
            assert_eq!(
                compute_views(&ds, &sel, RegionOrder::ByRegion),
                DashboardView::NoSelection
            );
        }
    }

    #[test]
    fn test_category_without_rows_is_empty_not_zero() {
        let ds = two_regions();
        let sel = Selection::new(["A"], ChartCategory::BasicAntigen);

        let view = compute_views(&ds, &sel, RegionOrder::ByRegion);
        let v = view.views().expect("populated");

        assert_eq!(v.population.value(), Some(1000.0));
        assert_eq!(v.average_coverage, None);
        assert_eq!(v.max_coverage, None);
        assert!(v.region_averages.is_empty());
        assert!(v.pivot.is_empty());
        assert!(v.breakdowns.is_empty());
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let ds = two_regions();
        let sel = Selection::new(["B", "A"], ChartCategory::SummaryIndicator);
        let first = compute_views(&ds, &sel, RegionOrder::ByRateDescending);
        assert_eq!(first.views().unwrap().region_averages[0].region, "B");
        for _ in 0..3 {
            assert_eq!(compute_views(&ds, &sel, RegionOrder::ByRateDescending), first);
        }
    }

    proptest! {
        #[test]
        fn prop_empty_selection_is_no_selection(
            ds in arb::dataset(),
            category in arb::chart_category(),
            order in arb::region_order()
        ) {
            let sel = Selection::new(Vec::<String>::new(), category);
            prop_assert_eq!(compute_views(&ds, &sel, order), DashboardView::NoSelection);
        }

        #[test]
        fn prop_regions_without_chart_rows_are_absent(
            ds in arb::dataset(),
            sel in arb::selection(),
            order in arb::region_order()
        ) {
            let view = compute_views(&ds, &sel, order);
            let Some(v) = view.views() else {
                prop_assert!(sel.is_empty());
                return Ok(());
            };

            for region in &sel.regions {
                let has_rows = ds
                    .records
                    .iter()
                    .any(|r| &r.region == region && sel.category.matches(&r.category));
                let in_averages = v.region_averages.iter().any(|a| &a.region == region);
                let in_breakdowns = v.breakdowns.iter().any(|b| &b.region == region);

                prop_assert_eq!(in_averages, has_rows, "region averages, {}", region);
                prop_assert_eq!(v.pivot.regions().contains(region), has_rows, "pivot, {}", region);
                prop_assert_eq!(in_breakdowns, has_rows, "breakdowns, {}", region);
            }
            prop_assert!(v.region_averages.iter().all(|a| sel.regions.contains(&a.region)));
            prop_assert!(v.pivot.regions().iter().all(|r| sel.regions.contains(r)));
        }
    }
}
