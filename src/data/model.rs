use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Category – the row classification
// ---------------------------------------------------------------------------

/// Row classification as it appears in the `Category` column.
///
/// Only the first three labels carry meaning for the dashboard; anything
/// else is kept verbatim in `Other` so the set stays open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Demographic,
    BasicAntigen,
    SummaryIndicator,
    Other(String),
}

impl Category {
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "Demographic" => Category::Demographic,
            "Basic Antigen" => Category::BasicAntigen,
            "Summary Indicator" => Category::SummaryIndicator,
            other => Category::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Category::Demographic => "Demographic",
            Category::BasicAntigen => "Basic Antigen",
            Category::SummaryIndicator => "Summary Indicator",
            Category::Other(label) => label,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The two categories a user may chart. `Demographic` is deliberately
/// unrepresentable here: it only feeds the population KPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartCategory {
    #[default]
    BasicAntigen,
    SummaryIndicator,
}

impl ChartCategory {
    pub const ALL: [ChartCategory; 2] = [ChartCategory::BasicAntigen, ChartCategory::SummaryIndicator];

    pub fn label(self) -> &'static str {
        match self {
            ChartCategory::BasicAntigen => "Basic Antigen",
            ChartCategory::SummaryIndicator => "Summary Indicator",
        }
    }

    /// Whether a row of `category` belongs to this chart category.
    pub fn matches(self, category: &Category) -> bool {
        matches!(
            (self, category),
            (ChartCategory::BasicAntigen, Category::BasicAntigen)
                | (ChartCategory::SummaryIndicator, Category::SummaryIndicator)
        )
    }
}

impl fmt::Display for ChartCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Measure – the unit-tagged value of a row
// ---------------------------------------------------------------------------

/// `Coverage_Rate` means different things depending on the category, so the
/// raw number is only ever handed out together with its unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    /// Target population, in thousands (Demographic rows).
    PopulationThousands(f64),
    /// Coverage percentage (Basic Antigen / Summary Indicator rows).
    CoveragePercent(f64),
    /// A category the dashboard does not interpret.
    Unclassified(f64),
}

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub region: String,
    pub category: Category,
    /// Antigen or indicator name; empty / meaningless for Demographic rows.
    pub vaccine: String,
    /// Raw `Coverage_Rate` cell. Prefer [`Record::measure`].
    pub value: f64,
}

impl Record {
    pub fn new(region: &str, category: Category, vaccine: &str, value: f64) -> Self {
        Record {
            region: region.to_string(),
            category,
            vaccine: vaccine.to_string(),
            value,
        }
    }

    pub fn measure(&self) -> Measure {
        match self.category {
            Category::Demographic => Measure::PopulationThousands(self.value),
            Category::BasicAntigen | Category::SummaryIndicator => {
                Measure::CoveragePercent(self.value)
            }
            Category::Other(_) => Measure::Unclassified(self.value),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// File format the dataset was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    Parquet,
}

/// The full parsed table. Immutable once built; shared read-only behind an
/// `Arc` by [`super::store::DatasetStore`].
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All rows, in source order.
    pub records: Vec<Record>,
    /// Sorted distinct region names.
    pub regions: Vec<String>,
    /// Sorted distinct vaccine names over non-Demographic rows.
    pub vaccines: Vec<String>,
    /// Rows dropped at load time because `Coverage_Rate` was blank.
    pub skipped_rows: usize,
    pub format: SourceFormat,
    /// The bytes the dataset was parsed from, kept for export.
    pub source: Vec<u8>,
}

impl Dataset {
    /// Build column indices from the loaded records.
    pub fn from_records(
        records: Vec<Record>,
        format: SourceFormat,
        source: Vec<u8>,
        skipped_rows: usize,
    ) -> Self {
        let mut regions: BTreeSet<&str> = BTreeSet::new();
        let mut vaccines: BTreeSet<&str> = BTreeSet::new();
        for rec in &records {
            regions.insert(&rec.region);
            if rec.category != Category::Demographic {
                vaccines.insert(&rec.vaccine);
            }
        }
        let regions = regions.into_iter().map(str::to_string).collect();
        let vaccines = vaccines.into_iter().map(str::to_string).collect();

        Dataset {
            records,
            regions,
            vaccines,
            skipped_rows,
            format,
            source,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_known_and_open() {
        assert_eq!(Category::parse("Demographic"), Category::Demographic);
        assert_eq!(Category::parse(" Basic Antigen "), Category::BasicAntigen);
        assert_eq!(Category::parse("Summary Indicator"), Category::SummaryIndicator);
        assert_eq!(
            Category::parse("Booster"),
            Category::Other("Booster".to_string())
        );
        assert_eq!(Category::parse("Booster").label(), "Booster");
    }

    #[test]
    fn test_chart_category_never_matches_demographic() {
        for cat in ChartCategory::ALL {
            assert!(!cat.matches(&Category::Demographic));
        }
        assert!(ChartCategory::BasicAntigen.matches(&Category::BasicAntigen));
        assert!(!ChartCategory::BasicAntigen.matches(&Category::SummaryIndicator));
    }

    #[test]
    fn test_measure_is_tagged_by_category() {
        let pop = Record::new("A", Category::Demographic, "", 1000.0);
        let cov = Record::new("A", Category::SummaryIndicator, "BCG", 80.0);
        let other = Record::new("A", Category::Other("X".into()), "BCG", 3.0);

        assert_eq!(pop.measure(), Measure::PopulationThousands(1000.0));
        assert_eq!(cov.measure(), Measure::CoveragePercent(80.0));
        assert_eq!(other.measure(), Measure::Unclassified(3.0));
    }

    #[test]
    fn test_dataset_indices_are_sorted_and_distinct() {
        let records = vec![
            Record::new("B", Category::BasicAntigen, "MCV1", 70.0),
            Record::new("A", Category::BasicAntigen, "BCG", 80.0),
            Record::new("A", Category::Demographic, "Total", 1000.0),
            Record::new("B", Category::BasicAntigen, "BCG", 90.0),
        ];
        let ds = Dataset::from_records(records, SourceFormat::Csv, Vec::new(), 0);

        assert_eq!(ds.len(), 4);
        assert_eq!(ds.regions, vec!["A", "B"]);
        // Demographic labels are not vaccines
        assert_eq!(ds.vaccines, vec!["BCG", "MCV1"]);
    }
}
