/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  store    │  load once, hand out Arc<Dataset>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  Selection → region rows → KpiSlice / ChartSlice
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────────┐
///   │ aggregate / pivot    │  KPIs, region means, matrix, breakdowns
///   └─────────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  views    │  everything the UI draws for one selection
///   └──────────┘
/// ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pivot;
pub mod store;
pub mod views;

#[cfg(test)]
mod strategies;
