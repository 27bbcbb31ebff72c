/// Data layer: core types, loading, filtering and derived views.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json
///        │
///        ▼
///   ┌──────────┐     ┌───────────┐
///   │  loader   │ ◀── │ sentiment │  parse + enrich → CatalogTable
///   └──────────┘     └───────────┘
///        │  (memoised by cache, keyed on path + mtime)
///        ▼
///   ┌──────────────┐
///   │ CatalogTable  │  Vec<Record>, immutable
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterCriteria → new CatalogTable
///   └──────────┘
///        │
///        ├──▶ aggregate   group-by counts, metrics, histograms
///        └──▶ export      delimited text
/// ```

pub mod aggregate;
pub mod cache;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod sentiment;
