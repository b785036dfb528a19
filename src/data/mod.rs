/// Data layer: core types, loading, cascading filters and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file once → Arc<Table>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year → month → city → attraction type
///   └──────────┘
///        │  filtered rows
///        ▼
///   ┌───────────┐
///   │ aggregate  │  metrics, top-5, histograms, insights
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
