/// Data layer: core types, loading, normalization and filtering.
///
/// Architecture:
/// ```text
///  .csv / .zip / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read file → RawTable (normalized headers, string cells)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  rename + explicit schema → IncidentTable, lookups
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  demographic / area predicates → borrowed rows
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod schema;
