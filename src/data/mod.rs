/// Data layer: trip types, loading, filtering, and tabular rendering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → TripDataset (optional columns detected once)
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ TripDataset │  Vec<TripRecord>, gender / birth-year flags
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  month / weekday constraints → filtered TripDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  table    │  TripRecord slice → Arrow batch → text table
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod table;
