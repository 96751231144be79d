/// Data layer: tables, CSV ingestion, and CSV export.
///
/// Architecture:
/// ```text
///   uploaded .csv bytes
///        │
///        ▼
///   ┌──────────┐
///   │  ingest   │  parse bytes → RawTable (typed columns)
///   └──────────┘
///        │
///        ▼   (scoring::score)
///   ┌─────────────┐
///   │ ResultTable  │  identifier + TARGET probability per row
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  ResultTable → UTF-8 CSV bytes
///   └──────────┘
/// ```

pub mod export;
pub mod ingest;
pub mod model;
