/// Data layer: records, loading, and row filtering.
///
/// Architecture:
/// ```text
///  log.lammps / freq.out / stdin
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  split lines → Dataset (skip comments / malformed)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, source name, filter trail
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  field-count and field-value predicates → new Dataset
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
