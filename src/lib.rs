//! Filter and aggregate whitespace-delimited simulation output.
//!
//! ```text
//!  input ─▶ data::loader ─▶ data::filter ─▶ aggregate ─▶ format ─▶ text / JSON
//! ```

pub mod aggregate;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod format;
pub mod run;

pub use aggregate::{aggregate, aggregate_grouped, AggregateResult, AggregationSpec, Statistic};
pub use data::filter::{filter, Filter, FilterPredicate};
pub use data::loader::{load_path, load_reader, LoadOptions};
pub use data::model::{Dataset, Record};
pub use error::{DomainError, SimtabError};
pub use format::{format, Template};
