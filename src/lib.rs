//! pharma-scan - Medicine price comparison CLI for Brazilian pharmacies
//!
//! Talks to a pharmacy aggregation backend, flattens its per-pharmacy
//! results into one comparable product set, and derives every rendered
//! view (sorting, filtering, pagination, brand chart, comparison summary,
//! brand analysis) as a pure function of that set.

pub mod analysis;
pub mod api;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod export;
pub mod format;
pub mod present;

pub use api::models::{PriceField, SearchRequest, SearchResponse};
pub use catalog::{normalize, ProductRecord, SortKey, ViewController};
pub use config::Config;
