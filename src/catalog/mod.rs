//! Product catalog: normalization, aggregation, filtering, and view state.

pub mod aggregate;
pub mod filter;
pub mod record;
pub mod sort;
pub mod view;

pub use aggregate::{aggregate, overall_stats, BrandAggregate, SearchStats};
pub use record::{normalize, NormalizedResults, PharmacyError, ProductRecord};
pub use sort::SortKey;
pub use view::{compute_view, full_listing, ResultsView, ViewController, ViewState};
