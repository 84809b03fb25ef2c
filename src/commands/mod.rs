//! CLI command implementations.

pub mod analyze;
pub mod search;

pub use analyze::AnalyzeCommand;
pub use search::{SearchCommand, SearchOptions};
