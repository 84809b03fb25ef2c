//! Composable record filters for the results list.
//!
//! Filters narrow the visible list only; chart aggregation always runs over
//! the unfiltered record set.

use crate::catalog::record::ProductRecord;

/// Trait for filtering product records.
pub trait Filter: Send + Sync {
    /// Returns true if the record passes the filter.
    fn matches(&self, record: &ProductRecord) -> bool;

    /// Returns a description of this filter.
    fn description(&self) -> String;
}

/// Keeps only records from one pharmacy, by exact display name.
pub struct PharmacyFilter {
    pharmacy: String,
}

impl PharmacyFilter {
    pub fn new(pharmacy: impl Into<String>) -> Self {
        Self { pharmacy: pharmacy.into() }
    }
}

impl Filter for PharmacyFilter {
    fn matches(&self, record: &ProductRecord) -> bool {
        record.pharmacy == self.pharmacy
    }

    fn description(&self) -> String {
        format!("Pharmacy: {}", self.pharmacy)
    }
}

/// Keeps only records of one brand, by exact string.
pub struct BrandFilter {
    brand: String,
}

impl BrandFilter {
    pub fn new(brand: impl Into<String>) -> Self {
        Self { brand: brand.into() }
    }
}

impl Filter for BrandFilter {
    fn matches(&self, record: &ProductRecord) -> bool {
        record.brand == self.brand
    }

    fn description(&self) -> String {
        format!("Brand: {}", self.brand)
    }
}

/// A chain of filters that must all pass.
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    /// Creates an empty filter chain.
    pub fn new() -> Self {
        Self { filters: Vec::new() }
    }

    /// Adds a filter to the chain.
    pub fn add(&mut self, filter: impl Filter + 'static) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Checks if a record passes all filters.
    pub fn matches(&self, record: &ProductRecord) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }

    /// Filters a record slice, preserving input order.
    pub fn apply<'a>(&self, records: &'a [ProductRecord]) -> Vec<&'a ProductRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// Returns true if no filters are configured.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns the number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns descriptions of all filters.
    pub fn descriptions(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.description()).collect()
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing a FilterChain from view state.
pub struct FilterChainBuilder {
    chain: FilterChain,
}

impl FilterChainBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self { chain: FilterChain::new() }
    }

    /// Adds a pharmacy filter; skipped when absent or empty.
    pub fn pharmacy(mut self, pharmacy: Option<&str>) -> Self {
        if let Some(pharmacy) = pharmacy.filter(|p| !p.is_empty()) {
            self.chain.add(PharmacyFilter::new(pharmacy));
        }
        self
    }

    /// Adds a brand filter; skipped when absent or empty.
    pub fn brand(mut self, brand: Option<&str>) -> Self {
        if let Some(brand) = brand.filter(|b| !b.is_empty()) {
            self.chain.add(BrandFilter::new(brand));
        }
        self
    }

    /// Builds the filter chain.
    pub fn build(self) -> FilterChain {
        self.chain
    }
}

impl Default for FilterChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}
