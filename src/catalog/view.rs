//! View state and the derived results view.
//!
//! One [`ViewController`] owns the record set of the current search plus the
//! mutable view parameters. Every mutator returns a fresh [`ResultsView`]
//! computed by the pure [`compute_view`], so callers never read stale state.

use serde::{Deserialize, Serialize};

use crate::catalog::aggregate::{aggregate, BrandAggregate};
use crate::catalog::filter::FilterChainBuilder;
use crate::catalog::record::ProductRecord;
use crate::catalog::sort::{sort_brands, sort_records, SortKey};

/// Products shown per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Mutable view parameters for one result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Active ordering.
    pub sort_key: SortKey,
    /// Exact-match pharmacy restriction for the list.
    pub pharmacy_filter: Option<String>,
    /// Exact-match brand restriction for the list.
    pub brand_filter: Option<String>,
    /// Brand highlighted in the chart and shown in the comparison panel.
    /// At most one brand is selected at a time.
    pub selected_brand: Option<String>,
    /// Current page, 1-based.
    pub page: usize,
    /// Page size, fixed for the controller's lifetime.
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            sort_key: SortKey::Relevance,
            pharmacy_filter: None,
            brand_filter: None,
            selected_brand: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Derived view bundle: the paginated list slice plus the chart ordering.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsView {
    /// Records on the current page, filtered and sorted.
    pub visible_products: Vec<ProductRecord>,
    /// Price-bearing brand aggregates over the FULL record set, ordered by
    /// the sort key. List filters never narrow the chart.
    pub chart_brands: Vec<BrandAggregate>,
    /// Filtered record count across all pages.
    pub total_count: usize,
    /// Page count for the filtered set.
    pub total_pages: usize,
    /// Effective page after clamping, 1-based.
    pub page: usize,
}

/// The filtered and sorted record set across all pages, in listing order.
/// This is what an export sees: every page, not just the visible one.
pub fn full_listing(records: &[ProductRecord], state: &ViewState) -> Vec<ProductRecord> {
    let chain = FilterChainBuilder::new()
        .pharmacy(state.pharmacy_filter.as_deref())
        .brand(state.brand_filter.as_deref())
        .build();
    let mut filtered = chain.apply(records);
    sort_records(&mut filtered, state.sort_key);
    filtered.into_iter().cloned().collect()
}

/// Computes the derived view for `(records, state)`. Pure: identical inputs
/// produce identical output, including order.
pub fn compute_view(records: &[ProductRecord], state: &ViewState) -> ResultsView {
    let filtered = full_listing(records, state);

    let total_count = filtered.len();
    let total_pages =
        if state.page_size == 0 { 0 } else { total_count.div_ceil(state.page_size) };
    let page = if total_pages == 0 { 1 } else { state.page.clamp(1, total_pages) };
    let visible_products = if total_pages == 0 {
        Vec::new()
    } else {
        filtered
            .iter()
            .skip((page - 1) * state.page_size)
            .take(state.page_size)
            .cloned()
            .collect()
    };

    let mut chart_brands: Vec<BrandAggregate> =
        aggregate(records).into_values().filter(BrandAggregate::has_price).collect();
    sort_brands(&mut chart_brands, state.sort_key);

    ResultsView { visible_products, chart_brands, total_count, total_pages, page }
}

/// Owns one search's records and view state.
#[derive(Debug)]
pub struct ViewController {
    records: Vec<ProductRecord>,
    state: ViewState,
    session: u64,
}

impl ViewController {
    /// Creates an empty controller with the default page size.
    pub fn new() -> Self {
        Self { records: Vec::new(), state: ViewState::default(), session: 0 }
    }

    /// Creates an empty controller with a custom page size (minimum 1).
    pub fn with_page_size(page_size: usize) -> Self {
        let mut controller = Self::new();
        controller.state.page_size = page_size.max(1);
        controller
    }

    /// Replaces the record set for a new search: the whole view state resets
    /// and the session id advances, invalidating anything keyed to the old
    /// session.
    pub fn load(&mut self, records: Vec<ProductRecord>) -> ResultsView {
        self.records = records;
        self.state = ViewState { page_size: self.state.page_size, ..ViewState::default() };
        self.session += 1;
        self.view()
    }

    /// The immutable record set of the current search.
    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    /// The current view parameters.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Identifier of the current search session.
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Currently selected brand, if any.
    pub fn selected_brand(&self) -> Option<&str> {
        self.state.selected_brand.as_deref()
    }

    /// Current derived view without mutating anything.
    pub fn view(&self) -> ResultsView {
        compute_view(&self.records, &self.state)
    }

    /// The full filtered and sorted record set, ignoring pagination. This is
    /// the set an export or a flat dump should walk.
    pub fn listing(&self) -> Vec<ProductRecord> {
        full_listing(&self.records, &self.state)
    }

    /// Changes the ordering. Filters, selection and page stay untouched.
    pub fn set_sort(&mut self, key: SortKey) -> ResultsView {
        self.state.sort_key = key;
        self.view()
    }

    /// Restricts the list to one pharmacy (or clears the restriction) and
    /// returns to page 1. Brand filter and selection stay untouched.
    pub fn set_pharmacy_filter(&mut self, pharmacy: Option<String>) -> ResultsView {
        self.state.pharmacy_filter = pharmacy.filter(|p| !p.is_empty());
        self.state.page = 1;
        self.view()
    }

    /// Restricts the list to one brand (or clears the restriction) and
    /// returns to page 1. Independent of the pharmacy filter.
    pub fn set_brand_filter(&mut self, brand: Option<String>) -> ResultsView {
        self.state.brand_filter = brand.filter(|b| !b.is_empty());
        self.state.page = 1;
        self.view()
    }

    /// Selects a brand for highlighting and comparison. Selecting the brand
    /// that is already selected clears the selection; filters and page are
    /// never touched.
    pub fn select_brand(&mut self, brand: Option<String>) -> ResultsView {
        let brand = brand.filter(|b| !b.is_empty());
        self.state.selected_brand =
            if brand == self.state.selected_brand { None } else { brand };
        self.view()
    }

    /// Moves to a page, clamped into `[1, total_pages]`. No-op when the
    /// filtered set is empty.
    pub fn set_page(&mut self, page: usize) -> ResultsView {
        let total_pages = self.total_pages();
        if total_pages > 0 {
            self.state.page = page.clamp(1, total_pages);
        }
        self.view()
    }

    /// Clears filters, selection, sort and page without touching the
    /// records.
    pub fn reset(&mut self) -> ResultsView {
        self.state = ViewState { page_size: self.state.page_size, ..ViewState::default() };
        self.view()
    }

    fn total_pages(&self) -> usize {
        let count = FilterChainBuilder::new()
            .pharmacy(self.state.pharmacy_filter.as_deref())
            .brand(self.state.brand_filter.as_deref())
            .build()
            .apply(&self.records)
            .len();
        if self.state.page_size == 0 {
            0
        } else {
            count.div_ceil(self.state.page_size)
        }
    }
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::PriceField;

    fn make_record(brand: &str, price: f64, position: u32, pharmacy: &str) -> ProductRecord {
        ProductRecord {
            name: format!("{brand}@{price}"),
            brand: brand.to_string(),
            pharmacy: pharmacy.to_string(),
            price: PriceField::Amount(price),
            original_price: None,
            has_discount: false,
            discount_percentage: None,
            position: Some(position),
            description: None,
            product_url: None,
        }
    }

    fn abc_records() -> Vec<ProductRecord> {
        vec![
            make_record("A", 10.0, 1, "X"),
            make_record("A", 20.0, 2, "Y"),
            make_record("B", 15.0, 1, "X"),
        ]
    }

    fn visible_names(view: &ResultsView) -> Vec<&str> {
        view.visible_products.iter().map(|r| r.name.as_str()).collect()
    }

    // compute_view tests

    #[test]
    fn test_price_asc_orders_across_brands() {
        let records = abc_records();
        let state = ViewState { sort_key: SortKey::PriceAsc, ..ViewState::default() };

        let view = compute_view(&records, &state);
        assert_eq!(visible_names(&view), vec!["A@10", "B@15", "A@20"]);
        assert_eq!(view.total_count, 3);
        assert_eq!(view.total_pages, 1);
    }

    #[test]
    fn test_pharmacy_filter_keeps_chart_complete() {
        let records = abc_records();
        let state = ViewState {
            sort_key: SortKey::PriceAsc,
            pharmacy_filter: Some("X".to_string()),
            ..ViewState::default()
        };

        let view = compute_view(&records, &state);
        assert_eq!(visible_names(&view), vec!["A@10", "B@15"]);

        let chart: Vec<&str> = view.chart_brands.iter().map(|b| b.brand.as_str()).collect();
        assert_eq!(chart, vec!["A", "B"]);
    }

    #[test]
    fn test_chart_excludes_brands_without_prices() {
        let mut records = abc_records();
        let mut unpriced = make_record("C", 0.0, 3, "X");
        unpriced.price = PriceField::Text("Preço não disponível".to_string());
        records.push(unpriced);

        let view = compute_view(&records, &ViewState::default());
        assert!(view.chart_brands.iter().all(|b| b.brand != "C"));
        assert_eq!(view.total_count, 4);
    }

    #[test]
    fn test_compute_view_clamps_overflowing_page() {
        let records = abc_records();
        let state = ViewState { page: 99, page_size: 2, ..ViewState::default() };

        let view = compute_view(&records, &state);
        assert_eq!(view.total_pages, 2);
        assert_eq!(view.page, 2);
        assert_eq!(view.visible_products.len(), 1);
    }

    #[test]
    fn test_compute_view_empty_records() {
        let view = compute_view(&[], &ViewState::default());
        assert!(view.visible_products.is_empty());
        assert!(view.chart_brands.is_empty());
        assert_eq!(view.total_pages, 0);
        assert_eq!(view.page, 1);
    }

    #[test]
    fn test_pagination_concatenation_covers_filtered_set() {
        let records: Vec<ProductRecord> = (0..25)
            .map(|i| make_record("Marca", 100.0 - i as f64, i + 1, "Farma"))
            .collect();
        let mut state =
            ViewState { sort_key: SortKey::PriceAsc, page_size: 10, ..ViewState::default() };

        let mut seen = Vec::new();
        let first = compute_view(&records, &state);
        assert_eq!(first.total_pages, 3);
        for page in 1..=first.total_pages {
            state.page = page;
            let view = compute_view(&records, &state);
            seen.extend(view.visible_products.into_iter().map(|r| r.name));
        }

        assert_eq!(seen.len(), 25);
        let mut expected: Vec<String> = records.iter().map(|r| r.name.clone()).collect();
        expected.reverse(); // ascending price = reverse insertion order here
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_full_listing_ignores_pagination() {
        let records = abc_records();
        let state = ViewState {
            sort_key: SortKey::PriceAsc,
            pharmacy_filter: Some("X".to_string()),
            page: 7,
            page_size: 1,
            ..ViewState::default()
        };

        let listing = full_listing(&records, &state);
        let names: Vec<&str> = listing.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A@10", "B@15"]);
    }

    // ViewController tests

    #[test]
    fn test_load_resets_state_and_bumps_session() {
        let mut controller = ViewController::new();
        assert_eq!(controller.session(), 0);

        controller.load(abc_records());
        controller.set_sort(SortKey::PriceDesc);
        controller.set_brand_filter(Some("A".to_string()));
        controller.select_brand(Some("A".to_string()));

        let view = controller.load(abc_records());
        assert_eq!(controller.session(), 2);
        assert_eq!(controller.state().sort_key, SortKey::Relevance);
        assert!(controller.state().brand_filter.is_none());
        assert!(controller.selected_brand().is_none());
        assert_eq!(view.total_count, 3);
    }

    #[test]
    fn test_set_sort_preserves_filters_selection_and_page() {
        let records: Vec<ProductRecord> =
            (0..30).map(|i| make_record("A", i as f64 + 1.0, i + 1, "X")).collect();
        let mut controller = ViewController::new();
        controller.load(records);
        controller.set_pharmacy_filter(Some("X".to_string()));
        controller.select_brand(Some("A".to_string()));
        controller.set_page(3);

        let view = controller.set_sort(SortKey::PriceDesc);
        assert_eq!(controller.state().pharmacy_filter.as_deref(), Some("X"));
        assert_eq!(controller.selected_brand(), Some("A"));
        assert_eq!(controller.state().page, 3);
        assert_eq!(view.page, 3);
    }

    #[test]
    fn test_filters_reset_page_to_first() {
        let records: Vec<ProductRecord> =
            (0..30).map(|i| make_record("A", i as f64 + 1.0, i + 1, "X")).collect();
        let mut controller = ViewController::new();
        controller.load(records);
        controller.set_page(3);

        controller.set_pharmacy_filter(Some("X".to_string()));
        assert_eq!(controller.state().page, 1);

        controller.set_page(2);
        controller.set_brand_filter(None);
        assert_eq!(controller.state().page, 1);
    }

    #[test]
    fn test_filters_do_not_clear_each_other_or_selection() {
        let mut controller = ViewController::new();
        controller.load(abc_records());
        controller.set_brand_filter(Some("A".to_string()));
        controller.select_brand(Some("B".to_string()));

        controller.set_pharmacy_filter(Some("X".to_string()));
        assert_eq!(controller.state().brand_filter.as_deref(), Some("A"));
        assert_eq!(controller.selected_brand(), Some("B"));
    }

    #[test]
    fn test_select_brand_toggles() {
        let mut controller = ViewController::new();
        controller.load(abc_records());

        controller.select_brand(Some("A".to_string()));
        assert_eq!(controller.selected_brand(), Some("A"));

        controller.select_brand(Some("A".to_string()));
        assert!(controller.selected_brand().is_none());

        controller.select_brand(Some("A".to_string()));
        controller.select_brand(Some("B".to_string()));
        assert_eq!(controller.selected_brand(), Some("B"));
        controller.select_brand(Some("B".to_string()));
        assert!(controller.selected_brand().is_none());
    }

    #[test]
    fn test_select_brand_leaves_filters_and_page_alone() {
        let records: Vec<ProductRecord> =
            (0..30).map(|i| make_record("A", i as f64 + 1.0, i + 1, "X")).collect();
        let mut controller = ViewController::new();
        controller.load(records);
        controller.set_pharmacy_filter(Some("X".to_string()));
        controller.set_page(2);

        controller.select_brand(Some("A".to_string()));
        assert_eq!(controller.state().pharmacy_filter.as_deref(), Some("X"));
        assert_eq!(controller.state().page, 2);
    }

    #[test]
    fn test_set_page_clamps_and_ignores_empty() {
        let mut controller = ViewController::with_page_size(2);
        controller.load(abc_records());

        let view = controller.set_page(99);
        assert_eq!(view.page, 2);
        assert_eq!(controller.state().page, 2);

        let view = controller.set_page(0);
        assert_eq!(view.page, 1);

        let mut empty = ViewController::new();
        empty.load(Vec::new());
        let view = empty.set_page(5);
        assert_eq!(empty.state().page, 1);
        assert_eq!(view.total_pages, 0);
    }

    #[test]
    fn test_listing_spans_every_page() {
        let mut controller = ViewController::with_page_size(2);
        controller.load(abc_records());
        controller.set_sort(SortKey::PriceAsc);

        assert_eq!(controller.view().visible_products.len(), 2);
        let listing = controller.listing();
        let names: Vec<&str> = listing.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A@10", "B@15", "A@20"]);
    }

    #[test]
    fn test_reset_clears_view_state_only() {
        let mut controller = ViewController::new();
        controller.load(abc_records());
        let session = controller.session();
        controller.set_sort(SortKey::DiscountDesc);
        controller.set_brand_filter(Some("A".to_string()));
        controller.select_brand(Some("B".to_string()));

        let view = controller.reset();
        assert_eq!(controller.state().sort_key, SortKey::Relevance);
        assert!(controller.state().brand_filter.is_none());
        assert!(controller.selected_brand().is_none());
        assert_eq!(controller.session(), session);
        assert_eq!(view.total_count, 3);
    }

    #[test]
    fn test_with_page_size_floor() {
        let controller = ViewController::with_page_size(0);
        assert_eq!(controller.state().page_size, 1);
    }

    #[test]
    fn test_mutators_are_idempotent_for_same_arguments() {
        let mut controller = ViewController::new();
        controller.load(abc_records());

        controller.set_sort(SortKey::PriceAsc);
        let first = controller.state().clone();
        controller.set_sort(SortKey::PriceAsc);
        assert_eq!(*controller.state(), first);

        controller.set_pharmacy_filter(Some("X".to_string()));
        let first = controller.state().clone();
        controller.set_pharmacy_filter(Some("X".to_string()));
        assert_eq!(*controller.state(), first);
    }
}
