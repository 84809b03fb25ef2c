//! End-to-end pipeline tests driven by a captured backend response.

use pharma_scan::api::models::SearchResponse;
use pharma_scan::catalog::{normalize, overall_stats, PharmacyError, ProductRecord, SortKey, ViewController};
use pharma_scan::export::csv_string;
use pharma_scan::present::{chart_series, comparison_summary, Tier};

const SEARCH_FIXTURE: &str = include_str!("fixtures/search_response.json");

fn load_fixture() -> (Vec<ProductRecord>, Vec<PharmacyError>) {
    let response: SearchResponse = serde_json::from_str(SEARCH_FIXTURE).unwrap();
    let normalized = normalize(response.entries().unwrap());
    (normalized.records, normalized.errors)
}

#[test]
fn test_normalize_prefers_processed_results() {
    let (records, errors) = load_fixture();

    // The raw `results` map carries a single product; the processed map has
    // five plus one failed pharmacy.
    assert_eq!(records.len(), 5);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].pharmacy, "Farmácias São João");
    assert_eq!(errors[0].error, "Timeout ao consultar a farmácia");

    let pharmacies: Vec<&str> = records.iter().map(|r| r.pharmacy.as_str()).collect();
    assert!(pharmacies.contains(&"Droga Raia"));
    assert!(pharmacies.contains(&"Ultrafarma"));
}

#[test]
fn test_overall_stats_skip_text_prices() {
    let (records, _) = load_fixture();
    let stats = overall_stats(&records).unwrap();

    assert_eq!(stats.total_products, 5);
    assert_eq!(stats.total_brands, 3);
    assert_eq!(stats.min_price, 7.9);
    assert_eq!(stats.max_price, 32.9);
    // Mean over the four numeric prices; the consult-only listing is skipped.
    assert!((stats.avg_price - 16.96).abs() < 1e-9);
}

#[test]
fn test_view_sorts_filters_and_paginates() {
    let (records, _) = load_fixture();
    let mut controller = ViewController::with_page_size(2);
    controller.load(records);

    let view = controller.set_sort(SortKey::PriceAsc);
    assert_eq!(view.total_count, 5);
    assert_eq!(view.total_pages, 3);
    assert_eq!(view.visible_products[0].name, "Dipirona Sódica 500mg 10 Comprimidos Prati-Donaduzzi");
    assert_eq!(view.visible_products[1].name, "Dipirona 500mg Genérico Medley 10 Comprimidos");

    // Non-numeric prices sort last, so the consult-only listing closes page 3.
    let view = controller.set_page(3);
    assert_eq!(view.visible_products.len(), 1);
    assert_eq!(view.visible_products[0].name, "Dipirona Monoidratada 500mg Gotas 20ml");

    let view = controller.set_pharmacy_filter(Some("Ultrafarma".to_string()));
    assert_eq!(view.total_count, 2);
    assert_eq!(view.page, 1);
    assert!(view.visible_products.iter().all(|r| r.pharmacy == "Ultrafarma"));
}

#[test]
fn test_chart_order_and_brand_summary() {
    let (records, _) = load_fixture();
    let mut controller = ViewController::new();
    controller.load(records);
    controller.select_brand(Some("Novalgina".to_string()));

    let view = controller.view();
    let chart = chart_series(&view.chart_brands, controller.selected_brand());

    // Relevance order over modal positions: Novalgina and Prati-Donaduzzi
    // both peak at position 1, Medley at 2.
    assert_eq!(chart.labels, vec!["Novalgina", "Prati-Donaduzzi", "Medley"]);
    assert_eq!(chart.highlight, vec![true, false, false]);
    assert_eq!(chart.discounts, vec![Some(11), Some(20), None]);

    let summary = comparison_summary(controller.records(), "Novalgina").unwrap();
    assert_eq!(summary.position_rank, 3);
    assert_eq!(summary.total_brands, 3);
    assert_eq!(summary.tier, Tier::Priciest);
    assert_eq!(summary.pharmacy_count, 2);
    assert_eq!(summary.product_count, 2);
    assert!(summary.delta_from_overall_avg > 0.0);
    assert!((summary.avg_price - 25.695).abs() < 1e-9);
}

#[test]
fn test_csv_export_of_full_listing() {
    let (records, _) = load_fixture();
    let mut controller = ViewController::with_page_size(2);
    controller.load(records);
    controller.set_sort(SortKey::PriceAsc);

    let csv = csv_string(&controller.listing()).unwrap();
    assert!(csv.starts_with('\u{feff}'));

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 6); // header + five records, pagination ignored
    assert!(lines[0].ends_with("name;brand;pharmacy;price;original_price;discount_percentage;has_discount;position;description;product_url"));
    assert!(lines[1].contains("7,90"));
    assert!(lines[1].contains(";20;"));
    assert!(lines[5].contains("Preço sob consulta"));
}
