//! Output formatting for search reports (table, JSON, CSV).

use serde::Serialize;

use crate::catalog::aggregate::SearchStats;
use crate::catalog::record::{PharmacyError, ProductRecord};
use crate::catalog::view::ResultsView;
use crate::config::OutputFormat;
use crate::export::{csv_rows, CSV_HEADER};
use crate::present::{format_brl, format_brl_delta, price_display, ChartSeries, ComparisonSummary};

/// Everything one search renders: pharmacy failures, overall statistics,
/// the paginated view, the chart and comparison projections, and the full
/// filtered listing for flat output.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    /// Medicine description that was searched.
    pub description: String,
    /// Pharmacies whose scrape failed.
    pub errors: Vec<PharmacyError>,
    /// Statistics over every priced record, before filtering.
    pub stats: Option<SearchStats>,
    /// Full filtered and sorted listing across all pages. CSV output walks
    /// this, not the visible page.
    pub products: Vec<ProductRecord>,
    /// Paginated view plus the ordered chart brands.
    pub view: ResultsView,
    /// Drawable per-brand average price series.
    pub chart: ChartSeries,
    /// Comparison for the selected brand, when one is selected and priced.
    pub summary: Option<ComparisonSummary>,
}

/// Formats search reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a full search report.
    pub fn format_report(&self, report: &SearchReport) -> String {
        match self.format {
            OutputFormat::Json => self.json_report(report),
            OutputFormat::Table => self.table_report(report),
            OutputFormat::Csv => self.csv_report(report),
        }
    }

    // JSON formatting

    fn json_report(&self, report: &SearchReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    // Table formatting

    fn table_report(&self, report: &SearchReport) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Results for: {}", report.description));
        lines.push("=".repeat(80));

        if !report.errors.is_empty() {
            for error in &report.errors {
                lines.push(format!("⚠️ {}: {}", error.pharmacy, error.error));
            }
            lines.push(String::new());
        }

        if let Some(stats) = &report.stats {
            lines.push(format!(
                "Products: {} | Brands: {}",
                stats.total_products, stats.total_brands
            ));
            lines.push(format!(
                "Min {} | Avg {} | Max {}",
                format_brl(stats.min_price),
                format_brl(stats.avg_price),
                format_brl(stats.max_price)
            ));
            lines.push(String::new());
        }

        if report.view.visible_products.is_empty() {
            lines.push("No products found.".to_string());
        } else {
            let index_width = 4;
            let name_width = 40;
            let brand_width = 20;
            let pharmacy_width = 18;
            let price_width = 12;

            lines.push(format!(
                "{:<index_width$}  {:<name_width$}  {:<brand_width$}  {:<pharmacy_width$}  {:<price_width$}  {}",
                "#", "Product", "Brand", "Pharmacy", "Price", "Disc"
            ));
            lines.push(format!(
                "{:-<index_width$}  {:-<name_width$}  {:-<brand_width$}  {:-<pharmacy_width$}  {:-<price_width$}  {:-<4}",
                "", "", "", "", "", ""
            ));

            for (i, product) in report.view.visible_products.iter().enumerate() {
                let disc = product
                    .discount_percent()
                    .map(|d| format!("{d}%"))
                    .unwrap_or_else(|| "-".to_string());
                lines.push(format!(
                    "{:<index_width$}  {:<name_width$}  {:<brand_width$}  {:<pharmacy_width$}  {:<price_width$}  {}",
                    i + 1,
                    Self::truncate(&product.name, name_width),
                    Self::truncate(&product.brand, brand_width),
                    Self::truncate(&product.pharmacy, pharmacy_width),
                    price_display(&product.price),
                    disc
                ));
            }

            lines.push(String::new());
            lines.push(format!(
                "Page {}/{} | Total: {} products",
                report.view.page, report.view.total_pages, report.view.total_count
            ));
        }

        if !report.chart.is_empty() {
            lines.push(String::new());
            lines.push("Average price by brand:".to_string());
            let label_width = report
                .chart
                .labels
                .iter()
                .map(|l| l.chars().count())
                .max()
                .unwrap_or(0);
            for i in 0..report.chart.len() {
                let marker = if report.chart.highlight[i] { "▶" } else { " " };
                let badge = report.chart.discounts[i]
                    .map(|d| format!("  [-{d}%]"))
                    .unwrap_or_default();
                lines.push(format!(
                    "{marker} {:<label_width$}  {:>10}{badge}",
                    report.chart.labels[i],
                    format_brl(report.chart.values[i])
                ));
            }
        }

        if let Some(summary) = &report.summary {
            lines.push(String::new());
            lines.push(format!(
                "📊 {}: #{} of {} ({})",
                summary.brand,
                summary.position_rank,
                summary.total_brands,
                summary.tier.label()
            ));
            lines.push(format!(
                "   Avg {} | Range {} - {}",
                format_brl(summary.avg_price),
                format_brl(summary.min_price),
                format_brl(summary.max_price)
            ));
            lines.push(format!(
                "   Vs overall average: {} | Pharmacies: {} | Priced products: {}",
                format_brl_delta(summary.delta_from_overall_avg),
                summary.pharmacy_count,
                summary.product_count
            ));
        }

        lines.join("\n")
    }

    /// Truncates to `max` characters with a `...` tail. Counts chars, not
    /// bytes; product names carry accented text.
    fn truncate(text: &str, max: usize) -> String {
        if text.chars().count() > max {
            let cut: String = text.chars().take(max.saturating_sub(3)).collect();
            format!("{cut}...")
        } else {
            text.to_string()
        }
    }

    // CSV formatting

    fn csv_report(&self, report: &SearchReport) -> String {
        let mut lines = vec![CSV_HEADER.to_string()];
        lines.extend(csv_rows(&report.products));
        lines.join("\n")
    }
}
