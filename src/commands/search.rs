//! Search command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::client::{PharmaApi, PharmaClient};
use crate::api::models::SearchRequest;
use crate::catalog::record::NormalizedResults;
use crate::catalog::{normalize, overall_stats, ViewController};
use crate::config::Config;
use crate::export::{default_filename, write_csv, ExportError};
use crate::format::{Formatter, SearchReport};
use crate::present::{chart_series, comparison_summary};

/// Per-invocation view knobs that never come from a config file.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Brand to select for highlighting and comparison.
    pub select: Option<String>,
    /// 1-based page to show.
    pub page: usize,
    /// Write the full filtered listing to a CSV file.
    pub export: bool,
    /// Export destination; a timestamped name in the working directory when
    /// absent.
    pub output: Option<PathBuf>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { select: None, page: 1, export: false, output: None }
    }
}

/// Executes a medicine search.
pub struct SearchCommand {
    config: Config,
    options: SearchOptions,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config, options: SearchOptions) -> Self {
        Self { config, options }
    }

    /// Executes the search and returns formatted output.
    pub async fn execute(&self, description: &str) -> Result<String> {
        let client =
            PharmaClient::from_config(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(&client, description).await
    }

    /// Executes the search with a provided client (for testing).
    pub async fn execute_with_client(
        &self,
        client: &impl PharmaApi,
        description: &str,
    ) -> Result<String> {
        info!("Searching for: {}", description);

        let request = SearchRequest { medicine_description: description.to_string() };
        let response = client.search(&request).await?;
        let NormalizedResults { records, errors } =
            response.entries().map(normalize).unwrap_or_default();

        for error in &errors {
            warn!("{} returned an error: {}", error.pharmacy, error.error);
        }
        info!("Found {} products ({} pharmacies failed)", records.len(), errors.len());

        let mut controller = ViewController::with_page_size(self.config.page_size);
        controller.load(records);
        controller.set_sort(self.config.sort);
        if let Some(pharmacy) = &self.config.pharmacy {
            debug!("Filtering by pharmacy: {}", pharmacy);
            controller.set_pharmacy_filter(Some(pharmacy.clone()));
        }
        if let Some(brand) = &self.config.brand {
            debug!("Filtering by brand: {}", brand);
            controller.set_brand_filter(Some(brand.clone()));
        }
        if let Some(brand) = &self.options.select {
            controller.select_brand(Some(brand.clone()));
        }
        if self.options.page > 1 {
            controller.set_page(self.options.page);
        }

        let view = controller.view();
        let chart = chart_series(&view.chart_brands, controller.selected_brand());
        let summary = controller
            .selected_brand()
            .and_then(|brand| comparison_summary(controller.records(), brand));

        let report = SearchReport {
            description: description.to_string(),
            errors,
            stats: overall_stats(controller.records()),
            products: controller.listing(),
            view,
            chart,
            summary,
        };

        if self.options.export {
            self.export_report(&report)?;
        }

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_report(&report))
    }

    /// Writes the full filtered listing to disk. Zero records downgrade to a
    /// warning; only I/O failures propagate.
    fn export_report(&self, report: &SearchReport) -> Result<()> {
        let path =
            self.options.output.clone().unwrap_or_else(|| PathBuf::from(default_filename()));
        match write_csv(&report.products, &path) {
            Ok(()) => {
                info!("Exported {} products to {}", report.products.len(), path.display());
                Ok(())
            }
            Err(ExportError::NoRecords) => {
                warn!("No products to export, skipping {}", path.display());
                Ok(())
            }
            Err(error) => Err(error).context("Failed to write export file"),
        }
    }
}
