//! Brand analysis command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::{AnalysisCache, AnalysisState};
use crate::api::client::{PharmaApi, PharmaClient};
use crate::api::models::SearchRequest;
use crate::catalog::normalize;
use crate::config::{Config, OutputFormat};
use crate::present::{
    analysis_request, comparison_summary, format_brl, format_brl_delta, ComparisonSummary,
};

/// Positioning report for one brand: deterministic statistics plus the
/// analysis outcome.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Deterministic comparison statistics.
    pub summary: ComparisonSummary,
    /// Analysis text when the backend produced one.
    pub analysis: Option<String>,
    /// Failure reason when it did not.
    pub analysis_error: Option<String>,
}

/// Executes a brand positioning analysis.
pub struct AnalyzeCommand {
    config: Config,
    refresh: bool,
}

impl AnalyzeCommand {
    /// Creates a new analyze command.
    pub fn new(config: Config, refresh: bool) -> Self {
        Self { config, refresh }
    }

    /// Executes the analysis and returns formatted output.
    pub async fn execute(&self, description: &str, brand: &str) -> Result<String> {
        let client =
            PharmaClient::from_config(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(Arc::new(client), description, brand).await
    }

    /// Executes the analysis with a provided client (for testing).
    pub async fn execute_with_client(
        &self,
        client: Arc<dyn PharmaApi>,
        description: &str,
        brand: &str,
    ) -> Result<String> {
        info!("Searching for: {}", description);

        let request = SearchRequest { medicine_description: description.to_string() };
        let response = client.search(&request).await?;
        let normalized = response.entries().map(normalize).unwrap_or_default();
        for error in &normalized.errors {
            warn!("{} returned an error: {}", error.pharmacy, error.error);
        }

        let summary = comparison_summary(&normalized.records, brand)
            .with_context(|| format!("Brand '{brand}' not found or has no priced products"))?;

        info!(
            "Requesting analysis for {} (#{} of {})",
            summary.brand, summary.position_rank, summary.total_brands
        );
        let payload = analysis_request(&normalized.records, &summary);
        let cache = AnalysisCache::new(client.clone());
        let outcome = cache.fetch(payload, self.refresh).await;

        let report = match outcome {
            AnalysisState::Ready(text) => {
                AnalysisReport { summary, analysis: Some(text), analysis_error: None }
            }
            AnalysisState::Failed(reason) => {
                warn!("Analysis for {} failed: {}", brand, reason);
                AnalysisReport { summary, analysis: None, analysis_error: Some(reason) }
            }
            AnalysisState::Pending => AnalysisReport {
                summary,
                analysis: None,
                analysis_error: Some("Analysis still pending".to_string()),
            },
        };

        Ok(match self.config.format {
            OutputFormat::Json => serde_json::to_string_pretty(&report)?,
            _ => format_analysis(&report),
        })
    }
}

/// Renders the analysis report as text. Statistics always come first; a
/// failed analysis shows as an inline warning below them.
fn format_analysis(report: &AnalysisReport) -> String {
    let summary = &report.summary;
    let mut lines = Vec::new();

    lines.push(format!("Analysis for: {}", summary.brand));
    lines.push("=".repeat(80));
    lines.push(format!(
        "📊 Position: #{} of {} ({})",
        summary.position_rank,
        summary.total_brands,
        summary.tier.label()
    ));
    lines.push(format!(
        "💰 Avg {} | Range {} - {}",
        format_brl(summary.avg_price),
        format_brl(summary.min_price),
        format_brl(summary.max_price)
    ));
    lines.push(format!(
        "🛒 Pharmacies: {} | Priced products: {}",
        summary.pharmacy_count, summary.product_count
    ));
    lines.push(format!("Vs overall average: {}", format_brl_delta(summary.delta_from_overall_avg)));
    lines.push(String::new());

    if let Some(text) = &report.analysis {
        lines.push("💡 Analysis:".to_string());
        lines.push(text.clone());
    } else if let Some(reason) = &report.analysis_error {
        lines.push(format!("⚠️ Analysis unavailable: {reason}"));
    }

    lines.join("\n")
}
