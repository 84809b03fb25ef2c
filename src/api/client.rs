//! HTTP client for the pharmacy aggregation backend.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};
use wreq::Client;

use super::models::{BrandAnalysisRequest, BrandAnalysisResponse, SearchRequest, SearchResponse};

/// Default request timeout. The backend answers a search only after every
/// pharmacy scrape finishes, which takes minutes, not seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const SEARCH_PATH: &str = "/api/pharma/search";
const ANALYSIS_PATH: &str = "/api/pharma/ia/brand-analysis";

/// Trait for backend operations - enables mocking for tests.
#[async_trait]
pub trait PharmaApi: Send + Sync {
    /// Runs a medicine search across all configured pharmacies.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;

    /// Requests a positioning analysis for a single brand.
    async fn brand_analysis(
        &self,
        request: &BrandAnalysisRequest,
    ) -> Result<BrandAnalysisResponse>;
}

/// Backend HTTP client.
pub struct PharmaClient {
    client: Client,
    base_url: String,
}

impl PharmaClient {
    /// Creates a client against `base_url` with the given request timeout and
    /// an optional proxy.
    pub fn new(
        base_url: impl Into<String>,
        timeout_secs: u64,
        proxy: Option<&str>,
    ) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self { client, base_url: base_url.into() })
    }

    /// Creates a client from the application configuration.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        Self::new(config.api_url.clone(), config.timeout_secs, config.proxy.as_deref())
    }

    /// Creates a client with default settings against a custom base URL
    /// (for testing).
    pub fn with_base_url(base_url: String) -> Result<Self> {
        Self::new(base_url, DEFAULT_TIMEOUT_SECS, None)
    }

    /// Sends a JSON POST and returns the raw response body.
    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<String> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let payload = serde_json::to_string(body).context("Failed to encode request body")?;

        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(payload)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            anyhow::bail!("Backend returned status: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }
}

#[async_trait]
impl PharmaApi for PharmaClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        info!("Searching pharmacies for: {}", request.medicine_description);

        let body = self.post_json(SEARCH_PATH, request).await?;
        let response: SearchResponse =
            serde_json::from_str(&body).context("Failed to parse search response")?;

        if response.entries().is_none() {
            if let Some(error) = &response.error {
                anyhow::bail!("Search failed: {}", error);
            }
            anyhow::bail!("Search response carried no results");
        }

        Ok(response)
    }

    async fn brand_analysis(
        &self,
        request: &BrandAnalysisRequest,
    ) -> Result<BrandAnalysisResponse> {
        info!("Requesting analysis for brand: {}", request.brand);

        let body = self.post_json(ANALYSIS_PATH, request).await?;
        serde_json::from_str(&body).context("Failed to parse analysis response")
    }
}
