//! Wire types for the pharmacy search and brand-analysis endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A price as the backend reports it: numeric when the scraper parsed it,
/// otherwise the pharmacy's own display text (e.g. "Preço não disponível").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceField {
    /// Parsed price in BRL.
    Amount(f64),
    /// Unparsed display text passed through verbatim.
    Text(String),
}

impl PriceField {
    /// Returns the numeric value when one is usable. Zero, negative, and
    /// non-finite amounts are treated as absent.
    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Amount(v) if v.is_finite() && *v > 0.0 => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for PriceField {
    fn from(value: f64) -> Self {
        Self::Amount(value)
    }
}

impl From<&str> for PriceField {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One product entry as scraped from a pharmacy listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawProduct {
    /// Product title as listed by the pharmacy.
    pub name: String,
    /// Brand name, used as the grouping key downstream.
    #[serde(default)]
    pub brand: String,
    /// Free-text description if the listing carries one.
    #[serde(default)]
    pub description: Option<String>,
    /// Current price.
    pub price: PriceField,
    /// Pre-discount price, same typing rule as `price`.
    #[serde(default)]
    pub original_price: Option<PriceField>,
    /// Advertised discount percentage; 0 or absent means none.
    #[serde(default)]
    pub discount_percentage: Option<u8>,
    /// Link to the product page.
    #[serde(default)]
    pub product_url: Option<String>,
    /// Product image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Whether the listing advertised a discount.
    #[serde(default)]
    pub has_discount: bool,
    /// 1-based rank within the pharmacy's own result listing.
    #[serde(default)]
    pub position: Option<u32>,
}

/// One pharmacy's slice of a search response: a product list on success, an
/// error message on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PharmacyEntry {
    /// Display name; consumers fall back to the map key when absent.
    #[serde(default)]
    pub pharmacy: Option<String>,
    /// Search URL that produced this slice.
    #[serde(default)]
    pub url: Option<String>,
    /// Scraped products; may be absent or null on failure.
    #[serde(default)]
    pub products: Option<Vec<RawProduct>>,
    /// Product count as reported by the backend.
    #[serde(default)]
    pub total_products: Option<u32>,
    /// Error message when scraping this pharmacy failed.
    #[serde(default)]
    pub error: Option<String>,
}

impl PharmacyEntry {
    /// Creates a successful entry with products.
    pub fn with_products(pharmacy: impl Into<String>, products: Vec<RawProduct>) -> Self {
        let total = products.len() as u32;
        Self {
            pharmacy: Some(pharmacy.into()),
            url: None,
            products: Some(products),
            total_products: Some(total),
            error: None,
        }
    }

    /// Creates a failed entry carrying only an error message.
    pub fn with_error(pharmacy: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            pharmacy: Some(pharmacy.into()),
            url: None,
            products: Some(Vec::new()),
            total_products: Some(0),
            error: Some(error.into()),
        }
    }
}

/// Request body for `POST /api/pharma/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text medicine description to search for.
    pub medicine_description: String,
}

/// Envelope returned by `POST /api/pharma/search`. Keyed by pharmacy
/// identifier; `processed_results` wins over `results` when both are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Echo of the searched description.
    #[serde(default)]
    pub medicine_description: Option<String>,
    /// Per-pharmacy results.
    #[serde(default)]
    pub results: Option<BTreeMap<String, PharmacyEntry>>,
    /// Alternate per-pharmacy results map, post-processed by the backend.
    #[serde(default)]
    pub processed_results: Option<BTreeMap<String, PharmacyEntry>>,
    /// Top-level error when the whole search failed.
    #[serde(default)]
    pub error: Option<String>,
}

impl SearchResponse {
    /// The pharmacy map to consume, preferring `processed_results`.
    pub fn entries(&self) -> Option<&BTreeMap<String, PharmacyEntry>> {
        self.processed_results.as_ref().or(self.results.as_ref())
    }
}

/// Compact product projection sent along with a brand-analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisProduct {
    /// Product title.
    pub name: String,
    /// Pharmacy carrying it.
    pub pharmacy: String,
    /// Listed price.
    pub price: PriceField,
    /// Advertised discount percentage, if any.
    #[serde(default)]
    pub discount_percentage: Option<u8>,
}

/// Request body for `POST /api/pharma/ia/brand-analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandAnalysisRequest {
    /// Brand under analysis.
    pub brand: String,
    /// 1-based rank of the brand's average price, cheapest first.
    pub position: u32,
    /// Number of brands with a usable average price.
    pub total_brands: u32,
    /// Average price across the brand's priced products.
    pub avg_price: f64,
    /// Cheapest priced product of the brand.
    pub min_price: f64,
    /// Most expensive priced product of the brand.
    pub max_price: f64,
    /// Distinct pharmacies carrying the brand.
    pub pharmacy_count: u32,
    /// Human-readable delta against the overall average, e.g. "+R$ 1,23".
    pub price_diff_text: String,
    /// Names of the pharmacies that contributed products.
    pub pharmacies_analyzed: Vec<String>,
    /// The brand's products, trimmed to what the analysis needs.
    pub products_data: Vec<AnalysisProduct>,
}

/// Response body for `POST /api/pharma/ia/brand-analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandAnalysisResponse {
    /// Whether the analysis was produced.
    pub success: bool,
    /// Analysis text when `success` is true.
    #[serde(default)]
    pub analysis: Option<String>,
    /// Error description when `success` is false.
    #[serde(default)]
    pub error: Option<String>,
}
