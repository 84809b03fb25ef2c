//! Read-only projections for rendering: chart series, comparison summary,
//! money formatting, and the brand-analysis payload.
//!
//! Everything here is a pure function of records and aggregates; no mutable
//! state lives in this module.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::api::models::{AnalysisProduct, BrandAnalysisRequest, PriceField};
use crate::catalog::aggregate::{aggregate, BrandAggregate};
use crate::catalog::record::ProductRecord;

/// Formats a BRL amount with a comma decimal separator, e.g. `R$ 12,34`.
pub fn format_brl(value: f64) -> String {
    format!("R$ {value:.2}").replace('.', ",")
}

/// Signed BRL delta, e.g. `+R$ 1,23` / `-R$ 1,23`.
pub fn format_brl_delta(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{}", format_brl(delta))
    } else {
        format!("-{}", format_brl(delta.abs()))
    }
}

/// How a price renders in listings: formatted BRL when numeric, the
/// backend's own display text otherwise.
pub fn price_display(price: &PriceField) -> String {
    match price {
        PriceField::Amount(v) => format_brl(*v),
        PriceField::Text(text) => text.clone(),
    }
}

/// Bar-chart series over the ordered chart brands: one entry per brand.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartSeries {
    /// Brand names, in chart order.
    pub labels: Vec<String>,
    /// Average price per brand.
    pub values: Vec<f64>,
    /// True for the entry matching the selected brand.
    pub highlight: Vec<bool>,
    /// Badge discount per brand: the max discount when above zero.
    pub discounts: Vec<Option<u8>>,
}

impl ChartSeries {
    /// Number of chart entries.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true when no brand made it into the chart.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Projects ordered chart brands into a drawable series. Brands without an
/// average price are skipped; at most one entry is highlighted.
pub fn chart_series(chart_brands: &[BrandAggregate], selected_brand: Option<&str>) -> ChartSeries {
    let mut series = ChartSeries::default();
    for brand in chart_brands {
        let Some(avg) = brand.avg_price else {
            continue;
        };
        series.labels.push(brand.brand.clone());
        series.values.push(avg);
        series.highlight.push(selected_brand == Some(brand.brand.as_str()));
        series.discounts.push((brand.max_discount > 0).then_some(brand.max_discount));
    }
    series
}

/// Price tier of a brand relative to every other priced brand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Average price ranks in the cheapest 30% of brands.
    Cheapest,
    /// Neither band.
    Similar,
    /// Average price ranks in the priciest 30% of brands.
    Priciest,
}

impl Tier {
    /// Classifies a 1-based rank among `total` priced brands. The cheap band
    /// is checked first, so it wins when the bands overlap.
    pub fn classify(rank: usize, total: usize) -> Self {
        let cheap_band = (total as f64 * 0.3).ceil() as usize;
        let pricey_band = (total as f64 * 0.7).ceil() as usize;
        if rank <= cheap_band {
            Tier::Cheapest
        } else if rank >= pricey_band {
            Tier::Priciest
        } else {
            Tier::Similar
        }
    }

    /// Human-readable tier label.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Cheapest => "Among the cheapest",
            Tier::Similar => "Similar price",
            Tier::Priciest => "Among the priciest",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How one brand's pricing compares against every other priced brand.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSummary {
    /// Brand under comparison.
    pub brand: String,
    /// 1-based rank of the brand's average price, cheapest first.
    pub position_rank: usize,
    /// Number of brands with an average price.
    pub total_brands: usize,
    /// Average over the brand's priced products.
    pub avg_price: f64,
    /// Cheapest priced product of the brand.
    pub min_price: f64,
    /// Priciest product of the brand.
    pub max_price: f64,
    /// Distinct pharmacies carrying the brand.
    pub pharmacy_count: usize,
    /// Products of the brand with a usable price.
    pub product_count: usize,
    /// Brand average minus the mean of all brand averages.
    pub delta_from_overall_avg: f64,
    /// Tier bucket for `position_rank`.
    pub tier: Tier,
}

/// Ranks `brand` among all priced brands. Returns `None` when the brand is
/// unknown or has no numeric price.
pub fn comparison_summary(records: &[ProductRecord], brand: &str) -> Option<ComparisonSummary> {
    let aggregates = aggregate(records);
    let target = aggregates.get(brand)?;
    let avg_price = target.avg_price?;

    let mut ladder: Vec<(&str, f64)> = aggregates
        .values()
        .filter_map(|b| b.avg_price.map(|avg| (b.brand.as_str(), avg)))
        .collect();
    ladder.sort_by(|a, b| a.1.total_cmp(&b.1));

    let total_brands = ladder.len();
    let position_rank = ladder.iter().position(|(name, _)| *name == brand)? + 1;
    let overall_avg = ladder.iter().map(|(_, avg)| avg).sum::<f64>() / total_brands as f64;

    Some(ComparisonSummary {
        brand: target.brand.clone(),
        position_rank,
        total_brands,
        avg_price,
        min_price: target.min_price?,
        max_price: target.max_price?,
        pharmacy_count: target.pharmacy_count,
        product_count: target.priced_count,
        delta_from_overall_avg: avg_price - overall_avg,
        tier: Tier::classify(position_rank, total_brands),
    })
}

/// Builds the brand-analysis payload from a comparison summary plus the
/// brand's records.
pub fn analysis_request(
    records: &[ProductRecord],
    summary: &ComparisonSummary,
) -> BrandAnalysisRequest {
    let brand_records: Vec<&ProductRecord> =
        records.iter().filter(|r| r.brand == summary.brand).collect();
    let pharmacies: BTreeSet<&str> =
        brand_records.iter().map(|r| r.pharmacy.as_str()).collect();

    BrandAnalysisRequest {
        brand: summary.brand.clone(),
        position: summary.position_rank as u32,
        total_brands: summary.total_brands as u32,
        avg_price: summary.avg_price,
        min_price: summary.min_price,
        max_price: summary.max_price,
        pharmacy_count: summary.pharmacy_count as u32,
        price_diff_text: format_brl_delta(summary.delta_from_overall_avg),
        pharmacies_analyzed: pharmacies.into_iter().map(String::from).collect(),
        products_data: brand_records
            .iter()
            .map(|r| AnalysisProduct {
                name: r.name.clone(),
                pharmacy: r.pharmacy.clone(),
                price: r.price.clone(),
                discount_percentage: r.discount_percent(),
            })
            .collect(),
    }
}
