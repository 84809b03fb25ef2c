//! Per-brand aggregation over the normalized product set.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::catalog::record::ProductRecord;

/// Derived statistics for one brand across every pharmacy carrying it.
///
/// Recomputed on demand from the record set, never persisted. Price fields
/// are `None` when the brand has no usable numeric price; such brands stay
/// in listings but are excluded from price charts and price sorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandAggregate {
    /// Brand name, exact string as reported upstream.
    pub brand: String,
    /// Cheapest numeric price.
    pub min_price: Option<f64>,
    /// Most expensive numeric price.
    pub max_price: Option<f64>,
    /// Arithmetic mean of numeric prices.
    pub avg_price: Option<f64>,
    /// Smallest discount percentage; records without one count as 0.
    pub min_discount: u8,
    /// Largest discount percentage; records without one count as 0.
    pub max_discount: u8,
    /// Most frequent listing position; frequency ties pick the smallest.
    pub modal_position: Option<u32>,
    /// Distinct pharmacies carrying the brand.
    pub pharmacy_count: usize,
    /// Total records of the brand.
    pub product_count: usize,
    /// Records of the brand with a usable numeric price.
    pub priced_count: usize,
}

impl BrandAggregate {
    /// True when at least one record of the brand has a numeric price.
    pub fn has_price(&self) -> bool {
        self.avg_price.is_some()
    }

    /// True when the brand's records advertise different discount levels.
    pub fn has_discount_range(&self) -> bool {
        self.min_discount != self.max_discount
    }
}

#[derive(Default)]
struct Accum {
    product_count: usize,
    prices: Vec<f64>,
    min_discount: Option<u8>,
    max_discount: u8,
    position_counts: BTreeMap<u32, usize>,
    pharmacies: BTreeSet<String>,
}

/// Groups records by exact brand string and derives a [`BrandAggregate`] per
/// group. Deterministic and side-effect-free; safe to call on every state
/// change.
pub fn aggregate(records: &[ProductRecord]) -> BTreeMap<String, BrandAggregate> {
    let mut groups: BTreeMap<&str, Accum> = BTreeMap::new();
    for record in records {
        let accum = groups.entry(record.brand.as_str()).or_default();
        accum.product_count += 1;
        if let Some(price) = record.price_amount() {
            accum.prices.push(price);
        }
        let discount = record.discount_value();
        accum.min_discount = Some(accum.min_discount.map_or(discount, |d| d.min(discount)));
        accum.max_discount = accum.max_discount.max(discount);
        if let Some(position) = record.position {
            *accum.position_counts.entry(position).or_insert(0) += 1;
        }
        accum.pharmacies.insert(record.pharmacy.clone());
    }

    groups
        .into_iter()
        .map(|(brand, accum)| {
            let (min_price, max_price, avg_price) = if accum.prices.is_empty() {
                (None, None, None)
            } else {
                let min = accum.prices.iter().copied().fold(f64::INFINITY, f64::min);
                let max = accum.prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let avg = accum.prices.iter().sum::<f64>() / accum.prices.len() as f64;
                (Some(min), Some(max), Some(avg))
            };

            // Ascending key order keeps the smallest position on a frequency tie.
            let mut modal_position = None;
            let mut best_count = 0usize;
            for (&position, &count) in &accum.position_counts {
                if count > best_count {
                    best_count = count;
                    modal_position = Some(position);
                }
            }

            let aggregate = BrandAggregate {
                brand: brand.to_string(),
                min_price,
                max_price,
                avg_price,
                min_discount: accum.min_discount.unwrap_or(0),
                max_discount: accum.max_discount,
                modal_position,
                pharmacy_count: accum.pharmacies.len(),
                product_count: accum.product_count,
                priced_count: accum.prices.len(),
            };
            (brand.to_string(), aggregate)
        })
        .collect()
}

/// Headline statistics for the whole result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Total records, priced or not.
    pub total_products: usize,
    /// Distinct brands, priced or not.
    pub total_brands: usize,
    /// Cheapest numeric price anywhere.
    pub min_price: f64,
    /// Mean over every numeric price (not over brand averages).
    pub avg_price: f64,
    /// Most expensive numeric price anywhere.
    pub max_price: f64,
}

/// Computes headline statistics, or `None` when no record has a numeric
/// price.
pub fn overall_stats(records: &[ProductRecord]) -> Option<SearchStats> {
    let prices: Vec<f64> = records.iter().filter_map(ProductRecord::price_amount).collect();
    if prices.is_empty() {
        return None;
    }
    let brands: BTreeSet<&str> = records.iter().map(|r| r.brand.as_str()).collect();
    Some(SearchStats {
        total_products: records.len(),
        total_brands: brands.len(),
        min_price: prices.iter().copied().fold(f64::INFINITY, f64::min),
        avg_price: prices.iter().sum::<f64>() / prices.len() as f64,
        max_price: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}
