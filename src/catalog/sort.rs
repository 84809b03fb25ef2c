//! Sort orderings for the results list and the chart brands.

use serde::{Deserialize, Serialize};

use crate::catalog::aggregate::BrandAggregate;
use crate::catalog::record::ProductRecord;

/// Ordering applied to the visible list, and to the chart series through the
/// matching aggregate field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Ascending listing position; records without one sort last.
    #[default]
    Relevance,
    /// Ascending numeric price; non-numeric prices sort last.
    PriceAsc,
    /// Descending numeric price; non-numeric prices sort last.
    PriceDesc,
    /// Descending effective discount; records without one count as 0.
    DiscountDesc,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relevance" => Ok(SortKey::Relevance),
            "price-asc" | "price_asc" | "price" => Ok(SortKey::PriceAsc),
            "price-desc" | "price_desc" => Ok(SortKey::PriceDesc),
            "discount-desc" | "discount_desc" | "discount" => Ok(SortKey::DiscountDesc),
            _ => Err(format!(
                "Unknown sort: {}. Use: relevance, price-asc, price-desc, discount-desc",
                s
            )),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Relevance => write!(f, "relevance"),
            SortKey::PriceAsc => write!(f, "price-asc"),
            SortKey::PriceDesc => write!(f, "price-desc"),
            SortKey::DiscountDesc => write!(f, "discount-desc"),
        }
    }
}

/// Stable-sorts record references in place. Equal keys keep their input
/// order, so repeated sorts of the same input are deterministic.
pub fn sort_records(records: &mut [&ProductRecord], key: SortKey) {
    match key {
        SortKey::Relevance => {
            records.sort_by_key(|r| r.position.unwrap_or(u32::MAX));
        }
        SortKey::PriceAsc => {
            records.sort_by(|a, b| {
                let a = a.price_amount().unwrap_or(f64::INFINITY);
                let b = b.price_amount().unwrap_or(f64::INFINITY);
                a.total_cmp(&b)
            });
        }
        SortKey::PriceDesc => {
            records.sort_by(|a, b| {
                let a = a.price_amount().unwrap_or(f64::NEG_INFINITY);
                let b = b.price_amount().unwrap_or(f64::NEG_INFINITY);
                b.total_cmp(&a)
            });
        }
        SortKey::DiscountDesc => {
            records.sort_by(|a, b| b.discount_value().cmp(&a.discount_value()));
        }
    }
}

/// Stable-sorts brand aggregates in place, applying the sort key to the
/// matching aggregate field: modal position for relevance, average price for
/// the price keys, max discount for the discount key.
pub fn sort_brands(brands: &mut [BrandAggregate], key: SortKey) {
    match key {
        SortKey::Relevance => {
            brands.sort_by_key(|b| b.modal_position.unwrap_or(u32::MAX));
        }
        SortKey::PriceAsc => {
            brands.sort_by(|a, b| {
                let a = a.avg_price.unwrap_or(f64::INFINITY);
                let b = b.avg_price.unwrap_or(f64::INFINITY);
                a.total_cmp(&b)
            });
        }
        SortKey::PriceDesc => {
            brands.sort_by(|a, b| {
                let a = a.avg_price.unwrap_or(f64::NEG_INFINITY);
                let b = b.avg_price.unwrap_or(f64::NEG_INFINITY);
                b.total_cmp(&a)
            });
        }
        SortKey::DiscountDesc => {
            brands.sort_by(|a, b| b.max_discount.cmp(&a.max_discount));
        }
    }
}
