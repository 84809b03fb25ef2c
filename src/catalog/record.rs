//! Normalization of raw search responses into a flat product set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::models::{PharmacyEntry, PriceField, RawProduct};

/// One offering of a medicine brand at one pharmacy.
///
/// Records are created once per search response and never mutated; every
/// derived view is a pure function of the full record slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product title as listed by the pharmacy.
    pub name: String,
    /// Brand name, the grouping key for aggregation. Grouping is by exact
    /// string; upstream casing variance produces distinct groups.
    pub brand: String,
    /// Source pharmacy display name.
    pub pharmacy: String,
    /// Current price, numeric or display text.
    pub price: PriceField,
    /// Pre-discount price, if listed.
    pub original_price: Option<PriceField>,
    /// Whether the listing advertised a discount.
    pub has_discount: bool,
    /// Advertised discount percentage; absent when zero or unlisted.
    pub discount_percentage: Option<u8>,
    /// 1-based rank within the pharmacy's own listing, lower is better.
    pub position: Option<u32>,
    /// Free-text description.
    pub description: Option<String>,
    /// Link to the product page.
    pub product_url: Option<String>,
}

impl ProductRecord {
    fn from_raw(raw: RawProduct, pharmacy: &str) -> Self {
        Self {
            name: raw.name,
            brand: raw.brand,
            pharmacy: pharmacy.to_string(),
            price: raw.price,
            original_price: raw.original_price,
            has_discount: raw.has_discount,
            discount_percentage: raw.discount_percentage.filter(|d| *d > 0),
            position: raw.position,
            description: raw.description,
            product_url: raw.product_url,
        }
    }

    /// Numeric price if one is usable, per [`PriceField::amount`].
    pub fn price_amount(&self) -> Option<f64> {
        self.price.amount()
    }

    /// Effective discount percentage: the advertised value when present,
    /// otherwise derived from the original and current prices.
    pub fn discount_percent(&self) -> Option<u8> {
        if self.discount_percentage.is_some() {
            return self.discount_percentage;
        }
        let current = self.price.amount()?;
        let original = self.original_price.as_ref()?.amount()?;
        if original <= current {
            return None;
        }
        let discount = ((original - current) / original * 100.0).round() as u8;
        Some(discount.min(99))
    }

    /// Discount used for ordering; absent counts as zero.
    pub fn discount_value(&self) -> u8 {
        self.discount_percent().unwrap_or(0)
    }
}

/// A pharmacy whose scrape failed, surfaced alongside successful results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PharmacyError {
    /// Pharmacy display name, or the response map key when none was given.
    pub pharmacy: String,
    /// Backend error message.
    pub error: String,
}

/// Output of [`normalize`]: the flat record set plus per-pharmacy failures.
#[derive(Debug, Clone, Default)]
pub struct NormalizedResults {
    /// All products across pharmacies, stamped with their pharmacy name.
    pub records: Vec<ProductRecord>,
    /// Pharmacies that returned an error instead of products.
    pub errors: Vec<PharmacyError>,
}

impl NormalizedResults {
    /// Returns true when no pharmacy produced any product.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Flattens a per-pharmacy response map into records and errors.
///
/// Entries with an `error` become a [`PharmacyError`]; their products are
/// ignored. Entries with products get each product stamped with the pharmacy
/// display name (falling back to the map key). Entries with neither are
/// dropped. Pure transform; malformed entries degrade to empty, never panic.
pub fn normalize(entries: &BTreeMap<String, PharmacyEntry>) -> NormalizedResults {
    let mut out = NormalizedResults::default();
    for (key, entry) in entries {
        let pharmacy = entry.pharmacy.as_deref().unwrap_or(key);
        if let Some(error) = &entry.error {
            out.errors.push(PharmacyError {
                pharmacy: pharmacy.to_string(),
                error: error.clone(),
            });
            continue;
        }
        let Some(products) = &entry.products else {
            continue;
        };
        for raw in products {
            out.records.push(ProductRecord::from_raw(raw.clone(), pharmacy));
        }
    }
    out
}
