//! HTTP client and wire types for the pharmacy search backend.

pub mod client;
pub mod models;

pub use client::{PharmaApi, PharmaClient};
pub use models::{
    BrandAnalysisRequest, BrandAnalysisResponse, PharmacyEntry, PriceField, RawProduct,
    SearchRequest, SearchResponse,
};
