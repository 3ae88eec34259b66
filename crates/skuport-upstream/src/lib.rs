//! Client and export pipeline for the Upright Labs reports API.
//!
//! [`UprightClient`] fetches the raw report collections; everything after
//! the fetches ([`run_export`] and the pieces it composes) is pure and
//! operates on untyped `serde_json::Value` records, since upstream payload
//! shape is not guaranteed across API revisions.

mod client;
mod contact;
mod error;
mod export;
mod merge;
mod record;

pub use client::{Endpoint, UprightClient};
pub use contact::{shipping_city, shipping_contact};
pub use error::UpstreamError;
pub use export::{normalize, run_export, ExportRow};
pub use merge::{build_buyer_index, merge, BuyerContact, SkuBucket, UNKNOWN_SKU};
pub use record::collection_records;
