//! Grouping of upstream records into per-SKU buckets and the buyer index.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;

use crate::contact::{shipping_city, shipping_contact};
use crate::record::str_field;

/// Sentinel bucket key for records with no usable `product_sku`.
pub const UNKNOWN_SKU: &str = "UNKNOWN";

/// Per-SKU working set of records from the three source collections.
///
/// Each sequence preserves upstream order.
#[derive(Debug, Default, Clone)]
pub struct SkuBucket {
    pub order_items: Vec<Value>,
    pub ebay: Vec<Value>,
    pub shopgoodwill: Vec<Value>,
}

/// Resolved shipping fields for one buyer, keyed by `channel_buyer_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyerContact {
    pub shipping_contact: String,
    pub shipping_city: String,
}

/// Builds the buyer-id → shipping-contact lookup from the paid-orders
/// records.
///
/// Records with an absent or empty `channel_buyer_id` are skipped silently;
/// a later record for the same id overwrites an earlier one.
#[must_use]
pub fn build_buyer_index(paid_orders: &[Value]) -> HashMap<String, BuyerContact> {
    let mut index = HashMap::new();
    for record in paid_orders {
        let buyer_id = str_field(record, "channel_buyer_id");
        if buyer_id.is_empty() {
            continue;
        }
        index.insert(
            buyer_id,
            BuyerContact {
                shipping_contact: shipping_contact(record),
                shipping_city: shipping_city(record),
            },
        );
    }
    index
}

/// Groups the three source collections into per-SKU buckets.
///
/// Scan order is order items, then eBay, then shopgoodwill; buckets are
/// created on first sight of a SKU, so iterating the result follows
/// first-seen order across that scan. The optional shipping-method filter
/// applies only to order items: a record whose `order_shipping_method` does
/// not equal the filter is excluded entirely.
#[must_use]
pub fn merge(
    order_items: Vec<Value>,
    ebay: Vec<Value>,
    shopgoodwill: Vec<Value>,
    shipping_method: Option<&str>,
) -> IndexMap<String, SkuBucket> {
    let mut buckets: IndexMap<String, SkuBucket> = IndexMap::new();

    for record in order_items {
        if let Some(wanted) = shipping_method {
            if str_field(&record, "order_shipping_method") != wanted {
                continue;
            }
        }
        bucket_for(&mut buckets, &record).order_items.push(record);
    }
    for record in ebay {
        bucket_for(&mut buckets, &record).ebay.push(record);
    }
    for record in shopgoodwill {
        bucket_for(&mut buckets, &record).shopgoodwill.push(record);
    }

    buckets
}

fn bucket_for<'a>(
    buckets: &'a mut IndexMap<String, SkuBucket>,
    record: &Value,
) -> &'a mut SkuBucket {
    buckets.entry(sku_key(record)).or_default()
}

/// The bucket key for a record: its non-empty `product_sku`, else the
/// sentinel. Non-string scalars are rendered to text to tolerate upstream
/// type drift.
fn sku_key(record: &Value) -> String {
    match record.get("product_sku") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Null | Value::String(_)) | None => UNKNOWN_SKU.to_owned(),
        Some(other) => other.to_string(),
    }
}
