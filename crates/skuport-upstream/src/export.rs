//! Flattening of per-SKU buckets into normalized export rows.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::contact::{shipping_city, shipping_contact};
use crate::merge::{build_buyer_index, merge, BuyerContact, SkuBucket};
use crate::record::{collection_records, str_field};

/// One flattened export row per SKU bucket.
///
/// The `*_json` fields embed the bucket's source sequences verbatim as JSON
/// text: downstream spreadsheet consumers want the nested detail in a single
/// cell, not flattened into more columns.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    pub product_sku: String,
    pub order_items_count: usize,
    pub ebay_count: usize,
    pub shopgoodwill_count: usize,
    pub shipping_method: String,
    pub inventory_location: String,
    pub product_title: String,
    pub channel_buyer_id: String,
    pub shipping_contact: String,
    pub shipping_city: String,
    pub order_items_json: String,
    pub order_paid_at: String,
    pub ebay_json: String,
    pub shopgoodwill_json: String,
}

/// Runs the full pipeline over the four raw upstream collections.
///
/// Everything here is pure and infallible: malformed collections degrade to
/// empty (with a warning) rather than failing the export. Transport-level
/// failures are the caller's concern and happen before this point.
#[must_use]
pub fn run_export(
    order_items: Value,
    ebay: Value,
    shopgoodwill: Value,
    paid_orders: Value,
    shipping_method: Option<&str>,
) -> Vec<ExportRow> {
    let order_items = collection_records(order_items, "order_items");
    let ebay = collection_records(ebay, "ebay");
    let shopgoodwill = collection_records(shopgoodwill, "shopgoodwill");
    let paid_orders = collection_records(paid_orders, "paid_orders");

    let buyer_index = build_buyer_index(&paid_orders);
    let buckets = merge(order_items, ebay, shopgoodwill, shipping_method);
    let rows = normalize(&buckets, &buyer_index);

    if let Some(first) = rows.first() {
        tracing::debug!(
            product_sku = %first.product_sku,
            shipping_contact = %first.shipping_contact,
            shipping_city = %first.shipping_city,
            "resolved shipping fields for first export row"
        );
    }

    rows
}

/// Derives one flat row per bucket, in bucket iteration order.
///
/// The first order item is the representative order (an empty record when
/// the bucket holds only listings; order-derived fields then default to
/// `""`). The buyer index wins for shipping contact and city; a missing or
/// empty indexed value falls back per-field to direct extraction from the
/// representative order.
#[must_use]
pub fn normalize(
    buckets: &IndexMap<String, SkuBucket>,
    buyer_index: &HashMap<String, BuyerContact>,
) -> Vec<ExportRow> {
    let empty = Value::Object(serde_json::Map::new());

    buckets
        .iter()
        .map(|(sku, bucket)| {
            let first_order = bucket.order_items.first().unwrap_or(&empty);
            let channel_buyer_id = str_field(first_order, "channel_buyer_id");
            let buyer = buyer_index.get(&channel_buyer_id);

            let contact = buyer
                .map(|b| b.shipping_contact.clone())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| shipping_contact(first_order));
            let city = buyer
                .map(|b| b.shipping_city.clone())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| shipping_city(first_order));

            ExportRow {
                product_sku: sku.clone(),
                order_items_count: bucket.order_items.len(),
                ebay_count: bucket.ebay.len(),
                shopgoodwill_count: bucket.shopgoodwill.len(),
                shipping_method: str_field(first_order, "order_shipping_method"),
                inventory_location: str_field(first_order, "inventory_location"),
                product_title: str_field(first_order, "product_title"),
                channel_buyer_id,
                shipping_contact: contact,
                shipping_city: city,
                order_items_json: json_text(&bucket.order_items),
                order_paid_at: str_field(first_order, "order_paid_at"),
                ebay_json: json_text(&bucket.ebay),
                shopgoodwill_json: json_text(&bucket.shopgoodwill),
            }
        })
        .collect()
}

/// Serializes a record sequence to embedded JSON text.
fn json_text(records: &[Value]) -> String {
    Value::Array(records.to_vec()).to_string()
}
