use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use skuport_upstream::{run_export, Endpoint, ExportRow};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct WindowQuery {
    #[serde(default)]
    pub time_start: String,
    #[serde(default)]
    pub time_end: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ExportQuery {
    #[serde(default)]
    pub time_start: String,
    #[serde(default)]
    pub time_end: String,
    pub shipping_method: Option<String>,
}

pub(super) async fn order_items(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Value>, ApiError> {
    pass_through(&state, Endpoint::OrderItems, &query, &req_id).await
}

pub(super) async fn ebay_listings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Value>, ApiError> {
    pass_through(&state, Endpoint::EbayListings, &query, &req_id).await
}

pub(super) async fn shopgoodwill_listings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Value>, ApiError> {
    pass_through(&state, Endpoint::ShopgoodwillListings, &query, &req_id).await
}

/// Forwards one upstream collection verbatim.
async fn pass_through(
    state: &AppState,
    endpoint: Endpoint,
    query: &WindowQuery,
    req_id: &RequestId,
) -> Result<Json<Value>, ApiError> {
    state
        .client
        .fetch_window(endpoint, &query.time_start, &query.time_end)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!(
                request_id = %req_id.0,
                endpoint = endpoint.path(),
                error = %e,
                "upstream fetch failed"
            );
            ApiError::new("API fetch failed")
        })
}

/// Runs the full merge-and-normalize pipeline for one time window.
///
/// The four upstream fetches run concurrently; a transport failure in any
/// one fails the whole request. Shape mismatches degrade inside the
/// pipeline instead.
pub(super) async fn export(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<Vec<ExportRow>>, ApiError> {
    let client = &state.client;
    let fetched = tokio::try_join!(
        client.fetch_window(Endpoint::OrderItems, &query.time_start, &query.time_end),
        client.fetch_window(Endpoint::EbayListings, &query.time_start, &query.time_end),
        client.fetch_window(
            Endpoint::ShopgoodwillListings,
            &query.time_start,
            &query.time_end
        ),
        client.fetch_window(Endpoint::PaidOrders, &query.time_start, &query.time_end),
    );

    let (order_items, ebay, shopgoodwill, paid_orders) = fetched.map_err(|e| {
        tracing::error!(request_id = %req_id.0, error = %e, "export fetch failed");
        ApiError::new("Failed to export data")
    })?;

    // An empty shipping_method param means no filter, same as its absence.
    let filter = query
        .shipping_method
        .as_deref()
        .filter(|method| !method.is_empty());

    let rows = run_export(order_items, ebay, shopgoodwill, paid_orders, filter);
    Ok(Json(rows))
}
