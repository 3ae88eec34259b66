use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct ToggleRequest {
    pub sku: String,
    pub checked: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ToggleResponse {
    pub success: bool,
}

/// Returns the persisted checkbox mapping.
///
/// Read failures surface as a 500 with an empty object body so the UI can
/// fall back to all-unchecked.
pub(super) async fn read_state(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    match state.store.load().await {
        Ok(mapping) => (StatusCode::OK, Json(mapping)),
        Err(e) => {
            tracing::error!(request_id = %req_id.0, error = %e, "failed to read checkbox state");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HashMap::<String, bool>::new()),
            )
        }
    }
}

/// Updates one SKU entry in the persisted mapping.
pub(super) async fn update_state(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ToggleRequest>,
) -> impl IntoResponse {
    match state.store.set(&body.sku, body.checked).await {
        Ok(()) => (StatusCode::OK, Json(ToggleResponse { success: true })),
        Err(e) => {
            tracing::error!(
                request_id = %req_id.0,
                sku = %body.sku,
                error = %e,
                "failed to write checkbox state"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ToggleResponse { success: false }),
            )
        }
    }
}
