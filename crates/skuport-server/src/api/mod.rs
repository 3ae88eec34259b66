mod checkbox;
mod reports;

use std::path::Path;
use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use skuport_upstream::UprightClient;

use crate::middleware::request_id;
use crate::store::CheckboxStore;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<UprightClient>,
    pub store: CheckboxStore,
}

/// Generic error body for failed upstream calls: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/order_items", get(reports::order_items))
        .route("/api/listings/ebay", get(reports::ebay_listings))
        .route(
            "/api/listings/shopgoodwill",
            get(reports::shopgoodwill_listings),
        )
        .route("/api/export", get(reports::export))
        .route(
            "/api/checkbox-state",
            get(checkbox::read_state).post(checkbox::update_state),
        )
        .fallback_service(ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use axum::body::{to_bytes, Body};
    use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
    use tower::ServiceExt;
    use uuid::Uuid;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn temp_state_path() -> PathBuf {
        std::env::temp_dir().join(format!("skuport-api-{}.json", Uuid::new_v4()))
    }

    async fn test_app(upstream: &MockServer) -> Router {
        let client = UprightClient::with_base_url("test-key", 30, &upstream.uri())
            .expect("client construction should not fail");
        let store = CheckboxStore::open(temp_state_path())
            .await
            .expect("store open should not fail");
        build_app(
            AppState {
                client: Arc::new(client),
                store,
            },
            Path::new("./public"),
        )
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json parse")
    }

    fn mock_report(path_str: &str, body: serde_json::Value) -> Mock {
        Mock::given(method("GET"))
            .and(path(path_str))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
    }

    #[tokio::test]
    async fn pass_through_forwards_body_and_credential() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/order_items"))
            .and(header("X-Authorization", "test-key"))
            .and(query_param("time_start", "2025-01-01"))
            .and(query_param("time_end", "2025-01-31"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"product_sku": "S1"}])),
            )
            .mount(&upstream)
            .await;

        let app = test_app(&upstream).await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/order_items?time_start=2025-01-01&time_end=2025-01-31")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers().contains_key("x-request-id"),
            "request id header should be echoed"
        );
        let json = body_json(response).await;
        assert_eq!(json[0]["product_sku"], "S1");
    }

    #[tokio::test]
    async fn pass_through_maps_upstream_failure_to_500() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/listings/ebay"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&upstream)
            .await;

        let app = test_app(&upstream).await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/listings/ebay?time_start=a&time_end=b")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "API fetch failed");
    }

    #[tokio::test]
    async fn export_joins_sources_and_resolves_shipping() {
        let upstream = MockServer::start().await;
        mock_report(
            "/order_items",
            serde_json::json!([{
                "product_sku": "S1",
                "channel_buyer_id": "B1",
                "order_shipping_method": "ground",
                "product_title": "Vintage Lamp"
            }]),
        )
        .mount(&upstream)
        .await;
        mock_report("/listings/ebay", serde_json::json!([{"product_sku": "S1"}]))
            .mount(&upstream)
            .await;
        mock_report("/listings/shopgoodwill", serde_json::json!([]))
            .mount(&upstream)
            .await;
        mock_report(
            "/paid_orders",
            serde_json::json!([{
                "channel_buyer_id": "B1",
                "shipping_contact": "Jane Doe",
                "shipping_city": "Austin"
            }]),
        )
        .mount(&upstream)
        .await;

        let app = test_app(&upstream).await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/export?time_start=a&time_end=b")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let rows = json.as_array().expect("rows array");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["product_sku"], "S1");
        assert_eq!(rows[0]["order_items_count"], 1);
        assert_eq!(rows[0]["ebay_count"], 1);
        assert_eq!(rows[0]["shopgoodwill_count"], 0);
        assert_eq!(rows[0]["shipping_contact"], "Jane Doe");
        assert_eq!(rows[0]["shipping_city"], "Austin");
        assert_eq!(rows[0]["product_title"], "Vintage Lamp");
    }

    #[tokio::test]
    async fn export_degrades_malformed_listing_source() {
        let upstream = MockServer::start().await;
        mock_report(
            "/order_items",
            serde_json::json!([{"product_sku": "S1", "shipping_name": "J. Fallback"}]),
        )
        .mount(&upstream)
        .await;
        // Valid JSON, wrong shape: degrades to empty instead of failing.
        mock_report("/listings/ebay", serde_json::json!({"error": "boom"}))
            .mount(&upstream)
            .await;
        mock_report("/listings/shopgoodwill", serde_json::json!([]))
            .mount(&upstream)
            .await;
        mock_report("/paid_orders", serde_json::json!([]))
            .mount(&upstream)
            .await;

        let app = test_app(&upstream).await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/export?time_start=a&time_end=b")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json[0]["ebay_count"], 0);
        assert_eq!(json[0]["shipping_contact"], "J. Fallback");
    }

    #[tokio::test]
    async fn export_fails_fast_on_transport_failure() {
        let upstream = MockServer::start().await;
        mock_report("/order_items", serde_json::json!([]))
            .mount(&upstream)
            .await;
        mock_report("/listings/ebay", serde_json::json!([]))
            .mount(&upstream)
            .await;
        mock_report("/listings/shopgoodwill", serde_json::json!([]))
            .mount(&upstream)
            .await;
        Mock::given(method("GET"))
            .and(path("/paid_orders"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&upstream)
            .await;

        let app = test_app(&upstream).await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/export?time_start=a&time_end=b")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to export data");
    }

    #[tokio::test]
    async fn export_applies_shipping_method_filter() {
        let upstream = MockServer::start().await;
        mock_report(
            "/order_items",
            serde_json::json!([
                {"product_sku": "S1", "order_shipping_method": "ground"},
                {"product_sku": "S2", "order_shipping_method": "air"}
            ]),
        )
        .mount(&upstream)
        .await;
        mock_report("/listings/ebay", serde_json::json!([]))
            .mount(&upstream)
            .await;
        mock_report("/listings/shopgoodwill", serde_json::json!([]))
            .mount(&upstream)
            .await;
        mock_report("/paid_orders", serde_json::json!([]))
            .mount(&upstream)
            .await;

        let app = test_app(&upstream).await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/export?time_start=a&time_end=b&shipping_method=ground")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let rows = json.as_array().expect("rows array");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["product_sku"], "S1");
    }

    #[tokio::test]
    async fn checkbox_round_trip_flips_without_touching_other_keys() {
        let upstream = MockServer::start().await;
        let app = test_app(&upstream).await;

        let post = |body: &'static str| {
            Request::builder()
                .method("POST")
                .uri("/api/checkbox-state")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .expect("request")
        };

        let response = app
            .clone()
            .oneshot(post(r#"{"sku":"A","checked":true}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], true);

        app.clone()
            .oneshot(post(r#"{"sku":"B","checked":true}"#))
            .await
            .expect("response");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/checkbox-state")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let state = body_json(response).await;
        assert_eq!(state["A"], true);
        assert_eq!(state["B"], true);

        app.clone()
            .oneshot(post(r#"{"sku":"A","checked":false}"#))
            .await
            .expect("response");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/checkbox-state")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let state = body_json(response).await;
        assert_eq!(state["A"], false);
        assert_eq!(state["B"], true, "other keys untouched");
    }
}
