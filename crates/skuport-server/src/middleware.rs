use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

/// Request ID for the current request, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Tags every request with an ID for log correlation.
///
/// An inbound `x-request-id` header is honored; otherwise a `UUIDv4` is
/// generated. The ID is inserted into request extensions as [`RequestId`]
/// and echoed back on the response header.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = match req.headers().get("x-request-id").and_then(|v| v.to_str().ok()) {
        Some(inbound) => inbound.to_owned(),
        None => Uuid::new_v4().to_string(),
    };

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }
    res
}
