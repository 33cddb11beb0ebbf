//! API authentication and request-id middleware.
//!
//! Every `/api/*` request must carry `X-API-Key` matching the configured key.
//! Authentication is disabled when no key is configured. `/health` is always
//! public.

use axum::{
    extract::State,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::Instrument;

use super::server::AppState;
use crate::error::GatewayError;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that checks the `X-API-Key` header on `/api/*` routes.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, GatewayError> {
    if state.api_key.is_empty() || !request.uri().path().starts_with("/api/") {
        return Ok(next.run(request).await);
    }

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if bool::from(provided.as_bytes().ct_eq(state.api_key.as_bytes())) {
        Ok(next.run(request).await)
    } else {
        Err(GatewayError::Unauthorized(
            "Invalid or missing API key".to_string(),
        ))
    }
}

/// Generate a short request id: 12 lowercase hex chars.
pub fn new_request_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}

/// Attach a request id (reusing an incoming `X-Request-Id`) to the tracing
/// span for the request and echo it on the response.
pub async fn request_id_middleware(request: Request<axum::body::Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 64)
        .map(str::to_string)
        .unwrap_or_else(new_request_id);

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
