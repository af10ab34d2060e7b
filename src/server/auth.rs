//! Bearer-token guard for the CMS write route.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AppState;
use super::response::ApiError;

/// Token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Compares every byte of `expected` regardless of where a mismatch occurs.
fn tokens_match(given: &str, expected: &str) -> bool {
    let (a, b) = (given.as_bytes(), expected.as_bytes());
    let mut diff = a.len() ^ b.len();
    for (i, byte) in b.iter().enumerate() {
        diff |= usize::from(a.get(i).copied().unwrap_or(0) ^ byte);
    }
    diff == 0
}

/// Reject the request unless it carries the configured admin token.
///
/// With no token configured every request is rejected.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.admin_token.as_deref() else {
        return ApiError::Unauthorized("writes are disabled".into()).into_response();
    };

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let Some(header) = header else {
        return ApiError::Unauthorized("missing Authorization header".into()).into_response();
    };
    let Some(token) = extract_bearer_token(header) else {
        return ApiError::Unauthorized("invalid Authorization header format".into()).into_response();
    };
    if !tokens_match(token, expected) {
        tracing::warn!(path = %request.uri().path(), "rejected write with wrong token");
        return ApiError::Unauthorized("invalid token".into()).into_response();
    }

    next.run(request).await
}
