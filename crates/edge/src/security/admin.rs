//! Bearer-token guard for the edge's management endpoints

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::{error::EdgeError, state::AppState};

/// Reject requests that don't carry `Authorization: Bearer <EDGE_ADMIN_TOKEN>`.
///
/// With no token configured every request is rejected.
pub async fn require_admin_token(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, EdgeError> {
    let Some(expected) = state.config.admin_token.as_deref() else {
        tracing::debug!(path = %request.uri().path(), "Admin endpoint disabled");
        return Err(EdgeError::Unauthorized);
    };

    let authorized =
        bearer_token(request.headers()).is_some_and(|token| constant_time_compare(token, expected));
    if !authorized {
        tracing::warn!(path = %request.uri().path(), "Rejected admin request");
        return Err(EdgeError::Unauthorized);
    }

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        let dummy = vec![0u8; a.len()];
        let _ = a.as_bytes().ct_eq(&dummy);
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
