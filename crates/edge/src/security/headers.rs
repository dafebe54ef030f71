//! Security Headers Middleware
//!
//! Adds baseline security headers to every response leaving the edge.
//! The page server owns its own policy: a header it already set is kept.

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, Response},
    middleware::Next,
};

const DEFAULT_HEADERS: &[(&str, &str)] = &[
    // Prevent MIME type sniffing
    ("x-content-type-options", "nosniff"),
    // Control referrer information leakage
    ("referrer-policy", "strict-origin-when-cross-origin"),
    // Storefront pages may frame themselves, nobody else may
    ("x-frame-options", "SAMEORIGIN"),
];

/// Middleware that fills in missing security headers
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for &(name, value) in DEFAULT_HEADERS {
        let name = HeaderName::from_static(name);
        if !headers.contains_key(&name) {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }

    response
}
