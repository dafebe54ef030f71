//! Tenant routing middleware
//!
//! Entry point of every proxied request: reads the Host header and session
//! cookie, asks the [`TenantRouter`](super::TenantRouter) what to do, and
//! either redirects, rewrites the request URI, or lets it through.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{COOKIE, HOST},
        uri::PathAndQuery,
        HeaderMap, Request, Uri,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use storefront_shared::TenantId;

use super::{rewrite::has_segment_prefix, RouteDecision};
use crate::{error::EdgeError, state::AppState};

/// Header telling the page server which store a rewritten request belongs to.
///
/// Set by the proxy from [`TenantContext`]; never taken from the client.
pub const TENANT_HEADER: &str = "x-storefront-tenant";

/// The edge's own endpoints, never routed
pub const EDGE_PREFIX: &str = "/_edge";

/// Request extension added to rewritten requests, read by the upstream proxy
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant: TenantId,
    /// Path as the shopper requested it
    pub original_path: String,
}

/// Middleware that applies the routing decision to the request
pub async fn tenant_routing(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, EdgeError> {
    request.headers_mut().remove(TENANT_HEADER);

    let path = request.uri().path().to_string();
    if has_segment_prefix(&path, EDGE_PREFIX) {
        return Ok(next.run(request).await);
    }

    let host = request_host(request.headers(), request.uri());
    let has_session = has_session_cookie(request.headers(), &state.config.session_cookie_name);

    let decision = match state.router.route(host.as_deref(), &path, has_session) {
        Ok(decision) => decision,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Rejecting request");
            return Err(e.into());
        }
    };

    tracing::debug!(
        host = host.as_deref().unwrap_or_default(),
        path = %path,
        outcome = decision.outcome(),
        "Routed request"
    );

    match decision {
        RouteDecision::Redirect(to) => Ok(Redirect::temporary(to).into_response()),
        RouteDecision::Rewrite {
            tenant,
            path: internal_path,
        } => {
            tracing::debug!(tenant = %tenant, to = %internal_path, "Rewriting tenant path");

            *request.uri_mut() = rewrite_uri(request.uri(), &internal_path)?;
            request.extensions_mut().insert(TenantContext {
                tenant,
                original_path: path,
            });

            Ok(next.run(request).await)
        }
        RouteDecision::PassThrough { .. } => Ok(next.run(request).await),
    }
}

/// Host header, falling back to the URI authority (HTTP/2 `:authority`)
pub(crate) fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
}

/// Whether any Cookie header carries a non-empty `cookie_name` cookie
pub fn has_session_cookie(headers: &HeaderMap, cookie_name: &str) -> bool {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name.trim() == cookie_name && !value.trim().is_empty())
}

/// Replace the path of `uri`, keeping its query string untouched
fn rewrite_uri(uri: &Uri, path: &str) -> Result<Uri, EdgeError> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };
    let path_and_query: PathAndQuery = path_and_query
        .parse()
        .map_err(|_| EdgeError::BadRequest("Invalid rewritten path".to_string()))?;

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    Uri::from_parts(parts).map_err(|_| EdgeError::BadRequest("Invalid rewritten URI".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;
    use axum::{
        extract::Request as AxumRequest,
        http::{HeaderValue, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    /// Echoes the URI the proxy would forward, plus the tenant context
    async fn echo(request: AxumRequest) -> String {
        let (tenant, original) = match request.extensions().get::<TenantContext>() {
            Some(ctx) => (ctx.tenant.to_string(), ctx.original_path.clone()),
            None => ("-".to_string(), "-".to_string()),
        };
        let forwarded_tenant = request
            .headers()
            .get(TENANT_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("-");
        format!("{} {} {} {}", request.uri(), tenant, original, forwarded_tenant)
    }

    fn app(root_domain: Option<&str>) -> Router {
        let state = test_state(root_domain, "http://127.0.0.1:9");
        Router::new()
            .route("/_edge/ping", get(|| async { "pong" }))
            .fallback(echo)
            .layer(axum::middleware::from_fn_with_state(state.clone(), tenant_routing))
            .with_state(state)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    fn get_req(host: Option<&str>, uri: &str) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(host) = host {
            builder = builder.header(HOST, host);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_prod_tenant_is_rewritten_with_query() {
        let (status, _, body) = send(
            app(Some("shopfrombio.com")),
            get_req(Some("joe.shopfrombio.com"), "/checkout?step=2"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "/joe/checkout?step=2 joe /checkout -");
    }

    #[tokio::test]
    async fn test_dev_tenant_root_is_rewritten() {
        let (_, _, body) = send(app(None), get_req(Some("joe.localhost:3000"), "/")).await;
        assert_eq!(body, "/joe joe / -");
    }

    #[tokio::test]
    async fn test_assets_are_not_rewritten() {
        let (_, _, body) = send(
            app(None),
            get_req(Some("joe.localhost:3000"), "/_next/static/chunk.js"),
        )
        .await;
        assert_eq!(body, "/_next/static/chunk.js - - -");
    }

    #[tokio::test]
    async fn test_client_tenant_header_is_dropped() {
        for (host, uri, expected) in [
            ("shopfrombio.com", "/pricing", "/pricing - - -"),
            ("joe.shopfrombio.com", "/api/orders", "/api/orders - - -"),
            ("joe.shopfrombio.com", "/cart", "/joe/cart joe /cart -"),
        ] {
            let request = Request::builder()
                .uri(uri)
                .header(HOST, host)
                .header(TENANT_HEADER, "victim")
                .body(Body::empty())
                .unwrap();
            let (_, _, body) = send(app(Some("shopfrombio.com")), request).await;
            assert_eq!(body, expected, "{host}{uri}");
        }
    }

    #[tokio::test]
    async fn test_missing_host_is_bad_request() {
        let (status, _, body) = send(app(None), get_req(None, "/")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("MISSING_HOST"));
    }

    #[tokio::test]
    async fn test_dashboard_without_session_redirects_to_login() {
        let (status, headers, _) = send(
            app(Some("example.com")),
            get_req(Some("example.com"), "/dashboard/settings"),
        )
        .await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(headers.get("location").unwrap(), "/login");
    }

    #[tokio::test]
    async fn test_login_with_session_redirects_to_dashboard() {
        let request = Request::builder()
            .uri("/login")
            .header(HOST, "example.com")
            .header(COOKIE, "theme=dark; session=abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(app(Some("example.com")), request).await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(headers.get("location").unwrap(), "/dashboard");
    }

    #[tokio::test]
    async fn test_edge_endpoints_skip_routing() {
        let (status, _, body) = send(app(None), get_req(None, "/_edge/ping")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "pong");
    }

    #[test]
    fn test_has_session_cookie() {
        let mut headers = HeaderMap::new();
        assert!(!has_session_cookie(&headers, "session"));

        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session="));
        assert!(!has_session_cookie(&headers, "session"));

        headers.insert(COOKIE, HeaderValue::from_static("sessionid=1; theme=dark"));
        assert!(!has_session_cookie(&headers, "session"));

        headers.append(COOKIE, HeaderValue::from_static("session=token"));
        assert!(has_session_cookie(&headers, "session"));
    }

    #[test]
    fn test_rewrite_uri_keeps_query() {
        let uri: Uri = "/products?sort=price&page=2".parse().unwrap();
        let rewritten = rewrite_uri(&uri, "/acme/products").unwrap();
        assert_eq!(rewritten.to_string(), "/acme/products?sort=price&page=2");
    }
}
