//! Upstream page server proxy
//!
//! Forwards (possibly rewritten) requests to the page-rendering server and
//! relays its response. Redirects from upstream are passed to the client,
//! never followed.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{self, HeaderName},
        HeaderMap, HeaderValue, Request, Response,
    },
};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

use crate::{
    error::EdgeError,
    routing::{request_host, TenantContext, TENANT_HEADER},
    state::AppState,
};

/// Headers scoped to a single connection, never forwarded
const HOP_BY_HOP_HEADERS: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

const X_FORWARDED_HOST: &str = "x-forwarded-host";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// HTTP client bound to the upstream base URL
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute upstream URL for a path and query
    pub fn url_for(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    /// Whether the page server answers at all; any HTTP status counts
    pub async fn probe(&self) -> bool {
        match self.client.head(&self.base_url).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(upstream = %self.base_url, "Upstream probe failed: {}", e);
                false
            }
        }
    }

    /// Send `request` upstream and convert the reply into an axum response
    pub async fn forward(
        &self,
        request: Request<Body>,
        max_body_bytes: usize,
    ) -> Result<Response<Body>, EdgeError> {
        let (parts, body) = request.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = self.url_for(path_and_query);

        let body = axum::body::to_bytes(body, max_body_bytes)
            .await
            .map_err(|_| EdgeError::PayloadTooLarge)?;

        let original_host = request_host(&parts.headers, &parts.uri)
            .and_then(|host| HeaderValue::from_str(&host).ok());
        let tenant = parts.extensions.get::<TenantContext>();

        let mut headers = strip_hop_by_hop(&parts.headers);
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);
        headers.remove(TENANT_HEADER);
        if let Some(host) = original_host {
            headers.insert(X_FORWARDED_HOST, host);
        }
        if let Some(ctx) = tenant {
            if let Ok(value) = HeaderValue::from_str(ctx.tenant.as_str()) {
                headers.insert(TENANT_HEADER, value);
            }
        }
        if !headers.contains_key(X_FORWARDED_PROTO) {
            let scheme = parts.uri.scheme_str().unwrap_or("http");
            if let Ok(value) = HeaderValue::from_str(scheme) {
                headers.insert(X_FORWARDED_PROTO, value);
            }
        }

        tracing::trace!(
            method = %parts.method,
            url = %url,
            tenant = tenant.map(|ctx| ctx.tenant.as_str()).unwrap_or_default(),
            requested = tenant.map(|ctx| ctx.original_path.as_str()).unwrap_or_default(),
            "Forwarding upstream"
        );

        let upstream = self
            .client
            .request(parts.method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = upstream.status();
        let response_headers = strip_hop_by_hop(upstream.headers());
        let bytes = upstream.bytes().await?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;
        response.headers_mut().remove(header::CONTENT_LENGTH);
        Ok(response)
    }
}

/// Copy `headers` without hop-by-hop headers, including any named in `Connection`
fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let connection_listed: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .collect();

    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if HOP_BY_HOP_HEADERS.contains(name)
            || name.as_str() == "keep-alive"
            || connection_listed.iter().any(|n| n == name.as_str())
        {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Router fallback: everything not served by the edge goes upstream
pub async fn forward(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response<Body>, EdgeError> {
    state
        .upstream
        .forward(request, state.config.max_request_body_bytes)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode};
    use storefront_shared::TenantId;
    use mockito::Matcher;

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-trace"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-trace", HeaderValue::from_static("1"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));

        let out = strip_hop_by_hop(&headers);
        assert!(out.get(header::CONNECTION).is_none());
        assert!(out.get("keep-alive").is_none());
        assert!(out.get("x-trace").is_none());
        assert!(out.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(out.get(header::ACCEPT).unwrap(), "text/html");
        assert_eq!(out.get_all(header::SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn test_url_for() {
        let client = UpstreamClient::new("http://pages:9002/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://pages:9002");
        assert_eq!(client.url_for("/joe/checkout?x=1"), "http://pages:9002/joe/checkout?x=1");
    }

    #[tokio::test]
    async fn test_forward_relays_request_and_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex("^/joe/checkout".to_string()))
            .match_query(Matcher::UrlEncoded("step".to_string(), "2".to_string()))
            .match_header("x-forwarded-host", "joe.shopfrombio.com")
            .match_header(TENANT_HEADER, "joe")
            .match_body("qty=2")
            .with_status(201)
            .with_header("x-page", "checkout")
            .with_body("created")
            .create_async()
            .await;

        let client = UpstreamClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let mut request = Request::builder()
            .method(Method::POST)
            .uri("/joe/checkout?step=2")
            .header(header::HOST, "joe.shopfrombio.com")
            .body(Body::from("qty=2"))
            .unwrap();
        request.extensions_mut().insert(TenantContext {
            tenant: TenantId::parse("joe").unwrap(),
            original_path: "/checkout".to_string(),
        });

        let response = client.forward(request, 1024).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get("x-page").unwrap(), "checkout");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"created");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_forwarded_host_falls_back_to_authority() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/joe")
            .match_header("x-forwarded-host", "joe.localhost:3000")
            .match_header(TENANT_HEADER, Matcher::Missing)
            .with_status(200)
            .create_async()
            .await;

        let client = UpstreamClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        // HTTP/2 requests carry the host in the URI, not in a Host header
        let request = Request::builder()
            .uri("http://joe.localhost:3000/joe")
            .header(TENANT_HEADER, "victim")
            .body(Body::empty())
            .unwrap();

        let response = client.forward(request, 1024).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upstream_redirects_are_not_followed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/old")
            .with_status(308)
            .with_header("location", "/new")
            .create_async()
            .await;

        let client = UpstreamClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let request = Request::builder().uri("/old").body(Body::empty()).unwrap();

        let response = client.forward(request, 1024).await.unwrap();
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(response.headers().get("location").unwrap(), "/new");
    }

    #[tokio::test]
    async fn test_probe() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("HEAD", "/")
            .with_status(404)
            .create_async()
            .await;

        let client = UpstreamClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        assert!(client.probe().await);

        let closed = UpstreamClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        assert!(!closed.probe().await);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let client = UpstreamClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .body(Body::from(vec![0u8; 64]))
            .unwrap();

        let result = client.forward(request, 16).await;
        assert!(matches!(result, Err(EdgeError::PayloadTooLarge)));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        // Port 9 (discard) is closed on test machines
        let client = UpstreamClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let result = client.forward(request, 1024).await;
        assert!(matches!(result, Err(EdgeError::Upstream(_))));
    }
}
