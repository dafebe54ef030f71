//! Host-based tenant routing
//!
//! Every request to the edge is classified by its Host header and, for
//! store subdomains, rewritten onto the shared storefront pages:
//! - Production: joe.shopfrombio.com/checkout -> /joe/checkout
//! - Development: joe.localhost:3000/ -> /joe
//! - Root domain: dashboard and auth pages, guarded by the access gate

mod cache;
mod gate;
mod host;
mod middleware;
mod rewrite;

pub use cache::{CacheStats, StoreCache};
pub use gate::{access_gate, Access, AUTH_PAGES, PROTECTED_PREFIX};
pub use host::{normalize_host, HostClass, HostClassifier, DEV_SUFFIXES};
pub use middleware::{
    has_session_cookie, tenant_routing, TenantContext, EDGE_PREFIX, TENANT_HEADER,
};
pub(crate) use middleware::request_host;
pub use rewrite::{is_excluded_path, rewrite_path, Rewrite, EXCLUDED_PREFIXES};

use storefront_shared::TenantId;

/// Errors raised while routing a request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    #[error("Missing Host header")]
    MissingHost,
}

/// What the edge does with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Answer with a redirect, the page server is not involved
    Redirect(&'static str),
    /// Serve the tenant page at `path` instead of the requested one
    Rewrite { tenant: TenantId, path: String },
    /// Serve the requested path as-is
    PassThrough { class: HostClass },
}

impl RouteDecision {
    /// Short label for logs and debug output
    pub fn outcome(&self) -> &'static str {
        match self {
            RouteDecision::Redirect(_) => "redirect",
            RouteDecision::Rewrite { .. } => "rewrite",
            RouteDecision::PassThrough { .. } => "pass_through",
        }
    }
}

/// Composes host classification, the access gate and path rewriting.
///
/// Pure: the same host, path and session flag always yield the same decision.
#[derive(Debug, Clone)]
pub struct TenantRouter {
    classifier: HostClassifier,
}

impl TenantRouter {
    pub fn new(classifier: HostClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &HostClassifier {
        &self.classifier
    }

    /// Decide how to serve `path` requested on `host`
    pub fn route(
        &self,
        host: Option<&str>,
        path: &str,
        has_session: bool,
    ) -> Result<RouteDecision, RoutingError> {
        let class = self.classifier.classify(host)?;

        // Store subdomains serve shopper pages; the dashboard lives on the app domain
        if class.tenant().is_none() {
            if let Access::RedirectTo(to) = access_gate(has_session, path) {
                return Ok(RouteDecision::Redirect(to));
            }
        }

        match (rewrite_path(&class, path), class) {
            (Rewrite::To(path), HostClass::ProdTenant(tenant) | HostClass::DevTenant(tenant)) => {
                Ok(RouteDecision::Rewrite { tenant, path })
            }
            (_, class) => Ok(RouteDecision::PassThrough { class }),
        }
    }
}
