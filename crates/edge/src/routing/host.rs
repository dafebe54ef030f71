//! Host classification
//!
//! Turns a raw `Host` header into one of:
//! - Root: the bare app domain (marketing, auth and dashboard pages)
//! - ProdTenant: `joe.shopfrombio.com` -> `joe`
//! - DevTenant: `joe.localhost:3000` / `joe.lvh.me` -> `joe`
//! - Unrecognized: anything else, served untouched

use storefront_shared::TenantId;

use super::RoutingError;

/// Development domains that route `{tenant}.{suffix}` to a store
pub const DEV_SUFFIXES: &[&str] = &["localhost", "lvh.me"];

/// Result of classifying a host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostClass {
    /// The configured root domain itself
    Root,
    /// Subdomain of the configured root domain
    ProdTenant(TenantId),
    /// Subdomain of a development domain
    DevTenant(TenantId),
    /// Not a host we route; passed through as-is
    Unrecognized,
}

impl HostClass {
    /// Tenant carried by this class, if any
    pub fn tenant(&self) -> Option<&TenantId> {
        match self {
            HostClass::ProdTenant(id) | HostClass::DevTenant(id) => Some(id),
            HostClass::Root | HostClass::Unrecognized => None,
        }
    }

    /// Short label for logs and debug output
    pub fn kind(&self) -> &'static str {
        match self {
            HostClass::Root => "root",
            HostClass::ProdTenant(_) => "prod_tenant",
            HostClass::DevTenant(_) => "dev_tenant",
            HostClass::Unrecognized => "unrecognized",
        }
    }
}

/// Classifies hosts against an optional root domain and the dev suffixes
#[derive(Debug, Clone)]
pub struct HostClassifier {
    root_domain: Option<String>,
    www_is_root: bool,
}

impl HostClassifier {
    /// Create a classifier. An empty root domain disables production routing.
    pub fn new(root_domain: Option<&str>, www_is_root: bool) -> Self {
        let root_domain = root_domain
            .map(|d| d.trim().trim_end_matches('.').to_lowercase())
            .filter(|d| !d.is_empty());
        Self {
            root_domain,
            www_is_root,
        }
    }

    pub fn root_domain(&self) -> Option<&str> {
        self.root_domain.as_deref()
    }

    /// Classify a raw `Host` header value
    pub fn classify(&self, raw_host: Option<&str>) -> Result<HostClass, RoutingError> {
        let raw_host = raw_host.map(str::trim).unwrap_or_default();
        if raw_host.is_empty() {
            return Err(RoutingError::MissingHost);
        }

        let host = normalize_host(raw_host);
        if host.is_empty() {
            return Ok(HostClass::Unrecognized);
        }

        // Production rule runs first, even when the root domain is a dev suffix
        if let Some(root) = self.root_domain.as_deref() {
            if host == root {
                return Ok(HostClass::Root);
            }
            if let Some(label) = strip_domain_suffix(&host, root) {
                if self.www_is_root && label == "www" {
                    return Ok(HostClass::Root);
                }
                return Ok(TenantId::parse(label)
                    .map(HostClass::ProdTenant)
                    .unwrap_or(HostClass::Unrecognized));
            }
        }

        for suffix in DEV_SUFFIXES {
            if strip_domain_suffix(&host, suffix).is_some() {
                let first = host.split('.').next().unwrap_or_default();
                return Ok(TenantId::parse(first)
                    .map(HostClass::DevTenant)
                    .unwrap_or(HostClass::Unrecognized));
            }
        }

        Ok(HostClass::Unrecognized)
    }
}

/// Normalize a host header value: drop the port, lowercase, drop a trailing dot
pub fn normalize_host(host: &str) -> String {
    let host = host.split(':').next().unwrap_or(host);
    let host = host.strip_suffix('.').unwrap_or(host);
    host.to_lowercase()
}

/// If `host` is a strict subdomain of `domain`, return everything left of
/// the `.{domain}` suffix.
fn strip_domain_suffix<'a>(host: &'a str, domain: &str) -> Option<&'a str> {
    // The separating dot is part of the suffix
    let suffix_len = domain.len() + 1;
    if host.len() <= suffix_len {
        return None;
    }
    let split = host.len() - suffix_len;
    if !host.is_char_boundary(split) {
        return None;
    }
    let (label, suffix) = host.split_at(split);
    if suffix.strip_prefix('.') == Some(domain) {
        Some(label)
    } else {
        None
    }
}
