//! Tenant path rewriting
//!
//! Maps `/checkout` on `joe.{root}` to the internal `/joe/checkout` route
//! served by the shared storefront pages.

use super::HostClass;

/// Path prefixes owned by the page server itself, never tenant-scoped
pub const EXCLUDED_PREFIXES: &[&str] = &["/_next", "/api", "/_static"];

/// Outcome of rewriting a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Serve the path unchanged
    PassThrough,
    /// Serve this internal path instead
    To(String),
}

/// Rewrite `path` for the tenant carried by `class`, if any.
///
/// Operates on the path only; query strings are re-attached by the caller.
pub fn rewrite_path(class: &HostClass, path: &str) -> Rewrite {
    let Some(tenant) = class.tenant() else {
        return Rewrite::PassThrough;
    };
    let tenant = tenant.as_str();

    if is_excluded_path(path) || has_segment_prefix(path, &format!("/{tenant}")) {
        return Rewrite::PassThrough;
    }

    if path.is_empty() || path == "/" {
        return Rewrite::To(format!("/{tenant}"));
    }

    if path.starts_with('/') {
        Rewrite::To(format!("/{tenant}{path}"))
    } else {
        Rewrite::To(format!("/{tenant}/{path}"))
    }
}

/// Framework, API and static asset paths are never rewritten
pub fn is_excluded_path(path: &str) -> bool {
    EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| has_segment_prefix(path, prefix))
        || has_file_extension(path)
}

/// `path` equals `prefix` or continues it with a new segment
pub(crate) fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Trailing `.` followed by one or more word characters, e.g. `/favicon.ico`
fn has_file_extension(path: &str) -> bool {
    match path.rsplit_once('.') {
        Some((_, ext)) => {
            !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    }
}
