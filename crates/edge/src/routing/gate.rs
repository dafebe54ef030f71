//! Access gate for the dashboard and auth pages
//!
//! Only checks whether a session cookie is present. Signature and expiry are
//! verified by the page server when it loads the session.

use super::rewrite::has_segment_prefix;

/// Area that requires a session
pub const PROTECTED_PREFIX: &str = "/dashboard";
/// Pages a signed-in user is bounced away from
pub const AUTH_PAGES: &[&str] = &["/login", "/signup"];

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Gate decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    RedirectTo(&'static str),
}

pub fn access_gate(has_session: bool, path: &str) -> Access {
    if !has_session && has_segment_prefix(path, PROTECTED_PREFIX) {
        return Access::RedirectTo(LOGIN_PATH);
    }
    if has_session && AUTH_PAGES.contains(&path) {
        return Access::RedirectTo(DASHBOARD_PATH);
    }
    Access::Allow
}
