//! Response hardening and management endpoint guard

mod admin;
mod headers;

pub use admin::require_admin_token;
pub use headers::security_headers_middleware;
