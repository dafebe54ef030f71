//! Storefront Edge Library
//!
//! Tenant-aware edge router for the storefront: maps store subdomains onto
//! the shared storefront pages and proxies everything to the page server.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod error;
pub mod proxy;
pub mod routes;
pub mod routing;
pub mod security;
pub mod state;
pub mod stores;

pub use config::Config;
pub use error::{EdgeError, EdgeResult};
pub use routing::{HostClass, HostClassifier, RouteDecision, TenantRouter};
pub use state::AppState;
