//! Edge routes

pub mod health;
pub mod resolve;
pub mod stores;

use axum::{
    middleware,
    routing::{delete, get},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    proxy,
    routing::{tenant_routing, EDGE_PREFIX},
    security::{require_admin_token, security_headers_middleware},
    state::AppState,
};

/// Create the edge router
///
/// `/_edge/*` is served by the edge itself; every other request goes through
/// tenant routing and is proxied to the page server.
pub fn create_router(state: AppState) -> Router {
    // Management routes (require EDGE_ADMIN_TOKEN)
    let admin_routes = Router::new()
        .route("/stores/:subdomain/cache", delete(stores::purge_store_cache))
        .route("/resolve", get(resolve::resolve))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin_token));

    let edge_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/stores/:subdomain", get(stores::get_store))
        .route(
            "/subdomains/:label/availability",
            get(stores::subdomain_availability),
        )
        .merge(admin_routes);

    Router::new()
        .nest(EDGE_PREFIX, edge_routes)
        .fallback(proxy::forward)
        .layer(middleware::from_fn_with_state(state.clone(), tenant_routing))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
