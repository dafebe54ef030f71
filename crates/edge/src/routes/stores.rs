//! Store lookup endpoints
//!
//! Used by the page server to resolve the store behind a rewritten tenant
//! path and by the dashboard to check subdomains before creating a store.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use storefront_shared::{StoreSummary, TenantId};

use crate::{
    error::{EdgeError, EdgeResult},
    state::AppState,
    stores::Availability,
};

fn parse_subdomain(raw: &str) -> EdgeResult<TenantId> {
    TenantId::parse(&raw.trim().to_lowercase())
        .map_err(|e| EdgeError::BadRequest(e.to_string()))
}

/// GET /_edge/stores/:subdomain
pub async fn get_store(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> EdgeResult<Json<StoreSummary>> {
    let tenant = parse_subdomain(&subdomain)?;
    let store = state
        .stores
        .find_by_subdomain(&tenant)
        .await?
        .ok_or(EdgeError::NotFound)?;

    Ok(Json(StoreSummary::from(&store)))
}

/// DELETE /_edge/stores/:subdomain/cache
///
/// Called after a store's subdomain or settings change.
pub async fn purge_store_cache(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> StatusCode {
    state.stores.invalidate(subdomain.trim());
    tracing::info!(subdomain = %subdomain, "Purged store cache entry");
    StatusCode::NO_CONTENT
}

/// GET /_edge/subdomains/:label/availability
pub async fn subdomain_availability(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> EdgeResult<Json<Availability>> {
    Ok(Json(state.stores.subdomain_available(&label).await?))
}
