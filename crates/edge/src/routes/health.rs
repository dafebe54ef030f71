//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;

use crate::{routing::CacheStats, state::AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy`, `degraded` (store lookups down, routing up) or `unhealthy`
    pub status: &'static str,
    pub version: &'static str,
    pub upstream: &'static str,
    pub database: &'static str,
    pub store_cache: CacheStats,
}

/// Routing only needs the page server; the database backs store lookups
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (upstream_up, database_up) =
        tokio::join!(state.upstream.probe(), database_ready(&state.pool));

    let (code, status) = match (upstream_up, database_up) {
        (true, true) => (StatusCode::OK, "healthy"),
        (true, false) => (StatusCode::OK, "degraded"),
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            upstream: if upstream_up { "reachable" } else { "unreachable" },
            database: if database_up { "healthy" } else { "unhealthy" },
            store_cache: state.stores.cache().stats(),
        }),
    )
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// 200 once the store database answers
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if database_ready(&state.pool).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn database_ready(pool: &PgPool) -> bool {
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Database probe failed: {}", e);
            false
        }
    }
}
