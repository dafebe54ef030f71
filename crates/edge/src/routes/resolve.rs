//! Routing decision inspector
//!
//! Shows what the edge would do with a host/path pair without proxying
//! anything. Handy when debugging DNS or root domain configuration.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{error::EdgeResult, routing::RouteDecision, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub host: Option<String>,
    pub path: Option<String>,
    #[serde(default)]
    pub session: bool,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub host_class: &'static str,
    pub tenant: Option<String>,
    pub outcome: &'static str,
    /// Internal path for rewrites, redirect target for redirects
    pub target: Option<String>,
}

/// GET /_edge/resolve?host=..&path=..&session=..
pub async fn resolve(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> EdgeResult<Json<ResolveResponse>> {
    let path = query.path.as_deref().unwrap_or("/");
    let host = query.host.as_deref();

    let class = state.router.classifier().classify(host)?;
    let decision = state.router.route(host, path, query.session)?;

    let target = match &decision {
        RouteDecision::Redirect(to) => Some(to.to_string()),
        RouteDecision::Rewrite { path, .. } => Some(path.clone()),
        RouteDecision::PassThrough { .. } => None,
    };

    Ok(Json(ResolveResponse {
        host_class: class.kind(),
        tenant: class.tenant().map(|t| t.to_string()),
        outcome: decision.outcome(),
        target,
    }))
}

