//! Storefront Edge - tenant routing proxy in front of the storefront pages

use anyhow::{Context, Result};
use std::time::Duration;
use storefront_edge::{config::LogFormat, routes::create_router, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often expired store cache entries are swept
const CACHE_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing(config.log_format);

    match config.root_domain.as_deref() {
        Some(root) => tracing::info!(root_domain = %root, "Production subdomain routing enabled"),
        None => tracing::info!("APP_ROOT_DOMAIN not set, only *.localhost and *.lvh.me are routed"),
    }

    let pool = storefront_shared::create_pool(&config.database_url, config.database_max_connections)
        .context("Invalid DATABASE_URL")?;
    let bind_address = config.bind_address.clone();
    let state = AppState::new(config, pool).context("Failed to build upstream client")?;

    let cache_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            cache_state.stores.cache().cleanup();
        }
    });

    let upstream = state.upstream.base_url().to_string();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    tracing::info!(upstream = %upstream, "Storefront edge listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Storefront edge stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storefront_edge=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
