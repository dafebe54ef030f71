//! Edge configuration

use std::env;
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Edge configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,

    // Routing
    pub root_domain: Option<String>, // e.g., "shopfrombio.com" for *.shopfrombio.com routing
    pub www_is_root: bool,
    pub session_cookie_name: String,

    // Upstream page server
    pub upstream_url: String,
    pub upstream_timeout_ms: u64,
    pub max_request_body_bytes: usize,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,
    pub store_cache_ttl_secs: u64,

    // Admin endpoints, disabled when unset
    pub admin_token: Option<String>,

    // Logging
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),

            // Routing
            root_domain: env::var("APP_ROOT_DOMAIN")
                .ok()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            www_is_root: env::var("WWW_IS_ROOT")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .ok()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "session".to_string()),

            // Upstream
            upstream_url: {
                let url =
                    env::var("UPSTREAM_URL").map_err(|_| ConfigError::Missing("UPSTREAM_URL"))?;
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::Invalid(
                        "UPSTREAM_URL must start with http:// or https://",
                    ));
                }
                url.trim_end_matches('/').to_string()
            },
            upstream_timeout_ms: env::var("UPSTREAM_TIMEOUT_MS")
                .unwrap_or_else(|_| "30000".to_string())
                .parse()
                .unwrap_or(30000),
            max_request_body_bytes: env::var("MAX_REQUEST_BODY_BYTES")
                .unwrap_or_else(|_| "10485760".to_string()) // 10MB default
                .parse()
                .unwrap_or(10_485_760),

            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            store_cache_ttl_secs: env::var("STORE_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),

            // Admin
            admin_token: env::var("EDGE_ADMIN_TOKEN")
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),

            // Logging
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        })
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }

    pub fn store_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.store_cache_ttl_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}
