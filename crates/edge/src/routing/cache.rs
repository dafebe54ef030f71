//! In-memory store cache with TTL
//!
//! Caches subdomain-to-store lookups to reduce database queries. Misses are
//! cached too, so probing unknown subdomains does not hit the database.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use storefront_shared::Store;

/// Default cache TTL (1 minute)
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Cache entry with expiration
#[derive(Clone)]
struct CacheEntry {
    store: Option<Store>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(store: Option<Store>, ttl: Duration) -> Self {
        Self {
            store,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Thread-safe in-memory store cache
pub struct StoreCache {
    /// Maps subdomain -> store (None means no store owns the subdomain)
    cache: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for StoreCache {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreCache {
    /// Create a new cache with default TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    /// Create a new cache with custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Get the cached store for a subdomain
    /// Returns Some(Some(store)) if found and valid
    /// Returns Some(None) if the subdomain was cached as unknown
    /// Returns None if not in cache or expired
    pub fn get(&self, subdomain: &str) -> Option<Option<Store>> {
        let cache = self.cache.read().ok()?;
        let entry = cache.get(subdomain)?;

        if entry.is_expired() {
            None
        } else {
            Some(entry.store.clone())
        }
    }

    /// Cache a subdomain -> store mapping
    pub fn set(&self, subdomain: &str, store: Option<Store>) {
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(subdomain.to_string(), CacheEntry::new(store, self.ttl));
        }
    }

    /// Invalidate a specific subdomain
    pub fn invalidate(&self, subdomain: &str) {
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(subdomain);
        }
    }

    /// Clear expired entries (call periodically for memory management)
    pub fn cleanup(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.retain(|_, entry| !entry.is_expired());
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        if let Ok(cache) = self.cache.read() {
            let total = cache.len();
            let expired = cache.values().filter(|e| e.is_expired()).count();
            CacheStats {
                total_entries: total,
                expired_entries: expired,
                active_entries: total - expired,
            }
        } else {
            CacheStats::default()
        }
    }
}

/// Cache statistics
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}
