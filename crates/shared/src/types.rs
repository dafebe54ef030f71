//! Common types used across the storefront services

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::StorefrontError;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Store ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(pub Uuid);

// =============================================================================
// Tenant
// =============================================================================

/// Subdomain label identifying a store for the lifetime of one request.
///
/// Always non-empty and free of dots. Never persisted by the router; the
/// store record behind it is looked up downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn parse(label: &str) -> Result<Self, StorefrontError> {
        if label.is_empty() || label.contains('.') {
            return Err(StorefrontError::InvalidTenant(label.to_string()));
        }
        Ok(Self(label.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Database Models
// =============================================================================

/// Store (tenant) record from the `stores` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub subdomain: String,
    pub user_id: Uuid,
    pub currency: String,
    pub theme: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Store {
    pub fn store_id(&self) -> StoreId {
        StoreId(self.id)
    }
}

// =============================================================================
// API Types
// =============================================================================

/// Public view of a store, safe to hand to shoppers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub id: StoreId,
    pub name: String,
    pub subdomain: String,
    pub currency: String,
    pub theme: String,
}

impl From<&Store> for StoreSummary {
    fn from(store: &Store) -> Self {
        Self {
            id: store.store_id(),
            name: store.name.clone(),
            subdomain: store.subdomain.clone(),
            currency: store.currency.clone(),
            theme: store.theme.clone(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
