//! Error types shared by storefront services

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorefrontError {
    #[error("Invalid tenant id: {0}")]
    InvalidTenant(String),

    #[error("Invalid subdomain: {0}")]
    InvalidSubdomain(String),
}
