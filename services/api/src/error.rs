//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire gateway service.

use crate::config::ConfigError;
use booking_core::CatalogError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an inconsistency in the static service catalog, caught at
    /// startup.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Represents a standard Input/Output error (e.g., binding to a network
    /// socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
