//! Error types for the store, discovery and repository layers.
//!
//! Provides a unified error type covering filesystem access, configuration
//! parsing, catalog URL validation, cloning, and failures propagated from the
//! core transform.

use catalog_migrate_core::MigrateError;
use thiserror::Error;

/// Errors that can occur outside the core transform.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Catalog URL does not have the `endpoint[~branch]` shape.
    #[error("invalid catalog URL: {0}")]
    InvalidCatalogUrl(String),

    /// `git clone` failed or timed out.
    #[error("clone failed: {0}")]
    CloneError(String),

    /// The core transform failed.
    #[error(transparent)]
    Migrate(#[from] MigrateError),
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
