//! Filesystem collaborators for catalog migration.
//!
//! This crate supplies everything the core treats as external: a
//! filesystem [`DocumentStore`](catalog_migrate_core::DocumentStore)
//! ([`FsStore`]), the directory walk that builds a
//! [`Catalog`](catalog_migrate_core::Catalog) ([`discover_catalog`]), a
//! repository provider that clones catalogs with git ([`GitProvider`]), and
//! the YAML run configuration ([`MigrateConfig`]).
//!
//! # Quick start
//!
//! ```no_run
//! use catalog_migrate_core::TransformOptions;
//! use catalog_migrate_store::{CatalogSource, GitProvider, RepositoryProvider, migrate_directory};
//! use std::time::Duration;
//!
//! let source = CatalogSource::parse("https://github.com/rancher/community-catalog").unwrap();
//! let provider = GitProvider::new("output", Duration::from_secs(300));
//! let dir = provider.fetch(&source).unwrap();
//!
//! let report = migrate_directory(&dir, TransformOptions { preserve: true }).unwrap();
//! println!("migrated {} templates", report.templates);
//! ```

mod config;
mod error;
mod fs;
mod repository;
mod walk;

use std::path::Path;

use catalog_migrate_core::{MigrationReport, TransformOptions, Transformer};
use tracing::info;

pub use config::{DEFAULT_CLONE_TIMEOUT_SECS, DEFAULT_OUTPUT_DIR, MigrateConfig};
pub use error::{Result, StoreError};
pub use fs::FsStore;
pub use repository::{
    CatalogSource, DEFAULT_BRANCH, GitProvider, LocalProvider, RepositoryProvider,
};
pub use walk::discover_catalog;

/// Discovers and migrates a checked-out catalog in place.
///
/// # Errors
///
/// Returns the first discovery or transform error; changes already made
/// on disk are kept.
pub fn migrate_directory(dir: &Path, options: TransformOptions) -> Result<MigrationReport> {
    let catalog = discover_catalog(dir, &FsStore)?;
    info!(templates = catalog.templates.len(), "Parse complete");

    let mut transformer = Transformer::new(FsStore, options);
    let report = transformer.transform_catalog(&catalog)?;
    info!("Transform complete");
    Ok(report)
}
