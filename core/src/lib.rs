//! Core of the catalog migration: document model, dialect detection,
//! service merging and the catalog/template/version transforms.
//!
//! A legacy catalog version directory holds two documents:
//!
//! - `docker-compose.yml` - the primary service document.
//! - `rancher-compose.yml` - a secondary service document that also embeds
//!   the `.catalog` metadata block.
//!
//! Migration detects each document's dialect ([`detect`]), merges their
//! services ([`merge_services`], [`merge_documents`]), extracts the catalog
//! block into `template-version.yml`, and renames the directory after the
//! block's version ([`compute_new_directory_name`]). Template metadata is
//! rewritten by [`migrate_template_metadata`].
//!
//! All persistence goes through a [`DocumentStore`]; this crate performs no
//! filesystem or process operations of its own.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use catalog_migrate_core::*;
//!
//! let outcome = transform_version(&VersionInput {
//!     dir: Path::new("templates/app/0"),
//!     primary: Some(b"app:\n  image: a:1\n"),
//!     secondary: Some(b".catalog:\n  version: 1.2.0\napp:\n  ports: [8080]\n"),
//! })
//! .unwrap();
//!
//! assert_eq!(outcome.new_dir_name, "1.2.0");
//! assert_eq!(outcome.metadata.as_deref(), Some(b"version: 1.2.0\n".as_slice()));
//! assert!(outcome.services.is_some());
//! ```

mod catalog;
mod detect;
mod error;
mod merge;
mod metadata;
mod model;
mod report;
mod store;
mod transform;
mod version;

pub use catalog::{
    Catalog, ICON_PREFIX, LEGACY_TEMPLATE_FILE, SourceFile, TEMPLATE_CATEGORIES, TEMPLATE_FILE,
    Template, Version, icon_file_name,
};
pub use detect::detect;
pub use error::{MigrateError, Result};
pub use merge::{merge_documents, merge_services};
pub use metadata::migrate_template_metadata;
pub use model::{
    CATALOG_KEY, CatalogMetadata, Dialect, Question, ServiceDocument, ServiceFields, ServiceMap,
    TemplateMetadata,
};
pub use report::{MigrationReport, VersionRecord, reports_to_json};
pub use store::DocumentStore;
pub use transform::{TransformOptions, Transformer};
pub use version::{
    LEGACY_METADATA_FILE, LEGACY_SERVICE_FILE, METADATA_FILE, SERVICE_FILE, VersionInput,
    VersionOutcome, compute_new_directory_name, transform_version,
};
