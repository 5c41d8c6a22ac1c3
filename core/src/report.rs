//! Run report for a migrated catalog.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::Dialect;

/// What happened to one version directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Directory before migration.
    pub from: PathBuf,
    /// Directory after migration (same as `from` when not renamed).
    pub to: PathBuf,
    pub primary_dialect: Option<Dialect>,
    pub secondary_dialect: Option<Dialect>,
    /// Whether a merged `compose.yml` was written.
    pub services_written: bool,
}

/// Summary of a catalog transform, serializable to JSON.
///
/// # Examples
///
/// ```
/// use catalog_migrate_core::MigrationReport;
///
/// let report = MigrationReport::new("output/community-catalog-master");
/// assert_eq!(report.templates, 0);
/// assert!(report.generated_at.contains('T'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// RFC 3339 timestamp of report creation.
    pub generated_at: String,
    /// Catalog root directory.
    pub catalog: PathBuf,
    pub templates: usize,
    pub templates_without_metadata: usize,
    pub directories_renamed: usize,
    pub files_written: usize,
    pub files_removed: usize,
    pub icons_moved: usize,
    pub versions: Vec<VersionRecord>,
}

impl MigrationReport {
    /// Creates an empty report for the catalog rooted at `catalog`.
    pub fn new(catalog: impl AsRef<Path>) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            catalog: catalog.as_ref().to_path_buf(),
            ..Self::default()
        }
    }
}

/// Renders reports for several catalogs as one pretty-printed JSON array.
pub fn reports_to_json(reports: &[MigrationReport]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(reports)
}
