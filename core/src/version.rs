//! Per-version migration.
//!
//! [`transform_version`] is pure: it takes the raw bytes of the two legacy
//! documents and returns what the version should look like afterwards. The
//! directory rename and file writes are applied separately by
//! [`Transformer`](crate::Transformer).

use std::path::Path;

use tracing::debug;

use crate::detect::detect;
use crate::error::{MigrateError, Result};
use crate::merge::merge_documents;
use crate::model::{CatalogMetadata, Dialect, ServiceDocument};

/// Legacy service document (primary).
pub const LEGACY_SERVICE_FILE: &str = "docker-compose.yml";
/// Legacy metadata+service document (secondary).
pub const LEGACY_METADATA_FILE: &str = "rancher-compose.yml";
/// Merged service document.
pub const SERVICE_FILE: &str = "compose.yml";
/// Extracted catalog block.
pub const METADATA_FILE: &str = "template-version.yml";

/// Raw inputs of one version directory.
#[derive(Debug, Clone, Copy)]
pub struct VersionInput<'a> {
    /// Current version directory.
    pub dir: &'a Path,
    /// Bytes of `docker-compose.yml`, if present.
    pub primary: Option<&'a [u8]>,
    /// Bytes of `rancher-compose.yml`, if present.
    pub secondary: Option<&'a [u8]>,
}

/// The migrated form of one version directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionOutcome {
    /// Terminal path segment the directory should carry.
    pub new_dir_name: String,
    /// Content of `template-version.yml`; `None` without a secondary document.
    pub metadata: Option<Vec<u8>>,
    /// Content of `compose.yml`; `None` when the merge produced no services.
    pub services: Option<Vec<u8>>,
    pub primary_dialect: Option<Dialect>,
    pub secondary_dialect: Option<Dialect>,
}

/// Decides the directory name for a version.
///
/// The catalog block's version wins when it is non-empty; otherwise the
/// current name is kept.
///
/// # Examples
///
/// ```
/// use catalog_migrate_core::{CatalogMetadata, compute_new_directory_name};
///
/// let catalog = CatalogMetadata { version: "1.2.0".into(), ..Default::default() };
/// assert_eq!(compute_new_directory_name(Some(&catalog), "0"), "1.2.0");
/// assert_eq!(compute_new_directory_name(None, "0"), "0");
/// ```
pub fn compute_new_directory_name(catalog: Option<&CatalogMetadata>, current: &str) -> String {
    match catalog {
        Some(catalog) if !catalog.version.is_empty() => catalog.version.clone(),
        _ => current.to_string(),
    }
}

/// Computes the migrated form of a version directory.
///
/// # Errors
///
/// Returns [`MigrateError::Parse`] if the secondary document is not valid
/// YAML or its `.catalog` block does not fit the catalog shape, and
/// [`MigrateError::Serialize`] if an output document cannot be encoded.
/// Service documents that do not parse are skipped rather than reported. A
/// primary document that exists but does not parse suppresses the service
/// file entirely, so it is never replaced by the secondary alone.
pub fn transform_version(input: &VersionInput<'_>) -> Result<VersionOutcome> {
    let current = input
        .dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let primary_dialect = input.primary.map(detect);
    let secondary_dialect = input.secondary.map(detect);

    let catalog = match input.secondary {
        Some(raw) => Some(
            CatalogMetadata::extract(raw)
                .map_err(|e| MigrateError::parse(input.dir.join(LEGACY_METADATA_FILE), e))?
                .unwrap_or_default(),
        ),
        None => None,
    };

    let new_dir_name = compute_new_directory_name(catalog.as_ref(), &current);
    let metadata = catalog.as_ref().map(CatalogMetadata::to_yaml).transpose()?;

    let primary = parse_services(input.dir, LEGACY_SERVICE_FILE, input.primary, primary_dialect);
    let secondary = parse_services(
        input.dir,
        LEGACY_METADATA_FILE,
        input.secondary,
        secondary_dialect,
    );

    let services = match merge_documents(primary.as_ref(), secondary.as_ref()) {
        _ if input.primary.is_some() && primary.is_none() => None,
        Some(merged) if merged.services().is_some_and(|s| !s.is_empty()) => Some(merged.to_yaml()?),
        _ => None,
    };

    Ok(VersionOutcome {
        new_dir_name,
        metadata,
        services,
        primary_dialect,
        secondary_dialect,
    })
}

fn parse_services(
    dir: &Path,
    file: &str,
    raw: Option<&[u8]>,
    dialect: Option<Dialect>,
) -> Option<ServiceDocument> {
    let (raw, dialect) = (raw?, dialect?);
    let document = ServiceDocument::parse(raw, dialect);
    if document.is_none() {
        debug!(dir = %dir.display(), file, ?dialect, "Document does not fit its dialect, skipping services");
    }
    document
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::model::ServiceMap;

    use super::*;

    fn run(dir: &str, primary: Option<&str>, secondary: Option<&str>) -> VersionOutcome {
        let dir = PathBuf::from(dir);
        transform_version(&VersionInput {
            dir: &dir,
            primary: primary.map(str::as_bytes),
            secondary: secondary.map(str::as_bytes),
        })
        .unwrap()
    }

    fn services(outcome: &VersionOutcome) -> ServiceMap {
        let raw = outcome.services.as_ref().expect("service document");
        let doc = ServiceDocument::parse(raw, detect(raw)).unwrap();
        doc.services().cloned().unwrap()
    }

    #[test]
    fn test_legacy_pair_is_merged_and_renamed() {
        let outcome = run(
            "templates/app/0",
            Some("app:\n  image: a:1\n"),
            Some(".catalog:\n  name: app\n  version: 1.2.0\napp:\n  ports:\n  - 8080\n"),
        );

        assert_eq!(outcome.new_dir_name, "1.2.0");
        assert_eq!(
            outcome.metadata.as_deref(),
            Some(b"name: app\nversion: 1.2.0\n".as_slice())
        );
        let merged = services(&outcome);
        assert_eq!(
            merged,
            serde_yaml::from_str::<ServiceMap>("app:\n  image: a:1\n  ports: [8080]\n").unwrap()
        );
        assert_eq!(outcome.primary_dialect, Some(Dialect::Legacy));
        assert_eq!(outcome.secondary_dialect, Some(Dialect::Legacy));
    }

    #[test]
    fn test_missing_catalog_version_keeps_directory_name() {
        let outcome = run(
            "templates/app/3",
            Some("app:\n  image: a:1\n"),
            Some(".catalog:\n  name: app\napp:\n  scale: 1\n"),
        );
        assert_eq!(outcome.new_dir_name, "3");
    }

    #[test]
    fn test_missing_catalog_block_writes_empty_metadata() {
        let outcome = run("templates/app/1", None, Some("app:\n  scale: 1\n"));
        assert_eq!(outcome.new_dir_name, "1");
        assert_eq!(outcome.metadata.as_deref(), Some(b"{}\n".as_slice()));
    }

    #[test]
    fn test_missing_primary_uses_secondary_services() {
        let outcome = run(
            "templates/app/0",
            None,
            Some(".catalog:\n  version: 2.0.0\napp:\n  ports: [8080]\n"),
        );
        assert_eq!(outcome.new_dir_name, "2.0.0");
        assert!(outcome.metadata.is_some());
        let merged = services(&outcome);
        assert_eq!(merged.len(), 1);
        assert!(merged["app"].contains_key("ports"));
        assert_eq!(outcome.primary_dialect, None);
    }

    #[test]
    fn test_missing_secondary_has_no_metadata() {
        let outcome = run("templates/app/5", Some("app:\n  image: a:1\n"), None);
        assert_eq!(outcome.new_dir_name, "5");
        assert!(outcome.metadata.is_none());
        assert!(outcome.services.is_some());
    }

    #[test]
    fn test_normalized_primary_keeps_its_shape() {
        let outcome = run(
            "templates/app/0",
            Some("version: '2'\nservices:\n  web:\n    image: nginx\nvolumes:\n  data: {}\n"),
            Some(".catalog:\n  version: 1.0.0\nweb:\n  scale: 2\n"),
        );
        let raw = String::from_utf8(outcome.services.clone().unwrap()).unwrap();
        assert!(raw.starts_with("version: '2'\n"));
        assert!(raw.contains("volumes:"));
        assert!(!raw.contains(".catalog"));
        assert_eq!(services(&outcome)["web"].len(), 2);
        assert_eq!(outcome.primary_dialect, Some(Dialect::Normalized));
    }

    #[test]
    fn test_normalized_secondary_merges_into_legacy_primary() {
        let outcome = run(
            "templates/app/0",
            Some("web:\n  image: nginx\n"),
            Some("version: '2'\n.catalog:\n  version: 1.0.0\nservices:\n  web:\n    scale: 2\n"),
        );
        let raw = String::from_utf8(outcome.services.clone().unwrap()).unwrap();
        assert!(!raw.contains("services:"));
        assert_eq!(services(&outcome)["web"].len(), 2);
        assert_eq!(outcome.secondary_dialect, Some(Dialect::Normalized));
    }

    #[test]
    fn test_unparseable_services_produce_no_service_file() {
        let outcome = run(
            "templates/app/0",
            Some("app: just-a-string\n"),
            Some(".catalog:\n  version: 1.0.0\n"),
        );
        assert!(outcome.services.is_none());
        assert!(outcome.metadata.is_some());
    }

    #[test]
    fn test_unparseable_primary_is_not_replaced_by_secondary() {
        let outcome = run(
            "templates/app/0",
            Some("version: '3'\nservices:\n  app:\n    image: a:1\n"),
            Some(".catalog:\n  version: 1.0.0\napp:\n  scale: 2\n"),
        );
        assert!(outcome.services.is_none());
        assert_eq!(outcome.new_dir_name, "1.0.0");
        assert_eq!(outcome.primary_dialect, Some(Dialect::Legacy));
    }

    #[test]
    fn test_invalid_catalog_block_is_an_error() {
        let dir = PathBuf::from("templates/app/0");
        let err = transform_version(&VersionInput {
            dir: &dir,
            primary: None,
            secondary: Some(b".catalog:\n  questions: nope\n"),
        })
        .unwrap_err();
        assert!(matches!(err, MigrateError::Parse { .. }));
    }
}
