//! Catalog discovery.
//!
//! Walks a checked-out catalog: each known category directory beneath the
//! root holds template directories, and each template directory holds one
//! subdirectory per version. Entries are sorted by name so runs are
//! deterministic.

use std::path::{Path, PathBuf};

use catalog_migrate_core::{
    Catalog, DocumentStore, ICON_PREFIX, LEGACY_METADATA_FILE, LEGACY_SERVICE_FILE,
    LEGACY_TEMPLATE_FILE, SourceFile, TEMPLATE_CATEGORIES, Template, Version,
};
use tracing::{debug, warn};

use crate::error::Result;

/// Discovers every template and version beneath `root`.
///
/// Missing category directories are skipped. A version missing one of its
/// two documents is kept with that slot empty and a warning logged.
///
/// # Errors
///
/// Returns [`IoError`](crate::StoreError::IoError) if a directory cannot
/// be listed, or a wrapped core error if a document cannot be read.
pub fn discover_catalog(root: impl AsRef<Path>, store: &impl DocumentStore) -> Result<Catalog> {
    let root = root.as_ref();
    let mut catalog = Catalog::new(root);

    for category in TEMPLATE_CATEGORIES {
        let category_dir = root.join(category);
        if !category_dir.is_dir() {
            debug!(category, "Category not present, skipping");
            continue;
        }
        for template_dir in sorted_entries(&category_dir)? {
            if template_dir.is_dir() {
                catalog.templates.push(discover_template(&template_dir, store)?);
            }
        }
    }

    debug!(
        root = %root.display(),
        templates = catalog.templates.len(),
        versions = catalog.version_count(),
        "Catalog discovered"
    );
    Ok(catalog)
}

fn discover_template(dir: &Path, store: &impl DocumentStore) -> Result<Template> {
    let mut template = Template {
        dir: dir.to_path_buf(),
        ..Template::default()
    };

    for path in sorted_entries(dir)? {
        let name = file_name(&path);
        if path.is_dir() {
            template.versions.push(discover_version(&path, store)?);
        } else if name == LEGACY_TEMPLATE_FILE {
            if let Some(bytes) = store.read(&path)? {
                template.metadata = Some(SourceFile { path, bytes });
            }
        } else if name.starts_with(ICON_PREFIX) {
            template.icon = Some(path);
        }
    }
    Ok(template)
}

fn discover_version(dir: &Path, store: &impl DocumentStore) -> Result<Version> {
    let secondary = store.read(&dir.join(LEGACY_METADATA_FILE))?;
    if secondary.is_none() {
        warn!(dir = %dir.display(), "Missing {LEGACY_METADATA_FILE}");
    }
    let primary = store.read(&dir.join(LEGACY_SERVICE_FILE))?;
    if primary.is_none() {
        warn!(dir = %dir.display(), "Missing {LEGACY_SERVICE_FILE}");
    }

    Ok(Version {
        dir: dir.to_path_buf(),
        primary,
        secondary,
    })
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        entries.push(entry?.path());
    }
    entries.sort();
    Ok(entries)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
