//! In-memory view of a checked-out catalog tree.
//!
//! Built by a directory walk (see `catalog-migrate-store`) and consumed by
//! [`Transformer`](crate::Transformer). Paths are the locations at discovery
//! time; renames performed during the transform are not reflected back.

use std::path::{Path, PathBuf};

/// Category directories scanned beneath the catalog root, in order.
pub const TEMPLATE_CATEGORIES: [&str; 4] = [
    "infra-templates",
    "templates",
    "swarm-templates",
    "mesos-templates",
];

/// Legacy template metadata filename.
pub const LEGACY_TEMPLATE_FILE: &str = "config.yml";
/// Migrated template metadata filename.
pub const TEMPLATE_FILE: &str = "template.yml";
/// Filename prefix identifying a template icon.
pub const ICON_PREFIX: &str = "catalogIcon-";

/// A document read from disk, with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// One version directory and the raw bytes of its two documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Version {
    pub dir: PathBuf,
    /// `docker-compose.yml`, if present.
    pub primary: Option<Vec<u8>>,
    /// `rancher-compose.yml`, if present.
    pub secondary: Option<Vec<u8>>,
}

/// A template family directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    pub dir: PathBuf,
    /// `config.yml`, if present.
    pub metadata: Option<SourceFile>,
    /// `catalogIcon-*` file, if present.
    pub icon: Option<PathBuf>,
    pub versions: Vec<Version>,
}

/// The root of a checked-out catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub root: PathBuf,
    pub templates: Vec<Template>,
}

impl Catalog {
    /// Creates an empty catalog rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            templates: Vec::new(),
        }
    }

    /// Total number of versions across all templates.
    pub fn version_count(&self) -> usize {
        self.templates.iter().map(|t| t.versions.len()).sum()
    }
}

/// Returns the normalized icon filename for `name`.
///
/// The extension is whatever follows the last `.`; a name without one is
/// used whole.
///
/// # Examples
///
/// ```
/// use catalog_migrate_core::icon_file_name;
///
/// assert_eq!(icon_file_name("catalogIcon-nginx.svg"), "icon.svg");
/// assert_eq!(icon_file_name("catalogIcon-app.tar.png"), "icon.png");
/// ```
pub fn icon_file_name(name: &str) -> String {
    let extension = name.rsplit('.').next().unwrap_or(name);
    format!("icon.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_file_name_without_extension_uses_whole_name() {
        assert_eq!(icon_file_name("catalogIcon-logo"), "icon.catalogIcon-logo");
    }

    #[test]
    fn test_version_count() {
        let mut catalog = Catalog::new("root");
        catalog.templates.push(Template {
            versions: vec![Version::default(), Version::default()],
            ..Template::default()
        });
        catalog.templates.push(Template::default());
        assert_eq!(catalog.version_count(), 2);
    }
}
