//! Template and catalog transforms.
//!
//! [`Transformer`] walks a discovered [`Catalog`] sequentially and applies
//! each migration step through a [`DocumentStore`]. The first failure stops
//! the whole catalog; side effects already applied are left in place.

use std::path::{Component, Path};

use tracing::{debug, info, info_span, warn};

use crate::catalog::{Catalog, TEMPLATE_FILE, Template, Version, icon_file_name};
use crate::error::{MigrateError, Result};
use crate::metadata::migrate_template_metadata;
use crate::model::TemplateMetadata;
use crate::report::{MigrationReport, VersionRecord};
use crate::store::DocumentStore;
use crate::version::{
    LEGACY_METADATA_FILE, LEGACY_SERVICE_FILE, METADATA_FILE, SERVICE_FILE, VersionInput,
    transform_version,
};

/// Caller-supplied switches for a transform run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    /// Keep legacy files next to the newly written ones.
    pub preserve: bool,
}

/// Applies catalog, template and version migrations through a store.
pub struct Transformer<S> {
    store: S,
    options: TransformOptions,
    report: MigrationReport,
}

impl<S: DocumentStore> Transformer<S> {
    /// Creates a transformer writing through `store`.
    pub fn new(store: S, options: TransformOptions) -> Self {
        Self {
            store,
            options,
            report: MigrationReport::default(),
        }
    }

    /// Report of the current or most recent run, including partial progress
    /// after a failure.
    pub fn report(&self) -> &MigrationReport {
        &self.report
    }

    /// Consumes the transformer, returning its store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Transforms every template of `catalog` in discovery order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any template; later templates are
    /// not attempted.
    pub fn transform_catalog(&mut self, catalog: &Catalog) -> Result<MigrationReport> {
        let span = info_span!("catalog", root = %catalog.root.display());
        let _enter = span.enter();

        self.report = MigrationReport::new(&catalog.root);
        for template in &catalog.templates {
            self.transform_template(template)?;
        }
        info!(
            templates = self.report.templates,
            versions = self.report.versions.len(),
            renamed = self.report.directories_renamed,
            "Catalog transformed"
        );
        Ok(self.report.clone())
    }

    /// Migrates a template's metadata and icon, then each of its versions.
    pub fn transform_template(&mut self, template: &Template) -> Result<()> {
        let span = info_span!("template", dir = %template.dir.display());
        let _enter = span.enter();

        match &template.metadata {
            Some(source) => {
                let legacy = TemplateMetadata::from_yaml(&source.bytes)
                    .map_err(|e| MigrateError::parse(&source.path, e))?;
                let migrated = migrate_template_metadata(legacy);
                let target = template.dir.join(TEMPLATE_FILE);
                self.write(&target, &migrated.to_yaml()?)?;
                if !self.options.preserve {
                    self.remove(&source.path)?;
                }
            }
            None => {
                warn!("Template has no metadata document, skipping metadata migration");
                self.report.templates_without_metadata += 1;
            }
        }

        if let Some(icon) = &template.icon {
            let name = icon
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let target = icon.with_file_name(icon_file_name(&name));
            if target != *icon {
                self.store.rename(icon, &target)?;
                debug!(from = %icon.display(), to = %target.display(), "Moved icon");
                self.report.icons_moved += 1;
            }
        }

        for version in &template.versions {
            self.transform_version(version)?;
        }
        self.report.templates += 1;
        Ok(())
    }

    /// Migrates one version directory.
    ///
    /// Order: rename the directory, write `template-version.yml`, drop
    /// `rancher-compose.yml`, write `compose.yml`, drop `docker-compose.yml`.
    /// Legacy files are only removed when not preserving, and
    /// `docker-compose.yml` only when it existed and a merged file replaced it.
    pub fn transform_version(&mut self, version: &Version) -> Result<()> {
        let span = info_span!("version", dir = %version.dir.display());
        let _enter = span.enter();

        let outcome = transform_version(&VersionInput {
            dir: &version.dir,
            primary: version.primary.as_deref(),
            secondary: version.secondary.as_deref(),
        })?;

        let mut dir = version.dir.clone();
        let current = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if outcome.new_dir_name != current {
            if !is_plain_name(&outcome.new_dir_name) {
                return Err(MigrateError::InvalidDirectoryName(outcome.new_dir_name));
            }
            let target = dir.with_file_name(&outcome.new_dir_name);
            if self.store.exists(&target) {
                return Err(MigrateError::DirectoryConflict(target));
            }
            self.store.rename(&dir, &target)?;
            info!(to = %target.display(), "Renamed version directory");
            self.report.directories_renamed += 1;
            dir = target;
        }

        if let Some(metadata) = &outcome.metadata {
            self.write(&dir.join(METADATA_FILE), metadata)?;
            if !self.options.preserve {
                self.remove(&dir.join(LEGACY_METADATA_FILE))?;
            }
        } else {
            warn!("Version has no {LEGACY_METADATA_FILE}, no {METADATA_FILE} written");
        }

        if let Some(services) = &outcome.services {
            self.write(&dir.join(SERVICE_FILE), services)?;
            if !self.options.preserve && version.primary.is_some() {
                self.remove(&dir.join(LEGACY_SERVICE_FILE))?;
            }
        } else {
            debug!("No services to merge, {SERVICE_FILE} not written");
        }

        self.report.versions.push(VersionRecord {
            from: version.dir.clone(),
            to: dir,
            primary_dialect: outcome.primary_dialect,
            secondary_dialect: outcome.secondary_dialect,
            services_written: outcome.services.is_some(),
        });
        Ok(())
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.store.write(path, bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Wrote document");
        self.report.files_written += 1;
        Ok(())
    }

    fn remove(&mut self, path: &Path) -> Result<()> {
        self.store.remove(path)?;
        debug!(path = %path.display(), "Removed legacy document");
        self.report.files_removed += 1;
        Ok(())
    }
}

/// A single normal path component: no separators, `.` or `..`.
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::catalog::{LEGACY_TEMPLATE_FILE, SourceFile};
    use crate::store::memory::MemoryStore;

    use super::*;

    const PRIMARY: &str = "app:\n  image: a:1\n";
    const SECONDARY: &str = ".catalog:\n  name: app\n  version: 1.2.0\napp:\n  ports:\n  - 8080\n";
    const CONFIG: &str = "name: App\nversion: 1.2.0\ncategory: Test\nprojectURL: https://example.com\n";

    fn version(dir: &str, primary: Option<&str>, secondary: Option<&str>) -> Version {
        Version {
            dir: PathBuf::from(dir),
            primary: primary.map(|s| s.as_bytes().to_vec()),
            secondary: secondary.map(|s| s.as_bytes().to_vec()),
        }
    }

    fn seeded_store(version: &Version) -> MemoryStore {
        let mut store = MemoryStore::default();
        if let Some(bytes) = &version.primary {
            store
                .files
                .insert(version.dir.join(LEGACY_SERVICE_FILE), bytes.clone());
        }
        if let Some(bytes) = &version.secondary {
            store
                .files
                .insert(version.dir.join(LEGACY_METADATA_FILE), bytes.clone());
        }
        store
    }

    fn sample_template() -> (Template, MemoryStore) {
        let v = version("cat/templates/app/0", Some(PRIMARY), Some(SECONDARY));
        let store = seeded_store(&v)
            .with_file("cat/templates/app/config.yml", CONFIG)
            .with_file("cat/templates/app/catalogIcon-app.svg", "<svg/>");
        let template = Template {
            dir: PathBuf::from("cat/templates/app"),
            metadata: Some(SourceFile {
                path: PathBuf::from("cat/templates/app").join(LEGACY_TEMPLATE_FILE),
                bytes: CONFIG.as_bytes().to_vec(),
            }),
            icon: Some(PathBuf::from("cat/templates/app/catalogIcon-app.svg")),
            versions: vec![v],
        };
        (template, store)
    }

    #[test]
    fn test_version_is_renamed_and_merged() {
        let v = version("cat/templates/app/0", Some(PRIMARY), Some(SECONDARY));
        let mut transformer = Transformer::new(seeded_store(&v), TransformOptions::default());
        transformer.transform_version(&v).unwrap();

        let store = transformer.into_store();
        let dir = Path::new("cat/templates/app/1.2.0");
        assert_eq!(
            store.text(dir.join(METADATA_FILE)).as_deref(),
            Some("name: app\nversion: 1.2.0\n")
        );
        assert_eq!(
            store.text(dir.join(SERVICE_FILE)).as_deref(),
            Some("app:\n  image: a:1\n  ports:\n  - 8080\n")
        );
        assert!(!store.exists(&dir.join(LEGACY_SERVICE_FILE)));
        assert!(!store.exists(&dir.join(LEGACY_METADATA_FILE)));
        assert!(!store.exists(Path::new("cat/templates/app/0")));
    }

    #[test]
    fn test_version_preserve_keeps_legacy_files() {
        let v = version("cat/templates/app/0", Some(PRIMARY), Some(SECONDARY));
        let options = TransformOptions { preserve: true };
        let mut transformer = Transformer::new(seeded_store(&v), options);
        transformer.transform_version(&v).unwrap();

        let store = transformer.into_store();
        let dir = Path::new("cat/templates/app/1.2.0");
        assert!(store.exists(&dir.join(LEGACY_SERVICE_FILE)));
        assert!(store.exists(&dir.join(LEGACY_METADATA_FILE)));
        assert!(store.exists(&dir.join(SERVICE_FILE)));
    }

    #[test]
    fn test_version_without_catalog_version_keeps_directory() {
        let v = version(
            "cat/templates/app/4",
            Some(PRIMARY),
            Some(".catalog:\n  name: app\n"),
        );
        let mut transformer = Transformer::new(seeded_store(&v), TransformOptions::default());
        transformer.transform_version(&v).unwrap();

        assert_eq!(transformer.report().directories_renamed, 0);
        let store = transformer.into_store();
        assert!(store.exists(Path::new("cat/templates/app/4/template-version.yml")));
        assert!(store.exists(Path::new("cat/templates/app/4/compose.yml")));
    }

    #[test]
    fn test_version_missing_primary_is_not_removed() {
        let v = version("cat/templates/app/0", None, Some(SECONDARY));
        let mut transformer = Transformer::new(seeded_store(&v), TransformOptions::default());
        transformer.transform_version(&v).unwrap();

        let store = transformer.into_store();
        assert_eq!(
            store.text("cat/templates/app/1.2.0/compose.yml").as_deref(),
            Some("app:\n  ports:\n  - 8080\n")
        );
    }

    #[test]
    fn test_version_rename_conflict_is_an_error() {
        let v = version("cat/templates/app/0", Some(PRIMARY), Some(SECONDARY));
        let store = seeded_store(&v).with_file("cat/templates/app/1.2.0/compose.yml", "{}");
        let mut transformer = Transformer::new(store, TransformOptions::default());

        let err = transformer.transform_version(&v).unwrap_err();
        assert!(matches!(err, MigrateError::DirectoryConflict(_)));
    }

    #[test]
    fn test_version_rejects_path_like_catalog_version() {
        let v = version(
            "cat/templates/app/0",
            None,
            Some(".catalog:\n  version: ../escape\n"),
        );
        let mut transformer = Transformer::new(seeded_store(&v), TransformOptions::default());
        let err = transformer.transform_version(&v).unwrap_err();
        assert!(matches!(err, MigrateError::InvalidDirectoryName(_)));
    }

    #[test]
    fn test_template_migrates_metadata_icon_and_versions() {
        let (template, store) = sample_template();
        let mut transformer = Transformer::new(store, TransformOptions::default());
        transformer.transform_template(&template).unwrap();

        let report = transformer.report().clone();
        assert_eq!(report.templates, 1);
        assert_eq!(report.icons_moved, 1);
        assert_eq!(report.versions.len(), 1);

        let store = transformer.into_store();
        assert_eq!(
            store.text("cat/templates/app/template.yml").as_deref(),
            Some("name: App\ndefault_version: 1.2.0\ncategory: Test\nproject_url: https://example.com\n")
        );
        assert!(!store.exists(Path::new("cat/templates/app/config.yml")));
        assert_eq!(store.text("cat/templates/app/icon.svg").as_deref(), Some("<svg/>"));
        assert!(store.exists(Path::new("cat/templates/app/1.2.0/compose.yml")));
    }

    #[test]
    fn test_template_without_metadata_still_migrates_versions() {
        let (mut template, store) = sample_template();
        template.metadata = None;
        let mut transformer = Transformer::new(store, TransformOptions::default());
        transformer.transform_template(&template).unwrap();

        assert_eq!(transformer.report().templates_without_metadata, 1);
        assert!(transformer.into_store().exists(Path::new("cat/templates/app/1.2.0")));
    }

    #[test]
    fn test_catalog_stops_at_first_error() {
        let (good, mut store) = sample_template();
        let bad_version = version("cat/templates/bad/0", None, Some(".catalog: [oops]\n"));
        store = store.with_file("cat/templates/bad/0/rancher-compose.yml", ".catalog: [oops]\n");
        let bad = Template {
            dir: PathBuf::from("cat/templates/bad"),
            versions: vec![bad_version],
            ..Template::default()
        };
        let (mut later, _) = sample_template();
        later.dir = PathBuf::from("cat/templates/later");

        let catalog = Catalog {
            root: PathBuf::from("cat"),
            templates: vec![good, bad, later],
        };
        let mut transformer = Transformer::new(store, TransformOptions::default());
        let err = transformer.transform_catalog(&catalog).unwrap_err();
        assert!(matches!(err, MigrateError::Parse { .. }));

        // the first template stays migrated, the last one was never attempted
        assert_eq!(transformer.report().templates, 1);
        let store = transformer.into_store();
        assert!(store.exists(Path::new("cat/templates/app/template.yml")));
        assert!(!store.exists(Path::new("cat/templates/later/template.yml")));
    }
}
