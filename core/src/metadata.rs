//! Template metadata migration.
//!
//! `config.yml` carries a single legacy `version` and the project link under
//! `projectURL`. The normalized `template.yml` keeps them as
//! `default_version` and `project_url`.

use crate::model::TemplateMetadata;

/// Rewrites template metadata fields into their normalized locations.
///
/// A field is only moved when its legacy slot holds a value, so applying
/// the migration to an already-migrated document leaves it unchanged.
/// Fields other than the four rewritten ones are untouched.
///
/// # Examples
///
/// ```
/// use catalog_migrate_core::{TemplateMetadata, migrate_template_metadata};
///
/// let legacy = TemplateMetadata {
///     name: "ghost".into(),
///     version: "0.11.3".into(),
///     old_project_url: "https://ghost.org".into(),
///     ..TemplateMetadata::default()
/// };
///
/// let migrated = migrate_template_metadata(legacy);
/// assert_eq!(migrated.default_version, "0.11.3");
/// assert_eq!(migrated.project_url, "https://ghost.org");
/// assert!(migrated.version.is_empty());
/// assert!(migrated.old_project_url.is_empty());
/// ```
pub fn migrate_template_metadata(mut doc: TemplateMetadata) -> TemplateMetadata {
    if !doc.version.is_empty() {
        doc.default_version = std::mem::take(&mut doc.version);
    }
    if !doc.old_project_url.is_empty() {
        doc.project_url = std::mem::take(&mut doc.old_project_url);
    }
    doc
}
