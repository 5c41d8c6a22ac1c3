//! Service merging across the two documents of a version.
//!
//! The primary document (`docker-compose.yml`) and the secondary document
//! (`rancher-compose.yml`) may both describe the same services. They are
//! combined one level deep: services present in one side only are carried
//! over unchanged, and for services present in both the field maps are
//! unioned with the primary side winning on collision. Nested values are
//! replaced wholesale, never merged recursively.
//!
//! # Example
//!
//! ```
//! use catalog_migrate_core::*;
//!
//! let primary = ServiceDocument::parse(b"web:\n  image: x\n", Dialect::Legacy).unwrap();
//! let secondary =
//!     ServiceDocument::parse(b"web:\n  image: y\n  ports: [80]\n", Dialect::Legacy).unwrap();
//!
//! let merged = merge_services(primary.services(), secondary.services()).unwrap();
//! assert_eq!(merged["web"]["image"], serde_yaml::Value::from("x"));
//! assert!(merged["web"].contains_key("ports"));
//! ```

use crate::model::{ServiceDocument, ServiceMap};

/// Merges two optional service maps into a fresh map.
///
/// Neither input is modified. An absent side passes the other through
/// unchanged; when both are absent the result is `None`.
///
/// # Examples
///
/// ```
/// use catalog_migrate_core::*;
///
/// let only = ServiceDocument::parse(b"db:\n  image: postgres\n", Dialect::Legacy).unwrap();
/// assert_eq!(merge_services(None, only.services()).as_ref(), only.services());
/// assert_eq!(merge_services(only.services(), None).as_ref(), only.services());
/// assert!(merge_services(None, None).is_none());
/// ```
pub fn merge_services(
    primary: Option<&ServiceMap>,
    secondary: Option<&ServiceMap>,
) -> Option<ServiceMap> {
    let (primary, secondary) = match (primary, secondary) {
        (None, other) | (other, None) => return other.cloned(),
        (Some(primary), Some(secondary)) => (primary, secondary),
    };

    let mut merged = secondary.clone();
    for (name, fields) in primary {
        match merged.get_mut(name) {
            Some(existing) => {
                for (key, value) in fields {
                    existing.insert(key.clone(), value.clone());
                }
            }
            None => {
                merged.insert(name.clone(), fields.clone());
            }
        }
    }
    Some(merged)
}

/// Merges two optional service documents.
///
/// The result takes the primary document's shape (dialect and, for dialect
/// 2, its version tag and volumes) whenever the primary is present, for any
/// pairing of dialects. Without a primary the secondary passes through in
/// its own shape.
pub fn merge_documents(
    primary: Option<&ServiceDocument>,
    secondary: Option<&ServiceDocument>,
) -> Option<ServiceDocument> {
    let shape = primary.or(secondary)?;
    let services = merge_services(
        primary.and_then(ServiceDocument::services),
        secondary.and_then(ServiceDocument::services),
    );
    Some(shape.with_services(services))
}
