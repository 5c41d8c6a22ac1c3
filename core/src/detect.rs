//! Dialect detection for per-version documents.
//!
//! Only the top-level `version` field is inspected. Legacy documents usually
//! carry no marker at all, so anything that is not exactly the string `"2"`
//! (including input that is not YAML) is classified as [`Dialect::Legacy`].
//!
//! # Examples
//!
//! ```
//! use catalog_migrate_core::{Dialect, detect};
//!
//! assert_eq!(detect(b"version: '2'\nservices: {}\n"), Dialect::Normalized);
//! assert_eq!(detect(b"web:\n  image: nginx\n"), Dialect::Legacy);
//! assert_eq!(detect(b"version: 2\n"), Dialect::Legacy);
//! ```

use serde_yaml::Value;

use crate::model::Dialect;

/// Classifies a raw document as dialect 1 or dialect 2. Never fails.
pub fn detect(raw: &[u8]) -> Dialect {
    let Ok(document) = serde_yaml::from_slice::<Value>(raw) else {
        return Dialect::Legacy;
    };

    match document.get("version").and_then(Value::as_str) {
        Some("2") => Dialect::Normalized,
        _ => Dialect::Legacy,
    }
}
