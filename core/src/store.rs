//! Document store collaborator.
//!
//! The transformers never touch the filesystem directly; every read, write,
//! removal and rename goes through a [`DocumentStore`]. The filesystem
//! implementation lives in `catalog-migrate-store`.

use std::path::Path;

use crate::error::Result;

/// Persistence operations the migration relies on.
///
/// Implementations perform each call immediately and without retry; any
/// error aborts the enclosing catalog transform.
pub trait DocumentStore {
    /// Reads a document. Returns `Ok(None)` when it does not exist.
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>>;

    /// Writes a document, replacing any existing content.
    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Removes a document.
    fn remove(&mut self, path: &Path) -> Result<()>;

    /// Renames a document or directory.
    fn rename(&mut self, from: &Path, to: &Path) -> Result<()>;

    /// Returns `true` if a document or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}
