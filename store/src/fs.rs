//! Filesystem-backed [`DocumentStore`].

use std::io::ErrorKind;
use std::path::Path;

use catalog_migrate_core::{DocumentStore, MigrateError};

/// Reads and writes documents directly on the local filesystem.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use catalog_migrate_core::DocumentStore;
/// use catalog_migrate_store::FsStore;
///
/// let mut store = FsStore;
/// let config = store.read(Path::new("templates/wordpress/config.yml")).unwrap();
/// if let Some(bytes) = config {
///     store.write(Path::new("templates/wordpress/template.yml"), &bytes).unwrap();
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl DocumentStore for FsStore {
    fn read(&self, path: &Path) -> catalog_migrate_core::Result<Option<Vec<u8>>> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MigrateError::io(path, e)),
        }
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> catalog_migrate_core::Result<()> {
        std::fs::write(path, bytes).map_err(|e| MigrateError::io(path, e))
    }

    fn remove(&mut self, path: &Path) -> catalog_migrate_core::Result<()> {
        std::fs::remove_file(path).map_err(|e| MigrateError::io(path, e))
    }

    fn rename(&mut self, from: &Path, to: &Path) -> catalog_migrate_core::Result<()> {
        std::fs::rename(from, to).map_err(|e| MigrateError::io(from, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(FsStore.read(&dir.path().join("absent.yml")).unwrap(), None);
    }

    #[test]
    fn test_write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.yml");
        let mut store = FsStore;

        store.write(&path, b"name: x\n").unwrap();
        assert_eq!(store.read(&path).unwrap().as_deref(), Some(b"name: x\n".as_slice()));
        store.remove(&path).unwrap();
        assert!(!store.exists(&path));
    }

    #[test]
    fn test_rename_directory() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("0");
        std::fs::create_dir(&from).unwrap();
        std::fs::write(from.join("docker-compose.yml"), "a: {}\n").unwrap();

        let to = dir.path().join("1.0.0");
        FsStore.rename(&from, &to).unwrap();
        assert!(to.join("docker-compose.yml").exists());
        assert!(!from.exists());
    }

    #[test]
    fn test_remove_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsStore.remove(&dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(err, MigrateError::Io { .. }));
    }
}
