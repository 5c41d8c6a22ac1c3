//! Error types for catalog migration.
//!
//! Detection never fails and unparseable service documents degrade to
//! `None`, so the variants here are the fatal cases: unreadable metadata,
//! documents that cannot be re-encoded, and collaborator I/O failures.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort the transform of a catalog.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// A collaborator read, write, remove or rename failed.
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A metadata document could not be parsed into its typed shape.
    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A transformed document could not be serialized.
    #[error("YAML serialization failed: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// A version directory cannot be renamed because the target exists.
    #[error("cannot rename version directory: '{}' already exists", .0.display())]
    DirectoryConflict(PathBuf),

    /// A catalog version string cannot be used as a directory name.
    #[error("catalog version '{0}' is not a valid directory name")]
    InvalidDirectoryName(String),

    /// Failure reported by a non-filesystem store implementation.
    #[error("store error: {0}")]
    Store(String),
}

impl MigrateError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps a YAML parse error with the document path.
    pub fn parse(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for results with [`MigrateError`].
pub type Result<T> = std::result::Result<T, MigrateError>;
