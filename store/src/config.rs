//! Run configuration for catalog migration.
//!
//! Every field is optional in the file; command-line flags override what is
//! loaded here.
//!
//! # Example YAML
//!
//! ```yaml
//! output_dir: output
//! preserve: true
//! clone_timeout_secs: 120
//! catalogs:
//!   - https://git.rancher.io/rancher-catalog~master
//!   - https://github.com/rancher/community-catalog
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default directory catalogs are cloned into.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default limit for a single `git clone`.
pub const DEFAULT_CLONE_TIMEOUT_SECS: u64 = 300;

/// Top-level migration configuration.
///
/// # Examples
///
/// ```
/// use catalog_migrate_store::MigrateConfig;
///
/// let config: MigrateConfig = serde_yaml::from_str("preserve: true\n").unwrap();
/// assert!(config.preserve);
/// assert_eq!(config.output_dir.to_str(), Some("output"));
/// assert!(config.catalogs.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    /// Directory catalogs are cloned into.
    pub output_dir: PathBuf,
    /// Keep legacy files next to the migrated ones.
    pub preserve: bool,
    /// Seconds before a `git clone` is abandoned.
    pub clone_timeout_secs: u64,
    /// Catalog URLs in `endpoint[~branch]` form.
    pub catalogs: Vec<String>,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            preserve: false,
            clone_timeout_secs: DEFAULT_CLONE_TIMEOUT_SECS,
            catalogs: Vec::new(),
        }
    }
}

impl MigrateConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::StoreError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::StoreError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Clone timeout as a [`Duration`].
    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_timeout_secs)
    }
}
