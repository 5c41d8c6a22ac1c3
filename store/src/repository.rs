//! Repository provider: turns a catalog URL into a local checkout.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::{debug, info};
use wait_timeout::ChildExt;

use crate::error::{Result, StoreError};

/// Branch used when a catalog URL does not name one.
pub const DEFAULT_BRANCH: &str = "master";

/// A catalog repository and branch, parsed from `endpoint[~branch]`.
///
/// # Examples
///
/// ```
/// use catalog_migrate_store::CatalogSource;
///
/// let source = CatalogSource::parse("https://github.com/rancher/community-catalog").unwrap();
/// assert_eq!(source.branch, "master");
///
/// let source = CatalogSource::parse("https://git.rancher.io/rancher-catalog~v1.6").unwrap();
/// assert_eq!(source.endpoint, "https://git.rancher.io/rancher-catalog");
/// assert_eq!(source.branch, "v1.6");
///
/// assert!(CatalogSource::parse("a~b~c").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogSource {
    pub endpoint: String,
    pub branch: String,
}

impl CatalogSource {
    /// Parses a catalog URL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidCatalogUrl`] when the URL has more than
    /// one `~`, or an empty endpoint or branch.
    pub fn parse(url: &str) -> Result<Self> {
        let parts: Vec<&str> = url.split('~').collect();
        let (endpoint, branch) = match parts.as_slice() {
            [endpoint] => (*endpoint, DEFAULT_BRANCH),
            [endpoint, branch] => (*endpoint, *branch),
            _ => return Err(StoreError::InvalidCatalogUrl(url.to_string())),
        };
        if endpoint.trim().is_empty() || branch.trim().is_empty() {
            return Err(StoreError::InvalidCatalogUrl(url.to_string()));
        }
        Ok(Self {
            endpoint: endpoint.to_string(),
            branch: branch.to_string(),
        })
    }

    /// Directory beneath `output` the catalog is cloned into:
    /// `<last endpoint segment>-<branch>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use catalog_migrate_store::CatalogSource;
    ///
    /// let source = CatalogSource::parse("https://github.com/rancher/community-catalog~v2").unwrap();
    /// assert_eq!(
    ///     source.clone_dir(Path::new("output")),
    ///     Path::new("output/community-catalog-v2")
    /// );
    /// ```
    pub fn clone_dir(&self, output: &Path) -> PathBuf {
        let name = self
            .endpoint
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.endpoint);
        output.join(format!("{name}-{}", self.branch))
    }

    /// The URL form with the branch spelled out, parseable by [`Self::parse`].
    pub fn to_url(&self) -> String {
        format!("{}~{}", self.endpoint, self.branch)
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "endpoint={}\tbranch={}", self.endpoint, self.branch)
    }
}

/// Supplies a local directory for a catalog source.
pub trait RepositoryProvider {
    /// Fetches `source` and returns the directory holding its checkout.
    fn fetch(&self, source: &CatalogSource) -> Result<PathBuf>;
}

/// Clones catalogs with the `git` executable.
#[derive(Debug, Clone)]
pub struct GitProvider {
    output: PathBuf,
    timeout: Duration,
}

impl GitProvider {
    /// Creates a provider cloning into `output`, abandoning clones that
    /// exceed `timeout`.
    pub fn new(output: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            output: output.into(),
            timeout,
        }
    }
}

impl RepositoryProvider for GitProvider {
    fn fetch(&self, source: &CatalogSource) -> Result<PathBuf> {
        let dir = source.clone_dir(&self.output);
        if let Some(parent) = dir.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        debug!(endpoint = %source.endpoint, branch = %source.branch, dir = %dir.display(), "Cloning catalog");
        let mut child = Command::new("git")
            .arg("clone")
            .arg(&source.endpoint)
            .args(["--quiet", "--single-branch", "--branch", &source.branch])
            .arg(&dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StoreError::CloneError(format!("failed to spawn git: {e}")))?;

        // Drain stderr in the background so a chatty clone cannot block on
        // a full pipe.
        let stderr_thread = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = pipe.read_to_string(&mut buf);
                buf
            })
        });

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(StoreError::CloneError(format!(
                    "timed out after {}s cloning {}",
                    self.timeout.as_secs(),
                    source.endpoint
                )));
            }
        };

        if !status.success() {
            let stderr = stderr_thread
                .and_then(|t| t.join().ok())
                .unwrap_or_default();
            return Err(StoreError::CloneError(format!(
                "[{status}] {}",
                stderr.trim()
            )));
        }

        info!(dir = %dir.display(), "Clone complete");
        Ok(dir)
    }
}

/// Uses an existing checkout as-is.
#[derive(Debug, Clone)]
pub struct LocalProvider {
    dir: PathBuf,
}

impl LocalProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RepositoryProvider for LocalProvider {
    fn fetch(&self, _source: &CatalogSource) -> Result<PathBuf> {
        if !self.dir.is_dir() {
            return Err(StoreError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("catalog directory '{}' does not exist", self.dir.display()),
            )));
        }
        Ok(self.dir.clone())
    }
}
