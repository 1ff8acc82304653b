//! Asset store capability: opening files and resolving servable URLs.
//!
//! The loader needs two things from the surrounding deployment: a way to
//! open the stats file when it is not on the local filesystem, and a way to
//! turn a relative asset path into the URL browsers fetch it from. Both are
//! expressed as one small trait so remote deployments (CDN, object storage)
//! can plug in their own implementation.

use std::io::Read;
use std::path::{Path, PathBuf};

/// Capability for reading stored files and resolving their public URLs.
pub trait AssetStore {
    /// Opens a stored file for reading.
    fn open(&self, path: &Path) -> std::io::Result<Box<dyn Read>>;
    /// Resolves a relative asset path to the URL it is served from.
    fn url(&self, path: &str) -> String;
}

impl<S: AssetStore + ?Sized> AssetStore for &S {
    fn open(&self, path: &Path) -> std::io::Result<Box<dyn Read>> {
        (**self).open(path)
    }

    fn url(&self, path: &str) -> String {
        (**self).url(path)
    }
}

/// Filesystem-backed store serving files under a fixed base URL.
///
/// `open` resolves paths against `root`; `url` joins the path onto
/// `base_url` (normalized to end with a single slash).
///
/// # Examples
///
/// ```
/// use webpack_stats_loader::{AssetStore, StaticFiles};
///
/// let store = StaticFiles::new("public", "/static");
/// assert_eq!(store.url("webpack_bundles/main.js"), "/static/webpack_bundles/main.js");
/// ```
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    base_url: String,
}

impl StaticFiles {
    /// Creates a store rooted at `root`, serving under `base_url`.
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            root: root.into(),
            base_url,
        }
    }

    /// Returns the filesystem root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetStore for StaticFiles {
    fn open(&self, path: &Path) -> std::io::Result<Box<dyn Read>> {
        let file = std::fs::File::open(self.root.join(path))?;
        Ok(Box::new(file))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}
