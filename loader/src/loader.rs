//! Stats-manifest loading, caching, and bundle resolution.
//!
//! [`Loader`] ties the pieces together: it reads the stats file through the
//! configured access mode, consults the injected cache, optionally polls
//! while webpack is still compiling, and turns a bundle's chunk list into
//! ignore-filtered, URL-resolved assets.
//!
//! # Loading patterns
//!
//! ```no_run
//! use webpack_stats_loader::{ConfigRegistry, Loader, MemoryCache, StaticFiles};
//!
//! let registry = ConfigRegistry::with_defaults();
//! let config = registry.get("DEFAULT").unwrap();
//!
//! let loader = Loader::new(StaticFiles::new("public", "/static/"), MemoryCache::new());
//! for asset in loader.get_bundle("main", config).unwrap() {
//!     println!("<script src=\"{}\"></script>", asset.url);
//! }
//! ```

use std::io::{BufReader, Read};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use webpack_stats_core::{Asset, BuildStatus, Chunk, Stats};

use crate::cache::{STATS_CACHE_KEY, StatsCache};
use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};
use crate::store::AssetStore;

/// Loads stats manifests and resolves bundles into servable assets.
///
/// Owns its collaborators: an [`AssetStore`] for non-local reads and URL
/// resolution, and a [`StatsCache`] for the parsed manifest. The `debug`
/// flag selects development behavior: poll while the build is compiling and
/// never populate the cache.
pub struct Loader<S, C> {
    store: S,
    cache: C,
    debug: bool,
}

impl<S: AssetStore, C: StatsCache> Loader<S, C> {
    /// Creates a production-mode loader.
    pub fn new(store: S, cache: C) -> Self {
        Self {
            store,
            cache,
            debug: false,
        }
    }

    /// Sets development mode.
    ///
    /// In development the loader re-reads the stats file on every call and
    /// polls while the build reports `compiling`.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Returns the asset store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the parsed stats manifest for `config`.
    ///
    /// A cached manifest is returned without touching disk. On a miss the
    /// file is read through the configured access mode and, outside debug
    /// mode, the parsed result is cached under [`STATS_CACHE_KEY`] with no
    /// expiration.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Io`] when the file cannot be opened or read,
    /// or [`LoaderError::Json`] when it is not valid stats JSON.
    pub fn get_assets(&self, config: &LoaderConfig) -> Result<Arc<Stats>> {
        if let Some(stats) = self.cache.get(STATS_CACHE_KEY) {
            debug!(key = STATS_CACHE_KEY, "stats cache hit");
            return Ok(stats);
        }

        let stats = Arc::new(self.read_stats(config)?);
        if !self.debug {
            self.cache.set(STATS_CACHE_KEY, Arc::clone(&stats));
        }
        Ok(stats)
    }

    fn read_stats(&self, config: &LoaderConfig) -> Result<Stats> {
        let path = &config.stats_file;

        let reader: Box<dyn Read> = if config.local {
            Box::new(
                std::fs::File::open(path).map_err(|source| LoaderError::Io {
                    path: path.clone(),
                    source,
                })?,
            )
        } else {
            self.store.open(path).map_err(|source| LoaderError::Io {
                path: path.clone(),
                source,
            })?
        };

        let stats = serde_json::from_reader(BufReader::new(reader)).map_err(|source| {
            LoaderError::Json {
                path: path.clone(),
                source,
            }
        })?;
        debug!(path = %path.display(), local = config.local, "loaded webpack stats");
        Ok(stats)
    }

    /// Resolves a bundle into a lazy sequence of servable assets.
    ///
    /// In debug mode this blocks while the stats file reports `compiling`,
    /// re-reading it every `poll_interval` until the build settles or the
    /// configured `poll_timeout` deadline expires. Outside debug mode the
    /// manifest (usually cached) is trusted as final and no polling happens.
    ///
    /// The returned iterator is single-pass: each chunk is tested against
    /// the configured ignore patterns, and survivors are resolved to URLs
    /// through the asset store as they are yielded.
    ///
    /// # Errors
    ///
    /// - [`LoaderError::BundleNotFound`] — the build finished but has no
    ///   bundle under `bundle_name`.
    /// - [`LoaderError::Build`] — webpack reported a build failure.
    /// - [`LoaderError::BadStats`] — the status field is missing or invalid.
    /// - [`LoaderError::CompileTimeout`] — the polling deadline expired.
    /// - [`LoaderError::Io`] / [`LoaderError::Json`] — the stats file could
    ///   not be read.
    pub fn get_bundle<'a>(
        &'a self,
        bundle_name: &str,
        config: &'a LoaderConfig,
    ) -> Result<impl Iterator<Item = Asset> + use<'a, S, C>> {
        let mut stats = self.get_assets(config)?;

        if self.debug {
            // Block the caller until the build settles; the bundle cannot be
            // rendered from a half-written chunk list.
            let started = Instant::now();
            while stats.status == Some(BuildStatus::Compiling) {
                if let Some(deadline) = config.poll_timeout {
                    if started.elapsed() >= deadline {
                        warn!(
                            path = %config.stats_file.display(),
                            "gave up waiting for webpack build"
                        );
                        return Err(LoaderError::CompileTimeout {
                            path: config.stats_file.clone(),
                            waited: started.elapsed(),
                        });
                    }
                }
                debug!(
                    path = %config.stats_file.display(),
                    interval = ?config.poll_interval,
                    "webpack still compiling"
                );
                std::thread::sleep(config.poll_interval);
                stats = self.get_assets(config)?;
            }
        }

        let chunks: Vec<Chunk> = match stats.status {
            Some(BuildStatus::Done) => stats
                .chunks_for(bundle_name)
                .ok_or_else(|| LoaderError::BundleNotFound(bundle_name.to_string()))?
                .to_vec(),
            Some(BuildStatus::Error) => {
                return Err(LoaderError::Build {
                    error: stats.error.clone().unwrap_or_default(),
                    file: stats.file.clone().unwrap_or_default(),
                    message: stats.message.clone().unwrap_or_default(),
                });
            }
            Some(BuildStatus::Compiling) | Some(BuildStatus::Unknown) | None => {
                return Err(LoaderError::BadStats);
            }
        };

        Ok(chunks
            .into_iter()
            .filter_map(move |chunk| self.resolve_chunk(chunk, config)))
    }

    fn resolve_chunk(&self, chunk: Chunk, config: &LoaderConfig) -> Option<Asset> {
        if config.is_ignored(&chunk.name) {
            return None;
        }
        let url = self.store.url(&config.asset_path(&chunk.name));
        Some(Asset {
            name: chunk.name,
            url,
            extra: chunk.extra,
        })
    }

    /// Collects a bundle's assets, optionally keeping one file extension.
    ///
    /// `extension` is matched against the end of the filename, so
    /// `Some("js")` keeps `main.js` but drops `styles.css` (and also drops
    /// `main.js.map`, which the default ignore patterns remove first).
    ///
    /// # Errors
    ///
    /// Same failure modes as [`get_bundle`](Self::get_bundle).
    pub fn get_files(
        &self,
        bundle_name: &str,
        extension: Option<&str>,
        config: &LoaderConfig,
    ) -> Result<Vec<Asset>> {
        let assets = self.get_bundle(bundle_name, config)?;
        Ok(match extension {
            Some(ext) => {
                let suffix = format!(".{ext}");
                assets.filter(|a| a.name.ends_with(&suffix)).collect()
            }
            None => assets.collect(),
        })
    }
}
