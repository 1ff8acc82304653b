//! Stats-manifest loading and bundle URL resolution for webpack builds.
//!
//! This crate lets a server-rendered Rust application reference assets
//! produced by a separate webpack build. It reads the JSON stats file a
//! build-tracker plugin writes, maps logical bundle names to emitted files,
//! drops ignorable artifacts (hot-update chunks, source maps), and rewrites
//! filenames into servable static URLs. In development it polls the stats
//! file while the build is compiling; in production it caches the parsed
//! manifest to avoid repeated disk reads.
//!
//! # Quick start
//!
//! ```no_run
//! use webpack_stats_loader::{ConfigRegistry, Loader, MemoryCache, StaticFiles};
//!
//! let registry = ConfigRegistry::with_defaults();
//! let config = registry.get("DEFAULT").unwrap();
//!
//! let loader = Loader::new(StaticFiles::new("public", "/static/"), MemoryCache::new());
//! for asset in loader.get_bundle("main", config).unwrap() {
//!     println!("{} -> {}", asset.name, asset.url);
//! }
//! ```
//!
//! # Collaborators
//!
//! The loader owns two injected capabilities:
//!
//! - [`AssetStore`] — opens non-local stats files and resolves asset URLs.
//!   [`StaticFiles`] is the filesystem-backed implementation; remote
//!   deployments implement the trait themselves.
//! - [`StatsCache`] — holds the parsed manifest under one fixed key.
//!   [`MemoryCache`] is the in-process implementation, [`NoCache`] disables
//!   caching entirely.
//!
//! Hosts with a boot-time check hook call [`startup`] to validate the
//! configuration collection and drop any manifest cached by a previous
//! process.

mod cache;
mod checks;
mod config;
mod error;
mod loader;
mod store;
mod tags;

pub use cache::{MemoryCache, NoCache, STATS_CACHE_KEY, StatsCache};
pub use checks::startup;
pub use config::{
    ConfigOverride, ConfigRegistry, DEFAULT_BUNDLE_DIR_NAME, DEFAULT_CONFIG_NAME, DEFAULT_IGNORE,
    DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT, DEFAULT_STATS_FILE, LoaderConfig, Settings,
};
pub use error::{LoaderError, Result};
pub use loader::Loader;
pub use store::{AssetStore, StaticFiles};
pub use tags::{asset_tag, render_bundle};
