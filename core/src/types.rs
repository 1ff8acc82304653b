//! Stats-manifest type definitions.
//!
//! This module defines the data model for the JSON "stats" document written
//! by a webpack build-tracker plugin. The types are designed for
//! deserialization with [`serde`] and preserve any extra per-file fields the
//! tracker emits alongside the ones this library consumes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Build state reported by the stats file.
///
/// The tracker rewrites the stats file as the build progresses, so a reader
/// can observe `Compiling` before the final `Done` or `Error`. Strings this
/// library does not recognize deserialize as [`Unknown`](BuildStatus::Unknown)
/// and are treated as invalid downstream.
///
/// # Examples
///
/// ```
/// use webpack_stats_core::{BuildStatus, Stats};
///
/// let stats: Stats = serde_json::from_str(r#"{"status": "compiling"}"#).unwrap();
/// assert_eq!(stats.status, Some(BuildStatus::Compiling));
///
/// let stats: Stats = serde_json::from_str(r#"{"status": "half-done"}"#).unwrap();
/// assert_eq!(stats.status, Some(BuildStatus::Unknown));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    /// The build is still running; the chunk listing is not final.
    Compiling,
    /// The build finished and `chunks` describes every bundle.
    Done,
    /// The build failed; `error`, `file` and `message` describe the failure.
    Error,
    /// Any status string this library does not recognize.
    #[serde(other)]
    Unknown,
}

/// One emitted file within a bundle, as recorded by the build tracker.
///
/// Only `name` is interpreted here; everything else the tracker writes
/// (public path, size, integrity hash, ...) is carried along untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Output filename relative to the bundle directory.
    pub name: String,
    /// Tracker-specific fields preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A chunk after ignore-filtering and URL resolution.
///
/// Transient: constructed per request by the loader, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Asset {
    /// Output filename relative to the bundle directory.
    pub name: String,
    /// Servable URL resolved through the configured asset store.
    pub url: String,
    /// Tracker-specific fields carried over from the source [`Chunk`].
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The parsed stats manifest.
///
/// The file is small and is always read atomically; there is no streaming
/// access. A missing `status` field is represented as `None` and rejected by
/// the bundle resolver.
///
/// # Examples
///
/// ```
/// use webpack_stats_core::{BuildStatus, Stats};
///
/// let stats: Stats = serde_json::from_str(
///     r#"{
///         "status": "done",
///         "chunks": {"main": [{"name": "main.js"}, {"name": "main.js.map"}]}
///     }"#,
/// )
/// .unwrap();
///
/// assert_eq!(stats.status, Some(BuildStatus::Done));
/// assert_eq!(stats.chunks_for("main").unwrap().len(), 2);
/// assert!(stats.chunks_for("admin").is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Build state; absent in malformed or truncated files.
    #[serde(default)]
    pub status: Option<BuildStatus>,
    /// Bundle name to emitted files, populated once the build is done.
    #[serde(default)]
    pub chunks: HashMap<String, Vec<Chunk>>,
    /// Error name when the build failed (e.g. `"SyntaxError"`).
    #[serde(default)]
    pub error: Option<String>,
    /// Source file the failure points at.
    #[serde(default)]
    pub file: Option<String>,
    /// Human-readable failure detail.
    #[serde(default)]
    pub message: Option<String>,
}

impl Stats {
    /// Looks up the emitted files for a bundle name.
    ///
    /// Returns `None` when the bundle is not present, which the resolver
    /// reports as a distinct lookup failure rather than an empty list.
    pub fn chunks_for(&self, bundle: &str) -> Option<&[Chunk]> {
        self.chunks.get(bundle).map(Vec::as_slice)
    }
}
