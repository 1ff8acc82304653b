//! Core stats-manifest types and settings validation.
//!
//! This crate defines the data model for the JSON "stats" document a webpack
//! build-tracker plugin writes as the build progresses:
//!
//! - [`Stats`] — the parsed manifest (build status, bundle-to-file mapping,
//!   failure details).
//! - [`BuildStatus`] — the tracker's reported build state.
//! - [`Chunk`] — one emitted file within a bundle.
//! - [`Asset`] — a chunk after ignore-filtering and URL resolution.
//!
//! Settings validation ([`validate_settings`]) checks the shape of a
//! user-supplied configuration collection and reports diagnostics a host can
//! surface from its startup checks.
//!
//! # Example
//!
//! ```
//! use webpack_stats_core::{BuildStatus, Stats};
//!
//! let stats: Stats = serde_json::from_str(
//!     r#"{"status": "done", "chunks": {"main": [{"name": "main.js"}]}}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(stats.status, Some(BuildStatus::Done));
//! assert_eq!(stats.chunks_for("main").unwrap()[0].name, "main.js");
//! ```

mod types;
mod validate;

pub use types::{Asset, BuildStatus, Chunk, Stats};
pub use validate::{CheckError, validate_settings};
