//! Error types for stats loading and bundle resolution.
//!
//! One tagged enum covers every failure mode so callers can pattern-match on
//! the kind instead of parsing message strings: file access, parsing, build
//! failures reported by webpack itself, malformed stats, missing bundles,
//! polling deadlines, and configuration problems.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures surfaced by configuration resolution and bundle lookup.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The stats or settings file could not be opened or read.
    #[error(
        "error reading {}: are you sure webpack generated the file and the path is correct?",
        .path.display()
    )]
    Io {
        /// Configured path of the unreadable file.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stats file is not valid JSON.
    #[error("error parsing {}: the stats file is not valid JSON", .path.display())]
    Json {
        /// Configured path of the malformed file.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The settings file is not valid YAML.
    #[error("error parsing settings file {}", .path.display())]
    Yaml {
        /// Path of the malformed settings file.
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The webpack build itself failed; details come from the stats file.
    #[error("{error} in {file}: {message}")]
    Build {
        /// Error name reported by webpack (e.g. `"SyntaxError"`).
        error: String,
        /// Source file the failure points at; empty when webpack omits it.
        file: String,
        /// Human-readable failure detail.
        message: String,
    },

    /// The stats file has a missing or unrecognized status.
    #[error(
        "the stats file does not contain valid data: make sure the \
         webpack-bundle-tracker plugin is enabled and run webpack again"
    )]
    BadStats,

    /// The requested bundle name is absent from a finished build.
    #[error("bundle {0:?} not found in the stats file")]
    BundleNotFound(String),

    /// The build was still compiling when the polling deadline expired.
    #[error(
        "webpack build still compiling after {:?}; gave up polling {}",
        .waited,
        .path.display()
    )]
    CompileTimeout {
        /// Stats file that was being polled.
        path: PathBuf,
        /// Total time spent waiting before giving up.
        waited: Duration,
    },

    /// No configuration is registered under the requested name.
    #[error("unknown webpack loader configuration {0:?}")]
    UnknownConfig(String),

    /// A duration option is negative or not a finite number of seconds.
    #[error("invalid {field} {value}: expected a non-negative number of seconds")]
    InvalidDuration {
        /// Name of the offending option.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// An ignore pattern failed to compile as a regular expression.
    #[error("invalid ignore pattern {pattern:?}")]
    InvalidIgnorePattern {
        /// The offending pattern string.
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The settings collection is not a mapping of names to option tables.
    #[error("webpack loader settings must map configuration names to option tables")]
    BadSettingsShape,
}

/// Convenience alias for results with [`LoaderError`].
pub type Result<T> = std::result::Result<T, LoaderError>;
