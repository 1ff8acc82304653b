//! Loader settings validation.
//!
//! Validates the shape of the user-supplied configuration collection before
//! it is resolved into loader configurations: the collection must be a
//! mapping of configuration names to option tables. Diagnostics are data,
//! not panics, so a host can report them from its startup-check hook without
//! halting the process.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use webpack_stats_core::validate_settings;
//!
//! let good = json!({"DEFAULT": {"stats_file": "webpack-stats.json"}});
//! assert!(validate_settings(&good).is_empty());
//!
//! let bad = json!({"DEFAULT": "webpack-stats.json"});
//! assert_eq!(validate_settings(&bad).len(), 1);
//! ```

use serde_json::Value;
use thiserror::Error;

/// Settings-shape diagnostics.
///
/// Each variant describes one way the configuration collection can be
/// malformed. The `Display` impl provides the message a host surfaces to
/// the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// The collection itself is not a mapping of names to tables.
    #[error("webpack loader settings must map configuration names to option tables")]
    NotAMapping,
    /// A named entry is not an option table (e.g. a bare string).
    #[error("webpack loader configuration {0:?} is not an option table")]
    NotATable(String),
}

/// Validates the raw configuration collection.
///
/// Returns at most one diagnostic: validation stops at the first failure,
/// since a malformed collection makes further checks meaningless. A `null`
/// collection is healthy: it means the caller supplied no overrides and the
/// built-in defaults apply.
pub fn validate_settings(raw: &Value) -> Vec<CheckError> {
    let mut errors = Vec::new();

    if raw.is_null() {
        return errors;
    }

    let Some(entries) = raw.as_object() else {
        errors.push(CheckError::NotAMapping);
        return errors;
    };

    for (name, entry) in entries {
        if !entry.is_object() {
            errors.push(CheckError::NotATable(name.clone()));
            return errors;
        }
    }

    errors
}
