//! Named loader configurations and the settings file that supplies them.
//!
//! A [`ConfigRegistry`] maps configuration names to fully-populated
//! [`LoaderConfig`] records. Each record starts from the built-in defaults
//! and overlays whatever options the user supplied, so every resolved
//! configuration always has every field populated. Ignore patterns are
//! compiled once, at registry build time.
//!
//! # Example settings YAML
//!
//! ```yaml
//! debug: true
//! configs:
//!   DEFAULT:
//!     bundle_dir_name: webpack_bundles/
//!     stats_file: webpack-stats.json
//!   ADMIN:
//!     stats_file: admin/webpack-stats.json
//!     local: false
//! ```

use std::collections::HashMap;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LoaderError, Result};

/// Name of the configuration used when the caller does not pick one.
pub const DEFAULT_CONFIG_NAME: &str = "DEFAULT";

/// Default directory (relative to the static root) webpack emits bundles to.
pub const DEFAULT_BUNDLE_DIR_NAME: &str = "webpack_bundles/";

/// Default stats file path.
pub const DEFAULT_STATS_FILE: &str = "webpack-stats.json";

/// Default interval between stats re-reads while the build is compiling.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default deadline for the compile-polling loop.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Default ignore patterns: hot-update chunks and source maps.
pub const DEFAULT_IGNORE: &[&str] = &[r".+\.hot-update.js", r".+\.map"];

/// Partial set of options overlaid onto the defaults for one named
/// configuration. Every field is optional; missing fields inherit the
/// documented default.
///
/// Durations are given in seconds. A `poll_timeout` of `0` disables the
/// polling deadline entirely, restoring an unbounded wait.
///
/// # Examples
///
/// ```
/// use webpack_stats_loader::{ConfigOverride, ConfigRegistry};
///
/// let mut overrides = std::collections::HashMap::new();
/// overrides.insert(
///     "ADMIN".to_string(),
///     ConfigOverride {
///         stats_file: Some("admin/webpack-stats.json".into()),
///         local: Some(false),
///         ..Default::default()
///     },
/// );
///
/// let registry = ConfigRegistry::from_overrides(overrides).unwrap();
/// let admin = registry.get("ADMIN").unwrap();
/// assert!(!admin.local);
/// // Unspecified options fall back to the defaults.
/// assert_eq!(admin.bundle_dir_name, "webpack_bundles/");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverride {
    /// Directory prefix joined onto each filename before URL resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_dir_name: Option<String>,
    /// Path of the stats file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_file: Option<PathBuf>,
    /// Seconds between stats re-reads while compiling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<f64>,
    /// Polling deadline in seconds; `0` disables the deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_timeout: Option<f64>,
    /// Ignore patterns replacing the default list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<Vec<String>>,
    /// Whether the stats file is opened from the local filesystem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<bool>,
}

/// One fully-populated loader configuration.
///
/// Produced by [`ConfigRegistry`]; every field is always populated. The
/// ignore patterns are kept both as the raw strings and as compiled
/// matchers, anchored at the start of the filename.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Directory prefix joined onto each filename before URL resolution.
    pub bundle_dir_name: String,
    /// Path of the stats file.
    pub stats_file: PathBuf,
    /// Interval between stats re-reads while compiling.
    pub poll_interval: Duration,
    /// Polling deadline; `None` waits indefinitely.
    pub poll_timeout: Option<Duration>,
    /// Raw ignore pattern strings.
    pub ignore: Vec<String>,
    /// Whether the stats file is opened from the local filesystem.
    pub local: bool,
    ignores: Vec<Regex>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        let ignore: Vec<String> = DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect();
        let ignores = ignore
            .iter()
            .map(|p| compile_ignore(p).expect("default ignore patterns must compile"))
            .collect();
        Self {
            bundle_dir_name: DEFAULT_BUNDLE_DIR_NAME.to_string(),
            stats_file: PathBuf::from(DEFAULT_STATS_FILE),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: Some(DEFAULT_POLL_TIMEOUT),
            ignore,
            local: true,
            ignores,
        }
    }
}

impl LoaderConfig {
    /// Builds a configuration by overlaying `overrides` onto the defaults.
    fn from_override(overrides: &ConfigOverride) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = &overrides.bundle_dir_name {
            config.bundle_dir_name = dir.clone();
        }
        if let Some(path) = &overrides.stats_file {
            config.stats_file = path.clone();
        }
        if let Some(secs) = overrides.poll_interval {
            config.poll_interval = seconds("poll_interval", secs)?;
        }
        if let Some(secs) = overrides.poll_timeout {
            config.poll_timeout = if secs == 0.0 {
                None
            } else {
                Some(seconds("poll_timeout", secs)?)
            };
        }
        if let Some(local) = overrides.local {
            config.local = local;
        }
        if let Some(patterns) = &overrides.ignore {
            config.ignores = patterns
                .iter()
                .map(|p| {
                    compile_ignore(p).map_err(|source| LoaderError::InvalidIgnorePattern {
                        pattern: p.clone(),
                        source,
                    })
                })
                .collect::<Result<_>>()?;
            config.ignore = patterns.clone();
        }

        Ok(config)
    }

    /// Returns `true` if `filename` matches any ignore pattern.
    ///
    /// Patterns match from the start of the filename.
    ///
    /// # Examples
    ///
    /// ```
    /// use webpack_stats_loader::LoaderConfig;
    ///
    /// let config = LoaderConfig::default();
    /// assert!(config.is_ignored("main.js.map"));
    /// assert!(config.is_ignored("main.abc123.hot-update.js"));
    /// assert!(!config.is_ignored("main.js"));
    /// ```
    pub fn is_ignored(&self, filename: &str) -> bool {
        self.ignores.iter().any(|re| re.is_match(filename))
    }

    /// Joins the bundle directory prefix onto an emitted filename.
    pub fn asset_path(&self, filename: &str) -> String {
        format!("{}{}", self.bundle_dir_name, filename)
    }
}

/// Anchors a user pattern at the start of the filename and compiles it.
fn compile_ignore(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!(r"\A(?:{pattern})"))
}

/// Converts a settings value in seconds into a [`Duration`].
fn seconds(field: &'static str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value).map_err(|_| LoaderError::InvalidDuration { field, value })
}

/// Immutable table of named loader configurations.
///
/// Built once from user overrides (or the defaults) and shared for the
/// process lifetime.
///
/// # Examples
///
/// ```
/// use webpack_stats_loader::ConfigRegistry;
///
/// let registry = ConfigRegistry::with_defaults();
/// let config = registry.get("DEFAULT").unwrap();
/// assert_eq!(config.stats_file.to_str(), Some("webpack-stats.json"));
/// assert!(registry.get("MISSING").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    configs: HashMap<String, LoaderConfig>,
}

impl ConfigRegistry {
    /// Creates a registry holding one all-defaults `"DEFAULT"` entry.
    pub fn with_defaults() -> Self {
        let mut configs = HashMap::new();
        configs.insert(DEFAULT_CONFIG_NAME.to_string(), LoaderConfig::default());
        Self { configs }
    }

    /// Builds a registry from typed overrides, one entry per name.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::InvalidIgnorePattern`] if an override carries
    /// an ignore pattern that does not compile.
    pub fn from_overrides(overrides: HashMap<String, ConfigOverride>) -> Result<Self> {
        let mut configs = HashMap::new();
        for (name, entry) in &overrides {
            configs.insert(name.clone(), LoaderConfig::from_override(entry)?);
        }
        Ok(Self { configs })
    }

    /// Builds a registry from an untyped configuration collection, the form
    /// a settings provider hands over.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::BadSettingsShape`] when the collection is not
    /// a mapping of names to option tables, and
    /// [`LoaderError::InvalidIgnorePattern`] for unparseable patterns.
    pub fn from_value(raw: &serde_json::Value) -> Result<Self> {
        let entries = raw.as_object().ok_or(LoaderError::BadSettingsShape)?;

        let mut overrides = HashMap::new();
        for (name, entry) in entries {
            let parsed: ConfigOverride = serde_json::from_value(entry.clone())
                .map_err(|_| LoaderError::BadSettingsShape)?;
            overrides.insert(name.clone(), parsed);
        }
        Self::from_overrides(overrides)
    }

    /// Looks up a configuration by name.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::UnknownConfig`] when no configuration is
    /// registered under `name`.
    pub fn get(&self, name: &str) -> Result<&LoaderConfig> {
        self.configs
            .get(name)
            .ok_or_else(|| LoaderError::UnknownConfig(name.to_string()))
    }

    /// Returns `true` if a configuration is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.configs.contains_key(name)
    }

    /// Returns the number of registered configurations.
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Returns `true` if no configurations are registered.
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Returns an iterator over configuration names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(|s| s.as_str())
    }
}

/// Application settings for the loader: the debug flag plus the raw
/// configuration collection.
///
/// This models the host's settings provider as plain data. The collection is
/// kept untyped so shape problems surface through the startup check rather
/// than a deserialization panic deep inside the host's boot sequence.
///
/// # Examples
///
/// ```no_run
/// use webpack_stats_loader::Settings;
///
/// let settings = Settings::load("webpack-loader.yml").unwrap();
/// let registry = settings.registry().unwrap();
/// assert!(registry.get("DEFAULT").is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Development mode: poll while compiling, never cache.
    #[serde(default)]
    pub debug: bool,
    /// Raw named configuration overrides; `null` means defaults only.
    #[serde(default)]
    pub configs: serde_json::Value,
}

impl Settings {
    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Io`] if the file cannot be read, or
    /// [`LoaderError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|source| LoaderError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(settings)
    }

    /// Saves the settings as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Io`] if the file cannot be written, or
    /// [`LoaderError::Yaml`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::to_writer(BufWriter::new(file), self).map_err(|source| LoaderError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Resolves the configuration collection into a [`ConfigRegistry`].
    ///
    /// A `null` collection yields the defaults-only registry, matching the
    /// behavior when no settings are supplied at all.
    pub fn registry(&self) -> Result<ConfigRegistry> {
        if self.configs.is_null() {
            Ok(ConfigRegistry::with_defaults())
        } else {
            ConfigRegistry::from_value(&self.configs)
        }
    }
}
