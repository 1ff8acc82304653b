use std::collections::{HashMap, VecDeque};
use std::io::{Cursor, Read, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;
use webpack_stats_core::{Asset, CheckError, Stats};
use webpack_stats_loader::{
    AssetStore, ConfigOverride, ConfigRegistry, Loader, LoaderConfig, LoaderError, MemoryCache,
    NoCache, STATS_CACHE_KEY, Settings, StaticFiles, StatsCache, render_bundle, startup,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const DONE_STATS: &str = r#"{
    "status": "done",
    "chunks": {
        "main": [
            {"name": "main.js"},
            {"name": "main.js.map"},
            {"name": "styles.css"},
            {"name": "logo.png"}
        ]
    }
}"#;

/// Store that serves a scripted sequence of stats documents and counts how
/// often it is opened. Once the script runs down to its last entry, that
/// entry is served forever.
struct ScriptedStore {
    responses: Mutex<VecDeque<String>>,
    opens: AtomicUsize,
}

impl ScriptedStore {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            opens: AtomicUsize::new(0),
        }
    }

    fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl AssetStore for ScriptedStore {
    fn open(&self, _path: &Path) -> std::io::Result<Box<dyn Read>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        let next = if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            responses
                .front()
                .cloned()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no stats"))?
        };
        Ok(Box::new(Cursor::new(next.into_bytes())))
    }

    fn url(&self, path: &str) -> String {
        format!("/static/{path}")
    }
}

fn remote_config(overrides: ConfigOverride) -> LoaderConfig {
    let mut map = HashMap::new();
    map.insert(
        "DEFAULT".to_string(),
        ConfigOverride {
            local: Some(false),
            ..overrides
        },
    );
    ConfigRegistry::from_overrides(map)
        .unwrap()
        .get("DEFAULT")
        .unwrap()
        .clone()
}

// ---------------------------------------------------------------------------
// Configuration resolution
// ---------------------------------------------------------------------------

#[test]
fn test_overrides_resolve_to_fully_populated_configs() {
    let mut overrides = HashMap::new();
    overrides.insert(
        "DEFAULT".to_string(),
        ConfigOverride {
            bundle_dir_name: Some("assets/".into()),
            ..Default::default()
        },
    );
    overrides.insert("DASHBOARD".to_string(), ConfigOverride::default());

    let registry = ConfigRegistry::from_overrides(overrides).unwrap();
    assert_eq!(registry.len(), 2);

    let custom = registry.get("DEFAULT").unwrap();
    assert_eq!(custom.bundle_dir_name, "assets/");
    assert_eq!(custom.stats_file.to_str(), Some("webpack-stats.json"));
    assert_eq!(custom.poll_interval, Duration::from_millis(100));
    assert!(custom.local);

    let untouched = registry.get("DASHBOARD").unwrap();
    assert_eq!(untouched.bundle_dir_name, "webpack_bundles/");
    assert_eq!(untouched.ignore.len(), 2);
}

#[test]
fn test_startup_check_reports_one_diagnostic_for_bad_shape() {
    let cache = MemoryCache::new();

    let diagnostics = startup(&json!({"DEFAULT": {"local": true}, "BAD": "nope"}), &cache);
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(diagnostics[0], CheckError::NotATable(_)));

    let diagnostics = startup(&json!(42), &cache);
    assert_eq!(diagnostics, vec![CheckError::NotAMapping]);
}

#[test]
fn test_startup_invalidates_cached_manifest() {
    let cache = MemoryCache::new();
    cache.set(STATS_CACHE_KEY, std::sync::Arc::new(Stats::default()));

    let diagnostics = startup(&serde_json::Value::Null, &cache);
    assert!(diagnostics.is_empty());
    assert!(cache.get(STATS_CACHE_KEY).is_none());
}

// ---------------------------------------------------------------------------
// Filtering and URL rewriting
// ---------------------------------------------------------------------------

#[test]
fn test_ignored_chunks_are_dropped_and_urls_rewritten() {
    let store = ScriptedStore::new(&[DONE_STATS]);
    let loader = Loader::new(&store, NoCache);
    let config = remote_config(ConfigOverride {
        ignore: Some(vec![r".+\.map".into(), r".+\.png".into()]),
        ..Default::default()
    });

    let assets: Vec<Asset> = loader.get_bundle("main", &config).unwrap().collect();
    let names: Vec<&str> = assets.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["main.js", "styles.css"]);
    assert_eq!(
        assets[0].url,
        store.url(&config.asset_path("main.js"))
    );
    assert_eq!(assets[0].url, "/static/webpack_bundles/main.js");
}

#[test]
fn test_single_surviving_descriptor() {
    let store = ScriptedStore::new(&[r#"{
        "status": "done",
        "chunks": {"main": [{"name": "main.js"}, {"name": "main.js.map"}]}
    }"#]);
    let loader = Loader::new(&store, NoCache);
    let config = remote_config(ConfigOverride {
        ignore: Some(vec![r".+\.map".into()]),
        ..Default::default()
    });

    let assets: Vec<Asset> = loader.get_bundle("main", &config).unwrap().collect();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].name, "main.js");
    assert_eq!(assets[0].url, "/static/webpack_bundles/main.js");
}

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

#[test]
fn test_build_error_carries_all_details() {
    let store = ScriptedStore::new(&[r#"{
        "status": "error",
        "error": "SyntaxError",
        "file": "app.js",
        "message": "Unexpected token"
    }"#]);
    let loader = Loader::new(&store, NoCache);
    let config = remote_config(ConfigOverride::default());

    let err = loader.get_bundle("main", &config).map(|_| ()).unwrap_err();
    let text = err.to_string();
    assert!(matches!(err, LoaderError::Build { .. }));
    assert!(text.contains("SyntaxError"));
    assert!(text.contains("app.js"));
    assert!(text.contains("Unexpected token"));
}

#[test]
fn test_build_error_defaults_missing_file_to_empty() {
    let store = ScriptedStore::new(&[r#"{"status": "error", "error": "Error", "message": "boom"}"#]);
    let loader = Loader::new(&store, NoCache);
    let config = remote_config(ConfigOverride::default());

    match loader.get_bundle("main", &config).map(|_| ()).unwrap_err() {
        LoaderError::Build { file, .. } => assert_eq!(file, ""),
        other => panic!("expected build error, got {other:?}"),
    }
}

#[test]
fn test_missing_status_is_bad_stats() {
    let store = ScriptedStore::new(&[r#"{"chunks": {"main": [{"name": "main.js"}]}}"#]);
    let loader = Loader::new(&store, NoCache);
    let config = remote_config(ConfigOverride::default());

    let err = loader.get_bundle("main", &config).map(|_| ()).unwrap_err();
    assert!(matches!(err, LoaderError::BadStats));
}

#[test]
fn test_unknown_status_is_bad_stats() {
    let store = ScriptedStore::new(&[r#"{"status": "packing"}"#]);
    let loader = Loader::new(&store, NoCache);
    let config = remote_config(ConfigOverride::default());

    let err = loader.get_bundle("main", &config).map(|_| ()).unwrap_err();
    assert!(matches!(err, LoaderError::BadStats));
}

#[test]
fn test_absent_bundle_is_distinct_lookup_failure() {
    let store = ScriptedStore::new(&[DONE_STATS]);
    let loader = Loader::new(&store, NoCache);
    let config = remote_config(ConfigOverride::default());

    let err = loader.get_bundle("admin", &config).map(|_| ()).unwrap_err();
    assert!(matches!(err, LoaderError::BundleNotFound(name) if name == "admin"));
}

// ---------------------------------------------------------------------------
// Debug-mode polling
// ---------------------------------------------------------------------------

#[test]
fn test_polling_reloads_until_done() {
    let store = ScriptedStore::new(&[
        r#"{"status": "compiling"}"#,
        r#"{"status": "compiling"}"#,
        DONE_STATS,
    ]);
    let loader = Loader::new(&store, NoCache).with_debug(true);
    let config = remote_config(ConfigOverride {
        poll_interval: Some(0.001),
        ..Default::default()
    });

    let assets: Vec<Asset> = loader.get_bundle("main", &config).unwrap().collect();
    assert!(!assets.is_empty());
    // One initial read plus exactly two sleep/reload cycles.
    assert_eq!(store.opens(), 3);
}

#[test]
fn test_polling_is_skipped_outside_debug_mode() {
    let store = ScriptedStore::new(&[r#"{"status": "compiling"}"#, DONE_STATS]);
    let loader = Loader::new(&store, NoCache);
    let config = remote_config(ConfigOverride::default());

    let err = loader.get_bundle("main", &config).map(|_| ()).unwrap_err();
    // The compiling manifest is taken as final and rejected as bad stats.
    assert!(matches!(err, LoaderError::BadStats));
    assert_eq!(store.opens(), 1);
}

#[test]
fn test_polling_deadline_expires() {
    let store = ScriptedStore::new(&[r#"{"status": "compiling"}"#]);
    let loader = Loader::new(&store, NoCache).with_debug(true);
    let config = remote_config(ConfigOverride {
        poll_interval: Some(0.001),
        poll_timeout: Some(0.02),
        ..Default::default()
    });

    let err = loader.get_bundle("main", &config).map(|_| ()).unwrap_err();
    match err {
        LoaderError::CompileTimeout { waited, .. } => {
            assert!(waited >= Duration::from_millis(20));
        }
        other => panic!("expected compile timeout, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Caching
// ---------------------------------------------------------------------------

#[test]
fn test_cached_manifest_skips_disk_reads() {
    let store = ScriptedStore::new(&[DONE_STATS]);
    let cache = MemoryCache::new();
    let loader = Loader::new(&store, &cache);
    let config = remote_config(ConfigOverride::default());

    let first = loader.get_assets(&config).unwrap();
    let second = loader.get_assets(&config).unwrap();

    assert_eq!(store.opens(), 1);
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

#[test]
fn test_debug_mode_rereads_every_call() {
    let store = ScriptedStore::new(&[DONE_STATS]);
    let loader = Loader::new(&store, MemoryCache::new()).with_debug(true);
    let config = remote_config(ConfigOverride::default());

    loader.get_assets(&config).unwrap();
    loader.get_assets(&config).unwrap();
    assert_eq!(store.opens(), 2);
}

// ---------------------------------------------------------------------------
// File listing and tag rendering
// ---------------------------------------------------------------------------

#[test]
fn test_get_files_filters_by_extension() {
    let store = ScriptedStore::new(&[DONE_STATS]);
    let loader = Loader::new(&store, NoCache);
    let config = remote_config(ConfigOverride::default());

    let scripts = loader.get_files("main", Some("js"), &config).unwrap();
    assert_eq!(scripts.len(), 1);
    assert_eq!(scripts[0].name, "main.js");

    let styles = loader.get_files("main", Some("css"), &config).unwrap();
    assert_eq!(styles.len(), 1);
    assert_eq!(styles[0].name, "styles.css");

    let all = loader.get_files("main", None, &config).unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn test_render_bundle_emits_script_and_link_tags() {
    let store = ScriptedStore::new(&[DONE_STATS]);
    let loader = Loader::new(&store, NoCache);
    let config = remote_config(ConfigOverride::default());

    let html = render_bundle(&loader, "main", None, "", &config).unwrap();
    let lines: Vec<&str> = html.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        r#"<script src="/static/webpack_bundles/main.js"></script>"#
    );
    assert_eq!(
        lines[1],
        r#"<link rel="stylesheet" href="/static/webpack_bundles/styles.css"/>"#
    );
}

// ---------------------------------------------------------------------------
// Settings file and local end-to-end
// ---------------------------------------------------------------------------

#[test]
fn test_settings_file_drives_local_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let stats_path = dir.path().join("webpack-stats.json");
    std::fs::File::create(&stats_path)
        .unwrap()
        .write_all(DONE_STATS.as_bytes())
        .unwrap();

    let settings_path = dir.path().join("webpack-loader.yml");
    std::fs::write(
        &settings_path,
        format!(
            "debug: false\nconfigs:\n  DEFAULT:\n    stats_file: {}\n",
            stats_path.display()
        ),
    )
    .unwrap();

    let settings = Settings::load(&settings_path).unwrap();
    assert!(!settings.debug);

    let registry = settings.registry().unwrap();
    let config = registry.get("DEFAULT").unwrap();

    let cache = MemoryCache::new();
    let loader = Loader::new(StaticFiles::new(dir.path(), "/static/"), &cache)
        .with_debug(settings.debug);
    let assets: Vec<Asset> = loader.get_bundle("main", config).unwrap().collect();

    // Default ignore patterns drop the source map; png survives them.
    let names: Vec<&str> = assets.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["main.js", "styles.css", "logo.png"]);
    assert!(cache.get(STATS_CACHE_KEY).is_some());
}
