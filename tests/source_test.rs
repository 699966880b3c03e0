//! Integration tests for the bundle source collaborators: the cached source
//! freshness policy, the file-backed store, and configuration loading.

use std::time::Duration;

use tempfile::tempdir;
use test_log::test;

use km_core::{
    config::KmConfig,
    source::{
        cache_key, BundleSource, CacheEntry, CacheStore, CachedSource, FileCacheStore,
        MemoryCacheStore,
    },
    KmError,
};

const URL: &str = "https://example.com/bundle.md";

/// A source that replays a fixed script of responses and counts calls.
struct ScriptedSource {
    responses: Vec<Result<String, KmError>>,
    calls: usize,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<String, KmError>>) -> Self {
        ScriptedSource {
            responses,
            calls: 0,
        }
    }
}

impl BundleSource for ScriptedSource {
    fn fetch(&mut self, _url: &str) -> Result<String, KmError> {
        let response = self.responses.remove(0);
        self.calls += 1;
        response
    }
}

/// A store whose single entry reports a fixed, very old fetch time.
struct AncientStore {
    text: Option<String>,
    writes: Vec<String>,
}

impl CacheStore for AncientStore {
    fn read(&self, _key: &str) -> Option<CacheEntry> {
        self.text.as_ref().map(|text| CacheEntry {
            fetched_ms: 0,
            text: text.clone(),
        })
    }

    fn write(&mut self, _key: &str, text: &str) {
        self.writes.push(text.to_string());
    }
}

#[test]
fn test_fresh_entry_short_circuits_the_fetch() {
    let script = ScriptedSource::new(vec![Ok("first".to_string())]);
    let mut store = MemoryCacheStore::default();
    store.write(&cache_key(URL), "cached");
    let mut source = CachedSource::new(script, store, Duration::from_secs(600));
    assert_eq!(source.fetch(URL).unwrap(), "cached");
}

#[test]
fn test_zero_ttl_disables_reads_but_writes_through() {
    let script = ScriptedSource::new(vec![Ok("fetched".to_string())]);
    let mut store = MemoryCacheStore::default();
    store.write(&cache_key(URL), "cached");
    let mut source = CachedSource::new(script, store, Duration::ZERO);
    assert_eq!(source.fetch(URL).unwrap(), "fetched");
    // The fresh text replaced the old entry for future sessions.
    let entry = source.store().entry(&cache_key(URL)).unwrap();
    assert_eq!(entry.text, "fetched");
}

#[test]
fn test_stale_entry_refetches_and_writes_through() {
    let script = ScriptedSource::new(vec![Ok("fresh".to_string())]);
    let store = AncientStore {
        text: Some("stale".to_string()),
        writes: Vec::new(),
    };
    let mut source = CachedSource::new(script, store, Duration::from_secs(60));
    assert_eq!(source.fetch(URL).unwrap(), "fresh");
    assert_eq!(source.store().writes, vec!["fresh".to_string()]);
}

#[test]
fn test_failed_fetch_falls_back_to_stale_cache() {
    let script = ScriptedSource::new(vec![Err(KmError::Source("offline".to_string()))]);
    let store = AncientStore {
        text: Some("stale".to_string()),
        writes: Vec::new(),
    };
    let mut source = CachedSource::new(script, store, Duration::from_secs(60));
    assert_eq!(source.fetch(URL).unwrap(), "stale");
}

#[test]
fn test_failed_fetch_without_cache_propagates() {
    let script = ScriptedSource::new(vec![Err(KmError::Source("offline".to_string()))]);
    let store = AncientStore {
        text: None,
        writes: Vec::new(),
    };
    let mut source = CachedSource::new(script, store, Duration::from_secs(60));
    assert!(matches!(source.fetch(URL), Err(KmError::Source(_))));
}

#[test]
fn test_file_store_round_trip() {
    let dir = tempdir().unwrap();
    let mut store = FileCacheStore::new(dir.path());
    let key = cache_key(URL);
    assert!(store.read(&key).is_none());
    store.write(&key, "bundle text");
    let entry = store.read(&key).expect("entry persisted");
    assert_eq!(entry.text, "bundle text");
    // Keys with ':' and '/' still land as flat filenames inside the dir.
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with(".json"));
    assert!(!names[0].contains(':'));
    assert!(!names[0].contains('/'));
}

#[test]
fn test_file_store_ignores_corrupt_entries() {
    let dir = tempdir().unwrap();
    let mut store = FileCacheStore::new(dir.path());
    let key = cache_key(URL);
    store.write(&key, "good");
    // Clobber the file with junk; the next read degrades to a miss.
    for entry in std::fs::read_dir(dir.path()).unwrap() {
        std::fs::write(entry.unwrap().path(), "not json").unwrap();
    }
    assert!(store.read(&key).is_none());
}

#[test]
fn test_config_file_drives_the_cached_source() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("km.toml");
    std::fs::write(
        &path,
        "title = \"Field Notes\"\nbundle_url = \"https://example.com/bundle.md\"\ncache_minutes = 10\n",
    )
    .unwrap();

    let config = KmConfig::from_toml_file(&path).unwrap();
    assert_eq!(config.title, "Field Notes");
    let ttl = config.cache_ttl().expect("caching enabled");
    assert_eq!(ttl, Duration::from_secs(600));

    let script = ScriptedSource::new(vec![Ok("bundle".to_string())]);
    let mut source = CachedSource::new(script, MemoryCacheStore::default(), ttl);
    let url = config.require_bundle_url().unwrap().to_string();
    assert_eq!(source.fetch(&url).unwrap(), "bundle");
    assert!(source.store().entry(&cache_key(&url)).is_some());
}
