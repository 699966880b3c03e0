//! Collaborator interfaces for fetching and caching bundle text.
//!
//! The network fetch itself lives outside the core; callers hand in a
//! [`BundleSource`] and the core stays synchronous. [`CachedSource`] wraps any
//! source with the time-boxed freshness policy of the original boot flow: a
//! fresh cache entry short-circuits the fetch, and a failed fetch falls back
//! to a stale entry before the error is allowed to propagate.

use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use crate::error::KmError;

/// Versioned cache namespace. Bump the version when parse logic changes so
/// stale bundles are never replayed into a newer graph builder.
pub const CACHE_NAMESPACE: &str = "km:md:v2";

/// Cache key for a bundle URL.
pub fn cache_key(url: &str) -> String {
    format!("{CACHE_NAMESPACE}:{url}")
}

/// External collaborator that produces bundle text for a URL.
pub trait BundleSource {
    fn fetch(&mut self, url: &str) -> Result<String, KmError>;
}

/// A cached bundle plus the time it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Milliseconds since the Unix epoch at write time.
    pub fetched_ms: u64,
    pub text: String,
}

impl CacheEntry {
    pub fn age(&self, now: SystemTime) -> Duration {
        let now_ms = now
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Duration::from_millis(now_ms.saturating_sub(self.fetched_ms))
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Persistent text cache keyed by [`cache_key`].
pub trait CacheStore {
    fn read(&self, key: &str) -> Option<CacheEntry>;
    fn write(&mut self, key: &str, text: &str);
}

/// In-memory store for tests and previews.
#[derive(Debug, Default, Clone)]
pub struct MemoryCacheStore {
    entries: BTreeMap<String, CacheEntry>,
}

impl MemoryCacheStore {
    pub fn entry(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }
}

impl CacheStore for MemoryCacheStore {
    fn read(&self, key: &str) -> Option<CacheEntry> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, text: &str) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                fetched_ms: now_ms(),
                text: text.to_string(),
            },
        );
    }
}

/// One JSON file per key inside a directory; the browser-local-storage analog
/// for native callers. Read failures of any kind degrade to a cache miss, and
/// write failures are logged rather than propagated, matching the guarded
/// storage helpers of the original.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileCacheStore { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys contain ':' and '/'; keep filenames flat.
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl CacheStore for FileCacheStore {
    fn read(&self, key: &str) -> Option<CacheEntry> {
        let raw = fs::read_to_string(self.path_for(key)).ok()?;
        serde_json::from_str(&raw).ok()
    }

    fn write(&mut self, key: &str, text: &str) {
        let entry = CacheEntry {
            fetched_ms: now_ms(),
            text: text.to_string(),
        };
        let path = self.path_for(key);
        let result = fs::create_dir_all(&self.dir)
            .map_err(KmError::from)
            .and_then(|_| Ok(serde_json::to_string(&entry)?))
            .and_then(|json| Ok(fs::write(&path, json)?));
        if let Err(err) = result {
            tracing::warn!(?path, %err, "cache write failed");
        }
    }
}

/// Time-boxed freshness gate over an inner source.
pub struct CachedSource<S, C> {
    inner: S,
    store: C,
    ttl: Duration,
}

impl<S: BundleSource, C: CacheStore> CachedSource<S, C> {
    /// A zero `ttl` disables cache reads; fetched text is still written
    /// through so a later session with caching enabled can pick it up.
    pub fn new(inner: S, store: C, ttl: Duration) -> Self {
        CachedSource { inner, store, ttl }
    }

    pub fn store(&self) -> &C {
        &self.store
    }
}

impl<S: BundleSource, C: CacheStore> BundleSource for CachedSource<S, C> {
    fn fetch(&mut self, url: &str) -> Result<String, KmError> {
        let key = cache_key(url);
        let cached = if self.ttl.is_zero() {
            None
        } else {
            self.store.read(&key)
        };
        if let Some(entry) = &cached {
            if entry.age(SystemTime::now()) <= self.ttl {
                tracing::debug!(%url, "serving bundle from cache");
                return Ok(entry.text.clone());
            }
        }

        match self.inner.fetch(url) {
            Ok(text) => {
                self.store.write(&key, &text);
                Ok(text)
            }
            Err(err) => {
                if let Some(entry) = cached {
                    tracing::warn!(%url, %err, "bundle fetch failed; serving stale cache");
                    Ok(entry.text)
                } else {
                    Err(err)
                }
            }
        }
    }
}
