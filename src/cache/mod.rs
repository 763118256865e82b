//! Asset caching.
//!
//! This module provides [`AssetCache`], a disk-backed cache for a single
//! remote URL. A resolve serves the stored bytes while they are fresh and
//! goes to the network otherwise, persisting whatever it fetched.
//!
//! # Example
//!
//! ```no_run
//! use assetcache::{AssetCache, OutputType, ResolveOptions};
//!
//! let mut cache = AssetCache::new("https://example.com/data.json")?
//!     .in_directory(".cache");
//! let value = cache.resolve(&ResolveOptions::new().duration("2h").output(OutputType::Json))?;
//! # Ok::<(), assetcache::AssetCacheError>(())
//! ```

pub mod clock;
pub mod duration;
pub mod key;
pub mod record;
pub mod store;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use duration::{format_duration, parse_duration_ms, CacheDuration, DEFAULT_DURATION, FOREVER};
pub use key::{cache_key, store_file_name};
pub use record::CacheRecord;
pub use store::{JsonFileStore, Store};
pub use validation::{needs_refetch, validate, ValidationResult};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::convert::{convert, Output, OutputType};
use crate::error::{AssetCacheError, Result};
use crate::fetch::{Fetcher, HttpFetcher};

/// Cache directory used when none is given.
pub const DEFAULT_CACHE_DIRECTORY: &str = ".cache";

/// Options for a single [`AssetCache::resolve`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Freshness window; the cache's default duration when unset or empty.
    pub duration: Option<String>,
    /// Representation of the returned value.
    pub output: OutputType,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn output(mut self, output: OutputType) -> Self {
        self.output = output;
        self
    }
}

/// Disk-backed cache for one URL.
///
/// The backing store is opened lazily on first use and kept open. Changing
/// the URL (to one with a different key) or the cache directory marks the
/// handle stale, so the next access reopens it at the new location.
pub struct AssetCache<F = HttpFetcher, C = SystemClock, S = JsonFileStore> {
    url: String,
    cache_key: String,
    cache_directory: PathBuf,
    default_duration: String,
    fetcher: F,
    clock: C,
    store: Option<S>,
    store_dirty: bool,
}

impl AssetCache {
    /// Create a cache for `url` that fetches over HTTP.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_fetcher(url, HttpFetcher::new()?))
    }
}

impl<F: Fetcher> AssetCache<F> {
    /// Create a cache for `url` with a custom fetcher.
    pub fn with_fetcher(url: impl Into<String>, fetcher: F) -> Self {
        let url = url.into();
        Self {
            cache_key: cache_key(&url),
            url,
            cache_directory: PathBuf::from(DEFAULT_CACHE_DIRECTORY),
            default_duration: DEFAULT_DURATION.to_string(),
            fetcher,
            clock: SystemClock,
            store: None,
            store_dirty: true,
        }
    }
}

impl<F: Fetcher, C: Clock, S: Store> AssetCache<F, C, S> {
    /// Use `dir` as the cache directory.
    pub fn in_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.set_cache_directory(dir);
        self
    }

    /// Replace the time source.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> AssetCache<F, C2, S> {
        AssetCache {
            url: self.url,
            cache_key: self.cache_key,
            cache_directory: self.cache_directory,
            default_duration: self.default_duration,
            fetcher: self.fetcher,
            clock,
            store: self.store,
            store_dirty: self.store_dirty,
        }
    }

    /// Replace the store implementation.
    ///
    /// Any open handle is dropped; the new store opens on next access.
    pub fn with_store<S2: Store>(self) -> AssetCache<F, C, S2> {
        AssetCache {
            url: self.url,
            cache_key: self.cache_key,
            cache_directory: self.cache_directory,
            default_duration: self.default_duration,
            fetcher: self.fetcher,
            clock: self.clock,
            store: None,
            store_dirty: true,
        }
    }

    /// Set the duration used when a resolve does not supply one.
    pub fn with_default_duration(mut self, duration: impl Into<String>) -> Result<Self> {
        self.set_default_duration(duration)?;
        Ok(self)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Point the cache at a new URL.
    pub fn set_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        let key = cache_key(&url);
        if key != self.cache_key {
            self.store_dirty = true;
        }
        self.cache_key = key;
        self.url = url;
    }

    pub fn cache_directory(&self) -> &Path {
        &self.cache_directory
    }

    /// Move the cache to a new directory.
    pub fn set_cache_directory(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if dir != self.cache_directory {
            self.store_dirty = true;
        }
        self.cache_directory = dir;
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// Name of the store file.
    pub fn cache_filename(&self) -> String {
        store_file_name(&self.cache_key)
    }

    /// Path of the store file, relative to the cache directory as given.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_directory.join(self.cache_filename())
    }

    pub fn default_duration(&self) -> &str {
        &self.default_duration
    }

    /// Set the fallback duration, rejecting malformed values.
    pub fn set_default_duration(&mut self, duration: impl Into<String>) -> Result<()> {
        let duration = duration.into();
        CacheDuration::parse(&duration)?;
        self.default_duration = duration;
        Ok(())
    }

    /// Current time according to the cache's clock.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// The store handle, opened on first access or after an identity change.
    pub fn store(&mut self) -> Result<&mut S> {
        let store = match self.store.take() {
            Some(store) if !self.store_dirty => store,
            _ => {
                let dir = std::path::absolute(&self.cache_directory).map_err(|source| {
                    AssetCacheError::StoreIo {
                        path: self.cache_directory.clone(),
                        source,
                    }
                })?;
                let store = S::open(&self.cache_filename(), &dir)?;
                self.store_dirty = false;
                store
            }
        };
        Ok(self.store.insert(store))
    }

    /// The stored record for the current URL.
    pub fn cached_record(&mut self) -> Result<Option<&CacheRecord>> {
        self.store()?;
        Ok(self.store.as_ref().and_then(|store| store.get(&self.url)))
    }

    /// Whether a resolve with `duration` would go to the network.
    pub fn needs_refetch(&mut self, duration: &str) -> Result<bool> {
        let now = self.clock.now_ms();
        debug!("Cache check for {} (duration: {:?})", self.url, duration);
        let record = self.cached_record()?;
        needs_refetch(record, duration, now)
    }

    /// Freshness of the stored record under `duration`.
    pub fn freshness(&mut self, duration: &str) -> Result<ValidationResult> {
        let duration = CacheDuration::parse(duration)?;
        let now = self.clock.now_ms();
        let record = self.cached_record()?;
        Ok(validate(record, duration, now))
    }

    /// Return the asset, from the store when fresh, otherwise from the
    /// network.
    ///
    /// On a fetch the cache directory is created first, and the new record
    /// is durably persisted before the converted value is returned. A failed
    /// fetch leaves any prior record untouched.
    pub fn resolve(&mut self, options: &ResolveOptions) -> Result<Output> {
        let duration = match options.duration.as_deref() {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => self.default_duration.clone(),
        };
        CacheDuration::parse(&duration)?;

        if !self.needs_refetch(&duration)? {
            debug!("Serving {} from cache", self.url);
            if let Some(record) = self.cached_record()? {
                return convert(record.payload.clone(), options.output);
            }
        }

        fs::create_dir_all(&self.cache_directory).map_err(|source| AssetCacheError::StoreIo {
            path: self.cache_directory.clone(),
            source,
        })?;

        info!("Caching: {}", self.url);
        let body = self.fetcher.fetch(&self.url)?;
        self.save(&body)?;

        convert(body, options.output)
    }

    /// Store `body` as the record for the current URL and persist it.
    fn save(&mut self, body: &[u8]) -> Result<()> {
        let record = CacheRecord::new(self.clock.now_ms(), body.to_vec());
        let url = self.url.clone();

        let store = self.store()?;
        store.put(&url, record);
        if let Err(e) = store.persist() {
            // The in-memory record was never written; reload from disk next time.
            self.store_dirty = true;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use tempfile::TempDir;

    const T0: i64 = 1_700_000_000_000;
    const HOUR_MS: i64 = 3_600_000;

    /// Fetcher that replays a scripted sequence of responses.
    struct ScriptedFetcher {
        responses: RefCell<Vec<Result<Vec<u8>>>>,
        calls: Cell<usize>,
    }

    impl ScriptedFetcher {
        fn new(responses: Vec<Result<Vec<u8>>>) -> Self {
            Self {
                responses: RefCell::new(responses),
                calls: Cell::new(0),
            }
        }

        fn ok(body: &[u8]) -> Self {
            Self::new(vec![Ok(body.to_vec())])
        }
    }

    impl Fetcher for ScriptedFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            let mut responses = self.responses.borrow_mut();
            if responses.is_empty() {
                return Err(AssetCacheError::BadResponse {
                    url: url.to_string(),
                    status: 599,
                    reason: "no scripted response".into(),
                });
            }
            responses.remove(0)
        }
    }

    /// Fetcher that deletes the cache directory before answering, so the
    /// following persist has nowhere to write.
    struct DirRemovingFetcher {
        dir: PathBuf,
    }

    impl Fetcher for DirRemovingFetcher {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            fs::remove_dir_all(&self.dir)?;
            Ok(b"never stored".to_vec())
        }
    }

    fn server_error(url: &str) -> AssetCacheError {
        AssetCacheError::BadResponse {
            url: url.to_string(),
            status: 500,
            reason: "Internal Server Error".into(),
        }
    }

    fn cache_in(
        temp: &TempDir,
        url: &str,
        fetcher: ScriptedFetcher,
    ) -> (AssetCache<ScriptedFetcher, ManualClock>, ManualClock) {
        let clock = ManualClock::new(T0);
        let cache = AssetCache::with_fetcher(url, fetcher)
            .in_directory(temp.path().join("cache"))
            .with_clock(clock.clone());
        (cache, clock)
    }

    #[test]
    fn defaults() {
        let cache = AssetCache::with_fetcher("https://example.com/a", ScriptedFetcher::ok(b""));

        assert_eq!(cache.cache_directory(), Path::new(".cache"));
        assert_eq!(cache.default_duration(), "1d");
        assert_eq!(cache.cache_key(), cache_key("https://example.com/a"));
    }

    #[test]
    fn cache_path_uses_prefix_and_key() {
        let cache = AssetCache::with_fetcher("https://example.com/a", ScriptedFetcher::ok(b""))
            .in_directory("/tmp/assets");

        assert_eq!(
            cache.cache_path(),
            PathBuf::from(format!("/tmp/assets/asset-cache-{}", cache.cache_key()))
        );
    }

    #[test]
    fn resolve_json_scenario() {
        let temp = TempDir::new().unwrap();
        let url = "https://example.com/a.json";
        let (mut cache, _clock) = cache_in(&temp, url, ScriptedFetcher::ok(br#"{"x":1}"#));

        let output = cache
            .resolve(&ResolveOptions::new().output(OutputType::Json))
            .unwrap();
        assert_eq!(output, Output::Json(json!({"x": 1})));

        let store =
            JsonFileStore::open(&cache.cache_filename(), &temp.path().join("cache")).unwrap();
        assert_eq!(store.len(), 1);
        let record = store.get(url).unwrap();
        assert_eq!(record.cached_at, T0);
        assert_eq!(record.payload, br#"{"x":1}"#);
    }

    #[test]
    fn second_resolve_within_window_skips_fetch() {
        let temp = TempDir::new().unwrap();
        let payload: Vec<u8> = vec![0, 1, 2, 255, 254];
        let (mut cache, clock) = cache_in(
            &temp,
            "https://example.com/logo.png",
            ScriptedFetcher::ok(&payload),
        );

        let first = cache.resolve(&ResolveOptions::new()).unwrap();
        clock.advance(chrono::Duration::hours(1));
        let second = cache.resolve(&ResolveOptions::new()).unwrap();

        assert_eq!(first.as_bytes(), Some(payload.as_slice()));
        assert_eq!(second.as_bytes(), Some(payload.as_slice()));
        assert_eq!(cache.fetcher.calls.get(), 1);
    }

    #[test]
    fn expired_record_is_refetched() {
        let temp = TempDir::new().unwrap();
        let fetcher = ScriptedFetcher::new(vec![Ok(b"v1".to_vec()), Ok(b"v2".to_vec())]);
        let (mut cache, clock) = cache_in(&temp, "https://example.com/t", fetcher);

        let options = ResolveOptions::new().duration("1d").output(OutputType::Text);
        assert_eq!(cache.resolve(&options).unwrap().as_text(), Some("v1"));

        clock.advance(chrono::Duration::hours(25));
        assert_eq!(cache.resolve(&options).unwrap().as_text(), Some("v2"));
        assert_eq!(cache.fetcher.calls.get(), 2);
        assert_eq!(
            cache.cached_record().unwrap().unwrap().cached_at,
            T0 + 25 * HOUR_MS
        );
    }

    #[test]
    fn failed_fetch_keeps_prior_record() {
        let temp = TempDir::new().unwrap();
        let url = "https://example.com/a";
        let fetcher = ScriptedFetcher::new(vec![Ok(b"old".to_vec()), Err(server_error(url))]);
        let (mut cache, clock) = cache_in(&temp, url, fetcher);

        cache.resolve(&ResolveOptions::new()).unwrap();
        clock.advance(chrono::Duration::days(2));

        let err = cache.resolve(&ResolveOptions::new()).unwrap_err();
        assert_eq!(err.status(), Some(500));

        let output = cache.resolve(&ResolveOptions::new().duration("*")).unwrap();
        assert_eq!(output.as_bytes(), Some(&b"old"[..]));
        assert_eq!(cache.fetcher.calls.get(), 2);
    }

    #[test]
    fn failed_fetch_on_cold_cache_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let url = "https://example.com/a";
        let (mut cache, _clock) = cache_in(
            &temp,
            url,
            ScriptedFetcher::new(vec![Err(server_error(url))]),
        );

        assert!(cache.resolve(&ResolveOptions::new()).is_err());
        assert!(!temp.path().join("cache").join(cache.cache_filename()).exists());
        assert!(cache.cached_record().unwrap().is_none());
    }

    #[test]
    fn failed_persist_is_not_trusted() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("cache");
        let fetcher = DirRemovingFetcher { dir: dir.clone() };
        let mut cache = AssetCache::with_fetcher("https://example.com/a", fetcher)
            .in_directory(&dir)
            .with_clock(ManualClock::new(T0));

        let err = cache.resolve(&ResolveOptions::new()).unwrap_err();

        assert!(matches!(err, AssetCacheError::StoreIo { .. }), "{err}");
        assert!(cache.store_dirty);
        assert!(cache.needs_refetch("*").unwrap());
        assert!(cache.cached_record().unwrap().is_none());
        assert!(!cache.cache_path().exists());
    }

    #[test]
    fn invalid_json_fails_but_bytes_stay_cached() {
        let temp = TempDir::new().unwrap();
        let (mut cache, _clock) =
            cache_in(&temp, "https://example.com/bad", ScriptedFetcher::ok(b"{"));

        let err = cache
            .resolve(&ResolveOptions::new().output(OutputType::Json))
            .unwrap_err();
        assert!(matches!(err, AssetCacheError::Parse { .. }));

        let output = cache.resolve(&ResolveOptions::new()).unwrap();
        assert_eq!(output.as_bytes(), Some(&b"{"[..]));
        assert_eq!(cache.fetcher.calls.get(), 1);
    }

    #[test]
    fn malformed_duration_fails_before_fetching() {
        let temp = TempDir::new().unwrap();
        let (mut cache, _clock) =
            cache_in(&temp, "https://example.com/a", ScriptedFetcher::ok(b"x"));

        let err = cache
            .resolve(&ResolveOptions::new().duration("10x"))
            .unwrap_err();
        assert!(matches!(err, AssetCacheError::InvalidDuration { .. }));
        assert_eq!(cache.fetcher.calls.get(), 0);
    }

    #[test]
    fn empty_duration_falls_back_to_default() {
        let temp = TempDir::new().unwrap();
        let fetcher = ScriptedFetcher::new(vec![Ok(b"v1".to_vec()), Ok(b"v2".to_vec())]);
        let (mut cache, clock) = cache_in(&temp, "https://example.com/a", fetcher);

        cache.resolve(&ResolveOptions::new()).unwrap();
        clock.advance(chrono::Duration::hours(25));
        let output = cache.resolve(&ResolveOptions::new().duration("")).unwrap();

        assert_eq!(output.as_bytes(), Some(&b"v2"[..]));
    }

    #[test]
    fn empty_default_duration_never_expires() {
        let temp = TempDir::new().unwrap();
        let fetcher = ScriptedFetcher::new(vec![Ok(b"v1".to_vec()), Ok(b"v2".to_vec())]);
        let (cache, clock) = cache_in(&temp, "https://example.com/a", fetcher);
        let mut cache = cache.with_default_duration("").unwrap();

        cache.resolve(&ResolveOptions::new()).unwrap();
        clock.advance(chrono::Duration::days(3650));
        let output = cache.resolve(&ResolveOptions::new()).unwrap();

        assert_eq!(output.as_bytes(), Some(&b"v1"[..]));
    }

    #[test]
    fn set_default_duration_rejects_garbage() {
        let mut cache = AssetCache::with_fetcher("u", ScriptedFetcher::ok(b""));
        assert!(cache.set_default_duration("soon").is_err());
        assert_eq!(cache.default_duration(), "1d");
    }

    #[test]
    fn records_survive_a_new_instance() {
        let temp = TempDir::new().unwrap();
        let url = "https://example.com/a";
        let (mut first, _clock) = cache_in(&temp, url, ScriptedFetcher::ok(b"persisted"));
        first.resolve(&ResolveOptions::new()).unwrap();

        let (mut second, _clock) = cache_in(&temp, url, ScriptedFetcher::new(Vec::new()));
        let output = second.resolve(&ResolveOptions::new()).unwrap();

        assert_eq!(output.as_bytes(), Some(&b"persisted"[..]));
        assert_eq!(second.fetcher.calls.get(), 0);
    }

    #[test]
    fn changing_url_reopens_store() {
        let temp = TempDir::new().unwrap();
        let fetcher = ScriptedFetcher::new(vec![Ok(b"a".to_vec()), Ok(b"b".to_vec())]);
        let (mut cache, _clock) = cache_in(&temp, "https://example.com/a", fetcher);

        cache.resolve(&ResolveOptions::new()).unwrap();
        let first_path = cache.store().unwrap().path().to_path_buf();

        cache.set_url("https://example.com/b");
        assert!(cache.cached_record().unwrap().is_none());
        let second_path = cache.store().unwrap().path().to_path_buf();
        assert_ne!(first_path, second_path);

        let output = cache.resolve(&ResolveOptions::new()).unwrap();
        assert_eq!(output.as_bytes(), Some(&b"b"[..]));

        cache.set_url("https://example.com/a");
        assert_eq!(cache.cached_record().unwrap().unwrap().payload, b"a");
    }

    #[test]
    fn same_url_keeps_store_clean() {
        let temp = TempDir::new().unwrap();
        let (mut cache, _clock) =
            cache_in(&temp, "https://example.com/a", ScriptedFetcher::ok(b""));

        cache.store().unwrap();
        cache.set_url("https://example.com/a");
        assert!(!cache.store_dirty);
    }

    #[test]
    fn changing_directory_reopens_store() {
        let temp = TempDir::new().unwrap();
        let (mut cache, _clock) =
            cache_in(&temp, "https://example.com/a", ScriptedFetcher::ok(b"a"));
        cache.resolve(&ResolveOptions::new()).unwrap();

        cache.set_cache_directory(temp.path().join("other"));
        assert!(cache.store_dirty);
        assert!(cache.cached_record().unwrap().is_none());
        assert!(!cache.store_dirty);
        assert!(cache
            .store()
            .unwrap()
            .path()
            .starts_with(temp.path().join("other")));
    }

    #[test]
    fn store_is_opened_with_absolute_directory() {
        let cache_dir = PathBuf::from("relative-cache-dir");
        let mut cache = AssetCache::with_fetcher("https://example.com/a", ScriptedFetcher::ok(b""))
            .in_directory(&cache_dir);

        let path = cache.store().unwrap().path().to_path_buf();
        assert!(path.is_absolute());
        assert!(path.ends_with(cache.cache_path()));
    }

    #[test]
    fn needs_refetch_tracks_clock() {
        let temp = TempDir::new().unwrap();
        let (mut cache, clock) =
            cache_in(&temp, "https://example.com/a", ScriptedFetcher::ok(b"a"));

        assert!(cache.needs_refetch("*").unwrap());
        cache.resolve(&ResolveOptions::new()).unwrap();

        clock.set(T0 + 23 * HOUR_MS);
        assert!(!cache.needs_refetch("1d").unwrap());
        clock.set(T0 + 25 * HOUR_MS);
        assert!(cache.needs_refetch("1d").unwrap());
        assert!(!cache.needs_refetch("*").unwrap());
    }

    #[test]
    fn freshness_reports_state() {
        let temp = TempDir::new().unwrap();
        let (mut cache, clock) =
            cache_in(&temp, "https://example.com/a", ScriptedFetcher::ok(b"a"));

        assert_eq!(cache.freshness("1h").unwrap(), ValidationResult::NotFound);
        cache.resolve(&ResolveOptions::new()).unwrap();
        assert_eq!(cache.freshness("1h").unwrap(), ValidationResult::Fresh);
        clock.advance(chrono::Duration::hours(2));
        assert_eq!(cache.freshness("1h").unwrap(), ValidationResult::Expired);
    }

    #[test]
    fn creates_nested_cache_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("a").join("b").join("c");
        let mut cache = AssetCache::with_fetcher("https://example.com/a", ScriptedFetcher::ok(b"x"))
            .in_directory(&dir);

        cache.resolve(&ResolveOptions::new()).unwrap();

        assert!(dir.join(cache.cache_filename()).exists());
    }
}
