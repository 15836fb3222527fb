//! Authorization token cache.
//!
//! A TV issues a token once the user approves the connection on screen.
//! Reusing it on later connections skips the prompt. Tokens are keyed by the
//! device id from the metadata document.
//!
//! # File Format
//!
//! ```json
//! {
//!   "uuid:5b5e3a3c-...": {
//!     "token": "13315209",
//!     "dateAdded": 1700000000000,
//!     "dateModified": 1700000500000,
//!     "lastKnownIp": "192.168.1.20"
//!   }
//! }
//! ```
//!
//! Dates are Unix epoch milliseconds.

// ============================================================================
// Imports
// ============================================================================

use std::io::{Error as IoError, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::error::Result;
use crate::identifiers::DeviceId;

use super::config::TokenCache;

// ============================================================================
// Constants
// ============================================================================

/// Cache file used when caching is enabled without a location.
pub const DEFAULT_CACHE_LOCATION: &str = "./samsung_token_cache.json";

/// Write locks shared by every store in the process, keyed by cache path.
static CACHE_LOCKS: LazyLock<Mutex<FxHashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>> =
    LazyLock::new(Default::default);

// ============================================================================
// TokenStore
// ============================================================================

/// Persistent mapping from device id to its last known token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns the cached token for `device_id`.
    ///
    /// Returns `None` if caching is disabled, nothing was stored yet, or the
    /// id is unknown.
    async fn retrieve_token(&self, device_id: &DeviceId) -> Result<Option<String>>;

    /// Stores `token` for `device_id`.
    ///
    /// Keeps the first `dateAdded` of an existing entry and refreshes the
    /// rest.
    async fn save_token(&self, device_id: &DeviceId, token: &str, ip: &str) -> Result<()>;
}

// ============================================================================
// TokenCacheEntry
// ============================================================================

/// A cached token with its bookkeeping dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCacheEntry {
    /// Authorization token.
    pub token: String,
    /// First time a token was stored for the device.
    pub date_added: i64,
    /// Last time the entry was written.
    pub date_modified: i64,
    /// Address the device was last reached at.
    pub last_known_ip: String,
}

// ============================================================================
// TokenCacheFile
// ============================================================================

/// In-memory form of the cache file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenCacheFile {
    entries: FxHashMap<DeviceId, TokenCacheEntry>,
}

impl TokenCacheFile {
    /// Parses cache file contents. Blank contents are an empty cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the contents are not a
    /// valid cache.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes the cache as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the entry for `device_id`.
    #[inline]
    #[must_use]
    pub fn get(&self, device_id: &DeviceId) -> Option<&TokenCacheEntry> {
        self.entries.get(device_id)
    }

    /// Returns the number of cached devices.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no device is cached.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or refreshes the entry for `device_id` at time `now`.
    pub fn upsert(&mut self, device_id: &DeviceId, token: &str, ip: &str, now: i64) {
        // A device seen for the first time has no entry to read from
        let date_added = self
            .entries
            .get(device_id)
            .map(|entry| entry.date_added)
            .filter(|added| *added > 0)
            .unwrap_or(now);

        self.entries.insert(
            device_id.clone(),
            TokenCacheEntry {
                token: token.to_string(),
                date_added,
                date_modified: now,
                last_known_ip: ip.to_string(),
            },
        );
    }
}

/// Current time in epoch milliseconds.
fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Returns the process-wide write lock for the cache file at `location`.
///
/// Paths naming the same file through different spellings share a lock as
/// long as the parent directory exists.
fn cache_lock(location: &Path) -> Arc<tokio::sync::Mutex<()>> {
    let key = lock_key(location);
    CACHE_LOCKS.lock().entry(key).or_default().clone()
}

fn lock_key(location: &Path) -> PathBuf {
    let absolute = std::path::absolute(location).unwrap_or_else(|_| location.to_path_buf());

    if let (Some(dir), Some(name)) = (absolute.parent(), absolute.file_name())
        && let Ok(dir) = dir.canonicalize()
    {
        return dir.join(name);
    }
    absolute
}

/// Replaces the file at `location` with `contents`.
///
/// Writes a temporary file in the same directory and renames it over the
/// target, so readers see either the old or the new cache.
fn write_atomic(location: &Path, contents: &str) -> std::io::Result<()> {
    let dir = match location.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(location).map_err(|e| e.error)?;
    Ok(())
}

// ============================================================================
// FileTokenStore
// ============================================================================

/// Token store backed by a JSON file.
///
/// A disabled store never reads or writes the file. Saves through any
/// store in the process that points at the same file run one at a time.
#[derive(Debug)]
pub struct FileTokenStore {
    /// Path of the cache file.
    location: PathBuf,
    /// Whether caching is enabled.
    enabled: bool,
}

impl FileTokenStore {
    /// Creates an enabled store at `location`.
    #[must_use]
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            enabled: true,
        }
    }

    /// Creates a disabled store.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(DEFAULT_CACHE_LOCATION)
        }
    }

    /// Creates the store described by a device configuration.
    #[must_use]
    pub fn from_config(cache: &TokenCache) -> Self {
        match cache {
            TokenCache::Disabled => Self::disabled(),
            TokenCache::Enabled { location } => Self::new(location.clone()),
        }
    }

    /// Returns the cache file path.
    #[inline]
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Returns `true` if caching is enabled.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Reads the cache file. A missing file is an empty cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) or
    /// [`Error::Json`](crate::Error::Json) if the file cannot be read or
    /// parsed.
    pub async fn load(&self) -> Result<TokenCacheFile> {
        match tokio::fs::read_to_string(&self.location).await {
            Ok(text) => TokenCacheFile::parse(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(TokenCacheFile::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn retrieve_token(&self, device_id: &DeviceId) -> Result<Option<String>> {
        if !self.enabled {
            return Ok(None);
        }

        let cache = self.load().await?;
        let token = cache.get(device_id).map(|entry| entry.token.clone());

        trace!(device_id = %device_id, found = token.is_some(), "Token lookup");
        Ok(token)
    }

    async fn save_token(&self, device_id: &DeviceId, token: &str, ip: &str) -> Result<()> {
        if !self.enabled {
            debug!(device_id = %device_id, "Token caching disabled, not saving");
            return Ok(());
        }

        let lock = cache_lock(&self.location);
        let _guard = lock.lock().await;

        let mut cache = self.load().await?;
        cache.upsert(device_id, token, ip, now_millis());

        let contents = cache.to_json()?;
        let location = self.location.clone();
        tokio::task::spawn_blocking(move || write_atomic(&location, &contents))
            .await
            .map_err(IoError::other)??;

        debug!(device_id = %device_id, path = %self.location.display(), "Token saved");
        Ok(())
    }
}

// ============================================================================
// MemoryTokenStore
// ============================================================================

/// Token store kept in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    cache: Mutex<TokenCacheFile>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the entry for `device_id`.
    #[must_use]
    pub fn entry(&self, device_id: &DeviceId) -> Option<TokenCacheEntry> {
        self.cache.lock().get(device_id).cloned()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn retrieve_token(&self, device_id: &DeviceId) -> Result<Option<String>> {
        Ok(self.cache.lock().get(device_id).map(|entry| entry.token.clone()))
    }

    async fn save_token(&self, device_id: &DeviceId, token: &str, ip: &str) -> Result<()> {
        self.cache.lock().upsert(device_id, token, ip, now_millis());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::Error;

    fn device() -> DeviceId {
        DeviceId::from("uuid:5b5e3a3c-8d59-4f0b-9c2e-7e2c9f1b5a11")
    }

    #[test]
    fn test_upsert_keeps_date_added() {
        let mut cache = TokenCacheFile::default();
        cache.upsert(&device(), "first", "10.0.0.2", 1_000);
        cache.upsert(&device(), "second", "10.0.0.3", 2_000);

        let entry = cache.get(&device()).expect("entry");
        assert_eq!(entry.date_added, 1_000);
        assert_eq!(entry.date_modified, 2_000);
        assert_eq!(entry.token, "second");
        assert_eq!(entry.last_known_ip, "10.0.0.3");
    }

    #[test]
    fn test_upsert_new_device_defaults_to_now() {
        let mut cache = TokenCacheFile::default();
        cache.upsert(&DeviceId::from("uuid:other"), "t", "10.0.0.9", 500);
        cache.upsert(&device(), "t", "10.0.0.2", 1_500);

        let entry = cache.get(&device()).expect("entry");
        assert_eq!(entry.date_added, 1_500);
        assert_eq!(entry.date_modified, 1_500);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_parse_blank_file() {
        assert!(TokenCacheFile::parse("").expect("parse").is_empty());
        assert!(TokenCacheFile::parse("  \n").expect("parse").is_empty());
        assert!(matches!(TokenCacheFile::parse("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_file_format_is_camel_case() {
        let mut cache = TokenCacheFile::default();
        cache.upsert(&device(), "13315209", "192.168.1.20", 1_700_000_000_000);

        let json: serde_json::Value =
            serde_json::from_str(&cache.to_json().expect("json")).expect("parse");
        let entry = &json["uuid:5b5e3a3c-8d59-4f0b-9c2e-7e2c9f1b5a11"];
        assert_eq!(entry["token"], "13315209");
        assert_eq!(entry["dateAdded"], 1_700_000_000_000_i64);
        assert_eq!(entry["lastKnownIp"], "192.168.1.20");
    }

    #[tokio::test]
    async fn test_retrieve_missing_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let store = FileTokenStore::new(temp.path().join("cache.json"));

        assert_eq!(store.retrieve_token(&device()).await.expect("retrieve"), None);
    }

    #[tokio::test]
    async fn test_save_then_retrieve() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let store = FileTokenStore::new(temp.path().join("nested").join("cache.json"));

        store
            .save_token(&device(), "13315209", "192.168.1.20")
            .await
            .expect("save");

        assert_eq!(
            store.retrieve_token(&device()).await.expect("retrieve"),
            Some("13315209".to_string())
        );
        assert_eq!(
            store
                .retrieve_token(&DeviceId::from("uuid:unknown"))
                .await
                .expect("retrieve"),
            None
        );
    }

    #[tokio::test]
    async fn test_second_save_preserves_date_added() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let store = FileTokenStore::new(temp.path().join("cache.json"));

        store.save_token(&device(), "a", "10.0.0.2").await.expect("save");
        let first = store.load().await.expect("load").get(&device()).cloned().expect("entry");

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.save_token(&device(), "b", "10.0.0.3").await.expect("save");
        let second = store.load().await.expect("load").get(&device()).cloned().expect("entry");

        assert_eq!(second.date_added, first.date_added);
        assert!(second.date_modified > first.date_modified);
        assert_eq!(second.token, "b");
    }

    #[tokio::test]
    async fn test_save_into_empty_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("cache.json");
        std::fs::write(&path, "").expect("write");

        let store = FileTokenStore::new(&path);
        store.save_token(&device(), "t", "10.0.0.2").await.expect("save");

        assert_eq!(store.load().await.expect("load").len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_store_ignores_contents() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("cache.json");

        FileTokenStore::new(&path)
            .save_token(&device(), "t", "10.0.0.2")
            .await
            .expect("save");

        let disabled = FileTokenStore {
            enabled: false,
            ..FileTokenStore::new(&path)
        };
        assert_eq!(disabled.retrieve_token(&device()).await.expect("retrieve"), None);
    }

    #[tokio::test]
    async fn test_disabled_store_never_writes() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("cache.json");
        let store = FileTokenStore {
            enabled: false,
            ..FileTokenStore::new(&path)
        };

        store.save_token(&device(), "t", "10.0.0.2").await.expect("save");
        assert!(!path.exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_across_stores() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("cache.json");
        let tv_a = DeviceId::from("uuid:tv-a");
        let tv_b = DeviceId::from("uuid:tv-b");

        for round in 0..25 {
            let save = |device: DeviceId, token: String| {
                let store = FileTokenStore::new(&path);
                tokio::spawn(async move { store.save_token(&device, &token, "10.0.0.2").await })
            };
            let read = {
                let store = FileTokenStore::new(&path);
                let device = tv_a.clone();
                tokio::spawn(async move { store.retrieve_token(&device).await })
            };

            let save_a = save(tv_a.clone(), format!("a{round}"));
            let save_b = save(tv_b.clone(), format!("b{round}"));

            save_a.await.expect("join").expect("save a");
            save_b.await.expect("join").expect("save b");
            read.await.expect("join").expect("read during saves");

            let store = FileTokenStore::new(&path);
            assert_eq!(
                store.retrieve_token(&tv_a).await.expect("retrieve"),
                Some(format!("a{round}")),
                "round {round}"
            );
            assert_eq!(
                store.retrieve_token(&tv_b).await.expect("retrieve"),
                Some(format!("b{round}")),
                "round {round}"
            );
        }
    }

    #[test]
    fn test_lock_shared_across_spellings() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let plain = temp.path().join("cache.json");
        let dotted = temp.path().join(".").join("cache.json");

        assert!(Arc::ptr_eq(&cache_lock(&plain), &cache_lock(&dotted)));
        assert!(!Arc::ptr_eq(
            &cache_lock(&plain),
            &cache_lock(&temp.path().join("other.json"))
        ));
    }

    #[test]
    fn test_from_config() {
        assert!(!FileTokenStore::from_config(&TokenCache::Disabled).is_enabled());

        let store = FileTokenStore::from_config(&TokenCache::Enabled {
            location: PathBuf::from("/tmp/tv.json"),
        });
        assert!(store.is_enabled());
        assert_eq!(store.location(), Path::new("/tmp/tv.json"));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.retrieve_token(&device()).await.expect("retrieve"), None);

        store.save_token(&device(), "t1", "10.0.0.2").await.expect("save");
        store.save_token(&device(), "t2", "10.0.0.2").await.expect("save");

        let entry = store.entry(&device()).expect("entry");
        assert_eq!(entry.token, "t2");
        assert!(entry.date_added <= entry.date_modified);
    }
}
