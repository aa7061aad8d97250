use crate::fetcher::calculate_sha256;
use crate::{Error, Result};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info, warn};

const CATALOG_DIR: &str = "catalogs";

/// A raw catalog payload as last fetched from a URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedCatalog {
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    /// Base64 SHA-256 of the serialized payload
    pub sha256: String,
    pub payload: Value,
}

impl CachedCatalog {
    /// Stamp `payload` with the current time.
    pub fn new(url: &str, payload: Value) -> Result<Self> {
        let bytes = serde_json::to_vec(&payload)?;
        Ok(Self {
            url: url.to_string(),
            fetched_at: Utc::now(),
            sha256: calculate_sha256(&bytes),
            payload,
        })
    }
}

/// Key/value store for raw payloads, keyed by catalog URL.
///
/// Only raw payloads are cached; records and the search index are always
/// rebuilt from them.
pub trait CatalogCache: Send + Sync {
    /// Cached payload for `url`, if any.
    fn load(&self, url: &str) -> Result<Option<CachedCatalog>>;

    /// Store `payload` for `url`, replacing any previous entry.
    fn save(&self, url: &str, payload: &Value) -> Result<CachedCatalog>;

    /// Remove every entry, returning how many were removed.
    fn clear(&self) -> Result<usize>;

    /// All entries, ordered by URL.
    fn list(&self) -> Result<Vec<CachedCatalog>>;
}

/// Filesystem payload cache, one JSON file per catalog URL
#[derive(Debug, Clone)]
pub struct Storage {
    root_dir: PathBuf,
}

impl Storage {
    /// Creates a storage instance at the default data directory
    ///
    /// `GSX_DATA_DIR` takes precedence, then `XDG_DATA_HOME/gsx`, then the
    /// platform data directory.
    pub fn new() -> Result<Self> {
        if let Ok(dir) = std::env::var("GSX_DATA_DIR") {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                return Self::with_root(PathBuf::from(trimmed));
            }
        }

        let root_dir = match std::env::var("XDG_DATA_HOME") {
            Ok(xdg) if !xdg.trim().is_empty() => PathBuf::from(xdg.trim()).join("gsx"),
            _ => ProjectDirs::from("dev", "gsx", "gsx")
                .ok_or_else(|| Error::Storage("Failed to determine data directory".into()))?
                .data_dir()
                .to_path_buf(),
        };
        Self::with_root(root_dir)
    }

    /// Creates a storage instance rooted at `root_dir`
    pub fn with_root(root_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(root_dir.join(CATALOG_DIR))
            .map_err(|e| Error::Storage(format!("Failed to create root directory: {e}")))?;
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn catalogs_dir(&self) -> PathBuf {
        self.root_dir.join(CATALOG_DIR)
    }

    /// File holding the entry for `url`
    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.catalogs_dir().join(format!("{}.json", entry_key(url)))
    }

    fn read_entry(path: &Path) -> Result<CachedCatalog> {
        let json = fs::read_to_string(path)
            .map_err(|e| Error::Storage(format!("Failed to read cache entry: {e}")))?;
        serde_json::from_str(&json)
            .map_err(|e| Error::Storage(format!("Failed to parse cache entry: {e}")))
    }
}

/// URL-safe base64 SHA-256 of the URL, usable as a file name
fn entry_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

impl CatalogCache for Storage {
    fn load(&self, url: &str) -> Result<Option<CachedCatalog>> {
        let path = self.entry_path(url);
        if !path.exists() {
            debug!("No cached catalog for {url}");
            return Ok(None);
        }
        Self::read_entry(&path).map(Some)
    }

    fn save(&self, url: &str, payload: &Value) -> Result<CachedCatalog> {
        let entry = CachedCatalog::new(url, payload.clone())?;
        let path = self.entry_path(url);
        let json = serde_json::to_string(&entry)
            .map_err(|e| Error::Storage(format!("Failed to serialize cache entry: {e}")))?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .map_err(|e| Error::Storage(format!("Failed to write cache entry: {e}")))?;

        #[cfg(target_os = "windows")]
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| Error::Storage(format!("Failed to remove existing entry: {e}")))?;
        }
        fs::rename(&tmp_path, &path)
            .map_err(|e| Error::Storage(format!("Failed to commit cache entry: {e}")))?;

        debug!("Cached catalog for {url} at {}", path.display());
        Ok(entry)
    }

    fn clear(&self) -> Result<usize> {
        let dir = self.catalogs_dir();
        let mut removed = 0;
        if let Ok(entries) = fs::read_dir(&dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    fs::remove_file(&path).map_err(|e| {
                        Error::Storage(format!("Failed to remove cache entry: {e}"))
                    })?;
                    removed += 1;
                }
            }
        }
        info!("Removed {removed} cached catalogs");
        Ok(removed)
    }

    fn list(&self) -> Result<Vec<CachedCatalog>> {
        let mut catalogs = Vec::new();
        if let Ok(entries) = fs::read_dir(self.catalogs_dir()) {
            for entry in entries.flatten() {
                let path = entry.path();
                if !path.extension().is_some_and(|ext| ext == "json") {
                    continue;
                }
                match Self::read_entry(&path) {
                    Ok(catalog) => catalogs.push(catalog),
                    Err(e) => warn!("Skipping unreadable cache entry {}: {e}", path.display()),
                }
            }
        }
        catalogs.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(catalogs)
    }
}

/// In-process payload cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<BTreeMap<String, CachedCatalog>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Storage("Memory cache lock poisoned".into())
}

impl CatalogCache for MemoryCache {
    fn load(&self, url: &str) -> Result<Option<CachedCatalog>> {
        Ok(self.entries.read().map_err(poisoned)?.get(url).cloned())
    }

    fn save(&self, url: &str, payload: &Value) -> Result<CachedCatalog> {
        let entry = CachedCatalog::new(url, payload.clone())?;
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(url.to_string(), entry.clone());
        Ok(entry)
    }

    fn clear(&self) -> Result<usize> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }

    fn list(&self) -> Result<Vec<CachedCatalog>> {
        Ok(self
            .entries
            .read()
            .map_err(poisoned)?
            .values()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const URL: &str = "https://example.org/catalog.json";

    fn create_test_storage() -> (Storage, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let storage = Storage::with_root(temp_dir.path().to_path_buf())
            .expect("Failed to create test storage");
        (storage, temp_dir)
    }

    #[test]
    fn test_storage_creation_with_root() {
        let (storage, temp_dir) = create_test_storage();
        assert_eq!(storage.root_dir(), temp_dir.path());
        assert!(temp_dir.path().join(CATALOG_DIR).is_dir());
    }

    #[test]
    fn test_load_missing_returns_none() {
        let (storage, _temp_dir) = create_test_storage();
        assert!(storage.load(URL).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let (storage, _temp_dir) = create_test_storage();
        let payload = json!({"catalog": {"controls": [{"id": "A"}]}});

        let saved = storage.save(URL, &payload).unwrap();
        let loaded = storage.load(URL).unwrap().unwrap();

        assert_eq!(loaded, saved);
        assert_eq!(loaded.payload, payload);
        assert_eq!(loaded.url, URL);
        assert!(!storage.entry_path(URL).with_extension("json.tmp").exists());
    }

    #[test]
    fn test_save_replaces_entry() {
        let (storage, _temp_dir) = create_test_storage();
        storage.save(URL, &json!({"v": 1})).unwrap();
        storage.save(URL, &json!({"v": 2})).unwrap();

        assert_eq!(storage.load(URL).unwrap().unwrap().payload, json!({"v": 2}));
        assert_eq!(storage.list().unwrap().len(), 1);
    }

    #[test]
    fn test_entry_key_is_file_name_safe() {
        let key = entry_key("https://example.org/a?b=c&d=/e");
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(key, entry_key("https://example.org/other"));
    }

    #[test]
    fn test_list_and_clear() {
        let (storage, temp_dir) = create_test_storage();
        storage.save("https://b.example/c.json", &json!({})).unwrap();
        storage.save("https://a.example/c.json", &json!({})).unwrap();
        fs::write(temp_dir.path().join(CATALOG_DIR).join("junk.json"), "not json").unwrap();

        let urls: Vec<String> = storage.list().unwrap().into_iter().map(|c| c.url).collect();
        assert_eq!(urls, vec!["https://a.example/c.json", "https://b.example/c.json"]);

        assert_eq!(storage.clear().unwrap(), 3);
        assert!(storage.list().unwrap().is_empty());
        assert!(storage.load("https://a.example/c.json").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_entry_is_storage_error() {
        let (storage, _temp_dir) = create_test_storage();
        fs::write(storage.entry_path(URL), "{ truncated").unwrap();
        let err = storage.load(URL).unwrap_err();
        assert_eq!(err.category(), "storage");
    }

    #[test]
    fn test_memory_cache() {
        let cache = MemoryCache::new();
        assert!(cache.load(URL).unwrap().is_none());

        let saved = cache.save(URL, &json!({"catalog": {}})).unwrap();
        assert_eq!(cache.load(URL).unwrap(), Some(saved));
        assert_eq!(cache.list().unwrap().len(), 1);
        assert_eq!(cache.clear().unwrap(), 1);
        assert!(cache.list().unwrap().is_empty());
    }

    #[test]
    fn test_cached_catalog_hash_tracks_payload() {
        let a = CachedCatalog::new(URL, json!({"a": 1})).unwrap();
        let b = CachedCatalog::new(URL, json!({"a": 2})).unwrap();
        assert_ne!(a.sha256, b.sha256);
    }
}
