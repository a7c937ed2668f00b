//! Key/value persistence surfaces for the cache store
//!
//! A backend is a plain synchronous string store. It knows nothing about entry
//! formats or freshness; that lives in [`super::CacheStore`].

use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// Filesystem operation failed
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Storage refused the operation (disabled, over quota, ...)
    #[error("cache storage unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous key -> string storage
pub trait CacheBackend {
    /// Returns the stored value, or `None` when the key has never been written
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Replaces the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Removes `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), BackendError>;
}

/// Stores each key as a JSON file in a cache directory
///
/// Uses the XDG cache directory (`~/.cache/ghpeek/` on Linux) unless an
/// explicit directory is given. Values are written to a temporary file and
/// renamed into place, so readers never observe a half-written entry.
#[derive(Debug, Clone)]
pub struct FileBackend {
    cache_dir: PathBuf,
}

impl FileBackend {
    /// Creates a backend in the platform cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "ghpeek")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a backend rooted at a custom directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }
}

impl CacheBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        match fs::read(self.entry_path(key)) {
            // Invalid UTF-8 is left for the store to reject as a corrupt entry
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        fs::create_dir_all(&self.cache_dir)?;

        let path = self.entry_path(key);
        let tmp_path = self.cache_dir.join(format!("{}.json.tmp", key));
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-process backend
///
/// Clones share the same map. Reads and writes can be switched to fail, which
/// stands in for disabled or full storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes every subsequent `get` fail
    pub fn fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    /// Makes every subsequent `set` fail, as a full quota would
    pub fn fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Stores a raw value, bypassing failure injection
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.state()
            .entries
            .insert(key.to_string(), value.to_string());
    }

    /// Reads a raw value, bypassing failure injection
    pub fn raw(&self, key: &str) -> Option<String> {
        self.state().entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let state = self.state();
        if state.fail_reads {
            return Err(BackendError::Unavailable("reads disabled".to_string()));
        }
        Ok(state.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(BackendError::Unavailable("quota exceeded".to_string()));
        }
        state.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.state().entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_file_backend() -> (FileBackend, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let backend = FileBackend::with_dir(temp_dir.path().to_path_buf());
        (backend, temp_dir)
    }

    #[test]
    fn test_file_backend_set_creates_file_in_cache_directory() {
        let (backend, temp_dir) = create_file_backend();

        backend.set("github_profile_octocat", "{\"a\":1}").expect("Set should succeed");

        let expected_path = temp_dir.path().join("github_profile_octocat.json");
        assert!(expected_path.exists(), "Cache file should exist");
        assert_eq!(fs::read_to_string(expected_path).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_file_backend_get_missing_key_is_none() {
        let (backend, _temp_dir) = create_file_backend();

        assert!(backend.get("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_file_backend_overwrites_and_leaves_no_temp_file() {
        let (backend, temp_dir) = create_file_backend();

        backend.set("key", "first").unwrap();
        backend.set("key", "second").unwrap();

        assert_eq!(backend.get("key").unwrap().as_deref(), Some("second"));
        assert!(!temp_dir.path().join("key.json.tmp").exists());
    }

    #[test]
    fn test_file_backend_creates_directory_if_missing() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested").join("cache");
        let backend = FileBackend::with_dir(nested.clone());

        backend.set("key", "value").expect("Set should succeed");

        assert!(nested.join("key.json").exists());
    }

    #[test]
    fn test_file_backend_remove_is_idempotent() {
        let (backend, _temp_dir) = create_file_backend();

        backend.set("key", "value").unwrap();
        backend.remove("key").unwrap();
        backend.remove("key").unwrap();

        assert!(backend.get("key").unwrap().is_none());
    }

    #[test]
    fn test_file_backend_reads_invalid_utf8_lossily() {
        let (backend, temp_dir) = create_file_backend();
        fs::write(temp_dir.path().join("key.json"), [0xff, 0xfe, b'x']).unwrap();

        let value = backend.get("key").unwrap().expect("value should be present");
        assert!(value.ends_with('x'));
    }

    #[test]
    fn test_new_uses_project_cache_path() {
        if let Some(backend) = FileBackend::new() {
            let path_str = backend.cache_dir().to_string_lossy();
            assert!(path_str.contains("ghpeek"), "Cache path should contain project name");
        }
        // Passes if new() returns None (e.g., no home directory in CI)
    }

    #[test]
    fn test_memory_backend_clones_share_entries() {
        let backend = MemoryBackend::new();
        let other = backend.clone();

        backend.set("key", "value").unwrap();

        assert_eq!(other.get("key").unwrap().as_deref(), Some("value"));
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_memory_backend_failure_injection() {
        let backend = MemoryBackend::new();
        backend.insert_raw("key", "value");

        backend.fail_reads(true);
        assert!(matches!(backend.get("key"), Err(BackendError::Unavailable(_))));

        backend.fail_writes(true);
        assert!(backend.set("key", "new").is_err());
        assert_eq!(backend.raw("key").as_deref(), Some("value"));
    }
}
