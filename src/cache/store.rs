//! Timestamped cache entries on top of a [`CacheBackend`]
//!
//! Every entry is persisted as a single JSON document `{"data": ..., "timestamp": ...}`.
//! Reads never fail: corrupt records are deleted and reported as absent, and an
//! unavailable backend is treated the same as an empty one.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::backend::{BackendError, CacheBackend};
use super::key::ResourceKey;

/// Cache-layer problems that degrade to "act as if nothing was cached"
///
/// These never reach the user. They are kept apart from remote-call failures,
/// which the user does see.
#[derive(Debug, Error)]
pub enum SoftFailure {
    /// Stored value did not decode as an entry and was discarded
    #[error("cache entry `{key}` was corrupt and has been discarded: {reason}")]
    Corrupt { key: String, reason: String },

    /// Backend could not be read
    #[error("cache read failed: {0}")]
    Unavailable(#[source] BackendError),

    /// Backend rejected the write
    #[error("cache write failed: {0}")]
    WriteFailed(#[source] BackendError),

    /// Payload could not be serialized
    #[error("cache entry could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persisted form of an entry
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry<T> {
    data: T,
    timestamp: i64,
}

/// A cached payload and the time it was written
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    /// Storage key the entry was read under
    pub key: String,
    pub data: T,
    /// Write time in milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Returns true while `entry` is younger than `ttl` at time `now` (both in epoch millis)
pub fn is_fresh<T>(entry: &CacheEntry<T>, now: i64, ttl: Duration) -> bool {
    let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    now.saturating_sub(entry.timestamp) < ttl_millis
}

/// Reads and writes whole timestamped entries
#[derive(Debug, Clone)]
pub struct CacheStore<B> {
    backend: B,
}

impl<B: CacheBackend> CacheStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Reads the entry for `key`, reporting soft failures explicitly
    ///
    /// A corrupt record is removed from the backend before
    /// [`SoftFailure::Corrupt`] is returned, so the next read sees a clean miss.
    pub fn lookup<T: DeserializeOwned>(
        &self,
        key: &ResourceKey,
    ) -> Result<Option<CacheEntry<T>>, SoftFailure> {
        let storage_key = key.as_storage_key();
        let Some(raw) = self
            .backend
            .get(&storage_key)
            .map_err(SoftFailure::Unavailable)?
        else {
            return Ok(None);
        };

        match serde_json::from_str::<StoredEntry<T>>(&raw) {
            Ok(stored) => Ok(Some(CacheEntry {
                key: storage_key,
                data: stored.data,
                timestamp: stored.timestamp,
            })),
            Err(e) => {
                if let Err(remove_err) = self.backend.remove(&storage_key) {
                    log::debug!("Failed to remove corrupt cache entry {}: {}", storage_key, remove_err);
                }
                Err(SoftFailure::Corrupt {
                    key: storage_key,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Reads the entry for `key`; any soft failure reads as a miss
    pub fn get<T: DeserializeOwned>(&self, key: &ResourceKey) -> Option<CacheEntry<T>> {
        match self.lookup(key) {
            Ok(entry) => entry,
            Err(failure) => {
                log::debug!("Cache miss for {}: {}", key, failure);
                None
            }
        }
    }

    /// Replaces the entry for `key`
    ///
    /// Callers are expected to treat an error as non-fatal.
    pub fn put<T: Serialize>(
        &self,
        key: &ResourceKey,
        data: &T,
        timestamp: i64,
    ) -> Result<(), SoftFailure> {
        let json = serde_json::to_string(&StoredEntry { data, timestamp })?;
        self.backend
            .set(&key.as_storage_key(), &json)
            .map_err(SoftFailure::WriteFailed)
    }

    /// Deletes the entry for `key`
    pub fn remove(&self, key: &ResourceKey) -> Result<(), SoftFailure> {
        self.backend
            .remove(&key.as_storage_key())
            .map_err(SoftFailure::WriteFailed)
    }
}
