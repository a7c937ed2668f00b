//! Cache module for storing remote responses locally
//!
//! A [`CacheStore`] keeps one timestamped entry per [`ResourceKey`] on top of a
//! simple key/value [`CacheBackend`]. Corruption and storage failures are soft:
//! they make the cache behave as if it were empty and are never shown to the user.

mod backend;
mod key;
mod store;

pub use backend::{BackendError, CacheBackend, FileBackend, MemoryBackend};
pub use key::ResourceKey;
pub use store::{is_fresh, CacheEntry, CacheStore, SoftFailure};
