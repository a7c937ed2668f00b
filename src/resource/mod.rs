//! Cached remote resource
//!
//! [`CachedResource`] decides between a fresh cache entry and a remote call,
//! runs the call on a background task, classifies the result into a
//! [`FetchOutcome`] and writes successful data back to the cache. Results come
//! back over a channel tagged with the activation they belong to, so a result
//! for a view that has since been closed or reopened is dropped.
//!
//! Spawning uses `tokio::spawn`; `open` and `retry` must be called from inside
//! a tokio runtime.

mod fetcher;
mod outcome;

pub use fetcher::{FetchError, Fetcher};
pub use outcome::{format_reset, FetchOutcome, LOAD_FAILED_MESSAGE};

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cache::{is_fresh, CacheBackend, CacheStore, ResourceKey};
use crate::clock::Clock;

/// Default freshness window for cached entries
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Result of one background fetch
struct Completion<T> {
    generation: u64,
    result: Result<T, FetchError>,
}

/// One open..close cycle
struct Activation {
    key: ResourceKey,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// A remote resource fronted by a TTL cache
///
/// At most one fetch is in flight per instance. Deduplication is per instance
/// only; two instances sharing a backend may both fetch the same key.
pub struct CachedResource<T, F, B, C> {
    store: CacheStore<B>,
    fetcher: Arc<F>,
    clock: C,
    ttl: Duration,
    generation: u64,
    active: Option<Activation>,
    outcome: Option<FetchOutcome<T>>,
    tx: mpsc::UnboundedSender<Completion<T>>,
    rx: mpsc::UnboundedReceiver<Completion<T>>,
}

impl<T, F, B, C> CachedResource<T, F, B, C>
where
    T: Serialize + DeserializeOwned + Clone + Send + 'static,
    F: Fetcher<T> + 'static,
    B: CacheBackend,
    C: Clock,
{
    /// Creates a resource with the default TTL
    pub fn new(store: CacheStore<B>, fetcher: F, clock: C) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            store,
            fetcher: Arc::new(fetcher),
            clock,
            ttl: DEFAULT_TTL,
            generation: 0,
            active: None,
            outcome: None,
            tx,
            rx,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &CacheStore<B> {
        &self.store
    }

    /// Key of the current activation, if any
    pub fn active_key(&self) -> Option<&ResourceKey> {
        self.active.as_ref().map(|a| &a.key)
    }

    /// Current outcome; `None` while closed
    pub fn outcome(&self) -> Option<&FetchOutcome<T>> {
        self.outcome.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.task.is_some())
    }

    /// Starts an activation for `key`
    ///
    /// A fresh cache entry resolves to `Success` immediately without calling
    /// the fetcher. Stale, missing or corrupt entries start a fetch. Opening
    /// the key whose fetch is already in flight does nothing; opening any
    /// other key replaces the current activation.
    pub fn open(&mut self, key: ResourceKey) {
        if let Some(active) = &self.active {
            if active.key == key && active.task.is_some() {
                log::debug!("Fetch already in flight for {}", key);
                return;
            }
        }

        self.close();
        self.generation += 1;
        self.active = Some(Activation {
            key: key.clone(),
            generation: self.generation,
            task: None,
        });

        let now = self.clock.now_millis();
        if let Some(entry) = self.store.get::<T>(&key) {
            if is_fresh(&entry, now, self.ttl) {
                log::debug!("Cache hit: {}", key);
                self.outcome = Some(FetchOutcome::Success { data: entry.data });
                return;
            }
            log::debug!("Cache entry for {} is stale", key);
        }

        self.start_fetch();
    }

    /// Fetches again, skipping the cache
    ///
    /// No-op while closed or while a fetch is already in flight.
    pub fn retry(&mut self) {
        if self.active.is_none() || self.is_in_flight() {
            return;
        }
        self.start_fetch();
    }

    /// Ends the activation
    ///
    /// The in-flight task, if any, is aborted and anything it already sent is
    /// ignored.
    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            if let Some(task) = active.task {
                task.abort();
            }
        }
        self.outcome = None;
    }

    /// Applies any finished fetch without blocking
    ///
    /// Returns true if the outcome changed.
    pub fn poll(&mut self) -> bool {
        // Checked before draining: a task sends its completion before it finishes
        let finished = self
            .active
            .as_ref()
            .and_then(|a| a.task.as_ref())
            .is_some_and(|task| task.is_finished());

        let mut changed = self.drain();

        if finished && self.is_in_flight() {
            self.abandon_fetch("fetch task ended without a result");
            changed = true;
        }
        changed
    }

    /// Waits for the in-flight fetch, if any, and applies it
    pub async fn settle(&mut self) -> Option<&FetchOutcome<T>> {
        let task = self.active.as_mut().and_then(|a| a.task.take());
        if let Some(task) = task {
            if let Err(join_err) = task.await {
                self.abandon_fetch(&join_err.to_string());
            }
        }
        self.drain();
        self.outcome.as_ref()
    }

    /// Opens `key` and waits for the outcome
    pub async fn load(&mut self, key: ResourceKey) -> FetchOutcome<T> {
        self.open(key);
        self.settle().await.cloned().unwrap_or(FetchOutcome::Loading)
    }

    fn start_fetch(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.task.is_some() {
            return;
        }

        log::debug!("Fetching {}", active.key);
        self.outcome = Some(FetchOutcome::Loading);

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let key = active.key.clone();
        let generation = active.generation;

        active.task = Some(tokio::spawn(async move {
            let result = fetcher.fetch(&key).await;
            // Receiver lives as long as the resource; a send error means it was dropped
            let _ = tx.send(Completion { generation, result });
        }));
    }

    fn drain(&mut self) -> bool {
        let mut changed = false;
        while let Ok(completion) = self.rx.try_recv() {
            changed |= self.apply(completion);
        }
        changed
    }

    fn apply(&mut self, completion: Completion<T>) -> bool {
        let Some(active) = self.active.as_mut() else {
            log::debug!("Discarding fetch result for a closed view");
            return false;
        };
        if active.generation != completion.generation {
            log::debug!("Discarding fetch result from an earlier activation");
            return false;
        }
        active.task = None;

        let outcome = match completion.result {
            Ok(data) => {
                if let Err(failure) = self.store.put(&active.key, &data, self.clock.now_millis()) {
                    log::debug!("Cache write for {} skipped: {}", active.key, failure);
                }
                FetchOutcome::Success { data }
            }
            Err(err) => {
                log::debug!("Fetch for {} failed: {}", active.key, err);
                FetchOutcome::from_error(&err)
            }
        };
        self.outcome = Some(outcome);
        true
    }

    fn abandon_fetch(&mut self, detail: &str) {
        if let Some(active) = self.active.as_mut() {
            active.task = None;
            log::debug!("Fetch for {} abandoned: {}", active.key, detail);
        }
        self.outcome = Some(FetchOutcome::Failed {
            reason: LOAD_FAILED_MESSAGE.to_string(),
        });
    }
}

impl<T, F, B, C> Drop for CachedResource<T, F, B, C> {
    fn drop(&mut self) {
        if let Some(task) = self.active.take().and_then(|a| a.task) {
            task.abort();
        }
    }
}
