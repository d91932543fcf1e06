//! Response cache
//!
//! Keeps the decoded `data` payload of earlier backend responses, keyed by
//! the endpoint they came from. An entry is served while it is younger than
//! the configured TTL; otherwise the loader runs again and its result
//! replaces the old entry. Failed loads never write an entry.
//!
//! The storage, the freshness policy and the clock are separate pieces so the
//! TTL rule can be tested without a real store or real time.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// A cached payload and the time it was stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Decoded `data` member of the response envelope
    pub data: Value,
    /// Milliseconds since the unix epoch when the entry was written
    pub timestamp_ms: i64,
}

/// Key-value storage for cache entries
pub trait CacheStore: Send + Sync {
    /// Look up an entry regardless of its age
    fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Store an entry, replacing whatever was under `key`
    fn put(&self, key: &str, entry: CacheEntry);

    /// Number of stored entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    fn clear(&self);
}

/// In-memory [`CacheStore`] that lives as long as the page
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries().get(key).cloned()
    }

    fn put(&self, key: &str, entry: CacheEntry) {
        self.entries().insert(key.to_string(), entry);
    }

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn clear(&self) {
        self.entries().clear();
    }
}

/// Source of the current time in milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Time-to-live freshness rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    ttl_ms: i64,
}

impl TtlPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl_ms: ttl.as_millis().min(i64::MAX as u128) as i64,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms as u64)
    }

    /// An entry is fresh iff `now - timestamp < ttl`
    pub fn is_fresh(&self, entry: &CacheEntry, now_ms: i64) -> bool {
        now_ms.saturating_sub(entry.timestamp_ms) < self.ttl_ms
    }
}

/// TTL-checked cache in front of a loader
pub struct ResponseCache {
    store: Box<dyn CacheStore>,
    policy: TtlPolicy,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    /// Create an in-memory cache on the wall clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_parts(
            Box::new(MemoryStore::new()),
            TtlPolicy::new(ttl),
            Arc::new(SystemClock),
        )
    }

    /// Create a cache from explicit parts
    pub fn with_parts(
        store: Box<dyn CacheStore>,
        policy: TtlPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> TtlPolicy {
        self.policy
    }

    pub fn store(&self) -> &dyn CacheStore {
        self.store.as_ref()
    }

    /// Return the fresh entry under `key`, if any
    pub fn get_fresh(&self, key: &str) -> Option<Value> {
        let entry = self.store.get(key)?;
        if self.policy.is_fresh(&entry, self.clock.now_ms()) {
            Some(entry.data)
        } else {
            None
        }
    }

    /// Serve `key` from the cache, or run `loader` and remember its result.
    ///
    /// The store is not locked while `loader` runs, so other lookups proceed
    /// while a fetch is in flight. An error from `loader` is returned as is
    /// and leaves the cache untouched.
    pub async fn fetch_with_cache<F, Fut, E>(&self, key: &str, loader: F) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(data) = self.get_fresh(key) {
            tracing::debug!("Cache hit: {}", key);
            return Ok(data);
        }

        tracing::debug!("Cache miss: {}", key);
        let data = loader().await?;

        self.store.put(
            key,
            CacheEntry {
                data: data.clone(),
                timestamp_ms: self.clock.now_ms(),
            },
        );

        Ok(data)
    }
}
