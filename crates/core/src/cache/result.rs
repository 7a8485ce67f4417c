//! Time-bounded result cache.
//!
//! Entries are keyed by [`fingerprint`] of whatever value describes the
//! request and expire lazily on access. Lookups and writes only touch memory
//! and mark the table dirty; [`ResultCache::flush`] writes the whole table to
//! the backing [`SessionStore`] so that a new cache built on the same session
//! store starts warm.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::hash::fingerprint;
use super::store::SessionStore;

/// Store item name holding the serialized cache table.
pub const STORAGE_KEY: &str = "github-issues-cache";

/// Default time-to-live for new entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry<T> {
    data: T,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Snapshot of the cache contents, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// Session-scoped memoization of search results.
#[derive(Debug)]
pub struct ResultCache<T, S> {
    entries: HashMap<String, CacheEntry<T>>,
    store: S,
    default_ttl: Duration,
    dirty: bool,
    persist_disabled: bool,
}

impl<T, S> ResultCache<T, S>
where
    T: Serialize + DeserializeOwned + Clone,
    S: SessionStore,
{
    /// Build a cache over `store` with the default TTL, loading any entries a
    /// previous cache on the same store persisted.
    pub async fn new(store: S) -> Self {
        Self::with_ttl(store, DEFAULT_TTL).await
    }

    pub async fn with_ttl(store: S, default_ttl: Duration) -> Self {
        let mut cache =
            Self { entries: HashMap::new(), store, default_ttl, dirty: false, persist_disabled: false };
        cache.rehydrate().await;
        cache
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Look up the entry for `key_source`.
    pub fn get<K: Serialize + ?Sized>(&mut self, key_source: &K) -> Option<T> {
        match fingerprint(key_source) {
            Ok(key) => self.get_by_key(&key),
            Err(e) => {
                tracing::warn!("cannot fingerprint cache lookup: {}", e);
                None
            }
        }
    }

    /// Look up an entry by a precomputed key.
    ///
    /// An expired entry is evicted on the spot and reported as a miss.
    pub fn get_by_key(&mut self, key: &str) -> Option<T> {
        let entry = self.entries.get(key)?;
        if entry.is_fresh(Utc::now()) {
            tracing::debug!(key, "cache hit");
            return Some(entry.data.clone());
        }

        tracing::debug!(key, "evicting expired cache entry");
        self.entries.remove(key);
        self.dirty = true;
        None
    }

    /// Store `data` under `key_source` with the default TTL.
    pub fn set<K: Serialize + ?Sized>(&mut self, key_source: &K, data: T) {
        self.set_with_ttl(key_source, data, self.default_ttl);
    }

    pub fn set_with_ttl<K: Serialize + ?Sized>(&mut self, key_source: &K, data: T, ttl: Duration) {
        match fingerprint(key_source) {
            Ok(key) => self.set_by_key(key, data, ttl),
            Err(e) => tracing::warn!("cannot fingerprint cache entry, not caching: {}", e),
        }
    }

    /// Store an entry under a precomputed key, replacing any previous one.
    pub fn set_by_key(&mut self, key: String, data: T, ttl: Duration) {
        let created_at = Utc::now();
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| created_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.entries.insert(key, CacheEntry { data, created_at, expires_at });
        self.dirty = true;
    }

    /// Drop every entry. The store item goes on the next [`flush`](Self::flush).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.dirty = true;
    }

    pub fn stats(&self) -> CacheStats {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        CacheStats { size: keys.len(), keys }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether memory holds changes the store has not seen.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a persistence failure has switched the cache to memory only.
    pub fn is_memory_only(&self) -> bool {
        self.persist_disabled
    }

    /// Write the table to the session store if it changed.
    ///
    /// An empty table removes the store item. Failures are logged, never
    /// returned: the first one drops the persisted table and switches the
    /// cache to memory only, so the store never holds a table older than
    /// memory.
    pub async fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        if self.persist_disabled {
            return;
        }

        let result = if self.entries.is_empty() {
            self.store.remove_item(STORAGE_KEY).await
        } else {
            match serde_json::to_string(&self.entries) {
                Ok(json) => self.store.set_item(STORAGE_KEY, json).await,
                Err(e) => Err(crate::Error::from(e)),
            }
        };

        if let Err(e) = result {
            tracing::warn!("failed to persist cache, continuing in memory only: {}", e);
            self.persist_disabled = true;
            if let Err(e) = self.store.remove_item(STORAGE_KEY).await {
                tracing::warn!("failed to drop persisted cache after write failure: {}", e);
            }
        }
    }

    async fn rehydrate(&mut self) {
        let raw = match self.store.get_item(STORAGE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("failed to load cache from session store: {}", e);
                return;
            }
        };

        let table: HashMap<String, serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("discarding unreadable persisted cache: {}", e);
                return;
            }
        };

        let now = Utc::now();
        let mut stale = 0usize;
        for (key, value) in table {
            match serde_json::from_value::<CacheEntry<T>>(value) {
                Ok(entry) if entry.is_fresh(now) => {
                    self.entries.insert(key, entry);
                }
                Ok(_) => stale += 1,
                Err(e) => tracing::warn!(key = %key, "discarding undecodable cache entry: {}", e),
            }
        }

        tracing::debug!(loaded = self.entries.len(), stale, "rehydrated result cache");
    }
}
