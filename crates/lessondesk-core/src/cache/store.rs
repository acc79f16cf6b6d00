//! TTL-bound response cache mirrored into persistent storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::storage::PersistentStore;

/// Namespace for cache items in the persistent store.
pub const CACHE_KEY_PREFIX: &str = "cache_";

/// Default time-to-live for cached responses (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// A cached backend payload.
///
/// Serialized as `{"data": .., "timestamp": <unix ms>, "ttl": <ms>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Value,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub stored_at: DateTime<Utc>,
    #[serde(rename = "ttl", with = "ttl_millis")]
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(data: Value, ttl: Duration) -> Self {
        Self {
            data,
            stored_at: Utc::now(),
            ttl,
        }
    }

    /// Age of the entry. Clock skew into the future counts as zero.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.stored_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// An entry is valid while `now - stored_at < ttl`.
    pub fn is_valid(&self) -> bool {
        self.age() < self.ttl
    }
}

mod ttl_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

/// Key/value cache with per-entry TTL.
///
/// Lookups check memory first and fall back to the persistent store.
/// Expired entries are evicted lazily when a lookup finds them. Storage
/// failures are logged and degrade to misses; no method here returns an error.
pub struct CacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
    storage: Arc<dyn PersistentStore>,
    default_ttl: Duration,
}

impl CacheStore {
    pub fn new(storage: Arc<dyn PersistentStore>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            storage,
            default_ttl: DEFAULT_TTL,
        }
    }

    /// Set the TTL used when `set` is called without one.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn storage_key(key: &str) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, key)
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A panic while holding the lock can only leave a half-updated map of
        // snapshots, which is still safe to read.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the cached value for `key` if a valid entry exists.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries();

        let entry = match entries.get(key) {
            Some(entry) => entry.clone(),
            None => {
                let hydrated = self.load_persisted(key)?;
                entries.insert(key.to_string(), hydrated.clone());
                hydrated
            }
        };

        if !entry.is_valid() {
            debug!(key, age_ms = entry.age().as_millis() as u64, "Cache entry expired");
            entries.remove(key);
            self.remove_persisted(key);
            return None;
        }

        debug!(key, "Cache hit");
        Some(entry.data)
    }

    /// Store `value` under `key`. `ttl` falls back to the store default.
    pub fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl));

        match serde_json::to_string(&entry) {
            Ok(serialized) => {
                if let Err(e) = self.storage.set_item(&Self::storage_key(key), &serialized) {
                    warn!(key, error = %e, "Failed to persist cache entry");
                }
            }
            Err(e) => warn!(key, error = %e, "Failed to serialize cache entry"),
        }

        self.entries().insert(key.to_string(), entry);
    }

    /// Remove exactly one key.
    pub fn remove(&self, key: &str) {
        self.entries().remove(key);
        self.remove_persisted(key);
    }

    /// Remove every key containing `pattern`. Returns how many keys were dropped.
    pub fn invalidate(&self, pattern: &str) -> usize {
        let mut entries = self.entries();

        let mut doomed: Vec<String> = entries
            .keys()
            .filter(|key| key.contains(pattern))
            .cloned()
            .collect();

        for key in self.persisted_keys() {
            if key.contains(pattern) && !doomed.contains(&key) {
                doomed.push(key);
            }
        }

        for key in &doomed {
            entries.remove(key);
            self.remove_persisted(key);
        }

        if !doomed.is_empty() {
            debug!(pattern, count = doomed.len(), "Invalidated cache entries");
        }
        doomed.len()
    }

    /// Drop every cache entry, in memory and in persistent storage.
    pub fn clear(&self) {
        let mut entries = self.entries();
        entries.clear();
        for key in self.persisted_keys() {
            self.remove_persisted(&key);
        }
        debug!("Cache cleared");
    }

    /// Number of entries currently held in memory (valid or not).
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load_persisted(&self, key: &str) -> Option<CacheEntry> {
        let raw = match self.storage.get_item(&Self::storage_key(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "Failed to read persisted cache entry");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(key, error = %e, "Discarding corrupt persisted cache entry");
                self.remove_persisted(key);
                None
            }
        }
    }

    fn remove_persisted(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(&Self::storage_key(key)) {
            warn!(key, error = %e, "Failed to remove persisted cache entry");
        }
    }

    /// Logical keys of all persisted cache items (prefix stripped).
    fn persisted_keys(&self) -> Vec<String> {
        match self.storage.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|k| k.strip_prefix(CACHE_KEY_PREFIX).map(str::to_string))
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to list persisted cache entries");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.len())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
