//! Response caching for backend GET results.
//!
//! This module provides the `CacheStore`, a key/value store with per-entry
//! time-to-live. Entries live in memory and are mirrored into a
//! `PersistentStore` so they survive a restart.
//!
//! Persistent entries are namespaced under the `cache_` prefix; other keys in
//! the same store (credentials) are never touched by cache operations.

pub mod storage;
pub mod store;

pub use storage::{FileStorage, MemoryStorage, PersistentStore};
pub use store::{CacheEntry, CacheStore, CACHE_KEY_PREFIX, DEFAULT_TTL};
