//! Persistent key/value backends for the cache and the credential store.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

/// File extension for items written by `FileStorage`
const ITEM_EXTENSION: &str = "json";

/// File extension for items whose key is too long to hex-encode
const HASHED_EXTENSION: &str = "entry";

/// Longest hex-encoded file stem used as is. Keeps names well under the
/// common 255-byte file name limit.
const MAX_HEX_STEM: usize = 200;

/// A string key/value store that outlives the process.
///
/// Every operation may fail (disk full, permissions, corrupt data). Callers
/// decide whether a failure matters; the cache treats all of them as misses.
pub trait PersistentStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// List every key currently stored.
    fn keys(&self) -> Result<Vec<String>>;
}

/// In-memory store. Nothing survives the process; used for tests and
/// for runs where nothing should touch disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|e| anyhow!("Lock poisoned: {}", e))
    }
}

impl PersistentStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.items()?.keys().cloned().collect())
    }
}

/// Directory-backed store: one file per key.
///
/// File names are the hex encoding of the key, so keys containing `/`, `?`
/// or other path-hostile characters map to safe names and can be recovered
/// by `keys()`. Keys too long for that are stored under the SHA-256 of the
/// key, in a file that also records the key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

/// Contents of a hashed-name file.
#[derive(Debug, Serialize, Deserialize)]
struct HashedItem {
    key: String,
    value: String,
}

impl FileStorage {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create storage directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn is_hashed(key: &str) -> bool {
        key.len() * 2 > MAX_HEX_STEM
    }

    fn item_path(&self, key: &str) -> PathBuf {
        if Self::is_hashed(key) {
            let digest = Sha256::digest(key.as_bytes());
            return self
                .dir
                .join(format!("{}.{}", hex::encode(digest), HASHED_EXTENSION));
        }
        self.dir
            .join(format!("{}.{}", hex::encode(key.as_bytes()), ITEM_EXTENSION))
    }

    fn read_hashed(path: &Path) -> Result<HashedItem> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Unreadable storage item: {}", path.display()))
    }

    fn key_for(path: &Path) -> Option<String> {
        let extension = path.extension()?;
        if extension == HASHED_EXTENSION {
            return Self::read_hashed(path).ok().map(|item| item.key);
        }
        if extension != ITEM_EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let bytes = hex::decode(stem).ok()?;
        String::from_utf8(bytes).ok()
    }
}

impl PersistentStore for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.item_path(key);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("Failed to read storage item: {}", key)),
        };

        if !Self::is_hashed(key) {
            return Ok(Some(contents));
        }
        let item: HashedItem = serde_json::from_str(&contents)
            .with_context(|| format!("Unreadable storage item: {}", key))?;
        // Digest collision: the file belongs to another key.
        Ok((item.key == key).then_some(item.value))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.item_path(key);
        let contents = if Self::is_hashed(key) {
            serde_json::to_string(&HashedItem {
                key: key.to_string(),
                value: value.to_string(),
            })?
        } else {
            value.to_string()
        };
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write storage item: {}", key))
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.item_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove storage item: {}", key)),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list storage directory: {}", self.dir.display()))?;

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            match Self::key_for(&path) {
                Some(key) => keys.push(key),
                None => debug!(path = %path.display(), "Skipping foreign file in storage directory"),
            }
        }
        Ok(keys)
    }
}
