//! Key/value tier kept in a single JSON file.
//!
//! The file holds a flat string map, mirroring what a browser's
//! `localStorage` would contain for this site:
//!
//! ```json
//! {
//!   "perfeitaLuzConfig": "{ ...configuration... }",
//!   "perfeitaLuzConfigMeta": "{\"source\":\"local\",\"savedAt\":1718000000000}"
//! }
//! ```
//!
//! Writes are rejected once the sum of key and value lengths would exceed
//! the quota, and land through a temp file plus rename so a crash never
//! leaves a truncated map.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, warn};

use crate::application::backends::{KeyValueStore, Slot};

/// Default quota, matching the common browser limit.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Internal failure reasons; collapsed to `None`/`false` at the port.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },
}

type Records = BTreeMap<String, String>;

/// File-backed [`KeyValueStore`].
pub struct FileKeyValueStore {
    path: PathBuf,
    data_key: String,
    meta_key: String,
    quota_bytes: usize,
    /// Serialises read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Creates a store at `path` whose keys are `storage_key` and
    /// `<storage_key>Meta`.  Nothing is touched on disk until the first write.
    pub fn new(path: impl Into<PathBuf>, storage_key: &str, quota_bytes: usize) -> Self {
        Self {
            path: path.into(),
            data_key: storage_key.to_string(),
            meta_key: format!("{storage_key}Meta"),
            quota_bytes,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn key(&self, slot: Slot) -> &str {
        match slot {
            Slot::Data => &self.data_key,
            Slot::Meta => &self.meta_key,
        }
    }

    fn load(&self) -> Result<Records, KvError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Records::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Records::new()),
            Err(source) => Err(KvError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Like [`load`](Self::load), but a corrupt file is discarded so the
    /// store can recover on the next write.
    fn load_for_update(&self) -> Result<Records, KvError> {
        match self.load() {
            Err(KvError::Corrupt(e)) => {
                warn!("{}: discarding corrupt key/value store: {e}", self.path.display());
                Ok(Records::new())
            }
            other => other,
        }
    }

    fn persist(&self, records: &Records) -> Result<(), KvError> {
        let io_err = |source: std::io::Error| KvError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_string(records)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, body).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }

    fn usage(records: &Records) -> usize {
        records.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn try_write(&self, slot: Slot, value: &str) -> Result<(), KvError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut records = self.load_for_update()?;
        records.insert(self.key(slot).to_string(), value.to_string());
        let needed = Self::usage(&records);
        if needed > self.quota_bytes {
            return Err(KvError::QuotaExceeded {
                needed,
                quota: self.quota_bytes,
            });
        }
        self.persist(&records)
    }

    fn try_remove(&self, slot: Slot) -> Result<(), KvError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut records = self.load_for_update()?;
        if records.remove(self.key(slot)).is_some() {
            self.persist(&records)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn read(&self, slot: Slot) -> Option<String> {
        match self.load() {
            Ok(mut records) => records.remove(self.key(slot)),
            Err(e) => {
                warn!("key/value read of {slot} failed: {e}");
                None
            }
        }
    }

    fn write(&self, slot: Slot, value: &str) -> bool {
        match self.try_write(slot, value) {
            Ok(()) => {
                debug!("key/value tier stored {slot} ({} bytes)", value.len());
                true
            }
            Err(e) => {
                warn!("key/value write of {slot} failed: {e}");
                false
            }
        }
    }

    fn remove(&self, slot: Slot) -> bool {
        match self.try_remove(slot) {
            Ok(()) => true,
            Err(e) => {
                warn!("key/value remove of {slot} failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_store(quota: usize) -> (FileKeyValueStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("sitecfg_test_{}", Uuid::new_v4()));
        let store = FileKeyValueStore::new(dir.join("local-storage.json"), "perfeitaLuzConfig", quota);
        (store, dir)
    }

    #[test]
    fn test_read_before_any_write_is_none() {
        let (store, _dir) = temp_store(DEFAULT_QUOTA_BYTES);
        assert!(store.read(Slot::Data).is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_write_then_read_uses_fixed_keys() {
        // Arrange
        let (store, dir) = temp_store(DEFAULT_QUOTA_BYTES);

        // Act
        assert!(store.write(Slot::Data, r#"{"a":1}"#));
        assert!(store.write(Slot::Meta, r#"{"source":"local"}"#));

        // Assert
        assert_eq!(store.read(Slot::Data).as_deref(), Some(r#"{"a":1}"#));
        let raw = std::fs::read_to_string(store.path()).expect("file");
        let records: Records = serde_json::from_str(&raw).expect("json");
        assert!(records.contains_key("perfeitaLuzConfig"));
        assert!(records.contains_key("perfeitaLuzConfigMeta"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_write_over_quota_is_rejected_and_keeps_old_value() {
        // Arrange
        let (store, dir) = temp_store(64);
        assert!(store.write(Slot::Data, "small"));

        // Act
        let ok = store.write(Slot::Data, &"x".repeat(100));

        // Assert
        assert!(!ok);
        assert_eq!(store.read(Slot::Data).as_deref(), Some("small"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_remove_deletes_only_the_given_slot() {
        let (store, dir) = temp_store(DEFAULT_QUOTA_BYTES);
        store.write(Slot::Data, "d");
        store.write(Slot::Meta, "m");

        assert!(store.remove(Slot::Data));

        assert!(store.read(Slot::Data).is_none());
        assert_eq!(store.read(Slot::Meta).as_deref(), Some("m"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_file_reads_as_empty_and_recovers_on_write() {
        // Arrange
        let (store, dir) = temp_store(DEFAULT_QUOTA_BYTES);
        std::fs::create_dir_all(&dir).expect("dir");
        std::fs::write(store.path(), "{ not json").expect("write");

        // Act / Assert
        assert!(store.read(Slot::Data).is_none());
        assert!(store.write(Slot::Data, "fresh"));
        assert_eq!(store.read(Slot::Data).as_deref(), Some("fresh"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
