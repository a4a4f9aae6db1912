//! Database tier backed by `redb`.
//!
//! One database file (`<database_name>.redb`) holds one table named after the
//! store, with the records `data` and `meta`.  The database is opened on first
//! use and the table is created inside the opening transaction.  If the open
//! fails, the failure is remembered and the tier answers `None`/`false` for
//! the rest of the session instead of retrying.
//!
//! redb is synchronous; every call runs on `spawn_blocking`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::application::backends::{ConfigDatabase, Slot};

/// Internal failure reasons; collapsed to `None`/`false` at the port.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error preparing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Redb(#[from] redb::Error),

    #[error("blocking database task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn table(store: &str) -> TableDefinition<'_, &'static str, &'static str> {
    TableDefinition::new(store)
}

fn open_blocking(path: &Path, store: &str) -> Result<Database, DbError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| DbError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let db = Database::create(path).map_err(redb::Error::from)?;
    let txn = db.begin_write().map_err(redb::Error::from)?;
    txn.open_table(table(store)).map_err(redb::Error::from)?;
    txn.commit().map_err(redb::Error::from)?;
    Ok(db)
}

fn get_blocking(db: &Database, store: &str, key: &str) -> Result<Option<String>, redb::Error> {
    let txn = db.begin_read()?;
    let table = txn.open_table(table(store))?;
    let value = table.get(key)?.map(|guard| guard.value().to_string());
    Ok(value)
}

fn put_blocking(db: &Database, store: &str, key: &str, value: &str) -> Result<(), redb::Error> {
    let txn = db.begin_write()?;
    {
        let mut table = txn.open_table(table(store))?;
        table.insert(key, value)?;
    }
    txn.commit()?;
    Ok(())
}

fn remove_blocking(db: &Database, store: &str, key: &str) -> Result<(), redb::Error> {
    let txn = db.begin_write()?;
    {
        let mut table = txn.open_table(table(store))?;
        table.remove(key)?;
    }
    txn.commit()?;
    Ok(())
}

/// [`ConfigDatabase`] backed by a redb file.
pub struct RedbConfigDatabase {
    path: PathBuf,
    store: Arc<str>,
    db: OnceCell<Option<Arc<Database>>>,
}

impl RedbConfigDatabase {
    /// Describes a database at `dir/<database_name>.redb`.  Nothing is opened
    /// until the first call.
    pub fn new(dir: &Path, database_name: &str, store_name: &str) -> Self {
        Self {
            path: dir.join(format!("{database_name}.redb")),
            store: Arc::from(store_name),
            db: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the database on first use; `None` once an open has failed.
    async fn handle(&self) -> Option<Arc<Database>> {
        self.db
            .get_or_init(|| async {
                let path = self.path.clone();
                let store = Arc::clone(&self.store);
                let opened = tokio::task::spawn_blocking(move || open_blocking(&path, &*store))
                    .await
                    .map_err(DbError::from)
                    .and_then(|result| result);
                match opened {
                    Ok(db) => {
                        info!("database tier opened at {}", self.path.display());
                        Some(Arc::new(db))
                    }
                    Err(e) => {
                        warn!(
                            "database tier unavailable for this session ({}): {e}",
                            self.path.display()
                        );
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Runs `op` against the open database on a blocking thread.
    async fn run<T, F>(&self, what: &str, op: F) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database, &str) -> Result<T, redb::Error> + Send + 'static,
    {
        let db = self.handle().await?;
        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || op(&*db, &*store))
            .await
            .map_err(DbError::from)
            .and_then(|result| result.map_err(DbError::from));
        match outcome {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("database {what} failed: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl ConfigDatabase for RedbConfigDatabase {
    async fn read(&self, slot: Slot) -> Option<String> {
        let key = slot.record_key();
        self.run("read", move |db, store| get_blocking(db, store, key))
            .await
            .flatten()
    }

    async fn write(&self, slot: Slot, value: &str) -> bool {
        let key = slot.record_key();
        let value = value.to_string();
        let len = value.len();
        let ok = self
            .run("write", move |db, store| put_blocking(db, store, key, &value))
            .await
            .is_some();
        if ok {
            debug!("database tier stored {slot} ({len} bytes)");
        }
        ok
    }

    async fn remove(&self, slot: Slot) -> bool {
        let key = slot.record_key();
        self.run("remove", move |db, store| remove_blocking(db, store, key))
            .await
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("sitecfg_test_{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_database_is_created_lazily() {
        // Arrange
        let dir = temp_dir();
        let db = RedbConfigDatabase::new(&dir, "perfeitaLuzConfigDb", "config");
        assert!(!db.path().exists());

        // Act
        let empty = db.read(Slot::Data).await;

        // Assert
        assert!(empty.is_none());
        assert!(db.path().exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_write_read_remove_cycle() {
        let dir = temp_dir();
        let db = RedbConfigDatabase::new(&dir, "perfeitaLuzConfigDb", "config");

        assert!(db.write(Slot::Data, r#"{"a":1}"#).await);
        assert!(db.write(Slot::Meta, r#"{"source":"file"}"#).await);
        assert_eq!(db.read(Slot::Data).await.as_deref(), Some(r#"{"a":1}"#));

        assert!(db.remove(Slot::Data).await);
        assert!(db.read(Slot::Data).await.is_none());
        assert_eq!(db.read(Slot::Meta).await.as_deref(), Some(r#"{"source":"file"}"#));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = temp_dir();
        {
            let db = RedbConfigDatabase::new(&dir, "cfg", "config");
            assert!(db.write(Slot::Data, "persisted").await);
        }
        let reopened = RedbConfigDatabase::new(&dir, "cfg", "config");
        assert_eq!(reopened.read(Slot::Data).await.as_deref(), Some("persisted"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_failed_open_degrades_for_the_session() {
        // Arrange: a regular file where the parent directory should be
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).expect("dir");
        let blocker = dir.join("blocked");
        std::fs::write(&blocker, "not a directory").expect("write");
        let db = RedbConfigDatabase::new(&blocker, "cfg", "config");

        // Act / Assert
        assert!(!db.write(Slot::Data, "x").await);
        assert!(db.read(Slot::Data).await.is_none());
        assert!(!db.remove(Slot::Meta).await);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
