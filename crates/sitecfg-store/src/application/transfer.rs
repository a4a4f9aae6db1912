//! Import and export of configuration files.
//!
//! An import is an ordinary save: the file is merged onto a fresh baseline
//! (so a partial or older file still yields a complete configuration) and
//! handed to [`PersistenceOrchestrator::save`].  An export writes the
//! in-memory configuration in the same two-space layout the save uses.

use std::path::{Path, PathBuf};

use serde_json::Value;
use sitecfg_core::{fresh_baseline, merge_deep, SaveResult};
use thiserror::Error;
use tracing::info;

use crate::application::persistence::PersistenceOrchestrator;

/// Error type for import/export.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The input is not JSON.
    #[error("invalid configuration file: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The input is JSON but not an object.
    #[error("configuration file must contain a JSON object")]
    NotAnObject,

    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parses an imported document and completes it against the baseline.
pub fn prepare_import(raw: &str) -> Result<Value, TransferError> {
    let imported: Value = serde_json::from_str(raw)?;
    if !imported.is_object() {
        return Err(TransferError::NotAnObject);
    }
    let mut config = fresh_baseline();
    merge_deep(&mut config, &imported);
    Ok(config)
}

impl PersistenceOrchestrator {
    /// Imports `raw` and saves the result.
    pub async fn import_json(&self, raw: &str) -> Result<SaveResult, TransferError> {
        let config = prepare_import(raw)?;
        Ok(self.save(&config).await)
    }

    /// Reads `path` and imports it.
    pub async fn import_file(&self, path: &Path) -> Result<SaveResult, TransferError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| TransferError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        info!("importing configuration from {}", path.display());
        self.import_json(&raw).await
    }

    /// Writes `config` to `path` as pretty JSON.
    pub async fn export_to(&self, config: &Value, path: &Path) -> Result<(), TransferError> {
        let body = serde_json::to_string_pretty(config)?;
        tokio::fs::write(path, body)
            .await
            .map_err(|source| TransferError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        info!("exported configuration to {}", path.display());
        Ok(())
    }
}
