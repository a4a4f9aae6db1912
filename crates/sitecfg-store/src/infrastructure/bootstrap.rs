//! Builds the orchestrator from the settings file.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::persistence::PersistenceOrchestrator;
use crate::infrastructure::settings::{Settings, SettingsError};
use crate::infrastructure::storage::remote::RemoteError;
use crate::infrastructure::storage::{
    FileKeyValueStore, HttpRemoteSource, PromptFilePicker, RedbConfigDatabase,
};

/// File name of the key/value tier inside the data directory.
pub const KEY_VALUE_FILE: &str = "local-storage.json";

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Wires the real backends described by `settings`.
///
/// # Errors
///
/// Fails only on unusable settings (bad URL, unknown data directory) or when
/// the HTTP client cannot be built.  Storage problems surface later as soft
/// failures in load and save.
pub fn build_orchestrator(settings: &Settings) -> Result<PersistenceOrchestrator, BootstrapError> {
    let url = settings.site.config_url()?;
    let data_dir = settings.storage.resolved_data_dir()?;

    let remote = HttpRemoteSource::new(url, settings.site.request_timeout())?;
    let key_value = FileKeyValueStore::new(
        data_dir.join(KEY_VALUE_FILE),
        &settings.storage.storage_key,
        settings.storage.quota_bytes,
    );
    let database = RedbConfigDatabase::new(
        &data_dir,
        &settings.storage.database_name,
        &settings.storage.store_name,
    );
    info!(
        remote = %remote.url(),
        data_dir = %data_dir.display(),
        "storage tiers configured"
    );

    let orchestrator =
        PersistenceOrchestrator::new(Arc::new(remote), Arc::new(key_value), Arc::new(database));
    Ok(match &settings.publish.target {
        Some(target) => {
            info!("published file writes go to {}", target.display());
            orchestrator.with_file_picker(Arc::new(PromptFilePicker::new(
                target.clone(),
                settings.publish.confirm,
            )))
        }
        None => orchestrator,
    })
}
