//! PersistenceOrchestrator: loads, saves and resets the site configuration.
//!
//! Three tiers may hold a copy of the configuration:
//!
//! - the **published file** (`site-config.json`), read through a
//!   [`RemoteSource`] and, when the operator allows it, written through a
//!   [`FileHandle`];
//! - the **database tier**, a [`ConfigDatabase`];
//! - the **key/value tier**, a [`KeyValueStore`].
//!
//! Each browser-side tier stores the serialised configuration under
//! [`Slot::Data`] and a [`Provenance`] record under [`Slot::Meta`].
//!
//! # Load
//!
//! ```text
//! remote.fetch()  ──none & local context──►  remote.fetch_fallback()
//! database.read(data, meta)  ──no data──►  key_value.read(data, meta)
//! decide(snapshot)          (rules in sitecfg_core::persistence::precedence)
//! file won?  ──► write a `file`-tagged copy to both browser tiers
//! merge_deep(fresh_baseline(), winner)
//! ```
//!
//! # Save
//!
//! With a file picker: acquire the session handle (prompting once), write,
//! re-read the published file and compare, then tag the browser copies
//! `file` (verified) or `local` (not verified).  A cancelled prompt returns at
//! once with nothing written.  Without a picker, or when the file path fails
//! for any other reason, the browser tiers are written with a `local` tag.
//!
//! Every path returns a [`SaveResult`]; nothing here returns an error.

use std::sync::Arc;

use serde_json::Value;
use sitecfg_core::{
    decide, fresh_baseline, merge_deep, BrowserTier, Provenance, SaveResult, SiteConfig, Source,
    TierSnapshot, TierWrites, Winner,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::application::backends::{
    ConfigDatabase, FileHandle, FilePicker, HandleError, KeyValueStore, RemoteSource, Slot,
};

/// Copy found in one of the browser-side tiers.
struct BrowserCopy {
    tier: BrowserTier,
    data: Value,
    meta: Option<Provenance>,
}

/// Parses a stored or fetched configuration payload.
///
/// Only a JSON object counts as configuration; anything else is logged and
/// treated as absent.
fn parse_payload(raw: &str, origin: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Some(value),
        Ok(_) => {
            warn!("{origin}: payload is not a JSON object, ignoring it");
            None
        }
        Err(e) => {
            warn!("{origin}: malformed JSON payload ignored: {e}");
            None
        }
    }
}

/// Coordinates the remote file, the database tier and the key/value tier.
pub struct PersistenceOrchestrator {
    remote: Arc<dyn RemoteSource>,
    key_value: Arc<dyn KeyValueStore>,
    database: Arc<dyn ConfigDatabase>,
    file_picker: Option<Arc<dyn FilePicker>>,
    /// Handle acquired on the first save that reached the picker.
    file_handle: Mutex<Option<Arc<dyn FileHandle>>>,
}

impl PersistenceOrchestrator {
    /// Creates an orchestrator without a file-write capability.
    pub fn new(
        remote: Arc<dyn RemoteSource>,
        key_value: Arc<dyn KeyValueStore>,
        database: Arc<dyn ConfigDatabase>,
    ) -> Self {
        Self {
            remote,
            key_value,
            database,
            file_picker: None,
            file_handle: Mutex::new(None),
        }
    }

    /// Enables writing the published file through `picker`.
    pub fn with_file_picker(mut self, picker: Arc<dyn FilePicker>) -> Self {
        self.file_picker = Some(picker);
        self
    }

    pub fn has_file_capability(&self) -> bool {
        self.file_picker.is_some()
    }

    /// Location of the published file.
    pub fn remote_location(&self) -> String {
        self.remote.location()
    }

    // ── Load ──────────────────────────────────────────────────────────────────

    /// Produces the effective configuration.
    ///
    /// Never fails: with every tier empty or broken the result is a fresh copy
    /// of the baseline.
    pub async fn load(&self) -> Value {
        let file_data = self.read_published().await;
        let browser = self.read_browser_tiers().await;

        let snapshot = TierSnapshot {
            has_file_data: file_data.is_some(),
            browser_tier: browser.as_ref().map(|copy| copy.tier),
            browser_source: browser
                .as_ref()
                .and_then(|copy| copy.meta.map(|meta| meta.source)),
        };
        let decision = decide(&snapshot);
        info!(
            rule = ?decision.rule,
            winner = ?decision.winner,
            "configuration source selected"
        );

        let mut config = fresh_baseline();
        match decision.winner {
            Winner::Browser(_) => {
                if let Some(copy) = browser {
                    merge_deep(&mut config, &copy.data);
                }
            }
            Winner::File => {
                if let Some(data) = file_data {
                    if decision.primes_cache() {
                        self.prime_browser_tiers(&data).await;
                    }
                    merge_deep(&mut config, &data);
                }
            }
            Winner::Baseline => {}
        }
        config
    }

    /// [`load`](Self::load) followed by conversion to the typed view.
    pub async fn load_typed(&self) -> Result<SiteConfig, serde_json::Error> {
        SiteConfig::from_value(&self.load().await)
    }

    /// Reads the published file, falling back to the secondary transport in
    /// a local-file context.
    async fn read_published(&self) -> Option<Value> {
        let location = self.remote.location();
        let mut data = self
            .remote
            .fetch()
            .await
            .and_then(|raw| parse_payload(&raw, &location));
        if data.is_none() && self.remote.is_local_context() {
            debug!("{location}: primary transport unavailable, using fallback read");
            data = self
                .remote
                .fetch_fallback()
                .await
                .and_then(|raw| parse_payload(&raw, &location));
        }
        if data.is_none() {
            debug!("{location}: no published configuration");
        }
        data
    }

    /// Returns the database copy if it has data, else the key/value copy.
    ///
    /// Meta is always taken from the tier whose data was chosen.
    async fn read_browser_tiers(&self) -> Option<BrowserCopy> {
        let db_data = self
            .database
            .read(Slot::Data)
            .await
            .and_then(|raw| parse_payload(&raw, "database tier"));
        if let Some(data) = db_data {
            let meta = self
                .database
                .read(Slot::Meta)
                .await
                .and_then(|raw| Provenance::parse(&raw));
            debug!(source = ?meta.map(|m| m.source), "database tier holds a copy");
            return Some(BrowserCopy {
                tier: BrowserTier::Database,
                data,
                meta,
            });
        }

        let data = self
            .key_value
            .read(Slot::Data)
            .and_then(|raw| parse_payload(&raw, "key/value tier"))?;
        let meta = self
            .key_value
            .read(Slot::Meta)
            .and_then(|raw| Provenance::parse(&raw));
        debug!(source = ?meta.map(|m| m.source), "key/value tier holds a copy");
        Some(BrowserCopy {
            tier: BrowserTier::KeyValue,
            data,
            meta,
        })
    }

    /// Caches the published file in the browser tiers.  Failures only log.
    async fn prime_browser_tiers(&self, data: &Value) {
        let writes = self.write_browser_tiers(&data.to_string(), Source::File).await;
        if !writes.any() {
            debug!("could not cache the published configuration locally");
        }
    }

    // ── Save ──────────────────────────────────────────────────────────────────

    /// Persists `config` to every tier it can reach.
    pub async fn save(&self, config: &Value) -> SaveResult {
        let data = match serde_json::to_string_pretty(config) {
            Ok(data) => data,
            Err(e) => {
                error!("configuration could not be serialised: {e}");
                return SaveResult::failed();
            }
        };

        if let Some(picker) = &self.file_picker {
            match self.write_published(picker, &data).await {
                Ok(()) => return self.finish_file_save(config, &data).await,
                Err(HandleError::Cancelled) => {
                    info!("save cancelled by the operator, nothing written");
                    return SaveResult::cancelled();
                }
                Err(e) => warn!("{e}; keeping the configuration locally"),
            }
        }

        let writes = self.write_browser_tiers(&data, Source::Local).await;
        let result = SaveResult::local(writes);
        if result.ok {
            info!(?writes, "configuration saved locally");
        } else {
            error!("no storage tier accepted the configuration");
        }
        result
    }

    /// [`save`](Self::save) for the typed view.
    pub async fn save_typed(&self, config: &SiteConfig) -> SaveResult {
        match config.to_value() {
            Ok(value) => self.save(&value).await,
            Err(e) => {
                error!("configuration could not be serialised: {e}");
                SaveResult::failed()
            }
        }
    }

    /// Saves a fresh copy of the baseline through [`save`](Self::save).
    pub async fn reset(&self) -> SaveResult {
        info!("resetting configuration to the baseline");
        self.save(&fresh_baseline()).await
    }

    /// Acquires the session handle (prompting only the first time) and writes
    /// `data` through it.
    async fn write_published(
        &self,
        picker: &Arc<dyn FilePicker>,
        data: &str,
    ) -> Result<(), HandleError> {
        let handle = {
            // Held across `pick` so two saves never prompt twice.
            let mut cached = self.file_handle.lock().await;
            match cached.as_ref() {
                Some(handle) => Arc::clone(handle),
                None => {
                    let handle = picker.pick().await?;
                    info!("file handle acquired: {}", handle.describe());
                    *cached = Some(Arc::clone(&handle));
                    handle
                }
            }
        };
        handle.write(data).await?;
        debug!("wrote {} bytes to {}", data.len(), handle.describe());
        Ok(())
    }

    async fn finish_file_save(&self, config: &Value, data: &str) -> SaveResult {
        let on_disk = self.read_published().await;
        let file_synced = on_disk.as_ref() == Some(config);
        if !file_synced {
            warn!("published file does not reflect the write yet; tagging local copy as `local`");
        }

        let source = if file_synced { Source::File } else { Source::Local };
        let writes = self.write_browser_tiers(data, source).await;
        self.clear_failed_tiers(writes).await;

        let result = SaveResult::after_file_write(file_synced, writes);
        info!(mode = ?result.mode, ?writes, "configuration written to the published file");
        result
    }

    /// Writes data then meta to the key/value tier, then to the database tier.
    async fn write_browser_tiers(&self, data: &str, source: Source) -> TierWrites {
        let meta = Provenance::now(source).to_json();

        let key_value = self.key_value.write(Slot::Data, data)
            && (self.key_value.write(Slot::Meta, &meta) || {
                // An older meta record must not describe the new data.
                self.key_value.remove(Slot::Meta);
                false
            });
        if !key_value {
            warn!("key/value tier rejected the configuration");
        }

        let database = self.database.write(Slot::Data, data).await
            && (self.database.write(Slot::Meta, &meta).await || {
                self.database.remove(Slot::Meta).await;
                false
            });
        if !database {
            warn!("database tier rejected the configuration");
        }

        TierWrites {
            key_value,
            database,
        }
    }

    /// Removes copies a failed write left behind, so a later load cannot
    /// resurrect a configuration older than the published file.
    async fn clear_failed_tiers(&self, writes: TierWrites) {
        if !writes.key_value {
            for slot in Slot::ALL {
                self.key_value.remove(slot);
            }
            debug!("cleared stale key/value copy");
        }
        if !writes.database {
            for slot in Slot::ALL {
                self.database.remove(slot).await;
            }
            debug!("cleared stale database copy");
        }
    }
}
