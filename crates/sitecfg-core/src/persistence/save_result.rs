//! The record returned by every save.
//!
//! A save never raises: it always produces a [`SaveResult`] describing which
//! tiers were written.  [`SaveResult::status`] condenses that record into the
//! message the editor shows the operator, distinguishing for example "saved
//! and published" from "saved in this browser only".

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which path the save took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveMode {
    /// Written to the published file and verified by re-reading it.
    File,
    /// Browser tiers are ahead of the published file.
    Local,
    /// The operator dismissed the file prompt; nothing was written.
    Cancel,
    /// No tier accepted the write.
    Error,
}

/// Per-tier outcome of writing the browser tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierWrites {
    pub key_value: bool,
    pub database: bool,
}

impl TierWrites {
    pub fn any(self) -> bool {
        self.key_value || self.database
    }
}

/// Outcome of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResult {
    pub ok: bool,
    pub mode: SaveMode,
    /// The key/value tier accepted data and meta.
    pub local_saved: bool,
    /// The database tier accepted data and meta.
    pub indexed_db_saved: bool,
    /// At least one browser tier holds the new copy.
    pub storage_saved: bool,
    /// The published file was re-read and matched what was written.
    pub file_synced: bool,
    /// A write to the published file was performed (verified or not).
    pub file_written: bool,
}

impl SaveResult {
    /// The operator cancelled the file prompt.
    pub fn cancelled() -> Self {
        Self::unsaved(SaveMode::Cancel)
    }

    /// Nothing could be persisted.
    pub fn failed() -> Self {
        Self::unsaved(SaveMode::Error)
    }

    fn unsaved(mode: SaveMode) -> Self {
        Self {
            ok: false,
            mode,
            local_saved: false,
            indexed_db_saved: false,
            storage_saved: false,
            file_synced: false,
            file_written: false,
        }
    }

    /// Result of the browser-only path; [`failed`](Self::failed) when no tier
    /// accepted the write.
    pub fn local(writes: TierWrites) -> Self {
        if !writes.any() {
            return Self::failed();
        }
        Self {
            ok: true,
            mode: SaveMode::Local,
            local_saved: writes.key_value,
            indexed_db_saved: writes.database,
            storage_saved: true,
            file_synced: false,
            file_written: false,
        }
    }

    /// Result after the published file was written.
    ///
    /// The file write itself succeeded, so the save is `ok` even when no
    /// browser tier could keep a copy.
    pub fn after_file_write(file_synced: bool, writes: TierWrites) -> Self {
        Self {
            ok: true,
            mode: if file_synced { SaveMode::File } else { SaveMode::Local },
            local_saved: writes.key_value,
            indexed_db_saved: writes.database,
            storage_saved: writes.any(),
            file_synced,
            file_written: true,
        }
    }

    /// Operator-facing summary of this result.
    pub fn status(&self) -> SaveStatus {
        if !self.ok {
            return match self.mode {
                SaveMode::Cancel => SaveStatus::Cancelled,
                _ => SaveStatus::Failed,
            };
        }
        if self.mode == SaveMode::File {
            if !self.storage_saved {
                return SaveStatus::PublishedWithoutLocalCopy;
            }
            if !self.local_saved && self.indexed_db_saved {
                return SaveStatus::PublishedDatabaseCopyOnly;
            }
            return SaveStatus::Published;
        }
        if self.file_written && !self.file_synced {
            if !self.storage_saved {
                return SaveStatus::FileNotUpdatedNoLocalCopy;
            }
            return SaveStatus::SavedLocallyFileNotUpdated;
        }
        if !self.storage_saved {
            return SaveStatus::LocalCopyUnavailable;
        }
        SaveStatus::SavedInBrowserOnly
    }
}

/// Differentiated feedback for a [`SaveResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Cancelled,
    Failed,
    Published,
    PublishedWithoutLocalCopy,
    PublishedDatabaseCopyOnly,
    FileNotUpdatedNoLocalCopy,
    SavedLocallyFileNotUpdated,
    LocalCopyUnavailable,
    SavedInBrowserOnly,
}

impl SaveStatus {
    /// `true` when the published file now holds the configuration.
    pub fn is_published(self) -> bool {
        matches!(
            self,
            SaveStatus::Published
                | SaveStatus::PublishedWithoutLocalCopy
                | SaveStatus::PublishedDatabaseCopyOnly
        )
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SaveStatus::Cancelled => "Save cancelled.",
            SaveStatus::Failed => "Could not save.",
            SaveStatus::Published => "Changes saved to site-config.json.",
            SaveStatus::PublishedWithoutLocalCopy => {
                "Saved to site-config.json. The local copy was not updated."
            }
            SaveStatus::PublishedDatabaseCopyOnly => {
                "Saved to site-config.json. Local copy kept in the database only."
            }
            SaveStatus::FileNotUpdatedNoLocalCopy => {
                "The project file was not updated and no local copy was kept."
            }
            SaveStatus::SavedLocallyFileNotUpdated => {
                "Saved locally. The project file was not updated."
            }
            SaveStatus::LocalCopyUnavailable => "Could not keep a local copy on this machine.",
            SaveStatus::SavedInBrowserOnly => {
                "Saved on this machine only. To publish, save to site-config.json."
            }
        };
        f.write_str(msg)
    }
}
