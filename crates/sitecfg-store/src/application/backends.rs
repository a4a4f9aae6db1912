//! Ports implemented by every storage tier.
//!
//! The orchestrator never sees a backend error.  Implementations catch their
//! own failures (quota exceeded, database unavailable, network down, corrupt
//! payload), log them, and report `None` or `false`.  The one signal that does
//! cross a port is [`HandleError::Cancelled`]: the operator declining to
//! write the published file, which ends a save immediately.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// The two records every browser-side tier stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The serialised configuration.
    Data,
    /// The provenance record that goes with it.
    Meta,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Data, Slot::Meta];

    /// Record key inside the database store.
    pub fn record_key(self) -> &'static str {
        match self {
            Slot::Data => "data",
            Slot::Meta => "meta",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.record_key())
    }
}

/// Small synchronous string store (the `localStorage` equivalent).
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn read(&self, slot: Slot) -> Option<String>;
    fn write(&self, slot: Slot, value: &str) -> bool;
    fn remove(&self, slot: Slot) -> bool;
}

/// Larger asynchronous store, opened lazily.
#[async_trait]
pub trait ConfigDatabase: Send + Sync {
    async fn read(&self, slot: Slot) -> Option<String>;
    async fn write(&self, slot: Slot, value: &str) -> bool;
    async fn remove(&self, slot: Slot) -> bool;
}

/// Read access to the published configuration file.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Human-readable location, for logs and status output.
    fn location(&self) -> String;

    /// Primary transport.  Must defeat caches so a file written moments ago
    /// is observed.
    async fn fetch(&self) -> Option<String>;

    /// `true` when the configuration is addressed as a local file and the
    /// primary transport cannot reach it.
    fn is_local_context(&self) -> bool;

    /// Secondary read used only in a local-file context.
    async fn fetch_fallback(&self) -> Option<String>;
}

/// Errors raised while acquiring or writing the published file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    /// The operator declined.  Nothing else may be written.
    #[error("file selection was cancelled")]
    Cancelled,

    /// The file capability could not be used (no terminal, bad target).
    #[error("file handle unavailable: {0}")]
    Unavailable(String),

    /// The handle was obtained but writing through it failed.
    #[error("writing the configuration file failed: {0}")]
    Write(String),
}

/// Writable handle to the published file, kept for the whole session.
#[async_trait]
pub trait FileHandle: Send + Sync {
    fn describe(&self) -> String;
    async fn write(&self, contents: &str) -> Result<(), HandleError>;
}

/// Acquires a [`FileHandle`], prompting the operator if needed.
#[async_trait]
pub trait FilePicker: Send + Sync {
    async fn pick(&self) -> Result<Arc<dyn FileHandle>, HandleError>;
}
