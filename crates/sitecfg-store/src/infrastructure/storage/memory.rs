//! In-memory implementations of every storage port.
//!
//! Used by the unit and integration tests.  Each double can be told to fail,
//! and counts the calls it received so tests can assert that a path performed
//! no writes at all.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;

use crate::application::backends::{
    ConfigDatabase, FileHandle, FilePicker, HandleError, KeyValueStore, RemoteSource, Slot,
};

/// The published file as seen by both the remote source and the file picker.
///
/// Sharing one `SharedFile` between a [`MemoryRemoteSource`] and a
/// [`MemoryFilePicker`] makes a write observable on the next fetch.  Giving
/// them separate instances models a stale cache.
pub type SharedFile = Arc<Mutex<Option<String>>>;

/// Creates a [`SharedFile`] with optional initial contents.
pub fn shared_file(initial: Option<&str>) -> SharedFile {
    Arc::new(Mutex::new(initial.map(str::to_string)))
}

#[derive(Default)]
struct Slots {
    records: Mutex<HashMap<Slot, String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
    removes: AtomicUsize,
}

impl Slots {
    fn read(&self, slot: Slot) -> Option<String> {
        self.records.lock().expect("lock poisoned").get(&slot).cloned()
    }

    fn write(&self, slot: Slot, value: &str) -> bool {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return false;
        }
        self.records
            .lock()
            .expect("lock poisoned")
            .insert(slot, value.to_string());
        true
    }

    fn remove(&self, slot: Slot) -> bool {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.records.lock().expect("lock poisoned").remove(&slot);
        true
    }

    fn seed(&self, slot: Slot, value: &str) {
        self.records
            .lock()
            .expect("lock poisoned")
            .insert(slot, value.to_string());
    }
}

// ── Key/value tier ────────────────────────────────────────────────────────────

/// In-memory [`KeyValueStore`].
#[derive(Default)]
pub struct MemoryKeyValueStore {
    slots: Slots,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes all fail (quota exceeded).
    pub fn failing() -> Self {
        let store = Self::new();
        store.set_fail_writes(true);
        store
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.slots.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Places a record directly, bypassing the write counter.
    pub fn seed(&self, slot: Slot, value: &str) {
        self.slots.seed(slot, value);
    }

    /// Current contents of `slot`.
    pub fn get(&self, slot: Slot) -> Option<String> {
        self.slots.read(slot)
    }

    /// Number of write attempts, successful or not.
    pub fn write_count(&self) -> usize {
        self.slots.writes.load(Ordering::SeqCst)
    }

    pub fn remove_count(&self) -> usize {
        self.slots.removes.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn read(&self, slot: Slot) -> Option<String> {
        self.slots.read(slot)
    }

    fn write(&self, slot: Slot, value: &str) -> bool {
        self.slots.write(slot, value)
    }

    fn remove(&self, slot: Slot) -> bool {
        self.slots.remove(slot)
    }
}

// ── Database tier ─────────────────────────────────────────────────────────────

/// In-memory [`ConfigDatabase`].
pub struct MemoryDatabase {
    slots: Slots,
    available: bool,
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self {
            slots: Slots::default(),
            available: true,
        }
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// A database whose open failed: every call answers `None`/`false`.
    pub fn unavailable() -> Self {
        Self {
            slots: Slots::default(),
            available: false,
        }
    }

    pub fn failing() -> Self {
        let db = Self::new();
        db.set_fail_writes(true);
        db
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.slots.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn seed(&self, slot: Slot, value: &str) {
        self.slots.seed(slot, value);
    }

    pub fn get(&self, slot: Slot) -> Option<String> {
        self.slots.read(slot)
    }

    pub fn write_count(&self) -> usize {
        self.slots.writes.load(Ordering::SeqCst)
    }

    pub fn remove_count(&self) -> usize {
        self.slots.removes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigDatabase for MemoryDatabase {
    async fn read(&self, slot: Slot) -> Option<String> {
        if !self.available {
            return None;
        }
        self.slots.read(slot)
    }

    async fn write(&self, slot: Slot, value: &str) -> bool {
        self.available && self.slots.write(slot, value)
    }

    async fn remove(&self, slot: Slot) -> bool {
        self.available && self.slots.remove(slot)
    }
}

// ── Remote source ─────────────────────────────────────────────────────────────

/// In-memory [`RemoteSource`] backed by a [`SharedFile`].
pub struct MemoryRemoteSource {
    file: SharedFile,
    local_context: bool,
    reachable: AtomicBool,
    fetches: AtomicUsize,
    fallback_fetches: AtomicUsize,
}

impl MemoryRemoteSource {
    /// A network-served file: `fetch` returns its contents.
    pub fn new(file: SharedFile) -> Self {
        Self {
            file,
            local_context: false,
            reachable: AtomicBool::new(true),
            fetches: AtomicUsize::new(0),
            fallback_fetches: AtomicUsize::new(0),
        }
    }

    /// A page opened from disk: `fetch` always fails and only
    /// `fetch_fallback` can read the file.
    pub fn local(file: SharedFile) -> Self {
        Self {
            local_context: true,
            ..Self::new(file)
        }
    }

    /// Simulates a network outage (or its end).
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn fallback_count(&self) -> usize {
        self.fallback_fetches.load(Ordering::SeqCst)
    }

    fn contents(&self) -> Option<String> {
        self.file.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl RemoteSource for MemoryRemoteSource {
    fn location(&self) -> String {
        if self.local_context {
            "memory://local/site-config.json".to_string()
        } else {
            "memory://remote/site-config.json".to_string()
        }
    }

    async fn fetch(&self) -> Option<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.local_context || !self.reachable.load(Ordering::SeqCst) {
            return None;
        }
        self.contents()
    }

    fn is_local_context(&self) -> bool {
        self.local_context
    }

    async fn fetch_fallback(&self) -> Option<String> {
        self.fallback_fetches.fetch_add(1, Ordering::SeqCst);
        self.contents()
    }
}

// ── File picker ───────────────────────────────────────────────────────────────

/// How a [`MemoryFilePicker`] answers `pick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    Grant,
    Cancel,
    Unavailable,
}

/// In-memory [`FilePicker`] whose handles write into a [`SharedFile`].
pub struct MemoryFilePicker {
    outcome: PickOutcome,
    fail_writes: bool,
    file: SharedFile,
    picks: AtomicUsize,
    writes: Arc<AtomicUsize>,
}

impl MemoryFilePicker {
    pub fn new(file: SharedFile, outcome: PickOutcome) -> Self {
        Self {
            outcome,
            fail_writes: false,
            file,
            picks: AtomicUsize::new(0),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Grants a handle whose writes always fail.
    pub fn failing_writes(file: SharedFile) -> Self {
        Self {
            fail_writes: true,
            ..Self::new(file, PickOutcome::Grant)
        }
    }

    /// Number of times the operator was "prompted".
    pub fn pick_count(&self) -> usize {
        self.picks.load(Ordering::SeqCst)
    }

    /// Number of write attempts through any handle this picker granted.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FilePicker for MemoryFilePicker {
    async fn pick(&self) -> Result<Arc<dyn FileHandle>, HandleError> {
        self.picks.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            PickOutcome::Grant => Ok(Arc::new(MemoryFileHandle {
                file: Arc::clone(&self.file),
                fail_writes: self.fail_writes,
                writes: Arc::clone(&self.writes),
            })),
            PickOutcome::Cancel => Err(HandleError::Cancelled),
            PickOutcome::Unavailable => {
                Err(HandleError::Unavailable("no picker in this environment".into()))
            }
        }
    }
}

/// Handle granted by [`MemoryFilePicker`].
pub struct MemoryFileHandle {
    file: SharedFile,
    fail_writes: bool,
    writes: Arc<AtomicUsize>,
}

#[async_trait]
impl FileHandle for MemoryFileHandle {
    fn describe(&self) -> String {
        "memory://site-config.json".to_string()
    }

    async fn write(&self, contents: &str) -> Result<(), HandleError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(HandleError::Write("simulated write failure".into()));
        }
        *self.file.lock().expect("lock poisoned") = Some(contents.to_string());
        Ok(())
    }
}
