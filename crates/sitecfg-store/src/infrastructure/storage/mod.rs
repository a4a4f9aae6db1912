//! Storage backends.

pub mod db;
pub mod file_handle;
pub mod kv;
pub mod memory;
pub mod remote;

pub use db::RedbConfigDatabase;
pub use file_handle::{LocalFileHandle, PromptFilePicker};
pub use kv::FileKeyValueStore;
pub use remote::HttpRemoteSource;
