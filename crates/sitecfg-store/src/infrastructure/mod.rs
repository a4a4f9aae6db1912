//! Infrastructure layer: concrete backends and process wiring.
//!
//! - **`storage`**   – Implementations of the ports in
//!   [`crate::application::backends`]: HTTP/file remote source, key/value
//!   file, redb database, prompting file picker, and in-memory doubles.
//! - **`settings`**  – The TOML settings file and its platform location.
//! - **`bootstrap`** – Builds a [`crate::application::persistence::PersistenceOrchestrator`]
//!   from [`settings::Settings`].

pub mod bootstrap;
pub mod settings;
pub mod storage;
