//! Application layer: the persistence use cases.
//!
//! - **`backends`**    – Traits every storage tier implements.  Failures are
//!   collapsed to `None`/`false` behind these traits; no backend error type is
//!   visible here.
//!
//! - **`persistence`** – [`persistence::PersistenceOrchestrator`]: the load
//!   precedence sequence, the save sequence with file verification, and reset.
//!
//! - **`transfer`**    – Importing a configuration file through the save
//!   sequence, and exporting the in-memory configuration.

pub mod backends;
pub mod persistence;
pub mod transfer;
