//! Persistence rules shared by every storage tier.
//!
//! The orchestrator in `sitecfg-store` performs the I/O; this module holds
//! the decisions it makes and the records it produces, so they can be tested
//! without any backend.

pub mod precedence;
pub mod provenance;
pub mod save_result;
