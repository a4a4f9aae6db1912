//! sitecfg-store library entry point.
//!
//! Tiered persistence for the site configuration.  The layering follows the
//! same rules as the rest of the workspace:
//!
//! ```text
//! sitecfg (CLI, main.rs)
//!   └─ application/      PersistenceOrchestrator, import/export, backend ports
//!        └─ sitecfg-core  baseline, merge, precedence rules, SaveResult
//!   └─ infrastructure/   HTTP/file remote source, key/value file, redb,
//!                        file picker, in-memory doubles, settings file
//! ```
//!
//! The application layer only sees the traits in [`application::backends`];
//! concrete backends are wired together in
//! [`infrastructure::bootstrap::build_orchestrator`].

pub mod application;
pub mod infrastructure;
