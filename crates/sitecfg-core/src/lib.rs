//! # sitecfg-core
//!
//! Shared library for the site configuration editor containing the schema
//! baseline, the deep-merge algorithm, the typed configuration view, and the
//! pure rules that decide which stored copy of the configuration wins.
//!
//! This crate has zero dependencies on network clients, file systems, or
//! databases.  The storage tiers and the orchestrator that drives them live in
//! `sitecfg-store`.
//!
//! # Architecture overview
//!
//! The marketing site reads a single JSON document (`site-config.json`) that
//! describes every editable piece of content.  The admin editor keeps copies
//! of that document in several places (the published file, a small key/value
//! store, an embedded database), and those copies can diverge.  This crate
//! defines:
//!
//! - **`domain`** – What a configuration *is*: the immutable baseline tree,
//!   the generic deep merge used to fill partial copies, the typed
//!   [`SiteConfig`] view, dotted-path editing, and gallery normalisation.
//!
//! - **`persistence`** – How copies are *ranked and reported*: provenance
//!   metadata recorded next to every stored copy, the ordered precedence
//!   rules evaluated on load, and the [`SaveResult`] returned by every save.

pub mod domain;
pub mod persistence;

pub use domain::baseline::{baseline, clone_value, fresh_baseline};
pub use domain::merge::merge_deep;
pub use domain::path::{
    append_item, get_path, get_path_mut, remove_item, set_path, template_item, ConfigPath,
    PathError,
};
pub use domain::site::SiteConfig;
pub use persistence::precedence::{
    decide, BrowserTier, Decision, PrecedenceRule, TierSnapshot, Winner,
};
pub use persistence::provenance::{Provenance, Source};
pub use persistence::save_result::{SaveMode, SaveResult, SaveStatus, TierWrites};
