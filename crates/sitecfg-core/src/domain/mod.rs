//! Domain entities for the site configuration.
//!
//! Everything here is pure data manipulation over `serde_json::Value` trees
//! and the typed [`site::SiteConfig`] view.  Nothing performs I/O.

/// The immutable default configuration tree and clone helpers.
pub mod baseline;
/// Project and collection image galleries.
pub mod gallery;
/// Recursive overlay of one configuration tree onto another.
pub mod merge;
/// Dotted-path reads and writes used by the editor.
pub mod path;
/// Typed view of the configuration.
pub mod site;
