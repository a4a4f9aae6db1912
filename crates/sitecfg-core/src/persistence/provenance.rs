//! Provenance metadata stored next to every browser-tier copy.
//!
//! The record answers one question on the next load: was this copy produced
//! by a save that did *not* reach the published file?  Only then may it
//! override the file.  A copy that merely caches the file is tagged
//! [`Source::File`] and loses to a fresh read of the file.
//!
//! Wire format (shared with the page renderer):
//!
//! ```json
//! { "source": "local", "savedAt": 1718000000000 }
//! ```

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where the stored copy came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// A cache of the published file (or a save that was verified on disk).
    File,
    /// A save that only reached the browser tiers.
    Local,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::File => "file",
            Source::Local => "local",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{source, savedAt}` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub source: Source,
    /// Unix time in milliseconds.
    #[serde(default)]
    pub saved_at: i64,
}

impl Provenance {
    /// Stamps `source` with the current time.
    pub fn now(source: Source) -> Self {
        Self {
            source,
            saved_at: Utc::now().timestamp_millis(),
        }
    }

    /// Parses a stored meta payload.
    ///
    /// Anything that is not a well-formed record (bad JSON, unknown source,
    /// wrong shape) is treated as absent.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(meta) => Some(meta),
            Err(e) => {
                debug!("ignoring malformed provenance record: {e}");
                None
            }
        }
    }

    /// Serialises the record in its wire format.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "source": self.source.as_str(),
            "savedAt": self.saved_at,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_json_uses_wire_field_names() {
        let meta = Provenance {
            source: Source::Local,
            saved_at: 42,
        };
        let wire: serde_json::Value = serde_json::from_str(&meta.to_json()).expect("json");
        assert_eq!(wire, serde_json::json!({ "source": "local", "savedAt": 42 }));
    }

    #[test]
    fn test_parse_reads_wire_format() {
        let meta = Provenance::parse(r#"{"source":"file","savedAt":1700000000000}"#);
        assert_eq!(
            meta,
            Some(Provenance {
                source: Source::File,
                saved_at: 1_700_000_000_000
            })
        );
    }

    #[test]
    fn test_parse_tolerates_missing_timestamp() {
        let meta = Provenance::parse(r#"{"source":"local"}"#).expect("parsed");
        assert_eq!(meta.source, Source::Local);
        assert_eq!(meta.saved_at, 0);
    }

    #[test]
    fn test_parse_treats_garbage_as_absent() {
        assert!(Provenance::parse("not json").is_none());
        assert!(Provenance::parse(r#"{"source":"cloud"}"#).is_none());
        assert!(Provenance::parse("null").is_none());
        assert!(Provenance::parse("[]").is_none());
    }

    #[test]
    fn test_now_stamps_a_recent_time() {
        let before = Utc::now().timestamp_millis();
        let meta = Provenance::now(Source::File);
        assert!(meta.saved_at >= before);
        assert_eq!(meta.source, Source::File);
    }

    #[test]
    fn test_round_trip_through_wire_format() {
        let meta = Provenance::now(Source::Local);
        assert_eq!(Provenance::parse(&meta.to_json()), Some(meta));
    }
}
