//! Load precedence: which stored copy of the configuration wins.
//!
//! The orchestrator gathers a [`TierSnapshot`] (what the published file and
//! the browser tiers returned) and asks [`decide`] for a winner.  The rules
//! are an ordered list evaluated top to bottom; the first one whose condition
//! holds decides:
//!
//! | # | Rule               | Condition                                   | Winner   |
//! |---|--------------------|---------------------------------------------|----------|
//! | 1 | `LocalEditsWin`    | browser copy exists, tagged `local`         | Browser  |
//! | 2 | `NoFileFallback`   | browser copy exists, no file data           | Browser  |
//! | 3 | `FileWins`         | file data exists                            | File     |
//! | 4 | `BaselineOnly`     | always                                      | Baseline |
//!
//! Choosing *which* browser tier supplies the browser copy happens before
//! this table: the database tier wins over the key/value tier whenever it has
//! data, regardless of either tier's metadata.  Metadata is only ever read
//! from the tier whose data was chosen, so a meta record left behind in a
//! tier without data never influences the decision.

use std::fmt;

use crate::persistence::provenance::Source;

/// The browser-side tier that supplied a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserTier {
    /// The embedded asynchronous database (preferred, larger capacity).
    Database,
    /// The small synchronous key/value store.
    KeyValue,
}

impl fmt::Display for BrowserTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserTier::Database => f.write_str("database"),
            BrowserTier::KeyValue => f.write_str("key-value"),
        }
    }
}

/// What the load sequence observed, stripped of the payloads themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierSnapshot {
    /// The published file produced a usable object.
    pub has_file_data: bool,
    /// The browser tier that produced a usable object, if any.
    pub browser_tier: Option<BrowserTier>,
    /// Provenance of that browser copy, if its tier had a valid meta record.
    pub browser_source: Option<Source>,
}

/// Which copy is merged onto the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Browser(BrowserTier),
    File,
    Baseline,
}

/// Named precedence rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecedenceRule {
    LocalEditsWin,
    NoFileFallback,
    FileWins,
    BaselineOnly,
}

/// Evaluation order.
pub const RULES: [PrecedenceRule; 4] = [
    PrecedenceRule::LocalEditsWin,
    PrecedenceRule::NoFileFallback,
    PrecedenceRule::FileWins,
    PrecedenceRule::BaselineOnly,
];

impl PrecedenceRule {
    /// Returns the winner if this rule applies to `snapshot`.
    pub fn apply(self, snapshot: &TierSnapshot) -> Option<Winner> {
        match self {
            PrecedenceRule::LocalEditsWin => snapshot
                .browser_tier
                .filter(|_| snapshot.browser_source == Some(Source::Local))
                .map(Winner::Browser),
            PrecedenceRule::NoFileFallback => snapshot
                .browser_tier
                .filter(|_| !snapshot.has_file_data)
                .map(Winner::Browser),
            PrecedenceRule::FileWins => snapshot.has_file_data.then_some(Winner::File),
            PrecedenceRule::BaselineOnly => Some(Winner::Baseline),
        }
    }
}

/// Outcome of [`decide`]: the winner and the rule that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub rule: PrecedenceRule,
    pub winner: Winner,
}

impl Decision {
    /// `true` when the file won and the browser tiers should be primed with
    /// a `file`-tagged copy of it.
    pub fn primes_cache(&self) -> bool {
        self.winner == Winner::File
    }
}

/// Evaluates [`RULES`] against `snapshot`.
pub fn decide(snapshot: &TierSnapshot) -> Decision {
    RULES
        .iter()
        .find_map(|&rule| rule.apply(snapshot).map(|winner| Decision { rule, winner }))
        .unwrap_or(Decision {
            rule: PrecedenceRule::BaselineOnly,
            winner: Winner::Baseline,
        })
}
