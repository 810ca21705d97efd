//! Duration symbols and the symbol → fraction-of-measure table.
//!
//! A [`DurationSymbol`] is an opaque token. Grammar non-terminals use the same
//! token type; a symbol is a non-terminal exactly when the active grammar has a
//! rule for it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// An opaque rhythm token such as `"q"` (quarter) or `"M"` (a measure non-terminal).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationSymbol(String);

impl DurationSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DurationSymbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for DurationSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build a symbol sequence from string literals.
pub fn symbols(names: &[&str]) -> Vec<DurationSymbol> {
    names.iter().map(|&n| DurationSymbol::from(n)).collect()
}

/// Maps terminal symbols to their length as a fraction of one 4/4 measure.
///
/// Every fraction is finite and non-negative; YAML tables are checked on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<DurationSymbol, f64>",
    into = "BTreeMap<DurationSymbol, f64>"
)]
pub struct DurationTable {
    fractions: BTreeMap<DurationSymbol, f64>,
}

impl DurationTable {
    /// An empty table. Every lookup misses.
    pub fn new() -> Self {
        Self {
            fractions: BTreeMap::new(),
        }
    }

    /// The built-in table covering every terminal used by the built-in grammars.
    ///
    /// | symbol | note | fraction |
    /// |--------|------|----------|
    /// | `m` | whole | 1 |
    /// | `hdot` | dotted half | 3/4 |
    /// | `h` | half | 1/2 |
    /// | `qdot` | dotted quarter | 3/8 |
    /// | `q` | quarter | 1/4 |
    /// | `tq` | quarter-note triplet | 1/6 |
    /// | `odot` | dotted eighth | 3/16 |
    /// | `o` | eighth | 1/8 |
    /// | `to` | eighth-note triplet | 1/12 |
    /// | `s` | sixteenth | 1/16 |
    /// | `f` | thirty-second | 1/32 |
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (name, fraction) in [
            ("m", 1.0),
            ("hdot", 0.75),
            ("h", 0.5),
            ("qdot", 0.375),
            ("q", 0.25),
            ("tq", 1.0 / 6.0),
            ("odot", 0.1875),
            ("o", 0.125),
            ("to", 1.0 / 12.0),
            ("s", 0.0625),
            ("f", 0.03125),
        ] {
            table.insert(name, fraction);
        }
        table
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, symbol: impl Into<DurationSymbol>, fraction: f64) {
        self.fractions.insert(symbol.into(), fraction);
    }

    /// Fraction of a measure for `symbol`, if the table knows it.
    pub fn fraction_of(&self, symbol: &DurationSymbol) -> Option<f64> {
        self.fractions.get(symbol).copied()
    }

    /// Reject entries that would make onsets run backwards.
    pub fn validate(&self) -> Result<(), GameError> {
        match self
            .fractions
            .iter()
            .find(|(_, f)| !f.is_finite() || **f < 0.0)
        {
            Some((symbol, &fraction)) => Err(GameError::InvalidDuration {
                symbol: symbol.to_string(),
                fraction,
            }),
            None => Ok(()),
        }
    }

    /// Whether `symbol` is a terminal of this table.
    pub fn contains(&self, symbol: &DurationSymbol) -> bool {
        self.fractions.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }
}

impl TryFrom<BTreeMap<DurationSymbol, f64>> for DurationTable {
    type Error = GameError;

    fn try_from(fractions: BTreeMap<DurationSymbol, f64>) -> Result<Self, Self::Error> {
        let table = Self { fractions };
        table.validate()?;
        Ok(table)
    }
}

impl From<DurationTable> for BTreeMap<DurationSymbol, f64> {
    fn from(table: DurationTable) -> Self {
        table.fractions
    }
}

impl Default for DurationTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl From<String> for DurationSymbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}
