//! Stochastic duration grammar.
//!
//! A [`Grammar`] rewrites a start symbol into terminal duration symbols. Each
//! step picks one non-terminal *site* uniformly at random among all current
//! non-terminal positions, then one of that symbol's alternatives uniformly at
//! random, and splices the alternative in place of the site. Rewriting stops
//! when no non-terminal remains.
//!
//! Termination is a property of the rule set: every non-terminal must reach
//! terminals in finite depth. A rule that only ever rewrites to itself loops
//! forever; this is not detected.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::random::IndexSource;
use super::symbol::DurationSymbol;
use crate::error::GameError;

/// One alternative on the right-hand side of a rule.
///
/// In YAML an alternative is either a single symbol (`h`) or a list (`[B, B]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ExpansionRepr", into = "ExpansionRepr")]
pub struct Expansion(Vec<DurationSymbol>);

impl Expansion {
    pub fn new(symbols: Vec<DurationSymbol>) -> Self {
        Self(symbols)
    }

    /// Replacement symbols, left to right.
    pub fn symbols(&self) -> &[DurationSymbol] {
        &self.0
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ExpansionRepr {
    Single(DurationSymbol),
    Sequence(Vec<DurationSymbol>),
}

impl From<ExpansionRepr> for Expansion {
    fn from(repr: ExpansionRepr) -> Self {
        match repr {
            ExpansionRepr::Single(s) => Self(vec![s]),
            ExpansionRepr::Sequence(seq) => Self(seq),
        }
    }
}

impl From<Expansion> for ExpansionRepr {
    fn from(e: Expansion) -> Self {
        if e.0.len() == 1 {
            let mut symbols = e.0;
            ExpansionRepr::Single(symbols.remove(0))
        } else {
            ExpansionRepr::Sequence(e.0)
        }
    }
}

/// Difficulty tier; each tier has its own built-in grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        };
        f.write_str(name)
    }
}

#[derive(Deserialize)]
struct GrammarRepr {
    start: DurationSymbol,
    rules: BTreeMap<DurationSymbol, Vec<Expansion>>,
}

impl TryFrom<GrammarRepr> for Grammar {
    type Error = GameError;

    fn try_from(repr: GrammarRepr) -> Result<Self, Self::Error> {
        Grammar::new(repr.start, repr.rules)
    }
}

/// A set of rewriting rules plus the symbol expansion starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GrammarRepr")]
pub struct Grammar {
    start: DurationSymbol,
    rules: BTreeMap<DurationSymbol, Vec<Expansion>>,
}

/// The result of [`Grammar::expand_traced`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionTrace {
    /// The final, fully terminal sequence.
    pub result: Vec<DurationSymbol>,
    /// Every intermediate sequence, starting with the start sequence and
    /// ending with `result`. One entry per rewrite step, plus the start.
    pub steps: Vec<Vec<DurationSymbol>>,
}

impl Grammar {
    /// Build a grammar, rejecting rules with no alternatives and a start
    /// symbol that has no rule.
    pub fn new(
        start: impl Into<DurationSymbol>,
        rules: BTreeMap<DurationSymbol, Vec<Expansion>>,
    ) -> Result<Self, GameError> {
        let start = start.into();
        if let Some((symbol, _)) = rules.iter().find(|(_, alts)| alts.is_empty()) {
            return Err(GameError::EmptyRule(symbol.to_string()));
        }
        if !rules.contains_key(&start) {
            return Err(GameError::UnknownStartSymbol(start.to_string()));
        }
        Ok(Self { start, rules })
    }

    /// Built-in grammar for a difficulty tier. All tiers start from `M`
    /// (one 4/4 measure) and only produce symbols in [`DurationTable::builtin`].
    ///
    /// Non-terminals: `M` measure, `H` two beats, `B` one beat, `E` half a
    /// beat, `T` a beat of eighth-note triplets.
    ///
    /// [`DurationTable::builtin`]: super::symbol::DurationTable::builtin
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let measure = rule(&[
            &["H", "H"],
            &["H", "B", "B"],
            &["B", "H", "B"],
            &["B", "B", "H"],
            &["B", "B", "B", "B"],
        ]);
        let mut rules = BTreeMap::new();
        match difficulty {
            Difficulty::Easy => {
                rules.insert("M".into(), measure);
                rules.insert("H".into(), rule(&[&["h"], &["B", "B"]]));
                rules.insert("B".into(), rule(&[&["q"]]));
            }
            Difficulty::Medium => {
                rules.insert("M".into(), measure);
                rules.insert("H".into(), rule(&[&["h"], &["B", "B"]]));
                rules.insert("B".into(), rule(&[&["q"], &["E", "E"]]));
                rules.insert("E".into(), rule(&[&["o"]]));
            }
            Difficulty::Hard => {
                rules.insert("M".into(), measure);
                rules.insert(
                    "H".into(),
                    rule(&[&["h"], &["B", "B"], &["qdot", "o"]]),
                );
                rules.insert(
                    "B".into(),
                    rule(&[&["q"], &["E", "E"], &["T"], &["odot", "s"]]),
                );
                rules.insert("E".into(), rule(&[&["o"], &["s", "s"]]));
                rules.insert("T".into(), rule(&[&["to", "to", "to"]]));
            }
        }
        Self {
            start: "M".into(),
            rules,
        }
    }

    /// Symbol every expansion starts from.
    pub fn start(&self) -> &DurationSymbol {
        &self.start
    }

    /// Whether `symbol` is a non-terminal of this grammar.
    pub fn is_non_terminal(&self, symbol: &DurationSymbol) -> bool {
        self.rules.contains_key(symbol)
    }

    /// Alternatives for `symbol`, if it is a non-terminal.
    pub fn alternatives(&self, symbol: &DurationSymbol) -> Option<&[Expansion]> {
        self.rules.get(symbol).map(Vec::as_slice)
    }

    /// Every symbol that appears in some alternative but has no rule.
    pub fn terminals(&self) -> Vec<DurationSymbol> {
        let mut out: Vec<DurationSymbol> = self
            .rules
            .values()
            .flatten()
            .flat_map(|e| e.symbols().iter())
            .filter(|s| !self.is_non_terminal(s))
            .cloned()
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Expand the start symbol to a terminal sequence.
    pub fn expand<R: IndexSource + ?Sized>(&self, rng: &mut R) -> Vec<DurationSymbol> {
        self.rewrite(vec![self.start.clone()], rng, |_| {})
    }

    /// Expand an arbitrary starting sequence to a terminal sequence.
    pub fn expand_from<R: IndexSource + ?Sized>(
        &self,
        start: &[DurationSymbol],
        rng: &mut R,
    ) -> Vec<DurationSymbol> {
        self.rewrite(start.to_vec(), rng, |_| {})
    }

    /// Expand the start symbol and record every intermediate sequence.
    pub fn expand_traced<R: IndexSource + ?Sized>(&self, rng: &mut R) -> ExpansionTrace {
        let initial = vec![self.start.clone()];
        let mut steps = vec![initial.clone()];
        let result = self.rewrite(initial, rng, |seq| steps.push(seq.to_vec()));
        ExpansionTrace { result, steps }
    }

    fn rewrite<R: IndexSource + ?Sized>(
        &self,
        mut seq: Vec<DurationSymbol>,
        rng: &mut R,
        mut observe: impl FnMut(&[DurationSymbol]),
    ) -> Vec<DurationSymbol> {
        loop {
            let sites: Vec<(usize, &Vec<Expansion>)> = seq
                .iter()
                .enumerate()
                .filter_map(|(i, s)| self.rules.get(s).map(|alts| (i, alts)))
                .collect();
            if sites.is_empty() {
                return seq;
            }

            let (site, alternatives) = sites[rng.pick(sites.len())];
            let chosen = &alternatives[rng.pick(alternatives.len())];
            seq.splice(site..=site, chosen.symbols().iter().cloned());
            observe(&seq);
        }
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::Medium)
    }
}

fn rule(alternatives: &[&[&str]]) -> Vec<Expansion> {
    alternatives
        .iter()
        .map(|alt| Expansion(alt.iter().map(|&s| DurationSymbol::from(s)).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhythm::random::FixedIndices;
    use crate::rhythm::symbol::{symbols, DurationTable};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn leftmost_first_alternative_expansion() {
        let g = Grammar::for_difficulty(Difficulty::Medium);
        let out = g.expand(&mut FixedIndices::zeros());
        assert_eq!(out, symbols(&["h", "h"]));
    }

    #[test]
    fn random_site_selection_splices_the_chosen_position() {
        let g = Grammar::for_difficulty(Difficulty::Medium);
        // M -> [H H]; second H -> [B B]; H -> h; first B -> q; B -> q
        let mut rng = FixedIndices::new(vec![0, 0, 1, 1, 0, 0, 0, 0, 0, 0]);
        let trace = g.expand_traced(&mut rng);
        assert_eq!(trace.result, symbols(&["h", "q", "q"]));
        assert_eq!(
            trace.steps,
            vec![
                symbols(&["M"]),
                symbols(&["H", "H"]),
                symbols(&["H", "B", "B"]),
                symbols(&["h", "B", "B"]),
                symbols(&["h", "q", "B"]),
                symbols(&["h", "q", "q"]),
            ]
        );
        assert_eq!(rng.picks(), 10);
    }

    #[test]
    fn expand_from_terminal_sequence_is_identity() {
        let g = Grammar::default();
        let start = symbols(&["q", "q", "h"]);
        let out = g.expand_from(&start, &mut FixedIndices::zeros());
        assert_eq!(out, start);
    }

    #[test]
    fn builtin_tiers_fill_exactly_one_measure() {
        let table = DurationTable::builtin();
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let g = Grammar::for_difficulty(difficulty);
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            for _ in 0..200 {
                let seq = g.expand(&mut rng);
                assert!(!seq.is_empty());
                let total: f64 = seq
                    .iter()
                    .map(|s| table.fraction_of(s).expect("terminal in builtin table"))
                    .sum();
                assert!((total - 1.0).abs() < 1e-9, "{difficulty}: {seq:?} sums to {total}");
            }
        }
    }

    #[test]
    fn builtin_terminals_are_in_builtin_table() {
        let table = DurationTable::builtin();
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            for t in Grammar::for_difficulty(difficulty).terminals() {
                assert!(table.contains(&t), "{difficulty}: missing {t}");
            }
        }
    }

    #[test]
    fn easy_never_produces_eighths() {
        let g = Grammar::for_difficulty(Difficulty::Easy);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            let seq = g.expand(&mut rng);
            assert!(seq.iter().all(|s| s.as_str() == "q" || s.as_str() == "h"));
        }
    }

    #[test]
    fn new_rejects_empty_rule() {
        let mut rules = BTreeMap::new();
        rules.insert(DurationSymbol::from("M"), vec![]);
        let err = Grammar::new("M", rules).unwrap_err();
        assert!(matches!(err, GameError::EmptyRule(s) if s == "M"));
    }

    #[test]
    fn new_rejects_unknown_start() {
        let mut rules = BTreeMap::new();
        rules.insert(DurationSymbol::from("M"), rule(&[&["q"]]));
        let err = Grammar::new("X", rules).unwrap_err();
        assert!(matches!(err, GameError::UnknownStartSymbol(s) if s == "X"));
    }

    #[test]
    fn yaml_accepts_single_symbols_and_lists() {
        let yaml = r#"
start: M
rules:
  M:
    - [B, B, B, B]
    - h
  B:
    - q
"#;
        let g: Grammar = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(g.start().as_str(), "M");
        let alts = g.alternatives(&"M".into()).unwrap();
        assert_eq!(alts.len(), 2);
        assert_eq!(alts[1].symbols(), &symbols(&["h"])[..]);
        assert_eq!(g.terminals(), symbols(&["h", "q"]));
    }

    #[test]
    fn yaml_with_empty_rule_fails_validation() {
        let yaml = "start: M\nrules:\n  M: []\n";
        assert!(serde_yaml::from_str::<Grammar>(yaml).is_err());
    }

    #[test]
    fn difficulty_yaml_names() {
        let d: Difficulty = serde_yaml::from_str("hard").unwrap();
        assert_eq!(d, Difficulty::Hard);
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }
}
