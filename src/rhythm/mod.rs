//! Rhythm core — duration grammar, symbol tables, and the time conversion pipeline.
//!
//! A round's pattern is built in one pass: the [`Grammar`] expands its start
//! symbol into terminal [`DurationSymbol`]s, the [`DurationTable`] maps them to
//! fractions of a measure, and [`Pattern::build`] turns those into
//! millisecond onsets, [`ExpectedHit`]s and a [`NotationNote`] projection.

pub mod convert;
pub mod grammar;
pub mod pattern;
pub mod random;
pub mod symbol;
pub mod tempo;

pub use convert::{
    fractions_to_seconds, normalize, onsets_from_durations, project_to_notation,
    segment_index_of, symbols_to_fractions, NotationNote, SEGMENTS,
};
pub use grammar::{Difficulty, Expansion, ExpansionTrace, Grammar};
pub use pattern::{expected_hits_from_durations, ExpectedHit, Pattern};
pub use random::{FixedIndices, IndexSource};
pub use symbol::{symbols, DurationSymbol, DurationTable};
pub use tempo::{Tempo, BEATS_PER_MEASURE};
