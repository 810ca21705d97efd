//! A round's rhythmic pattern: symbols, timing, expected hits and notation.

use log::warn;
use serde::Serialize;

use super::convert::{
    fractions_to_seconds, normalize, onsets_from_durations, project_to_notation,
    segment_index_of, symbols_to_fractions, NotationNote,
};
use super::symbol::{DurationSymbol, DurationTable};
use super::tempo::Tempo;

/// Symbol used for the fallback and metronome patterns.
pub const QUARTER: &str = "q";

/// One onset the player is expected to strike.
///
/// `matched` only ever goes from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectedHit {
    time_ms: f64,
    segment_index: usize,
    matched: bool,
}

impl ExpectedHit {
    pub fn new(time_ms: f64, segment_index: usize) -> Self {
        Self {
            time_ms,
            segment_index,
            matched: false,
        }
    }

    /// Onset in milliseconds from the first input beat.
    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    /// Beat of the input measure (0..=3) the onset falls in.
    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    /// Whether a strike has claimed this onset.
    pub fn is_matched(&self) -> bool {
        self.matched
    }

    pub(crate) fn mark_matched(&mut self) {
        self.matched = true;
    }
}

/// Build expected hits from inter-onset durations (seconds).
pub fn expected_hits_from_durations(durations_sec: &[f64], beat_ms: f64) -> Vec<ExpectedHit> {
    onsets_from_durations(durations_sec)
        .into_iter()
        .map(|t| {
            let t_ms = t * 1000.0;
            ExpectedHit::new(t_ms, segment_index_of(t_ms, beat_ms))
        })
        .collect()
}

/// Everything derived from one generated symbol sequence at one tempo.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    symbols: Vec<DurationSymbol>,
    durations_sec: Vec<f64>,
    notation: Vec<NotationNote>,
    hits: Vec<ExpectedHit>,
}

impl Pattern {
    /// Build a pattern from a terminal sequence.
    ///
    /// Fractions are normalized to one measure. If the sequence is empty or
    /// its fractions sum to zero (or overflow), four quarter notes are used
    /// instead so the round stays playable.
    pub fn build(symbols: Vec<DurationSymbol>, table: &DurationTable, tempo: Tempo) -> Self {
        let raw = symbols_to_fractions(&symbols, table);
        match normalize(&raw) {
            Some(fractions) => Self::from_fractions(symbols, &fractions, tempo),
            None => {
                warn!("degenerate pattern {symbols:?}, falling back to four quarters");
                Self::four_quarters(tempo)
            }
        }
    }

    /// The fixed four-quarter-note pattern.
    pub fn four_quarters(tempo: Tempo) -> Self {
        let symbols = vec![DurationSymbol::from(QUARTER); 4];
        Self::from_fractions(symbols, &[0.25; 4], tempo)
    }

    fn from_fractions(symbols: Vec<DurationSymbol>, fractions: &[f64], tempo: Tempo) -> Self {
        let durations_sec = fractions_to_seconds(fractions, tempo.bpm());
        let hits = expected_hits_from_durations(&durations_sec, tempo.beat_ms());
        let notation = project_to_notation(&symbols, &durations_sec);
        Self {
            symbols,
            durations_sec,
            notation,
            hits,
        }
    }

    /// Terminal symbols the pattern was built from.
    pub fn symbols(&self) -> &[DurationSymbol] {
        &self.symbols
    }

    /// Inter-onset durations in seconds.
    pub fn durations_sec(&self) -> &[f64] {
        &self.durations_sec
    }

    /// Onsets in seconds relative to the first note.
    pub fn onsets_sec(&self) -> Vec<f64> {
        onsets_from_durations(&self.durations_sec)
    }

    /// Notation projected from the durations.
    pub fn notation(&self) -> &[NotationNote] {
        &self.notation
    }

    /// Expected hits, in onset order.
    pub fn hits(&self) -> &[ExpectedHit] {
        &self.hits
    }

    pub(crate) fn hits_mut(&mut self) -> &mut [ExpectedHit] {
        &mut self.hits
    }

    /// Number of hits not yet matched.
    pub fn unmatched(&self) -> usize {
        self.hits.iter().filter(|h| !h.is_matched()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhythm::symbol::symbols;
    use assert_approx_eq::assert_approx_eq;

    fn tempo(bpm: f64) -> Tempo {
        Tempo::new(bpm).unwrap()
    }

    #[test]
    fn four_quarters_at_sixty() {
        let p = Pattern::four_quarters(tempo(60.0));
        let times: Vec<f64> = p.hits().iter().map(|h| h.time_ms()).collect();
        assert_eq!(times.len(), 4);
        for (i, t) in times.iter().enumerate() {
            assert_approx_eq!(*t, i as f64 * 1000.0);
        }
        let segs: Vec<usize> = p.hits().iter().map(|h| h.segment_index()).collect();
        assert_eq!(segs, vec![0, 1, 2, 3]);
        assert!(p.hits().iter().all(|h| !h.is_matched()));
    }

    #[test]
    fn eighths_share_a_segment() {
        let table = DurationTable::builtin();
        let p = Pattern::build(symbols(&["h", "o", "o", "q"]), &table, tempo(120.0));
        let segs: Vec<usize> = p.hits().iter().map(|h| h.segment_index()).collect();
        assert_eq!(segs, vec![0, 2, 2, 3]);
        assert_approx_eq!(p.hits()[2].time_ms(), 1250.0);
    }

    #[test]
    fn over_long_pattern_is_compressed_into_one_measure() {
        let table = DurationTable::builtin();
        let p = Pattern::build(symbols(&["h", "h", "h", "h"]), &table, tempo(60.0));
        let total: f64 = p.durations_sec().iter().sum();
        assert_approx_eq!(total, 4.0);
        assert_approx_eq!(p.hits()[1].time_ms(), 1000.0);
    }

    #[test]
    fn degenerate_pattern_falls_back_to_four_quarters() {
        let table = DurationTable::builtin();
        let p = Pattern::build(symbols(&["zz", "yy"]), &table, tempo(60.0));
        assert_eq!(p.symbols(), &symbols(&["q", "q", "q", "q"])[..]);
        assert_eq!(p.hits().len(), 4);

        let empty = Pattern::build(Vec::new(), &table, tempo(60.0));
        assert_eq!(empty.hits().len(), 4);
    }

    #[test]
    fn unknown_symbol_keeps_its_slot_as_zero_length() {
        let table = DurationTable::builtin();
        let p = Pattern::build(symbols(&["h", "zz", "h"]), &table, tempo(60.0));
        assert_eq!(p.hits().len(), 3);
        assert_approx_eq!(p.hits()[1].time_ms(), p.hits()[2].time_ms());
    }

    #[test]
    fn notation_and_onsets_agree() {
        let table = DurationTable::builtin();
        let p = Pattern::build(symbols(&["q", "q", "h"]), &table, tempo(90.0));
        let onsets = p.onsets_sec();
        assert_eq!(onsets.len(), 3);
        assert_approx_eq!(p.notation()[2].offset, 0.5);
        assert_approx_eq!(onsets[2] * 1000.0, p.hits()[2].time_ms());
    }

    #[test]
    fn mark_matched_is_one_way() {
        let mut p = Pattern::four_quarters(tempo(60.0));
        p.hits_mut()[0].mark_matched();
        p.hits_mut()[0].mark_matched();
        assert!(p.hits()[0].is_matched());
        assert_eq!(p.unmatched(), 3);
    }
}
