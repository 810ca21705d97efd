//! Time conversion pipeline: symbols → fractions → seconds → onsets.
//!
//! All functions are pure. Fractions are relative to one 4/4 measure; the
//! seconds produced by [`fractions_to_seconds`] are *inter-onset durations*,
//! turned into onset times by [`onsets_from_durations`].

use log::{error, warn};
use serde::{Deserialize, Serialize};

use super::symbol::{DurationSymbol, DurationTable};
use super::tempo::BEATS_PER_MEASURE;

/// Number of beat segments in the input measure.
pub const SEGMENTS: usize = BEATS_PER_MEASURE as usize;

const BOUNDARY_EPSILON: f64 = 1e-9;

/// A note projected onto a 0..1 measure for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotationNote {
    /// Start of the note as a fraction of the whole pattern.
    pub offset: f64,
    /// Length of the note as a fraction of the whole pattern.
    pub duration: f64,
    #[serde(rename = "type")]
    pub kind: DurationSymbol,
}

/// Look up each symbol's fraction of a measure.
///
/// Unknown symbols resolve to `0.0` and are logged; they are never dropped,
/// so the output has exactly one entry per input symbol.
pub fn symbols_to_fractions(symbols: &[DurationSymbol], table: &DurationTable) -> Vec<f64> {
    symbols
        .iter()
        .map(|s| match table.fraction_of(s) {
            Some(f) => f,
            None => {
                warn!("unknown duration symbol '{s}', using 0");
                0.0
            }
        })
        .collect()
}

/// Scale fractions so they sum to exactly one measure.
///
/// Returns `None` when the sum is zero or not finite; the caller substitutes
/// a fallback pattern in that case. A pattern summing to more or less than a
/// measure is stretched or compressed to fit.
pub fn normalize(fractions: &[f64]) -> Option<Vec<f64>> {
    let total: f64 = fractions.iter().sum();
    if total == 0.0 || !total.is_finite() {
        return None;
    }
    Some(fractions.iter().map(|f| f / total).collect())
}

/// Convert measure fractions to inter-onset durations in seconds.
///
/// Returns an empty vector when `bpm` is not above zero.
pub fn fractions_to_seconds(fractions: &[f64], bpm: f64) -> Vec<f64> {
    if bpm.is_nan() || bpm <= 0.0 {
        error!("bpm must be greater than zero, got {bpm}");
        return Vec::new();
    }
    let beat_seconds = 60.0 / bpm;
    let whole_measure_seconds = BEATS_PER_MEASURE as f64 * beat_seconds;
    fractions.iter().map(|f| f * whole_measure_seconds).collect()
}

/// Cumulative onsets from inter-onset durations.
///
/// The first onset is 0 and the i-th onset is the sum of durations `0..i`.
/// There is no trailing onset for the end of the measure.
pub fn onsets_from_durations(durations: &[f64]) -> Vec<f64> {
    let mut onsets = Vec::with_capacity(durations.len());
    let mut t = 0.0;
    for d in durations {
        onsets.push(t);
        t += d;
    }
    onsets
}

/// Which beat of the input measure an onset falls in, clamped to `0..=3`.
pub fn segment_index_of(onset_ms: f64, beat_duration_ms: f64) -> usize {
    // onsets built from summed durations can land a hair below a beat boundary
    let segment = (onset_ms / beat_duration_ms + BOUNDARY_EPSILON).floor();
    // NaN casts to 0
    segment.clamp(0.0, (SEGMENTS - 1) as f64) as usize
}

/// Project a pattern onto a normalized 0..1 staff for display.
///
/// Returns an empty list if the durations do not add up to a positive time.
pub fn project_to_notation(
    symbols: &[DurationSymbol],
    durations_sec: &[f64],
) -> Vec<NotationNote> {
    let total: f64 = durations_sec.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Vec::new();
    }

    let mut cursor = 0.0;
    symbols
        .iter()
        .zip(durations_sec)
        .map(|(symbol, &d)| {
            let note = NotationNote {
                offset: cursor / total,
                duration: d / total,
                kind: symbol.clone(),
            };
            cursor += d;
            note
        })
        .collect()
}
