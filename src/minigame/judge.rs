//! Timing judgment: closest-unmatched search and tolerance scoring.
//!
//! These are free functions over a slice of [`ExpectedHit`]s so every
//! minigame variant shares exactly one matching rule.

use serde::Serialize;

use crate::error::GameError;
use crate::rhythm::ExpectedHit;

/// Points awarded for a strike inside the strict window.
pub const PERFECT_POINTS: u32 = 100;
/// Points awarded for a strike inside the loose window only.
pub const GOOD_POINTS: u32 = 50;

/// Success grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HitKind {
    Perfect,
    Good,
}

impl HitKind {
    /// Points awarded for this grade.
    pub fn points(self) -> u32 {
        match self {
            Self::Perfect => PERFECT_POINTS,
            Self::Good => GOOD_POINTS,
        }
    }
}

/// Why a strike failed to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingErrorReason {
    /// The nearest unmatched onset is later than the strike.
    Early,
    /// The nearest unmatched onset is at or before the strike.
    Late,
    /// Nothing was left to match.
    Extra,
}

/// Result of judging one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Judgment {
    /// Outside the input phase or its guard band; no penalty.
    Ignore,
    Score { kind: HitKind, points: u32 },
    TimingError { reason: TimingErrorReason },
}

impl Judgment {
    /// A successful hit of the given grade.
    pub fn score(kind: HitKind) -> Self {
        Self::Score {
            kind,
            points: kind.points(),
        }
    }

    /// Whether the strike matched an onset.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Score { .. })
    }

    /// Whether the strike costs a life.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::TimingError { .. })
    }

    /// Points carried by a success, 0 otherwise.
    pub fn points(&self) -> u32 {
        match self {
            Self::Score { points, .. } => *points,
            _ => 0,
        }
    }
}

/// Tolerance radii as fractions of one beat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingWindows {
    strict: f64,
    loose: f64,
}

impl TimingWindows {
    /// Strict 10%, loose 20% of a beat.
    pub const DEFAULT: Self = Self {
        strict: 0.10,
        loose: 0.20,
    };

    /// One 20% radius; every match is perfect.
    pub const METRONOME: Self = Self {
        strict: 0.20,
        loose: 0.20,
    };

    pub fn new(strict: f64, loose: f64) -> Result<Self, GameError> {
        let valid = strict.is_finite() && loose.is_finite() && strict > 0.0 && strict <= loose;
        if !valid {
            return Err(GameError::InvalidTimingWindows { strict, loose });
        }
        Ok(Self { strict, loose })
    }

    /// A single radius used for both grades.
    pub fn single(radius: f64) -> Result<Self, GameError> {
        Self::new(radius, radius)
    }

    /// Radius of a perfect hit, in beats.
    pub fn strict(&self) -> f64 {
        self.strict
    }

    /// Radius of a good hit, in beats.
    pub fn loose(&self) -> f64 {
        self.loose
    }
}

impl Default for TimingWindows {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The nearest unmatched hit to `hit_time_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestHit {
    pub index: usize,
    pub distance_ms: f64,
    pub target_ms: f64,
}

/// Linear scan for the unmatched hit closest to `hit_time_ms`.
///
/// Ties go to the earliest index.
pub fn find_closest_unmatched(hits: &[ExpectedHit], hit_time_ms: f64) -> Option<ClosestHit> {
    let mut best: Option<ClosestHit> = None;
    for (index, hit) in hits.iter().enumerate() {
        if hit.is_matched() {
            continue;
        }
        let distance_ms = (hit_time_ms - hit.time_ms()).abs();
        if best.map_or(true, |b| distance_ms < b.distance_ms) {
            best = Some(ClosestHit {
                index,
                distance_ms,
                target_ms: hit.time_ms(),
            });
        }
    }
    best
}

/// Judge a strike at pattern-relative `hit_time_ms` and mark the matched hit.
///
/// A failed judgment mutates nothing.
pub fn score_hit(
    hits: &mut [ExpectedHit],
    hit_time_ms: f64,
    beat_ms: f64,
    windows: TimingWindows,
) -> Judgment {
    let Some(best) = find_closest_unmatched(hits, hit_time_ms) else {
        return Judgment::TimingError {
            reason: TimingErrorReason::Extra,
        };
    };

    let kind = if best.distance_ms <= beat_ms * windows.strict {
        Some(HitKind::Perfect)
    } else if best.distance_ms <= beat_ms * windows.loose {
        Some(HitKind::Good)
    } else {
        None
    };

    match kind {
        Some(kind) => {
            hits[best.index].mark_matched();
            Judgment::score(kind)
        }
        None => {
            let reason = if hit_time_ms < best.target_ms {
                TimingErrorReason::Early
            } else {
                TimingErrorReason::Late
            };
            Judgment::TimingError { reason }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quarters() -> Vec<ExpectedHit> {
        (0..4)
            .map(|i| ExpectedHit::new(i as f64 * 1000.0, i))
            .collect()
    }

    #[test]
    fn exact_strike_is_perfect_and_matches() {
        let mut hits = quarters();
        let j = score_hit(&mut hits, 1000.0, 1000.0, TimingWindows::DEFAULT);
        assert_eq!(j, Judgment::score(HitKind::Perfect));
        assert_eq!(j.points(), 100);
        assert!(hits[1].is_matched());
        assert!(!hits[0].is_matched());
    }

    #[test]
    fn loose_window_gives_good() {
        let mut hits = quarters();
        let j = score_hit(&mut hits, 150.0, 1000.0, TimingWindows::DEFAULT);
        assert_eq!(j, Judgment::score(HitKind::Good));
        assert_eq!(j.points(), 50);
        assert!(hits[0].is_matched());
    }

    #[test]
    fn window_edges_are_inclusive() {
        let mut hits = quarters();
        assert_eq!(
            score_hit(&mut hits, 100.0, 1000.0, TimingWindows::DEFAULT),
            Judgment::score(HitKind::Perfect)
        );
        assert_eq!(
            score_hit(&mut hits, 800.0, 1000.0, TimingWindows::DEFAULT),
            Judgment::score(HitKind::Good)
        );
    }

    #[test]
    fn outside_both_windows_is_early_or_late_without_mutation() {
        let mut hits = quarters();
        let early = score_hit(&mut hits, 700.0, 1000.0, TimingWindows::DEFAULT);
        assert_eq!(
            early,
            Judgment::TimingError {
                reason: TimingErrorReason::Early
            }
        );
        let late = score_hit(&mut hits, 300.0, 1000.0, TimingWindows::DEFAULT);
        assert_eq!(
            late,
            Judgment::TimingError {
                reason: TimingErrorReason::Late
            }
        );
        assert!(hits.iter().all(|h| !h.is_matched()));
    }

    #[test]
    fn nothing_left_is_extra() {
        let mut hits = vec![ExpectedHit::new(0.0, 0)];
        score_hit(&mut hits, 0.0, 1000.0, TimingWindows::DEFAULT);
        let j = score_hit(&mut hits, 0.0, 1000.0, TimingWindows::DEFAULT);
        assert_eq!(
            j,
            Judgment::TimingError {
                reason: TimingErrorReason::Extra
            }
        );
        assert!(j.is_failure());
    }

    #[test]
    fn ties_go_to_the_earliest_hit() {
        let hits = quarters();
        let best = find_closest_unmatched(&hits, 500.0).unwrap();
        assert_eq!(best.index, 0);
        assert_eq!(best.distance_ms, 500.0);
    }

    #[test]
    fn matched_hits_are_skipped() {
        let mut hits = quarters();
        hits[0].mark_matched();
        let best = find_closest_unmatched(&hits, 0.0).unwrap();
        assert_eq!(best.index, 1);
    }

    #[test]
    fn metronome_windows_only_give_perfect() {
        let mut hits = quarters();
        let j = score_hit(&mut hits, 190.0, 1000.0, TimingWindows::METRONOME);
        assert_eq!(j, Judgment::score(HitKind::Perfect));
    }

    #[test]
    fn window_validation() {
        assert!(TimingWindows::new(0.1, 0.2).is_ok());
        assert!(TimingWindows::new(0.3, 0.2).is_err());
        assert!(TimingWindows::new(0.0, 0.2).is_err());
        assert!(TimingWindows::new(f64::NAN, 0.2).is_err());
        assert!(TimingWindows::single(0.2).is_ok());
    }

    #[test]
    fn judgment_serializes_with_type_tag() {
        let json = serde_json::to_string(&Judgment::score(HitKind::Good)).unwrap();
        assert_eq!(json, r#"{"type":"score","kind":"good","points":50}"#);
        let json = serde_json::to_string(&Judgment::TimingError {
            reason: TimingErrorReason::Late,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"timingError","reason":"late"}"#);
    }
}
