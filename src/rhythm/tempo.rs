//! Validated tempo.

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Beats per quarter-note measure (4/4).
pub const BEATS_PER_MEASURE: u32 = 4;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: f64 = 60_000.0;

/// A tempo in beats per minute, guaranteed finite and above zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Tempo(f64);

impl Tempo {
    /// Reject bpm that is not finite or not above zero.
    pub fn new(bpm: f64) -> Result<Self, GameError> {
        if bpm.is_finite() && bpm > 0.0 {
            Ok(Self(bpm))
        } else {
            Err(GameError::InvalidTempo(bpm))
        }
    }

    /// Beats per minute.
    pub fn bpm(self) -> f64 {
        self.0
    }

    /// Duration of one beat in milliseconds.
    pub fn beat_ms(self) -> f64 {
        MS_PER_MINUTE / self.0
    }

    /// Duration of one 4/4 measure in milliseconds.
    pub fn measure_ms(self) -> f64 {
        self.beat_ms() * BEATS_PER_MEASURE as f64
    }

    /// Raise the tempo by a non-negative amount. Negative or non-finite
    /// increments leave the tempo unchanged.
    pub fn raised_by(self, bpm: f64) -> Self {
        if bpm.is_finite() && bpm > 0.0 {
            Self(self.0 + bpm)
        } else {
            self
        }
    }
}

impl<'de> Deserialize<'de> for Tempo {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bpm = f64::deserialize(deserializer)?;
        Tempo::new(bpm).map_err(serde::de::Error::custom)
    }
}
