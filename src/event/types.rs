//! Event data model — what the game core tells its host.
//!
//! [`RoundEvent`]s come out of a single minigame's beat handler.
//! [`SessionEvent`]s are what the [`GameController`](crate::session::GameController)
//! publishes: round events plus judgments, life changes and game over.

use std::fmt;

use serde::Serialize;

use crate::minigame::{HitKind, Judgment, TimingErrorReason};
use crate::rhythm::{DurationSymbol, NotationNote};
use crate::session::SessionStats;

/// What the player should be doing during a beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Listening to the pattern (or the metronome).
    Listen,
    /// Reading the pattern from the notation.
    Read,
    /// Playing the pattern back.
    Input,
}

/// An event emitted by a minigame's beat handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RoundEvent {
    #[serde(rename_all = "camelCase")]
    Beat {
        beat_index: u32,
        led_index: u32,
        phase: Phase,
    },
    /// An input-phase beat ended with an onset still unmatched.
    #[serde(rename_all = "camelCase")]
    Miss { beat_index: u32 },
    /// Hand the pattern to an audio scheduler.
    #[serde(rename_all = "camelCase")]
    PlayPattern {
        /// Inter-onset durations in seconds.
        durations_sec: Vec<f64>,
        /// Start of each note relative to playback start, in seconds.
        start_times_sec: Vec<f64>,
    },
}

/// Round-start descriptor returned by a minigame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStart {
    pub minigame_id: &'static str,
    pub minigame_name: &'static str,
    pub tempo_bpm: f64,
    pub notation: Vec<NotationNote>,
    /// Generated terminal sequence; only the pattern-echo game exposes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_symbols: Option<Vec<DurationSymbol>>,
}

/// Everything the controller publishes to its host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    #[serde(rename_all = "camelCase")]
    RoundStarted {
        round: u32,
        lives: u32,
        score: u32,
        start: RoundStart,
    },
    #[serde(rename_all = "camelCase")]
    Beat {
        beat_index: u32,
        led_index: u32,
        phase: Phase,
    },
    #[serde(rename_all = "camelCase")]
    Miss { beat_index: u32 },
    #[serde(rename_all = "camelCase")]
    PlayPattern {
        durations_sec: Vec<f64>,
        start_times_sec: Vec<f64>,
    },
    /// A user strike and how it was judged.
    #[serde(rename_all = "camelCase")]
    Judged {
        tick: u32,
        delta_ms: f64,
        judgment: Judgment,
        score: u32,
    },
    #[serde(rename_all = "camelCase")]
    LifeLost { lives: u32 },
    #[serde(rename_all = "camelCase")]
    RoundEnded { round: u32, minigame_id: &'static str },
    #[serde(rename_all = "camelCase")]
    GameOver {
        score: u32,
        round: u32,
        stats: SessionStats,
    },
}

impl From<RoundEvent> for SessionEvent {
    fn from(event: RoundEvent) -> Self {
        match event {
            RoundEvent::Beat {
                beat_index,
                led_index,
                phase,
            } => Self::Beat {
                beat_index,
                led_index,
                phase,
            },
            RoundEvent::Miss { beat_index } => Self::Miss { beat_index },
            RoundEvent::PlayPattern {
                durations_sec,
                start_times_sec,
            } => Self::PlayPattern {
                durations_sec,
                start_times_sec,
            },
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Listen => "listen",
            Self::Read => "read",
            Self::Input => "input",
        };
        f.write_str(name)
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundStarted {
                round,
                lives,
                score,
                start,
            } => {
                write!(
                    f,
                    "round {round}: {} at {:.0} bpm (lives {lives}, score {score})",
                    start.minigame_name, start.tempo_bpm
                )?;
                if let Some(symbols) = &start.pattern_symbols {
                    let joined: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();
                    write!(f, " pattern [{}]", joined.join(" "))?;
                }
                Ok(())
            }
            Self::Beat {
                beat_index, phase, ..
            } => write!(f, "beat {beat_index} ({phase})"),
            Self::Miss { beat_index } => write!(f, "miss on beat {beat_index}"),
            Self::PlayPattern { durations_sec, .. } => {
                write!(f, "play pattern ({} notes)", durations_sec.len())
            }
            Self::Judged {
                tick,
                delta_ms,
                judgment,
                score,
            } => {
                let verdict = match judgment {
                    Judgment::Ignore => "ignored",
                    Judgment::Score {
                        kind: HitKind::Perfect,
                        ..
                    } => "perfect",
                    Judgment::Score {
                        kind: HitKind::Good,
                        ..
                    } => "good",
                    Judgment::TimingError {
                        reason: TimingErrorReason::Early,
                    } => "too early",
                    Judgment::TimingError {
                        reason: TimingErrorReason::Late,
                    } => "too late",
                    Judgment::TimingError {
                        reason: TimingErrorReason::Extra,
                    } => "extra hit",
                };
                write!(f, "{verdict} on beat {tick} ({delta_ms:+.0}ms), score {score}")
            }
            Self::LifeLost { lives } => write!(f, "life lost, {lives} left"),
            Self::RoundEnded { round, minigame_id } => {
                write!(f, "round {round} ({minigame_id}) complete")
            }
            Self::GameOver {
                score,
                round,
                stats,
            } => write!(
                f,
                "game over at round {round}: score {score}, accuracy {:.1}%",
                stats.accuracy()
            ),
        }
    }
}

/// What a minigame's beat handler decided.
#[derive(Debug, Clone, PartialEq)]
pub enum BeatOutcome {
    Continue(Vec<RoundEvent>),
    /// The round is over; carries any misses found on the closing tick.
    RoundEnd(Vec<RoundEvent>),
}

impl BeatOutcome {
    /// Events produced by the tick.
    pub fn events(&self) -> &[RoundEvent] {
        match self {
            Self::Continue(events) | Self::RoundEnd(events) => events,
        }
    }

    pub fn into_events(self) -> Vec<RoundEvent> {
        match self {
            Self::Continue(events) | Self::RoundEnd(events) => events,
        }
    }

    /// Whether the tick closed the round.
    pub fn is_round_end(&self) -> bool {
        matches!(self, Self::RoundEnd(_))
    }
}
