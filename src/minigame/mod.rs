//! Minigames — one round state machine, three variants.
//!
//! Every variant shares [`RoundState`]: beat-indexed phases, miss detection
//! on the previous tick, the input-phase zero-point and the judgment in
//! [`judge`]. Variants differ only in how they build the pattern, what they
//! call the preparatory phase, and whether they ask for playback.

pub mod follow_beat;
pub mod judge;
pub mod listen_repeat;
pub mod read_play;
pub mod round;

pub use follow_beat::FollowTheBeat;
pub use judge::{
    find_closest_unmatched, score_hit, ClosestHit, HitKind, Judgment, TimingErrorReason,
    TimingWindows,
};
pub use listen_repeat::ListenAndRepeat;
pub use read_play::ReadAndPlay;
pub use round::{BeatTarget, RoundLayout, RoundState};

use serde::{Deserialize, Serialize};

use crate::event::{BeatOutcome, RoundStart};
use crate::rhythm::{DurationTable, Grammar, IndexSource, Tempo};

/// The three minigames, without their state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MiniGameKind {
    FollowTheBeat,
    ListenAndRepeat,
    ReadAndPlay,
}

impl MiniGameKind {
    pub const ALL: [Self; 3] = [Self::FollowTheBeat, Self::ListenAndRepeat, Self::ReadAndPlay];

    /// Stable id used in events and logs.
    pub fn id(self) -> &'static str {
        match self {
            Self::FollowTheBeat => follow_beat::ID,
            Self::ListenAndRepeat => listen_repeat::ID,
            Self::ReadAndPlay => read_play::ID,
        }
    }
}

/// What every minigame needs to be built.
#[derive(Debug, Clone)]
pub struct MiniGameSettings {
    pub layout: RoundLayout,
    pub windows: TimingWindows,
    pub metronome_windows: TimingWindows,
    pub grammar: Grammar,
    pub table: DurationTable,
}

impl Default for MiniGameSettings {
    fn default() -> Self {
        Self {
            layout: RoundLayout::DEFAULT,
            windows: TimingWindows::DEFAULT,
            metronome_windows: TimingWindows::METRONOME,
            grammar: Grammar::default(),
            table: DurationTable::builtin(),
        }
    }
}

/// A minigame and its round state.
#[derive(Debug, Clone)]
pub enum MiniGame {
    FollowTheBeat(FollowTheBeat),
    ListenAndRepeat(ListenAndRepeat),
    ReadAndPlay(ReadAndPlay),
}

impl MiniGame {
    pub fn build(kind: MiniGameKind, settings: &MiniGameSettings) -> Self {
        match kind {
            MiniGameKind::FollowTheBeat => Self::FollowTheBeat(FollowTheBeat::new(
                settings.layout,
                settings.metronome_windows,
            )),
            MiniGameKind::ListenAndRepeat => Self::ListenAndRepeat(ListenAndRepeat::new(
                settings.layout,
                settings.windows,
                settings.grammar.clone(),
                settings.table.clone(),
            )),
            MiniGameKind::ReadAndPlay => Self::ReadAndPlay(ReadAndPlay::new(
                settings.layout,
                settings.windows,
                settings.grammar.clone(),
                settings.table.clone(),
            )),
        }
    }

    /// Which variant this is.
    pub fn kind(&self) -> MiniGameKind {
        match self {
            Self::FollowTheBeat(_) => MiniGameKind::FollowTheBeat,
            Self::ListenAndRepeat(_) => MiniGameKind::ListenAndRepeat,
            Self::ReadAndPlay(_) => MiniGameKind::ReadAndPlay,
        }
    }

    pub fn id(&self) -> &'static str {
        self.kind().id()
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FollowTheBeat(_) => follow_beat::NAME,
            Self::ListenAndRepeat(_) => listen_repeat::NAME,
            Self::ReadAndPlay(_) => read_play::NAME,
        }
    }

    /// Reset round state and generate a new pattern at `tempo`.
    pub fn start_round(&mut self, tempo: Tempo, rng: &mut dyn IndexSource) -> RoundStart {
        match self {
            Self::FollowTheBeat(g) => g.start_round(tempo),
            Self::ListenAndRepeat(g) => g.start_round(tempo, rng),
            Self::ReadAndPlay(g) => g.start_round(tempo, rng),
        }
    }

    pub fn on_beat(&mut self, tick: u32, now_ms: f64) -> BeatOutcome {
        match self {
            Self::FollowTheBeat(g) => g.on_beat(tick, now_ms),
            Self::ListenAndRepeat(g) => g.on_beat(tick, now_ms),
            Self::ReadAndPlay(g) => g.on_beat(tick, now_ms),
        }
    }

    pub fn on_input(&mut self, tempo: Tempo, now_ms: f64, target: BeatTarget) -> Judgment {
        match self {
            Self::FollowTheBeat(g) => g.on_input(tempo, now_ms, target),
            Self::ListenAndRepeat(g) => g.on_input(tempo, now_ms, target),
            Self::ReadAndPlay(g) => g.on_input(tempo, now_ms, target),
        }
    }

    /// Shared round state of the active variant.
    pub fn round(&self) -> &RoundState {
        match self {
            Self::FollowTheBeat(g) => g.round(),
            Self::ListenAndRepeat(g) => g.round(),
            Self::ReadAndPlay(g) => g.round(),
        }
    }

    /// Beat layout of the round.
    pub fn layout(&self) -> RoundLayout {
        self.round().layout()
    }
}
