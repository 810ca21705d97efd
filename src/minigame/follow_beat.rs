//! Follow the Beat: strike along with four quarter notes.

use super::judge::{Judgment, TimingWindows};
use super::round::{BeatTarget, RoundLayout, RoundState};
use crate::event::{BeatOutcome, Phase, RoundStart};
use crate::rhythm::{Pattern, Tempo};

pub const ID: &str = "follow-the-beat";
pub const NAME: &str = "Follow the Beat";

/// Metronome alignment game. The pattern never changes and a single
/// tolerance radius is used, so every match is perfect.
#[derive(Debug, Clone)]
pub struct FollowTheBeat {
    round: RoundState,
}

impl FollowTheBeat {
    pub fn new(layout: RoundLayout, windows: TimingWindows) -> Self {
        Self {
            round: RoundState::new(layout, windows),
        }
    }

    /// Reset to four quarter notes at `tempo`.
    pub fn start_round(&mut self, tempo: Tempo) -> RoundStart {
        let pattern = Pattern::four_quarters(tempo);
        let notation = pattern.notation().to_vec();
        self.round.reset(pattern);
        RoundStart {
            minigame_id: ID,
            minigame_name: NAME,
            tempo_bpm: tempo.bpm(),
            notation,
            pattern_symbols: None,
        }
    }

    pub fn on_beat(&mut self, tick: u32, now_ms: f64) -> BeatOutcome {
        self.round.on_beat(tick, now_ms, Phase::Listen)
    }

    pub fn on_input(&mut self, tempo: Tempo, now_ms: f64, target: BeatTarget) -> Judgment {
        self.round.on_input(tempo, now_ms, target)
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }
}

impl Default for FollowTheBeat {
    fn default() -> Self {
        Self::new(RoundLayout::DEFAULT, TimingWindows::METRONOME)
    }
}
