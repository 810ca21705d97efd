//! Read and Play: read a generated pattern from the staff, then play it.

use log::debug;

use super::judge::{Judgment, TimingWindows};
use super::round::{BeatTarget, RoundLayout, RoundState};
use crate::event::{BeatOutcome, Phase, RoundStart};
use crate::rhythm::{DurationTable, Grammar, IndexSource, Pattern, Tempo};

pub const ID: &str = "read-and-play";
pub const NAME: &str = "Read and Play";

#[derive(Debug, Clone)]
pub struct ReadAndPlay {
    round: RoundState,
    grammar: Grammar,
    table: DurationTable,
}

impl ReadAndPlay {
    pub fn new(
        layout: RoundLayout,
        windows: TimingWindows,
        grammar: Grammar,
        table: DurationTable,
    ) -> Self {
        Self {
            round: RoundState::new(layout, windows),
            grammar,
            table,
        }
    }

    pub fn start_round<R: IndexSource + ?Sized>(&mut self, tempo: Tempo, rng: &mut R) -> RoundStart {
        let symbols = self.grammar.expand(rng);
        let pattern = Pattern::build(symbols, &self.table, tempo);
        debug!("{ID}: pattern {:?}", pattern.symbols());
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
        self.round.on_beat(tick, now_ms, Phase::Read)
    }

    pub fn on_input(&mut self, tempo: Tempo, now_ms: f64, target: BeatTarget) -> Judgment {
        self.round.on_input(tempo, now_ms, target)
    }

    /// Shared round state.
    pub fn round(&self) -> &RoundState {
        &self.round
    }
}
