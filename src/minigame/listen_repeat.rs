//! Listen and Repeat: hear a generated pattern, then play it back.

use log::debug;

use super::judge::{Judgment, TimingWindows};
use super::round::{BeatTarget, RoundLayout, RoundState};
use crate::event::{BeatOutcome, Phase, RoundEvent, RoundStart};
use crate::rhythm::{DurationTable, Grammar, IndexSource, Pattern, Tempo};

pub const ID: &str = "listen-and-repeat";
pub const NAME: &str = "Listen and Repeat";

/// Pattern-echo game. On tick 0 it asks the host to play the pattern.
#[derive(Debug, Clone)]
pub struct ListenAndRepeat {
    round: RoundState,
    grammar: Grammar,
    table: DurationTable,
    pattern_played: bool,
}

impl ListenAndRepeat {
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
            pattern_played: false,
        }
    }

    pub fn start_round<R: IndexSource + ?Sized>(&mut self, tempo: Tempo, rng: &mut R) -> RoundStart {
        let symbols = self.grammar.expand(rng);
        let pattern = Pattern::build(symbols, &self.table, tempo);
        debug!("{ID}: pattern {:?}", pattern.symbols());
        let notation = pattern.notation().to_vec();
        let pattern_symbols = pattern.symbols().to_vec();
        self.round.reset(pattern);
        self.pattern_played = false;
        RoundStart {
            minigame_id: ID,
            minigame_name: NAME,
            tempo_bpm: tempo.bpm(),
            notation,
            pattern_symbols: Some(pattern_symbols),
        }
    }

    pub fn on_beat(&mut self, tick: u32, now_ms: f64) -> BeatOutcome {
        let outcome = self.round.on_beat(tick, now_ms, Phase::Listen);
        match outcome {
            BeatOutcome::Continue(mut events) => {
                if tick == 0 && !self.pattern_played {
                    if let Some(playback) = self.playback() {
                        self.pattern_played = true;
                        events.push(playback);
                    }
                }
                BeatOutcome::Continue(events)
            }
            end => end,
        }
    }

    fn playback(&self) -> Option<RoundEvent> {
        let pattern = self.round.pattern()?;
        Some(RoundEvent::PlayPattern {
            durations_sec: pattern.durations_sec().to_vec(),
            start_times_sec: pattern.onsets_sec(),
        })
    }

    pub fn on_input(&mut self, tempo: Tempo, now_ms: f64, target: BeatTarget) -> Judgment {
        self.round.on_input(tempo, now_ms, target)
    }

    /// Shared round state.
    pub fn round(&self) -> &RoundState {
        &self.round
    }

    /// Whether the playback request went out this round.
    pub fn pattern_played(&self) -> bool {
        self.pattern_played
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhythm::{symbols, FixedIndices};
    use assert_approx_eq::assert_approx_eq;

    fn game() -> ListenAndRepeat {
        ListenAndRepeat::new(
            RoundLayout::DEFAULT,
            TimingWindows::DEFAULT,
            Grammar::default(),
            DurationTable::builtin(),
        )
    }

    #[test]
    fn round_start_exposes_the_symbols() {
        let mut g = game();
        let start = g.start_round(Tempo::new(60.0).unwrap(), &mut FixedIndices::zeros());
        assert_eq!(start.pattern_symbols, Some(symbols(&["h", "h"])));
        assert_eq!(start.notation.len(), 2);
        assert!(!g.pattern_played());
    }

    #[test]
    fn playback_is_requested_once_on_tick_zero() {
        let mut g = game();
        g.start_round(Tempo::new(60.0).unwrap(), &mut FixedIndices::zeros());

        let events = g.on_beat(0, 0.0).into_events();
        assert_eq!(events.len(), 2);
        match &events[1] {
            RoundEvent::PlayPattern {
                durations_sec,
                start_times_sec,
            } => {
                assert_eq!(durations_sec.len(), 2);
                assert_approx_eq!(durations_sec[0], 2.0);
                assert_eq!(start_times_sec.len(), 2);
                assert_approx_eq!(start_times_sec[1], 2.0);
            }
            other => panic!("expected playback, got {other:?}"),
        }
        assert!(g.pattern_played());

        let again = g.on_beat(0, 0.0).into_events();
        assert_eq!(again.len(), 1);
        let next = g.on_beat(1, 1000.0).into_events();
        assert!(!next.iter().any(|e| matches!(e, RoundEvent::PlayPattern { .. })));
    }

    #[test]
    fn new_round_rearms_playback() {
        let mut g = game();
        let tempo = Tempo::new(60.0).unwrap();
        g.start_round(tempo, &mut FixedIndices::zeros());
        g.on_beat(0, 0.0);
        g.start_round(tempo, &mut FixedIndices::zeros());
        assert!(!g.pattern_played());
        assert_eq!(g.on_beat(0, 0.0).events().len(), 2);
    }
}
