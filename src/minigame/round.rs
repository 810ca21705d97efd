//! The round core shared by every minigame.
//!
//! A round is `total_beats` ticks long. Ticks before `input_start_beat` are
//! preparatory (listen or read); the rest form the input phase, whose first
//! tick is time zero for the pattern's [`ExpectedHit`]s.

use log::debug;
use serde::Serialize;

use super::judge::{score_hit, Judgment, TimingWindows};
use crate::error::GameError;
use crate::event::{BeatOutcome, Phase, RoundEvent};
use crate::rhythm::{ExpectedHit, Pattern, Tempo, BEATS_PER_MEASURE};

/// Beat layout of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundLayout {
    total_beats: u32,
    input_start_beat: u32,
}

impl RoundLayout {
    /// Four preparatory beats and four input beats.
    pub const DEFAULT: Self = Self {
        total_beats: 8,
        input_start_beat: 4,
    };

    pub fn new(total_beats: u32, input_start_beat: u32) -> Result<Self, GameError> {
        if input_start_beat == 0 || input_start_beat >= total_beats {
            return Err(GameError::InvalidRoundLayout {
                input_start_beat,
                total_beats,
            });
        }
        Ok(Self {
            total_beats,
            input_start_beat,
        })
    }

    /// Beats per round, count-in included.
    pub fn total_beats(&self) -> u32 {
        self.total_beats
    }

    /// First tick of the input phase.
    pub fn input_start_beat(&self) -> u32 {
        self.input_start_beat
    }

    /// Number of input-phase beats.
    pub fn input_beats(&self) -> u32 {
        self.total_beats - self.input_start_beat
    }

    /// Whether `tick` falls in the input phase.
    pub fn is_input_tick(&self, tick: u32) -> bool {
        tick >= self.input_start_beat && tick < self.total_beats
    }
}

impl Default for RoundLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Which tick a strike was attributed to and how far from that beat's center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatTarget {
    pub tick: u32,
    /// Signed offset from the tick's beat center; negative means before it.
    pub delta_ms: f64,
}

/// Mutable state of one round.
#[derive(Debug, Clone)]
pub struct RoundState {
    layout: RoundLayout,
    windows: TimingWindows,
    beat_index: u32,
    pattern: Option<Pattern>,
    zero_point_ms: Option<f64>,
}

impl RoundState {
    pub fn new(layout: RoundLayout, windows: TimingWindows) -> Self {
        Self {
            layout,
            windows,
            beat_index: 0,
            pattern: None,
            zero_point_ms: None,
        }
    }

    /// Forget the previous round and install a fresh pattern.
    pub fn reset(&mut self, pattern: Pattern) {
        self.beat_index = 0;
        self.zero_point_ms = None;
        self.pattern = Some(pattern);
    }

    /// Beat layout of the round.
    pub fn layout(&self) -> RoundLayout {
        self.layout
    }

    /// Tolerance windows used by the judge.
    pub fn windows(&self) -> TimingWindows {
        self.windows
    }

    /// Last tick delivered.
    pub fn beat_index(&self) -> u32 {
        self.beat_index
    }

    /// Pattern of the current round, once started.
    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    /// Onsets to play this round, or none before the first round.
    pub fn expected_hits(&self) -> &[ExpectedHit] {
        match &self.pattern {
            Some(pattern) => pattern.hits(),
            None => &[],
        }
    }

    /// Clock reading of the first input beat, once known.
    pub fn zero_point_ms(&self) -> Option<f64> {
        self.zero_point_ms
    }

    /// Advance to `tick`.
    ///
    /// `now_ms` is the clock reading for this tick; it becomes the zero-point
    /// at the input start unless an early strike already set one.
    pub fn on_beat(&mut self, tick: u32, now_ms: f64, prep_phase: Phase) -> BeatOutcome {
        let mut events = Vec::new();
        self.beat_index = tick;

        if let Some(prev) = tick.checked_sub(1) {
            self.check_miss(prev, &mut events);
        }

        if tick == self.layout.input_start_beat && self.zero_point_ms.is_none() {
            debug!("input phase zero-point latched at {now_ms:.1}ms by tick");
            self.zero_point_ms = Some(now_ms);
        }

        if tick >= self.layout.total_beats {
            return BeatOutcome::RoundEnd(events);
        }

        let phase = if tick < self.layout.input_start_beat {
            prep_phase
        } else {
            Phase::Input
        };
        events.push(RoundEvent::Beat {
            beat_index: tick,
            led_index: tick % BEATS_PER_MEASURE,
            phase,
        });
        BeatOutcome::Continue(events)
    }

    fn check_miss(&self, prev: u32, events: &mut Vec<RoundEvent>) {
        if !self.layout.is_input_tick(prev) {
            return;
        }
        let segment = (prev - self.layout.input_start_beat) as usize;
        let missed = self
            .expected_hits()
            .iter()
            .any(|h| h.segment_index() == segment && !h.is_matched());
        if missed {
            events.push(RoundEvent::Miss { beat_index: prev });
        }
    }

    /// Judge a strike at clock reading `now_ms`.
    pub fn on_input(&mut self, tempo: Tempo, now_ms: f64, target: BeatTarget) -> Judgment {
        if !self.layout.is_input_tick(target.tick) {
            return Judgment::Ignore;
        }
        let beat_ms = tempo.beat_ms();

        let zero = match self.zero_point_ms {
            Some(zero) => zero,
            None => {
                let beat_center = now_ms - target.delta_ms;
                let offset_beats = (target.tick - self.layout.input_start_beat) as f64;
                let zero = beat_center - offset_beats * beat_ms;
                debug!("input phase zero-point backdated to {zero:.1}ms by early strike");
                self.zero_point_ms = Some(zero);
                zero
            }
        };

        let hit_time_ms = now_ms - zero;
        let span_ms = self.layout.input_beats() as f64 * beat_ms;
        if hit_time_ms < -beat_ms || hit_time_ms > span_ms + beat_ms {
            return Judgment::Ignore;
        }

        let windows = self.windows;
        match self.pattern.as_mut() {
            Some(pattern) => score_hit(pattern.hits_mut(), hit_time_ms, beat_ms, windows),
            None => Judgment::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minigame::judge::{HitKind, TimingErrorReason};

    fn tempo60() -> Tempo {
        Tempo::new(60.0).unwrap()
    }

    fn started() -> RoundState {
        let mut r = RoundState::new(RoundLayout::DEFAULT, TimingWindows::DEFAULT);
        r.reset(Pattern::four_quarters(tempo60()));
        r
    }

    fn target(tick: u32, delta_ms: f64) -> BeatTarget {
        BeatTarget { tick, delta_ms }
    }

    #[test]
    fn layout_validation() {
        assert!(RoundLayout::new(8, 4).is_ok());
        assert!(RoundLayout::new(8, 8).is_err());
        assert!(RoundLayout::new(8, 0).is_err());
        assert_eq!(RoundLayout::new(12, 4).unwrap().input_beats(), 8);
    }

    #[test]
    fn preparatory_beats_use_the_variant_phase() {
        let mut r = started();
        let out = r.on_beat(0, 0.0, Phase::Read);
        assert_eq!(
            out,
            BeatOutcome::Continue(vec![RoundEvent::Beat {
                beat_index: 0,
                led_index: 0,
                phase: Phase::Read,
            }])
        );
        let out = r.on_beat(5, 5000.0, Phase::Read);
        assert_eq!(
            out.events(),
            &[RoundEvent::Beat {
                beat_index: 5,
                led_index: 1,
                phase: Phase::Input,
            }]
        );
    }

    #[test]
    fn tick_at_input_start_latches_zero_point() {
        let mut r = started();
        for tick in 0..4 {
            r.on_beat(tick, tick as f64 * 1000.0, Phase::Listen);
        }
        assert_eq!(r.zero_point_ms(), None);
        r.on_beat(4, 4000.0, Phase::Listen);
        assert_eq!(r.zero_point_ms(), Some(4000.0));
    }

    #[test]
    fn early_strike_backdates_zero_point_and_tick_does_not_override() {
        let mut r = started();
        // 50ms before the first input beat, attributed to tick 4
        let j = r.on_input(tempo60(), 3950.0, target(4, -50.0));
        assert_eq!(j, Judgment::score(HitKind::Perfect));
        assert_eq!(r.zero_point_ms(), Some(4000.0));
        r.on_beat(4, 4010.0, Phase::Listen);
        assert_eq!(r.zero_point_ms(), Some(4000.0));
    }

    #[test]
    fn backdating_accounts_for_the_target_tick() {
        let mut r = started();
        r.on_input(tempo60(), 6020.0, target(6, 20.0));
        assert_eq!(r.zero_point_ms(), Some(4000.0));
        assert!(r.expected_hits()[2].is_matched());
    }

    #[test]
    fn ticks_outside_input_phase_are_ignored() {
        let mut r = started();
        assert_eq!(r.on_input(tempo60(), 1000.0, target(1, 0.0)), Judgment::Ignore);
        assert_eq!(r.on_input(tempo60(), 8000.0, target(8, 0.0)), Judgment::Ignore);
        assert_eq!(r.zero_point_ms(), None);
    }

    #[test]
    fn guard_band_ignores_far_strikes() {
        let mut r = started();
        r.on_beat(4, 4000.0, Phase::Listen);
        assert_eq!(r.on_input(tempo60(), 2999.0, target(4, 0.0)), Judgment::Ignore);
        assert_eq!(r.on_input(tempo60(), 9001.0, target(7, 0.0)), Judgment::Ignore);
        assert_eq!(
            r.on_input(tempo60(), 3100.0, target(4, 0.0)),
            Judgment::TimingError {
                reason: TimingErrorReason::Early
            }
        );
    }

    #[test]
    fn miss_fires_for_unmatched_segment_on_next_tick() {
        let mut r = started();
        r.on_beat(4, 4000.0, Phase::Listen);
        r.on_input(tempo60(), 4000.0, target(4, 0.0));
        let out = r.on_beat(5, 5000.0, Phase::Listen);
        assert!(!out.events().iter().any(|e| matches!(e, RoundEvent::Miss { .. })));

        let out = r.on_beat(6, 6000.0, Phase::Listen);
        assert!(out.events().contains(&RoundEvent::Miss { beat_index: 5 }));
    }

    #[test]
    fn closing_tick_ends_round_and_reports_last_miss() {
        let mut r = started();
        r.on_beat(7, 7000.0, Phase::Listen);
        let out = r.on_beat(8, 8000.0, Phase::Listen);
        assert_eq!(
            out,
            BeatOutcome::RoundEnd(vec![RoundEvent::Miss { beat_index: 7 }])
        );
    }

    #[test]
    fn no_miss_for_preparatory_ticks() {
        let mut r = started();
        for tick in 0..=4 {
            let out = r.on_beat(tick, tick as f64 * 1000.0, Phase::Listen);
            assert!(!out.events().iter().any(|e| matches!(e, RoundEvent::Miss { .. })));
        }
    }

    #[test]
    fn reset_clears_round_state() {
        let mut r = started();
        r.on_beat(4, 4000.0, Phase::Listen);
        r.on_input(tempo60(), 4000.0, target(4, 0.0));
        r.reset(Pattern::four_quarters(tempo60()));
        assert_eq!(r.beat_index(), 0);
        assert_eq!(r.zero_point_ms(), None);
        assert!(r.expected_hits().iter().all(|h| !h.is_matched()));
    }
}
