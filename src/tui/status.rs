//! Status bar — round, tempo, lives, score and the last verdict.

use crate::event::{Phase, SessionEvent};
use crate::minigame::{HitKind, Judgment, TimingErrorReason};
use crate::session::SessionPhase;

/// Status information for the TUI status bar.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusInfo {
    pub bpm: f64,
    pub round: u32,
    pub lives: u32,
    pub max_lives: u32,
    pub score: u32,
    pub minigame_name: String,
    pub phase: Option<Phase>,
    pub session: SessionPhase,
    pub last_verdict: Option<Verdict>,
}

/// How the last strike went.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub judgment: Judgment,
    pub delta_ms: f64,
}

impl Verdict {
    /// Short upper-case label for the status bar.
    pub fn label(&self) -> &'static str {
        match self.judgment {
            Judgment::Ignore => "--",
            Judgment::Score {
                kind: HitKind::Perfect,
                ..
            } => "PERFECT",
            Judgment::Score {
                kind: HitKind::Good,
                ..
            } => "GOOD",
            Judgment::TimingError {
                reason: TimingErrorReason::Early,
            } => "EARLY",
            Judgment::TimingError {
                reason: TimingErrorReason::Late,
            } => "LATE",
            Judgment::TimingError {
                reason: TimingErrorReason::Extra,
            } => "EXTRA",
        }
    }
}

impl StatusInfo {
    pub fn new(max_lives: u32) -> Self {
        Self {
            lives: max_lives,
            max_lives,
            ..Self::default()
        }
    }

    /// Fold one session event into the status.
    pub fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::RoundStarted {
                round,
                lives,
                score,
                start,
            } => {
                self.round = *round;
                self.lives = *lives;
                self.score = *score;
                self.bpm = start.tempo_bpm;
                self.minigame_name = start.minigame_name.to_string();
                self.phase = None;
                self.session = SessionPhase::Playing;
            }
            SessionEvent::Beat { phase, .. } => self.phase = Some(*phase),
            SessionEvent::Judged {
                judgment,
                delta_ms,
                score,
                ..
            } => {
                self.score = *score;
                self.last_verdict = Some(Verdict {
                    judgment: *judgment,
                    delta_ms: *delta_ms,
                });
            }
            SessionEvent::LifeLost { lives } => self.lives = *lives,
            SessionEvent::GameOver { score, .. } => {
                self.score = *score;
                self.phase = None;
                self.session = SessionPhase::GameOver;
            }
            SessionEvent::Miss { .. }
            | SessionEvent::PlayPattern { .. }
            | SessionEvent::RoundEnded { .. } => {}
        }
    }

    /// Filled and empty hearts, e.g. "♥♥♡".
    pub fn lives_display(&self) -> String {
        let lost = self.max_lives.saturating_sub(self.lives) as usize;
        let mut s = "♥".repeat(self.lives as usize);
        s.push_str(&"♡".repeat(lost));
        s
    }

    /// Upper-case name of what the player should be doing.
    pub fn phase_display(&self) -> &str {
        match (self.session, self.phase) {
            (SessionPhase::Idle, _) => "READY",
            (SessionPhase::GameOver, _) => "GAME OVER",
            (SessionPhase::Playing, None) => "COUNT-IN",
            (SessionPhase::Playing, Some(Phase::Listen)) => "LISTEN",
            (SessionPhase::Playing, Some(Phase::Read)) => "READ",
            (SessionPhase::Playing, Some(Phase::Input)) => "PLAY",
        }
    }

    /// "PERFECT -12ms", or empty before the first strike.
    pub fn verdict_display(&self) -> String {
        match self.last_verdict {
            Some(v) => format!("{} {:+.0}ms", v.label(), v.delta_ms),
            None => String::new(),
        }
    }
}

impl Default for StatusInfo {
    fn default() -> Self {
        Self {
            bpm: 0.0,
            round: 0,
            lives: 0,
            max_lives: 0,
            score: 0,
            minigame_name: String::new(),
            phase: None,
            session: SessionPhase::Idle,
            last_verdict: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RoundStart;

    fn round_started() -> SessionEvent {
        SessionEvent::RoundStarted {
            round: 2,
            lives: 3,
            score: 150,
            start: RoundStart {
                minigame_id: "read-and-play",
                minigame_name: "Read and Play",
                tempo_bpm: 66.0,
                notation: Vec::new(),
                pattern_symbols: None,
            },
        }
    }

    #[test]
    fn lives_display_shows_lost_hearts() {
        let mut s = StatusInfo::new(3);
        assert_eq!(s.lives_display(), "♥♥♥");
        s.apply(&SessionEvent::LifeLost { lives: 1 });
        assert_eq!(s.lives_display(), "♥♡♡");
    }

    #[test]
    fn round_start_resets_phase() {
        let mut s = StatusInfo::new(3);
        assert_eq!(s.phase_display(), "READY");
        s.apply(&round_started());
        assert_eq!(s.round, 2);
        assert_eq!(s.bpm, 66.0);
        assert_eq!(s.minigame_name, "Read and Play");
        assert_eq!(s.phase_display(), "COUNT-IN");
        s.apply(&SessionEvent::Beat {
            beat_index: 0,
            led_index: 0,
            phase: Phase::Read,
        });
        assert_eq!(s.phase_display(), "READ");
    }

    #[test]
    fn judgments_update_score_and_verdict() {
        let mut s = StatusInfo::new(3);
        assert_eq!(s.verdict_display(), "");
        s.apply(&SessionEvent::Judged {
            tick: 4,
            delta_ms: -12.0,
            judgment: Judgment::score(HitKind::Perfect),
            score: 100,
        });
        assert_eq!(s.score, 100);
        assert_eq!(s.verdict_display(), "PERFECT -12ms");
    }

    #[test]
    fn game_over_is_shown() {
        let mut s = StatusInfo::new(3);
        s.apply(&round_started());
        s.apply(&SessionEvent::GameOver {
            score: 400,
            round: 5,
            stats: Default::default(),
        });
        assert_eq!(s.phase_display(), "GAME OVER");
        assert_eq!(s.score, 400);
    }
}
