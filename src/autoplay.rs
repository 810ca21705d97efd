//! Autoplay — a simulated player that drives a [`GameController`].
//!
//! The player reads each round's expected hits and strikes at every onset
//! plus a seeded random offset, skipping some notes on purpose. Runs are
//! fully deterministic for a given config seed and player seed when driven
//! by a [`ManualClock`](crate::event::ManualClock).

use std::collections::VecDeque;
use std::io::Write;

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::event::{Clock, SessionEvent};
use crate::session::{GameController, SessionPhase, SessionStats};

/// How the simulated player behaves.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProfile {
    /// Strikes land uniformly within `±jitter_ms` of the onset.
    pub jitter_ms: f64,
    /// Chance of leaving a note unplayed.
    pub skip_probability: f64,
    pub seed: u64,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            jitter_ms: 30.0,
            skip_probability: 0.05,
            seed: 1,
        }
    }
}

/// Output format for event lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoplayReport {
    pub rounds_completed: u32,
    pub score: u32,
    pub lives: u32,
    pub game_over: bool,
    pub stats: SessionStats,
}

/// Plans strike times for each round.
pub struct AutoPlayer {
    profile: PlayerProfile,
    rng: ChaCha8Rng,
    strikes: VecDeque<f64>,
}

impl AutoPlayer {
    pub fn new(profile: PlayerProfile) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(profile.seed);
        Self {
            profile,
            rng,
            strikes: VecDeque::new(),
        }
    }

    /// Plan strikes for a round that was just armed.
    ///
    /// The first input beat is due `input_start_beat` periods after the
    /// clock's first deadline.
    pub fn plan_round<C: Clock>(&mut self, controller: &GameController<C>) {
        self.strikes.clear();
        let Some(first_beat) = controller.next_deadline() else {
            return;
        };
        let game = controller.model().current();
        let period = controller.model().tempo().beat_ms();
        let zero = first_beat + f64::from(game.layout().input_start_beat()) * period;

        let skip = self.profile.skip_probability.clamp(0.0, 1.0);
        let jitter = self.profile.jitter_ms.abs();
        for hit in game.round().expected_hits() {
            if self.rng.gen_bool(skip) {
                continue;
            }
            let offset = if jitter > 0.0 {
                self.rng.gen_range(-jitter..=jitter)
            } else {
                0.0
            };
            self.strikes.push_back(zero + hit.time_ms() + offset);
        }
        self.strikes
            .make_contiguous()
            .sort_by(|a, b| a.total_cmp(b));
        debug!("planned {} strike(s) from {zero:.1}ms", self.strikes.len());
    }

    fn next_strike(&self) -> Option<f64> {
        self.strikes.front().copied()
    }
}

/// Drive `controller` until game over or `max_rounds` rounds complete.
///
/// `wait_until` must move the controller's clock to at least the given
/// time (a manual clock sets it; a realtime host sleeps). `keep_going` is
/// checked before every step.
pub fn run<C: Clock>(
    controller: &mut GameController<C>,
    player: &mut AutoPlayer,
    max_rounds: u32,
    mut wait_until: impl FnMut(f64),
    mut keep_going: impl FnMut() -> bool,
    mut sink: impl FnMut(&SessionEvent),
) -> AutoplayReport {
    let mut rounds_completed = 0;
    let mut pending = controller.start();

    loop {
        for event in pending.drain(..) {
            sink(&event);
            match event {
                SessionEvent::RoundStarted { .. } => player.plan_round(controller),
                SessionEvent::RoundEnded { .. } => rounds_completed += 1,
                _ => {}
            }
        }

        if controller.phase() != SessionPhase::Playing
            || rounds_completed >= max_rounds
            || !keep_going()
        {
            break;
        }

        let beat = controller.next_deadline();
        let strike = player.next_strike();
        pending = match (beat, strike) {
            (Some(b), Some(s)) if s < b => {
                wait_until(s);
                player.strikes.pop_front();
                controller.handle_hit()
            }
            (Some(b), _) => {
                wait_until(b);
                controller.poll()
            }
            (None, Some(s)) => {
                wait_until(s);
                player.strikes.pop_front();
                controller.handle_hit()
            }
            (None, None) => break,
        };
    }

    controller.stop();
    AutoplayReport {
        rounds_completed,
        score: controller.model().score(),
        lives: controller.model().lives(),
        game_over: controller.phase() == SessionPhase::GameOver,
        stats: controller.stats().clone(),
    }
}

/// Write one event line in the chosen format.
pub fn write_event(
    out: &mut impl Write,
    format: OutputFormat,
    event: &SessionEvent,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{event}"),
        OutputFormat::Json => {
            let line = serde_json::to_string(event).map_err(std::io::Error::other)?;
            writeln!(out, "{line}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, Mode};
    use crate::event::ManualClock;

    fn controller(mode: Mode) -> (GameController<ManualClock>, ManualClock) {
        let config = GameConfig {
            mode,
            seed: Some(11),
            ..GameConfig::default()
        };
        let clock = ManualClock::new(0.0);
        let c = GameController::from_config(&config, clock.clone()).unwrap();
        (c, clock)
    }

    #[test]
    fn perfect_player_never_loses_a_life() {
        let (mut c, clock) = controller(Mode::All);
        let mut player = AutoPlayer::new(PlayerProfile {
            jitter_ms: 0.0,
            skip_probability: 0.0,
            seed: 3,
        });
        let report = run(&mut c, &mut player, 6, |t| clock.set(t), || true, |_| {});
        assert_eq!(report.rounds_completed, 6);
        assert_eq!(report.lives, 3);
        assert!(!report.game_over);
        assert_eq!(report.stats.miss, 0);
        assert_eq!(report.stats.good, 0);
        assert!(report.stats.perfect > 0);
        assert_eq!(report.score, report.stats.perfect * 100);
    }

    #[test]
    fn silent_player_runs_out_of_lives() {
        let (mut c, clock) = controller(Mode::FollowTheBeat);
        let mut player = AutoPlayer::new(PlayerProfile {
            jitter_ms: 0.0,
            skip_probability: 1.0,
            seed: 3,
        });
        let mut lines = Vec::new();
        let report = run(
            &mut c,
            &mut player,
            100,
            |t| clock.set(t),
            || true,
            |e| lines.push(e.to_string()),
        );
        assert!(report.game_over);
        assert_eq!(report.lives, 0);
        assert_eq!(report.rounds_completed, 2);
        assert_eq!(report.score, 0);
        assert!(lines.last().unwrap().starts_with("game over"));
    }

    #[test]
    fn json_lines_are_tagged() {
        let mut out = Vec::new();
        write_event(
            &mut out,
            OutputFormat::Json,
            &SessionEvent::Miss { beat_index: 4 },
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"type\":\"miss\",\"beatIndex\":4}\n"
        );
    }

    #[test]
    fn stop_flag_ends_the_run() {
        let (mut c, clock) = controller(Mode::All);
        let mut player = AutoPlayer::new(PlayerProfile::default());
        let report = run(&mut c, &mut player, 10, |t| clock.set(t), || false, |_| {});
        assert_eq!(report.rounds_completed, 0);
        assert_eq!(c.phase(), SessionPhase::Idle);
    }
}
